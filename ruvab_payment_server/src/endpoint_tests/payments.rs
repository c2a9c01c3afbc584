use actix_web::{http::StatusCode, test, web, App};
use rpg_common::Paise;
use ruvab_payment_engine::{
    checkout_objects::CheckoutRequest,
    db_types::{OrderId, OrderStatusType},
    events::EventProducers,
    test_utils::{
        fake_gateway::{FakeGateway, FAKE_KEY_ID},
        prepare_env::{new_test_db, tear_down},
    },
    Gateway,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
};
use serde_json::json as j;

use super::helpers::{get, json, post_json, send};
use crate::{
    routes::{CancelOrderRoute, CreateOrderRoute, OrderStatusRoute, VerifyPaymentRoute},
    server::json_config,
};

type Api = OrderFlowApi<SqliteDatabase, FakeGateway>;

macro_rules! payment_service {
    ($api:expr) => {
        test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(web::Data::new($api))
                .service(CreateOrderRoute::<SqliteDatabase, FakeGateway>::new())
                .service(VerifyPaymentRoute::<SqliteDatabase, FakeGateway>::new())
                .service(OrderStatusRoute::<SqliteDatabase, FakeGateway>::new())
                .service(CancelOrderRoute::<SqliteDatabase, FakeGateway>::new()),
        )
        .await
    };
}

fn new_api(db: &SqliteDatabase, gateway: &FakeGateway) -> Api {
    OrderFlowApi::new(db.clone(), Gateway::Enabled(gateway.clone()), EventProducers::default())
}

/// Starts a checkout directly through the engine and returns (order id, remote order handle).
async fn checkout(db: &SqliteDatabase, gateway: &FakeGateway) -> (OrderId, String) {
    let request = CheckoutRequest::new(Paise::from(49_900), "consultation", "asha@example.in");
    let order = new_api(db, gateway).create_order(request).await.expect("Checkout failed");
    (order.order_id, order.razorpay_order_id)
}

fn verification_body(order_id: &OrderId, order_handle: &str, payment_handle: &str, signature: &str) -> serde_json::Value {
    j!({
        "remoteOrderHandle": order_handle,
        "remotePaymentHandle": payment_handle,
        "signature": signature,
        "orderId": order_id.as_str(),
    })
}

#[actix_web::test]
async fn create_order_returns_checkout_details() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default().with_next_order_handle("order_ABC123");
    let service = payment_service!(new_api(&db, &gateway));
    let req = post_json(
        "/payment/create-order",
        &j!({"amount": 499, "serviceType": "consultation", "customerEmail": "asha@example.in", "customerName": "Asha"}),
    );
    let (status, body) = send(&service, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["remoteOrderHandle"], "order_ABC123");
    assert_eq!(body["amount"], 49_900);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["publicKey"], FAKE_KEY_ID);
    let order_id = OrderId::from(body["orderId"].as_str().expect("orderId is missing"));
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().expect("Order was not stored");
    assert_eq!(order.status, OrderStatusType::Created);
    assert_eq!(order.customer_name.as_deref(), Some("Asha"));
    tear_down(db).await;
}

#[actix_web::test]
async fn invalid_checkouts_are_rejected_before_the_gateway() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let service = payment_service!(new_api(&db, &gateway));
    for body in [
        j!({"amount": 0, "serviceType": "consultation", "customerEmail": "asha@example.in"}),
        j!({"amount": 499, "customerEmail": "asha@example.in"}),
        j!({"amount": 499, "serviceType": "consultation"}),
        j!({"amount": 499, "serviceType": "consultation", "customerEmail": "not-an-email"}),
    ] {
        let (status, resp) = send(&service, post_json("/payment/create-order", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} gave {resp}");
        assert_eq!(json(&resp)["success"], false);
    }
    assert_eq!(gateway.create_calls(), 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let service = payment_service!(new_api(&db, &gateway));
    let req = test::TestRequest::post()
        .uri("/payment/create-order")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"amount\": 499, \"serviceType\": ")
        .to_request();
    let (status, body) = send(&service, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["success"], false);
    assert_eq!(gateway.create_calls(), 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn checkout_without_credentials_fails_closed() {
    let db = new_test_db().await;
    let api: Api = OrderFlowApi::new(db.clone(), Gateway::Disabled, EventProducers::default());
    let service = payment_service!(api);
    let req = post_json(
        "/payment/create-order",
        &j!({"amount": 499, "serviceType": "consultation", "customerEmail": "asha@example.in"}),
    );
    let (status, body) = send(&service, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment could not be processed, please try again");
    tear_down(db).await;
}

#[actix_web::test]
async fn verified_payment_marks_the_order_paid_once() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let signature = gateway.sign(&order_handle, "pay_XYZ789");
    let service = payment_service!(new_api(&db, &gateway));

    let body = verification_body(&order_id, &order_handle, "pay_XYZ789", &signature);
    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    let resp = json(&resp);
    assert_eq!(resp["message"], "Payment verified successfully");
    assert_eq!(resp["paymentId"], "pay_XYZ789");

    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(json(&resp)["message"], "Payment was already verified");

    let (status, resp) = send(&service, get(&format!("/payment/order/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let resp = json(&resp);
    assert_eq!(resp["order"]["status"], "paid");
    assert_eq!(resp["order"]["razorpayPaymentId"], "pay_XYZ789");
    assert_eq!(resp["payments"].as_array().map(|p| p.len()), Some(1));
    assert_eq!(resp["payments"][0]["amount"], 49_900);
    tear_down(db).await;
}

#[actix_web::test]
async fn gateway_field_names_are_accepted() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let signature = gateway.sign(&order_handle, "pay_XYZ789");
    let service = payment_service!(new_api(&db, &gateway));
    let body = j!({
        "razorpay_order_id": order_handle,
        "razorpay_payment_id": "pay_XYZ789",
        "razorpay_signature": signature,
        "orderId": order_id.as_str(),
    });
    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    tear_down(db).await;
}

#[actix_web::test]
async fn tampered_signature_is_rejected() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let mut signature = gateway.sign(&order_handle, "pay_XYZ789");
    let last = if signature.ends_with('0') { "1" } else { "0" };
    signature.replace_range(signature.len() - 1.., last);
    let service = payment_service!(new_api(&db, &gateway));

    let body = verification_body(&order_id, &order_handle, "pay_XYZ789", &signature);
    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let resp = json(&resp);
    assert_eq!(resp["success"], false);
    assert_eq!(resp["message"], "Payment verification failed");

    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
    assert!(db.fetch_payments_for_order(&order_id).await.unwrap().is_empty());
    assert_eq!(gateway.fetch_calls(), 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn incomplete_verifications_are_rejected() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    let service = payment_service!(new_api(&db, &gateway));
    let body = j!({"remoteOrderHandle": order_handle, "orderId": order_id.as_str()});
    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json(&resp)["message"].as_str().map(String::from).unwrap_or_default();
    assert!(message.contains("remotePaymentHandle"), "{message}");
    assert!(message.contains("signature"), "{message}");
    tear_down(db).await;
}

#[actix_web::test]
async fn verifying_an_unknown_order_is_not_found() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let signature = gateway.sign("order_ABC123", "pay_XYZ789");
    let service = payment_service!(new_api(&db, &gateway));
    let body = verification_body(&OrderId::from("ord_missing"), "order_ABC123", "pay_XYZ789", &signature);
    let (status, _) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    tear_down(db).await;
}

#[actix_web::test]
async fn cancelled_orders_cannot_be_paid() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let signature = gateway.sign(&order_handle, "pay_XYZ789");
    let service = payment_service!(new_api(&db, &gateway));

    let (status, resp) = send(&service, post_json(&format!("/payment/order/{order_id}/cancel"), &j!({}))).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(json(&resp)["order"]["status"], "cancelled");

    let body = verification_body(&order_id, &order_handle, "pay_XYZ789", &signature);
    let (status, _) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Cancelled);
    assert!(db.fetch_payments_for_order(&order_id).await.unwrap().is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn failed_payments_leave_the_order_open() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::failed_payment("pay_FAIL01", &order_handle, Paise::from(49_900)));
    let signature = gateway.sign(&order_handle, "pay_FAIL01");
    let service = payment_service!(new_api(&db, &gateway));

    let body = verification_body(&order_id, &order_handle, "pay_FAIL01", &signature);
    let (status, resp) = send(&service, post_json("/payment/verify", &body)).await;
    assert_eq!(status, StatusCode::CONFLICT, "{resp}");
    assert_eq!(json(&resp)["success"], false);
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
    assert!(db.fetch_payments_for_order(&order_id).await.unwrap().is_empty());
    tear_down(db).await;
}
