use actix_http::Request;
use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use rpg_common::{Paise, Secret};
use ruvab_payment_engine::{
    checkout_objects::CheckoutRequest,
    db_types::{OrderId, OrderStatusType},
    events::EventProducers,
    helpers::hmac_sha256_hex,
    test_utils::{
        fake_gateway::FakeGateway,
        prepare_env::{new_test_db, tear_down},
    },
    Gateway,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
    WebhookApi,
};
use serde_json::json as j;

use super::helpers::{json, send};
use crate::{
    config::ProxyConfig,
    middleware::HmacMiddlewareFactory,
    routes::RazorpayWebhookRoute,
    server::WEBHOOK_SIGNATURE_HEADER,
};

const WEBHOOK_SECRET: &str = "whsec_for_tests_only";
const WEBHOOK_PATH: &str = "/payment/webhook";

macro_rules! webhook_service {
    ($db:expr, $gateway:expr, $hmac:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(WebhookApi::new($db.clone(), $gateway, EventProducers::default())))
                .app_data(web::Data::new(ProxyConfig::default()))
                .service(
                    web::scope(WEBHOOK_PATH)
                        .wrap($hmac)
                        .service(RazorpayWebhookRoute::<SqliteDatabase, FakeGateway>::new()),
                ),
        )
        .await
    };
}

fn signed_checks() -> HmacMiddlewareFactory {
    HmacMiddlewareFactory::new(WEBHOOK_SIGNATURE_HEADER, Secret::new(WEBHOOK_SECRET.to_string()), true)
}

fn no_checks() -> HmacMiddlewareFactory {
    HmacMiddlewareFactory::from_optional_secret(WEBHOOK_SIGNATURE_HEADER, None)
}

async fn checkout(db: &SqliteDatabase, gateway: &FakeGateway) -> (OrderId, String) {
    let api = OrderFlowApi::new(db.clone(), Gateway::Enabled(gateway.clone()), EventProducers::default());
    let request = CheckoutRequest::new(Paise::from(49_900), "consultation", "asha@example.in");
    let order = api.create_order(request).await.expect("Checkout failed");
    (order.order_id, order.razorpay_order_id)
}

fn webhook_body(event: &str, payment_handle: &str, order_handle: &str, status: &str) -> String {
    j!({
        "entity": "event",
        "account_id": "acc_BFQ7uQEaa7j2z7",
        "event": event,
        "contains": ["payment"],
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_handle,
                    "entity": "payment",
                    "amount": 49_900,
                    "currency": "INR",
                    "status": status,
                    "order_id": order_handle,
                    "method": "upi",
                    "vpa": "asha@okbank",
                    "created_at": 1_729_243_800
                }
            }
        },
        "created_at": 1_729_243_805
    })
    .to_string()
}

fn signed_request(body: &str) -> Request {
    let signature = hmac_sha256_hex(WEBHOOK_SECRET, body.as_bytes()).unwrap();
    TestRequest::post()
        .uri(WEBHOOK_PATH)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((WEBHOOK_SIGNATURE_HEADER, signature))
        .set_payload(body.to_string())
        .to_request()
}

fn unsigned_request(body: &str) -> Request {
    TestRequest::post()
        .uri(WEBHOOK_PATH)
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string())
        .to_request()
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let db = new_test_db().await;
    let service = webhook_service!(db, Gateway::Enabled(FakeGateway::default()), signed_checks());
    let body = webhook_body("payment.captured", "pay_XYZ789", "order_ABC123", "captured");
    let (status, resp) = send(&service, unsigned_request(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let resp = json(&resp);
    assert_eq!(resp["success"], false);
    assert_eq!(resp["message"], "Could not read request body: X-Razorpay-Signature header is missing");
    tear_down(db).await;
}

#[actix_web::test]
async fn forged_signature_is_rejected() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let service = webhook_service!(db, Gateway::Enabled(gateway.clone()), signed_checks());
    let body = webhook_body("payment.captured", "pay_XYZ789", &order_handle, "captured");
    let req = TestRequest::post()
        .uri(WEBHOOK_PATH)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((WEBHOOK_SIGNATURE_HEADER, hmac_sha256_hex("some_other_secret", body.as_bytes()).unwrap()))
        .set_payload(body)
        .to_request();
    let (status, resp) = send(&service, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&resp)["message"], "Payment verification failed");
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
    assert_eq!(gateway.fetch_calls(), 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn signed_capture_pays_the_order() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::captured_payment("pay_XYZ789", &order_handle, Paise::from(49_900)));
    let service = webhook_service!(db, Gateway::Enabled(gateway.clone()), signed_checks());
    let body = webhook_body("payment.captured", "pay_XYZ789", &order_handle, "captured");

    let (status, resp) = send(&service, signed_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(json(&resp)["success"], true);
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Paid);

    // Redelivery is acknowledged and changes nothing
    let (status, resp) = send(&service, signed_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(json(&resp)["message"], "no change");
    assert_eq!(db.fetch_payments_for_order(&order_id).await.unwrap().len(), 1);
    tear_down(db).await;
}

#[actix_web::test]
async fn signed_failure_fails_the_order() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    gateway.add_payment(FakeGateway::failed_payment("pay_FAIL01", &order_handle, Paise::from(49_900)));
    let service = webhook_service!(db, Gateway::Enabled(gateway.clone()), signed_checks());
    let body = webhook_body("payment.failed", "pay_FAIL01", &order_handle, "failed");
    let (status, resp) = send(&service, signed_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Failed);
    assert!(db.fetch_payments_for_order(&order_id).await.unwrap().is_empty());
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_payload_is_a_bad_request() {
    let db = new_test_db().await;
    let service = webhook_service!(db, Gateway::Enabled(FakeGateway::default()), signed_checks());
    let (status, resp) = send(&service, signed_request("{\"event\": \"payment.captured\", ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&resp)["message"], "Could not read request body: Malformed webhook payload");
    tear_down(db).await;
}

#[actix_web::test]
async fn unhandled_events_are_acknowledged() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let service = webhook_service!(db, Gateway::Enabled(gateway.clone()), signed_checks());
    let body = j!({"event": "refund.processed", "payload": {}}).to_string();
    let (status, resp) = send(&service, signed_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    let resp = json(&resp);
    assert_eq!(resp["success"], true);
    assert_eq!(resp["message"], "ignored (refund.processed events are not handled)");
    assert_eq!(gateway.fetch_calls(), 0);
    tear_down(db).await;
}

#[actix_web::test]
async fn gateway_outage_asks_for_redelivery() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    // The gateway has no record of this payment, so the authoritative lookup fails
    let service = webhook_service!(db, Gateway::Enabled(gateway.clone()), signed_checks());
    let body = webhook_body("payment.captured", "pay_UNKNOWN", &order_handle, "captured");
    let (status, resp) = send(&service, signed_request(&body)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "{resp}");
    assert_eq!(json(&resp)["success"], false);
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
    tear_down(db).await;
}

#[actix_web::test]
async fn unverified_events_are_not_trusted_without_the_gateway() {
    let db = new_test_db().await;
    let gateway = FakeGateway::default();
    let (order_id, order_handle) = checkout(&db, &gateway).await;
    let service = webhook_service!(db, Gateway::<FakeGateway>::Disabled, no_checks());
    let body = webhook_body("payment.captured", "pay_XYZ789", &order_handle, "captured");
    let (status, resp) = send(&service, unsigned_request(&body)).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert!(json(&resp)["message"].as_str().unwrap_or_default().starts_with("ignored"), "{resp}");
    let order = db.fetch_order_by_order_id(&order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
    tear_down(db).await;
}
