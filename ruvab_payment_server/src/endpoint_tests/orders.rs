use actix_web::{http::StatusCode, test, web, App};
use chrono::{TimeZone, Utc};
use rpg_common::Paise;
use ruvab_payment_engine::{
    db_types::{Order, OrderId, OrderStatusType},
    events::EventProducers,
    test_utils::fake_gateway::FakeGateway,
    Gateway,
    OrderFlowApi,
    PaymentGatewayError,
};

use super::{
    helpers::{get, json, post_json, send},
    mocks::MockDatabase,
};
use crate::{
    routes::{CancelOrderRoute, OrderStatusRoute},
    server::json_config,
};

fn sample_order(status: OrderStatusType) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 10, 18, 9, 30, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId::from("ord_20241018_a1b2c3"),
        amount: Paise::from(49_900),
        currency: "INR".to_string(),
        status,
        customer_name: Some("Asha".to_string()),
        customer_email: "asha@example.in".to_string(),
        customer_phone: None,
        service_type: "consultation".to_string(),
        description: None,
        razorpay_order_id: "order_ABC123".to_string(),
        razorpay_payment_id: None,
        razorpay_signature: None,
        created_at,
        updated_at: created_at,
    }
}

fn api(db: MockDatabase) -> web::Data<OrderFlowApi<MockDatabase, FakeGateway>> {
    web::Data::new(OrderFlowApi::new(db, Gateway::Enabled(FakeGateway::default()), EventProducers::default()))
}

macro_rules! order_service {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(json_config())
                .app_data(api($db))
                .service(OrderStatusRoute::<MockDatabase, FakeGateway>::new())
                .service(CancelOrderRoute::<MockDatabase, FakeGateway>::new()),
        )
        .await
    };
}

#[actix_web::test]
async fn order_status_includes_payments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sample_order(OrderStatusType::Created))));
    db.expect_fetch_payments_for_order().returning(|_| Ok(vec![]));
    let service = order_service!(db);
    let (status, body) = send(&service, get("/payment/order/ord_20241018_a1b2c3")).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["orderId"], "ord_20241018_a1b2c3");
    assert_eq!(body["order"]["status"], "created");
    assert_eq!(body["order"]["amount"], 49_900);
    assert_eq!(body["payments"].as_array().map(|p| p.len()), Some(0));
}

#[actix_web::test]
async fn unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    db.expect_fetch_payments_for_order().never();
    let service = order_service!(db);
    let (status, body) = send(&service, get("/payment/order/ord_missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "The data was not found. Order ord_missing does not exist");
}

#[actix_web::test]
async fn database_errors_are_not_leaked() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id()
        .returning(|_| Err(PaymentGatewayError::DatabaseError("disk I/O error at /var/lib/rpg".into())));
    let service = order_service!(db);
    let (status, body) = send(&service, get("/payment/order/ord_20241018_a1b2c3")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Payment could not be processed, please try again");
}

#[actix_web::test]
async fn paid_orders_cannot_be_cancelled() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_order_status()
        .withf(|_, status| *status == OrderStatusType::Cancelled)
        .returning(|_, to| Err(PaymentGatewayError::OrderModificationForbidden(OrderStatusType::Paid, to)));
    let service = order_service!(db);
    let (status, body) = send(&service, post_json("/payment/order/ord_20241018_a1b2c3/cancel", &serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json(&body)["success"], false);
}

#[actix_web::test]
async fn created_orders_can_be_cancelled() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_update_order_status().times(1).returning(|_, to| Ok(sample_order(to)));
    let service = order_service!(db);
    let (status, body) = send(&service, post_json("/payment/order/ord_20241018_a1b2c3/cancel", &serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["order"]["status"], "cancelled");
}
