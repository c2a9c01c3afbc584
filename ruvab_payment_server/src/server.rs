use std::time::Duration;

use actix_web::{dev::Server, error::JsonPayloadError, http::KeepAlive, middleware::Logger, web, App, HttpRequest, HttpServer};
use log::*;
use ruvab_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderFailedEvent, OrderPaidEvent},
    Gateway,
    OrderFlowApi,
    SqliteDatabase,
    WebhookApi,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::razorpay::{build_gateway, RazorpayGateway},
    middleware::HmacMiddlewareFactory,
    routes::{health, CancelOrderRoute, CreateOrderRoute, OrderStatusRoute, RazorpayWebhookRoute, VerifyPaymentRoute},
};

pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";
const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections).await?;
    db.run_migrations().await?;
    let gateway = build_gateway(config.razorpay.clone())?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: Gateway<RazorpayGateway>,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let proxy_config = config.proxy_config();
    let currency = config.currency.clone();
    let webhook_secret = config.webhook_secret.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone(), producers.clone()).with_currency(&currency);
        let webhook_api = WebhookApi::new(db.clone(), gateway.clone(), producers.clone());
        let webhook_scope = web::scope("/payment/webhook")
            .wrap(HmacMiddlewareFactory::from_optional_secret(WEBHOOK_SIGNATURE_HEADER, webhook_secret.clone()))
            .service(RazorpayWebhookRoute::<SqliteDatabase, RazorpayGateway>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rpg::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(proxy_config))
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(OrderStatusRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(CancelOrderRoute::<SqliteDatabase, RazorpayGateway>::new())
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same `{success, message}` shape as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejecting malformed request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_paid(|ev: OrderPaidEvent| {
            Box::pin(async move {
                info!(
                    "💳️ Order {} is paid. Payment {} for {} {}",
                    ev.order.order_id, ev.payment.razorpay_payment_id, ev.payment.amount, ev.payment.currency
                );
            })
        })
        .on_order_failed(|ev: OrderFailedEvent| {
            Box::pin(async move {
                let reason = ev.reason.as_deref().unwrap_or("no reason given");
                info!("💳️ Order {} failed. {reason}", ev.order.order_id);
            })
        });
    hooks
}
