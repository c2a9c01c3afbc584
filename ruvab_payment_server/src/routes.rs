//! Route and handler definitions
//!
//! Handlers stay thin: they convert the request into an engine call and the result into a response. Anything with more
//! logic than that belongs in the engine.
//!
//! Each worker thread processes its requests one at a time, so a handler that blocks stalls its whole worker. Database
//! access and gateway calls are async and must stay that way.
use actix_web::{get, web, HttpMessage, HttpRequest, HttpResponse, Responder};
use log::*;
use razorpay_tools::RazorpayWebhook;
use ruvab_payment_engine::{
    checkout_objects::PaymentVerification,
    db_types::OrderId,
    webhook_objects::WebhookTrust,
    OrderFlowApi,
    PaymentGateway,
    PaymentGatewayDatabase,
    WebhookApi,
};

use crate::{
    config::ProxyConfig,
    data_objects::{
        CreateOrderRequest,
        CreateOrderResponse,
        JsonResponse,
        OrderResponse,
        OrderStatusResponse,
        VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    errors::ServerError,
    helpers::get_remote_ip,
    integrations::razorpay::to_webhook_event,
};

// actix's route attributes cannot take generic handlers, so generic routes are registered through `route!`
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(JsonResponse::success("👍️"))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/payment/create-order" impl PaymentGatewayDatabase, PaymentGateway);
pub async fn create_order<B, G>(
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let request = body.into_inner().into_checkout_request().map_err(|e| {
        debug!("💻️ Could not convert checkout amount. {e}");
        ServerError::InvalidRequestBody("amount is out of range".into())
    })?;
    trace!("💻️ Checkout requested for {} ({})", request.amount, request.service_type);
    let order = api.create_order(request).await?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse::from(order)))
}

route!(verify_payment => Post "/payment/verify" impl PaymentGatewayDatabase, PaymentGateway);
pub async fn verify_payment<B, G>(
    body: web::Json<VerifyPaymentRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let verification = PaymentVerification::from(body.into_inner());
    trace!("💻️ Payment verification requested for order {}", verification.order_id);
    let verified = api.verify_payment(verification).await?;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(verified)))
}

route!(order_status => Get "/payment/order/{order_id}" impl PaymentGatewayDatabase, PaymentGateway);
pub async fn order_status<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ Status requested for order {order_id}");
    let result = api.fetch_order_with_payments(&order_id).await?;
    Ok(HttpResponse::Ok().json(OrderStatusResponse::from(result)))
}

route!(cancel_order => Post "/payment/order/{order_id}/cancel" impl PaymentGatewayDatabase, PaymentGateway);
pub async fn cancel_order<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ Cancellation requested for order {order_id}");
    let order = api.cancel_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(OrderResponse { success: true, order }))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(razorpay_webhook => Post "" impl PaymentGatewayDatabase, PaymentGateway);
/// Receives gateway notifications. Mount this under the HMAC middleware.
///
/// Well-formed events are always acknowledged with 200, including ones that are ignored. Processing errors (an
/// unreachable gateway or database) return an error status so that the gateway delivers the event again later.
pub async fn razorpay_webhook<B, G>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<WebhookApi<B, G>>,
    proxy: web::Data<ProxyConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    let peer = get_remote_ip(&req, proxy.use_x_forwarded_for, proxy.use_forwarded)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".into());
    let webhook = serde_json::from_slice::<RazorpayWebhook>(body.as_ref()).map_err(|e| {
        warn!("🪝️ Malformed webhook payload from {peer}. {e}");
        ServerError::InvalidRequestBody("Malformed webhook payload".into())
    })?;
    let trust = req.extensions().get::<WebhookTrust>().copied().unwrap_or(WebhookTrust::Unverified);
    info!("🪝️ Received {} webhook from {peer} ({trust:?})", webhook.event);
    let event = to_webhook_event(webhook);
    match api.process_event(event, trust).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(JsonResponse::success(outcome))),
        Err(e) => {
            error!("🪝️ Could not process webhook from {peer}. {e}");
            Err(e.into())
        },
    }
}
