//! Glue between the Razorpay REST client and the payment engine's gateway seam.
use log::*;
use razorpay_tools::{NewRazorpayOrder, RazorpayApi, RazorpayApiError, RazorpayConfig, RazorpayPayment, RazorpayWebhook};
use rpg_common::{Paise, Secret};
use ruvab_payment_engine::{
    webhook_objects::WebhookEvent,
    Gateway,
    GatewayError,
    GatewayOrder,
    GatewayOrderRequest,
    GatewayPayment,
    PaymentGateway,
};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct RazorpayGateway {
    api: RazorpayApi,
}

impl RazorpayGateway {
    pub fn new(config: RazorpayConfig) -> Result<Self, ServerError> {
        let api = RazorpayApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

/// Builds the gateway from configuration. Missing credentials give a disabled gateway, not an error.
pub fn build_gateway(config: Option<RazorpayConfig>) -> Result<Gateway<RazorpayGateway>, ServerError> {
    match config {
        Some(config) => {
            info!("💳️ Razorpay payments are enabled with key {} at {}", config.key_id, config.api_url);
            Ok(Gateway::Enabled(RazorpayGateway::new(config)?))
        },
        None => {
            warn!("💳️ Razorpay credentials are not configured. Payments are disabled.");
            Ok(Gateway::Disabled)
        },
    }
}

impl PaymentGateway for RazorpayGateway {
    fn public_key(&self) -> &str {
        self.api.config().key_id.as_str()
    }

    fn signing_secret(&self) -> &Secret<String> {
        &self.api.config().key_secret
    }

    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        let order = NewRazorpayOrder {
            amount: request.amount.value(),
            currency: request.currency,
            receipt: request.receipt,
            notes: request.notes,
        };
        let order = self.api.create_order(&order).await.map_err(to_gateway_error)?;
        debug!("💳️ Razorpay created order {} ({})", order.id, order.status);
        Ok(GatewayOrder {
            id: order.id,
            amount: Paise::from(order.amount),
            currency: order.currency,
            status: order.status,
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let payment = self.api.fetch_payment(payment_id).await.map_err(to_gateway_error)?;
        debug!("💳️ Razorpay reports payment {} as {}", payment.id, payment.status);
        Ok(to_gateway_payment(payment))
    }
}

pub fn to_gateway_error(e: RazorpayApiError) -> GatewayError {
    match e {
        RazorpayApiError::Initialization(s) | RazorpayApiError::RequestError(s) => GatewayError::Network(s),
        RazorpayApiError::Timeout(s) => GatewayError::Timeout(s),
        RazorpayApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        RazorpayApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
    }
}

pub fn to_gateway_payment(payment: RazorpayPayment) -> GatewayPayment {
    GatewayPayment {
        id: payment.id,
        order_id: payment.order_id,
        amount: Paise::from(payment.amount),
        currency: payment.currency,
        status: payment.status,
        method: payment.method,
        bank: payment.bank,
        wallet: payment.wallet,
        vpa: payment.vpa,
        fee: payment.fee.map(Paise::from),
        tax: payment.tax.map(Paise::from),
        error_description: payment.error_description,
    }
}

pub fn to_webhook_event(webhook: RazorpayWebhook) -> WebhookEvent {
    let payment = webhook.payload.payment.map(|p| to_gateway_payment(p.entity));
    WebhookEvent::new(&webhook.event, payment)
}
