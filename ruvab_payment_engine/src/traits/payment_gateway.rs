use rpg_common::Secret;
use thiserror::Error;

use crate::traits::data_objects::{GatewayOrder, GatewayOrderRequest, GatewayPayment};

/// A remote payment processor.
///
/// Implementations are expected to apply their own request timeout; the engine never retries a call.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// The public key id handed to browsers so that they can open the gateway's checkout.
    fn public_key(&self) -> &str;

    /// The shared secret the gateway uses to sign payment callbacks.
    fn signing_secret(&self) -> &Secret<String>;

    /// Creates a remote order. Not idempotent.
    async fn create_order(&self, request: GatewayOrderRequest) -> Result<GatewayOrder, GatewayError>;

    /// Fetches the gateway's own record of a payment.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

/// The gateway, as configured at start-up.
///
/// A missing credential is not an error at construction time: the server still runs, but every payment operation
/// fails closed.
#[derive(Clone, Debug)]
pub enum Gateway<G> {
    Enabled(G),
    Disabled,
}

impl<G> Gateway<G> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Gateway::Enabled(_))
    }

    pub fn client(&self) -> Option<&G> {
        match self {
            Gateway::Enabled(g) => Some(g),
            Gateway::Disabled => None,
        }
    }
}

impl<G> From<Option<G>> for Gateway<G> {
    fn from(value: Option<G>) -> Self {
        value.map(Gateway::Enabled).unwrap_or(Gateway::Disabled)
    }
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway. {0}")]
    Network(String),
    #[error("The payment gateway did not respond in time. {0}")]
    Timeout(String),
    #[error("The payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway sent a response we could not understand. {0}")]
    InvalidResponse(String),
}
