use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderStatusType},
    traits::{GatewayError, PaymentGatewayError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Payments are disabled because the gateway credentials are not configured")]
    GatewayUnavailable,
    #[error("Payment verification is unavailable because the gateway secret is not configured")]
    VerificationUnavailable,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Payment signature verification failed")]
    InvalidSignature,
    #[error("Payment gateway error: {0}")]
    GatewayError(#[from] GatewayError),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("The order already has the requested status")]
    OrderUnchanged,
    #[error("Payment {0} is already recorded against a different order")]
    PaymentConflict(String),
    #[error("Payment {payment_id} has not been captured. The gateway reports it as {status}")]
    PaymentNotCaptured { payment_id: String, status: String },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PaymentGatewayError> for CheckoutError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::OrderNotFound(id) => CheckoutError::OrderNotFound(id),
            PaymentGatewayError::OrderModificationForbidden(from, to) => CheckoutError::IllegalTransition { from, to },
            PaymentGatewayError::OrderModificationNoOp => CheckoutError::OrderUnchanged,
            PaymentGatewayError::PaymentAlreadyExists(id) => CheckoutError::PaymentConflict(id),
            PaymentGatewayError::OrderAlreadyExists(id) => {
                CheckoutError::DatabaseError(format!("Order {id} collides with an existing order"))
            },
            PaymentGatewayError::DatabaseError(s) => CheckoutError::DatabaseError(s),
        }
    }
}
