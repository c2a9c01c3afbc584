use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderStatusType},
    traits::{data_objects::PaymentRecorded, OrderManagement},
};

/// This trait defines the storage behaviour needed by the checkout flow.
///
/// This behaviour includes:
/// * Storing newly created checkout orders.
/// * Atomically marking an order as paid and recording the verified payment.
/// * Moving orders into the other terminal states.
///
/// Orders and payments are financial records and are never deleted.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new order with status `Created`.
    ///
    /// Returns [`PaymentGatewayError::OrderAlreadyExists`] if the order id (or its gateway order handle) is already
    /// taken.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    /// Records a verified payment against its order, in a single atomic transaction:
    /// * If the order is `Created`, it is moved to `Paid` and the gateway payment handle and signature are attached.
    /// * If the order is already `Paid`, the order row is left untouched.
    /// * If the order is `Failed` or `Cancelled`, nothing is written and
    ///   [`PaymentGatewayError::OrderModificationForbidden`] is returned.
    /// * The payment row is inserted unless one with the same gateway payment handle already exists, in which case the
    ///   existing row is returned. This makes the call idempotent, and it also makes racing callers (the synchronous
    ///   verification and a webhook delivery, say) serialize on the database rather than double-credit.
    async fn record_successful_payment(
        &self,
        payment: NewPayment,
        signature: Option<String>,
    ) -> Result<PaymentRecorded, PaymentGatewayError>;

    /// Moves an order to a new status, subject to [`OrderStatusType::can_transition_to`].
    ///
    /// Returns [`PaymentGatewayError::OrderModificationNoOp`] if the order already has the requested status.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<Order, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Payment {0} is already recorded against a different order")]
    PaymentAlreadyExists(String),
    #[error("The requested order change would result in a no-op.")]
    OrderModificationNoOp,
    #[error("The requested order change from {0} to {1} is forbidden.")]
    OrderModificationForbidden(OrderStatusType, OrderStatusType),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
