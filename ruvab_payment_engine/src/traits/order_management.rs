use crate::{
    db_types::{Order, OrderId, Payment},
    traits::PaymentGatewayError,
};

/// Read-only queries over orders and payments.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given local `order_id`.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches the order that the gateway knows by `razorpay_order_id`.
    async fn fetch_order_by_razorpay_order_id(
        &self,
        razorpay_order_id: &str,
    ) -> Result<Option<Order>, PaymentGatewayError>;

    /// Fetches all payments recorded against the order, oldest first.
    async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, PaymentGatewayError>;

    /// Fetches the payment with the given gateway payment handle.
    async fn fetch_payment_by_razorpay_id(
        &self,
        razorpay_payment_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError>;
}
