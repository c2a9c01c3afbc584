use mockall::mock;
use ruvab_payment_engine::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderStatusType, Payment},
    OrderManagement,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentRecorded,
};

mock! {
    pub Database {}
    impl Clone for Database {
        fn clone(&self) -> Self;
    }
    impl OrderManagement for Database {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_order_by_razorpay_order_id(&self, razorpay_order_id: &str) -> Result<Option<Order>, PaymentGatewayError>;
        async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, PaymentGatewayError>;
        async fn fetch_payment_by_razorpay_id(&self, razorpay_payment_id: &str) -> Result<Option<Payment>, PaymentGatewayError>;
    }
    impl PaymentGatewayDatabase for Database {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;
        async fn record_successful_payment(&self, payment: NewPayment, signature: Option<String>) -> Result<PaymentRecorded, PaymentGatewayError>;
        async fn update_order_status(&self, order_id: &OrderId, new_status: OrderStatusType) -> Result<Order, PaymentGatewayError>;
    }
}
