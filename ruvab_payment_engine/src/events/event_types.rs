use serde::{Deserialize, Serialize};

use crate::db_types::{Order, Payment};

/// Emitted exactly once per order, by whichever path (client verification or webhook) moved it to `Paid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
    pub payment: Payment,
}

impl OrderPaidEvent {
    pub fn new(order: Order, payment: Payment) -> Self {
        Self { order, payment }
    }
}

/// Emitted when the gateway reports a failed payment for an order that was still awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFailedEvent {
    pub order: Order,
    pub reason: Option<String>,
}

impl OrderFailedEvent {
    pub fn new(order: Order, reason: Option<String>) -> Self {
        Self { order, reason }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    OrderPaid(OrderPaidEvent),
    OrderFailed(OrderFailedEvent),
}
