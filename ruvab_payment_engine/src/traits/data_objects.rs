use std::collections::HashMap;

use rpg_common::Paise;
use serde::{Deserialize, Serialize};

use crate::db_types::{NewPayment, Order, OrderId, Payment, PaymentStatus};

/// A request for a new remote order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrderRequest {
    pub amount: Paise,
    pub currency: String,
    /// Our own order id, so that the gateway dashboard can be cross-referenced.
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: Paise,
    pub currency: String,
    pub status: String,
}

/// The gateway's authoritative view of a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
    pub amount: Paise,
    pub currency: String,
    pub status: String,
    pub method: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    pub fee: Option<Paise>,
    pub tax: Option<Paise>,
    pub error_description: Option<String>,
}

impl GatewayPayment {
    /// Builds the local payment record for `order_id` from the gateway's numbers, ignoring anything a client claimed.
    pub fn to_new_payment(&self, order_id: OrderId) -> NewPayment {
        NewPayment {
            order_id,
            razorpay_payment_id: self.id.clone(),
            amount: self.amount,
            currency: self.currency.clone(),
            status: PaymentStatus::from_gateway_status(&self.status),
            method: self.method.clone(),
            bank: self.bank.clone(),
            wallet: self.wallet.clone(),
            vpa: self.vpa.clone(),
            fee: self.fee,
            tax: self.tax,
        }
    }
}

/// The result of [`crate::traits::PaymentGatewayDatabase::record_successful_payment`].
#[derive(Debug, Clone)]
pub struct PaymentRecorded {
    pub order: Order,
    pub payment: Payment,
    /// True if this call moved the order from `Created` to `Paid`.
    pub order_updated: bool,
    /// True if this call inserted the payment row.
    pub payment_inserted: bool,
}
