use rpg_common::Paise;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderId, Payment},
    helpers::is_plausible_email,
    rpe_api::errors::CheckoutError,
};

/// A customer's request to start a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub amount: Paise,
    pub service_type: String,
    pub customer_email: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

impl CheckoutRequest {
    pub fn new(amount: Paise, service_type: &str, customer_email: &str) -> Self {
        Self {
            amount,
            service_type: service_type.to_string(),
            customer_email: customer_email.to_string(),
            customer_name: None,
            customer_phone: None,
            description: None,
        }
    }

    pub fn with_customer_name(mut self, name: &str) -> Self {
        self.customer_name = Some(name.to_string());
        self
    }

    pub fn with_customer_phone(mut self, phone: &str) -> Self {
        self.customer_phone = Some(phone.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Checks the request before anything leaves the process.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if !self.amount.is_positive() {
            return Err(CheckoutError::InvalidRequest("amount must be a positive number".into()));
        }
        if self.service_type.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("serviceType is required".into()));
        }
        if self.customer_email.trim().is_empty() {
            return Err(CheckoutError::InvalidRequest("customerEmail is required".into()));
        }
        if !is_plausible_email(self.customer_email.trim()) {
            return Err(CheckoutError::InvalidRequest("customerEmail is not a valid email address".into()));
        }
        Ok(())
    }
}

/// Everything the browser needs to open the gateway's checkout for a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutOrder {
    pub order_id: OrderId,
    pub razorpay_order_id: String,
    pub amount: Paise,
    pub currency: String,
    pub public_key: String,
}

/// The signed callback the browser relays after the customer completes payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub signature: String,
    pub order_id: OrderId,
}

impl PaymentVerification {
    pub fn new(order_id: OrderId, razorpay_order_id: &str, razorpay_payment_id: &str, signature: &str) -> Self {
        Self {
            razorpay_order_id: razorpay_order_id.to_string(),
            razorpay_payment_id: razorpay_payment_id.to_string(),
            signature: signature.to_string(),
            order_id,
        }
    }

    pub fn validate(&self) -> Result<(), CheckoutError> {
        let missing = [
            ("remoteOrderHandle", self.razorpay_order_id.as_str()),
            ("remotePaymentHandle", self.razorpay_payment_id.as_str()),
            ("signature", self.signature.as_str()),
            ("orderId", self.order_id.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect::<Vec<_>>();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::InvalidRequest(format!("missing required fields: {}", missing.join(", "))))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPayment {
    pub order_id: OrderId,
    pub razorpay_payment_id: String,
    /// False when this payment had already been recorded by an earlier call or by a webhook.
    pub newly_recorded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithPayments {
    pub order: Order,
    pub payments: Vec<Payment>,
}
