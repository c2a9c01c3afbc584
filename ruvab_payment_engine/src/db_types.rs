use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use rpg_common::{Paise, DEFAULT_CURRENCY_CODE};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The externally visible, opaque order identifier. It is distinct from the internal row id and from the order handle
/// issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Checkout has been initiated and a gateway order exists, but no verified payment has been seen yet.
    Created,
    /// A payment has been verified. The order is immutable from here on.
    Paid,
    /// The gateway reported that the payment failed.
    Failed,
    /// The order was abandoned before payment.
    Cancelled,
}

impl OrderStatusType {
    /// The order state machine. Every status change must pass through here.
    ///
    /// | From \ To | Created | Paid | Failed | Cancelled |
    /// |-----------|---------|------|--------|-----------|
    /// | Created   | -       | ✓    | ✓      | ✓         |
    /// | Paid      | ✗       | -    | ✗      | ✗         |
    /// | Failed    | ✗       | ✗    | -      | ✗         |
    /// | Cancelled | ✗       | ✗    | ✗      | -         |
    ///
    /// Same-status "transitions" return false; callers decide whether that is a no-op or an error.
    pub fn can_transition_to(&self, new_status: OrderStatusType) -> bool {
        use OrderStatusType::*;
        match (self, new_status) {
            (Created, Paid | Failed | Cancelled) => true,
            (Created, Created) => false,
            (Paid | Failed | Cancelled, _) => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatusType::Created)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "created"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Failed => write!(f, "failed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
/// Payment status, as mirrored from the gateway's own view of the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    /// Maps a gateway payment status onto the local status. Anything that is neither captured nor failed is still in
    /// flight as far as we are concerned.
    pub fn from_gateway_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "captured" => Self::Success,
            "failed" => Self::Failed,
            "created" | "authorized" | "refunded" => Self::Pending,
            other => {
                error!("Unknown gateway payment status '{other}'. Treating it as pending.");
                Self::Pending
            },
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Pending => write!(f, "pending"),
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub amount: Paise,
    pub currency: String,
    pub status: OrderStatusType,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order that has been accepted by the gateway and is about to be stored. New orders always start in `Created`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    /// Amount in paise
    pub amount: Paise,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub service_type: String,
    pub description: Option<String>,
    /// The order handle issued by the gateway
    pub razorpay_order_id: String,
}

impl NewOrder {
    pub fn new(order_id: OrderId, amount: Paise, service_type: &str, customer_email: &str, gateway_id: &str) -> Self {
        Self {
            order_id,
            amount,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            customer_name: None,
            customer_email: customer_email.to_string(),
            customer_phone: None,
            service_type: service_type.to_string(),
            description: None,
            razorpay_order_id: gateway_id.to_string(),
        }
    }
}

//--------------------------------------        Payment       ---------------------------------------------------------
/// A verified payment. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub order_id: OrderId,
    pub razorpay_payment_id: String,
    pub amount: Paise,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    pub fee: Option<Paise>,
    pub tax: Option<Paise>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------      NewPayment      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub order_id: OrderId,
    /// The payment handle issued by the gateway. Unique across all payments.
    pub razorpay_payment_id: String,
    pub amount: Paise,
    pub currency: String,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub bank: Option<String>,
    pub wallet: Option<String>,
    pub vpa: Option<String>,
    pub fee: Option<Paise>,
    pub tax: Option<Paise>,
}

impl NewPayment {
    pub fn new(order_id: OrderId, razorpay_payment_id: &str, amount: Paise, currency: &str) -> Self {
        Self {
            order_id,
            razorpay_payment_id: razorpay_payment_id.to_string(),
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::Success,
            method: None,
            bank: None,
            wallet: None,
            vpa: None,
            fee: None,
            tax: None,
        }
    }
}
