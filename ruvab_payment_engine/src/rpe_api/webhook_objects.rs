use std::fmt::Display;

use crate::{db_types::Order, traits::GatewayPayment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentCaptured,
    PaymentFailed,
    Other(String),
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            "payment.captured" => Self::PaymentCaptured,
            "payment.failed" => Self::PaymentFailed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::PaymentCaptured => write!(f, "payment.captured"),
            WebhookEventType::PaymentFailed => write!(f, "payment.failed"),
            WebhookEventType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// How far a webhook delivery can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookTrust {
    /// The body carried a valid HMAC made with the webhook secret.
    Verified,
    /// No webhook secret is configured, so anyone could have sent it. Development only.
    Unverified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub event_type: WebhookEventType,
    pub payment: Option<GatewayPayment>,
}

impl WebhookEvent {
    pub fn new(event: &str, payment: Option<GatewayPayment>) -> Self {
        Self { event_type: WebhookEventType::from(event), payment }
    }
}

/// What processing a webhook did to local state. All three are acknowledged to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored(String),
    NoChange,
    OrderUpdated(Order),
}

impl Display for WebhookOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookOutcome::Ignored(reason) => write!(f, "ignored ({reason})"),
            WebhookOutcome::NoChange => write!(f, "no change"),
            WebhookOutcome::OrderUpdated(order) => write!(f, "order {} is now {}", order.order_id, order.status),
        }
    }
}
