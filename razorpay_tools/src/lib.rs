//! A small, typed client for the parts of the Razorpay REST API that a checkout flow needs: creating orders and
//! fetching the authoritative record of a payment. Webhook payload types live here too, so that callers can
//! deserialize gateway callbacks without depending on the payment engine.
mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{NewRazorpayOrder, RazorpayOrder, RazorpayPayment, RazorpayWebhook};
pub use error::RazorpayApiError;
