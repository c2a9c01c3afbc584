//! Ruvab Payment Engine
//!
//! The payment engine takes a customer from "I want to pay for this service" to a durable, verified payment record.
//! It is provider-agnostic: the remote gateway is reached through the [`traits::PaymentGateway`] trait, and storage
//! through the [`traits::PaymentGatewayDatabase`] and [`traits::OrderManagement`] traits.
//!
//! The library is divided into these main sections:
//! 1. Data types ([`mod@db_types`]) shared between the database, the API and HTTP layers.
//! 2. Database backends. SQLite is the supported backend ([`SqliteDatabase`]). Callers should never need to touch the
//!    database directly; use the public API instead.
//! 3. The public API ([`mod@rpe_api`]):
//!    * [`OrderFlowApi`] creates checkout orders, verifies payment callbacks and answers status lookups.
//!    * [`WebhookApi`] reconciles asynchronous gateway notifications with local state.
//!
//! Both APIs publish events ([`mod@events`]) when an order is paid or fails, so that other components can react
//! without being wired into the payment flow.
mod db;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod rpe_api;
pub mod traits;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, SqliteDatabaseError};
pub use rpe_api::{
    checkout_objects,
    errors::CheckoutError,
    order_flow_api::OrderFlowApi,
    webhook_api::WebhookApi,
    webhook_objects,
};
pub use traits::{
    Gateway,
    GatewayError,
    GatewayOrder,
    GatewayOrderRequest,
    GatewayPayment,
    OrderManagement,
    PaymentGateway,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentRecorded,
};
