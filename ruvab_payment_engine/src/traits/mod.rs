//! # Backend contracts
//!
//! This module defines the behaviour that the payment engine needs from the outside world.
//!
//! * [`PaymentGatewayDatabase`] is the write side of storage. It creates orders and performs the atomic "order paid +
//!   payment recorded" transition.
//! * [`OrderManagement`] is the read side: order and payment lookups.
//! * [`PaymentGateway`] is the remote payment processor. It is wrapped in [`Gateway`], which is either `Enabled` with a
//!   configured client or explicitly `Disabled` when no credentials were supplied.
mod data_objects;
mod order_management;
mod payment_gateway;
mod payment_gateway_database;

pub use data_objects::{GatewayOrder, GatewayOrderRequest, GatewayPayment, PaymentRecorded};
pub use order_management::OrderManagement;
pub use payment_gateway::{Gateway, GatewayError, PaymentGateway};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
