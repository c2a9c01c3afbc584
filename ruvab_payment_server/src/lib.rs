//! # Ruvab payment server
//! This crate hosts the HTTP surface of the Ruvab payment gateway. It is responsible for:
//! * Starting checkouts, by creating an order with Razorpay and storing it locally.
//! * Verifying the signed payment callback that the browser posts back after checkout.
//! * Receiving Razorpay webhooks and reconciling them against local orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /payment/create-order`: Starts a checkout.
//! * `POST /payment/verify`: Verifies a completed payment.
//! * `GET /payment/order/{order_id}`: Order status, with its recorded payments.
//! * `POST /payment/order/{order_id}/cancel`: Abandons an unpaid order.
//! * `POST /payment/webhook`: Razorpay webhook receiver.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
