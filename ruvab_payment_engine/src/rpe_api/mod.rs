//! # Ruvab payment engine public API
//!
//! * [`order_flow_api`] is the synchronous checkout flow driven by the customer's browser: create an order, then verify
//!   the signed payment callback.
//! * [`webhook_api`] reconciles local state with asynchronous notifications sent by the gateway, for the cases where
//!   the browser never came back.
//!
//! Both APIs are built the same way: supply a database backend, the configured [`crate::traits::Gateway`], and the
//! event producers that should hear about paid and failed orders.
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url(url, 25).await?;
//! let api = OrderFlowApi::new(db, Gateway::Enabled(client), producers);
//! let checkout = api.create_order(request).await?;
//! ```

pub mod checkout_objects;
pub mod errors;
pub mod order_flow_api;
pub mod webhook_api;
pub mod webhook_objects;
