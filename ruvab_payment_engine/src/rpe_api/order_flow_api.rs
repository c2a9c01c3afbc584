use std::{collections::HashMap, fmt::Debug};

use log::*;
use rpg_common::DEFAULT_CURRENCY_CODE;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatusType, PaymentStatus},
    events::{EventProducers, OrderPaidEvent},
    helpers::{new_order_id, verify_payment_signature},
    rpe_api::{
        checkout_objects::{CheckoutOrder, CheckoutRequest, OrderWithPayments, PaymentVerification, VerifiedPayment},
        errors::CheckoutError,
    },
    traits::{Gateway, GatewayOrderRequest, PaymentGateway, PaymentGatewayDatabase},
};

/// `OrderFlowApi` is the primary API for the customer-facing checkout flow: creating orders, verifying the signed
/// payment callback, and reporting order status.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: Gateway<G>,
    producers: EventProducers,
    currency: String,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", if self.gateway.is_enabled() { "enabled" } else { "disabled" })
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: Gateway<G>, producers: EventProducers) -> Self {
        Self { db, gateway, producers, currency: DEFAULT_CURRENCY_CODE.to_string() }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &Gateway<G> {
        &self.gateway
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    /// Starts a checkout.
    ///
    /// The request is validated and the gateway configuration is checked before any remote call is made. A remote
    /// order is then created with our order id as its receipt, and finally the local order is stored with status
    /// `created`. Gateway calls are never retried here, since doing so blindly could create duplicate remote orders.
    pub async fn create_order(&self, request: CheckoutRequest) -> Result<CheckoutOrder, CheckoutError> {
        request.validate()?;
        let gateway = self.gateway.client().ok_or_else(|| {
            error!("🔄️📦️ A checkout was attempted, but payments are disabled. Configure the gateway credentials.");
            CheckoutError::GatewayUnavailable
        })?;
        let order_id = new_order_id();
        let mut notes = HashMap::new();
        notes.insert("service_type".to_string(), request.service_type.clone());
        notes.insert("customer_email".to_string(), request.customer_email.clone());
        let remote_request = GatewayOrderRequest {
            amount: request.amount,
            currency: self.currency.clone(),
            receipt: order_id.to_string(),
            notes,
        };
        trace!("🔄️📦️ Requesting remote order for {order_id}");
        let remote = gateway.create_order(remote_request).await.map_err(|e| {
            warn!("🔄️📦️ Could not create a remote order for {order_id}. {e}");
            CheckoutError::from(e)
        })?;
        if remote.amount != request.amount {
            warn!(
                "🔄️📦️ The gateway created order {} for {} but we asked for {}. Storing the requested amount.",
                remote.id, remote.amount, request.amount
            );
        }
        let new_order = NewOrder {
            order_id: order_id.clone(),
            amount: request.amount,
            currency: self.currency.clone(),
            customer_name: request.customer_name,
            customer_email: request.customer_email.trim().to_string(),
            customer_phone: request.customer_phone,
            service_type: request.service_type,
            description: request.description,
            razorpay_order_id: remote.id.clone(),
        };
        let order = self.db.insert_order(new_order).await?;
        info!("🔄️📦️ Order {order_id} created for {} with remote handle {}", order.amount, order.razorpay_order_id);
        Ok(CheckoutOrder {
            order_id: order.order_id,
            razorpay_order_id: order.razorpay_order_id,
            amount: order.amount,
            currency: order.currency,
            public_key: gateway.public_key().to_string(),
        })
    }

    /// Authenticates the payment callback relayed by the browser and, if it checks out, marks the order as paid.
    ///
    /// The signature is checked first, in constant time, and nothing is written if it does not match. The amounts that
    /// are stored come from the gateway's own record of the payment, never from the caller. Verifying the same payment
    /// again is harmless: it returns success with `newly_recorded` set to false.
    pub async fn verify_payment(&self, verification: PaymentVerification) -> Result<VerifiedPayment, CheckoutError> {
        verification.validate()?;
        let gateway = self.gateway.client().ok_or_else(|| {
            error!("🔄️🔐️ Payment verification was requested, but the gateway is not configured.");
            CheckoutError::VerificationUnavailable
        })?;
        let secret = gateway.signing_secret();
        if secret.is_empty() {
            error!("🔄️🔐️ Payment verification was requested, but the gateway secret is empty.");
            return Err(CheckoutError::VerificationUnavailable);
        }
        let PaymentVerification { razorpay_order_id, razorpay_payment_id, signature, order_id } = verification;
        if !verify_payment_signature(&razorpay_order_id, &razorpay_payment_id, &signature, secret) {
            warn!("🔄️🔐️ Invalid payment signature for order {order_id}. This may be a tampering attempt.");
            return Err(CheckoutError::InvalidSignature);
        }
        let order = self.fetch_order(&order_id).await?;
        if order.razorpay_order_id != razorpay_order_id {
            warn!(
                "🔄️🔐️ A correctly signed payment for remote order {razorpay_order_id} was submitted against order \
                 {order_id}, which belongs to a different remote order. This may be a tampering attempt."
            );
            return Err(CheckoutError::InvalidSignature);
        }
        if let Some(existing) = self.db.fetch_payment_by_razorpay_id(&razorpay_payment_id).await? {
            if existing.order_id == order_id && order.status == OrderStatusType::Paid {
                debug!("🔄️🔐️ Payment {razorpay_payment_id} for order {order_id} has already been recorded.");
                return Ok(VerifiedPayment { order_id, razorpay_payment_id, newly_recorded: false });
            }
        }
        let remote_payment = gateway.fetch_payment(&razorpay_payment_id).await?;
        if let Some(remote_order) = &remote_payment.order_id {
            if remote_order != &razorpay_order_id {
                warn!(
                    "🔄️🔐️ The gateway says payment {razorpay_payment_id} belongs to {remote_order}, not \
                     {razorpay_order_id}. Rejecting it."
                );
                return Err(CheckoutError::InvalidSignature);
            }
        }
        if PaymentStatus::from_gateway_status(&remote_payment.status) != PaymentStatus::Success {
            warn!(
                "🔄️🔐️ Payment {razorpay_payment_id} for order {order_id} is {} at the gateway, not captured. Leaving the \
                 order as it is.",
                remote_payment.status
            );
            return Err(CheckoutError::PaymentNotCaptured {
                payment_id: razorpay_payment_id,
                status: remote_payment.status,
            });
        }
        let new_payment = remote_payment.to_new_payment(order_id.clone());
        let recorded = self.db.record_successful_payment(new_payment, Some(signature)).await?;
        if recorded.order_updated {
            info!("🔄️💰️ Order {order_id} has been paid with payment {razorpay_payment_id}");
            self.call_order_paid_hook(OrderPaidEvent::new(recorded.order.clone(), recorded.payment.clone())).await;
        } else {
            debug!("🔄️💰️ Order {order_id} was already paid. Payment {razorpay_payment_id} is on record.");
        }
        Ok(VerifiedPayment { order_id, razorpay_payment_id, newly_recorded: recorded.payment_inserted })
    }

    /// The order, with every payment recorded against it.
    pub async fn fetch_order_with_payments(&self, order_id: &OrderId) -> Result<OrderWithPayments, CheckoutError> {
        let order = self.fetch_order(order_id).await?;
        let payments = self.db.fetch_payments_for_order(order_id).await?;
        Ok(OrderWithPayments { order, payments })
    }

    /// Abandons an order that has not been paid yet.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        let order = self.db.update_order_status(order_id, OrderStatusType::Cancelled).await?;
        info!("🔄️❌️ Order {order_id} has been cancelled");
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, CheckoutError> {
        self.db.fetch_order_by_order_id(order_id).await?.ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }

    async fn call_order_paid_hook(&self, event: OrderPaidEvent) {
        debug!("🔄️📦️ Notifying order paid hook subscribers");
        self.producers.publish_order_paid(event).await;
    }
}
