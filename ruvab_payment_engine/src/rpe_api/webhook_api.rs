use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderStatusType, PaymentStatus},
    events::{EventProducers, OrderFailedEvent, OrderPaidEvent},
    rpe_api::{
        errors::CheckoutError,
        webhook_objects::{WebhookEvent, WebhookEventType, WebhookOutcome, WebhookTrust},
    },
    traits::{Gateway, GatewayPayment, PaymentGateway, PaymentGatewayDatabase, PaymentGatewayError},
};

/// Reconciles local orders with the gateway's asynchronous notifications.
///
/// Every path is idempotent: redelivering an event that has already been applied leaves the order and its payments as
/// they are.
pub struct WebhookApi<B, G> {
    db: B,
    gateway: Gateway<G>,
    producers: EventProducers,
}

impl<B, G> Debug for WebhookApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WebhookApi")
    }
}

impl<B, G> WebhookApi<B, G> {
    pub fn new(db: B, gateway: Gateway<G>, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> WebhookApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    pub async fn process_event(
        &self,
        event: WebhookEvent,
        trust: WebhookTrust,
    ) -> Result<WebhookOutcome, CheckoutError> {
        let WebhookEvent { event_type, payment } = event;
        let captured = match &event_type {
            WebhookEventType::PaymentCaptured => true,
            WebhookEventType::PaymentFailed => false,
            WebhookEventType::Other(name) => {
                debug!("🪝️ Ignoring {name} event");
                return Ok(WebhookOutcome::Ignored(format!("{name} events are not handled")));
            },
        };
        let Some(entity) = payment else {
            warn!("🪝️ {event_type} event arrived without a payment entity");
            return Ok(WebhookOutcome::Ignored("the event has no payment entity".into()));
        };
        let Some(order) = self.locate_order(&entity).await? else {
            info!("🪝️ {event_type} for payment {} does not match any local order", entity.id);
            return Ok(WebhookOutcome::Ignored(format!("no local order for payment {}", entity.id)));
        };
        let outcome = if captured {
            self.on_payment_captured(order, entity, trust).await?
        } else {
            self.on_payment_failed(order, entity, trust).await?
        };
        info!("🪝️ {event_type} processed: {outcome}");
        Ok(outcome)
    }

    /// Finds the order by its recorded payment first, then by the gateway order handle on the entity.
    async fn locate_order(&self, entity: &GatewayPayment) -> Result<Option<Order>, CheckoutError> {
        if let Some(payment) = self.db.fetch_payment_by_razorpay_id(&entity.id).await? {
            trace!("🪝️ Payment {} is already recorded against order {}", entity.id, payment.order_id);
            return Ok(self.db.fetch_order_by_order_id(&payment.order_id).await?);
        }
        match &entity.order_id {
            Some(remote_order) => Ok(self.db.fetch_order_by_razorpay_order_id(remote_order).await?),
            None => Ok(None),
        }
    }

    /// The payment record to act on. The gateway's own record wins whenever we can fetch it; the webhook entity is only
    /// used as-is when its signature was checked.
    async fn authoritative_payment(
        &self,
        entity: GatewayPayment,
        trust: WebhookTrust,
    ) -> Result<Option<GatewayPayment>, CheckoutError> {
        match (&self.gateway, trust) {
            (Gateway::Enabled(gateway), _) => Ok(Some(gateway.fetch_payment(&entity.id).await?)),
            (Gateway::Disabled, WebhookTrust::Verified) => Ok(Some(entity)),
            (Gateway::Disabled, WebhookTrust::Unverified) => {
                warn!(
                    "🪝️ Unverified webhook for payment {} cannot be confirmed because the gateway is disabled",
                    entity.id
                );
                Ok(None)
            },
        }
    }

    async fn on_payment_captured(
        &self,
        order: Order,
        entity: GatewayPayment,
        trust: WebhookTrust,
    ) -> Result<WebhookOutcome, CheckoutError> {
        match order.status {
            OrderStatusType::Paid => {
                debug!("🪝️ Order {} is already paid", order.order_id);
                return Ok(WebhookOutcome::NoChange);
            },
            OrderStatusType::Failed | OrderStatusType::Cancelled => {
                warn!(
                    "🪝️ Payment {} was captured for order {}, which is {}. This needs manual attention.",
                    entity.id, order.order_id, order.status
                );
                return Ok(WebhookOutcome::NoChange);
            },
            OrderStatusType::Created => {},
        }
        let Some(payment) = self.authoritative_payment(entity, trust).await? else {
            return Ok(WebhookOutcome::Ignored("payment could not be confirmed".into()));
        };
        if payment.order_id.as_deref() != Some(order.razorpay_order_id.as_str()) {
            warn!(
                "🪝️ Payment {} does not belong to remote order {}. Not recording it.",
                payment.id, order.razorpay_order_id
            );
            return Ok(WebhookOutcome::Ignored(format!("payment {} belongs to another order", payment.id)));
        }
        if PaymentStatus::from_gateway_status(&payment.status) != PaymentStatus::Success {
            info!("🪝️ The gateway reports payment {} as {}, not captured", payment.id, payment.status);
            return Ok(WebhookOutcome::Ignored(format!("payment {} is {}", payment.id, payment.status)));
        }
        let new_payment = payment.to_new_payment(order.order_id.clone());
        match self.db.record_successful_payment(new_payment, None).await {
            Ok(recorded) if recorded.order_updated => {
                info!("🪝️💰️ Order {} has been paid with payment {}", recorded.order.order_id, payment.id);
                let event = OrderPaidEvent::new(recorded.order.clone(), recorded.payment);
                self.producers.publish_order_paid(event).await;
                Ok(WebhookOutcome::OrderUpdated(recorded.order))
            },
            Ok(_) => Ok(WebhookOutcome::NoChange),
            Err(PaymentGatewayError::OrderModificationForbidden(from, _)) => {
                warn!("🪝️ Order {} became {from} before payment {} could be recorded", order.order_id, payment.id);
                Ok(WebhookOutcome::NoChange)
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn on_payment_failed(
        &self,
        order: Order,
        entity: GatewayPayment,
        trust: WebhookTrust,
    ) -> Result<WebhookOutcome, CheckoutError> {
        if order.status != OrderStatusType::Created {
            debug!("🪝️ Order {} is already {}", order.order_id, order.status);
            return Ok(WebhookOutcome::NoChange);
        }
        let Some(payment) = self.authoritative_payment(entity, trust).await? else {
            return Ok(WebhookOutcome::Ignored("payment failure could not be confirmed".into()));
        };
        if PaymentStatus::from_gateway_status(&payment.status) != PaymentStatus::Failed {
            info!("🪝️ The gateway reports payment {} as {}, not failed", payment.id, payment.status);
            return Ok(WebhookOutcome::Ignored(format!("payment {} is {}", payment.id, payment.status)));
        }
        match self.db.update_order_status(&order.order_id, OrderStatusType::Failed).await {
            Ok(updated) => {
                let reason = payment.error_description.as_deref().unwrap_or("no reason given");
                info!("🪝️❌️ Order {} has failed: {reason}", updated.order_id);
                let event = OrderFailedEvent::new(updated.clone(), payment.error_description);
                self.producers.publish_order_failed(event).await;
                Ok(WebhookOutcome::OrderUpdated(updated))
            },
            Err(PaymentGatewayError::OrderModificationNoOp | PaymentGatewayError::OrderModificationForbidden(..)) => {
                Ok(WebhookOutcome::NoChange)
            },
            Err(e) => Err(e.into()),
        }
    }
}
