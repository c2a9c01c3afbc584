use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::{db_url, new_pool, orders, payments, SqliteDatabaseError};
use crate::{
    db_types::{NewOrder, NewPayment, Order, OrderId, OrderStatusType, Payment},
    traits::{OrderManagement, PaymentGatewayDatabase, PaymentGatewayError, PaymentRecorded},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// The order update is issued first so that the transaction takes the write lock immediately. Concurrent callers
    /// for the same order then queue up behind it instead of both reading `Created` and racing to upgrade.
    async fn record_successful_payment(
        &self,
        payment: NewPayment,
        signature: Option<String>,
    ) -> Result<PaymentRecorded, PaymentGatewayError> {
        let order_id = payment.order_id.clone();
        let payment_id = payment.razorpay_payment_id.clone();
        let mut tx = self.pool.begin().await?;
        let updated = orders::mark_order_paid(&order_id, &payment_id, signature.as_deref(), &mut tx).await?;
        let order_updated = updated.is_some();
        let order = match updated {
            Some(order) => order,
            None => {
                let order = orders::fetch_order_by_order_id(&order_id, &mut tx)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
                if order.status != OrderStatusType::Paid {
                    warn!(
                        "🗃️ Payment {payment_id} arrived for order {order_id}, which is already {}. Not recording it.",
                        order.status
                    );
                    return Err(PaymentGatewayError::OrderModificationForbidden(order.status, OrderStatusType::Paid));
                }
                order
            },
        };
        let (payment, payment_inserted) = match payments::insert_payment_if_absent(payment, &mut tx).await? {
            Some(p) => (p, true),
            None => {
                let existing = payments::fetch_payment_by_razorpay_id(&payment_id, &mut tx)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::DatabaseError(format!("Payment {payment_id} vanished")))?;
                if existing.order_id != order_id {
                    error!(
                        "🗃️ Payment {payment_id} is already recorded against order {}, not {order_id}.",
                        existing.order_id
                    );
                    return Err(PaymentGatewayError::PaymentAlreadyExists(payment_id));
                }
                (existing, false)
            },
        };
        tx.commit().await?;
        debug!(
            "🗃️ Payment {payment_id} for order {order_id} recorded. Order updated: {order_updated}, payment inserted: \
             {payment_inserted}"
        );
        Ok(PaymentRecorded { order, payment, order_updated, payment_inserted })
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatusType,
    ) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        // Created is the only status with outgoing edges, so the compare-and-set always starts from there.
        let updated = if OrderStatusType::Created.can_transition_to(new_status) {
            orders::transition_order_status(order_id, OrderStatusType::Created, new_status, &mut tx).await?
        } else {
            None
        };
        let result = match updated {
            Some(order) => Ok(order),
            None => {
                let order = orders::fetch_order_by_order_id(order_id, &mut tx)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
                if order.status == new_status {
                    Err(PaymentGatewayError::OrderModificationNoOp)
                } else {
                    Err(PaymentGatewayError::OrderModificationForbidden(order.status, new_status))
                }
            },
        };
        tx.commit().await?;
        result
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_razorpay_order_id(
        &self,
        razorpay_order_id: &str,
    ) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_razorpay_order_id(razorpay_order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_payments_for_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payments = payments::fetch_payments_for_order(order_id, &mut conn).await?;
        Ok(payments)
    }

    async fn fetch_payment_by_razorpay_id(
        &self,
        razorpay_payment_id: &str,
    ) -> Result<Option<Payment>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_by_razorpay_id(razorpay_payment_id, &mut conn).await?;
        Ok(payment)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `RPG_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        Self::new_with_url(db_url().as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
