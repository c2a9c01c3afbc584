use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewOrder, Order, OrderId, OrderStatusType},
};

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
///
/// A clash on either the order id or the gateway order handle is reported as [`SqliteDatabaseError::DuplicateOrder`].
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let result = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (
                order_id,
                amount,
                currency,
                customer_name,
                customer_email,
                customer_phone,
                service_type,
                description,
                razorpay_order_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(order.amount)
    .bind(&order.currency)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.service_type)
    .bind(&order.description)
    .bind(&order.razorpay_order_id)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_id, order.id);
            Ok(order)
        },
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(SqliteDatabaseError::DuplicateOrder(order.order_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_by_razorpay_order_id(
    razorpay_order_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE razorpay_order_id = $1")
        .bind(razorpay_order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// Moves the order from `Created` to `Paid` and attaches the gateway payment handle and signature.
///
/// The status guard in the `WHERE` clause makes this a compare-and-set: if the order is not `Created` (because another
/// caller got there first, or it has been failed or cancelled) nothing is changed and `None` is returned.
pub async fn mark_order_paid(
    order_id: &OrderId,
    razorpay_payment_id: &str,
    signature: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders SET
                status = 'paid',
                razorpay_payment_id = $1,
                razorpay_signature = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $3 AND status = 'created'
            RETURNING *;
        "#,
    )
    .bind(razorpay_payment_id)
    .bind(signature)
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ mark_order_paid({order_id}) updated row: {}", order.is_some());
    Ok(order)
}

/// Compare-and-set on the order status. Returns `None` if the order does not currently have status `from`.
pub async fn transition_order_status(
    order_id: &OrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders SET
                status = $1,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(order_id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ transition_order_status({order_id}, {from} -> {to}) updated row: {}", order.is_some());
    Ok(order)
}
