use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewPayment, OrderId, Payment},
};

/// Inserts the payment unless a payment with the same gateway payment handle already exists.
///
/// Returns `Some(payment)` for a fresh insert and `None` if the row was already there. Either way the table ends up
/// with exactly one row for the handle.
pub async fn insert_payment_if_absent(
    payment: NewPayment,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, SqliteDatabaseError> {
    let result = sqlx::query_as::<_, Payment>(
        r#"
            INSERT INTO payments (
                order_id,
                razorpay_payment_id,
                amount,
                currency,
                status,
                method,
                bank,
                wallet,
                vpa,
                fee,
                tax
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (razorpay_payment_id) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(&payment.order_id)
    .bind(&payment.razorpay_payment_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(payment.status)
    .bind(&payment.method)
    .bind(&payment.bank)
    .bind(&payment.wallet)
    .bind(&payment.vpa)
    .bind(payment.fee)
    .bind(payment.tax)
    .fetch_optional(conn)
    .await?;
    match &result {
        Some(p) => debug!("🗃️ Payment {} for order {} saved with id {}", p.razorpay_payment_id, p.order_id, p.id),
        None => debug!("🗃️ Payment {} has already been recorded", payment.razorpay_payment_id),
    }
    Ok(result)
}

pub async fn fetch_payment_by_razorpay_id(
    razorpay_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, SqliteDatabaseError> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE razorpay_payment_id = $1")
        .bind(razorpay_payment_id)
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn fetch_payments_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, SqliteDatabaseError> {
    let payments = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(payments)
}
