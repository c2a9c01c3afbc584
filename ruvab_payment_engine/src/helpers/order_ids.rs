use chrono::Utc;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::db_types::OrderId;

const SUFFIX_LEN: usize = 10;

/// Creates a new local order id of the form `order_<unix millis>_<random suffix>`.
///
/// The timestamp keeps ids roughly sortable and the random suffix keeps concurrent checkouts apart, so no central
/// sequence is needed.
pub fn new_order_id() -> OrderId {
    let millis = Utc::now().timestamp_millis();
    let suffix = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect::<String>();
    OrderId(format!("order_{millis}_{suffix}"))
}
