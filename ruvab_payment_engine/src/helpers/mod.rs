mod order_ids;
mod payment_signature;
mod validation;

pub use order_ids::new_order_id;
pub use payment_signature::{hmac_sha256_hex, sign_payment, verify_hmac_sha256_hex, verify_payment_signature};
pub use validation::is_plausible_email;
