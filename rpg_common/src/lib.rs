mod helpers;
mod paise;
mod secret;

pub use helpers::parse_boolean_flag;
pub use paise::{Paise, PaiseConversionError, DEFAULT_CURRENCY_CODE, PAISE_PER_RUPEE};
pub use secret::Secret;
