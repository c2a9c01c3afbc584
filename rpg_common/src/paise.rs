use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const DEFAULT_CURRENCY_CODE: &str = "INR";
pub const PAISE_PER_RUPEE: i64 = 100;

//--------------------------------------        Paise        ---------------------------------------------------------
/// An amount in the smallest currency unit. The gateway always works in minor units, so all amounts that cross the
/// engine boundary are `Paise`.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Paise(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct PaiseConversionError(String);

impl From<i64> for Paise {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Paise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / PAISE_PER_RUPEE as u64, abs % PAISE_PER_RUPEE as u64)
    }
}

impl Paise {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Converts a whole-rupee amount into paise, failing on overflow.
    pub fn from_rupees(rupees: i64) -> Result<Self, PaiseConversionError> {
        rupees
            .checked_mul(PAISE_PER_RUPEE)
            .map(Self)
            .ok_or_else(|| PaiseConversionError(format!("{rupees} rupees overflows the paise range")))
    }
}
