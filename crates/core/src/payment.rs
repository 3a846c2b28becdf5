//! Recorded payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{ClassId, EnrollmentId, PaymentId};

/// A completed payment. Inserted once, never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: PaymentId,
    pub email: String,
    pub class_id: ClassId,
    pub enrollment_id: EnrollmentId,
    pub price: f64,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub date: DateTime<Utc>,
}

/// Convert a decimal price into the provider's minor unit (cents).
///
/// Fractions of a cent are truncated.
pub fn amount_in_cents(price: f64) -> DomainResult<i64> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::validation("price must be a non-negative number"));
    }
    let cents = (price * 100.0).trunc();
    if cents > i64::MAX as f64 {
        return Err(DomainError::validation("price is too large"));
    }
    Ok(cents as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_prices_convert_exactly() {
        assert_eq!(amount_in_cents(12.0).unwrap(), 1200);
        assert_eq!(amount_in_cents(0.0).unwrap(), 0);
    }

    #[test]
    fn sub_cent_fractions_are_truncated() {
        assert_eq!(amount_in_cents(9.999).unwrap(), 999);
    }

    #[test]
    fn negative_and_non_finite_prices_are_rejected() {
        assert!(amount_in_cents(-1.0).is_err());
        assert!(amount_in_cents(f64::NAN).is_err());
        assert!(amount_in_cents(f64::INFINITY).is_err());
    }
}
