//! Business-rule validation for e-invoices.
//!
//! The gate only inspects. Uniqueness of document numbers belongs to the
//! storage layer, and buyer fields and dates are not checked here.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::EInvoice;

/// 2 digits, 5 letters, 4 digits, 1 letter, 1 alphanumeric, `Z`, 1 alphanumeric.
static GSTIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][0-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid seller GSTIN format")]
    InvalidSellerGstin,

    #[error("quantity cannot be negative")]
    NegativeQuantity { line: usize },

    #[error("unit price must be greater than zero")]
    NonPositiveUnitPrice { line: usize },
}

impl ValidationError {
    /// JSON path of the offending field.
    pub fn field(&self) -> String {
        match self {
            ValidationError::InvalidSellerGstin => "SellerDtls.Gstin".to_string(),
            ValidationError::NegativeQuantity { line } => format!("ItemList[{}].Qty", line),
            ValidationError::NonPositiveUnitPrice { line } => {
                format!("ItemList[{}].UnitPrice", line)
            }
        }
    }
}

pub fn is_valid_gstin(gstin: &str) -> bool {
    GSTIN_PATTERN.is_match(gstin)
}

/// Check the seller GSTIN, then every item in order; the first violation wins.
pub fn validate(invoice: &EInvoice) -> Result<(), ValidationError> {
    if !is_valid_gstin(invoice.seller_gstin()) {
        return Err(ValidationError::InvalidSellerGstin);
    }

    for (line, item) in invoice.item_list.iter().enumerate() {
        if item.qty < 0.0 {
            return Err(ValidationError::NegativeQuantity { line });
        }
        // NaN fails this comparison too
        if !(item.unit_price > 0.0) {
            return Err(ValidationError::NonPositiveUnitPrice { line });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gstin_pattern_edges() {
        assert!(is_valid_gstin("27AADCS0472N1Z1"));
        assert!(is_valid_gstin("06AABCS1234ZAZZ"));
        assert!(!is_valid_gstin("27aadcs0472n1z1"));
        assert!(!is_valid_gstin("27AADCS0472N1X1"));
        assert!(!is_valid_gstin("27AADCS0472N1Z12"));
        assert!(!is_valid_gstin(""));
    }

    #[test]
    fn field_names_point_at_line() {
        assert_eq!(
            ValidationError::NonPositiveUnitPrice { line: 2 }.field(),
            "ItemList[2].UnitPrice"
        );
    }
}
