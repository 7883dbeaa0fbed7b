//! # Validation Module
//!
//! Field-level input validation for Kasir POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal (advisory)                                          │
//! │  ├── stock snapshot warning, cash sufficiency pre-check                │
//! │  └── immediate cashier feedback, never authoritative                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Server request handling (THIS MODULE + CartLine::resolve)    │
//! │  ├── type validation (deserialization)                                 │
//! │  └── field ranges and business preconditions                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints (sku, sale_number)                  │
//! │  └── CHECK (stock >= 0) backstop                                       │
//! │                                                                         │
//! │  Defense in depth: each layer catches what the one above missed        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::DiscountType;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity (must be strictly positive).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a unit price (zero is allowed for free items).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "unitPrice".to_string(),
        });
    }
    Ok(())
}

/// Validates a payment amount (must be strictly positive).
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amountPaid".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate in percent (0-100).
pub fn validate_tax_rate(rate: Decimal) -> ValidationResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates a discount value against its type.
///
/// Percentage discounts are bounded to 0-100; fixed discounts only need to
/// be non-negative (over-large fixed discounts floor the priced amount at
/// zero rather than failing).
pub fn validate_discount(discount: Decimal, discount_type: DiscountType) -> ValidationResult<()> {
    if discount < Decimal::ZERO {
        return Err(ValidationError::MustBeNonNegative {
            field: "discount".to_string(),
        });
    }
    if discount_type == DiscountType::Percentage && discount > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a search query. Empty queries are allowed (no filter).
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a sale number of the form `SALE-YYYYMMDD-NNNN`.
///
/// The sequence part is 4+ digits (it grows past 9999 rather than wrapping).
pub fn validate_sale_number(sale_number: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "saleNumber".to_string(),
        reason: reason.to_string(),
    };

    let mut parts = sale_number.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("SALE"), Some(date), Some(seq), None) => {
            if date.len() != 8 || !date.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("date part must be 8 digits"));
            }
            if seq.len() < 4 || !seq.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid("sequence part must be at least 4 digits"));
            }
            Ok(())
        }
        _ => Err(invalid("expected SALE-YYYYMMDD-NNNN")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-4).is_err());
    }

    #[test]
    fn unit_price_bounds() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from(200)).is_ok());
        assert!(validate_unit_price(Money::from(-1)).is_err());
    }

    #[test]
    fn payment_amount_bounds() {
        assert!(validate_payment_amount(Money::from(50000)).is_ok());
        assert!(validate_payment_amount(Money::zero()).is_err());
        assert!(validate_payment_amount(Money::from(-1)).is_err());
    }

    #[test]
    fn tax_rate_bounds() {
        assert!(validate_tax_rate(dec("0")).is_ok());
        assert!(validate_tax_rate(dec("11")).is_ok());
        assert!(validate_tax_rate(dec("100")).is_ok());
        assert!(validate_tax_rate(dec("100.01")).is_err());
        assert!(validate_tax_rate(dec("-1")).is_err());
    }

    #[test]
    fn discount_bounds_depend_on_type() {
        assert!(validate_discount(dec("20"), DiscountType::Percentage).is_ok());
        assert!(validate_discount(dec("120"), DiscountType::Percentage).is_err());
        assert!(validate_discount(dec("120"), DiscountType::Fixed).is_ok());
        assert!(validate_discount(dec("-5"), DiscountType::Fixed).is_err());
    }

    #[test]
    fn search_query_trims_and_bounds() {
        assert_eq!(validate_search_query("  kopi  ").unwrap(), "kopi");
        assert!(validate_search_query(&"a".repeat(200)).is_err());
    }

    #[test]
    fn sale_number_format() {
        assert!(validate_sale_number("SALE-20260825-0001").is_ok());
        assert!(validate_sale_number("SALE-20260825-10001").is_ok()); // 5-digit overflow day
        assert!(validate_sale_number("SALE-2026-0001").is_err());
        assert!(validate_sale_number("RCPT-20260825-0001").is_err());
        assert!(validate_sale_number("SALE-20260825-001").is_err());
        assert!(validate_sale_number("SALE-20260825").is_err());
    }
}
