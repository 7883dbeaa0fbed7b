//! # Pricing Module
//!
//! The monetary calculator: pure, deterministic, no I/O.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Pricing Pipeline                             │
//! │                                                                         │
//! │  1. Per line: quantity × unit_price, minus item discount, floor at 0   │
//! │  2. subtotal        = Σ line subtotals                                 │
//! │  3. discount_amount = sale-level discount (percent of subtotal,        │
//! │                       or fixed amount), only when discount > 0         │
//! │  4. after_discount  = max(0, subtotal − discount_amount)               │
//! │  5. tax             = after_discount × tax_rate / 100                  │
//! │  6. total           = after_discount + tax                             │
//! │  7. change          = amount_paid − total   (reject when negative)     │
//! │                                                                         │
//! │  Rounding: each persisted figure is rounded half-up to 2 decimals at   │
//! │  its step; the sale subtotal is the sum of the per-line figures as     │
//! │  they will be stored, so Sale.subtotal always reconciles with the      │
//! │  SaleItem rows.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same functions back the server's authoritative totals and the
//! terminal's advisory pre-check, so the two can never disagree on the math.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, DiscountType};

// =============================================================================
// Outputs
// =============================================================================

/// The priced figures for a set of cart lines, before payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    /// Per-line subtotals, aligned with the input lines, rounded as they
    /// will be stored on the SaleItem rows.
    pub line_subtotals: Vec<Money>,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Totals settled against a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleQuote {
    pub totals: SaleTotals,
    pub amount_paid: Money,
    /// `amount_paid - total`, guaranteed non-negative.
    pub change: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes one line's subtotal: `quantity × unit_price` adjusted by the
/// item discount, floored at zero, rounded to 2 decimals.
///
/// A percentage discount scales the gross amount; a fixed discount is an
/// absolute amount off the whole line. Discounts ≤ 0 are ignored.
pub fn line_subtotal(
    quantity: i64,
    unit_price: Money,
    discount: Decimal,
    discount_type: DiscountType,
) -> Money {
    let gross = unit_price * quantity;

    let discounted = if discount > Decimal::ZERO {
        match discount_type {
            DiscountType::Percentage => gross * (Decimal::ONE - discount / Decimal::ONE_HUNDRED),
            DiscountType::Fixed => gross - Money::new(discount),
        }
    } else {
        gross
    };

    discounted.clamp_non_negative().round2()
}

/// Prices a set of resolved cart lines with a sale-level discount and tax
/// rate. Deterministic: fixed inputs always produce identical figures.
pub fn compute_totals(
    lines: &[CartLine],
    discount: Decimal,
    discount_type: DiscountType,
    tax_rate: Decimal,
) -> SaleTotals {
    let line_subtotals: Vec<Money> = lines
        .iter()
        .map(|line| {
            let (d, dt) = match line {
                CartLine::Inventory {
                    discount,
                    discount_type,
                    ..
                }
                | CartLine::AdHoc {
                    discount,
                    discount_type,
                    ..
                } => (*discount, *discount_type),
            };
            line_subtotal(line.quantity(), line.unit_price(), d, dt)
        })
        .collect();

    let subtotal: Money = line_subtotals
        .iter()
        .fold(Money::zero(), |acc, s| acc + *s);

    let discount_amount = if discount > Decimal::ZERO {
        match discount_type {
            DiscountType::Percentage => (subtotal * (discount / Decimal::ONE_HUNDRED)).round2(),
            DiscountType::Fixed => Money::new(discount).round2(),
        }
    } else {
        Money::zero()
    };

    let after_discount = (subtotal - discount_amount).clamp_non_negative();
    let tax = (after_discount * (tax_rate / Decimal::ONE_HUNDRED)).round2();
    let total = after_discount + tax;

    SaleTotals {
        line_subtotals,
        subtotal,
        discount_amount,
        tax,
        total,
    }
}

/// Settles computed totals against a payment.
///
/// ## Errors
/// `InsufficientPayment` when the payment does not cover the total; the
/// error carries both figures so the cashier sees exactly what is short.
pub fn settle(totals: SaleTotals, amount_paid: Money) -> CoreResult<SaleQuote> {
    let paid = amount_paid.round2();
    let change = paid - totals.total;

    if change.is_negative() {
        return Err(CoreError::InsufficientPayment {
            paid,
            total_due: totals.total,
        });
    }

    Ok(SaleQuote {
        totals,
        amount_paid: paid,
        change,
    })
}

/// Convenience: price and settle in one step.
pub fn quote(
    lines: &[CartLine],
    discount: Decimal,
    discount_type: DiscountType,
    tax_rate: Decimal,
    amount_paid: Money,
) -> CoreResult<SaleQuote> {
    settle(
        compute_totals(lines, discount, discount_type, tax_rate),
        amount_paid,
    )
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

    fn inventory(product_id: i64, qty: i64, price: i64) -> CartLine {
        CartLine::Inventory {
            product_id,
            quantity: qty,
            unit_price: Money::from(price),
            discount: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
        }
    }

    #[test]
    fn line_subtotal_no_discount() {
        let s = line_subtotal(3, Money::from(2500), Decimal::ZERO, DiscountType::Fixed);
        assert_eq!(s.amount(), dec("7500.00"));
    }

    #[test]
    fn line_subtotal_percentage_discount() {
        // 2 × 10000 at 25% off = 15000
        let s = line_subtotal(2, Money::from(10000), dec("25"), DiscountType::Percentage);
        assert_eq!(s.amount(), dec("15000.00"));
    }

    #[test]
    fn line_subtotal_fixed_discount_floors_at_zero() {
        let s = line_subtotal(1, Money::from(500), dec("800"), DiscountType::Fixed);
        assert_eq!(s, Money::zero());
    }

    /// Worked reference case: two lines, 20% sale discount, 10% tax,
    /// paid 500000.
    #[test]
    fn quote_reference_sale() {
        let lines = vec![inventory(1, 2, 100000), inventory(2, 1, 250000)];

        let q = quote(
            &lines,
            dec("20"),
            DiscountType::Percentage,
            dec("10"),
            Money::from(500000),
        )
        .unwrap();

        assert_eq!(q.totals.subtotal.amount(), dec("450000.00"));
        assert_eq!(q.totals.discount_amount.amount(), dec("90000.00"));
        assert_eq!(q.totals.tax.amount(), dec("36000.00"));
        assert_eq!(q.totals.total.amount(), dec("396000.00"));
        assert_eq!(q.change.amount(), dec("104000.00"));
    }

    #[test]
    fn quote_is_deterministic() {
        let lines = vec![inventory(1, 3, 17999), inventory(2, 2, 4250)];
        let a = quote(&lines, dec("5000"), DiscountType::Fixed, dec("11"), Money::from(100000)).unwrap();
        let b = quote(&lines, dec("5000"), DiscountType::Fixed, dec("11"), Money::from(100000)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_discount_larger_than_subtotal_clamps() {
        let lines = vec![inventory(1, 1, 1000)];
        let t = compute_totals(&lines, dec("5000"), DiscountType::Fixed, dec("10"));
        assert_eq!(t.subtotal.amount(), dec("1000.00"));
        // after-discount base floors at 0, so tax and total are 0
        assert_eq!(t.tax, Money::zero());
        assert_eq!(t.total, Money::zero());
    }

    #[test]
    fn zero_discount_is_ignored() {
        let lines = vec![inventory(1, 1, 1000)];
        let t = compute_totals(&lines, Decimal::ZERO, DiscountType::Percentage, Decimal::ZERO);
        assert_eq!(t.discount_amount, Money::zero());
        assert_eq!(t.total.amount(), dec("1000.00"));
    }

    #[test]
    fn settle_rejects_short_payment() {
        let lines = vec![inventory(1, 1, 110000)];
        let err = quote(
            &lines,
            Decimal::ZERO,
            DiscountType::Fixed,
            Decimal::ZERO,
            Money::from(100000),
        )
        .unwrap_err();

        match err {
            CoreError::InsufficientPayment { paid, total_due } => {
                assert_eq!(paid.amount(), dec("100000"));
                assert_eq!(total_due.amount(), dec("110000.00"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn settle_exact_payment_gives_zero_change() {
        let lines = vec![inventory(1, 1, 75000)];
        let q = quote(
            &lines,
            Decimal::ZERO,
            DiscountType::Fixed,
            Decimal::ZERO,
            Money::from(75000),
        )
        .unwrap();
        assert!(q.change.is_zero());
    }

    /// Persisted figures must reconcile: total == round2(subtotal −
    /// discount_amount + tax) for any input.
    #[test]
    fn rounding_round_trip() {
        let lines = vec![
            CartLine::AdHoc {
                name: "Timbang".to_string(),
                sku: None,
                quantity: 1,
                unit_price: Money::new(dec("3333.33")),
                discount: dec("3"),
                discount_type: DiscountType::Percentage,
            },
            inventory(9, 7, 1999),
        ];
        let t = compute_totals(&lines, dec("7.5"), DiscountType::Percentage, dec("11"));
        let reconciled = (t.subtotal - t.discount_amount + t.tax).round2();
        assert_eq!(t.total, reconciled);
    }
}
