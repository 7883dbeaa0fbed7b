//! # Checkout Flow
//!
//! Assembles the server request from the cart and the store's POS
//! defaults, runs the advisory cash pre-check, and clears the session on
//! a confirmed sale.
//!
//! ## Who Decides What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TERMINAL                           SERVER                              │
//! │  cash display total = round to      stored total = 2-decimal           │
//! │  whole currency unit                half-up                             │
//! │                                                                         │
//! │  pre-check: tendered >= display     check: amountPaid >= stored total  │
//! │  total (advisory, can be stale)     (authoritative)                    │
//! │                                                                         │
//! │  The display rounding never reaches the wire: the request carries the  │
//! │  raw tendered amount and the server prices the cart itself, so the     │
//! │  two roundings cannot produce a mismatch rejection.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasir_core::{CreateSaleRequest, DiscountType, Money, PaymentMethod};

use crate::cart::Cart;
use crate::client::{ApiClient, Receipt, SettingDto};
use crate::error::TerminalError;
use crate::session::TerminalSession;
use crate::store::TerminalStore;

// =============================================================================
// POS Defaults
// =============================================================================

/// Store-wide defaults from the `pos.*` settings category, applied when
/// the cashier does not override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PosDefaults {
    pub tax_rate: Decimal,
    pub default_discount: Decimal,
    pub enable_tax: bool,
    pub enable_discount: bool,
    pub plastic_bag_small_price: Money,
    pub plastic_bag_large_price: Money,
}

impl Default for PosDefaults {
    fn default() -> Self {
        PosDefaults {
            tax_rate: Decimal::ZERO,
            default_discount: Decimal::ZERO,
            enable_tax: true,
            enable_discount: true,
            plastic_bag_small_price: Money::from(200),
            plastic_bag_large_price: Money::from(500),
        }
    }
}

impl PosDefaults {
    /// Builds defaults from the settings rows the server returned.
    /// Unknown keys are ignored; unparsable values keep their default.
    pub fn from_settings(settings: &[SettingDto]) -> Self {
        let mut defaults = PosDefaults::default();

        for setting in settings {
            match setting.key.as_str() {
                "pos.tax_rate" => {
                    if let Ok(v) = setting.value.parse() {
                        defaults.tax_rate = v;
                    }
                }
                "pos.default_discount" => {
                    if let Ok(v) = setting.value.parse() {
                        defaults.default_discount = v;
                    }
                }
                "pos.enable_tax" => defaults.enable_tax = setting.value == "true",
                "pos.enable_discount" => defaults.enable_discount = setting.value == "true",
                "pos.plastic_bag_small_price" => {
                    if let Ok(v) = setting.value.parse::<Decimal>() {
                        defaults.plastic_bag_small_price = Money::new(v);
                    }
                }
                "pos.plastic_bag_large_price" => {
                    if let Ok(v) = setting.value.parse::<Decimal>() {
                        defaults.plastic_bag_large_price = Money::new(v);
                    }
                }
                _ => {}
            }
        }

        defaults
    }
}

// =============================================================================
// Checkout Options
// =============================================================================

/// Cashier inputs for one checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,

    /// Sale-level discount override; falls back to the store default.
    pub discount: Option<Decimal>,
    pub discount_type: DiscountType,

    /// Tax rate override; falls back to the store default.
    pub tax_rate: Option<Decimal>,

    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutOptions {
    /// Plain cash checkout with no overrides.
    pub fn cash(amount_paid: Money) -> Self {
        CheckoutOptions {
            payment_method: PaymentMethod::Cash,
            amount_paid,
            discount: None,
            discount_type: DiscountType::Fixed,
            tax_rate: None,
            customer_name: None,
            notes: None,
        }
    }
}

// =============================================================================
// Cash Pre-check
// =============================================================================

/// Result of the advisory cash sufficiency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashPrecheck {
    /// Tendered cash covers the whole-unit display total.
    Sufficient { display_total: Money, change: Money },
    /// Short by `shortfall` against the display total.
    Short { display_total: Money, shortfall: Money },
}

/// Checks tendered cash against the cart's display total (grand total
/// rounded to the nearest whole currency unit, as shown on the till).
///
/// Advisory only: the wire request carries the raw tendered amount and
/// the server judges sufficiency against its own 2-decimal total.
pub fn cash_precheck(
    cart: &Cart,
    discount: Decimal,
    discount_type: DiscountType,
    tax_rate: Decimal,
    tendered: Money,
) -> CashPrecheck {
    let totals = cart.totals(discount, discount_type, tax_rate);
    let display_total = totals.total.round_whole();

    if tendered >= display_total {
        CashPrecheck::Sufficient {
            display_total,
            change: tendered - display_total,
        }
    } else {
        CashPrecheck::Short {
            display_total,
            shortfall: display_total - tendered,
        }
    }
}

// =============================================================================
// Request Assembly and Submission
// =============================================================================

/// Resolves the effective discount and tax for a checkout. Disabled
/// features force zero regardless of overrides.
fn effective_inputs(defaults: &PosDefaults, options: &CheckoutOptions) -> (Decimal, Decimal) {
    let discount = if defaults.enable_discount {
        options.discount.unwrap_or(defaults.default_discount)
    } else {
        Decimal::ZERO
    };
    let tax_rate = if defaults.enable_tax {
        options.tax_rate.unwrap_or(defaults.tax_rate)
    } else {
        Decimal::ZERO
    };
    (discount, tax_rate)
}

/// Builds the wire request for the cart.
pub fn build_request(
    cart: &Cart,
    defaults: &PosDefaults,
    options: &CheckoutOptions,
) -> CreateSaleRequest {
    let (discount, tax_rate) = effective_inputs(defaults, options);

    CreateSaleRequest {
        items: cart.to_item_inputs(),
        discount,
        discount_type: options.discount_type,
        tax_rate,
        payment_method: options.payment_method,
        amount_paid: Some(options.amount_paid),
        customer_id: None,
        customer_name: options.customer_name.clone(),
        customer_phone: None,
        customer_email: None,
        notes: options.notes.clone(),
    }
}

/// Submits the session's cart as a sale.
///
/// On success the cart is cleared and persisted. On any error, including
/// a server-side rejection, the cart is left exactly as it was so the
/// cashier can fix the problem and retry.
pub async fn checkout<S: TerminalStore>(
    session: &mut TerminalSession<S>,
    client: &ApiClient,
    defaults: &PosDefaults,
    options: &CheckoutOptions,
) -> Result<Receipt, TerminalError> {
    let request = build_request(session.cart(), defaults, options);
    let receipt = client.create_sale(&request).await?;
    session.clear_cart()?;
    Ok(receipt)
}

// =============================================================================
// Unit Tests
// =============================================================================
