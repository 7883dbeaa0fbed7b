//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  sku (unique)   │   │  sale_number    │   │  sale_id (FK)   │       │
//! │  │  price          │   │  totals         │   │  product_id?    │       │
//! │  │  stock          │   │  status         │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountType   │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  fixed          │   │  pending        │   │  cash           │       │
//! │  │  percentage     │   │  completed      │   │  card           │       │
//! │  └─────────────────┘   │  cancelled      │   │  digital_wallet │       │
//! │                        │  refunded       │   │  bank_transfer  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart Line Resolution
//! Checkout requests arrive with loosely-shaped items (`productId` OR a bare
//! `productName`/`name` for ad-hoc charges like plastic bags). [`CartLine`]
//! resolves that shape into an explicit tagged union before any pricing or
//! stock work happens, so downstream code never duck-types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Enums
// =============================================================================

/// How a discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Absolute amount off.
    #[default]
    Fixed,
    /// Percent of the amount it applies to (0-100).
    Percentage,
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    DigitalWallet,
    BankTransfer,
}

/// Lifecycle state of a sale.
///
/// Sales are created directly as `Completed` (the transaction engine commits
/// a finished checkout or nothing at all) and may later transition to
/// `Cancelled`. They are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    /// Parses the lowercase wire/database form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SaleStatus::Pending),
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            "refunded" => Some(SaleStatus::Refunded),
            _ => None,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `stock` is mutated only by the stock ledger inside a sale transaction
/// (decrement on checkout, increment on cancellation) and never goes
/// negative. `min_stock` is advisory for reorder warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    /// Display name shown to cashier and on receipts.
    pub name: String,

    pub category: String,

    /// Unit price.
    pub price: Money,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Advisory reorder threshold.
    pub min_stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// An operator who can be attached to a sale as cashier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
}

// =============================================================================
// Sale
// =============================================================================

/// A completed (or cancelled) checkout transaction.
///
/// Totals are computed server-side by the pricing module and satisfy
/// `total = subtotal - discount_amount + tax` after 2-decimal rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,

    /// `SALE-YYYYMMDD-NNNN`, unique, date-scoped.
    pub sale_number: String,

    pub customer_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,

    /// The authenticated operator who rang up the sale.
    pub cashier_id: i64,

    pub subtotal: Money,

    /// Raw sale-level discount input (amount for `fixed`, percent for
    /// `percentage`).
    pub discount: Decimal,
    pub discount_type: DiscountType,

    pub tax: Money,

    /// Tax rate in percent (0-100).
    pub tax_rate: Decimal,

    pub total: Money,
    pub amount_paid: Money,

    /// `amount_paid - total`, never negative for a persisted sale.
    pub change: Money,

    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub sale_date: DateTime<Utc>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item within a sale. Immutable once written.
///
/// Uses the snapshot pattern: product name/sku/price are frozen at sale time
/// so receipts survive later product edits. `product_id` is `None` for
/// non-inventory charges (plastic bags, ad-hoc items), which bypass the
/// stock ledger entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: Option<i64>,

    /// Name at time of sale (frozen).
    pub product_name: String,

    /// SKU at time of sale (frozen), when the line references a product.
    pub product_sku: Option<String>,

    pub quantity: i64,
    pub unit_price: Money,

    /// Raw per-item discount input.
    pub discount: Decimal,
    pub discount_type: DiscountType,

    /// `quantity × unit_price` adjusted by the item discount, floored at 0,
    /// rounded to 2 decimals.
    pub subtotal: Money,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Checkout Request
// =============================================================================

/// One loosely-shaped item in a checkout request, as received on the wire.
///
/// Resolved into a [`CartLine`] before anything else touches it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleItemInput {
    pub product_id: Option<i64>,

    /// Display name; accepted as either `productName` or `name`.
    #[serde(alias = "name")]
    pub product_name: Option<String>,

    pub product_sku: Option<String>,
    pub quantity: i64,
    pub unit_price: Option<Money>,
    pub discount: Decimal,
    pub discount_type: DiscountType,
}

/// The body of `POST /api/pos/sales`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub items: Vec<SaleItemInput>,

    /// Sale-level discount input.
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,

    /// Tax rate in percent (0-100).
    #[serde(default)]
    pub tax_rate: Decimal,

    pub payment_method: PaymentMethod,

    /// Required; its absence is a business error, not a decode error.
    #[serde(default)]
    pub amount_paid: Option<Money>,

    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Cart Line (resolved)
// =============================================================================

/// An explicitly-resolved checkout line.
///
/// The wire shape allows `productId || productName || name`; this union makes
/// the two legal cases first-class so pricing and the stock ledger never
/// inspect optional fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CartLine {
    /// References a real product; participates in stock validation and
    /// decrement.
    Inventory {
        product_id: i64,
        quantity: i64,
        unit_price: Money,
        discount: Decimal,
        discount_type: DiscountType,
    },
    /// Non-inventory charge (plastic bag, weighed ad-hoc item). Bypasses
    /// stock entirely.
    AdHoc {
        name: String,
        sku: Option<String>,
        quantity: i64,
        unit_price: Money,
        discount: Decimal,
        discount_type: DiscountType,
    },
}

impl CartLine {
    /// Resolves a loosely-shaped wire item into a tagged line.
    ///
    /// ## Errors
    /// `InvalidItemData` when quantity is not positive, unit price is missing
    /// or negative, or the item carries neither a product id nor a name.
    pub fn resolve(input: &SaleItemInput) -> Result<CartLine, CoreError> {
        if input.quantity <= 0 {
            return Err(CoreError::InvalidItemData(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let unit_price = input.unit_price.ok_or_else(|| {
            CoreError::InvalidItemData("unitPrice is required".to_string())
        })?;
        if unit_price.is_negative() {
            return Err(CoreError::InvalidItemData(
                "unitPrice must not be negative".to_string(),
            ));
        }

        if let Some(product_id) = input.product_id {
            return Ok(CartLine::Inventory {
                product_id,
                quantity: input.quantity,
                unit_price,
                discount: input.discount,
                discount_type: input.discount_type,
            });
        }

        let name = input
            .product_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                CoreError::InvalidItemData(
                    "item needs a productId or a productName".to_string(),
                )
            })?;

        Ok(CartLine::AdHoc {
            name: name.to_string(),
            sku: input.product_sku.clone(),
            quantity: input.quantity,
            unit_price,
            discount: input.discount,
            discount_type: input.discount_type,
        })
    }

    /// Quantity of the line, regardless of variant.
    pub fn quantity(&self) -> i64 {
        match self {
            CartLine::Inventory { quantity, .. } | CartLine::AdHoc { quantity, .. } => *quantity,
        }
    }

    /// Unit price of the line, regardless of variant.
    pub fn unit_price(&self) -> Money {
        match self {
            CartLine::Inventory { unit_price, .. } | CartLine::AdHoc { unit_price, .. } => {
                *unit_price
            }
        }
    }

    /// Product id when this is an inventory line.
    pub fn product_id(&self) -> Option<i64> {
        match self {
            CartLine::Inventory { product_id, .. } => Some(*product_id),
            CartLine::AdHoc { .. } => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
