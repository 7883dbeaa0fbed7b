//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (checkout taxonomy)     │
//! │  └── ValidationError  - Field-level input validation failures          │
//! │                                                                         │
//! │  kasir-db errors (separate crate)                                      │
//! │  ├── DbError          - Storage failures                               │
//! │  └── EngineError      - Business | Storage, from the sale engine       │
//! │                                                                         │
//! │  apps/server                                                           │
//! │  └── ApiError         - HTTP status + response envelope                │
//! │                                                                         │
//! │  Flow: CoreError → EngineError → ApiError → cashier-facing message     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, not manual impls
//! 2. Messages carry the figures the cashier needs (product name, amounts)
//! 3. Errors are enum variants, never bare strings
//! 4. Business failures are values; the transaction layer rolls back on any
//!    `Err` before it is returned

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures raised while creating or cancelling a sale.
///
/// Every variant surfaced during `create_sale`/`cancel_sale` implies a full
/// transaction rollback: no Sale, no SaleItem, no stock mutation survives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout submitted with no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// An item lacks quantity, unit price, or identity
    /// (productId / productName).
    #[error("Invalid item data: {0}")]
    InvalidItemData(String),

    /// `amountPaid` absent or not positive.
    #[error("Payment amount is required and must be greater than zero")]
    MissingPayment,

    /// Referenced product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Requested quantity exceeds current stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 1000)
    ///      │
    ///      ▼
    /// Stock ledger: available = 50
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Indomie Goreng", available: 50, requested: 1000 }
    ///      │
    ///      ▼
    /// Terminal shows: "Insufficient stock for Indomie Goreng.
    ///                  Available: 50, Requested: 1000"
    /// ```
    #[error("Insufficient stock for {name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// `amountPaid` is less than the computed total.
    #[error("Insufficient payment. Paid: {paid}, Total due: {total_due}")]
    InsufficientPayment { paid: Money, total_due: Money },

    /// Sale id does not exist (cancellation).
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// Sale is already cancelled; cancelling twice never double-restores
    /// stock.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(i64),

    /// Field-level validation failure.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of its allowed range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., malformed sale number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
