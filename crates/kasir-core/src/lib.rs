//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! This crate is the **heart** of Kasir POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │  kasir-terminal          │      │  apps/server (axum)          │    │
//! │  │  cart, checkout assembly │─────►│  POST /api/pos/sales, ...    │    │
//! │  └────────────┬─────────────┘ HTTP └──────────────┬───────────────┘    │
//! │               │                                   │                    │
//! │  ┌────────────▼───────────────────────────────────▼───────────────┐    │
//! │  │               ★ kasir-core (THIS CRATE) ★                      │    │
//! │  │                                                                │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │    │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │    │
//! │  │   │  Product  │  │   Money   │  │ SaleQuote │  │   rules   │  │    │
//! │  │   │   Sale    │  │ rounding  │  │ discounts │  │  checks   │  │    │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │    │
//! │  │                                                                │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │    │
//! │  └────────────────────────────────┬───────────────────────────────┘    │
//! │                                   │                                    │
//! │  ┌────────────────────────────────▼───────────────────────────────┐    │
//! │  │         kasir-db: sale engine, stock ledger, repositories      │    │
//! │  └────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, CartLine, ...)
//! - [`money`] - Money type with explicit rounding policy
//! - [`pricing`] - The monetary calculator (discounts, tax, change)
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; the server and the
//!    terminal share this math and can never disagree
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Decimal Money**: full precision intermediates, half-up rounding to
//!    2 decimals only at the persistence boundary
//! 4. **Explicit Errors**: all failures are typed variants, never strings
//!    or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasir_core::Money` instead of
// `use kasir_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{SaleQuote, SaleTotals};
pub use types::*;
