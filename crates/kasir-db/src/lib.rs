//! # kasir-db: Database Layer for Kasir POS
//!
//! SQLite storage for Kasir POS, built on sqlx. Hosts the sale transaction
//! engine: the only code path allowed to write sales or mutate stock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/pos/sales)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │   Database   │   │  SaleEngine   │   │   Repositories   │  │   │
//! │  │   │  (pool.rs)   │   │  (engine.rs)  │   │  product / sale  │  │   │
//! │  │   │              │   │               │   │  settings / user │  │   │
//! │  │   │  SqlitePool  │◄──│  one tx per   │◄──│  read paths,     │  │   │
//! │  │   │  WAL mode    │   │  checkout     │   │  listings        │  │   │
//! │  │   └──────────────┘   └───────┬───────┘   └──────────────────┘  │   │
//! │  │                              │                                  │   │
//! │  │              ┌───────────────┴───────────────┐                 │   │
//! │  │              ▼                               ▼                 │   │
//! │  │   ┌──────────────────┐           ┌──────────────────────┐     │   │
//! │  │   │   stock ledger   │           │ sale number generator│     │   │
//! │  │   │   (stock.rs)     │           │  (sale_number.rs)    │     │   │
//! │  │   └──────────────────┘           └──────────────────────┘     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL, foreign keys on)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - `DbError` and the engine's combined `EngineError`
//! - [`engine`] - Atomic sale creation and cancellation
//! - [`stock`] - Guarded stock decrement / restore primitives
//! - [`sale_number`] - Date-scoped sale number generation
//! - [`repository`] - Read-side repositories (product, sale, settings, user)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/kasir.db")).await?;
//! let receipt = db.sale_engine().create_sale(&request, cashier_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sale_number;
pub mod stock;

mod rows;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SaleEngine;
pub use error::{DbError, DbResult, EngineError};
pub use pool::{Database, DbConfig};

pub use repository::product::{NewProduct, ProductListParams, ProductPage, ProductRepository};
pub use repository::sale::{
    SaleListParams, SalePage, SaleRepository, SaleWithItems, SalesSummary, SummaryPeriod,
};
pub use repository::settings::{Setting, SettingsRepository};
pub use repository::user::UserRepository;
