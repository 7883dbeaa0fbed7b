//! # kasir-server: REST API for Kasir POS
//!
//! Thin HTTP layer over the kasir-db sale engine and repositories. The
//! server owns nothing but transport concerns: auth, the response
//! envelope, and the mapping from engine errors to HTTP statuses.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal ──HTTP──▶ axum Router                                         │
//! │                        │                                                │
//! │                        ├─ TraceLayer / CorsLayer                        │
//! │                        ├─ AuthUser extractor (bearer JWT)               │
//! │                        ▼                                                │
//! │                     handler ──▶ SaleEngine / repositories (kasir-db)    │
//! │                        │                                                │
//! │                        ▼                                                │
//! │       {success, message, data}  or  {success:false, message, error}    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use kasir_db::Database;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;

pub use config::Config;
pub use error::ApiError;
pub use routes::create_app;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}
