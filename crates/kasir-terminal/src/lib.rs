//! # kasir-terminal: Cashier Terminal Logic for Kasir POS
//!
//! Client-side state for a till: the cart, the persisted session, and the
//! checkout flow against the Kasir POS server.
//!
//! ## Trust Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Terminal vs Server                                 │
//! │                                                                         │
//! │  TERMINAL (this crate)                SERVER (apps/server)             │
//! │  ──────────────────────               ─────────────────────            │
//! │  cart state, scan debounce            authoritative pricing            │
//! │  advisory stock warnings              stock ledger (guarded)           │
//! │  whole-unit cash display              2-decimal stored totals          │
//! │  cash sufficiency pre-check           payment sufficiency check        │
//! │                                                                         │
//! │  Everything here is convenience; the server re-validates all of it.    │
//! │  A stale stock snapshot or a skipped pre-check can never corrupt a     │
//! │  sale, only produce a later, uglier error for the cashier.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart lines, merge-on-add, scan debounce, quantity editing
//! - [`session`] - Persisted terminal session and device configuration
//! - [`store`] - Session persistence backends (JSON file, in-memory)
//! - [`checkout`] - Request assembly and post-success bookkeeping
//! - [`client`] - HTTP client for the POS API
//! - [`error`] - Terminal error type

pub mod cart;
pub mod checkout;
pub mod client;
pub mod error;
pub mod session;
pub mod store;

pub use cart::{AddOutcome, Cart, CartEntry, DecrementOutcome, LineKey};
pub use checkout::{
    build_request, cash_precheck, checkout, CashPrecheck, CheckoutOptions, PosDefaults,
};
pub use client::{ApiClient, ApiClientConfig, ApiEnvelope, ProductPageDto, Receipt, SettingDto};
pub use error::TerminalError;
pub use session::{DeviceConfig, TerminalSession};
pub use store::{JsonFileStore, MemoryStore, TerminalStore};
