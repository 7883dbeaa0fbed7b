//! # Terminal Session
//!
//! Explicit session context instead of ambient globals: the cart and device
//! configuration live on a [`TerminalSession`] that is loaded once at
//! startup and persisted on every mutation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cart::Cart;
use crate::error::TerminalError;
use crate::store::TerminalStore;

// =============================================================================
// Device Configuration
// =============================================================================

/// Per-terminal hardware and UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfig {
    /// Selected receipt printer, by OS printer name.
    pub printer_name: Option<String>,

    /// Amounts on the cash shortcut buttons.
    pub cash_shortcuts: Vec<i64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            printer_name: None,
            // common IDR note denominations
            cash_shortcuts: vec![5_000, 10_000, 20_000, 50_000, 100_000],
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Everything the terminal persists between restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedState {
    cart: Cart,
    device: DeviceConfig,
}

/// The terminal's session: cart plus device configuration, bound to a
/// persistence backend.
///
/// ## Lifecycle
/// - `load`: read the stored state once at startup; a missing or corrupt
///   blob yields a fresh session (the till must never fail to start over
///   a bad session file)
/// - every mutation goes through [`with_cart`](Self::with_cart) or a
///   setter, which persists before returning
pub struct TerminalSession<S: TerminalStore> {
    state: PersistedState,
    store: S,
}

impl<S: TerminalStore> TerminalSession<S> {
    /// Loads the session from the store, falling back to a fresh one.
    pub fn load(store: S) -> Result<Self, TerminalError> {
        let state = match store.load()? {
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(state) => state,
                Err(err) => {
                    warn!(%err, "Stored session unreadable, starting fresh");
                    PersistedState::default()
                }
            },
            None => PersistedState::default(),
        };

        Ok(TerminalSession { state, store })
    }

    pub fn cart(&self) -> &Cart {
        &self.state.cart
    }

    pub fn device(&self) -> &DeviceConfig {
        &self.state.device
    }

    /// Mutates the cart and persists the session.
    pub fn with_cart<T>(
        &mut self,
        f: impl FnOnce(&mut Cart) -> T,
    ) -> Result<T, TerminalError> {
        let out = f(&mut self.state.cart);
        self.persist()?;
        Ok(out)
    }

    /// Replaces the device configuration and persists.
    pub fn set_device(&mut self, device: DeviceConfig) -> Result<(), TerminalError> {
        self.state.device = device;
        self.persist()
    }

    /// Empties the cart and persists. Called after a confirmed checkout.
    pub fn clear_cart(&mut self) -> Result<(), TerminalError> {
        self.with_cart(|cart| cart.clear())
    }

    fn persist(&self) -> Result<(), TerminalError> {
        let blob = serde_json::to_string(&self.state)?;
        self.store.save(&blob)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use kasir_core::{Money, Product};
    use std::sync::Arc;

    /// MemoryStore shared between two session instances to model restart.
    #[derive(Clone)]
    struct SharedStore(Arc<MemoryStore>);

    impl TerminalStore for SharedStore {
        fn load(&self) -> Result<Option<String>, TerminalError> {
            self.0.load()
        }
        fn save(&self, blob: &str) -> Result<(), TerminalError> {
            self.0.save(blob)
        }
    }

    fn product(id: i64, name: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            sku: format!("SKU-{id:03}"),
            name: name.to_string(),
            category: String::new(),
            price: Money::from(price),
            stock: 10,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_survives_restart() {
        let store = SharedStore(Arc::new(MemoryStore::new()));

        let mut session = TerminalSession::load(store.clone()).unwrap();
        session
            .with_cart(|cart| {
                cart.add_product(&product(1, "Indomie Goreng", 3500));
                cart.add_product(&product(1, "Indomie Goreng", 3500));
            })
            .unwrap();
        session
            .set_device(DeviceConfig {
                printer_name: Some("EPSON TM-T82".to_string()),
                ..DeviceConfig::default()
            })
            .unwrap();

        // "restart": a new session over the same store
        let restored = TerminalSession::load(store).unwrap();
        assert_eq!(restored.cart().len(), 1);
        assert_eq!(restored.cart().lines[0].quantity, 2);
        assert_eq!(restored.device().printer_name.as_deref(), Some("EPSON TM-T82"));
    }

    #[test]
    fn corrupt_blob_starts_fresh() {
        let store = MemoryStore::new();
        store.save("not json at all {{{").unwrap();

        let session = TerminalSession::load(store).unwrap();
        assert!(session.cart().is_empty());
        assert_eq!(session.device().cash_shortcuts, vec![5_000, 10_000, 20_000, 50_000, 100_000]);
    }

    #[test]
    fn clear_cart_persists_empty_state() {
        let store = SharedStore(Arc::new(MemoryStore::new()));

        let mut session = TerminalSession::load(store.clone()).unwrap();
        session
            .with_cart(|cart| {
                cart.add_product(&product(2, "Teh Botol", 5000));
            })
            .unwrap();
        session.clear_cart().unwrap();

        let restored = TerminalSession::load(store).unwrap();
        assert!(restored.cart().is_empty());
    }
}
