//! # Cart State
//!
//! The cashier's in-progress cart: an ordered list of lines keyed by
//! product id (or by name for ad-hoc charges).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action            Operation              Cart Change           │
//! │  ──────────────            ─────────              ───────────           │
//! │  Scan barcode ───────────► scan() ──────────────► merge-add (debounced) │
//! │  Tap product tile ───────► add_product() ───────► merge-add             │
//! │  Add plastic bag ────────► add_ad_hoc() ────────► merge-add by name     │
//! │  Tap + ──────────────────► increment(i) ────────► qty + 1               │
//! │  Tap − ──────────────────► decrement(i) ────────► qty − 1, or ask to    │
//! │                                                   remove at qty 1       │
//! │  Type quantity ──────────► set_quantity(i, n) ──► qty = n (0 removes)   │
//! │  Tap remove / clear ─────► remove(i) / clear() ─► line(s) gone          │
//! │                                                                         │
//! │  Stock guards here are ADVISORY: they warn from a snapshot taken at    │
//! │  add-time and never block. The server's stock ledger is the authority. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasir_core::{pricing, CartLine, DiscountType, Money, Product, SaleItemInput, SaleTotals};

/// Window within which a repeated scan of the same SKU is treated as
/// scanner bounce, not intent to add two.
pub const SCAN_DEBOUNCE: Duration = Duration::from_millis(300);

// =============================================================================
// Line Identity
// =============================================================================

/// What a cart line is keyed by. Two adds with the same key merge into one
/// line with a higher quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LineKey {
    /// A real product; the line will decrement stock at checkout.
    Product { id: i64 },
    /// Ad-hoc charge (plastic bag, weighed goods) keyed by display name.
    AdHoc { name: String },
}

// =============================================================================
// Cart Entry
// =============================================================================

/// One line in the cart.
///
/// Name, SKU and price are frozen at add-time, so the cart stays consistent
/// even if the catalog changes underneath it. For weighed goods the
/// `unit_price` already incorporates the weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub key: LineKey,
    pub name: String,
    pub sku: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,

    /// Stock available when the line was added. Advisory only.
    pub max_stock: Option<i64>,

    /// Plastic bag lines get special placement on receipts.
    #[serde(default)]
    pub is_plastic_bag: bool,

    /// Per-item discount input.
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
}

impl CartEntry {
    fn from_product(product: &Product) -> Self {
        CartEntry {
            key: LineKey::Product { id: product.id },
            name: product.name.clone(),
            sku: Some(product.sku.clone()),
            unit_price: product.price,
            quantity: 1,
            max_stock: Some(product.stock),
            is_plastic_bag: false,
            discount: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
        }
    }
}

// =============================================================================
// Operation Outcomes
// =============================================================================

/// What happened on an add or increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created.
    Added,
    /// Quantity merged into an existing line.
    Merged,
    /// Merged, but the quantity now exceeds the stock snapshot. The UI
    /// shows a warning; checkout will let the server decide.
    StockWarning { available: i64 },
    /// Repeated scan of the same SKU inside the debounce window; ignored.
    DebouncedDuplicate,
}

/// What happened on a decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    Decremented,
    /// Quantity is 1: removing the last unit needs cashier confirmation.
    /// The line is untouched; call `remove` after the confirmation.
    ConfirmRemoval,
    /// Index out of range.
    NoSuchLine,
}

// =============================================================================
// Cart
// =============================================================================

/// The terminal's cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub lines: Vec<CartEntry>,

    /// Last barcode scan, for debounce. Not persisted: a restored session
    /// starts with a clean scan window.
    #[serde(skip)]
    last_scan: Option<(String, Instant)>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Adds a product, merging into an existing line when present.
    pub fn add_product(&mut self, product: &Product) -> AddOutcome {
        let key = LineKey::Product { id: product.id };

        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity += 1;
            return match line.max_stock {
                Some(available) if line.quantity > available => {
                    AddOutcome::StockWarning { available }
                }
                _ => AddOutcome::Merged,
            };
        }

        self.lines.push(CartEntry::from_product(product));
        if product.stock < 1 {
            AddOutcome::StockWarning {
                available: product.stock,
            }
        } else {
            AddOutcome::Added
        }
    }

    /// Handles a barcode scan: like [`add_product`](Self::add_product), but
    /// a repeat of the same SKU within [`SCAN_DEBOUNCE`] is dropped as
    /// scanner bounce.
    pub fn scan(&mut self, product: &Product) -> AddOutcome {
        self.scan_at(product, Instant::now())
    }

    /// Scan with an explicit clock, for tests.
    pub fn scan_at(&mut self, product: &Product, at: Instant) -> AddOutcome {
        if let Some((sku, when)) = &self.last_scan {
            if *sku == product.sku && at.duration_since(*when) < SCAN_DEBOUNCE {
                return AddOutcome::DebouncedDuplicate;
            }
        }
        self.last_scan = Some((product.sku.clone(), at));
        self.add_product(product)
    }

    /// Adds an ad-hoc line (plastic bag, weighed goods), merging by name.
    pub fn add_ad_hoc(
        &mut self,
        name: &str,
        unit_price: Money,
        quantity: i64,
        is_plastic_bag: bool,
    ) -> AddOutcome {
        let key = LineKey::AdHoc {
            name: name.to_string(),
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.quantity += quantity.max(1);
            return AddOutcome::Merged;
        }

        self.lines.push(CartEntry {
            key,
            name: name.to_string(),
            sku: None,
            unit_price,
            quantity: quantity.max(1),
            max_stock: None,
            is_plastic_bag,
            discount: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
        });
        AddOutcome::Added
    }

    /// Increments the line at `index` by one. `None` for a bad index.
    pub fn increment(&mut self, index: usize) -> Option<AddOutcome> {
        let line = self.lines.get_mut(index)?;
        line.quantity += 1;
        Some(match line.max_stock {
            Some(available) if line.quantity > available => {
                AddOutcome::StockWarning { available }
            }
            _ => AddOutcome::Merged,
        })
    }

    /// Decrements the line at `index` by one. The last unit is never
    /// removed silently.
    pub fn decrement(&mut self, index: usize) -> DecrementOutcome {
        match self.lines.get_mut(index) {
            None => DecrementOutcome::NoSuchLine,
            Some(line) if line.quantity <= 1 => DecrementOutcome::ConfirmRemoval,
            Some(line) => {
                line.quantity -= 1;
                DecrementOutcome::Decremented
            }
        }
    }

    /// Sets a line's quantity directly. Zero or negative removes the line.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) {
        if index >= self.lines.len() {
            return;
        }
        if quantity <= 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = quantity;
        }
    }

    /// Removes the line at `index`.
    pub fn remove(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    /// Clears the whole cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_scan = None;
    }

    /// The cart as resolved pricing lines.
    pub fn to_cart_lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .map(|line| match &line.key {
                LineKey::Product { id } => CartLine::Inventory {
                    product_id: *id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                    discount_type: line.discount_type,
                },
                LineKey::AdHoc { name } => CartLine::AdHoc {
                    name: name.clone(),
                    sku: line.sku.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                    discount_type: line.discount_type,
                },
            })
            .collect()
    }

    /// The cart as wire-shaped checkout items.
    pub fn to_item_inputs(&self) -> Vec<SaleItemInput> {
        self.lines
            .iter()
            .map(|line| SaleItemInput {
                product_id: match &line.key {
                    LineKey::Product { id } => Some(*id),
                    LineKey::AdHoc { .. } => None,
                },
                product_name: Some(line.name.clone()),
                product_sku: line.sku.clone(),
                quantity: line.quantity,
                unit_price: Some(line.unit_price),
                discount: line.discount,
                discount_type: line.discount_type,
            })
            .collect()
    }

    /// Prices the cart for display with the same math the server uses.
    pub fn totals(
        &self,
        discount: Decimal,
        discount_type: DiscountType,
        tax_rate: Decimal,
    ) -> SaleTotals {
        pricing::compute_totals(&self.to_cart_lines(), discount, discount_type, tax_rate)
    }

}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: i64, sku: &str, name: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            sku: sku.to_string(),
            name: name.to_string(),
            category: "Umum".to_string(),
            price: Money::from(price),
            stock,
            min_stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn add_merges_same_product() {
        let mut cart = Cart::new();
        let indomie = product(1, "SKU-001", "Indomie Goreng", 3500, 50);

        assert_eq!(cart.add_product(&indomie), AddOutcome::Added);
        assert_eq!(cart.add_product(&indomie), AddOutcome::Merged);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn add_past_snapshot_warns_but_does_not_block() {
        let mut cart = Cart::new();
        let last_one = product(2, "SKU-002", "Teh Botol", 5000, 1);

        assert_eq!(cart.add_product(&last_one), AddOutcome::Added);
        assert_eq!(
            cart.add_product(&last_one),
            AddOutcome::StockWarning { available: 1 }
        );
        // the line still incremented; the server has the final say
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn rapid_rescan_is_debounced() {
        let mut cart = Cart::new();
        let indomie = product(1, "SKU-001", "Indomie Goreng", 3500, 50);
        let t0 = Instant::now();

        assert_eq!(cart.scan_at(&indomie, t0), AddOutcome::Added);
        assert_eq!(
            cart.scan_at(&indomie, t0 + Duration::from_millis(100)),
            AddOutcome::DebouncedDuplicate
        );
        assert_eq!(cart.lines[0].quantity, 1);

        // past the window the same SKU adds normally
        assert_eq!(
            cart.scan_at(&indomie, t0 + Duration::from_millis(600)),
            AddOutcome::Merged
        );
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn different_sku_scans_are_not_debounced() {
        let mut cart = Cart::new();
        let a = product(1, "SKU-001", "Indomie Goreng", 3500, 50);
        let b = product(2, "SKU-002", "Teh Botol", 5000, 20);
        let t0 = Instant::now();

        cart.scan_at(&a, t0);
        assert_eq!(cart.scan_at(&b, t0 + Duration::from_millis(50)), AddOutcome::Added);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn ad_hoc_lines_merge_by_name() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_ad_hoc("Kantong Plastik Kecil", Money::from(200), 1, true),
            AddOutcome::Added
        );
        assert_eq!(
            cart.add_ad_hoc("Kantong Plastik Kecil", Money::from(200), 2, true),
            AddOutcome::Merged
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);
        assert!(cart.lines[0].is_plastic_bag);
        assert_eq!(cart.lines[0].max_stock, None);
    }

    #[test]
    fn decrement_asks_before_removing_last_unit() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "SKU-001", "Indomie Goreng", 3500, 50));
        assert_eq!(cart.increment(0), Some(AddOutcome::Merged));

        assert_eq!(cart.decrement(0), DecrementOutcome::Decremented);
        assert_eq!(cart.decrement(0), DecrementOutcome::ConfirmRemoval);
        assert_eq!(cart.lines[0].quantity, 1);

        cart.remove(0);
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "SKU-001", "Indomie Goreng", 3500, 50));

        cart.set_quantity(0, 7);
        assert_eq!(cart.lines[0].quantity, 7);

        cart.set_quantity(0, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_match_server_math() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "SKU-001", "Indomie Goreng", 3500, 50));
        cart.set_quantity(0, 2);
        cart.add_ad_hoc("Kantong Plastik Kecil", Money::from(200), 1, true);

        let totals = cart.totals(Decimal::ZERO, DiscountType::Fixed, Decimal::ZERO);
        assert_eq!(totals.subtotal, Money::from(7200));
        assert_eq!(totals.total, Money::from(7200));
    }

    #[test]
    fn item_inputs_carry_identity() {
        let mut cart = Cart::new();
        cart.add_product(&product(1, "SKU-001", "Indomie Goreng", 3500, 50));
        cart.add_ad_hoc("Timbang Gula", Money::new("3333.33".parse().unwrap()), 1, false);

        let inputs = cart.to_item_inputs();
        assert_eq!(inputs[0].product_id, Some(1));
        assert_eq!(inputs[0].product_sku.as_deref(), Some("SKU-001"));
        assert_eq!(inputs[1].product_id, None);
        assert_eq!(inputs[1].product_name.as_deref(), Some("Timbang Gula"));
    }
}
