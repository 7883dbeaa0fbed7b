//! # Sale Transaction Engine
//!
//! Atomic sale creation and cancellation. This is the only code path that
//! writes sale rows or mutates stock.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 create_sale: one transaction, all or nothing            │
//! │                                                                         │
//! │  Pre-flight (no database)                                              │
//! │  ├── reject empty cart                                                 │
//! │  ├── resolve loose items into CartLines                                │
//! │  └── require a positive payment amount                                 │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │  ├── 1. snapshot products  → name/sku frozen, stock pre-checked        │
//! │  ├── 2. price + settle     → totals, change (pure, kasir-core)         │
//! │  ├── 3. next sale number   → COUNT of today's sales + 1                │
//! │  ├── 4. INSERT sale        → status = completed                        │
//! │  ├── 5. INSERT sale_items  → snapshot rows                             │
//! │  └── 6. guarded decrement  → per inventory line                        │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction → automatic rollback:   │
//! │  no sale, no items, no stock change. A sale number UNIQUE collision    │
//! │  (concurrent checkout) retries the whole transaction with a number     │
//! │  reissued past the day's highest issued sequence.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use kasir_core::{
    pricing, validation, CartLine, CoreError, CreateSaleRequest, Money, Sale, SaleStatus,
};

use crate::error::{DbError, EngineError};
use crate::repository::sale::{SaleRepository, SaleWithItems};
use crate::rows::sale_from_row;
use crate::sale_number;
use crate::stock;

/// Attempts per checkout before giving up on sale number collisions. Each
/// retry reissues past the day's highest issued sequence, so only a
/// sustained pathological race can exhaust this.
const MAX_SALE_NUMBER_RETRIES: u32 = 3;

/// Per-line product snapshot taken inside the transaction.
struct LineSnapshot {
    product_id: Option<i64>,
    name: String,
    sku: Option<String>,
}

/// The sale transaction engine.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    /// Creates a new SaleEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Creates a completed sale atomically.
    ///
    /// Validates the request, prices the cart, generates a sale number,
    /// writes the sale with its line items and decrements stock for every
    /// inventory line, all in a single transaction.
    ///
    /// ## Errors
    /// Business failures (`EmptyCart`, `InvalidItemData`, `MissingPayment`,
    /// `ProductNotFound`, `InsufficientStock`, `InsufficientPayment`) and
    /// storage failures both roll the transaction back; on any `Err` the
    /// database is exactly as it was before the call.
    pub async fn create_sale(
        &self,
        request: &CreateSaleRequest,
        cashier_id: i64,
    ) -> Result<SaleWithItems, EngineError> {
        // Pre-flight checks need no database access.
        if request.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let lines = request
            .items
            .iter()
            .map(CartLine::resolve)
            .collect::<Result<Vec<_>, CoreError>>()?;

        let amount_paid = match request.amount_paid {
            Some(paid) if paid.is_positive() => paid,
            _ => return Err(CoreError::MissingPayment.into()),
        };

        validation::validate_tax_rate(request.tax_rate).map_err(CoreError::from)?;
        validation::validate_discount(request.discount, request.discount_type)
            .map_err(CoreError::from)?;
        for item in &request.items {
            validation::validate_discount(item.discount, item.discount_type)
                .map_err(CoreError::from)?;
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            // After a collision the number is reissued from the day's highest
            // issued sequence instead of the count, so the losing proposal is
            // never repeated.
            match self
                .try_create(&lines, request, amount_paid, cashier_id, attempt > 1)
                .await
            {
                Err(EngineError::Db(err))
                    if err.is_unique_violation_on("sale_number")
                        && attempt < MAX_SALE_NUMBER_RETRIES =>
                {
                    warn!(attempt, "Sale number collision, retrying checkout");
                    continue;
                }
                other => return other,
            }
        }
    }

    /// One transactional checkout attempt.
    async fn try_create(
        &self,
        lines: &[CartLine],
        request: &CreateSaleRequest,
        amount_paid: Money,
        cashier_id: i64,
        reissue_number: bool,
    ) -> Result<SaleWithItems, EngineError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Snapshot product identity for every line. Inventory lines also get
        // a friendly stock pre-check; the guarded decrement below remains
        // the authority under concurrency.
        let mut snapshots = Vec::with_capacity(lines.len());
        for line in lines {
            match line {
                CartLine::Inventory {
                    product_id,
                    quantity,
                    ..
                } => {
                    let row: Option<(String, Option<String>, i64)> = sqlx::query_as(
                        "SELECT name, sku, stock FROM products WHERE id = ?1",
                    )
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

                    let (name, sku, available) =
                        row.ok_or(CoreError::ProductNotFound(*product_id))?;

                    if available < *quantity {
                        return Err(CoreError::InsufficientStock {
                            name,
                            available,
                            requested: *quantity,
                        }
                        .into());
                    }

                    snapshots.push(LineSnapshot {
                        product_id: Some(*product_id),
                        name,
                        sku,
                    });
                }
                CartLine::AdHoc { name, sku, .. } => {
                    snapshots.push(LineSnapshot {
                        product_id: None,
                        name: name.clone(),
                        sku: sku.clone(),
                    });
                }
            }
        }

        let quote = pricing::quote(
            lines,
            request.discount,
            request.discount_type,
            request.tax_rate,
            amount_paid,
        )?;

        let number = if reissue_number {
            sale_number::reissue_sale_number(&mut tx, now).await?
        } else {
            sale_number::next_sale_number(&mut tx, now).await?
        };
        debug!(sale_number = %number, total = %quote.totals.total, "Inserting sale");

        let result = sqlx::query(
            "INSERT INTO sales ( \
                sale_number, customer_id, customer_name, customer_phone, customer_email, \
                cashier_id, subtotal, discount, discount_type, tax, tax_rate, \
                total, amount_paid, change, payment_method, status, notes, \
                sale_date, created_at, updated_at \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18, ?18)",
        )
        .bind(&number)
        .bind(request.customer_id)
        .bind(&request.customer_name)
        .bind(&request.customer_phone)
        .bind(&request.customer_email)
        .bind(cashier_id)
        .bind(money_text(quote.totals.subtotal))
        .bind(request.discount.to_string())
        .bind(request.discount_type)
        .bind(money_text(quote.totals.tax))
        .bind(request.tax_rate.to_string())
        .bind(money_text(quote.totals.total))
        .bind(money_text(quote.amount_paid))
        .bind(money_text(quote.change))
        .bind(request.payment_method)
        .bind(SaleStatus::Completed)
        .bind(&request.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let sale_id = result.last_insert_rowid();

        for ((line, snapshot), subtotal) in lines
            .iter()
            .zip(&snapshots)
            .zip(&quote.totals.line_subtotals)
        {
            let (discount, discount_type) = match line {
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

            sqlx::query(
                "INSERT INTO sale_items ( \
                    sale_id, product_id, product_name, product_sku, quantity, \
                    unit_price, discount, discount_type, subtotal, created_at \
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(sale_id)
            .bind(snapshot.product_id)
            .bind(&snapshot.name)
            .bind(&snapshot.sku)
            .bind(line.quantity())
            .bind(money_text(line.unit_price()))
            .bind(discount.to_string())
            .bind(discount_type)
            .bind(money_text(*subtotal))
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        for line in lines {
            if let CartLine::Inventory {
                product_id,
                quantity,
                ..
            } = line
            {
                stock::decrement(&mut tx, *product_id, *quantity, now).await?;
            }
        }

        tx.commit().await?;

        info!(
            sale_id,
            sale_number = %number,
            total = %quote.totals.total,
            "Sale completed"
        );

        SaleRepository::new(self.pool.clone())
            .get_with_items(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id).into())
    }

    /// Cancels a completed sale and restores stock for its inventory lines.
    ///
    /// Cancellation is idempotent-guarded: a second attempt fails with
    /// `AlreadyCancelled` and never restores stock twice. Lines whose
    /// product has since been deleted are skipped with a warning.
    pub async fn cancel_sale(
        &self,
        sale_id: i64,
        reason: Option<&str>,
    ) -> Result<Sale, EngineError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query("SELECT * FROM sales WHERE id = ?1")
            .bind(sale_id)
            .try_map(|row| sale_from_row(&row))
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::SaleNotFound(sale_id))?;

        if sale.status == SaleStatus::Cancelled {
            return Err(CoreError::AlreadyCancelled(sale_id).into());
        }

        let items: Vec<(Option<i64>, i64)> =
            sqlx::query_as("SELECT product_id, quantity FROM sale_items WHERE sale_id = ?1")
                .bind(sale_id)
                .fetch_all(&mut *tx)
                .await?;

        for (product_id, quantity) in items {
            if let Some(product_id) = product_id {
                stock::restore(&mut tx, product_id, quantity, now).await?;
            }
        }

        let notes = match (sale.notes.as_deref(), reason) {
            (Some(existing), Some(reason)) => Some(format!("{existing} | Cancelled: {reason}")),
            (None, Some(reason)) => Some(format!("Cancelled: {reason}")),
            (existing, None) => existing.map(str::to_string),
        };

        sqlx::query("UPDATE sales SET status = ?2, notes = ?3, updated_at = ?4 WHERE id = ?1")
            .bind(sale_id)
            .bind(SaleStatus::Cancelled)
            .bind(&notes)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id, sale_number = %sale.sale_number, "Sale cancelled");

        Ok(Sale {
            status: SaleStatus::Cancelled,
            notes,
            updated_at: now,
            ..sale
        })
    }
}

/// Monetary values are stored as TEXT decimals, pre-rounded to 2 places.
fn money_text(value: Money) -> String {
    value.round2().amount().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use kasir_core::{DiscountType, PaymentMethod, Product, SaleItemInput, User};
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// In-memory database with one cashier and two stocked products.
    async fn fixture() -> (Database, User, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cashier = db.users().create("siti", "Siti Rahma").await.unwrap();

        let indomie = db
            .products()
            .insert(&NewProduct {
                sku: "SKU-001".to_string(),
                name: "Indomie Goreng".to_string(),
                category: "Makanan".to_string(),
                price: Money::from(3500),
                stock: 50,
                min_stock: 5,
            })
            .await
            .unwrap();

        let teh = db
            .products()
            .insert(&NewProduct {
                sku: "SKU-002".to_string(),
                name: "Teh Botol".to_string(),
                category: "Minuman".to_string(),
                price: Money::from(5000),
                stock: 10,
                min_stock: 2,
            })
            .await
            .unwrap();

        (db, cashier, indomie, teh)
    }

    fn inventory_item(product: &Product, quantity: i64) -> SaleItemInput {
        SaleItemInput {
            product_id: Some(product.id),
            quantity,
            unit_price: Some(product.price),
            ..SaleItemInput::default()
        }
    }

    fn cash_request(items: Vec<SaleItemInput>, amount_paid: i64) -> CreateSaleRequest {
        CreateSaleRequest {
            items,
            discount: Decimal::ZERO,
            discount_type: DiscountType::Fixed,
            tax_rate: Decimal::ZERO,
            payment_method: PaymentMethod::Cash,
            amount_paid: Some(Money::from(amount_paid)),
            customer_id: None,
            customer_name: None,
            customer_phone: None,
            customer_email: None,
            notes: None,
        }
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn checkout_happy_path() {
        let (db, cashier, indomie, teh) = fixture().await;
        let engine = db.sale_engine();

        // 2 × 3500 + 1 × 5000 + ad-hoc bag 200 = 12200
        let mut request = cash_request(
            vec![
                inventory_item(&indomie, 2),
                inventory_item(&teh, 1),
                SaleItemInput {
                    product_name: Some("Kantong Plastik Kecil".to_string()),
                    quantity: 1,
                    unit_price: Some(Money::from(200)),
                    ..SaleItemInput::default()
                },
            ],
            15000,
        );
        request.customer_name = Some("Budi".to_string());

        let receipt = engine.create_sale(&request, cashier.id).await.unwrap();

        assert_eq!(receipt.sale.status, SaleStatus::Completed);
        assert_eq!(receipt.sale.subtotal.amount(), dec("12200.00"));
        assert_eq!(receipt.sale.total.amount(), dec("12200.00"));
        assert_eq!(receipt.sale.change.amount(), dec("2800.00"));
        assert_eq!(receipt.sale.customer_name.as_deref(), Some("Budi"));
        assert_eq!(receipt.items.len(), 3);
        assert_eq!(receipt.cashier.as_ref().unwrap().id, cashier.id);

        // sale number is scoped to the local date with a 4-digit sequence
        let expected_prefix = format!("SALE-{}", chrono::Local::now().format("%Y%m%d"));
        assert!(receipt.sale.sale_number.starts_with(&expected_prefix));
        assert!(receipt.sale.sale_number.ends_with("-0001"));

        // stock moved only for inventory lines
        assert_eq!(stock_of(&db, indomie.id).await, 48);
        assert_eq!(stock_of(&db, teh.id).await, 9);

        // the ad-hoc line is a frozen snapshot with no product reference
        let bag = &receipt.items[2];
        assert_eq!(bag.product_id, None);
        assert_eq!(bag.product_name, "Kantong Plastik Kecil");
    }

    #[tokio::test]
    async fn checkout_with_discount_and_tax() {
        let (db, cashier, indomie, _) = fixture().await;
        let engine = db.sale_engine();

        // 10 × 3500 = 35000, 20% off = 28000, 10% tax = 2800, total 30800
        let mut request = cash_request(vec![inventory_item(&indomie, 10)], 50000);
        request.discount = dec("20");
        request.discount_type = DiscountType::Percentage;
        request.tax_rate = dec("10");

        let receipt = engine.create_sale(&request, cashier.id).await.unwrap();

        assert_eq!(receipt.sale.subtotal.amount(), dec("35000.00"));
        assert_eq!(receipt.sale.tax.amount(), dec("2800.00"));
        assert_eq!(receipt.sale.total.amount(), dec("30800.00"));
        assert_eq!(receipt.sale.change.amount(), dec("19200.00"));
        assert_eq!(receipt.sale.discount, dec("20"));
        assert_eq!(receipt.sale.discount_type, DiscountType::Percentage);
        assert_eq!(receipt.sale.tax_rate, dec("10"));
    }

    #[tokio::test]
    async fn empty_cart_rejected() {
        let (db, cashier, _, _) = fixture().await;

        let err = db
            .sale_engine()
            .create_sale(&cash_request(vec![], 1000), cashier.id)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Cart is empty");
        assert!(err.is_business());
    }

    #[tokio::test]
    async fn missing_payment_rejected() {
        let (db, cashier, indomie, _) = fixture().await;

        let mut request = cash_request(vec![inventory_item(&indomie, 1)], 0);
        request.amount_paid = None;

        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payment amount is required and must be greater than zero"
        );

        // zero payment hits the same rule
        let request = cash_request(vec![inventory_item(&indomie, 1)], 0);
        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Business(CoreError::MissingPayment)
        ));
    }

    #[tokio::test]
    async fn invalid_item_rejected() {
        let (db, cashier, indomie, _) = fixture().await;

        let request = cash_request(vec![inventory_item(&indomie, 0)], 1000);
        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Business(CoreError::InvalidItemData(_))
        ));
    }

    #[tokio::test]
    async fn unknown_product_rejected_and_nothing_persisted() {
        let (db, cashier, indomie, _) = fixture().await;

        let request = cash_request(
            vec![
                inventory_item(&indomie, 1),
                SaleItemInput {
                    product_id: Some(99999),
                    quantity: 1,
                    unit_price: Some(Money::from(100)),
                    ..SaleItemInput::default()
                },
            ],
            10000,
        );

        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Product not found: 99999");

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
        assert_eq!(stock_of(&db, indomie.id).await, 50);
    }

    #[tokio::test]
    async fn insufficient_stock_rejected_with_figures() {
        let (db, cashier, _, teh) = fixture().await;

        let request = cash_request(vec![inventory_item(&teh, 1000)], 5_000_000);
        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient stock for Teh Botol. Available: 10, Requested: 1000"
        );
        assert_eq!(stock_of(&db, teh.id).await, 10);
    }

    /// Same product twice with a combined quantity over stock: each line
    /// passes the snapshot pre-check, the second guarded decrement fails,
    /// and the rollback must erase the sale, the items and the first
    /// decrement.
    #[tokio::test]
    async fn partial_failure_rolls_back_everything() {
        let (db, cashier, _, teh) = fixture().await;

        let request = cash_request(
            vec![inventory_item(&teh, 7), inventory_item(&teh, 7)],
            100000,
        );
        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Business(CoreError::InsufficientStock { .. })
        ));

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 0);
        assert_eq!(items, 0);
        assert_eq!(stock_of(&db, teh.id).await, 10);
    }

    #[tokio::test]
    async fn insufficient_payment_rejected() {
        let (db, cashier, indomie, _) = fixture().await;

        // total 35000, paid 30000
        let request = cash_request(vec![inventory_item(&indomie, 10)], 30000);
        let err = db
            .sale_engine()
            .create_sale(&request, cashier.id)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Insufficient payment. Paid: 30000, Total due: 35000"
        );
        assert_eq!(stock_of(&db, indomie.id).await, 50);
    }

    #[tokio::test]
    async fn sale_numbers_increment_within_a_day() {
        let (db, cashier, indomie, _) = fixture().await;
        let engine = db.sale_engine();

        let first = engine
            .create_sale(&cash_request(vec![inventory_item(&indomie, 1)], 5000), cashier.id)
            .await
            .unwrap();
        let second = engine
            .create_sale(&cash_request(vec![inventory_item(&indomie, 1)], 5000), cashier.id)
            .await
            .unwrap();

        assert!(first.sale.sale_number.ends_with("-0001"));
        assert!(second.sale.sale_number.ends_with("-0002"));
        assert_ne!(first.sale.sale_number, second.sale.sale_number);
    }

    #[tokio::test]
    async fn sale_number_collision_retries_with_reissued_number() {
        let (db, cashier, indomie, _) = fixture().await;
        let engine = db.sale_engine();
        let now = Utc::now();

        // Occupy the number the count-based generator will propose next:
        // one sale in today's window whose sequence is already 0002.
        let occupied = sale_number::format_sale_number(sale_number::local_date(now), 2);
        sqlx::query(
            "INSERT INTO sales ( \
                sale_number, cashier_id, subtotal, discount, discount_type, tax, tax_rate, \
                total, amount_paid, change, payment_method, status, sale_date, created_at, updated_at \
             ) VALUES (?1, ?2, '5000', '0', 'fixed', '0', '0', '5000', '5000', '0', \
                       'cash', 'completed', ?3, ?3, ?3)",
        )
        .bind(&occupied)
        .bind(cashier.id)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();

        // count = 1 proposes 0002, hits the UNIQUE index, and the retry
        // reissues past the highest sequence in use
        let receipt = engine
            .create_sale(&cash_request(vec![inventory_item(&indomie, 1)], 5000), cashier.id)
            .await
            .unwrap();

        assert!(receipt.sale.sale_number.ends_with("-0003"));
        assert_ne!(receipt.sale.sale_number, occupied);
        assert_eq!(stock_of(&db, indomie.id).await, 49);
    }

    #[tokio::test]
    async fn concurrent_checkouts_issue_distinct_numbers() {
        let (db, cashier, indomie, _) = fixture().await;
        let engine = db.sale_engine();

        let request = cash_request(vec![inventory_item(&indomie, 1)], 5000);
        let (a, b, c, d, e) = tokio::join!(
            engine.create_sale(&request, cashier.id),
            engine.create_sale(&request, cashier.id),
            engine.create_sale(&request, cashier.id),
            engine.create_sale(&request, cashier.id),
            engine.create_sale(&request, cashier.id),
        );

        let mut numbers: Vec<String> = [a, b, c, d, e]
            .into_iter()
            .map(|result| result.unwrap().sale.sale_number)
            .collect();
        numbers.sort();
        numbers.dedup();

        assert_eq!(numbers.len(), 5);
        assert_eq!(stock_of(&db, indomie.id).await, 45);
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_appends_reason() {
        let (db, cashier, indomie, teh) = fixture().await;
        let engine = db.sale_engine();

        let mut request = cash_request(
            vec![inventory_item(&indomie, 2), inventory_item(&teh, 3)],
            50000,
        );
        request.notes = Some("regular customer".to_string());

        let receipt = engine.create_sale(&request, cashier.id).await.unwrap();
        assert_eq!(stock_of(&db, indomie.id).await, 48);
        assert_eq!(stock_of(&db, teh.id).await, 7);

        let cancelled = engine
            .cancel_sale(receipt.sale.id, Some("wrong items"))
            .await
            .unwrap();

        assert_eq!(cancelled.status, SaleStatus::Cancelled);
        assert_eq!(
            cancelled.notes.as_deref(),
            Some("regular customer | Cancelled: wrong items")
        );
        assert_eq!(stock_of(&db, indomie.id).await, 50);
        assert_eq!(stock_of(&db, teh.id).await, 10);

        // the stored row matches what was returned
        let stored = db.sales().get_with_items(receipt.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.sale.status, SaleStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_unknown_sale_rejected() {
        let (db, _, _, _) = fixture().await;

        let err = db.sale_engine().cancel_sale(424242, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Sale not found: 424242");
    }

    #[tokio::test]
    async fn double_cancel_never_restores_twice() {
        let (db, cashier, indomie, _) = fixture().await;
        let engine = db.sale_engine();

        let receipt = engine
            .create_sale(&cash_request(vec![inventory_item(&indomie, 5)], 20000), cashier.id)
            .await
            .unwrap();

        engine.cancel_sale(receipt.sale.id, None).await.unwrap();
        assert_eq!(stock_of(&db, indomie.id).await, 50);

        let err = engine.cancel_sale(receipt.sale.id, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Sale {} is already cancelled", receipt.sale.id)
        );
        assert_eq!(stock_of(&db, indomie.id).await, 50);
    }

    /// Persisted figures must reconcile with each other and with the line
    /// items as stored.
    #[tokio::test]
    async fn persisted_totals_reconcile() {
        let (db, cashier, indomie, teh) = fixture().await;

        let mut request = cash_request(
            vec![
                inventory_item(&indomie, 3),
                SaleItemInput {
                    product_id: Some(teh.id),
                    quantity: 2,
                    unit_price: Some(teh.price),
                    discount: dec("10"),
                    discount_type: DiscountType::Percentage,
                    ..SaleItemInput::default()
                },
            ],
            100000,
        );
        request.discount = dec("7.5");
        request.discount_type = DiscountType::Percentage;
        request.tax_rate = dec("11");

        let receipt = db.sale_engine().create_sale(&request, cashier.id).await.unwrap();
        let sale = &receipt.sale;

        let items_sum = receipt
            .items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.subtotal);
        assert_eq!(sale.subtotal, items_sum);

        let discount_amount = (sale.subtotal * (sale.discount / Decimal::ONE_HUNDRED)).round2();
        let reconciled = (sale.subtotal - discount_amount + sale.tax).round2();
        assert_eq!(sale.total, reconciled);
        assert_eq!(sale.change, sale.amount_paid - sale.total);
    }
}
