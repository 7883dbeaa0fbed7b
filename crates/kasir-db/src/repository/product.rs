//! # Product Repository
//!
//! Database operations for products.
//!
//! The POS listing intentionally filters to `stock > 0`: the cashier's grid
//! only ever shows what can actually be sold. Stock itself is never written
//! here; the engine's stock ledger owns all stock mutation.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use kasir_core::{Money, Product};

use crate::error::DbResult;
use crate::rows::product_from_row;

/// Filters and paging for the POS product listing.
#[derive(Debug, Clone)]
pub struct ProductListParams {
    /// Case-insensitive substring match on name or SKU.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductListParams {
    fn default() -> Self {
        ProductListParams {
            search: None,
            category: None,
            page: 1,
            limit: 50,
        }
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Fields for inserting a product (catalog seeding, tests).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock: i64,
    pub min_stock: i64,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns it with its generated id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO products (sku, name, category, price, stock, min_stock, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        )
        .bind(&new.sku)
        .bind(&new.name)
        .bind(&new.category)
        .bind(new.price.round2().amount().to_string())
        .bind(new.stock)
        .bind(new.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, sku = %new.sku, "Product inserted");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| crate::error::DbError::not_found("Product", id))
    }

    /// Gets a product by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .try_map(|row| product_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists in-stock products with optional search and category filters,
    /// paginated.
    pub async fn list(&self, params: &ProductListParams) -> DbResult<ProductPage> {
        let search = params.search.as_deref().unwrap_or("").trim().to_string();
        let category = params.category.as_deref().unwrap_or("").to_string();
        let limit = params.limit.max(1);
        let page = params.page.max(1);
        let offset = (page - 1) * limit;

        // Empty-string binds mean "no filter"; keeps the SQL static.
        const FILTER: &str = "stock > 0 \
             AND (?1 = '' OR name LIKE '%' || ?1 || '%' OR sku LIKE '%' || ?1 || '%') \
             AND (?2 = '' OR category = ?2)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM products WHERE {FILTER}"
        ))
        .bind(&search)
        .bind(&category)
        .fetch_one(&self.pool)
        .await?;

        let products = sqlx::query(&format!(
            "SELECT * FROM products WHERE {FILTER} ORDER BY name LIMIT ?3 OFFSET ?4"
        ))
        .bind(&search)
        .bind(&category)
        .bind(limit)
        .bind(offset)
        .try_map(|row| product_from_row(&row))
        .fetch_all(&self.pool)
        .await?;

        Ok(ProductPage {
            products,
            total,
            page,
            total_pages: (total + limit - 1) / limit,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
