//! Row-to-domain mapping.
//!
//! Monetary and rate columns are stored as TEXT decimals; these helpers
//! decode them through `rust_decimal` so nothing ever round-trips through
//! floating point. Domain types live in kasir-core, so mapping is done with
//! free functions plugged into `sqlx::query(..).try_map(..)` rather than
//! `FromRow` impls.

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use kasir_core::{
    DiscountType, Money, PaymentMethod, Product, Sale, SaleItem, SaleStatus, User,
};

/// Decodes a TEXT decimal column.
pub(crate) fn decimal_col(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Decimal>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Decodes a TEXT decimal column into `Money`.
pub(crate) fn money_col(row: &SqliteRow, column: &str) -> Result<Money, sqlx::Error> {
    decimal_col(row, column).map(Money::new)
}

pub(crate) fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        sku: row.try_get("sku")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: money_col(row, "price")?,
        stock: row.try_get("stock")?,
        min_stock: row.try_get("min_stock")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn sale_from_row(row: &SqliteRow) -> Result<Sale, sqlx::Error> {
    Ok(Sale {
        id: row.try_get("id")?,
        sale_number: row.try_get("sale_number")?,
        customer_id: row.try_get("customer_id")?,
        customer_name: row.try_get("customer_name")?,
        customer_phone: row.try_get("customer_phone")?,
        customer_email: row.try_get("customer_email")?,
        cashier_id: row.try_get("cashier_id")?,
        subtotal: money_col(row, "subtotal")?,
        discount: decimal_col(row, "discount")?,
        discount_type: row.try_get::<DiscountType, _>("discount_type")?,
        tax: money_col(row, "tax")?,
        tax_rate: decimal_col(row, "tax_rate")?,
        total: money_col(row, "total")?,
        amount_paid: money_col(row, "amount_paid")?,
        change: money_col(row, "change")?,
        payment_method: row.try_get::<PaymentMethod, _>("payment_method")?,
        status: row.try_get::<SaleStatus, _>("status")?,
        notes: row.try_get("notes")?,
        sale_date: row.try_get("sale_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn sale_item_from_row(row: &SqliteRow) -> Result<SaleItem, sqlx::Error> {
    Ok(SaleItem {
        id: row.try_get("id")?,
        sale_id: row.try_get("sale_id")?,
        product_id: row.try_get("product_id")?,
        product_name: row.try_get("product_name")?,
        product_sku: row.try_get("product_sku")?,
        quantity: row.try_get("quantity")?,
        unit_price: money_col(row, "unit_price")?,
        discount: decimal_col(row, "discount")?,
        discount_type: row.try_get::<DiscountType, _>("discount_type")?,
        subtotal: money_col(row, "subtotal")?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        name: row.try_get("name")?,
    })
}
