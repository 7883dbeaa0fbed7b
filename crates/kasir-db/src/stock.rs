//! # Stock Ledger Primitives
//!
//! Guarded stock mutation, always executed inside a sale transaction.
//!
//! ## Race Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The decrement is guarded in SQL, not checked-then-written:             │
//! │                                                                         │
//! │    UPDATE products SET stock = stock - ?qty                             │
//! │    WHERE id = ?id AND stock >= ?qty                                     │
//! │                                                                         │
//! │  Two checkouts racing for the last unit both pass the earlier read      │
//! │  check, but only one UPDATE matches its WHERE clause. The loser gets    │
//! │  0 rows affected and its whole transaction rolls back. The CHECK        │
//! │  (stock >= 0) column constraint is a second line of defense.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{debug, warn};

use kasir_core::CoreError;

use crate::error::{DbResult, EngineError};

/// Atomically decrements a product's stock, failing when the remaining
/// stock cannot cover the quantity.
///
/// ## Errors
/// - `ProductNotFound` when the id matches no row
/// - `InsufficientStock` when the guarded UPDATE matched no row but the
///   product exists; `available` is the stock at the moment of failure
pub async fn decrement(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
         WHERE id = ?1 AND stock >= ?2",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        debug!(product_id, quantity, "Stock decremented");
        return Ok(());
    }

    // The guard rejected the write. Re-read to tell a missing product from
    // an out-of-stock one.
    let current: Option<(String, i64)> =
        sqlx::query_as("SELECT name, stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

    match current {
        Some((name, available)) => Err(CoreError::InsufficientStock {
            name,
            available,
            requested: quantity,
        }
        .into()),
        None => Err(CoreError::ProductNotFound(product_id).into()),
    }
}

/// Restores stock for a cancelled sale line.
///
/// Tolerates a product that no longer exists: the cancellation must still
/// complete, so a missing row is logged and skipped rather than failing the
/// transaction.
pub async fn restore(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        warn!(product_id, quantity, "Product missing during stock restore, skipping");
    } else {
        debug!(product_id, quantity, "Stock restored");
    }

    Ok(())
}
