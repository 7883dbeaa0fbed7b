//! # Sale Repository
//!
//! Read-side operations for sales: detail with items, filtered listings,
//! and period summaries.
//!
//! Writes are deliberately absent. Sales are created and cancelled only by
//! the [`crate::engine::SaleEngine`], which owns the transaction that keeps
//! sale rows, item rows and stock in lockstep.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use std::str::FromStr;

use kasir_core::{Money, Sale, SaleItem, SaleStatus, User};

use crate::error::{DbError, DbResult};
use crate::rows::{sale_from_row, sale_item_from_row, user_from_row};

// =============================================================================
// Parameters and Views
// =============================================================================

/// Filters and paging for the sale listing.
#[derive(Debug, Clone)]
pub struct SaleListParams {
    pub status: Option<SaleStatus>,
    /// Inclusive lower bound on `sale_date`.
    pub start_date: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `sale_date`.
    pub end_date: Option<DateTime<Utc>>,
    /// Substring match on sale number or customer name.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
}

impl Default for SaleListParams {
    fn default() -> Self {
        SaleListParams {
            status: None,
            start_date: None,
            end_date: None,
            search: None,
            page: 1,
            limit: 20,
        }
    }
}

/// One page of the sale listing, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePage {
    pub sales: Vec<Sale>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// A sale with its line items and cashier, as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Missing only if the user row was removed after the sale.
    pub cashier: Option<User>,
}

/// Reporting window for [`SaleRepository::summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryPeriod {
    #[default]
    Today,
    /// Rolling 7 days.
    Week,
    /// Rolling 30 days.
    Month,
    All,
}

impl SummaryPeriod {
    /// Inclusive window start relative to `now`, or `None` for all time.
    /// Windows are anchored to local midnight, like sale-number scoping.
    fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let day_start = crate::sale_number::local_day_start(now);
        match self {
            SummaryPeriod::Today => Some(day_start),
            SummaryPeriod::Week => Some(day_start - TimeDelta::days(7)),
            SummaryPeriod::Month => Some(day_start - TimeDelta::days(30)),
            SummaryPeriod::All => None,
        }
    }
}

impl FromStr for SummaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(SummaryPeriod::Today),
            "week" => Ok(SummaryPeriod::Week),
            "month" => Ok(SummaryPeriod::Month),
            "all" => Ok(SummaryPeriod::All),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// Aggregates over completed sales in a period.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_sales: i64,
    pub total_revenue: Money,
    pub total_items_sold: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale read operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its items and cashier.
    pub async fn get_with_items(&self, id: i64) -> DbResult<Option<SaleWithItems>> {
        let sale = sqlx::query("SELECT * FROM sales WHERE id = ?1")
            .bind(id)
            .try_map(|row| sale_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;

        let Some(sale) = sale else {
            return Ok(None);
        };

        let items = sqlx::query("SELECT * FROM sale_items WHERE sale_id = ?1 ORDER BY id")
            .bind(id)
            .try_map(|row| sale_item_from_row(&row))
            .fetch_all(&self.pool)
            .await?;

        let cashier = sqlx::query("SELECT id, username, name FROM users WHERE id = ?1")
            .bind(sale.cashier_id)
            .try_map(|row| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;

        Ok(Some(SaleWithItems {
            sale,
            items,
            cashier,
        }))
    }

    /// Lists sales newest-first with optional status and date filters.
    pub async fn list(&self, params: &SaleListParams) -> DbResult<SalePage> {
        let limit = params.limit.max(1);
        let page = params.page.max(1);
        let offset = (page - 1) * limit;

        // empty-string search matches everything, keeping the SQL static
        let search = params.search.clone().unwrap_or_default();

        const FILTER: &str = "(?1 IS NULL OR status = ?1) \
             AND (?2 IS NULL OR sale_date >= ?2) \
             AND (?3 IS NULL OR sale_date < ?3) \
             AND (?4 = '' OR sale_number LIKE '%' || ?4 || '%' \
                  OR customer_name LIKE '%' || ?4 || '%')";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sales WHERE {FILTER}"))
            .bind(params.status)
            .bind(params.start_date)
            .bind(params.end_date)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let sales = sqlx::query(&format!(
            "SELECT * FROM sales WHERE {FILTER} \
             ORDER BY sale_date DESC, id DESC LIMIT ?5 OFFSET ?6"
        ))
        .bind(params.status)
        .bind(params.start_date)
        .bind(params.end_date)
        .bind(&search)
        .bind(limit)
        .bind(offset)
        .try_map(|row| sale_from_row(&row))
        .fetch_all(&self.pool)
        .await?;

        Ok(SalePage {
            sales,
            total,
            page,
            total_pages: (total + limit - 1) / limit,
        })
    }

    /// Aggregates completed sales over a period ending now.
    ///
    /// Revenue is summed in `Decimal` on the Rust side. SQLite's SUM would
    /// coerce the TEXT decimal columns through floating point.
    pub async fn summary(&self, period: SummaryPeriod) -> DbResult<SalesSummary> {
        let start = period.start(Utc::now());

        let totals: Vec<String> = sqlx::query_scalar(
            "SELECT total FROM sales \
             WHERE status = 'completed' AND (?1 IS NULL OR sale_date >= ?1)",
        )
        .bind(start)
        .fetch_all(&self.pool)
        .await?;

        let mut revenue = Decimal::ZERO;
        for raw in &totals {
            let value = raw.parse::<Decimal>().map_err(|e| DbError::CorruptColumn {
                column: "sales.total".to_string(),
                message: e.to_string(),
            })?;
            revenue += value;
        }

        let items_sold: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(si.quantity), 0) FROM sale_items si \
             JOIN sales s ON s.id = si.sale_id \
             WHERE s.status = 'completed' AND (?1 IS NULL OR s.sale_date >= ?1)",
        )
        .bind(start)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            total_sales: totals.len() as i64,
            total_revenue: Money::new(revenue),
            total_items_sold: items_sold,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parsing() {
        assert_eq!("today".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Today);
        assert_eq!("week".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Week);
        assert_eq!("month".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::Month);
        assert_eq!("all".parse::<SummaryPeriod>().unwrap(), SummaryPeriod::All);
        assert!("yesterday".parse::<SummaryPeriod>().is_err());
    }

    #[test]
    fn period_window_starts() {
        let now = Utc::now();
        let today = SummaryPeriod::Today.start(now).unwrap();
        assert_eq!(today, crate::sale_number::local_day_start(now));
        assert!(today <= now);
        assert_eq!(
            SummaryPeriod::Week.start(now).unwrap(),
            today - TimeDelta::days(7)
        );
        assert_eq!(
            SummaryPeriod::Month.start(now).unwrap(),
            today - TimeDelta::days(30)
        );
        assert!(SummaryPeriod::All.start(now).is_none());
    }
}
