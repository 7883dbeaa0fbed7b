//! POS endpoints: products, checkout, sale lookup, cancellation, summary.
//!
//! Handlers are translation only. Business rules live in kasir-core, the
//! transaction in kasir-db's engine; nothing here touches stock or totals.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use kasir_core::{CreateSaleRequest, SaleStatus};
use kasir_db::{ProductListParams, SaleListParams, SummaryPeriod};

use crate::auth::AuthUser;
use crate::error::{created, ok, ApiError};
use crate::AppState;

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            search: None,
            category: None,
            page: 1,
            limit: 50,
        }
    }
}

/// `GET /api/pos/products` - paged listing of sellable (stock > 0) products.
pub async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ApiError> {
    let params = ProductListParams {
        search: query.search,
        category: query.category,
        page: query.page.max(1),
        limit: query.limit.clamp(1, 100),
    };

    let page = state.db.products().list(&params).await?;
    Ok(ok("Products retrieved successfully", page))
}

// =============================================================================
// Sales
// =============================================================================

/// `POST /api/pos/sales` - the checkout endpoint.
///
/// The whole sale commits or nothing does; any business rejection comes
/// back as a 400 with the cashier-facing message.
pub async fn create_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateSaleRequest>,
) -> Result<Response, ApiError> {
    let sale = state
        .db
        .sale_engine()
        .create_sale(&request, auth.cashier_id)
        .await?;

    info!(
        sale_number = %sale.sale.sale_number,
        total = %sale.sale.total,
        cashier_id = auth.cashier_id,
        "Sale completed"
    );

    Ok(created("Sale created successfully", sale))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleQuery {
    pub status: Option<SaleStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// `GET /api/pos/sales` - filtered listing, newest first.
pub async fn list_sales(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SaleQuery>,
) -> Result<Response, ApiError> {
    let params = SaleListParams {
        status: query.status,
        start_date: query.start_date,
        end_date: query.end_date,
        search: query.search,
        page: query.page.unwrap_or(1).max(1),
        limit: query.limit.unwrap_or(20).clamp(1, 100),
    };

    let page = state.db.sales().list(&params).await?;
    Ok(ok("Sales retrieved successfully", page))
}

/// `GET /api/pos/sales/:id` - one sale with its items and cashier.
pub async fn get_sale(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let sale = state
        .db
        .sales()
        .get_with_items(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale not found: {id}")))?;

    Ok(ok("Sale retrieved successfully", sale))
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelBody {
    pub reason: Option<String>,
}

/// `PUT /api/pos/sales/:id/cancel` - cancel a sale and restore its stock.
pub async fn cancel_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    body: Option<Json<CancelBody>>,
) -> Result<Response, ApiError> {
    let reason = body.as_ref().and_then(|b| b.reason.as_deref());

    let sale = state.db.sale_engine().cancel_sale(id, reason).await?;

    info!(
        sale_number = %sale.sale_number,
        cashier_id = auth.cashier_id,
        "Sale cancelled"
    );

    Ok(ok("Sale cancelled successfully", sale))
}

// =============================================================================
// Summary
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub period: Option<String>,
}

/// `GET /api/pos/sales/summary?period=today|week|month|all`
pub async fn sales_summary(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    let period = match query.period.as_deref() {
        None => SummaryPeriod::default(),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("Invalid period: {raw}")))?,
    };

    let summary = state.db.sales().summary(period).await?;
    Ok(ok("Summary retrieved successfully", summary))
}
