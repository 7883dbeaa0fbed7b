//! Router assembly.

use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ok;
use crate::handlers::{pos, settings};
use crate::AppState;

/// Builds the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/pos/products", get(pos::list_products))
        .route("/api/pos/sales", post(pos::create_sale).get(pos::list_sales))
        // static route must be declared alongside the :id capture
        .route("/api/pos/sales/summary", get(pos::sales_summary))
        .route("/api/pos/sales/:id", get(pos::get_sale))
        .route("/api/pos/sales/:id/cancel", put(pos::cancel_sale))
        .route("/api/settings", get(settings::list_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unauthenticated liveness probe, including a database ping.
async fn health(State(state): State<AppState>) -> Response {
    let database = if state.db.health_check().await {
        "up"
    } else {
        "down"
    };

    ok(
        "OK",
        serde_json::json!({
            "status": "ok",
            "database": database,
        }),
    )
}
