//! Settings endpoint (reads only).
//!
//! The terminal loads its POS defaults from `GET /api/settings?category=pos`
//! once at startup. Settings writes go through the back office, not this API.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{ok, ApiError};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsQuery {
    pub category: Option<String>,
}

/// `GET /api/settings` - typed key-value rows, optionally one category.
pub async fn list_settings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SettingsQuery>,
) -> Result<Response, ApiError> {
    let settings = match query.category.as_deref() {
        Some(category) => state.db.settings().by_category(category).await?,
        None => state.db.settings().all().await?,
    };

    Ok(ok("Settings retrieved successfully", settings))
}
