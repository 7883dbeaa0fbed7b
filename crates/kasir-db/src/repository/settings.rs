//! # Settings Repository
//!
//! Typed key-value settings. The POS category (`pos.*`) carries the
//! terminal's defaults: tax rate, default discount, feature toggles and
//! plastic bag prices.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error::DbResult;

/// A single settings row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    pub value: String,
    /// One of `string`, `number`, `boolean`, `json`.
    pub value_type: String,
    pub category: String,
}

impl Setting {
    /// The value as a decimal, when it parses as one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        self.value.parse().ok()
    }

    /// The value as a boolean (`"true"` / `"false"`).
    pub fn as_bool(&self) -> Option<bool> {
        match self.value.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

/// Repository for settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<Setting>> {
        let setting = sqlx::query(
            "SELECT key, value, value_type, category FROM settings WHERE key = ?1",
        )
        .bind(key)
        .try_map(|row| setting_from_row(&row))
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Lists every setting, ordered by category then key.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query(
            "SELECT key, value, value_type, category FROM settings ORDER BY category, key",
        )
        .try_map(|row| setting_from_row(&row))
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Lists all settings in a category, ordered by key.
    pub async fn by_category(&self, category: &str) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query(
            "SELECT key, value, value_type, category FROM settings \
             WHERE category = ?1 ORDER BY key",
        )
        .bind(category)
        .try_map(|row| setting_from_row(&row))
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Upserts a setting's value, keeping its declared type and category
    /// when the row already exists.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value, value_type, category, updated_at) \
             VALUES (?1, ?2, 'string', 'general', ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn setting_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Setting, sqlx::Error> {
    Ok(Setting {
        key: row.try_get("key")?,
        value: row.try_get("value")?,
        value_type: row.try_get("value_type")?,
        category: row.try_get("category")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
