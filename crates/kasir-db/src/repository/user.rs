//! # User Repository
//!
//! Minimal operator lookup. Sales reference a cashier row; authentication
//! happens upstream in the HTTP layer.

use chrono::Utc;
use sqlx::SqlitePool;

use kasir_core::User;

use crate::error::{DbError, DbResult};
use crate::rows::user_from_row;

/// Repository for operator accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts an operator and returns it with its generated id.
    pub async fn create(&self, username: &str, name: &str) -> DbResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(username)
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Gets an operator by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query("SELECT id, username, name FROM users WHERE id = ?1")
            .bind(id)
            .try_map(|row| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets an operator by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query("SELECT id, username, name FROM users WHERE username = ?1")
            .bind(username)
            .try_map(|row| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
