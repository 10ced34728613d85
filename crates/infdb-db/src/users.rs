//! Database operations for the `users` table and API token hashing.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use infdb_core::UserRole;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `users` table. The token hash is never selected.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Parsed role; the column is constrained to the known values.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored role is unknown.
    pub fn role(&self) -> Result<UserRole, DbError> {
        self.role
            .parse()
            .map_err(|_| DbError::InvalidValue(format!("role {}", self.role)))
    }
}

/// `hex(sha256(salt || token))`, the form tokens are stored and looked up in.
#[must_use]
pub fn hash_token(salt: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mints a new random bearer token (64 hex characters).
#[must_use]
pub fn generate_api_token() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Creates a user holding the given token hash.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, including when `username`
/// is already taken.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    name: &str,
    role: UserRole,
    token_hash: &str,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, name, role, api_token_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, name, role, created_at, updated_at",
    )
    .bind(username)
    .bind(name)
    .bind(role.as_str())
    .bind(token_hash)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Looks a user up by API token hash.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_user_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, name, role, created_at, updated_at \
         FROM users \
         WHERE api_token_hash = $1",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, name, role, created_at, updated_at \
         FROM users \
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Replaces a user's token hash, invalidating the previous token.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no user has `username`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn rotate_user_token(
    pool: &PgPool,
    username: &str,
    token_hash: &str,
) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(
        "UPDATE users \
         SET api_token_hash = $2, updated_at = NOW() \
         WHERE username = $1 \
         RETURNING id, username, name, role, created_at, updated_at",
    )
    .bind(username)
    .bind(token_hash)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
