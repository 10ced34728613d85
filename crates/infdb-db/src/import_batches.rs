//! Database operations for `import_batches` and `import_errors`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `import_batches` table, with the uploader's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportBatchRow {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_by_username: Option<String>,
    pub total_rows: i32,
    pub success_count: i32,
    pub error_count: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A row from the `import_errors` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportErrorRow {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub row_index: i32,
    pub message: String,
    pub raw_data: Value,
    pub created_at: DateTime<Utc>,
}

/// Creates a batch with zero counts and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_import_batch(
    pool: &PgPool,
    file_name: &str,
    uploaded_by: Uuid,
    total_rows: i32,
) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO import_batches (file_name, uploaded_by, total_rows) \
         VALUES ($1, $2, $3) \
         RETURNING id",
    )
    .bind(file_name)
    .bind(uploaded_by)
    .bind(total_rows)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Sets the final counts of a batch and stamps `completed_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the batch does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn finalize_import_batch(
    pool: &PgPool,
    batch_id: Uuid,
    success_count: i32,
    error_count: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE import_batches \
         SET success_count = $2, error_count = $3, completed_at = NOW() \
         WHERE id = $1",
    )
    .bind(batch_id)
    .bind(success_count)
    .bind(error_count)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_import_error(
    pool: &PgPool,
    batch_id: Uuid,
    row_index: i32,
    message: &str,
    raw_data: &Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO import_errors (batch_id, row_index, message, raw_data) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(batch_id)
    .bind(row_index)
    .bind(message)
    .bind(raw_data)
    .execute(pool)
    .await?;
    tracing::debug!(%batch_id, row_index, "import error recorded");
    Ok(())
}

const BATCH_SELECT: &str =
    "SELECT b.id, b.file_name, b.uploaded_by, u.username AS uploaded_by_username, \
            b.total_rows, b.success_count, b.error_count, b.created_at, b.completed_at \
     FROM import_batches b \
     LEFT JOIN users u ON u.id = b.uploaded_by";

/// Most recent batches first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_batches(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ImportBatchRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportBatchRow>(&format!(
        "{BATCH_SELECT} ORDER BY b.created_at DESC, b.id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_import_batch(
    pool: &PgPool,
    batch_id: Uuid,
) -> Result<Option<ImportBatchRow>, DbError> {
    let row = sqlx::query_as::<_, ImportBatchRow>(&format!("{BATCH_SELECT} WHERE b.id = $1"))
        .bind(batch_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Every persisted error of a batch, in row order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_import_errors(
    pool: &PgPool,
    batch_id: Uuid,
) -> Result<Vec<ImportErrorRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportErrorRow>(
        "SELECT id, batch_id, row_index, message, raw_data, created_at \
         FROM import_errors \
         WHERE batch_id = $1 \
         ORDER BY row_index, created_at",
    )
    .bind(batch_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
