//! Postgres-backed [`ImportStore`] for the batch importer.

use async_trait::async_trait;
use infdb_core::NewInfluencer;
use infdb_import::{ImportStore, Row, RowError, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{import_batches, influencers, DbError};

/// Each call runs as its own statement, so rows persisted before a failure
/// stay persisted.
#[derive(Debug, Clone)]
pub struct PgImportStore {
    pool: PgPool,
}

impl PgImportStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Surfaces the database's own message for constraint violations, which is
/// what operators see in the per-row error.
fn store_error(err: &DbError) -> StoreError {
    match err {
        DbError::Sqlx(sqlx::Error::Database(db_err)) => StoreError::new(db_err.message()),
        other => StoreError::new(other.to_string()),
    }
}

fn to_i32(value: usize, what: &str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::new(format!("{what} {value} out of range")))
}

fn raw_data_json(row: &Row) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(row).map_err(|e| StoreError::new(format!("raw row not encodable: {e}")))
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn create_batch(
        &self,
        file_name: &str,
        uploaded_by: Uuid,
        total_rows: usize,
    ) -> Result<Uuid, StoreError> {
        let total_rows = to_i32(total_rows, "total_rows")?;
        import_batches::create_import_batch(&self.pool, file_name, uploaded_by, total_rows)
            .await
            .map_err(|e| store_error(&e))
    }

    async fn insert_influencer(&self, record: &NewInfluencer) -> Result<Uuid, StoreError> {
        influencers::insert_influencer(&self.pool, record)
            .await
            .map(|row| row.id)
            .map_err(|e| store_error(&e))
    }

    async fn record_error(&self, batch_id: Uuid, error: &RowError) -> Result<(), StoreError> {
        let row_index = to_i32(error.row_index, "row_index")?;
        let raw_data = raw_data_json(&error.raw_data)?;
        import_batches::insert_import_error(
            &self.pool,
            batch_id,
            row_index,
            &error.message,
            &raw_data,
        )
        .await
        .map_err(|e| store_error(&e))
    }

    async fn finalize_batch(
        &self,
        batch_id: Uuid,
        success: usize,
        errors: usize,
    ) -> Result<(), StoreError> {
        let success = to_i32(success, "success")?;
        let errors = to_i32(errors, "errors")?;
        import_batches::finalize_import_batch(&self.pool, batch_id, success, errors)
            .await
            .map_err(|e| store_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_keep_their_display() {
        let err = store_error(&DbError::NotFound);
        assert_eq!(err.message(), "record not found");
    }

    #[test]
    fn oversized_counts_are_rejected() {
        assert!(to_i32(usize::MAX, "total_rows").is_err());
        assert_eq!(to_i32(3, "total_rows").unwrap(), 3);
    }

    #[test]
    fn raw_row_is_stored_as_a_json_object_with_missing_cells_null() {
        let mut row: Row = [("이름", "A"), ("플랫폼", "badvalue")].into_iter().collect();
        row.push("팔로워", None);
        assert_eq!(
            raw_data_json(&row).unwrap(),
            serde_json::json!({ "이름": "A", "플랫폼": "badvalue", "팔로워": null })
        );
    }
}
