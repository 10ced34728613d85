//! Batch importer: runs every row through [`process_row`] and persists the
//! outcome through an [`ImportStore`].

use async_trait::async_trait;
use infdb_core::NewInfluencer;
use serde::Serialize;
use uuid::Uuid;

use crate::columns::ColumnMapping;
use crate::dictionary::Dictionary;
use crate::error::{ImportError, StoreError};
use crate::process::{process_row, RowOutcome};
use crate::row::Row;

/// Maximum number of row errors returned inline in an [`ImportSummary`].
pub const ERROR_PREVIEW_LIMIT: usize = 50;

/// A row that was rejected or failed to persist. `row_index` is the 0-based
/// position among the file's data rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row_index: usize,
    pub message: String,
    pub raw_data: Row,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub batch_id: Uuid,
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub error_rows: Vec<RowError>,
}

/// Persistence the importer needs. Every call commits on its own; there is
/// no transaction spanning the batch.
#[async_trait]
pub trait ImportStore: Send + Sync {
    async fn create_batch(
        &self,
        file_name: &str,
        uploaded_by: Uuid,
        total_rows: usize,
    ) -> Result<Uuid, StoreError>;

    async fn insert_influencer(&self, record: &NewInfluencer) -> Result<Uuid, StoreError>;

    async fn record_error(&self, batch_id: Uuid, error: &RowError) -> Result<(), StoreError>;

    async fn finalize_batch(
        &self,
        batch_id: Uuid,
        success: usize,
        errors: usize,
    ) -> Result<(), StoreError>;
}

/// Imports `rows` in file order.
///
/// A rejected row or a failed insert becomes a [`RowError`] and processing
/// continues. Rows persisted before a store failure stay persisted.
///
/// # Errors
///
/// Returns [`ImportError::EmptyFile`] before any batch is created when `rows`
/// is empty, and [`ImportError::Store`] when the batch itself cannot be
/// created, an error record cannot be written, or the counts cannot be
/// finalized.
pub async fn run_import(
    store: &dyn ImportStore,
    dict: &Dictionary,
    file_name: &str,
    uploaded_by: Uuid,
    rows: &[Row],
    mapping: &ColumnMapping,
) -> Result<ImportSummary, ImportError> {
    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let batch_id = store
        .create_batch(file_name, uploaded_by, rows.len())
        .await?;
    tracing::info!(%batch_id, file_name, total = rows.len(), "import batch started");

    let mut success = 0usize;
    let mut errors = 0usize;
    let mut error_rows = Vec::new();

    for (row_index, row) in rows.iter().enumerate() {
        let message = match process_row(row, mapping, dict, uploaded_by) {
            RowOutcome::Accepted(record) => match store.insert_influencer(&record).await {
                Ok(_) => {
                    success += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(%batch_id, row_index, error = %e, "failed to persist row");
                    e.message().to_string()
                }
            },
            rejected @ RowOutcome::Rejected(_) => {
                let message = rejected.message().unwrap_or_default();
                tracing::debug!(%batch_id, row_index, %message, "row rejected");
                message
            }
        };

        let error = RowError {
            row_index,
            message,
            raw_data: row.clone(),
        };
        store.record_error(batch_id, &error).await?;
        errors += 1;
        if error_rows.len() < ERROR_PREVIEW_LIMIT {
            error_rows.push(error);
        }
    }

    store.finalize_batch(batch_id, success, errors).await?;
    tracing::info!(%batch_id, success, errors, "import batch finished");

    Ok(ImportSummary {
        batch_id,
        total: rows.len(),
        success,
        errors,
        error_rows,
    })
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
