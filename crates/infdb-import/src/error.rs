use thiserror::Error;

/// Request-level import failures. Per-row problems never surface here; they
/// are reported through [`crate::RowError`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("file has no header row")]
    MissingHeaderRow,

    #[error("file contains no data rows")]
    EmptyFile,

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("import store failed: {0}")]
    Store(#[from] StoreError),
}

/// Failure reported by an [`crate::ImportStore`] implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
