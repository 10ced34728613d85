//! Spreadsheet import pipeline for influencer records.
//!
//! A file is read into ordered [`Row`]s ([`file`]), its headers are mapped to
//! canonical fields ([`columns`]), every row is coerced and validated
//! independently ([`process`]), and [`batch::run_import`] persists the
//! accepted rows and the rejected ones through an [`ImportStore`].

pub mod batch;
pub mod columns;
pub mod derive;
pub mod dictionary;
pub mod error;
pub mod file;
pub mod number;
pub mod platform;
pub mod process;
pub mod row;

pub use batch::{run_import, ImportStore, ImportSummary, RowError, ERROR_PREVIEW_LIMIT};
pub use columns::{auto_map_columns, parse_caller_mapping, resolve_mapping, ColumnMapping};
pub use dictionary::Dictionary;
pub use error::{ImportError, StoreError};
pub use file::{read_file, FileFormat, ParsedSheet};
pub use number::{parse_decimal, parse_korean_number};
pub use platform::normalize_platform;
pub use process::{process_row, FieldError, RowOutcome};
pub use row::{extract_field, Row};
