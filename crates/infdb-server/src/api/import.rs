//! Spreadsheet import handlers.
//!
//! - `POST /api/v1/import`                     : run a batch import (admin)
//! - `POST /api/v1/import/preview`             : parse and auto-map only (admin)
//! - `GET  /api/v1/import/batches`             : recent batches
//! - `GET  /api/v1/import/batches/{id}/errors` : persisted row errors of a batch

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use infdb_db::PgImportStore;
use infdb_import::{
    parse_caller_mapping, read_file, resolve_mapping, run_import, ColumnMapping, Dictionary,
    ImportError, ImportSummary, ParsedSheet,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{CurrentUser, RequestId};

use super::{
    map_db_error, normalize_limit, parse_id, require_admin, ApiError, ApiResponse, AppState,
};

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct BatchListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct PreviewData {
    pub file_name: String,
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub unmapped_headers: Vec<String>,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchItem {
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

impl From<infdb_db::ImportBatchRow> for BatchItem {
    fn from(row: infdb_db::ImportBatchRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            uploaded_by: row.uploaded_by,
            uploaded_by_username: row.uploaded_by_username,
            total_rows: row.total_rows,
            success_count: row.success_count,
            error_count: row.error_count,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct BatchErrorItem {
    pub id: Uuid,
    pub row_index: i32,
    pub message: String,
    pub raw_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<infdb_db::ImportErrorRow> for BatchErrorItem {
    fn from(row: infdb_db::ImportErrorRow) -> Self {
        Self {
            id: row.id,
            row_index: row.row_index,
            message: row.message,
            raw_data: row.raw_data,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Multipart handling
// ---------------------------------------------------------------------------

struct Upload {
    file_name: String,
    bytes: Bytes,
    mapping: Option<HashMap<String, String>>,
}

fn multipart_error(request_id: &str, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            request_id,
            "payload_too_large",
            "uploaded file exceeds the size limit",
        );
    }
    ApiError::new(request_id, "bad_request", error.body_text())
}

/// Parses the `mapping` part. Null values are dropped like empty ones.
fn parse_mapping(request_id: &str, text: &str) -> Result<HashMap<String, String>, ApiError> {
    parse_caller_mapping(text).map_err(|e| {
        ApiError::new(
            request_id,
            "bad_request",
            format!("mapping must be a JSON object of field to header: {e}"),
        )
    })
}

async fn read_upload(request_id: &str, mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut mapping = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(request_id, &e))?
    {
        let part = field.name().map(str::to_string);
        match part.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(request_id, &e))?;
                file = Some((file_name, bytes));
            }
            Some("mapping") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(request_id, &e))?;
                if !text.trim().is_empty() {
                    mapping = Some(parse_mapping(request_id, &text)?);
                }
            }
            other => {
                tracing::debug!(part = ?other, "ignoring unexpected multipart part");
            }
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(ApiError::new(
            request_id,
            "bad_request",
            "multipart part 'file' is required",
        ));
    };
    Ok(Upload {
        file_name,
        bytes,
        mapping,
    })
}

fn map_import_error(request_id: &str, error: &ImportError) -> ApiError {
    match error {
        ImportError::UnsupportedFormat(_) => {
            ApiError::new(request_id, "unsupported_format", error.to_string())
        }
        ImportError::EmptyFile => ApiError::new(request_id, "empty_file", error.to_string()),
        ImportError::MissingHeaderRow | ImportError::Csv(_) | ImportError::Spreadsheet(_) => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
        ImportError::Store(e) => {
            tracing::error!(error = %e, "import store failed");
            ApiError::new(request_id, "internal_error", "import failed")
        }
    }
}

/// Parses the upload off the async runtime; spreadsheet decoding is CPU-bound.
async fn parse_upload(request_id: &str, upload: &Upload) -> Result<ParsedSheet, ApiError> {
    let file_name = upload.file_name.clone();
    let bytes = upload.bytes.clone();
    tokio::task::spawn_blocking(move || read_file(&file_name, &bytes))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "file parsing task failed");
            ApiError::new(request_id, "internal_error", "failed to parse upload")
        })?
        .map_err(|e| map_import_error(request_id, &e))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/import
pub(super) async fn import_file(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportSummary>>, ApiError> {
    let rid = &req_id.0;
    require_admin(&user, rid)?;

    let upload = read_upload(rid, multipart).await?;
    let sheet = parse_upload(rid, &upload).await?;
    let dict = Dictionary::standard();
    let mapping = resolve_mapping(dict, &sheet.headers, upload.mapping);
    tracing::info!(
        file_name = %upload.file_name,
        user = %user.username,
        rows = sheet.rows.len(),
        mapped = mapping.len(),
        "import requested"
    );

    let store = PgImportStore::new(state.pool.clone());
    let summary = run_import(
        &store,
        dict,
        &upload.file_name,
        user.id,
        &sheet.rows,
        &mapping,
    )
    .await
    .map_err(|e| map_import_error(rid, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, summary)))
}

/// POST /api/v1/import/preview
pub(super) async fn preview_file(
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PreviewData>>, ApiError> {
    let rid = &req_id.0;
    require_admin(&user, rid)?;

    let upload = read_upload(rid, multipart).await?;
    let sheet = parse_upload(rid, &upload).await?;
    let mapping = resolve_mapping(Dictionary::standard(), &sheet.headers, upload.mapping);
    let unmapped_headers = mapping
        .unmapped(&sheet.headers)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok(Json(ApiResponse::new(
        req_id.0,
        PreviewData {
            file_name: upload.file_name,
            row_count: sheet.rows.len(),
            headers: sheet.headers,
            mapping,
            unmapped_headers,
        },
    )))
}

/// GET /api/v1/import/batches
pub(super) async fn list_batches(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<BatchListQuery>,
) -> Result<Json<ApiResponse<Vec<BatchItem>>>, ApiError> {
    let batches = infdb_db::list_import_batches(&state.pool, normalize_limit(params.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        batches.into_iter().map(BatchItem::from).collect(),
    )))
}

/// GET /api/v1/import/batches/{id}/errors
pub(super) async fn list_batch_errors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BatchErrorItem>>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &id)?;

    if infdb_db::get_import_batch(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .is_none()
    {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("import batch {id} not found"),
        ));
    }

    let errors = infdb_db::list_import_errors(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        errors.into_iter().map(BatchErrorItem::from).collect(),
    )))
}
