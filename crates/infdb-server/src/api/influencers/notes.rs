use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{CurrentUser, RequestId};

use super::super::{map_db_error, parse_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateNoteRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct NoteItem {
    pub id: Uuid,
    pub influencer_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<infdb_db::NoteRow> for NoteItem {
    fn from(row: infdb_db::NoteRow) -> Self {
        Self {
            id: row.id,
            influencer_id: row.influencer_id,
            author_id: row.author_id,
            author_name: row.author_name,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

pub(in crate::api) async fn list_notes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<NoteItem>>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &id)?;

    if infdb_db::get_influencer(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .is_none()
    {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("influencer {id} not found"),
        ));
    }

    let notes = infdb_db::list_notes(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        notes.into_iter().map(NoteItem::from).collect(),
    )))
}

pub(in crate::api) async fn create_note(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NoteItem>>), ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &id)?;

    let content = body.content.trim();
    if content.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "content must not be empty",
        ));
    }

    let note = infdb_db::create_note(&state.pool, id, user.id, content)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(influencer_id = %id, note_id = %note.id, user = %user.username, "note added");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, note.into())),
    ))
}
