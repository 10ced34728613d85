use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::middleware::RequestId;

use super::super::{map_db_error, parse_id, ApiError, ApiResponse, AppState};
use super::InfluencerItem;

pub(in crate::api) async fn get_influencer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InfluencerItem>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_id(rid, &id)?;

    let row = infdb_db::get_influencer(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("influencer {id} not found")))?;

    Ok(Json(ApiResponse::new(req_id.0, row.into())))
}
