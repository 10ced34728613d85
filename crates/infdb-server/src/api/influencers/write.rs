//! Influencer write handlers: sparse update and delete. Both are admin-only.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use infdb_core::{InfluencerStatus, Platform};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::middleware::{CurrentUser, RequestId};

use super::super::{map_db_error, parse_id, require_admin, ApiError, ApiResponse, AppState};
use super::InfluencerItem;

/// Largest engagement rate the `NUMERIC(10,2)` column holds.
const MAX_ENGAGEMENT_RATE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// Distinguishes an absent field (outer `None`, via `#[serde(default)]`) from
/// an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Outer None = keep, Some(None) = clear, Some(Some(v)) = set.
#[allow(clippy::option_option)]
#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct UpdateInfluencerRequest {
    pub name: Option<String>,
    pub platform: Option<String>,
    pub handle: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub profile_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    pub languages: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub followers: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avg_likes: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avg_comments: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avg_shares: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub engagement_rate: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub main_category: Option<Option<String>>,
    pub sub_categories: Option<Vec<String>>,
    pub collab_types: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub base_price_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_dm: Option<Option<String>>,
    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes_summary: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validation_error(req_id: &str, message: impl Into<String>) -> ApiError {
    ApiError::new(req_id, "validation_error", message)
}

fn required_text(
    req_id: &str,
    field: &str,
    value: Option<String>,
) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let v = v.trim();
            if v.is_empty() {
                Err(validation_error(req_id, format!("{field} must not be empty")))
            } else {
                Ok(Some(v.to_string()))
            }
        }
    }
}

/// Blank strings clear the field like `null` does.
#[allow(clippy::option_option)]
fn optional_text(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

#[allow(clippy::option_option)]
fn count(
    req_id: &str,
    field: &str,
    value: Option<Option<i64>>,
) -> Result<Option<Option<i64>>, ApiError> {
    if let Some(Some(n)) = value {
        if n < 0 {
            return Err(validation_error(
                req_id,
                format!("{field} must not be negative"),
            ));
        }
    }
    Ok(value)
}

#[allow(clippy::option_option)]
fn rate(
    req_id: &str,
    value: Option<Option<Decimal>>,
) -> Result<Option<Option<Decimal>>, ApiError> {
    match value {
        Some(Some(r)) if r.is_sign_negative() && !r.is_zero() => Err(validation_error(
            req_id,
            "engagement_rate must not be negative",
        )),
        Some(Some(r)) => {
            let rounded = infdb_import::derive::round_rate(r);
            if rounded > MAX_ENGAGEMENT_RATE {
                return Err(validation_error(
                    req_id,
                    format!("engagement_rate must be at most {MAX_ENGAGEMENT_RATE}"),
                ));
            }
            Ok(Some(Some(rounded)))
        }
        other => Ok(other),
    }
}

fn list(value: Option<Vec<String>>) -> Option<Vec<String>> {
    value.map(|items| {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

fn parse_enum<T: FromStr>(
    req_id: &str,
    field: &str,
    value: Option<String>,
) -> Result<Option<T>, ApiError> {
    value
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| validation_error(req_id, format!("invalid {field} '{v}'")))
        })
        .transpose()
}

impl UpdateInfluencerRequest {
    fn into_update(self, req_id: &str) -> Result<infdb_db::InfluencerUpdate, ApiError> {
        Ok(infdb_db::InfluencerUpdate {
            name: required_text(req_id, "name", self.name)?,
            platform: parse_enum::<Platform>(req_id, "platform", self.platform)?,
            handle: required_text(req_id, "handle", self.handle)?,
            profile_url: optional_text(self.profile_url),
            country: optional_text(self.country),
            city: optional_text(self.city),
            languages: list(self.languages),
            followers: count(req_id, "followers", self.followers)?,
            avg_likes: count(req_id, "avg_likes", self.avg_likes)?,
            avg_comments: count(req_id, "avg_comments", self.avg_comments)?,
            avg_shares: count(req_id, "avg_shares", self.avg_shares)?,
            engagement_rate: rate(req_id, self.engagement_rate)?,
            main_category: optional_text(self.main_category),
            sub_categories: list(self.sub_categories),
            collab_types: list(self.collab_types),
            base_price_text: optional_text(self.base_price_text),
            contact_email: optional_text(self.contact_email),
            contact_dm: optional_text(self.contact_dm),
            status: parse_enum::<InfluencerStatus>(req_id, "status", self.status)?,
            tags: list(self.tags),
            notes_summary: optional_text(self.notes_summary),
        })
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// PATCH /api/v1/influencers/{id}: sparse update.
pub(in crate::api) async fn update_influencer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateInfluencerRequest>,
) -> Result<Json<ApiResponse<InfluencerItem>>, ApiError> {
    let rid = &req_id.0;
    require_admin(&user, rid)?;
    let id = parse_id(rid, &id)?;
    let update = body.into_update(rid)?;

    let row = infdb_db::update_influencer(&state.pool, id, update)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(influencer_id = %id, user = %user.username, "influencer updated");

    Ok(Json(ApiResponse::new(req_id.0, row.into())))
}

/// DELETE /api/v1/influencers/{id}: hard delete; notes cascade.
pub(in crate::api) async fn delete_influencer(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    require_admin(&user, rid)?;
    let id = parse_id(rid, &id)?;

    infdb_db::delete_influencer(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(influencer_id = %id, user = %user.username, "influencer deleted");

    Ok(Json(ApiResponse::new(
        req_id.0,
        serde_json::json!({ "id": id, "deleted": true }),
    )))
}
