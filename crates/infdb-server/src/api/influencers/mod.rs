//! Influencer API handlers.
//!
//! - `GET    /api/v1/influencers`            : filtered, sorted, paginated list
//! - `GET    /api/v1/influencers/options`    : distinct filter values
//! - `GET    /api/v1/influencers/export`     : filtered CSV download
//! - `GET    /api/v1/influencers/{id}`       : one record
//! - `PATCH  /api/v1/influencers/{id}`       : sparse update (admin)
//! - `DELETE /api/v1/influencers/{id}`       : hard delete (admin)
//! - `GET    /api/v1/influencers/{id}/notes` : notes, newest first
//! - `POST   /api/v1/influencers/{id}/notes` : append a note

mod detail;
mod export;
mod list;
mod notes;
mod write;

pub(super) use detail::get_influencer;
pub(super) use export::export_influencers;
pub(super) use list::{list_filter_options, list_influencers};
pub(super) use notes::{create_note, list_notes};
pub(super) use write::{delete_influencer, update_influencer};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiError;

#[derive(Debug, Serialize)]
pub(in crate::api) struct InfluencerItem {
    pub id: Uuid,
    pub name: String,
    pub platform: String,
    pub handle: String,
    pub profile_url: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub languages: Vec<String>,
    pub followers: Option<i64>,
    pub avg_likes: Option<i64>,
    pub avg_comments: Option<i64>,
    pub avg_shares: Option<i64>,
    pub engagement_rate: Option<Decimal>,
    pub main_category: Option<String>,
    pub sub_categories: Vec<String>,
    pub collab_types: Vec<String>,
    pub base_price_text: Option<String>,
    pub contact_email: Option<String>,
    pub contact_dm: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub notes_summary: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<infdb_db::InfluencerRow> for InfluencerItem {
    fn from(row: infdb_db::InfluencerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            platform: row.platform,
            handle: row.handle,
            profile_url: row.profile_url,
            country: row.country,
            city: row.city,
            languages: row.languages,
            followers: row.followers,
            avg_likes: row.avg_likes,
            avg_comments: row.avg_comments,
            avg_shares: row.avg_shares,
            engagement_rate: row.engagement_rate,
            main_category: row.main_category,
            sub_categories: row.sub_categories,
            collab_types: row.collab_types,
            base_price_text: row.base_price_text,
            contact_email: row.contact_email,
            contact_dm: row.contact_dm,
            status: row.status,
            tags: row.tags,
            notes_summary: row.notes_summary,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Filter parameters shared by listing and export. Everything arrives as a
/// string so malformed numbers produce an enveloped 400 instead of a bare
/// extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct FilterQuery {
    pub search: Option<String>,
    pub platforms: Option<String>,
    pub countries: Option<String>,
    pub cities: Option<String>,
    pub main_categories: Option<String>,
    pub status: Option<String>,
    pub collab_types: Option<String>,
    pub tags: Option<String>,
    pub followers_min: Option<String>,
    pub followers_max: Option<String>,
    pub avg_likes_min: Option<String>,
    pub avg_likes_max: Option<String>,
    pub engagement_rate_min: Option<String>,
    pub engagement_rate_max: Option<String>,
}

impl FilterQuery {
    pub(in crate::api) fn to_filters(
        &self,
        request_id: &str,
    ) -> Result<infdb_db::InfluencerFilters, ApiError> {
        Ok(infdb_db::InfluencerFilters {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            platforms: split_csv_param(self.platforms.as_deref()),
            countries: split_csv_param(self.countries.as_deref()),
            cities: split_csv_param(self.cities.as_deref()),
            main_categories: split_csv_param(self.main_categories.as_deref()),
            statuses: split_csv_param(self.status.as_deref()),
            collab_types: split_csv_param(self.collab_types.as_deref()),
            tags: split_csv_param(self.tags.as_deref()),
            followers_min: parse_param(
                request_id,
                "followers_min",
                self.followers_min.as_deref(),
            )?,
            followers_max: parse_param(
                request_id,
                "followers_max",
                self.followers_max.as_deref(),
            )?,
            avg_likes_min: parse_param(
                request_id,
                "avg_likes_min",
                self.avg_likes_min.as_deref(),
            )?,
            avg_likes_max: parse_param(
                request_id,
                "avg_likes_max",
                self.avg_likes_max.as_deref(),
            )?,
            engagement_rate_min: parse_param(
                request_id,
                "engagement_rate_min",
                self.engagement_rate_min.as_deref(),
            )?,
            engagement_rate_max: parse_param(
                request_id,
                "engagement_rate_max",
                self.engagement_rate_max.as_deref(),
            )?,
        })
    }
}

/// Splits a comma-separated multi-value parameter, dropping blanks.
fn split_csv_param(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_param<T: FromStr>(
    request_id: &str,
    name: &str,
    value: Option<&str>,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("{name} must be a number, got '{raw}'"),
            )
        }),
    }
}
