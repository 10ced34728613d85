//! CSV export of the filtered influencer list. The header names are ones the
//! import column mapper recognizes, so an exported file can be re-imported.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, AppState};
use super::FilterQuery;

const EXPORT_HEADERS: [&str; 22] = [
    "Name",
    "Platform",
    "Handle",
    "Profile URL",
    "Country",
    "City",
    "Languages",
    "Followers",
    "Avg Likes",
    "Avg Comments",
    "Avg Shares",
    "Engagement Rate",
    "Main Category",
    "Sub Categories",
    "Collab Types",
    "Base Price",
    "Contact Email",
    "Contact DM",
    "Status",
    "Tags",
    "Notes Summary",
    "Created At",
];

const LIST_SEPARATOR: &str = "; ";

fn opt_to_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn export_record(row: infdb_db::InfluencerRow) -> [String; 22] {
    [
        row.name,
        row.platform,
        row.handle,
        row.profile_url.unwrap_or_default(),
        row.country.unwrap_or_default(),
        row.city.unwrap_or_default(),
        row.languages.join(LIST_SEPARATOR),
        opt_to_string(row.followers),
        opt_to_string(row.avg_likes),
        opt_to_string(row.avg_comments),
        opt_to_string(row.avg_shares),
        opt_to_string(row.engagement_rate),
        row.main_category.unwrap_or_default(),
        row.sub_categories.join(LIST_SEPARATOR),
        row.collab_types.join(LIST_SEPARATOR),
        row.base_price_text.unwrap_or_default(),
        row.contact_email.unwrap_or_default(),
        row.contact_dm.unwrap_or_default(),
        row.status,
        row.tags.join(LIST_SEPARATOR),
        row.notes_summary.unwrap_or_default(),
        row.created_at.to_rfc3339(),
    ]
}

fn write_csv(rows: Vec<infdb_db::InfluencerRow>) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        writer.write_record(export_record(row))?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// GET /api/v1/influencers/export
pub(in crate::api) async fn export_influencers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<FilterQuery>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let filters = params.to_filters(rid)?;

    let rows = infdb_db::export_influencers(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let count = rows.len();

    let body = write_csv(rows).map_err(|e| {
        tracing::error!(error = %e, "failed to render CSV export");
        ApiError::new(rid, "internal_error", "failed to render export")
    })?;
    tracing::info!(rows = count, "influencers exported");

    let disposition = format!(
        "attachment; filename=\"influencers-{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
