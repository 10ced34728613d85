use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::{parse_param, FilterQuery, InfluencerItem};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListQuery {
    #[serde(flatten)]
    pub filters: FilterQuery,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct InfluencerListData {
    pub items: Vec<InfluencerItem>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct FilterOptionsData {
    pub platforms: Vec<String>,
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub main_categories: Vec<String>,
    pub collab_types: Vec<String>,
    pub tags: Vec<String>,
}

fn normalize_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

fn normalize_page_size(page_size: Option<i64>) -> i64 {
    page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

fn total_pages(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}

pub(in crate::api) async fn list_influencers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<InfluencerListData>>, ApiError> {
    let rid = &req_id.0;
    let filters = params.filters.to_filters(rid)?;
    let page = normalize_page(parse_param(rid, "page", params.page.as_deref())?);
    let page_size =
        normalize_page_size(parse_param(rid, "page_size", params.page_size.as_deref())?);

    let result = infdb_db::list_influencers(
        &state.pool,
        &filters,
        infdb_db::SortField::from_param(params.sort_field.as_deref()),
        infdb_db::SortDirection::from_param(params.sort_direction.as_deref()),
        page,
        page_size,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        InfluencerListData {
            items: result.items.into_iter().map(InfluencerItem::from).collect(),
            total: result.total,
            page,
            page_size,
            total_pages: total_pages(result.total, page_size),
        },
    )))
}

pub(in crate::api) async fn list_filter_options(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<FilterOptionsData>>, ApiError> {
    let options = infdb_db::filter_options(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        FilterOptionsData {
            platforms: options.platforms,
            countries: options.countries,
            cities: options.cities,
            main_categories: options.main_categories,
            collab_types: options.collab_types,
            tags: options.tags,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(-3)), 1);
        assert_eq!(normalize_page_size(None), 20);
        assert_eq!(normalize_page_size(Some(0)), 1);
        assert_eq!(normalize_page_size(Some(500)), 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
