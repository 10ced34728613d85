use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::influencers::InfluencerItem;
use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct PlatformCountItem {
    pub platform: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CategoryCountItem {
    pub main_category: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct DashboardData {
    pub total: i64,
    pub by_platform: Vec<PlatformCountItem>,
    pub top_categories: Vec<CategoryCountItem>,
    pub created_last_30_days: i64,
    pub recent: Vec<InfluencerItem>,
}

impl From<infdb_db::DashboardStats> for DashboardData {
    fn from(stats: infdb_db::DashboardStats) -> Self {
        Self {
            total: stats.total,
            by_platform: stats
                .by_platform
                .into_iter()
                .map(|p| PlatformCountItem {
                    platform: p.platform,
                    count: p.count,
                })
                .collect(),
            top_categories: stats
                .top_categories
                .into_iter()
                .map(|c| CategoryCountItem {
                    main_category: c.main_category,
                    count: c.count,
                })
                .collect(),
            created_last_30_days: stats.created_last_30_days,
            recent: stats.recent.into_iter().map(InfluencerItem::from).collect(),
        }
    }
}

/// GET /api/v1/dashboard
pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardData>>, ApiError> {
    let stats = infdb_db::dashboard_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, stats.into())))
}
