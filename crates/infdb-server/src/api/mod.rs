mod dashboard;
mod import;
mod influencers;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_user, AuthState, CurrentUser, RateLimitState,
    RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" | "unsupported_format" | "empty_file" => {
                StatusCode::BAD_REQUEST
            }
            "conflict" => StatusCode::CONFLICT,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &infdb_db::DbError) -> ApiError {
    if matches!(error, infdb_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    if error.is_unique_violation() {
        return ApiError::new(request_id, "conflict", "record already exists");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Rejects callers without the admin role.
pub(super) fn require_admin(user: &CurrentUser, request_id: &str) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::debug!(user = %user.username, "admin-only operation refused");
        Err(ApiError::new(
            request_id,
            "forbidden",
            "this operation requires the admin role",
        ))
    }
}

/// Parses a UUID path segment; anything else is a 400 rather than a 404.
pub(super) fn parse_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::new(
            request_id,
            "bad_request",
            format!("'{raw}' is not a valid id"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(
    auth: AuthState,
    rate_limit: RateLimitState,
    max_upload_bytes: usize,
) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(max_upload_bytes);

    Router::new()
        .route("/api/v1/influencers", get(influencers::list_influencers))
        .route(
            "/api/v1/influencers/options",
            get(influencers::list_filter_options),
        )
        .route(
            "/api/v1/influencers/export",
            get(influencers::export_influencers),
        )
        .route(
            "/api/v1/influencers/{id}",
            get(influencers::get_influencer)
                .patch(influencers::update_influencer)
                .delete(influencers::delete_influencer),
        )
        .route(
            "/api/v1/influencers/{id}/notes",
            get(influencers::list_notes).post(influencers::create_note),
        )
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/v1/import",
            post(import::import_file).layer(upload_limit.clone()),
        )
        .route(
            "/api/v1/import/preview",
            post(import::preview_file).layer(upload_limit),
        )
        .route("/api/v1/import/batches", get(import::list_batches))
        .route(
            "/api/v1/import/batches/{id}/errors",
            get(import::list_batch_errors),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(auth, require_user)),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit, state.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match infdb_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
