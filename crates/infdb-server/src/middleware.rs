use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use infdb_core::UserRole;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated caller, stored as a request extension by
/// [`require_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Bearer token resolution settings used by middleware.
#[derive(Clone)]
pub struct AuthState {
    pool: PgPool,
    salt: Arc<str>,
}

impl AuthState {
    #[must_use]
    pub fn new(pool: PgPool, salt: &str) -> Self {
        Self {
            pool,
            salt: Arc::from(salt),
        }
    }

    async fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, infdb_db::DbError> {
        let hash = infdb_db::hash_token(&self.salt, token);
        let Some(row) = infdb_db::find_user_by_token_hash(&self.pool, &hash).await? else {
            return Ok(None);
        };
        let role = row.role()?;
        Ok(Some(CurrentUser {
            id: row.id,
            username: row.username,
            name: row.name,
            role,
        }))
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware resolving the bearer token to a [`CurrentUser`]. Missing or
/// unknown tokens get a 401.
pub async fn require_user(State(auth): State<AuthState>, mut req: Request, next: Next) -> Response {
    let rid = request_id_of(&req);
    let Some(token) = extract_bearer_token(req.headers().get(AUTHORIZATION)) else {
        return ApiError::new(rid, "unauthorized", "missing or invalid bearer token")
            .into_response();
    };

    match auth.resolve(token).await {
        Ok(Some(user)) => {
            tracing::debug!(user = %user.username, role = %user.role, "request authenticated");
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => {
            ApiError::new(rid, "unauthorized", "missing or invalid bearer token").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "bearer token lookup failed");
            ApiError::new(rid, "internal_error", "authentication failed").into_response()
        }
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        drop(window);
        return ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
