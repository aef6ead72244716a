//! Member-facing HTTP API.
//!
//! Thin translation layer: handlers parse the request, resolve the
//! acting member from the `x-user-id` header, call one service method,
//! and map the domain error taxonomy onto status codes. No business
//! rules live here.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{parse_date_key, CheckInStatus, FollowThrough, HttpConfig};
use crate::services::{CheckInService, ReviewGate, WillProgress};

/// Request to record a check-in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCheckInRequest {
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// One of `yes`, `no`, `partial`.
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub total_days: u32,
    pub checked_in_days: u32,
    pub yes_count: u32,
    pub partial_count: u32,
    pub no_count: u32,
    pub success_rate: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl From<WillProgress> for ProgressResponse {
    fn from(p: WillProgress) -> Self {
        Self {
            total_days: p.total_days,
            checked_in_days: p.checked_in_days,
            yes_count: p.yes_count,
            partial_count: p.partial_count,
            no_count: p.no_count,
            success_rate: p.success_rate,
            streak: p.current_streak,
            best_streak: p.best_streak,
        }
    }
}

/// Request to submit a review.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    /// One of `yes`, `mostly`, `no`.
    pub follow_through: String,
    #[serde(default)]
    pub reflection_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    pub follow_through: String,
    pub reflection_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeResponse {
    pub id: Uuid,
    pub will_id: Uuid,
    pub user_id: Uuid,
    /// Whether every committed member has now acknowledged, releasing
    /// the circle to start a new Will.
    pub ready_for_new_will: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map the domain error taxonomy onto HTTP status codes.
fn map_domain_error(err: &DomainError) -> ApiError {
    let (status, code) = match err {
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        DomainError::Authorization(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        DomainError::WillNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, "STATE_CONFLICT"),
        DomainError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        DomainError::StoreUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        DomainError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            code: "VALIDATION_ERROR".to_string(),
        }),
    )
}

/// Resolve the acting member from the `x-user-id` header.
fn acting_user(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "missing x-user-id header".to_string(),
                    code: "UNAUTHENTICATED".to_string(),
                }),
            )
        })?;
    Uuid::parse_str(raw).map_err(|_| bad_request(format!("invalid user id: {raw}")))
}

/// Shared state for the wills HTTP server.
struct AppState {
    check_ins: Arc<CheckInService>,
    gate: Arc<ReviewGate>,
}

/// Member-facing HTTP server.
pub struct WillsHttpServer {
    config: HttpConfig,
    check_ins: Arc<CheckInService>,
    gate: Arc<ReviewGate>,
}

impl WillsHttpServer {
    pub fn new(check_ins: Arc<CheckInService>, gate: Arc<ReviewGate>, config: HttpConfig) -> Self {
        Self { config, check_ins, gate }
    }

    fn build_router(self) -> Router {
        let state = Arc::new(AppState {
            check_ins: self.check_ins,
            gate: self.gate,
        });

        let app = Router::new()
            .route("/wills/{id}/check-ins", post(record_check_in))
            .route("/wills/{id}/check-in-progress", get(check_in_progress))
            .route("/wills/{id}/review", post(submit_review))
            .route("/wills/{id}/acknowledge", post(acknowledge))
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("wills HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("wills HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn record_check_in(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<RecordCheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), ApiError> {
    let user_id = acting_user(&headers)?;
    let date = parse_date_key(&req.date)
        .ok_or_else(|| bad_request(format!("invalid date: {}", req.date)))?;
    let status = CheckInStatus::from_str(&req.status)
        .ok_or_else(|| bad_request(format!("invalid check-in status: {}", req.status)))?;

    match state.check_ins.record_check_in(id, user_id, date, status).await {
        Ok(check_in) => Ok((
            StatusCode::CREATED,
            Json(CheckInResponse {
                id: check_in.id,
                will_id: check_in.will_id,
                user_id: check_in.user_id,
                date: check_in.date_key(),
                status: check_in.status.as_str().to_string(),
            }),
        )),
        Err(e) => Err(map_domain_error(&e)),
    }
}

async fn check_in_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    match state.check_ins.progress(id).await {
        Ok(progress) => Ok(Json(ProgressResponse::from(progress))),
        Err(e) => Err(map_domain_error(&e)),
    }
}

async fn submit_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let user_id = acting_user(&headers)?;
    let follow_through = FollowThrough::from_str(&req.follow_through)
        .ok_or_else(|| bad_request(format!("invalid follow-through: {}", req.follow_through)))?;

    match state
        .gate
        .submit_review(id, user_id, follow_through, req.reflection_text)
        .await
    {
        Ok(review) => Ok((
            StatusCode::CREATED,
            Json(ReviewResponse {
                id: review.id,
                will_id: review.will_id,
                user_id: review.user_id,
                follow_through: review.follow_through.as_str().to_string(),
                reflection_text: review.reflection,
            }),
        )),
        Err(e) => Err(map_domain_error(&e)),
    }
}

async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<AcknowledgeResponse>, ApiError> {
    let user_id = acting_user(&headers)?;

    let ack = state
        .gate
        .acknowledge(id, user_id)
        .await
        .map_err(|e| map_domain_error(&e))?;
    let ready = state
        .gate
        .ready_for_new_will(id)
        .await
        .map_err(|e| map_domain_error(&e))?;

    Ok(Json(AcknowledgeResponse {
        id: ack.id,
        will_id: ack.will_id,
        user_id: ack.user_id,
        ready_for_new_will: ready,
    }))
}
