// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the comment gate service.
//!
//! The platform's comment and like handlers call these endpoints after
//! resolving the session and database facts, then perform the returned write
//! themselves. Throttled requests get `429` with `Retry-After`.

use crate::config::Config;
use crate::gate::{
    CommentDecision, CommentGate, CommentSubmission, LikeDecision, LikeError, LikeIntent,
    LikeSubmission, NewComment, UnlikeSubmission,
};
use crate::limiter::RateLimitResult;
use crate::moderation::Disposition;
use crate::validator::ValidationError;
use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared application state.
pub struct AppState {
    pub gate: CommentGate,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Comment admission request.
#[derive(Debug, Deserialize)]
pub struct CommentCheckRequest {
    /// Client token, usually the source IP
    pub token: String,
    #[serde(flatten)]
    pub submission: CommentSubmission,
}

/// Comment admission response.
#[derive(Debug, Serialize)]
pub struct CommentCheckResponse {
    pub comment: NewComment,
    pub disposition: Disposition,
    pub remaining: u32,
}

/// Like admission request.
#[derive(Debug, Deserialize)]
pub struct LikeCheckRequest {
    pub token: String,
    #[serde(flatten)]
    pub submission: LikeSubmission,
}

/// Like admission response.
#[derive(Debug, Serialize)]
pub struct LikeCheckResponse {
    pub like: LikeIntent,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/comments/check", post(check_comment))
        .route("/likes/check", post(check_like))
        .route("/likes/uncheck", post(check_unlike));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "comment-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.gate.metrics().render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Decide whether a comment may be created.
pub async fn check_comment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommentCheckRequest>,
) -> Response {
    debug!(
        token = %req.token,
        user_id = %req.submission.author.user_id,
        parent_id = ?req.submission.parent_id,
        "Processing comment check"
    );

    if let Some(rejection) = reject_blank_token(&req.token) {
        return rejection;
    }

    match state.gate.submit_comment(&req.token, &req.submission) {
        CommentDecision::RateLimited(limit) => too_many_requests(&limit),
        CommentDecision::Rejected(err) => validation_failure(&err),
        CommentDecision::Accepted {
            comment,
            disposition,
            rate_limit,
        } => {
            let mut response = (
                StatusCode::CREATED,
                Json(CommentCheckResponse {
                    comment,
                    disposition,
                    remaining: rate_limit.remaining,
                }),
            )
                .into_response();
            insert_rate_headers(&mut response, &rate_limit);
            response
        }
    }
}

/// Decide whether a like may be recorded.
pub async fn check_like(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LikeCheckRequest>,
) -> Response {
    if let Some(rejection) = reject_blank_token(&req.token) {
        return rejection;
    }

    match state.gate.submit_like(&req.token, &req.submission) {
        LikeDecision::RateLimited(limit) => too_many_requests(&limit),
        LikeDecision::Rejected(err) => like_failure(&err),
        LikeDecision::Accepted(like) => (
            StatusCode::OK,
            Json(LikeCheckResponse { like }),
        )
            .into_response(),
    }
}

/// Decide whether a like may be removed.
pub async fn check_unlike(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UnlikeSubmission>,
) -> Response {
    match state.gate.submit_unlike(&req) {
        LikeDecision::Rejected(err) => like_failure(&err),
        LikeDecision::Accepted(like) => (
            StatusCode::OK,
            Json(LikeCheckResponse { like }),
        )
            .into_response(),
        LikeDecision::RateLimited(limit) => too_many_requests(&limit),
    }
}

fn reject_blank_token(token: &str) -> Option<Response> {
    if !token.trim().is_empty() {
        return None;
    }
    Some(
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Client token is required".to_string(),
                code: "INVALID_TOKEN",
                retry_after_secs: None,
            }),
        )
            .into_response(),
    )
}

fn too_many_requests(limit: &RateLimitResult) -> Response {
    let retry_secs = limit.retry_after_secs();
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_secs.to_string())],
        Json(ErrorResponse {
            error: "Too many requests. Please try again later.".to_string(),
            code: "RATE_LIMITED",
            retry_after_secs: Some(retry_secs),
        }),
    )
        .into_response();
    insert_rate_headers(&mut response, limit);
    response
}

fn insert_rate_headers(response: &mut Response, limit: &RateLimitResult) {
    let headers = response.headers_mut();
    let pairs = [
        ("x-ratelimit-limit", limit.limit.to_string()),
        ("x-ratelimit-remaining", limit.remaining.to_string()),
        ("x-ratelimit-reset", limit.reset.timestamp().to_string()),
    ];
    for (name, value) in pairs {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

fn validation_failure(err: &ValidationError) -> Response {
    let status = match err {
        ValidationError::EmptyContent
        | ValidationError::ContentTooLong { .. }
        | ValidationError::ReplyToReply => StatusCode::BAD_REQUEST,
        ValidationError::AuthorBanned | ValidationError::CommentsDisabled => StatusCode::FORBIDDEN,
        ValidationError::ArticleUnavailable | ValidationError::ParentNotFound => {
            StatusCode::NOT_FOUND
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code(),
            retry_after_secs: None,
        }),
    )
        .into_response()
}

fn like_failure(err: &LikeError) -> Response {
    let status = match err {
        LikeError::AlreadyLiked => StatusCode::BAD_REQUEST,
        LikeError::CommentNotFound | LikeError::LikeNotFound => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code(),
            retry_after_secs: None,
        }),
    )
        .into_response()
}
