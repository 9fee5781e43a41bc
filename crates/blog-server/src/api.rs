//! Post handlers for the blog server.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use blog_posts::{create_post, list_posts, NewPost, Post, PostError, MISSING_FIELDS_MESSAGE};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Body returned in place of storage details when they are not exposed.
const GENERIC_SERVER_ERROR: &str = "internal server error";

/// Request body for post creation.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported with the same message as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Response body for successful creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    /// The id assigned by the store.
    pub id: i64,
}

/// Response body for post listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListPostsResponse {
    pub posts: Vec<Post>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Logs a storage fault and builds the client-facing error for it.
fn server_fault(detail: String, expose_errors: bool) -> ApiError {
    tracing::error!(error = %detail, "storage operation failed");
    if expose_errors {
        ApiError::InternalServerError(detail)
    } else {
        ApiError::InternalServerError(GENERIC_SERVER_ERROR.to_string())
    }
}

/// Runs `op` against a pooled connection on the blocking thread pool.
///
/// Resolves only once the storage call has completed or failed.
async fn with_connection<T, F>(state: Arc<AppState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, PostError> + Send + 'static,
{
    let expose_errors = state.expose_errors;

    tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| server_fault(format!("db connection failed: {}", e), expose_errors))?;

        op(&*conn).map_err(|e| {
            if e.is_client_error() {
                ApiError::BadRequest(e.to_string())
            } else {
                server_fault(e.to_string(), expose_errors)
            }
        })
    })
    .await
    .map_err(|e| server_fault(format!("task join error: {}", e), expose_errors))?
}

/// Handler for `GET /posts`.
pub async fn list_posts_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ListPostsResponse>, ApiError> {
    let posts = with_connection(state, list_posts).await?;
    Ok(Json(ListPostsResponse { posts }))
}

/// Handler for `POST /posts`.
///
/// Validation happens before any connection is checked out, so a rejected
/// request never touches the store.
pub async fn create_post_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePostResponse>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "unreadable create post body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())
        }
    })?;

    let post = NewPost::new(payload.title, payload.content)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let id = with_connection(state, move |conn| create_post(conn, &post)).await?;

    tracing::info!(id, "created post");

    Ok((StatusCode::CREATED, Json(CreatePostResponse { id })))
}
