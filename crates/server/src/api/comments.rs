// Comment HTTP routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use funpage_core::Comment;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{parse_json, parse_query, ApiError, ApiResponse, ErrorResponse};
use super::validation::validate_comment;
use crate::auth::{require_auth, AuthState, AuthUser};
use crate::services::CommentService;
use crate::storage::StorageBackend;

/// Comment body for add and update
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentRequest {
    #[schema(example = "Great news!")]
    pub content: String,
}

/// Article the comments belong to
#[derive(Debug, Deserialize, IntoParams)]
pub struct NewsIdQuery {
    /// News ID
    pub news_id: Uuid,
}

/// Address of a single comment
#[derive(Debug, Deserialize, IntoParams)]
pub struct CommentAddressQuery {
    /// News ID
    pub news_id: Uuid,
    /// Comment ID
    pub comment_id: Uuid,
}

/// App state for comment routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CommentService>,
}

impl AppState {
    pub fn new(db: StorageBackend) -> Self {
        Self {
            service: Arc::new(CommentService::new(db)),
        }
    }
}

/// Create comment routes
pub fn routes(state: AppState, auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/app/comment/add", post(add_comment))
        .route("/app/comment/updateByNewsID", put(update_comment))
        .route("/app/comment/deleteByNewsID", delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .route("/app/comment/getByNewsID", get(list_comments))
        .merge(protected)
        .with_state(state)
}

/// POST /app/comment/add - Comment on a news article
#[utoipa::path(
    post,
    path = "/app/comment/add",
    params(NewsIdQuery),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<Comment>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<NewsIdQuery>, QueryRejection>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), ApiError> {
    let query = parse_query(query)?;
    let req = parse_json(body)?;
    validate_comment(&req.content)?;

    let comment = state
        .service
        .add(&user, query.news_id, req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Comment added successfully", comment)),
    ))
}

/// GET /app/comment/getByNewsID - List comments of a news article
#[utoipa::path(
    get,
    path = "/app/comment/getByNewsID",
    params(NewsIdQuery),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<Comment>>),
        (status = 400, description = "Invalid news_id", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    query: Result<Query<NewsIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Comment>>>, ApiError> {
    let query = parse_query(query)?;
    let comments = state.service.list(query.news_id).await?;
    Ok(Json(ApiResponse::data(comments)))
}

/// PUT /app/comment/updateByNewsID - Edit a comment (commenter only)
#[utoipa::path(
    put,
    path = "/app/comment/updateByNewsID",
    params(CommentAddressQuery),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<Comment>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the commenter", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<CommentAddressQuery>, QueryRejection>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Comment>>, ApiError> {
    let query = parse_query(query)?;
    let req = parse_json(body)?;
    validate_comment(&req.content)?;

    let comment = state
        .service
        .update(&user, query.news_id, query.comment_id, req.content)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Comment updated successfully",
        comment,
    )))
}

/// DELETE /app/comment/deleteByNewsID - Delete a comment (commenter only)
#[utoipa::path(
    delete,
    path = "/app/comment/deleteByNewsID",
    params(CommentAddressQuery),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the commenter", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<CommentAddressQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let query = parse_query(query)?;
    state
        .service
        .delete(&user, query.news_id, query.comment_id)
        .await?;
    Ok(Json(ApiResponse::message("Comment deleted successfully")))
}
