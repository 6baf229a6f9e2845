// News HTTP routes
// Decision: Query-parameter addressing (?object_id=) kept for existing clients

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
use funpage_core::News;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{parse_json, parse_query, ApiError, ApiResponse, ErrorResponse};
use super::validation::{validate_content, validate_title};
use crate::auth::{require_auth, AuthState, AuthUser};
use crate::services::NewsService;
use crate::storage::{models::UpdateNews, StorageBackend};

/// Request to create a news article
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateNewsRequest {
    #[schema(example = "Campus library opens late")]
    pub title: String,
    #[schema(example = "Starting Monday the library stays open until midnight.")]
    pub content: String,
}

/// Request to update a news article. Only provided fields are changed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Article address
#[derive(Debug, Deserialize, IntoParams)]
pub struct ObjectIdQuery {
    /// News ID
    pub object_id: Uuid,
}

/// Author filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct AuthorQuery {
    /// Author username
    pub author: String,
}

/// Tag filter
#[derive(Debug, Deserialize, IntoParams)]
pub struct TagQuery {
    /// Tag name
    pub tag: String,
}

/// App state for news routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

impl AppState {
    pub fn new(db: StorageBackend) -> Self {
        Self {
            service: Arc::new(NewsService::new(db)),
        }
    }
}

/// Create news routes
pub fn routes(state: AppState, auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/app/news/create", post(create_news))
        .route("/app/news/updateByID", put(update_news))
        .route("/app/news/deleteByID", delete(delete_news))
        .route_layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .route("/app/news/getByID", get(get_news))
        .route("/app/news/getByAuthor", get(get_news_by_author))
        .route("/app/news/getByTag", get(get_news_by_tag))
        .merge(protected)
        .with_state(state)
}

/// POST /app/news/create - Create a news article
#[utoipa::path(
    post,
    path = "/app/news/create",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "News created", body = ApiResponse<News>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn create_news(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<CreateNewsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<News>>), ApiError> {
    let req = parse_json(body)?;
    validate_title(&req.title)?;
    validate_content(&req.content)?;

    let news = state.service.create(&user, req.title, req.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("News created successfully", news)),
    ))
}

/// GET /app/news/getByID - Get a news article
#[utoipa::path(
    get,
    path = "/app/news/getByID",
    params(ObjectIdQuery),
    responses(
        (status = 200, description = "News found", body = ApiResponse<News>),
        (status = 400, description = "Invalid object_id", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn get_news(
    State(state): State<AppState>,
    query: Result<Query<ObjectIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<News>>, ApiError> {
    let query = parse_query(query)?;
    let news = state.service.get(query.object_id).await?;
    Ok(Json(ApiResponse::data(news)))
}

/// GET /app/news/getByAuthor - List news by author
#[utoipa::path(
    get,
    path = "/app/news/getByAuthor",
    params(AuthorQuery),
    responses(
        (status = 200, description = "News by author", body = ApiResponse<Vec<News>>),
        (status = 400, description = "Missing author", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn get_news_by_author(
    State(state): State<AppState>,
    query: Result<Query<AuthorQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<News>>>, ApiError> {
    let query = parse_query(query)?;
    let news = state.service.list_by_author(&query.author).await?;
    Ok(Json(ApiResponse::data(news)))
}

/// GET /app/news/getByTag - List news carrying a tag
#[utoipa::path(
    get,
    path = "/app/news/getByTag",
    params(TagQuery),
    responses(
        (status = 200, description = "News with tag", body = ApiResponse<Vec<News>>),
        (status = 400, description = "Missing tag", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn get_news_by_tag(
    State(state): State<AppState>,
    query: Result<Query<TagQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<News>>>, ApiError> {
    let query = parse_query(query)?;
    let news = state.service.list_by_tag(&query.tag).await?;
    Ok(Json(ApiResponse::data(news)))
}

/// PUT /app/news/updateByID - Update a news article (author only)
#[utoipa::path(
    put,
    path = "/app/news/updateByID",
    params(ObjectIdQuery),
    request_body = UpdateNewsRequest,
    responses(
        (status = 200, description = "News updated", body = ApiResponse<News>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn update_news(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ObjectIdQuery>, QueryRejection>,
    body: Result<Json<UpdateNewsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<News>>, ApiError> {
    let query = parse_query(query)?;
    let req = parse_json(body)?;

    if req.title.is_none() && req.content.is_none() {
        return Err(ApiError::Validation("Nothing to update".to_string()));
    }
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(content) = &req.content {
        validate_content(content)?;
    }

    let news = state
        .service
        .update(
            &user,
            query.object_id,
            UpdateNews {
                title: req.title,
                content: req.content,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(
        "News updated successfully",
        news,
    )))
}

/// DELETE /app/news/deleteByID - Delete a news article (author only)
#[utoipa::path(
    delete,
    path = "/app/news/deleteByID",
    params(ObjectIdQuery),
    responses(
        (status = 200, description = "News deleted", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn delete_news(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ObjectIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let query = parse_query(query)?;
    state.service.delete(&user, query.object_id).await?;
    Ok(Json(ApiResponse::message("News deleted successfully")))
}
