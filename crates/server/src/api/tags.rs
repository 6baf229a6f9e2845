// Tag HTTP routes
// Tags are addressed by (object_id, tagName); only the article author may change them.

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
use funpage_core::Tag;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{parse_json, parse_query, ApiError, ApiResponse, ErrorResponse};
use super::news::ObjectIdQuery;
use super::validation::validate_tag;
use crate::auth::{require_auth, AuthState, AuthUser};
use crate::services::TagService;
use crate::storage::{models::UpdateTag, StorageBackend};

/// Tag payload for add and update
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TagRequest {
    #[schema(example = "events")]
    pub tag: String,
    #[schema(example = "#ff8800")]
    pub color: String,
}

/// Address of a single tag
#[derive(Debug, Deserialize, IntoParams)]
pub struct TagAddressQuery {
    /// News ID
    pub object_id: Uuid,
    /// Current tag name
    #[serde(rename = "tagName")]
    pub tag_name: String,
}

/// App state for tag routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TagService>,
}

impl AppState {
    pub fn new(db: StorageBackend) -> Self {
        Self {
            service: Arc::new(TagService::new(db)),
        }
    }
}

/// Create tag routes
pub fn routes(state: AppState, auth: AuthState) -> Router {
    let protected = Router::new()
        .route("/app/tag/add", post(add_tag))
        .route("/app/tag/update", put(update_tag))
        .route("/app/tag/delete", delete(delete_tag))
        .route_layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        .route("/app/tag/get", get(list_tags))
        .merge(protected)
        .with_state(state)
}

/// POST /app/tag/add - Attach a tag to a news article
#[utoipa::path(
    post,
    path = "/app/tag/add",
    params(ObjectIdQuery),
    request_body = TagRequest,
    responses(
        (status = 201, description = "Tag added", body = ApiResponse<Tag>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the article author", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse),
        (status = 409, description = "Tag already exists", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn add_tag(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ObjectIdQuery>, QueryRejection>,
    body: Result<Json<TagRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Tag>>), ApiError> {
    let query = parse_query(query)?;
    let req = parse_json(body)?;
    validate_tag(&req.tag, &req.color)?;

    let tag = state
        .service
        .add(&user, query.object_id, req.tag, req.color)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Tag added successfully", tag)),
    ))
}

/// GET /app/tag/get - List tags of a news article
#[utoipa::path(
    get,
    path = "/app/tag/get",
    params(ObjectIdQuery),
    responses(
        (status = 200, description = "Tags of the article", body = ApiResponse<Vec<Tag>>),
        (status = 400, description = "Invalid object_id", body = ErrorResponse),
        (status = 404, description = "News not found", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    query: Result<Query<ObjectIdQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Tag>>>, ApiError> {
    let query = parse_query(query)?;
    let tags = state.service.list(query.object_id).await?;
    Ok(Json(ApiResponse::data(tags)))
}

/// PUT /app/tag/update - Rename or recolor a tag
#[utoipa::path(
    put,
    path = "/app/tag/update",
    params(TagAddressQuery),
    request_body = TagRequest,
    responses(
        (status = 200, description = "Tag updated", body = ApiResponse<Tag>),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the article author", body = ErrorResponse),
        (status = 404, description = "News or tag not found", body = ErrorResponse),
        (status = 409, description = "Tag already exists", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<TagAddressQuery>, QueryRejection>,
    body: Result<Json<TagRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Tag>>, ApiError> {
    let query = parse_query(query)?;
    let req = parse_json(body)?;
    validate_tag(&req.tag, &req.color)?;

    let tag = state
        .service
        .update(
            &user,
            query.object_id,
            &query.tag_name,
            UpdateTag {
                name: req.tag,
                color: req.color,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message("Tag updated successfully", tag)))
}

/// DELETE /app/tag/delete - Remove a tag from a news article
#[utoipa::path(
    delete,
    path = "/app/tag/delete",
    params(TagAddressQuery),
    responses(
        (status = 200, description = "Tag deleted", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not the article author", body = ErrorResponse),
        (status = 404, description = "News or tag not found", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<TagAddressQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let query = parse_query(query)?;
    state
        .service
        .delete(&user, query.object_id, &query.tag_name)
        .await?;
    Ok(Json(ApiResponse::message("Tag deleted successfully")))
}
