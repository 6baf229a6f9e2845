// Funpage server library
// Decision: Router assembly lives here so the binary and integration tests share it

// API routes and types
pub mod api;

// Authentication module
pub mod auth;

// Environment configuration
pub mod config;

// Services layer
pub mod services;

// Storage layer
pub mod storage;

// OpenAPI document generation
pub mod openapi;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AuthState;
use crate::storage::StorageBackend;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// Build the full application router: health, auth, content routes and Swagger UI
pub fn build_app(db: StorageBackend, auth_state: AuthState) -> Router {
    let news_state = api::news::AppState::new(db.clone());
    let tags_state = api::tags::AppState::new(db.clone());
    let comments_state = api::comments::AppState::new(db.clone());
    let health_state = HealthState { storage: db.kind() };

    Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(auth::routes(auth_state.clone()))
        .merge(api::news::routes(news_state, auth_state.clone()))
        .merge(api::tags::routes(tags_state, auth_state.clone()))
        .merge(api::comments::routes(comments_state, auth_state))
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-doc/openapi.json", openapi::ApiDoc::openapi()),
        )
}
