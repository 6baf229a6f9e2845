// Authentication HTTP routes
// Decision: Keep the /app/auth/* paths existing clients already call
// Decision: Tokens are returned in the body and set as an HttpOnly cookie scoped to /app

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use funpage_core::{Identity, Role};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use super::{
    middleware::{require_auth, AuthState, AuthUser, SESSION_COOKIE, SESSION_COOKIE_PATH},
    verification::{generate_code, is_valid_code_format},
};
use crate::api::common::{parse_json, ApiError, ApiResponse, ErrorResponse};
use crate::api::validation::{validate_password, validate_username};
use crate::services::ServiceError;
use crate::storage::{
    models::CreateUserRow,
    password::{hash_password, verify_password},
};

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    pub password: String,
}

/// Register request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: String,
    pub password: String,
}

/// Registration response
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
    /// Session token
    pub data: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Verification code confirmation
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmCodeRequest {
    #[schema(example = "042917")]
    pub code: String,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    let protected = Router::new()
        .route("/app/auth/logout", post(logout))
        .route("/app/auth/deleteAccount", delete(delete_account))
        .route("/app/auth/me", get(get_current_user))
        .route("/app/auth/verification/send", post(send_verification_code))
        .route("/app/auth/verification/confirm", post(confirm_verification_code))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/app/auth/register", post(register))
        .route("/app/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

fn session_cookie(state: &AuthState, token: String, lifetime: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path(SESSION_COOKIE_PATH)
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(cookie_max_age(lifetime))
        .build()
}

fn cookie_max_age(lifetime: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX))
}

/// Always emit an expired `jwt` cookie, whether or not the request carried one
fn clear_session_cookie(state: &AuthState, jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path(SESSION_COOKIE_PATH)
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    jar.add(cookie)
}

fn issue_token(
    state: &AuthState,
    user_id: &str,
    username: &str,
    role: Role,
    lifetime: Duration,
) -> Result<String, ApiError> {
    state
        .tokens
        .issue(user_id, username, role, lifetime)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Token generation error: {}", e)))
}

/// POST /app/auth/register - Register a new user
#[utoipa::path(
    post,
    path = "/app/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), ApiError> {
    let req = parse_json(body)?;
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    if state.db.get_user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .create_user(CreateUserRow {
            username: req.username,
            password_hash,
            role: Role::User.to_string(),
        })
        .await
        .map_err(ServiceError::from)?;

    let lifetime = state.config.jwt.register_token_lifetime;
    let token = issue_token(
        &state,
        &user.id.to_string(),
        &user.username,
        Role::User,
        lifetime,
    )?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let jar = jar.add(session_cookie(&state, token.clone(), lifetime));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            data: token,
        }),
    ))
}

/// POST /app/auth/login - Login with username and password
#[utoipa::path(
    post,
    path = "/app/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = TokenResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let req = parse_json(body)?;
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .db
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        tracing::debug!(username = %req.username, "Password mismatch");
        return Err(invalid());
    }

    let role: Role = user.role.parse().map_err(|e| {
        ApiError::Internal(anyhow::anyhow!("User {} has invalid role: {}", user.id, e))
    })?;

    let lifetime = state.config.jwt.login_token_lifetime;
    let token = issue_token(&state, &user.id.to_string(), &user.username, role, lifetime)?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    let jar = jar.add(session_cookie(&state, token.clone(), lifetime));
    Ok((jar, Json(TokenResponse { token })))
}

/// POST /app/auth/logout - Clear the session cookie
#[utoipa::path(
    post,
    path = "/app/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AuthState>,
    user: AuthUser,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<()>>) {
    tracing::info!(username = %user.username, "User logged out");
    (
        clear_session_cookie(&state, jar),
        Json(ApiResponse::message("User logged out successfully")),
    )
}

/// DELETE /app/auth/deleteAccount - Delete the current account
#[utoipa::path(
    delete,
    path = "/app/auth/deleteAccount",
    responses(
        (status = 200, description = "Account deleted", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn delete_account(
    State(state): State<AuthState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    if !state.db.delete_user_by_username(&user.username).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(username = %user.username, "Account deleted");
    Ok((
        clear_session_cookie(&state, jar),
        Json(ApiResponse::message("Account deleted successfully")),
    ))
}

/// GET /app/auth/me - Identity bound to the current token
#[utoipa::path(
    get,
    path = "/app/auth/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(user: AuthUser) -> Json<Identity> {
    Json(user.0)
}

/// POST /app/auth/verification/send - Issue a verification code
#[utoipa::path(
    post,
    path = "/app/auth/verification/send",
    responses(
        (status = 200, description = "Code issued", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn send_verification_code(
    State(state): State<AuthState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let code = generate_code();
    state.codes.save(&user.username, &code).await?;
    state.code_sender.send(&user.username, &code).await?;

    Ok(Json(ApiResponse::message("Verification code sent")))
}

/// POST /app/auth/verification/confirm - Consume a verification code
#[utoipa::path(
    post,
    path = "/app/auth/verification/confirm",
    request_body = ConfirmCodeRequest,
    responses(
        (status = 200, description = "Account verified", body = ApiResponse<String>),
        (status = 400, description = "Invalid or expired code", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn confirm_verification_code(
    State(state): State<AuthState>,
    user: AuthUser,
    body: Result<Json<ConfirmCodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let req = parse_json(body)?;
    if !is_valid_code_format(&req.code) {
        return Err(ApiError::Validation(
            "Verification code must be 6 digits".to_string(),
        ));
    }

    if !state.codes.check(&user.username, &req.code).await? {
        tracing::debug!(username = %user.username, "Verification code rejected");
        return Err(ApiError::Validation(
            "Invalid or expired verification code".to_string(),
        ));
    }

    if !state.db.mark_user_verified(&user.username).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(username = %user.username, "Account verified");
    Ok(Json(ApiResponse::message("Account verified")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::storage::StorageBackend;

    fn state() -> AuthState {
        AuthState::new(AuthConfig::default(), StorageBackend::in_memory())
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&state(), "tok".to_string(), Duration::from_secs(1200));
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some(SESSION_COOKIE_PATH));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(1200)));
    }

    #[test]
    fn test_huge_lifetime_saturates_max_age() {
        assert_eq!(
            cookie_max_age(Duration::MAX),
            time::Duration::seconds(i64::MAX)
        );
    }

    #[test]
    fn test_clear_cookie_without_incoming_cookie() {
        let jar = clear_session_cookie(&state(), CookieJar::new());
        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some(SESSION_COOKIE_PATH));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
