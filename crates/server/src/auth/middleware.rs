// Authentication middleware and extractors
// Decision: Support both header-based (API) and cookie-based (browser) auth
// Decision: The Authorization header wins; the cookie is only a fallback
// Decision: Rejections carry a generic message, the reason goes to the log

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use funpage_core::Identity;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

use super::{
    config::AuthConfig,
    jwt::TokenService,
    verification::{CodeSender, InMemoryVerificationStore, LogCodeSender, VerificationCodeStore},
};
use crate::storage::StorageBackend;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "jwt";

/// Path the session cookie is scoped to
pub const SESSION_COOKIE_PATH: &str = "/app";

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub tokens: Arc<TokenService>,
    pub db: StorageBackend,
    pub codes: Arc<dyn VerificationCodeStore>,
    pub code_sender: Arc<dyn CodeSender>,
}

impl AuthState {
    pub fn new(config: AuthConfig, db: StorageBackend) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt.secret));
        let codes = Arc::new(InMemoryVerificationStore::new(config.verification_code_ttl));
        Self {
            config,
            tokens,
            db,
            codes,
            code_sender: Arc::new(LogCodeSender),
        }
    }

    /// Replace the code delivery channel
    pub fn with_code_sender(mut self, sender: Arc<dyn CodeSender>) -> Self {
        self.code_sender = sender;
        self
    }
}

/// Authenticated user bound by [`require_auth`]
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl Deref for AuthUser {
    type Target = Identity;

    fn deref(&self) -> &Identity {
        &self.0
    }
}

/// Reads the identity placed in request extensions by [`require_auth`].
/// Returns 401 when the route was not wrapped by the gate.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::unauthorized("Authentication required"))
    }
}

/// Token from `Authorization: Bearer <token>`, or None when absent or malformed
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Find the session token, preferring the Authorization header over the cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token);
    }

    let jar = CookieJar::from_headers(headers);
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Auth gate: verify the session token and bind the identity to the request.
/// Any failure ends the request with 401 before the handler runs.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "No session token presented");
        AuthError::unauthorized("Authentication required")
    })?;

    let identity = state.tokens.verify(&token).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        AuthError::unauthorized("Invalid or expired token")
    })?;

    tracing::debug!(user = %identity.username, role = %identity.role, "Request authenticated");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_header() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&map), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let map = headers(&[(header::AUTHORIZATION, "bearer abc")]);
        assert_eq!(extract_token(&map), Some("abc".to_string()));
    }

    #[test]
    fn test_header_preferred_over_cookie() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "jwt=from-cookie"),
        ]);
        assert_eq!(extract_token(&map), Some("from-header".to_string()));
    }

    #[test]
    fn test_cookie_fallback_when_header_missing() {
        let map = headers(&[(header::COOKIE, "other=1; jwt=from-cookie")]);
        assert_eq!(extract_token(&map), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_cookie_fallback_when_header_malformed() {
        for bad in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "token-without-scheme"] {
            let map = headers(&[(header::AUTHORIZATION, bad), (header::COOKIE, "jwt=c")]);
            assert_eq!(extract_token(&map), Some("c".to_string()), "header: {bad}");
        }
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        let map = headers(&[(header::COOKIE, "jwt=")]);
        assert_eq!(extract_token(&map), None);
    }
}
