// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for token and cookie settings, JWT_SECRET kept for deploy compatibility
// Decision: Registration and login tokens keep separate lifetimes

use anyhow::{bail, Result};
use std::time::Duration;

use super::verification::DEFAULT_CODE_TTL;

/// Registration tokens live 20 minutes unless overridden
pub const DEFAULT_REGISTER_TOKEN_LIFETIME: Duration = Duration::from_secs(20 * 60);

/// Login tokens live 24 hours unless overridden
pub const DEFAULT_LOGIN_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Lifetime of the token handed out at registration
    pub register_token_lifetime: Duration,
    /// Lifetime of the token handed out at login
    pub login_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            register_token_lifetime: DEFAULT_REGISTER_TOKEN_LIFETIME,
            login_token_lifetime: DEFAULT_LOGIN_TOKEN_LIFETIME,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Mark the session cookie Secure (HTTPS only)
    pub cookie_secure: bool,
    /// How long a verification code stays valid
    pub verification_code_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie_secure: false,
            verification_code_ttl: DEFAULT_CODE_TTL,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// In dev mode a missing JWT_SECRET is replaced by a random one; otherwise
    /// it is an error.
    pub fn from_env(dev_mode: bool) -> Result<Self> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if dev_mode => {
                tracing::warn!("JWT_SECRET not set, generating a random secret for dev mode");
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            }
            _ => bail!("JWT_SECRET environment variable required"),
        };

        let jwt = JwtConfig {
            secret,
            register_token_lifetime: duration_from_env(
                "AUTH_REGISTER_TOKEN_LIFETIME",
                DEFAULT_REGISTER_TOKEN_LIFETIME,
            ),
            login_token_lifetime: duration_from_env(
                "AUTH_LOGIN_TOKEN_LIFETIME",
                DEFAULT_LOGIN_TOKEN_LIFETIME,
            ),
        };

        let cookie_secure = std::env::var("AUTH_COOKIE_SECURE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Ok(Self {
            jwt,
            cookie_secure,
            verification_code_ttl: duration_from_env(
                "AUTH_VERIFICATION_CODE_TTL",
                DEFAULT_CODE_TTL,
            ),
        })
    }
}

/// Read a whole number of seconds, falling back on missing or unparsable values
fn duration_from_env(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
