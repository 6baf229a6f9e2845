// Server configuration loaded from environment variables.
// Decision: backend.env is read first, then .env; real environment variables win over both
// Decision: No DATABASE_URL means dev mode with in-memory storage

use anyhow::{Context, Result};
use axum::http::HeaderValue;

use crate::auth::AuthConfig;

/// Load `backend.env` and `.env` into the process environment if present
pub fn load_env_files() {
    if let Ok(path) = dotenvy::from_filename("backend.env") {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// PostgreSQL URL; None selects in-memory storage
    pub database_url: Option<String>,
    /// Origins allowed for cross-origin requests; empty disables CORS
    pub cors_allowed_origins: Vec<HeaderValue>,
    /// Authentication settings
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match std::env::var("APP_PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("APP_PORT is not a valid port: {}", port))?,
            Err(_) => 8080,
        };

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty());

        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
            .unwrap_or_default();

        let auth = AuthConfig::from_env(database_url.is_none())?;

        Ok(Self {
            host,
            port,
            database_url,
            cors_allowed_origins,
            auth,
        })
    }

    /// Whether storage runs in memory
    pub fn is_dev_mode(&self) -> bool {
        self.database_url.is_none()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
