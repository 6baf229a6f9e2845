// Funpage API server
// Decision: PostgreSQL when DATABASE_URL is set, in-memory storage otherwise
// Decision: Graceful shutdown on Ctrl-C and SIGTERM

use anyhow::{Context, Result};
use axum::extract::{MatchedPath, Request};
use axum::http::{header, Method};
use funpage_core::telemetry::{init_telemetry, TelemetryConfig};
use funpage_server::auth::verification::{spawn_sweeper, SWEEP_INTERVAL};
use funpage_server::auth::AuthState;
use funpage_server::build_app;
use funpage_server::config::{load_env_files, ServerConfig};
use funpage_server::storage::StorageBackend;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info_span, Span};

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();

    // Configure via environment variables:
    // - RUST_LOG: Log filter (default: "funpage_server=debug,tower_http=debug")
    // - LOG_FORMAT: "json" for JSON lines
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter = Some("funpage_server=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("funpage-server starting...");

    let config = ServerConfig::from_env().context("Invalid configuration")?;

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (dev mode)");
            StorageBackend::in_memory()
        }
    };

    tracing::info!(
        register_token_lifetime_secs = config.auth.jwt.register_token_lifetime.as_secs(),
        login_token_lifetime_secs = config.auth.jwt.login_token_lifetime.as_secs(),
        cookie_secure = config.auth.cookie_secure,
        dev_mode = config.is_dev_mode(),
        "Authentication configured"
    );

    let auth_state = AuthState::new(config.auth.clone(), db.clone());
    let sweeper = spawn_sweeper(auth_state.codes.clone(), SWEEP_INTERVAL);

    let app = build_app(db, auth_state);

    // Add CORS layer only if origins are configured
    let app = if config.cors_allowed_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
        app
    } else {
        tracing::info!(origins = ?config.cors_allowed_origins, "CORS origins configured");
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_allowed_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        )
    };

    let app = app.layer(TraceLayer::new_for_http().make_span_with(make_span));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn make_span(request: &Request) -> Span {
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        method = %request.method(),
        path = %matched_path,
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
