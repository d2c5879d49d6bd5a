//! Gatehouse - A lightweight OAuth2 login gateway
//!
//! Implements "login with provider" flows for GitHub and ClickUp:
//! redirect the user to the provider's authorization endpoint, exchange
//! the returned authorization code for an access token, fetch the user
//! profile, and persist the authenticated session in a signed cookie.
//!
//! # Modules
//!
//! - `auth`: login/callback/logout/home handlers and session cookies
//! - `providers`: per-provider OAuth2 endpoints and exchange logic
//! - `config`: configuration management
//! - `error`: error types
//! - `metrics`: Prometheus instruments and exposition route

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod providers;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Constructed once at startup and cloned per request. Read-only after
/// initialization; there is no other shared mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// GitHub OAuth provider
    pub github: Arc<providers::OAuthProvider>,

    /// ClickUp OAuth provider
    pub clickup: Arc<providers::OAuthProvider>,

    /// HTTP client for provider calls
    pub http_client: Arc<reqwest::Client>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the shared outbound HTTP client
    /// 2. Build the provider descriptors from configuration
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent("Gatehouse/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        let github = providers::OAuthProvider::github(&config.auth.github);
        let clickup = providers::OAuthProvider::clickup(&config.auth.clickup);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            github: Arc::new(github),
            clickup: Arc::new(clickup),
            http_client: Arc::new(http_client),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::trace::TraceLayer;

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::github_router())
        .nest("/clickup", auth::clickup_router())
        .merge(metrics::metrics_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
