//! Common test utilities for E2E tests

use std::sync::Once;

use gatehouse::auth::{Session, create_session_token};
use gatehouse::providers::ProviderKind;
use gatehouse::{AppState, config};
use tokio::net::TcpListener;

/// Session secret shared by all test servers (32 bytes)
pub const SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

static INIT_METRICS: Once = Once::new();

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub config: config::AppConfig,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a test server whose provider endpoints are unreachable
    ///
    /// Good enough for every test that never triggers a provider call.
    pub async fn new() -> Self {
        // Port 9 (discard) refuses connections on loopback
        Self::with_provider_base("http://127.0.0.1:9").await
    }

    /// Create a test server with token/user-info endpoints under `base`
    ///
    /// GitHub endpoints live under `{base}/github/*`, ClickUp endpoints
    /// under `{base}/clickup/*`, so a single mock server can play both
    /// providers.
    pub async fn with_provider_base(base: &str) -> Self {
        let config = test_config(base);

        // Initialize app state
        let state = AppState::new(config.clone()).unwrap();

        // HTTP client that never follows redirects; the OAuth flows are
        // all about inspecting Location and Set-Cookie headers.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = gatehouse::build_router(state);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            config,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }
}

/// Create the test configuration, with provider endpoints under `base`
pub fn test_config(base: &str) -> config::AppConfig {
    INIT_METRICS.call_once(gatehouse::metrics::init_metrics);

    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
        },
        auth: config::AuthConfig {
            session_secret: SESSION_SECRET.to_string(),
            session_max_age: 604800,
            github: config::GitHubOAuthConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                redirect_uri: "http://localhost:8080/callback".to_string(),
                token_url: format!("{base}/github/token"),
                user_info_url: format!("{base}/github/user"),
                ..config::GitHubOAuthConfig::default()
            },
            clickup: config::ClickUpOAuthConfig {
                client_id: "test-clickup-id".to_string(),
                client_secret: "test-clickup-secret".to_string(),
                redirect_uri: "http://localhost:8080/clickup/callback".to_string(),
                token_url: format!("{base}/clickup/token"),
                user_info_url: format!("{base}/clickup/user"),
                ..config::ClickUpOAuthConfig::default()
            },
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Build a valid `session=...` cookie header value
pub fn session_cookie_for(email: &str, username: &str, provider: ProviderKind) -> String {
    let session = Session::new(email.to_string(), username.to_string(), provider, 604800);
    let token = create_session_token(&session, SESSION_SECRET).unwrap();
    format!("session={token}")
}

/// Extract the `session=...` pair from a response's Set-Cookie header
pub fn session_cookie_from(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session="))
        .map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}
