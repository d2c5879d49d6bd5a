//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)
//!
//! Flat legacy environment variables (`SESSION_KEY`, `GITHUB_CLIENT_ID`,
//! ...) override everything else.

use serde::Deserialize;
use std::net::IpAddr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "login.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://login.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 604800 = 7 days)
    pub session_max_age: i64,
    #[serde(default)]
    pub github: GitHubOAuthConfig,
    #[serde(default)]
    pub clickup: ClickUpOAuthConfig,
}

/// GitHub OAuth endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with the GitHub OAuth app
    #[serde(default = "default_github_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_github_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_github_token_url")]
    pub token_url: String,
    #[serde(default = "default_github_user_info_url")]
    pub user_info_url: String,
    /// OAuth scopes requested at authorization
    #[serde(default = "default_github_scopes")]
    pub scopes: Vec<String>,
}

impl Default for GitHubOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_github_redirect_uri(),
            auth_url: default_github_auth_url(),
            token_url: default_github_token_url(),
            user_info_url: default_github_user_info_url(),
            scopes: default_github_scopes(),
        }
    }
}

fn default_github_redirect_uri() -> String {
    "http://localhost:8080/callback".to_string()
}

fn default_github_auth_url() -> String {
    "https://github.com/login/oauth/authorize".to_string()
}

fn default_github_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_github_user_info_url() -> String {
    "https://api.github.com/user".to_string()
}

fn default_github_scopes() -> Vec<String> {
    vec!["user:email".to_string(), "read:user".to_string()]
}

/// ClickUp OAuth endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ClickUpOAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Redirect URI registered with the ClickUp app
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default = "default_clickup_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_clickup_token_url")]
    pub token_url: String,
    #[serde(default = "default_clickup_user_info_url")]
    pub user_info_url: String,
}

impl Default for ClickUpOAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            auth_url: default_clickup_auth_url(),
            token_url: default_clickup_token_url(),
            user_info_url: default_clickup_user_info_url(),
        }
    }
}

fn default_clickup_auth_url() -> String {
    "https://app.clickup.com/api".to_string()
}

fn default_clickup_token_url() -> String {
    "https://api.clickup.com/api/v2/oauth/token".to_string()
}

fn default_clickup_user_info_url() -> String {
    "https://api.clickup.com/api/v2/user".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GATEHOUSE_*)
    /// 5. Flat legacy environment variables (SESSION_KEY, GITHUB_CLIENT_ID, ...)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.domain", "localhost")?
            .set_default("server.protocol", "http")?
            .set_default("auth.session_max_age", 604800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (GATEHOUSE_*)
            .add_source(
                Environment::with_prefix("GATEHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            // Flat legacy variables win over all sources
            .set_override_option("auth.session_secret", env_var("SESSION_KEY"))?
            .set_override_option("auth.github.client_id", env_var("GITHUB_CLIENT_ID"))?
            .set_override_option("auth.github.client_secret", env_var("GITHUB_CLIENT_SECRET"))?
            .set_override_option("auth.clickup.client_id", env_var("CLICKUP_CLIENT_ID"))?
            .set_override_option("auth.clickup.client_secret", env_var("CLICKUP_CLIENT_SECRET"))?
            .set_override_option("auth.clickup.redirect_uri", env_var("CLICKUP_REDIRECT_URI"))?
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.as_bytes().len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        if self.auth.github.client_id.is_empty() {
            tracing::warn!("auth.github.client_id is empty; GitHub login will produce a malformed authorization URL");
        }
        if self.auth.clickup.client_id.is_empty() {
            tracing::warn!("auth.clickup.client_id is empty; ClickUp login will produce a malformed authorization URL");
        }

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure session cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            auth: AuthConfig {
                session_secret: "x".repeat(32),
                session_max_age: 604_800,
                github: GitHubOAuthConfig {
                    client_id: "github-client-id".to_string(),
                    client_secret: "github-client-secret".to_string(),
                    ..GitHubOAuthConfig::default()
                },
                clickup: ClickUpOAuthConfig {
                    client_id: "clickup-client-id".to_string(),
                    client_secret: "clickup-client-secret".to_string(),
                    redirect_uri: "http://localhost:8080/clickup/callback".to_string(),
                    ..ClickUpOAuthConfig::default()
                },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(!config.should_use_secure_cookies());
    }

    #[test]
    fn validate_rejects_short_session_secret() {
        let mut config = valid_config();
        config.auth.session_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("session secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.session_secret")
        ));
    }

    #[test]
    fn validate_rejects_non_positive_session_max_age() {
        let mut config = valid_config();
        config.auth.session_max_age = 0;

        let error = config
            .validate()
            .expect_err("zero session max age must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.session_max_age")
        ));
    }

    #[test]
    fn validate_rejects_http_for_non_local_domain() {
        let mut config = valid_config();
        config.server.domain = "login.example.com".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }

    #[test]
    fn github_defaults_point_at_github() {
        let github = GitHubOAuthConfig::default();
        assert_eq!(github.auth_url, "https://github.com/login/oauth/authorize");
        assert_eq!(
            github.token_url,
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(github.user_info_url, "https://api.github.com/user");
        assert!(github.scopes.contains(&"user:email".to_string()));
    }

    #[test]
    fn clickup_defaults_point_at_clickup() {
        let clickup = ClickUpOAuthConfig::default();
        assert_eq!(clickup.auth_url, "https://app.clickup.com/api");
        assert_eq!(
            clickup.token_url,
            "https://api.clickup.com/api/v2/oauth/token"
        );
        assert_eq!(clickup.user_info_url, "https://api.clickup.com/api/v2/user");
    }
}
