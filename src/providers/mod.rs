//! OAuth2 provider layer
//!
//! One `OAuthProvider` value per configured provider, built once at
//! startup. The provider carries the endpoint URLs and credentials and
//! knows how to build the authorization URL, exchange an authorization
//! code for an access token, and fetch the user profile.

mod clickup;
mod github;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Identifies which provider a flow talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    ClickUp,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::ClickUp => "clickup",
        }
    }

    /// Home route the provider's flow redirects back to
    pub fn home_path(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "/",
            ProviderKind::ClickUp => "/clickup",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the user-info request carries the access token
///
/// GitHub expects the standard `Bearer` scheme; ClickUp expects the raw
/// token string with no scheme prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInfoAuth {
    Bearer,
    RawToken,
}

/// User profile projected from a provider-specific payload
///
/// Read once per callback, written into the session, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Token endpoint response
///
/// Providers return more fields (token_type, scope) but only the access
/// token is consumed.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A configured OAuth2 provider
///
/// Static and read-only after initialization.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    pub kind: ProviderKind,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
    user_info_url: String,
    scopes: Vec<String>,
    user_info_auth: UserInfoAuth,
}

impl OAuthProvider {
    /// Build the provider authorization URL for the login redirect
    ///
    /// The GitHub flow includes `response_type`, `scope` and a random
    /// `state`; the ClickUp consent page only takes `client_id` and
    /// `redirect_uri`. The state value is not validated on callback.
    pub fn authorization_url(&self) -> String {
        let mut url = format!(
            "{}?client_id={}&redirect_uri={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
        );

        if !self.scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(&self.scopes.join(" ")));
        }

        match self.kind {
            ProviderKind::GitHub => {
                url.push_str("&response_type=code&state=");
                url.push_str(&random_state());
            }
            ProviderKind::ClickUp => {}
        }

        url
    }

    /// Exchange an authorization code for an access token
    ///
    /// Sends a form-encoded POST (`client_id`, `client_secret`, `code`)
    /// to the token endpoint. Transport errors, non-2xx statuses, and
    /// non-decodable bodies all surface as `TokenExchange`.
    pub async fn exchange_code(&self, http: &reqwest::Client, code: &str) -> Result<String> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
        ];

        let response = http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %self.kind,
                %status,
                "Token endpoint rejected the authorization code"
            );
            return Err(AppError::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;

        Ok(token.access_token)
    }

    /// Fetch the user profile with an access token
    ///
    /// The Authorization header scheme and the payload shape are the two
    /// points where the providers differ.
    pub async fn fetch_profile(
        &self,
        http: &reqwest::Client,
        access_token: &str,
    ) -> Result<UserProfile> {
        let request = http.get(&self.user_info_url);
        let request = match self.user_info_auth {
            UserInfoAuth::Bearer => request.bearer_auth(access_token),
            UserInfoAuth::RawToken => {
                request.header(reqwest::header::AUTHORIZATION, access_token)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ProfileFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                provider = %self.kind,
                %status,
                "User-info endpoint rejected the access token"
            );
            return Err(AppError::ProfileFetch(format!(
                "user-info endpoint returned {status}: {body}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::ProfileFetch(e.to_string()))?;

        let profile = match self.kind {
            ProviderKind::GitHub => github::parse_profile(&body),
            ProviderKind::ClickUp => clickup::parse_profile(&body),
        }
        .map_err(|e| AppError::ProfileFetch(e.to_string()))?;

        Ok(profile)
    }
}

/// Random value for the authorization URL `state` parameter
fn random_state() -> String {
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
