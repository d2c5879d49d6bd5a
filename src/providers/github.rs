//! GitHub OAuth provider
//!
//! Standards-based authorization-code flow: bearer token on the
//! user-info request, flat profile payload.

use serde::Deserialize;

use super::{OAuthProvider, ProviderKind, UserInfoAuth, UserProfile};
use crate::config::GitHubOAuthConfig;

/// GitHub `/user` payload
///
/// `email` is null when the user keeps it private.
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl OAuthProvider {
    /// Build the GitHub provider from configuration
    pub fn github(config: &GitHubOAuthConfig) -> Self {
        Self {
            kind: ProviderKind::GitHub,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            user_info_url: config.user_info_url.clone(),
            scopes: config.scopes.clone(),
            user_info_auth: UserInfoAuth::Bearer,
        }
    }
}

/// Project the GitHub payload into a `UserProfile`
pub(super) fn parse_profile(body: &[u8]) -> Result<UserProfile, serde_json::Error> {
    let user: GitHubUser = serde_json::from_slice(body)?;
    Ok(UserProfile {
        id: user.id,
        username: user.login,
        email: user.email,
        avatar_url: user.avatar_url,
    })
}
