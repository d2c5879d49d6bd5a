//! ClickUp OAuth provider
//!
//! ClickUp's user-info endpoint wants the raw access token in the
//! Authorization header, no scheme prefix, and nests the profile under
//! a `user` object.

use serde::Deserialize;

use super::{OAuthProvider, ProviderKind, UserInfoAuth, UserProfile};
use crate::config::ClickUpOAuthConfig;

/// ClickUp `/api/v2/user` payload
#[derive(Debug, Deserialize)]
struct ClickUpUser {
    user: ClickUpUserInner,
}

#[derive(Debug, Deserialize)]
struct ClickUpUserInner {
    id: i64,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "profilePicture")]
    profile_picture: Option<String>,
}

impl OAuthProvider {
    /// Build the ClickUp provider from configuration
    pub fn clickup(config: &ClickUpOAuthConfig) -> Self {
        Self {
            kind: ProviderKind::ClickUp,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            user_info_url: config.user_info_url.clone(),
            scopes: Vec::new(),
            user_info_auth: UserInfoAuth::RawToken,
        }
    }
}

/// Project the ClickUp payload into a `UserProfile`
pub(super) fn parse_profile(body: &[u8]) -> Result<UserProfile, serde_json::Error> {
    let payload: ClickUpUser = serde_json::from_slice(body)?;
    Ok(UserProfile {
        id: payload.user.id,
        username: payload.user.username,
        email: payload.user.email,
        avatar_url: payload.user.profile_picture,
    })
}
