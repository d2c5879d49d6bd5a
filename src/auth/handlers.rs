//! OAuth login, callback, logout and home handlers
//!
//! Routes (GitHub unprefixed, ClickUp nested under /clickup):
//! - GET / - Auth-state-dependent home page
//! - GET /login - 307 redirect to the provider authorization URL
//! - GET /callback - Exchange code, fetch profile, set session cookie
//! - GET /logout - Expire the session cookie
//!
//! Both providers share the same flow functions; the per-provider
//! handlers only pick which `OAuthProvider` to run them against.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::session::{self, COOKIE_NAME, Session};
use crate::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{AUTH_CALLBACKS_TOTAL, AUTH_LOGINS_TOTAL, AUTH_LOGOUTS_TOTAL};
use crate::providers::{OAuthProvider, ProviderKind};

/// Create the GitHub flow router, mounted at the application root
pub fn github_router() -> Router<AppState> {
    Router::new()
        .route("/", get(github_home))
        .route("/login", get(github_login))
        .route("/callback", get(github_callback))
        .route("/logout", get(github_logout))
}

/// Create the ClickUp flow router, nested under /clickup
pub fn clickup_router() -> Router<AppState> {
    Router::new()
        .route("/", get(clickup_home))
        .route("/login", get(clickup_login))
        .route("/callback", get(clickup_callback))
        .route("/logout", get(clickup_logout))
}

/// Query parameters from the provider callback
///
/// GitHub also echoes the `state` parameter back; it is not read.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
}

// =============================================================================
// GitHub flow
// =============================================================================

async fn github_home(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let session = current_session(&state, &jar);
    render_home(ProviderKind::GitHub, session.as_ref())
}

async fn github_login(State(state): State<AppState>) -> Redirect {
    login_redirect(&state.github)
}

async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    handle_callback(&state, &state.github, query, jar).await
}

async fn github_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    logout(&state, ProviderKind::GitHub, jar)
}

// =============================================================================
// ClickUp flow
// =============================================================================

async fn clickup_home(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let session = current_session(&state, &jar);
    render_home(ProviderKind::ClickUp, session.as_ref())
}

async fn clickup_login(State(state): State<AppState>) -> Redirect {
    login_redirect(&state.clickup)
}

async fn clickup_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    handle_callback(&state, &state.clickup, query, jar).await
}

async fn clickup_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    logout(&state, ProviderKind::ClickUp, jar)
}

// =============================================================================
// Shared flow
// =============================================================================

/// Read and verify the session cookie
///
/// Any absent, tampered, or expired cookie means anonymous.
fn current_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    jar.get(COOKIE_NAME).and_then(|cookie| {
        session::verify_session_token(cookie.value(), &state.config.auth.session_secret)
    })
}

/// Issue the 307 redirect to the provider authorization URL
fn login_redirect(provider: &OAuthProvider) -> Redirect {
    let url = provider.authorization_url();
    AUTH_LOGINS_TOTAL
        .with_label_values(&[provider.kind.as_str()])
        .inc();
    tracing::debug!(provider = %provider.kind, "Redirecting to provider authorization URL");
    Redirect::temporary(&url)
}

/// Run the callback flow and record the outcome metric
async fn handle_callback(
    state: &AppState,
    provider: &OAuthProvider,
    query: CallbackQuery,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let result = callback_flow(state, provider, query, jar).await;
    let outcome = if result.is_ok() { "success" } else { "failure" };
    AUTH_CALLBACKS_TOTAL
        .with_label_values(&[provider.kind.as_str(), outcome])
        .inc();
    result
}

/// Exchange the authorization code, fetch the profile, set the session
///
/// # Steps
/// 1. Require the `code` query parameter
/// 2. Exchange code for an access token
/// 3. Fetch the user profile with the token
/// 4. Write email/username into a signed session cookie
/// 5. Redirect to the provider's home route
///
/// Failures are terminal for the request; the user restarts the login
/// flow manually.
async fn callback_flow(
    state: &AppState,
    provider: &OAuthProvider,
    query: CallbackQuery,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(AppError::MissingAuthorizationCode)?;

    let access_token = provider.exchange_code(&state.http_client, &code).await?;
    let profile = provider.fetch_profile(&state.http_client, &access_token).await?;

    let session = Session::new(
        profile.email.unwrap_or_default(),
        profile.username,
        provider.kind,
        state.config.auth.session_max_age,
    );
    let token = session::create_session_token(&session, &state.config.auth.session_secret)?;
    let jar = jar.add(session::session_cookie(
        token,
        state.config.auth.session_max_age,
        state.config.should_use_secure_cookies(),
    ));

    tracing::info!(
        provider = %provider.kind,
        username = %session.username,
        "User authenticated"
    );

    Ok((jar, Redirect::temporary(provider.kind.home_path())))
}

/// Expire the session cookie and redirect home
fn logout(state: &AppState, kind: ProviderKind, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.add(session::removal_cookie(
        state.config.should_use_secure_cookies(),
    ));
    AUTH_LOGOUTS_TOTAL.with_label_values(&[kind.as_str()]).inc();
    (jar, Redirect::temporary(kind.home_path()))
}

// =============================================================================
// Home pages
// =============================================================================

/// Render the home page for a provider flow
///
/// Pure function of session state: anonymous visitors get the login
/// link, authenticated visitors a welcome banner and logout link.
pub fn render_home(kind: ProviderKind, session: Option<&Session>) -> Html<String> {
    match kind {
        ProviderKind::GitHub => render_github_home(session),
        ProviderKind::ClickUp => render_clickup_home(session),
    }
}

fn render_github_home(session: Option<&Session>) -> Html<String> {
    match session {
        None => Html(r#"<a href="/login">Login with GitHub</a>"#.to_string()),
        Some(session) => {
            let email = html_escape::encode_text(&session.email);
            Html(format!(
                "<h1>Welcome, {email}!</h1>\n<a href=\"/logout\">Logout</a>"
            ))
        }
    }
}

fn render_clickup_home(session: Option<&Session>) -> Html<String> {
    match session {
        None => Html(
            r#"<html>
    <head>
        <title>ClickUp Auth</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }
            .container { background-color: white; padding: 30px; border-radius: 10px; text-align: center; }
            .login-btn { background-color: #7B68EE; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; font-weight: bold; }
        </style>
    </head>
    <body>
        <div class="container">
            <h1>Welcome to ClickUp Authentication</h1>
            <p>Click below to authenticate with your ClickUp account</p>
            <a href="/clickup/login" class="login-btn">Login with ClickUp</a>
        </div>
    </body>
</html>"#
                .to_string(),
        ),
        Some(session) => {
            let email = html_escape::encode_text(&session.email);
            Html(format!(
                r#"<html>
    <head>
        <title>ClickUp Auth - Welcome</title>
        <style>
            body {{ font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }}
            .container {{ background-color: white; padding: 30px; border-radius: 10px; text-align: center; }}
            .logout-btn {{ background-color: #DC143C; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; font-weight: bold; }}
        </style>
    </head>
    <body>
        <div class="container">
            <h1>Welcome, {email}!</h1>
            <p>You have successfully authenticated with ClickUp.</p>
            <a href="/clickup/logout" class="logout-btn">Logout</a>
        </div>
    </body>
</html>"#
            ))
        }
    }
}
