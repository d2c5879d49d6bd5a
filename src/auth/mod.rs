//! OAuth2 authentication flows
//!
//! Handles:
//! - Login redirects to the provider consent page
//! - OAuth callbacks (code exchange, profile fetch, session cookie)
//! - Logout and the auth-state-dependent home pages

mod handlers;
pub mod session;

pub use handlers::{clickup_router, github_router, render_home};
pub use session::{COOKIE_NAME, Session, create_session_token, verify_session_token};
