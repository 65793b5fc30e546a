//! Turning auth decisions into HTTP responses.
//!
//! The same decision is materialised differently per surface: browsers get
//! redirects, API clients get JSON errors with a stable `code`.

use axum::{
    http::header,
    response::{IntoResponse, Redirect, Response},
};

use crewdesk_auth::{AuthError, DenyReason, LOGIN_PATH};

use crate::app::errors::auth_error_to_response;

/// Name of the cookie carrying the session token for browser navigation.
pub const SESSION_COOKIE: &str = "crewdesk_session";

/// Which adapter handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Page,
    Api,
}

impl Surface {
    /// `/api` and everything under `/api/` is the API surface.
    pub fn for_path(path: &str) -> Self {
        if path == "/api" || path.starts_with("/api/") {
            Surface::Api
        } else {
            Surface::Page
        }
    }
}

/// Builds `Set-Cookie` values for the session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCookie {
    secure: bool,
}

impl SessionCookie {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Cookie holding `token`, expiring with it.
    pub fn issue(&self, token: &str, max_age_secs: u64) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}{}",
            self.secure_flag()
        )
    }

    /// Cookie that makes the browser drop the session.
    pub fn clear(&self) -> String {
        format!(
            "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
            self.secure_flag()
        )
    }

    fn secure_flag(&self) -> &'static str {
        if self.secure { "; Secure" } else { "" }
    }

    /// Page adapter for a denied request to `path`.
    ///
    /// Missing or invalid sessions go to the login page with `path` as the
    /// `redirect` parameter; an invalid token also clears the cookie so a dead
    /// cookie cannot cause a redirect loop. A signed-in user without the
    /// needed role goes to their own landing page instead.
    pub fn page_denial(&self, reason: DenyReason, path: &str) -> Response {
        match reason {
            DenyReason::NoToken => Redirect::to(&login_location(path)).into_response(),
            DenyReason::InvalidToken(_) => (
                [(header::SET_COOKIE, self.clear())],
                Redirect::to(&login_location(path)),
            )
                .into_response(),
            DenyReason::InsufficientRole(role) => Redirect::to(role.landing_path()).into_response(),
        }
    }
}

/// `Location` for sending a browser to log in and come back to `path`.
pub fn login_location(path: &str) -> String {
    format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(path))
}

/// API adapter for a denied request:
/// 401 `UNAUTHORIZED`, 401 `INVALID_TOKEN` or 403 `FORBIDDEN`.
pub fn api_denial(reason: DenyReason) -> Response {
    auth_error_to_response(AuthError::from(reason))
}
