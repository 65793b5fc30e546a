use axum::{
    extract::State,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crewdesk_auth::{AuthDecision, AuthRequest, RequestAuthenticator, RequestMethod};

use crate::context::SessionContext;
use crate::surface::{SESSION_COOKIE, SessionCookie, Surface, api_denial};

#[derive(Clone)]
pub struct AuthState {
    pub pages: RequestAuthenticator,
    pub api: RequestAuthenticator,
    pub session_cookie: SessionCookie,
}

/// Authenticate every request before it reaches a handler.
///
/// The path picks the surface; the surface picks the policy table and how a
/// denial is rendered. Allowed API requests carry a [`SessionContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let surface = Surface::for_path(&path);
    let authenticator = match surface {
        Surface::Api => &state.api,
        Surface::Page => &state.pages,
    };

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let cookie = jar.get(SESSION_COOKIE).map(|c| c.value());

    let request = AuthRequest::new(&path, RequestMethod::from_http(req.method().as_str()))
        .with_authorization(authorization)
        .with_session_cookie(cookie);

    let decision = authenticator.decide(&request);

    match decision {
        AuthDecision::Allow(claims) => {
            if let (Surface::Api, Some(claims)) = (surface, claims) {
                req.extensions_mut()
                    .insert(SessionContext::from_claims(claims));
            }
            next.run(req).await
        }
        AuthDecision::Deny(reason) => {
            tracing::debug!(
                path = %path,
                surface = ?surface,
                reason = reason.as_str(),
                "request denied"
            );
            match surface {
                Surface::Api => api_denial(reason),
                Surface::Page => state.session_cookie.page_denial(reason, &path),
            }
        }
    }
}
