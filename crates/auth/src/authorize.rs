//! Per-request authentication decision.
//!
//! The authenticator is HTTP-agnostic. A surface adapter hands it the path,
//! the method and the raw token sources of a request, and turns the returned
//! [`AuthDecision`] into a response. Every request is decided on its own; the
//! authenticator keeps no state between requests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::claims::SessionClaims;
use crate::error::AuthError;
use crate::policy::{AccessLevel, RequestMethod, RoutePolicy};
use crate::token::{TokenService, extract_from_header};
use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Token source precedence
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Cookie,
}

/// A token picked from the request, not yet verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCandidate<'a> {
    pub source: TokenSource,
    pub token: &'a str,
}

/// Pick the token to verify.
///
/// A well-formed `Authorization: Bearer` header wins. A header that is present
/// but malformed is ignored and the session cookie is used instead. An empty
/// cookie counts as absent.
pub fn select_token<'a>(
    authorization: Option<&'a str>,
    cookie: Option<&'a str>,
) -> Option<TokenCandidate<'a>> {
    if let Some(header) = authorization {
        match extract_from_header(header) {
            Ok(token) => {
                return Some(TokenCandidate {
                    source: TokenSource::Header,
                    token,
                });
            }
            Err(_) => tracing::debug!("ignoring malformed authorization header"),
        }
    }

    cookie
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| TokenCandidate {
            source: TokenSource::Cookie,
            token,
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Decisions
// ─────────────────────────────────────────────────────────────────────────────

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFailure {
    Expired,
    Malformed,
}

impl From<&AuthError> for TokenFailure {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::TokenExpired => TokenFailure::Expired,
            _ => TokenFailure::Malformed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Neither a usable header nor a session cookie was sent.
    NoToken,
    /// A token was sent and failed verification.
    InvalidToken(TokenFailure),
    /// The caller is signed in, with this role, but the route needs a manager.
    InsufficientRole(Role),
}

impl DenyReason {
    /// Stable name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoToken => "no_token",
            DenyReason::InvalidToken(TokenFailure::Expired) => "token_expired",
            DenyReason::InvalidToken(TokenFailure::Malformed) => "token_malformed",
            DenyReason::InsufficientRole(_) => "insufficient_role",
        }
    }
}

impl From<DenyReason> for AuthError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NoToken => AuthError::NoTokenProvided,
            DenyReason::InvalidToken(TokenFailure::Expired) => AuthError::TokenExpired,
            DenyReason::InvalidToken(TokenFailure::Malformed) => AuthError::TokenMalformed,
            DenyReason::InsufficientRole(role) => AuthError::InsufficientRole(role),
        }
    }
}

/// Outcome of authenticating one request.
///
/// `Allow(None)` is a public route; `Allow(Some(_))` carries the verified
/// claims for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allow(Option<SessionClaims>),
    Deny(DenyReason),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthDecision::Allow(_))
    }
}

/// The parts of a request the authenticator looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRequest<'a> {
    pub path: &'a str,
    pub method: RequestMethod,
    /// Raw `Authorization` header value.
    pub authorization: Option<&'a str>,
    /// Raw session cookie value.
    pub session_cookie: Option<&'a str>,
}

impl<'a> AuthRequest<'a> {
    pub fn new(path: &'a str, method: RequestMethod) -> Self {
        Self {
            path,
            method,
            authorization: None,
            session_cookie: None,
        }
    }

    pub fn with_authorization(mut self, value: Option<&'a str>) -> Self {
        self.authorization = value;
        self
    }

    pub fn with_session_cookie(mut self, value: Option<&'a str>) -> Self {
        self.session_cookie = value;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authenticator
// ─────────────────────────────────────────────────────────────────────────────

/// Classifies a request against one policy table and checks its token.
///
/// One instance per surface; both share the same [`TokenService`].
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    tokens: TokenService,
    policy: Arc<RoutePolicy>,
}

impl RequestAuthenticator {
    pub fn new(tokens: TokenService, policy: RoutePolicy) -> Self {
        Self {
            tokens,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn decide(&self, request: &AuthRequest<'_>) -> AuthDecision {
        self.decide_at(request, Utc::now())
    }

    /// Decide as if the current time were `now`.
    pub fn decide_at(&self, request: &AuthRequest<'_>, now: DateTime<Utc>) -> AuthDecision {
        let access = self.policy.classify(request.path, request.method);
        if access == AccessLevel::Public {
            return AuthDecision::Allow(None);
        }

        let Some(candidate) = select_token(request.authorization, request.session_cookie) else {
            return AuthDecision::Deny(DenyReason::NoToken);
        };

        let claims = match self.tokens.verify_at(candidate.token, now) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(
                    path = request.path,
                    source = ?candidate.source,
                    error = %err,
                    "session token rejected"
                );
                return AuthDecision::Deny(DenyReason::InvalidToken(TokenFailure::from(&err)));
            }
        };

        if access == AccessLevel::ManagerOnly && !claims.role().is_manager() {
            return AuthDecision::Deny(DenyReason::InsufficientRole(claims.role()));
        }

        AuthDecision::Allow(Some(claims))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use crewdesk_core::{BusinessType, UserId};

    use super::*;
    use crate::claims::SessionIdentity;
    use crate::config::{SigningSecret, TokenLifetime};

    const SECRET: &str = "k3y-for-tests-0123456789-abcdefghij";

    fn tokens() -> TokenService {
        TokenService::new(&SigningSecret::new(SECRET).unwrap(), TokenLifetime::DEFAULT)
    }

    fn token_for(role: Role) -> String {
        tokens()
            .issue(SessionIdentity {
                user_id: UserId::new(),
                email: "pat@example.com".to_string(),
                role,
                business_type: BusinessType::new("bakery").unwrap(),
            })
            .unwrap()
            .token
    }

    fn api() -> RequestAuthenticator {
        RequestAuthenticator::new(tokens(), RoutePolicy::api())
    }

    fn pages() -> RequestAuthenticator {
        RequestAuthenticator::new(tokens(), RoutePolicy::pages())
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn header_beats_cookie() {
        let picked = select_token(Some("Bearer from-header"), Some("from-cookie")).unwrap();
        assert_eq!(picked.source, TokenSource::Header);
        assert_eq!(picked.token, "from-header");
    }

    #[test]
    fn malformed_header_falls_back_to_cookie() {
        let picked = select_token(Some("Basic dXNlcjpwYXNz"), Some("from-cookie")).unwrap();
        assert_eq!(picked.source, TokenSource::Cookie);
        assert_eq!(picked.token, "from-cookie");

        assert_eq!(select_token(Some("Bearer "), None), None);
    }

    #[test]
    fn nothing_to_pick() {
        assert_eq!(select_token(None, None), None);
        assert_eq!(select_token(None, Some("  ")), None);
    }

    #[test]
    fn public_routes_need_no_token() {
        let decision = api().decide(&AuthRequest::new("/api/health", RequestMethod::Read));
        assert_eq!(decision, AuthDecision::Allow(None));

        // A broken token on a public route is not even looked at.
        let decision = pages().decide(
            &AuthRequest::new("/login", RequestMethod::Read).with_session_cookie(Some("garbage")),
        );
        assert_eq!(decision, AuthDecision::Allow(None));
    }

    #[test]
    fn protected_route_without_token_is_denied() {
        let decision = pages().decide(&AuthRequest::new("/dashboard", RequestMethod::Read));
        assert_eq!(decision, AuthDecision::Deny(DenyReason::NoToken));
    }

    #[test]
    fn staff_is_kept_out_of_manager_routes() {
        let header = bearer(&token_for(Role::Staff));
        let request =
            AuthRequest::new("/api/upload", RequestMethod::Write).with_authorization(Some(&header));

        assert_eq!(
            api().decide(&request),
            AuthDecision::Deny(DenyReason::InsufficientRole(Role::Staff))
        );
    }

    #[test]
    fn manager_reaches_manager_routes_with_claims() {
        let header = bearer(&token_for(Role::Manager));
        let request =
            AuthRequest::new("/api/upload", RequestMethod::Write).with_authorization(Some(&header));

        let AuthDecision::Allow(Some(claims)) = api().decide(&request) else {
            panic!("expected allow with claims");
        };
        assert_eq!(claims.role(), Role::Manager);
    }

    #[test]
    fn staff_may_read_the_training_collection_but_not_write_it() {
        let header = bearer(&token_for(Role::Staff));
        let read =
            AuthRequest::new("/api/training", RequestMethod::Read).with_authorization(Some(&header));
        let write =
            AuthRequest::new("/api/training", RequestMethod::Write).with_authorization(Some(&header));
        let item =
            AuthRequest::new("/api/training/7", RequestMethod::Write).with_authorization(Some(&header));

        assert!(api().decide(&read).is_allowed());
        assert_eq!(
            api().decide(&write),
            AuthDecision::Deny(DenyReason::InsufficientRole(Role::Staff))
        );
        assert!(api().decide(&item).is_allowed());
    }

    #[test]
    fn eight_day_old_token_is_invalid() {
        let now = Utc::now();
        let token = tokens()
            .issue_at(
                SessionIdentity {
                    user_id: UserId::new(),
                    email: "old@example.com".to_string(),
                    role: Role::Manager,
                    business_type: BusinessType::new("bakery").unwrap(),
                },
                now - Duration::days(8),
            )
            .unwrap()
            .token;
        let header = bearer(&token);
        let request =
            AuthRequest::new("/api/profile", RequestMethod::Read).with_authorization(Some(&header));

        assert_eq!(
            api().decide_at(&request, now),
            AuthDecision::Deny(DenyReason::InvalidToken(TokenFailure::Expired))
        );
    }

    #[test]
    fn garbage_cookie_is_an_invalid_token() {
        let request =
            AuthRequest::new("/staff", RequestMethod::Read).with_session_cookie(Some("not.a.jwt"));
        assert_eq!(
            pages().decide(&request),
            AuthDecision::Deny(DenyReason::InvalidToken(TokenFailure::Malformed))
        );
    }

    #[test]
    fn valid_header_wins_over_bad_cookie() {
        let header = bearer(&token_for(Role::Staff));
        let request = AuthRequest::new("/api/profile", RequestMethod::Read)
            .with_authorization(Some(&header))
            .with_session_cookie(Some("not.a.jwt"));

        assert!(api().decide(&request).is_allowed());
    }

    #[test]
    fn deny_reasons_map_onto_the_error_taxonomy() {
        assert_eq!(AuthError::from(DenyReason::NoToken), AuthError::NoTokenProvided);
        assert_eq!(
            AuthError::from(DenyReason::InvalidToken(TokenFailure::Expired)),
            AuthError::TokenExpired
        );
        assert_eq!(
            AuthError::from(DenyReason::InsufficientRole(Role::Staff)),
            AuthError::InsufficientRole(Role::Staff)
        );
        assert_eq!(DenyReason::InvalidToken(TokenFailure::Malformed).as_str(), "token_malformed");
    }
}
