//! Service wiring shared by every request.

use std::sync::Arc;

use crewdesk_auth::{
    AuthConfig, AuthResult, CredentialRegistry, CredentialService, InMemoryCredentialStore,
    RequestAuthenticator, RoutePolicy, TokenService,
};

use crate::middleware::AuthState;
use crate::surface::SessionCookie;

/// Immutable services handed to handlers through an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub tokens: TokenService,
    pub credentials: CredentialService,
    pub store: Arc<dyn CredentialRegistry>,
    pub session_cookie: SessionCookie,
}

impl AppServices {
    pub fn new(config: &AuthConfig, store: Arc<dyn CredentialRegistry>) -> AuthResult<Self> {
        Ok(Self {
            tokens: TokenService::from_config(config),
            credentials: CredentialService::from_config(config)?,
            store,
            session_cookie: SessionCookie::default(),
        })
    }

    /// Services backed by a fresh in-memory credential store.
    pub fn in_memory(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(config, Arc::new(InMemoryCredentialStore::new()))
    }

    pub fn with_session_cookie(mut self, session_cookie: SessionCookie) -> Self {
        self.session_cookie = session_cookie;
        self
    }

    /// One authenticator per surface, sharing this token service.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            pages: RequestAuthenticator::new(self.tokens.clone(), RoutePolicy::pages()),
            api: RequestAuthenticator::new(self.tokens.clone(), RoutePolicy::api()),
            session_cookie: self.session_cookie,
        }
    }
}
