//! `crewdesk-auth`: authentication and authorization core.
//!
//! Passwords, session tokens, route policy and the per-request decision.
//! This crate is decoupled from HTTP and storage: surfaces and stores plug in
//! through plain values and the [`CredentialStore`] trait.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod password;
pub mod policy;
pub mod roles;
pub mod token;

pub use authorize::{
    AuthDecision, AuthRequest, DenyReason, RequestAuthenticator, TokenCandidate, TokenFailure,
    TokenSource, select_token,
};
pub use claims::{SessionClaims, SessionIdentity, TokenValidationError, validate_claims};
pub use config::{AuthConfig, SigningSecret, TokenLifetime};
pub use credentials::{
    CredentialRecord, CredentialRegistry, CredentialStore, InMemoryCredentialStore, UserProfile,
    authenticate, normalize_email,
};
pub use error::{AuthError, AuthResult};
pub use password::{CredentialService, HashCost, PasswordPolicy, StrengthReport};
pub use policy::{AccessLevel, LOGIN_PATH, RequestMethod, RoutePattern, RoutePolicy, RouteRule};
pub use roles::{Role, UnknownRole};
pub use token::{IssuedToken, TokenService, extract_from_header};
