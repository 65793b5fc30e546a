//! Authentication error taxonomy.

use thiserror::Error;

use crate::Role;

/// Result type used across the auth core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Every failure the auth core can report.
///
/// Request-path failures are turned into responses by the surface adapters;
/// only `MissingConfiguration` is fatal, and only at startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong password or unknown email. The two are never distinguished.
    #[error("invalid email or password")]
    CredentialMismatch,

    /// Password rejected by the strength policy; one entry per violated rule.
    #[error("password does not meet requirements: {}", .0.join("; "))]
    WeakPassword(Vec<String>),

    #[error("token is malformed or its signature is invalid")]
    TokenMalformed,

    #[error("token has expired")]
    TokenExpired,

    #[error("authorization header must use the Bearer scheme")]
    MalformedHeader,

    #[error("no session token provided")]
    NoTokenProvided,

    #[error("role '{0}' may not access this resource")]
    InsufficientRole(Role),

    #[error("missing or invalid configuration: {0}")]
    MissingConfiguration(String),

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("an account with this email already exists")]
    EmailTaken,

    /// Hashing or signing failed for a reason other than bad input.
    #[error("cryptographic operation failed: {0}")]
    Crypto(String),
}

impl AuthError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::MissingConfiguration(msg.into())
    }

    /// Token failures that make a presented token unusable.
    pub fn is_token_failure(&self) -> bool {
        matches!(self, AuthError::TokenMalformed | AuthError::TokenExpired)
    }
}
