//! Session claims carried inside a signed token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crewdesk_core::{BusinessType, UserId};

use crate::{AuthError, Role};

/// Who a session belongs to.
///
/// This is what token issuance takes as input and what handlers receive
/// after a request has been authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub business_type: BusinessType,
}

/// Claims of a token whose signature and expiry have been checked.
///
/// There is no public constructor and no `Deserialize` impl: the only way to
/// hold a `SessionClaims` is to issue a token or verify one. Fields are
/// read-only; renewing a session means issuing a new token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(flatten)]
    identity: SessionIdentity,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub(crate) fn new(
        identity: SessionIdentity,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            issued_at,
            expires_at,
        }
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn into_identity(self) -> SessionIdentity {
        self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn business_type(&self) -> &BusinessType {
        &self.identity.business_type
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn lifetime(&self) -> chrono::Duration {
        self.expires_at - self.issued_at
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

impl From<TokenValidationError> for AuthError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => AuthError::TokenExpired,
            TokenValidationError::InvalidTimeWindow => AuthError::TokenMalformed,
        }
    }
}

/// Deterministically validate the time window of claims.
///
/// A token is still valid at the exact instant of `expires_at` and expired
/// one second later.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now > claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────────────────────

/// JWT payload as it travels on the wire. Never leaves the crate undecoded.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenPayload {
    sub: UserId,
    email: String,
    role: Role,
    business_type: BusinessType,
    iat: i64,
    exp: i64,
}

impl TokenPayload {
    pub(crate) fn from_claims(claims: &SessionClaims) -> Self {
        let identity = claims.identity();
        Self {
            sub: identity.user_id,
            email: identity.email.clone(),
            role: identity.role,
            business_type: identity.business_type.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        }
    }

    /// Convert a signature-checked payload into claims, without checking expiry.
    pub(crate) fn into_claims(self) -> Result<SessionClaims, TokenValidationError> {
        let issued_at =
            DateTime::from_timestamp(self.iat, 0).ok_or(TokenValidationError::InvalidTimeWindow)?;
        let expires_at =
            DateTime::from_timestamp(self.exp, 0).ok_or(TokenValidationError::InvalidTimeWindow)?;
        if expires_at <= issued_at {
            return Err(TokenValidationError::InvalidTimeWindow);
        }

        let identity = SessionIdentity {
            user_id: self.sub,
            email: self.email,
            role: self.role,
            business_type: self.business_type,
        };
        Ok(SessionClaims::new(identity, issued_at, expires_at))
    }
}
