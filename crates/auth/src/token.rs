//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs. Verification and decoding are one step: callers get
//! either fully trusted [`SessionClaims`] or an error, never an unverified
//! payload.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::claims::{SessionClaims, SessionIdentity, TokenPayload, validate_claims};
use crate::config::{AuthConfig, SigningSecret, TokenLifetime};
use crate::error::{AuthError, AuthResult};

const BEARER_PREFIX: &str = "Bearer ";

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded, signed token.
    pub token: String,
    /// Lifetime in human-readable form, e.g. `"7d"`.
    pub expires_in: String,
    /// The claims that were signed.
    pub claims: SessionClaims,
}

/// Issues and verifies session tokens.
///
/// Holds only the immutable key material and lifetime; clone it freely across
/// request handlers.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    lifetime: TokenLifetime,
}

impl TokenService {
    pub fn new(secret: &SigningSecret, lifetime: TokenLifetime) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied instant in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
            lifetime,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.secret, config.token_lifetime)
    }

    pub fn lifetime(&self) -> TokenLifetime {
        self.lifetime
    }

    /// Issue a token for `identity`, valid from now for the configured lifetime.
    pub fn issue(&self, identity: SessionIdentity) -> AuthResult<IssuedToken> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, identity: SessionIdentity, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let issued_at = now.trunc_subsecs(0);
        let expires_at = issued_at
            .checked_add_signed(self.lifetime.as_duration())
            .ok_or_else(|| AuthError::Crypto("token expiry is out of range".to_string()))?;

        let claims = SessionClaims::new(identity, issued_at, expires_at);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &TokenPayload::from_claims(&claims),
            &self.encoding_key,
        )
        .map_err(|e| AuthError::Crypto(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_in: self.lifetime.to_string(),
            claims,
        })
    }

    /// Verify signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> AuthResult<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature and expiry as if the current time were `now`.
    ///
    /// The signature is checked first, so a token that is both tampered with
    /// and expired reports `TokenMalformed`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<SessionClaims> {
        let data = decode::<TokenPayload>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "token failed signature or format check");
            AuthError::TokenMalformed
        })?;

        let claims = data.claims.into_claims()?;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Pull the token out of an `Authorization` header value.
///
/// Requires the exact `"Bearer "` prefix and a non-empty token after it.
pub fn extract_from_header(value: &str) -> AuthResult<&str> {
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

// =============================================================================
// Tests
// =============================================================================
