use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::Response,
};
use serde::Serialize;

use crewdesk_auth::{Role, SessionClaims};
use crewdesk_core::{BusinessType, UserId};

use crate::app::errors::json_error;

/// Decoded session of an authenticated API request.
///
/// Inserted into request extensions by the auth middleware once the token
/// has been verified. Handlers trust it as-is and never re-verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    user_id: UserId,
    email: String,
    role: Role,
    business_type: BusinessType,
}

impl SessionContext {
    pub fn from_claims(claims: SessionClaims) -> Self {
        let identity = claims.into_identity();
        Self {
            user_id: identity.user_id,
            email: identity.email,
            role: identity.role,
            business_type: identity.business_type,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn business_type(&self) -> &BusinessType {
        &self.business_type
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| {
                json_error(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "authentication required",
                )
            })
    }
}
