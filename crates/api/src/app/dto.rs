use serde::{Deserialize, Serialize};

use crewdesk_auth::{Role, UserProfile};
use crewdesk_core::BusinessType;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub business_type: BusinessType,
}

// -------------------------
// Response DTOs
// -------------------------

/// Body returned by login, registration and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_in: String,
    pub user: UserProfile,
}

/// Loose shape check: something before and after a single `@`, and a dot in
/// the domain. Deliverability is not our concern.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
