use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// The kind of business an account operates in (e.g. "restaurant", "retail").
///
/// This is the tenant label carried in every session. It is trimmed and must
/// be non-empty; deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessType(String);

const MAX_LEN: usize = 64;

impl BusinessType {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("business type must not be empty"));
        }
        if trimmed.chars().count() > MAX_LEN {
            return Err(DomainError::validation(format!(
                "business type must be at most {MAX_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for BusinessType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BusinessType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BusinessType> for String {
    fn from(value: BusinessType) -> Self {
        value.0
    }
}
