//! Password hashing and strength policy.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`),
//! so each stored hash carries the cost it was made with. Raising the cost
//! only affects new hashes; old ones still verify.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher, Version,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Serialize;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

// =============================================================================
// HashCost
// =============================================================================

/// Argon2id cost parameters.
///
/// The default is tuned for roughly 100ms per hash on commodity hardware;
/// `benches/credential_benchmarks.rs` measures it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Time cost (number of passes).
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 6,
            parallelism: 1,
        }
    }
}

impl HashCost {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    pub(crate) fn params(&self) -> AuthResult<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| AuthError::config(format!("password hash cost: {e}")))
    }
}

// =============================================================================
// PasswordPolicy
// =============================================================================

/// Rules a new password must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: false,
        }
    }
}

impl PasswordPolicy {
    /// Policy that only checks length.
    pub fn length_only(min_length: usize) -> Self {
        Self {
            min_length,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
        }
    }

    /// Toggle the upper-case, lower-case and digit rules together.
    pub fn with_composition(mut self, required: bool) -> Self {
        self.require_uppercase = required;
        self.require_lowercase = required;
        self.require_digit = required;
        self
    }

    pub fn with_symbol(mut self, required: bool) -> Self {
        self.require_symbol = required;
        self
    }

    /// Check `plaintext` against every rule, collecting all violations.
    pub fn check(&self, plaintext: &str) -> StrengthReport {
        let mut issues = Vec::new();

        if plaintext.chars().count() < self.min_length {
            issues.push(format!(
                "must be at least {} characters long",
                self.min_length
            ));
        }
        if self.require_uppercase && !plaintext.chars().any(char::is_uppercase) {
            issues.push("must contain an uppercase letter".to_string());
        }
        if self.require_lowercase && !plaintext.chars().any(char::is_lowercase) {
            issues.push("must contain a lowercase letter".to_string());
        }
        if self.require_digit && !plaintext.chars().any(|c| c.is_ascii_digit()) {
            issues.push("must contain a digit".to_string());
        }
        if self.require_symbol
            && !plaintext
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            issues.push("must contain a symbol".to_string());
        }

        StrengthReport {
            valid: issues.is_empty(),
            issues,
        }
    }
}

/// Outcome of a strength check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

// =============================================================================
// CredentialService
// =============================================================================

/// Hashes and verifies passwords and enforces the strength policy.
///
/// Cheap to clone; hold one per process.
#[derive(Clone)]
pub struct CredentialService {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
    decoy_hash: Arc<str>,
}

impl CredentialService {
    pub fn new(cost: HashCost, policy: PasswordPolicy) -> AuthResult<Self> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, cost.params()?);

        let mut service = Self {
            argon2,
            policy,
            decoy_hash: Arc::from(""),
        };
        service.decoy_hash = Arc::from(service.hash_password("decoy-credential-never-matches")?);
        Ok(service)
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(config.hash_cost, config.password_policy.clone())
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Hash a password with a fresh random salt.
    pub fn hash_password(&self, plaintext: &str) -> AuthResult<String> {
        if plaintext.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Crypto(format!("password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// An unparsable hash is reported as a mismatch.
    pub fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn one verification's worth of work. Used when there is no stored
    /// hash to compare against, so that path costs the same as a mismatch.
    pub(crate) fn verify_decoy(&self, plaintext: &str) {
        let _ = self.verify_password(plaintext, &self.decoy_hash);
    }

    pub fn validate_password_strength(&self, plaintext: &str) -> StrengthReport {
        self.policy.check(plaintext)
    }

    /// Like [`validate_password_strength`](Self::validate_password_strength)
    /// but as a `Result`, carrying every violated rule.
    pub fn ensure_strong(&self, plaintext: &str) -> AuthResult<()> {
        let report = self.validate_password_strength(plaintext);
        if report.valid {
            Ok(())
        } else {
            Err(AuthError::WeakPassword(report.issues))
        }
    }
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
