//! Auth configuration.
//!
//! Built once at startup and passed by value into the services that need it.
//! Nothing in the auth core reads the environment on its own; `from_env` is
//! the single entry point and it refuses to produce a config without a
//! usable signing secret.

use core::str::FromStr;
use std::collections::HashSet;

use crate::error::{AuthError, AuthResult};
use crate::password::{HashCost, PasswordPolicy};

pub const ENV_SECRET: &str = "JWT_SECRET";
pub const ENV_TOKEN_LIFETIME: &str = "TOKEN_LIFETIME";
pub const ENV_HASH_COST: &str = "PASSWORD_HASH_COST";
pub const ENV_HASH_MEMORY_KIB: &str = "PASSWORD_HASH_MEMORY_KIB";
pub const ENV_MIN_LENGTH: &str = "PASSWORD_MIN_LENGTH";
pub const ENV_REQUIRE_COMPOSITION: &str = "PASSWORD_REQUIRE_COMPOSITION";

const MIN_SECRET_LEN: usize = 32;
const MIN_DISTINCT_SECRET_BYTES: usize = 8;
const PLACEHOLDER_SECRETS: &[&str] = &[
    "changeme",
    "change-me",
    "change_me",
    "change-this",
    "dev-secret",
    "your-secret",
    "placeholder",
];

// ─────────────────────────────────────────────────────────────────────────────
// Signing secret
// ─────────────────────────────────────────────────────────────────────────────

/// HMAC key used to sign and verify session tokens.
///
/// Rejected when empty, shorter than 32 bytes, made of fewer than 8 distinct
/// bytes (`"aaaa…"`), or containing a well-known template placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(value: impl Into<String>) -> AuthResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AuthError::config(format!("{ENV_SECRET} is not set")));
        }
        if value.len() < MIN_SECRET_LEN {
            return Err(AuthError::config(format!(
                "{ENV_SECRET} must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        let distinct: HashSet<u8> = value.bytes().collect();
        if distinct.len() < MIN_DISTINCT_SECRET_BYTES {
            return Err(AuthError::config(format!("{ENV_SECRET} is too predictable")));
        }
        let lowered = value.to_ascii_lowercase();
        if PLACEHOLDER_SECRETS.iter().any(|p| lowered.contains(p)) {
            return Err(AuthError::config(format!(
                "{ENV_SECRET} still holds a placeholder value"
            )));
        }
        Ok(Self(value.into_bytes()))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token lifetime
// ─────────────────────────────────────────────────────────────────────────────

/// How long an issued session token stays valid, in whole seconds.
///
/// Parsed from and rendered as `<n>d`, `<n>h`, `<n>m` or `<n>s`; a bare
/// number is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenLifetime(u64);

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const MAX_LIFETIME: u64 = 365 * DAY;

impl TokenLifetime {
    pub const DEFAULT: TokenLifetime = TokenLifetime(7 * DAY);

    pub fn from_secs(secs: u64) -> AuthResult<Self> {
        if secs == 0 {
            return Err(AuthError::config(format!("{ENV_TOKEN_LIFETIME} must be positive")));
        }
        if secs > MAX_LIFETIME {
            return Err(AuthError::config(format!(
                "{ENV_TOKEN_LIFETIME} must not exceed 365d"
            )));
        }
        Ok(Self(secs))
    }

    pub fn days(days: u64) -> AuthResult<Self> {
        Self::from_secs(days.saturating_mul(DAY))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> chrono::Duration {
        // Bounded by MAX_LIFETIME, so the cast and the constructor cannot overflow.
        chrono::Duration::seconds(self.0 as i64)
    }
}

impl Default for TokenLifetime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for TokenLifetime {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || AuthError::config(format!("{ENV_TOKEN_LIFETIME}: cannot parse '{s}'"));

        let (digits, unit) = match s.char_indices().last() {
            Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], c.to_ascii_lowercase()),
            Some(_) => (s, 's'),
            None => return Err(invalid()),
        };
        let multiplier = match unit {
            'd' => DAY,
            'h' => HOUR,
            'm' => MINUTE,
            's' => 1,
            _ => return Err(invalid()),
        };
        let n: u64 = digits.parse().map_err(|_| invalid())?;
        Self::from_secs(n.checked_mul(multiplier).ok_or_else(invalid)?)
    }
}

impl core::fmt::Display for TokenLifetime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let secs = self.0;
        if secs % DAY == 0 {
            write!(f, "{}d", secs / DAY)
        } else if secs % HOUR == 0 {
            write!(f, "{}h", secs / HOUR)
        } else if secs % MINUTE == 0 {
            write!(f, "{}m", secs / MINUTE)
        } else {
            write!(f, "{secs}s")
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Immutable configuration for the auth core.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: SigningSecret,
    pub token_lifetime: TokenLifetime,
    pub hash_cost: HashCost,
    pub password_policy: PasswordPolicy,
}

impl AuthConfig {
    /// Config with the given secret and defaults for everything else.
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            token_lifetime: TokenLifetime::DEFAULT,
            hash_cost: HashCost::default(),
            password_policy: PasswordPolicy::default(),
        }
    }

    pub fn with_token_lifetime(mut self, lifetime: TokenLifetime) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    /// Load from process environment variables.
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (environment, test fixtures).
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = SigningSecret::new(lookup(ENV_SECRET).unwrap_or_default())?;
        let mut config = Self::new(secret);

        if let Some(raw) = lookup(ENV_TOKEN_LIFETIME) {
            config.token_lifetime = raw.parse()?;
        }

        if let Some(iterations) = parse_var::<u32, _>(&lookup, ENV_HASH_COST)? {
            config.hash_cost.iterations = iterations;
        }
        if let Some(memory_kib) = parse_var::<u32, _>(&lookup, ENV_HASH_MEMORY_KIB)? {
            config.hash_cost.memory_kib = memory_kib;
        }
        // Fail at startup rather than on the first login.
        config.hash_cost.params()?;

        if let Some(min_length) = parse_var::<usize, _>(&lookup, ENV_MIN_LENGTH)? {
            if min_length == 0 {
                return Err(AuthError::config(format!("{ENV_MIN_LENGTH} must be positive")));
            }
            config.password_policy.min_length = min_length;
        }
        if let Some(raw) = lookup(ENV_REQUIRE_COMPOSITION) {
            let required = parse_bool(&raw).ok_or_else(|| {
                AuthError::config(format!("{ENV_REQUIRE_COMPOSITION}: expected true or false"))
            })?;
            config.password_policy = config.password_policy.with_composition(required);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> AuthResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AuthError::config(format!("{key}: cannot parse '{raw}'"))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
