//! Credential records and the store contract the auth core reads from.
//!
//! Storage itself lives outside this crate. The auth core only ever looks
//! records up; writing them is a registration concern, expressed by the
//! separate [`CredentialRegistry`] trait.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crewdesk_core::{BusinessType, UserId};

use crate::claims::SessionIdentity;
use crate::error::{AuthError, AuthResult};
use crate::password::CredentialService;
use crate::Role;

/// Canonical form of an email address for lookups and uniqueness.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

/// A stored account credential.
///
/// `email` is expected in [`normalize_email`] form. The password hash never
/// leaves through `Debug`, [`profile`](Self::profile) or
/// [`identity`](Self::identity).
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub business_type: BusinessType,
}

/// Public view of an account, safe to return to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub business_type: BusinessType,
}

impl CredentialRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            business_type: self.business_type.clone(),
        }
    }

    /// Identity to put into a session token for this account.
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            user_id: self.id,
            email: self.email.clone(),
            role: self.role,
            business_type: self.business_type.clone(),
        }
    }
}

impl core::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("business_type", &self.business_type)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store contracts
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only lookups the auth core needs from the user store.
pub trait CredentialStore: Send + Sync {
    /// Look up by an already-normalized email.
    fn lookup_by_email(&self, normalized_email: &str) -> Option<CredentialRecord>;
    fn lookup_by_id(&self, user_id: &UserId) -> Option<CredentialRecord>;
}

/// Write side used by registration handlers.
pub trait CredentialRegistry: CredentialStore {
    /// Insert a new record. Fails with `EmailTaken` if the email is in use.
    fn insert(&self, record: CredentialRecord) -> AuthResult<()>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn lookup_by_email(&self, normalized_email: &str) -> Option<CredentialRecord> {
        (**self).lookup_by_email(normalized_email)
    }

    fn lookup_by_id(&self, user_id: &UserId) -> Option<CredentialRecord> {
        (**self).lookup_by_id(user_id)
    }
}

impl<S> CredentialRegistry for Arc<S>
where
    S: CredentialRegistry + ?Sized,
{
    fn insert(&self, record: CredentialRecord) -> AuthResult<()> {
        (**self).insert(record)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Records>,
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<UserId, CredentialRecord>,
    id_by_email: HashMap<String, UserId>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|r| r.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup_by_email(&self, normalized_email: &str) -> Option<CredentialRecord> {
        let records = self.inner.read().ok()?;
        let id = records.id_by_email.get(normalized_email)?;
        records.by_id.get(id).cloned()
    }

    fn lookup_by_id(&self, user_id: &UserId) -> Option<CredentialRecord> {
        let records = self.inner.read().ok()?;
        records.by_id.get(user_id).cloned()
    }
}

impl CredentialRegistry for InMemoryCredentialStore {
    fn insert(&self, mut record: CredentialRecord) -> AuthResult<()> {
        record.email = normalize_email(&record.email);

        let mut records = self.inner.write().unwrap_or_else(|e| e.into_inner());

        if records.id_by_email.contains_key(&record.email) || records.by_id.contains_key(&record.id) {
            return Err(AuthError::EmailTaken);
        }
        records.id_by_email.insert(record.email.clone(), record.id);
        records.by_id.insert(record.id, record);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login check
// ─────────────────────────────────────────────────────────────────────────────

/// Check an email/password pair against the store.
///
/// Unknown email and wrong password both return `CredentialMismatch`; the
/// unknown-email path still runs one hash verification.
pub fn authenticate<S>(
    store: &S,
    credentials: &CredentialService,
    email: &str,
    password: &str,
) -> AuthResult<CredentialRecord>
where
    S: CredentialStore + ?Sized,
{
    let normalized = normalize_email(email);

    match store.lookup_by_email(&normalized) {
        Some(record) if credentials.verify_password(password, &record.password_hash) => Ok(record),
        Some(_) => Err(AuthError::CredentialMismatch),
        None => {
            credentials.verify_decoy(password);
            Err(AuthError::CredentialMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::{HashCost, PasswordPolicy};

    fn credentials() -> CredentialService {
        CredentialService::new(HashCost::new(8, 1, 1), PasswordPolicy::default()).unwrap()
    }

    fn record(svc: &CredentialService, email: &str, password: &str, role: Role) -> CredentialRecord {
        CredentialRecord {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: svc.hash_password(password).unwrap(),
            role,
            business_type: BusinessType::new("bakery").unwrap(),
        }
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn insert_normalizes_and_enforces_unique_email() {
        let svc = credentials();
        let store = InMemoryCredentialStore::new();

        store
            .insert(record(&svc, "Alice@Example.com", "Passw0rdA", Role::Manager))
            .unwrap();
        let err = store
            .insert(record(&svc, "alice@example.com ", "Passw0rdB", Role::Staff))
            .unwrap_err();

        assert_eq!(err, AuthError::EmailTaken);
        assert_eq!(store.len(), 1);
        assert!(store.lookup_by_email("alice@example.com").is_some());
    }

    #[test]
    fn lookup_by_id_finds_inserted_record() {
        let svc = credentials();
        let store = InMemoryCredentialStore::new();
        let rec = record(&svc, "bob@example.com", "Passw0rdA", Role::Staff);
        let id = rec.id;
        store.insert(rec).unwrap();

        assert_eq!(store.lookup_by_id(&id).unwrap().role, Role::Staff);
        assert!(store.lookup_by_id(&UserId::new()).is_none());
    }

    #[test]
    fn authenticate_accepts_correct_password_with_any_email_case() {
        let svc = credentials();
        let store = InMemoryCredentialStore::new();
        store
            .insert(record(&svc, "carol@example.com", "Passw0rdA", Role::Manager))
            .unwrap();

        let rec = authenticate(&store, &svc, "CAROL@example.com", "Passw0rdA").unwrap();
        assert_eq!(rec.email, "carol@example.com");
    }

    #[test]
    fn wrong_password_and_unknown_email_are_indistinguishable() {
        let svc = credentials();
        let store = InMemoryCredentialStore::new();
        store
            .insert(record(&svc, "dave@example.com", "Passw0rdA", Role::Staff))
            .unwrap();

        let wrong = authenticate(&store, &svc, "dave@example.com", "nope").unwrap_err();
        let unknown = authenticate(&store, &svc, "nobody@example.com", "Passw0rdA").unwrap_err();

        assert_eq!(wrong, AuthError::CredentialMismatch);
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn debug_and_profile_never_expose_the_hash() {
        let svc = credentials();
        let rec = record(&svc, "erin@example.com", "Passw0rdA", Role::Manager);

        assert!(!format!("{rec:?}").contains(&rec.password_hash));
        let json = serde_json::to_string(&rec.profile()).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"businessType\":\"bakery\""));
    }
}
