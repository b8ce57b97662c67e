//! Identity resolution: which user a call acts as.
//!
//! One `IdentityResolver` trait, three policies picked at startup:
//!   - `Explicit`: the caller names the user on every call
//!   - `Persisted`: one identity stored under the data dir, reused forever
//!   - `Ephemeral`: in-memory registry, plus one lazily created process identity

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use serde::{Deserialize, Serialize};

use crate::id_gen;
use crate::storage::identity_store::IdentityStore;
use crate::{ForumError, ForumResult};

/// Opaque, non-empty user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    /// Trim and validate a caller-supplied id.
    pub fn parse(raw: &str) -> ForumResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ForumError::Validation("user id must not be empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Fresh UUID v4 identity.
    pub fn generate() -> Self {
        Self(id_gen::user_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn display_name(&self) -> String {
        id_gen::display_name(&self.0)
    }

    pub fn short(&self) -> &str {
        id_gen::short_id(&self.0)
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First-seen metadata for an identity. Also the persisted file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: String,
    pub created_at: String,
    pub display_name: String,
}

impl IdentityRecord {
    pub fn new(user_id: String) -> Self {
        let display_name = id_gen::display_name(&user_id);
        Self {
            user_id,
            created_at: crate::time_utils::now_rfc3339(),
            display_name,
        }
    }

    pub fn identity(&self) -> ForumResult<UserIdentity> {
        UserIdentity::parse(&self.user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    Explicit,
    #[default]
    Persisted,
    Ephemeral,
}

impl IdentityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Persisted => "persisted",
            Self::Ephemeral => "ephemeral",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "explicit" => Some(Self::Explicit),
            "persisted" => Some(Self::Persisted),
            "ephemeral" => Some(Self::Ephemeral),
            _ => None,
        }
    }
}

pub trait IdentityResolver: Send + Sync {
    fn policy(&self) -> IdentityPolicy;

    /// Resolve the identity this call acts as.
    /// Only the explicit policy can fail here (missing caller id).
    fn resolve(&self, caller_id: Option<&str>) -> ForumResult<UserIdentity>;

    /// First-seen metadata, when this resolver keeps any for `identity`.
    fn record(&self, _identity: &UserIdentity) -> Option<IdentityRecord> {
        None
    }
}

// ─── Explicit ───

#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitIdentity;

impl IdentityResolver for ExplicitIdentity {
    fn policy(&self) -> IdentityPolicy {
        IdentityPolicy::Explicit
    }

    fn resolve(&self, caller_id: Option<&str>) -> ForumResult<UserIdentity> {
        match caller_id {
            Some(id) => UserIdentity::parse(id),
            None => Err(ForumError::Validation(
                "user id is required (generate one with `new-id`)".into(),
            )),
        }
    }
}

// ─── Persisted ───

#[derive(Debug, Clone)]
pub struct PersistedIdentity {
    record: IdentityRecord,
    identity: UserIdentity,
}

impl PersistedIdentity {
    /// Load the stored identity, or generate and store one.
    /// The new identity is on disk before this returns.
    pub fn open(store: &IdentityStore) -> ForumResult<Self> {
        let record = match store.load()? {
            Some(record) => {
                tracing::debug!(user = %record.user_id, "Persisted identity loaded");
                record
            }
            None => {
                let record = IdentityRecord::new(id_gen::user_id());
                store.save(&record)?;
                tracing::info!(
                    user = %record.user_id,
                    path = %store.path().display(),
                    "New identity created"
                );
                record
            }
        };
        let identity = record.identity()?;
        Ok(Self { record, identity })
    }
}

impl IdentityResolver for PersistedIdentity {
    fn policy(&self) -> IdentityPolicy {
        IdentityPolicy::Persisted
    }

    fn resolve(&self, caller_id: Option<&str>) -> ForumResult<UserIdentity> {
        if let Some(other) = caller_id.map(str::trim).filter(|id| *id != self.identity.as_str()) {
            tracing::debug!(ignored = other, "Caller id ignored under persisted identity policy");
        }
        Ok(self.identity.clone())
    }

    fn record(&self, identity: &UserIdentity) -> Option<IdentityRecord> {
        (identity == &self.identity).then(|| self.record.clone())
    }
}

// ─── Ephemeral registry ───

#[derive(Debug, Default)]
pub struct EphemeralRegistry {
    known: Mutex<HashMap<String, IdentityRecord>>,
    process_identity: OnceLock<UserIdentity>,
}

impl EphemeralRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }

    fn register(&self, identity: &UserIdentity) {
        let mut known = self.lock();
        if !known.contains_key(identity.as_str()) {
            tracing::debug!(user = %identity, "Identity registered");
            known.insert(identity.as_str().to_string(), IdentityRecord::new(identity.as_str().to_string()));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, IdentityRecord>> {
        // Entries are insert-only, so a poisoned map is still consistent.
        self.known.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl IdentityResolver for EphemeralRegistry {
    fn policy(&self) -> IdentityPolicy {
        IdentityPolicy::Ephemeral
    }

    fn resolve(&self, caller_id: Option<&str>) -> ForumResult<UserIdentity> {
        let supplied = caller_id.map(str::trim).filter(|id| !id.is_empty());
        let identity = match supplied {
            Some(id) => UserIdentity::parse(id)?,
            None => self.process_identity.get_or_init(UserIdentity::generate).clone(),
        };
        self.register(&identity);
        Ok(identity)
    }

    fn record(&self, identity: &UserIdentity) -> Option<IdentityRecord> {
        self.lock().get(identity.as_str()).cloned()
    }
}

/// Build the resolver for a policy. Failures here are configuration errors.
pub fn build_resolver(policy: IdentityPolicy, store: &IdentityStore) -> ForumResult<Box<dyn IdentityResolver>> {
    let resolver: Box<dyn IdentityResolver> = match policy {
        IdentityPolicy::Explicit => Box::new(ExplicitIdentity),
        IdentityPolicy::Persisted => Box::new(PersistedIdentity::open(store)?),
        IdentityPolicy::Ephemeral => Box::new(EphemeralRegistry::new()),
    };
    tracing::debug!(policy = policy.as_str(), "Identity resolver ready");
    Ok(resolver)
}
