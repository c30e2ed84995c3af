//! # Secret Reference Index
//!
//! Tracks which secret each issuer reads its credentials from, together with
//! the content hash last seen, and answers the reverse question of which
//! issuers depend on a given secret.

use super::{lock, ObjectName, ObjectNameSet};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Secret binding recorded for a single issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretBinding {
    pub secret: ObjectName,
    pub hash: String,
}

#[derive(Debug, Default)]
struct SecretReferences {
    /// issuer -> binding
    by_issuer: HashMap<ObjectName, SecretBinding>,
    /// secret -> issuers bound to it
    by_secret: HashMap<ObjectName, ObjectNameSet>,
}

impl SecretReferences {
    fn unlink(&mut self, secret: &ObjectName, issuer: &ObjectName) {
        if let Some(issuers) = self.by_secret.get_mut(secret) {
            issuers.remove(issuer);
            if issuers.is_empty() {
                self.by_secret.remove(secret);
            }
        }
    }
}

/// Concurrency-safe issuer to secret index.
///
/// The reverse map is exactly the inverse of the forward map whenever the
/// lock is released: an issuer is listed under at most one secret.
#[derive(Debug, Default)]
pub struct SecretReferenceIndex {
    inner: Mutex<SecretReferences>,
}

impl SecretReferenceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or updates the secret used by `issuer`.
    ///
    /// Re-binding to another secret drops the issuer from the previous
    /// secret's reverse set. The stored hash is always overwritten.
    pub fn remember(&self, issuer: &ObjectName, secret: &ObjectName, hash: &str) {
        let mut inner = lock(&self.inner);
        let previous = inner.by_issuer.insert(
            issuer.clone(),
            SecretBinding {
                secret: secret.clone(),
                hash: hash.to_string(),
            },
        );
        if let Some(previous) = previous {
            if previous.secret == *secret {
                return;
            }
            debug!(issuer = %issuer, from = %previous.secret, to = %secret, "issuer re-bound to another secret");
            inner.unlink(&previous.secret, issuer);
        }
        inner
            .by_secret
            .entry(secret.clone())
            .or_default()
            .insert(issuer.clone());
    }

    /// Forgets the binding of `issuer`. Returns `true` if one existed.
    pub fn remove_issuer(&self, issuer: &ObjectName) -> bool {
        let mut inner = lock(&self.inner);
        match inner.by_issuer.remove(issuer) {
            Some(binding) => {
                inner.unlink(&binding.secret, issuer);
                true
            }
            None => false,
        }
    }

    /// Issuers currently bound to `secret`; empty if none.
    #[must_use]
    pub fn issuers_referencing(&self, secret: &ObjectName) -> ObjectNameSet {
        lock(&self.inner)
            .by_secret
            .get(secret)
            .cloned()
            .unwrap_or_default()
    }

    /// Hash remembered for the secret of `issuer`.
    #[must_use]
    pub fn hash_for(&self, issuer: &ObjectName) -> Option<String> {
        lock(&self.inner)
            .by_issuer
            .get(issuer)
            .map(|binding| binding.hash.clone())
    }

    /// Full binding of `issuer`, if any.
    #[must_use]
    pub fn binding_for(&self, issuer: &ObjectName) -> Option<SecretBinding> {
        lock(&self.inner).by_issuer.get(issuer).cloned()
    }

    /// Number of distinct secrets referenced by at least one issuer.
    #[must_use]
    pub fn secret_count(&self) -> usize {
        lock(&self.inner).by_secret.len()
    }
}
