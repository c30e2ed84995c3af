//! # Secret Fan-out
//!
//! Change detection for issuer account and EAB secrets.

use crate::state::{ControllerState, ObjectName};
use k8s_openapi::api::core::v1::Secret;
use sha2::{Digest, Sha256};

/// Content hash of a secret's `data` and `stringData`.
///
/// Keys are hashed in sorted order with separators, so equal content yields
/// equal hashes regardless of how the maps were built. Metadata is ignored.
#[must_use]
pub fn secret_hash(secret: &Secret) -> String {
    let mut hasher = Sha256::new();
    if let Some(data) = &secret.data {
        for (key, value) in data {
            hasher.update(b"data\0");
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(&value.0);
            hasher.update(b"\0");
        }
    }
    if let Some(string_data) = &secret.string_data {
        for (key, value) in string_data {
            hasher.update(b"stringData\0");
            hasher.update(key.as_bytes());
            hasher.update(b"\0");
            hasher.update(value.as_bytes());
            hasher.update(b"\0");
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Issuers to reconcile after `secret` changed: every issuer bound to it as
/// account or EAB secret, sorted and without duplicates.
#[must_use]
pub fn issuers_to_requeue(state: &ControllerState, secret: &Secret) -> Vec<ObjectName> {
    state
        .issuers_for_secret(&ObjectName::from_resource(secret))
        .to_vec()
}

/// Whether `secret` is bound to `issuer` (as account or EAB secret) with
/// content that differs from what the issuer was last reconciled with.
///
/// Secrets the issuer is not bound to never count as changed for it.
#[must_use]
pub fn secret_changed_for_issuer(
    state: &ControllerState,
    issuer: &ObjectName,
    secret: &Secret,
) -> bool {
    let identity = ObjectName::from_resource(secret);
    let hash = secret_hash(secret);
    [
        state.issuer_secret_binding(issuer),
        state.issuer_eab_secret_binding(issuer),
    ]
    .into_iter()
    .flatten()
    .any(|binding| binding.secret == identity && binding.hash != hash)
}
