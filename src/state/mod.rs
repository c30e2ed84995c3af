//! # Controller State
//!
//! In-memory relational state shared by the certificate, issuer, secret and
//! revocation workers:
//!
//! - certificates per issuer (`AssociationIndex`)
//! - credential and EAB secrets per issuer (`SecretReferenceIndex`, twice)
//! - daily request quotas per issuer (`QuotaTracker`)
//! - certificates overdue for renewal and revoked certificates (`ObjectNameSet`)
//!
//! Everything here is derived from declared resources and rebuilt by
//! reconciling them after a restart; nothing is persisted. Quota windows
//! therefore start over when the process restarts.
//!
//! Each index guards its maps with its own mutex. Cross-index operations such
//! as [`ControllerState::remove_issuer`] lock one index at a time, so another
//! worker may briefly observe an issuer already gone from one index but not yet
//! from the next.

mod associations;
mod name_set;
mod object_name;
mod quotas;
mod secrets;

pub use associations::AssociationIndex;
pub use name_set::ObjectNameSet;
pub use object_name::ObjectName;
pub use quotas::{quota_window, QuotaDecision, QuotaTracker};
pub use secrets::{SecretBinding, SecretReferenceIndex};

use k8s_openapi::api::core::v1::SecretReference;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// Critical sections in this module never leave the maps half-updated before
/// a point that can panic, so the data behind a poisoned lock is consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide relational state of the controller.
///
/// Constructed once at startup and shared by reference (usually `Arc`) with
/// the reconcilers and the metrics reporter.
#[derive(Debug)]
pub struct ControllerState {
    secrets: SecretReferenceIndex,
    eab_secrets: SecretReferenceIndex,
    certificates: AssociationIndex,
    quotas: QuotaTracker,
    overdue_certs: Mutex<ObjectNameSet>,
    revoked_certs: Mutex<ObjectNameSet>,
}

/// Serializable summary of the state, used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub issuers: Vec<IssuerSummary>,
    pub renewal_overdue: ObjectNameSet,
    pub revoked: ObjectNameSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerSummary {
    pub issuer: ObjectName,
    pub certificates: usize,
    pub requests_per_day: u32,
}

impl ControllerState {
    /// Creates an empty state. Issuers without their own quota use
    /// `default_requests_per_day`.
    #[must_use]
    pub fn new(default_requests_per_day: u32) -> Self {
        Self {
            secrets: SecretReferenceIndex::new(),
            eab_secrets: SecretReferenceIndex::new(),
            certificates: AssociationIndex::new(),
            quotas: QuotaTracker::new(default_requests_per_day),
            overdue_certs: Mutex::new(ObjectNameSet::new()),
            revoked_certs: Mutex::new(ObjectNameSet::new()),
        }
    }

    /// Removes everything known about `issuer` from all indexes.
    ///
    /// Returns `true` if any index held an entry for it.
    pub fn remove_issuer(&self, issuer: &ObjectName) -> bool {
        let had_certificates = self.certificates.remove_by_source(issuer);
        let had_quota = self.quotas.remove_issuer(issuer);
        let had_eab_secret = self.eab_secrets.remove_issuer(issuer);
        let had_secret = self.secrets.remove_issuer(issuer);
        let removed = had_certificates || had_quota || had_eab_secret || had_secret;
        if removed {
            info!(issuer = %issuer, "removed issuer from controller state");
        }
        removed
    }

    // Certificates per issuer

    pub fn add_certificate_assoc(&self, issuer: &ObjectName, cert: &ObjectName) {
        self.certificates.add(issuer, cert);
    }

    pub fn remove_certificate_assoc(&self, cert: &ObjectName) {
        self.certificates.remove_by_destination(cert);
    }

    #[must_use]
    pub fn certificate_names_for_issuer(&self, issuer: &ObjectName) -> Vec<ObjectName> {
        self.certificates.destinations_for(issuer)
    }

    #[must_use]
    pub fn certificate_count_for_issuer(&self, issuer: &ObjectName) -> usize {
        self.certificates.destination_count(issuer)
    }

    #[must_use]
    pub fn issuer_for_certificate(&self, cert: &ObjectName) -> Option<ObjectName> {
        self.certificates.source_of(cert)
    }

    /// Issuers with at least one associated certificate.
    #[must_use]
    pub fn known_issuers(&self) -> Vec<ObjectName> {
        self.certificates.sources()
    }

    /// Issuers with their certificate counts, taken as one consistent read.
    #[must_use]
    pub fn certificate_counts(&self) -> Vec<(ObjectName, usize)> {
        self.certificates.source_counts()
    }

    // Quotas

    pub fn remember_issuer_quotas(&self, issuer: &ObjectName, requests_per_day: u32) {
        self.quotas.set_limit(issuer, requests_per_day);
    }

    /// Tries to accept a certificate request of `issuer` according to its quota.
    pub fn try_accept_certificate_request(&self, issuer: &ObjectName) -> QuotaDecision {
        self.quotas.try_accept(issuer)
    }

    #[must_use]
    pub fn quotas(&self) -> &QuotaTracker {
        &self.quotas
    }

    // Credential secrets

    /// Records the account secret of `issuer` and its content hash.
    ///
    /// A reference without a name unbinds the issuer.
    pub fn remember_issuer_secret(
        &self,
        issuer: &ObjectName,
        secret_ref: &SecretReference,
        hash: &str,
    ) {
        Self::remember_secret(&self.secrets, issuer, secret_ref, hash);
    }

    #[must_use]
    pub fn issuer_names_for_secret(&self, secret: &ObjectName) -> ObjectNameSet {
        self.secrets.issuers_referencing(secret)
    }

    #[must_use]
    pub fn issuer_secret_hash(&self, issuer: &ObjectName) -> Option<String> {
        self.secrets.hash_for(issuer)
    }

    #[must_use]
    pub fn issuer_secret_binding(&self, issuer: &ObjectName) -> Option<SecretBinding> {
        self.secrets.binding_for(issuer)
    }

    // External account binding secrets

    pub fn remember_issuer_eab_secret(
        &self,
        issuer: &ObjectName,
        secret_ref: &SecretReference,
        hash: &str,
    ) {
        Self::remember_secret(&self.eab_secrets, issuer, secret_ref, hash);
    }

    #[must_use]
    pub fn issuer_names_for_eab_secret(&self, secret: &ObjectName) -> ObjectNameSet {
        self.eab_secrets.issuers_referencing(secret)
    }

    #[must_use]
    pub fn issuer_eab_secret_hash(&self, issuer: &ObjectName) -> Option<String> {
        self.eab_secrets.hash_for(issuer)
    }

    #[must_use]
    pub fn issuer_eab_secret_binding(&self, issuer: &ObjectName) -> Option<SecretBinding> {
        self.eab_secrets.binding_for(issuer)
    }

    /// Issuers bound to `secret` as account or EAB secret.
    #[must_use]
    pub fn issuers_for_secret(&self, secret: &ObjectName) -> ObjectNameSet {
        let mut issuers = self.secrets.issuers_referencing(secret);
        issuers.extend(self.eab_secrets.issuers_referencing(secret));
        issuers
    }

    fn remember_secret(
        index: &SecretReferenceIndex,
        issuer: &ObjectName,
        secret_ref: &SecretReference,
        hash: &str,
    ) {
        match ObjectName::from_secret_ref(secret_ref, &issuer.namespace) {
            Some(secret) => index.remember(issuer, &secret, hash),
            None => {
                debug!(issuer = %issuer, "secret reference without name, unbinding issuer");
                index.remove_issuer(issuer);
            }
        }
    }

    // Renewal overdue certificates

    pub fn add_renewal_overdue(&self, cert: &ObjectName) -> bool {
        lock(&self.overdue_certs).insert(cert.clone())
    }

    pub fn remove_renewal_overdue(&self, cert: &ObjectName) -> bool {
        lock(&self.overdue_certs).remove(cert)
    }

    #[must_use]
    pub fn all_renewal_overdue(&self) -> Vec<ObjectName> {
        lock(&self.overdue_certs).to_vec()
    }

    #[must_use]
    pub fn renewal_overdue_count(&self) -> usize {
        lock(&self.overdue_certs).len()
    }

    // Revoked certificates

    pub fn add_revoked(&self, cert: &ObjectName) -> bool {
        lock(&self.revoked_certs).insert(cert.clone())
    }

    pub fn remove_revoked(&self, cert: &ObjectName) -> bool {
        lock(&self.revoked_certs).remove(cert)
    }

    #[must_use]
    pub fn all_revoked(&self) -> Vec<ObjectName> {
        lock(&self.revoked_certs).to_vec()
    }

    #[must_use]
    pub fn revoked_count(&self) -> usize {
        lock(&self.revoked_certs).len()
    }

    /// Point-in-time summary. Each part is read under its own lock.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        let issuers = self
            .certificate_counts()
            .into_iter()
            .map(|(issuer, certificates)| IssuerSummary {
                certificates,
                requests_per_day: self.quotas.limit_for(&issuer),
                issuer,
            })
            .collect();
        StateSnapshot {
            issuers,
            renewal_overdue: lock(&self.overdue_certs).clone(),
            revoked: lock(&self.revoked_certs).clone(),
        }
    }
}
