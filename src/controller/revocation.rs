//! Revocation marking and cleanup of deleted certificates.

use crate::state::{ControllerState, ObjectName};
use tracing::{debug, info};

/// Marks `cert` as holding a revoked certificate. Returns `true` if it was not marked before.
pub fn mark_revoked(state: &ControllerState, cert: &ObjectName) -> bool {
    let added = state.add_revoked(cert);
    if added {
        info!(certificate = %cert, "certificate marked as revoked");
    }
    added
}

/// Clears the revoked mark, e.g. after a new certificate was issued.
pub fn clear_revoked(state: &ControllerState, cert: &ObjectName) -> bool {
    state.remove_revoked(cert)
}

/// Drops a deleted certificate from the issuer association and both tracking sets.
pub fn forget_certificate(state: &ControllerState, cert: &ObjectName) {
    state.remove_certificate_assoc(cert);
    let was_overdue = state.remove_renewal_overdue(cert);
    let was_revoked = state.remove_revoked(cert);
    debug!(certificate = %cert, was_overdue, was_revoked, "certificate forgotten");
}
