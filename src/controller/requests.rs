//! Quota admission of certificate requests.

use crate::observability::metrics;
use crate::state::{ControllerState, ObjectName, QuotaDecision};

/// Consumes one request of the daily quota of `issuer`.
///
/// Rejections are counted in `cert_management_quota_rejections_total`.
pub fn accept_certificate_request(state: &ControllerState, issuer: &ObjectName) -> QuotaDecision {
    let decision = state.try_accept_certificate_request(issuer);
    if !decision.accepted {
        metrics::increment_quota_rejections(&issuer.to_string());
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::exposition;

    #[test]
    fn test_rejections_are_counted() {
        let state = ControllerState::new(10);
        let issuer = ObjectName::new("requests-test", "le");
        state.remember_issuer_quotas(&issuer, 1);

        assert!(accept_certificate_request(&state, &issuer).accepted);
        let rejected = accept_certificate_request(&state, &issuer);
        assert!(!rejected.accepted);
        assert_eq!(rejected.requests_per_day, 1);

        assert!(exposition()
            .contains("cert_management_quota_rejections_total{issuer=\"requests-test/le\"} 1"));
    }
}
