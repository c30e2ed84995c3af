//! # Renewal
//!
//! Classifies certificates by remaining validity and keeps the renewal
//! overdue set of [`ControllerState`] in line with it.

use crate::config::ControllerConfig;
use crate::state::{ControllerState, ObjectName};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tracing::debug;

/// Where a certificate stands relative to the renewal windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateValidity {
    /// Remaining validity is at least the renewal window
    Valid,
    /// Inside the renewal window, renewal should be requested
    RenewalDue,
    /// Inside the overdue window, renewal should have happened already
    Overdue,
    /// `not_after` has passed
    Expired,
}

impl CertificateValidity {
    #[must_use]
    pub fn needs_renewal(self) -> bool {
        !matches!(self, Self::Valid)
    }

    /// Counted in the renewal overdue set
    #[must_use]
    pub fn is_overdue(self) -> bool {
        matches!(self, Self::Overdue | Self::Expired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    renewal_window: TimeDelta,
    overdue_window: TimeDelta,
}

impl RenewalPolicy {
    /// Windows too large for a `TimeDelta` are clamped.
    #[must_use]
    pub fn new(renewal_window: Duration, overdue_window: Duration) -> Self {
        Self {
            renewal_window: TimeDelta::from_std(renewal_window).unwrap_or(TimeDelta::MAX),
            overdue_window: TimeDelta::from_std(overdue_window).unwrap_or(TimeDelta::MAX),
        }
    }

    #[must_use]
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.renewal_window, config.renewal_overdue_window)
    }

    #[must_use]
    pub fn classify(&self, not_after: DateTime<Utc>, now: DateTime<Utc>) -> CertificateValidity {
        let remaining = not_after.signed_duration_since(now);
        if remaining <= TimeDelta::zero() {
            CertificateValidity::Expired
        } else if remaining < self.overdue_window {
            CertificateValidity::Overdue
        } else if remaining < self.renewal_window {
            CertificateValidity::RenewalDue
        } else {
            CertificateValidity::Valid
        }
    }

    /// Point in time at which renewal of a certificate valid until `not_after` starts.
    #[must_use]
    pub fn renewal_starts_at(&self, not_after: DateTime<Utc>) -> DateTime<Utc> {
        not_after
            .checked_sub_signed(self.renewal_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Classifies `cert` and adds it to or removes it from the renewal overdue set.
    pub fn observe_certificate(
        &self,
        state: &ControllerState,
        cert: &ObjectName,
        not_after: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CertificateValidity {
        let validity = self.classify(not_after, now);
        let changed = if validity.is_overdue() {
            state.add_renewal_overdue(cert)
        } else {
            state.remove_renewal_overdue(cert)
        };
        if changed {
            debug!(
                certificate = %cert,
                ?validity,
                not_after = %not_after.to_rfc3339(),
                "renewal overdue state changed"
            );
        }
        validity
    }
}
