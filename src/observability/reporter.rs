//! # State Reporter
//!
//! Periodically publishes gauges derived from [`ControllerState`]:
//! certificates per issuer, renewal overdue and revoked certificates.

use crate::constants::ISSUER_TYPE_ACME;
use crate::observability::metrics;
use crate::state::{ControllerState, ObjectName};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Publishes state gauges and retires series of issuers that disappeared.
#[derive(Debug)]
pub struct StateReporter {
    state: Arc<ControllerState>,
    reported_issuers: BTreeSet<ObjectName>,
}

impl StateReporter {
    #[must_use]
    pub fn new(state: Arc<ControllerState>) -> Self {
        Self {
            state,
            reported_issuers: BTreeSet::new(),
        }
    }

    /// Publish the current state once
    pub fn report(&mut self) {
        let counts = self.state.certificate_counts();
        for (issuer, count) in &counts {
            metrics::report_cert_entries(ISSUER_TYPE_ACME, &issuer.to_string(), *count);
        }
        let issuers: BTreeSet<ObjectName> = counts.into_iter().map(|(issuer, _)| issuer).collect();
        for gone in self.reported_issuers.difference(&issuers) {
            debug!(issuer = %gone, "issuer has no certificates anymore, deleting cert entries series");
            metrics::delete_cert_entries(ISSUER_TYPE_ACME, &gone.to_string());
        }
        metrics::report_overdue_certs(self.state.renewal_overdue_count());
        metrics::report_revoked_certs(self.state.revoked_count());
        self.reported_issuers = issuers;
    }

    /// Report every `period` until `shutdown` turns true or its sender is dropped
    pub async fn run(mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("State reporter started (interval {}s)", period.as_secs());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.report(),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("State reporter stopped");
    }
}
