//! # Request Quotas
//!
//! Per-issuer daily budget for certificate requests.
//!
//! Each issuer gets a fixed 24 hour window that starts with the first request
//! evaluated against it (not at midnight). Once the window has elapsed the
//! consumed count starts again from zero. The budget is a soft guard in front
//! of the CA's own rate limits, so windows of different issuers drift freely.

use super::{lock, ObjectName};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Length of a quota window.
#[must_use]
pub fn quota_window() -> Duration {
    Duration::hours(24)
}

/// Outcome of [`QuotaTracker::try_accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the request fits into the current window.
    pub accepted: bool,
    /// Daily limit the request was evaluated against.
    pub requests_per_day: u32,
}

#[derive(Debug, Clone, Copy)]
struct QuotaWindow {
    started: DateTime<Utc>,
    consumed: u32,
}

impl QuotaWindow {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            started: now,
            consumed: 0,
        }
    }

    fn roll_if_elapsed(&mut self, now: DateTime<Utc>) {
        if now - self.started >= quota_window() {
            *self = Self::starting_at(now);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IssuerQuota {
    requests_per_day: u32,
    /// Created lazily by the first request.
    window: Option<QuotaWindow>,
}

/// Concurrency-safe per-issuer request budget.
///
/// The read-reset-check-increment sequence of [`try_accept`](Self::try_accept)
/// runs under a single lock, so concurrent callers can never both take the
/// last remaining slot.
#[derive(Debug)]
pub struct QuotaTracker {
    default_requests_per_day: u32,
    quotas: Mutex<HashMap<ObjectName, IssuerQuota>>,
}

impl QuotaTracker {
    /// Creates a tracker; issuers without an explicit limit use `default_requests_per_day`.
    #[must_use]
    pub fn new(default_requests_per_day: u32) -> Self {
        Self {
            default_requests_per_day,
            quotas: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn default_requests_per_day(&self) -> u32 {
        self.default_requests_per_day
    }

    /// Sets or replaces the daily limit of `issuer`.
    ///
    /// The consumed count of the running window is kept; the new limit applies
    /// from the next evaluation on.
    pub fn set_limit(&self, issuer: &ObjectName, requests_per_day: u32) {
        lock(&self.quotas)
            .entry(issuer.clone())
            .and_modify(|quota| quota.requests_per_day = requests_per_day)
            .or_insert(IssuerQuota {
                requests_per_day,
                window: None,
            });
    }

    /// Tries to consume one request of the budget of `issuer` at the current time.
    pub fn try_accept(&self, issuer: &ObjectName) -> QuotaDecision {
        self.try_accept_at(issuer, Utc::now())
    }

    /// Tries to consume one request of the budget of `issuer` at `now`.
    pub fn try_accept_at(&self, issuer: &ObjectName, now: DateTime<Utc>) -> QuotaDecision {
        let default_requests_per_day = self.default_requests_per_day;
        let mut quotas = lock(&self.quotas);
        let quota = quotas.entry(issuer.clone()).or_insert(IssuerQuota {
            requests_per_day: default_requests_per_day,
            window: None,
        });
        let window = quota.window.get_or_insert_with(|| QuotaWindow::starting_at(now));
        window.roll_if_elapsed(now);

        let requests_per_day = quota.requests_per_day;
        let accepted = window.consumed < requests_per_day;
        if accepted {
            window.consumed += 1;
        } else {
            warn!(
                issuer = %issuer,
                requests_per_day,
                window_started = %window.started.to_rfc3339(),
                "request quota exhausted"
            );
        }
        QuotaDecision {
            accepted,
            requests_per_day,
        }
    }

    /// Limit `issuer` is evaluated against; the default for unknown issuers.
    #[must_use]
    pub fn limit_for(&self, issuer: &ObjectName) -> u32 {
        lock(&self.quotas)
            .get(issuer)
            .map_or(self.default_requests_per_day, |quota| quota.requests_per_day)
    }

    #[must_use]
    pub fn usage(&self, issuer: &ObjectName) -> u32 {
        self.usage_at(issuer, Utc::now())
    }

    /// Requests consumed by `issuer` in the window running at `now`.
    ///
    /// An elapsed window is reset before reporting. Zero for unknown issuers.
    #[must_use]
    pub fn usage_at(&self, issuer: &ObjectName, now: DateTime<Utc>) -> u32 {
        let mut quotas = lock(&self.quotas);
        let Some(window) = quotas.get_mut(issuer).and_then(|quota| quota.window.as_mut()) else {
            return 0;
        };
        window.roll_if_elapsed(now);
        window.consumed
    }

    #[must_use]
    pub fn has_record(&self, issuer: &ObjectName) -> bool {
        lock(&self.quotas).contains_key(issuer)
    }

    /// Drops the limit and window of `issuer`. Returns `true` if a record existed.
    pub fn remove_issuer(&self, issuer: &ObjectName) -> bool {
        lock(&self.quotas).remove(issuer).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issuer(name: &str) -> ObjectName {
        ObjectName::new("issuers", name)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn outcome(decision: QuotaDecision) -> (bool, u32) {
        (decision.accepted, decision.requests_per_day)
    }

    #[test]
    fn test_limit_is_enforced_within_window() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 3);

        let results: Vec<_> = (0..4)
            .map(|i| outcome(tracker.try_accept_at(&issuer("le"), t0() + Duration::minutes(i))))
            .collect();
        assert_eq!(results, vec![(true, 3), (true, 3), (true, 3), (false, 3)]);
    }

    #[test]
    fn test_window_resets_after_a_day() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 3);
        for _ in 0..4 {
            tracker.try_accept_at(&issuer("le"), t0());
        }

        let almost = t0() + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), almost)), (false, 3));

        let later = t0() + Duration::hours(24);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), later)), (true, 3));
        assert_eq!(tracker.usage_at(&issuer("le"), later), 1);
    }

    #[test]
    fn test_window_starts_with_first_request() {
        let tracker = QuotaTracker::new(1);
        let first = t0() + Duration::hours(5);
        assert!(tracker.try_accept_at(&issuer("le"), first).accepted);

        // 24h after t0 but only 19h after the first request
        assert!(!tracker.try_accept_at(&issuer("le"), t0() + Duration::hours(24)).accepted);
        assert!(tracker.try_accept_at(&issuer("le"), first + Duration::hours(24)).accepted);
    }

    #[test]
    fn test_unknown_issuer_uses_default_limit() {
        let tracker = QuotaTracker::new(2);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("new"), t0())), (true, 2));
        assert_eq!(outcome(tracker.try_accept_at(&issuer("new"), t0())), (true, 2));
        assert_eq!(outcome(tracker.try_accept_at(&issuer("new"), t0())), (false, 2));
        assert_eq!(tracker.limit_for(&issuer("new")), 2);
    }

    #[test]
    fn test_limit_change_keeps_consumed_count() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 2);
        assert!(tracker.try_accept_at(&issuer("le"), t0()).accepted);
        assert!(tracker.try_accept_at(&issuer("le"), t0()).accepted);
        assert!(!tracker.try_accept_at(&issuer("le"), t0()).accepted);

        tracker.set_limit(&issuer("le"), 3);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), t0())), (true, 3));
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), t0())), (false, 3));

        tracker.set_limit(&issuer("le"), 1);
        assert_eq!(tracker.usage_at(&issuer("le"), t0()), 3);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), t0())), (false, 1));
    }

    #[test]
    fn test_zero_limit_rejects_everything() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 0);
        assert_eq!(outcome(tracker.try_accept_at(&issuer("le"), t0())), (false, 0));
    }

    #[test]
    fn test_set_limit_does_not_start_window() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 5);
        assert!(tracker.has_record(&issuer("le")));
        assert_eq!(tracker.usage_at(&issuer("le"), t0()), 0);
        assert_eq!(tracker.limit_for(&issuer("le")), 5);
    }

    #[test]
    fn test_remove_issuer_drops_record() {
        let tracker = QuotaTracker::new(10_000);
        tracker.set_limit(&issuer("le"), 1);
        tracker.try_accept_at(&issuer("le"), t0());

        assert!(tracker.remove_issuer(&issuer("le")));
        assert!(!tracker.has_record(&issuer("le")));
        assert_eq!(tracker.usage_at(&issuer("le"), t0()), 0);
        assert_eq!(tracker.limit_for(&issuer("le")), 10_000);
        assert!(!tracker.remove_issuer(&issuer("le")));
    }

    #[test]
    fn test_issuers_are_independent() {
        let tracker = QuotaTracker::new(1);
        assert!(tracker.try_accept_at(&issuer("a"), t0()).accepted);
        assert!(tracker.try_accept_at(&issuer("b"), t0()).accepted);
        assert!(!tracker.try_accept_at(&issuer("a"), t0()).accepted);
    }
}
