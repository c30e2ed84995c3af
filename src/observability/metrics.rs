//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `cert_management_acme_account_registrations` - ACME account registrations by URI and email
//! - `cert_management_acme_orders` - Number of ACME orders
//! - `cert_management_acme_active_dns_challenges` - Currently active ACME DNS challenges per issuer
//! - `cert_management_cert_entries` - Certificate objects per issuer
//! - `cert_management_overdue_renewal_certificates` - Certificates with renewal overdue
//! - `cert_management_revoked_certificates` - Certificates with revoked certificate
//! - `cert_management_secrets` - Certificate secrets per classification
//! - `cert_management_quota_rejections_total` - Certificate requests refused by the issuer quota

use prometheus::{GaugeVec, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::LazyLock;

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static ACME_ACCOUNT_REGISTRATIONS: LazyLock<GaugeVec> = LazyLock::new(|| {
    GaugeVec::new(
        Opts::new(
            "cert_management_acme_account_registrations",
            "ACME account registrations",
        ),
        &["uri", "email"],
    )
    .expect("Failed to create ACME_ACCOUNT_REGISTRATIONS metric - this should never happen")
});

static ACME_TOTAL_ORDERS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("cert_management_acme_orders", "Number of ACME orders"),
        &["issuer", "success", "dns_challenges", "renew"],
    )
    .expect("Failed to create ACME_TOTAL_ORDERS metric - this should never happen")
});

static ACME_ACTIVE_DNS_CHALLENGES: LazyLock<GaugeVec> = LazyLock::new(|| {
    GaugeVec::new(
        Opts::new(
            "cert_management_acme_active_dns_challenges",
            "Currently active number of ACME DNS challenges",
        ),
        &["issuer"],
    )
    .expect("Failed to create ACME_ACTIVE_DNS_CHALLENGES metric - this should never happen")
});

static CERT_ENTRIES: LazyLock<GaugeVec> = LazyLock::new(|| {
    GaugeVec::new(
        Opts::new(
            "cert_management_cert_entries",
            "Total number of certificate objects per issuer",
        ),
        &["issuertype", "issuer"],
    )
    .expect("Failed to create CERT_ENTRIES metric - this should never happen")
});

static OVERDUE_CERTIFICATES: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "cert_management_overdue_renewal_certificates",
        "Number of certificate objects with certificate's renewal overdue",
    )
    .expect("Failed to create OVERDUE_CERTIFICATES metric - this should never happen")
});

static REVOKED_CERTIFICATES: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "cert_management_revoked_certificates",
        "Number of certificate objects with revoked certificate",
    )
    .expect("Failed to create REVOKED_CERTIFICATES metric - this should never happen")
});

static CERTIFICATE_SECRETS: LazyLock<GaugeVec> = LazyLock::new(|| {
    GaugeVec::new(
        Opts::new(
            "cert_management_secrets",
            "Number of certificate secrets per classification",
        ),
        &["classification"],
    )
    .expect("Failed to create CERTIFICATE_SECRETS metric - this should never happen")
});

static QUOTA_REJECTIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cert_management_quota_rejections_total",
            "Number of certificate requests refused by the issuer's requests per day quota",
        ),
        &["issuer"],
    )
    .expect("Failed to create QUOTA_REJECTIONS_TOTAL metric - this should never happen")
});

pub fn register_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(ACME_ACCOUNT_REGISTRATIONS.clone()))?;
    REGISTRY.register(Box::new(ACME_TOTAL_ORDERS.clone()))?;
    REGISTRY.register(Box::new(ACME_ACTIVE_DNS_CHALLENGES.clone()))?;
    REGISTRY.register(Box::new(CERT_ENTRIES.clone()))?;
    REGISTRY.register(Box::new(OVERDUE_CERTIFICATES.clone()))?;
    REGISTRY.register(Box::new(REVOKED_CERTIFICATES.clone()))?;
    REGISTRY.register(Box::new(CERTIFICATE_SECRETS.clone()))?;
    REGISTRY.register(Box::new(QUOTA_REJECTIONS_TOTAL.clone()))?;

    Ok(())
}

#[must_use]
pub fn gather() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

/// Marks an ACME account as registered
pub fn add_acme_account_registration(uri: &str, email: &str) {
    ACME_ACCOUNT_REGISTRATIONS
        .with_label_values(&[uri, email])
        .set(1.0);
}

/// Counts a finished ACME order. Orders without DNS challenges are not counted.
pub fn add_acme_order(issuer: &str, success: bool, dns_challenges: usize, renew: bool) {
    if dns_challenges > 0 {
        let success = success.to_string();
        let dns_challenges = dns_challenges.to_string();
        let renew = renew.to_string();
        ACME_TOTAL_ORDERS
            .with_label_values(&[issuer, success.as_str(), dns_challenges.as_str(), renew.as_str()])
            .inc();
    }
}

pub fn add_active_acme_dns_challenge(issuer: &str) {
    ACME_ACTIVE_DNS_CHALLENGES.with_label_values(&[issuer]).inc();
}

pub fn remove_active_acme_dns_challenge(issuer: &str) {
    ACME_ACTIVE_DNS_CHALLENGES.with_label_values(&[issuer]).dec();
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Certificate counts stay far below 2^52"
)]
pub fn report_cert_entries(issuer_type: &str, issuer: &str, count: usize) {
    CERT_ENTRIES
        .with_label_values(&[issuer_type, issuer])
        .set(count as f64);
}

/// Drops the series of an issuer that no longer exists
pub fn delete_cert_entries(issuer_type: &str, issuer: &str) {
    // Err only means the series was never reported
    let _ = CERT_ENTRIES.remove_label_values(&[issuer_type, issuer]);
}

pub fn report_overdue_certs(count: usize) {
    OVERDUE_CERTIFICATES.set(i64::try_from(count).unwrap_or(i64::MAX));
}

pub fn report_revoked_certs(count: usize) {
    REVOKED_CERTIFICATES.set(i64::try_from(count).unwrap_or(i64::MAX));
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Secret counts stay far below 2^52"
)]
pub fn report_certificate_secrets(classification: &str, count: usize) {
    CERTIFICATE_SECRETS
        .with_label_values(&[classification])
        .set(count as f64);
}

pub fn increment_quota_rejections(issuer: &str) {
    QUOTA_REJECTIONS_TOTAL.with_label_values(&[issuer]).inc();
}

/// Text exposition of all registered metrics, registering them first if needed
#[cfg(test)]
pub(crate) fn exposition() -> String {
    use prometheus::{Encoder, TextEncoder};
    use std::sync::Once;

    static REGISTERED: Once = Once::new();
    REGISTERED.call_once(|| {
        register_metrics().expect("registering metrics");
    });
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&gather(), &mut buffer)
        .expect("encoding metrics");
    String::from_utf8(buffer).expect("metrics are UTF-8")
}
