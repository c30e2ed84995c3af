//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default period of the state reporter publishing gauges (seconds)
pub const DEFAULT_METRICS_REPORT_INTERVAL_SECS: u64 = 30;

/// Default name of the issuer used when a certificate names none
pub const DEFAULT_ISSUER_NAME: &str = "default-issuer";

/// Default namespace to look up issuers on the default cluster
pub const DEFAULT_ISSUER_NAMESPACE: &str = "default";

/// Certificates are renewed once their remaining validity is shorter than this
pub const DEFAULT_RENEWAL_WINDOW: &str = "30d";

/// Certificates count as renewal overdue once their remaining validity is shorter than this
pub const DEFAULT_RENEWAL_OVERDUE_WINDOW: &str = "25d";

/// Nameservers used for checking DNS propagation
pub const DEFAULT_PRECHECK_NAMESERVERS: &str = "8.8.8.8:53,8.8.4.4:53";

/// Additional wait time after the DNS propagation check
pub const DEFAULT_PRECHECK_ADDITIONAL_WAIT: &str = "10s";

/// Propagation timeout for DNS challenges
pub const DEFAULT_PROPAGATION_TIMEOUT: &str = "120s";

/// Requests per day an issuer may make when its spec sets no quota
pub const DEFAULT_REQUESTS_PER_DAY_QUOTA: u32 = 10_000;

/// Issuer type label used for ACME issuers in metrics
pub const ISSUER_TYPE_ACME: &str = "acme";
