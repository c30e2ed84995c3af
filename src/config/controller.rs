//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use super::duration::parse_kubernetes_duration;
use crate::constants::*;
use crate::error::ConfigError;
use std::time::Duration;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Name of the default issuer (from the default cluster)
    pub default_issuer: String,
    /// Namespace to look up issuers on the default cluster
    pub issuer_namespace: String,
    /// Domain range restrictions when using the default issuer
    pub default_issuer_domain_ranges: Vec<String>,
    /// Namespace for creating challenge DNSEntries (in the DNS cluster)
    pub dns_namespace: Option<String>,
    /// Class for creating challenge DNSEntries (in the DNS cluster)
    pub dns_class: Option<String>,
    /// Owner id for creating challenge DNSEntries
    pub dns_owner_id: Option<String>,
    /// Delete certificate secrets together with their dependent resources
    pub cascade_delete: bool,
    /// A certificate is renewed if its remaining validity is shorter
    pub renewal_window: Duration,
    /// A certificate counts as renewal overdue if its remaining validity is shorter
    pub renewal_overdue_window: Duration,
    /// DNS nameservers used for checking DNS propagation
    /// If explicitly set empty, the resolver configuration of the host is used
    pub precheck_nameservers: Vec<String>,
    /// Additional wait time after the DNS propagation check
    pub precheck_additional_wait: Duration,
    /// Propagation timeout for DNS challenges
    pub propagation_timeout: Duration,
    /// Requests per day for issuers whose spec sets no quota
    pub default_requests_per_day_quota: u32,
    /// HTTP server port for metrics and probes
    pub metrics_port: u16,
    /// How often the state reporter publishes gauges (seconds)
    pub metrics_report_interval_secs: u64,
    /// Log format (json, text)
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_issuer: DEFAULT_ISSUER_NAME.to_string(),
            issuer_namespace: DEFAULT_ISSUER_NAMESPACE.to_string(),
            default_issuer_domain_ranges: Vec::new(),
            dns_namespace: None,
            dns_class: None,
            dns_owner_id: None,
            cascade_delete: false,
            renewal_window: Duration::from_secs(30 * 86_400),
            renewal_overdue_window: Duration::from_secs(25 * 86_400),
            precheck_nameservers: split_list(DEFAULT_PRECHECK_NAMESERVERS),
            precheck_additional_wait: Duration::from_secs(10),
            propagation_timeout: Duration::from_secs(120),
            default_requests_per_day_quota: DEFAULT_REQUESTS_PER_DAY_QUOTA,
            metrics_port: DEFAULT_METRICS_PORT,
            metrics_report_interval_secs: DEFAULT_METRICS_REPORT_INTERVAL_SECS,
            log_format: LogFormat::Text,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// The result is validated before it is returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };
        let config = Self {
            default_issuer: env.string("DEFAULT_ISSUER", DEFAULT_ISSUER_NAME),
            issuer_namespace: env.string("ISSUER_NAMESPACE", DEFAULT_ISSUER_NAMESPACE),
            default_issuer_domain_ranges: split_list(
                &env.string("DEFAULT_ISSUER_DOMAIN_RANGES", ""),
            ),
            dns_namespace: env.optional("DNS_NAMESPACE"),
            dns_class: env.optional("DNS_CLASS"),
            dns_owner_id: env.optional("DNS_OWNER_ID"),
            cascade_delete: env.bool("CASCADE_DELETE", false),
            renewal_window: env.duration("RENEWAL_WINDOW", DEFAULT_RENEWAL_WINDOW)?,
            renewal_overdue_window: env
                .duration("RENEWAL_OVERDUE_WINDOW", DEFAULT_RENEWAL_OVERDUE_WINDOW)?,
            precheck_nameservers: split_list(
                &env.string("PRECHECK_NAMESERVERS", DEFAULT_PRECHECK_NAMESERVERS),
            ),
            precheck_additional_wait: env
                .duration("PRECHECK_ADDITIONAL_WAIT", DEFAULT_PRECHECK_ADDITIONAL_WAIT)?,
            propagation_timeout: env.duration("PROPAGATION_TIMEOUT", DEFAULT_PROPAGATION_TIMEOUT)?,
            default_requests_per_day_quota: env.parsed(
                "DEFAULT_REQUESTS_PER_DAY_QUOTA",
                DEFAULT_REQUESTS_PER_DAY_QUOTA,
            ),
            metrics_port: env.parsed("METRICS_PORT", DEFAULT_METRICS_PORT),
            metrics_report_interval_secs: env.parsed(
                "METRICS_REPORT_INTERVAL_SECS",
                DEFAULT_METRICS_REPORT_INTERVAL_SECS,
            ),
            log_format: LogFormat::parse(&env.string("LOG_FORMAT", "text")),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renewal_overdue_window > self.renewal_window {
            return Err(ConfigError::OverdueExceedsRenewal {
                overdue_secs: self.renewal_overdue_window.as_secs(),
                renewal_secs: self.renewal_window.as_secs(),
            });
        }
        if self.default_requests_per_day_quota == 0 {
            return Err(ConfigError::MustBePositive {
                key: "DEFAULT_REQUESTS_PER_DAY_QUOTA",
            });
        }
        if self.metrics_report_interval_secs == 0 {
            return Err(ConfigError::MustBePositive {
                key: "METRICS_REPORT_INTERVAL_SECS",
            });
        }
        Ok(())
    }

    /// Get state reporter interval duration
    pub fn metrics_report_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_report_interval_secs)
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Read value or return default value
    fn parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        (self.lookup)(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Read value as boolean or return default
    fn bool(&self, key: &str, default: bool) -> bool {
        (self.lookup)(key)
            .map(|v| {
                let v_lower = v.to_lowercase();
                v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
            })
            .unwrap_or(default)
    }

    /// Read value as string or return default
    fn string(&self, key: &str, default: &str) -> String {
        (self.lookup)(key).unwrap_or_else(|| default.to_string())
    }

    /// Read non-empty value
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn duration(&self, key: &str, default: &str) -> Result<Duration, ConfigError> {
        parse_kubernetes_duration(key, &self.string(key, default))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
