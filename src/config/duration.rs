//! # Duration Parsing
//!
//! Parses Kubernetes-style duration strings used in controller options.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

static DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<number>\d+)(?P<unit>[smhd])$")
        .expect("Failed to compile duration regex - this should never happen")
});

/// Parse a duration like "30s", "5m", "2h" or "30d".
///
/// `key` names the option in error messages.
pub fn parse_kubernetes_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim().to_lowercase();
    let invalid = || ConfigError::InvalidDuration {
        key: key.to_string(),
        value: value.to_string(),
    };

    let captures = DURATION_REGEX.captures(&trimmed).ok_or_else(invalid)?;
    let number: u64 = captures["number"].parse().map_err(|_| invalid())?;
    if number == 0 {
        return Err(ConfigError::ZeroDuration {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    let multiplier = match &captures["unit"] {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => return Err(invalid()),
    };
    number
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}
