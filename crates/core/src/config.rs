//! Gate configuration.

use std::time::Duration;

use thiserror::Error;

/// Environment variable overriding [`GateConfig::grant_ttl`] (seconds).
pub const ENV_GRANT_TTL_SECS: &str = "SUITEGATE_GRANT_TTL_SECS";
/// Environment variable overriding [`GateConfig::reaper_interval`] (seconds).
pub const ENV_REAPER_INTERVAL_SECS: &str = "SUITEGATE_REAPER_INTERVAL_SECS";
/// Environment variable overriding [`GateConfig::access_key`].
pub const ENV_ACCESS_KEY: &str = "SUITEGATE_ACCESS_KEY";
/// Environment variable overriding [`GateConfig::preference_key`].
pub const ENV_PREFERENCE_KEY: &str = "SUITEGATE_PREFERENCE_KEY";

/// Upper bound for configured durations: one year.
pub const MAX_DURATION_SECS: u64 = 366 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a whole number of seconds between 1 and {max}, got '{value}'", max = MAX_DURATION_SECS)]
    InvalidDuration { key: String, value: String },

    #[error("{key} must not be empty")]
    EmptyKey { key: String },
}

/// Tunables for the suite gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// How long a grant stays valid after a successful password match.
    pub grant_ttl: Duration,
    /// How often the reaper prunes expired grants.
    pub reaper_interval: Duration,
    /// Storage key of the serialized grant map.
    pub access_key: String,
    /// Storage key of the last active suite.
    pub preference_key: String,
    /// Suite-agnostic landing path that is never redirected.
    pub landing_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            grant_ttl: Duration::from_secs(30 * 60),
            reaper_interval: Duration::from_secs(60),
            access_key: "suite-access".to_string(),
            preference_key: "suite-preference".to_string(),
            landing_path: "/".to_string(),
        }
    }
}

impl GateConfig {
    /// Defaults with `SUITEGATE_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_GRANT_TTL_SECS) {
            config.grant_ttl = parse_secs(ENV_GRANT_TTL_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_REAPER_INTERVAL_SECS) {
            config.reaper_interval = parse_secs(ENV_REAPER_INTERVAL_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_ACCESS_KEY) {
            config.access_key = non_empty(ENV_ACCESS_KEY, value)?;
        }
        if let Some(value) = lookup(ENV_PREFERENCE_KEY) {
            config.preference_key = non_empty(ENV_PREFERENCE_KEY, value)?;
        }

        Ok(config)
    }

    pub fn with_grant_ttl(mut self, ttl: Duration) -> Self {
        self.grant_ttl = ttl;
        self
    }

    pub fn with_reaper_interval(mut self, interval: Duration) -> Self {
        self.reaper_interval = interval;
        self
    }

    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = key.into();
        self
    }

    pub fn with_preference_key(mut self, key: impl Into<String>) -> Self {
        self.preference_key = key.into();
        self
    }

    /// TTL as a signed duration for timestamp arithmetic.
    pub fn grant_ttl_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.grant_ttl).unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if (1..=MAX_DURATION_SECS).contains(&secs) => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidDuration {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyKey { key: key.to_string() })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_behavior() {
        let config = GateConfig::default();
        assert_eq!(config.grant_ttl, Duration::from_secs(1800));
        assert_eq!(config.reaper_interval, Duration::from_secs(60));
        assert_eq!(config.access_key, "suite-access");
        assert_eq!(config.preference_key, "suite-preference");
        assert_eq!(config.landing_path, "/");
        assert_eq!(config.grant_ttl_delta(), chrono::Duration::minutes(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = GateConfig::from_lookup(lookup(&[
            (ENV_GRANT_TTL_SECS, "120"),
            (ENV_REAPER_INTERVAL_SECS, " 5 "),
            (ENV_ACCESS_KEY, "grants"),
        ]))
        .unwrap();

        assert_eq!(config.grant_ttl, Duration::from_secs(120));
        assert_eq!(config.reaper_interval, Duration::from_secs(5));
        assert_eq!(config.access_key, "grants");
        assert_eq!(config.preference_key, "suite-preference");
    }

    #[test]
    fn zero_or_garbage_durations_are_rejected() {
        let err = GateConfig::from_lookup(lookup(&[(ENV_GRANT_TTL_SECS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { .. }));

        let err = GateConfig::from_lookup(lookup(&[(ENV_REAPER_INTERVAL_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration { .. }));
    }

    #[test]
    fn durations_beyond_a_year_are_rejected() {
        let err = GateConfig::from_lookup(lookup(&[(ENV_GRANT_TTL_SECS, "10000000000000")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDuration {
                key: ENV_GRANT_TTL_SECS.to_string(),
                value: "10000000000000".to_string(),
            }
        );

        let max = MAX_DURATION_SECS.to_string();
        let config = GateConfig::from_lookup(lookup(&[(ENV_GRANT_TTL_SECS, max.as_str())])).unwrap();
        assert_eq!(config.grant_ttl, Duration::from_secs(MAX_DURATION_SECS));
    }

    #[test]
    fn blank_keys_are_rejected() {
        let err = GateConfig::from_lookup(lookup(&[(ENV_PREFERENCE_KEY, "  ")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyKey {
                key: ENV_PREFERENCE_KEY.to_string()
            }
        );
    }
}
