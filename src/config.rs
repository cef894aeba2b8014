//! Runtime configuration.
//!
//! Every section is optional in the JSON form and falls back to the
//! defaults the CRM ships with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CrmError, CrmResult, ValidationError};
use crate::logging::Profile;
use crate::query::{ALL_SENTINEL, DEFAULT_PAGE_SIZE};
use crate::service::LatencyProfile;

/// Query engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Page size used by `QueryEngine::params`.
    pub default_page_size: usize,
    /// Filter value meaning "any".
    pub all_sentinel: String,
    /// Buttons in a pager window.
    pub max_visible_pages: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            all_sentinel: ALL_SENTINEL.to_string(),
            max_visible_pages: 5,
        }
    }
}

/// Aggregation engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Lower bound of the per-month revenue multiplier.
    pub variance_min: f64,
    /// Upper bound of the per-month revenue multiplier.
    pub variance_max: f64,
    /// Months in the revenue series.
    pub months: u32,
    /// Fixes the variance sequence when set.
    pub seed: Option<u64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            variance_min: 0.7,
            variance_max: 1.3,
            months: 6,
            seed: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub profile: Profile,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrmConfig {
    pub latency: LatencyProfile,
    pub query: QueryConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

impl CrmConfig {
    /// Defaults with all simulated latency removed.
    #[must_use]
    pub fn without_latency() -> Self {
        Self {
            latency: LatencyProfile::none(),
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed JSON, unknown keys or values
    /// that fail [`CrmConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Internal` when the file cannot be read, otherwise as
    /// [`CrmConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> CrmResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CrmError::internal(format!("read config {}: {e}", path.display())))?;
        Ok(Self::from_json_str(&json)?)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first bad setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| {
            Err(ValidationError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.query.default_page_size == 0 {
            return invalid("query.default_page_size must be at least 1");
        }
        if self.query.max_visible_pages == 0 {
            return invalid("query.max_visible_pages must be at least 1");
        }
        let a = &self.analytics;
        if !(a.variance_min.is_finite() && a.variance_max.is_finite()) || a.variance_min <= 0.0 {
            return invalid("analytics variance bounds must be finite and positive");
        }
        if a.variance_min > a.variance_max {
            return invalid("analytics.variance_min exceeds analytics.variance_max");
        }
        if a.months == 0 {
            return invalid("analytics.months must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn defaults_match_shipped_behaviour() {
        let config = CrmConfig::default();
        assert_eq!(config.latency.read_ms, 300);
        assert_eq!(config.latency.write_ms, 300);
        assert_eq!(config.latency.analytics_ms, 500);
        assert_eq!(config.query.default_page_size, 50);
        assert_eq!(config.query.all_sentinel, "all");
        assert_eq!(config.analytics.months, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = CrmConfig::from_json_str(r#"{"query":{"default_page_size":25},"analytics":{"seed":7}}"#).unwrap();
        assert_eq!(config.query.default_page_size, 25);
        assert_eq!(config.query.max_visible_pages, 5);
        assert_eq!(config.analytics.seed, Some(7));
        assert_eq!(config.latency, LatencyProfile::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CrmConfig::from_json_str(r#"{"query":{"page_sise":25}}"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidConfig { .. }));
    }

    #[test]
    fn inverted_variance_bounds_are_rejected() {
        let err =
            CrmConfig::from_json_str(r#"{"analytics":{"variance_min":1.5,"variance_max":1.0}}"#).unwrap_err();
        assert!(err.to_string().contains("variance_min"));
    }

    #[test]
    fn zero_months_and_zero_page_size_are_rejected() {
        assert!(CrmConfig::from_json_str(r#"{"analytics":{"months":0}}"#).is_err());
        assert!(CrmConfig::from_json_str(r#"{"query":{"default_page_size":0}}"#).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"latency":{{"read_ms":0,"write_ms":0,"analytics_ms":0}},"logging":{{"profile":"production"}}}}"#)
            .unwrap();
        let config = CrmConfig::from_file(file.path()).unwrap();
        assert_eq!(config.latency, LatencyProfile::none());
        assert_eq!(config.logging.profile, Profile::Production);
    }

    #[test]
    fn missing_file_is_internal() {
        let err = CrmConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CrmError::Internal { .. }));
    }
}
