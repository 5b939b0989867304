//! Analysis configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. [`AnalysisConfig::default`]
//! 2. an optional TOML file ([`AnalysisConfig::from_file`])
//! 3. `QUANTALPHA_*` environment variables ([`AnalysisConfig::with_env_overrides`])
//!
//! ```toml
//! period = "5y"
//! seed = 7
//! synthetic_fallback = true
//! fetch_timeout_ms = 10000
//! end_date = "2024-06-28"
//! ```

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{QuantError, Result};
use crate::provider::synthetic::DEFAULT_SEED;
use crate::provider::Period;

pub const ENV_PERIOD: &str = "QUANTALPHA_PERIOD";
pub const ENV_SEED: &str = "QUANTALPHA_SEED";
pub const ENV_FALLBACK: &str = "QUANTALPHA_FALLBACK";
pub const ENV_TIMEOUT_MS: &str = "QUANTALPHA_TIMEOUT_MS";

const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Settings shared by every analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// History window requested from the provider
    pub period: Period,
    /// Seed of the synthetic fallback generator
    pub seed: u64,
    /// Serve synthetic data when the history source fails
    pub synthetic_fallback: bool,
    /// Upper bound on a single history fetch
    pub fetch_timeout_ms: u64,
    /// Last session of synthetic series; today when unset
    pub end_date: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            seed: DEFAULT_SEED,
            synthetic_fallback: true,
            fetch_timeout_ms: DEFAULT_TIMEOUT_MS,
            end_date: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            QuantError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&s)
    }

    /// Apply the `QUANTALPHA_*` environment variables
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to its value
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_PERIOD) {
            self.period = value.parse()?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            self.seed = parse_var(ENV_SEED, &value)?;
        }
        if let Some(value) = lookup(ENV_FALLBACK) {
            self.synthetic_fallback = parse_flag(ENV_FALLBACK, &value)?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.fetch_timeout_ms = parse_var(ENV_TIMEOUT_MS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(QuantError::Config(
                "fetch_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| QuantError::Config(format!("{} has an invalid value {:?}", name, value)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(QuantError::Config(format!(
            "{} has an invalid value {:?}",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup<'a>(
        vars: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.period, Period::TwoYears);
        assert_eq!(config.seed, 42);
        assert!(config.synthetic_fallback);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(config.end_date, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            "period = \"5y\"\nend_date = \"2024-06-28\"\n",
        )
        .unwrap();
        assert_eq!(config.period, Period::FiveYears);
        assert_eq!(config.end_date, NaiveDate::from_ymd_opt(2024, 6, 28));
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = AnalysisConfig::from_toml_str("perid = \"1y\"").unwrap_err();
        assert!(matches!(err, QuantError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            (ENV_PERIOD, "1y"),
            (ENV_SEED, "7"),
            (ENV_FALLBACK, "false"),
            (ENV_TIMEOUT_MS, "250"),
        ]);
        let config = AnalysisConfig::default().apply_overrides(lookup(&vars)).unwrap();
        assert_eq!(config.period, Period::OneYear);
        assert_eq!(config.seed, 7);
        assert!(!config.synthetic_fallback);
        assert_eq!(config.fetch_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_overrides() {
        for (key, value) in [
            (ENV_SEED, "-1"),
            (ENV_FALLBACK, "maybe"),
            (ENV_TIMEOUT_MS, "0"),
            (ENV_PERIOD, "10y"),
        ] {
            let vars = HashMap::from([(key, value)]);
            let result = AnalysisConfig::default().apply_overrides(lookup(&vars));
            assert!(matches!(result, Err(QuantError::Config(_))), "{}={}", key, value);
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 99\nsynthetic_fallback = false").unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.seed, 99);
        assert!(!config.synthetic_fallback);

        assert!(AnalysisConfig::from_file("/nonexistent/quantalpha.toml").is_err());
    }
}
