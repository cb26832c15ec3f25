// Engine settings, loaded from an optional JSON file. Every field has a
// default, so a partial file only overrides what it names.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// Longest history window accepted, about a century of calendar days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;
/// Longest listing cache lifetime accepted (one year).
pub const MAX_LISTING_TTL_SECS: i64 = 86_400 * 365;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory read by the CSV provider.
    pub data_dir: PathBuf,
    pub min_scan_count: usize,
    pub max_scan_count: usize,
    /// Calendar days of history requested per candidate (52-week window).
    pub lookback_days: i64,
    pub min_history_bars: usize,
    /// Kosdaq candidates below this market cap are dropped.
    pub secondary_min_market_cap: f64,
    pub listing_ttl_secs: i64,
    pub fetch_timeout_secs: u64,
    /// 1 runs candidates strictly one after another.
    pub max_concurrency: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            data_dir: PathBuf::from("data"),
            min_scan_count: 1,
            max_scan_count: 500,
            lookback_days: 365,
            min_history_bars: 120,
            secondary_min_market_cap: 50_000_000_000.0,
            listing_ttl_secs: 3600,
            fetch_timeout_secs: 10,
            max_concurrency: 1,
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| EngineError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings =
            serde_json::from_str(content).map_err(|e| EngineError::ConfigError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_scan_count == 0 || self.min_scan_count > self.max_scan_count {
            return Err(EngineError::ConfigError(format!(
                "scan count bounds must satisfy 1 <= min <= max, got {}..={}",
                self.min_scan_count, self.max_scan_count
            )));
        }
        if self.max_concurrency == 0 {
            return Err(EngineError::ConfigError("max_concurrency must be at least 1".to_string()));
        }
        if self.min_history_bars < 60 {
            return Err(EngineError::ConfigError(format!(
                "min_history_bars must be at least 60 (the long moving average window), got {}",
                self.min_history_bars
            )));
        }
        if self.lookback_days <= 0 || self.listing_ttl_secs < 0 || self.fetch_timeout_secs == 0 {
            return Err(EngineError::ConfigError(
                "lookback_days and fetch_timeout_secs must be positive, listing_ttl_secs non-negative".to_string(),
            ));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(EngineError::ConfigError(format!(
                "lookback_days must be at most {}, got {}",
                MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }
        if self.listing_ttl_secs > MAX_LISTING_TTL_SECS {
            return Err(EngineError::ConfigError(format!(
                "listing_ttl_secs must be at most {}, got {}",
                MAX_LISTING_TTL_SECS, self.listing_ttl_secs
            )));
        }
        Ok(())
    }

    pub fn clamp_count(&self, count: usize) -> usize {
        count.clamp(self.min_scan_count, self.max_scan_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let settings = EngineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.min_history_bars, 120);
        assert_eq!(settings.secondary_min_market_cap, 50_000_000_000.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = EngineSettings::from_json(r#"{ "max_concurrency": 4, "data_dir": "/srv/market" }"#).unwrap();
        assert_eq!(settings.max_concurrency, 4);
        assert_eq!(settings.data_dir, PathBuf::from("/srv/market"));
        assert_eq!(settings.lookback_days, 365);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineSettings::from_json(r#"{ "max_concurrency": 0 }"#).is_err());
        assert!(EngineSettings::from_json(r#"{ "min_scan_count": 10, "max_scan_count": 5 }"#).is_err());
        assert!(EngineSettings::from_json(r#"{ "min_history_bars": 30 }"#).is_err());
        let err = EngineSettings::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_oversized_windows_rejected() {
        let err = EngineSettings::from_json(r#"{ "listing_ttl_secs": 9000000000000000 }"#).unwrap_err();
        assert!(err.to_string().contains("listing_ttl_secs"));
        let err = EngineSettings::from_json(r#"{ "lookback_days": 100000000000 }"#).unwrap_err();
        assert!(err.to_string().contains("lookback_days"));

        let at_limit = format!(
            r#"{{ "lookback_days": {}, "listing_ttl_secs": {} }}"#,
            MAX_LOOKBACK_DAYS, MAX_LISTING_TTL_SECS
        );
        assert!(EngineSettings::from_json(&at_limit).is_ok());
    }

    #[test]
    fn test_clamp_count() {
        let settings = EngineSettings::default();
        assert_eq!(settings.clamp_count(0), 1);
        assert_eq!(settings.clamp_count(50), 50);
        assert_eq!(settings.clamp_count(10_000), 500);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "fetch_timeout_secs": 3 }}"#).unwrap();
        let settings = EngineSettings::load(file.path()).unwrap();
        assert_eq!(settings.fetch_timeout_secs, 3);
        assert!(EngineSettings::load(Path::new("does/not/exist.json")).is_err());
    }
}
