//! Pipeline configuration from environment variables
//!
//! Loaded once at startup; any invalid value is a fatal [`ConfigError`].

use super::reporter::{ReportFormat, ReportTimezone};
use crate::catalog::CatalogSources;
use crate::error::ConfigError;
use crate::matcher::LineSourceKind;
use std::env;
use std::path::PathBuf;

/// 1 minute, 1 hour, 8 hours, 1 day, 1 week
pub const DEFAULT_HORIZONS: [f64; 5] = [60.0, 3600.0, 8.0 * 3600.0, 24.0 * 3600.0, 7.0 * 24.0 * 3600.0];

/// Configuration for the sentiment pipeline runtime
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Half-lives in seconds, one horizon each, in report order
    pub horizons: Vec<f64>,

    /// Report period in milliseconds
    pub report_interval_ms: u64,

    /// Delay before the first report in milliseconds
    pub first_report_ms: u64,

    /// Heavy hitters listed per horizon
    pub top_k: usize,

    /// Line channel capacity between the line source and the ingest loop
    pub channel_buffer: usize,

    pub report_format: ReportFormat,

    /// Zone of the date on text report lines
    pub report_timezone: ReportTimezone,

    pub catalog: CatalogSources,

    /// Pattern file written for the matcher
    pub patterns_out: PathBuf,

    pub matcher_bin: String,

    pub line_source: LineSourceKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizons: DEFAULT_HORIZONS.to_vec(),
            report_interval_ms: 5_000,
            first_report_ms: 1_000,
            top_k: 5,
            channel_buffer: 10_000,
            report_format: ReportFormat::Text,
            report_timezone: ReportTimezone::Local,
            catalog: CatalogSources {
                negative: Some(PathBuf::from("patterns/sentiment/negative_words_en.txt")),
                positive: Some(PathBuf::from("patterns/sentiment/positive_words_en.txt")),
                scored: Some(PathBuf::from("patterns/sentiment/top-5000_2000decade.txt")),
            },
            patterns_out: PathBuf::from("patterns.txt"),
            matcher_bin: "./ocl_aho_grep".to_string(),
            line_source: LineSourceKind::Process,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SENTIFLOW_HORIZONS` (default: 60,3600,28800,86400,604800)
    /// - `SENTIFLOW_REPORT_INTERVAL_MS` (default: 5000)
    /// - `SENTIFLOW_FIRST_REPORT_MS` (default: 1000)
    /// - `SENTIFLOW_TOP_K` (default: 5)
    /// - `SENTIFLOW_CHANNEL_BUFFER` (default: 10000)
    /// - `SENTIFLOW_REPORT_FORMAT` (default: text, or jsonl)
    /// - `SENTIFLOW_REPORT_TZ` (default: local, or utc)
    /// - `SENTIFLOW_NEGATIVE_LEXICON`, `SENTIFLOW_POSITIVE_LEXICON`,
    ///   `SENTIFLOW_SCORED_LEXICON` (empty disables the lexicon)
    /// - `SENTIFLOW_PATTERNS_OUT` (default: patterns.txt)
    /// - `SENTIFLOW_MATCHER_BIN` (default: ./ocl_aho_grep)
    /// - `SENTIFLOW_MATCHER_SOURCE` (default: process, or stdin)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`PipelineConfig::from_env`] over an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let horizons = match lookup("SENTIFLOW_HORIZONS") {
            Some(raw) => parse_horizons(&raw)?,
            None => defaults.horizons,
        };

        let report_format = match lookup("SENTIFLOW_REPORT_FORMAT") {
            Some(raw) => raw.parse::<ReportFormat>().map_err(|reason| ConfigError::InvalidValue {
                variable: "SENTIFLOW_REPORT_FORMAT".to_string(),
                reason,
            })?,
            None => defaults.report_format,
        };

        let report_timezone = match lookup("SENTIFLOW_REPORT_TZ") {
            Some(raw) => raw.parse::<ReportTimezone>().map_err(|reason| ConfigError::InvalidValue {
                variable: "SENTIFLOW_REPORT_TZ".to_string(),
                reason,
            })?,
            None => defaults.report_timezone,
        };

        let line_source = match lookup("SENTIFLOW_MATCHER_SOURCE") {
            Some(raw) => raw.parse::<LineSourceKind>().map_err(|reason| ConfigError::InvalidValue {
                variable: "SENTIFLOW_MATCHER_SOURCE".to_string(),
                reason,
            })?,
            None => defaults.line_source,
        };

        let lexicon = |variable: &str, default: Option<PathBuf>| match lookup(variable) {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(PathBuf::from(raw)),
            None => default,
        };

        let config = Self {
            horizons,
            report_interval_ms: parse_number(&lookup, "SENTIFLOW_REPORT_INTERVAL_MS", defaults.report_interval_ms)?,
            first_report_ms: parse_number(&lookup, "SENTIFLOW_FIRST_REPORT_MS", defaults.first_report_ms)?,
            top_k: parse_number(&lookup, "SENTIFLOW_TOP_K", defaults.top_k)?,
            channel_buffer: parse_number(&lookup, "SENTIFLOW_CHANNEL_BUFFER", defaults.channel_buffer)?,
            report_format,
            report_timezone,
            catalog: CatalogSources {
                negative: lexicon("SENTIFLOW_NEGATIVE_LEXICON", defaults.catalog.negative),
                positive: lexicon("SENTIFLOW_POSITIVE_LEXICON", defaults.catalog.positive),
                scored: lexicon("SENTIFLOW_SCORED_LEXICON", defaults.catalog.scored),
            },
            patterns_out: lookup("SENTIFLOW_PATTERNS_OUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.patterns_out),
            matcher_bin: lookup("SENTIFLOW_MATCHER_BIN").unwrap_or(defaults.matcher_bin),
            line_source,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }

        if let Some(&bad) = self.horizons.iter().find(|h| !h.is_finite() || **h <= 0.0) {
            return Err(ConfigError::InvalidHalfLife(bad));
        }

        for (i, horizon) in self.horizons.iter().enumerate() {
            if self.horizons[..i].contains(horizon) {
                return Err(ConfigError::InvalidValue {
                    variable: "SENTIFLOW_HORIZONS".to_string(),
                    reason: format!("horizon {} is listed more than once", horizon),
                });
            }
        }

        if self.report_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                variable: "SENTIFLOW_REPORT_INTERVAL_MS".to_string(),
                reason: "report interval must be greater than zero".to_string(),
            });
        }

        if self.channel_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                variable: "SENTIFLOW_CHANNEL_BUFFER".to_string(),
                reason: "channel buffer must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_horizons(raw: &str) -> Result<Vec<f64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                variable: "SENTIFLOW_HORIZONS".to_string(),
                reason: format!("{:?} is not a number of seconds", s),
            })
        })
        .collect()
}

fn parse_number<F, T>(lookup: &F, variable: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(variable) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            variable: variable.to_string(),
            reason: format!("{:?} is not a valid number", raw),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<PipelineConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.horizons, vec![60.0, 3600.0, 28800.0, 86400.0, 604800.0]);
        assert_eq!(config.report_interval_ms, 5_000);
        assert_eq!(config.first_report_ms, 1_000);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.report_format, ReportFormat::Text);
        assert_eq!(config.report_timezone, ReportTimezone::Local);
        assert_eq!(config.line_source, LineSourceKind::Process);
    }

    #[test]
    fn test_custom_config() {
        let config = config_from(&[
            ("SENTIFLOW_HORIZONS", " 30, 600 ,"),
            ("SENTIFLOW_REPORT_INTERVAL_MS", "2000"),
            ("SENTIFLOW_TOP_K", "10"),
            ("SENTIFLOW_REPORT_FORMAT", "jsonl"),
            ("SENTIFLOW_REPORT_TZ", "utc"),
            ("SENTIFLOW_SCORED_LEXICON", ""),
            ("SENTIFLOW_MATCHER_SOURCE", "stdin"),
            ("SENTIFLOW_PATTERNS_OUT", "/tmp/patterns.txt"),
        ])
        .unwrap();

        assert_eq!(config.horizons, vec![30.0, 600.0]);
        assert_eq!(config.report_interval_ms, 2_000);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.report_format, ReportFormat::Jsonl);
        assert_eq!(config.report_timezone, ReportTimezone::Utc);
        assert_eq!(config.catalog.scored, None);
        assert!(config.catalog.negative.is_some());
        assert_eq!(config.line_source, LineSourceKind::Stdin);
        assert_eq!(config.patterns_out, PathBuf::from("/tmp/patterns.txt"));
    }

    #[test]
    fn test_non_positive_horizon_is_fatal() {
        assert!(matches!(
            config_from(&[("SENTIFLOW_HORIZONS", "60,-5")]),
            Err(ConfigError::InvalidHalfLife(h)) if h == -5.0
        ));
        assert!(matches!(
            config_from(&[("SENTIFLOW_HORIZONS", "60,0")]),
            Err(ConfigError::InvalidHalfLife(_))
        ));
        assert!(matches!(
            config_from(&[("SENTIFLOW_HORIZONS", "")]),
            Err(ConfigError::NoHorizons)
        ));
        assert!(matches!(
            config_from(&[("SENTIFLOW_HORIZONS", "60,hour")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_horizons_rejected() {
        assert!(matches!(
            config_from(&[("SENTIFLOW_HORIZONS", "60,3600,60")]),
            Err(ConfigError::InvalidValue { variable, .. }) if variable == "SENTIFLOW_HORIZONS"
        ));
        assert!(config_from(&[("SENTIFLOW_HORIZONS", "60, 60.0")]).is_err());
        assert!(config_from(&[("SENTIFLOW_HORIZONS", "60,3600")]).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("SENTIFLOW_TOP_K", "five")]).is_err());
        assert!(config_from(&[("SENTIFLOW_REPORT_INTERVAL_MS", "0")]).is_err());
        assert!(config_from(&[("SENTIFLOW_REPORT_FORMAT", "xml")]).is_err());
        assert!(config_from(&[("SENTIFLOW_REPORT_TZ", "mars")]).is_err());
        assert!(config_from(&[("SENTIFLOW_MATCHER_SOURCE", "socket")]).is_err());
    }
}
