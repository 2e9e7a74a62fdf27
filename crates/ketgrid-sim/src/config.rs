//! Configuration for the ketgrid simulator.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with KETGRID_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values
//!
//! A [`SimConfig`] is handed to the [`Simulator`](crate::Simulator)
//! explicitly; evaluation never reads the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::tracing_config::{TracingConfig, TracingFormat};

/// Upper bound accepted for `limits.max_wire_count`.
pub const HARD_WIRE_LIMIT: usize = 24;

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SimConfig {
    /// Circuit size limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Animation cycle and time cache settings
    #[serde(default)]
    pub time: TimeConfig,

    /// Evaluation behavior
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Circuit size limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Widest circuit the evaluator will allocate a state for
    #[serde(default = "default_max_wire_count")]
    pub max_wire_count: usize,

    /// Narrowest circuit the evaluator accepts
    #[serde(default = "default_min_wire_count")]
    pub min_wire_count: usize,

    /// Width given to a text circuit whose gates fit in fewer wires
    #[serde(default = "default_editor_min_wire_count")]
    pub editor_min_wire_count: usize,
}

/// Animation cycle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Length of one animation cycle in milliseconds
    #[serde(default = "default_cycle_duration_ms")]
    pub cycle_duration_ms: u64,

    /// Number of distinguishable phases per cycle
    #[serde(default = "default_granularity")]
    pub granularity: u64,
}

/// Evaluation behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Which intermediate state vectors are kept
    #[serde(default)]
    pub history: HistoryMode,

    /// Numeric comparison tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum number of compiled time-independent kernels kept
    #[serde(default = "default_kernel_cache_capacity")]
    pub kernel_cache_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Which state vectors an evaluation keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// The initial vector and the vector after every column.
    #[default]
    Full,
    /// Only the initial and final vectors. Per-column statistics are still
    /// recorded.
    Endpoints,
}

impl FromStr for HistoryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "endpoints" => Ok(Self::Endpoints),
            other => Err(ConfigError::ParseError(format!(
                "Unknown history mode: {other}"
            ))),
        }
    }
}

impl fmt::Display for HistoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Endpoints => write!(f, "endpoints"),
        }
    }
}

// Default value functions
fn default_max_wire_count() -> usize {
    20
}

fn default_min_wire_count() -> usize {
    1
}

fn default_editor_min_wire_count() -> usize {
    2
}

fn default_cycle_duration_ms() -> u64 {
    8000
}

fn default_granularity() -> u64 {
    196
}

fn default_tolerance() -> f64 {
    ketgrid_math::DEFAULT_TOLERANCE
}

fn default_kernel_cache_capacity() -> usize {
    512
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_wire_count: default_max_wire_count(),
            min_wire_count: default_min_wire_count(),
            editor_min_wire_count: default_editor_min_wire_count(),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            cycle_duration_ms: default_cycle_duration_ms(),
            granularity: default_granularity(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            history: HistoryMode::default(),
            tolerance: default_tolerance(),
            kernel_cache_capacity: default_kernel_cache_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        SimConfig::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    /// 3. Validate the result
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_file {
            Self::from_file(path)?
        } else {
            SimConfig::default()
        };

        config = config.merge_env();

        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables that are set and parse override the current values.
    #[must_use]
    pub fn merge_env(mut self) -> Self {
        // Limits
        if let Ok(v) = std::env::var("KETGRID_MAX_WIRES") {
            if let Ok(val) = v.parse() {
                self.limits.max_wire_count = val;
            }
        }

        // Time
        if let Ok(v) = std::env::var("KETGRID_CYCLE_MS") {
            if let Ok(val) = v.parse() {
                self.time.cycle_duration_ms = val;
            }
        }
        if let Ok(v) = std::env::var("KETGRID_TIME_GRANULARITY") {
            if let Ok(val) = v.parse() {
                self.time.granularity = val;
            }
        }

        // Evaluation
        if let Ok(v) = std::env::var("KETGRID_HISTORY") {
            if let Ok(val) = v.parse() {
                self.evaluation.history = val;
            }
        }

        // Logging
        if let Ok(v) = std::env::var("KETGRID_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("KETGRID_LOG_FORMAT") {
            self.logging.format = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate limits
        if !(1..=HARD_WIRE_LIMIT).contains(&self.limits.max_wire_count) {
            return Err(ConfigError::ValidationError(format!(
                "max_wire_count must be in 1..={HARD_WIRE_LIMIT}, got {}",
                self.limits.max_wire_count
            )));
        }
        if self.limits.min_wire_count == 0 {
            return Err(ConfigError::ValidationError(
                "min_wire_count must be greater than 0".to_string(),
            ));
        }
        if self.limits.min_wire_count > self.limits.max_wire_count {
            return Err(ConfigError::ValidationError(format!(
                "min_wire_count ({}) exceeds max_wire_count ({})",
                self.limits.min_wire_count, self.limits.max_wire_count
            )));
        }
        if !(self.limits.min_wire_count..=self.limits.max_wire_count)
            .contains(&self.limits.editor_min_wire_count)
        {
            return Err(ConfigError::ValidationError(format!(
                "editor_min_wire_count ({}) must be in {}..={}",
                self.limits.editor_min_wire_count,
                self.limits.min_wire_count,
                self.limits.max_wire_count
            )));
        }

        // Validate time settings
        if self.time.cycle_duration_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_duration_ms must be greater than 0".to_string(),
            ));
        }
        if self.time.granularity == 0 {
            return Err(ConfigError::ValidationError(
                "granularity must be greater than 0".to_string(),
            ));
        }

        // Validate evaluation settings
        if self.evaluation.tolerance.is_nan() || self.evaluation.tolerance <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "tolerance must be positive, got {}",
                self.evaluation.tolerance
            )));
        }

        // Validate log level
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        // Validate log format
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Tracing setup described by the logging section.
    pub fn tracing_config(&self) -> TracingConfig {
        let format = match self.logging.format.as_str() {
            "json" => TracingFormat::Json,
            _ => TracingFormat::Console,
        };
        TracingConfig::new(self.logging.level.clone(), format)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    IoError(String),

    /// The configuration text could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A value is out of range.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.limits.max_wire_count, 20);
        assert_eq!(config.limits.editor_min_wire_count, 2);
        assert_eq!(config.time.cycle_duration_ms, 8000);
        assert_eq!(config.time.granularity, 196);
        assert_eq!(config.evaluation.history, HistoryMode::Full);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_wire_limits() {
        let mut config = SimConfig::default();
        config.limits.max_wire_count = 30;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.limits.min_wire_count = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_wire_floors() {
        let mut config = SimConfig::default();
        config.limits.min_wire_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = SimConfig::default();
        config.limits.max_wire_count = 4;
        config.limits.editor_min_wire_count = 5;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = SimConfig::default();
        config.limits.min_wire_count = 3;
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.limits.max_wire_count = 2;
        config.limits.editor_min_wire_count = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_granularity() {
        let mut config = SimConfig::default();
        config.time.granularity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_tolerance() {
        let mut config = SimConfig::default();
        config.evaluation.tolerance = 0.0;
        assert!(config.validate().is_err());
        config.evaluation.tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = SimConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = SimConfig::from_yaml(
            "limits:\n  max_wire_count: 12\nevaluation:\n  history: endpoints\n",
        )
        .unwrap();
        assert_eq!(config.limits.max_wire_count, 12);
        assert_eq!(config.limits.min_wire_count, 1);
        assert_eq!(config.evaluation.history, HistoryMode::Endpoints);
        assert_eq!(config.time, TimeConfig::default());
    }

    #[test]
    fn test_yaml_is_validated() {
        assert!(matches!(
            SimConfig::from_yaml("time:\n  cycle_duration_ms: 0\n"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            SimConfig::from_yaml("evaluation:\n  history: sometimes\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("ketgrid-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "time:\n  granularity: 64\nlogging:\n  format: json\n").unwrap();
        let config = SimConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.time.granularity, 64);
        assert_eq!(config.tracing_config().format, TracingFormat::Json);

        assert!(matches!(
            SimConfig::from_file("/nonexistent/ketgrid.yaml"),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_history_mode_parsing() {
        assert_eq!("endpoints".parse::<HistoryMode>().unwrap(), HistoryMode::Endpoints);
        assert_eq!(HistoryMode::Full.to_string(), "full");
        assert!("all".parse::<HistoryMode>().is_err());
    }
}
