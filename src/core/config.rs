//! Logger configuration
//!
//! Everything except `level` and `format` is fixed once a logger is built;
//! those two can be changed at runtime through `Logger::set_level` and
//! `Logger::set_format`.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::output_format::OutputFormat;
use super::sampling::SamplingConfig;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Logger options
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use rust_structured_logger::{Config, LogLevel, OutputFormat};
///
/// let config = Config::from_json(r#"{"level": "warn", "format": "text", "sampling_tick": 500}"#)
///     .unwrap();
/// assert_eq!(config.level, LogLevel::Warn);
/// assert_eq!(config.format, OutputFormat::Text);
/// assert_eq!(config.sampling_tick.as_millis(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record format
    pub format: OutputFormat,

    /// Gate level, records below it are not materialized
    pub level: LogLevel,

    /// Add the resolved call site as a `caller` field
    pub enable_caller: bool,

    /// Extra frames to skip when resolving the call site, for wrapping layers
    pub caller_skip: usize,

    /// Add a timestamp field
    pub enable_time: bool,

    pub time_field: String,

    pub time_format: TimestampFormat,

    pub message_field: String,

    pub level_field: String,

    /// Limit repeated records per (level, message) signature
    pub enable_sampling: bool,

    /// Sampling window, serialized as milliseconds
    #[serde(with = "duration_millis")]
    pub sampling_tick: Duration,

    /// Records per signature and tick that always pass
    pub sampling_start: u64,

    /// Keep one record out of every `sampling_factor` after `sampling_start`
    pub sampling_factor: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            level: LogLevel::Info,
            enable_caller: true,
            caller_skip: 0,
            enable_time: true,
            time_field: "time".to_string(),
            time_format: TimestampFormat::Iso8601,
            message_field: "message".to_string(),
            level_field: "level".to_string(),
            enable_sampling: true,
            sampling_tick: Duration::from_secs(1),
            sampling_start: 100,
            sampling_factor: 100,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("time_field", &self.time_field),
            ("message_field", &self.message_field),
            ("level_field", &self.level_field),
        ] {
            if value.is_empty() {
                return Err(LoggerError::config(name, "field name must not be empty"));
            }
        }

        self.time_format.validate()?;

        if self.enable_sampling {
            if self.sampling_factor == 0 {
                return Err(LoggerError::config(
                    "sampling",
                    "sampling_factor must be greater than zero",
                ));
            }
            if self.sampling_tick.is_zero() {
                return Err(LoggerError::config(
                    "sampling",
                    "sampling_tick must be greater than zero",
                ));
            }
        }

        Ok(())
    }

    /// Sampler settings derived from this configuration
    pub fn sampling(&self) -> SamplingConfig {
        SamplingConfig::new(self.sampling_tick, self.sampling_start, self.sampling_factor)
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, enable: bool) -> Self {
        self.enable_caller = enable;
        self
    }

    #[must_use]
    pub fn with_caller_skip(mut self, skip: usize) -> Self {
        self.caller_skip = skip;
        self
    }

    #[must_use]
    pub fn with_time(mut self, enable: bool) -> Self {
        self.enable_time = enable;
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self
    }

    #[must_use]
    pub fn with_field_names(
        mut self,
        time: impl Into<String>,
        level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.time_field = time.into();
        self.level_field = level.into();
        self.message_field = message.into();
        self
    }

    /// Enable sampling with the given settings
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.enable_sampling = true;
        self.sampling_tick = sampling.tick;
        self.sampling_start = sampling.start;
        self.sampling_factor = sampling.factor;
        self
    }

    #[must_use]
    pub fn without_sampling(mut self) -> Self {
        self.enable_sampling = false;
        self
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
