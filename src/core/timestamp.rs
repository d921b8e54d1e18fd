//! Timestamp encodings for the record time field
//!
//! Textual layouts are written as quoted strings, Unix variants as bare
//! integers, so numeric timestamps stay numbers in JSON output.

use super::encoder::Encoder;
use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::str::FromStr;

// Always UTC, so the zone is a literal `Z` rather than a local offset
const ISO8601_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Timestamp encoding options
///
/// # Examples
///
/// ```
/// use rust_structured_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now()).unwrap();
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// ISO 8601 UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in nanoseconds: `1736332245123456789`
    UnixNanos,

    /// Custom strftime layout, written as a string
    ///
    /// ```
    /// use rust_structured_logger::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Render `datetime` as it would appear in a record, without quotes.
    ///
    /// Fails only for a `Custom` layout that chrono cannot format.
    pub fn format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        let text = match self {
            TimestampFormat::Iso8601 => datetime.format(ISO8601_LAYOUT).to_string(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixNanos => unix_nanos(datetime).to_string(),
            TimestampFormat::Custom(layout) => {
                let mut text = String::new();
                write!(text, "{}", datetime.format(layout))
                    .map_err(|_| invalid_layout(layout))?;
                text
            }
        };
        Ok(text)
    }

    /// Reject `Custom` layouts containing specifiers chrono does not know
    pub fn validate(&self) -> Result<()> {
        match self {
            TimestampFormat::Custom(layout) => validate_layout(layout),
            _ => Ok(()),
        }
    }

    /// Append `datetime` as a value token. The caller has already written the key.
    pub fn append_to(&self, encoder: &mut Encoder, datetime: &DateTime<Utc>) {
        match self {
            TimestampFormat::Iso8601 => encoder.append_display(&datetime.format(ISO8601_LAYOUT)),
            TimestampFormat::Unix => encoder.append_i64(datetime.timestamp()),
            TimestampFormat::UnixMillis => encoder.append_i64(datetime.timestamp_millis()),
            TimestampFormat::UnixNanos => encoder.append_i64(unix_nanos(datetime)),
            TimestampFormat::Custom(layout) => encoder.append_display(&datetime.format(layout)),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixNanos
        )
    }
}

fn validate_layout(layout: &str) -> Result<()> {
    if layout.is_empty() {
        return Err(LoggerError::config("time_format", "empty layout"));
    }
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(invalid_layout(layout));
    }
    Ok(())
}

fn invalid_layout(layout: &str) -> LoggerError {
    LoggerError::config("time_format", format!("invalid strftime layout {:?}", layout))
}

/// Nanoseconds overflow i64 after 2262; saturate instead of failing
fn unix_nanos(datetime: &DateTime<Utc>) -> i64 {
    datetime
        .timestamp_nanos_opt()
        .unwrap_or_else(|| datetime.timestamp_millis().saturating_mul(1_000_000))
}

impl FromStr for TimestampFormat {
    type Err = LoggerError;

    /// `iso8601`, `unix`, `unix_milli(s)`, `unix_nano(s)`; anything else is
    /// taken as a strftime layout and checked.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "iso8601" => Ok(TimestampFormat::Iso8601),
            "unix" => Ok(TimestampFormat::Unix),
            "unix_milli" | "unix_millis" => Ok(TimestampFormat::UnixMillis),
            "unix_nano" | "unix_nanos" => Ok(TimestampFormat::UnixNanos),
            layout => {
                validate_layout(layout)?;
                Ok(TimestampFormat::Custom(layout.to_string()))
            }
        }
    }
}
