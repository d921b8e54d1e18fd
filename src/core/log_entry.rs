//! Log entry handle and finalized record view
//!
//! An `Entry` is either active, owning a pooled encoder that the fields are
//! written into, or inert, when the record was gated by level or dropped by
//! the sampler. Every setter is valid on both; on an inert entry it does
//! nothing, so the fluent chain never has to branch.

use super::encoder::Encoder;
use super::log_level::LogLevel;
use super::logger::Logger;
use super::object::{Array, Object};
use super::output_format::OutputFormat;
use std::error::Error;
use std::fmt;

enum EntryState<'l> {
    Inert,
    Active {
        logger: &'l Logger,
        encoder: Encoder,
    },
}

/// A record under construction
///
/// Created by `Logger::debug`, `Logger::info`, ... and finalized with
/// `write()`. Dropping an entry without calling `write()` discards it and
/// returns its buffer to the pool.
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder().build().unwrap();
///
/// logger
///     .warn("slow request")
///     .string("path", "/api/users")
///     .uint64("latency_ms", 1250)
///     .write();
/// ```
#[must_use = "an entry does nothing until `write()` is called"]
pub struct Entry<'l> {
    level: LogLevel,
    state: EntryState<'l>,
}

impl<'l> Entry<'l> {
    pub(crate) fn inert(level: LogLevel) -> Self {
        Self {
            level,
            state: EntryState::Inert,
        }
    }

    pub(crate) fn active(logger: &'l Logger, level: LogLevel, encoder: Encoder) -> Self {
        Self {
            level,
            state: EntryState::Active { logger, encoder },
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// `false` when the record was gated or sampled out
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, EntryState::Active { .. })
    }

    #[inline]
    fn fields(&mut self) -> Option<Object<'_>> {
        match &mut self.state {
            EntryState::Active { encoder, .. } => Some(Object::new(encoder)),
            EntryState::Inert => None,
        }
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        if let Some(fields) = self.fields() {
            fields.bool(key, value);
        }
        self
    }

    pub fn int(self, key: &str, value: isize) -> Self {
        self.int64(key, value as i64)
    }

    pub fn int8(self, key: &str, value: i8) -> Self {
        self.int64(key, i64::from(value))
    }

    pub fn int16(self, key: &str, value: i16) -> Self {
        self.int64(key, i64::from(value))
    }

    pub fn int32(self, key: &str, value: i32) -> Self {
        self.int64(key, i64::from(value))
    }

    pub fn int64(mut self, key: &str, value: i64) -> Self {
        if let Some(fields) = self.fields() {
            fields.int64(key, value);
        }
        self
    }

    pub fn uint(self, key: &str, value: usize) -> Self {
        self.uint64(key, value as u64)
    }

    pub fn uint8(self, key: &str, value: u8) -> Self {
        self.uint64(key, u64::from(value))
    }

    pub fn uint16(self, key: &str, value: u16) -> Self {
        self.uint64(key, u64::from(value))
    }

    pub fn uint32(self, key: &str, value: u32) -> Self {
        self.uint64(key, u64::from(value))
    }

    pub fn uint64(mut self, key: &str, value: u64) -> Self {
        if let Some(fields) = self.fields() {
            fields.uint64(key, value);
        }
        self
    }

    pub fn float32(self, key: &str, value: f32) -> Self {
        self.float64(key, f64::from(value))
    }

    pub fn float64(mut self, key: &str, value: f64) -> Self {
        if let Some(fields) = self.fields() {
            fields.float64(key, value);
        }
        self
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        if let Some(fields) = self.fields() {
            fields.string(key, value);
        }
        self
    }

    /// Any `Display` value as a string. Formatting only runs on active entries.
    pub fn display(mut self, key: &str, value: &dyn fmt::Display) -> Self {
        if let Some(fields) = self.fields() {
            fields.display(key, value);
        }
        self
    }

    pub fn null(mut self, key: &str) -> Self {
        if let Some(fields) = self.fields() {
            fields.null(key);
        }
        self
    }

    /// The error's message as a string field, `null` when `err` is `None`
    pub fn error(mut self, key: &str, err: Option<&dyn Error>) -> Self {
        if let Some(fields) = self.fields() {
            fields.error(key, err);
        }
        self
    }

    /// Nested object under `key`. `f` is not called on inert entries.
    pub fn object<F>(mut self, key: &str, f: F) -> Self
    where
        F: FnOnce(Object<'_>),
    {
        if let Some(fields) = self.fields() {
            fields.object(key, f);
        }
        self
    }

    /// Array under `key`. `f` is not called on inert entries.
    pub fn array<F>(mut self, key: &str, f: F) -> Self
    where
        F: FnOnce(Array<'_>),
    {
        if let Some(fields) = self.fields() {
            fields.array(key, f);
        }
        self
    }

    /// Finalize the record and hand it to the logger.
    ///
    /// At `Fatal` level this terminates the process once hooks have run.
    pub fn write(mut self) {
        if let EntryState::Active {
            logger,
            mut encoder,
        } = std::mem::replace(&mut self.state, EntryState::Inert)
        {
            if encoder.format() == OutputFormat::Json {
                encoder.close_object();
            }
            logger.emit(self.level, encoder);
        }
    }
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        if let EntryState::Active { logger, encoder } =
            std::mem::replace(&mut self.state, EntryState::Inert)
        {
            logger.discard(encoder);
        }
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("level", &self.level)
            .field("active", &self.is_active())
            .finish()
    }
}

/// A finalized record, as seen by hooks
///
/// The bytes are the encoded record without the trailing newline written to
/// the sink. They borrow the pooled buffer and are only valid during the
/// hook call.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    level: LogLevel,
    format: OutputFormat,
    bytes: &'a [u8],
}

impl<'a> Record<'a> {
    pub(crate) fn new(level: LogLevel, format: OutputFormat, bytes: &'a [u8]) -> Self {
        Self {
            level,
            format,
            bytes,
        }
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    #[inline]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The record as text, if the logged strings were valid UTF-8
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inert_entry_absorbs_everything() {
        let mut called = false;

        let entry = Entry::inert(LogLevel::Debug)
            .bool("b", true)
            .int("i", 1)
            .uint8("u", 2)
            .float32("f", 1.5)
            .string("s", "v")
            .null("n")
            .error("e", None)
            .object("o", |_| called = true)
            .array("a", |_| called = true);

        assert!(!entry.is_active());
        assert_eq!(entry.level(), LogLevel::Debug);
        entry.write();
        assert!(!called);
    }

    #[test]
    fn test_record_accessors() {
        let record = Record::new(LogLevel::Warn, OutputFormat::Json, br#"{"level":"warn"}"#);
        assert_eq!(record.level(), LogLevel::Warn);
        assert_eq!(record.format(), OutputFormat::Json);
        assert_eq!(record.as_str(), Some(r#"{"level":"warn"}"#));

        let invalid = Record::new(LogLevel::Info, OutputFormat::Text, &[0xff, 0xfe]);
        assert_eq!(invalid.as_str(), None);
    }
}
