//! Nested scopes of a record
//!
//! `Object` and `Array` borrow the encoder of the record being built and
//! only bracket a nested scope; every write lands in the same buffer.

use super::encoder::Encoder;
use super::output_format::OutputFormat;
use std::error::Error;
use std::fmt;

/// Key/value scope: the fields of a nested object, or the root fields handed
/// to context callbacks.
///
/// In text output objects have no syntax of their own, so nested fields are
/// written flat at the level of their parent.
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .config(Config::default().with_level(LogLevel::Debug))
///     .build()
///     .unwrap();
///
/// logger
///     .info("request")
///     .object("user", |o| {
///         o.string("name", "alice").uint64("id", 42);
///     })
///     .write();
/// ```
pub struct Object<'a> {
    enc: &'a mut Encoder,
}

impl<'a> Object<'a> {
    pub(crate) fn new(enc: &'a mut Encoder) -> Self {
        Self { enc }
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.enc.add_key(key);
        self.enc.append_bool(value);
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

    pub fn int64(self, key: &str, value: i64) -> Self {
        self.enc.add_key(key);
        self.enc.append_i64(value);
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

    pub fn uint64(self, key: &str, value: u64) -> Self {
        self.enc.add_key(key);
        self.enc.append_u64(value);
        self
    }

    pub fn float32(self, key: &str, value: f32) -> Self {
        self.float64(key, f64::from(value))
    }

    pub fn float64(self, key: &str, value: f64) -> Self {
        self.enc.add_key(key);
        self.enc.append_f64(value);
        self
    }

    pub fn string(self, key: &str, value: &str) -> Self {
        self.enc.add_key(key);
        self.enc.append_str(value);
        self
    }

    /// Any `Display` value, written as a string
    pub fn display(self, key: &str, value: &dyn fmt::Display) -> Self {
        self.enc.add_key(key);
        self.enc.append_display(value);
        self
    }

    pub fn null(self, key: &str) -> Self {
        self.enc.add_key(key);
        self.enc.append_null();
        self
    }

    /// The error's message as a string, or `null` for `None`
    pub fn error(self, key: &str, err: Option<&dyn Error>) -> Self {
        match err {
            Some(err) => self.display(key, &err),
            None => self.null(key),
        }
    }

    /// Write a nested object under `key`, filled in by `f`
    pub fn object<F>(self, key: &str, f: F) -> Self
    where
        F: FnOnce(Object<'_>),
    {
        match self.enc.format() {
            OutputFormat::Json => {
                self.enc.add_key(key);
                self.enc.open_object();
                f(Object::new(self.enc));
                self.enc.close_object();
            }
            OutputFormat::Text => f(Object::new(self.enc)),
        }
        self
    }

    /// Write an array under `key`, filled in by `f`
    pub fn array<F>(self, key: &str, f: F) -> Self
    where
        F: FnOnce(Array<'_>),
    {
        self.enc.add_key(key);
        self.enc.open_array();
        f(Array::new(self.enc));
        self.enc.close_array();
        self
    }
}

/// Element scope of an array
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder().build().unwrap();
///
/// logger
///     .info("points")
///     .array("values", |a| {
///         a.append_float64(3.14).append_string("pi").append_null();
///     })
///     .write();
/// ```
pub struct Array<'a> {
    enc: &'a mut Encoder,
}

impl<'a> Array<'a> {
    pub(crate) fn new(enc: &'a mut Encoder) -> Self {
        Self { enc }
    }

    pub fn append_bool(self, value: bool) -> Self {
        self.enc.append_bool(value);
        self
    }

    pub fn append_int(self, value: isize) -> Self {
        self.append_int64(value as i64)
    }

    pub fn append_int8(self, value: i8) -> Self {
        self.append_int64(i64::from(value))
    }

    pub fn append_int16(self, value: i16) -> Self {
        self.append_int64(i64::from(value))
    }

    pub fn append_int32(self, value: i32) -> Self {
        self.append_int64(i64::from(value))
    }

    pub fn append_int64(self, value: i64) -> Self {
        self.enc.append_i64(value);
        self
    }

    pub fn append_uint(self, value: usize) -> Self {
        self.append_uint64(value as u64)
    }

    pub fn append_uint8(self, value: u8) -> Self {
        self.append_uint64(u64::from(value))
    }

    pub fn append_uint16(self, value: u16) -> Self {
        self.append_uint64(u64::from(value))
    }

    pub fn append_uint32(self, value: u32) -> Self {
        self.append_uint64(u64::from(value))
    }

    pub fn append_uint64(self, value: u64) -> Self {
        self.enc.append_u64(value);
        self
    }

    pub fn append_float32(self, value: f32) -> Self {
        self.append_float64(f64::from(value))
    }

    pub fn append_float64(self, value: f64) -> Self {
        self.enc.append_f64(value);
        self
    }

    pub fn append_string(self, value: &str) -> Self {
        self.enc.append_str(value);
        self
    }

    pub fn append_display(self, value: &dyn fmt::Display) -> Self {
        self.enc.append_display(value);
        self
    }

    pub fn append_null(self) -> Self {
        self.enc.append_null();
        self
    }

    pub fn append_error(self, err: Option<&dyn Error>) -> Self {
        match err {
            Some(err) => self.append_display(&err),
            None => self.append_null(),
        }
    }

    /// Append an object element, filled in by `f`
    pub fn append_object<F>(self, f: F) -> Self
    where
        F: FnOnce(Object<'_>),
    {
        match self.enc.format() {
            OutputFormat::Json => {
                self.enc.open_object_element();
                f(Object::new(self.enc));
                self.enc.close_object();
            }
            OutputFormat::Text => f(Object::new(self.enc)),
        }
        self
    }

    /// Append a nested array element, filled in by `f`
    pub fn append_array<F>(self, f: F) -> Self
    where
        F: FnOnce(Array<'_>),
    {
        self.enc.open_array();
        f(Array::new(self.enc));
        self.enc.close_array();
        self
    }
}
