//! Incremental byte encoder for structured records
//!
//! The encoder appends one token at a time to a reusable buffer and decides,
//! from the last byte written, whether a separator is due before the next
//! token. The buffer is always a prefix of a valid record; closing the root
//! object (JSON) or simply stopping (text) completes it.

use super::output_format::OutputFormat;
use std::fmt::{self, Write as _};
use std::io::Write as _;

const HEX: &[u8; 16] = b"0123456789abcdef";
const NULL: &[u8] = b"null";

/// Initial buffer capacity of encoders created by the pool
pub const DEFAULT_ENCODER_CAPACITY: usize = 512;

/// Growable byte buffer with a separator state machine
#[derive(Debug, Clone)]
pub struct Encoder {
    format: OutputFormat,
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_capacity(format, DEFAULT_ENCODER_CAPACITY)
    }

    pub fn with_capacity(format: OutputFormat, capacity: usize) -> Self {
        Self {
            format,
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Switch the output format. Only meaningful on an empty encoder.
    #[inline]
    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Truncate to zero length, keeping the allocation
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Emit the separator owed before the next token.
    ///
    /// JSON: an empty buffer opens the root object; after `{`, `[` or `:`
    /// nothing is emitted, otherwise `,`.
    /// Text: after `=`, `[` or `{` nothing is emitted, otherwise a space.
    fn check_separator(&mut self) {
        match (self.format, self.buf.last()) {
            (OutputFormat::Json, None) => self.buf.push(b'{'),
            (OutputFormat::Json, Some(b'{' | b'[' | b':')) => {}
            (OutputFormat::Json, Some(_)) => self.buf.push(b','),
            (OutputFormat::Text, None | Some(b'=' | b'[' | b'{')) => {}
            (OutputFormat::Text, Some(_)) => self.buf.push(b' '),
        }
    }

    pub fn open_object(&mut self) {
        self.buf.push(b'{');
    }

    /// Open an object in value position, e.g. as an array element
    pub fn open_object_element(&mut self) {
        self.check_separator();
        self.buf.push(b'{');
    }

    pub fn close_object(&mut self) {
        self.buf.push(b'}');
    }

    pub fn open_array(&mut self) {
        self.check_separator();
        self.buf.push(b'[');
    }

    pub fn close_array(&mut self) {
        self.buf.push(b']');
    }

    /// Write `"key":` (JSON) or `key=` (text)
    pub fn add_key(&mut self, key: &str) {
        self.check_separator();

        match self.format {
            OutputFormat::Json => {
                self.buf.push(b'"');
                escape_into(&mut self.buf, key.as_bytes());
                self.buf.extend_from_slice(b"\":");
            }
            OutputFormat::Text => {
                self.buf.extend_from_slice(key.as_bytes());
                self.buf.push(b'=');
            }
        }
    }

    pub fn append_bool(&mut self, value: bool) {
        self.check_separator();
        let token: &[u8] = if value { b"true" } else { b"false" };
        self.buf.extend_from_slice(token);
    }

    pub fn append_i64(&mut self, value: i64) {
        self.check_separator();
        self.push_number(value);
    }

    pub fn append_u64(&mut self, value: u64) {
        self.check_separator();
        self.push_number(value);
    }

    /// Shortest round-trip decimal, never exponent notation.
    ///
    /// Non-finite values have no JSON number form and are written as the
    /// strings `"NaN"`, `"+Inf"` and `"-Inf"`.
    pub fn append_f64(&mut self, value: f64) {
        if value.is_nan() {
            return self.append_str("NaN");
        }
        if value.is_infinite() {
            return self.append_str(if value > 0.0 { "+Inf" } else { "-Inf" });
        }

        self.check_separator();
        self.push_number(value);
    }

    pub fn append_str(&mut self, value: &str) {
        self.check_separator();
        self.write_string(value);
    }

    /// Quote and escape anything `Display`, without an intermediate `String`.
    ///
    /// A `Display` impl that returns an error leaves `null` in place of the
    /// value, so the partial output never reaches the record.
    pub fn append_display(&mut self, value: &dyn fmt::Display) {
        self.check_separator();
        let mark = self.buf.len();
        self.buf.push(b'"');
        match write!(EscapeWriter(&mut self.buf), "{}", value) {
            Ok(()) => self.buf.push(b'"'),
            Err(fmt::Error) => {
                self.buf.truncate(mark);
                self.buf.extend_from_slice(NULL);
            }
        }
    }

    /// Pass-through for pre-encoded tokens
    pub fn append_raw(&mut self, value: &[u8]) {
        self.check_separator();
        self.buf.extend_from_slice(value);
    }

    pub fn append_null(&mut self) {
        self.append_raw(NULL);
    }

    /// Write a number token in its `Display` form.
    ///
    /// Only for std numeric types, whose `Display` never fails, and
    /// `io::Write` for `Vec<u8>` never errors, so there is no result to report.
    #[inline]
    fn push_number(&mut self, value: impl fmt::Display) {
        let _ = write!(self.buf, "{}", value);
    }

    /// Append a literal byte with no separator check, e.g. the line terminator
    #[inline]
    pub(crate) fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Write `value` as a quoted, escaped string token.
    ///
    /// Quotes are used in both formats. Only ASCII control bytes, `"` and `\`
    /// are inspected; everything else is copied through untouched.
    pub fn write_string(&mut self, value: &str) {
        self.buf.push(b'"');
        escape_into(&mut self.buf, value.as_bytes());
        self.buf.push(b'"');
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

fn escape_into(buf: &mut Vec<u8>, bytes: &[u8]) {
    let mut start = 0;

    for (i, &c) in bytes.iter().enumerate() {
        if c >= 0x20 && c != b'"' && c != b'\\' {
            continue;
        }

        buf.extend_from_slice(&bytes[start..i]);
        start = i + 1;

        match c {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            0x0c => buf.extend_from_slice(b"\\f"),
            0x08 => buf.extend_from_slice(b"\\b"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            _ => buf.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[(c >> 4) as usize],
                HEX[(c & 0x0f) as usize],
            ]),
        }
    }

    buf.extend_from_slice(&bytes[start..]);
}

/// `fmt::Write` adapter escaping everything written through it
struct EscapeWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for EscapeWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        escape_into(self.0, s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json() -> Encoder {
        Encoder::new(OutputFormat::Json)
    }

    fn text() -> Encoder {
        Encoder::new(OutputFormat::Text)
    }

    fn as_str(enc: &Encoder) -> &str {
        std::str::from_utf8(enc.as_bytes()).unwrap()
    }

    #[test]
    fn test_json_first_token_opens_object() {
        let mut enc = json();
        enc.add_key("a");
        enc.append_i64(1);
        enc.add_key("b");
        enc.append_bool(true);
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"a":1,"b":true}"#);
    }

    #[test]
    fn test_text_separators() {
        let mut enc = text();
        enc.add_key("a");
        enc.append_i64(-3);
        enc.add_key("b");
        enc.append_str("x y");
        assert_eq!(as_str(&enc), r#"a=-3 b="x y""#);
    }

    #[test]
    fn test_array_separators() {
        let mut enc = json();
        enc.add_key("arr");
        enc.open_array();
        enc.append_str("a");
        enc.append_u64(7);
        enc.append_null();
        enc.close_array();
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"arr":["a",7,null]}"#);

        let mut enc = text();
        enc.add_key("arr");
        enc.open_array();
        enc.append_u64(1);
        enc.append_u64(2);
        enc.close_array();
        assert_eq!(as_str(&enc), "arr=[1 2]");
    }

    #[test]
    fn test_escape_specials() {
        let mut enc = json();
        enc.write_string("q\"b\\n\nf\x0cb\x08r\rt\t");
        assert_eq!(as_str(&enc), r#""q\"b\\n\nf\fb\br\rt\t""#);
    }

    #[test]
    fn test_escape_other_controls_lowercase_hex() {
        let mut enc = json();
        enc.write_string("\x00\x1f\x1b");
        assert_eq!(as_str(&enc), r#""\u0000\u001f\u001b""#);
    }

    #[test]
    fn test_utf8_passthrough() {
        let mut enc = json();
        enc.write_string("héllo ✓ 日本");
        assert_eq!(as_str(&enc), "\"héllo ✓ 日本\"");
    }

    #[test]
    fn test_float_formatting() {
        let mut enc = text();
        enc.append_f64(722727272.0099);
        enc.append_f64(1.0);
        enc.append_f64(-0.5);
        enc.append_f64(1.618033988749895);
        assert_eq!(as_str(&enc), "722727272.0099 1 -0.5 1.618033988749895");
    }

    #[test]
    fn test_float_non_finite_quoted() {
        let mut enc = json();
        enc.add_key("a");
        enc.append_f64(f64::NAN);
        enc.add_key("b");
        enc.append_f64(f64::INFINITY);
        enc.add_key("c");
        enc.append_f64(f64::NEG_INFINITY);
        enc.close_object();
        let parsed: serde_json::Value = serde_json::from_slice(enc.as_bytes()).unwrap();
        assert_eq!(parsed["a"], "NaN");
        assert_eq!(parsed["b"], "+Inf");
        assert_eq!(parsed["c"], "-Inf");
    }

    #[test]
    fn test_integer_extremes() {
        let mut enc = text();
        enc.append_i64(i64::MIN);
        enc.append_u64(u64::MAX);
        assert_eq!(as_str(&enc), "-9223372036854775808 18446744073709551615");
    }

    #[test]
    fn test_append_display_escapes() {
        let mut enc = json();
        enc.add_key("e");
        enc.append_display(&"line1\nline2 \"quoted\"");
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"e":"line1\nline2 \"quoted\""}"#);
    }

    #[test]
    fn test_append_display_failure_writes_null() {
        struct Failing;

        impl fmt::Display for Failing {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("half written")?;
                Err(fmt::Error)
            }
        }

        let mut enc = json();
        enc.add_key("bad");
        enc.append_display(&Failing);
        enc.add_key("next");
        enc.append_i64(1);
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"bad":null,"next":1}"#);

        let mut enc = text();
        enc.add_key("bad");
        enc.append_display(&Failing);
        assert_eq!(as_str(&enc), "bad=null");
    }

    #[test]
    fn test_json_key_is_escaped() {
        let mut enc = json();
        enc.add_key("we\"ird");
        enc.append_null();
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"we\"ird":null}"#);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut enc = json();
        for i in 0..200 {
            enc.add_key("k");
            enc.append_i64(i);
        }
        let capacity = enc.capacity();
        assert!(capacity >= DEFAULT_ENCODER_CAPACITY);

        enc.reset();
        assert!(enc.is_empty());
        assert_eq!(enc.capacity(), capacity);

        enc.add_key("fresh");
        enc.append_bool(false);
        enc.close_object();
        assert_eq!(as_str(&enc), r#"{"fresh":false}"#);
    }
}
