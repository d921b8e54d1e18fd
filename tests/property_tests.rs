//! Property-based tests for rust_structured_logger using proptest

use proptest::prelude::*;
use rust_structured_logger::prelude::*;
use std::time::{Duration, Instant};

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

/// Strings biased towards the bytes that need escaping
fn tricky_string() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just('"'),
            Just('\\'),
            Just('\n'),
            Just('\r'),
            Just('\t'),
            Just('\u{8}'),
            Just('\u{c}'),
            Just('\u{0}'),
            Just('\u{1f}'),
            Just('é'),
            Just('€'),
            any::<char>(),
        ],
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

fn encode_record(fields: &[(String, String)]) -> Vec<u8> {
    let mut enc = Encoder::new(OutputFormat::Json);
    for (key, value) in fields {
        enc.add_key(key);
        enc.append_str(value);
    }
    enc.close_object();
    enc.as_bytes().to_vec()
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let upper: LogLevel = level.to_str().to_uppercase().parse().unwrap();
        prop_assert_eq!(level, upper);
    }

    /// Test that LogLevel ordering follows severity values
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;

        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }

    /// Unknown names never silently default
    #[test]
    fn test_unknown_level_is_rejected(name in "[a-z]{1,10}") {
        prop_assume!(!["debug", "info", "warn", "error", "fatal"].contains(&name.as_str()));
        prop_assert!(name.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Encoder Tests
// ============================================================================

proptest! {
    /// Escaped strings decode back to the original
    #[test]
    fn test_escaping_roundtrip(value in tricky_string()) {
        let mut enc = Encoder::new(OutputFormat::Json);
        enc.write_string(&value);

        let decoded: String = serde_json::from_slice(enc.as_bytes()).unwrap();
        prop_assert_eq!(decoded, value);
    }

    /// Escaped output never contains raw control bytes
    #[test]
    fn test_escaping_removes_control_bytes(value in tricky_string()) {
        let mut enc = Encoder::new(OutputFormat::Text);
        enc.write_string(&value);

        prop_assert!(enc.as_bytes().iter().all(|&b| b >= 0x20));
    }

    /// N fields give a valid object with exactly N-1 separators at top level
    #[test]
    fn test_separator_invariant(
        fields in prop::collection::vec(("[a-z]{1,8}", "[a-z ]{0,8}"), 1..20)
    ) {
        let bytes = encode_record(&fields);
        let text = std::str::from_utf8(&bytes).unwrap();

        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        prop_assert!(value.is_object());

        // Keys and values are comma-free, so every comma is a separator
        let commas = text.matches(',').count();
        prop_assert_eq!(commas, fields.len() - 1);
        let no_leading_comma = !text.contains("{,");
        prop_assert!(no_leading_comma);
        prop_assert!(!text.contains(":,"));
        prop_assert!(!text.contains(",,"));
    }

    /// Arbitrary keys and values always produce parseable JSON
    #[test]
    fn test_record_is_valid_json(
        fields in prop::collection::vec((tricky_string(), tricky_string()), 1..10)
    ) {
        let bytes = encode_record(&fields);
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        // Duplicate keys keep the last value
        let (key, last) = fields.last().unwrap();
        prop_assert_eq!(value[key.as_str()].as_str().unwrap(), last.as_str());
    }

    /// Finite floats roundtrip exactly through their decimal form
    #[test]
    fn test_float_roundtrip(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let mut enc = Encoder::new(OutputFormat::Json);
        enc.append_f64(value);

        let text = std::str::from_utf8(enc.as_bytes()).unwrap();
        prop_assert_eq!(text[1..].parse::<f64>().unwrap(), value);
    }

    /// A reset encoder is empty but keeps its allocation
    #[test]
    fn test_reset_keeps_capacity(values in prop::collection::vec(any::<i64>(), 1..50)) {
        let mut enc = Encoder::new(OutputFormat::Json);
        for v in &values {
            enc.add_key("k");
            enc.append_i64(*v);
        }
        let capacity = enc.capacity();

        enc.reset();
        prop_assert!(enc.is_empty());
        prop_assert_eq!(enc.capacity(), capacity);
    }
}

// ============================================================================
// Sampler Tests
// ============================================================================

proptest! {
    /// Accepted count within one tick is M, or S + floor((M - S) / F)
    #[test]
    fn test_sampling_bound(start in 0u64..20, factor in 1u64..20, submitted in 0u64..200) {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(3600), start, factor));
        let now = Instant::now();

        let accepted = (0..submitted)
            .filter(|_| sampler.should_sample_at(LogLevel::Info, "burst", now))
            .count() as u64;

        let expected = if submitted <= start {
            submitted
        } else {
            start + (submitted - start) / factor
        };
        prop_assert_eq!(accepted, expected);
    }

    /// Signatures differing in level or message are limited independently
    #[test]
    fn test_sampling_signatures_are_independent(
        level in any_level(),
        message in "[a-z]{1,12}",
        burst in 1u64..50,
    ) {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(3600), 1, 1000));
        let now = Instant::now();

        for _ in 0..burst {
            sampler.should_sample_at(level, &message, now);
        }

        let sampled = sampler.should_sample_at(level, &format!("{}!", message), now);
        prop_assert!(sampled);
        let other = if level == LogLevel::Debug { LogLevel::Info } else { LogLevel::Debug };
        prop_assert!(sampler.should_sample_at(other, &message, now));
    }
}

// ============================================================================
// Logger Tests
// ============================================================================

proptest! {
    /// Records below the gate level never reach the pool
    #[test]
    fn test_gating_never_acquires(gate in any_level(), level in any_level()) {
        let logger = Logger::builder()
            .config(Config::default().with_level(gate).with_caller(false).without_sampling())
            .build()
            .unwrap();

        let active = logger.log(level, "gated").is_active();
        let acquired = logger.pool().metrics().hits() + logger.pool().metrics().misses();

        prop_assert_eq!(active, level >= gate);
        prop_assert_eq!(acquired, u64::from(level >= gate));
    }
}
