//! Log sampling for bursty, repetitive records
//!
//! Records are grouped by signature, the pair (level, message). Payload
//! fields are not part of the signature, so two records that differ only in
//! their fields share one rate limit.
//!
//! Within each tick the first `start` records of a signature pass, after
//! which only every `factor`-th record passes. For a burst of `M` identical
//! records inside one tick that is `M` records when `M <= start`, otherwise
//! `start + (M - start) / factor`.
//!
//! Buckets are created on first sight of a signature and reset lazily when a
//! lookup finds the tick has elapsed. Nothing is evicted in the background,
//! so memory grows with the number of distinct messages an application logs.
//!
//! # Example
//!
//! ```
//! use rust_structured_logger::{LogLevel, LogSampler, SamplingConfig};
//! use std::time::Duration;
//!
//! let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(60), 2, 10));
//!
//! let passed = (0..22)
//!     .filter(|_| sampler.should_sample(LogLevel::Error, "db timeout"))
//!     .count();
//! assert_eq!(passed, 4);
//! ```

use super::log_level::{LogLevel, LEVEL_COUNT};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Configuration for log sampling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Window during which a signature's occurrences are counted
    pub tick: Duration,

    /// Records per signature and tick that always pass
    pub start: u64,

    /// After `start`, keep one record out of every `factor`
    pub factor: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            start: 100,
            factor: 100,
        }
    }
}

impl SamplingConfig {
    pub fn new(tick: Duration, start: u64, factor: u64) -> Self {
        Self {
            tick,
            start,
            factor,
        }
    }

    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_factor(mut self, factor: u64) -> Self {
        self.factor = factor;
        self
    }
}

/// Metrics for sampling observability
///
/// ```
/// use rust_structured_logger::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.sampled_count(), 0);
/// assert_eq!(metrics.dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    /// Number of records that passed sampling
    sampled_count: AtomicU64,

    /// Number of records dropped by sampling
    dropped_count: AtomicU64,

    /// Total number of decisions taken
    total_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            total_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of records that passed, 1.0 before any decision
    pub fn effective_sample_rate(&self) -> f64 {
        let sampled = self.sampled_count() as f64;
        let total = self.total_count() as f64;

        if total == 0.0 {
            1.0
        } else {
            sampled / total
        }
    }

    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SamplerMetrics {
    fn clone(&self) -> Self {
        Self {
            sampled_count: AtomicU64::new(self.sampled_count()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_count: AtomicU64::new(self.total_count()),
        }
    }
}

/// Occurrence counter of one signature for the current tick
#[derive(Debug)]
struct Bucket {
    window_start: Instant,
    count: u64,
}

impl Bucket {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }
}

type BucketMap = HashMap<String, Mutex<Bucket>>;

/// Per-signature, time-bucketed sampler
///
/// # Thread Safety
///
/// Each level has its own map behind a read-write lock, and each bucket has
/// its own mutex. Lookups of known signatures only take the read lock, so
/// different signatures never serialize on each other; the bucket mutex makes
/// the count for one signature linearizable.
pub struct LogSampler {
    config: SamplingConfig,
    buckets: [RwLock<BucketMap>; LEVEL_COUNT],
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        Self {
            config,
            buckets: std::array::from_fn(|_| RwLock::new(HashMap::new())),
            metrics: SamplerMetrics::new(),
        }
    }

    /// Decide whether a record with this signature should be materialized
    #[inline]
    pub fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        self.should_sample_at(level, message, Instant::now())
    }

    /// Same as `should_sample`, with an explicit clock reading
    pub fn should_sample_at(&self, level: LogLevel, message: &str, now: Instant) -> bool {
        let sample = self.lookup(&self.buckets[level.index()], message, now);

        if sample {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }

        sample
    }

    fn lookup(&self, table: &RwLock<BucketMap>, message: &str, now: Instant) -> bool {
        if let Some(sample) = table.read().get(message).map(|bucket| self.count(bucket, now)) {
            return sample;
        }

        let mut write = table.write();
        // Another thread may have inserted it between the two locks
        let bucket = write
            .entry(message.to_owned())
            .or_insert_with(|| Mutex::new(Bucket::new(now)));
        self.count(bucket, now)
    }

    fn count(&self, bucket: &Mutex<Bucket>, now: Instant) -> bool {
        let mut bucket = bucket.lock();

        if now.saturating_duration_since(bucket.window_start) >= self.config.tick {
            bucket.window_start = now;
            bucket.count = 0;
        }

        bucket.count += 1;

        if bucket.count <= self.config.start {
            return true;
        }

        self.config.factor > 0 && (bucket.count - self.config.start) % self.config.factor == 0
    }

    /// Number of distinct signatures seen so far
    pub fn tracked_signatures(&self) -> usize {
        self.buckets.iter().map(|table| table.read().len()).sum()
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    /// Fraction of records that passed sampling
    pub fn effective_sample_rate(&self) -> f64 {
        self.metrics.effective_sample_rate()
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .field("signatures", &self.tracked_signatures())
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(start: u64, factor: u64) -> LogSampler {
        LogSampler::new(SamplingConfig::new(Duration::from_secs(3600), start, factor))
    }

    fn burst(sampler: &LogSampler, level: LogLevel, message: &str, n: usize, now: Instant) -> usize {
        (0..n)
            .filter(|_| sampler.should_sample_at(level, message, now))
            .count()
    }

    #[test]
    fn test_sampling_config_default() {
        let config = SamplingConfig::default();
        assert_eq!(config.tick, Duration::from_secs(1));
        assert_eq!(config.start, 100);
        assert_eq!(config.factor, 100);
    }

    #[test]
    fn test_sampling_config_builder() {
        let config = SamplingConfig::default()
            .with_tick(Duration::from_millis(250))
            .with_start(5)
            .with_factor(3);
        assert_eq!(config, SamplingConfig::new(Duration::from_millis(250), 5, 3));
    }

    #[test]
    fn test_start_then_every_factor() {
        let sampler = sampler(2, 10);
        let now = Instant::now();

        assert_eq!(burst(&sampler, LogLevel::Error, "m", 22, now), 4);
    }

    #[test]
    fn test_decision_sequence() {
        let sampler = sampler(3, 2);
        let now = Instant::now();

        let decisions: Vec<bool> = (0..8)
            .map(|_| sampler.should_sample_at(LogLevel::Info, "m", now))
            .collect();
        assert_eq!(
            decisions,
            vec![true, true, true, false, true, false, true, false]
        );
    }

    #[test]
    fn test_burst_below_start_passes_entirely() {
        let sampler = sampler(100, 100);
        assert_eq!(burst(&sampler, LogLevel::Warn, "m", 100, Instant::now()), 100);
    }

    #[test]
    fn test_window_resets_after_tick() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(1), 1, 1000));
        let start = Instant::now();

        assert_eq!(burst(&sampler, LogLevel::Info, "m", 10, start), 1);

        let later = start + Duration::from_secs(1);
        assert_eq!(burst(&sampler, LogLevel::Info, "m", 10, later), 1);
        assert_eq!(sampler.tracked_signatures(), 1);
    }

    #[test]
    fn test_signature_includes_level() {
        let sampler = sampler(1, 1000);
        let now = Instant::now();

        assert!(sampler.should_sample_at(LogLevel::Info, "m", now));
        assert!(sampler.should_sample_at(LogLevel::Error, "m", now));
        assert!(!sampler.should_sample_at(LogLevel::Info, "m", now));
        assert!(sampler.should_sample_at(LogLevel::Info, "other", now));
        assert_eq!(sampler.tracked_signatures(), 3);
    }

    #[test]
    fn test_zero_factor_drops_everything_after_start() {
        let sampler = sampler(2, 0);
        assert_eq!(burst(&sampler, LogLevel::Info, "m", 50, Instant::now()), 2);
    }

    #[test]
    fn test_sampler_metrics() {
        let sampler = sampler(2, 10);
        burst(&sampler, LogLevel::Error, "m", 22, Instant::now());

        let metrics = sampler.metrics();
        assert_eq!(metrics.total_count(), 22);
        assert_eq!(metrics.sampled_count(), 4);
        assert_eq!(metrics.dropped_count(), 18);
        assert!((sampler.effective_sample_rate() - 4.0 / 22.0).abs() < 1e-9);

        let snapshot = metrics.clone();
        metrics.reset();
        assert_eq!(metrics.total_count(), 0);
        assert_eq!(snapshot.total_count(), 22);
    }

    #[test]
    fn test_concurrent_same_signature_exact_count() {
        use std::sync::Arc;
        use std::thread;

        let sampler = Arc::new(sampler(10, 7));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sampler = Arc::clone(&sampler);
                thread::spawn(move || burst(&sampler, LogLevel::Error, "hot", 1000, now))
            })
            .collect();

        let passed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(passed, 10 + (8000 - 10) / 7);
    }

    #[test]
    fn test_sampler_debug() {
        let sampler = sampler(1, 1);
        let debug_str = format!("{:?}", sampler);
        assert!(debug_str.contains("LogSampler"));
        assert!(debug_str.contains("config"));
    }
}
