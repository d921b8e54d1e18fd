//! Main logger implementation
//!
//! A record moves through these states:
//!
//! - gated: level below the threshold, an inert `Entry` is returned and no
//!   encoder is touched
//! - sampled out: the sampler rejected the (level, message) signature, same
//!   inert `Entry`
//! - active: an encoder was checked out of the pool and the standard fields
//!   were written
//! - finalized: `Entry::write` handed the encoder back here; it is written to
//!   the sink, hooks run, and the encoder goes back to the pool
//! - terminated: a finalized `Fatal` record exits the process

use super::{
    caller::{CallSite, CallerResolver, LocationResolver, UNKNOWN_CALLER},
    config::Config,
    encoder::{Encoder, DEFAULT_ENCODER_CAPACITY},
    error::Result,
    hooks::{Hook, With},
    log_entry::{Entry, Record},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    object::Object,
    output_format::OutputFormat,
    pool::{EncoderPool, DEFAULT_POOL_SIZE},
    sampling::LogSampler,
};
use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Name of the call-site field
pub const CALLER_FIELD: &str = "caller";

/// State shared by a logger and every logger derived from it
struct Shared {
    level: AtomicU8,
    format: AtomicU8,
    config: Config,
    sink: Mutex<Box<dyn Write + Send>>,
    pool: EncoderPool,
    sampler: Option<LogSampler>,
    resolver: Box<dyn CallerResolver>,
    metrics: LoggerMetrics,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Err(e) = self.sink.get_mut().flush() {
            eprintln!("[LOGGER ERROR] Failed to flush sink during shutdown: {}", e);
        }
    }
}

/// Structured logger
///
/// Cloning is cheap and clones share everything. `with` and `hook` derive a
/// logger with an extended callback list; the parent is left untouched.
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .config(Config::default().with_caller(false))
///     .sink(std::io::sink())
///     .build()
///     .unwrap();
///
/// let request_logger = logger.with(|fields| {
///     fields.string("request_id", "7f3a").string("service", "billing");
/// });
///
/// request_logger.info("charge accepted").uint64("amount_cents", 4200).write();
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    with: Arc<[Arc<dyn With>]>,
    hooks: Arc<[Arc<dyn Hook>]>,
}

impl Logger {
    /// Create a logger writing to `sink`
    pub fn new<W>(config: Config, sink: W) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        Self::builder().config(config).sink(sink).build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Start a record at `level`
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) -> Entry<'_> {
        if level < self.level() {
            return Entry::inert(level);
        }

        if let Some(sampler) = &self.shared.sampler {
            if !sampler.should_sample(level, message) {
                return Entry::inert(level);
            }
        }

        let mut encoder = self.shared.pool.get(self.format());
        self.init(&mut encoder, level, message, Location::caller());
        Entry::active(self, level, encoder)
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: &str) -> Entry<'_> {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: &str) -> Entry<'_> {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: &str) -> Entry<'_> {
        self.log(LogLevel::Warn, message)
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: &str) -> Entry<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Start a `Fatal` record. Writing it exits the process with status 1.
    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: &str) -> Entry<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Standard fields in order: level, time, caller, context, message
    fn init(
        &self,
        enc: &mut Encoder,
        level: LogLevel,
        message: &str,
        location: &'static Location<'static>,
    ) {
        let config = &self.shared.config;

        enc.add_key(&config.level_field);
        match enc.format() {
            OutputFormat::Json => enc.append_str(level.to_str()),
            OutputFormat::Text => enc.append_raw(level.to_str().as_bytes()),
        }

        if config.enable_time {
            enc.add_key(&config.time_field);
            config.time_format.append_to(enc, &Utc::now());
        }

        if config.enable_caller {
            let site = CallSite::new(location, config.caller_skip);
            enc.add_key(CALLER_FIELD);
            match self.shared.resolver.resolve(&site) {
                Some(caller) => enc.append_str(&caller),
                None => enc.append_str(UNKNOWN_CALLER),
            }
        }

        for with in self.with.iter() {
            with.apply(Object::new(enc));
        }

        enc.add_key(&config.message_field);
        enc.append_str(message);
    }

    /// Write a finalized record to the sink and run hooks
    pub(crate) fn emit(&self, level: LogLevel, mut encoder: Encoder) {
        let shared = &*self.shared;

        encoder.push_byte(b'\n');
        let result = shared.sink.lock().write_all(encoder.as_bytes());

        match result {
            Ok(()) => {
                shared.metrics.record_written();
            }
            Err(e) => {
                let failed = shared.metrics.record_write_error();

                // First failure and every 1000th after that
                if failed == 0 || (failed + 1) % 1000 == 0 {
                    eprintln!(
                        "[LOGGER ERROR] Failed to write record ({} failures so far): {}",
                        failed + 1,
                        e
                    );
                }
            }
        }

        if !self.hooks.is_empty() {
            let bytes = encoder.as_bytes();
            let record = Record::new(level, encoder.format(), &bytes[..bytes.len() - 1]);
            for hook in self.hooks.iter() {
                hook.observe(&record);
            }
        }

        if level == LogLevel::Fatal {
            if let Err(e) = shared.sink.lock().flush() {
                eprintln!("[LOGGER ERROR] Failed to flush sink before exit: {}", e);
            }
            std::process::exit(1);
        }

        shared.pool.put(encoder);
    }

    /// Return the encoder of an entry dropped without `write()`
    pub(crate) fn discard(&self, encoder: Encoder) {
        self.shared.metrics.record_discarded();
        self.shared.pool.put(encoder);
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.shared.level.load(Ordering::Relaxed))
    }

    /// Change the gate level of this logger and every logger sharing its state
    pub fn set_level(&self, level: LogLevel) {
        self.shared.level.store(level.as_u8(), Ordering::Relaxed);
    }

    #[inline]
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_u8(self.shared.format.load(Ordering::Relaxed))
    }

    pub fn set_format(&self, format: OutputFormat) {
        self.shared.format.store(format.as_u8(), Ordering::Relaxed);
    }

    /// `true` if a record at `level` passes the gate.
    ///
    /// Lets callers skip building expensive arguments. Sampling is not
    /// consulted.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    /// Derive a logger that adds fields to every record
    #[must_use]
    pub fn with<F>(&self, f: F) -> Logger
    where
        F: Fn(Object<'_>) + Send + Sync + 'static,
    {
        self.with_context(Arc::new(f))
    }

    /// Derive a logger with an additional context callback
    #[must_use]
    pub fn with_context(&self, with: Arc<dyn With>) -> Logger {
        Logger {
            shared: Arc::clone(&self.shared),
            with: self.with.iter().cloned().chain(Some(with)).collect(),
            hooks: Arc::clone(&self.hooks),
        }
    }

    /// Derive a logger that also runs `f` on every finalized record
    #[must_use]
    pub fn hook<F>(&self, f: F) -> Logger
    where
        F: Fn(&Record<'_>) + Send + Sync + 'static,
    {
        self.hooks(Some(Arc::new(f) as Arc<dyn Hook>))
    }

    /// Derive a logger with additional hooks, run after the existing ones
    #[must_use]
    pub fn hooks<I>(&self, hooks: I) -> Logger
    where
        I: IntoIterator<Item = Arc<dyn Hook>>,
    {
        Logger {
            shared: Arc::clone(&self.shared),
            with: Arc::clone(&self.with),
            hooks: self.hooks.iter().cloned().chain(hooks).collect(),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.sink.lock().flush()?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let logger = Logger::builder().build().unwrap();
    /// logger.info("started").write();
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.total_written(), 1);
    /// assert_eq!(metrics.write_errors(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn pool(&self) -> &EncoderPool {
        &self.shared.pool
    }

    /// `None` when sampling is disabled
    pub fn sampler(&self) -> Option<&LogSampler> {
        self.shared.sampler.as_ref()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("format", &self.format())
            .field("with", &self.with.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .config(
///         Config::default()
///             .with_level(LogLevel::Debug)
///             .with_format(OutputFormat::Text)
///             .with_sampling(SamplingConfig::new(Duration::from_secs(1), 10, 100)),
///     )
///     .sink(std::io::stdout())
///     .pool_size(64)
///     .build()
///     .unwrap();
///
/// assert_eq!(logger.level(), LogLevel::Debug);
/// ```
pub struct LoggerBuilder {
    config: Config,
    sink: Option<Box<dyn Write + Send>>,
    resolver: Option<Box<dyn CallerResolver>>,
    pool_size: usize,
    encoder_capacity: usize,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            sink: None,
            resolver: None,
            pool_size: DEFAULT_POOL_SIZE,
            encoder_capacity: DEFAULT_ENCODER_CAPACITY,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the output target. Without one, records are discarded.
    #[must_use = "builder methods return a new value"]
    pub fn sink<W: Write + Send + 'static>(mut self, sink: W) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replace the default `file:line` call-site resolver
    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Number of idle encoders kept for reuse
    #[must_use = "builder methods return a new value"]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Initial buffer capacity of each pooled encoder
    #[must_use = "builder methods return a new value"]
    pub fn encoder_capacity(mut self, capacity: usize) -> Self {
        self.encoder_capacity = capacity;
        self
    }

    /// Validate the configuration and build the Logger
    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;
        Ok(self.build_unchecked())
    }

    pub(crate) fn build_unchecked(self) -> Logger {
        let config = self.config;
        let sampler = config
            .enable_sampling
            .then(|| LogSampler::new(config.sampling()));

        let shared = Shared {
            level: AtomicU8::new(config.level.as_u8()),
            format: AtomicU8::new(config.format.as_u8()),
            sink: Mutex::new(self.sink.unwrap_or_else(|| Box::new(io::sink()))),
            pool: EncoderPool::new(self.pool_size, self.encoder_capacity),
            sampler,
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(LocationResolver)),
            metrics: LoggerMetrics::new(),
            config,
        };

        Logger {
            shared: Arc::new(shared),
            with: Arc::new([]),
            hooks: Arc::new([]),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
