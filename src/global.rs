//! Process-wide default logger
//!
//! Initialized at most once, either explicitly with `init`/`init_with` or
//! lazily on first use with the default configuration writing to stderr.
//! Applications that pass loggers around explicitly never need this module.
//!
//! ```no_run
//! use rust_structured_logger::prelude::*;
//!
//! global::init(Config::default().with_level(LogLevel::Debug), std::io::stdout()).unwrap();
//!
//! global::debug("cache warmed").uint64("entries", 1024).write();
//! ```

use crate::core::{Config, Entry, LogLevel, Logger, LoggerError, OutputFormat, Result};
use std::io::Write;
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Build and install the global logger
pub fn init<W>(config: Config, sink: W) -> Result<()>
where
    W: Write + Send + 'static,
{
    init_with(Logger::new(config, sink)?)
}

/// Install `logger` as the global logger.
///
/// Fails with `AlreadyInitialized` if a global logger exists, including one
/// created lazily by an earlier call to `logger()`.
pub fn init_with(logger: Logger) -> Result<()> {
    LOGGER.set(logger).map_err(|_| {
        eprintln!("[LOGGER WARNING] Global logger already initialized, keeping the existing one");
        LoggerError::AlreadyInitialized
    })
}

/// The global logger, created with defaults on first use if not initialized
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        Logger::builder()
            .config(Config::default())
            .sink(std::io::stderr())
            .build_unchecked()
    })
}

pub fn set_level(level: LogLevel) {
    logger().set_level(level);
}

pub fn set_format(format: OutputFormat) {
    logger().set_format(format);
}

#[inline]
#[track_caller]
pub fn debug(message: &str) -> Entry<'static> {
    logger().debug(message)
}

#[inline]
#[track_caller]
pub fn info(message: &str) -> Entry<'static> {
    logger().info(message)
}

#[inline]
#[track_caller]
pub fn warn(message: &str) -> Entry<'static> {
    logger().warn(message)
}

#[inline]
#[track_caller]
pub fn error(message: &str) -> Entry<'static> {
    logger().error(message)
}

/// Writing the returned entry exits the process
#[inline]
#[track_caller]
pub fn fatal(message: &str) -> Entry<'static> {
    logger().fatal(message)
}
