//! Logging macros for format-string messages.
//!
//! Each macro formats the message with `format!` only when the level passes
//! the logger's gate, and writes a record with no extra fields. Use the
//! `Entry` API directly to attach fields.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//!
//! let logger = Logger::builder().build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.enabled(level) {
            logger.log(level, &::std::format!($($arg)+)).write();
        }
    }};
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().config(Config::default().with_level(LogLevel::Debug)).build().unwrap();
/// use rust_structured_logger::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_structured_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_structured_logger::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_structured_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message and exit the process.
///
/// # Examples
///
/// ```no_run
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::builder().build().unwrap();
/// use rust_structured_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Config, LogLevel, Logger, OutputFormat};
    use parking_lot::Mutex;
    use std::io::{self, Write};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn text_logger(level: LogLevel) -> (Logger, Capture) {
        let capture = Capture::default();
        let config = Config::default()
            .with_level(level)
            .with_format(OutputFormat::Text)
            .with_time(false)
            .with_caller(false)
            .without_sampling();
        (Logger::new(config, capture.clone()).unwrap(), capture)
    }

    fn output(capture: &Capture) -> String {
        String::from_utf8(capture.0.lock().clone()).unwrap()
    }

    #[test]
    fn test_log_macro() {
        let (logger, out) = text_logger(LogLevel::Info);
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Warn, "Formatted: {}", 42);

        assert_eq!(
            output(&out),
            "level=info message=\"Test message\"\nlevel=warn message=\"Formatted: 42\"\n"
        );
    }

    #[test]
    fn test_level_macros() {
        let (logger, out) = text_logger(LogLevel::Debug);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);

        let lines: Vec<_> = output(&out).lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("level=debug"));
        assert!(lines[3].ends_with("message=\"Code: 500\""));
    }

    #[test]
    fn test_gated_macro_skips_formatting() {
        struct Panics;

        impl std::fmt::Display for Panics {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                panic!("formatted a gated message");
            }
        }

        let (logger, out) = text_logger(LogLevel::Error);
        debug!(logger, "{}", Panics);
        info!(&logger, "{}", Panics);

        assert!(output(&out).is_empty());
    }
}
