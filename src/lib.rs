//! # Rust Structured Logger
//!
//! A structured logger that encodes typed key/value fields straight into
//! pooled byte buffers, as JSON objects or flat `key=value` text lines.
//!
//! ## Features
//!
//! - **Zero-copy fields**: values are appended to a reused buffer, no
//!   intermediate maps or strings
//! - **Sampling**: repeated records are rate-limited per (level, message)
//!   within a time window
//! - **Thread Safe**: loggers are `Send + Sync` and cheap to clone
//! - **Context and hooks**: derived loggers add fields to every record or
//!   observe every finalized one
//!
//! ```
//! use rust_structured_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .config(Config::default().with_format(OutputFormat::Text))
//!     .sink(std::io::stdout())
//!     .build()
//!     .unwrap();
//!
//! logger
//!     .info("user logged in")
//!     .string("user", "alice")
//!     .uint64("attempts", 1)
//!     .write();
//! ```

pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Array, CallSite, CallerResolver, Config, Encoder, EncoderPool, Entry, Hook,
        LocationResolver, LogLevel, LogSampler, Logger, LoggerBuilder, LoggerError,
        LoggerMetrics, Object, OutputFormat, PoolMetrics, Record, Result, SamplerMetrics,
        SamplingConfig, TimestampFormat, With,
    };
    pub use crate::global;
}

pub use core::{
    Array, CallSite, CallerResolver, Config, Encoder, EncoderPool, Entry, Hook, LocationResolver,
    LogLevel, LogSampler, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Object,
    OutputFormat, PoolMetrics, Record, Result, SamplerMetrics, SamplingConfig, TimestampFormat,
    With, CALLER_FIELD, DEFAULT_ENCODER_CAPACITY, DEFAULT_POOL_SIZE, UNKNOWN_CALLER,
};
