//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod encoder;
pub mod error;
pub mod hooks;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod object;
pub mod output_format;
pub mod pool;
pub mod sampling;
pub mod timestamp;

pub use caller::{CallSite, CallerResolver, LocationResolver, UNKNOWN_CALLER};
pub use config::Config;
pub use encoder::{Encoder, DEFAULT_ENCODER_CAPACITY};
pub use error::{LoggerError, Result};
pub use hooks::{Hook, With};
pub use log_entry::{Entry, Record};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, CALLER_FIELD};
pub use metrics::LoggerMetrics;
pub use object::{Array, Object};
pub use output_format::OutputFormat;
pub use pool::{EncoderPool, PoolMetrics, DEFAULT_POOL_SIZE};
pub use sampling::{LogSampler, SamplerMetrics, SamplingConfig};
pub use timestamp::TimestampFormat;
