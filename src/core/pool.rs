//! Pool of reusable encoders
//!
//! Encoders are checked out by value, so a checked-out encoder is owned by
//! exactly one record until it is handed back. The free list is a bounded
//! `crossbeam_channel`, which gives lock-free `get`/`put` from any thread.
//! When the pool is empty a fresh encoder is allocated; when it is full a
//! returned encoder is dropped.

use super::encoder::{Encoder, DEFAULT_ENCODER_CAPACITY};
use super::output_format::OutputFormat;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of encoders pre-allocated by `EncoderPool::default()`
pub const DEFAULT_POOL_SIZE: usize = 32;

/// Counters for pool monitoring
#[derive(Debug, Default)]
pub struct PoolMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    returns: AtomicU64,
    drops: AtomicU64,
}

impl PoolMetrics {
    pub const fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            returns: AtomicU64::new(0),
            drops: AtomicU64::new(0),
        }
    }

    /// Checkouts served from the free list
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Checkouts that had to allocate
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Encoders accepted back into the free list
    #[inline]
    pub fn returns(&self) -> u64 {
        self.returns.load(Ordering::Relaxed)
    }

    /// Encoders dropped because the free list was full
    #[inline]
    pub fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Hit rate between 0.0 and 1.0, 1.0 when nothing was checked out yet
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            1.0
        } else {
            hits as f64 / total as f64
        }
    }
}

pub struct EncoderPool {
    sender: Sender<Encoder>,
    receiver: Receiver<Encoder>,
    encoder_capacity: usize,
    metrics: PoolMetrics,
}

impl EncoderPool {
    /// Create a pool holding up to `pool_size` idle encoders, all of them
    /// pre-allocated with `encoder_capacity` bytes.
    pub fn new(pool_size: usize, encoder_capacity: usize) -> Self {
        let (sender, receiver) = bounded(pool_size);

        for _ in 0..pool_size {
            // Cannot fail: the channel was sized for exactly this many
            let _ = sender.try_send(Encoder::with_capacity(
                OutputFormat::default(),
                encoder_capacity,
            ));
        }

        Self {
            sender,
            receiver,
            encoder_capacity,
            metrics: PoolMetrics::new(),
        }
    }

    /// Check out an empty encoder set to `format`
    #[inline]
    pub fn get(&self, format: OutputFormat) -> Encoder {
        let mut encoder = match self.receiver.try_recv() {
            Ok(encoder) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                encoder
            }
            Err(_) => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                Encoder::with_capacity(format, self.encoder_capacity)
            }
        };
        encoder.set_format(format);
        encoder
    }

    /// Reset `encoder` and return it to the free list
    #[inline]
    pub fn put(&self, mut encoder: Encoder) {
        encoder.reset();

        match self.sender.try_send(encoder) {
            Ok(()) => {
                self.metrics.returns.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.metrics.drops.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Idle encoders currently in the pool
    #[inline]
    pub fn available(&self) -> usize {
        self.receiver.len()
    }

    /// Maximum number of idle encoders kept
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(0)
    }

    #[inline]
    pub fn encoder_capacity(&self) -> usize {
        self.encoder_capacity
    }

    #[inline]
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE, DEFAULT_ENCODER_CAPACITY)
    }
}

impl std::fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("encoder_capacity", &self.encoder_capacity)
            .field("metrics", &self.metrics)
            .finish()
    }
}
