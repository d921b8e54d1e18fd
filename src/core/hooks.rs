//! Per-logger callbacks
//!
//! - `With`: injects context fields into every record, right after the
//!   standard level/time/caller fields.
//! - `Hook`: observes every finalized record after it was written.
//!
//! Both run synchronously on the logging thread. A callback that blocks
//! blocks the logging call.

use super::log_entry::Record;
use super::object::Object;

/// Context injection applied to every record of a logger
pub trait With: Send + Sync {
    fn apply(&self, fields: Object<'_>);
}

impl<F> With for F
where
    F: Fn(Object<'_>) + Send + Sync,
{
    fn apply(&self, fields: Object<'_>) {
        self(fields)
    }
}

/// Observer of finalized records, e.g. for metrics or forwarding
pub trait Hook: Send + Sync {
    fn observe(&self, record: &Record<'_>);
}

impl<F> Hook for F
where
    F: Fn(&Record<'_>) + Send + Sync,
{
    fn observe(&self, record: &Record<'_>) {
        self(record)
    }
}
