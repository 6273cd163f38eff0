//! Monotonic timestamps for benchmark records
//!
//! Timestamps are whole nanoseconds since a process-wide anchor taken the
//! first time any [`MonotonicClock`] is read. They come from
//! `std::time::Instant`, so they never jump with wall-clock adjustments.
//! Elapsed time is converted to seconds by dividing by [`NANOS_PER_SECOND`].

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// Divisor from clock units (nanoseconds) to seconds
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Source of monotonic timestamps, in nanoseconds
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_nanos(&self) -> u64;
}

/// `Instant`-backed clock, nanosecond resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }

    fn anchor() -> Instant {
        static ANCHOR: OnceLock<Instant> = OnceLock::new();
        *ANCHOR.get_or_init(Instant::now)
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_nanos(&self) -> u64 {
        // u64 nanoseconds cover ~584 years of uptime
        Self::anchor().elapsed().as_nanos() as u64
    }
}

/// Convert a nanosecond span to seconds; reversed spans count as zero
pub fn elapsed_seconds(start_nanos: u64, end_nanos: u64) -> f64 {
    end_nanos.saturating_sub(start_nanos) as f64 / NANOS_PER_SECOND as f64
}
