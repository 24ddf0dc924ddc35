//! Wall-clock and monotonic time sources for call instrumentation.
//!
//! Two clocks are involved in every wrapped call:
//!
//! 1. Local wall-clock time, printed on entry records so a log line can be
//!    matched against other logs of the same process
//! 2. A monotonic clock, used to measure how long the wrapped call took and
//!    immune to wall-clock adjustments

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// `strftime`-style layout of the timestamp shown on entry records.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Renders a timestamp as `YYYY/MM/DD hh:mm:ss`.
pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time, rendered with [`TIMESTAMP_FORMAT`].
///
/// # Examples
///
/// ```
/// # use timelog::clock::now_timestamp;
/// let now = now_timestamp();
/// assert_eq!(now.len(), "2024/01/31 23:59:59".len());
/// ```
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Measures the duration of a single call attempt.
///
/// A stopwatch starts when it is created and is never restarted; each wrapped
/// invocation creates its own.
///
/// # Examples
///
/// ```
/// # use timelog::clock::Stopwatch;
/// let watch = Stopwatch::start();
/// let ms = watch.elapsed_ms();
/// assert!(ms >= 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    #[inline(always)]
    pub fn start() -> Self {
        Self { started: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
