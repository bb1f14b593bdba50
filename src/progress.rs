//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring a conversion,
//! [`ProgressSignal`] as a lock-free observable percentage that a front end
//! can poll, and [`CancellationToken`] for cooperative cancellation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flipbook::{
//!     ConversionOptions, ConversionRequest, Converter, FlipbookError,
//!     ProgressCallback, ProgressInfo,
//! };
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.phase);
//!         }
//!     }
//! }
//!
//! let options = ConversionOptions::new().with_progress(Arc::new(PrintProgress));
//! let request = ConversionRequest::new("input.mp4", "out", options);
//! let pdf = Converter::new(request).run()?;
//! # Ok::<(), FlipbookError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU8, Ordering},
};
use std::time::{Duration, Instant};

/// The stage of a conversion that a progress report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Phase {
    /// Decoding the video and staging still frames.
    Sampling,
    /// Laying staged frames out onto document pages.
    Layout,
    /// The document is committed and staging is cleaned up.
    Finished,
}

impl Phase {
    fn to_u8(self) -> u8 {
        match self {
            Phase::Sampling => 0,
            Phase::Layout => 1,
            Phase::Finished => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Phase::Sampling,
            1 => Phase::Layout,
            _ => Phase::Finished,
        }
    }
}

/// A snapshot of conversion progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which phase is running.
    pub phase: Phase,
    /// Items processed so far (decoded frames while sampling, emitted frames
    /// during layout).
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage of the phase (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the phase started.
    pub elapsed: Duration,
    /// Estimated time remaining in the phase, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Trait for receiving progress updates during a conversion.
///
/// Implementations must be [`Send`] and [`Sync`] because conversions usually
/// run on a background thread.
///
/// Progress callbacks are **infallible**: they observe but cannot halt the
/// conversion. Use [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called after every unit of work (or every batch, see
    /// [`ConversionOptions::with_batch_size`](crate::ConversionOptions::with_batch_size)).
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards every notification. Default when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// An observable progress percentage backed by atomics.
///
/// Only the conversion writes to the signal; any number of readers may call
/// [`percentage`](ProgressSignal::percentage) and
/// [`phase`](ProgressSignal::phase) without blocking. Within a phase the
/// percentage never decreases. A report for a new phase resets it first.
///
/// # Example
///
/// ```
/// use flipbook::{Phase, ProgressSignal};
///
/// let signal = ProgressSignal::new();
/// assert_eq!(signal.percentage(), 0);
/// assert_eq!(signal.phase(), Phase::Sampling);
/// ```
#[derive(Clone)]
pub struct ProgressSignal {
    percent: Arc<AtomicU8>,
    phase: Arc<AtomicU8>,
    forward: Option<Arc<dyn ProgressCallback>>,
}

impl ProgressSignal {
    /// Create a signal at 0% in the sampling phase.
    pub fn new() -> Self {
        Self {
            percent: Arc::new(AtomicU8::new(0)),
            phase: Arc::new(AtomicU8::new(Phase::Sampling.to_u8())),
            forward: None,
        }
    }

    /// Also pass every report on to `callback`.
    #[must_use]
    pub fn with_forward(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.forward = Some(callback);
        self
    }

    /// Current percentage of the running phase, 0 – 100.
    pub fn percentage(&self) -> u8 {
        self.percent.load(Ordering::Acquire)
    }

    /// The phase the last report referred to.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn publish(&self, phase: Phase, percentage: Option<f32>) {
        let code = phase.to_u8();
        if self.phase.swap(code, Ordering::AcqRel) != code {
            self.percent.store(0, Ordering::Release);
        }

        if let Some(pct) = percentage {
            let value = pct.clamp(0.0, 100.0) as u8;
            self.percent.fetch_max(value, Ordering::AcqRel);
        }
    }
}

impl Default for ProgressSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for ProgressSignal {
    fn on_progress(&self, info: &ProgressInfo) {
        self.publish(info.phase, info.percentage);
        if let Some(forward) = &self.forward {
            forward.on_progress(info);
        }
    }
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the
/// associated conversion at the next frame or tile boundary.
///
/// # Example
///
/// ```
/// use flipbook::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks progress of one phase and emits callbacks.
///
/// Reported percentages are clamped to 0 – 100 and never go backwards.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    phase: Phase,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
    highest_percentage: f32,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        phase: Phase,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            phase,
            total: total.filter(|&t| t > 0),
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
            highest_percentage: 0.0,
        }
    }

    /// Emit the 0% report that opens the phase.
    pub(crate) fn start(&mut self) {
        self.report();
    }

    /// Record `count` completed items and report once the batch threshold is
    /// reached.
    pub(crate) fn advance_by(&mut self, count: u64) {
        self.current += count;
        self.items_since_last_report += count;

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    pub(crate) fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Unconditionally emit a report for the current position.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    /// Emit a final 100% report regardless of the recorded position.
    pub(crate) fn complete(&mut self) {
        self.highest_percentage = 100.0;
        self.emit(Some(100.0));
    }

    fn report(&mut self) {
        let percentage = self.total.map(|t| {
            let pct = ((self.current as f64 / t as f64) * 100.0).clamp(0.0, 100.0) as f32;
            let pct = pct.max(self.highest_percentage);
            self.highest_percentage = pct;
            pct
        });
        self.emit(percentage);
    }

    fn emit(&self, percentage: Option<f32>) {
        let elapsed = self.start_time.elapsed();

        let estimated_remaining = match self.total {
            Some(t) if self.current > 0 && self.current <= t => {
                let per_item = elapsed.as_secs_f64() / self.current as f64;
                Some(Duration::from_secs_f64(
                    per_item * t.saturating_sub(self.current) as f64,
                ))
            }
            _ => None,
        };

        let info = ProgressInfo {
            phase: self.phase,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_clamps_overshoot() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), Phase::Sampling, Some(4), 1);
        for _ in 0..6 {
            tracker.advance();
        }

        let infos = recorder.0.lock().unwrap();
        assert_eq!(infos.len(), 6);
        assert_eq!(infos.last().unwrap().percentage, Some(100.0));
        assert!(infos.iter().all(|info| info.percentage.unwrap() <= 100.0));
    }

    #[test]
    fn tracker_without_total_has_no_percentage() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), Phase::Layout, Some(0), 1);
        tracker.advance();

        let infos = recorder.0.lock().unwrap();
        assert_eq!(infos[0].percentage, None);
        assert_eq!(infos[0].total, None);
    }

    #[test]
    fn tracker_batches_reports() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), Phase::Sampling, Some(10), 5);
        for _ in 0..10 {
            tracker.advance();
        }
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn signal_resets_on_phase_change() {
        let signal = ProgressSignal::new();
        signal.publish(Phase::Sampling, Some(80.0));
        signal.publish(Phase::Sampling, Some(40.0));
        assert_eq!(signal.percentage(), 80);

        signal.publish(Phase::Layout, Some(10.0));
        assert_eq!(signal.phase(), Phase::Layout);
        assert_eq!(signal.percentage(), 10);
    }
}
