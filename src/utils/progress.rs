//! # Progress Reporting
//!
//! Per-epoch observers injected into `optimize`. A sink sees one
//! [`EpochReport`] at the end of every epoch and may ask the run to stop early
//! (cooperative cancellation, checked once per epoch).

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Snapshot handed to a [`ProgressSink`] after each epoch.
#[derive(Debug)]
pub struct EpochReport<'a, P> {
    /// Zero-based epoch index.
    pub epoch: usize,
    /// Mini-batch steps taken since the run started.
    pub steps: usize,
    /// Parameters at the end of the epoch.
    pub params: &'a P,
}

pub trait ProgressSink<P> {
    fn on_epoch(&mut self, report: &EpochReport<'_, P>);

    /// Polled after every epoch; returning `true` ends the run with the
    /// current parameters.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl<P> ProgressSink<P> for NoProgress {
    fn on_epoch(&mut self, _report: &EpochReport<'_, P>) {}
}

/// Emits one `tracing` event per epoch at INFO level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingProgress;

impl<P: Debug> ProgressSink<P> for TracingProgress {
    fn on_epoch(&mut self, report: &EpochReport<'_, P>) {
        tracing::info!(
            epoch = report.epoch,
            steps = report.steps,
            params = ?report.params,
            "epoch finished"
        );
    }
}

/// Keeps a copy of the parameters after every epoch.
#[derive(Clone, Debug)]
pub struct History<P> {
    snapshots: Vec<P>,
    limit: Option<usize>,
}

impl<P> History<P> {
    pub fn new() -> Self {
        History {
            snapshots: Vec::new(),
            limit: None,
        }
    }

    /// Stops the run once `epochs` snapshots have been recorded.
    pub fn with_limit(epochs: usize) -> Self {
        History {
            snapshots: Vec::new(),
            limit: Some(epochs),
        }
    }

    pub fn snapshots(&self) -> &[P] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<P> {
        self.snapshots
    }
}

impl<P> Default for History<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> ProgressSink<P> for History<P> {
    fn on_epoch(&mut self, report: &EpochReport<'_, P>) {
        self.snapshots.push(report.params.clone());
    }

    fn should_stop(&self) -> bool {
        self.limit.is_some_and(|limit| self.snapshots.len() >= limit)
    }
}

/// Shared flag another thread can raise to end a run after the current epoch.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl<P> ProgressSink<P> for CancelToken {
    fn on_epoch(&mut self, _report: &EpochReport<'_, P>) {}

    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}

/// Adapter so any `FnMut(&EpochReport<P>)` closure can be used as a sink.
pub struct FnProgress<F>(F);

/// Wraps a closure as a [`ProgressSink`].
pub fn progress_fn<P, F>(f: F) -> FnProgress<F>
where
    F: FnMut(&EpochReport<'_, P>),
{
    FnProgress(f)
}

impl<P, F> ProgressSink<P> for FnProgress<F>
where
    F: FnMut(&EpochReport<'_, P>),
{
    fn on_epoch(&mut self, report: &EpochReport<'_, P>) {
        (self.0)(report)
    }
}
