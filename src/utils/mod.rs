//! # Utility Functions (`utils`)
//!
//! Provides progress reporting for optimization runs and helpers for running
//! independent runs in parallel.

pub mod parallel;
pub mod progress;

pub use parallel::{sweep, SweepJob};
pub use progress::{CancelToken, EpochReport, History, NoProgress, ProgressSink, TracingProgress};
