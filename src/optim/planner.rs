//! # Batch Planning
//!
//! Derives how many rows go into each mini-batch and how many mini-batches
//! make up one epoch.

use super::OptimError;
use crate::tensor::TensorData;
use serde::{Deserialize, Serialize};

/// Batch size and per-epoch iteration count for one optimization run.
///
/// `iterations_per_epoch = sample_count / batch_size` (floor): rows left over
/// after the last full batch are not visited in that epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub batch_size: usize,
    pub iterations_per_epoch: usize,
}

/// Computes the batch plan.
///
/// When `batch_fraction` is given it must lie in `(0, 1]` and overrides
/// `requested_batch_size` with `floor(sample_count * batch_fraction)`.
/// Otherwise `requested_batch_size` must be at least 1.
pub fn plan(
    requested_batch_size: usize,
    batch_fraction: Option<TensorData>,
    sample_count: usize,
) -> Result<BatchPlan, OptimError> {
    let batch_size = match batch_fraction {
        Some(fraction) => {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(OptimError::InvalidConfiguration(format!(
                    "batch_fraction must be in (0, 1], got {fraction}"
                )));
            }
            let size = (sample_count as TensorData * fraction).floor() as usize;
            if size == 0 {
                return Err(OptimError::InvalidConfiguration(format!(
                    "batch_fraction {fraction} of {sample_count} samples gives an empty batch"
                )));
            }
            size
        }
        None => {
            if requested_batch_size == 0 {
                return Err(OptimError::InvalidConfiguration(
                    "batch_size must be a positive integer".to_string(),
                ));
            }
            requested_batch_size
        }
    };

    Ok(BatchPlan {
        batch_size,
        iterations_per_epoch: sample_count / batch_size,
    })
}
