//! # Parallelism Utilities (CPU Threading)
//!
//! Runs independent optimizations concurrently with `rayon`, e.g. for a
//! hyperparameter sweep. Steps within one run stay strictly sequential; only
//! whole runs are spread across threads, each with its own parameters,
//! accumulators, gradient source and random generator.

use crate::data::Dataset;
use crate::optim::{GradientSource, OptimError, OptimizeConfig, Optimizer};
use crate::tensor::ParameterState;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One run of a sweep: its configuration and the seed of its shuffling RNG.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepJob {
    pub config: OptimizeConfig,
    pub seed: u64,
}

impl SweepJob {
    pub fn new(config: OptimizeConfig, seed: u64) -> Self {
        SweepJob { config, seed }
    }
}

/// Runs `optimizer` once per job, in parallel, starting every run from
/// `initial`. `make_source` is called once per job.
///
/// Results come back in job order. A run that fails does not affect the
/// others.
pub fn sweep<P, G, F>(
    optimizer: &Optimizer,
    dataset: &Dataset,
    initial: &P,
    make_source: F,
    jobs: &[SweepJob],
) -> Vec<Result<P, OptimError>>
where
    P: ParameterState + Send + Sync,
    G: GradientSource<P>,
    F: Fn() -> G + Sync,
{
    tracing::debug!(optimizer = %optimizer, jobs = jobs.len(), "starting sweep");
    jobs.par_iter()
        .map(|job| {
            let mut source = make_source();
            optimizer.optimize_seeded(dataset, initial, &mut source, &job.config, job.seed)
        })
        .collect()
}

/// Index and parameters of the job whose parameters score lowest under `loss`.
/// Failed runs and NaN scores are skipped.
pub fn best_by<P, L>(results: &[Result<P, OptimError>], loss: L) -> Option<(usize, &P)>
where
    L: Fn(&P) -> f64,
{
    results
        .iter()
        .enumerate()
        .filter_map(|(idx, result)| result.as_ref().ok().map(|params| (idx, params, loss(params))))
        .filter(|(_, _, score)| !score.is_nan())
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(idx, params, _)| (idx, params))
}
