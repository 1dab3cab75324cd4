//! # Optimization Algorithms (`optim`)
//!
//! Provides the gradient-based optimizers used to fit parameters to data:
//! plain (stochastic / mini-batch / full-batch) descent, momentum, Adagrad,
//! RMSProp and Adam. All of them share batch planning and the epoch driver;
//! they differ only in their update rule and accumulator state.

use crate::data::Dataset;
use crate::tensor::{ParameterState, TensorData, TensorError};
use crate::utils::progress::{NoProgress, ProgressSink};
use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Submodules ---
pub mod adagrad;
pub mod adam;
pub mod config;
mod driver;
pub mod momentum;
pub mod planner;
pub mod rmsprop;
pub mod sgd;
pub mod state;

// Re-export optimizers
pub use adagrad::Adagrad;
pub use adam::Adam;
pub use config::OptimizeConfig;
pub use momentum::Momentum;
pub use planner::{plan, BatchPlan};
pub use rmsprop::RmsProp;
pub use sgd::PlainDescent;
pub use state::StepState;

// --- Error Handling ---
#[derive(thiserror::Error, Debug)]
pub enum OptimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Gradient does not match parameters: {0}")]
    ShapeMismatch(#[from] TensorError),
    #[error("Unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),
    #[error("Could not parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

// --- Update Rule Trait ---

/// A single optimization step applied to a parameter state.
pub trait UpdateRule<P: ParameterState> {
    /// Consumes one gradient and moves `params` in place, updating any
    /// accumulator state the rule keeps.
    ///
    /// Fails without touching `params` or the accumulators if the gradient's
    /// layout differs from the parameters'.
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError>;

    /// Base learning rate.
    fn learning_rate(&self) -> TensorData;
}

// --- Gradient Source ---

/// Produces the gradient of the loss for one batch at the given parameters.
///
/// Must return a state with the same layout as `params`. It may read but not
/// alter the parameters; how the gradient is obtained (closed form,
/// backpropagation, finite differences) is up to the implementation.
pub trait GradientSource<P> {
    fn gradient(
        &mut self,
        inputs: ArrayView2<'_, TensorData>,
        targets: ArrayView2<'_, TensorData>,
        params: &P,
    ) -> P;
}

/// Adapter so a closure can be used as a [`GradientSource`].
pub struct FnGradient<F>(F);

/// Wraps `f(inputs, targets, params) -> gradient` as a [`GradientSource`].
pub fn gradient_fn<P, F>(f: F) -> FnGradient<F>
where
    F: FnMut(ArrayView2<'_, TensorData>, ArrayView2<'_, TensorData>, &P) -> P,
{
    FnGradient(f)
}

impl<P, F> GradientSource<P> for FnGradient<F>
where
    F: FnMut(ArrayView2<'_, TensorData>, ArrayView2<'_, TensorData>, &P) -> P,
{
    fn gradient(
        &mut self,
        inputs: ArrayView2<'_, TensorData>,
        targets: ArrayView2<'_, TensorData>,
        params: &P,
    ) -> P {
        (self.0)(inputs, targets, params)
    }
}

// --- Algorithm Identity ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    PlainDescent,
    Momentum,
    Adagrad,
    RmsProp,
    Adam,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::PlainDescent,
        Algorithm::Momentum,
        Algorithm::Adagrad,
        Algorithm::RmsProp,
        Algorithm::Adam,
    ];

    /// Whether rows are reshuffled before every epoch when the configuration
    /// leaves it unspecified. Adam keeps the sample order fixed.
    pub fn shuffles_by_default(self) -> bool {
        !matches!(self, Algorithm::Adam)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::PlainDescent => "plain_descent",
            Algorithm::Momentum => "momentum",
            Algorithm::Adagrad => "adagrad",
            Algorithm::RmsProp => "rmsprop",
            Algorithm::Adam => "adam",
        };
        f.write_str(name)
    }
}

impl FromStr for Algorithm {
    type Err = OptimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let lowered = name.to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.to_string() == lowered)
            .ok_or_else(|| OptimError::UnknownAlgorithm(name.to_string()))
    }
}

/// How the factory preset constrains the batch settings of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPreset {
    /// Use `batch_size` / `batch_fraction` from the configuration.
    Configured,
    /// One sample per step.
    Stochastic,
    /// The whole dataset per step.
    FullBatch,
}

impl BatchPreset {
    /// Replaces the batch fields the preset fixes; their configured values are
    /// never read, so they are not checked either.
    fn apply(self, config: &OptimizeConfig) -> OptimizeConfig {
        match self {
            BatchPreset::Configured => config.clone(),
            BatchPreset::Stochastic => config.clone().batch_size(1).batch_fraction(None),
            BatchPreset::FullBatch => config.clone().batch_fraction(Some(1.0)),
        }
    }
}

// --- Optimizer ---

/// An algorithm plus batch preset, as produced by [`build_optimizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    algorithm: Algorithm,
    preset: BatchPreset,
}

impl Optimizer {
    pub fn new(algorithm: Algorithm) -> Self {
        Optimizer {
            algorithm,
            preset: BatchPreset::Configured,
        }
    }

    pub fn with_preset(algorithm: Algorithm, preset: BatchPreset) -> Self {
        Optimizer { algorithm, preset }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn preset(&self) -> BatchPreset {
        self.preset
    }

    /// Canonical factory name of this optimizer.
    pub fn name(&self) -> &'static str {
        match (self.algorithm, self.preset) {
            (Algorithm::PlainDescent, BatchPreset::Stochastic) => "sgd",
            (Algorithm::PlainDescent, BatchPreset::FullBatch) => "full_batch",
            (Algorithm::PlainDescent, BatchPreset::Configured) => "mini_batch",
            (Algorithm::Momentum, _) => "momentum",
            (Algorithm::Adagrad, _) => "adagrad",
            (Algorithm::RmsProp, _) => "rmsprop",
            (Algorithm::Adam, _) => "adam",
        }
    }

    /// Fits `initial` to `dataset` and returns the final parameters.
    ///
    /// Configuration is validated before the first gradient is requested.
    /// Each epoch optionally shuffles the rows (drawing from `rng`), runs
    /// `iterations_per_epoch` steps over contiguous batches and reports to
    /// `sink`. The caller's `initial` is left untouched, including when the
    /// run aborts on a mismatched gradient.
    ///
    /// NaN or infinite values produced along the way are not intercepted and
    /// show up in the returned parameters.
    pub fn optimize<P, G, R, S>(
        &self,
        dataset: &Dataset,
        initial: &P,
        source: &mut G,
        config: &OptimizeConfig,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<P, OptimError>
    where
        P: ParameterState,
        G: GradientSource<P> + ?Sized,
        R: Rng + ?Sized,
        S: ProgressSink<P> + ?Sized,
    {
        let config = self.preset.apply(config);
        config.validate(self.algorithm)?;
        let plan = plan(config.batch_size, config.batch_fraction, dataset.len())?;
        let shuffle = config
            .shuffle
            .unwrap_or_else(|| self.algorithm.shuffles_by_default());

        let run = driver::Run {
            dataset,
            plan,
            max_num_epoch: config.max_num_epoch,
            shuffle,
            state: StepState::new(self.algorithm, &config, initial),
        };
        run.execute(initial, source, rng, sink)
    }

    /// [`optimize`](Self::optimize) with a `StdRng` seeded from `seed` and no
    /// progress reporting.
    pub fn optimize_seeded<P, G>(
        &self,
        dataset: &Dataset,
        initial: &P,
        source: &mut G,
        config: &OptimizeConfig,
        seed: u64,
    ) -> Result<P, OptimError>
    where
        P: ParameterState,
        G: GradientSource<P> + ?Sized,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        self.optimize(dataset, initial, source, config, &mut rng, &mut NoProgress)
    }
}

impl FromStr for Optimizer {
    type Err = OptimError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let optimizer = match name.to_ascii_lowercase().as_str() {
            "sgd" => Optimizer::with_preset(Algorithm::PlainDescent, BatchPreset::Stochastic),
            "mini_batch" => Optimizer::new(Algorithm::PlainDescent),
            "full_batch" => Optimizer::with_preset(Algorithm::PlainDescent, BatchPreset::FullBatch),
            "momentum" => Optimizer::new(Algorithm::Momentum),
            "adagrad" => Optimizer::new(Algorithm::Adagrad),
            "rmsprop" => Optimizer::new(Algorithm::RmsProp),
            "adam" => Optimizer::new(Algorithm::Adam),
            _ => return Err(OptimError::UnknownAlgorithm(name.to_string())),
        };
        Ok(optimizer)
    }
}

impl fmt::Display for Optimizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps a case-insensitive name (`sgd`, `mini_batch`, `full_batch`,
/// `momentum`, `adagrad`, `rmsprop`, `adam`) to an [`Optimizer`].
pub fn build_optimizer(name: &str) -> Result<Optimizer, OptimError> {
    name.parse()
}
