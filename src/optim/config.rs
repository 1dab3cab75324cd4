//! # Optimization Configuration
//!
//! Hyperparameters shared by every algorithm. Fields an algorithm does not
//! use are ignored by it.

use super::{Algorithm, OptimError};
use crate::tensor::TensorData;
use serde::{Deserialize, Serialize};

/// Settings for one `optimize` call.
///
/// Deserializes with defaults for any missing field, so a JSON document only
/// needs to name what differs from the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Step size (default: 0.01).
    pub learning_rate: TensorData,
    /// Number of passes over the dataset (default: 1000). There is no early stopping.
    pub max_num_epoch: usize,
    /// Rows per mini-batch when `batch_fraction` is absent (default: 1).
    pub batch_size: usize,
    /// Fraction of the dataset per mini-batch; overrides `batch_size` (default: None).
    pub batch_fraction: Option<TensorData>,
    /// Velocity decay for momentum, first-moment decay (beta1) for Adam (default: 0.9).
    pub momentum_decay: TensorData,
    /// Squared-gradient decay for RMSProp, second-moment decay (beta2) for Adam (default: 0.99).
    pub squared_gradient_decay: TensorData,
    /// Added to the denominator after the square root (default: 1e-8).
    pub epsilon: TensorData,
    /// Per-epoch row shuffling. `None` keeps the algorithm's own default:
    /// every algorithm shuffles except Adam.
    pub shuffle: Option<bool>,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        OptimizeConfig {
            learning_rate: 0.01,
            max_num_epoch: 1000,
            batch_size: 1,
            batch_fraction: None,
            momentum_decay: 0.9,
            squared_gradient_decay: 0.99,
            epsilon: 1e-8,
            shuffle: None,
        }
    }
}

impl OptimizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, OptimError> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn learning_rate(mut self, learning_rate: TensorData) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn max_num_epoch(mut self, max_num_epoch: usize) -> Self {
        self.max_num_epoch = max_num_epoch;
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn batch_fraction(mut self, batch_fraction: Option<TensorData>) -> Self {
        self.batch_fraction = batch_fraction;
        self
    }

    #[must_use]
    pub fn momentum_decay(mut self, momentum_decay: TensorData) -> Self {
        self.momentum_decay = momentum_decay;
        self
    }

    #[must_use]
    pub fn squared_gradient_decay(mut self, squared_gradient_decay: TensorData) -> Self {
        self.squared_gradient_decay = squared_gradient_decay;
        self
    }

    #[must_use]
    pub fn epsilon(mut self, epsilon: TensorData) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn shuffle(mut self, shuffle: Option<bool>) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Checks the scalar hyperparameters `algorithm` reads. Fields it does
    /// not read are ignored, whatever their value. Batch settings are checked
    /// by [`plan`](super::plan) once the sample count is known.
    ///
    /// A zero `epsilon` is accepted: the resulting NaN/Inf is left for the
    /// caller to see in the returned parameters.
    pub fn validate(&self, algorithm: Algorithm) -> Result<(), OptimError> {
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(OptimError::InvalidConfiguration(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        let uses_momentum = matches!(algorithm, Algorithm::Momentum | Algorithm::Adam);
        if uses_momentum && !(0.0..1.0).contains(&self.momentum_decay) {
            return Err(OptimError::InvalidConfiguration(format!(
                "momentum_decay must be in [0, 1), got {}",
                self.momentum_decay
            )));
        }
        let uses_square_avg = matches!(algorithm, Algorithm::RmsProp | Algorithm::Adam);
        if uses_square_avg && !(0.0..1.0).contains(&self.squared_gradient_decay) {
            return Err(OptimError::InvalidConfiguration(format!(
                "squared_gradient_decay must be in [0, 1), got {}",
                self.squared_gradient_decay
            )));
        }
        let uses_epsilon = matches!(
            algorithm,
            Algorithm::Adagrad | Algorithm::RmsProp | Algorithm::Adam
        );
        if uses_epsilon && !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(OptimError::InvalidConfiguration(format!(
                "epsilon must be finite and >= 0, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}
