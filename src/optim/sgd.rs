//! # Plain Gradient Descent
//!
//! Stochastic, mini-batch and full-batch descent share this update rule; they
//! differ only in the batch plan the driver runs them with.

use super::UpdateRule;
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

/// `params = params - lr * gradient`. Holds no accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlainDescent {
    lr: TensorData,
}

impl PlainDescent {
    pub fn new(lr: TensorData) -> Self {
        PlainDescent { lr }
    }
}

impl<P: ParameterState> UpdateRule<P> for PlainDescent {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        params.check_layout(gradient)?;
        let lr = self.lr;
        params.zip_update(gradient, |p, g| *p -= lr * g);
        Ok(())
    }

    fn learning_rate(&self) -> TensorData {
        self.lr
    }
}
