//! # Momentum Optimizer

use super::UpdateRule;
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

/// Gradient descent with a velocity term.
///
/// ```text
/// v = decay * v - lr * gradient
/// params = params + v
/// ```
///
/// Decay values close to 1 carry a long gradient history. There is no bias
/// correction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Momentum<P> {
    lr: TensorData,
    decay: TensorData,
    velocity: P,
}

impl<P: ParameterState> Momentum<P> {
    /// Creates the rule with a zero velocity shaped like `params`.
    pub fn new(lr: TensorData, decay: TensorData, params: &P) -> Self {
        Momentum {
            lr,
            decay,
            velocity: params.zeros_like(),
        }
    }

    pub fn velocity(&self) -> &P {
        &self.velocity
    }
}

impl<P: ParameterState> UpdateRule<P> for Momentum<P> {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        params.check_layout(gradient)?;
        let (lr, decay) = (self.lr, self.decay);
        self.velocity.zip_update(gradient, |v, g| *v = decay * *v - lr * g);
        params.zip_update(&self.velocity, |p, v| *p += v);
        Ok(())
    }

    fn learning_rate(&self) -> TensorData {
        self.lr
    }
}
