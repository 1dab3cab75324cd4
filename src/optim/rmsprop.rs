//! `RMSProp` Optimizer
//!
//! Root Mean Square Propagation: Adagrad with an exponentially decayed
//! squared-gradient average instead of a running sum.

use super::UpdateRule;
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

/// `RMSProp` optimizer.
///
/// Update rule:
/// ```text
/// square_avg = decay * square_avg + (1 - decay) * grad^2
/// param = param - lr * grad / (sqrt(square_avg) + eps)
/// ```
///
/// `square_avg` can shrink again once gradients get smaller, which keeps the
/// step size from collapsing on long runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RmsProp<P> {
    /// Learning rate.
    lr: TensorData,
    /// Decay rate of the moving average.
    decay: TensorData,
    /// Small constant for numerical stability.
    eps: TensorData,
    /// Decayed average of squared gradients.
    square_avg: P,
}

impl<P: ParameterState> RmsProp<P> {
    pub fn new(lr: TensorData, decay: TensorData, eps: TensorData, params: &P) -> Self {
        RmsProp {
            lr,
            decay,
            eps,
            square_avg: params.zeros_like(),
        }
    }

    pub fn square_avg(&self) -> &P {
        &self.square_avg
    }

    /// Per-parameter step size `lr / (sqrt(square_avg) + eps)` for the next update.
    pub fn effective_learning_rate(&self) -> P {
        let (lr, eps) = (self.lr, self.eps);
        let mut rate = self.square_avg.clone();
        rate.update_each(|s| *s = lr / (s.sqrt() + eps));
        rate
    }
}

impl<P: ParameterState> UpdateRule<P> for RmsProp<P> {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        params.check_layout(gradient)?;
        let (lr, decay, eps) = (self.lr, self.decay, self.eps);

        self.square_avg
            .zip_update(gradient, |s, g| *s = decay * *s + (1.0 - decay) * g * g);

        let mut update = gradient.clone();
        update.zip_update(&self.square_avg, |g, s| *g = lr * *g / (s.sqrt() + eps));
        params.zip_update(&update, |p, u| *p -= u);
        Ok(())
    }

    fn learning_rate(&self) -> TensorData {
        self.lr
    }
}
