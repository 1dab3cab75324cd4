//! # Adagrad Optimizer

use super::UpdateRule;
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

/// Implements the Adagrad algorithm.
/// Reference: Adaptive Subgradient Methods for Online Learning and Stochastic Optimization - http://jmlr.org/papers/v12/duchi11a.html
///
/// ```text
/// sum = sum + gradient^2
/// params = params - lr * gradient / (sqrt(sum) + eps)
/// ```
///
/// `sum` never decays, so each parameter's effective learning rate only
/// shrinks over a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adagrad<P> {
    lr: TensorData,
    eps: TensorData,
    // Sum of squared gradients
    sum: P,
}

impl<P: ParameterState> Adagrad<P> {
    pub fn new(lr: TensorData, eps: TensorData, params: &P) -> Self {
        Adagrad {
            lr,
            eps,
            sum: params.zeros_like(),
        }
    }

    pub fn squared_gradient_sum(&self) -> &P {
        &self.sum
    }

    /// Per-parameter step size `lr / (sqrt(sum) + eps)` for the next update.
    pub fn effective_learning_rate(&self) -> P {
        let (lr, eps) = (self.lr, self.eps);
        let mut rate = self.sum.clone();
        rate.update_each(|s| *s = lr / (s.sqrt() + eps));
        rate
    }
}

impl<P: ParameterState> UpdateRule<P> for Adagrad<P> {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        params.check_layout(gradient)?;
        let (lr, eps) = (self.lr, self.eps);

        self.sum.zip_update(gradient, |s, g| *s += g * g);

        let mut update = gradient.clone();
        update.zip_update(&self.sum, |g, s| *g = lr * *g / (s.sqrt() + eps));
        params.zip_update(&update, |p, u| *p -= u);
        Ok(())
    }

    fn learning_rate(&self) -> TensorData {
        self.lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn first_step_is_normalized() {
        let mut params = arr1(&[0.0, 0.0]);
        let mut rule = Adagrad::new(0.1, 1e-8, &params);
        rule.step(&mut params, &arr1(&[4.0, -0.5])).unwrap();
        // g / (|g| + eps), close to sign(g) on the first step
        assert_abs_diff_eq!(params[0], -0.1 * 4.0 / (4.0 + 1e-8), epsilon = 1e-12);
        assert_abs_diff_eq!(params[1], 0.1 * 0.5 / (0.5 + 1e-8), epsilon = 1e-12);
    }

    #[test]
    fn sum_is_monotonic() {
        let mut params = arr1(&[1.0]);
        let mut rule = Adagrad::new(0.01, 1e-8, &params);
        let mut last = 0.0;
        for g in [1.0, -2.0, 0.0, 0.5] {
            rule.step(&mut params, &arr1(&[g])).unwrap();
            let now = rule.squared_gradient_sum()[0];
            assert!(now >= last);
            last = now;
        }
        assert_abs_diff_eq!(last, 5.25, epsilon = 1e-12);
    }

    #[test]
    fn effective_rate_never_grows() {
        let mut params = arr1(&[1.0, 1.0]);
        let mut rule = Adagrad::new(0.5, 1e-8, &params);
        let mut previous = rule.effective_learning_rate();
        for _ in 0..10 {
            rule.step(&mut params, &arr1(&[0.3, -2.0])).unwrap();
            let current = rule.effective_learning_rate();
            for (now, before) in current.iter().zip(previous.iter()) {
                assert!(now <= before);
            }
            previous = current;
        }
    }

    #[test]
    fn zero_epsilon_with_zero_gradient_yields_nan() {
        let mut params = arr1(&[1.0]);
        let mut rule = Adagrad::new(0.1, 0.0, &params);
        rule.step(&mut params, &arr1(&[0.0])).unwrap();
        assert!(params[0].is_nan());
    }
}
