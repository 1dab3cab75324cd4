//! # Adam Optimizer

use super::UpdateRule;
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

/// Implements the Adam algorithm.
/// Reference: Adam: A Method for Stochastic Optimization - https://arxiv.org/abs/1412.6980
///
/// ```text
/// t = t + 1
/// m = beta1 * m + (1 - beta1) * g
/// v = beta2 * v + (1 - beta2) * g^2
/// m_hat = m / (1 - beta1^t)
/// v_hat = v / (1 - beta2^t)
/// params = params - lr * m_hat / (sqrt(v_hat) + eps)
/// ```
///
/// `t` counts mini-batch steps over the whole run; it is not reset per epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adam<P> {
    lr: TensorData,
    betas: (TensorData, TensorData), // (beta1, beta2)
    eps: TensorData,
    exp_avg: P,    // 1st moment estimate (momentum) - m_t
    exp_avg_sq: P, // 2nd moment estimate (RMSprop like) - v_t
    t: usize,
}

impl<P: ParameterState> Adam<P> {
    pub fn new(
        lr: TensorData,
        betas: (TensorData, TensorData),
        eps: TensorData,
        params: &P,
    ) -> Self {
        Adam {
            lr,
            betas,
            eps,
            exp_avg: params.zeros_like(),
            exp_avg_sq: params.zeros_like(),
            t: 0,
        }
    }

    /// Number of steps taken so far.
    pub fn t(&self) -> usize {
        self.t
    }

    pub fn exp_avg(&self) -> &P {
        &self.exp_avg
    }

    pub fn exp_avg_sq(&self) -> &P {
        &self.exp_avg_sq
    }

    /// Bias corrections `(1 - beta1^t, 1 - beta2^t)` at the current step.
    fn bias_corrections(&self) -> (TensorData, TensorData) {
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        (1.0 - self.betas.0.powi(t), 1.0 - self.betas.1.powi(t))
    }

    /// Bias-corrected moments `(m_hat, v_hat)` as of the last step.
    ///
    /// Before the first step there is nothing to correct and the raw (zero)
    /// moments are returned.
    pub fn corrected_moments(&self) -> (P, P) {
        let mut m_hat = self.exp_avg.clone();
        let mut v_hat = self.exp_avg_sq.clone();
        if self.t > 0 {
            let (bias_correction1, bias_correction2) = self.bias_corrections();
            m_hat.update_each(|m| *m /= bias_correction1);
            v_hat.update_each(|v| *v /= bias_correction2);
        }
        (m_hat, v_hat)
    }
}

impl<P: ParameterState> UpdateRule<P> for Adam<P> {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        params.check_layout(gradient)?;
        self.t += 1;
        let (beta1, beta2) = self.betas;
        let (lr, eps) = (self.lr, self.eps);

        self.exp_avg
            .zip_update(gradient, |m, g| *m = beta1 * *m + (1.0 - beta1) * g);
        self.exp_avg_sq
            .zip_update(gradient, |v, g| *v = beta2 * *v + (1.0 - beta2) * g * g);

        let (bias_correction1, bias_correction2) = self.bias_corrections();
        let mut step = self.exp_avg.clone();
        step.zip_update(&self.exp_avg_sq, |m, v| {
            let m_hat = *m / bias_correction1;
            let v_hat = v / bias_correction2;
            *m = lr * m_hat / (v_hat.sqrt() + eps);
        });
        params.zip_update(&step, |p, s| *p -= s);
        Ok(())
    }

    fn learning_rate(&self) -> TensorData {
        self.lr
    }
}
