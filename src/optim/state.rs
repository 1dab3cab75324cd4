//! # Step State
//!
//! Closed set of update rules with their accumulators, selected by
//! [`Algorithm`]. Created at the start of an `optimize` call and dropped at
//! its end.

use super::{Adagrad, Adam, Algorithm, Momentum, OptimizeConfig, PlainDescent, RmsProp, UpdateRule};
use crate::tensor::{ParameterState, TensorData, TensorError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepState<P> {
    Plain(PlainDescent),
    Momentum(Momentum<P>),
    Adagrad(Adagrad<P>),
    RmsProp(RmsProp<P>),
    Adam(Adam<P>),
}

impl<P: ParameterState> StepState<P> {
    /// Builds the rule for `algorithm` with zeroed accumulators shaped like `params`.
    pub fn new(algorithm: Algorithm, config: &OptimizeConfig, params: &P) -> Self {
        let lr = config.learning_rate;
        match algorithm {
            Algorithm::PlainDescent => StepState::Plain(PlainDescent::new(lr)),
            Algorithm::Momentum => {
                StepState::Momentum(Momentum::new(lr, config.momentum_decay, params))
            }
            Algorithm::Adagrad => StepState::Adagrad(Adagrad::new(lr, config.epsilon, params)),
            Algorithm::RmsProp => StepState::RmsProp(RmsProp::new(
                lr,
                config.squared_gradient_decay,
                config.epsilon,
                params,
            )),
            Algorithm::Adam => StepState::Adam(Adam::new(
                lr,
                (config.momentum_decay, config.squared_gradient_decay),
                config.epsilon,
                params,
            )),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            StepState::Plain(_) => Algorithm::PlainDescent,
            StepState::Momentum(_) => Algorithm::Momentum,
            StepState::Adagrad(_) => Algorithm::Adagrad,
            StepState::RmsProp(_) => Algorithm::RmsProp,
            StepState::Adam(_) => Algorithm::Adam,
        }
    }
}

impl<P: ParameterState> UpdateRule<P> for StepState<P> {
    fn step(&mut self, params: &mut P, gradient: &P) -> Result<(), TensorError> {
        match self {
            StepState::Plain(rule) => rule.step(params, gradient),
            StepState::Momentum(rule) => rule.step(params, gradient),
            StepState::Adagrad(rule) => rule.step(params, gradient),
            StepState::RmsProp(rule) => rule.step(params, gradient),
            StepState::Adam(rule) => rule.step(params, gradient),
        }
    }

    fn learning_rate(&self) -> TensorData {
        match self {
            StepState::Plain(rule) => UpdateRule::<P>::learning_rate(rule),
            StepState::Momentum(rule) => rule.learning_rate(),
            StepState::Adagrad(rule) => rule.learning_rate(),
            StepState::RmsProp(rule) => rule.learning_rate(),
            StepState::Adam(rule) => rule.learning_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array1};

    #[test]
    fn builds_the_requested_rule() {
        let params = Array1::<TensorData>::zeros(2);
        let config = OptimizeConfig::default();
        for algorithm in Algorithm::ALL {
            let state = StepState::new(algorithm, &config, &params);
            assert_eq!(state.algorithm(), algorithm);
            assert_eq!(state.learning_rate(), 0.01);
        }
    }

    #[test]
    fn adam_takes_both_decays() {
        let params = arr1(&[0.0]);
        let config = OptimizeConfig::new().momentum_decay(0.5).squared_gradient_decay(0.75);
        let mut state = StepState::new(Algorithm::Adam, &config, &params);
        let mut p = params.clone();
        state.step(&mut p, &arr1(&[2.0])).unwrap();
        match &state {
            StepState::Adam(adam) => {
                assert_eq!(adam.exp_avg()[0], 1.0);
                assert_eq!(adam.exp_avg_sq()[0], 1.0);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn accumulators_serialize() {
        let params = arr1(&[1.0, 2.0]);
        let mut state = StepState::new(Algorithm::Momentum, &OptimizeConfig::default(), &params);
        let mut p = params.clone();
        state.step(&mut p, &arr1(&[1.0, 1.0])).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let restored: StepState<Array1<TensorData>> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
