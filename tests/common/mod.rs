//! Shared fixtures for integration tests.
#![allow(dead_code)]

use descent_lib::prelude::*;
use ndarray::{Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Mean-squared-error gradient of a linear model `y = X w`.
pub struct LeastSquares;

impl GradientSource<Array1<TensorData>> for LeastSquares {
    fn gradient(
        &mut self,
        inputs: ArrayView2<'_, TensorData>,
        targets: ArrayView2<'_, TensorData>,
        params: &Array1<TensorData>,
    ) -> Array1<TensorData> {
        let n = inputs.nrows() as TensorData;
        let residual = inputs.dot(params) - targets.column(0);
        inputs.t().dot(&residual) / n
    }
}

/// Same linear model with weight and bias kept as separate named tensors.
pub struct NamedLeastSquares;

impl GradientSource<BTreeMap<String, Array1<TensorData>>> for NamedLeastSquares {
    fn gradient(
        &mut self,
        inputs: ArrayView2<'_, TensorData>,
        targets: ArrayView2<'_, TensorData>,
        params: &BTreeMap<String, Array1<TensorData>>,
    ) -> BTreeMap<String, Array1<TensorData>> {
        let n = inputs.nrows() as TensorData;
        let bias = params["bias"][0];
        let residual = inputs.dot(&params["weight"]) + bias - targets.column(0);
        named([
            ("weight", inputs.t().dot(&residual) / n),
            ("bias", Array1::from_elem(1, residual.sum() / n)),
        ])
    }
}

/// Returns the same gradient for every batch.
pub struct Constant(pub Array1<TensorData>);

impl GradientSource<Array1<TensorData>> for Constant {
    fn gradient(
        &mut self,
        _inputs: ArrayView2<'_, TensorData>,
        _targets: ArrayView2<'_, TensorData>,
        _params: &Array1<TensorData>,
    ) -> Array1<TensorData> {
        self.0.clone()
    }
}

/// `n` noiseless samples of `y = 2 x0 - 3 x1`.
pub fn linear_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let inputs = Array2::from_shape_fn((n, 2), |_| rng.gen_range(-1.0..1.0));
    let targets = inputs.column(0).mapv(|v| 2.0 * v) - inputs.column(1).mapv(|v| 3.0 * v);
    Dataset::new(inputs, targets).expect("consistent sample counts")
}

pub fn mse(dataset: &Dataset, params: &Array1<TensorData>) -> TensorData {
    let residual = dataset.inputs().dot(params) - dataset.targets().column(0);
    residual.mapv(|r| r * r).mean().unwrap_or(0.0)
}
