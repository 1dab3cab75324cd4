mod common;

use common::Constant;
use descent_lib::prelude::*;
use ndarray::{arr1, Array1, ArrayView2};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Gradient of `0.5 * sum(a_i * (p_i - c_i)^2)`, ignoring the data.
struct Quadratic {
    curvature: Array1<TensorData>,
    center: Array1<TensorData>,
}

impl Quadratic {
    fn loss(&self, params: &Array1<TensorData>) -> TensorData {
        let diff = params - &self.center;
        0.5 * (&self.curvature * &diff * &diff).sum()
    }
}

impl GradientSource<Array1<TensorData>> for Quadratic {
    fn gradient(
        &mut self,
        _inputs: ArrayView2<'_, TensorData>,
        _targets: ArrayView2<'_, TensorData>,
        params: &Array1<TensorData>,
    ) -> Array1<TensorData> {
        &self.curvature * &(params - &self.center)
    }
}

fn trajectory<G>(name: &str, source: &mut G, initial: &Array1<TensorData>, config: &OptimizeConfig) -> Vec<Array1<TensorData>>
where
    G: GradientSource<Array1<TensorData>>,
{
    let dataset = Dataset::new(arr1(&[0.0; 4]), arr1(&[0.0; 4])).unwrap();
    let mut history = History::new();
    build_optimizer(name)
        .unwrap()
        .optimize(
            &dataset,
            initial,
            source,
            config,
            &mut StdRng::seed_from_u64(0),
            &mut history,
        )
        .unwrap();
    let mut snapshots = vec![initial.clone()];
    snapshots.extend(history.into_snapshots());
    snapshots
}

#[test]
fn adagrad_steps_shrink_under_constant_gradient() {
    let config = OptimizeConfig::new().learning_rate(0.5).max_num_epoch(20).batch_size(4);
    let path = trajectory("adagrad", &mut Constant(arr1(&[2.0, -0.5])), &arr1(&[0.0, 0.0]), &config);
    let steps: Vec<TensorData> = path.windows(2).map(|w| (&w[1] - &w[0]).mapv(f64::abs).sum()).collect();
    assert_eq!(steps.len(), 20);
    for pair in steps.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-12, "step grew: {} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn momentum_overtakes_plain_descent_on_a_shallow_valley() {
    let config = OptimizeConfig::new()
        .learning_rate(0.01)
        .max_num_epoch(50)
        .batch_fraction(Some(1.0))
        .momentum_decay(0.9);
    let problem = || Quadratic {
        curvature: arr1(&[0.1, 0.1]),
        center: arr1(&[5.0, -5.0]),
    };
    let start = arr1(&[0.0, 0.0]);
    let plain = trajectory("full_batch", &mut problem(), &start, &config);
    let heavy = trajectory("momentum", &mut problem(), &start, &config);
    let quad = problem();
    assert!(quad.loss(heavy.last().unwrap()) < quad.loss(plain.last().unwrap()));
}

#[test]
fn adam_first_step_has_learning_rate_magnitude() {
    let config = OptimizeConfig::new().learning_rate(0.1).max_num_epoch(1).batch_size(4);
    let path = trajectory("adam", &mut Constant(arr1(&[3.0, -0.001])), &arr1(&[0.0, 0.0]), &config);
    let moved = &path[1] - &path[0];
    approx::assert_abs_diff_eq!(moved[0], -0.1, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(moved[1], 0.1, epsilon = 1e-4);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn full_batch_loss_never_increases(
        curvature in prop::collection::vec(0.1f64..10.0, 1..6),
        offset in prop::collection::vec(-10.0f64..10.0, 6),
    ) {
        let dim = curvature.len();
        let max_curvature = curvature.iter().cloned().fold(0.0, f64::max);
        let mut problem = Quadratic {
            curvature: Array1::from(curvature),
            center: Array1::from(offset[..dim].to_vec()),
        };
        let config = OptimizeConfig::new()
            .learning_rate(0.5 / max_curvature)
            .max_num_epoch(25)
            .batch_fraction(Some(1.0));
        let path = trajectory("full_batch", &mut problem, &Array1::zeros(dim), &config);
        let losses: Vec<TensorData> = path.iter().map(|p| problem.loss(p)).collect();
        for pair in losses.windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1e-9, "loss rose: {} -> {}", pair[0], pair[1]);
        }
    }
}
