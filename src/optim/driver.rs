//! # Epoch Driver
//!
//! Shared outer loop of every algorithm: shuffle (optionally), cut the data into
//! contiguous batches, ask the gradient source for a gradient at the current
//! parameters, hand it to the update rule, report once per epoch.

use super::{BatchPlan, GradientSource, OptimError, StepState, UpdateRule};
use crate::data::Dataset;
use crate::tensor::ParameterState;
use crate::utils::progress::{EpochReport, ProgressSink};
use rand::seq::SliceRandom;
use rand::Rng;
use std::borrow::Cow;

/// Everything one run needs apart from its collaborators.
pub(crate) struct Run<'a, P> {
    pub dataset: &'a Dataset,
    pub plan: BatchPlan,
    pub max_num_epoch: usize,
    pub shuffle: bool,
    pub state: StepState<P>,
}

impl<'a, P: ParameterState> Run<'a, P> {
    /// Runs the epoch loop on a copy of `initial` and returns the final parameters.
    ///
    /// The first gradient whose layout differs from the parameters aborts the
    /// run with `ShapeMismatch`; `initial` is never modified.
    pub(crate) fn execute<G, R, S>(
        mut self,
        initial: &P,
        source: &mut G,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<P, OptimError>
    where
        G: GradientSource<P> + ?Sized,
        R: Rng + ?Sized,
        S: ProgressSink<P> + ?Sized,
    {
        let mut params = initial.clone();
        let BatchPlan {
            batch_size,
            iterations_per_epoch,
        } = self.plan;

        tracing::debug!(
            algorithm = %self.state.algorithm(),
            learning_rate = self.state.learning_rate(),
            parameters = params.num_elements(),
            samples = self.dataset.len(),
            batch_size,
            iterations_per_epoch,
            epochs = self.max_num_epoch,
            shuffle = self.shuffle,
            "starting optimization"
        );
        if iterations_per_epoch == 0 && self.max_num_epoch > 0 {
            tracing::warn!(
                samples = self.dataset.len(),
                batch_size,
                "batch is larger than the dataset, no updates will be made"
            );
        }

        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        let mut steps = 0usize;

        for epoch in 0..self.max_num_epoch {
            let epoch_data: Cow<'_, Dataset> = if self.shuffle {
                order.shuffle(rng);
                Cow::Owned(self.dataset.permuted(&order))
            } else {
                Cow::Borrowed(self.dataset)
            };

            for idx in 0..iterations_per_epoch {
                let Some((inputs, targets)) = epoch_data.batch(idx, batch_size) else {
                    break;
                };
                let gradient = source.gradient(inputs, targets, &params);
                self.state.step(&mut params, &gradient)?;
                steps += 1;
                tracing::trace!(epoch, batch = idx, steps, "step");
            }

            sink.on_epoch(&EpochReport {
                epoch,
                steps,
                params: &params,
            });
            if sink.should_stop() {
                tracing::debug!(epoch, steps, "stop requested by progress sink");
                break;
            }
        }

        tracing::debug!(steps, "optimization finished");
        Ok(params)
    }
}
