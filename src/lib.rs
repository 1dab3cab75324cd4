//! # Descent Core Library
//!
//! This crate provides gradient-based optimizers for fitting parametric models
//! (from a single weight vector to a multi-layer network's named tensors) to
//! data: plain stochastic / mini-batch / full-batch descent, momentum, Adagrad,
//! RMSProp and Adam.
//!
//! The caller supplies the dataset, the initial parameters and a
//! [`GradientSource`](optim::GradientSource); the optimizer owns batching,
//! shuffling and accumulator state for the duration of one `optimize` call.
//!
//! ```ignore
//! use descent_lib::prelude::*;
//!
//! let optimizer = build_optimizer("adam")?;
//! let config = OptimizeConfig::new().learning_rate(0.05).max_num_epoch(200);
//! let fitted = optimizer.optimize_seeded(&dataset, &initial, &mut source, &config, 42)?;
//! ```

pub mod data;
pub mod optim;
pub mod tensor;
pub mod utils;

pub mod prelude {
    pub use crate::data::{Dataset, IntoSamples};
    pub use crate::optim::{
        build_optimizer, gradient_fn, Algorithm, BatchPlan, GradientSource, OptimError,
        OptimizeConfig, Optimizer, UpdateRule,
    };
    pub use crate::tensor::{named, ParameterState, TensorData, TensorError};
    pub use crate::utils::progress::{
        progress_fn, CancelToken, EpochReport, History, NoProgress, ProgressSink, TracingProgress,
    };
}
