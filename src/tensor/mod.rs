//! # Tensor Module
//!
//! This module defines the numeric substrate the optimizers work on: the
//! scalar type, shape errors, and the `ParameterState` capability that lets an
//! update rule treat a single array and a map of named arrays the same way.

use ndarray::{Array, Dimension, Zip};
use std::collections::BTreeMap;

// --- Error Handling ---
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error("Key mismatch: expected tensors {expected:?}, got {got:?}")]
    KeyMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("Expected a 1-D or 2-D array, got {rank}-D with shape {shape:?}")]
    UnsupportedRank { rank: usize, shape: Vec<usize> },
    #[error("ndarray error: {0}")]
    NdarrayError(#[from] ndarray::ShapeError),
}

// Define a type alias for the underlying data type
pub type TensorData = f64;

/// # ParameterState
///
/// Anything an optimizer can descend on: a tensor, or a structured collection
/// of tensors (e.g. the weights and biases of every layer of a network).
///
/// Update rules only ever need three things from a parameter state: a zeroed
/// accumulator of the same layout, a layout check against an incoming gradient,
/// and a lock-step elementwise walk over two states of identical layout.
pub trait ParameterState: Clone {
    /// Returns a state with the same layout, every element set to zero.
    fn zeros_like(&self) -> Self;

    /// Fails with `TensorError` if `other` does not have exactly this layout.
    fn check_layout(&self, other: &Self) -> Result<(), TensorError>;

    /// Applies `f(self_elem, other_elem)` to every pair of corresponding elements.
    ///
    /// Callers must have checked the layout first; mismatched layouts are
    /// skipped element-wise rather than panicking.
    fn zip_update<F>(&mut self, other: &Self, f: F)
    where
        F: FnMut(&mut TensorData, TensorData);

    /// Total number of scalar elements.
    fn num_elements(&self) -> usize;

    /// Applies `f` to every element in place.
    fn update_each<F>(&mut self, f: F)
    where
        F: FnMut(&mut TensorData);
}

impl<D: Dimension> ParameterState for Array<TensorData, D> {
    fn zeros_like(&self) -> Self {
        Array::zeros(self.raw_dim())
    }

    fn check_layout(&self, other: &Self) -> Result<(), TensorError> {
        if self.shape() != other.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape().to_vec(),
                got: other.shape().to_vec(),
            });
        }
        Ok(())
    }

    fn zip_update<F>(&mut self, other: &Self, mut f: F)
    where
        F: FnMut(&mut TensorData, TensorData),
    {
        if self.shape() != other.shape() {
            return;
        }
        Zip::from(self).and(other).for_each(|a, &b| f(a, b));
    }

    fn num_elements(&self) -> usize {
        self.len()
    }

    fn update_each<F>(&mut self, f: F)
    where
        F: FnMut(&mut TensorData),
    {
        self.map_inplace(f);
    }
}

// Named tensors. BTreeMap keeps a deterministic walk order across states.
impl<P: ParameterState> ParameterState for BTreeMap<String, P> {
    fn zeros_like(&self) -> Self {
        self.iter()
            .map(|(name, tensor)| (name.clone(), tensor.zeros_like()))
            .collect()
    }

    fn check_layout(&self, other: &Self) -> Result<(), TensorError> {
        if !self.keys().eq(other.keys()) {
            return Err(TensorError::KeyMismatch {
                expected: self.keys().cloned().collect(),
                got: other.keys().cloned().collect(),
            });
        }
        for (mine, theirs) in self.values().zip(other.values()) {
            mine.check_layout(theirs)?;
        }
        Ok(())
    }

    fn zip_update<F>(&mut self, other: &Self, mut f: F)
    where
        F: FnMut(&mut TensorData, TensorData),
    {
        for (name, tensor) in self.iter_mut() {
            if let Some(theirs) = other.get(name) {
                tensor.zip_update(theirs, &mut f);
            }
        }
    }

    fn num_elements(&self) -> usize {
        self.values().map(ParameterState::num_elements).sum()
    }

    fn update_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut TensorData),
    {
        for tensor in self.values_mut() {
            tensor.update_each(&mut f);
        }
    }
}

// --- Helper functions ---

/// Helper to create a named-tensor parameter state from `(name, tensor)` pairs.
pub fn named<P, I, S>(tensors: I) -> BTreeMap<String, P>
where
    P: ParameterState,
    I: IntoIterator<Item = (S, P)>,
    S: Into<String>,
{
    tensors
        .into_iter()
        .map(|(name, tensor)| (name.into(), tensor))
        .collect()
}
