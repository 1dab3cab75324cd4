//! # Datasets (`data`)
//!
//! Holds the `(inputs, targets)` pair an optimizer iterates over, the coercion
//! of caller-side tables into two-dimensional sample matrices, and the
//! row-permutation / contiguous batch slicing the epoch driver relies on.

use crate::tensor::{TensorData, TensorError};
use ndarray::{s, Array1, Array2, ArrayD, ArrayView2, Axis, Ix2};

/// Conversion of tabular data into a `(samples, features)` matrix.
///
/// A single column always becomes an `N x 1` column vector, never a bare
/// one-dimensional sequence, so that batch slicing along the first axis is
/// uniform for inputs and targets.
pub trait IntoSamples {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError>;
}

impl IntoSamples for Array2<TensorData> {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError> {
        Ok(self)
    }
}

impl IntoSamples for Array1<TensorData> {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError> {
        let rows = self.len();
        Ok(self.into_shape((rows, 1))?)
    }
}

impl IntoSamples for ArrayD<TensorData> {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError> {
        match self.ndim() {
            1 => {
                let rows = self.len();
                Ok(self.into_shape((rows, 1))?)
            }
            2 => Ok(self.into_dimensionality::<Ix2>()?),
            rank => Err(TensorError::UnsupportedRank {
                rank,
                shape: self.shape().to_vec(),
            }),
        }
    }
}

impl IntoSamples for Vec<TensorData> {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError> {
        Array1::from(self).into_samples()
    }
}

/// Row-major table: one inner `Vec` per sample. Ragged rows are rejected.
impl IntoSamples for Vec<Vec<TensorData>> {
    fn into_samples(self) -> Result<Array2<TensorData>, TensorError> {
        let rows = self.len();
        let cols = self.first().map_or(0, Vec::len);
        if let Some(bad) = self.iter().find(|row| row.len() != cols) {
            return Err(TensorError::ShapeMismatch {
                expected: vec![rows, cols],
                got: vec![rows, bad.len()],
            });
        }
        let flat: Vec<TensorData> = self.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((rows, cols), flat)?)
    }
}

/// # Dataset
///
/// Immutable pair of sample matrices sharing their leading dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    inputs: Array2<TensorData>,
    targets: Array2<TensorData>,
}

impl Dataset {
    /// Builds a dataset, coercing both sides to two dimensions.
    ///
    /// Fails if inputs and targets disagree on the number of samples.
    pub fn new<X, Y>(inputs: X, targets: Y) -> Result<Self, TensorError>
    where
        X: IntoSamples,
        Y: IntoSamples,
    {
        let inputs = inputs.into_samples()?;
        let targets = targets.into_samples()?;
        if inputs.nrows() != targets.nrows() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![inputs.nrows(), targets.ncols()],
                got: targets.shape().to_vec(),
            });
        }
        Ok(Dataset { inputs, targets })
    }

    /// Number of samples `N`.
    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn inputs(&self) -> &Array2<TensorData> {
        &self.inputs
    }

    pub fn targets(&self) -> &Array2<TensorData> {
        &self.targets
    }

    /// Returns an owned copy with rows reordered by `order`.
    ///
    /// `order` must be a permutation of `0..len()`.
    pub fn permuted(&self, order: &[usize]) -> Dataset {
        Dataset {
            inputs: self.inputs.select(Axis(0), order),
            targets: self.targets.select(Axis(0), order),
        }
    }

    /// Views the `index`-th contiguous batch of `batch_size` rows.
    ///
    /// Returns `None` when the batch would run past the last full row.
    pub fn batch(
        &self,
        index: usize,
        batch_size: usize,
    ) -> Option<(ArrayView2<'_, TensorData>, ArrayView2<'_, TensorData>)> {
        let start = index.checked_mul(batch_size)?;
        let end = start.checked_add(batch_size)?;
        if end > self.len() {
            return None;
        }
        Some((
            self.inputs.slice(s![start..end, ..]),
            self.targets.slice(s![start..end, ..]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD, IxDyn};

    #[test]
    fn single_column_becomes_column_vector() {
        let ds = Dataset::new(arr1(&[1.0, 2.0, 3.0]), vec![4.0, 5.0, 6.0]).unwrap();
        assert_eq!(ds.inputs().shape(), &[3, 1]);
        assert_eq!(ds.targets().shape(), &[3, 1]);
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn row_major_table_is_converted() {
        let table = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let ds = Dataset::new(table, arr1(&[0.0, 1.0])).unwrap();
        assert_eq!(ds.inputs(), &arr2(&[[1.0, 2.0], [3.0, 4.0]]));
    }

    #[test]
    fn ragged_table_is_rejected() {
        let table = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            table.into_samples(),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn three_dimensional_input_is_rejected() {
        let cube = ArrayD::<TensorData>::zeros(IxDyn(&[2, 2, 2]));
        assert_eq!(
            cube.into_samples().unwrap_err(),
            TensorError::UnsupportedRank { rank: 3, shape: vec![2, 2, 2] }
        );
    }

    #[test]
    fn scalar_input_is_rejected() {
        let scalar = ArrayD::<TensorData>::zeros(IxDyn(&[]));
        assert_eq!(
            scalar.into_samples().unwrap_err(),
            TensorError::UnsupportedRank { rank: 0, shape: vec![] }
        );
    }

    #[test]
    fn sample_count_must_agree() {
        let err = Dataset::new(arr1(&[1.0, 2.0]), arr1(&[1.0])).unwrap_err();
        assert!(matches!(err, TensorError::ShapeMismatch { .. }));
    }

    #[test]
    fn permuted_copies_and_leaves_original_alone() {
        let ds = Dataset::new(arr1(&[1.0, 2.0, 3.0]), arr1(&[10.0, 20.0, 30.0])).unwrap();
        let shuffled = ds.permuted(&[2, 0, 1]);
        assert_eq!(shuffled.inputs().column(0).to_vec(), vec![3.0, 1.0, 2.0]);
        assert_eq!(shuffled.targets().column(0).to_vec(), vec![30.0, 10.0, 20.0]);
        assert_eq!(ds.inputs().column(0).to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn batch_drops_trailing_partial_rows() {
        let ds = Dataset::new(arr1(&[1.0, 2.0, 3.0, 4.0, 5.0]), arr1(&[0.0; 5])).unwrap();
        let (x, _) = ds.batch(1, 2).unwrap();
        assert_eq!(x.column(0).to_vec(), vec![3.0, 4.0]);
        assert!(ds.batch(2, 2).is_none());
    }
}
