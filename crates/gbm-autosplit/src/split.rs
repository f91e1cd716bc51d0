//! Random train/validation partitioning.
//!
//! A [`Partition`] is a pair of disjoint index lists covering `0..n`. The
//! random source is owned by a [`Splitter`], so reproducibility is a matter of
//! seeding it, not of global state.
//!
//! # Example
//!
//! ```
//! use gbm_autosplit::{RandomSplitter, split_xy};
//! use ndarray::{Array1, Array2};
//!
//! let x = Array2::<f64>::zeros((10, 3));
//! let y = Array1::<f64>::zeros(10);
//! let mut splitter = RandomSplitter::seeded(7);
//!
//! let split = split_xy(&mut splitter, x.view(), y.view(), 0.8).unwrap();
//! assert_eq!(split.x_train.nrows(), 8);
//! assert_eq!(split.x_val.nrows(), 2);
//! ```

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Result, ensure_rows};

/// Number of training rows for `n_samples` at `ratio`: `floor(ratio * n)`,
/// clamped into `0..=n_samples`.
#[must_use]
pub fn training_size(n_samples: usize, ratio: f64) -> usize {
    let size = (ratio * n_samples as f64).floor();
    if size.is_nan() || size <= 0.0 {
        0
    } else {
        (size as usize).min(n_samples)
    }
}

/// Disjoint training and validation row indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    training: Vec<usize>,
    validation: Vec<usize>,
}

impl Partition {
    /// Split a permutation of `0..n` after its first `n_training` entries.
    #[must_use]
    pub fn from_permutation(mut permutation: Vec<usize>, n_training: usize) -> Self {
        let validation = permutation.split_off(n_training.min(permutation.len()));
        Self {
            training: permutation,
            validation,
        }
    }

    #[must_use]
    pub fn training(&self) -> &[usize] {
        &self.training
    }

    #[must_use]
    pub fn validation(&self) -> &[usize] {
        &self.validation
    }

    /// Total number of rows covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.training.len() + self.validation.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Training rows of a row-aligned vector (labels, weights).
    #[must_use]
    pub fn select_training(&self, values: ArrayView1<'_, f64>) -> Array1<f64> {
        values.select(Axis(0), &self.training)
    }

    /// Validation rows of a row-aligned vector (labels, weights).
    #[must_use]
    pub fn select_validation(&self, values: ArrayView1<'_, f64>) -> Array1<f64> {
        values.select(Axis(0), &self.validation)
    }
}

/// Source of train/validation partitions.
pub trait Splitter {
    /// Partition `0..n_samples`, keeping `floor(training_ratio * n)` rows for
    /// training.
    fn partition(&mut self, n_samples: usize, training_ratio: f64) -> Partition;
}

impl<S: Splitter + ?Sized> Splitter for &mut S {
    fn partition(&mut self, n_samples: usize, training_ratio: f64) -> Partition {
        (**self).partition(n_samples, training_ratio)
    }
}

/// Uniform random permutation split.
#[derive(Debug, Clone)]
pub struct RandomSplitter<R = StdRng> {
    rng: R,
}

impl RandomSplitter<StdRng> {
    /// Non-reproducible splitter seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible splitter.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomSplitter<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> RandomSplitter<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Splitter for RandomSplitter<R> {
    fn partition(&mut self, n_samples: usize, training_ratio: f64) -> Partition {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut self.rng);
        Partition::from_permutation(indices, training_size(n_samples, training_ratio))
    }
}

/// Row-sliced training and validation data.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_val: Array2<f64>,
    pub y_val: Array1<f64>,
    /// The partition the arrays were sliced with.
    pub partition: Partition,
}

/// Randomly split `(x, y)` into training and validation subsets.
///
/// Feature rows keep their column order and stay paired with their labels.
///
/// # Errors
///
/// Returns [`AutoSplitError::ShapeMismatch`](crate::AutoSplitError::ShapeMismatch)
/// if `x` and `y` have different row counts.
pub fn split_xy<S: Splitter + ?Sized>(
    splitter: &mut S,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    training_ratio: f64,
) -> Result<SplitData> {
    ensure_rows("split_xy", x.nrows(), y.len())?;

    let partition = splitter.partition(x.nrows(), training_ratio);

    Ok(SplitData {
        x_train: x.select(Axis(0), partition.training()),
        y_train: partition.select_training(y),
        x_val: x.select(Axis(0), partition.validation()),
        y_val: partition.select_validation(y),
        partition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AutoSplitError;
    use ndarray::Array;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn dataset(n: usize, n_features: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, n_features), |(i, j)| (i * 100 + j) as f64);
        let y = Array::from_iter((0..n).map(|i| i as f64 * 0.5));
        (x, y)
    }

    #[test]
    fn test_training_size_floors() {
        assert_eq!(training_size(1000, 0.8), 800);
        assert_eq!(training_size(10, 0.75), 7);
        assert_eq!(training_size(10, 0.3), 3);
        assert_eq!(training_size(3, 0.5), 1);
        assert_eq!(training_size(0, 0.8), 0);
    }

    #[test]
    fn test_training_size_clamps_caller_errors() {
        assert_eq!(training_size(10, -0.5), 0);
        assert_eq!(training_size(10, 1.5), 10);
        assert_eq!(training_size(10, f64::NAN), 0);
    }

    #[test]
    fn test_partition_is_disjoint_and_covering() {
        let mut splitter = RandomSplitter::seeded(11);
        for (n, ratio) in [(1, 0.5), (2, 0.5), (17, 0.8), (100, 0.1), (1000, 0.8), (333, 0.999)] {
            let partition = splitter.partition(n, ratio);

            assert_eq!(partition.training().len(), training_size(n, ratio));
            assert_eq!(partition.len(), n);

            let training: HashSet<_> = partition.training().iter().copied().collect();
            let validation: HashSet<_> = partition.validation().iter().copied().collect();
            assert!(training.is_disjoint(&validation));

            let union: HashSet<_> = training.union(&validation).copied().collect();
            assert_eq!(union, (0..n).collect::<HashSet<_>>());
        }
    }

    #[test]
    fn test_seeded_splitter_is_reproducible() {
        let first = RandomSplitter::seeded(42).partition(50, 0.8);
        let second = RandomSplitter::seeded(42).partition(50, 0.8);
        assert_eq!(first, second);

        let other = RandomSplitter::seeded(43).partition(50, 0.8);
        assert_ne!(first, other);
    }

    #[test]
    fn test_split_preserves_row_correspondence() {
        let (x, y) = dataset(40, 3);
        let mut splitter = RandomSplitter::seeded(3);
        let split = split_xy(&mut splitter, x.view(), y.view(), 0.75).unwrap();

        assert_eq!(split.x_train.nrows(), 30);
        assert_eq!(split.x_val.nrows(), 10);
        assert_eq!(split.x_train.ncols(), 3);

        for (row, &i) in split.partition.training().iter().enumerate() {
            assert_eq!(split.x_train.row(row), x.row(i));
            assert_eq!(split.y_train[row], y[i]);
        }
        for (row, &i) in split.partition.validation().iter().enumerate() {
            assert_eq!(split.x_val.row(row), x.row(i));
            assert_eq!(split.y_val[row], y[i]);
        }
    }

    #[test]
    fn test_split_rejects_shape_mismatch() {
        let (x, _) = dataset(10, 2);
        let y = Array1::<f64>::zeros(9);
        let mut splitter = RandomSplitter::seeded(0);

        let err = split_xy(&mut splitter, x.view(), y.view(), 0.8).unwrap_err();
        assert!(matches!(
            err,
            AutoSplitError::ShapeMismatch {
                context: "split_xy",
                features: 10,
                labels: 9
            }
        ));
    }

    #[test]
    fn test_select_weights_follow_partition() {
        let weights = Array::from_iter((0..6).map(|i| i as f64));
        let partition = Partition::from_permutation(vec![5, 0, 3, 1, 4, 2], 4);

        assert_eq!(partition.select_training(weights.view()).to_vec(), vec![5.0, 0.0, 3.0, 1.0]);
        assert_eq!(partition.select_validation(weights.view()).to_vec(), vec![4.0, 2.0]);
    }
}
