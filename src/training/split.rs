//! Seeded, stratified train/test split

use crate::error::{PredictorError, Result};
use ndarray::Array1;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices on each side of a split, each in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so both sides keep the class balance of `labels`.
///
/// The test side holds `ceil(test_size * n)` rows, shared between classes in
/// proportion to their size (largest remainder first). Rows within a class are
/// picked by a shuffle seeded with `seed`, so the split is reproducible.
pub fn stratified_train_test_split(labels: &Array1<f64>, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PredictorError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be in (0, 1)".to_string(),
        });
    }

    let n = labels.len();
    let n_test = (test_size * n as f64).ceil() as usize;

    // Group indices by class label
    let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        class_indices.entry(label as i64).or_default().push(i);
    }

    let n_classes = class_indices.len();
    if n_test < n_classes || n - n_test < n_classes {
        return Err(PredictorError::DataError(format!(
            "cannot split {} rows with test_size {} across {} classes",
            n, test_size, n_classes
        )));
    }

    // Proportional allocation of the test rows
    let mut allocation: Vec<(i64, usize, f64)> = class_indices
        .iter()
        .map(|(&class, idx)| {
            let exact = n_test as f64 * idx.len() as f64 / n as f64;
            (class, exact.floor() as usize, exact - exact.floor())
        })
        .collect();
    let assigned: usize = allocation.iter().map(|(_, k, _)| k).sum();
    let mut by_remainder: Vec<usize> = (0..allocation.len()).collect();
    by_remainder.sort_by(|&a, &b| allocation[b].2.total_cmp(&allocation[a].2));
    for &slot in by_remainder.iter().take(n_test - assigned) {
        allocation[slot].1 += 1;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (class, class_test) in allocation.iter().map(|(c, k, _)| (*c, *k)) {
        let mut indices = class_indices[&class].clone();
        if class_test == 0 || class_test >= indices.len() {
            return Err(PredictorError::DataError(format!(
                "class {} has {} rows, too few to appear on both sides of the split",
                class,
                indices.len()
            )));
        }

        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..class_test]);
        train.extend_from_slice(&indices[class_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Boolean row mask selecting `indices` out of `n` rows
pub fn row_mask(indices: &[usize], n: usize) -> BooleanChunked {
    let mut mask = vec![false; n];
    for &i in indices {
        mask[i] = true;
    }
    BooleanChunked::from_slice("mask".into(), &mask)
}

/// Select the rows of `labels` at `indices`
pub fn take_labels(labels: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    indices.iter().map(|&i| labels[i]).collect()
}
