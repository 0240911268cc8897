//! Deterministic shuffled train/test split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices for the training and test sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows: `ceil(n * fraction)`.
pub fn test_size(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).ceil() as usize).min(n)
}

/// Shuffle `0..n` with a seeded RNG; the first `test_size` indices form the test set.
pub fn train_test_split(n: usize, fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_size(n, fraction));
    Split {
        train,
        test: indices,
    }
}
