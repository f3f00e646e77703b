//! Seeded Train/Test Split

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Shuffle `0..n` and split it into `(train, test)` index sets.
///
/// The test side gets `ceil(n * test_ratio)` rows, clamped so both sides keep
/// at least one row when `n >= 2`.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    if n < 2 {
        return (indices, Vec::new());
    }

    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let ratio = if test_ratio.is_finite() { test_ratio.clamp(0.0, 1.0) } else { 0.2 };
    let n_test = ((n as f64 * ratio).ceil() as usize).clamp(1, n - 1);
    let train = indices.split_off(n_test);
    (train, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sizes_and_disjoint() {
        let (train, test) = train_test_split(100, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        let all: HashSet<usize> = train.iter().chain(&test).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 42));
        assert_ne!(train_test_split(50, 0.2, 42), train_test_split(50, 0.2, 43));
    }

    #[test]
    fn test_tiny_inputs() {
        let (train, test) = train_test_split(2, 0.2, 42);
        assert_eq!((train.len(), test.len()), (1, 1));

        let (train, test) = train_test_split(3, 0.99, 42);
        assert_eq!((train.len(), test.len()), (1, 2));

        let (train, test) = train_test_split(1, 0.2, 42);
        assert_eq!((train.len(), test.len()), (1, 0));
    }
}
