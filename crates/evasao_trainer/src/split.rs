//! Stratified train/test split

use crate::deterministic::LcgRng;

/// Sample indices of the two partitions, each in ascending order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split so that both partitions keep the class proportions of `labels`.
///
/// Each class is shuffled with its own LCG stream derived from `seed` and
/// contributes `round(n_class * test_size)` samples to the test side.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> TrainTestSplit {
    let test_size = test_size.clamp(0.0, 1.0);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();

        let mut rng = LcgRng::new(seed.wrapping_add(class as u64));
        rng.shuffle(&mut members);

        let n_test = (members.len() as f64 * test_size).round() as usize;
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    TrainTestSplit { train, test }
}

/// Rows of `values` at `indices`
pub fn select<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}
