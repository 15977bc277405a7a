//! Dense training matrix plus the 80/20 split and bootstrap helpers.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Row-major feature matrix with integer class labels.
///
/// Labels are indices into the caller's class list, not raw class values, so a
/// tree can use them directly as histogram slots.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    pub n_classes: usize,
}

impl Dataset {
    pub fn new(n_classes: usize) -> Self {
        Self {
            features: Vec::new(),
            labels: Vec::new(),
            n_classes,
        }
    }

    pub fn add_sample(&mut self, features: Vec<f64>, label: usize) {
        debug_assert!(label < self.n_classes);
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.first().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            n_classes: self.n_classes,
        }
    }

    /// Sample `n` rows with replacement.
    pub fn bootstrap_sample(&self, seed: u64) -> Self {
        let n = self.n_samples();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        self.subset(&indices)
    }

    /// Shuffled train/test split.
    ///
    /// The test part holds `ceil(test_fraction * n)` rows. When that would leave
    /// the training part empty, everything goes to training and the test part is
    /// empty.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let n = self.n_samples();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let n_test = (test_fraction * n as f64).ceil() as usize;
        if n_test >= n {
            return (self.clone(), Self::new(self.n_classes));
        }

        let (test_idx, train_idx) = indices.split_at(n_test);
        (self.subset(train_idx), self.subset(test_idx))
    }
}
