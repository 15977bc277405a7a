//! CART classification tree with Gini impurity.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree
    pub max_depth: usize,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Class frequencies of the training samples that reached this leaf.
        class_probs: Vec<f64>,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
    gain: f64,
}

/// Decision Tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    n_classes: usize,
    root: Option<TreeNode>,
    feature_importances: Vec<f64>,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            n_classes: 0,
            root: None,
            feature_importances: Vec::new(),
        }
    }

    /// Train the decision tree
    pub fn fit(&mut self, dataset: &Dataset) {
        self.n_classes = dataset.n_classes;
        self.feature_importances = vec![0.0; dataset.n_features()];

        if dataset.is_empty() {
            self.root = None;
            return;
        }

        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.root = Some(self.build_tree(dataset, &indices, 0, &mut rng));

        // Normalize feature importances
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build_tree(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let counts = class_counts(dataset, indices);
        let impurity = gini(&counts, indices.len());

        if depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split
            || impurity < 1e-12
        {
            return self.leaf(&counts, indices.len());
        }

        match self.find_best_split(dataset, indices, impurity, rng) {
            Some(split) if !split.left.is_empty() && !split.right.is_empty() => {
                self.feature_importances[split.feature_idx] += split.gain * indices.len() as f64;

                let left = self.build_tree(dataset, &split.left, depth + 1, rng);
                let right = self.build_tree(dataset, &split.right, depth + 1, rng);

                TreeNode::Split {
                    feature_idx: split.feature_idx,
                    threshold: split.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            _ => self.leaf(&counts, indices.len()),
        }
    }

    fn leaf(&self, counts: &[usize], n: usize) -> TreeNode {
        if n == 0 {
            return TreeNode::Leaf {
                class_probs: uniform(self.n_classes),
            };
        }
        let class_probs = counts.iter().map(|&c| c as f64 / n as f64).collect();
        TreeNode::Leaf { class_probs }
    }

    /// Sorted sweep over a random subset of features.
    ///
    /// Candidate thresholds are midpoints between consecutive distinct values; a
    /// split is only accepted if both sides keep `min_samples_leaf` samples and the
    /// Gini gain is strictly positive.
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n_features = dataset.n_features();
        let max_features = self.config.max_features.unwrap_or(n_features).clamp(1, n_features);

        let mut feature_indices: Vec<usize> = (0..n_features).collect();
        feature_indices.shuffle(rng);
        feature_indices.truncate(max_features);

        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<(usize, f64, f64)> = None;

        for &feature_idx in &feature_indices {
            let mut column: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (dataset.features[i][feature_idx], dataset.labels[i]))
                .collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total = class_counts(dataset, indices);
            let mut left_counts = vec![0usize; dataset.n_classes];

            for pos in 0..n - 1 {
                left_counts[column[pos].1] += 1;
                if column[pos].0 == column[pos + 1].0 {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_counts: Vec<usize> = total
                    .iter()
                    .zip(&left_counts)
                    .map(|(t, l)| t - l)
                    .collect();
                let weighted = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.map(|b| b.2).unwrap_or(0.0) {
                    let (lo, hi) = (column[pos].0, column[pos + 1].0);
                    // The midpoint of adjacent floats can round up to `hi`.
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some((feature_idx, threshold, gain));
                }
            }
        }

        best.map(|(feature_idx, threshold, gain)| {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| dataset.features[i][feature_idx] <= threshold);
            BestSplit {
                feature_idx,
                threshold,
                left,
                right,
                gain,
            }
        })
    }

    /// Predict class probabilities for a single sample
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        let mut node = match &self.root {
            Some(node) => node,
            None => return uniform(self.n_classes),
        };

        loop {
            match node {
                TreeNode::Leaf { class_probs } => return class_probs.clone(),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}

fn class_counts(dataset: &Dataset, indices: &[usize]) -> Vec<usize> {
    let mut counts = vec![0usize; dataset.n_classes];
    for &i in indices {
        counts[dataset.labels[i]] += 1;
    }
    counts
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn uniform(n_classes: usize) -> Vec<f64> {
    if n_classes == 0 {
        return Vec::new();
    }
    vec![1.0 / n_classes as f64; n_classes]
}

/// Index of the largest value; ties go to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0
}
