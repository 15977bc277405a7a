//! Bagged ensemble of Gini trees with averaged class probabilities.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::dataset::Dataset;
use super::decision_tree::{DecisionTree, TreeConfig, argmax};

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features tried per split (sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    n_classes: usize,
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            n_classes: 0,
            trees: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the random forest
    pub fn fit(&mut self, dataset: &Dataset) {
        self.n_classes = dataset.n_classes;
        let n_features = dataset.n_features();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize);

        // Build trees in parallel
        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|i| {
                let seed = self.config.seed.wrapping_add(i as u64);
                let mut tree = DecisionTree::new(TreeConfig {
                    max_depth: self.config.max_depth,
                    min_samples_split: self.config.min_samples_split,
                    min_samples_leaf: self.config.min_samples_leaf,
                    max_features: Some(max_features),
                    seed,
                });

                if self.config.bootstrap {
                    tree.fit(&dataset.bootstrap_sample(seed));
                } else {
                    tree.fit(dataset);
                }
                tree
            })
            .collect();
        self.trees = trees;

        self.feature_importances = vec![0.0; n_features];
        for tree in &self.trees {
            for (i, &imp) in tree.feature_importances().iter().enumerate() {
                self.feature_importances[i] += imp;
            }
        }
        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    /// Mean of the per-tree leaf distributions, one entry per class index.
    pub fn predict_proba_one(&self, features: &[f64]) -> Vec<f64> {
        if self.trees.is_empty() {
            return vec![0.0; self.n_classes];
        }

        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba_one(features)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        sum.iter_mut().for_each(|p| *p /= n);
        sum
    }

    pub fn predict_one(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba_one(features))
    }

    /// Fraction of rows whose most probable class matches the label.
    pub fn accuracy(&self, dataset: &Dataset) -> Option<f64> {
        if dataset.is_empty() {
            return None;
        }
        let correct = dataset
            .features
            .par_iter()
            .zip(dataset.labels.par_iter())
            .filter(|(f, l)| self.predict_one(f) == **l)
            .count();
        Some(correct as f64 / dataset.n_samples() as f64)
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
