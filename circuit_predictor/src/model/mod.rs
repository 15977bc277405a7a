//! Circuit classifier: the [`ProbabilisticClassifier`] seam and its random-forest
//! implementation.

pub mod dataset;
pub mod decision_tree;
pub mod random_forest;

use serde::Serialize;
use thiserror::Error;

use crate::features::FEATURE_NAMES;
use crate::labeling::{CircuitClass, LabeledRow};
use dataset::Dataset;
use random_forest::{ForestConfig, RandomForest};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("cannot train on an empty table")]
    EmptyTrainingSet,
}

/// A fitted classifier over circuit classes.
///
/// `predict_proba` returns one probability per entry of `classes()`, in the
/// same order. Only classes seen during training are listed.
pub trait ProbabilisticClassifier: Send + Sync {
    fn classes(&self) -> &[CircuitClass];
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;
}

/// Probabilities for all three outcomes. Classes the model never saw are 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CircuitProbabilities {
    pub lower: f64,
    pub none: f64,
    pub upper: f64,
}

impl CircuitProbabilities {
    pub fn predict<C: ProbabilisticClassifier + ?Sized>(model: &C, features: &[f64]) -> Self {
        let mut out = Self::default();
        for (class, p) in model.classes().iter().zip(model.predict_proba(features)) {
            match class {
                CircuitClass::Lower => out.lower = p,
                CircuitClass::None => out.none = p,
                CircuitClass::Upper => out.upper = p,
            }
        }
        out
    }

    /// Chance of hitting either circuit, as used for ranking.
    pub fn max_circuit(&self) -> f64 {
        self.upper.max(self.lower)
    }
}

/// Random forest over the classes present in its training rows.
#[derive(Debug, Clone)]
pub struct CircuitForest {
    classes: Vec<CircuitClass>,
    forest: RandomForest,
    holdout_accuracy: Option<f64>,
}

impl CircuitForest {
    /// Accuracy on the held-out split, if it was non-empty.
    pub fn holdout_accuracy(&self) -> Option<f64> {
        self.holdout_accuracy
    }
}

impl ProbabilisticClassifier for CircuitForest {
    fn classes(&self) -> &[CircuitClass] {
        &self.classes
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.forest.predict_proba_one(features)
    }
}

/// Splits `rows` with a seeded shuffle, fits a forest on the training part and
/// scores it on the rest.
///
/// The class list comes from the training part, so a class that only occurs in
/// the held-out rows is not predicted.
pub fn train_circuit_model(
    rows: &[LabeledRow],
    test_fraction: f64,
    config: &ForestConfig,
) -> Result<CircuitForest, ModelError> {
    if rows.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }

    let mut all = Dataset::new(CircuitClass::ALL.len());
    for row in rows {
        all.add_sample(row.features.vector().to_vec(), class_slot(row.circuit_target));
    }
    let (train, test) = all.train_test_split(test_fraction, config.seed);

    // Compact the label space to the classes actually seen in training.
    let mut seen = [false; 3];
    for &label in &train.labels {
        seen[label] = true;
    }
    let classes: Vec<CircuitClass> = CircuitClass::ALL
        .into_iter()
        .zip(seen)
        .filter_map(|(c, s)| s.then_some(c))
        .collect();
    let remap = |slot: usize| classes.iter().position(|c| class_slot(*c) == slot);

    // Rows whose class is not in `classes` are left out.
    let compact = |ds: &Dataset| {
        let mut out = Dataset::new(classes.len());
        for (features, &label) in ds.features.iter().zip(&ds.labels) {
            if let Some(idx) = remap(label) {
                out.add_sample(features.clone(), idx);
            }
        }
        out
    };
    let train_set = compact(&train);
    let test_set = compact(&test);

    let mut forest = RandomForest::new(config.clone());
    forest.fit(&train_set);

    // Held-out rows with an unseen class count as misses.
    let holdout_accuracy = (!test.is_empty()).then(|| {
        let hits = forest.accuracy(&test_set).unwrap_or(0.0) * test_set.n_samples() as f64;
        hits / test.n_samples() as f64
    });

    let importances: Vec<String> = FEATURE_NAMES
        .iter()
        .zip(forest.feature_importances())
        .map(|(name, imp)| format!("{name}={imp:.3}"))
        .collect();

    tracing::debug!(
        train_rows = train_set.n_samples(),
        test_rows = test.n_samples(),
        classes = ?classes,
        holdout_accuracy = ?holdout_accuracy,
        importances = %importances.join(" "),
        "trained circuit forest"
    );

    Ok(CircuitForest {
        classes,
        forest,
        holdout_accuracy,
    })
}

fn class_slot(class: CircuitClass) -> usize {
    (class.value() + 1) as usize
}
