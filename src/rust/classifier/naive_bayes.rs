use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use crate::Category;

/// Multinomial naive Bayes over non-negative feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    smoothing: f64,
    classes: Vec<Category>,
    class_log_prior: Array1<f64>,
    /// Shape: (classes, features)
    feature_log_prob: Array2<f64>,
}

impl MultinomialNb {
    /// Fits the classifier; row `i` of `features` is labelled `labels[i]`.
    pub fn fit(features: &Array2<f64>, labels: &[Category], smoothing: f64) -> Result<Self, ClassifierError> {
        if features.nrows() != labels.len() {
            return Err(ClassifierError::BuildError(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        if labels.is_empty() {
            return Err(ClassifierError::BuildError("Cannot fit on zero examples".into()));
        }

        let classes: Vec<Category> = Category::ALL
            .iter()
            .copied()
            .filter(|c| labels.contains(c))
            .collect();
        let n_features = features.ncols();

        let mut class_counts = Array1::<f64>::zeros(classes.len());
        let mut feature_counts = Array2::<f64>::zeros((classes.len(), n_features));
        for (row, label) in features.rows().into_iter().zip(labels) {
            // labels are drawn from `classes`, so the position always exists
            let Some(ci) = classes.iter().position(|c| c == label) else { continue };
            class_counts[ci] += 1.0;
            let mut counts = feature_counts.row_mut(ci);
            counts += &row;
        }

        let total = labels.len() as f64;
        let class_log_prior = class_counts.mapv(|count| (count / total).ln());

        let smoothed = feature_counts.mapv(|c| c + smoothing);
        let denominators = smoothed.sum_axis(Axis(1));
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut row, denom) in feature_log_prob.rows_mut().into_iter().zip(denominators.iter()) {
            row -= denom.ln();
        }

        Ok(Self {
            smoothing,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[Category] {
        &self.classes
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    /// Unnormalized log posterior per class
    pub fn joint_log_likelihood(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        if x.len() != self.n_features() {
            return Err(ClassifierError::PredictionError(format!(
                "Expected {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        Ok(self.feature_log_prob.dot(&x) + &self.class_log_prior)
    }

    /// Posterior probabilities, aligned with [`MultinomialNb::classes`]
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        let jll = self.joint_log_likelihood(x)?;
        let max = jll.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
        let exp = jll.mapv(|v| (v - max).exp());
        let sum = exp.sum();
        Ok(exp / sum)
    }

    /// Most probable class; ties go to the class listed first
    pub fn predict(&self, x: ArrayView1<f64>) -> Result<Category, ClassifierError> {
        let jll = self.joint_log_likelihood(x)?;
        let mut best: Option<(usize, f64)> = None;
        for (i, &score) in jll.iter().enumerate() {
            if score.is_nan() {
                return Err(ClassifierError::PredictionError("Posterior is NaN".into()));
            }
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| self.classes[i])
            .ok_or_else(|| ClassifierError::PredictionError("Classifier has no classes".into()))
    }

    pub(crate) fn validate(&self) -> Result<(), ClassifierError> {
        if self.classes.is_empty() {
            return Err(ClassifierError::ModelError("Classifier has no classes".into()));
        }
        if self.class_log_prior.len() != self.classes.len() || self.feature_log_prob.nrows() != self.classes.len() {
            return Err(ClassifierError::ModelError("Class count does not match model parameters".into()));
        }
        Ok(())
    }
}
