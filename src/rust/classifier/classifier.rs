use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use crate::corpus::TrainingExample;
use crate::Category;

/// Posterior probability of every category as a percentage rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores(BTreeMap<Category, f64>);

impl ConfidenceScores {
    pub fn get(&self, category: Category) -> f64 {
        self.0.get(&category).copied().unwrap_or(0.0)
    }

    /// Scores in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.0.iter().map(|(c, p)| (*c, *p))
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Category with the highest score, earliest category on ties
    pub fn best(&self) -> Category {
        self.iter()
            .fold(None, |best: Option<(Category, f64)>, (c, p)| match best {
                Some((_, b)) if b >= p => best,
                _ => Some((c, p)),
            })
            .map(|(c, _)| c)
            .unwrap_or(Category::FALLBACK)
    }

    pub fn into_inner(self) -> BTreeMap<Category, f64> {
        self.0
    }
}

/// A fitted TF-IDF + multinomial naive Bayes pipeline.
///
/// Instances only exist in a trained state: they come out of
/// [`TextClassifierBuilder::build`](super::builder::TextClassifierBuilder::build)
/// or are deserialized from a saved artifact. The type is immutable after
/// construction and therefore `Send + Sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClassifier {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) model: MultinomialNb,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<TextClassifier>();
    }
};

impl TextClassifier {
    /// Creates a new TextClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::TextClassifierBuilder {
        super::builder::TextClassifierBuilder::new()
    }

    /// Fits a classifier on `examples` with the default configuration
    pub fn train(examples: &[TrainingExample]) -> Result<Self, ClassifierError> {
        Self::builder().add_examples(examples.iter().cloned())?.build()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            smoothing: self.model.smoothing(),
            vectorizer: self.vectorizer.config().clone(),
        }
    }

    /// Predicts the most probable category of `text`.
    ///
    /// Words outside the fitted vocabulary are ignored; text with no known
    /// words is classified on class priors alone.
    pub fn predict(&self, text: &str) -> Result<Category, ClassifierError> {
        let features = self.vectorizer.transform(text);
        let category = self.model.predict(features.view())?;
        debug!("Model classified '{}' as {}", text, category);
        Ok(category)
    }

    /// Scores every category, including ones absent from training (0.0)
    pub fn predict_with_confidence(&self, text: &str) -> Result<ConfidenceScores, ClassifierError> {
        let features = self.vectorizer.transform(text);
        let proba = self.model.predict_proba(features.view())?;

        let mut scores: BTreeMap<Category, f64> = Category::ALL.iter().map(|c| (*c, 0.0)).collect();
        for (category, p) in self.model.classes().iter().zip(proba.iter()) {
            scores.insert(*category, (p * 100.0 * 100.0).round() / 100.0);
        }
        Ok(ConfidenceScores(scores))
    }

    /// Checks that vectorizer and classifier agree on their dimensions
    pub fn validate(&self) -> Result<(), ClassifierError> {
        self.vectorizer.validate()?;
        self.model.validate()?;
        if self.model.n_features() != self.vectorizer.vocabulary_size() {
            return Err(ClassifierError::ModelError(format!(
                "Classifier expects {} features but vocabulary has {}",
                self.model.n_features(),
                self.vectorizer.vocabulary_size()
            )));
        }
        Ok(())
    }
}
