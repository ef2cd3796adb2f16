use std::time::Instant;

use log::{error, info};

use super::classifier::TextClassifier;
use super::error::ClassifierError;
use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use crate::config::VectorizerConfig;
use crate::corpus::TrainingExample;
use crate::Category;

/// A builder for fitting a [`TextClassifier`] with a fluent interface.
#[derive(Debug, Clone)]
pub struct TextClassifierBuilder {
    vectorizer_config: VectorizerConfig,
    smoothing: f64,
    descriptions: Vec<String>,
    labels: Vec<Category>,
}

impl Default for TextClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextClassifierBuilder {
    /// Creates a new empty builder with the default configuration
    ///
    /// # Example
    /// ```
    /// use spendwise::TextClassifierBuilder;
    ///
    /// let builder = TextClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            vectorizer_config: VectorizerConfig::default(),
            smoothing: 0.1,
            descriptions: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Sets the feature extraction configuration
    pub fn with_vectorizer_config(mut self, config: VectorizerConfig) -> Self {
        self.vectorizer_config = config;
        self
    }

    /// Sets the additive smoothing constant (must be positive)
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Adds one labelled example
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder, or a `ValidationError`
    ///   if the description is blank
    ///
    /// # Example
    /// ```
    /// use spendwise::{Category, TextClassifier, TrainingExample};
    ///
    /// let builder = TextClassifier::builder()
    ///     .add_example(TrainingExample::new("taxi fare", Category::Travel));
    /// assert!(builder.is_ok());
    /// ```
    pub fn add_example(mut self, example: TrainingExample) -> Result<Self, ClassifierError> {
        if example.description.trim().is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Example {} cannot be empty",
                self.descriptions.len() + 1
            )));
        }
        self.descriptions.push(example.description);
        self.labels.push(example.category);
        Ok(self)
    }

    /// Adds every example in order, stopping at the first invalid one
    pub fn add_examples(
        self,
        examples: impl IntoIterator<Item = TrainingExample>,
    ) -> Result<Self, ClassifierError> {
        examples.into_iter().try_fold(self, |builder, example| builder.add_example(example))
    }

    fn validate_config(&self) -> Result<(), ClassifierError> {
        if !self.smoothing.is_finite() || self.smoothing <= 0.0 {
            return Err(ClassifierError::ValidationError(format!(
                "Smoothing must be a positive number, got {}",
                self.smoothing
            )));
        }
        if self.vectorizer_config.max_features == 0 {
            return Err(ClassifierError::ValidationError("max_features must be at least 1".into()));
        }
        let (min_n, max_n) = self.vectorizer_config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::ValidationError(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        Ok(())
    }

    /// Fits the vectorizer, then the classifier on the vectorized examples
    ///
    /// # Returns
    /// * `Result<TextClassifier, ClassifierError>` - The fitted classifier, or an error if:
    ///   - No examples have been added
    ///   - The configuration is invalid
    ///   - The examples produce an empty vocabulary
    pub fn build(self) -> Result<TextClassifier, ClassifierError> {
        self.validate_config()?;
        if self.descriptions.is_empty() {
            return Err(ClassifierError::BuildError("At least one example must be added".into()));
        }

        let start = Instant::now();
        let (vectorizer, features) = TfidfVectorizer::fit_transform(self.vectorizer_config, &self.descriptions)
            .map_err(|e| {
                error!("Failed to fit vectorizer: {}", e);
                e
            })?;
        let model = MultinomialNb::fit(&features, &self.labels, self.smoothing)?;

        let classifier = TextClassifier { vectorizer, model };
        classifier.validate()?;
        info!(
            "Trained classifier on {} examples ({} features, {} classes) in {:.2?}",
            self.descriptions.len(),
            classifier.vectorizer.vocabulary_size(),
            classifier.model.classes().len(),
            start.elapsed()
        );
        Ok(classifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_example_rejected() {
        let result = TextClassifier::builder().add_example(TrainingExample::new("   ", Category::Food));
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_build_without_examples() {
        let result = TextClassifier::builder().build();
        assert!(matches!(result, Err(ClassifierError::BuildError(_))));
    }

    #[test]
    fn test_config_validation() -> Result<(), ClassifierError> {
        let example = TrainingExample::new("taxi fare", Category::Travel);

        let result = TextClassifier::builder()
            .with_smoothing(0.0)
            .add_example(example.clone())?
            .build();
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));

        let result = TextClassifier::builder()
            .with_vectorizer_config(VectorizerConfig { ngram_range: (2, 1), ..VectorizerConfig::default() })
            .add_example(example)?
            .build();
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
        Ok(())
    }

    #[test]
    fn test_custom_examples() -> Result<(), ClassifierError> {
        let classifier = TextClassifier::builder()
            .with_smoothing(1.0)
            .add_example(TrainingExample::new("football game", Category::Entertainment))?
            .add_example(TrainingExample::new("python textbook", Category::Shopping))?
            .build()?;

        assert_eq!(classifier.predict("saturday football")?, Category::Entertainment);
        assert_eq!(classifier.info().num_classes, 2);
        let scores = classifier.predict_with_confidence("python")?;
        assert_eq!(scores.get(Category::Food), 0.0);
        assert!(scores.get(Category::Shopping) > scores.get(Category::Entertainment));
        Ok(())
    }
}
