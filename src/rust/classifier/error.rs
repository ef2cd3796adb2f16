/// Represents the different types of errors that can occur in the text classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    /// Error occurred while fitting the vectorizer or the classifier
    #[error("Build error: {0}")]
    BuildError(String),
    /// Error occurred while making predictions
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Model state is internally inconsistent (e.g. a tampered artifact)
    #[error("Model error: {0}")]
    ModelError(String),
}
