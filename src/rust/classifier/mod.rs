mod error;
mod naive_bayes;
mod vectorizer;
#[allow(clippy::module_inception)]
mod classifier;
pub mod builder;

pub use error::ClassifierError;
pub use classifier::{ConfidenceScores, TextClassifier};
pub use builder::TextClassifierBuilder;
pub use naive_bayes::MultinomialNb;
pub use vectorizer::{is_stop_word, TfidfVectorizer};

use crate::config::VectorizerConfig;
use crate::Category;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Number of classes the classifier is trained on
    pub num_classes: usize,
    /// Classes in category order
    pub class_labels: Vec<Category>,
    /// Number of n-gram features in the fitted vocabulary
    pub vocabulary_size: usize,
    /// Additive smoothing constant
    pub smoothing: f64,
    pub vectorizer: VectorizerConfig,
}
