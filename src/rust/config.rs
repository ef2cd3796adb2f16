use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model_manager::ModelStore;

/// Feature extraction settings for the TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    pub max_features: usize,
    /// Inclusive (min, max) n-gram lengths
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    pub english_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_range: (1, 2),
            lowercase: true,
            english_stop_words: true,
        }
    }
}

/// What to do when a persisted artifact exists but cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactPolicy {
    /// Log the problem, treat the artifact as absent and retrain on demand
    #[default]
    Retrain,
    /// Refuse to construct the categorizer
    FailFast,
}

#[derive(Debug, Clone)]
pub struct CategorizerConfig {
    pub model_path: PathBuf,
    pub vectorizer: VectorizerConfig,
    /// Additive smoothing constant of the naive Bayes classifier
    pub smoothing: f64,
    pub artifact_policy: ArtifactPolicy,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self::with_model_path(ModelStore::default_model_path())
    }
}

impl CategorizerConfig {
    /// Default configuration with the artifact stored at `path`
    pub fn with_model_path(path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: path.into(),
            vectorizer: VectorizerConfig::default(),
            smoothing: 0.1,
            artifact_policy: ArtifactPolicy::default(),
        }
    }

    pub fn artifact_policy(mut self, policy: ArtifactPolicy) -> Self {
        self.artifact_policy = policy;
        self
    }
}
