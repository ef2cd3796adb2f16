//! The categorization facade: keyword override first, then the statistical
//! model, with lazy training and persistence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};

use crate::classifier::{ClassifierError, ConfidenceScores, TextClassifier};
use crate::config::{ArtifactPolicy, CategorizerConfig};
use crate::corpus::training_examples;
use crate::keywords::KeywordOverride;
use crate::model_manager::{ModelError, ModelStore};
use crate::Category;

#[derive(Debug, thiserror::Error)]
pub enum CategorizerError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Why a prediction fell back to [`Category::FALLBACK`]
#[derive(Debug, Clone, PartialEq)]
pub enum DegradeReason {
    /// The description was empty after trimming
    EmptyInput,
    /// Training or classification failed
    ModelFailure(String),
}

/// Outcome of [`Categorizer::predict`]. Always carries a usable category.
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Classified(Category),
    Degraded { category: Category, reason: DegradeReason },
}

impl Prediction {
    pub fn category(&self) -> Category {
        match self {
            Self::Classified(category) => *category,
            Self::Degraded { category, .. } => *category,
        }
    }

    /// Label string stored with the expense
    pub fn label(&self) -> &'static str {
        self.category().as_str()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    fn degraded(reason: DegradeReason) -> Self {
        Self::Degraded {
            category: Category::FALLBACK,
            reason,
        }
    }
}

/// Observable lifecycle of the active model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    Unloaded,
    Training,
    Loaded,
}

enum ModelState {
    Unloaded,
    Training,
    Loaded(Arc<TextClassifier>),
}

impl ModelState {
    fn status(&self) -> ModelStatus {
        match self {
            Self::Unloaded => ModelStatus::Unloaded,
            Self::Training => ModelStatus::Training,
            Self::Loaded(_) => ModelStatus::Loaded,
        }
    }
}

/// Expense categorizer shared by request handlers.
///
/// Construction attempts to load the saved model; otherwise the model stays
/// unloaded until the first [`train`](Categorizer::train) or the first
/// prediction that needs it. Exactly one thread trains at a time: others
/// asking for the model while it trains wait for the result.
pub struct Categorizer {
    config: CategorizerConfig,
    store: ModelStore,
    keywords: KeywordOverride,
    state: Mutex<ModelState>,
    state_changed: Condvar,
    training_runs: AtomicUsize,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Categorizer>();
    }
};

impl Categorizer {
    /// Creates a categorizer, loading the saved model if one exists
    ///
    /// # Errors
    /// Only with [`ArtifactPolicy::FailFast`], when a saved model exists but
    /// cannot be read.
    pub fn new(config: CategorizerConfig) -> Result<Self, CategorizerError> {
        let store = ModelStore::new(&config.model_path);
        let state = if store.exists() {
            match store.load() {
                Ok(model) => ModelState::Loaded(Arc::new(model)),
                Err(e) if config.artifact_policy == ArtifactPolicy::Retrain => {
                    warn!("Ignoring unreadable model at {:?}, will retrain: {}", store.path(), e);
                    ModelState::Unloaded
                }
                Err(e) => {
                    error!("Failed to load model from {:?}: {}", store.path(), e);
                    return Err(e.into());
                }
            }
        } else {
            info!("No saved model at {:?}; training deferred until first use", store.path());
            ModelState::Unloaded
        };

        Ok(Self {
            config,
            store,
            keywords: KeywordOverride::default(),
            state: Mutex::new(state),
            state_changed: Condvar::new(),
            training_runs: AtomicUsize::new(0),
        })
    }

    /// Replaces the keyword rules applied before the model
    pub fn with_keywords(mut self, keywords: KeywordOverride) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn config(&self) -> &CategorizerConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn status(&self) -> ModelStatus {
        self.lock_state().status()
    }

    /// Number of training passes this instance has completed
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    /// The fixed category list for manual selection
    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    /// Categorizes an expense description. Never fails: problems produce a
    /// [`Prediction::Degraded`] carrying [`Category::FALLBACK`].
    pub fn predict(&self, description: &str) -> Prediction {
        let text = normalize(description);
        if text.is_empty() {
            return Prediction::degraded(DegradeReason::EmptyInput);
        }
        if let Some(category) = self.keywords.check(&text) {
            return Prediction::Classified(category);
        }

        let result = self
            .ensure_trained()
            .and_then(|model| model.predict(&text).map_err(CategorizerError::from));
        match result {
            Ok(category) => Prediction::Classified(category),
            Err(e) => {
                error!("Prediction error for '{}': {}", text, e);
                Prediction::degraded(DegradeReason::ModelFailure(e.to_string()))
            }
        }
    }

    /// Scores all five categories with the statistical model. Keyword rules
    /// do not apply here.
    pub fn predict_with_confidence(&self, description: &str) -> Result<ConfidenceScores, CategorizerError> {
        let text = normalize(description);
        let model = self.ensure_trained()?;
        Ok(model.predict_with_confidence(&text)?)
    }

    /// Retrains from the built-in corpus and overwrites the saved model.
    ///
    /// If saving fails the new model is still active and the error is
    /// returned.
    pub fn train(&self) -> Result<(), CategorizerError> {
        let previous = {
            let mut state = self.lock_state();
            while matches!(*state, ModelState::Training) {
                state = self.wait(state);
            }
            std::mem::replace(&mut *state, ModelState::Training)
        };
        let (_, saved) = self.run_training(previous)?;
        saved.map_err(CategorizerError::from)
    }

    /// Returns the active model, training it first if none is loaded
    pub fn ensure_trained(&self) -> Result<Arc<TextClassifier>, CategorizerError> {
        {
            let mut state = self.lock_state();
            loop {
                if let ModelState::Loaded(model) = &*state {
                    return Ok(Arc::clone(model));
                }
                if !matches!(*state, ModelState::Training) {
                    break;
                }
                state = self.wait(state);
            }
            *state = ModelState::Training;
        }

        info!("No model loaded; training before first prediction");
        let (model, saved) = self.run_training(ModelState::Unloaded)?;
        if let Err(e) = saved {
            warn!("Model trained but could not be saved: {}", e);
        }
        Ok(model)
    }

    /// Fits and persists a model. The caller has already moved the state to
    /// `Training`; `previous` is restored if fitting fails or panics.
    fn run_training(
        &self,
        previous: ModelState,
    ) -> Result<(Arc<TextClassifier>, Result<(), ModelError>), CategorizerError> {
        let guard = TrainingGuard::new(self, previous);
        let fitted = TextClassifier::builder()
            .with_vectorizer_config(self.config.vectorizer.clone())
            .with_smoothing(self.config.smoothing)
            .add_examples(training_examples())
            .and_then(|builder| builder.build());

        let model = match fitted {
            Ok(model) => Arc::new(model),
            Err(e) => {
                error!("Training failed: {}", e);
                return Err(e.into());
            }
        };

        // Still marked Training, so no other writer touches the file.
        let saved = self.store.save(&model);
        if let Err(e) = &saved {
            error!("Failed to save model to {:?}: {}", self.store.path(), e);
        }

        self.training_runs.fetch_add(1, Ordering::SeqCst);
        guard.finish(ModelState::Loaded(Arc::clone(&model)));
        Ok((model, saved))
    }

    fn lock_state(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, ModelState>) -> MutexGuard<'a, ModelState> {
        self.state_changed.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves the `Training` state on every exit from a training run, including
/// unwinding, and wakes the threads waiting on it.
struct TrainingGuard<'a> {
    categorizer: &'a Categorizer,
    next: Option<ModelState>,
}

impl<'a> TrainingGuard<'a> {
    fn new(categorizer: &'a Categorizer, previous: ModelState) -> Self {
        Self { categorizer, next: Some(previous) }
    }

    fn finish(mut self, state: ModelState) {
        self.next = Some(state);
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.next.take() {
            *self.categorizer.lock_state() = state;
        }
        self.categorizer.state_changed.notify_all();
    }
}

fn normalize(description: &str) -> String {
    description.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categorizer() -> (tempfile::TempDir, Categorizer) {
        let dir = tempfile::tempdir().unwrap();
        let config = CategorizerConfig::with_model_path(dir.path().join("model.bin"));
        (dir, Categorizer::new(config).unwrap())
    }

    #[test]
    fn test_empty_input_is_degraded_without_training() {
        let (_dir, categorizer) = categorizer();
        for text in ["", "   ", "\t\n"] {
            let prediction = categorizer.predict(text);
            assert_eq!(prediction, Prediction::degraded(DegradeReason::EmptyInput));
            assert_eq!(prediction.label(), "Shopping");
        }
        assert_eq!(categorizer.status(), ModelStatus::Unloaded);
        assert_eq!(categorizer.training_runs(), 0);
    }

    #[test]
    fn test_keyword_hit_skips_training() {
        let (_dir, categorizer) = categorizer();
        assert_eq!(categorizer.predict("  Popcorn at the CINEMA "), Prediction::Classified(Category::Food));
        assert_eq!(categorizer.status(), ModelStatus::Unloaded);
    }

    #[test]
    fn test_first_prediction_trains_and_saves() {
        let (_dir, categorizer) = categorizer();
        assert_eq!(categorizer.predict("uber ride to airport"), Prediction::Classified(Category::Travel));
        assert_eq!(categorizer.status(), ModelStatus::Loaded);
        assert_eq!(categorizer.training_runs(), 1);
        assert!(categorizer.store().exists());

        categorizer.predict("taxi fare");
        assert_eq!(categorizer.training_runs(), 1);
    }

    #[test]
    fn test_training_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CategorizerConfig::with_model_path(dir.path().join("model.bin"));
        config.smoothing = -1.0;
        let categorizer = Categorizer::new(config).unwrap();

        let prediction = categorizer.predict("uber ride");
        assert!(prediction.is_degraded());
        assert_eq!(prediction.category(), Category::Shopping);
        assert!(matches!(
            prediction,
            Prediction::Degraded { reason: DegradeReason::ModelFailure(_), .. }
        ));
        assert_eq!(categorizer.status(), ModelStatus::Unloaded);
        assert!(categorizer.train().is_err());
        assert_eq!(categorizer.status(), ModelStatus::Unloaded);
    }

    #[test]
    fn test_panic_during_training_restores_state() {
        let (_dir, categorizer) = categorizer();
        *categorizer.lock_state() = ModelState::Training;

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TrainingGuard::new(&categorizer, ModelState::Unloaded);
            panic!("fit blew up");
        }));
        assert!(result.is_err());
        assert_eq!(categorizer.status(), ModelStatus::Unloaded);

        // Waiters are not stuck behind a stale Training state.
        assert_eq!(categorizer.predict("uber ride"), Prediction::Classified(Category::Travel));
        assert_eq!(categorizer.training_runs(), 1);
    }

    #[test]
    fn test_save_failure_keeps_model() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the rename fail.
        let path = dir.path().join("model.bin");
        std::fs::create_dir_all(path.join("occupied")).unwrap();
        let categorizer = Categorizer::new(CategorizerConfig {
            artifact_policy: ArtifactPolicy::Retrain,
            ..CategorizerConfig::with_model_path(&path)
        })
        .unwrap();

        assert!(matches!(categorizer.train(), Err(CategorizerError::Model(_))));
        assert_eq!(categorizer.status(), ModelStatus::Loaded);
        assert_eq!(categorizer.predict("bus ticket"), Prediction::Classified(Category::Travel));
    }
}
