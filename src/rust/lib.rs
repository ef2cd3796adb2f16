//! Expense categorization for a personal finance tracker.
//!
//! A description is first checked against keyword rules, then classified by a
//! TF-IDF + multinomial naive Bayes model trained on a fixed corpus.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use spendwise::{Categorizer, CategorizerConfig, Category};
//!
//! let dir = tempfile::tempdir()?;
//! let categorizer = Categorizer::new(CategorizerConfig::with_model_path(dir.path().join("model.bin")))?;
//!
//! let prediction = categorizer.predict("uber ride to airport");
//! assert_eq!(prediction.category(), Category::Travel);
//!
//! let scores = categorizer.predict_with_confidence("uber ride to airport")?;
//! println!("Travel: {:.2}%", scores.get(Category::Travel));
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! [`Categorizer`] is `Send + Sync`. Share it with `Arc`; concurrent first
//! predictions train the model once.

pub mod category;
pub mod classifier;
pub mod categorizer;
pub mod config;
pub mod corpus;
pub mod keywords;
pub mod ledger;
pub mod model_manager;

pub use category::{Category, ParseCategoryError};
pub use classifier::{ClassifierError, ClassifierInfo, ConfidenceScores, TextClassifier, TextClassifierBuilder};
pub use categorizer::{Categorizer, CategorizerError, DegradeReason, ModelStatus, Prediction};
pub use config::{ArtifactPolicy, CategorizerConfig, VectorizerConfig};
pub use corpus::{training_examples, TrainingExample};
pub use keywords::{KeywordOverride, KeywordRule};
pub use ledger::{CategoryTotal, Expense, ExpenseError, SpendingSummary};
pub use model_manager::{ModelError, ModelStore};

pub fn init_logger() {
    env_logger::init();
}
