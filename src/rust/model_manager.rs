use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierError, TextClassifier};

const MAGIC: &[u8; 4] = b"SPWM";
const HASH_LEN: usize = 32;
const HEADER_LEN: usize = MAGIC.len() + HASH_LEN;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("No saved model at {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),
    #[error("Not a model artifact: {0}")]
    InvalidHeader(String),
    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("Saved model is inconsistent: {0}")]
    Invalid(#[from] ClassifierError),
}

/// Reads and writes the persisted model artifact.
///
/// Layout: `SPWM` magic, SHA-256 of the payload, bincode payload of the
/// fitted [`TextClassifier`]. There is no version field; an artifact from an
/// older corpus or configuration is simply replaced by the next training run.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a store at the default model path
    pub fn new_default() -> Self {
        Self::new(Self::default_model_path())
    }

    /// Returns the default artifact path
    pub fn default_model_path() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("SPENDWISE_MODEL_PATH") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("spendwise").join("expense_model.bin");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("spendwise").join("expense_model.bin");
        }

        // 4. If all else fails, use system temp directory
        env::temp_dir().join("spendwise").join("expense_model.bin")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the artifact, replacing any previous one
    pub fn save(&self, classifier: &TextClassifier) -> Result<(), ModelError> {
        let payload = bincode::serialize(classifier)?;
        let hash = Sha256::digest(&payload);

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&hash);
        bytes.extend_from_slice(&payload);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        log::info!("Saved model ({} bytes) to {:?}", bytes.len(), self.path);
        Ok(())
    }

    /// Reads, verifies and deserializes the artifact
    pub fn load(&self) -> Result<TextClassifier, ModelError> {
        if !self.exists() {
            return Err(ModelError::NotFound(self.path.clone()));
        }
        let bytes = fs::read(&self.path)?;
        let payload = Self::verified_payload(&bytes)?;
        let classifier: TextClassifier = bincode::deserialize(payload)?;
        classifier.validate()?;
        log::info!("Loaded model from {:?}", self.path);
        Ok(classifier)
    }

    /// Checks the artifact's header and hash without deserializing it
    pub fn verify(&self) -> Result<bool, ModelError> {
        if !self.exists() {
            log::info!("No model file at {:?}", self.path);
            return Ok(false);
        }
        let bytes = fs::read(&self.path)?;
        match Self::verified_payload(&bytes) {
            Ok(_) => Ok(true),
            Err(ModelError::InvalidHeader(_)) | Err(ModelError::HashMismatch { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn remove(&self) -> Result<(), ModelError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            log::info!("Removed model file {:?}", self.path);
        }
        Ok(())
    }

    fn verified_payload(bytes: &[u8]) -> Result<&[u8], ModelError> {
        if bytes.len() < HEADER_LEN {
            return Err(ModelError::InvalidHeader(format!("file is only {} bytes", bytes.len())));
        }
        let (header, payload) = bytes.split_at(HEADER_LEN);
        if &header[..MAGIC.len()] != MAGIC {
            return Err(ModelError::InvalidHeader("bad magic".into()));
        }
        let expected = hex(&header[MAGIC.len()..]);
        let actual = hex(&Sha256::digest(payload));
        if expected != actual {
            log::warn!("Model hash mismatch: expected {}, got {}", expected, actual);
            return Err(ModelError::HashMismatch { expected, actual });
        }
        Ok(payload)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
