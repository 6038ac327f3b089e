//! Model artifact loading.
//!
//! A model directory holds:
//! - `model.json`: the fitted classifier, tagged by `model_type`
//! - `model_columns.json` (optional): the ordered training columns
//! - `manifest.json` (optional): SHA-256 of every file above
//!
//! Loading either succeeds completely or fails; callers must not serve
//! predictions without a loaded model.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestClassifier, RandomForestModel};
use super::logistic::{LogisticClassifier, LogisticRegressionModel};
use crate::domain::{FeatureSchema, SchemaError};
use crate::ports::RiskClassifier;

pub const MODEL_FILE: &str = "model.json";
pub const COLUMNS_FILE: &str = "model_columns.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors loading a model directory.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model directory {0:?} does not exist")]
    MissingDir(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid model in {path:?}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },

    #[error("Invalid feature schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("model_columns.json does not match the model's feature names: {0}")]
    SchemaMismatch(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("File hash mismatch for {0}")]
    HashMismatch(String),
}

/// Supported classifier families, keyed by `model_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegressionModel),
    RandomForest(RandomForestModel),
}

impl ModelArtifact {
    fn into_classifier(self) -> Result<Arc<dyn RiskClassifier>, String> {
        let classifier: Arc<dyn RiskClassifier> = match self {
            Self::LogisticRegression(m) => Arc::new(LogisticClassifier::new(m)?),
            Self::RandomForest(m) => Arc::new(ForestClassifier::new(m)?),
        };
        Ok(classifier)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    files: BTreeMap<String, String>,
}

/// Loader switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Refuse directories without `manifest.json`.
    pub require_manifest: bool,
}

/// A classifier together with the schema its inputs must follow.
#[derive(Clone)]
pub struct LoadedModel {
    pub classifier: Arc<dyn RiskClassifier>,
    pub schema: FeatureSchema,
    /// SHA-256 of `model.json`, hex encoded.
    pub artifact_sha256: String,
    pub source: PathBuf,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model_type", &self.classifier.model_type())
            .field("n_features", &self.schema.len())
            .field("artifact_sha256", &self.artifact_sha256)
            .field("source", &self.source)
            .finish()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn is_plain_file_name(rel: &str) -> bool {
    let mut components = Path::new(rel).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Check `manifest.json`, if present. Files already read for loading are
/// hashed from `loaded`, so the verified bytes are the ones parsed.
fn verify_manifest(
    dir: &Path,
    options: &LoadOptions,
    loaded: &BTreeMap<&str, &[u8]>,
) -> Result<(), ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        if options.require_manifest {
            return Err(ArtifactError::Manifest(format!(
                "{MANIFEST_FILE} is required but missing in {dir:?}"
            )));
        }
        tracing::warn!("No {MANIFEST_FILE} in {:?}; artifact integrity not verified", dir);
        return Ok(());
    }

    let manifest: Manifest = parse(&manifest_path, &read(&manifest_path)?)?;
    if manifest.version != 1 {
        return Err(ArtifactError::Manifest(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    if !manifest.files.contains_key(MODEL_FILE) {
        return Err(ArtifactError::Manifest(format!(
            "{MANIFEST_FILE} must list {MODEL_FILE}"
        )));
    }
    if loaded.contains_key(COLUMNS_FILE) && !manifest.files.contains_key(COLUMNS_FILE) {
        return Err(ArtifactError::Manifest(format!(
            "{COLUMNS_FILE} is present but not listed in {MANIFEST_FILE}"
        )));
    }

    for (rel, expected) in &manifest.files {
        if !is_plain_file_name(rel) {
            return Err(ArtifactError::Manifest(format!(
                "manifest entry {rel:?} must be a plain file name"
            )));
        }
        let actual = match loaded.get(rel.as_str()) {
            Some(bytes) => sha256_hex(bytes),
            None => sha256_hex(&read(&dir.join(rel))?),
        };
        if !constant_time_eq_str(&actual, &expected.to_ascii_lowercase()) {
            return Err(ArtifactError::HashMismatch(rel.clone()));
        }
    }

    tracing::info!("Verified {} artifact hashes from {MANIFEST_FILE}", manifest.files.len());
    Ok(())
}

/// Load and validate the classifier and schema in `dir`.
///
/// # Errors
/// Returns error if any file is missing, unreadable, malformed, fails its
/// manifest hash, or if the column list disagrees with the model.
pub fn load_model_dir(dir: &Path, options: &LoadOptions) -> Result<LoadedModel, ArtifactError> {
    if !dir.is_dir() {
        return Err(ArtifactError::MissingDir(dir.to_path_buf()));
    }

    let model_path = dir.join(MODEL_FILE);
    let model_bytes = read(&model_path)?;
    let columns_path = dir.join(COLUMNS_FILE);
    let columns_bytes = if columns_path.exists() {
        Some(read(&columns_path)?)
    } else {
        None
    };

    let mut loaded_files: BTreeMap<&str, &[u8]> = BTreeMap::new();
    loaded_files.insert(MODEL_FILE, &model_bytes);
    if let Some(bytes) = &columns_bytes {
        loaded_files.insert(COLUMNS_FILE, bytes);
    }
    verify_manifest(dir, options, &loaded_files)?;

    let artifact: ModelArtifact = parse(&model_path, &model_bytes)?;
    let classifier = artifact
        .into_classifier()
        .map_err(|reason| ArtifactError::InvalidModel {
            path: model_path.clone(),
            reason,
        })?;

    let schema = if let Some(bytes) = &columns_bytes {
        let columns: Vec<String> = parse(&columns_path, bytes)?;
        if columns.as_slice() != classifier.feature_names() {
            return Err(ArtifactError::SchemaMismatch(format!(
                "{} columns vs {} model features",
                columns.len(),
                classifier.feature_names().len()
            )));
        }
        FeatureSchema::new(columns)?
    } else {
        FeatureSchema::new(classifier.feature_names().iter().cloned())?
    };

    let loaded = LoadedModel {
        classifier,
        schema,
        artifact_sha256: sha256_hex(&model_bytes),
        source: dir.to_path_buf(),
    };

    tracing::info!(
        "Loaded {} from {:?} ({} features)",
        loaded.classifier.model_type(),
        model_path,
        loaded.schema.len()
    );
    Ok(loaded)
}
