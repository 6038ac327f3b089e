//! # Harbor Screen
//!
//! Mental-health risk screening for the wellbeing check-in form.
//!
//! This crate provides:
//! - Encoding of categorical survey answers into the feature vector a
//!   pre-fitted classifier expects
//! - Inference against a loaded classifier artifact
//! - Rule-based recommendations and an urgent-care flag
//! - A thin HTTP boundary (`/predict`, `/health`, `/model-info`)
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Survey, schema, encoder and recommendation rules
//! - `ports`: The classifier trait
//! - `adapters`: Classifier implementations, artifact loading, log sanitizing
//! - `application`: The screening use case over an immutable model context
//! - `api`: HTTP handlers
//! - `config`: Environment configuration

pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{FeatureSchema, FeatureVector, PredictionResult, RiskLevel, SurveyResponse};

/// Result type for screening operations
pub type Result<T> = std::result::Result<T, HarborError>;

/// Main error type for screening operations
#[derive(Debug, thiserror::Error)]
pub enum HarborError {
    #[error("Failed to load model: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("Invalid check-in: {0}")]
    Validation(String),

    #[error("{0}")]
    Inference(#[from] domain::ClassifierError),

    #[error("Configuration error: {0}")]
    Config(String),
}
