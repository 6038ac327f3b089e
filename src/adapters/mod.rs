//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: logistic regression over exported coefficients
//! - `forest`: random forest over exported node arrays
//! - `artifact`: model directory loading and integrity checks
//! - `sanitize`: sensitive-data filtering for logs

pub mod artifact;
pub mod forest;
pub mod logistic;
pub mod sanitize;

pub use artifact::{load_model_dir, ArtifactError, LoadOptions, LoadedModel};
