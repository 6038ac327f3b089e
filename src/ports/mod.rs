//! Ports layer: Trait definitions for external collaborators.
//!
//! The classifier is an opaque, pre-fitted artifact; the application only
//! sees it through [`RiskClassifier`].

mod classifier;

pub use classifier::RiskClassifier;
pub(crate) use classifier::numeric_input;
