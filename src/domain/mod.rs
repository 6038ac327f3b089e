//! Domain layer: Core screening types and logic.
//!
//! Pure Rust types with no I/O. Encoding and recommendation are total
//! functions over a well-formed survey response.

pub mod encoder;
mod prediction;
pub mod recommendation;
mod schema;
mod survey;

pub use encoder::{encode, unmapped_fields, UnknownCategoryPolicy};
pub use prediction::{ClassProbabilities, ClassifierError, PredictionResult, RiskLevel};
pub use recommendation::{recommend, Recommendations};
pub use schema::{FeatureSchema, FeatureValue, FeatureVector, NonNumericFeature, SchemaError};
pub use survey::{concern_column, slug, SurveyField, SurveyResponse, AI_CONCERNS};

#[cfg(test)]
pub(crate) use survey::fixtures;
