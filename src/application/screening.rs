//! Screening service: encode → classify → recommend.
//!
//! The service holds an immutable [`ModelContext`] built once at startup and
//! shared by every request; nothing on the request path mutates it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adapters::LoadedModel;
use crate::domain::{
    encode, recommend, unmapped_fields, FeatureSchema, FeatureVector, PredictionResult,
    RiskLevel, SurveyResponse, UnknownCategoryPolicy,
};
use crate::ports::RiskClassifier;
use crate::{HarborError, Result};

/// The loaded classifier and everything needed to feed it.
pub struct ModelContext {
    classifier: Arc<dyn RiskClassifier>,
    schema: FeatureSchema,
    policy: UnknownCategoryPolicy,
    loaded_at: DateTime<Utc>,
    artifact_sha256: Option<String>,
}

impl ModelContext {
    /// Pair a classifier with its schema.
    ///
    /// # Errors
    /// Returns error if the schema is not the classifier's feature list.
    pub fn new(
        classifier: Arc<dyn RiskClassifier>,
        schema: FeatureSchema,
        policy: UnknownCategoryPolicy,
    ) -> Result<Self> {
        if schema.columns() != classifier.feature_names() {
            return Err(HarborError::Startup(format!(
                "schema has {} columns but {} expects {} features",
                schema.len(),
                classifier.model_type(),
                classifier.feature_names().len()
            )));
        }

        Ok(Self {
            classifier,
            schema,
            policy,
            loaded_at: Utc::now(),
            artifact_sha256: None,
        })
    }

    /// Context for an artifact produced by [`crate::adapters::load_model_dir`].
    ///
    /// # Errors
    /// Returns error if the schema is not the classifier's feature list.
    pub fn from_loaded(
        loaded: LoadedModel,
        policy: UnknownCategoryPolicy,
    ) -> Result<Self> {
        let mut context = Self::new(loaded.classifier, loaded.schema, policy)?;
        context.artifact_sha256 = Some(loaded.artifact_sha256);
        Ok(context)
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }
}

/// Read-only description of the loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub classes: [u8; 2],
    pub loaded_at: DateTime<Utc>,
    pub artifact_sha256: Option<String>,
    pub unknown_category_policy: UnknownCategoryPolicy,
}

/// Service for running risk screenings.
#[derive(Clone, Default)]
pub struct ScreeningService {
    model: Option<Arc<ModelContext>>,
}

impl ScreeningService {
    /// Create a service over a loaded model.
    #[must_use]
    pub fn new(context: ModelContext) -> Self {
        Self {
            model: Some(Arc::new(context)),
        }
    }

    /// A service with no model; every prediction fails with `ModelNotLoaded`.
    #[must_use]
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn context(&self) -> Result<&ModelContext> {
        self.model.as_deref().ok_or(HarborError::ModelNotLoaded)
    }

    /// Encode a response against the loaded schema, applying the
    /// unknown-category policy.
    ///
    /// # Errors
    /// Returns `ModelNotLoaded` without a model, or `Validation` when the
    /// policy is `Reject` and an answer has no ordinal code.
    pub fn encode(&self, response: &SurveyResponse) -> Result<FeatureVector> {
        let ctx = self.context()?;

        let unmapped = unmapped_fields(response);
        if !unmapped.is_empty() {
            let fields: Vec<&str> = unmapped.iter().map(|(f, _)| f.column()).collect();
            match ctx.policy {
                UnknownCategoryPolicy::Reject => {
                    return Err(HarborError::Validation(format!(
                        "unrecognized answer for {}",
                        fields.join(", ")
                    )));
                }
                UnknownCategoryPolicy::Passthrough => {
                    tracing::warn!(
                        "Passing unrecognized answers through unencoded: {}",
                        fields.join(", ")
                    );
                }
            }
        }

        Ok(encode(response, &ctx.schema))
    }

    /// Run the full screening pipeline for one response.
    ///
    /// # Errors
    /// Returns error if no model is loaded, the response is rejected by the
    /// unknown-category policy, or the classifier cannot score the vector.
    pub fn predict(&self, response: &SurveyResponse) -> Result<PredictionResult> {
        let features = self.encode(response)?;
        let classifier = &self.context()?.classifier;

        tracing::debug!("Encoded {} features", features.len());

        let label = classifier.predict(&features)?;
        let probabilities = classifier.predict_probability(&features)?;
        let confidence_score = probabilities.confidence();
        let risk_level = RiskLevel::from_label(label);

        let recommendations = recommend(label, response);

        tracing::info!(
            "Prediction: {}, Risk Level: {}, Confidence: {:.3}",
            label,
            risk_level,
            confidence_score
        );

        Ok(PredictionResult {
            prediction: label,
            risk_level,
            confidence_score,
            recommendations: recommendations.messages,
            urgent_care_needed: recommendations.urgent_care,
        })
    }

    /// Describe the loaded model.
    ///
    /// # Errors
    /// Returns `ModelNotLoaded` without a model.
    pub fn model_info(&self) -> Result<ModelInfo> {
        let ctx = self.context()?;
        Ok(ModelInfo {
            model_type: ctx.classifier.model_type().to_string(),
            n_features: ctx.schema.len(),
            feature_names: ctx.schema.columns().to_vec(),
            classes: ctx.classifier.classes(),
            loaded_at: ctx.loaded_at,
            artifact_sha256: ctx.artifact_sha256.clone(),
            unknown_category_policy: ctx.policy,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::domain::fixtures::{calm_response, sample_response};
    use crate::domain::{ClassProbabilities, ClassifierError};

    #[test]
    fn test_unloaded_service() {
        let service = ScreeningService::unloaded();
        assert!(!service.is_loaded());
        assert!(matches!(
            service.predict(&sample_response()),
            Err(HarborError::ModelNotLoaded)
        ));
        assert!(matches!(service.model_info(), Err(HarborError::ModelNotLoaded)));
    }

    #[test]
    fn test_low_risk_prediction() {
        let service = service(UnknownCategoryPolicy::Passthrough);
        let result = service.predict(&calm_response()).expect("predict");

        assert_eq!(result.prediction, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(!result.urgent_care_needed);
        assert_eq!(result.recommendations.len(), 3);
    }

    #[test]
    fn test_high_risk_prediction() {
        let service = service(UnknownCategoryPolicy::Passthrough);
        let mut response = sample_response();
        response.suicidal_thoughts = "Always".into();

        let result = service.predict(&response).expect("predict");

        assert_eq!(result.prediction, 1);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.urgent_care_needed);
        // crisis (4) + stress + mood tracking + general (3)
        assert_eq!(result.recommendations.len(), 9);
    }

    #[test]
    fn test_confidence_matches_classifier() {
        let service = service(UnknownCategoryPolicy::Passthrough);
        let response = sample_response();
        let features = service.encode(&response).expect("encode");
        let probs: ClassProbabilities = screening_model()
            .predict_probability(&features)
            .expect("probs");

        let result = service.predict(&response).expect("predict");
        assert!((result.confidence_score - probs.confidence()).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&result.confidence_score));
    }

    #[test]
    fn test_prediction_is_idempotent() {
        let service = service(UnknownCategoryPolicy::Passthrough);
        let response = sample_response();
        assert_eq!(
            service.predict(&response).expect("first"),
            service.predict(&response).expect("second")
        );
    }

    #[test]
    fn test_passthrough_surfaces_as_inference_failure() {
        let service = service(UnknownCategoryPolicy::Passthrough);
        let mut response = sample_response();
        response.gender = "Agender".into();

        let features = service.encode(&response).expect("encode is total");
        assert_eq!(features.text_columns(), vec!["gender"]);

        assert!(matches!(
            service.predict(&response),
            Err(HarborError::Inference(ClassifierError::NonNumeric(_)))
        ));
    }

    #[test]
    fn test_reject_policy_fails_validation() {
        let service = service(UnknownCategoryPolicy::Reject);
        let mut response = sample_response();
        response.stress_level = "Extreme".into();

        match service.predict(&response) {
            Err(HarborError::Validation(msg)) => {
                assert!(msg.contains("stressLevel"));
                assert!(!msg.contains("Extreme"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(service.predict(&sample_response()).is_ok());
    }

    #[test]
    fn test_model_info() {
        let info = service(UnknownCategoryPolicy::Reject)
            .model_info()
            .expect("info");
        assert_eq!(info.model_type, "LogisticRegression");
        assert_eq!(info.n_features, form_columns().len());
        assert_eq!(info.feature_names, form_columns());
        assert_eq!(info.classes, [0, 1]);
        assert_eq!(info.unknown_category_policy, UnknownCategoryPolicy::Reject);
    }

    #[test]
    fn test_context_rejects_schema_mismatch() {
        let schema = FeatureSchema::new(["age"]).expect("schema");
        assert!(matches!(
            ModelContext::new(
                Arc::new(screening_model()),
                schema,
                UnknownCategoryPolicy::Passthrough
            ),
            Err(HarborError::Startup(_))
        ));
    }
}
