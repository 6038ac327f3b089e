//! Logistic regression adapter: RiskClassifier over exported coefficients.
//!
//! The artifact carries the fitted coefficients and, optionally, the
//! standard-scaler parameters applied before the linear term:
//! `z = intercept + Σ coef_i * (x_i - mean_i) / scale_i`, `P(1) = σ(z)`.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassProbabilities, ClassifierError, FeatureVector};
use crate::ports::{numeric_input, RiskClassifier};

fn default_threshold() -> f64 {
    0.5
}

/// Model parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegressionModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scaler_scale: Option<Vec<f64>>,
    /// Label 1 is predicted when `P(1)` is strictly above this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticRegressionModel {
    /// Shape and value checks.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.feature_names.len();
        if n == 0 {
            return Err("feature_names must not be empty".to_string());
        }
        if self.coefficients.len() != n {
            return Err(format!(
                "coefficients has {} entries, feature_names has {n}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("coefficients and intercept must be finite".to_string());
        }
        if let Some(mean) = &self.scaler_mean {
            if mean.len() != n {
                return Err(format!("scaler_mean has {} entries, expected {n}", mean.len()));
            }
        }
        if let Some(scale) = &self.scaler_scale {
            if scale.len() != n {
                return Err(format!("scaler_scale has {} entries, expected {n}", scale.len()));
            }
            if scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err("scaler_scale entries must be finite and non-zero".to_string());
            }
        }
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(format!("threshold {} outside [0, 1)", self.threshold));
        }
        Ok(())
    }
}

/// Numerically stable logistic function.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Logistic regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    model: LogisticRegressionModel,
}

impl LogisticClassifier {
    /// Wrap validated parameters.
    ///
    /// # Errors
    /// Returns error if the parameters are inconsistent.
    pub fn new(model: LogisticRegressionModel) -> Result<Self, String> {
        model.validate()?;
        tracing::debug!(
            n_features = model.feature_names.len(),
            scaled = model.scaler_mean.is_some() || model.scaler_scale.is_some(),
            "Logistic regression parameters validated"
        );
        Ok(Self { model })
    }

    /// Linear term before the sigmoid.
    fn decision_function(&self, row: &[f64]) -> f64 {
        let m = &self.model;
        let mut z = m.intercept;
        for (i, x) in row.iter().enumerate() {
            let mean = m.scaler_mean.as_ref().map_or(0.0, |v| v[i]);
            let scale = m.scaler_scale.as_ref().map_or(1.0, |v| v[i]);
            z += m.coefficients[i] * (x - mean) / scale;
        }
        z
    }
}

impl RiskClassifier for LogisticClassifier {
    fn model_type(&self) -> &str {
        "LogisticRegression"
    }

    fn feature_names(&self) -> &[String] {
        &self.model.feature_names
    }

    fn predict_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        let row = numeric_input(features, self.model.feature_names.len())?;
        ClassProbabilities::from_positive(sigmoid(self.decision_function(&row)))
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError> {
        let probs = self.predict_probability(features)?;
        Ok(u8::from(probs.positive() > self.model.threshold))
    }
}
