//! Prediction result types.
//!
//! Represents the classifier output and the response returned to callers.

use serde::{Deserialize, Serialize};

use super::schema::NonNumericFeature;

/// Errors raised by a classifier while scoring a vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error(transparent)]
    NonNumeric(#[from] NonNumericFeature),

    #[error("Feature count mismatch: got {got}, expected {expected}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Feature {index} is not finite")]
    NonFinite { index: usize },

    #[error("Invalid class probabilities: {0}")]
    InvalidProbabilities(String),
}

/// Risk classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskLevel {
    /// Level for a binary label; anything but 1 is low risk.
    #[must_use]
    pub fn from_label(label: u8) -> Self {
        if label == 1 {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low Risk"),
            Self::High => write!(f, "High Risk"),
        }
    }
}

/// Class distribution `[P(0), P(1)]` returned by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities([f64; 2]);

impl ClassProbabilities {
    /// Tolerance on the sum of the two probabilities.
    const SUM_TOLERANCE: f64 = 1e-6;

    /// Build from `P(1)`.
    ///
    /// # Errors
    /// Returns error if `positive` is not a probability.
    pub fn from_positive(positive: f64) -> Result<Self, ClassifierError> {
        Self::new([1.0 - positive, positive])
    }

    /// Build from both class probabilities.
    ///
    /// # Errors
    /// Returns error if a value is outside [0, 1], not finite, or the pair
    /// does not sum to 1.
    pub fn new(probs: [f64; 2]) -> Result<Self, ClassifierError> {
        for p in probs {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(ClassifierError::InvalidProbabilities(format!(
                    "{p} outside [0, 1]"
                )));
            }
        }
        let sum = probs[0] + probs[1];
        if (sum - 1.0).abs() > Self::SUM_TOLERANCE {
            return Err(ClassifierError::InvalidProbabilities(format!(
                "sum is {sum}, expected 1"
            )));
        }
        Ok(Self(probs))
    }

    #[must_use]
    pub fn negative(&self) -> f64 {
        self.0[0]
    }

    #[must_use]
    pub fn positive(&self) -> f64 {
        self.0[1]
    }

    /// Confidence of the most likely class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.0[0].max(self.0[1])
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; 2] {
        self.0
    }
}

/// Response returned for one screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Binary label (0 = low risk, 1 = high risk)
    pub prediction: u8,

    pub risk_level: RiskLevel,

    /// Max class probability, in [0, 1]
    pub confidence_score: f64,

    /// Guidance messages, in rule order
    pub recommendations: Vec<String>,

    /// True iff `prediction == 1`
    pub urgent_care_needed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_max_probability() {
        let probs = ClassProbabilities::new([0.2, 0.8]).expect("Should build");
        assert!((probs.confidence() - 0.8).abs() < f64::EPSILON);

        let probs = ClassProbabilities::from_positive(0.1).expect("Should build");
        assert!((probs.confidence() - 0.9).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&probs.confidence()));
    }

    #[test]
    fn test_invalid_probabilities() {
        assert!(ClassProbabilities::new([0.7, 0.7]).is_err());
        assert!(ClassProbabilities::new([-0.1, 1.1]).is_err());
        assert!(ClassProbabilities::from_positive(f64::NAN).is_err());
    }

    #[test]
    fn test_risk_level_labels() {
        assert_eq!(RiskLevel::from_label(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_label(1), RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "High Risk");
        assert_eq!(
            serde_json::to_string(&RiskLevel::Low).expect("Should serialize"),
            "\"Low Risk\""
        );
    }

    #[test]
    fn test_result_wire_format() {
        let result = PredictionResult {
            prediction: 1,
            risk_level: RiskLevel::High,
            confidence_score: 0.75,
            recommendations: vec!["a".into()],
            urgent_care_needed: true,
        };
        let value = serde_json::to_value(&result).expect("Should serialize");
        assert_eq!(value["prediction"], 1);
        assert_eq!(value["risk_level"], "High Risk");
        assert_eq!(value["urgent_care_needed"], true);
    }
}
