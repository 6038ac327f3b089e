//! Risk classifier port: Trait for the pre-fitted binary classifier.
//!
//! This trait abstracts the model artifact from the application logic.

use crate::domain::{ClassProbabilities, ClassifierError, FeatureVector};

/// Trait for a fitted binary classifier.
///
/// Implementations are immutable after loading and shared across requests,
/// so every method takes `&self`.
pub trait RiskClassifier: Send + Sync {
    /// Name of the model family (e.g. `LogisticRegression`).
    fn model_type(&self) -> &str;

    /// Feature names the model was fitted on, in input order.
    fn feature_names(&self) -> &[String];

    /// Class labels, in the order of [`ClassProbabilities`].
    fn classes(&self) -> [u8; 2] {
        [0, 1]
    }

    /// Class distribution for one encoded response.
    ///
    /// # Errors
    /// Returns `ClassifierError::NonNumeric` if a column holds a passthrough
    /// string, or `ClassifierError::FeatureCount` on a shape mismatch.
    fn predict_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError>;

    /// Predicted label for one encoded response.
    ///
    /// # Errors
    /// Same conditions as [`RiskClassifier::predict_probability`].
    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError>;
}

/// Check width and finiteness, returning the dense numeric row.
///
/// # Errors
/// Returns the first violation found.
pub(crate) fn numeric_input(
    features: &FeatureVector,
    expected: usize,
) -> Result<Vec<f64>, ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::FeatureCount {
            expected,
            got: features.len(),
        });
    }
    let row = features.to_numeric()?;
    if let Some(index) = row.iter().position(|v| !v.is_finite()) {
        return Err(ClassifierError::NonFinite { index });
    }
    Ok(row)
}
