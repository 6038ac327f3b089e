//! Random forest adapter: RiskClassifier over exported decision trees.
//!
//! Trees use the flat node-array layout of the training library: node `i`
//! splits on `feature[i] <= threshold[i]` into `children_left[i]` /
//! `children_right[i]`, and leaves (`children_left[i] == -1`) hold per-class
//! sample counts in `value[i]`. The forest probability is the mean of the
//! normalized leaf distributions.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassProbabilities, ClassifierError, FeatureVector};
use crate::ports::{numeric_input, RiskClassifier};

/// Marker for "no child" in the children arrays.
const LEAF: i64 = -1;

/// One fitted decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeModel {
    #[serde(alias = "left")]
    pub children_left: Vec<i64>,
    #[serde(alias = "right")]
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights `[w0, w1]`; only leaves are read.
    pub value: Vec<[f64; 2]>,
}

impl TreeModel {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree node arrays differ in length".to_string());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {i} has exactly one child"));
                }
                let [w0, w1] = self.value[i];
                if !(w0.is_finite() && w1.is_finite()) || w0 < 0.0 || w1 < 0.0 || w0 + w1 <= 0.0 {
                    return Err(format!("leaf {i} has invalid class weights"));
                }
                continue;
            }

            // Children always follow their parent, which also rules out cycles.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} has out-of-order child {child}"));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!("node {i} splits on unknown feature {feature}"));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {i} has a non-finite threshold"));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `row`.
    fn leaf_distribution(&self, row: &[f64]) -> [f64; 2] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = row[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [w0, w1] = self.value[node];
        let total = w0 + w1;
        [w0 / total, w1 / total]
    }
}

/// Forest parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestModel {
    pub feature_names: Vec<String>,
    pub trees: Vec<TreeModel>,
}

impl RandomForestModel {
    /// Shape checks for every tree.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.feature_names.is_empty() {
            return Err("feature_names must not be empty".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }
}

/// Random forest classifier (mean of tree probabilities).
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    model: RandomForestModel,
}

impl ForestClassifier {
    /// Wrap validated parameters.
    ///
    /// # Errors
    /// Returns error if any tree is malformed.
    pub fn new(model: RandomForestModel) -> Result<Self, String> {
        model.validate()?;
        tracing::debug!(
            n_trees = model.trees.len(),
            n_features = model.feature_names.len(),
            "Random forest validated"
        );
        Ok(Self { model })
    }
}

impl RiskClassifier for ForestClassifier {
    fn model_type(&self) -> &str {
        "RandomForestClassifier"
    }

    fn feature_names(&self) -> &[String] {
        &self.model.feature_names
    }

    fn predict_probability(
        &self,
        features: &FeatureVector,
    ) -> Result<ClassProbabilities, ClassifierError> {
        let row = numeric_input(features, self.model.feature_names.len())?;

        let positive: f64 = self
            .model
            .trees
            .iter()
            .map(|tree| tree.leaf_distribution(&row)[1])
            .sum::<f64>()
            / self.model.trees.len() as f64;

        ClassProbabilities::from_positive(positive.clamp(0.0, 1.0))
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, ClassifierError> {
        let probs = self.predict_probability(features)?;
        // Argmax; ties go to the first class.
        Ok(u8::from(probs.positive() > probs.negative()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureSchema, FeatureValue};

    /// Single split on feature 0 at 1.5: left leaf favours class 0.
    fn stump(left: [f64; 2], right: [f64; 2]) -> TreeModel {
        TreeModel {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![1.5, -2.0, -2.0],
            value: vec![[0.0, 0.0], left, right],
        }
    }

    fn forest(trees: Vec<TreeModel>) -> ForestClassifier {
        ForestClassifier::new(RandomForestModel {
            feature_names: vec!["stressLevel".into(), "age".into()],
            trees,
        })
        .expect("valid forest")
    }

    fn vector(values: [f64; 2]) -> FeatureVector {
        let schema = FeatureSchema::new(["stressLevel", "age"]).expect("schema");
        FeatureVector::new(&schema, values.into_iter().map(FeatureValue::Number).collect())
    }

    #[test]
    fn test_traversal() {
        let clf = forest(vec![stump([9.0, 1.0], [2.0, 8.0])]);

        let low = clf.predict_probability(&vector([1.0, 0.0])).expect("p");
        assert!((low.positive() - 0.1).abs() < 1e-12);
        assert_eq!(clf.predict(&vector([1.0, 0.0])).expect("label"), 0);

        // Boundary goes left.
        assert_eq!(clf.predict(&vector([1.5, 0.0])).expect("label"), 0);
        assert_eq!(clf.predict(&vector([3.0, 0.0])).expect("label"), 1);
    }

    #[test]
    fn test_forest_averages_trees() {
        let clf = forest(vec![
            stump([1.0, 0.0], [0.0, 1.0]),
            stump([1.0, 1.0], [1.0, 3.0]),
        ]);
        let probs = clf.predict_probability(&vector([4.0, 0.0])).expect("p");
        assert!((probs.positive() - (1.0 + 0.75) / 2.0).abs() < 1e-12);
        assert!((probs.confidence() - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_tie_predicts_first_class() {
        let clf = forest(vec![stump([1.0, 1.0], [1.0, 1.0])]);
        assert_eq!(clf.predict(&vector([0.0, 0.0])).expect("label"), 0);
    }

    #[test]
    fn test_rejects_malformed_trees() {
        let mut cyclic = stump([1.0, 0.0], [0.0, 1.0]);
        cyclic.children_left[0] = 0;
        assert!(cyclic.validate(2).is_err());

        let mut bad_feature = stump([1.0, 0.0], [0.0, 1.0]);
        bad_feature.feature[0] = 5;
        assert!(bad_feature.validate(2).is_err());

        let mut empty_leaf = stump([1.0, 0.0], [0.0, 1.0]);
        empty_leaf.value[1] = [0.0, 0.0];
        assert!(empty_leaf.validate(2).is_err());

        let mut ragged = stump([1.0, 0.0], [0.0, 1.0]);
        ragged.threshold.pop();
        assert!(ragged.validate(2).is_err());

        assert!(RandomForestModel {
            feature_names: vec!["x".into()],
            trees: vec![],
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_deserialize_node_arrays() {
        let json = r#"{
            "feature_names": ["stressLevel", "age"],
            "trees": [{
                "left": [1, -1, -1],
                "right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [2.5, -2.0, -2.0],
                "value": [[5, 5], [4, 1], [1, 4]]
            }]
        }"#;
        let model: RandomForestModel = serde_json::from_str(json).expect("parse");
        let clf = ForestClassifier::new(model).expect("valid");
        assert_eq!(clf.predict(&vector([3.0, 0.0])).expect("label"), 1);
    }
}
