//! Feature schema and the vectors aligned to it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Errors building a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Feature schema is empty")]
    Empty,

    #[error("Feature schema has an empty column name at position {0}")]
    EmptyColumn(usize),

    #[error("Feature schema lists column {0:?} more than once")]
    DuplicateColumn(String),
}

/// Ordered feature columns the classifier was trained on.
///
/// Cheap to clone; the column list is shared.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    index: Arc<HashMap<String, usize>>,
}

impl FeatureSchema {
    /// Build a schema from an ordered column list.
    ///
    /// # Errors
    /// Returns error if the list is empty, has an empty name, or repeats a name.
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyColumn(i));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        Ok(Self {
            columns: columns.into(),
            index: Arc::new(index),
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if the schema has it.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

/// A single encoded cell.
///
/// `Text` only appears when a categorical answer had no ordinal code and was
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl From<u8> for FeatureValue {
    fn from(v: u8) -> Self {
        Self::Number(f64::from(v))
    }
}

/// A column held a passthrough string where the model needs a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("column {column:?} is not numeric (value {value:?})")]
pub struct NonNumericFeature {
    pub column: String,
    pub value: String,
}

/// Encoded features, aligned to a [`FeatureSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Arc<[String]>,
    values: Vec<FeatureValue>,
}

impl FeatureVector {
    /// Pair values with the schema they were encoded against.
    ///
    /// Callers must supply exactly one value per schema column; the encoder
    /// is the only producer.
    pub(crate) fn new(schema: &FeatureSchema, values: Vec<FeatureValue>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self {
            columns: Arc::clone(&schema.columns),
            values,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Iterate `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Columns that carry a passthrough string.
    #[must_use]
    pub fn text_columns(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| matches!(v, FeatureValue::Text(_)))
            .map(|(c, _)| c)
            .collect()
    }

    /// Dense numeric view for the classifier.
    ///
    /// # Errors
    /// Returns the first column holding a passthrough string.
    pub fn to_numeric(&self) -> Result<Vec<f64>, NonNumericFeature> {
        self.iter()
            .map(|(column, value)| match value {
                FeatureValue::Number(v) => Ok(*v),
                FeatureValue::Text(s) => Err(NonNumericFeature {
                    column: column.to_string(),
                    value: s.clone(),
                }),
            })
            .collect()
    }
}
