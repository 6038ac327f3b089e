//! Survey → feature vector encoding.
//!
//! The ordinal tables below must match the encoding the classifier was
//! trained with exactly. Codes follow severity order, not label order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::schema::{FeatureSchema, FeatureValue, FeatureVector};
use super::survey::{concern_column, SurveyField, SurveyResponse, AI_CONCERNS};

type OrdinalTable = &'static [(&'static str, u8)];

const AGE: OrdinalTable = &[
    ("15-17", 0),
    ("18-20", 1),
    ("21-23", 2),
    ("24-26", 3),
    ("27-30", 4),
    ("30+", 5),
];

const GENDER: OrdinalTable = &[
    ("Male", 0),
    ("Female", 1),
    ("Non-binary", 2),
    ("Prefer not to say", 3),
];

const ACADEMIC_STATUS: OrdinalTable = &[
    ("High School", 0),
    ("Undergraduate", 1),
    ("Graduate", 2),
    ("Working Professional", 3),
];

const STRESS: OrdinalTable = &[
    ("Very Low", 0),
    ("Low", 1),
    ("Moderate", 2),
    ("High", 3),
    ("Very High", 4),
];

const PERFORMANCE: OrdinalTable = &[
    ("Excellent", 0),
    ("Good", 1),
    ("Average", 2),
    ("Below Average", 3),
    ("Poor", 4),
];

const HEALTH: OrdinalTable = &[("Excellent", 0), ("Good", 1), ("Fair", 2), ("Poor", 3)];

const RELATIONSHIP: OrdinalTable = &[
    ("Single", 0),
    ("In a relationship", 1),
    ("Married", 2),
    ("Divorced", 3),
    ("It's complicated", 4),
];

/// Family problems, self-harm and suicidal thoughts share one frequency scale.
const FREQUENCY: OrdinalTable = &[
    ("Never", 0),
    ("Rarely", 1),
    ("Sometimes", 2),
    ("Often", 3),
    ("Always", 4),
];

/// PHQ-style scale for depression and anxiety. "I don't know" sits mid-scale.
const SYMPTOM_DAYS: OrdinalTable = &[
    ("Not at all", 0),
    ("Several days", 1),
    ("More than half the days", 2),
    ("Nearly every day", 3),
    ("I don't know", 2),
];

const SUPPORT: OrdinalTable = &[
    ("Very supportive", 0),
    ("Somewhat supportive", 1),
    ("Neutral", 2),
    ("Not very supportive", 3),
    ("No support", 4),
];

const HELP: OrdinalTable = &[
    ("Yes, currently receiving", 0),
    ("Yes, previously received", 1),
    ("No, but interested", 2),
    ("No, not interested", 3),
];

/// Shared by comfort and trust; the two label sets do not overlap.
const AI_ATTITUDE: OrdinalTable = &[
    ("Very comfortable", 0),
    ("Somewhat comfortable", 1),
    ("Neutral", 2),
    ("Somewhat uncomfortable", 3),
    ("Very uncomfortable", 4),
    ("Very high", 0),
    ("High", 1),
    ("Moderate", 2),
    ("Low", 3),
    ("Very low", 4),
];

impl SurveyField {
    /// Label → code table for this field.
    #[must_use]
    pub fn ordinal_table(self) -> &'static [(&'static str, u8)] {
        match self {
            Self::Age => AGE,
            Self::Gender => GENDER,
            Self::AcademicStatus => ACADEMIC_STATUS,
            Self::StressLevel => STRESS,
            Self::AcademicPerformance => PERFORMANCE,
            Self::HealthCondition => HEALTH,
            Self::RelationshipStatus => RELATIONSHIP,
            Self::FamilyProblems | Self::SelfHarmBehaviors | Self::SuicidalThoughts => FREQUENCY,
            Self::DepressionLevel | Self::AnxietyLevel => SYMPTOM_DAYS,
            Self::SocialSupport => SUPPORT,
            Self::MentalHealthHelp => HELP,
            Self::AiComfortLevel | Self::AiTrustLevel => AI_ATTITUDE,
        }
    }

    /// Ordinal code of `label`; exact, case-sensitive match.
    #[must_use]
    pub fn ordinal_code(self, label: &str) -> Option<u8> {
        self.ordinal_table()
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, code)| *code)
    }
}

/// What to do with an answer that has no ordinal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Keep the raw string in the vector; the classifier decides whether it
    /// can use it.
    #[default]
    Passthrough,
    /// Refuse the request before inference.
    Reject,
}

impl std::str::FromStr for UnknownCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown category policy {other:?} (expected passthrough or reject)"
            )),
        }
    }
}

impl std::fmt::Display for UnknownCategoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Fields whose answer has no ordinal code, with the offending answer.
#[must_use]
pub fn unmapped_fields(response: &SurveyResponse) -> Vec<(SurveyField, &str)> {
    SurveyField::ALL
        .into_iter()
        .map(|field| (field, response.answer(field)))
        .filter(|(field, answer)| field.ordinal_code(answer).is_none())
        .collect()
}

/// Every column the encoder can produce, keyed by name.
fn encode_row(response: &SurveyResponse) -> HashMap<String, FeatureValue> {
    let mut row = HashMap::with_capacity(SurveyField::ALL.len() + AI_CONCERNS.len());

    for field in SurveyField::ALL {
        let answer = response.answer(field);
        let value = match field.ordinal_code(answer) {
            Some(code) => FeatureValue::from(code),
            None => FeatureValue::Text(answer.to_string()),
        };
        row.insert(field.column().to_string(), value);
    }

    for label in AI_CONCERNS {
        let flag = u8::from(response.has_concern(label));
        row.insert(concern_column(label), FeatureValue::from(flag));
    }

    row
}

/// Encode a response into the column order of `schema`.
///
/// Total over any well-formed response: unmapped answers pass through as
/// text, schema columns the encoder never produces are 0, and encoder
/// columns the schema does not list are dropped.
#[must_use]
pub fn encode(response: &SurveyResponse, schema: &FeatureSchema) -> FeatureVector {
    let mut row = encode_row(response);

    let values = schema
        .columns()
        .iter()
        .map(|column| row.remove(column).unwrap_or(FeatureValue::Number(0.0)))
        .collect();

    FeatureVector::new(schema, values)
}
