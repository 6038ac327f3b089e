//! Survey response types for the wellbeing check-in.
//!
//! Field names on the wire are camelCase and double as the feature column
//! names the classifier was trained on.

use serde::{Deserialize, Serialize};

/// Upper bound on a single answer, in bytes.
pub const MAX_ANSWER_LEN: usize = 256;

/// Upper bound on the number of selected AI concerns.
pub const MAX_SELECTED_CONCERNS: usize = 32;

/// Prefix of the one-hot columns produced from `aiConcerns`.
pub const CONCERN_COLUMN_PREFIX: &str = "concern_";

/// Every concern label the form offers, in column order.
pub const AI_CONCERNS: [&str; 7] = [
    "Privacy and data security",
    "Accuracy of AI responses",
    "Lack of human empathy",
    "Potential bias in AI",
    "Over-reliance on technology",
    "Technical issues or glitches",
    "None of the above",
];

/// One completed check-in, as submitted by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub age: String,
    pub gender: String,
    pub academic_status: String,
    pub stress_level: String,
    pub academic_performance: String,
    pub health_condition: String,
    pub relationship_status: String,
    pub family_problems: String,
    pub depression_level: String,
    pub anxiety_level: String,
    pub social_support: String,
    pub self_harm_behaviors: String,
    pub suicidal_thoughts: String,
    pub mental_health_help: String,
    pub ai_comfort_level: String,
    /// Multi-select; expanded into one column per entry of [`AI_CONCERNS`].
    pub ai_concerns: Vec<String>,
    pub ai_trust_level: String,
}

/// The single-choice questions of the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyField {
    Age,
    Gender,
    AcademicStatus,
    StressLevel,
    AcademicPerformance,
    HealthCondition,
    RelationshipStatus,
    FamilyProblems,
    DepressionLevel,
    AnxietyLevel,
    SocialSupport,
    SelfHarmBehaviors,
    SuicidalThoughts,
    MentalHealthHelp,
    AiComfortLevel,
    AiTrustLevel,
}

impl SurveyField {
    /// All single-choice fields, in form order.
    pub const ALL: [SurveyField; 16] = [
        Self::Age,
        Self::Gender,
        Self::AcademicStatus,
        Self::StressLevel,
        Self::AcademicPerformance,
        Self::HealthCondition,
        Self::RelationshipStatus,
        Self::FamilyProblems,
        Self::DepressionLevel,
        Self::AnxietyLevel,
        Self::SocialSupport,
        Self::SelfHarmBehaviors,
        Self::SuicidalThoughts,
        Self::MentalHealthHelp,
        Self::AiComfortLevel,
        Self::AiTrustLevel,
    ];

    /// Wire name of the field, which is also its feature column name.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::AcademicStatus => "academicStatus",
            Self::StressLevel => "stressLevel",
            Self::AcademicPerformance => "academicPerformance",
            Self::HealthCondition => "healthCondition",
            Self::RelationshipStatus => "relationshipStatus",
            Self::FamilyProblems => "familyProblems",
            Self::DepressionLevel => "depressionLevel",
            Self::AnxietyLevel => "anxietyLevel",
            Self::SocialSupport => "socialSupport",
            Self::SelfHarmBehaviors => "selfHarmBehaviors",
            Self::SuicidalThoughts => "suicidalThoughts",
            Self::MentalHealthHelp => "mentalHealthHelp",
            Self::AiComfortLevel => "aiComfortLevel",
            Self::AiTrustLevel => "aiTrustLevel",
        }
    }

    /// Whether answers to this field are sensitive enough to keep out of logs.
    #[must_use]
    pub fn is_sensitive(self) -> bool {
        matches!(
            self,
            Self::DepressionLevel
                | Self::AnxietyLevel
                | Self::SelfHarmBehaviors
                | Self::SuicidalThoughts
                | Self::MentalHealthHelp
        )
    }
}

impl std::fmt::Display for SurveyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

impl SurveyResponse {
    /// The raw answer given for a single-choice field.
    #[must_use]
    pub fn answer(&self, field: SurveyField) -> &str {
        match field {
            SurveyField::Age => &self.age,
            SurveyField::Gender => &self.gender,
            SurveyField::AcademicStatus => &self.academic_status,
            SurveyField::StressLevel => &self.stress_level,
            SurveyField::AcademicPerformance => &self.academic_performance,
            SurveyField::HealthCondition => &self.health_condition,
            SurveyField::RelationshipStatus => &self.relationship_status,
            SurveyField::FamilyProblems => &self.family_problems,
            SurveyField::DepressionLevel => &self.depression_level,
            SurveyField::AnxietyLevel => &self.anxiety_level,
            SurveyField::SocialSupport => &self.social_support,
            SurveyField::SelfHarmBehaviors => &self.self_harm_behaviors,
            SurveyField::SuicidalThoughts => &self.suicidal_thoughts,
            SurveyField::MentalHealthHelp => &self.mental_health_help,
            SurveyField::AiComfortLevel => &self.ai_comfort_level,
            SurveyField::AiTrustLevel => &self.ai_trust_level,
        }
    }

    /// Whether the given concern label was selected.
    #[must_use]
    pub fn has_concern(&self, label: &str) -> bool {
        self.ai_concerns.iter().any(|c| c == label)
    }

    /// Structural checks applied at the API boundary before encoding.
    ///
    /// Vocabulary is deliberately not checked here; unknown categories are
    /// handled by the encoder's policy.
    ///
    /// # Errors
    /// Returns every violation found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for field in SurveyField::ALL {
            let len = self.answer(field).len();
            if len > MAX_ANSWER_LEN {
                errors.push(format!(
                    "{field} answer is {len} bytes, max {MAX_ANSWER_LEN}"
                ));
            }
        }

        if self.ai_concerns.len() > MAX_SELECTED_CONCERNS {
            errors.push(format!(
                "aiConcerns has {} entries, max {MAX_SELECTED_CONCERNS}",
                self.ai_concerns.len()
            ));
        }
        if let Some(long) = self.ai_concerns.iter().find(|c| c.len() > MAX_ANSWER_LEN) {
            errors.push(format!(
                "aiConcerns entry is {} bytes, max {MAX_ANSWER_LEN}",
                long.len()
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Column slug: lowercase, spaces and hyphens become underscores.
#[must_use]
pub fn slug(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// One-hot column name for a concern label.
#[must_use]
pub fn concern_column(label: &str) -> String {
    format!("{CONCERN_COLUMN_PREFIX}{}", slug(label))
}
