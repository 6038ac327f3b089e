//! Rule-based guidance attached to each screening.
//!
//! Rules are evaluated in table order and their messages concatenated, so
//! the output order is stable for a given input.

use super::survey::SurveyResponse;

/// Label of the high-risk class.
pub const HIGH_RISK_LABEL: u8 = 1;

/// One guidance rule: when `applies` holds, `messages` are emitted.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(u8, &SurveyResponse) -> bool,
    pub messages: &'static [&'static str],
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("messages", &self.messages.len())
            .finish()
    }
}

const CRISIS: &[&str] = &[
    "🚨 Immediate support is recommended. Please reach out to a mental health professional.",
    "📞 Consider contacting a crisis helpline: National Suicide Prevention Lifeline 988",
    "👥 Connect with trusted friends, family members, or counselors immediately",
    "🏥 If you're having thoughts of self-harm, please visit your nearest emergency room",
];

const GENERAL_WELLNESS: &[&str] = &[
    "🌱 Practice self-care activities that bring you joy and peace",
    "💪 Maintain regular physical activity and healthy sleep patterns",
    "📝 Consider journaling to process your thoughts and feelings",
];

fn answer_in(answer: &str, options: &[&str]) -> bool {
    options.contains(&answer)
}

/// The guidance rules, in output order. General wellness is always last.
pub const RULES: &[Rule] = &[
    Rule {
        name: "crisis",
        applies: |label, _| label == HIGH_RISK_LABEL,
        messages: CRISIS,
    },
    Rule {
        name: "stress",
        applies: |_, r| answer_in(&r.stress_level, &["High", "Very High"]),
        messages: &["🧘 Try stress management techniques like deep breathing, meditation, or yoga"],
    },
    Rule {
        name: "social_support",
        applies: |_, r| answer_in(&r.social_support, &["Not very supportive", "No support"]),
        messages: &["🤝 Consider joining support groups or community activities to build connections"],
    },
    Rule {
        name: "academic",
        applies: |_, r| answer_in(&r.academic_performance, &["Below Average", "Poor"]),
        messages: &["📚 Reach out to academic advisors or tutoring services for educational support"],
    },
    Rule {
        name: "help_declined",
        applies: |_, r| r.mental_health_help == "No, not interested",
        messages: &["💭 Consider exploring different types of mental health resources that might feel more comfortable"],
    },
    Rule {
        name: "mood_tracking",
        applies: |_, r| {
            answer_in(
                &r.depression_level,
                &["More than half the days", "Nearly every day"],
            )
        },
        messages: &["🌟 Daily mood tracking and regular check-ins with a counselor may be helpful"],
    },
    Rule {
        name: "general_wellness",
        applies: |_, _| true,
        messages: GENERAL_WELLNESS,
    },
];

/// Messages plus the escalation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendations {
    pub messages: Vec<String>,
    pub urgent_care: bool,
}

/// Evaluate [`RULES`] for a prediction.
///
/// `urgent_care` depends on the label alone.
#[must_use]
pub fn recommend(label: u8, response: &SurveyResponse) -> Recommendations {
    let messages = RULES
        .iter()
        .filter(|rule| (rule.applies)(label, response))
        .flat_map(|rule| rule.messages.iter().map(|m| (*m).to_string()))
        .collect();

    Recommendations {
        messages,
        urgent_care: label == HIGH_RISK_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::fixtures::calm_response;

    fn rule(name: &str) -> &'static Rule {
        RULES
            .iter()
            .find(|r| r.name == name)
            .expect("Rule should exist")
    }

    #[test]
    fn test_low_risk_without_triggers_gets_general_only() {
        let recs = recommend(0, &calm_response());
        assert_eq!(recs.messages, GENERAL_WELLNESS);
        assert!(!recs.urgent_care);
    }

    #[test]
    fn test_rules_compose_in_fixed_order() {
        let mut response = calm_response();
        response.stress_level = "High".into();
        response.social_support = "No support".into();

        let recs = recommend(1, &response);

        let mut expected: Vec<&str> = CRISIS.to_vec();
        expected.extend(rule("stress").messages);
        expected.extend(rule("social_support").messages);
        expected.extend(GENERAL_WELLNESS);
        assert_eq!(recs.messages, expected);
        assert!(recs.urgent_care);
    }

    #[test]
    fn test_every_rule_fires() {
        let mut response = calm_response();
        response.stress_level = "Very High".into();
        response.social_support = "Not very supportive".into();
        response.academic_performance = "Poor".into();
        response.mental_health_help = "No, not interested".into();
        response.depression_level = "Nearly every day".into();

        let recs = recommend(1, &response);
        let expected = [
            "🚨 Immediate support is recommended. Please reach out to a mental health professional.",
            "📞 Consider contacting a crisis helpline: National Suicide Prevention Lifeline 988",
            "👥 Connect with trusted friends, family members, or counselors immediately",
            "🏥 If you're having thoughts of self-harm, please visit your nearest emergency room",
            "🧘 Try stress management techniques like deep breathing, meditation, or yoga",
            "🤝 Consider joining support groups or community activities to build connections",
            "📚 Reach out to academic advisors or tutoring services for educational support",
            "💭 Consider exploring different types of mental health resources that might feel more comfortable",
            "🌟 Daily mood tracking and regular check-ins with a counselor may be helpful",
            "🌱 Practice self-care activities that bring you joy and peace",
            "💪 Maintain regular physical activity and healthy sleep patterns",
            "📝 Consider journaling to process your thoughts and feelings",
        ];
        assert_eq!(recs.messages, expected);
        assert!(recs.urgent_care);
    }

    #[test]
    fn test_individual_rule_predicates() {
        let mut response = calm_response();
        assert!(!(rule("academic").applies)(0, &response));
        response.academic_performance = "Below Average".into();
        assert!((rule("academic").applies)(0, &response));

        assert!(!(rule("help_declined").applies)(0, &response));
        response.mental_health_help = "No, not interested".into();
        assert!((rule("help_declined").applies)(0, &response));

        assert!(!(rule("mood_tracking").applies)(0, &response));
        response.depression_level = "More than half the days".into();
        assert!((rule("mood_tracking").applies)(0, &response));

        assert!((rule("crisis").applies)(1, &response));
        assert!(!(rule("crisis").applies)(0, &response));
    }

    #[test]
    fn test_urgent_care_ignores_answers() {
        let mut response = calm_response();
        response.depression_level = "Nearly every day".into();
        response.stress_level = "Very High".into();
        assert!(!recommend(0, &response).urgent_care);
        assert!(recommend(1, &calm_response()).urgent_care);
    }
}
