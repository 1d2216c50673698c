use serde::{Deserialize, Deserializer, Serialize};

use casevox_common::models::Severity;

/// Where uncategorizable complaints land.
pub const GENERAL_GRIEVANCE_CELL: &str = "Customer Support / General Grievance Cell";

fn lenient_severity<'de, D>(deserializer: D) -> Result<Severity, D::Error>
where
    D: Deserializer<'de>,
{
    // The model occasionally emits severities outside the supported set
    // ("Critical" among them); those collapse to Normal rather than failing
    // the whole classification.
    let s = String::deserialize(deserializer)?;
    Ok(Severity::from(s))
}

/// Full classifier verdict for one complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient_severity")]
    pub severity: Severity,
    pub anonymous_recommended: bool,
    pub escalation_required: bool,
    pub route_to: String,
    pub sla_hours: i32,
}

impl Classification {
    /// Keyword-based degraded-mode classification, used when the classifier
    /// service is unreachable so a submission is never lost.
    pub fn fallback(complaint_text: &str) -> Self {
        let lower = complaint_text.to_lowercase();
        let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let mut categories = Vec::new();
        if contains_any(&[
            "harassment", "harass", "bully", "abuse", "discriminate", "threaten", "assault",
        ]) {
            categories.push("Harassment".to_string());
        }
        if contains_any(&[
            "water", "cooler", "toilet", "bathroom", "washroom", "restroom", "broken", "repair",
            "maintenance", "air conditioning",
        ]) {
            categories.push("Infrastructure".to_string());
        }
        if categories.is_empty()
            && contains_any(&[
                "grade", "marks", "exam", "test", "professor", "teacher", "lecture", "assignment",
            ])
        {
            categories.push("Academic".to_string());
        }
        if categories.is_empty() {
            categories.push("Other".to_string());
        }

        let severity = if contains_any(&[
            "urgent", "critical", "emergency", "immediately", "harassment", "harass", "assault",
        ]) {
            Severity::High
        } else {
            Severity::Normal
        };

        let anonymous_recommended = categories.iter().any(|c| c == "Harassment")
            || contains_any(&["scared", "afraid", "fear", "retaliation", "threatened"]);

        Self {
            categories,
            severity,
            anonymous_recommended,
            escalation_required: false,
            route_to: GENERAL_GRIEVANCE_CELL.to_string(),
            sla_hours: severity.fallback_hours() as i32,
        }
    }
}

/// Human-readable rationale for a classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierExplanation {
    pub summary_reason: String,
    pub key_triggers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub complaint: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BatchClassifyRequest<'a> {
    pub complaints: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_defaults_to_other_normal() {
        let c = Classification::fallback("general dissatisfaction with everything");
        assert_eq!(c.categories, vec!["Other".to_string()]);
        assert_eq!(c.severity, Severity::Normal);
        assert_eq!(c.sla_hours, 168);
        assert_eq!(c.route_to, GENERAL_GRIEVANCE_CELL);
    }

    #[test]
    fn fallback_flags_harassment_as_high_and_anonymous() {
        let c = Classification::fallback("my supervisor continues to harass me daily");
        assert!(c.categories.iter().any(|c| c == "Harassment"));
        assert_eq!(c.severity, Severity::High);
        assert!(c.anonymous_recommended);
        assert_eq!(c.sla_hours, 72);
    }

    #[test]
    fn unknown_severity_deserializes_to_normal() {
        let json = r#"{
            "categories": ["Other"],
            "severity": "Critical",
            "anonymous_recommended": false,
            "escalation_required": true,
            "route_to": "Vigilance / Ethics Office",
            "sla_hours": 24
        }"#;
        let c: Classification = serde_json::from_str(json).unwrap();
        assert_eq!(c.severity, Severity::Normal);
    }
}
