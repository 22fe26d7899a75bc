//! Condition classification
//!
//! Maps raw medical-condition tags to a severity level and boolean flags.
//! Unknown tags are ignored; empty tags and `"none"` are filtered out.

use crate::types::{ConditionAnalysis, ConditionSeverity};

/// Recognized medical conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Condition {
    DiabetesType1,
    DiabetesType2,
    HeartCondition,
    HighBloodPressure,
    KidneyDisease,
    LiverDisease,
    ThyroidDisorder,
    PregnancyBreastfeeding,
    DigestiveDisorder,
    MentalHealth,
}

impl Condition {
    /// Parse a raw tag; case-insensitive, `-` and spaces read as `_`
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "diabetes_type1" | "type1_diabetes" | "diabetes_type_1" => Some(Condition::DiabetesType1),
            "diabetes_type2" | "type2_diabetes" | "diabetes_type_2" | "diabetes" => {
                Some(Condition::DiabetesType2)
            }
            "heart_condition" | "heart_disease" => Some(Condition::HeartCondition),
            "high_blood_pressure" | "hypertension" => Some(Condition::HighBloodPressure),
            "kidney_disease" => Some(Condition::KidneyDisease),
            "liver_disease" => Some(Condition::LiverDisease),
            "thyroid_disorder" | "thyroid" => Some(Condition::ThyroidDisorder),
            "pregnancy_breastfeeding" | "pregnancy" | "pregnant" => {
                Some(Condition::PregnancyBreastfeeding)
            }
            "digestive_disorder" | "digestive_issues" => Some(Condition::DigestiveDisorder),
            "mental_health" | "anxiety_depression" => Some(Condition::MentalHealth),
            _ => None,
        }
    }

    /// Canonical tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::DiabetesType1 => "diabetes_type1",
            Condition::DiabetesType2 => "diabetes_type2",
            Condition::HeartCondition => "heart_condition",
            Condition::HighBloodPressure => "high_blood_pressure",
            Condition::KidneyDisease => "kidney_disease",
            Condition::LiverDisease => "liver_disease",
            Condition::ThyroidDisorder => "thyroid_disorder",
            Condition::PregnancyBreastfeeding => "pregnancy_breastfeeding",
            Condition::DigestiveDisorder => "digestive_disorder",
            Condition::MentalHealth => "mental_health",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::DiabetesType1 => "Type 1 diabetes",
            Condition::DiabetesType2 => "Type 2 diabetes",
            Condition::HeartCondition => "Heart condition",
            Condition::HighBloodPressure => "High blood pressure",
            Condition::KidneyDisease => "Kidney disease",
            Condition::LiverDisease => "Liver disease",
            Condition::ThyroidDisorder => "Thyroid disorder",
            Condition::PregnancyBreastfeeding => "Pregnancy or breastfeeding",
            Condition::DigestiveDisorder => "Digestive disorder",
            Condition::MentalHealth => "Mental health condition",
        }
    }

    /// Conditions counted toward compound risk and severity escalation
    pub fn is_serious(&self) -> bool {
        matches!(
            self,
            Condition::DiabetesType1
                | Condition::DiabetesType2
                | Condition::HeartCondition
                | Condition::HighBloodPressure
                | Condition::KidneyDisease
                | Condition::LiverDisease
        )
    }

    /// Conditions that are critical on their own
    pub fn is_critical_alone(&self) -> bool {
        matches!(self, Condition::DiabetesType1 | Condition::HeartCondition)
    }
}

impl ConditionAnalysis {
    /// Classify raw condition tags
    pub fn classify<S: AsRef<str>>(tags: &[S], has_critical_conditions: bool) -> Self {
        let mut conditions: Vec<Condition> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref().trim();
            if tag.is_empty() || tag.eq_ignore_ascii_case("none") {
                continue;
            }
            if let Some(condition) = Condition::parse(tag) {
                if !conditions.contains(&condition) {
                    conditions.push(condition);
                }
            }
        }

        let has = |c: Condition| conditions.contains(&c);
        let serious: Vec<Condition> = conditions.iter().copied().filter(|c| c.is_serious()).collect();

        let mut severity = classify_severity(&conditions, serious.len());
        if has_critical_conditions {
            severity = severity.max(ConditionSeverity::High);
        }

        ConditionAnalysis {
            severity,
            has_diabetes: has(Condition::DiabetesType1) || has(Condition::DiabetesType2),
            has_type1_diabetes: has(Condition::DiabetesType1),
            has_heart_condition: has(Condition::HeartCondition),
            has_high_blood_pressure: has(Condition::HighBloodPressure),
            has_kidney_disease: has(Condition::KidneyDisease),
            has_liver_disease: has(Condition::LiverDisease),
            has_thyroid_disorder: has(Condition::ThyroidDisorder),
            is_pregnant: has(Condition::PregnancyBreastfeeding),
            has_digestive_disorder: has(Condition::DigestiveDisorder),
            has_mental_health_condition: has(Condition::MentalHealth),
            compound_risk: serious.len() >= 2,
            critical_conditions: serious.iter().map(|c| c.label().to_string()).collect(),
            active_conditions: conditions.iter().map(|c| c.as_str().to_string()).collect(),
        }
    }

    pub fn has_any_condition(&self) -> bool {
        !self.active_conditions.is_empty()
    }
}

fn classify_severity(conditions: &[Condition], serious_count: usize) -> ConditionSeverity {
    if conditions.iter().any(|c| c.is_critical_alone()) || serious_count >= 3 {
        return ConditionSeverity::Critical;
    }
    if serious_count >= 2
        || conditions
            .iter()
            .any(|c| matches!(c, Condition::KidneyDisease | Condition::LiverDisease))
    {
        return ConditionSeverity::High;
    }
    if serious_count == 1 || conditions.contains(&Condition::PregnancyBreastfeeding) {
        return ConditionSeverity::Moderate;
    }
    if conditions.is_empty() {
        ConditionSeverity::None
    } else {
        ConditionSeverity::Low
    }
}
