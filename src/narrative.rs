//! Templated narrative over the computed analysis
//!
//! Prose only restates numbers already present in the result; nothing here
//! feeds back into scoring.

use crate::types::{
    AnalysisResult, ConditionSeverity, NarrativeSections, RiskLevel, WeightDirection,
};

/// Render all narrative sections for a finished analysis
pub fn render(result: &AnalysisResult) -> NarrativeSections {
    NarrativeSections {
        headline: headline(result),
        summary: summary(result),
        risk_summary: risk_summary(result),
        recommendations: recommendations(result),
        medical_notes: medical_notes(result),
    }
}

fn headline(result: &AnalysisResult) -> String {
    let name = result.user_profile.display_name.trim();
    let subject = if name.is_empty() {
        "Your".to_string()
    } else {
        format!("{name}'s")
    };
    format!(
        "{subject} health score is {:.1} ({})",
        result.overall_score, result.overall_grade
    )
}

fn summary(result: &AnalysisResult) -> String {
    let profile = &result.user_profile;
    let projection = &result.ninety_day_projection;
    format!(
        "At {} years with a BMI of {:.1} ({}), following the plan at {:.0}% \
         compliance moves your health score from {:.1} to {:.1} in {} weeks.",
        profile.age,
        profile.bmi,
        profile.bmi_category.label().to_lowercase(),
        projection.compliance_rate * 100.0,
        projection.health_score.current,
        projection.health_score.projected,
        projection.weeks,
    )
}

fn risk_summary(result: &AnalysisResult) -> String {
    let risk = &result.risk_analysis;
    let level = match risk.overall_risk_level {
        RiskLevel::Low => "low",
        RiskLevel::Moderate => "moderate",
        RiskLevel::High => "elevated",
        RiskLevel::Critical => "very high",
    };
    let mut text = format!(
        "Overall risk is {level}: diabetes {:.0}%, cardiovascular {:.0}%, \
         metabolic syndrome {:.0}%, mental health {:.0}%.",
        risk.diabetes_risk,
        risk.cardiovascular_risk,
        risk.metabolic_syndrome_risk,
        risk.mental_health_risk,
    );
    if !risk.primary_risk_factors.is_empty() {
        text.push_str(" Main contributors: ");
        text.push_str(&risk.primary_risk_factors.join(", ").to_lowercase());
        text.push('.');
    }
    text
}

fn recommendations(result: &AnalysisResult) -> Vec<String> {
    let targets = &result.personalized_targets;
    let mut items = vec![
        format!(
            "Sleep {:.1} hours a night (currently about {:.1}).",
            targets.sleep.target_hours, targets.sleep.current_hours
        ),
        format!(
            "Drink {:.1} L of water a day.",
            targets.hydration.target_liters
        ),
        format!(
            "Walk {} steps a day and exercise {} minutes a week.",
            targets.steps.target_steps, targets.exercise.minutes_per_week
        ),
    ];

    let weight = &targets.weight;
    match weight.direction {
        WeightDirection::Loss => items.push(format!(
            "Lose {:.1} kg at about {:.1} kg per week to reach {:.1} kg.",
            weight.excess_kg, weight.weekly_rate_kg, weight.target_kg
        )),
        WeightDirection::Gain => items.push(format!(
            "Gain {:.1} kg at about {:.2} kg per week to reach {:.1} kg.",
            weight.deficit_kg, weight.weekly_rate_kg, weight.target_kg
        )),
        WeightDirection::Maintain => {
            items.push("Maintain your current weight.".to_string())
        }
    }
    items
}

fn medical_notes(result: &AnalysisResult) -> Vec<String> {
    let conditions = &result.condition_analysis;
    let mut notes = Vec::new();

    if conditions.severity >= ConditionSeverity::High {
        notes.push(
            "Your conditions need medical supervision; confirm this plan with your doctor before starting."
                .to_string(),
        );
    }
    if let Some(reason) = &result.personalized_targets.steps.cap_reason {
        notes.push(format!("Step target limited: {reason}."));
    }
    if conditions.has_diabetes {
        notes.push("Monitor blood glucose when changing diet or activity.".to_string());
    }
    if conditions.has_kidney_disease {
        notes.push("Fluid intake is capped; follow your nephrologist's guidance.".to_string());
    }
    if conditions.is_pregnant {
        notes.push("Targets are adjusted for pregnancy or breastfeeding.".to_string());
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::AnalysisEngine;
    use crate::types::{
        Demographics, Gender, HealthMetrics, LifestyleFactors, MedicalData, ProfileInput,
    };

    fn analysis(name: &str, conditions: &[&str]) -> AnalysisResult {
        let profile = ProfileInput {
            demographics: Demographics {
                age: 52,
                weight_kg: 98.0,
                height_cm: 172.0,
                gender: Gender::Male,
            },
            health_metrics: HealthMetrics::uniform(4),
            lifestyle: LifestyleFactors::default(),
            medical_data: Some(MedicalData {
                conditions: conditions.iter().map(|c| c.to_string()).collect(),
                has_critical_conditions: false,
            }),
        };
        AnalysisEngine::default().analyze(&profile, name).unwrap()
    }

    #[test]
    fn test_headline_uses_display_name() {
        let result = analysis("Sam", &[]);
        assert!(result.narrative.headline.starts_with("Sam's health score is 40.0"));
        let anonymous = analysis("  ", &[]);
        assert!(anonymous.narrative.headline.starts_with("Your health score"));
    }

    #[test]
    fn test_recommendations_cover_weight_direction() {
        let result = analysis("Sam", &[]);
        assert!(result
            .narrative
            .recommendations
            .iter()
            .any(|r| r.starts_with("Lose")));
    }

    #[test]
    fn test_medical_notes_for_heart_condition() {
        let result = analysis("Sam", &["heart_condition", "diabetes_type2"]);
        let notes = &result.narrative.medical_notes;
        assert!(notes.iter().any(|n| n.contains("medical supervision")));
        assert!(notes.iter().any(|n| n.starts_with("Step target limited")));
        assert!(notes.iter().any(|n| n.contains("blood glucose")));
    }

    #[test]
    fn test_no_medical_notes_without_conditions() {
        assert!(analysis("Sam", &[]).narrative.medical_notes.is_empty());
    }
}
