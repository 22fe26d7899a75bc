//! Compound risk calculation
//!
//! Computes four risk percentages (diabetes, cardiovascular, metabolic syndrome,
//! mental health). Each dimension starts from a baseline, adds band and
//! categorical deltas plus compound-effect bonuses when two adverse factors
//! co-occur, and is clamped to its ceiling.
//!
//! Inputs are assumed validated: negative ages or non-positive heights are a
//! caller precondition (see `validation`).

use crate::modifiers::{Band, BandTable, ScoreCard};
use crate::types::{
    AlcoholLevel, BmiCategory, BurnoutLevel, CompoundRiskAnalysis, ConditionAnalysis,
    EnergyLevel, Gender, HealthMetrics, LifestyleFactors, MindfulnessPractice, ProfileInput,
    RiskLevel, SocialSupport, StressLevel,
};
use std::collections::HashMap;

pub const DIABETES_CEILING: f64 = 100.0;
pub const CARDIOVASCULAR_CEILING: f64 = 95.0;
pub const METABOLIC_CEILING: f64 = 90.0;
pub const MENTAL_HEALTH_CEILING: f64 = 90.0;

/// Maximum number of primary risk factors reported
const MAX_PRIMARY_FACTORS: usize = 5;

const INF: f64 = f64::INFINITY;

// Diabetes tables

const DIABETES_AGE: BandTable = BandTable::new(
    "Age",
    &[
        Band::new(30.0, 45.0, 5.0),
        Band::new(45.0, 60.0, 10.0),
        Band::new(60.0, INF, 15.0),
    ],
);

const DIABETES_BMI: BandTable = BandTable::new(
    "Elevated BMI",
    &[
        Band::new(25.0, 30.0, 10.0),
        Band::new(30.0, 35.0, 20.0),
        Band::new(35.0, INF, 30.0),
    ],
);

const DIABETES_EXERCISE: BandTable = BandTable::with_relief(
    "Low physical activity",
    "Regular exercise",
    &[
        Band::new(0.0, 4.0, 10.0),
        Band::new(4.0, 7.0, 5.0),
        Band::new(8.0, INF, -5.0),
    ],
);

const DIABETES_NUTRITION: BandTable = BandTable::with_relief(
    "Poor nutrition",
    "Good nutrition",
    &[
        Band::new(0.0, 4.0, 10.0),
        Band::new(4.0, 7.0, 5.0),
        Band::new(8.0, INF, -5.0),
    ],
);

const POOR_SLEEP_MILD: BandTable = BandTable::new("Poor sleep", &[Band::new(0.0, 4.0, 5.0)]);

// Cardiovascular tables

const CARDIO_AGE: BandTable = BandTable::new(
    "Age",
    &[
        Band::new(30.0, 45.0, 5.0),
        Band::new(45.0, 60.0, 15.0),
        Band::new(60.0, INF, 25.0),
    ],
);

const CARDIO_BMI: BandTable = BandTable::new(
    "Elevated BMI",
    &[
        Band::new(25.0, 30.0, 5.0),
        Band::new(30.0, 35.0, 15.0),
        Band::new(35.0, INF, 20.0),
    ],
);

const CARDIO_EXERCISE: BandTable = BandTable::with_relief(
    "Low physical activity",
    "Regular exercise",
    &[Band::new(0.0, 4.0, 10.0), Band::new(8.0, INF, -5.0)],
);

// Metabolic syndrome tables

const METABOLIC_AGE: BandTable = BandTable::new(
    "Age",
    &[
        Band::new(30.0, 45.0, 5.0),
        Band::new(45.0, 60.0, 10.0),
        Band::new(60.0, INF, 15.0),
    ],
);

const METABOLIC_BMI: BandTable = BandTable::new(
    "Elevated BMI",
    &[
        Band::new(25.0, 30.0, 15.0),
        Band::new(30.0, 35.0, 25.0),
        Band::new(35.0, INF, 30.0),
    ],
);

const LOW_EXERCISE: BandTable =
    BandTable::new("Low physical activity", &[Band::new(0.0, 4.0, 10.0)]);

const LOW_NUTRITION: BandTable = BandTable::new("Poor nutrition", &[Band::new(0.0, 4.0, 10.0)]);

// Mental health tables

const MENTAL_SLEEP: BandTable = BandTable::new("Poor sleep", &[Band::new(0.0, 4.0, 10.0)]);

const MENTAL_EXERCISE: BandTable =
    BandTable::new("Regular exercise", &[Band::new(8.0, INF, -5.0)]);

/// Body mass index from weight (kg) and height (cm)
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else if bmi < 35.0 {
        BmiCategory::Obese
    } else {
        BmiCategory::SeverelyObese
    }
}

/// Inputs to the risk calculator
#[derive(Debug, Clone, Copy)]
pub struct RiskInputs<'a> {
    pub age: u32,
    pub gender: Gender,
    pub bmi: f64,
    pub metrics: HealthMetrics,
    pub lifestyle: LifestyleFactors,
    pub conditions: &'a ConditionAnalysis,
}

impl<'a> RiskInputs<'a> {
    pub fn from_profile(profile: &ProfileInput, conditions: &'a ConditionAnalysis) -> Self {
        let demographics = &profile.demographics;
        Self {
            age: demographics.age,
            gender: demographics.gender,
            bmi: bmi(demographics.weight_kg, demographics.height_cm),
            metrics: profile.health_metrics,
            lifestyle: profile.lifestyle,
            conditions,
        }
    }
}

/// Compute all four compound risks
pub fn compound_risk(inputs: &RiskInputs<'_>) -> CompoundRiskAnalysis {
    let diabetes = diabetes_card(inputs);
    let cardiovascular = cardiovascular_card(inputs);
    let metabolic = metabolic_card(inputs);
    let mental = mental_health_card(inputs);

    let diabetes_risk = if inputs.conditions.has_diabetes {
        DIABETES_CEILING
    } else {
        diabetes.clamped(0.0, DIABETES_CEILING)
    };
    let cardiovascular_risk = cardiovascular.clamped(0.0, CARDIOVASCULAR_CEILING);
    let metabolic_syndrome_risk = metabolic.clamped(0.0, METABOLIC_CEILING);
    let mental_health_risk = mental.clamped(0.0, MENTAL_HEALTH_CEILING);

    let physical_mean = (diabetes_risk + cardiovascular_risk + metabolic_syndrome_risk) / 3.0;

    let mut primary_risk_factors = Vec::new();
    if inputs.conditions.has_diabetes {
        primary_risk_factors.push("Diagnosed diabetes".to_string());
    }
    for label in rank_factors(&[&diabetes, &cardiovascular, &metabolic, &mental]) {
        if primary_risk_factors.len() >= MAX_PRIMARY_FACTORS {
            break;
        }
        if !primary_risk_factors.iter().any(|f| f == label) {
            primary_risk_factors.push(label.to_string());
        }
    }

    CompoundRiskAnalysis {
        diabetes_risk,
        cardiovascular_risk,
        metabolic_syndrome_risk,
        mental_health_risk,
        overall_risk_level: overall_risk_level(physical_mean),
        primary_risk_factors,
    }
}

/// Threshold classification of the mean physical risk
pub fn overall_risk_level(mean_physical_risk: f64) -> RiskLevel {
    if mean_physical_risk >= 60.0 {
        RiskLevel::Critical
    } else if mean_physical_risk >= 40.0 {
        RiskLevel::High
    } else if mean_physical_risk >= 20.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

fn diabetes_card(inputs: &RiskInputs<'_>) -> ScoreCard {
    let metrics = &inputs.metrics;
    let lifestyle = &inputs.lifestyle;
    let conditions = inputs.conditions;

    let mut card = ScoreCard::new(10.0);
    card.band(&DIABETES_AGE, inputs.age as f64)
        .band(&DIABETES_BMI, inputs.bmi)
        .band(&DIABETES_EXERCISE, metrics.exercise as f64)
        .band(&DIABETES_NUTRITION, metrics.nutrition as f64)
        .band(&POOR_SLEEP_MILD, metrics.sleep as f64)
        .when(lifestyle.stress_level == StressLevel::High, "High stress", 5.0)
        .when(lifestyle.is_smoker, "Smoking", 5.0)
        .when(conditions.has_high_blood_pressure, "High blood pressure", 10.0)
        .when(conditions.is_pregnant, "Pregnancy", 5.0)
        .when(
            inputs.bmi >= 30.0 && metrics.exercise <= 3,
            "Obesity with inactivity",
            10.0,
        );
    card
}

/// Stress contribution shared by the cardiovascular and mental health cards
fn stress_modifier(level: StressLevel) -> (&'static str, f64) {
    match level {
        StressLevel::Low => ("Stress", 0.0),
        StressLevel::Moderate => ("Moderate stress", 5.0),
        StressLevel::High => ("High stress", 10.0),
    }
}

fn cardiovascular_card(inputs: &RiskInputs<'_>) -> ScoreCard {
    let metrics = &inputs.metrics;
    let lifestyle = &inputs.lifestyle;
    let conditions = inputs.conditions;

    let (stress_label, stress) = stress_modifier(lifestyle.stress_level);
    let alcohol = match lifestyle.alcohol_level {
        AlcoholLevel::None | AlcoholLevel::Light => 0.0,
        AlcoholLevel::Moderate => 5.0,
        AlcoholLevel::Heavy => 15.0,
    };

    let mut card = ScoreCard::new(10.0);
    card.band(&CARDIO_AGE, inputs.age as f64)
        .when(inputs.gender == Gender::Male, "Male sex", 5.0)
        .when(lifestyle.is_smoker, "Smoking", 20.0)
        .band(&CARDIO_BMI, inputs.bmi)
        .band(&CARDIO_EXERCISE, metrics.exercise as f64)
        .add(stress_label, stress)
        .add("Alcohol use", alcohol)
        .when(conditions.has_high_blood_pressure, "High blood pressure", 20.0)
        .when(conditions.has_heart_condition, "Heart condition", 30.0)
        .when(conditions.has_diabetes, "Diagnosed diabetes", 15.0)
        .when(conditions.has_kidney_disease, "Kidney disease", 10.0)
        .when(
            lifestyle.is_smoker && conditions.has_high_blood_pressure,
            "Smoking with high blood pressure",
            10.0,
        )
        .when(
            lifestyle.stress_level == StressLevel::High && metrics.exercise <= 3,
            "Stress with inactivity",
            5.0,
        );
    card
}

fn metabolic_card(inputs: &RiskInputs<'_>) -> ScoreCard {
    let metrics = &inputs.metrics;
    let conditions = inputs.conditions;

    let mut card = ScoreCard::new(5.0);
    card.band(&METABOLIC_AGE, inputs.age as f64)
        .band(&METABOLIC_BMI, inputs.bmi)
        .band(&LOW_EXERCISE, metrics.exercise as f64)
        .band(&LOW_NUTRITION, metrics.nutrition as f64)
        .band(&POOR_SLEEP_MILD, metrics.sleep as f64)
        .when(
            inputs.lifestyle.alcohol_level == AlcoholLevel::Heavy,
            "Alcohol use",
            10.0,
        )
        .when(conditions.has_diabetes, "Diagnosed diabetes", 20.0)
        .when(conditions.has_high_blood_pressure, "High blood pressure", 15.0)
        .when(conditions.has_thyroid_disorder, "Thyroid disorder", 5.0)
        .when(
            inputs.bmi >= 30.0 && metrics.exercise <= 3,
            "Obesity with inactivity",
            10.0,
        );
    card
}

fn mental_health_card(inputs: &RiskInputs<'_>) -> ScoreCard {
    let lifestyle = &inputs.lifestyle;
    let metrics = &inputs.metrics;
    let conditions = inputs.conditions;

    let (stress_label, stress) = stress_modifier(lifestyle.stress_level);
    let (support_label, support) = match lifestyle.social_support {
        SocialSupport::Supported => ("Strong social support", -10.0),
        SocialSupport::Mixed => ("Limited social support", 5.0),
        SocialSupport::Unsupported => ("Limited social support", 20.0),
    };
    let burnout = match lifestyle.burnout_level {
        BurnoutLevel::Low => 0.0,
        BurnoutLevel::Moderate => 5.0,
        BurnoutLevel::High => 15.0,
    };
    let (energy_label, energy) = match lifestyle.energy_level {
        EnergyLevel::Low => ("Low energy", 10.0),
        EnergyLevel::Medium => ("Energy", 0.0),
        EnergyLevel::High => ("High energy", -5.0),
    };
    let (mindfulness_label, mindfulness) = match lifestyle.mindfulness_practice {
        MindfulnessPractice::Never => ("No mindfulness practice", 5.0),
        MindfulnessPractice::Occasionally => ("Occasional mindfulness", 0.0),
        MindfulnessPractice::Regularly => ("Regular mindfulness", -10.0),
    };

    let mut card = ScoreCard::new(30.0);
    card.add(stress_label, stress)
        .add(support_label, support)
        .add("Burnout", burnout)
        .add(energy_label, energy)
        .add(mindfulness_label, mindfulness)
        .band(&MENTAL_SLEEP, metrics.sleep as f64)
        .band(&MENTAL_EXERCISE, metrics.exercise as f64)
        .when(
            lifestyle.alcohol_level == AlcoholLevel::Heavy,
            "Alcohol use",
            10.0,
        )
        .when(conditions.has_mental_health_condition, "Mental health condition", 20.0)
        .when(conditions.has_thyroid_disorder, "Thyroid disorder", 5.0)
        .when(
            lifestyle.stress_level == StressLevel::High
                && lifestyle.social_support == SocialSupport::Unsupported,
            "Stress without support",
            15.0,
        )
        .when(
            lifestyle.burnout_level == BurnoutLevel::High && metrics.sleep <= 3,
            "Burnout with poor sleep",
            10.0,
        );
    card
}

/// Positive contributions aggregated by label, largest first
fn rank_factors<'c>(cards: &[&'c ScoreCard]) -> Vec<&'c str> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for card in cards {
        for modifier in card.modifiers().iter().filter(|m| m.delta > 0.0) {
            *totals.entry(modifier.label).or_insert(0.0) += modifier.delta;
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(label, _)| label).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckupFrequency;

    fn neutral_lifestyle() -> LifestyleFactors {
        LifestyleFactors {
            is_smoker: false,
            alcohol_level: AlcoholLevel::None,
            stress_level: StressLevel::Low,
            checkup_frequency: CheckupFrequency::Annually,
            urgency_level: crate::types::UrgencyLevel::Medium,
            energy_level: EnergyLevel::Medium,
            mindfulness_practice: MindfulnessPractice::Occasionally,
            social_support: SocialSupport::Mixed,
            burnout_level: BurnoutLevel::Low,
        }
    }

    fn inputs<'a>(
        age: u32,
        weight: f64,
        height: f64,
        lifestyle: LifestyleFactors,
        conditions: &'a ConditionAnalysis,
    ) -> RiskInputs<'a> {
        RiskInputs {
            age,
            gender: Gender::Female,
            bmi: bmi(weight, height),
            metrics: HealthMetrics::uniform(5),
            lifestyle,
            conditions,
        }
    }

    #[test]
    fn test_bmi_and_category() {
        let value = bmi(50.0, 170.0);
        assert!((value - 17.30).abs() < 0.01);
        assert_eq!(bmi_category(value), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.99), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
        assert_eq!(bmi_category(bmi(100.0, 165.0)), BmiCategory::SeverelyObese);
    }

    #[test]
    fn test_underweight_45_year_old_diabetes_modifiers() {
        let conditions = ConditionAnalysis::default();
        let risk = compound_risk(&inputs(45, 50.0, 170.0, neutral_lifestyle(), &conditions));
        // baseline 10 + age 10 + exercise 5 + nutrition 5, no BMI penalty
        assert_eq!(risk.diabetes_risk, 30.0);
    }

    #[test]
    fn test_diagnosed_diabetes_is_exactly_100() {
        let conditions = ConditionAnalysis::classify(&["diabetes_type2"], false);
        let risk = compound_risk(&inputs(25, 100.0, 165.0, neutral_lifestyle(), &conditions));
        assert_eq!(risk.diabetes_risk, 100.0);
        assert_eq!(risk.primary_risk_factors[0], "Diagnosed diabetes");

        let mut healthy = inputs(20, 60.0, 175.0, neutral_lifestyle(), &conditions);
        healthy.metrics = HealthMetrics::uniform(10);
        assert_eq!(compound_risk(&healthy).diabetes_risk, 100.0);
    }

    #[test]
    fn test_stress_without_support_mental_health() {
        let conditions = ConditionAnalysis::default();
        let mut lifestyle = neutral_lifestyle();
        lifestyle.stress_level = StressLevel::High;
        lifestyle.social_support = SocialSupport::Unsupported;

        let risk = compound_risk(&inputs(35, 70.0, 175.0, lifestyle, &conditions));
        assert!(risk.mental_health_risk >= 50.0);
        assert!(risk.mental_health_risk <= MENTAL_HEALTH_CEILING);
        assert!(risk
            .primary_risk_factors
            .iter()
            .any(|f| f == "Limited social support"));
    }

    fn labels(card: &ScoreCard) -> Vec<(&'static str, f64)> {
        card.modifiers().iter().map(|m| (m.label, m.delta)).collect()
    }

    #[test]
    fn test_factor_labels_follow_level() {
        let conditions = ConditionAnalysis::default();
        let mut lifestyle = neutral_lifestyle();
        lifestyle.stress_level = StressLevel::Moderate;
        let moderate = inputs(35, 70.0, 175.0, lifestyle, &conditions);

        let cardio = labels(&cardiovascular_card(&moderate));
        assert!(cardio.contains(&("Moderate stress", 5.0)));
        assert!(cardio.iter().all(|(label, _)| *label != "High stress"));
        assert!(labels(&mental_health_card(&moderate)).contains(&("Moderate stress", 5.0)));

        let lifestyle = LifestyleFactors {
            energy_level: EnergyLevel::High,
            mindfulness_practice: MindfulnessPractice::Regularly,
            social_support: SocialSupport::Supported,
            ..neutral_lifestyle()
        };
        let supported = inputs(35, 70.0, 175.0, lifestyle, &conditions);
        let mental = labels(&mental_health_card(&supported));
        assert!(mental.contains(&("High energy", -5.0)));
        assert!(mental.contains(&("Regular mindfulness", -10.0)));
        assert!(mental.contains(&("Strong social support", -10.0)));
        assert!(!mental.iter().any(|(label, _)| matches!(
            *label,
            "Low energy" | "No mindfulness practice" | "Limited social support"
        )));

        let mut active = supported;
        active.metrics = HealthMetrics::uniform(10);
        let diabetes = labels(&diabetes_card(&active));
        assert!(diabetes.contains(&("Regular exercise", -5.0)));
        assert!(diabetes.contains(&("Good nutrition", -5.0)));
        assert!(labels(&cardiovascular_card(&active)).contains(&("Regular exercise", -5.0)));
    }

    #[test]
    fn test_worst_case_respects_ceilings() {
        let conditions = ConditionAnalysis::classify(
            &[
                "heart_condition",
                "high_blood_pressure",
                "kidney_disease",
                "mental_health",
                "thyroid_disorder",
            ],
            true,
        );
        let lifestyle = LifestyleFactors {
            is_smoker: true,
            alcohol_level: AlcoholLevel::Heavy,
            stress_level: StressLevel::High,
            energy_level: EnergyLevel::Low,
            mindfulness_practice: MindfulnessPractice::Never,
            social_support: SocialSupport::Unsupported,
            burnout_level: BurnoutLevel::High,
            ..neutral_lifestyle()
        };
        let mut risk_inputs = inputs(80, 140.0, 160.0, lifestyle, &conditions);
        risk_inputs.gender = Gender::Male;
        risk_inputs.metrics = HealthMetrics::uniform(1);

        let risk = compound_risk(&risk_inputs);
        assert_eq!(risk.diabetes_risk, 100.0);
        assert_eq!(risk.cardiovascular_risk, CARDIOVASCULAR_CEILING);
        assert_eq!(risk.metabolic_syndrome_risk, METABOLIC_CEILING);
        assert_eq!(risk.mental_health_risk, MENTAL_HEALTH_CEILING);
        assert_eq!(risk.overall_risk_level, RiskLevel::Critical);
        assert!(risk.primary_risk_factors.len() <= MAX_PRIMARY_FACTORS);
    }

    #[test]
    fn test_best_case_floors_at_zero() {
        let conditions = ConditionAnalysis::default();
        let lifestyle = LifestyleFactors {
            energy_level: EnergyLevel::High,
            mindfulness_practice: MindfulnessPractice::Regularly,
            social_support: SocialSupport::Supported,
            ..neutral_lifestyle()
        };
        let mut risk_inputs = inputs(22, 65.0, 175.0, lifestyle, &conditions);
        risk_inputs.metrics = HealthMetrics::uniform(10);

        let risk = compound_risk(&risk_inputs);
        assert!(risk.diabetes_risk >= 0.0);
        assert!(risk.mental_health_risk >= 0.0);
        assert_eq!(risk.overall_risk_level, RiskLevel::Low);
        assert!(risk.primary_risk_factors.is_empty());
    }

    #[test]
    fn test_overall_risk_thresholds() {
        assert_eq!(overall_risk_level(60.0), RiskLevel::Critical);
        assert_eq!(overall_risk_level(59.9), RiskLevel::High);
        assert_eq!(overall_risk_level(40.0), RiskLevel::High);
        assert_eq!(overall_risk_level(20.0), RiskLevel::Moderate);
        assert_eq!(overall_risk_level(19.9), RiskLevel::Low);
    }
}
