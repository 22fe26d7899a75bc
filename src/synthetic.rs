//! Deterministic synthetic profile sets
//!
//! Four categories exercise the engine end to end: edge cases at the input
//! boundaries, a grid of common profiles, medical-condition profiles, and
//! mental-health profiles. Every profile carries the ranges its analysis is
//! expected to fall in.

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::pipeline::AnalysisEngine;
use crate::rules::{
    default_rules, log_report, run_rules, BatchReport, RuleCategory, RuleOutcome, RuleResult,
    RuleSeverity,
};
use crate::types::{
    AlcoholLevel, AnalysisResult, BurnoutLevel, Demographics, EnergyLevel, Gender, HealthMetrics,
    LifestyleFactors, MedicalData, MindfulnessPractice, ProfileInput, SocialSupport, StressLevel,
    UrgencyLevel, WeightDirection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntheticCategory {
    EdgeCase,
    Common,
    Medical,
    MentalHealth,
}

impl SyntheticCategory {
    pub const ALL: [SyntheticCategory; 4] = [
        SyntheticCategory::EdgeCase,
        SyntheticCategory::Common,
        SyntheticCategory::Medical,
        SyntheticCategory::MentalHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticCategory::EdgeCase => "edge-case",
            SyntheticCategory::Common => "common",
            SyntheticCategory::Medical => "medical",
            SyntheticCategory::MentalHealth => "mental-health",
        }
    }
}

impl fmt::Display for SyntheticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyntheticCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "edge" | "edge-case" => Ok(SyntheticCategory::EdgeCase),
            "common" => Ok(SyntheticCategory::Common),
            "medical" => Ok(SyntheticCategory::Medical),
            "mental" | "mental-health" => Ok(SyntheticCategory::MentalHealth),
            other => Err(format!("unknown synthetic category: {other}")),
        }
    }
}

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub const fn exactly(value: f64) -> Self {
        Self::new(value, value)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Acceptable output ranges for one synthetic profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_direction: Option<WeightDirection>,
    pub steps: ValueRange,
    pub diabetes_risk: ValueRange,
    pub cardiovascular_risk: ValueRange,
    pub metabolic_syndrome_risk: ValueRange,
    pub mental_health_risk: ValueRange,
}

impl Default for ExpectedOutputs {
    fn default() -> Self {
        Self {
            weight_direction: None,
            steps: ValueRange::new(3_000.0, 15_000.0),
            diabetes_risk: ValueRange::new(0.0, 100.0),
            cardiovascular_risk: ValueRange::new(0.0, 95.0),
            metabolic_syndrome_risk: ValueRange::new(0.0, 90.0),
            mental_health_risk: ValueRange::new(0.0, 90.0),
        }
    }
}

impl ExpectedOutputs {
    /// Expectations implied by weight, height and condition tags alone
    pub fn for_profile(profile: &ProfileInput) -> Self {
        let d = &profile.demographics;
        let bmi = d.weight_kg / (d.height_cm / 100.0).powi(2);
        let mut expected = Self {
            weight_direction: if bmi < 18.5 {
                Some(WeightDirection::Gain)
            } else if bmi >= 25.0 {
                Some(WeightDirection::Loss)
            } else if bmi <= 24.9 {
                Some(WeightDirection::Maintain)
            } else {
                None
            },
            ..Self::default()
        };

        if bmi < 18.5 {
            expected.steps.max = expected.steps.max.min(6_500.0);
        }
        for tag in profile.condition_tags() {
            match tag.as_str() {
                "heart_condition" => expected.steps.max = expected.steps.max.min(6_000.0),
                "pregnancy_breastfeeding" => expected.steps.max = expected.steps.max.min(7_000.0),
                "diabetes_type1" | "diabetes_type2" => {
                    expected.diabetes_risk = ValueRange::exactly(100.0)
                }
                _ => {}
            }
        }
        expected
    }

    fn with_mental_health_risk(mut self, range: ValueRange) -> Self {
        self.mental_health_risk = range;
        self
    }

    /// Compare an analysis against these ranges
    pub fn check(&self, result: &AnalysisResult) -> Vec<RuleResult> {
        let risk = &result.risk_analysis;
        let mut outcomes = vec![
            (
                "expected.steps",
                range_outcome(&self.steps, f64::from(result.personalized_targets.steps.target_steps)),
            ),
            ("expected.diabetes_risk", range_outcome(&self.diabetes_risk, risk.diabetes_risk)),
            (
                "expected.cardiovascular_risk",
                range_outcome(&self.cardiovascular_risk, risk.cardiovascular_risk),
            ),
            (
                "expected.metabolic_syndrome_risk",
                range_outcome(&self.metabolic_syndrome_risk, risk.metabolic_syndrome_risk),
            ),
            (
                "expected.mental_health_risk",
                range_outcome(&self.mental_health_risk, risk.mental_health_risk),
            ),
        ];
        if let Some(direction) = self.weight_direction {
            let actual = result.personalized_targets.weight.direction;
            outcomes.push((
                "expected.weight_direction",
                RuleOutcome::check(actual == direction, direction.as_str(), actual.as_str()),
            ));
        }

        outcomes
            .into_iter()
            .map(|(rule_id, outcome)| RuleResult {
                analysis_id: result.analysis_id.clone(),
                rule_id: rule_id.to_string(),
                category: RuleCategory::Expected,
                severity: RuleSeverity::High,
                passed: outcome.passed,
                expected: outcome.expected,
                actual: outcome.actual,
            })
            .collect()
    }
}

fn range_outcome(range: &ValueRange, value: f64) -> RuleOutcome {
    RuleOutcome::check(range.contains(value), range.to_string(), value)
}

/// One generated profile with its expectations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticProfile {
    pub id: String,
    pub category: SyntheticCategory,
    pub profile: ProfileInput,
    pub expected: ExpectedOutputs,
}

/// Generate the profile set for one category
pub fn generate(category: SyntheticCategory) -> Vec<SyntheticProfile> {
    match category {
        SyntheticCategory::EdgeCase => edge_cases(),
        SyntheticCategory::Common => common(),
        SyntheticCategory::Medical => medical(),
        SyntheticCategory::MentalHealth => mental_health(),
    }
}

/// Every category, in a fixed order
pub fn generate_all() -> Vec<SyntheticProfile> {
    SyntheticCategory::ALL.iter().flat_map(|c| generate(*c)).collect()
}

/// Analyze synthetic profiles in parallel; runs the default rules plus each
/// profile's own expectations
pub fn validate_synthetic(profiles: &[SyntheticProfile], engine: &AnalysisEngine) -> BatchReport {
    let rules = default_rules();
    let generated_at = Utc::now();

    let outcomes: Vec<Result<Vec<RuleResult>, String>> = profiles
        .par_iter()
        .map(|synthetic| {
            engine
                .analyze_at(&synthetic.profile, &synthetic.id, generated_at, synthetic.id.clone())
                .map(|result| {
                    let mut results = run_rules(&synthetic.profile, &result, &rules);
                    results.extend(synthetic.expected.check(&result));
                    results
                })
                .map_err(|e| format!("{}: {e}", synthetic.id))
        })
        .collect();

    let mut results = Vec::new();
    let mut analysis_errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(rule_results) => results.extend(rule_results),
            Err(message) => analysis_errors.push(message),
        }
    }

    let mut report = BatchReport::from_results(&results);
    report.total_profiles += analysis_errors.len();
    report.analysis_errors = analysis_errors;
    log_report(&report);
    report
}

// ============================================================================
// Builders
// ============================================================================

fn base_profile(age: u32, weight_kg: f64, height_cm: f64, gender: Gender) -> ProfileInput {
    ProfileInput {
        demographics: Demographics {
            age,
            weight_kg,
            height_cm,
            gender,
        },
        health_metrics: HealthMetrics::uniform(5),
        lifestyle: LifestyleFactors::default(),
        medical_data: None,
    }
}

fn with_conditions(mut profile: ProfileInput, tags: &[&str]) -> ProfileInput {
    profile.medical_data = Some(MedicalData {
        conditions: tags.iter().map(|t| t.to_string()).collect(),
        has_critical_conditions: false,
    });
    profile
}

fn synthetic(id: impl Into<String>, category: SyntheticCategory, profile: ProfileInput) -> SyntheticProfile {
    let expected = ExpectedOutputs::for_profile(&profile);
    SyntheticProfile {
        id: id.into(),
        category,
        profile,
        expected,
    }
}

fn edge_cases() -> Vec<SyntheticProfile> {
    let category = SyntheticCategory::EdgeCase;
    let mut profiles = vec![
        synthetic("edge-underweight-45", category, base_profile(45, 50.0, 170.0, Gender::Female)),
        synthetic("edge-youngest", category, base_profile(5, 20.0, 110.0, Gender::Other)),
        synthetic("edge-oldest", category, base_profile(120, 60.0, 160.0, Gender::Female)),
        synthetic("edge-lightest", category, base_profile(30, 20.0, 150.0, Gender::Male)),
        synthetic("edge-heaviest", category, base_profile(40, 400.0, 200.0, Gender::Male)),
        synthetic("edge-tallest", category, base_profile(28, 110.0, 272.0, Gender::Male)),
        synthetic("edge-bmi-25", category, base_profile(35, 81.1, 180.0, Gender::Male)),
        synthetic("edge-bmi-18-5", category, base_profile(35, 60.0, 180.0, Gender::Female)),
    ];

    let mut worst = base_profile(64, 130.0, 170.0, Gender::Male);
    worst.health_metrics = HealthMetrics::uniform(1);
    worst.lifestyle = LifestyleFactors {
        is_smoker: true,
        alcohol_level: AlcoholLevel::Heavy,
        stress_level: StressLevel::High,
        energy_level: EnergyLevel::Low,
        mindfulness_practice: MindfulnessPractice::Never,
        social_support: SocialSupport::Unsupported,
        burnout_level: BurnoutLevel::High,
        urgency_level: UrgencyLevel::Low,
        ..LifestyleFactors::default()
    };
    let worst = with_conditions(
        worst,
        &["diabetes_type2", "high_blood_pressure", "heart_condition", "mental_health"],
    );
    profiles.push(synthetic("edge-worst-case", category, worst));

    let mut best = base_profile(25, 68.0, 178.0, Gender::Female);
    best.health_metrics = HealthMetrics::uniform(10);
    best.lifestyle = LifestyleFactors {
        energy_level: EnergyLevel::High,
        mindfulness_practice: MindfulnessPractice::Regularly,
        social_support: SocialSupport::Supported,
        urgency_level: UrgencyLevel::High,
        ..LifestyleFactors::default()
    };
    let best = synthetic("edge-best-case", category, best);
    let best = SyntheticProfile {
        expected: best
            .expected
            .clone()
            .with_mental_health_risk(ValueRange::new(0.0, 30.0)),
        ..best
    };
    profiles.push(best);

    let mut no_medical = base_profile(50, 75.0, 170.0, Gender::Other);
    no_medical.medical_data = Some(MedicalData {
        conditions: vec!["none".to_string(), String::new(), "unknown_tag".to_string()],
        has_critical_conditions: false,
    });
    profiles.push(synthetic("edge-empty-conditions", category, no_medical));

    profiles
}

/// Grid over age, BMI, gender and metric levels
fn common() -> Vec<SyntheticProfile> {
    const AGES: [u32; 5] = [22, 34, 47, 58, 68];
    const BMIS: [f64; 5] = [17.5, 21.0, 24.0, 27.5, 32.0];
    const HEIGHTS: [f64; 3] = [158.0, 170.0, 184.0];
    const GENDERS: [Gender; 3] = [Gender::Female, Gender::Male, Gender::Other];
    const URGENCIES: [UrgencyLevel; 3] = [UrgencyLevel::Low, UrgencyLevel::Medium, UrgencyLevel::High];

    let mut profiles = Vec::new();
    let mut index = 0usize;
    for age in AGES {
        for bmi in BMIS {
            let height = HEIGHTS[index % HEIGHTS.len()];
            let weight = (bmi * (height / 100.0).powi(2) * 10.0).round() / 10.0;
            let mut profile = base_profile(age, weight, height, GENDERS[index % GENDERS.len()]);
            // Spread metrics over 2..=9 deterministically
            let level = |offset: usize| ((index + offset) % 8 + 2) as u8;
            profile.health_metrics = HealthMetrics {
                hydration: level(0),
                sleep: level(3),
                exercise: level(5),
                nutrition: level(1),
            };
            profile.lifestyle.urgency_level = URGENCIES[index % URGENCIES.len()];
            profile.lifestyle.is_smoker = index % 6 == 0;
            profile.lifestyle.alcohol_level = match index % 4 {
                0 => AlcoholLevel::None,
                1 => AlcoholLevel::Light,
                2 => AlcoholLevel::Moderate,
                _ => AlcoholLevel::Heavy,
            };
            profiles.push(synthetic(
                format!("common-{index:02}"),
                SyntheticCategory::Common,
                profile,
            ));
            index += 1;
        }
    }
    profiles
}

fn medical() -> Vec<SyntheticProfile> {
    let category = SyntheticCategory::Medical;
    let cases: [(&str, u32, f64, f64, Gender, &[&str]); 12] = [
        ("medical-type2-obese", 52, 100.0, 165.0, Gender::Male, &["diabetes_type2"]),
        ("medical-type1", 24, 68.0, 175.0, Gender::Female, &["diabetes_type1"]),
        ("medical-heart", 61, 82.0, 172.0, Gender::Male, &["heart_condition"]),
        ("medical-heart-young-fit", 22, 70.0, 180.0, Gender::Male, &["heart_condition"]),
        ("medical-hypertension", 48, 88.0, 170.0, Gender::Female, &["high_blood_pressure"]),
        ("medical-kidney", 66, 72.0, 168.0, Gender::Other, &["kidney_disease"]),
        ("medical-liver", 55, 79.0, 176.0, Gender::Male, &["liver_disease"]),
        ("medical-thyroid", 38, 66.0, 162.0, Gender::Female, &["thyroid_disorder"]),
        ("medical-pregnancy", 29, 64.0, 165.0, Gender::Female, &["pregnancy_breastfeeding"]),
        (
            "medical-metabolic-pair",
            57,
            96.0,
            170.0,
            Gender::Male,
            &["diabetes_type2", "high_blood_pressure"],
        ),
        (
            "medical-triple",
            70,
            85.0,
            160.0,
            Gender::Female,
            &["kidney_disease", "liver_disease", "high_blood_pressure"],
        ),
        (
            "medical-underweight-heart-pregnant",
            31,
            47.0,
            168.0,
            Gender::Female,
            &["heart_condition", "pregnancy_breastfeeding"],
        ),
    ];

    cases
        .into_iter()
        .enumerate()
        .map(|(i, (id, age, weight, height, gender, tags))| {
            let mut profile = with_conditions(base_profile(age, weight, height, gender), tags);
            if id == "medical-heart-young-fit" {
                profile.health_metrics = HealthMetrics::uniform(9);
            } else {
                profile.health_metrics = HealthMetrics::uniform((i % 5 + 3) as u8);
            }
            synthetic(id, category, profile)
        })
        .collect()
}

fn mental_health() -> Vec<SyntheticProfile> {
    let category = SyntheticCategory::MentalHealth;
    let mut profiles = Vec::new();

    let mut isolated = base_profile(36, 70.0, 172.0, Gender::Other);
    isolated.lifestyle.stress_level = StressLevel::High;
    isolated.lifestyle.social_support = SocialSupport::Unsupported;
    let isolated = synthetic("mental-stress-unsupported", category, isolated);
    let expected = isolated
        .expected
        .clone()
        .with_mental_health_risk(ValueRange::new(50.0, 90.0));
    profiles.push(SyntheticProfile { expected, ..isolated });

    let mut burnout = base_profile(42, 74.0, 168.0, Gender::Female);
    burnout.health_metrics.sleep = 2;
    burnout.lifestyle = LifestyleFactors {
        stress_level: StressLevel::High,
        social_support: SocialSupport::Unsupported,
        burnout_level: BurnoutLevel::High,
        energy_level: EnergyLevel::Low,
        mindfulness_practice: MindfulnessPractice::Never,
        ..LifestyleFactors::default()
    };
    let burnout = synthetic(
        "mental-burnout-diagnosed",
        category,
        with_conditions(burnout, &["mental_health"]),
    );
    let expected = burnout
        .expected
        .clone()
        .with_mental_health_risk(ValueRange::exactly(90.0));
    profiles.push(SyntheticProfile { expected, ..burnout });

    let mut grounded = base_profile(33, 65.0, 170.0, Gender::Male);
    grounded.lifestyle = LifestyleFactors {
        social_support: SocialSupport::Supported,
        mindfulness_practice: MindfulnessPractice::Regularly,
        ..LifestyleFactors::default()
    };
    let grounded = synthetic("mental-supported-mindful", category, grounded);
    let expected = grounded
        .expected
        .clone()
        .with_mental_health_risk(ValueRange::new(0.0, 40.0));
    profiles.push(SyntheticProfile { expected, ..grounded });

    // Stress x support grid
    let stresses = [StressLevel::Low, StressLevel::Moderate, StressLevel::High];
    let supports = [SocialSupport::Supported, SocialSupport::Mixed, SocialSupport::Unsupported];
    for (i, stress) in stresses.into_iter().enumerate() {
        for (j, support) in supports.into_iter().enumerate() {
            let mut profile = base_profile(27 + (i * 3 + j) as u32 * 4, 68.0, 170.0, Gender::Female);
            profile.lifestyle.stress_level = stress;
            profile.lifestyle.social_support = support;
            profile.lifestyle.burnout_level = match j {
                0 => BurnoutLevel::Low,
                1 => BurnoutLevel::Moderate,
                _ => BurnoutLevel::High,
            };
            profiles.push(synthetic(format!("mental-grid-{i}{j}"), category, profile));
        }
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_profile, HEIGHT_RANGE_CM, WEIGHT_RANGE_KG};
    use std::collections::BTreeSet;

    #[test]
    fn test_generation_is_deterministic() {
        for category in SyntheticCategory::ALL {
            assert_eq!(generate(category), generate(category));
        }
    }

    #[test]
    fn test_ids_unique_and_profiles_valid() {
        let all = generate_all();
        let ids: BTreeSet<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
        for synthetic in &all {
            assert!(validate_profile(&synthetic.profile).is_ok(), "{}", synthetic.id);
        }
    }

    #[test]
    fn test_edge_cases_within_profile_bounds() {
        let engine = AnalysisEngine::new();
        for synthetic in generate(SyntheticCategory::EdgeCase) {
            let demographics = &synthetic.profile.demographics;
            assert!(WEIGHT_RANGE_KG.contains(&demographics.weight_kg), "{}", synthetic.id);
            assert!(HEIGHT_RANGE_CM.contains(&demographics.height_cm), "{}", synthetic.id);
            assert!(engine.analyze(&synthetic.profile, "Edge").is_ok(), "{}", synthetic.id);
        }
    }

    #[test]
    fn test_category_sizes() {
        assert_eq!(generate(SyntheticCategory::Common).len(), 25);
        assert_eq!(generate(SyntheticCategory::Medical).len(), 12);
        assert!(generate(SyntheticCategory::EdgeCase).len() >= 10);
        assert!(generate(SyntheticCategory::MentalHealth).len() >= 10);
    }

    #[test]
    fn test_expectations_follow_tags() {
        let medical = generate(SyntheticCategory::Medical);
        let heart = medical.iter().find(|p| p.id == "medical-heart").unwrap();
        assert_eq!(heart.expected.steps.max, 6_000.0);
        let type2 = medical.iter().find(|p| p.id == "medical-type2-obese").unwrap();
        assert_eq!(type2.expected.diabetes_risk, ValueRange::exactly(100.0));
        assert_eq!(type2.expected.weight_direction, Some(WeightDirection::Loss));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("edge".parse::<SyntheticCategory>(), Ok(SyntheticCategory::EdgeCase));
        assert_eq!(
            "mental-health".parse::<SyntheticCategory>(),
            Ok(SyntheticCategory::MentalHealth)
        );
        assert!("unknown".parse::<SyntheticCategory>().is_err());
    }

    #[test]
    fn test_all_synthetic_profiles_pass() {
        let report = validate_synthetic(&generate_all(), &AnalysisEngine::new());
        assert!(report.analysis_errors.is_empty(), "{:?}", report.analysis_errors);
        assert_eq!(report.failures, Vec::<RuleResult>::new());
        assert!(!report.has_blocking_failures());
        assert_eq!(report.pass_rate, 100.0);
    }
}
