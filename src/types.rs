//! Core types for the Healthprint pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! analysis: the profile input, condition analysis, compound risks, personalized
//! targets, the 90-day projection, the roadmap, and the final result envelope.
//!
//! All types serialize to camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Profile input
// ============================================================================

/// Self-reported gender, used for hydration and cardiovascular adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlcoholLevel {
    #[default]
    None,
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    #[default]
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckupFrequency {
    Never,
    Rarely,
    #[default]
    Annually,
    Biannually,
    Regularly,
}

/// How quickly the user wants to see change; drives compliance and pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MindfulnessPractice {
    Never,
    #[default]
    Occasionally,
    Regularly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialSupport {
    Supported,
    Unsupported,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnoutLevel {
    #[default]
    Low,
    Moderate,
    High,
}

/// Basic demographics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    /// Age in years
    pub age: u32,
    /// Body weight (kg)
    pub weight_kg: f64,
    /// Height (cm)
    pub height_cm: f64,
    pub gender: Gender,
}

/// Self-assessed health metrics, each scored 1-10
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub hydration: u8,
    pub sleep: u8,
    pub exercise: u8,
    pub nutrition: u8,
}

impl HealthMetrics {
    /// All four metrics set to the same score
    pub fn uniform(score: u8) -> Self {
        Self {
            hydration: score,
            sleep: score,
            exercise: score,
            nutrition: score,
        }
    }

    pub fn as_array(&self) -> [u8; 4] {
        [self.hydration, self.sleep, self.exercise, self.nutrition]
    }
}

/// Lifestyle factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifestyleFactors {
    pub is_smoker: bool,
    pub alcohol_level: AlcoholLevel,
    pub stress_level: StressLevel,
    pub checkup_frequency: CheckupFrequency,
    pub urgency_level: UrgencyLevel,
    pub energy_level: EnergyLevel,
    pub mindfulness_practice: MindfulnessPractice,
    pub social_support: SocialSupport,
    pub burnout_level: BurnoutLevel,
}

/// Optional medical data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalData {
    /// Raw condition tags (e.g. "diabetes_type2", "heart_condition")
    pub conditions: Vec<String>,
    /// User-declared flag for conditions requiring medical supervision
    pub has_critical_conditions: bool,
}

/// Complete profile consumed by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub demographics: Demographics,
    pub health_metrics: HealthMetrics,
    #[serde(default)]
    pub lifestyle: LifestyleFactors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_data: Option<MedicalData>,
}

impl ProfileInput {
    /// Condition tags, empty when no medical data was provided
    pub fn condition_tags(&self) -> &[String] {
        self.medical_data
            .as_ref()
            .map(|m| m.conditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_critical_conditions(&self) -> bool {
        self.medical_data
            .as_ref()
            .map(|m| m.has_critical_conditions)
            .unwrap_or(false)
    }
}

// ============================================================================
// Condition analysis
// ============================================================================

/// Five-level summary of how many and how serious the active conditions are
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionSeverity {
    #[default]
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl ConditionSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionSeverity::None => "none",
            ConditionSeverity::Low => "low",
            ConditionSeverity::Moderate => "moderate",
            ConditionSeverity::High => "high",
            ConditionSeverity::Critical => "critical",
        }
    }
}

/// Derived, read-only view of the user's medical conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionAnalysis {
    pub severity: ConditionSeverity,
    pub has_diabetes: bool,
    pub has_type1_diabetes: bool,
    pub has_heart_condition: bool,
    pub has_high_blood_pressure: bool,
    pub has_kidney_disease: bool,
    pub has_liver_disease: bool,
    pub has_thyroid_disorder: bool,
    pub is_pregnant: bool,
    pub has_digestive_disorder: bool,
    pub has_mental_health_condition: bool,
    /// Two or more serious conditions present
    pub compound_risk: bool,
    /// Labels of the serious conditions present
    pub critical_conditions: Vec<String>,
    /// Recognized condition tags, canonicalized
    pub active_conditions: Vec<String>,
}

// ============================================================================
// Risk analysis
// ============================================================================

/// BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
    SeverelyObese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::SeverelyObese => "Severely obese",
        }
    }

    /// Overweight or any obesity class
    pub fn is_above_healthy(&self) -> bool {
        *self >= BmiCategory::Overweight
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Four compound risk percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundRiskAnalysis {
    /// Diabetes risk (0-100, exactly 100 when diagnosed)
    pub diabetes_risk: f64,
    /// Cardiovascular risk (0-95)
    pub cardiovascular_risk: f64,
    /// Metabolic syndrome risk (0-90)
    pub metabolic_syndrome_risk: f64,
    /// Mental health risk (0-90)
    pub mental_health_risk: f64,
    pub overall_risk_level: RiskLevel,
    /// Largest positive contributors across all dimensions
    pub primary_risk_factors: Vec<String>,
}

// ============================================================================
// Personalized targets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightDirection {
    Gain,
    Loss,
    Maintain,
}

impl WeightDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightDirection::Gain => "gain",
            WeightDirection::Loss => "loss",
            WeightDirection::Maintain => "maintain",
        }
    }
}

/// Weight band corresponding to BMI 18.5-24.9 for a given height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthyWeightRange {
    pub min_kg: f64,
    pub max_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepTarget {
    pub current_hours: f64,
    pub target_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationTarget {
    pub current_liters: f64,
    pub target_liters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTarget {
    pub current_steps: u32,
    pub target_steps: u32,
    /// Why a condition cap was applied, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_reason: Option<String>,
}

/// Weight goal; exactly one of `deficit_kg > 0`, `excess_kg > 0`, `is_healthy` holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTarget {
    pub direction: WeightDirection,
    pub current_kg: f64,
    pub target_kg: f64,
    pub deficit_kg: f64,
    pub excess_kg: f64,
    pub is_healthy: bool,
    pub weekly_rate_kg: f64,
    pub estimated_weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTarget {
    pub minutes_per_week: u32,
    pub sessions_per_week: u32,
    pub strength_sessions_per_week: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedTargets {
    pub sleep: SleepTarget,
    pub hydration: HydrationTarget,
    pub steps: StepTarget,
    pub weight: WeightTarget,
    pub exercise: ExerciseTarget,
    pub healthy_weight_range: HealthyWeightRange,
}

// ============================================================================
// Projection
// ============================================================================

/// A metric's current value and its value after the projection window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricProjection {
    pub current: f64,
    pub projected: f64,
}

impl MetricProjection {
    pub fn new(current: f64, projected: f64) -> Self {
        Self { current, projected }
    }

    pub fn change(&self) -> f64 {
        self.projected - self.current
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NinetyDayProjection {
    /// Number of weekly steps simulated
    pub weeks: u32,
    /// Assumed fraction of the plan the user follows (0-1)
    pub compliance_rate: f64,
    pub weight: MetricProjection,
    pub bmi: MetricProjection,
    pub sleep: MetricProjection,
    pub energy_level: MetricProjection,
    pub health_score: MetricProjection,
    pub hydration: MetricProjection,
    pub steps: MetricProjection,
}

// ============================================================================
// Roadmap
// ============================================================================

/// Coarse nutrition signal used to pace the early weeks of the roadmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietSignal {
    Poor,
    Fair,
    Good,
}

impl DietSignal {
    pub fn from_nutrition_score(score: u8) -> Self {
        match score {
            0..=3 => DietSignal::Poor,
            4..=6 => DietSignal::Fair,
            _ => DietSignal::Good,
        }
    }
}

/// One week's milestone snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTarget {
    pub week: u32,
    pub phase: u32,
    /// Fraction of the way from current to projected values (0-1)
    pub progress: f64,
    pub sleep_hours: f64,
    pub hydration_liters: f64,
    pub steps: u32,
    pub exercise_minutes: u32,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub phase: u32,
    pub name: String,
    pub start_week: u32,
    pub end_week: u32,
    pub focus: Vec<String>,
    pub milestone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressiveTargets {
    pub weekly_targets: Vec<WeeklyTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationRoadmap {
    /// Exponent applied to weekly progress; below 1 front-loads change
    pub pacing_exponent: f64,
    pub phases: Vec<RoadmapPhase>,
    pub progressive_targets: ProgressiveTargets,
}

// ============================================================================
// Result envelope
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub healthy_weight_range: HealthyWeightRange,
}

/// Templated prose sections; carries no numeric invariants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSections {
    pub headline: String,
    pub summary: String,
    pub risk_summary: String,
    pub recommendations: Vec<String>,
    pub medical_notes: Vec<String>,
}

/// Complete analysis output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    pub overall_score: f64,
    pub overall_grade: String,
    pub user_profile: UserProfile,
    pub condition_analysis: ConditionAnalysis,
    pub risk_analysis: CompoundRiskAnalysis,
    pub personalized_targets: PersonalizedTargets,
    pub ninety_day_projection: NinetyDayProjection,
    pub transformation_roadmap: TransformationRoadmap,
    pub narrative: NarrativeSections,
}
