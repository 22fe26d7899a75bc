//! Pipeline orchestration
//!
//! This module provides the public API for Healthprint.
//! It sequences the stages from a validated profile to the analysis envelope:
//! condition classification → compound risk → personalized targets → 90-day
//! projection → phase roadmap → narrative.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::HealthprintError;
use crate::narrative;
use crate::projection::{calculate_ninety_day_projection, ProjectionInputs};
use crate::risk::{bmi, bmi_category, compound_risk, RiskInputs};
use crate::roadmap::{generate_roadmap, RoadmapInputs};
use crate::scoring::{grade, overall_score, round_to};
use crate::targets::{calculate_all_targets, TargetInputs};
use crate::types::{AnalysisResult, ConditionAnalysis, NarrativeSections, ProfileInput, UserProfile};
use crate::validation::validate_profile;
use crate::ENGINE_VERSION;

/// Run a full analysis with the default configuration.
///
/// # Arguments
/// * `profile` - Demographics, metrics, lifestyle and optional medical data
/// * `display_name` - Name used in the result envelope and narrative
///
/// # Returns
/// The complete analysis, or `InvalidProfile` when a precondition fails
///
/// # Example
/// ```ignore
/// let result = generate_analysis(&profile, "Alex")?;
/// println!("{} ({})", result.overall_score, result.overall_grade);
/// ```
pub fn generate_analysis(
    profile: &ProfileInput,
    display_name: &str,
) -> Result<AnalysisResult, HealthprintError> {
    AnalysisEngine::new().analyze(profile, display_name)
}

/// Analysis engine bound to one configuration.
///
/// Use this when running many analyses with a custom configuration.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: EngineConfig,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::global().clone(),
        }
    }

    /// Create an engine with a validated custom configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, HealthprintError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a profile, stamping a fresh id and the current time
    pub fn analyze(
        &self,
        profile: &ProfileInput,
        display_name: &str,
    ) -> Result<AnalysisResult, HealthprintError> {
        self.analyze_at(profile, display_name, Utc::now(), Uuid::new_v4().to_string())
    }

    /// Analyze a profile with a fixed timestamp and id.
    ///
    /// Identical inputs produce identical results.
    pub fn analyze_at(
        &self,
        profile: &ProfileInput,
        display_name: &str,
        generated_at: DateTime<Utc>,
        analysis_id: String,
    ) -> Result<AnalysisResult, HealthprintError> {
        validate_profile(profile)?;
        let config = &self.config;

        let conditions =
            ConditionAnalysis::classify(profile.condition_tags(), profile.has_critical_conditions());
        debug!(
            analysis_id = %analysis_id,
            severity = conditions.severity.as_str(),
            conditions = conditions.active_conditions.len(),
            "classified conditions"
        );

        let risk = compound_risk(&RiskInputs::from_profile(profile, &conditions));
        debug!(
            analysis_id = %analysis_id,
            overall = risk.overall_risk_level.as_str(),
            diabetes = risk.diabetes_risk,
            cardiovascular = risk.cardiovascular_risk,
            "computed compound risk"
        );

        let targets = calculate_all_targets(&TargetInputs::from_profile(profile, &conditions), config);
        debug!(
            analysis_id = %analysis_id,
            steps = targets.steps.target_steps,
            weight_direction = targets.weight.direction.as_str(),
            "computed personalized targets"
        );

        let projection =
            calculate_ninety_day_projection(&ProjectionInputs::from_profile(profile, &targets), config);
        debug!(
            analysis_id = %analysis_id,
            compliance = projection.compliance_rate,
            weight = projection.weight.projected,
            "projected 90-day outcome"
        );

        let roadmap = generate_roadmap(
            &RoadmapInputs::from_profile(profile, &conditions, &targets, &projection),
            config,
        );
        debug!(
            analysis_id = %analysis_id,
            pacing = roadmap.pacing_exponent,
            "generated roadmap"
        );

        let demographics = &profile.demographics;
        let raw_bmi = bmi(demographics.weight_kg, demographics.height_cm);
        let score = overall_score(&profile.health_metrics);

        let mut result = AnalysisResult {
            analysis_id,
            generated_at,
            engine_version: ENGINE_VERSION.to_string(),
            overall_score: score,
            overall_grade: grade(score).to_string(),
            user_profile: UserProfile {
                display_name: display_name.to_string(),
                age: demographics.age,
                gender: demographics.gender,
                weight_kg: round_to(demographics.weight_kg, 1),
                height_cm: round_to(demographics.height_cm, 1),
                bmi: round_to(raw_bmi, 1),
                bmi_category: bmi_category(raw_bmi),
                healthy_weight_range: targets.healthy_weight_range,
            },
            condition_analysis: conditions,
            risk_analysis: risk,
            personalized_targets: targets,
            ninety_day_projection: projection,
            transformation_roadmap: roadmap,
            narrative: NarrativeSections::default(),
        };
        result.narrative = narrative::render(&result);

        debug!(
            analysis_id = %result.analysis_id,
            score = result.overall_score,
            grade = %result.overall_grade,
            "analysis complete"
        );
        Ok(result)
    }

    /// Parse a JSON profile, analyze it and return the result as JSON
    pub fn analyze_json(
        &self,
        profile_json: &str,
        display_name: &str,
    ) -> Result<String, HealthprintError> {
        let profile: ProfileInput = serde_json::from_str(profile_json)?;
        let result = self.analyze(&profile, display_name)?;
        Ok(serde_json::to_string(&result)?)
    }
}
