//! Validation rule registry and batch reporting
//!
//! Each rule is a named predicate over a profile and its analysis, tagged with
//! a category and a severity. Rules compare engine output against literal
//! thresholds rather than re-deriving values with the engine's own formulas.
//! A failed critical rule means medically unsafe output.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conditions::Condition;
use crate::pipeline::AnalysisEngine;
use crate::types::{
    AnalysisResult, ConditionSeverity, ProfileInput, RiskLevel, SocialSupport, StressLevel,
    WeightDirection,
};

/// Display name used for batch analyses
const BATCH_DISPLAY_NAME: &str = "Batch Profile";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RuleSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSeverity::Low => "low",
            RuleSeverity::Medium => "medium",
            RuleSeverity::High => "high",
            RuleSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Conditions,
    Weight,
    Risk,
    Targets,
    Projection,
    Roadmap,
    Envelope,
    /// Per-profile expectations from a synthetic profile set
    Expected,
}

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl RuleOutcome {
    pub fn check(passed: bool, expected: impl Into<String>, actual: impl fmt::Display) -> Self {
        Self {
            passed,
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    /// The rule's precondition does not hold for this profile
    pub fn not_applicable() -> Self {
        Self::check(true, "n/a", "n/a")
    }
}

pub type RuleFn = fn(&ProfileInput, &AnalysisResult) -> RuleOutcome;

/// One named predicate
#[derive(Clone, Copy)]
pub struct ValidationRule {
    pub id: &'static str,
    pub category: RuleCategory,
    pub severity: RuleSeverity,
    pub description: &'static str,
    pub evaluate: RuleFn,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("severity", &self.severity)
            .finish()
    }
}

/// A rule outcome attributed to one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub analysis_id: String,
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: RuleSeverity,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Evaluate every rule against one analysis
pub fn run_rules(
    profile: &ProfileInput,
    result: &AnalysisResult,
    rules: &[ValidationRule],
) -> Vec<RuleResult> {
    rules
        .iter()
        .map(|rule| {
            let outcome = (rule.evaluate)(profile, result);
            RuleResult {
                analysis_id: result.analysis_id.clone(),
                rule_id: rule.id.to_string(),
                category: rule.category,
                severity: rule.severity,
                passed: outcome.passed,
                expected: outcome.expected,
                actual: outcome.actual,
            }
        })
        .collect()
}

/// Aggregated pass/fail counts for a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub total_profiles: usize,
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    /// Percentage of checks passed (0-100)
    pub pass_rate: f64,
    pub failures_by_severity: BTreeMap<RuleSeverity, usize>,
    pub failures_by_rule: BTreeMap<String, usize>,
    pub failures: Vec<RuleResult>,
    /// Profiles that could not be analyzed, with the reason
    pub analysis_errors: Vec<String>,
}

impl BatchReport {
    pub fn from_results(results: &[RuleResult]) -> Self {
        let profiles: BTreeSet<&str> = results.iter().map(|r| r.analysis_id.as_str()).collect();
        let failures: Vec<RuleResult> = results.iter().filter(|r| !r.passed).cloned().collect();

        let mut failures_by_severity = BTreeMap::new();
        let mut failures_by_rule = BTreeMap::new();
        for failure in &failures {
            *failures_by_severity.entry(failure.severity).or_insert(0) += 1;
            *failures_by_rule.entry(failure.rule_id.clone()).or_insert(0) += 1;
        }

        let total_checks = results.len();
        let failed = failures.len();
        let passed = total_checks - failed;
        let pass_rate = if total_checks == 0 {
            100.0
        } else {
            (passed as f64 / total_checks as f64 * 10_000.0).round() / 100.0
        };

        Self {
            total_profiles: profiles.len(),
            total_checks,
            passed,
            failed,
            pass_rate,
            failures_by_severity,
            failures_by_rule,
            failures,
            analysis_errors: Vec::new(),
        }
    }

    /// Any critical-severity failure blocks release
    pub fn has_blocking_failures(&self) -> bool {
        self.failures_by_severity
            .get(&RuleSeverity::Critical)
            .is_some_and(|count| *count > 0)
    }
}

/// Analyze profiles in parallel and run the default rules against each.
///
/// Each profile gets a deterministic analysis id (`profile-<index>`).
pub fn validate_batch(profiles: &[ProfileInput], engine: &AnalysisEngine) -> BatchReport {
    let rules = default_rules();
    let generated_at = Utc::now();

    let outcomes: Vec<Result<Vec<RuleResult>, String>> = profiles
        .par_iter()
        .enumerate()
        .map(|(index, profile)| {
            let id = format!("profile-{index}");
            engine
                .analyze_at(profile, BATCH_DISPLAY_NAME, generated_at, id.clone())
                .map(|result| run_rules(profile, &result, &rules))
                .map_err(|e| format!("{id}: {e}"))
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

pub(crate) fn log_report(report: &BatchReport) {
    for failure in report
        .failures
        .iter()
        .filter(|f| f.severity == RuleSeverity::Critical)
    {
        warn!(
            rule_id = %failure.rule_id,
            analysis_id = %failure.analysis_id,
            expected = %failure.expected,
            actual = %failure.actual,
            "critical rule failed"
        );
    }
    debug!(
        profiles = report.total_profiles,
        checks = report.total_checks,
        pass_rate = report.pass_rate,
        "batch validation complete"
    );
}

// ============================================================================
// Rule registry
// ============================================================================

fn input_bmi(profile: &ProfileInput) -> f64 {
    let meters = profile.demographics.height_cm / 100.0;
    profile.demographics.weight_kg / (meters * meters)
}

fn has_tag(profile: &ProfileInput, condition: Condition) -> bool {
    profile
        .condition_tags()
        .iter()
        .any(|tag| Condition::parse(tag) == Some(condition))
}

fn at_most(value: f64, limit: f64) -> RuleOutcome {
    RuleOutcome::check(value <= limit, format!("<= {limit}"), value)
}

fn within(value: f64, min: f64, max: f64) -> RuleOutcome {
    RuleOutcome::check(
        (min..=max).contains(&value),
        format!("{min}..={max}"),
        value,
    )
}

fn rule(
    id: &'static str,
    category: RuleCategory,
    severity: RuleSeverity,
    description: &'static str,
    evaluate: RuleFn,
) -> ValidationRule {
    ValidationRule {
        id,
        category,
        severity,
        description,
        evaluate,
    }
}

/// The fixed rule set
pub fn default_rules() -> Vec<ValidationRule> {
    use RuleCategory::*;
    use RuleSeverity::*;

    vec![
        // Conditions
        rule(
            "conditions.critical_for_heart_or_type1",
            Conditions,
            High,
            "Heart condition or type 1 diabetes classifies as critical",
            |p, r| {
                if !(has_tag(p, Condition::HeartCondition) || has_tag(p, Condition::DiabetesType1)) {
                    return RuleOutcome::not_applicable();
                }
                let severity = r.condition_analysis.severity;
                RuleOutcome::check(
                    severity == ConditionSeverity::Critical,
                    "critical",
                    severity.as_str(),
                )
            },
        ),
        rule(
            "conditions.compound_flag",
            Conditions,
            Medium,
            "Two or more serious conditions set the compound risk flag",
            |p, r| {
                let serious: BTreeSet<Condition> = p
                    .condition_tags()
                    .iter()
                    .filter_map(|t| Condition::parse(t))
                    .filter(|c| c.is_serious())
                    .collect();
                let expected = serious.len() >= 2;
                RuleOutcome::check(
                    r.condition_analysis.compound_risk == expected,
                    expected.to_string(),
                    r.condition_analysis.compound_risk,
                )
            },
        ),
        // Weight
        rule(
            "weight.underweight_direction_gain",
            Weight,
            Critical,
            "BMI below 18.5 targets weight gain",
            |p, r| {
                if input_bmi(p) >= 18.5 {
                    return RuleOutcome::not_applicable();
                }
                let direction = r.personalized_targets.weight.direction;
                RuleOutcome::check(direction == WeightDirection::Gain, "gain", direction.as_str())
            },
        ),
        rule(
            "weight.underweight_projection_increases",
            Weight,
            Critical,
            "BMI below 18.5 projects a weight increase",
            |p, r| {
                if input_bmi(p) >= 18.5 {
                    return RuleOutcome::not_applicable();
                }
                let w = r.ninety_day_projection.weight;
                RuleOutcome::check(w.projected > w.current, format!("> {}", w.current), w.projected)
            },
        ),
        rule(
            "weight.underweight_bmi_increases",
            Weight,
            High,
            "BMI below 18.5 projects a BMI increase",
            |p, r| {
                if input_bmi(p) >= 18.5 {
                    return RuleOutcome::not_applicable();
                }
                let bmi = r.ninety_day_projection.bmi;
                RuleOutcome::check(bmi.projected > bmi.current, format!("> {}", bmi.current), bmi.projected)
            },
        ),
        rule(
            "weight.overweight_direction_loss",
            Weight,
            High,
            "BMI of 25 or more targets weight loss",
            |p, r| {
                if input_bmi(p) < 25.0 {
                    return RuleOutcome::not_applicable();
                }
                let direction = r.personalized_targets.weight.direction;
                RuleOutcome::check(direction == WeightDirection::Loss, "loss", direction.as_str())
            },
        ),
        rule(
            "weight.overweight_projection_decreases",
            Weight,
            Critical,
            "BMI of 25 or more projects a weight decrease",
            |p, r| {
                if input_bmi(p) < 25.0 {
                    return RuleOutcome::not_applicable();
                }
                let w = r.ninety_day_projection.weight;
                RuleOutcome::check(w.projected < w.current, format!("< {}", w.current), w.projected)
            },
        ),
        rule(
            "weight.overweight_bmi_decreases",
            Weight,
            High,
            "BMI of 25 or more projects a BMI decrease",
            |p, r| {
                if input_bmi(p) < 25.0 {
                    return RuleOutcome::not_applicable();
                }
                let bmi = r.ninety_day_projection.bmi;
                RuleOutcome::check(bmi.projected < bmi.current, format!("< {}", bmi.current), bmi.projected)
            },
        ),
        rule(
            "weight.loss_within_twelve_percent",
            Weight,
            Critical,
            "Projected loss never exceeds 12% of starting weight",
            |p, r| {
                let start = p.demographics.weight_kg;
                let projected = r.ninety_day_projection.weight.projected;
                let floor = start * 0.88;
                RuleOutcome::check(projected >= floor - 0.05, format!(">= {floor:.1}"), projected)
            },
        ),
        rule(
            "weight.direction_exclusive",
            Weight,
            High,
            "Exactly one of deficit, excess or healthy holds",
            |_, r| {
                let w = &r.personalized_targets.weight;
                let held = [w.deficit_kg > 0.0, w.excess_kg > 0.0, w.is_healthy]
                    .iter()
                    .filter(|b| **b)
                    .count();
                let non_negative = w.deficit_kg >= 0.0 && w.excess_kg >= 0.0;
                RuleOutcome::check(
                    held == 1 && non_negative,
                    "exactly one",
                    format!("deficit={} excess={} healthy={}", w.deficit_kg, w.excess_kg, w.is_healthy),
                )
            },
        ),
        rule(
            "weight.healthy_bmi_maintains",
            Weight,
            Medium,
            "BMI within 18.5-24.9 targets maintenance",
            |p, r| {
                let bmi = input_bmi(p);
                if !(18.5..=24.9).contains(&bmi) {
                    return RuleOutcome::not_applicable();
                }
                let direction = r.personalized_targets.weight.direction;
                RuleOutcome::check(
                    direction == WeightDirection::Maintain,
                    "maintain",
                    direction.as_str(),
                )
            },
        ),
        rule(
            "weight.healthy_drift_bounded",
            Weight,
            Medium,
            "Healthy-weight profiles drift at most 1.5 kg",
            |p, r| {
                let bmi = input_bmi(p);
                if !(18.5..25.0).contains(&bmi) {
                    return RuleOutcome::not_applicable();
                }
                at_most(r.ninety_day_projection.weight.change().abs(), 1.5)
            },
        ),
        rule(
            "weight.profile_bmi_matches_input",
            Weight,
            Medium,
            "Reported BMI matches weight and height",
            |p, r| {
                let expected = input_bmi(p);
                let actual = r.user_profile.bmi;
                RuleOutcome::check(
                    (actual - expected).abs() <= 0.1,
                    format!("{expected:.1}"),
                    actual,
                )
            },
        ),
        rule(
            "weight.healthy_range_matches_height",
            Weight,
            Low,
            "Healthy range spans BMI 18.5-24.9 for the height",
            |p, r| {
                let meters_sq = (p.demographics.height_cm / 100.0).powi(2);
                let range = r.user_profile.healthy_weight_range;
                let (min, max) = (18.5 * meters_sq, 24.9 * meters_sq);
                RuleOutcome::check(
                    (range.min_kg - min).abs() <= 0.1 && (range.max_kg - max).abs() <= 0.1,
                    format!("{min:.1}-{max:.1}"),
                    format!("{}-{}", range.min_kg, range.max_kg),
                )
            },
        ),
        // Risk
        rule(
            "risk.diabetes_bounds",
            Risk,
            Critical,
            "Diabetes risk within 0-100",
            |_, r| within(r.risk_analysis.diabetes_risk, 0.0, 100.0),
        ),
        rule(
            "risk.cardiovascular_bounds",
            Risk,
            Critical,
            "Cardiovascular risk within 0-95",
            |_, r| within(r.risk_analysis.cardiovascular_risk, 0.0, 95.0),
        ),
        rule(
            "risk.metabolic_bounds",
            Risk,
            Critical,
            "Metabolic syndrome risk within 0-90",
            |_, r| within(r.risk_analysis.metabolic_syndrome_risk, 0.0, 90.0),
        ),
        rule(
            "risk.mental_health_bounds",
            Risk,
            Critical,
            "Mental health risk within 0-90",
            |_, r| within(r.risk_analysis.mental_health_risk, 0.0, 90.0),
        ),
        rule(
            "risk.diagnosed_diabetes_is_certain",
            Risk,
            Critical,
            "Diagnosed diabetes yields diabetes risk of exactly 100",
            |p, r| {
                if !(has_tag(p, Condition::DiabetesType1) || has_tag(p, Condition::DiabetesType2)) {
                    return RuleOutcome::not_applicable();
                }
                let risk = r.risk_analysis.diabetes_risk;
                RuleOutcome::check(risk == 100.0, "100", risk)
            },
        ),
        rule(
            "risk.stress_without_support",
            Risk,
            Medium,
            "High stress without social support raises mental health risk to 50+",
            |p, r| {
                let lifestyle = &p.lifestyle;
                if lifestyle.stress_level != StressLevel::High
                    || lifestyle.social_support != SocialSupport::Unsupported
                {
                    return RuleOutcome::not_applicable();
                }
                let risk = r.risk_analysis.mental_health_risk;
                RuleOutcome::check(risk >= 50.0, ">= 50", risk)
            },
        ),
        rule(
            "risk.overall_level_thresholds",
            Risk,
            Medium,
            "Overall level follows the 60/40/20 thresholds on the mean physical risk",
            |_, r| {
                let risk = &r.risk_analysis;
                let mean = (risk.diabetes_risk + risk.cardiovascular_risk + risk.metabolic_syndrome_risk)
                    / 3.0;
                let expected = if mean >= 60.0 {
                    RiskLevel::Critical
                } else if mean >= 40.0 {
                    RiskLevel::High
                } else if mean >= 20.0 {
                    RiskLevel::Moderate
                } else {
                    RiskLevel::Low
                };
                RuleOutcome::check(
                    risk.overall_risk_level == expected,
                    expected.as_str(),
                    risk.overall_risk_level.as_str(),
                )
            },
        ),
        rule(
            "risk.primary_factors_bounded",
            Risk,
            Low,
            "At most five distinct primary risk factors",
            |_, r| {
                let factors = &r.risk_analysis.primary_risk_factors;
                let distinct: BTreeSet<&String> = factors.iter().collect();
                RuleOutcome::check(
                    factors.len() <= 5 && distinct.len() == factors.len(),
                    "<= 5 distinct",
                    factors.len(),
                )
            },
        ),
        rule(
            "risk.smoker_cardiovascular_floor",
            Risk,
            Medium,
            "Smoking keeps cardiovascular risk at 25 or more",
            |p, r| {
                if !p.lifestyle.is_smoker {
                    return RuleOutcome::not_applicable();
                }
                let risk = r.risk_analysis.cardiovascular_risk;
                RuleOutcome::check(risk >= 25.0, ">= 25", risk)
            },
        ),
        rule(
            "risk.heart_condition_cardiovascular_floor",
            Risk,
            High,
            "A heart condition keeps cardiovascular risk at 35 or more",
            |p, r| {
                if !has_tag(p, Condition::HeartCondition) {
                    return RuleOutcome::not_applicable();
                }
                let risk = r.risk_analysis.cardiovascular_risk;
                RuleOutcome::check(risk >= 35.0, ">= 35", risk)
            },
        ),
        // Targets
        rule(
            "targets.heart_steps_cap",
            Targets,
            Critical,
            "Heart condition caps steps at 6000",
            |p, r| {
                if !has_tag(p, Condition::HeartCondition) {
                    return RuleOutcome::not_applicable();
                }
                at_most(f64::from(r.personalized_targets.steps.target_steps), 6_000.0)
            },
        ),
        rule(
            "targets.pregnancy_steps_cap",
            Targets,
            Critical,
            "Pregnancy or breastfeeding caps steps at 7000",
            |p, r| {
                if !has_tag(p, Condition::PregnancyBreastfeeding) {
                    return RuleOutcome::not_applicable();
                }
                at_most(f64::from(r.personalized_targets.steps.target_steps), 7_000.0)
            },
        ),
        rule(
            "targets.underweight_steps_cap",
            Targets,
            High,
            "Underweight profiles stay at or below 6500 steps",
            |p, r| {
                if input_bmi(p) >= 18.5 {
                    return RuleOutcome::not_applicable();
                }
                at_most(f64::from(r.personalized_targets.steps.target_steps), 6_500.0)
            },
        ),
        rule(
            "targets.steps_floor",
            Targets,
            Critical,
            "Step target is never below 3000",
            |_, r| {
                let steps = r.personalized_targets.steps.target_steps;
                RuleOutcome::check(steps >= 3_000, ">= 3000", steps)
            },
        ),
        rule(
            "targets.steps_ceiling",
            Targets,
            High,
            "Step target is never above 15000",
            |_, r| at_most(f64::from(r.personalized_targets.steps.target_steps), 15_000.0),
        ),
        rule(
            "targets.sleep_band",
            Targets,
            Medium,
            "Sleep target within 7-9 hours",
            |_, r| within(r.personalized_targets.sleep.target_hours, 7.0, 9.0),
        ),
        rule(
            "targets.hydration_band",
            Targets,
            Medium,
            "Hydration target within 1.5-4.0 liters",
            |_, r| within(r.personalized_targets.hydration.target_liters, 1.5, 4.0),
        ),
        rule(
            "targets.kidney_hydration_cap",
            Targets,
            High,
            "Kidney disease caps hydration at 2.0 liters",
            |p, r| {
                if !has_tag(p, Condition::KidneyDisease) {
                    return RuleOutcome::not_applicable();
                }
                at_most(r.personalized_targets.hydration.target_liters, 2.0)
            },
        ),
        rule(
            "targets.heart_exercise_cap",
            Targets,
            High,
            "Heart condition caps exercise at 90 minutes per week",
            |p, r| {
                if !has_tag(p, Condition::HeartCondition) {
                    return RuleOutcome::not_applicable();
                }
                at_most(f64::from(r.personalized_targets.exercise.minutes_per_week), 90.0)
            },
        ),
        rule(
            "targets.exercise_sessions_range",
            Targets,
            Low,
            "Three to six exercise sessions per week",
            |_, r| {
                let sessions = r.personalized_targets.exercise.sessions_per_week;
                RuleOutcome::check((3..=6).contains(&sessions), "3..=6", sessions)
            },
        ),
        // Projection
        rule(
            "projection.bmi_consistent_with_weight",
            Projection,
            High,
            "Projected BMI matches projected weight within 0.2",
            |p, r| {
                let projection = &r.ninety_day_projection;
                let meters = p.demographics.height_cm / 100.0;
                let expected = projection.weight.projected / (meters * meters);
                RuleOutcome::check(
                    (projection.bmi.projected - expected).abs() <= 0.2,
                    format!("{expected:.1} ± 0.2"),
                    projection.bmi.projected,
                )
            },
        ),
        rule(
            "projection.sleep_not_regressing",
            Projection,
            Medium,
            "Projected sleep is never below current",
            |_, r| {
                let sleep = r.ninety_day_projection.sleep;
                RuleOutcome::check(sleep.projected >= sleep.current, format!(">= {}", sleep.current), sleep.projected)
            },
        ),
        rule(
            "projection.sleep_ceiling",
            Projection,
            High,
            "Projected sleep at most 9 hours",
            |_, r| at_most(r.ninety_day_projection.sleep.projected, 9.0),
        ),
        rule(
            "projection.energy_range",
            Projection,
            Low,
            "Projected energy within 0-10",
            |_, r| within(r.ninety_day_projection.energy_level.projected, 0.0, 10.0),
        ),
        rule(
            "projection.health_score_not_decreasing",
            Projection,
            Medium,
            "Projected health score is never below current",
            |_, r| {
                let score = r.ninety_day_projection.health_score;
                RuleOutcome::check(score.projected >= score.current, format!(">= {}", score.current), score.projected)
            },
        ),
        rule(
            "projection.compliance_range",
            Projection,
            Low,
            "Compliance rate within 0.5-0.95",
            |_, r| within(r.ninety_day_projection.compliance_rate, 0.5, 0.95),
        ),
        rule(
            "projection.steps_ceiling",
            Projection,
            High,
            "Projected steps at most 15000",
            |_, r| at_most(r.ninety_day_projection.steps.projected, 15_000.0),
        ),
        // Roadmap
        rule(
            "roadmap.thirteen_weeks",
            Roadmap,
            High,
            "Roadmap has exactly 13 weekly entries",
            |_, r| {
                let weeks = &r.transformation_roadmap.progressive_targets.weekly_targets;
                let numbered = weeks.iter().enumerate().all(|(i, w)| w.week as usize == i + 1);
                RuleOutcome::check(weeks.len() == 13 && numbered, "13 weeks numbered 1-13", weeks.len())
            },
        ),
        rule(
            "roadmap.sleep_ceiling",
            Roadmap,
            Critical,
            "No week exceeds 9 hours of sleep",
            |_, r| {
                let max = r
                    .transformation_roadmap
                    .progressive_targets
                    .weekly_targets
                    .iter()
                    .map(|w| w.sleep_hours)
                    .fold(0.0, f64::max);
                at_most(max, 9.0)
            },
        ),
        rule(
            "roadmap.steps_ceiling",
            Roadmap,
            Critical,
            "No week exceeds 15000 steps or the step target",
            |_, r| {
                let limit = r.personalized_targets.steps.target_steps.min(15_000);
                let max = r
                    .transformation_roadmap
                    .progressive_targets
                    .weekly_targets
                    .iter()
                    .map(|w| w.steps)
                    .max()
                    .unwrap_or(0);
                RuleOutcome::check(max <= limit, format!("<= {limit}"), max)
            },
        ),
        rule(
            "roadmap.weight_monotone",
            Roadmap,
            Medium,
            "Weekly weight moves steadily toward the projection",
            |_, r| {
                let weeks = &r.transformation_roadmap.progressive_targets.weekly_targets;
                let losing = r.ninety_day_projection.weight.change() < 0.0;
                let monotone = weeks.windows(2).all(|pair| {
                    if losing {
                        pair[1].weight_kg <= pair[0].weight_kg
                    } else {
                        pair[1].weight_kg >= pair[0].weight_kg
                    }
                });
                RuleOutcome::check(monotone, "monotone", monotone)
            },
        ),
        rule(
            "roadmap.sleep_monotone",
            Roadmap,
            Medium,
            "Weekly sleep never decreases",
            |_, r| {
                let weeks = &r.transformation_roadmap.progressive_targets.weekly_targets;
                let monotone = weeks.windows(2).all(|pair| pair[1].sleep_hours >= pair[0].sleep_hours);
                RuleOutcome::check(monotone, "non-decreasing", monotone)
            },
        ),
        rule(
            "roadmap.final_week_matches_projection",
            Roadmap,
            Medium,
            "Week 13 weight equals the projected weight",
            |_, r| {
                let projected = r.ninety_day_projection.weight.projected;
                let last = r
                    .transformation_roadmap
                    .progressive_targets
                    .weekly_targets
                    .last()
                    .map(|w| w.weight_kg);
                RuleOutcome::check(
                    last == Some(projected),
                    projected.to_string(),
                    last.map(|w| w.to_string()).unwrap_or_else(|| "missing".to_string()),
                )
            },
        ),
        rule(
            "roadmap.phases_cover_weeks",
            Roadmap,
            Low,
            "Three phases cover weeks 1-13 without gaps",
            |_, r| {
                let phases = &r.transformation_roadmap.phases;
                let contiguous = phases.windows(2).all(|p| p[1].start_week == p[0].end_week + 1);
                let covers = phases.first().map(|p| p.start_week) == Some(1)
                    && phases.last().map(|p| p.end_week) == Some(13);
                RuleOutcome::check(
                    phases.len() == 3 && contiguous && covers,
                    "3 phases over weeks 1-13",
                    phases.len(),
                )
            },
        ),
        // Envelope
        rule(
            "envelope.score_is_mean_metric",
            Envelope,
            Medium,
            "Overall score is ten times the mean health metric",
            |p, r| {
                let m = &p.health_metrics;
                let sum = u32::from(m.hydration)
                    + u32::from(m.sleep)
                    + u32::from(m.exercise)
                    + u32::from(m.nutrition);
                let expected = f64::from(sum) * 2.5;
                RuleOutcome::check(
                    (r.overall_score - expected).abs() < 0.05,
                    expected.to_string(),
                    r.overall_score,
                )
            },
        ),
        rule(
            "envelope.grade_matches_score",
            Envelope,
            Low,
            "Grade letter agrees with the score band",
            |_, r| {
                let expected = match r.overall_score {
                    s if s >= 90.0 => "A",
                    s if s >= 80.0 => "B",
                    s if s >= 70.0 => "C",
                    s if s >= 60.0 => "D",
                    _ => "F",
                };
                RuleOutcome::check(
                    r.overall_grade.starts_with(expected),
                    expected,
                    &r.overall_grade,
                )
            },
        ),
        rule(
            "envelope.identifiers_present",
            Envelope,
            Low,
            "Analysis id and engine version are set",
            |_, r| {
                let ok = !r.analysis_id.is_empty() && !r.engine_version.is_empty();
                RuleOutcome::check(ok, "non-empty", format!("id={} version={}", r.analysis_id, r.engine_version))
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Demographics, Gender, HealthMetrics, LifestyleFactors, MedicalData};
    use pretty_assertions::assert_eq;

    fn profile(age: u32, weight: f64, height: f64, conditions: &[&str]) -> ProfileInput {
        ProfileInput {
            demographics: Demographics {
                age,
                weight_kg: weight,
                height_cm: height,
                gender: Gender::Female,
            },
            health_metrics: HealthMetrics::uniform(5),
            lifestyle: LifestyleFactors::default(),
            medical_data: Some(MedicalData {
                conditions: conditions.iter().map(|c| c.to_string()).collect(),
                has_critical_conditions: false,
            }),
        }
    }

    fn sample_profiles() -> Vec<ProfileInput> {
        vec![
            profile(45, 50.0, 170.0, &[]),
            profile(52, 100.0, 165.0, &["diabetes_type2"]),
            profile(30, 68.0, 172.0, &["heart_condition"]),
            profile(29, 62.0, 165.0, &["pregnancy_breastfeeding"]),
            profile(70, 85.0, 160.0, &["kidney_disease", "high_blood_pressure"]),
            profile(19, 45.0, 175.0, &["heart_condition"]),
        ]
    }

    #[test]
    fn test_registry_size_and_unique_ids() {
        let rules = default_rules();
        assert!(rules.len() >= 30);
        let ids: BTreeSet<&str> = rules.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_every_category_has_rules() {
        let rules = default_rules();
        for category in [
            RuleCategory::Conditions,
            RuleCategory::Weight,
            RuleCategory::Risk,
            RuleCategory::Targets,
            RuleCategory::Projection,
            RuleCategory::Roadmap,
            RuleCategory::Envelope,
        ] {
            assert!(rules.iter().any(|r| r.category == category), "{category:?}");
        }
    }

    #[test]
    fn test_engine_output_passes_all_rules() {
        let engine = AnalysisEngine::new();
        let rules = default_rules();
        for (i, p) in sample_profiles().iter().enumerate() {
            let result = engine.analyze(p, "Test").unwrap();
            let failures: Vec<RuleResult> = run_rules(p, &result, &rules)
                .into_iter()
                .filter(|r| !r.passed)
                .collect();
            assert_eq!(failures, Vec::<RuleResult>::new(), "profile {i}");
        }
    }

    #[test]
    fn test_rule_catches_tampered_output() {
        let engine = AnalysisEngine::new();
        let p = profile(30, 68.0, 172.0, &["heart_condition"]);
        let mut result = engine.analyze(&p, "Test").unwrap();
        result.personalized_targets.steps.target_steps = 9_000;

        let results = run_rules(&p, &result, &default_rules());
        let cap = results
            .iter()
            .find(|r| r.rule_id == "targets.heart_steps_cap")
            .unwrap();
        assert!(!cap.passed);
        assert_eq!(cap.actual, "9000");

        let report = BatchReport::from_results(&results);
        assert!(report.has_blocking_failures());
        assert!(report.failures_by_rule.contains_key("targets.heart_steps_cap"));
    }

    #[test]
    fn test_report_counts() {
        let make = |id: &str, rule: &str, severity, passed| RuleResult {
            analysis_id: id.to_string(),
            rule_id: rule.to_string(),
            category: RuleCategory::Risk,
            severity,
            passed,
            expected: String::new(),
            actual: String::new(),
        };
        let results = vec![
            make("a", "r1", RuleSeverity::Low, true),
            make("a", "r2", RuleSeverity::Medium, false),
            make("b", "r1", RuleSeverity::Low, true),
            make("b", "r2", RuleSeverity::Medium, false),
        ];
        let report = BatchReport::from_results(&results);
        assert_eq!(report.total_profiles, 2);
        assert_eq!(report.total_checks, 4);
        assert_eq!(report.passed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.pass_rate, 50.0);
        assert_eq!(report.failures_by_rule.get("r2"), Some(&2));
        assert!(!report.has_blocking_failures());
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport::from_results(&[]);
        assert_eq!(report.pass_rate, 100.0);
        assert!(!report.has_blocking_failures());
    }

    #[test]
    fn test_validate_batch_in_parallel() {
        let mut profiles = sample_profiles();
        let mut invalid = profile(30, 70.0, 170.0, &[]);
        invalid.health_metrics.sleep = 0;
        profiles.push(invalid);

        let report = validate_batch(&profiles, &AnalysisEngine::new());
        assert_eq!(report.total_profiles, 7);
        assert_eq!(report.analysis_errors.len(), 1);
        assert!(report.analysis_errors[0].starts_with("profile-6"));
        assert_eq!(report.failed, 0);
        assert!(!report.has_blocking_failures());
    }
}
