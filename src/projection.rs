//! 90-day projection
//!
//! Simulates weekly steps toward the personalized targets, scaled by an assumed
//! compliance rate. Weight moves at a BMI-banded weekly rate with a cumulative
//! loss cap; BMI is always recomputed from the projected weight. The health
//! score is the same composite used for the initial overall score, recomputed
//! from projected component metrics.

use crate::config::{EngineConfig, STEP_CEILING};
use crate::risk::{bmi, bmi_category};
use crate::scoring::{
    composite_score, exercise_score_from_steps, hydration_score_from_liters, overall_score,
    round_to, sleep_score_from_hours,
};
use crate::targets::healthy_weight_bounds;
use crate::types::{
    BmiCategory, EnergyLevel, HealthMetrics, LifestyleFactors, MetricProjection,
    NinetyDayProjection, PersonalizedTargets, ProfileInput, SocialSupport, StressLevel,
    UrgencyLevel,
};

/// Nutrition score the plan steers toward
const NUTRITION_TARGET_SCORE: f64 = 8.0;

/// Energy gained per point of improvement in each component score
const ENERGY_PER_SLEEP_POINT: f64 = 1.0;
const ENERGY_PER_HYDRATION_POINT: f64 = 0.5;
const ENERGY_PER_EXERCISE_POINT: f64 = 0.3;
const ENERGY_MAX: f64 = 10.0;

/// Inputs to the projection calculator
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInputs<'a> {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub metrics: HealthMetrics,
    pub lifestyle: LifestyleFactors,
    pub targets: &'a PersonalizedTargets,
}

impl<'a> ProjectionInputs<'a> {
    pub fn from_profile(profile: &ProfileInput, targets: &'a PersonalizedTargets) -> Self {
        Self {
            weight_kg: profile.demographics.weight_kg,
            height_cm: profile.demographics.height_cm,
            metrics: profile.health_metrics,
            lifestyle: profile.lifestyle,
            targets,
        }
    }
}

/// Project every tracked metric over the configured window
pub fn calculate_ninety_day_projection(
    inputs: &ProjectionInputs<'_>,
    config: &EngineConfig,
) -> NinetyDayProjection {
    let compliance = compliance_rate(&inputs.lifestyle, config);
    let targets = inputs.targets;

    let current_weight = round_to(inputs.weight_kg, 1);
    let projected_weight = round_to(
        project_weight(inputs.weight_kg, inputs.height_cm, compliance, config),
        1,
    );
    let current_bmi = round_to(bmi(inputs.weight_kg, inputs.height_cm), 1);
    let projected_bmi = round_to(bmi(projected_weight, inputs.height_cm), 1);

    let sleep_current = targets.sleep.current_hours;
    let sleep_projected = project_sleep(sleep_current, targets.sleep.target_hours, compliance, config);

    let hydration_current = targets.hydration.current_liters;
    let hydration_projected = round_to(
        move_toward(hydration_current, targets.hydration.target_liters, compliance),
        1,
    );

    let steps_current = f64::from(targets.steps.current_steps);
    let steps_projected = project_steps(steps_current, f64::from(targets.steps.target_steps), compliance);

    let energy = project_energy(
        inputs.lifestyle.energy_level,
        (sleep_current, sleep_projected),
        (hydration_current, hydration_projected),
        (steps_current, steps_projected),
    );

    let health_current = overall_score(&inputs.metrics);
    let health_projected = project_health_score(
        &inputs.metrics,
        sleep_projected,
        hydration_projected,
        steps_projected,
        compliance,
    )
    .max(health_current);

    NinetyDayProjection {
        weeks: config.projection.weeks,
        compliance_rate: compliance,
        weight: MetricProjection::new(current_weight, projected_weight),
        bmi: MetricProjection::new(current_bmi, projected_bmi),
        sleep: MetricProjection::new(sleep_current, sleep_projected),
        energy_level: energy,
        health_score: MetricProjection::new(health_current, health_projected),
        hydration: MetricProjection::new(hydration_current, hydration_projected),
        steps: MetricProjection::new(steps_current, steps_projected),
    }
}

/// Fraction of the plan the user is expected to follow
pub fn compliance_rate(lifestyle: &LifestyleFactors, config: &EngineConfig) -> f64 {
    let projection = &config.projection;
    let mut rate = match lifestyle.urgency_level {
        UrgencyLevel::Low => projection.compliance_low_urgency,
        UrgencyLevel::Medium => projection.compliance_medium_urgency,
        UrgencyLevel::High => projection.compliance_high_urgency,
    };
    if lifestyle.stress_level == StressLevel::High {
        rate -= 0.05;
    }
    if lifestyle.social_support == SocialSupport::Supported {
        rate += 0.05;
    }
    round_to(
        rate.clamp(projection.compliance_min, projection.compliance_max),
        2,
    )
}

/// Simulate weekly weight change and return the final weight (unrounded)
pub fn project_weight(weight_kg: f64, height_cm: f64, compliance: f64, config: &EngineConfig) -> f64 {
    weight_trajectory(weight_kg, height_cm, compliance, config)
        .last()
        .copied()
        .unwrap_or(weight_kg)
}

/// Weekly weights after each simulated week
pub fn weight_trajectory(
    weight_kg: f64,
    height_cm: f64,
    compliance: f64,
    config: &EngineConfig,
) -> Vec<f64> {
    let projection = &config.projection;
    let (min_kg, max_kg) = healthy_weight_bounds(height_cm);
    let category = bmi_category(bmi(weight_kg, height_cm));
    let max_loss = weight_kg * projection.max_loss_fraction;
    let midpoint = (min_kg + max_kg) / 2.0;

    let weekly_delta = match category {
        BmiCategory::Underweight => projection.underweight_gain_kg_per_week * compliance,
        BmiCategory::Normal => {
            let direction = (midpoint - weight_kg).signum();
            direction * projection.healthy_drift_kg_per_week * compliance
        }
        BmiCategory::Overweight => -projection.overweight_loss_kg_per_week * compliance,
        BmiCategory::Obese => -projection.obese_loss_kg_per_week * compliance,
        BmiCategory::SeverelyObese => -projection.severely_obese_loss_kg_per_week * compliance,
    };

    let mut weight = weight_kg;
    let mut trajectory = Vec::with_capacity(projection.weeks as usize);
    for _ in 0..projection.weeks {
        weight += weekly_delta;
        weight = match category {
            BmiCategory::Underweight => weight.min(max_kg),
            BmiCategory::Normal => {
                // drift toward the midpoint without crossing it
                if weekly_delta > 0.0 {
                    weight.min(midpoint.max(weight_kg))
                } else {
                    weight.max(midpoint.min(weight_kg))
                }
            }
            _ => weight.max(weight_kg - max_loss).max(min_kg),
        };
        trajectory.push(weight);
    }
    trajectory
}

/// Sleep moves a compliance-weighted share of the gap and never regresses
fn project_sleep(current: f64, target: f64, compliance: f64, config: &EngineConfig) -> f64 {
    if current >= target {
        return current.min(config.sleep_ceiling_hours);
    }
    let projected = (current + (target - current) * compliance).min(config.sleep_ceiling_hours);
    round_to(projected.max(current), 1)
}

/// Caps below the current count apply from the first week
fn project_steps(current: f64, target: f64, compliance: f64) -> f64 {
    let projected = if target < current {
        target
    } else {
        (move_toward(current, target, compliance) / 10.0).round() * 10.0
    };
    projected.min(f64::from(STEP_CEILING))
}

fn move_toward(current: f64, target: f64, compliance: f64) -> f64 {
    current + (target - current) * compliance
}

fn energy_base(level: EnergyLevel) -> f64 {
    match level {
        EnergyLevel::Low => 3.0,
        EnergyLevel::Medium => 6.0,
        EnergyLevel::High => 8.0,
    }
}

/// Energy derived from improvement in sleep, hydration and exercise
fn project_energy(
    level: EnergyLevel,
    sleep: (f64, f64),
    hydration: (f64, f64),
    steps: (f64, f64),
) -> MetricProjection {
    let current = energy_base(level);
    let sleep_gain = (sleep_score_from_hours(sleep.1) - sleep_score_from_hours(sleep.0)).max(0.0);
    let hydration_gain =
        (hydration_score_from_liters(hydration.1) - hydration_score_from_liters(hydration.0)).max(0.0);
    let exercise_gain =
        (exercise_score_from_steps(steps.1) - exercise_score_from_steps(steps.0)).max(0.0);

    let projected = current
        + ENERGY_PER_SLEEP_POINT * sleep_gain
        + ENERGY_PER_HYDRATION_POINT * hydration_gain
        + ENERGY_PER_EXERCISE_POINT * exercise_gain;

    MetricProjection::new(current, round_to(projected.min(ENERGY_MAX), 1))
}

fn project_health_score(
    metrics: &HealthMetrics,
    sleep_hours: f64,
    hydration_liters: f64,
    steps: f64,
    compliance: f64,
) -> f64 {
    let sleep = sleep_score_from_hours(sleep_hours).max(f64::from(metrics.sleep));
    let hydration = hydration_score_from_liters(hydration_liters).max(f64::from(metrics.hydration));
    let exercise = exercise_score_from_steps(steps).max(f64::from(metrics.exercise));
    let nutrition_current = f64::from(metrics.nutrition);
    let nutrition =
        nutrition_current + (NUTRITION_TARGET_SCORE - nutrition_current).max(0.0) * compliance;

    composite_score([hydration, sleep, exercise, nutrition])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{calculate_all_targets, TargetInputs};
    use crate::types::{ConditionAnalysis, Gender};

    fn project(
        age: u32,
        weight: f64,
        height: f64,
        metrics: HealthMetrics,
        lifestyle: LifestyleFactors,
        conditions: &ConditionAnalysis,
    ) -> NinetyDayProjection {
        let config = EngineConfig::default();
        let targets = calculate_all_targets(
            &TargetInputs {
                age,
                gender: Gender::Female,
                weight_kg: weight,
                height_cm: height,
                metrics,
                conditions,
            },
            &config,
        );
        calculate_ninety_day_projection(
            &ProjectionInputs {
                weight_kg: weight,
                height_cm: height,
                metrics,
                lifestyle,
                targets: &targets,
            },
            &config,
        )
    }

    fn default_projection(weight: f64, height: f64) -> NinetyDayProjection {
        project(
            45,
            weight,
            height,
            HealthMetrics::uniform(5),
            LifestyleFactors::default(),
            &ConditionAnalysis::default(),
        )
    }

    #[test]
    fn test_underweight_gains() {
        let projection = default_projection(50.0, 170.0);
        assert!(projection.weight.projected > 50.0);
        assert!(projection.bmi.projected > projection.bmi.current);
    }

    #[test]
    fn test_severely_obese_loses_within_cap() {
        let projection = default_projection(100.0, 165.0);
        assert!(projection.weight.projected < 100.0);
        assert!(projection.bmi.projected < projection.bmi.current);
        let loss = projection.weight.current - projection.weight.projected;
        assert!(loss <= 100.0 * 0.12);
    }

    #[test]
    fn test_loss_cap_binds_for_fast_rates() {
        let mut config = EngineConfig::default();
        config.projection.severely_obese_loss_kg_per_week = 1.0;
        config.projection.compliance_medium_urgency = 0.95;
        let projected = project_weight(90.0, 150.0, 0.95, &config);
        assert!((90.0 - projected) <= 9.0 + 1e-9);
    }

    #[test]
    fn test_healthy_weight_drift_is_bounded() {
        let projection = default_projection(60.0, 175.0);
        let drift = (projection.weight.projected - projection.weight.current).abs();
        assert!(drift <= 0.1 * 13.0 + 0.05);
        let bmi = projection.bmi.projected;
        assert!((18.5..25.0).contains(&bmi));
    }

    #[test]
    fn test_bmi_consistent_with_weight() {
        for (weight, height) in [(50.0, 170.0), (100.0, 165.0), (72.0, 180.0), (130.0, 190.0)] {
            let projection = default_projection(weight, height);
            let expected = projection.weight.projected / (height / 100.0_f64).powi(2);
            assert!((projection.bmi.projected - expected).abs() <= 0.2);
        }
    }

    #[test]
    fn test_sleep_never_regresses_when_optimal() {
        let projection = project(
            40,
            70.0,
            175.0,
            HealthMetrics::uniform(9),
            LifestyleFactors::default(),
            &ConditionAnalysis::default(),
        );
        assert!(projection.sleep.projected >= projection.sleep.current);
        assert_eq!(projection.sleep.projected, 8.5);
    }

    #[test]
    fn test_sleep_improves_toward_target() {
        let projection = default_projection(70.0, 175.0);
        assert!(projection.sleep.projected > projection.sleep.current);
        assert!(projection.sleep.projected <= 9.0);
    }

    #[test]
    fn test_energy_capped_at_ten() {
        let lifestyle = LifestyleFactors {
            energy_level: EnergyLevel::High,
            urgency_level: UrgencyLevel::High,
            ..LifestyleFactors::default()
        };
        let projection = project(
            20,
            70.0,
            175.0,
            HealthMetrics::uniform(1),
            lifestyle,
            &ConditionAnalysis::default(),
        );
        assert!(projection.energy_level.projected <= 10.0);
        assert!(projection.energy_level.projected > projection.energy_level.current);
    }

    #[test]
    fn test_health_score_does_not_decrease() {
        let heart = ConditionAnalysis::classify(&["heart_condition"], false);
        let projection = project(
            30,
            70.0,
            175.0,
            HealthMetrics::uniform(9),
            LifestyleFactors::default(),
            &heart,
        );
        assert!(projection.health_score.projected >= projection.health_score.current);
        assert_eq!(projection.steps.projected, 6_000.0);
    }

    #[test]
    fn test_compliance_rate_bounds() {
        let config = EngineConfig::default();
        let mut lifestyle = LifestyleFactors {
            urgency_level: UrgencyLevel::High,
            social_support: SocialSupport::Supported,
            ..LifestyleFactors::default()
        };
        assert_eq!(compliance_rate(&lifestyle, &config), 0.9);

        lifestyle.urgency_level = UrgencyLevel::Low;
        lifestyle.social_support = SocialSupport::Unsupported;
        lifestyle.stress_level = StressLevel::High;
        assert_eq!(compliance_rate(&lifestyle, &config), 0.55);
    }

    #[test]
    fn test_trajectory_has_one_entry_per_week() {
        let config = EngineConfig::default();
        let trajectory = weight_trajectory(100.0, 165.0, 0.75, &config);
        assert_eq!(trajectory.len(), 13);
        assert!(trajectory.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_sleep_projection_respects_configured_ceiling() {
        let default = EngineConfig::default();
        assert_eq!(project_sleep(9.0, 8.0, 0.75, &default), 9.0);

        let mut config = EngineConfig::default();
        config.sleep_ceiling_hours = 8.0;
        assert_eq!(project_sleep(9.0, 8.0, 0.75, &config), 8.0);
        assert_eq!(project_sleep(6.0, 8.5, 1.0, &config), 8.0);
    }
}
