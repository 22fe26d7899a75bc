//! Personalized target calculation
//!
//! Derives daily and weekly targets (sleep, hydration, steps, exercise, weight)
//! from demographics, self-assessed metrics and condition flags. Condition caps
//! are applied after the general adjustments so they always win.

use crate::config::EngineConfig;
use crate::risk::{bmi, bmi_category};
use crate::scoring::{
    hydration_liters_from_score, round_to, sleep_hours_from_score, steps_from_score,
};
use crate::types::{
    BmiCategory, ConditionAnalysis, ExerciseTarget, Gender, HealthMetrics, HealthyWeightRange,
    HydrationTarget, PersonalizedTargets, ProfileInput, SleepTarget, StepTarget, WeightDirection,
    WeightTarget,
};

/// BMI bounds of the healthy weight range
pub const HEALTHY_BMI_MIN: f64 = 18.5;
pub const HEALTHY_BMI_MAX: f64 = 24.9;

/// Recommended weekly rates used for the weight timeline estimate (kg)
const GAIN_RATE_KG_PER_WEEK: f64 = 0.25;
const LOSS_RATE_KG_PER_WEEK: f64 = 0.5;

/// Inputs to the target calculator
#[derive(Debug, Clone, Copy)]
pub struct TargetInputs<'a> {
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub metrics: HealthMetrics,
    pub conditions: &'a ConditionAnalysis,
}

impl<'a> TargetInputs<'a> {
    pub fn from_profile(profile: &ProfileInput, conditions: &'a ConditionAnalysis) -> Self {
        let demographics = &profile.demographics;
        Self {
            age: demographics.age,
            gender: demographics.gender,
            weight_kg: demographics.weight_kg,
            height_cm: demographics.height_cm,
            metrics: profile.health_metrics,
            conditions,
        }
    }

    fn bmi(&self) -> f64 {
        bmi(self.weight_kg, self.height_cm)
    }
}

/// Compute every personalized target
pub fn calculate_all_targets(inputs: &TargetInputs<'_>, config: &EngineConfig) -> PersonalizedTargets {
    let bmi = inputs.bmi();
    let category = bmi_category(bmi);

    PersonalizedTargets {
        sleep: calculate_sleep_target(inputs.age, inputs.metrics.sleep, inputs.conditions, config),
        hydration: calculate_hydration_target(inputs, config),
        steps: calculate_step_target(
            inputs.age,
            bmi,
            inputs.metrics.exercise,
            inputs.conditions,
            config,
        ),
        weight: calculate_weight_target(inputs.weight_kg, inputs.height_cm),
        exercise: calculate_exercise_target(
            inputs.age,
            inputs.metrics.exercise,
            category,
            inputs.conditions,
        ),
        healthy_weight_range: calculate_healthy_weight_range(inputs.height_cm),
    }
}

/// Weight band for BMI 18.5-24.9 at the given height
pub fn calculate_healthy_weight_range(height_cm: f64) -> HealthyWeightRange {
    let (min_kg, max_kg) = healthy_weight_bounds(height_cm);
    HealthyWeightRange {
        min_kg: round_to(min_kg, 1),
        max_kg: round_to(max_kg, 1),
    }
}

/// Unrounded healthy weight bounds (kg)
pub(crate) fn healthy_weight_bounds(height_cm: f64) -> (f64, f64) {
    let height_m = height_cm / 100.0;
    let squared = height_m * height_m;
    (HEALTHY_BMI_MIN * squared, HEALTHY_BMI_MAX * squared)
}

/// Age-banded sleep target, never below what is already achieved
pub fn calculate_sleep_target(
    age: u32,
    sleep_score: u8,
    conditions: &ConditionAnalysis,
    config: &EngineConfig,
) -> SleepTarget {
    let ceiling = config.sleep_ceiling_hours;
    let base: f64 = match age {
        0..=17 => 9.0,
        18..=25 => 8.0,
        26..=64 => 7.5,
        _ => 7.0,
    };
    let recovery_bonus: f64 = if conditions.has_heart_condition
        || conditions.has_kidney_disease
        || conditions.has_liver_disease
        || conditions.is_pregnant
    {
        0.5
    } else {
        0.0
    };

    let current_hours = sleep_hours_from_score(sleep_score);
    let mut target_hours = (base + recovery_bonus).min(ceiling);
    if current_hours >= target_hours {
        target_hours = current_hours.min(ceiling);
    }

    SleepTarget {
        current_hours,
        target_hours: round_to(target_hours, 1),
    }
}

/// Weight-based hydration target with gender multiplier and condition adjustments
pub fn calculate_hydration_target(inputs: &TargetInputs<'_>, config: &EngineConfig) -> HydrationTarget {
    let hydration = &config.hydration;
    let multiplier = match inputs.gender {
        Gender::Male => hydration.male_l_per_kg,
        Gender::Female => hydration.female_l_per_kg,
        Gender::Other => hydration.other_l_per_kg,
    };

    let mut liters = inputs.weight_kg * multiplier;
    if inputs.conditions.is_pregnant {
        liters += hydration.pregnancy_bonus_l;
    }
    if inputs.metrics.exercise >= 7 {
        liters += hydration.active_bonus_l;
    }
    if inputs.conditions.has_kidney_disease {
        liters = liters.min(hydration.kidney_cap_l);
    }
    liters = liters.clamp(hydration.min_l, hydration.max_l);

    HydrationTarget {
        current_liters: hydration_liters_from_score(inputs.metrics.hydration),
        target_liters: round_to(liters, 1),
    }
}

/// Age-banded step target with obesity adjustment and condition caps
pub fn calculate_step_target(
    age: u32,
    bmi: f64,
    exercise_score: u8,
    conditions: &ConditionAnalysis,
    config: &EngineConfig,
) -> StepTarget {
    let limits = &config.steps;
    let mut target: u32 = match age {
        0..=24 => 12_000,
        25..=39 => 10_000,
        40..=54 => 9_000,
        55..=64 => 8_000,
        _ => 7_000,
    };

    if bmi >= 30.0 {
        target = target.saturating_sub(limits.obesity_adjustment);
    }

    // Caps in priority order; the first applicable one names the reason
    let caps = [
        (conditions.has_heart_condition, limits.heart_condition_cap, "heart condition"),
        (conditions.is_pregnant, limits.pregnancy_cap, "pregnancy or breastfeeding"),
        (
            bmi_category(bmi) == BmiCategory::Underweight,
            limits.underweight_cap,
            "underweight: conserving energy for healthy gain",
        ),
    ];
    let mut cap_reason = None;
    for (applies, cap, reason) in caps {
        if applies && target > cap {
            target = cap;
        }
        if applies && cap_reason.is_none() {
            cap_reason = Some(reason.to_string());
        }
    }

    target = target.min(limits.ceiling);
    target = (target / 100) * 100;
    target = target.max(limits.floor);

    StepTarget {
        current_steps: steps_from_score(exercise_score),
        target_steps: target,
        cap_reason,
    }
}

/// Classify the weight goal against the healthy range for the height
pub fn calculate_weight_target(weight_kg: f64, height_cm: f64) -> WeightTarget {
    let (min_kg, max_kg) = healthy_weight_bounds(height_cm);
    let current_kg = round_to(weight_kg, 1);

    match bmi_category(bmi(weight_kg, height_cm)) {
        BmiCategory::Underweight => {
            let deficit_kg = round_to(min_kg - weight_kg, 1).max(0.1);
            WeightTarget {
                direction: WeightDirection::Gain,
                current_kg,
                target_kg: round_to(min_kg, 1),
                deficit_kg,
                excess_kg: 0.0,
                is_healthy: false,
                weekly_rate_kg: GAIN_RATE_KG_PER_WEEK,
                estimated_weeks: (deficit_kg / GAIN_RATE_KG_PER_WEEK).ceil() as u32,
            }
        }
        BmiCategory::Normal => WeightTarget {
            direction: WeightDirection::Maintain,
            current_kg,
            target_kg: current_kg,
            deficit_kg: 0.0,
            excess_kg: 0.0,
            is_healthy: true,
            weekly_rate_kg: 0.0,
            estimated_weeks: 0,
        },
        _ => {
            let excess_kg = round_to(weight_kg - max_kg, 1).max(0.1);
            WeightTarget {
                direction: WeightDirection::Loss,
                current_kg,
                target_kg: round_to(max_kg, 1),
                deficit_kg: 0.0,
                excess_kg,
                is_healthy: false,
                weekly_rate_kg: LOSS_RATE_KG_PER_WEEK,
                estimated_weeks: (excess_kg / LOSS_RATE_KG_PER_WEEK).ceil() as u32,
            }
        }
    }
}

/// Weekly exercise minutes by fitness level, capped for age and conditions
pub fn calculate_exercise_target(
    age: u32,
    exercise_score: u8,
    category: BmiCategory,
    conditions: &ConditionAnalysis,
) -> ExerciseTarget {
    let mut minutes: u32 = match exercise_score {
        0..=3 => 90,
        4..=6 => 150,
        _ => 200,
    };
    if age >= 65 {
        minutes = minutes.min(150);
    }
    if conditions.has_heart_condition {
        minutes = minutes.min(90);
    }
    if conditions.is_pregnant {
        minutes = minutes.min(120);
    }
    if category == BmiCategory::Underweight {
        minutes = minutes.min(120);
    }

    let strength_sessions_per_week = if conditions.has_heart_condition || conditions.is_pregnant {
        1
    } else {
        2
    };

    ExerciseTarget {
        minutes_per_week: minutes,
        sessions_per_week: minutes.div_ceil(30).clamp(3, 6),
        strength_sessions_per_week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_conditions() -> ConditionAnalysis {
        ConditionAnalysis::default()
    }

    fn inputs<'a>(
        age: u32,
        gender: Gender,
        weight: f64,
        height: f64,
        conditions: &'a ConditionAnalysis,
    ) -> TargetInputs<'a> {
        TargetInputs {
            age,
            gender,
            weight_kg: weight,
            height_cm: height,
            metrics: HealthMetrics::uniform(5),
            conditions,
        }
    }

    #[test]
    fn test_healthy_weight_range() {
        let range = calculate_healthy_weight_range(170.0);
        assert_eq!(range.min_kg, 53.5);
        assert_eq!(range.max_kg, 72.0);
    }

    #[test]
    fn test_underweight_gain_target() {
        let target = calculate_weight_target(50.0, 170.0);
        assert_eq!(target.direction, WeightDirection::Gain);
        assert!(target.deficit_kg > 0.0);
        assert_eq!(target.excess_kg, 0.0);
        assert!(!target.is_healthy);
        assert_eq!(target.target_kg, 53.5);
    }

    #[test]
    fn test_obese_loss_target() {
        let target = calculate_weight_target(100.0, 165.0);
        assert_eq!(target.direction, WeightDirection::Loss);
        assert!(target.excess_kg > 30.0);
        assert_eq!(target.deficit_kg, 0.0);
        assert!(target.estimated_weeks > 0);
    }

    #[test]
    fn test_bmi_just_over_25_is_loss_with_positive_excess() {
        // 64.5 / 1.6^2 = 25.2
        let target = calculate_weight_target(64.5, 160.0);
        assert_eq!(target.direction, WeightDirection::Loss);
        assert!(target.excess_kg > 0.0);
    }

    #[test]
    fn test_healthy_maintain_target() {
        let target = calculate_weight_target(65.0, 175.0);
        assert_eq!(target.direction, WeightDirection::Maintain);
        assert!(target.is_healthy);
        assert_eq!(target.deficit_kg, 0.0);
        assert_eq!(target.excess_kg, 0.0);
    }

    #[test]
    fn test_step_target_age_bands() {
        let config = EngineConfig::default();
        let none = no_conditions();
        assert_eq!(calculate_step_target(20, 22.0, 5, &none, &config).target_steps, 12_000);
        assert_eq!(calculate_step_target(30, 22.0, 5, &none, &config).target_steps, 10_000);
        assert_eq!(calculate_step_target(70, 22.0, 5, &none, &config).target_steps, 7_000);
    }

    #[test]
    fn test_step_target_obesity_adjustment() {
        let config = EngineConfig::default();
        let none = no_conditions();
        let target = calculate_step_target(30, 36.7, 5, &none, &config);
        assert_eq!(target.target_steps, 8_000);
        assert!(target.cap_reason.is_none());
    }

    #[test]
    fn test_heart_condition_caps_steps() {
        let config = EngineConfig::default();
        let heart = ConditionAnalysis::classify(&["heart_condition", "pregnancy_breastfeeding"], false);
        let target = calculate_step_target(20, 22.0, 9, &heart, &config);
        assert!(target.target_steps <= 6_000);
        assert_eq!(target.cap_reason.as_deref(), Some("heart condition"));
    }

    #[test]
    fn test_pregnancy_caps_steps() {
        let config = EngineConfig::default();
        let pregnant = ConditionAnalysis::classify(&["pregnancy_breastfeeding"], false);
        assert!(calculate_step_target(22, 22.0, 5, &pregnant, &config).target_steps <= 7_000);
    }

    #[test]
    fn test_underweight_caps_steps() {
        let config = EngineConfig::default();
        let target = calculate_step_target(20, 16.0, 5, &no_conditions(), &config);
        assert_eq!(target.target_steps, 6_000);
    }

    #[test]
    fn test_step_floor() {
        let mut config = EngineConfig::default();
        config.steps.obesity_adjustment = 9_000;
        let target = calculate_step_target(70, 40.0, 1, &no_conditions(), &config);
        assert_eq!(target.target_steps, 3_000);
    }

    #[test]
    fn test_hydration_by_gender() {
        let config = EngineConfig::default();
        let none = no_conditions();
        let male = calculate_hydration_target(&inputs(30, Gender::Male, 80.0, 180.0, &none), &config);
        let female =
            calculate_hydration_target(&inputs(30, Gender::Female, 80.0, 180.0, &none), &config);
        assert_eq!(male.target_liters, 2.8);
        assert_eq!(female.target_liters, 2.5);
    }

    #[test]
    fn test_hydration_pregnancy_bonus() {
        let config = EngineConfig::default();
        let pregnant = ConditionAnalysis::classify(&["pregnancy_breastfeeding"], false);
        let target =
            calculate_hydration_target(&inputs(30, Gender::Female, 60.0, 165.0, &pregnant), &config);
        // 60 * 0.031 + 0.7
        assert_eq!(target.target_liters, 2.6);
    }

    #[test]
    fn test_hydration_kidney_cap() {
        let config = EngineConfig::default();
        let kidney = ConditionAnalysis::classify(&["kidney_disease"], false);
        let target =
            calculate_hydration_target(&inputs(40, Gender::Male, 110.0, 180.0, &kidney), &config);
        assert_eq!(target.target_liters, 2.0);
    }

    #[test]
    fn test_sleep_target_bands() {
        let config = EngineConfig::default();
        let none = no_conditions();
        assert_eq!(calculate_sleep_target(16, 3, &none, &config).target_hours, 9.0);
        assert_eq!(calculate_sleep_target(22, 3, &none, &config).target_hours, 8.0);
        assert_eq!(calculate_sleep_target(40, 3, &none, &config).target_hours, 7.5);
        assert_eq!(calculate_sleep_target(70, 3, &none, &config).target_hours, 7.0);
    }

    #[test]
    fn test_sleep_target_recovery_bonus_within_ceiling() {
        let config = EngineConfig::default();
        let kidney = ConditionAnalysis::classify(&["kidney_disease"], false);
        assert_eq!(calculate_sleep_target(40, 3, &kidney, &config).target_hours, 8.0);
        assert_eq!(calculate_sleep_target(16, 3, &kidney, &config).target_hours, 9.0);

        let mut low_ceiling = EngineConfig::default();
        low_ceiling.sleep_ceiling_hours = 7.0;
        assert_eq!(calculate_sleep_target(40, 3, &kidney, &low_ceiling).target_hours, 7.0);
    }

    #[test]
    fn test_sleep_target_never_below_current() {
        let config = EngineConfig::default();
        // score 8 => 8.0 hours, above the 7.5 band
        let target = calculate_sleep_target(40, 8, &no_conditions(), &config);
        assert_eq!(target.target_hours, 8.0);
        assert!(target.target_hours >= target.current_hours);

        let target = calculate_sleep_target(40, 10, &no_conditions(), &config);
        assert_eq!(target.target_hours, 9.0);
    }

    #[test]
    fn test_exercise_target_caps() {
        let heart = ConditionAnalysis::classify(&["heart_condition"], false);
        let target = calculate_exercise_target(30, 9, BmiCategory::Normal, &heart);
        assert_eq!(target.minutes_per_week, 90);
        assert_eq!(target.sessions_per_week, 3);
        assert_eq!(target.strength_sessions_per_week, 1);

        let target = calculate_exercise_target(30, 9, BmiCategory::Normal, &no_conditions());
        assert_eq!(target.minutes_per_week, 200);
        assert_eq!(target.sessions_per_week, 6);
    }

    #[test]
    fn test_calculate_all_targets_underweight_scenario() {
        let config = EngineConfig::default();
        let none = no_conditions();
        let targets = calculate_all_targets(&inputs(45, Gender::Female, 50.0, 170.0, &none), &config);
        assert_eq!(targets.weight.direction, WeightDirection::Gain);
        assert!(targets.steps.target_steps <= 6_500);
        assert_eq!(targets.exercise.minutes_per_week, 120);
    }
}
