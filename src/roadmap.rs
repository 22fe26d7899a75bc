//! Phase roadmap generation
//!
//! Breaks the 90-day projection into 13 weekly milestones and three named
//! phases. Week `w` sits at progress `(w / 13)^p` between the current and the
//! projected values; the pacing exponent `p` front-loads change for urgent
//! users and back-loads it when diet or medical severity call for a gentler
//! start. The final week always equals the projection.

use crate::config::{EngineConfig, STEP_CEILING};
use crate::scoring::{exercise_minutes_from_score, round_to};
use crate::types::{
    ConditionAnalysis, ConditionSeverity, DietSignal, NinetyDayProjection, PersonalizedTargets,
    ProfileInput, ProgressiveTargets, RoadmapPhase, TransformationRoadmap, UrgencyLevel,
    WeeklyTarget, WeightDirection,
};

/// Phase boundaries as (name, first week, last week)
const PHASES: [(&str, u32, u32); 3] = [
    ("Foundation", 1, 4),
    ("Momentum", 5, 8),
    ("Mastery", 9, 13),
];

const POOR_DIET_PACING: f64 = 0.2;
const HIGH_SEVERITY_PACING: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct RoadmapInputs<'a> {
    pub age: u32,
    pub exercise_score: u8,
    pub diet: DietSignal,
    pub urgency: UrgencyLevel,
    pub conditions: &'a ConditionAnalysis,
    pub targets: &'a PersonalizedTargets,
    pub projection: &'a NinetyDayProjection,
}

impl<'a> RoadmapInputs<'a> {
    pub fn from_profile(
        profile: &ProfileInput,
        conditions: &'a ConditionAnalysis,
        targets: &'a PersonalizedTargets,
        projection: &'a NinetyDayProjection,
    ) -> Self {
        Self {
            age: profile.demographics.age,
            exercise_score: profile.health_metrics.exercise,
            diet: DietSignal::from_nutrition_score(profile.health_metrics.nutrition),
            urgency: profile.lifestyle.urgency_level,
            conditions,
            targets,
            projection,
        }
    }
}

/// Build the weekly milestones and phase plan
pub fn generate_roadmap(inputs: &RoadmapInputs<'_>, config: &EngineConfig) -> TransformationRoadmap {
    let weeks = config.projection.weeks;
    let exponent = pacing_exponent(inputs.urgency, inputs.diet, inputs.conditions.severity);

    let weekly_targets: Vec<WeeklyTarget> = (1..=weeks)
        .map(|week| weekly_target(inputs, week, weeks, exponent, config.sleep_ceiling_hours))
        .collect();

    TransformationRoadmap {
        pacing_exponent: exponent,
        phases: phases(inputs, &weekly_targets),
        progressive_targets: ProgressiveTargets { weekly_targets },
    }
}

/// Exponent applied to linear weekly progress
pub fn pacing_exponent(urgency: UrgencyLevel, diet: DietSignal, severity: ConditionSeverity) -> f64 {
    let mut exponent = match urgency {
        UrgencyLevel::Low => 1.3,
        UrgencyLevel::Medium => 1.0,
        UrgencyLevel::High => 0.75,
    };
    if diet == DietSignal::Poor {
        exponent += POOR_DIET_PACING;
    }
    if severity >= ConditionSeverity::High {
        exponent += HIGH_SEVERITY_PACING;
    }
    round_to(exponent, 2)
}

fn phase_for_week(week: u32) -> u32 {
    PHASES
        .iter()
        .position(|(_, start, end)| (*start..=*end).contains(&week))
        .map(|idx| idx as u32 + 1)
        .unwrap_or(PHASES.len() as u32)
}

fn weekly_target(
    inputs: &RoadmapInputs<'_>,
    week: u32,
    weeks: u32,
    exponent: f64,
    sleep_ceiling: f64,
) -> WeeklyTarget {
    let projection = inputs.projection;
    let targets = inputs.targets;
    let step_cap = f64::from(targets.steps.target_steps.min(STEP_CEILING));
    let exercise_target = targets.exercise.minutes_per_week;
    let exercise_current = exercise_minutes_from_score(inputs.exercise_score);

    if week == weeks {
        return WeeklyTarget {
            week,
            phase: phase_for_week(week),
            progress: 1.0,
            sleep_hours: projection.sleep.projected,
            hydration_liters: projection.hydration.projected,
            steps: projection.steps.projected.min(step_cap) as u32,
            exercise_minutes: exercise_target,
            weight_kg: projection.weight.projected,
        };
    }

    let progress = round_to((f64::from(week) / f64::from(weeks)).powf(exponent), 3);
    let lerp = |from: f64, to: f64| from + (to - from) * progress;

    let sleep = lerp(projection.sleep.current, projection.sleep.projected).min(sleep_ceiling);
    let steps = lerp(projection.steps.current, projection.steps.projected).min(step_cap);
    // condition caps below the current volume apply from week one
    let exercise = lerp(f64::from(exercise_current), f64::from(exercise_target))
        .min(f64::from(exercise_target));

    WeeklyTarget {
        week,
        phase: phase_for_week(week),
        progress,
        sleep_hours: round_to(sleep, 1),
        hydration_liters: round_to(lerp(projection.hydration.current, projection.hydration.projected), 1),
        steps: ((steps / 10.0).round() * 10.0) as u32,
        exercise_minutes: (exercise / 5.0).round() as u32 * 5,
        weight_kg: round_to(lerp(projection.weight.current, projection.weight.projected), 1),
    }
}

fn phases(inputs: &RoadmapInputs<'_>, weekly: &[WeeklyTarget]) -> Vec<RoadmapPhase> {
    let targets = inputs.targets;
    let conditions = inputs.conditions;

    let mut foundation = vec![
        format!("Build a consistent {:.1}h sleep routine", targets.sleep.target_hours),
        format!("Work up to {:.1} L of water daily", targets.hydration.target_liters),
    ];
    if conditions.has_any_condition() {
        foundation.push("Review the plan with your healthcare provider".to_string());
    }
    if inputs.diet == DietSignal::Poor {
        foundation.push("Replace one processed meal a day with whole foods".to_string());
    }

    let mut momentum = vec![
        format!("Reach {} daily steps", targets.steps.target_steps),
        format!(
            "Train {} sessions per week, {} of them strength",
            targets.exercise.sessions_per_week, targets.exercise.strength_sessions_per_week
        ),
    ];
    if inputs.age >= 65 {
        momentum.push("Add balance and mobility work".to_string());
    }
    match targets.weight.direction {
        WeightDirection::Loss => momentum.push(format!(
            "Lose about {:.1} kg per week",
            targets.weight.weekly_rate_kg
        )),
        WeightDirection::Gain => momentum.push(format!(
            "Gain about {:.2} kg per week with protein-rich meals",
            targets.weight.weekly_rate_kg
        )),
        WeightDirection::Maintain => {}
    }

    let mut mastery = vec![
        "Keep habits steady without daily tracking".to_string(),
        format!("Hold {} minutes of exercise per week", targets.exercise.minutes_per_week),
    ];
    if conditions.severity >= ConditionSeverity::High {
        mastery.push("Schedule a follow-up check with your doctor".to_string());
    }

    let health_score = inputs.projection.health_score.projected;
    let milestone = |(idx, end): (usize, u32)| -> String {
        let Some(week) = weekly.iter().find(|w| w.week == end).or(weekly.last()) else {
            return String::new();
        };
        match idx {
            0 => format!(
                "Sleeping {:.1}h and drinking {:.1} L daily",
                week.sleep_hours, week.hydration_liters
            ),
            1 => format!(
                "Walking {} steps a day with {} minutes of weekly exercise",
                week.steps, week.exercise_minutes
            ),
            _ => format!("Weight {:.1} kg, health score {health_score:.1}", week.weight_kg),
        }
    };

    PHASES
        .iter()
        .zip([foundation, momentum, mastery])
        .enumerate()
        .map(|(idx, ((name, start, end), focus))| RoadmapPhase {
            phase: idx as u32 + 1,
            name: name.to_string(),
            start_week: *start,
            end_week: *end,
            focus,
            milestone: milestone((idx, *end)),
        })
        .collect()
}
