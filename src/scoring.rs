//! Composite health score, letter grade, and metric conversions
//!
//! The 1-10 self-assessed metrics are mapped to physical quantities (sleep
//! hours, liters of water, daily steps) and back, so that projections made in
//! physical units can be rescored with the same composite used for the
//! initial `overall_score`.

use crate::types::HealthMetrics;

/// Grade thresholds, highest first
const GRADE_BANDS: &[(f64, &str)] = &[
    (97.0, "A+"),
    (93.0, "A"),
    (90.0, "A-"),
    (87.0, "B+"),
    (83.0, "B"),
    (80.0, "B-"),
    (77.0, "C+"),
    (73.0, "C"),
    (70.0, "C-"),
    (67.0, "D+"),
    (63.0, "D"),
    (60.0, "D-"),
];

pub const METRIC_MIN: f64 = 1.0;
pub const METRIC_MAX: f64 = 10.0;

/// Round to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Unweighted mean of four 1-10 component scores, scaled to 0-100
pub fn composite_score(components: [f64; 4]) -> f64 {
    let mean = components.iter().sum::<f64>() / components.len() as f64;
    round_to(mean * 10.0, 1)
}

/// Overall score for the self-assessed metrics
pub fn overall_score(metrics: &HealthMetrics) -> f64 {
    composite_score(metrics.as_array().map(f64::from))
}

/// Letter grade for a 0-100 score
pub fn grade(score: f64) -> &'static str {
    GRADE_BANDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|(_, grade)| *grade)
        .unwrap_or("F")
}

/// Nightly sleep hours implied by a sleep score
pub fn sleep_hours_from_score(score: u8) -> f64 {
    4.0 + 0.5 * f64::from(score)
}

pub fn sleep_score_from_hours(hours: f64) -> f64 {
    ((hours - 4.0) / 0.5).clamp(METRIC_MIN, METRIC_MAX)
}

/// Daily water intake (liters) implied by a hydration score
pub fn hydration_liters_from_score(score: u8) -> f64 {
    0.5 + 0.25 * f64::from(score)
}

pub fn hydration_score_from_liters(liters: f64) -> f64 {
    ((liters - 0.5) / 0.25).clamp(METRIC_MIN, METRIC_MAX)
}

/// Daily steps implied by an exercise score
pub fn steps_from_score(score: u8) -> u32 {
    2_000 + 800 * u32::from(score)
}

pub fn exercise_score_from_steps(steps: f64) -> f64 {
    ((steps - 2_000.0) / 800.0).clamp(METRIC_MIN, METRIC_MAX)
}

/// Weekly structured exercise minutes implied by an exercise score
pub fn exercise_minutes_from_score(score: u8) -> u32 {
    15 * u32::from(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_score_is_mean_times_ten() {
        assert_eq!(overall_score(&HealthMetrics::uniform(5)), 50.0);
        let metrics = HealthMetrics {
            hydration: 5,
            sleep: 5,
            exercise: 5,
            nutrition: 6,
        };
        assert_eq!(overall_score(&metrics), 52.5);
        assert_eq!(overall_score(&HealthMetrics::uniform(10)), 100.0);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(grade(100.0), "A+");
        assert_eq!(grade(97.0), "A+");
        assert_eq!(grade(96.9), "A");
        assert_eq!(grade(90.0), "A-");
        assert_eq!(grade(85.0), "B");
        assert_eq!(grade(72.5), "C-");
        assert_eq!(grade(60.0), "D-");
        assert_eq!(grade(59.9), "F");
        assert_eq!(grade(10.0), "F");
    }

    #[test]
    fn test_conversions_invert() {
        for score in 1..=10u8 {
            let s = f64::from(score);
            assert!((sleep_score_from_hours(sleep_hours_from_score(score)) - s).abs() < 1e-9);
            assert!(
                (hydration_score_from_liters(hydration_liters_from_score(score)) - s).abs() < 1e-9
            );
            assert!((exercise_score_from_steps(steps_from_score(score) as f64) - s).abs() < 1e-9);
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(17.3010, 1), 17.3);
        assert_eq!(round_to(2.449, 2), 2.45);
    }
}
