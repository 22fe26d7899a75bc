//! Profile precondition checks
//!
//! Runs before any computation and fails on the first violation.

use crate::error::HealthprintError;
use crate::types::ProfileInput;
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 20.0..=400.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 50.0..=272.0;
pub const METRIC_RANGE: RangeInclusive<u8> = 1..=10;

/// Reject profiles the engine cannot score
pub fn validate_profile(profile: &ProfileInput) -> Result<(), HealthprintError> {
    let demographics = &profile.demographics;

    if !AGE_RANGE.contains(&demographics.age) {
        return Err(HealthprintError::invalid_profile(
            "demographics.age",
            format!("{} is outside {:?}", demographics.age, AGE_RANGE),
        ));
    }
    check_measure("demographics.weightKg", demographics.weight_kg, &WEIGHT_RANGE_KG)?;
    check_measure("demographics.heightCm", demographics.height_cm, &HEIGHT_RANGE_CM)?;

    let metrics = &profile.health_metrics;
    for (field, score) in [
        ("healthMetrics.hydration", metrics.hydration),
        ("healthMetrics.sleep", metrics.sleep),
        ("healthMetrics.exercise", metrics.exercise),
        ("healthMetrics.nutrition", metrics.nutrition),
    ] {
        if !METRIC_RANGE.contains(&score) {
            return Err(HealthprintError::invalid_profile(
                field,
                format!("score {score} must be between 1 and 10"),
            ));
        }
    }

    Ok(())
}

fn check_measure(
    field: &str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<(), HealthprintError> {
    if !value.is_finite() {
        return Err(HealthprintError::invalid_profile(field, "must be a finite number"));
    }
    if !range.contains(&value) {
        return Err(HealthprintError::invalid_profile(
            field,
            format!("{value} is outside {}..={}", range.start(), range.end()),
        ));
    }
    Ok(())
}
