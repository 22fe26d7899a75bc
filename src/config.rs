//! Engine configuration
//!
//! Safety caps, multipliers and projection tunables shared by every stage.
//! The configuration is read-only once built; `EngineConfig::global()` holds the
//! process-wide default.

use crate::error::HealthprintError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Number of weekly steps in the 90-day window
pub const PROJECTION_WEEKS: u32 = 13;

/// Hard step ceiling for any target, projection or roadmap week
pub const STEP_CEILING: u32 = 15_000;

/// Hard sleep ceiling (hours)
pub const SLEEP_CEILING_HOURS: f64 = 9.0;

/// Step limits and condition caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepLimits {
    /// Minimum step target for any profile
    pub floor: u32,
    /// Maximum step target for any profile
    pub ceiling: u32,
    /// Cap applied when a heart condition is present
    pub heart_condition_cap: u32,
    /// Cap applied during pregnancy or breastfeeding
    pub pregnancy_cap: u32,
    /// Cap applied to underweight profiles to conserve energy for gain
    pub underweight_cap: u32,
    /// Reduction applied when BMI >= 30
    pub obesity_adjustment: u32,
}

impl Default for StepLimits {
    fn default() -> Self {
        Self {
            floor: 3_000,
            ceiling: STEP_CEILING,
            heart_condition_cap: 6_000,
            pregnancy_cap: 7_000,
            underweight_cap: 6_000,
            obesity_adjustment: 2_000,
        }
    }
}

/// Hydration multipliers (liters per kg of body weight) and bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    pub male_l_per_kg: f64,
    pub female_l_per_kg: f64,
    pub other_l_per_kg: f64,
    pub pregnancy_bonus_l: f64,
    pub active_bonus_l: f64,
    pub kidney_cap_l: f64,
    pub min_l: f64,
    pub max_l: f64,
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            male_l_per_kg: 0.035,
            female_l_per_kg: 0.031,
            other_l_per_kg: 0.033,
            pregnancy_bonus_l: 0.7,
            active_bonus_l: 0.3,
            kidney_cap_l: 2.0,
            min_l: 1.5,
            max_l: 4.0,
        }
    }
}

/// Compliance assumptions and weight-change limits for the projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub weeks: u32,
    pub compliance_low_urgency: f64,
    pub compliance_medium_urgency: f64,
    pub compliance_high_urgency: f64,
    pub compliance_min: f64,
    pub compliance_max: f64,
    /// Maximum cumulative loss as a fraction of starting weight
    pub max_loss_fraction: f64,
    /// Weekly gain rate for underweight profiles (kg)
    pub underweight_gain_kg_per_week: f64,
    /// Weekly loss rates (kg) for overweight, obese and severely obese
    pub overweight_loss_kg_per_week: f64,
    pub obese_loss_kg_per_week: f64,
    pub severely_obese_loss_kg_per_week: f64,
    /// Maximum weekly drift for healthy-weight profiles (kg)
    pub healthy_drift_kg_per_week: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            weeks: PROJECTION_WEEKS,
            compliance_low_urgency: 0.60,
            compliance_medium_urgency: 0.75,
            compliance_high_urgency: 0.85,
            compliance_min: 0.50,
            compliance_max: 0.95,
            max_loss_fraction: 0.10,
            underweight_gain_kg_per_week: 0.25,
            overweight_loss_kg_per_week: 0.4,
            obese_loss_kg_per_week: 0.6,
            severely_obese_loss_kg_per_week: 0.8,
            healthy_drift_kg_per_week: 0.1,
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub steps: StepLimits,
    pub hydration: HydrationConfig,
    pub projection: ProjectionConfig,
    /// Sleep target ceiling (hours)
    pub sleep_ceiling_hours: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            steps: StepLimits::default(),
            hydration: HydrationConfig::default(),
            projection: ProjectionConfig::default(),
            sleep_ceiling_hours: SLEEP_CEILING_HOURS,
        }
    }
}

impl EngineConfig {
    /// Process-wide default configuration, built once
    pub fn global() -> &'static EngineConfig {
        static CONFIG: OnceLock<EngineConfig> = OnceLock::new();
        CONFIG.get_or_init(EngineConfig::default)
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, HealthprintError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, HealthprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that caps and fractions are internally consistent
    pub fn validate(&self) -> Result<(), HealthprintError> {
        let steps = &self.steps;
        if steps.floor == 0 || steps.floor >= steps.ceiling {
            return Err(HealthprintError::InvalidConfig(format!(
                "step floor {} must be positive and below ceiling {}",
                steps.floor, steps.ceiling
            )));
        }
        if steps.ceiling > STEP_CEILING {
            return Err(HealthprintError::InvalidConfig(format!(
                "step ceiling {} exceeds hard limit {STEP_CEILING}",
                steps.ceiling
            )));
        }
        for (name, cap) in [
            ("heart_condition_cap", steps.heart_condition_cap),
            ("pregnancy_cap", steps.pregnancy_cap),
            ("underweight_cap", steps.underweight_cap),
        ] {
            if cap < steps.floor || cap > steps.ceiling {
                return Err(HealthprintError::InvalidConfig(format!(
                    "{name} {cap} must lie between floor and ceiling"
                )));
            }
        }

        let hydration = &self.hydration;
        if hydration.min_l <= 0.0 || hydration.min_l >= hydration.max_l {
            return Err(HealthprintError::InvalidConfig(
                "hydration min must be positive and below max".to_string(),
            ));
        }
        for multiplier in [
            hydration.male_l_per_kg,
            hydration.female_l_per_kg,
            hydration.other_l_per_kg,
        ] {
            if multiplier <= 0.0 || multiplier > 0.1 {
                return Err(HealthprintError::InvalidConfig(format!(
                    "hydration multiplier {multiplier} outside (0, 0.1]"
                )));
            }
        }

        let projection = &self.projection;
        if projection.weeks != PROJECTION_WEEKS {
            return Err(HealthprintError::InvalidConfig(format!(
                "projection weeks must be {PROJECTION_WEEKS}"
            )));
        }
        if projection.max_loss_fraction <= 0.0 || projection.max_loss_fraction > 0.12 {
            return Err(HealthprintError::InvalidConfig(
                "max_loss_fraction must be within (0, 0.12]".to_string(),
            ));
        }
        if projection.compliance_min <= 0.0
            || projection.compliance_min > projection.compliance_max
            || projection.compliance_max > 1.0
        {
            return Err(HealthprintError::InvalidConfig(
                "compliance bounds must satisfy 0 < min <= max <= 1".to_string(),
            ));
        }
        let rates = [
            projection.underweight_gain_kg_per_week,
            projection.overweight_loss_kg_per_week,
            projection.obese_loss_kg_per_week,
            projection.severely_obese_loss_kg_per_week,
            projection.healthy_drift_kg_per_week,
        ];
        if rates.iter().any(|r| *r <= 0.0 || *r > 1.0) {
            return Err(HealthprintError::InvalidConfig(
                "weekly weight rates must be within (0, 1] kg".to_string(),
            ));
        }

        if self.sleep_ceiling_hours <= 0.0 || self.sleep_ceiling_hours > SLEEP_CEILING_HOURS {
            return Err(HealthprintError::InvalidConfig(format!(
                "sleep ceiling must be within (0, {SLEEP_CEILING_HOURS}]"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(EngineConfig::global().steps.heart_condition_cap, 6_000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"steps": {"pregnancy_cap": 6500}}"#).unwrap();
        assert_eq!(config.steps.pregnancy_cap, 6_500);
        assert_eq!(config.steps.floor, 3_000);
        assert_eq!(config.hydration.male_l_per_kg, 0.035);
    }

    #[test]
    fn test_rejects_loss_fraction_above_limit() {
        let result = EngineConfig::from_json(r#"{"projection": {"max_loss_fraction": 0.2}}"#);
        assert!(matches!(result, Err(HealthprintError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_cap_below_floor() {
        let result = EngineConfig::from_json(r#"{"steps": {"heart_condition_cap": 1000}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
