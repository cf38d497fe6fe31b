//! Preset profiles and caller-owned evaluation config
//!
//! Profiles are plain data that pre-populate a `RawMetrics`; they never change
//! the scoring formulas. The engine keeps no state between calls, so anything a
//! caller wants to carry across evaluations lives in `EvaluationConfig`.

use crate::bounds::BoundsPolicy;
use crate::error::ComputeError;
use crate::types::RawMetrics;
use serde::{Deserialize, Serialize};

/// Named metric presets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// A typical day
    #[default]
    Average,
    /// A day with above-target activity
    Active,
    /// Caller-supplied metrics
    Custom(RawMetrics),
}

impl Profile {
    /// Resolve a preset by name. `Custom` has no name and cannot be resolved here.
    pub fn from_name(name: &str) -> Result<Self, ComputeError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "average" | "average-day" => Ok(Profile::Average),
            "active" | "active-day" => Ok(Profile::Active),
            _ => Err(ComputeError::UnknownProfile(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::Average => "average",
            Profile::Active => "active",
            Profile::Custom(_) => "custom",
        }
    }

    /// The metrics this profile stands for
    pub fn metrics(&self) -> RawMetrics {
        match self {
            Profile::Average => RawMetrics {
                date: None,
                calories: 2000,
                hydration_liters: 2.0,
                sleep_hours: 7.0,
                diet_quality: 75,
                daily_steps: 8000,
                exercise_minutes: 30,
                home_cooked_meals: 15,
                takeout_meals: 6,
                grocery_dollars: 150.0,
                study_blocks_planned: 15,
                study_blocks_completed: 10,
            },
            Profile::Active => RawMetrics {
                date: None,
                calories: 2600,
                hydration_liters: 3.0,
                sleep_hours: 8.0,
                diet_quality: 85,
                daily_steps: 12_000,
                exercise_minutes: 75,
                home_cooked_meals: 17,
                takeout_meals: 4,
                grocery_dollars: 175.0,
                study_blocks_planned: 15,
                study_blocks_completed: 14,
            },
            Profile::Custom(metrics) => metrics.clone(),
        }
    }
}

/// Per-evaluation configuration, owned and passed in by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationConfig {
    /// Metrics used when the caller does not supply a record
    pub profile: Profile,
    /// How out-of-range metrics are handled
    pub policy: BoundsPolicy,
}

impl EvaluationConfig {
    pub fn new(profile: Profile, policy: BoundsPolicy) -> Self {
        Self { profile, policy }
    }

    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json).map_err(|e| ComputeError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_name() {
        assert_eq!(Profile::from_name("average").unwrap(), Profile::Average);
        assert_eq!(Profile::from_name("Average-Day").unwrap(), Profile::Average);
        assert_eq!(Profile::from_name(" ACTIVE ").unwrap(), Profile::Active);
        assert!(matches!(
            Profile::from_name("lazy"),
            Err(ComputeError::UnknownProfile(name)) if name == "lazy"
        ));
    }

    #[test]
    fn test_custom_returns_its_metrics() {
        let mut metrics = Profile::Active.metrics();
        metrics.daily_steps = 123;
        let profile = Profile::Custom(metrics.clone());
        assert_eq!(profile.metrics(), metrics);
        assert_eq!(profile.name(), "custom");
    }

    #[test]
    fn test_active_outpaces_average() {
        let average = Profile::Average.metrics();
        let active = Profile::Active.metrics();
        assert!(active.daily_steps > average.daily_steps);
        assert!(active.exercise_minutes > average.exercise_minutes);
    }

    #[test]
    fn test_config_defaults() {
        let config = EvaluationConfig::from_json("{}").unwrap();
        assert_eq!(config, EvaluationConfig::default());
        assert_eq!(config.profile, Profile::Average);
        assert_eq!(config.policy, BoundsPolicy::Reject);
    }

    #[test]
    fn test_config_round_trip() {
        let config = EvaluationConfig::new(Profile::Active, BoundsPolicy::Clamp);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"clamp\""));
        assert_eq!(EvaluationConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_config_with_custom_profile() {
        let json = r#"{
            "profile": { "custom": {
                "calories": 1800, "hydrationLiters": 1.5, "sleepHours": 6.5,
                "dietQuality": 60, "dailySteps": 4000, "exerciseMinutes": 10,
                "homeCookedMeals": 7, "takeoutMeals": 7, "groceryDollars": 90.0,
                "studyBlocksPlanned": 10, "studyBlocksCompleted": 5
            } },
            "policy": "reject"
        }"#;
        let config = EvaluationConfig::from_json(json).unwrap();
        assert_eq!(config.profile.metrics().daily_steps, 4000);
    }

    #[test]
    fn test_config_rejects_bad_policy() {
        let err = EvaluationConfig::from_json(r#"{ "policy": "ignore" }"#).unwrap_err();
        assert!(matches!(err, ComputeError::Config(_)));
    }
}
