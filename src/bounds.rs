//! Metric bounds
//!
//! Valid domain for every raw metric, plus the two policies for handling
//! values outside it:
//! - Reject: report every offending field in one `ValidationError`
//! - Clamp: pull each field to its nearest bound and continue
//!
//! Per-field bounds are checked first; `studyBlocksCompleted <= studyBlocksPlanned`
//! is checked only once every field is individually in range.

use crate::error::{FieldViolation, ValidationError, ViolationKind};
use crate::types::RawMetrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How out-of-range metrics are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    #[default]
    Reject,
    Clamp,
}

impl BoundsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundsPolicy::Reject => "reject",
            BoundsPolicy::Clamp => "clamp",
        }
    }
}

/// Inclusive domain of a single metric; `max` is `None` for open-ended fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBound {
    pub field: &'static str,
    pub min: f64,
    pub max: Option<f64>,
    /// Whole numbers only on the wire
    pub integer: bool,
}

impl FieldBound {
    const fn count(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            min,
            max: Some(max),
            integer: true,
        }
    }

    const fn closed(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            min,
            max: Some(max),
            integer: false,
        }
    }

    const fn at_least(field: &'static str, min: f64) -> Self {
        Self {
            field,
            min,
            max: None,
            integer: false,
        }
    }

    /// JSON Schema type name
    pub fn json_type(&self) -> &'static str {
        if self.integer {
            "integer"
        } else {
            "number"
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.map_or(true, |max| value <= max)
    }

    fn clamp_f64(&self, value: f64) -> f64 {
        let lower = value.max(self.min);
        match self.max {
            Some(max) => lower.min(max),
            None => lower,
        }
    }

    fn clamp_i64(&self, value: i64) -> i64 {
        let lower = value.max(self.min as i64);
        match self.max {
            Some(max) => lower.min(max as i64),
            None => lower,
        }
    }

    fn violation(&self, value: f64) -> FieldViolation {
        let kind = if value.is_finite() {
            ViolationKind::OutOfRange {
                min: self.min,
                max: self.max,
            }
        } else {
            ViolationKind::NotFinite
        };
        FieldViolation {
            field: self.field,
            value,
            kind,
        }
    }
}

pub const CALORIES: FieldBound = FieldBound::count("calories", 0.0, 5000.0);
pub const HYDRATION_LITERS: FieldBound = FieldBound::closed("hydrationLiters", 0.0, 5.0);
pub const SLEEP_HOURS: FieldBound = FieldBound::closed("sleepHours", 0.0, 12.0);
pub const DIET_QUALITY: FieldBound = FieldBound::count("dietQuality", 0.0, 100.0);
pub const DAILY_STEPS: FieldBound = FieldBound::count("dailySteps", 0.0, 50_000.0);
pub const EXERCISE_MINUTES: FieldBound = FieldBound::count("exerciseMinutes", 0.0, 300.0);
pub const HOME_COOKED_MEALS: FieldBound = FieldBound::count("homeCookedMeals", 0.0, 21.0);
pub const TAKEOUT_MEALS: FieldBound = FieldBound::count("takeoutMeals", 0.0, 21.0);
pub const GROCERY_DOLLARS: FieldBound = FieldBound::at_least("groceryDollars", 0.0);
pub const STUDY_BLOCKS_PLANNED: FieldBound = FieldBound::count("studyBlocksPlanned", 1.0, 50.0);
/// Upper bound here is the widget cap; the effective cap is `studyBlocksPlanned`
pub const STUDY_BLOCKS_COMPLETED: FieldBound =
    FieldBound::count("studyBlocksCompleted", 0.0, 50.0);

/// Bounds checker for `RawMetrics`
pub struct MetricBounds;

impl MetricBounds {
    /// All field bounds, in wire order
    pub const FIELDS: [FieldBound; 11] = [
        CALORIES,
        HYDRATION_LITERS,
        SLEEP_HOURS,
        DIET_QUALITY,
        DAILY_STEPS,
        EXERCISE_MINUTES,
        HOME_COOKED_MEALS,
        TAKEOUT_MEALS,
        GROCERY_DOLLARS,
        STUDY_BLOCKS_PLANNED,
        STUDY_BLOCKS_COMPLETED,
    ];

    /// Look up the bound for a wire field name
    pub fn field(name: &str) -> Option<FieldBound> {
        Self::FIELDS.iter().copied().find(|b| b.field == name)
    }

    /// Check every field and the study-block relationship without modifying anything
    pub fn validate(metrics: &RawMetrics) -> Result<(), ValidationError> {
        let violations: Vec<FieldViolation> = readings(metrics)
            .into_iter()
            .filter(|(bound, value)| !bound.contains(*value))
            .map(|(bound, value)| bound.violation(value))
            .collect();

        if !violations.is_empty() {
            return Err(ValidationError::new(violations));
        }

        if metrics.study_blocks_completed > metrics.study_blocks_planned {
            return Err(ValidationError::new(vec![FieldViolation {
                field: STUDY_BLOCKS_COMPLETED.field,
                value: metrics.study_blocks_completed as f64,
                kind: ViolationKind::ExceedsPlanned {
                    planned: metrics.study_blocks_planned as f64,
                },
            }]));
        }

        Ok(())
    }

    /// Clamp every field to its nearest bound, then cap completed blocks at planned.
    ///
    /// Non-finite floats have no nearest bound and are rejected.
    pub fn clamp(metrics: &RawMetrics) -> Result<RawMetrics, ValidationError> {
        let non_finite: Vec<FieldViolation> = readings(metrics)
            .into_iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(bound, value)| bound.violation(value))
            .collect();

        if !non_finite.is_empty() {
            return Err(ValidationError::new(non_finite));
        }

        let planned = STUDY_BLOCKS_PLANNED.clamp_i64(metrics.study_blocks_planned);
        let completed = STUDY_BLOCKS_COMPLETED
            .clamp_i64(metrics.study_blocks_completed)
            .min(planned);

        let clamped = RawMetrics {
            date: metrics.date,
            calories: CALORIES.clamp_i64(metrics.calories),
            hydration_liters: HYDRATION_LITERS.clamp_f64(metrics.hydration_liters),
            sleep_hours: SLEEP_HOURS.clamp_f64(metrics.sleep_hours),
            diet_quality: DIET_QUALITY.clamp_i64(metrics.diet_quality),
            daily_steps: DAILY_STEPS.clamp_i64(metrics.daily_steps),
            exercise_minutes: EXERCISE_MINUTES.clamp_i64(metrics.exercise_minutes),
            home_cooked_meals: HOME_COOKED_MEALS.clamp_i64(metrics.home_cooked_meals),
            takeout_meals: TAKEOUT_MEALS.clamp_i64(metrics.takeout_meals),
            grocery_dollars: GROCERY_DOLLARS.clamp_f64(metrics.grocery_dollars),
            study_blocks_planned: planned,
            study_blocks_completed: completed,
        };

        for ((bound, before), (_, after)) in readings(metrics).into_iter().zip(readings(&clamped)) {
            if before != after {
                warn!(field = bound.field, before, after, "clamped metric to bound");
            }
        }

        Ok(clamped)
    }

    /// Apply `policy` uniformly to every field
    pub fn clamp_or_reject(
        metrics: &RawMetrics,
        policy: BoundsPolicy,
    ) -> Result<RawMetrics, ValidationError> {
        debug!(policy = policy.as_str(), "checking metric bounds");
        match policy {
            BoundsPolicy::Reject => {
                Self::validate(metrics)?;
                Ok(metrics.clone())
            }
            BoundsPolicy::Clamp => Self::clamp(metrics),
        }
    }
}

/// Every field paired with its bound, in `MetricBounds::FIELDS` order
fn readings(m: &RawMetrics) -> [(FieldBound, f64); 11] {
    [
        (CALORIES, m.calories as f64),
        (HYDRATION_LITERS, m.hydration_liters),
        (SLEEP_HOURS, m.sleep_hours),
        (DIET_QUALITY, m.diet_quality as f64),
        (DAILY_STEPS, m.daily_steps as f64),
        (EXERCISE_MINUTES, m.exercise_minutes as f64),
        (HOME_COOKED_MEALS, m.home_cooked_meals as f64),
        (TAKEOUT_MEALS, m.takeout_meals as f64),
        (GROCERY_DOLLARS, m.grocery_dollars),
        (STUDY_BLOCKS_PLANNED, m.study_blocks_planned as f64),
        (STUDY_BLOCKS_COMPLETED, m.study_blocks_completed as f64),
    ]
}
