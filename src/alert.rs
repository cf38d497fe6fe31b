//! Alert evaluation
//!
//! Checks raw metrics against fixed critical thresholds. Independent of the
//! scoring weights: changing a threshold here never touches `scoring`.
//!
//! Critical reasons trip the alert. Advisories are warning-level observations
//! reported alongside and never trip it.

use crate::types::{Advisory, AlertReason, AlertState, RawMetrics};
use std::collections::BTreeSet;
use tracing::info;

/// Hydration strictly below this trips `LowHydration` (liters)
pub const CRITICAL_HYDRATION_LITERS: f64 = 1.0;
/// Sleep strictly below this trips `LowSleep` (hours)
pub const CRITICAL_SLEEP_HOURS: f64 = 5.0;

/// Hydration at or below this is `HydrationBelowTarget` (liters)
pub const WARNING_HYDRATION_LITERS: f64 = 1.5;
/// Sleep at or below this is `ShortSleep` (hours)
pub const WARNING_SLEEP_HOURS: f64 = 6.0;
pub const EXCESSIVE_SLEEP_HOURS: f64 = 10.0;
pub const LOW_CALORIES: i64 = 1200;
pub const HIGH_CALORIES: i64 = 3500;

/// Critical-threshold evaluator
pub struct AlertEvaluator;

impl AlertEvaluator {
    pub fn evaluate(metrics: &RawMetrics) -> AlertState {
        let reasons = Self::reasons(metrics);
        let advisories = Self::advisories(metrics, &reasons);
        let triggered = !reasons.is_empty();

        if triggered {
            info!(?reasons, "critical threshold tripped");
        }

        AlertState {
            triggered,
            reasons,
            advisories,
        }
    }

    /// Every critical threshold that tripped; boundaries do not trip
    pub fn reasons(metrics: &RawMetrics) -> BTreeSet<AlertReason> {
        let mut reasons = BTreeSet::new();
        if metrics.hydration_liters < CRITICAL_HYDRATION_LITERS {
            reasons.insert(AlertReason::LowHydration);
        }
        if metrics.sleep_hours < CRITICAL_SLEEP_HOURS {
            reasons.insert(AlertReason::LowSleep);
        }
        reasons
    }

    /// Warning-level observations not already covered by a critical reason
    pub fn advisories(metrics: &RawMetrics, reasons: &BTreeSet<AlertReason>) -> BTreeSet<Advisory> {
        let mut advisories = BTreeSet::new();

        if metrics.hydration_liters <= WARNING_HYDRATION_LITERS
            && !reasons.contains(&AlertReason::LowHydration)
        {
            advisories.insert(Advisory::HydrationBelowTarget);
        }

        if metrics.sleep_hours <= WARNING_SLEEP_HOURS && !reasons.contains(&AlertReason::LowSleep) {
            advisories.insert(Advisory::ShortSleep);
        }
        if metrics.sleep_hours >= EXCESSIVE_SLEEP_HOURS {
            advisories.insert(Advisory::ExcessiveSleep);
        }

        if metrics.calories <= LOW_CALORIES {
            advisories.insert(Advisory::LowCalorieIntake);
        } else if metrics.calories >= HIGH_CALORIES {
            advisories.insert(Advisory::HighCalorieIntake);
        }

        advisories
    }
}
