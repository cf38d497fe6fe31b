//! Domain scoring
//!
//! Four independent calculators, each reducing a subset of raw metrics to a
//! 0-100 score via fixed sub-weights:
//! - Health: diet quality, hydration, sleep
//! - Fitness: steps, exercise minutes
//! - Finance: share of home-cooked meals
//! - Growth: study block completion
//!
//! Ratios with a zero divisor go through `ratio_or_zero` and score 0.

use crate::types::{Domain, DomainScore, DomainScores, RawMetrics};

/// Health sub-weights (sum to 1.0)
pub const DIET_WEIGHT: f64 = 0.40;
pub const HYDRATION_WEIGHT: f64 = 0.30;
pub const SLEEP_WEIGHT: f64 = 0.30;

/// Daily hydration that earns the full hydration share (liters)
pub const HYDRATION_TARGET_LITERS: f64 = 2.5;
/// Nightly sleep that earns the full sleep share (hours)
pub const SLEEP_TARGET_HOURS: f64 = 8.0;

/// Fitness sub-weights (sum to 1.0)
pub const STEPS_WEIGHT: f64 = 0.50;
pub const EXERCISE_WEIGHT: f64 = 0.50;

pub const STEPS_TARGET: f64 = 10_000.0;
pub const EXERCISE_TARGET_MINUTES: f64 = 60.0;

const MAX_SCORE: f64 = 100.0;

/// Degenerate-denominator policy: a zero divisor yields 0, never NaN or an error
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Fraction of a target achieved, capped at 1.0
fn progress(value: f64, target: f64) -> f64 {
    ratio_or_zero(value, target).min(1.0)
}

/// Domain score calculator
pub struct DomainScorer;

impl DomainScorer {
    /// Score all four domains
    pub fn score(metrics: &RawMetrics) -> DomainScores {
        DomainScores {
            health: Self::health(metrics),
            fitness: Self::fitness(metrics),
            finance: Self::finance(metrics),
            growth: Self::growth(metrics),
        }
    }

    /// Score a single domain
    pub fn score_domain(domain: Domain, metrics: &RawMetrics) -> DomainScore {
        let value = match domain {
            Domain::Health => Self::health(metrics),
            Domain::Fitness => Self::fitness(metrics),
            Domain::Finance => Self::finance(metrics),
            Domain::Growth => Self::growth(metrics),
        };
        DomainScore { domain, value }
    }

    /// Diet quality, hydration, and sleep. Calories do not contribute.
    pub fn health(metrics: &RawMetrics) -> f64 {
        let diet = DIET_WEIGHT * (metrics.diet_quality as f64 / 100.0) * MAX_SCORE;
        let hydration = HYDRATION_WEIGHT
            * progress(metrics.hydration_liters, HYDRATION_TARGET_LITERS)
            * MAX_SCORE;
        let sleep = SLEEP_WEIGHT * progress(metrics.sleep_hours, SLEEP_TARGET_HOURS) * MAX_SCORE;

        // Sub-terms are already capped; the outer clamp guards future weight changes
        (diet + hydration + sleep).clamp(0.0, MAX_SCORE)
    }

    /// Steps and exercise minutes, each capped at its daily target
    pub fn fitness(metrics: &RawMetrics) -> f64 {
        let steps = STEPS_WEIGHT * progress(metrics.daily_steps as f64, STEPS_TARGET) * MAX_SCORE;
        let exercise = EXERCISE_WEIGHT
            * progress(metrics.exercise_minutes as f64, EXERCISE_TARGET_MINUTES)
            * MAX_SCORE;

        (steps + exercise).clamp(0.0, MAX_SCORE)
    }

    /// Home-cooked share of all weekly meals; no meals scores 0
    pub fn finance(metrics: &RawMetrics) -> f64 {
        let total = metrics.home_cooked_meals + metrics.takeout_meals;
        ratio_or_zero(metrics.home_cooked_meals as f64, total as f64) * MAX_SCORE
    }

    /// Completed over planned study blocks, capped at 100; nothing planned scores 0
    pub fn growth(metrics: &RawMetrics) -> f64 {
        let ratio = ratio_or_zero(
            metrics.study_blocks_completed as f64,
            metrics.study_blocks_planned as f64,
        );
        (ratio * MAX_SCORE).min(MAX_SCORE)
    }
}
