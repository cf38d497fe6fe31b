//! Core types for the Fitfin engine
//!
//! This module defines the records that flow through an evaluation: the raw
//! metrics supplied by the caller, the per-domain and composite scores derived
//! from them, the alert state, and the report returned to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Self-reported daily metrics for one evaluation.
///
/// Integer fields are signed so that negative inputs reach bounds validation
/// instead of failing at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetrics {
    /// Optional calendar label, echoed to the report; never scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Daily calorie intake (kcal); read only by advisories
    pub calories: i64,
    /// Water intake (liters)
    pub hydration_liters: f64,
    /// Sleep duration (hours)
    pub sleep_hours: f64,
    /// Self-assessed diet quality (0-100)
    pub diet_quality: i64,
    pub daily_steps: i64,
    pub exercise_minutes: i64,
    /// Home-cooked meals per week
    pub home_cooked_meals: i64,
    /// Takeout meals per week
    pub takeout_meals: i64,
    /// Weekly grocery spend; informational only
    pub grocery_dollars: f64,
    pub study_blocks_planned: i64,
    pub study_blocks_completed: i64,
}

/// Scoring domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    Health,
    Fitness,
    Finance,
    Growth,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Health,
        Domain::Fitness,
        Domain::Finance,
        Domain::Growth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Health => "health",
            Domain::Fitness => "fitness",
            Domain::Finance => "finance",
            Domain::Growth => "growth",
        }
    }
}

/// A single domain score in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: Domain,
    pub value: f64,
}

/// The four domain scores, one per domain.
///
/// Holding them as named fields makes a missing domain unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub health: f64,
    pub fitness: f64,
    pub finance: f64,
    pub growth: f64,
}

impl DomainScores {
    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Health => self.health,
            Domain::Fitness => self.fitness,
            Domain::Finance => self.finance,
            Domain::Growth => self.growth,
        }
    }

    /// Scores in `Domain::ALL` order
    pub fn list(&self) -> Vec<DomainScore> {
        Domain::ALL
            .iter()
            .map(|&domain| DomainScore {
                domain,
                value: self.get(domain),
            })
            .collect()
    }
}

/// Equal-weighted mean of the four domain scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub value: f64,
    pub components: DomainScores,
}

/// Qualitative band for a 0-100 score, declared lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    NeedsAttention,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsAttention => "NeedsAttention",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::NeedsAttention => "Needs Attention",
        }
    }
}

/// Critical threshold that trips the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertReason {
    LowHydration,
    LowSleep,
}

/// Warning-level observation; never trips the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Advisory {
    HydrationBelowTarget,
    ShortSleep,
    ExcessiveSleep,
    LowCalorieIntake,
    HighCalorieIntake,
}

/// Alert state derived from raw metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub triggered: bool,
    pub reasons: BTreeSet<AlertReason>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub advisories: BTreeSet<Advisory>,
}

/// Band for each domain score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBands {
    pub health: ScoreBand,
    pub fitness: ScoreBand,
    pub finance: ScoreBand,
    pub growth: ScoreBand,
}

/// Evaluation result returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub health: f64,
    pub fitness: f64,
    pub finance: f64,
    pub growth: f64,
    pub overall: f64,
    pub band: ScoreBand,
    pub domain_bands: DomainBands,
    pub alert: AlertState,
}

impl ScoreReport {
    pub fn domain_scores(&self) -> DomainScores {
        DomainScores {
            health: self.health,
            fitness: self.fitness,
            finance: self.finance,
            growth: self.growth,
        }
    }
}
