//! Score classification
//!
//! Maps any 0-100 score to one of four ordinal bands:
//!
//! | Band           | Range      |
//! |----------------|------------|
//! | Excellent      | [80, 100]  |
//! | Good           | [60, 80)   |
//! | Fair           | [40, 60)   |
//! | NeedsAttention | [0, 40)    |
//!
//! Lower bounds are inclusive. Inputs outside [0, 100] fall into the nearest
//! band, and NaN classifies as `NeedsAttention`, so the function is total.

use crate::types::{DomainBands, DomainScores, ScoreBand};

pub const EXCELLENT_FLOOR: f64 = 80.0;
pub const GOOD_FLOOR: f64 = 60.0;
pub const FAIR_FLOOR: f64 = 40.0;

/// Score band classifier
pub struct ScoreClassifier;

impl ScoreClassifier {
    pub fn classify(score: f64) -> ScoreBand {
        if score >= EXCELLENT_FLOOR {
            ScoreBand::Excellent
        } else if score >= GOOD_FLOOR {
            ScoreBand::Good
        } else if score >= FAIR_FLOOR {
            ScoreBand::Fair
        } else {
            ScoreBand::NeedsAttention
        }
    }

    pub fn classify_domains(scores: &DomainScores) -> DomainBands {
        DomainBands {
            health: Self::classify(scores.health),
            fitness: Self::classify(scores.fitness),
            finance: Self::classify(scores.finance),
            growth: Self::classify(scores.growth),
        }
    }
}

impl ScoreBand {
    /// Band for a 0-100 score
    pub fn classify(score: f64) -> Self {
        ScoreClassifier::classify(score)
    }
}
