//! Composite aggregation
//!
//! The overall score is the unweighted mean of all four domain scores. Every
//! domain must be present; `DomainScores` has no way to express a missing one.

use crate::types::{CompositeScore, DomainScores};

const DOMAIN_COUNT: f64 = 4.0;

/// Combines domain scores into the overall score
pub struct CompositeAggregator;

impl CompositeAggregator {
    pub fn aggregate(scores: DomainScores) -> CompositeScore {
        let sum = scores.health + scores.fitness + scores.finance + scores.growth;
        CompositeScore {
            value: sum / DOMAIN_COUNT,
            components: scores,
        }
    }
}
