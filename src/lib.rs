//! Fitfin Engine - Deterministic scoring for daily life metrics
//!
//! The engine turns a record of self-reported daily metrics into bounded domain
//! scores, a composite score, a qualitative band, and a critical-threshold alert:
//! bounds → domain scoring → composite → classification, with alert evaluation
//! running alongside.
//!
//! Every operation is a pure function of its input. The engine owns no state
//! between calls and is safe to use from any number of threads.
//!
//! ## Modules
//!
//! - **Bounds**: Validate or clamp raw metrics against their documented domains
//! - **Scoring**: Health, fitness, finance, and growth domain scores
//! - **Alert**: Critical thresholds and warning-level advisories
//! - **Profile**: Preset metrics and the caller-owned evaluation config

pub mod alert;
pub mod bounds;
pub mod classifier;
pub mod composite;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod scoring;
pub mod types;

#[cfg(test)]
mod test_support;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use alert::AlertEvaluator;
pub use bounds::{BoundsPolicy, MetricBounds};
pub use classifier::ScoreClassifier;
pub use composite::CompositeAggregator;
pub use error::{ComputeError, FieldViolation, ValidationError, ViolationKind};
pub use pipeline::{evaluate, evaluate_json, evaluate_with_policy, Evaluator};
pub use profile::{EvaluationConfig, Profile};
pub use scoring::DomainScorer;
pub use types::{
    Advisory, AlertReason, AlertState, CompositeScore, Domain, DomainBands, DomainScore,
    DomainScores, RawMetrics, ScoreBand, ScoreReport,
};

/// Engine version reported by the CLI and FFI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI and FFI
pub const PRODUCER_NAME: &str = "fitfin-engine";
