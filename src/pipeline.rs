//! Evaluation pipeline
//!
//! This module provides the public API for the Fitfin engine. Each evaluation
//! runs the same stages on one immutable record:
//!
//! 1. MetricBounds - Validate or clamp raw metrics
//! 2. DomainScorer - Score health, fitness, finance, growth
//! 3. CompositeAggregator - Average into the overall score
//! 4. ScoreClassifier - Band the overall and domain scores
//! 5. AlertEvaluator - Check critical thresholds (independent of 2-4)
//!
//! Nothing is cached between calls; the same input always yields the same report.

use crate::alert::AlertEvaluator;
use crate::bounds::{BoundsPolicy, MetricBounds};
use crate::classifier::ScoreClassifier;
use crate::composite::CompositeAggregator;
use crate::error::{ComputeError, ValidationError};
use crate::profile::EvaluationConfig;
use crate::scoring::DomainScorer;
use crate::types::{RawMetrics, ScoreReport};
use tracing::debug;

/// Evaluate metrics under the default `Reject` policy.
///
/// # Example
/// ```
/// use fitfin_engine::{evaluate, Profile, ScoreBand};
///
/// let report = evaluate(&Profile::Average.metrics()).unwrap();
/// assert_eq!(report.band, ScoreBand::Good);
/// assert!(!report.alert.triggered);
/// ```
pub fn evaluate(metrics: &RawMetrics) -> Result<ScoreReport, ComputeError> {
    evaluate_with_policy(metrics, BoundsPolicy::Reject)
}

/// Evaluate metrics, handling out-of-range fields according to `policy`
pub fn evaluate_with_policy(
    metrics: &RawMetrics,
    policy: BoundsPolicy,
) -> Result<ScoreReport, ComputeError> {
    // Stage 1: Bounds
    let metrics = MetricBounds::clamp_or_reject(metrics, policy)?;
    Ok(score_report(&metrics))
}

/// Convert a raw metrics JSON object into a score report JSON object.
///
/// # Arguments
/// * `raw_json` - A single `RawMetrics` record (camelCase field names)
///
/// # Returns
/// Compact report JSON
pub fn evaluate_json(raw_json: &str) -> Result<String, ComputeError> {
    let metrics: RawMetrics = serde_json::from_str(raw_json)?;
    let report = evaluate(&metrics)?;
    Ok(serde_json::to_string(&report)?)
}

/// Run stages 2-5 on metrics that already passed bounds
fn score_report(metrics: &RawMetrics) -> ScoreReport {
    // Stage 2: Domain scores
    let scores = DomainScorer::score(metrics);
    debug!(
        health = scores.health,
        fitness = scores.fitness,
        finance = scores.finance,
        growth = scores.growth,
        "scored domains"
    );

    // Stage 3: Composite
    let composite = CompositeAggregator::aggregate(scores);

    // Stage 4: Bands
    let band = ScoreClassifier::classify(composite.value);
    let domain_bands = ScoreClassifier::classify_domains(&scores);
    debug!(overall = composite.value, band = band.as_str(), "classified composite");

    // Stage 5: Alert
    let alert = AlertEvaluator::evaluate(metrics);

    ScoreReport {
        date: metrics.date,
        health: scores.health,
        fitness: scores.fitness,
        finance: scores.finance,
        growth: scores.growth,
        overall: composite.value,
        band,
        domain_bands,
        alert,
    }
}

/// Parse newline-delimited metrics records, skipping blank lines.
///
/// Parse errors name the 1-based line in `input`.
pub fn parse_ndjson(input: &str) -> Result<Vec<RawMetrics>, ComputeError> {
    let mut records = Vec::new();
    for (line_num, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawMetrics>(trimmed) {
            Ok(metrics) => records.push(metrics),
            Err(e) => {
                return Err(ComputeError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(records)
}

/// Parse a JSON array of metrics records
pub fn parse_array(input: &str) -> Result<Vec<RawMetrics>, ComputeError> {
    Ok(serde_json::from_str(input)?)
}

/// A record that failed validation, by position in its batch
#[derive(Debug, Clone)]
pub struct RecordValidation {
    pub index: usize,
    pub error: ValidationError,
}

/// Validate every record, returning only the failures
pub fn validate_records(records: &[RawMetrics]) -> Vec<RecordValidation> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, metrics)| {
            MetricBounds::validate(metrics)
                .err()
                .map(|error| RecordValidation { index, error })
        })
        .collect()
}

/// Evaluator bound to a caller-owned configuration.
///
/// Holds only the read-only config; evaluations share no other state and
/// may run concurrently through `&self`.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    /// Create an evaluator with the default config (average profile, reject policy)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate caller-supplied metrics under the configured policy
    pub fn evaluate(&self, metrics: &RawMetrics) -> Result<ScoreReport, ComputeError> {
        evaluate_with_policy(metrics, self.config.policy)
    }

    /// Evaluate the configured profile's metrics
    pub fn evaluate_profile(&self) -> Result<ScoreReport, ComputeError> {
        debug!(profile = self.config.profile.name(), "evaluating profile");
        self.evaluate(&self.config.profile.metrics())
    }

    /// Evaluate each record in order, stopping at the first failure.
    ///
    /// A validation failure is reported as `ComputeError::Record` with the
    /// record's position in `records`.
    pub fn evaluate_all(&self, records: &[RawMetrics]) -> Result<Vec<ScoreReport>, ComputeError> {
        records
            .iter()
            .enumerate()
            .map(|(index, metrics)| {
                MetricBounds::clamp_or_reject(metrics, self.config.policy)
                    .map(|metrics| score_report(&metrics))
                    .map_err(|source| ComputeError::Record { index, source })
            })
            .collect()
    }

    /// Evaluate a single JSON record and return report JSON
    pub fn evaluate_json(&self, raw_json: &str) -> Result<String, ComputeError> {
        let metrics: RawMetrics = serde_json::from_str(raw_json)?;
        let report = self.evaluate(&metrics)?;
        Ok(serde_json::to_string(&report)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::test_support::valid_metrics;
    use crate::types::{AlertReason, ScoreBand};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn reference_json() -> &'static str {
        r#"{
            "calories": 2000,
            "hydrationLiters": 2.0,
            "sleepHours": 7.0,
            "dietQuality": 75,
            "dailySteps": 8000,
            "exerciseMinutes": 30,
            "homeCookedMeals": 15,
            "takeoutMeals": 6,
            "groceryDollars": 150.0,
            "studyBlocksPlanned": 15,
            "studyBlocksCompleted": 10
        }"#
    }

    #[test]
    fn test_reference_scenario() {
        let metrics: RawMetrics = serde_json::from_str(reference_json()).unwrap();
        let report = evaluate(&metrics).unwrap();

        assert!((report.health - 80.25).abs() < 1e-9);
        assert!((report.fitness - 65.0).abs() < 1e-9);
        assert!((report.finance - 71.43).abs() < 0.01);
        assert!((report.growth - 66.67).abs() < 0.01);
        assert!((report.overall - 70.84).abs() < 0.01);
        assert_eq!(report.band, ScoreBand::Good);
        assert!(!report.alert.triggered);
        assert!(report.alert.reasons.is_empty());
        assert_eq!(report.domain_bands.health, ScoreBand::Excellent);
        assert_eq!(report.domain_scores(), DomainScorer::score(&metrics));
    }

    #[test]
    fn test_evaluate_json_output_shape() {
        let output = evaluate_json(reference_json()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        for key in ["health", "fitness", "finance", "growth", "overall"] {
            assert!(value[key].is_f64(), "missing {key}");
        }
        assert_eq!(value["band"], "Good");
        assert_eq!(value["alert"]["triggered"], false);
        assert_eq!(value["alert"]["reasons"], serde_json::json!([]));
        assert_eq!(value["domainBands"]["fitness"], "Good");
        assert!(value.get("date").is_none());
    }

    #[test]
    fn test_evaluation_is_bit_identical() {
        let first = evaluate_json(reference_json()).unwrap();
        let second = evaluate_json(reference_json()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_alert_reasons_in_report() {
        let metrics = RawMetrics {
            hydration_liters: 0.5,
            sleep_hours: 4.0,
            ..Profile::Average.metrics()
        };
        let report = evaluate(&metrics).unwrap();
        assert!(report.alert.triggered);
        assert_eq!(
            report.alert.reasons,
            BTreeSet::from([AlertReason::LowHydration, AlertReason::LowSleep])
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value["alert"]["reasons"],
            serde_json::json!(["LowHydration", "LowSleep"])
        );
    }

    #[test]
    fn test_reject_policy_surfaces_validation_error() {
        let metrics = RawMetrics {
            study_blocks_completed: 20,
            ..Profile::Average.metrics()
        };
        let err = evaluate(&metrics).unwrap_err();
        match err {
            ComputeError::Validation(e) => assert_eq!(e.fields(), vec!["studyBlocksCompleted"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clamp_policy_scores_clamped_metrics() {
        let metrics = RawMetrics {
            study_blocks_completed: 20,
            daily_steps: 90_000,
            ..Profile::Average.metrics()
        };
        let report = evaluate_with_policy(&metrics, BoundsPolicy::Clamp).unwrap();
        assert_eq!(report.growth, 100.0);
        assert!((report.fitness - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_meals_score_zero_finance() {
        let metrics = RawMetrics {
            home_cooked_meals: 0,
            takeout_meals: 0,
            ..Profile::Average.metrics()
        };
        assert_eq!(evaluate(&metrics).unwrap().finance, 0.0);
    }

    #[test]
    fn test_date_is_echoed() {
        let mut value: serde_json::Value = serde_json::from_str(reference_json()).unwrap();
        value["date"] = serde_json::json!("2024-03-01");
        let output = evaluate_json(&value.to_string()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["date"], "2024-03-01");
    }

    #[test]
    fn test_invalid_json() {
        let result = evaluate_json("not valid json");
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let line = serde_json::to_string(&Profile::Average.metrics()).unwrap();
        let input = format!("{line}\n\n   \n{line}\n");
        let records = parse_ndjson(&input).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_names_failing_line() {
        let line = serde_json::to_string(&Profile::Average.metrics()).unwrap();
        let input = format!("{line}\n{line}\n{{\"calories\": 1}}\n{line}\n");

        let err = parse_ndjson(&input).unwrap_err();
        assert!(matches!(err, ComputeError::ParseError(_)));
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_parse_ndjson_counts_blank_lines() {
        let line = serde_json::to_string(&Profile::Average.metrics()).unwrap();
        let input = format!("{line}\n\nnot json\n");

        let err = parse_ndjson(&input).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn test_parse_array() {
        let records = vec![Profile::Average.metrics(), Profile::Active.metrics()];
        let input = serde_json::to_string(&records).unwrap();
        assert_eq!(parse_array(&input).unwrap(), records);
    }

    #[test]
    fn test_validate_records_reports_indices() {
        let mut bad = Profile::Average.metrics();
        bad.sleep_hours = 14.0;
        let records = vec![Profile::Average.metrics(), bad, Profile::Active.metrics()];

        let failures = validate_records(&records);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].error.fields(), vec!["sleepHours"]);
    }

    #[test]
    fn test_evaluator_uses_config() {
        let evaluator = Evaluator::with_config(EvaluationConfig::new(
            Profile::Active,
            BoundsPolicy::Clamp,
        ));
        let report = evaluator.evaluate_profile().unwrap();
        assert_eq!(report.band, ScoreBand::Excellent);

        let mut over = Profile::Active.metrics();
        over.exercise_minutes = 500;
        assert!(evaluator.evaluate(&over).is_ok());
        assert!(Evaluator::new().evaluate(&over).is_err());
    }

    #[test]
    fn test_evaluator_holds_no_state_between_calls() {
        let evaluator = Evaluator::new();
        let low = RawMetrics {
            sleep_hours: 3.0,
            ..Profile::Average.metrics()
        };

        assert!(evaluator.evaluate(&low).unwrap().alert.triggered);
        let after = evaluator.evaluate(&Profile::Average.metrics()).unwrap();
        assert!(!after.alert.triggered);
        assert_eq!(after, evaluate(&Profile::Average.metrics()).unwrap());
    }

    #[test]
    fn test_evaluate_all_in_order() {
        let evaluator = Evaluator::new();
        let records = vec![Profile::Active.metrics(), Profile::Average.metrics()];
        let reports = evaluator.evaluate_all(&records).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].band, ScoreBand::Excellent);
        assert_eq!(reports[1].band, ScoreBand::Good);
    }

    #[test]
    fn test_evaluate_all_names_failing_record() {
        let mut bad = Profile::Average.metrics();
        bad.sleep_hours = 14.0;
        let records = vec![Profile::Average.metrics(), Profile::Active.metrics(), bad];

        let err = Evaluator::new().evaluate_all(&records).unwrap_err();
        match &err {
            ComputeError::Record { index, source } => {
                assert_eq!(*index, 2);
                assert_eq!(source.fields(), vec!["sleepHours"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Record 2: "), "{err}");
    }

    #[test]
    fn test_evaluate_all_clamps_under_clamp_policy() {
        let mut over = Profile::Average.metrics();
        over.sleep_hours = 14.0;
        let evaluator =
            Evaluator::with_config(EvaluationConfig::new(Profile::Average, BoundsPolicy::Clamp));

        let reports = evaluator.evaluate_all(&[over]).unwrap();
        assert!((reports[0].health - 84.0).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_evaluations() {
        let evaluator = std::sync::Arc::new(Evaluator::new());
        let expected = evaluator.evaluate(&Profile::Average.metrics()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let evaluator = evaluator.clone();
                std::thread::spawn(move || evaluator.evaluate(&Profile::Average.metrics()).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    proptest! {
        /// Property: overall lies in [0, 100] and every band matches its score.
        #[test]
        fn report_is_bounded_and_consistent(metrics in valid_metrics()) {
            let report = evaluate(&metrics).unwrap();

            prop_assert!((0.0..=100.0).contains(&report.overall), "overall = {}", report.overall);
            prop_assert_eq!(report.band, ScoreClassifier::classify(report.overall));
            prop_assert_eq!(
                report.domain_bands,
                ScoreClassifier::classify_domains(&report.domain_scores())
            );
        }

        /// Property: evaluating the same record twice yields identical bytes.
        #[test]
        fn evaluate_json_is_idempotent(metrics in valid_metrics()) {
            let input = serde_json::to_string(&metrics).unwrap();
            let first = evaluate_json(&input).unwrap();
            let second = evaluate_json(&input).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
