//! Fitfin CLI - Command-line interface for the Fitfin engine
//!
//! Commands:
//! - evaluate: Score metrics records (or a preset profile)
//! - validate: Check metrics records against their bounds
//! - profile: Print a preset profile's metrics
//! - schema: Print input or output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitfin_engine::bounds::FieldBound;
use fitfin_engine::pipeline::{self, Evaluator};
use fitfin_engine::{
    BoundsPolicy, ComputeError, EvaluationConfig, MetricBounds, Profile, RawMetrics,
    ScoreReport, ENGINE_VERSION, PRODUCER_NAME,
};

/// Fitfin - Score daily health, fitness, finance, and growth metrics
#[derive(Parser)]
#[command(name = "fitfin")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn daily life metrics into domain scores, a band, and alerts", long_about = None)]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score metrics records, or the configured profile when no input is given
    Evaluate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Evaluation config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Preset profile (average, active); overrides the config file
        #[arg(long)]
        profile: Option<String>,

        /// Out-of-range handling; overrides the config file
        #[arg(long)]
        policy: Option<PolicyArg>,
    },

    /// Check metrics records against their bounds
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a preset profile's metrics as JSON
    Profile {
        /// Profile name (average, active)
        name: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Reject records with any out-of-range field
    Reject,
    /// Clamp out-of-range fields to their nearest bound
    Clamp,
}

impl From<PolicyArg> for BoundsPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Reject => BoundsPolicy::Reject,
            PolicyArg::Clamp => BoundsPolicy::Clamp,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (raw metrics record)
    Input,
    /// Output schema (score report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FitfinCliError> {
    match cli.command {
        Commands::Evaluate {
            input,
            output,
            input_format,
            output_format,
            config,
            profile,
            policy,
        } => {
            let config = resolve_config(config.as_deref(), profile.as_deref(), policy)?;
            cmd_evaluate(input.as_deref(), &output, input_format, output_format, config)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Profile { name, pretty } => cmd_profile(&name, pretty),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

/// Config file first, then flag overrides
fn resolve_config(
    path: Option<&Path>,
    profile: Option<&str>,
    policy: Option<PolicyArg>,
) -> Result<EvaluationConfig, FitfinCliError> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            EvaluationConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => EvaluationConfig::default(),
    };

    if let Some(name) = profile {
        config.profile = Profile::from_name(name)?;
    }
    if let Some(policy) = policy {
        config.policy = policy.into();
    }

    Ok(config)
}

fn cmd_evaluate(
    input: Option<&Path>,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: EvaluationConfig,
) -> Result<(), FitfinCliError> {
    let evaluator = Evaluator::with_config(config);

    let reports = match input {
        Some(path) => {
            let records = read_records(path, &input_format)?;
            if records.is_empty() {
                return Err(FitfinCliError::NoRecords);
            }
            info!(records = records.len(), "evaluating records");
            evaluator.evaluate_all(&records)?
        }
        None => {
            info!(profile = evaluator.config().profile.name(), "evaluating profile");
            vec![evaluator.evaluate_profile()?]
        }
    };

    let output_data = format_output(&reports, &output_format)?;

    if is_stdio(output) {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), FitfinCliError> {
    let records = read_records(input, &input_format)?;
    let failures = pipeline::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - failures.len(),
        invalid_records: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                date: records[f.index].date.map(|d| d.to_string()),
                fields: f.error.fields().iter().map(|s| s.to_string()).collect(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} ({}): {}",
                    err.index,
                    err.date.as_deref().unwrap_or("undated"),
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(FitfinCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_profile(name: &str, pretty: bool) -> Result<(), FitfinCliError> {
    let metrics = Profile::from_name(name)?.metrics();
    let json = if pretty {
        serde_json::to_string_pretty(&metrics)?
    } else {
        serde_json::to_string(&metrics)?
    };
    println!("{}", json);
    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), FitfinCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: raw metrics record ({} {})", PRODUCER_NAME, ENGINE_VERSION);
                println!();
                for bound in MetricBounds::FIELDS {
                    println!(
                        "  {:<22} {:<8} {:<12} {}",
                        bound.field,
                        bound.json_type(),
                        format_range(&bound),
                        field_note(bound.field)
                    );
                }
                println!();
                println!("Optional: date (YYYY-MM-DD), echoed to the report");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: score report");
                println!();
                println!("- health, fitness, finance, growth: domain scores in [0, 100]");
                println!("- overall: mean of the four domain scores");
                println!("- band: Excellent [80,100] | Good [60,80) | Fair [40,60) | NeedsAttention [0,40)");
                println!("- domainBands: band per domain");
                println!("- alert: {{ triggered, reasons: [LowHydration, LowSleep], advisories }}");
                println!("- date: echoed from input when present");
            }
        }
    }

    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_records(input: &Path, format: &InputFormat) -> Result<Vec<RawMetrics>, FitfinCliError> {
    let input_data = if is_stdio(input) {
        if io::stdin().is_terminal() {
            return Err(FitfinCliError::InteractiveStdin);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let records = match format {
        InputFormat::Ndjson => pipeline::parse_ndjson(&input_data)?,
        InputFormat::Json => pipeline::parse_array(&input_data)?,
    };
    Ok(records)
}

fn format_output(reports: &[ScoreReport], format: &OutputFormat) -> Result<String, FitfinCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)? + "\n"),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)? + "\n"),
    }
}

fn format_range(bound: &FieldBound) -> String {
    match bound.max {
        Some(max) => format!("[{}, {}]", bound.min, max),
        None => format!("[{}, inf)", bound.min),
    }
}

fn field_note(field: &str) -> &'static str {
    match field {
        "calories" => "advisories only",
        "groceryDollars" => "informational",
        "studyBlocksCompleted" => "at most studyBlocksPlanned",
        _ => "",
    }
}

fn field_json_schema(bound: &FieldBound) -> serde_json::Value {
    let mut schema = serde_json::json!({ "type": bound.json_type() });
    if bound.integer {
        schema["minimum"] = serde_json::json!(bound.min as i64);
        if let Some(max) = bound.max {
            schema["maximum"] = serde_json::json!(max as i64);
        }
    } else {
        schema["minimum"] = serde_json::json!(bound.min);
        if let Some(max) = bound.max {
            schema["maximum"] = serde_json::json!(max);
        }
    }
    schema
}

fn get_input_json_schema() -> String {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "date".to_string(),
        serde_json::json!({ "type": "string", "format": "date" }),
    );
    for bound in MetricBounds::FIELDS {
        properties.insert(bound.field.to_string(), field_json_schema(&bound));
    }
    let required: Vec<&str> = MetricBounds::FIELDS.iter().map(|b| b.field).collect();

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "fitfin.raw_metrics.v1",
        "description": "Self-reported daily metrics",
        "type": "object",
        "required": required,
        "properties": properties
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let score = serde_json::json!({ "type": "number", "minimum": 0, "maximum": 100 });
    let band = serde_json::json!({ "enum": ["Excellent", "Good", "Fair", "NeedsAttention"] });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "fitfin.score_report.v1",
        "description": "Fitfin score report",
        "type": "object",
        "required": ["health", "fitness", "finance", "growth", "overall", "band", "domainBands", "alert"],
        "properties": {
            "date": { "type": "string", "format": "date" },
            "health": score,
            "fitness": score,
            "finance": score,
            "growth": score,
            "overall": score,
            "band": band,
            "domainBands": {
                "type": "object",
                "properties": {
                    "health": band,
                    "fitness": band,
                    "finance": band,
                    "growth": band
                }
            },
            "alert": {
                "type": "object",
                "required": ["triggered", "reasons"],
                "properties": {
                    "triggered": { "type": "boolean" },
                    "reasons": {
                        "type": "array",
                        "items": { "enum": ["LowHydration", "LowSleep"] }
                    },
                    "advisories": {
                        "type": "array",
                        "items": {
                            "enum": [
                                "HydrationBelowTarget", "ShortSleep", "ExcessiveSleep",
                                "LowCalorieIntake", "HighCalorieIntake"
                            ]
                        }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum FitfinCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    NoRecords,
    InteractiveStdin,
    ValidationFailed(usize),
}

impl From<io::Error> for FitfinCliError {
    fn from(e: io::Error) -> Self {
        FitfinCliError::Io(e)
    }
}

impl From<ComputeError> for FitfinCliError {
    fn from(e: ComputeError) -> Self {
        FitfinCliError::Compute(e)
    }
}

impl From<serde_json::Error> for FitfinCliError {
    fn from(e: serde_json::Error) -> Self {
        FitfinCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FitfinCliError> for CliError {
    fn from(e: FitfinCliError) -> Self {
        match e {
            FitfinCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FitfinCliError::Compute(ComputeError::Validation(e)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Fix the listed fields or rerun with --policy clamp".to_string()),
            },
            FitfinCliError::Compute(e @ ComputeError::Record { .. }) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'fitfin validate' on the input or rerun with --policy clamp".to_string()),
            },
            FitfinCliError::Compute(e @ ComputeError::UnknownProfile(_)) => CliError {
                code: "UNKNOWN_PROFILE".to_string(),
                message: e.to_string(),
                hint: Some("Available profiles: average, active".to_string()),
            },
            FitfinCliError::Compute(e @ ComputeError::Config(_)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Config takes { \"profile\": ..., \"policy\": \"reject\" | \"clamp\" }".to_string()),
            },
            FitfinCliError::Compute(e @ (ComputeError::JsonError(_) | ComputeError::ParseError(_))) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'fitfin schema input' for the expected fields".to_string()),
            },
            FitfinCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FitfinCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            FitfinCliError::InteractiveStdin => CliError {
                code: "NO_INPUT".to_string(),
                message: "stdin is a terminal".to_string(),
                hint: Some("Pipe records in, pass a file, or omit --input to score a profile".to_string()),
            },
            FitfinCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: Option<String>,
    fields: Vec<String>,
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_schema_matches_bounds() {
        let schema: serde_json::Value = serde_json::from_str(&get_input_json_schema()).unwrap();
        let properties = &schema["properties"];

        for bound in MetricBounds::FIELDS {
            let property = &properties[bound.field];
            assert_eq!(property["type"], bound.json_type(), "{}", bound.field);
            assert_eq!(property["minimum"].as_f64(), Some(bound.min), "{}", bound.field);
            assert_eq!(property["maximum"].as_f64(), bound.max, "{}", bound.field);
        }
        assert_eq!(schema["required"].as_array().unwrap().len(), MetricBounds::FIELDS.len());
        assert_eq!(properties["date"]["format"], "date");
    }

    #[test]
    fn test_format_range() {
        let planned = MetricBounds::field("studyBlocksPlanned").unwrap();
        assert_eq!(format_range(&planned), "[1, 50]");
        let grocery = MetricBounds::field("groceryDollars").unwrap();
        assert_eq!(format_range(&grocery), "[0, inf)");
    }
}
