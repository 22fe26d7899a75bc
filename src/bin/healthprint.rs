//! Healthprint CLI - Command-line interface for the Healthprint engine
//!
//! Commands:
//! - analyze: Analyze one profile (or a JSON array of profiles)
//! - validate: Run the validation rule registry over a batch
//! - generate: Emit deterministic synthetic profiles
//! - config: Print the effective engine configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use healthprint::rules::{validate_batch, BatchReport, RuleSeverity};
use healthprint::synthetic::{self, SyntheticCategory};
use healthprint::types::{AnalysisResult, ProfileInput};
use healthprint::{AnalysisEngine, EngineConfig, HealthprintError, ENGINE_VERSION, PRODUCER_NAME};

/// Healthprint - Personalized health risk, targets and 90-day projections
#[derive(Parser)]
#[command(name = "healthprint")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Analyze health profiles into risk, targets and a 90-day plan", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a profile and print the analysis result
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Display name used in the result and narrative
        #[arg(long, default_value = "")]
        name: String,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Run the validation rules over a batch of profiles
    Validate {
        /// JSON array of profiles; synthetic profiles are used when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write the full report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate deterministic synthetic profiles
    Generate {
        /// Profile category (all categories when omitted)
        #[arg(long)]
        category: Option<SyntheticCategory>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print the effective engine configuration
    Config,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG")
        .map_or_else(|_| EnvFilter::new(default_level), |directive| EnvFilter::new(&directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HealthprintCliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            name,
            format,
        } => cmd_analyze(config, &input, &output, &name, format),

        Commands::Validate {
            input,
            output,
            json,
        } => cmd_validate(config, input.as_deref(), output.as_deref(), json),

        Commands::Generate { category, output } => cmd_generate(category, &output),

        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, HealthprintCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn cmd_analyze(
    config: EngineConfig,
    input: &Path,
    output: &Path,
    name: &str,
    format: OutputFormat,
) -> Result<(), HealthprintCliError> {
    if is_stdin(input) && atty::is(atty::Stream::Stdin) {
        eprintln!("Reading profile JSON from stdin (Ctrl-D to finish)...");
    }
    let input_data = read_input(input)?;
    let engine = AnalysisEngine::with_config(config)?;

    // A single profile object or an array of profiles
    let value: serde_json::Value = serde_json::from_str(&input_data)?;
    let output_data = if value.is_array() {
        let profiles: Vec<ProfileInput> = serde_json::from_value(value)?;
        if profiles.is_empty() {
            return Err(HealthprintCliError::NoProfiles);
        }
        let results = profiles
            .iter()
            .map(|profile| engine.analyze(profile, name))
            .collect::<Result<Vec<AnalysisResult>, _>>()?;
        format_output(&results, &format)?
    } else {
        let profile: ProfileInput = serde_json::from_value(value)?;
        format_output(&engine.analyze(&profile, name)?, &format)?
    };

    write_output(output, &output_data)
}

fn cmd_validate(
    config: EngineConfig,
    input: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<(), HealthprintCliError> {
    let engine = AnalysisEngine::with_config(config)?;

    let report = match input {
        Some(path) => {
            let profiles: Vec<ProfileInput> = serde_json::from_str(&read_input(path)?)?;
            if profiles.is_empty() {
                return Err(HealthprintCliError::NoProfiles);
            }
            validate_batch(&profiles, &engine)
        }
        None => synthetic::validate_synthetic(&synthetic::generate_all(), &engine),
    };

    if let Some(path) = output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_blocking_failures() {
        let critical = report
            .failures_by_severity
            .get(&RuleSeverity::Critical)
            .copied()
            .unwrap_or_default();
        Err(HealthprintCliError::ValidationFailed(critical))
    } else if !report.analysis_errors.is_empty() {
        Err(HealthprintCliError::AnalysisFailed(report.analysis_errors.len()))
    } else {
        Ok(())
    }
}

fn print_report(report: &BatchReport) {
    println!("Validation Report");
    println!("=================");
    println!("Producer:  {} {}", PRODUCER_NAME, ENGINE_VERSION);
    println!("Profiles:  {}", report.total_profiles);
    println!("Checks:    {}", report.total_checks);
    println!("Passed:    {}", report.passed);
    println!("Failed:    {}", report.failed);
    println!("Pass rate: {:.2}%", report.pass_rate);

    if !report.failures_by_severity.is_empty() {
        println!("\nFailures by severity:");
        for (severity, count) in &report.failures_by_severity {
            println!("  {:<8} {}", severity.as_str(), count);
        }
    }

    if !report.failures.is_empty() {
        println!("\nFailures:");
        for failure in &report.failures {
            println!(
                "  - [{}] {} ({}): expected {}, got {}",
                failure.severity.as_str(),
                failure.rule_id,
                failure.analysis_id,
                failure.expected,
                failure.actual
            );
        }
    }

    if !report.analysis_errors.is_empty() {
        println!("\nAnalysis errors:");
        for error in &report.analysis_errors {
            println!("  - {error}");
        }
    }
}

fn cmd_generate(
    category: Option<SyntheticCategory>,
    output: &Path,
) -> Result<(), HealthprintCliError> {
    let profiles = match category {
        Some(category) => synthetic::generate(category),
        None => synthetic::generate_all(),
    };
    write_output(output, &serde_json::to_string_pretty(&profiles)?)
}

// Helper functions

fn is_stdin(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn read_input(input: &Path) -> Result<String, HealthprintCliError> {
    if is_stdin(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), HealthprintCliError> {
    if is_stdin(output) {
        println!("{data}");
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn format_output<T: serde::Serialize + ?Sized>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, HealthprintCliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(value)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
    }
}

// Error handling

#[derive(Debug)]
enum HealthprintCliError {
    Io(io::Error),
    Json(serde_json::Error),
    Engine(HealthprintError),
    NoProfiles,
    ValidationFailed(usize),
    AnalysisFailed(usize),
}

impl From<io::Error> for HealthprintCliError {
    fn from(e: io::Error) -> Self {
        HealthprintCliError::Io(e)
    }
}

impl From<serde_json::Error> for HealthprintCliError {
    fn from(e: serde_json::Error) -> Self {
        HealthprintCliError::Json(e)
    }
}

impl From<HealthprintError> for HealthprintCliError {
    fn from(e: HealthprintError) -> Self {
        HealthprintCliError::Engine(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HealthprintCliError> for CliError {
    fn from(e: HealthprintCliError) -> Self {
        match e {
            HealthprintCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HealthprintCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax and camelCase field names".to_string()),
            },
            HealthprintCliError::Engine(HealthprintError::InvalidProfile { field, reason }) => {
                CliError {
                    code: "INVALID_PROFILE".to_string(),
                    message: format!("{field}: {reason}"),
                    hint: Some("Fix the profile field and retry".to_string()),
                }
            }
            HealthprintCliError::Engine(HealthprintError::InvalidConfig(reason)) => CliError {
                code: "INVALID_CONFIG".to_string(),
                message: reason,
                hint: Some("Run 'healthprint config' to see the defaults".to_string()),
            },
            HealthprintCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            HealthprintCliError::NoProfiles => CliError {
                code: "NO_PROFILES".to_string(),
                message: "No profiles found in input".to_string(),
                hint: Some("Ensure the input array is not empty".to_string()),
            },
            HealthprintCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} critical rule checks failed"),
                hint: Some("Re-run with --json for the full failure list".to_string()),
            },
            HealthprintCliError::AnalysisFailed(count) => CliError {
                code: "ANALYSIS_FAILED".to_string(),
                message: format!("{count} profiles could not be analyzed"),
                hint: Some("Run 'healthprint analyze' on the failing profile for details".to_string()),
            },
        }
    }
}
