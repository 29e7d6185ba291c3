//! CLI entry point for the churn cleaning and prediction pipeline.

use anyhow::{Context, Result, anyhow};
use churn_model::ModelArtifacts;
use churn_processing::{
    Action, ActionOutcome, ChurnConfig, DataCleaner, ImputationStrategy, MissingValueReport,
    SchemaValidator, Section, SessionController, Severity, io,
};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// CLI-compatible numeric imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliImputation {
    /// Leave numeric columns untouched
    None,
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl From<CliImputation> for ImputationStrategy {
    fn from(cli: CliImputation) -> Self {
        match cli {
            CliImputation::None => ImputationStrategy::None,
            CliImputation::Mean => ImputationStrategy::Mean,
            CliImputation::Median => ImputationStrategy::Median,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Customer churn data cleaning and prediction",
    long_about = "Clean customer CSV datasets and predict churn with a pre-fitted model.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  CHURN_SCALER_PATH    Scaler artifact used when --scaler is omitted\n  \
                  CHURN_MODEL_PATH     Model artifact used when --model is omitted\n\n\
                  EXAMPLES:\n  \
                  # Check columns and missing values\n  \
                  churn-processing inspect -i customers.csv\n\n  \
                  # Fill numeric gaps with the median and drop duplicates\n  \
                  churn-processing clean -i customers.csv --numeric median --dedupe -o clean.csv\n\n  \
                  # Predict churn\n  \
                  churn-processing predict -i customers.csv --scaler scaler.json --model model.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate columns and report missing values
    Inspect {
        /// Path to the CSV file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Apply interactive cleaning operations and write the result
    Clean(CleanArgs),
    /// Run the full prediction pipeline
    Predict(PredictArgs),
}

#[derive(ClapArgs, Debug)]
struct CleanArgs {
    /// Path to the CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Strategy for imputing missing numeric values
    #[arg(long, value_enum, default_value = "none")]
    numeric: CliImputation,

    /// Fill missing values in text columns with 'Unknown'
    #[arg(long)]
    fill_unknown: bool,

    /// Drop rows with any remaining missing values
    #[arg(long)]
    drop_missing: bool,

    /// Remove duplicate rows
    #[arg(long)]
    dedupe: bool,

    /// Path of the cleaned CSV
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct PredictArgs {
    /// Path to the CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Scaler artifact (JSON)
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Model artifact (JSON)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Output directory for the prediction CSV
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Output file name
    #[arg(long)]
    output_name: Option<String>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();
    let json = matches!(&cli.command, Command::Predict(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json);

    match cli.command {
        Command::Inspect { input } => run_inspect(&input),
        Command::Clean(args) => run_clean(&args),
        Command::Predict(args) => run_predict(&args),
    }
}

// ============================================================================
// inspect
// ============================================================================

/// Note: output uses `println!` since the report is the purpose of the command.
fn run_inspect(input: &Path) -> Result<()> {
    let config = ChurnConfig::default();
    let df = io::read_csv_file(input, config.infer_schema_length)?;
    info!("Dataset loaded: {:?}", df.shape());

    println!("\n{}", "=".repeat(60));
    println!("DATASET OVERVIEW");
    println!("{}", "=".repeat(60));
    println!("  File: {}", input.display());
    println!("  Rows: {}", df.height());
    println!("  Columns: {}", df.width());
    println!();

    match SchemaValidator::validate_columns(&df) {
        Ok(()) => println!("Schema: OK"),
        Err(e) => {
            println!("Schema: {}", e);
            return Err(anyhow!(e));
        }
    }
    match SchemaValidator::validate_for_prediction(&df) {
        Ok(()) => println!("Ready for prediction: yes"),
        Err(e) => println!("Ready for prediction: no ({})", e),
    }
    println!();

    print_missing_report(&DataCleaner::missing_value_report(&df));
    println!("{}", df.head(Some(5)));
    Ok(())
}

fn print_missing_report(report: &MissingValueReport) {
    println!("MISSING VALUES");
    println!("{}", "-".repeat(40));
    println!("{:<30} {:>8}", "Column", "Missing");
    for column in &report.columns {
        println!("{:<30} {:>8}", column.column, column.missing_count);
    }
    println!();
}

// ============================================================================
// clean
// ============================================================================

fn run_clean(args: &CleanArgs) -> Result<()> {
    let config = ChurnConfig::default();
    let mut df = io::read_csv_file(&args.input, config.infer_schema_length)?;
    SchemaValidator::validate_columns(&df)?;

    let rows_before = df.height();
    let strategy: ImputationStrategy = args.numeric.into();

    if strategy != ImputationStrategy::None {
        let (next, report) = DataCleaner::impute_numeric(&df, strategy)?;
        info!("{}: {}", report.operation.display_name(), report.message());
        df = next;
    }
    if args.fill_unknown {
        let (next, report) = DataCleaner::fill_object_nulls(&df)?;
        info!("{}: {}", report.operation.display_name(), report.message());
        df = next;
    }
    if args.drop_missing {
        let (next, report) = DataCleaner::drop_missing_rows(&df)?;
        info!("{}: {}", report.operation.display_name(), report.message());
        df = next;
    }
    if args.dedupe {
        let (next, report) = DataCleaner::remove_duplicates(&df)?;
        info!("{}: {}", report.operation.display_name(), report.message());
        df = next;
    }

    let dir = args.output.parent().unwrap_or_else(|| Path::new("."));
    let file_name = args
        .output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid output path: {}", args.output.display()))?;
    let path = io::save_csv(&df, dir, file_name)?;

    println!(
        "Cleaned {} -> {} rows, written to {}",
        rows_before,
        df.height(),
        path.display()
    );
    Ok(())
}

// ============================================================================
// predict
// ============================================================================

#[derive(Serialize)]
struct PredictJson<'a> {
    success: bool,
    messages: &'a [churn_processing::Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a churn_processing::PredictionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
}

fn artifact_path(flag: &Option<PathBuf>, env_var: &str) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(path.clone()),
        None => std::env::var(env_var).map(PathBuf::from).map_err(|_| {
            anyhow!(
                "No artifact path given; pass it explicitly or set {}",
                env_var
            )
        }),
    }
}

fn run_predict(args: &PredictArgs) -> Result<()> {
    let scaler_path = artifact_path(&args.scaler, "CHURN_SCALER_PATH")?;
    let model_path = artifact_path(&args.model, "CHURN_MODEL_PATH")?;
    debug!(
        "Artifacts: scaler={}, model={}",
        scaler_path.display(),
        model_path.display()
    );

    let artifacts = ModelArtifacts::load(&scaler_path, &model_path)
        .context("Failed to load model artifacts")?;

    let mut builder = ChurnConfig::builder().output_dir(&args.output);
    if let Some(ref name) = args.output_name {
        builder = builder.output_name(name);
    }
    let config = builder.build()?;
    let output_dir = config.output_dir.clone();

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Input file not found: {}", args.input.display()))?;
    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut controller = SessionController::new(config, Arc::new(artifacts));
    let uploaded = controller.handle(Action::Upload { name, bytes });
    if uploaded.has_error() {
        return finish(args, &uploaded, None);
    }
    let outcome = controller.handle(Action::Navigate(Section::Prediction));

    let output_file = match &outcome.download {
        Some(download) => {
            std::fs::create_dir_all(&output_dir)?;
            let path = output_dir.join(&download.file_name);
            std::fs::write(&path, &download.bytes)?;
            info!("Predictions saved: {}", path.display());
            Some(path.display().to_string())
        }
        None => None,
    };

    finish(args, &outcome, output_file)
}

fn finish(args: &PredictArgs, outcome: &ActionOutcome, output_file: Option<String>) -> Result<()> {
    let success = output_file.is_some();

    if args.json {
        let json = PredictJson {
            success,
            messages: &outcome.messages,
            report: outcome.prediction.as_ref(),
            output_file,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for message in &outcome.messages {
            let tag = match message.severity {
                Severity::Info => "info",
                Severity::Success => "ok",
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            println!("[{}] {}", tag, message.text);
        }
        if let Some(report) = &outcome.prediction {
            println!();
            println!("Rows predicted: {}", report.rows_predicted);
            for (label, count) in &report.label_counts {
                println!("  Target_Churn = {}: {}", label, count);
            }
        }
        if let Some(path) = &output_file {
            println!("Output: {}", path);
        }
    }

    if success {
        Ok(())
    } else {
        Err(anyhow!("Prediction did not complete"))
    }
}
