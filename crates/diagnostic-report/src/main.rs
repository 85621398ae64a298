//! diagnostic-report: print the confusion matrix and derived metrics of a
//! diagnostic test as a text or JSON report.
//!
//! Usage:
//!   cargo run -p diagnostic-report
//!   cargo run -p diagnostic-report -- --sensitivity 0.95 --specificity 0.8 --prevalence 0.02
//!   cargo run -p diagnostic-report -- --population 50000 --json
//!   DIAG_CLAMP_INPUTS=true cargo run -p diagnostic-report -- --sensitivity 1.2

use anyhow::Result;
use diagnostic_stats::{ConfusionMatrixCalculator, DiagnosticReport};

mod config;

use config::{ReportConfig, ReportFormat};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = ReportConfig::from_env()?.apply_args(&args)?;
    tracing::info!(
        sensitivity = config.sensitivity,
        specificity = config.specificity,
        prevalence = config.prevalence,
        population = config.population_size,
        clamp = config.clamp_inputs,
        "Configuration loaded"
    );

    let inputs = config.inputs()?;
    let calculator = ConfusionMatrixCalculator::from(inputs);
    let report = DiagnosticReport::from_calculator(&calculator);

    if report.metrics.ppv.is_nan() || report.metrics.npv.is_nan() || report.accuracy().is_nan() {
        tracing::warn!("Some metrics are undefined (0/0) for these inputs and are reported as NaN");
    }

    match config.format {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Logs go to stderr so stdout only carries the report.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  diagnostic-report [--sensitivity X] [--specificity X] [--prevalence X]");
    eprintln!("                    [--population N] [--json] [--clamp]");
    eprintln!();
    eprintln!("Environment (overridden by flags):");
    eprintln!("  DIAG_SENSITIVITY, DIAG_SPECIFICITY, DIAG_PREVALENCE   probabilities in [0, 1]");
    eprintln!("  DIAG_POPULATION_SIZE                                  non-negative integer");
    eprintln!("  DIAG_REPORT_FORMAT                                    text | json");
    eprintln!("  DIAG_CLAMP_INPUTS                                     true | false");
    eprintln!("  RUST_LOG, RUST_LOG_FORMAT=json                        logging");
}
