//! Kahneman CLI binary.
//!
//! Computes prospect theory scores and runs Fama-MacBeth back-test experiments.

mod pipeline;

use clap::{Args, Parser, Subcommand};
use kahneman::output::ExportFormat;
use kahneman::prospect::ProspectConfig;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kahneman")]
#[command(about = "Prospect theory signals and Fama-MacBeth back-tests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute rolling TK scores from a return file
    Prospect {
        /// Input CSV with permno, yyyymm and ret columns
        #[arg(long)]
        input: PathBuf,

        /// Output CSV path
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        params: ProspectArgs,
    },

    /// Run experiment configurations against a panel
    Experiment {
        /// Panel CSV
        #[arg(long)]
        panel: PathBuf,

        /// Benchmark factor CSV (date, mkt_rf, SMB, HML, Mom)
        #[arg(long)]
        factors: PathBuf,

        /// JSON list of experiment configurations
        #[arg(long)]
        config: PathBuf,

        /// Output path; results go to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Compute the TK feature from the panel's returns before running
        #[arg(long)]
        with_prospect: bool,

        #[command(flatten)]
        params: ProspectArgs,
    },
}

/// Prospect theory parameters; unset values keep their defaults.
#[derive(Args, Debug, Clone, Default)]
struct ProspectArgs {
    /// Value function curvature
    #[arg(long)]
    alpha: Option<f64>,

    /// Loss aversion
    #[arg(long)]
    lambda: Option<f64>,

    /// Gain probability weighting
    #[arg(long)]
    gamma: Option<f64>,

    /// Loss probability weighting
    #[arg(long)]
    theta: Option<f64>,

    /// Rolling window in months
    #[arg(long)]
    window: Option<usize>,
}

impl ProspectArgs {
    fn config(&self) -> ProspectConfig {
        let defaults = ProspectConfig::default();
        ProspectConfig {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            lambda: self.lambda.unwrap_or(defaults.lambda),
            gamma: self.gamma.unwrap_or(defaults.gamma),
            theta: self.theta.unwrap_or(defaults.theta),
            window: self.window.unwrap_or(defaults.window),
            ..defaults
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prospect {
            input,
            output,
            params,
        } => {
            let rows = pipeline::write_prospect_scores(&input, &output, params.config())?;
            println!("Wrote {} TK scores to {}", rows, output.display());
        }
        Commands::Experiment {
            panel,
            factors,
            config,
            output,
            format,
            with_prospect,
            params,
        } => {
            let inputs = pipeline::ExperimentInputs {
                panel,
                factors,
                config,
                prospect: with_prospect.then(|| params.config()),
            };
            let batch = pipeline::run_experiments(&inputs)?;
            pipeline::write_results(&batch.rows, output.as_deref(), format)?;
            pipeline::batch_status(&batch)?;
        }
    }

    Ok(())
}
