//! File-level pipeline stages behind the CLI subcommands.

use indicatif::{ProgressBar, ProgressStyle};
use kahneman::data::frame::read_csv;
use kahneman::data::{BenchmarkFactors, BenchmarkSchema, Panel, PanelSchema};
use kahneman::output::{ExperimentSummary, ExportFormat, Exporter};
use kahneman::prospect::{ProspectConfig, ProspectTheoryFactor};
use kahneman::{
    ExperimentBatch, ExperimentConfig, ExperimentEvent, ExperimentRunner, attach_prospect_signal,
};
use polars::prelude::*;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Compute TK scores for a return file and write them as CSV.
///
/// Returns the number of rows written.
pub(crate) fn write_prospect_scores(
    input: &Path,
    output: &Path,
    config: ProspectConfig,
) -> Result<usize, Box<dyn Error>> {
    let returns = read_csv(input)?;
    let factor = ProspectTheoryFactor::with_config(config);
    let mut scores = factor.compute_scores(returns.lazy())?.collect()?;

    let mut file = File::create(output)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut scores)?;
    Ok(scores.height())
}

/// Input files of an experiment batch.
#[derive(Debug, Clone)]
pub(crate) struct ExperimentInputs {
    pub(crate) panel: PathBuf,
    pub(crate) factors: PathBuf,
    pub(crate) config: PathBuf,
    /// Compute the TK feature with these parameters before running
    pub(crate) prospect: Option<ProspectConfig>,
}

/// Load inputs and run every configuration, with a progress bar on stderr.
///
/// Failed configurations are returned in the batch rather than as an error.
pub(crate) fn run_experiments(
    inputs: &ExperimentInputs,
) -> Result<ExperimentBatch, Box<dyn Error>> {
    let configs = ExperimentConfig::load_json(&inputs.config)?;
    let mut panel = Panel::load_csv(&inputs.panel, PanelSchema::default())?;
    if let Some(prospect) = &inputs.prospect {
        panel = attach_prospect_signal(panel, prospect)?;
    }
    let factors = BenchmarkFactors::load_csv(&inputs.factors, &BenchmarkSchema::default())?;

    let pb = ProgressBar::new(configs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let batch = ExperimentRunner::new(&panel, &factors)
        .with_observer(|event| match event {
            ExperimentEvent::Started { name, .. } => pb.set_message(name.to_string()),
            ExperimentEvent::Finished { .. } | ExperimentEvent::Failed { .. } => pb.inc(1),
        })
        .run_all(&configs);
    pb.finish_and_clear();

    Ok(batch)
}

/// Error for a batch with failed configurations, after its rows are written.
pub(crate) fn batch_status(batch: &ExperimentBatch) -> Result<(), Box<dyn Error>> {
    if batch.is_complete() {
        return Ok(());
    }
    let names: Vec<&str> = batch.failures.iter().map(|f| f.name.as_str()).collect();
    Err(format!(
        "{} of {} experiments failed: {}",
        names.len(),
        names.len() + batch.rows.len(),
        names.join(", ")
    )
    .into())
}

/// Write result rows to a file, or to stdout when no path is given.
pub(crate) fn write_results(
    rows: &[ExperimentSummary],
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            rows.export_to_file(path, format)?;
            tracing::info!(rows = rows.len(), path = %path.display(), "wrote results");
        }
        None => print!("{}", rows.export_to_string(format)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kahneman::{ExperimentError, FailedExperiment};
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kahneman-bin-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_write_prospect_scores() {
        let input = temp_path("returns.csv");
        let output = temp_path("tk.csv");
        let mut csv = String::from("permno,yyyymm,ret\n");
        for m in 0..6 {
            csv.push_str(&format!("1,2001{:02},{}\n", m + 1, if m % 2 == 0 { 1.5 } else { -2.0 }));
        }
        fs::write(&input, csv).unwrap();

        let config = ProspectConfig {
            window: 3,
            ..Default::default()
        };
        let rows = write_prospect_scores(&input, &output, config).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        fs::remove_file(&input).ok();
        fs::remove_file(&output).ok();

        assert_eq!(rows, 6);
        assert!(written.starts_with("permno,yyyymm,ret,V,TK"));
        assert_eq!(written.lines().count(), 7);
    }

    #[test]
    fn test_batch_status_reports_failures() {
        let mut batch = ExperimentBatch::default();
        assert!(batch_status(&batch).is_ok());

        batch.failures.push(FailedExperiment {
            name: "flat".to_string(),
            error: ExperimentError::NoSignificantFeatures {
                name: "flat".to_string(),
            },
        });
        let message = batch_status(&batch).unwrap_err().to_string();
        assert_eq!(message, "1 of 1 experiments failed: flat");
    }

    #[test]
    fn test_missing_config_file() {
        let inputs = ExperimentInputs {
            panel: temp_path("missing-panel.csv"),
            factors: temp_path("missing-ff.csv"),
            config: temp_path("missing.json"),
            prospect: None,
        };
        assert!(run_experiments(&inputs).is_err());
    }
}
