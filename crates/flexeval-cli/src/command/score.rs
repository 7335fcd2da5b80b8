use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use flexeval_metrics::scoring::PredictionScoring;

use crate::{
    command::Format,
    schema::{config::EvalConfig, report::ScoreReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ScoreArg {
    /// Path to the predictions JSON file
    pub predictions: PathBuf,

    /// Description attached to every value (defaults to the configured one)
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ScoreArg, config: &EvalConfig) -> anyhow::Result<()> {
    let predictions = util::read_predictions_file(&arg.predictions)?;
    let description = arg.description.as_deref().unwrap_or(&config.description);

    let values = PredictionScoring::new(&predictions)
        .scalar_values(description)
        .with_context(|| format!("Failed to score {}", arg.predictions.display()))?;
    tracing::info!(values = values.len(), "scored predictions");

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        Format::Json => output.write_json(ScoreReport {
            generated_at: Utc::now(),
            description: description.to_owned(),
            values,
        })?,
        Format::Text => output.write_lines(&values)?,
    }
    Ok(())
}
