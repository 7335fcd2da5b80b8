use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use clap::{Args, ValueEnum};
use flexeval_metrics::measurer::{
    AucResultMeasurer, BaselineImprovementResultMeasurer, LogRankResultMeasurer, ResultMeasurer,
};

use crate::{
    schema::report::{CompareReport, Winner},
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Metric {
    #[default]
    Auc,
    BaselineImprovement,
    LogRank,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// Path to the first predictions JSON file
    pub first: PathBuf,

    /// Path to the second predictions JSON file
    pub second: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    pub metric: Metric,

    /// Path to the survivals JSON file, required by the log-rank metric
    #[arg(long, required_if_eq("metric", "log-rank"))]
    pub survivals: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let first = Arc::new(util::read_predictions_file(&arg.first)?);
    let second = Arc::new(util::read_predictions_file(&arg.second)?);

    let report = match arg.metric {
        Metric::Auc => compare(
            &AucResultMeasurer::new(first),
            &AucResultMeasurer::new(second),
        )?,
        Metric::BaselineImprovement => compare(
            &BaselineImprovementResultMeasurer::new(first),
            &BaselineImprovementResultMeasurer::new(second),
        )?,
        Metric::LogRank => {
            let path = arg
                .survivals
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--survivals is required for log-rank"))?;
            let survivals = Arc::new(util::read_survivals_file(path)?);
            compare(
                &LogRankResultMeasurer::from_predictions(first, Arc::clone(&survivals)),
                &LogRankResultMeasurer::from_predictions(second, survivals),
            )?
        }
    };

    Output::save_json(&report, arg.output.clone())
}

fn compare<M>(first: &M, second: &M) -> anyhow::Result<CompareReport>
where
    M: ResultMeasurer,
{
    let winner = if first.beats(second)? {
        Winner::First
    } else if second.beats(first)? {
        Winner::Second
    } else {
        Winner::Tie
    };
    let report = CompareReport {
        generated_at: Utc::now(),
        metric: first.metric_name().to_owned(),
        first: first.result()?,
        second: second.result()?,
        winner,
    };
    tracing::info!(
        metric = %report.metric,
        first = report.first,
        second = report.second,
        ?winner,
        "compared predictions"
    );
    Ok(report)
}
