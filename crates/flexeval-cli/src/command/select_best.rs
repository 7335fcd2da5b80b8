use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use clap::Args;
use flexeval_metrics::{
    measurer::{
        AucResultMeasurer, BaselineImprovementResultMeasurer, LogRankResultMeasurer,
        ResultMeasurer,
    },
    prediction::Predictions,
    selection,
};

use crate::{
    command::compare::Metric,
    schema::report::{CandidateScore, SelectBestReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SelectBestArg {
    /// Paths to the candidate predictions JSON files
    #[arg(required = true)]
    pub predictions: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub metric: Metric,

    /// Path to the survivals JSON file, required by the log-rank metric
    #[arg(long, required_if_eq("metric", "log-rank"))]
    pub survivals: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SelectBestArg) -> anyhow::Result<()> {
    let candidates = arg
        .predictions
        .iter()
        .map(|path| Ok((path.display().to_string(), util::read_predictions_file(path)?)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let report = match arg.metric {
        Metric::Auc => select(candidates, AucResultMeasurer::new)?,
        Metric::BaselineImprovement => select(candidates, BaselineImprovementResultMeasurer::new)?,
        Metric::LogRank => {
            let path = arg
                .survivals
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--survivals is required for log-rank"))?;
            let survivals = Arc::new(util::read_survivals_file(path)?);
            select(candidates, |predictions| {
                LogRankResultMeasurer::from_predictions(predictions, Arc::clone(&survivals))
            })?
        }
    };

    Output::save_json(&report, arg.output.clone())
}

fn select<M, F>(
    candidates: Vec<(String, Predictions)>,
    measure: F,
) -> anyhow::Result<SelectBestReport>
where
    M: ResultMeasurer,
    F: Fn(Predictions) -> M,
{
    let measured = candidates
        .into_iter()
        .map(|(key, predictions)| (key, measure(predictions)))
        .collect::<Vec<_>>();
    let metric = measured
        .first()
        .map(|(_, measurer)| measurer.metric_name().to_owned())
        .unwrap_or_default();
    let scores = measured
        .iter()
        .map(|(key, measurer)| {
            Ok(CandidateScore {
                candidate: key.clone(),
                score: measurer.result()?,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let best = selection::select_best(measured)?.map(|(key, _)| key);
    tracing::info!(metric = %metric, best = ?best, "selected best candidate");

    Ok(SelectBestReport {
        generated_at: Utc::now(),
        metric,
        candidates: scores,
        best,
    })
}

#[cfg(test)]
mod tests {
    use flexeval_metrics::prediction::Prediction;

    use super::*;

    fn candidate(key: &str, predicted: &[&str]) -> (String, Predictions) {
        let predictions = ["yes", "yes", "no", "no"]
            .iter()
            .zip(predicted)
            .enumerate()
            .map(|(i, (actual, predicted))| {
                Prediction::new(format!("P{i}"), *actual, *predicted)
            })
            .collect();
        (key.to_owned(), predictions)
    }

    #[test]
    fn test_best_candidate() {
        let candidates = vec![
            candidate("a.json", &["no", "yes", "yes", "no"]),
            candidate("b.json", &["yes", "yes", "no", "no"]),
            candidate("c.json", &["yes", "yes", "yes", "no"]),
        ];
        let report = select(candidates, BaselineImprovementResultMeasurer::new).unwrap();
        assert_eq!(report.best.as_deref(), Some("b.json"));
        assert_eq!(report.candidates.len(), 3);
        assert_eq!(report.metric, "Baseline improvement");
    }

    #[test]
    fn test_tied_candidates_pick_median_key() {
        let perfect = ["yes", "yes", "no", "no"];
        let candidates = vec![
            candidate("c.json", &perfect),
            candidate("a.json", &perfect),
            candidate("b.json", &perfect),
        ];
        let report = select(candidates, BaselineImprovementResultMeasurer::new).unwrap();
        assert_eq!(report.best.as_deref(), Some("b.json"));
    }
}
