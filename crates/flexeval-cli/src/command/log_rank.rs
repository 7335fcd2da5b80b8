use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use flexeval_metrics::survival_groups::PredictedSurvivalGroups;
use flexeval_stats::{
    descriptive::DescriptiveStats,
    log_rank::LogRankTest,
    survival::{KaplanMeierCurve, SurvivalGroup},
};

use crate::{
    schema::report::{LogRankGroup, LogRankReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct LogRankArg {
    /// Path to the predictions JSON file; instances are grouped by predicted class
    pub predictions: PathBuf,

    /// Path to the survivals JSON file, keyed by instance id
    #[arg(long)]
    pub survivals: PathBuf,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &LogRankArg) -> anyhow::Result<()> {
    let predictions = util::read_predictions_file(&arg.predictions)?;
    let survivals = util::read_survivals_file(&arg.survivals)?;

    let grouped = PredictedSurvivalGroups::from_predictions(&predictions, &survivals)?;
    let report = log_rank_report(&grouped)?;
    tracing::info!(
        statistic = report.statistic,
        p_value = report.p_value,
        groups = report.groups.len(),
        "log-rank test"
    );

    Output::save_json(&report, arg.output.clone())
}

fn log_rank_report(grouped: &PredictedSurvivalGroups) -> anyhow::Result<LogRankReport> {
    let test = LogRankTest::compute(grouped.groups())?;
    let groups = grouped
        .iter()
        .zip(test.observed.iter().zip(&test.expected))
        .map(|((label, group), (observed, expected))| {
            group_summary(label, group, *observed, *expected)
        })
        .collect::<anyhow::Result<_>>()?;

    Ok(LogRankReport {
        generated_at: Utc::now(),
        statistic: test.statistic,
        degrees_of_freedom: test.degrees_of_freedom,
        p_value: test.p_value(),
        groups,
    })
}

fn group_summary(
    label: &str,
    group: &SurvivalGroup,
    observed: f64,
    expected: f64,
) -> anyhow::Result<LogRankGroup> {
    let times = DescriptiveStats::new(group.all_times())
        .ok_or_else(|| anyhow::anyhow!("survival group '{label}' is empty"))?;
    Ok(LogRankGroup {
        label: label.to_owned(),
        size: group.len(),
        censored: group.censored_times().len(),
        observed_events: observed,
        expected_events: expected,
        median_survival: KaplanMeierCurve::from_group(group).median_survival(),
        mean_time: times.mean,
        min_time: times.min,
        max_time: times.max,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use flexeval_metrics::prediction::{Prediction, Predictions};
    use flexeval_stats::survival::Survival;

    use super::*;

    #[test]
    fn test_groups_follow_label_order() {
        let predictions = [
            ("P1", "STS"),
            ("P2", "LTS"),
            ("P3", "STS"),
            ("P4", "LTS"),
        ]
        .into_iter()
        .map(|(id, predicted)| Prediction::new(id, predicted, predicted))
        .collect::<Predictions>();
        let survivals = HashMap::from([
            ("P1".to_owned(), Survival::observed(100.0)),
            ("P2".to_owned(), Survival::censored(900.0)),
            ("P3".to_owned(), Survival::observed(200.0)),
            ("P4".to_owned(), Survival::observed(1200.0)),
        ]);
        let grouped = PredictedSurvivalGroups::from_predictions(&predictions, &survivals).unwrap();

        let report = log_rank_report(&grouped).unwrap();
        let labels = report.groups.iter().map(|g| g.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["LTS", "STS"]);
        assert_eq!(report.degrees_of_freedom, 1);
        assert_eq!(report.groups[0].censored, 1);
        assert!((report.groups[1].mean_time - 150.0).abs() < 1e-12);
        assert!(report.statistic > 0.0);
        assert!((0.0..=1.0).contains(&report.p_value));
    }

    #[test]
    fn test_single_group_fails() {
        let predictions = Predictions::from_iter([Prediction::new("P1", "STS", "STS")]);
        let survivals = HashMap::from([("P1".to_owned(), Survival::observed(100.0))]);
        let grouped = PredictedSurvivalGroups::from_predictions(&predictions, &survivals).unwrap();
        assert!(log_rank_report(&grouped).is_err());
    }
}
