use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::util;

use self::{
    aggregate::AggregateArg, compare::CompareArg, discretize::DiscretizeArg, log_rank::LogRankArg,
    rank_features::RankFeaturesArg, score::ScoreArg, select_best::SelectBestArg,
    select_single::SelectSingleArg,
};

mod aggregate;
mod compare;
mod discretize;
mod log_rank;
mod rank_features;
mod score;
mod select_best;
mod select_single;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// What to evaluate
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Score a set of predictions
    Score(#[clap(flatten)] ScoreArg),
    /// Compare two sets of predictions by one metric
    Compare(#[clap(flatten)] CompareArg),
    /// Pick the best of several sets of predictions by one metric
    SelectBest(#[clap(flatten)] SelectBestArg),
    /// Log-rank test between the survival of predicted classes
    LogRank(#[clap(flatten)] LogRankArg),
    /// Rank features by their mean rank over several rankings
    RankFeatures(#[clap(flatten)] RankFeaturesArg),
    /// Merge the feature spaces of several data sources
    Aggregate(#[clap(flatten)] AggregateArg),
    /// Select a single feature for a baseline iteration
    SelectSingle(#[clap(flatten)] SelectSingleArg),
    /// Discretize raw dependent-variable values into classes
    Discretize(#[clap(flatten)] DiscretizeArg),
}

/// Output format of commands that can print plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    #[default]
    Json,
    Text,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let config = util::read_config_file(args.config.as_deref())?;
    match args.mode {
        Mode::Score(arg) => score::run(&arg, &config)?,
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::SelectBest(arg) => select_best::run(&arg)?,
        Mode::LogRank(arg) => log_rank::run(&arg)?,
        Mode::RankFeatures(arg) => rank_features::run(&arg)?,
        Mode::Aggregate(arg) => aggregate::run(&arg, &config)?,
        Mode::SelectSingle(arg) => select_single::run(&arg)?,
        Mode::Discretize(arg) => discretize::run(&arg, &config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let args = CommandArgs::try_parse_from([
            "flexeval",
            "score",
            "predictions.json",
            "--config",
            "config.json",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("config.json")));
        assert!(matches!(args.mode, Mode::Score(_)));
    }

    #[test]
    fn test_log_rank_metric_needs_survivals() {
        let result = CommandArgs::try_parse_from([
            "flexeval",
            "compare",
            "a.json",
            "b.json",
            "--metric",
            "log-rank",
        ]);
        assert!(result.is_err());
    }
}
