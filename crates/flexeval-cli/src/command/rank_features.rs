use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use flexeval_features::feature_rank::{self, FeatureRank, FeatureRanks};

use crate::{
    command::Format,
    schema::report::FeatureRankReport,
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct RankFeaturesArg {
    /// Path to a JSON file holding a list of rankings, each a list of
    /// feature names from best to worst
    pub rankings: PathBuf,

    /// Keep only the best N features
    #[arg(long)]
    pub top: Option<usize>,

    #[arg(long, value_enum, default_value_t)]
    pub format: Format,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &RankFeaturesArg) -> anyhow::Result<()> {
    let rankings: Vec<Vec<String>> = util::read_json_file("rankings", &arg.rankings)?;
    let (num_rankings, features) = mean_ranks(rankings, arg.top);

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        Format::Json => output.write_json(FeatureRankReport {
            generated_at: Utc::now(),
            num_rankings,
            features,
        })?,
        Format::Text => output.write_lines([feature_rank::rank_table(&features).trim_end()])?,
    }
    Ok(())
}

/// Number of rankings and the mean ranks, cut to the best `top` if given.
fn mean_ranks(rankings: Vec<Vec<String>>, top: Option<usize>) -> (usize, Vec<FeatureRank>) {
    let mut ranks = FeatureRanks::new();
    for ranking in rankings {
        ranks.add(ranking);
    }
    tracing::info!(
        rankings = ranks.num_rankings(),
        features = ranks.len(),
        "ranked features"
    );

    let features = match top {
        Some(n) => ranks.top(n),
        None => ranks.mean_ranks(),
    };
    (ranks.num_rankings(), features)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn rankings() -> Vec<Vec<String>> {
        [
            ["stage", "age", "grade"],
            ["age", "stage", "grade"],
            ["stage", "grade", "age"],
        ]
        .into_iter()
        .map(|ranking| ranking.map(str::to_owned).to_vec())
        .collect()
    }

    #[test]
    fn test_all_features_without_top() {
        let (num_rankings, features) = mean_ranks(rankings(), None);
        assert_eq!(num_rankings, 3);
        let names = features.iter().map(FeatureRank::feature).collect::<Vec<_>>();
        assert_eq!(names, ["stage", "age", "grade"]);
        assert_abs_diff_eq!(features[0].rank(), 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_top_truncates() {
        let (num_rankings, features) = mean_ranks(rankings(), Some(2));
        assert_eq!(num_rankings, 3);
        let names = features.iter().map(FeatureRank::feature).collect::<Vec<_>>();
        assert_eq!(names, ["stage", "age"]);

        let (_, features) = mean_ranks(rankings(), Some(10));
        assert_eq!(features.len(), 3);
        let (_, features) = mean_ranks(rankings(), Some(0));
        assert!(features.is_empty());
    }
}
