use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use flexeval_features::feature_rank::FeatureRank;
use flexeval_metrics::scalar::ScalarValue;
use serde::Serialize;

/// Scalar values scoring one set of predictions.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub generated_at: DateTime<Utc>,
    pub description: String,
    pub values: Vec<ScalarValue>,
}

/// Which of two compared prediction sets scored better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    First,
    Second,
    Tie,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareReport {
    pub generated_at: DateTime<Utc>,
    /// Name of the metric both sets were measured with
    pub metric: String,
    pub first: f64,
    pub second: f64,
    pub winner: Winner,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub candidate: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectBestReport {
    pub generated_at: DateTime<Utc>,
    pub metric: String,
    /// Every candidate with its score, in input order
    pub candidates: Vec<CandidateScore>,
    /// The winning candidate; among tied candidates the median by name
    pub best: Option<String>,
}

/// Per-group part of a [`LogRankReport`].
#[derive(Debug, Clone, Serialize)]
pub struct LogRankGroup {
    /// Predicted class the group was formed by
    pub label: String,
    pub size: usize,
    pub censored: usize,
    pub observed_events: f64,
    pub expected_events: f64,
    /// Kaplan-Meier median survival time, if survival drops to one half
    pub median_survival: Option<f64>,
    /// Mean of all survival times, censored or not
    pub mean_time: f64,
    pub min_time: f64,
    pub max_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogRankReport {
    pub generated_at: DateTime<Utc>,
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub groups: Vec<LogRankGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureRankReport {
    pub generated_at: DateTime<Utc>,
    pub num_rankings: usize,
    /// Features by ascending mean rank
    pub features: Vec<FeatureRank>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub generated_at: DateTime<Utc>,
    pub selector: String,
    pub iteration: usize,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscretizeReport {
    pub generated_at: DateTime<Utc>,
    /// Description of the transformer that produced the classes
    pub transformer: String,
    /// Class per instance id
    pub classes: BTreeMap<String, String>,
}
