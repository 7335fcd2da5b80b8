//! Scoring predictions and choosing between models.
//!
//! This crate turns the predictions a trained model produced into a single
//! performance score, and decides which of two models did better.
//!
//! # Overview
//!
//! ```text
//! Predictions / SurvivalGroups
//!     ↓ scored by
//! PredictionScoring, LogRankTest
//!     ↓ wrapped by
//! ResultMeasurer (AUC | baseline improvement | log-rank)
//!     ↓ compared via beats()
//! select_best
//! ```
//!
//! - [`prediction`]: The [`Predictions`](prediction::Predictions) made for a set of instances
//! - [`scoring`]: AUC, accuracy, the majority-class baseline and per-class counts
//! - [`survival_groups`]: Group survival records by predicted class
//! - [`measurer`]: The [`ResultMeasurer`](measurer::ResultMeasurer) family with memoized results
//! - [`selection`]: Pick the best candidate among several measured models
//! - [`scalar`]: [`ScalarValue`](scalar::ScalarValue) records for reporting
//!
//! # Examples
//!
//! ```
//! use flexeval_metrics::{
//!     measurer::{AucResultMeasurer, ResultMeasurer},
//!     prediction::{Prediction, Predictions},
//! };
//!
//! let predict = |id, actual, predicted, yes: f64| {
//!     Prediction::new(id, actual, predicted)
//!         .with_score("yes", yes)
//!         .with_score("no", 1.0 - yes)
//! };
//! let good = Predictions::from_iter([
//!     predict("p1", "yes", "yes", 0.9),
//!     predict("p2", "no", "no", 0.2),
//! ]);
//! let bad = Predictions::from_iter([
//!     predict("p1", "yes", "no", 0.3),
//!     predict("p2", "no", "yes", 0.7),
//! ]);
//!
//! let good = AucResultMeasurer::new(good);
//! let bad = AucResultMeasurer::new(bad);
//! assert!(good.beats(&bad).unwrap());
//! assert!(!bad.beats(&good).unwrap());
//! ```

use flexeval_stats::InsufficientDataError;

pub mod measurer;
pub mod prediction;
pub mod scalar;
pub mod scoring;
pub mod selection;
pub mod survival_groups;

/// A score could not be computed.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum MeasureError {
    #[display("insufficient data: {_0}")]
    InsufficientData(InsufficientDataError),
    #[display("prediction for instance '{instance_id}' has no score for label '{label}'")]
    MissingScore { instance_id: String, label: String },
    #[display("no survival record for instance '{instance_id}'")]
    MissingSurvival { instance_id: String },
}

impl From<InsufficientDataError> for MeasureError {
    fn from(error: InsufficientDataError) -> Self {
        Self::InsufficientData(error)
    }
}
