//! Statistical building blocks for model evaluation.
//!
//! This crate provides the numerically non-trivial pieces that the metric and
//! model-selection layers are built on:
//!
//! - **Survival data model**: Right-censored time-to-event records grouped into cohorts
//! - **Log-rank test**: Compare survival distributions across two or more groups
//! - **Chi-square distribution**: Upper-tail probabilities for test statistics
//! - **Kaplan-Meier estimator**: Survival curves for reporting
//! - **Descriptive statistics**: Median and friends for threshold selection
//!
//! # Modules
//!
//! - [`survival`]: [`Survival`](survival::Survival), [`SurvivalGroup`](survival::SurvivalGroup),
//!   [`SurvivalGroups`](survival::SurvivalGroups) and the Kaplan-Meier curve
//! - [`log_rank`]: The log-rank test statistic
//! - [`distribution`]: Chi-square survival function
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Comparing two survival groups
//!
//! ```
//! use flexeval_stats::{
//!     log_rank::log_rank_statistic,
//!     survival::{Survival, SurvivalGroup, SurvivalGroups},
//! };
//!
//! let early = SurvivalGroup::from_iter([2.0, 4.0, 6.0].map(Survival::observed));
//! let late = SurvivalGroup::from_iter([10.0, 12.0, 14.0].map(Survival::observed));
//! let groups = SurvivalGroups::from_iter([early, late]);
//!
//! let statistic = log_rank_statistic(&groups).unwrap();
//! assert!(statistic > 3.0);
//! ```
//!
//! ## Computing a median
//!
//! ```
//! use flexeval_stats::descriptive::median;
//!
//! assert_eq!(median([5.0, 1.0, 3.0, 2.0]), Some(2.5));
//! assert_eq!(median([]), None);
//! ```

pub mod descriptive;
pub mod distribution;
pub mod log_rank;
pub mod survival;

/// A statistic is undefined for the inputs it was given.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InsufficientDataError {
    #[display("at least 2 survival groups are required, got {count}")]
    TooFewGroups { count: usize },
    #[display("survival group {index} is empty")]
    EmptyGroup { index: usize },
    #[display("survival group {index} has no instances at risk at any event time")]
    NeverAtRisk { index: usize },
    #[display("no observed (uncensored) events in any survival group")]
    NoObservedEvents,
    #[display("log-rank variance is zero")]
    ZeroVariance,
    #[display("no predictions to evaluate")]
    NoPredictions,
    #[display("at least 2 classes are required, got {count}")]
    TooFewClasses { count: usize },
    #[display("exactly 2 classes are required, got {count}")]
    NotBinary { count: usize },
    #[display("no instances with actual class '{label}'")]
    EmptyClass { label: String },
}
