//! Uniform "score / does A beat B" contract over the evaluation metrics.
//!
//! Each measurer owns its input and computes its score lazily: nothing is
//! computed at construction, the first call to [`ResultMeasurer::result`]
//! computes the score, and every later call returns the cached outcome. A
//! failed computation is cached too, so the same error is returned on every
//! call.
//!
//! The cache is a [`OnceLock`], so a measurer shared between threads computes
//! its score at most once. Concurrent first callers wait for the one running
//! computation.
//!
//! Every measurer declares the direction of its comparison in its own
//! [`ResultMeasurer::beats`]. All current metrics are "higher wins".

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use flexeval_stats::{
    log_rank,
    survival::{Survival, SurvivalGroups},
};

use crate::{
    MeasureError,
    prediction::Predictions,
    scoring::{compute_auc, compute_baseline_improvement},
    survival_groups::PredictedSurvivalGroups,
};

/// A lazily computed, comparable model score.
pub trait ResultMeasurer {
    /// Name of the metric as it appears in reports.
    fn metric_name(&self) -> &'static str;

    /// The score, computed on the first call and cached afterwards.
    fn result(&self) -> Result<f64, MeasureError>;

    /// Whether this measurer's score is strictly better than `other`'s.
    fn beats(&self, other: &Self) -> Result<bool, MeasureError>;

    /// Whether both scores are equal.
    #[expect(clippy::float_cmp)]
    fn ties(&self, other: &Self) -> Result<bool, MeasureError> {
        Ok(self.result()? == other.result()?)
    }
}

/// Memoize-once slot for a measurer's outcome.
#[derive(Debug, Default)]
struct ResultCache {
    slot: OnceLock<Result<f64, MeasureError>>,
}

impl ResultCache {
    fn get_or_compute<F>(&self, metric: &str, compute: F) -> Result<f64, MeasureError>
    where
        F: FnOnce() -> Result<f64, MeasureError>,
    {
        self.slot
            .get_or_init(|| {
                let outcome = compute();
                match &outcome {
                    Ok(value) => tracing::debug!(metric, value, "computed result"),
                    Err(error) => tracing::debug!(metric, %error, "result is undefined"),
                }
                outcome
            })
            .clone()
    }

    fn is_computed(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// Area under the ROC curve. Higher wins.
#[derive(Debug)]
pub struct AucResultMeasurer {
    predictions: Arc<Predictions>,
    cache: ResultCache,
}

impl AucResultMeasurer {
    #[must_use]
    pub fn new(predictions: impl Into<Arc<Predictions>>) -> Self {
        Self {
            predictions: predictions.into(),
            cache: ResultCache::default(),
        }
    }

    #[must_use]
    pub fn predictions(&self) -> &Predictions {
        &self.predictions
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cache.is_computed()
    }
}

impl ResultMeasurer for AucResultMeasurer {
    fn metric_name(&self) -> &'static str {
        "AUC"
    }

    fn result(&self) -> Result<f64, MeasureError> {
        self.cache
            .get_or_compute(self.metric_name(), || compute_auc(&self.predictions))
    }

    fn beats(&self, other: &Self) -> Result<bool, MeasureError> {
        Ok(self.result()? > other.result()?)
    }
}

/// Accuracy gained over always predicting the majority class. Higher wins.
#[derive(Debug)]
pub struct BaselineImprovementResultMeasurer {
    predictions: Arc<Predictions>,
    cache: ResultCache,
}

impl BaselineImprovementResultMeasurer {
    #[must_use]
    pub fn new(predictions: impl Into<Arc<Predictions>>) -> Self {
        Self {
            predictions: predictions.into(),
            cache: ResultCache::default(),
        }
    }

    #[must_use]
    pub fn predictions(&self) -> &Predictions {
        &self.predictions
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cache.is_computed()
    }
}

impl ResultMeasurer for BaselineImprovementResultMeasurer {
    fn metric_name(&self) -> &'static str {
        "Baseline improvement"
    }

    fn result(&self) -> Result<f64, MeasureError> {
        self.cache.get_or_compute(self.metric_name(), || {
            compute_baseline_improvement(&self.predictions)
        })
    }

    fn beats(&self, other: &Self) -> Result<bool, MeasureError> {
        Ok(self.result()? > other.result()?)
    }
}

#[derive(Debug)]
enum SurvivalSource {
    Groups(Arc<SurvivalGroups>),
    Predicted {
        predictions: Arc<Predictions>,
        survivals: Arc<HashMap<String, Survival>>,
    },
}

/// Log-rank statistic between survival groups. Higher (more separated
/// groups) wins.
#[derive(Debug)]
pub struct LogRankResultMeasurer {
    source: SurvivalSource,
    cache: ResultCache,
}

impl LogRankResultMeasurer {
    /// Measures explicitly given survival groups.
    #[must_use]
    pub fn new(groups: impl Into<Arc<SurvivalGroups>>) -> Self {
        Self {
            source: SurvivalSource::Groups(groups.into()),
            cache: ResultCache::default(),
        }
    }

    /// Measures the groups formed by each instance's predicted class.
    ///
    /// Grouping is deferred to the first [`result`](ResultMeasurer::result)
    /// call, which fails if an instance has no survival record.
    #[must_use]
    pub fn from_predictions(
        predictions: impl Into<Arc<Predictions>>,
        survivals: impl Into<Arc<HashMap<String, Survival>>>,
    ) -> Self {
        Self {
            source: SurvivalSource::Predicted {
                predictions: predictions.into(),
                survivals: survivals.into(),
            },
            cache: ResultCache::default(),
        }
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.cache.is_computed()
    }

    fn compute(&self) -> Result<f64, MeasureError> {
        let statistic = match &self.source {
            SurvivalSource::Groups(groups) => log_rank::log_rank_statistic(groups)?,
            SurvivalSource::Predicted {
                predictions,
                survivals,
            } => {
                let grouped = PredictedSurvivalGroups::from_predictions(predictions, survivals)?;
                log_rank::log_rank_statistic(grouped.groups())?
            }
        };
        Ok(statistic)
    }
}

impl ResultMeasurer for LogRankResultMeasurer {
    fn metric_name(&self) -> &'static str {
        "Log-rank statistic"
    }

    fn result(&self) -> Result<f64, MeasureError> {
        self.cache
            .get_or_compute(self.metric_name(), || self.compute())
    }

    fn beats(&self, other: &Self) -> Result<bool, MeasureError> {
        Ok(self.result()? > other.result()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_abs_diff_eq;
    use flexeval_stats::{InsufficientDataError, survival::SurvivalGroup};
    use proptest::prelude::*;

    use super::*;
    use crate::prediction::Prediction;

    /// Measurer with a fixed score that counts how often it computes.
    #[derive(Debug, Default)]
    struct CountingMeasurer {
        score: f64,
        computations: AtomicUsize,
        cache: ResultCache,
    }

    impl CountingMeasurer {
        fn new(score: f64) -> Self {
            Self {
                score,
                ..Self::default()
            }
        }
    }

    impl ResultMeasurer for CountingMeasurer {
        fn metric_name(&self) -> &'static str {
            "Counting"
        }

        fn result(&self) -> Result<f64, MeasureError> {
            self.cache.get_or_compute(self.metric_name(), || {
                self.computations.fetch_add(1, Ordering::SeqCst);
                Ok(self.score)
            })
        }

        fn beats(&self, other: &Self) -> Result<bool, MeasureError> {
            Ok(self.result()? > other.result()?)
        }
    }

    fn predictions(rows: &[(&str, &str, f64)]) -> Predictions {
        rows.iter()
            .enumerate()
            .map(|(i, &(actual, predicted, yes))| {
                Prediction::new(format!("p{i}"), actual, predicted)
                    .with_score("yes", yes)
                    .with_score("no", 1.0 - yes)
            })
            .collect()
    }

    #[test]
    fn test_construction_is_lazy() {
        let measurer = AucResultMeasurer::new(predictions(&[("yes", "yes", 0.9), ("no", "no", 0.1)]));
        assert!(!measurer.is_computed());
        assert_abs_diff_eq!(measurer.result().unwrap(), 1.0);
        assert!(measurer.is_computed());
    }

    #[test]
    fn test_result_is_computed_once() {
        let measurer = CountingMeasurer::new(0.7);
        for _ in 0..5 {
            assert_abs_diff_eq!(measurer.result().unwrap(), 0.7);
        }
        assert_eq!(measurer.computations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_calls_compute_once() {
        let measurer = CountingMeasurer::new(0.25);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    assert_abs_diff_eq!(measurer.result().unwrap(), 0.25);
                });
            }
        });
        assert_eq!(measurer.computations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_errors_are_cached() {
        let measurer = AucResultMeasurer::new(predictions(&[("yes", "yes", 0.9)]));
        let expected = Err(MeasureError::InsufficientData(
            InsufficientDataError::TooFewClasses { count: 1 },
        ));
        assert_eq!(measurer.result(), expected);
        assert!(measurer.is_computed());
        assert_eq!(measurer.result(), expected);
    }

    #[test]
    fn test_equal_scores_do_not_beat() {
        let a = CountingMeasurer::new(0.5);
        let b = CountingMeasurer::new(0.5);
        assert!(!a.beats(&b).unwrap());
        assert!(!b.beats(&a).unwrap());
        assert!(a.ties(&b).unwrap());
    }

    #[test]
    fn test_baseline_improvement_measurer() {
        let better = BaselineImprovementResultMeasurer::new(predictions(&[
            ("yes", "yes", 0.9),
            ("yes", "yes", 0.8),
            ("no", "no", 0.2),
        ]));
        let majority = BaselineImprovementResultMeasurer::new(predictions(&[
            ("yes", "yes", 0.9),
            ("yes", "yes", 0.8),
            ("no", "yes", 0.6),
        ]));
        assert_abs_diff_eq!(better.result().unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(majority.result().unwrap(), 0.0);
        assert!(better.beats(&majority).unwrap());
        assert!(!majority.beats(&better).unwrap());
    }

    #[test]
    fn test_log_rank_measurer() {
        let observed = |times: &[f64]| {
            times
                .iter()
                .copied()
                .map(Survival::observed)
                .collect::<SurvivalGroup>()
        };
        let separated = LogRankResultMeasurer::new(SurvivalGroups::from_iter([
            observed(&[2.0, 4.0, 6.0]),
            observed(&[10.0, 12.0, 14.0]),
        ]));
        let mixed = LogRankResultMeasurer::new(SurvivalGroups::from_iter([
            observed(&[2.0, 12.0, 6.0]),
            observed(&[10.0, 4.0, 14.0]),
        ]));
        assert!(separated.beats(&mixed).unwrap());
        assert!(!mixed.beats(&separated).unwrap());
    }

    #[test]
    fn test_log_rank_from_predictions_defers_grouping() {
        let predictions = Predictions::from_iter([
            Prediction::new("a", "STS", "STS"),
            Prediction::new("b", "LTS", "LTS"),
        ]);
        let survivals = HashMap::from([("a".to_owned(), Survival::observed(100.0))]);
        let measurer = LogRankResultMeasurer::from_predictions(predictions, survivals);
        assert!(!measurer.is_computed());
        assert_eq!(
            measurer.result(),
            Err(MeasureError::MissingSurvival {
                instance_id: "b".into()
            })
        );
    }

    proptest! {
        #[test]
        fn beats_is_antisymmetric(a in -1.0e6_f64..1.0e6, b in -1.0e6_f64..1.0e6) {
            let (a, b) = (CountingMeasurer::new(a), CountingMeasurer::new(b));
            let a_beats_b = a.beats(&b).unwrap();
            let b_beats_a = b.beats(&a).unwrap();
            prop_assert!(!(a_beats_b && b_beats_a));
            prop_assert_eq!(a_beats_b || b_beats_a, !a.ties(&b).unwrap());
        }
    }
}
