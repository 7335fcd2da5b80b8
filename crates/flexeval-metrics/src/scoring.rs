//! Classification metrics over a set of predictions.
//!
//! [`PredictionScoring`] borrows a [`Predictions`] collection and derives
//! every metric from it on demand. The two metrics used for model selection
//! are:
//!
//! - **AUC**: rank-based (Mann-Whitney) area under the ROC curve. Tied scores
//!   share their average rank, so a tie between a positive and a negative
//!   instance contributes one half. With more than two classes the result is
//!   the mean of the one-vs-rest AUCs weighted by class frequency.
//! - **Baseline improvement**: accuracy minus the accuracy of always
//!   predicting the majority actual class.
//!
//! Every metric fails with [`MeasureError::InsufficientData`] when it is
//! undefined for the given predictions instead of falling back to a default.

use std::{cmp::Ordering, collections::BTreeMap};

use flexeval_stats::InsufficientDataError;

use crate::{
    MeasureError,
    prediction::{Prediction, Predictions},
    scalar::ScalarValue,
};

/// Area under the ROC curve of the predictions.
///
/// # Examples
///
/// ```
/// use flexeval_metrics::{prediction::{Prediction, Predictions}, scoring::compute_auc};
///
/// let predictions = Predictions::from_iter([
///     Prediction::new("a", "pos", "pos").with_score("pos", 0.8).with_score("neg", 0.2),
///     Prediction::new("b", "neg", "neg").with_score("pos", 0.4).with_score("neg", 0.6),
///     Prediction::new("c", "pos", "neg").with_score("pos", 0.4).with_score("neg", 0.6),
/// ]);
/// let auc = compute_auc(&predictions).unwrap();
/// assert!((auc - 0.75).abs() < 1e-12);
/// ```
pub fn compute_auc(predictions: &Predictions) -> Result<f64, MeasureError> {
    PredictionScoring::new(predictions).auc()
}

/// Accuracy of the predictions minus the majority-class baseline accuracy.
pub fn compute_baseline_improvement(predictions: &Predictions) -> Result<f64, MeasureError> {
    PredictionScoring::new(predictions).baseline_improvement()
}

/// Per-class tallies of actual and predicted classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCounts {
    pub label: String,
    /// Number of predictions.
    pub total: usize,
    /// Instances whose actual class is `label`.
    pub actual: usize,
    pub actual_correct: usize,
    pub actual_incorrect: usize,
    /// Instances predicted as `label`.
    pub predicted: usize,
    pub predicted_correct: usize,
    pub predicted_incorrect: usize,
}

impl ClassCounts {
    #[must_use]
    pub fn proportion_actual(&self) -> Option<f64> {
        ratio(self.actual, self.total)
    }

    #[must_use]
    pub fn proportion_actual_correct(&self) -> Option<f64> {
        ratio(self.actual_correct, self.actual)
    }

    #[must_use]
    pub fn proportion_actual_incorrect(&self) -> Option<f64> {
        ratio(self.actual_incorrect, self.actual)
    }

    #[must_use]
    pub fn proportion_predicted(&self) -> Option<f64> {
        ratio(self.predicted, self.total)
    }

    #[must_use]
    pub fn proportion_predicted_correct(&self) -> Option<f64> {
        ratio(self.predicted_correct, self.predicted)
    }

    #[must_use]
    pub fn proportion_predicted_incorrect(&self) -> Option<f64> {
        ratio(self.predicted_incorrect, self.predicted)
    }
}

#[expect(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Metrics computed from a borrowed set of predictions.
#[derive(Debug, Clone, Copy)]
pub struct PredictionScoring<'a> {
    predictions: &'a Predictions,
}

impl<'a> PredictionScoring<'a> {
    #[must_use]
    pub fn new(predictions: &'a Predictions) -> Self {
        Self { predictions }
    }

    fn num_predictions(&self) -> Result<usize, MeasureError> {
        match self.predictions.len() {
            0 => Err(InsufficientDataError::NoPredictions.into()),
            n => Ok(n),
        }
    }

    /// Fraction of predictions whose predicted class equals the actual class.
    pub fn accuracy(&self) -> Result<f64, MeasureError> {
        let n = self.num_predictions()?;
        let correct = self.predictions.iter().filter(|p| p.was_correct()).count();
        Ok(ratio(correct, n).unwrap_or_default())
    }

    pub fn error_rate(&self) -> Result<f64, MeasureError> {
        Ok(1.0 - self.accuracy()?)
    }

    /// Most frequent actual class. Ties go to the alphabetically first class.
    pub fn majority_label(&self) -> Result<&'a str, MeasureError> {
        self.num_predictions()?;
        let mut counts = BTreeMap::<&str, usize>::new();
        for prediction in self.predictions {
            *counts.entry(prediction.actual.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            // on equal counts keep the earlier (alphabetically smaller) label
            .max_by(|(a_label, a_count), (b_label, b_count)| {
                a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
            })
            .map(|(label, _)| label)
            .ok_or_else(|| InsufficientDataError::NoPredictions.into())
    }

    /// Accuracy of always predicting [`majority_label`](Self::majority_label).
    pub fn baseline_accuracy(&self) -> Result<f64, MeasureError> {
        let n = self.num_predictions()?;
        let majority = self.majority_label()?;
        let count = self
            .predictions
            .iter()
            .filter(|p| p.actual == majority)
            .count();
        Ok(ratio(count, n).unwrap_or_default())
    }

    pub fn baseline_error_rate(&self) -> Result<f64, MeasureError> {
        Ok(1.0 - self.baseline_accuracy()?)
    }

    /// Accuracy minus baseline accuracy. Negative when the model does worse
    /// than always predicting the majority class.
    pub fn baseline_improvement(&self) -> Result<f64, MeasureError> {
        Ok(self.accuracy()? - self.baseline_accuracy()?)
    }

    #[must_use]
    pub fn class_counts(&self, label: &str) -> ClassCounts {
        let mut counts = ClassCounts {
            label: label.to_owned(),
            total: self.predictions.len(),
            actual: 0,
            actual_correct: 0,
            actual_incorrect: 0,
            predicted: 0,
            predicted_correct: 0,
            predicted_incorrect: 0,
        };
        for prediction in self.predictions {
            let correct = prediction.was_correct();
            if prediction.actual == label {
                counts.actual += 1;
                if correct {
                    counts.actual_correct += 1;
                } else {
                    counts.actual_incorrect += 1;
                }
            }
            if prediction.predicted == label {
                counts.predicted += 1;
                if correct {
                    counts.predicted_correct += 1;
                } else {
                    counts.predicted_incorrect += 1;
                }
            }
        }
        counts
    }

    /// Sum of the per-class recalls minus one. Defined only for exactly two
    /// actual classes.
    pub fn youden_index(&self) -> Result<f64, MeasureError> {
        self.num_predictions()?;
        let labels = self.predictions.unique_actual_labels();
        let [first, second] = labels.as_slice() else {
            return Err(InsufficientDataError::NotBinary {
                count: labels.len(),
            }
            .into());
        };
        let recall = |label: &str| {
            self.class_counts(label)
                .proportion_actual_correct()
                .unwrap_or_default()
        };
        Ok(recall(*first) + recall(*second) - 1.0)
    }

    /// One-vs-rest AUC of `label` using each prediction's score for `label`.
    pub fn class_auc(&self, label: &str) -> Result<f64, MeasureError> {
        self.num_predictions()?;
        let scored = self
            .predictions
            .iter()
            .map(|p| Ok((p.actual == label, score_for(p, label)?)))
            .collect::<Result<Vec<_>, MeasureError>>()?;
        let num_positive = scored.iter().filter(|(positive, _)| *positive).count();
        if num_positive == 0 {
            return Err(InsufficientDataError::EmptyClass {
                label: label.to_owned(),
            }
            .into());
        }
        if num_positive == scored.len() {
            return Err(InsufficientDataError::TooFewClasses { count: 1 }.into());
        }
        Ok(rank_auc(&scored))
    }

    /// AUC over all actual classes.
    ///
    /// For two classes with complementary scores this is the ordinary binary
    /// AUC. Otherwise it is the class-frequency weighted mean of
    /// [`class_auc`](Self::class_auc) over the actual classes.
    #[expect(clippy::cast_precision_loss)]
    pub fn auc(&self) -> Result<f64, MeasureError> {
        let n = self.num_predictions()? as f64;
        let labels = self.predictions.unique_actual_labels();
        if labels.len() < 2 {
            return Err(InsufficientDataError::TooFewClasses {
                count: labels.len(),
            }
            .into());
        }
        labels.iter().try_fold(0.0, |sum, label| {
            let weight = self.class_counts(label).actual as f64 / n;
            Ok(sum + weight * self.class_auc(label)?)
        })
    }

    /// Every metric as a [`ScalarValue`] labelled with `description`.
    ///
    /// Per-class proportions with no instances in their denominator are left
    /// out. The Youden index is included only for two actual classes.
    pub fn scalar_values(&self, description: &str) -> Result<Vec<ScalarValue>, MeasureError> {
        let value = |metric: String, value: f64| ScalarValue::new(description, metric, value);
        let mut values = vec![
            value("Error rate".into(), self.error_rate()?),
            value("Baseline error rate".into(), self.baseline_error_rate()?),
            value("Baseline improvement".into(), self.baseline_improvement()?),
            value("Accuracy".into(), self.accuracy()?),
        ];

        for label in self.predictions.unique_labels() {
            let counts = self.class_counts(label);
            let actual = format!("instances with dependent variable class {label}");
            let predicted = format!("instances predicted as dependent variable class {label}");
            let tallies = [
                (format!("Number {actual}"), counts.actual),
                (format!("Number {actual} predicted correctly"), counts.actual_correct),
                (format!("Number {actual} predicted incorrectly"), counts.actual_incorrect),
                (format!("Number {predicted}"), counts.predicted),
                (format!("Number {predicted} correctly"), counts.predicted_correct),
                (format!("Number {predicted} incorrectly"), counts.predicted_incorrect),
            ];
            values.extend(
                tallies
                    .into_iter()
                    .map(|(metric, count)| ScalarValue::new(description, metric, count)),
            );
            let proportions = [
                (format!("Proportion {actual}"), counts.proportion_actual()),
                (
                    format!("Proportion {actual} predicted correctly"),
                    counts.proportion_actual_correct(),
                ),
                (
                    format!("Proportion {actual} predicted incorrectly"),
                    counts.proportion_actual_incorrect(),
                ),
                (format!("Proportion {predicted}"), counts.proportion_predicted()),
                (
                    format!("Proportion {predicted} correctly"),
                    counts.proportion_predicted_correct(),
                ),
                (
                    format!("Proportion {predicted} incorrectly"),
                    counts.proportion_predicted_incorrect(),
                ),
            ];
            values.extend(
                proportions
                    .into_iter()
                    .filter_map(|(metric, proportion)| Some(value(metric, proportion?))),
            );
        }

        values.push(value("AUC".into(), self.auc()?));
        if self.predictions.unique_actual_labels().len() == 2 {
            values.push(value("Youden Index".into(), self.youden_index()?));
        }
        Ok(values)
    }
}

fn score_for(prediction: &Prediction, label: &str) -> Result<f64, MeasureError> {
    prediction
        .score(label)
        .ok_or_else(|| MeasureError::MissingScore {
            instance_id: prediction.instance_id.clone(),
            label: label.to_owned(),
        })
}

/// Mann-Whitney AUC of `(is_positive, score)` pairs. Both sides must be
/// non-empty.
#[expect(clippy::cast_precision_loss)]
fn rank_auc(scored: &[(bool, f64)]) -> f64 {
    let num_positive = scored.iter().filter(|(positive, _)| *positive).count();
    let num_negative = scored.len() - num_positive;

    let mut order = (0..scored.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| scored[a].1.total_cmp(&scored[b].1));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let score = scored[order[start]].1;
        let end = order[start..]
            .iter()
            .position(|&i| scored[i].1.total_cmp(&score) != Ordering::Equal)
            .map_or(order.len(), |offset| start + offset);
        // ranks are 1-based; tied scores share the mean of their ranks
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let positives = order[start..end].iter().filter(|&&i| scored[i].0).count();
        positive_rank_sum += average_rank * positives as f64;
        start = end;
    }

    let n_pos = num_positive as f64;
    let n_neg = num_negative as f64;
    (positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}
