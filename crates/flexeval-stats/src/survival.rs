//! Right-censored time-to-event data.
//!
//! A [`Survival`] records how long one instance was followed and whether the
//! event was observed or the observation was censored. Instances are collected
//! into [`SurvivalGroup`]s (one cohort each, e.g. all instances predicted into
//! the same class), and cohorts into [`SurvivalGroups`] for group comparisons
//! such as the [log-rank test](crate::log_rank).
//!
//! ```text
//! Observed:  |----x     (event at time 50)
//! Censored:  |-------> (followed until 80, event not seen)
//! ```
//!
//! # Examples
//!
//! ```
//! use flexeval_stats::survival::{Survival, SurvivalGroup};
//!
//! let group = SurvivalGroup::from_iter([
//!     Survival::observed(5.0),
//!     Survival::censored(12.0),
//!     Survival::observed(8.0),
//! ]);
//!
//! assert_eq!(group.all_times(), vec![5.0, 12.0, 8.0]);
//! assert_eq!(group.observed_times(), vec![5.0, 8.0]);
//! assert_eq!(group.censored_times(), vec![12.0]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Survival time could not be accepted.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("survival time must be a finite non-negative number, got {time}")]
pub struct InvalidSurvivalTimeError {
    pub time: f64,
}

/// Observed or censored event time of a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurvivalRecord", into = "SurvivalRecord")]
pub struct Survival {
    time: f64,
    censored: bool,
}

/// Serialized form of [`Survival`]; `censored` defaults to `false`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurvivalRecord {
    pub time: f64,
    #[serde(default)]
    pub censored: bool,
}

impl TryFrom<SurvivalRecord> for Survival {
    type Error = InvalidSurvivalTimeError;

    fn try_from(record: SurvivalRecord) -> Result<Self, Self::Error> {
        Self::try_new(record.time, record.censored)
    }
}

impl From<Survival> for SurvivalRecord {
    fn from(survival: Survival) -> Self {
        Self {
            time: survival.time,
            censored: survival.censored,
        }
    }
}

impl Survival {
    /// Creates a survival record.
    ///
    /// # Panics
    ///
    /// Panics if `time` is negative, NaN or infinite.
    #[must_use]
    pub fn new(time: f64, censored: bool) -> Self {
        assert!(
            time.is_finite() && time >= 0.0,
            "survival time must be a finite non-negative number"
        );
        Self { time, censored }
    }

    /// Creates a survival record, rejecting negative or non-finite times.
    pub fn try_new(time: f64, censored: bool) -> Result<Self, InvalidSurvivalTimeError> {
        if time.is_finite() && time >= 0.0 {
            Ok(Self { time, censored })
        } else {
            Err(InvalidSurvivalTimeError { time })
        }
    }

    /// Event observed at `time`.
    #[must_use]
    pub fn observed(time: f64) -> Self {
        Self::new(time, false)
    }

    /// Observation ended at `time` without the event.
    #[must_use]
    pub fn censored(time: f64) -> Self {
        Self::new(time, true)
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn is_censored(&self) -> bool {
        self.censored
    }
}

impl fmt::Display for Survival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.time)?;
        if self.censored {
            write!(f, " (Censored)")?;
        }
        Ok(())
    }
}

/// One cohort of survival records, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurvivalGroup {
    values: Vec<Survival>,
}

impl FromIterator<Survival> for SurvivalGroup {
    fn from_iter<T: IntoIterator<Item = Survival>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl SurvivalGroup {
    #[must_use]
    pub fn new(values: Vec<Survival>) -> Self {
        Self { values }
    }

    pub fn push(&mut self, survival: Survival) {
        self.values.push(survival);
    }

    #[must_use]
    pub fn values(&self) -> &[Survival] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All times, observed or censored.
    #[must_use]
    pub fn all_times(&self) -> Vec<f64> {
        self.values.iter().map(Survival::time).collect()
    }

    #[must_use]
    pub fn observed_times(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter(|s| !s.is_censored())
            .map(Survival::time)
            .collect()
    }

    #[must_use]
    pub fn censored_times(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter(|s| s.is_censored())
            .map(Survival::time)
            .collect()
    }

    /// Number of instances still at risk at `time` (followed for at least `time`).
    #[must_use]
    pub fn num_at_risk(&self, time: f64) -> usize {
        self.values.iter().filter(|s| s.time >= time).count()
    }

    /// Number of observed events exactly at `time`.
    #[expect(clippy::float_cmp)]
    #[must_use]
    pub fn num_events_at(&self, time: f64) -> usize {
        self.values
            .iter()
            .filter(|s| !s.censored && s.time == time)
            .count()
    }
}

impl fmt::Display for SurvivalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, survival) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{survival}")?;
        }
        Ok(())
    }
}

/// Ordered set of cohorts compared against each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurvivalGroups {
    groups: Vec<SurvivalGroup>,
}

impl FromIterator<SurvivalGroup> for SurvivalGroups {
    fn from_iter<T: IntoIterator<Item = SurvivalGroup>>(iter: T) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

impl Extend<SurvivalGroup> for SurvivalGroups {
    fn extend<T: IntoIterator<Item = SurvivalGroup>>(&mut self, iter: T) {
        self.groups.extend(iter);
    }
}

impl SurvivalGroups {
    #[must_use]
    pub fn new(groups: Vec<SurvivalGroup>) -> Self {
        Self { groups }
    }

    pub fn push(&mut self, group: SurvivalGroup) {
        self.groups.push(group);
    }

    #[must_use]
    pub fn groups(&self) -> &[SurvivalGroup] {
        &self.groups
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SurvivalGroup> {
        self.groups.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All times across groups, in group order then insertion order.
    #[must_use]
    pub fn all_times(&self) -> Vec<f64> {
        self.groups.iter().flat_map(SurvivalGroup::all_times).collect()
    }

    /// Observed times across groups, sorted ascending.
    #[must_use]
    pub fn observed_times(&self) -> Vec<f64> {
        let mut times = self
            .groups
            .iter()
            .flat_map(SurvivalGroup::observed_times)
            .collect::<Vec<_>>();
        times.sort_by(f64::total_cmp);
        times
    }

    /// Censored times across groups, sorted ascending.
    #[must_use]
    pub fn censored_times(&self) -> Vec<f64> {
        let mut times = self
            .groups
            .iter()
            .flat_map(SurvivalGroup::censored_times)
            .collect::<Vec<_>>();
        times.sort_by(f64::total_cmp);
        times
    }

    /// Distinct observed event times, sorted ascending.
    #[must_use]
    pub fn event_times(&self) -> Vec<f64> {
        let mut times = self.observed_times();
        times.dedup();
        times
    }
}

impl fmt::Display for SurvivalGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            writeln!(f, "Survival Group {}: {group}", i + 1)?;
        }
        Ok(())
    }
}

/// Kaplan-Meier survival curve for survival analysis.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the study period).
///
/// The curve stores parallel vectors representing the survival function at the
/// times where at least one event was observed.
#[derive(Debug, Clone)]
pub struct KaplanMeierCurve {
    /// Time points where events (non-censored observations) occurred.
    pub times: Vec<f64>,
    /// Survival probability at each corresponding time point.
    pub survival_prob: Vec<f64>,
    /// Number of subjects at risk at each time point.
    pub at_risk: Vec<usize>,
    /// Number of events at each time point.
    pub events: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve from a survival group.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flexeval_stats::survival::{KaplanMeierCurve, Survival, SurvivalGroup};
    /// let group = SurvivalGroup::from_iter([
    ///     Survival::observed(10.0),
    ///     Survival::censored(20.0),
    ///     Survival::observed(30.0),
    /// ]);
    /// let curve = KaplanMeierCurve::from_group(&group);
    /// assert_eq!(curve.times, vec![10.0, 30.0]);
    /// ```
    #[expect(clippy::cast_precision_loss, clippy::float_cmp)]
    #[must_use]
    pub fn from_group(group: &SurvivalGroup) -> Self {
        let mut data = group.values().to_vec();
        data.sort_by(|a, b| a.time().total_cmp(&b.time()));

        let mut times = vec![];
        let mut survival_prob = vec![];
        let mut at_risk_vec = vec![];
        let mut events_vec = vec![];

        let mut current_survival = 1.0;
        let total = data.len();

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].time();
            let at_risk = total - i;

            let mut event_count = 0;
            let mut j = i;
            while j < data.len() && data[j].time() == current_time {
                if !data[j].is_censored() {
                    event_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                current_survival *= 1.0 - (event_count as f64 / at_risk as f64);

                times.push(current_time);
                survival_prob.push(current_survival);
                at_risk_vec.push(at_risk);
                events_vec.push(event_count);
            }

            i = j;
        }

        Self {
            times,
            survival_prob,
            at_risk: at_risk_vec,
            events: events_vec,
        }
    }

    /// Returns the time at which survival first drops to or below 50%,
    /// linearly interpolated between event times.
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&p| p <= 0.5)?;
        if i == 0 {
            return Some(self.times[0]);
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (s0, s1) = (self.survival_prob[i - 1], self.survival_prob[i]);
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Step-function survival probability at `time`.
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        self.times
            .iter()
            .rposition(|&t| t <= time)
            .map_or(1.0, |i| self.survival_prob[i])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn group(records: &[(f64, bool)]) -> SurvivalGroup {
        records.iter().map(|&(t, c)| Survival::new(t, c)).collect()
    }

    #[test]
    fn test_views_preserve_insertion_order() {
        let g = group(&[(9.0, false), (3.0, true), (7.0, false), (1.0, true)]);
        assert_eq!(g.all_times(), vec![9.0, 3.0, 7.0, 1.0]);
        assert_eq!(g.observed_times(), vec![9.0, 7.0]);
        assert_eq!(g.censored_times(), vec![3.0, 1.0]);
    }

    #[test]
    fn test_pooled_views() {
        let groups = SurvivalGroups::from_iter([
            group(&[(5.0, false), (2.0, true)]),
            group(&[(5.0, false), (1.0, false)]),
        ]);
        assert_eq!(groups.all_times(), vec![5.0, 2.0, 5.0, 1.0]);
        assert_eq!(groups.observed_times(), vec![1.0, 5.0, 5.0]);
        assert_eq!(groups.censored_times(), vec![2.0]);
        assert_eq!(groups.event_times(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_at_risk_and_events() {
        let g = group(&[(5.0, false), (8.0, false), (12.0, true), (8.0, true)]);
        assert_eq!(g.num_at_risk(8.0), 3);
        assert_eq!(g.num_events_at(8.0), 1);
        assert_eq!(g.num_events_at(12.0), 0);
    }

    #[test]
    fn test_rejects_negative_time() {
        assert!(Survival::try_new(-1.0, false).is_err());
        assert!(Survival::try_new(f64::NAN, false).is_err());
        assert!(Survival::try_new(0.0, true).is_ok());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Survival = serde_json::from_str(r#"{"time": 4.5, "censored": true}"#).unwrap();
        assert_eq!(ok, Survival::censored(4.5));
        let default_observed: Survival = serde_json::from_str(r#"{"time": 2}"#).unwrap();
        assert!(!default_observed.is_censored());
        assert!(serde_json::from_str::<Survival>(r#"{"time": -2}"#).is_err());
    }

    #[test]
    fn test_display() {
        let g = group(&[(5.0, false), (12.0, true)]);
        assert_eq!(g.to_string(), "5;12 (Censored)");
    }

    #[test]
    fn test_kaplan_meier_with_censoring() {
        let g = group(&[(10.0, false), (20.0, true), (30.0, false), (40.0, false)]);
        let curve = KaplanMeierCurve::from_group(&g);
        assert_eq!(curve.times, vec![10.0, 30.0, 40.0]);
        assert_eq!(curve.at_risk, vec![4, 2, 1]);
        assert_abs_diff_eq!(curve.survival_prob[0], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.survival_prob[1], 0.375, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.survival_prob[2], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.survival_at(25.0), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.survival_at(5.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kaplan_meier_median() {
        let g = group(&[(10.0, false), (20.0, false), (30.0, false), (40.0, false)]);
        let curve = KaplanMeierCurve::from_group(&g);
        assert_abs_diff_eq!(curve.median_survival().unwrap(), 20.0, epsilon = 1e-12);

        let all_censored = group(&[(10.0, true), (20.0, true)]);
        assert!(
            KaplanMeierCurve::from_group(&all_censored)
                .median_survival()
                .is_none()
        );
    }
}
