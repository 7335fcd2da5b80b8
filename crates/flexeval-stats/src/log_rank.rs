//! Log-rank test for comparing survival distributions.
//!
//! The test pools the distinct observed event times of all groups. At each
//! event time `t` it counts, per group, the deaths `d_g` and the instances at
//! risk `n_g` (followed for at least `t`), and accumulates the deaths expected
//! under the null hypothesis that every group shares one hazard:
//!
//! ```text
//! E_g += d * n_g / n        (d, n = totals over all groups at t)
//! ```
//!
//! # Statistic
//!
//! - **Two groups**: the classic form `(Σ (O_1 − E_1))² / Σ V`, with the
//!   hypergeometric variance `V = n_1 n_2 d (n − d) / (n² (n − 1))` per event time.
//!   This matches the two-sample test reported by R's `survdiff`.
//! - **More than two groups**: `Σ_g (O_g − E_g)² / E_g`.
//!
//! Both are compared against a chi-square distribution with `groups − 1`
//! degrees of freedom (see [`LogRankTest::p_value`]).

use crate::{
    InsufficientDataError, distribution,
    survival::{SurvivalGroup, SurvivalGroups},
};

/// Outcome of a log-rank test over two or more survival groups.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRankTest {
    /// Chi-square test statistic.
    pub statistic: f64,
    /// Number of groups minus one.
    pub degrees_of_freedom: usize,
    /// Observed events per group.
    pub observed: Vec<f64>,
    /// Expected events per group under the null hypothesis.
    pub expected: Vec<f64>,
}

impl LogRankTest {
    /// Runs the log-rank test.
    ///
    /// Fails when fewer than two groups are given, a group is empty, a group
    /// is never at risk at any event time, no event is observed at all, or
    /// (two groups) the variance vanishes.
    ///
    /// # Examples
    ///
    /// ```
    /// use flexeval_stats::{
    ///     log_rank::LogRankTest,
    ///     survival::{Survival, SurvivalGroup, SurvivalGroups},
    /// };
    ///
    /// let group = SurvivalGroup::from_iter([
    ///     Survival::observed(5.0),
    ///     Survival::observed(8.0),
    ///     Survival::censored(12.0),
    /// ]);
    /// let groups = SurvivalGroups::from_iter([group.clone(), group]);
    ///
    /// let test = LogRankTest::compute(&groups).unwrap();
    /// assert!(test.statistic.abs() < 1e-12);
    /// assert_eq!(test.degrees_of_freedom, 1);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn compute(groups: &SurvivalGroups) -> Result<Self, InsufficientDataError> {
        validate(groups)?;

        let event_times = groups.event_times();
        if event_times.is_empty() {
            return Err(InsufficientDataError::NoObservedEvents);
        }

        let num_groups = groups.len();
        let mut observed = vec![0.0; num_groups];
        let mut expected = vec![0.0; num_groups];
        let mut ever_at_risk = vec![false; num_groups];
        let mut variance = 0.0;

        for &time in &event_times {
            let at_risk = groups
                .groups()
                .iter()
                .map(|g| g.num_at_risk(time) as f64)
                .collect::<Vec<_>>();
            let events = groups
                .groups()
                .iter()
                .map(|g| g.num_events_at(time) as f64)
                .collect::<Vec<_>>();
            let n = at_risk.iter().sum::<f64>();
            let d = events.iter().sum::<f64>();

            for g in 0..num_groups {
                observed[g] += events[g];
                expected[g] += d * at_risk[g] / n;
                ever_at_risk[g] |= at_risk[g] > 0.0;
            }

            if num_groups == 2 && n > 1.0 {
                variance += at_risk[0] * at_risk[1] * d * (n - d) / (n * n * (n - 1.0));
            }
        }

        if let Some(index) = ever_at_risk.iter().position(|at_risk| !at_risk) {
            return Err(InsufficientDataError::NeverAtRisk { index });
        }

        let statistic = if num_groups == 2 {
            if variance <= 0.0 {
                return Err(InsufficientDataError::ZeroVariance);
            }
            (observed[0] - expected[0]).powi(2) / variance
        } else {
            observed
                .iter()
                .zip(&expected)
                .map(|(o, e)| (o - e).powi(2) / e)
                .sum()
        };

        tracing::trace!(
            groups = num_groups,
            event_times = event_times.len(),
            statistic,
            "computed log-rank statistic"
        );

        Ok(Self {
            statistic,
            degrees_of_freedom: num_groups - 1,
            observed,
            expected,
        })
    }

    /// Upper-tail chi-square probability of the statistic.
    #[must_use]
    pub fn p_value(&self) -> f64 {
        distribution::chi_square_survival(self.statistic, self.degrees_of_freedom)
    }
}

fn validate(groups: &SurvivalGroups) -> Result<(), InsufficientDataError> {
    if groups.len() < 2 {
        return Err(InsufficientDataError::TooFewGroups {
            count: groups.len(),
        });
    }
    if let Some(index) = groups.groups().iter().position(SurvivalGroup::is_empty) {
        return Err(InsufficientDataError::EmptyGroup { index });
    }
    Ok(())
}

/// Computes the log-rank test statistic for two or more survival groups.
pub fn log_rank_statistic(groups: &SurvivalGroups) -> Result<f64, InsufficientDataError> {
    LogRankTest::compute(groups).map(|test| test.statistic)
}

/// Computes the p-value of the log-rank test for two or more survival groups.
pub fn log_rank_p_value(groups: &SurvivalGroups) -> Result<f64, InsufficientDataError> {
    LogRankTest::compute(groups).map(|test| test.p_value())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::survival::Survival;

    fn group(records: &[(f64, bool)]) -> SurvivalGroup {
        records.iter().map(|&(t, c)| Survival::new(t, c)).collect()
    }

    fn observed(times: &[f64]) -> SurvivalGroup {
        times.iter().copied().map(Survival::observed).collect()
    }

    #[test]
    fn test_identical_groups_have_zero_statistic() {
        let g = group(&[(5.0, false), (8.0, false), (12.0, true)]);
        let groups = SurvivalGroups::from_iter([g.clone(), g]);
        let test = LogRankTest::compute(&groups).unwrap();
        assert_abs_diff_eq!(test.statistic, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(test.p_value(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_separated_groups() {
        let groups = SurvivalGroups::from_iter([
            observed(&[2.0, 4.0, 6.0]),
            observed(&[10.0, 12.0, 14.0]),
        ]);
        let test = LogRankTest::compute(&groups).unwrap();
        // O1 = 3, E1 = 0.5 + 0.4 + 0.25, V = 0.25 + 0.24 + 0.1875
        let expected_statistic = (3.0_f64 - 1.15).powi(2) / 0.6775;
        assert_abs_diff_eq!(test.statistic, expected_statistic, epsilon = 1e-9);
        assert_abs_diff_eq!(test.observed[0], 3.0);
        assert_abs_diff_eq!(test.expected[0], 1.15, epsilon = 1e-12);
        assert!(test.p_value() < 0.05);
    }

    #[test]
    fn test_statistic_is_symmetric_in_group_order() {
        let a = group(&[(3.0, false), (5.0, true), (9.0, false), (11.0, false)]);
        let b = group(&[(4.0, false), (6.0, false), (7.0, true)]);
        let forward = log_rank_statistic(&SurvivalGroups::from_iter([a.clone(), b.clone()]));
        let backward = log_rank_statistic(&SurvivalGroups::from_iter([b, a]));
        assert_abs_diff_eq!(forward.unwrap(), backward.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_multiple_groups() {
        let groups = SurvivalGroups::from_iter([
            observed(&[1.0, 2.0]),
            observed(&[3.0, 4.0]),
            observed(&[5.0, 6.0]),
        ]);
        let test = LogRankTest::compute(&groups).unwrap();
        assert_eq!(test.degrees_of_freedom, 2);
        assert_abs_diff_eq!(test.observed.iter().sum::<f64>(), 6.0);
        assert_abs_diff_eq!(test.expected.iter().sum::<f64>(), 6.0, epsilon = 1e-12);
        let manual = test
            .observed
            .iter()
            .zip(&test.expected)
            .map(|(o, e)| (o - e).powi(2) / e)
            .sum::<f64>();
        assert_abs_diff_eq!(test.statistic, manual, epsilon = 1e-12);
        assert!(test.statistic > 0.0);
    }

    #[test]
    fn test_too_few_groups() {
        let groups = SurvivalGroups::from_iter([observed(&[1.0, 2.0])]);
        assert_eq!(
            log_rank_statistic(&groups),
            Err(InsufficientDataError::TooFewGroups { count: 1 })
        );
    }

    #[test]
    fn test_empty_group() {
        let groups = SurvivalGroups::from_iter([observed(&[1.0]), SurvivalGroup::default()]);
        assert_eq!(
            log_rank_statistic(&groups),
            Err(InsufficientDataError::EmptyGroup { index: 1 })
        );
    }

    #[test]
    fn test_group_never_at_risk() {
        // group 1 is censored before the only event time
        let groups = SurvivalGroups::from_iter([observed(&[10.0]), group(&[(2.0, true)])]);
        assert_eq!(
            log_rank_statistic(&groups),
            Err(InsufficientDataError::NeverAtRisk { index: 1 })
        );
    }

    #[test]
    fn test_no_events() {
        let groups = SurvivalGroups::from_iter([group(&[(1.0, true)]), group(&[(2.0, true)])]);
        assert_eq!(
            log_rank_statistic(&groups),
            Err(InsufficientDataError::NoObservedEvents)
        );
    }
}
