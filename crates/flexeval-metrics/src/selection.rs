//! Choosing the best of several measured candidates.
//!
//! Candidates are compared pairwise through
//! [`ResultMeasurer::beats`](crate::measurer::ResultMeasurer::beats).
//! Ties for the best score resolve to the median candidate by key.

use crate::{MeasureError, measurer::ResultMeasurer};

/// Picks the best of several measured candidates.
///
/// The winner is the candidate no other candidate beats. When several
/// candidates tie for the best score they are sorted by key and the middle
/// one (index `n / 2`) is chosen, so that e.g. among equally good thresholds
/// the median threshold wins. Returns `None` for no candidates.
///
/// # Examples
///
/// ```
/// use flexeval_metrics::{
///     measurer::AucResultMeasurer,
///     prediction::{Prediction, Predictions},
///     selection::select_best,
/// };
///
/// let measurer = |yes_score: f64| {
///     AucResultMeasurer::new(Predictions::from_iter([
///         Prediction::new("a", "yes", "yes").with_score("yes", yes_score).with_score("no", 0.5),
///         Prediction::new("b", "no", "no").with_score("yes", 0.5).with_score("no", 0.5),
///     ]))
/// };
/// let candidates = vec![(1, measurer(0.1)), (2, measurer(0.9)), (3, measurer(0.9))];
/// let (key, _) = select_best(candidates).unwrap().unwrap();
/// assert_eq!(key, 3);
/// ```
pub fn select_best<K, M>(mut candidates: Vec<(K, M)>) -> Result<Option<(K, M)>, MeasureError>
where
    K: Ord,
    M: ResultMeasurer,
{
    let mut best = Vec::<usize>::new();
    for index in 0..candidates.len() {
        let Some(&leader) = best.first() else {
            best.push(index);
            continue;
        };
        let (_, candidate) = &candidates[index];
        let (_, leading) = &candidates[leader];
        if candidate.beats(leading)? {
            best.clear();
            best.push(index);
        } else if candidate.ties(leading)? {
            best.push(index);
        }
    }

    best.sort_by(|&a, &b| candidates[a].0.cmp(&candidates[b].0));
    let Some(&winner) = best.get(best.len() / 2) else {
        return Ok(None);
    };
    tracing::debug!(ties = best.len(), "selected best candidate");
    Ok(Some(candidates.swap_remove(winner)))
}
