use std::convert::Infallible;

use crate::instance_table::InstanceTable;

/// Feature selection failed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SelectorError {
    #[display("iteration {index} is out of range for {available} features")]
    IndexOutOfRange { index: usize, available: usize },
    #[display("{operation} is not supported by {selector}")]
    Unsupported {
        selector: &'static str,
        operation: &'static str,
    },
}

/// Picks exactly one feature per iteration: the `iteration`-th feature in
/// alphabetical order.
///
/// Running one iteration per feature benchmarks whether any single variable
/// predicts as well as a full model. The selector only selects; it cannot
/// train a model.
///
/// # Examples
///
/// ```
/// use flexeval_features::selector::{SelectorError, SingleVariableBaselineSelector};
///
/// let selector = SingleVariableBaselineSelector;
/// assert_eq!(selector.select_features(2, ["z", "a", "m"]).unwrap(), ["m"]);
/// assert_eq!(
///     selector.select_features(4, ["z", "a", "m"]),
///     Err(SelectorError::IndexOutOfRange { index: 4, available: 3 })
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct SingleVariableBaselineSelector;

impl SingleVariableBaselineSelector {
    pub const NAME: &'static str = "SingleVariableBaselineSelector";

    /// Selects the feature at the 1-based `iteration` among the available
    /// feature names sorted ascending. Duplicate names count once.
    #[expect(clippy::unused_self)]
    pub fn select_features<I>(
        &self,
        iteration: usize,
        available: I,
    ) -> Result<Vec<String>, SelectorError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut features = available.into_iter().map(Into::into).collect::<Vec<String>>();
        features.sort_unstable();
        features.dedup();

        let out_of_range = || SelectorError::IndexOutOfRange {
            index: iteration,
            available: features.len(),
        };
        let position = iteration.checked_sub(1).ok_or_else(out_of_range)?;
        let feature = features.get(position).ok_or_else(out_of_range)?;
        Ok(vec![feature.clone()])
    }

    /// Training is not supported; this always fails.
    #[expect(clippy::unused_self)]
    pub fn train(&self, _training: &InstanceTable) -> Result<Infallible, SelectorError> {
        Err(SelectorError::Unsupported {
            selector: Self::NAME,
            operation: "train",
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_sorted_position() {
        let selector = SingleVariableBaselineSelector;
        let available = ["z", "a", "m"];
        assert_eq!(selector.select_features(1, available).unwrap(), ["a"]);
        assert_eq!(selector.select_features(2, available).unwrap(), ["m"]);
        assert_eq!(selector.select_features(3, available).unwrap(), ["z"]);
    }

    #[test]
    fn test_out_of_range() {
        let selector = SingleVariableBaselineSelector;
        assert_eq!(
            selector.select_features(4, ["z", "a", "m"]),
            Err(SelectorError::IndexOutOfRange {
                index: 4,
                available: 3
            })
        );
        assert_eq!(
            selector.select_features(0, ["a"]),
            Err(SelectorError::IndexOutOfRange {
                index: 0,
                available: 1
            })
        );
        assert!(selector.select_features(1, Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_train_is_unsupported() {
        let error = SingleVariableBaselineSelector
            .train(&InstanceTable::new())
            .unwrap_err();
        assert!(matches!(
            error,
            SelectorError::Unsupported {
                operation: "train",
                ..
            }
        ));
    }

    proptest! {
        #[test]
        fn selects_one_available_feature(
            features in prop::collection::btree_set("[a-z]{1,6}", 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let iteration = pick.index(features.len()) + 1;
            let selected = SingleVariableBaselineSelector
                .select_features(iteration, features.iter().cloned())
                .unwrap();
            prop_assert_eq!(selected.len(), 1);
            // a BTreeSet iterates in sorted order
            prop_assert_eq!(features.iter().nth(iteration - 1), Some(&selected[0]));
        }
    }
}
