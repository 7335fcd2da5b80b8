use std::collections::{BTreeMap, HashMap};

use flexeval_stats::survival::{Survival, SurvivalGroup, SurvivalGroups};

use crate::{MeasureError, prediction::Predictions};

/// Survival groups formed by the class each instance was predicted as.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedSurvivalGroups {
    labels: Vec<String>,
    groups: SurvivalGroups,
}

impl PredictedSurvivalGroups {
    /// Groups the survival record of every predicted instance by predicted
    /// class. Groups are ordered by class label.
    ///
    /// Fails with [`MeasureError::MissingSurvival`] when an instance has no
    /// survival record.
    pub fn from_predictions(
        predictions: &Predictions,
        survivals: &HashMap<String, Survival>,
    ) -> Result<Self, MeasureError> {
        let mut by_label = BTreeMap::<&str, SurvivalGroup>::new();
        for prediction in predictions {
            let survival = survivals.get(&prediction.instance_id).ok_or_else(|| {
                MeasureError::MissingSurvival {
                    instance_id: prediction.instance_id.clone(),
                }
            })?;
            by_label
                .entry(prediction.predicted.as_str())
                .or_default()
                .push(*survival);
        }

        let (labels, groups) = by_label
            .into_iter()
            .map(|(label, group)| (label.to_owned(), group))
            .unzip::<_, _, Vec<_>, SurvivalGroups>();
        Ok(Self { labels, groups })
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn groups(&self) -> &SurvivalGroups {
        &self.groups
    }

    #[must_use]
    pub fn into_groups(self) -> SurvivalGroups {
        self.groups
    }

    /// Pairs of class label and its group.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SurvivalGroup)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.groups.groups())
    }
}
