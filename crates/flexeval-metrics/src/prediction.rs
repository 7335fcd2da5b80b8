//! Predictions made by a model for a set of instances.
//!
//! Each [`Prediction`] carries the actual class of an instance, the class the
//! model predicted, and the score the model assigned to each class. The
//! collection is consumed read-only by the scoring code.
//!
//! # Serialization
//!
//! ```json
//! [
//!   { "instance_id": "P1", "actual": "LTS", "predicted": "LTS",
//!     "scores": { "LTS": 0.8, "STS": 0.2 } }
//! ]
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Prediction for the dependent variable of one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub instance_id: String,
    /// Actual class of the instance.
    pub actual: String,
    /// Class the model predicted.
    pub predicted: String,
    /// Score (typically a probability) the model assigned to each class.
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl Prediction {
    #[must_use]
    pub fn new(
        instance_id: impl Into<String>,
        actual: impl Into<String>,
        predicted: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            actual: actual.into(),
            predicted: predicted.into(),
            scores: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_score(mut self, label: impl Into<String>, score: f64) -> Self {
        self.scores.insert(label.into(), score);
        self
    }

    #[must_use]
    pub fn was_correct(&self) -> bool {
        self.actual == self.predicted
    }

    #[must_use]
    pub fn score(&self, label: &str) -> Option<f64> {
        self.scores.get(label).copied()
    }
}

/// Ordered collection of predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions {
    predictions: Vec<Prediction>,
}

impl FromIterator<Prediction> for Predictions {
    fn from_iter<T: IntoIterator<Item = Prediction>>(iter: T) -> Self {
        Self {
            predictions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Predictions {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.iter()
    }
}

impl Extend<Prediction> for Predictions {
    fn extend<T: IntoIterator<Item = Prediction>>(&mut self, iter: T) {
        self.predictions.extend(iter);
    }
}

impl Predictions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prediction: Prediction) {
        self.predictions.push(prediction);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.predictions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Instance ids in first-seen order, without duplicates.
    #[must_use]
    pub fn instance_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.predictions
            .iter()
            .map(|p| p.instance_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Distinct actual classes, sorted.
    #[must_use]
    pub fn unique_actual_labels(&self) -> Vec<&str> {
        self.predictions
            .iter()
            .map(|p| p.actual.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct predicted classes, sorted.
    #[must_use]
    pub fn unique_predicted_labels(&self) -> Vec<&str> {
        self.predictions
            .iter()
            .map(|p| p.predicted.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct classes appearing as either actual or predicted, sorted.
    #[must_use]
    pub fn unique_labels(&self) -> Vec<&str> {
        self.predictions
            .iter()
            .flat_map(|p| [p.actual.as_str(), p.predicted.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Predictions for the given instances, in this collection's order.
    #[must_use]
    pub fn for_instances<S>(&self, instance_ids: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let wanted = instance_ids.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
        self.predictions
            .iter()
            .filter(|p| wanted.contains(p.instance_id.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Predictions {
        Predictions::from_iter([
            Prediction::new("b", "Y", "N"),
            Prediction::new("a", "N", "N"),
            Prediction::new("b", "Y", "Y"),
            Prediction::new("c", "Y", "Y"),
        ])
    }

    #[test]
    fn test_instance_ids_keep_first_seen_order() {
        assert_eq!(sample().instance_ids(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_unique_labels_are_sorted() {
        let predictions = sample();
        assert_eq!(predictions.unique_actual_labels(), vec!["N", "Y"]);
        assert_eq!(predictions.unique_predicted_labels(), vec!["N", "Y"]);
        let skewed = Predictions::from_iter([Prediction::new("x", "A", "C")]);
        assert_eq!(skewed.unique_labels(), vec!["A", "C"]);
    }

    #[test]
    fn test_for_instances() {
        let subset = sample().for_instances(&["b"]);
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|p| p.instance_id == "b"));
    }

    #[test]
    fn test_was_correct() {
        let predictions = sample();
        let correct = predictions.iter().filter(|p| p.was_correct()).count();
        assert_eq!(correct, 3);
    }

    #[test]
    fn test_deserialize_without_scores() {
        let json = r#"[{"instance_id": "p1", "actual": "A", "predicted": "B"}]"#;
        let predictions: Predictions = serde_json::from_str(json).unwrap();
        assert_eq!(predictions.len(), 1);
        assert!(predictions.iter().next().unwrap().scores.is_empty());
    }
}
