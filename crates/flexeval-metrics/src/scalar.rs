//! Labelled statistics as they appear in reports.
//!
//! A [`ScalarValue`] pairs a [`Scalar`] with the description of what was
//! measured and the name of the metric. Reports render one per line, with
//! the fields joined by [`DELIMITER`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator placed between the fields of a rendered [`ScalarValue`].
pub const DELIMITER: &str = "\t";

/// Value of a reported statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(untagged)]
pub enum Scalar {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<usize> for Scalar {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Integer)
    }
}

impl Scalar {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Flag(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// A computed statistic, labelled with what it describes and which metric it is.
///
/// Rendered as `description`, `metric` and `value` joined by [`DELIMITER`].
///
/// # Examples
///
/// ```
/// use flexeval_metrics::scalar::ScalarValue;
///
/// let value = ScalarValue::new("Model", "AUC", 0.75);
/// assert_eq!(value.to_string(), "Model\tAUC\t0.75");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarValue {
    description: String,
    metric: String,
    value: Scalar,
}

impl ScalarValue {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        metric: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Self {
        Self {
            description: description.into(),
            metric: metric.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    #[must_use]
    pub fn value(&self) -> &Scalar {
        &self.value
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.description, self.metric, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_fields() {
        assert_eq!(
            ScalarValue::new("Clinical", "Number instances", 12_usize).to_string(),
            "Clinical\tNumber instances\t12"
        );
        assert_eq!(
            ScalarValue::new("Clinical", "Converged", true).to_string(),
            "Clinical\tConverged\ttrue"
        );
        assert_eq!(
            ScalarValue::new("Clinical", "Algorithm", "weka.classifiers.trees.J48").to_string(),
            "Clinical\tAlgorithm\tweka.classifiers.trees.J48"
        );
    }

    #[test]
    fn test_serde_keeps_value_untagged() {
        let value = ScalarValue::new("Model", "AUC", 0.5);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"description": "Model", "metric": "AUC", "value": 0.5})
        );
        let back: ScalarValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Scalar::from(3_i64).as_f64(), Some(3.0));
        assert_eq!(Scalar::from(0.25).as_f64(), Some(0.25));
        assert_eq!(Scalar::from("x").as_f64(), None);
    }
}
