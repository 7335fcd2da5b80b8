//! Dependent-variable transformers.
//!
//! A transformer maps the raw value of the dependent variable (for example a
//! survival time in days) to the class a classifier predicts. The threshold
//! transformers split a continuous value into a "low" and a "high" class:
//! values above the threshold map to the low descriptor, all others to the
//! high descriptor. For survival times that reads naturally as long-term
//! (`LTS`) versus short-term (`STS`) survivors.
//!
//! [`MISSING_VALUE`] passes through every transformer unchanged.

use flexeval_stats::descriptive;

use crate::instance_table::MISSING_VALUE;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TransformError {
    #[display("dependent variable value '{value}' is not numeric")]
    NotNumeric { value: String },
    #[display("no dependent variable values to take the median of")]
    NoValues,
}

/// Maps raw dependent-variable values to class labels.
pub trait DependentVariableTransformer {
    fn description(&self) -> String;

    fn transform(&self, raw: &str) -> Result<String, TransformError>;
}

/// Leaves values unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl DependentVariableTransformer for IdentityTransformer {
    fn description(&self) -> String {
        "Identity".to_owned()
    }

    fn transform(&self, raw: &str) -> Result<String, TransformError> {
        Ok(raw.to_owned())
    }
}

/// Splits a numeric value at a fixed threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTransformer {
    threshold: f64,
    low: String,
    high: String,
}

impl ThresholdTransformer {
    #[must_use]
    pub fn new(threshold: f64, low: impl Into<String>, high: impl Into<String>) -> Self {
        Self {
            threshold,
            low: low.into(),
            high: high.into(),
        }
    }

    /// Survival beyond two years (730 days) is `LTS`, otherwise `STS`.
    #[must_use]
    pub fn two_year_survival() -> Self {
        Self::new(730.0, "LTS", "STS")
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl DependentVariableTransformer for ThresholdTransformer {
    fn description(&self) -> String {
        format!("Threshold {}", self.threshold)
    }

    fn transform(&self, raw: &str) -> Result<String, TransformError> {
        if raw == MISSING_VALUE {
            return Ok(raw.to_owned());
        }
        let value = parse(raw)?;
        let label = if value > self.threshold {
            &self.low
        } else {
            &self.high
        };
        Ok(label.clone())
    }
}

/// Splits a numeric value at the median of a reference set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianTransformer {
    inner: ThresholdTransformer,
}

impl MedianTransformer {
    /// Uses the median of the numeric `raw_values` as threshold. Missing
    /// values are ignored.
    pub fn from_raw_values<'a, I>(
        raw_values: I,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Result<Self, TransformError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values = raw_values
            .into_iter()
            .filter(|raw| *raw != MISSING_VALUE)
            .map(parse)
            .collect::<Result<Vec<_>, _>>()?;
        let median = descriptive::median(values).ok_or(TransformError::NoValues)?;
        tracing::debug!(median, "median dependent variable threshold");
        Ok(Self {
            inner: ThresholdTransformer::new(median, low, high),
        })
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.inner.threshold
    }
}

impl DependentVariableTransformer for MedianTransformer {
    fn description(&self) -> String {
        format!("Median {}", self.inner.threshold)
    }

    fn transform(&self, raw: &str) -> Result<String, TransformError> {
        self.inner.transform(raw)
    }
}

fn parse(raw: &str) -> Result<f64, TransformError> {
    raw.trim()
        .parse()
        .map_err(|_| TransformError::NotNumeric {
            value: raw.to_owned(),
        })
}
