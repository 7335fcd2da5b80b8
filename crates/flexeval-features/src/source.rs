use crate::{
    aggregate::AggregateError,
    instance_table::{InstanceTable, MissingDataTolerance},
};

/// An upstream source could not produce its instances.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DataSourceError {
    #[display("{message}")]
    Failed { message: String },
    /// An aggregate source could not combine its own sources.
    #[display("{_0}")]
    Aggregate(#[error(source)] Box<AggregateError>),
}

impl DataSourceError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl From<AggregateError> for DataSourceError {
    fn from(error: AggregateError) -> Self {
        Self::Aggregate(Box::new(error))
    }
}

/// Whether a source provides its own features or combines other sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Independent,
    Aggregate,
}

/// A provider of independent-variable features.
pub trait DataSource {
    /// Human-readable name, also used to prefix aggregated feature names.
    fn description(&self) -> &str;

    fn kind(&self) -> SourceKind;

    /// How much missing data this source accepts.
    fn missing_tolerance(&self) -> MissingDataTolerance {
        MissingDataTolerance::default()
    }

    /// The source's instances after its own transformations.
    fn transformed_instances(&self) -> Result<InstanceTable, DataSourceError>;

    /// [`transformed_instances`](Self::transformed_instances) with sparse data
    /// removed according to [`missing_tolerance`](Self::missing_tolerance).
    fn analysis_instances(&self) -> Result<InstanceTable, DataSourceError> {
        let mut instances = self.transformed_instances()?;
        self.missing_tolerance().apply(&mut instances);
        Ok(instances)
    }
}

/// A source backed by an already loaded table.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    description: String,
    instances: InstanceTable,
    tolerance: MissingDataTolerance,
}

impl InMemorySource {
    #[must_use]
    pub fn new(description: impl Into<String>, instances: InstanceTable) -> Self {
        Self {
            description: description.into(),
            instances,
            tolerance: MissingDataTolerance::default(),
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: MissingDataTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl DataSource for InMemorySource {
    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Independent
    }

    fn missing_tolerance(&self) -> MissingDataTolerance {
        self.tolerance
    }

    fn transformed_instances(&self) -> Result<InstanceTable, DataSourceError> {
        Ok(self.instances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_instances_apply_tolerance() {
        let mut table = InstanceTable::new();
        table.insert("P1", "Age", "54");
        table.insert("P1", "Stage", "?");
        table.insert("P2", "Age", "?");
        table.insert("P2", "Stage", "?");

        let strict = InMemorySource::new("Clinical", table.clone());
        let analysis = strict.analysis_instances().unwrap();
        assert_eq!(analysis.instance_ids(), ["P1"]);
        assert_eq!(analysis.data_point_names(), ["Age"]);

        let lenient = strict.with_tolerance(MissingDataTolerance::ALLOW_ALL);
        assert_eq!(lenient.analysis_instances().unwrap(), table);
    }
}
