//! Merging the feature spaces of several data sources.
//!
//! Every feature name is prefixed with the description of the source it came
//! from, so sources may reuse feature names freely:
//!
//! ```text
//! Clinical: Age, Stage      ┐
//!                            ├─> Clinical::Age, Clinical::Stage, Genomic::Age
//! Genomic:  Age             ┘
//! ```
//!
//! Sources of kind [`SourceKind::Aggregate`] are skipped, so an aggregator
//! never aggregates another aggregator (or itself). Each source's own
//! missing-data tolerance is applied before merging; the aggregator adds no
//! filtering of its own.

use std::sync::Arc;

use crate::{
    instance_table::{InstanceTable, MissingDataTolerance},
    source::{DataSource, DataSourceError, SourceKind},
};

/// Default separator between a source description and a feature name.
pub const DEFAULT_SEPARATOR: &str = "::";

/// Aggregation failed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum AggregateError {
    #[display("feature '{feature}' is produced by more than one source")]
    SourceConflict { feature: String },
    #[display("source '{description}' failed: {cause}")]
    Source {
        description: String,
        #[error(source)]
        cause: DataSourceError,
    },
}

/// Combines the instances of every non-aggregate source into one table.
pub struct FeatureSpaceAggregator {
    description: String,
    sources: Vec<Arc<dyn DataSource>>,
    separator: String,
}

impl FeatureSpaceAggregator {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        sources: impl IntoIterator<Item = Arc<dyn DataSource>>,
    ) -> Self {
        Self {
            description: description.into(),
            sources: sources.into_iter().collect(),
            separator: DEFAULT_SEPARATOR.to_owned(),
        }
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Builds the aggregated table.
    ///
    /// Instances appear in the order they are first seen across sources.
    /// Fails with [`AggregateError::SourceConflict`] if two sources produce
    /// the same prefixed feature name.
    pub fn build(&self) -> Result<InstanceTable, AggregateError> {
        let mut aggregate = InstanceTable::new();
        for source in &self.sources {
            let description = source.description();
            if source.kind() == SourceKind::Aggregate {
                tracing::debug!(source = description, "skipping aggregate source");
                continue;
            }

            let mut instances = source
                .analysis_instances()
                .map_err(|cause| AggregateError::Source {
                    description: description.to_owned(),
                    cause,
                })?;
            instances.prefix_data_point_names(&format!("{description}{}", self.separator));

            if let Some(feature) = instances
                .data_point_names()
                .iter()
                .find(|name| aggregate.contains_data_point(name))
            {
                return Err(AggregateError::SourceConflict {
                    feature: feature.clone(),
                });
            }

            tracing::debug!(
                source = description,
                instances = instances.len(),
                data_points = instances.num_data_points(),
                "aggregating source"
            );
            aggregate.merge(instances);
        }
        Ok(aggregate)
    }
}

impl DataSource for FeatureSpaceAggregator {
    fn description(&self) -> &str {
        &self.description
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Aggregate
    }

    fn missing_tolerance(&self) -> MissingDataTolerance {
        MissingDataTolerance::ALLOW_ALL
    }

    fn transformed_instances(&self) -> Result<InstanceTable, DataSourceError> {
        Ok(self.build()?)
    }
}
