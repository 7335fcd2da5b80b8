//! Feature spaces, feature rankings and feature-selection diagnostics.
//!
//! - [`instance_table`]: [`InstanceTable`](instance_table::InstanceTable), the
//!   instance-by-feature table exchanged between data sources
//! - [`source`]: The [`DataSource`](source::DataSource) contract for upstream
//!   feature providers
//! - [`aggregate`]: [`FeatureSpaceAggregator`](aggregate::FeatureSpaceAggregator)
//!   merges the feature spaces of several sources into one
//! - [`feature_rank`]: [`FeatureRank`](feature_rank::FeatureRank) and mean ranks
//!   across repeated rankings
//! - [`selector`]: [`SingleVariableBaselineSelector`](selector::SingleVariableBaselineSelector)
//! - [`transform`]: Discretization of a continuous dependent variable
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use flexeval_features::{
//!     aggregate::FeatureSpaceAggregator,
//!     instance_table::InstanceTable,
//!     source::{DataSource, InMemorySource},
//! };
//!
//! let mut clinical = InstanceTable::new();
//! clinical.insert("P1", "Age", "54");
//! let mut genomic = InstanceTable::new();
//! genomic.insert("P1", "Age", "0.3");
//!
//! let sources: Vec<Arc<dyn DataSource>> = vec![
//!     Arc::new(InMemorySource::new("Clinical", clinical)),
//!     Arc::new(InMemorySource::new("Genomic", genomic)),
//! ];
//! let table = FeatureSpaceAggregator::new("Aggregate", sources).build().unwrap();
//! assert_eq!(table.data_point_names(), ["Clinical::Age", "Genomic::Age"]);
//! ```

pub mod aggregate;
pub mod feature_rank;
pub mod instance_table;
pub mod selector;
pub mod source;
pub mod transform;
