use std::fmt;

use flexeval_features::instance_table::{InstanceTable, MissingDataTolerance};
use serde::Deserialize;

/// One data source in an aggregation input file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    /// Source name, used as feature name prefix
    pub description: String,
    /// Missing data accepted before aggregation (defaults to 0.5/0.5)
    #[serde(default)]
    pub tolerance: Option<MissingDataTolerance>,
    pub instances: InstanceTable,
}

/// A raw dependent-variable value, given as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(value) => write!(f, "{value}"),
            RawValue::Text(value) => f.write_str(value),
        }
    }
}
