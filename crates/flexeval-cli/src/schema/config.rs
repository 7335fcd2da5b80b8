use flexeval_features::{aggregate::DEFAULT_SEPARATOR, instance_table::MISSING_VALUE};
use serde::{Deserialize, Serialize};

/// Settings shared by every command.
///
/// Every field is optional in the JSON file; absent fields take their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Description attached to reported scalar values
    pub description: String,
    /// Class for values above a discretization threshold
    pub low_descriptor: String,
    /// Class for values at or below a discretization threshold
    pub high_descriptor: String,
    /// Marker for missing values in input files
    pub missing_value: String,
    /// Separator between a source description and a feature name
    pub separator: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            description: "Model".to_owned(),
            low_descriptor: "LTS".to_owned(),
            high_descriptor: "STS".to_owned(),
            missing_value: MISSING_VALUE.to_owned(),
            separator: DEFAULT_SEPARATOR.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_take_defaults() {
        let config: EvalConfig = serde_json::from_str(r#"{"missing_value": "NA"}"#).unwrap();
        assert_eq!(config.missing_value, "NA");
        assert_eq!(config.low_descriptor, "LTS");
        assert_eq!(config.high_descriptor, "STS");
        assert_eq!(config.separator, "::");
        assert_eq!(config.description, "Model");
    }
}
