//! Instance-by-feature tables.
//!
//! Values are kept as strings, exactly as upstream sources produced them. A
//! cell that was never set, or that holds [`MISSING_VALUE`], counts as
//! missing.
//!
//! # Serialization
//!
//! A table is serialized as a list of rows, in instance order:
//!
//! ```json
//! [
//!   { "id": "P1", "values": { "Age": "54", "Stage": "II" } },
//!   { "id": "P2", "values": { "Age": "61", "Stage": "?" } }
//! ]
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Marker for a value that is not available.
pub const MISSING_VALUE: &str = "?";

/// Largest proportions of missing values a source accepts.
///
/// An instance missing more than `per_instance` of its values, or a data
/// point missing in more than `per_data_point` of the instances, is dropped.
/// A proportion of `1.0` disables that filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissingDataTolerance {
    pub per_instance: f64,
    pub per_data_point: f64,
}

impl Default for MissingDataTolerance {
    fn default() -> Self {
        Self {
            per_instance: 0.5,
            per_data_point: 0.5,
        }
    }
}

impl MissingDataTolerance {
    /// Accepts any amount of missing data.
    pub const ALLOW_ALL: Self = Self {
        per_instance: 1.0,
        per_data_point: 1.0,
    };

    /// Removes sparse data points, then sparse instances.
    pub fn apply(&self, table: &mut InstanceTable) {
        let data_points = table.remove_sparse_data_points(self.per_data_point);
        let instances = table.remove_sparse_instances(self.per_instance);
        if data_points + instances > 0 {
            tracing::debug!(data_points, instances, "removed sparse data");
        }
    }
}

/// Instances and their feature values, both kept in first-inserted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<InstanceRow>", into = "Vec<InstanceRow>")]
pub struct InstanceTable {
    instance_ids: Vec<String>,
    data_point_names: Vec<String>,
    data_point_index: HashSet<String>,
    values: HashMap<String, HashMap<String, String>>,
}

/// One serialized row of an [`InstanceTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRow {
    pub id: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl From<Vec<InstanceRow>> for InstanceTable {
    fn from(rows: Vec<InstanceRow>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.add_instance(&row.id);
            for (name, value) in row.values {
                table.insert(&row.id, name, value);
            }
        }
        table
    }
}

impl From<InstanceTable> for Vec<InstanceRow> {
    fn from(mut table: InstanceTable) -> Self {
        table
            .instance_ids
            .iter()
            .map(|id| InstanceRow {
                id: id.clone(),
                values: table.values.remove(id).unwrap_or_default().into_iter().collect(),
            })
            .collect()
    }
}

impl InstanceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an instance with no values, if not already present.
    pub fn add_instance(&mut self, instance_id: &str) {
        if !self.values.contains_key(instance_id) {
            self.instance_ids.push(instance_id.to_owned());
            self.values.insert(instance_id.to_owned(), HashMap::new());
        }
    }

    /// Sets one value, adding the instance and the data point as needed.
    pub fn insert(
        &mut self,
        instance_id: impl Into<String>,
        data_point: impl Into<String>,
        value: impl Into<String>,
    ) {
        let instance_id = instance_id.into();
        let data_point = data_point.into();
        self.add_instance(&instance_id);
        self.add_data_point(&data_point);
        if let Some(row) = self.values.get_mut(&instance_id) {
            row.insert(data_point, value.into());
        }
    }

    fn add_data_point(&mut self, data_point: &str) {
        if self.data_point_index.insert(data_point.to_owned()) {
            self.data_point_names.push(data_point.to_owned());
        }
    }

    #[must_use]
    pub fn contains_data_point(&self, data_point: &str) -> bool {
        self.data_point_index.contains(data_point)
    }

    /// The stored value, or `None` when the cell was never set.
    #[must_use]
    pub fn get(&self, instance_id: &str, data_point: &str) -> Option<&str> {
        self.values
            .get(instance_id)?
            .get(data_point)
            .map(String::as_str)
    }

    #[must_use]
    pub fn is_missing(&self, instance_id: &str, data_point: &str) -> bool {
        self.get(instance_id, data_point)
            .is_none_or(|value| value == MISSING_VALUE)
    }

    #[must_use]
    pub fn contains_instance(&self, instance_id: &str) -> bool {
        self.values.contains_key(instance_id)
    }

    #[must_use]
    pub fn instance_ids(&self) -> &[String] {
        &self.instance_ids
    }

    #[must_use]
    pub fn data_point_names(&self) -> &[String] {
        &self.data_point_names
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instance_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instance_ids.is_empty()
    }

    #[must_use]
    pub fn num_data_points(&self) -> usize {
        self.data_point_names.len()
    }

    /// Values of one data point in instance order, with [`MISSING_VALUE`] for
    /// unset cells.
    #[must_use]
    pub fn data_point_values(&self, data_point: &str) -> Vec<&str> {
        self.instance_ids
            .iter()
            .map(|id| self.get(id, data_point).unwrap_or(MISSING_VALUE))
            .collect()
    }

    /// Replaces every stored value equal to `from` with `to` and returns how
    /// many cells changed.
    pub fn replace_value(&mut self, from: &str, to: &str) -> usize {
        let mut replaced = 0;
        for value in self.values.values_mut().flat_map(HashMap::values_mut) {
            if value == from {
                to.clone_into(value);
                replaced += 1;
            }
        }
        replaced
    }

    /// Prepends `prefix` to every data point name.
    pub fn prefix_data_point_names(&mut self, prefix: &str) {
        for name in &mut self.data_point_names {
            name.insert_str(0, prefix);
        }
        self.data_point_index = self.data_point_names.iter().cloned().collect();
        for row in self.values.values_mut() {
            let renamed = row
                .drain()
                .map(|(name, value)| (format!("{prefix}{name}"), value))
                .collect();
            *row = renamed;
        }
    }

    /// Proportion of missing cells over all instances and data points.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn proportion_missing(&self) -> f64 {
        let cells = self.len() * self.num_data_points();
        if cells == 0 {
            return 0.0;
        }
        let missing = self
            .instance_ids
            .iter()
            .map(|id| self.num_missing_in_instance(id))
            .sum::<usize>();
        missing as f64 / cells as f64
    }

    fn num_missing_in_instance(&self, instance_id: &str) -> usize {
        self.data_point_names
            .iter()
            .filter(|name| self.is_missing(instance_id, name))
            .count()
    }

    /// Removes instances missing more than `tolerance` of their values and
    /// returns how many were removed. A tolerance of `1.0` or more keeps
    /// everything.
    #[expect(clippy::cast_precision_loss)]
    pub fn remove_sparse_instances(&mut self, tolerance: f64) -> usize {
        if tolerance >= 1.0 || self.data_point_names.is_empty() {
            return 0;
        }
        let num_data_points = self.num_data_points() as f64;
        let sparse = self
            .instance_ids
            .iter()
            .filter(|id| self.num_missing_in_instance(id) as f64 / num_data_points > tolerance)
            .cloned()
            .collect::<HashSet<_>>();
        self.remove_instances(&sparse);
        sparse.len()
    }

    /// Removes data points missing in more than `tolerance` of the instances
    /// and returns how many were removed. A tolerance of `1.0` or more keeps
    /// everything.
    #[expect(clippy::cast_precision_loss)]
    pub fn remove_sparse_data_points(&mut self, tolerance: f64) -> usize {
        if tolerance >= 1.0 || self.instance_ids.is_empty() {
            return 0;
        }
        let num_instances = self.len() as f64;
        let sparse = self
            .data_point_names
            .iter()
            .filter(|name| {
                let missing = self
                    .instance_ids
                    .iter()
                    .filter(|id| self.is_missing(id, name))
                    .count();
                missing as f64 / num_instances > tolerance
            })
            .cloned()
            .collect::<HashSet<_>>();

        self.data_point_names.retain(|name| !sparse.contains(name));
        self.data_point_index.retain(|name| !sparse.contains(name));
        for row in self.values.values_mut() {
            row.retain(|name, _| !sparse.contains(name));
        }
        sparse.len()
    }

    fn remove_instances(&mut self, instance_ids: &HashSet<String>) {
        self.instance_ids.retain(|id| !instance_ids.contains(id));
        self.values.retain(|id, _| !instance_ids.contains(id));
    }

    /// Keeps only the given instances. Unknown ids are ignored.
    pub fn keep_instances<S>(&mut self, instance_ids: &[S])
    where
        S: AsRef<str>,
    {
        let keep = instance_ids.iter().map(AsRef::as_ref).collect::<HashSet<_>>();
        self.instance_ids.retain(|id| keep.contains(id.as_str()));
        self.values.retain(|id, _| keep.contains(id.as_str()));
    }

    /// Copies every instance and value of `other` into this table.
    ///
    /// Instances new to this table are appended in `other`'s order. Values
    /// already present for the same instance and data point are overwritten.
    pub fn merge(&mut self, other: Self) {
        let Self {
            instance_ids,
            data_point_names,
            data_point_index: _,
            mut values,
        } = other;
        for name in &data_point_names {
            self.add_data_point(name);
        }
        for id in instance_ids {
            self.add_instance(&id);
            if let (Some(row), Some(incoming)) = (self.values.get_mut(&id), values.remove(&id)) {
                row.extend(incoming);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn table() -> InstanceTable {
        let mut table = InstanceTable::new();
        for (id, age, stage, grade) in [
            ("P1", "54", "II", "?"),
            ("P2", "61", "?", "?"),
            ("P3", "47", "I", "3"),
            ("P4", "?", "?", "?"),
        ] {
            table.insert(id, "Age", age);
            table.insert(id, "Stage", stage);
            table.insert(id, "Grade", grade);
        }
        table
    }

    #[test]
    fn test_insert_keeps_first_seen_order() {
        let table = table();
        assert_eq!(table.instance_ids(), ["P1", "P2", "P3", "P4"]);
        assert_eq!(table.data_point_names(), ["Age", "Stage", "Grade"]);
        assert_eq!(table.get("P3", "Grade"), Some("3"));
        assert_eq!(table.get("P9", "Grade"), None);
        assert!(table.is_missing("P9", "Grade"));
        assert!(table.is_missing("P1", "Grade"));
    }

    #[test]
    fn test_proportion_missing() {
        assert_abs_diff_eq!(table().proportion_missing(), 0.5);
        assert_abs_diff_eq!(InstanceTable::new().proportion_missing(), 0.0);
    }

    #[test]
    fn test_remove_sparse_data_points() {
        let mut table = table();
        // Grade is missing in 3 of 4 instances
        assert_eq!(table.remove_sparse_data_points(0.5), 1);
        assert_eq!(table.data_point_names(), ["Age", "Stage"]);
        assert_eq!(table.get("P3", "Grade"), None);
    }

    #[test]
    fn test_remove_sparse_instances() {
        let mut table = table();
        // P2 misses 2 of 3, P4 misses 3 of 3
        assert_eq!(table.remove_sparse_instances(0.5), 2);
        assert_eq!(table.instance_ids(), ["P1", "P3"]);
    }

    #[test]
    fn test_full_tolerance_keeps_everything() {
        let mut table = table();
        MissingDataTolerance::ALLOW_ALL.apply(&mut table);
        assert_eq!(table, self::table());
    }

    #[test]
    fn test_default_tolerance() {
        let mut table = table();
        MissingDataTolerance::default().apply(&mut table);
        assert_eq!(table.instance_ids(), ["P1", "P2", "P3"]);
        assert_eq!(table.data_point_names(), ["Age", "Stage"]);
    }

    #[test]
    fn test_prefix_data_point_names() {
        let mut table = table();
        table.prefix_data_point_names("Clinical::");
        assert_eq!(table.data_point_names()[0], "Clinical::Age");
        assert!(table.contains_data_point("Clinical::Age"));
        assert!(!table.contains_data_point("Age"));
        assert_eq!(table.get("P1", "Clinical::Age"), Some("54"));
        assert_eq!(table.get("P1", "Age"), None);
    }

    #[test]
    fn test_many_data_points() {
        let mut table = InstanceTable::new();
        for id in ["P1", "P2"] {
            for gene in 0..5_000 {
                table.insert(id, format!("G{gene}"), "1");
            }
        }
        table.insert("P3", "G4999", "2");
        assert_eq!(table.num_data_points(), 5_000);
        assert_eq!(table.data_point_names()[4_999], "G4999");
        assert!(table.contains_data_point("G0"));
        assert!(!table.contains_data_point("G5000"));

        // every gene but G4999 is missing in P3
        assert_eq!(table.remove_sparse_data_points(0.5), 0);
        table.insert("P4", "G4999", "2");
        table.insert("P5", "G4999", "2");
        assert_eq!(table.remove_sparse_data_points(0.5), 4_999);
        assert_eq!(table.data_point_names(), ["G4999"]);
        assert!(!table.contains_data_point("G0"));
    }

    #[test]
    fn test_replace_value() {
        let mut table = InstanceTable::new();
        table.insert("P1", "Age", "NA");
        table.insert("P1", "Stage", "II");
        table.insert("P2", "Stage", "NA");
        assert_eq!(table.replace_value("NA", MISSING_VALUE), 2);
        assert!(table.is_missing("P1", "Age"));
        assert!(table.is_missing("P2", "Stage"));
        assert_eq!(table.get("P1", "Stage"), Some("II"));
    }

    #[test]
    fn test_data_point_values_and_keep() {
        let mut table = table();
        table.keep_instances(&["P3", "P1"]);
        assert_eq!(table.instance_ids(), ["P1", "P3"]);
        assert_eq!(table.data_point_values("Grade"), ["?", "3"]);
    }

    #[test]
    fn test_merge_unions_instances() {
        let mut left = InstanceTable::new();
        left.insert("P1", "A", "1");
        let mut right = InstanceTable::new();
        right.insert("P2", "B", "2");
        right.insert("P1", "B", "3");
        left.merge(right);
        assert_eq!(left.instance_ids(), ["P1", "P2"]);
        assert_eq!(left.data_point_names(), ["A", "B"]);
        assert_eq!(left.get("P1", "B"), Some("3"));
        assert_eq!(left.data_point_values("A"), ["1", "?"]);
    }

    #[test]
    fn test_serde_rows() {
        let json = r#"[{"id": "P2", "values": {"Age": "61"}}, {"id": "P1"}]"#;
        let table: InstanceTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.instance_ids(), ["P2", "P1"]);
        assert!(table.is_missing("P1", "Age"));
        let back = serde_json::to_value(&table).unwrap();
        assert_eq!(
            back,
            serde_json::json!([{"id": "P2", "values": {"Age": "61"}}, {"id": "P1", "values": {}}])
        );
    }
}
