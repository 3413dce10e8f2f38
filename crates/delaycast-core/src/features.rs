//! One-hot feature encoding aligned to an [`ExpectedSchema`].

use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use tracing::debug;

use crate::ExpectedSchema;

/// A numeric feature row, index-aligned with the schema it was built from.
///
/// Every slot is 0.0 or 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// All-zero vector for `schema`.
    pub fn zeros(schema: &ExpectedSchema) -> Self {
        Self {
            values: vec![0.0; schema.len()],
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of the columns set to 1, in schema order.
    pub fn active_columns<'a>(&self, schema: &'a ExpectedSchema) -> Vec<&'a str> {
        schema
            .columns()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| **v != 0.0)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// One-row Arrow batch with one `Float32` column per schema entry.
    ///
    /// The row count is explicit, so an empty schema still gives one (empty) row.
    pub fn to_record_batch(&self, schema: &ExpectedSchema) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = self
            .values
            .iter()
            .map(|&v| Arc::new(Float32Array::from(vec![v])) as ArrayRef)
            .collect();
        let options = RecordBatchOptions::new().with_row_count(Some(1));
        RecordBatch::try_new_with_options(schema.arrow_schema(), columns, &options)
    }

    fn set(&mut self, index: usize) {
        self.values[index] = 1.0;
    }
}

/// Build the one-hot feature vector for `inputs` against `schema`.
///
/// Each `(attribute, value)` pair sets the slot of column `"{attribute}_{value}"`
/// to 1 when the schema has that column. Pairs without a column contribute
/// nothing. The result always has the schema's length and order.
pub fn build_feature_vector<I, K, V>(inputs: I, schema: &ExpectedSchema) -> FeatureVector
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut vector = FeatureVector::zeros(schema);
    for (attribute, value) in inputs {
        let (attribute, value) = (attribute.as_ref(), value.as_ref());
        match schema.column_index(attribute, value) {
            Some(index) => vector.set(index),
            None => debug!(attribute, value, "no model column for input, skipping"),
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scenario_schema() -> ExpectedSchema {
        ExpectedSchema::new([
            "Shipping Mode_Standard Class",
            "Order Region_Western Europe",
            "Type_CASH",
        ])
        .unwrap()
    }

    #[test]
    fn empty_inputs_give_zeros() {
        let schema = scenario_schema();
        let v = build_feature_vector(Vec::<(&str, &str)>::new(), &schema);
        assert_eq!(v.values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn recognised_pairs_set_their_slots() {
        let schema = scenario_schema();
        let inputs = [
            ("Shipping Mode", "Standard Class"),
            ("Order Region", "Western Europe"),
        ];
        let v = build_feature_vector(inputs, &schema);
        assert_eq!(v.values(), &[1.0, 1.0, 0.0]);
    }

    #[test]
    fn unrecognised_value_is_a_no_op() {
        let schema = scenario_schema();
        let v = build_feature_vector([("Shipping Mode", "Drone Delivery")], &schema);
        assert_eq!(v.values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_attribute_leaves_other_slots_alone() {
        let schema = scenario_schema();
        let v = build_feature_vector(
            [("Type", "CASH"), ("Weather", "Stormy"), ("Type", "BITCOIN")],
            &schema,
        );
        assert_eq!(v.values(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn empty_schema_gives_empty_vector() {
        let schema = ExpectedSchema::new(Vec::<String>::new()).unwrap();
        let v = build_feature_vector([("Type", "CASH")], &schema);
        assert!(v.is_empty());
    }

    #[test]
    fn same_inputs_same_vector() {
        let schema = scenario_schema();
        let inputs: HashMap<&str, &str> =
            [("Type", "CASH"), ("Order Region", "Western Europe")].into();
        let a = build_feature_vector(&inputs, &schema);
        let b = build_feature_vector(&inputs, &schema);
        assert_eq!(a, b);
        assert_eq!(a.values(), &[0.0, 1.0, 1.0]);
    }

    #[test]
    fn slot_set_twice_stays_one() {
        let schema = scenario_schema();
        let v = build_feature_vector([("Type", "CASH"), ("Type", "CASH")], &schema);
        assert_eq!(v.values(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn length_tracks_schema_not_inputs() {
        let columns: Vec<String> = (0..40).map(|i| format!("Feature_{i}")).collect();
        let schema = ExpectedSchema::new(columns).unwrap();
        let many: Vec<(String, String)> = (0..100)
            .map(|i| ("Feature".to_string(), i.to_string()))
            .collect();

        let v = build_feature_vector(many, &schema);
        assert_eq!(v.len(), 40);
        assert!(v.values().iter().all(|&x| x == 1.0));
    }

    #[test]
    fn active_columns_in_schema_order() {
        let schema = scenario_schema();
        let v = build_feature_vector(
            [("Type", "CASH"), ("Shipping Mode", "Standard Class")],
            &schema,
        );
        assert_eq!(
            v.active_columns(&schema),
            vec!["Shipping Mode_Standard Class", "Type_CASH"]
        );
    }

    #[test]
    fn record_batch_is_one_row() {
        let schema = scenario_schema();
        let v = build_feature_vector([("Order Region", "Western Europe")], &schema);
        let batch = v.to_record_batch(&schema).unwrap();

        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 3);
        let col = batch
            .column_by_name("Order Region_Western Europe")
            .unwrap()
            .as_any()
            .downcast_ref::<Float32Array>()
            .unwrap();
        assert_eq!(col.value(0), 1.0);
    }

    #[test]
    fn empty_schema_record_batch_has_one_row() {
        let schema = ExpectedSchema::new(Vec::<String>::new()).unwrap();
        let v = build_feature_vector([("Type", "CASH")], &schema);
        let batch = v.to_record_batch(&schema).unwrap();

        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 0);
    }
}
