//! The ordered feature-column contract of a trained classifier.
//!
//! Column names follow the one-hot convention of the training pipeline:
//! `"{attribute}_{value}"`, e.g. `"Shipping Mode_Standard Class"`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};
use tracing::info;

use crate::SchemaError;

/// File name of the serialized column list inside an artifact directory.
pub const SCHEMA_FILE: &str = "model_columns.json";

/// Separator between attribute and value in a one-hot column name.
pub const COLUMN_SEPARATOR: char = '_';

/// Ordered list of feature columns the classifier expects at inference time.
///
/// Loaded once at startup and shared read-only. The name → index map is built
/// at construction so lookups never scan the column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl ExpectedSchema {
    /// Build a schema from an ordered column list.
    ///
    /// Duplicate names are rejected: a one-hot column must map to exactly one slot.
    pub fn new<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { columns, index })
    }

    /// Load a schema from a JSON array of column names.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        if !path.exists() {
            return Err(SchemaError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let columns: Vec<String> = serde_json::from_slice(&bytes)?;
        let schema = Self::new(columns)?;
        info!(columns = schema.len(), path = %path.display(), "loaded expected schema");
        Ok(schema)
    }

    /// Index of the one-hot column for `attribute` = `value`, if the model has one.
    pub fn column_index(&self, attribute: &str, value: &str) -> Option<usize> {
        self.index_of(&column_name(attribute, value))
    }

    /// Index of a column by its full name.
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Arrow schema of a feature row: one non-null `Float32` field per column, in order.
    pub fn arrow_schema(&self) -> Arc<Schema> {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|name| Field::new(name, DataType::Float32, false))
            .collect();
        Arc::new(Schema::new(fields))
    }
}

/// Compose the one-hot column name for an attribute value.
pub fn column_name(attribute: &str, value: &str) -> String {
    format!("{attribute}{COLUMN_SEPARATOR}{value}")
}
