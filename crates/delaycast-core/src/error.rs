use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema file not found: {0}")]
    NotFound(PathBuf),

    #[error("duplicate column in expected schema: {0}")]
    DuplicateColumn(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema is not a JSON array of column names: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log file not found: {0}")]
    NotFound(PathBuf),

    #[error("missing '{0}' column")]
    MissingColumn(&'static str),

    #[error("column '{column}' has unexpected type {data_type}")]
    ColumnType {
        column: &'static str,
        data_type: String,
    },

    #[error("null {column} at row {row}")]
    NullValue { column: &'static str, row: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
