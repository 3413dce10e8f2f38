//! Shipment event logs: one row per activity occurrence within a case.
//!
//! The Arrow form mirrors the classic process-mining layout:
//! `case_id` (Utf8), `activity` (Utf8), `timestamp` (Timestamp(ns, +00:00)).

use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, LargeStringArray, StringArray, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EventLogError;

/// Timestamp zone of the Arrow form. Offset-based so the table can be
/// formatted without a timezone database.
pub const TIMEZONE: &str = "+00:00";

/// A single activity occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub case_id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(case_id: &str, activity: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            case_id: case_id.to_string(),
            activity: activity.to_string(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// The built-in nine-event log of three shipments (B1-B3).
    ///
    /// B3 passes through a warehouse hold, which is where the slow edges are.
    pub fn synthetic() -> Self {
        let day = |d: u32| {
            Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0)
                .single()
                .unwrap_or_default()
        };
        Self::new(vec![
            Event::new("B1", "Order Received", day(1)),
            Event::new("B1", "Customs Check", day(2)),
            Event::new("B1", "Delivered", day(5)),
            Event::new("B2", "Order Received", day(1)),
            Event::new("B2", "Delivered", day(3)),
            Event::new("B3", "Order Received", day(1)),
            Event::new("B3", "Customs Check", day(2)),
            Event::new("B3", "Warehouse Hold", day(6)),
            Event::new("B3", "Delivered", day(10)),
        ])
    }

    /// Load a log from a JSON array of `{case_id, activity, timestamp}` objects.
    pub fn load_json(path: &Path) -> Result<Self, EventLogError> {
        if !path.exists() {
            return Err(EventLogError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let log: Self = serde_json::from_slice(&bytes)?;
        info!(events = log.len(), path = %path.display(), "loaded event log");
        Ok(log)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Arrow schema of the tabular form.
    pub fn arrow_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("case_id", DataType::Utf8, false),
            Field::new("activity", DataType::Utf8, false),
            Field::new(
                "timestamp",
                DataType::Timestamp(TimeUnit::Nanosecond, Some(TIMEZONE.into())),
                false,
            ),
        ]))
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch, EventLogError> {
        let case_ids = StringArray::from_iter_values(self.events.iter().map(|e| &e.case_id));
        let activities = StringArray::from_iter_values(self.events.iter().map(|e| &e.activity));
        let timestamps = TimestampNanosecondArray::from(
            self.events
                .iter()
                .map(|e| e.timestamp.timestamp_nanos_opt().unwrap_or_default())
                .collect::<Vec<i64>>(),
        )
        .with_timezone(TIMEZONE);

        Ok(RecordBatch::try_new(
            Self::arrow_schema(),
            vec![
                Arc::new(case_ids),
                Arc::new(activities),
                Arc::new(timestamps),
            ],
        )?)
    }

    /// Rebuild a log from Arrow batches.
    ///
    /// `case_id` and `activity` may be Utf8 or LargeUtf8; `timestamp` must be
    /// nanosecond precision.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self, EventLogError> {
        let mut events = Vec::new();

        for batch in batches {
            let case_col = batch
                .column_by_name("case_id")
                .ok_or(EventLogError::MissingColumn("case_id"))?;
            let activity_col = batch
                .column_by_name("activity")
                .ok_or(EventLogError::MissingColumn("activity"))?;
            let ts_col = batch
                .column_by_name("timestamp")
                .ok_or(EventLogError::MissingColumn("timestamp"))?;

            let timestamps = ts_col
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .ok_or_else(|| EventLogError::ColumnType {
                    column: "timestamp",
                    data_type: ts_col.data_type().to_string(),
                })?;

            for row in 0..batch.num_rows() {
                let case_id = get_string(case_col.as_ref(), "case_id", row)?;
                let activity = get_string(activity_col.as_ref(), "activity", row)?;
                if timestamps.is_null(row) {
                    return Err(EventLogError::NullValue {
                        column: "timestamp",
                        row,
                    });
                }
                let timestamp = DateTime::from_timestamp_nanos(timestamps.value(row));
                events.push(Event {
                    case_id,
                    activity,
                    timestamp,
                });
            }
        }

        Ok(Self { events })
    }
}

fn get_string(col: &dyn Array, column: &'static str, row: usize) -> Result<String, EventLogError> {
    if col.is_null(row) {
        return Err(EventLogError::NullValue { column, row });
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
        .ok_or_else(|| EventLogError::ColumnType {
            column,
            data_type: col.data_type().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_log_has_three_cases() {
        let log = EventLog::synthetic();
        assert_eq!(log.len(), 9);

        let mut cases: Vec<&str> = log.events().iter().map(|e| e.case_id.as_str()).collect();
        cases.dedup();
        assert_eq!(cases, vec!["B1", "B2", "B3"]);

        let hold = &log.events()[7];
        assert_eq!(hold.activity, "Warehouse Hold");
        assert_eq!(hold.timestamp.to_rfc3339(), "2026-01-06T00:00:00+00:00");
    }

    #[test]
    fn record_batch_round_trip() {
        let log = EventLog::synthetic();
        let batch = log.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 9);
        assert_eq!(batch.num_columns(), 3);

        let back = EventLog::from_batches(&[batch]).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn record_batch_pretty_prints() {
        let batch = EventLog::synthetic().to_record_batch().unwrap();
        let table = arrow::util::pretty::pretty_format_batches(&[batch])
            .unwrap()
            .to_string();
        assert!(table.contains("Warehouse Hold"));
        assert!(table.contains("2026-01-06T00:00:00"), "{table}");
    }

    #[test]
    fn from_batches_accepts_large_utf8() {
        let schema = Schema::new(vec![
            Field::new("case_id", DataType::LargeUtf8, false),
            Field::new("activity", DataType::LargeUtf8, false),
            Field::new(
                "timestamp",
                DataType::Timestamp(TimeUnit::Nanosecond, Some(TIMEZONE.into())),
                false,
            ),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(LargeStringArray::from(vec!["C1"])),
                Arc::new(LargeStringArray::from(vec!["Order Received"])),
                Arc::new(TimestampNanosecondArray::from(vec![0i64]).with_timezone(TIMEZONE)),
            ],
        )
        .unwrap();

        let log = EventLog::from_batches(&[batch]).unwrap();
        assert_eq!(log.events()[0].case_id, "C1");
        assert_eq!(log.events()[0].timestamp.timestamp(), 0);
    }

    #[test]
    fn from_batches_missing_column() {
        let schema = Schema::new(vec![Field::new("case_id", DataType::Utf8, false)]);
        let batch =
            RecordBatch::try_new(Arc::new(schema), vec![Arc::new(StringArray::from(vec!["B1"]))])
                .unwrap();

        let err = EventLog::from_batches(&[batch]).unwrap_err();
        assert!(matches!(err, EventLogError::MissingColumn("activity")));
    }

    #[test]
    fn load_json_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(
            &path,
            r#"[
                {"case_id": "X1", "activity": "Order Received", "timestamp": "2026-02-01T08:00:00Z"},
                {"case_id": "X1", "activity": "Delivered", "timestamp": "2026-02-03T17:30:00Z"}
            ]"#,
        )
        .unwrap();

        let log = EventLog::load_json(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[1].activity, "Delivered");
    }

    #[test]
    fn load_json_missing_file() {
        let err = EventLog::load_json(Path::new("/nonexistent/log.json")).unwrap_err();
        assert!(matches!(err, EventLogError::NotFound(_)));
    }
}
