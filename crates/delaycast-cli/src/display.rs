//! Terminal rendering for predictions, feature rows, headlines, and process maps.

use arrow::array::{Array, Float32Array};
use arrow::record_batch::RecordBatch;
use delaycast_core::{ExpectedSchema, PredictionResult, ShipmentInputs};
use delaycast_news::{HeadlineSource, Headlines};
use delaycast_process::{DirectlyFollowsGraph, Edge};

const BAR_WIDTH: usize = 30;
const MAX_COLUMNS: usize = 50;

// ── Prediction ──

/// Print the shipment, the prediction, and a probability bar.
pub fn print_prediction(inputs: &ShipmentInputs, result: &PredictionResult, backend: &str) {
    println!("=== Prediction Result ===");
    for (attribute, value) in inputs.attributes() {
        println!("  {:<26} {}", attribute, value);
    }
    println!();
    println!("  {:<26} {}", "delay probability", result.percentage());
    println!("  {:<26} {}", "risk", result.risk.as_str());
    println!("  {:<26} {}", "model", backend);
    println!("  {}", probability_bar(result.probability));
    println!();
}

/// `[##########--------------------]` scaled to `probability`.
pub fn probability_bar(probability: f64) -> String {
    let filled = ((probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Print a one-row feature batch as a vertical card, set columns marked with `*`.
pub fn print_feature_card(batch: &RecordBatch) {
    let schema = batch.schema();
    let active = batch
        .columns()
        .iter()
        .filter(|col| float_value(col.as_ref()).is_some_and(|v| v != 0.0))
        .count();

    println!("Feature row ({} columns, {} set)", batch.num_columns(), active);
    for (field, col) in schema.fields().iter().zip(batch.columns()) {
        let value = float_value(col.as_ref()).unwrap_or(0.0);
        let mark = if value != 0.0 { "*" } else { " " };
        println!("  {mark} {:<44} {}", field.name(), value);
    }
    println!();
}

fn float_value(col: &dyn Array) -> Option<f32> {
    if col.is_empty() || col.is_null(0) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Float32Array>()
        .map(|arr| arr.value(0))
}

// ── Schema ──

pub fn print_columns(schema: &ExpectedSchema) {
    println!("Model expects {} columns:", schema.len());
    for (i, name) in schema.columns().iter().enumerate().take(MAX_COLUMNS) {
        println!("  {:>4}  '{}'", i, name);
    }
    if schema.len() > MAX_COLUMNS {
        println!("  ... and {} more", schema.len() - MAX_COLUMNS);
    }
    println!();
}

// ── News ──

pub fn print_headlines(headlines: &Headlines) {
    match &headlines.source {
        HeadlineSource::Live => println!("Latest logistics headlines ({}):", headlines.items.len()),
        HeadlineSource::Fallback(reason) => {
            println!("Live feed unavailable ({reason}); using simulated headlines:")
        }
    }
    for (i, h) in headlines.items.iter().enumerate() {
        println!("  {}. {}", i + 1, h);
    }
    println!();
}

pub fn print_insight(title: &str, text: &str) {
    println!("=== {title} ===");
    for line in text.lines() {
        println!("  {line}");
    }
    println!();
}

// ── Process map ──

pub fn print_process_summary(dfg: &DirectlyFollowsGraph, bottlenecks: &[Edge]) {
    println!(
        "Process map: {} cases, {} activities, {} edges",
        dfg.case_count(),
        dfg.activities().len(),
        dfg.edges().len()
    );
    if bottlenecks.is_empty() {
        println!();
        return;
    }
    println!("Slowest transitions:");
    for edge in bottlenecks {
        let hours = edge.mean_duration.num_minutes() as f64 / 60.0;
        println!(
            "  {:<22} -> {:<22} {:>7.1}h avg  ({}x)",
            edge.source, edge.target, hours, edge.frequency
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_with_probability() {
        assert_eq!(probability_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(probability_bar(1.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        let half = probability_bar(0.5);
        assert_eq!(half.matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(half.len(), BAR_WIDTH + 2);
    }

    #[test]
    fn bar_clamps_out_of_range() {
        assert_eq!(probability_bar(1.7), probability_bar(1.0));
        assert_eq!(probability_bar(-0.3), probability_bar(0.0));
    }
}
