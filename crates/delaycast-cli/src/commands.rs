use std::path::{Path, PathBuf};

use anyhow::Context;
use arrow::util::pretty::pretty_format_batches;
use delaycast_ai::{InsightClient, InsightConfig, Predictor};
use delaycast_core::{EventLog, ExpectedSchema, ShipmentInputs, schema::SCHEMA_FILE};
use delaycast_news::{NewsClient, NewsConfig};
use delaycast_process::{DirectlyFollowsGraph, render_bottleneck_map};
use tracing::{info, warn};

use crate::display;
use crate::{LlmArgs, MapArgs, NewsArgs};

pub fn predict(artifacts: &Path, inputs: &ShipmentInputs, show_features: bool) -> anyhow::Result<()> {
    let predictor = load_predictor(artifacts)?;

    if show_features {
        let features = predictor.encode(inputs);
        let batch = features
            .to_record_batch(predictor.schema())
            .context("failed to build feature row")?;
        display::print_feature_card(&batch);
    }

    let result = predictor.predict(inputs).context("prediction failed")?;
    display::print_prediction(inputs, &result, predictor.backend());
    Ok(())
}

pub fn columns(artifacts: &Path) -> anyhow::Result<()> {
    let path = artifacts.join(SCHEMA_FILE);
    let schema = ExpectedSchema::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    display::print_columns(&schema);
    Ok(())
}

pub async fn news(args: &NewsArgs) -> anyhow::Result<()> {
    let client = news_client(args)?;
    display::print_headlines(&client.fetch_or_fallback().await);
    Ok(())
}

pub async fn brief(news: &NewsArgs, llm: &LlmArgs) -> anyhow::Result<()> {
    let headlines = news_client(news)?.fetch_or_fallback().await;
    display::print_headlines(&headlines);

    let insight = insight_client(llm)?
        .summarize(&headlines.items)
        .await
        .context("AI analysis unavailable; is the Ollama server running?")?;
    display::print_insight("Strategic Risk", &insight);
    Ok(())
}

pub async fn advise(
    artifacts: &Path,
    inputs: &ShipmentInputs,
    product: &str,
    probability: Option<f64>,
    llm: &LlmArgs,
) -> anyhow::Result<()> {
    let result = match probability.and_then(delaycast_core::PredictionResult::from_probability) {
        Some(result) => result,
        None => load_predictor(artifacts)?
            .predict(inputs)
            .context("prediction failed")?,
    };
    println!("{} ({})", result, inputs.order_region);

    let advice = insight_client(llm)?
        .advise(&result, inputs.order_region.as_str(), product)
        .await
        .context("AI advice unavailable; is the Ollama server running?")?;
    display::print_insight("Mitigation", &advice);
    Ok(())
}

pub fn process_map(args: &MapArgs) -> anyhow::Result<()> {
    let log = load_event_log(args.log.as_deref())?;

    let batch = log.to_record_batch().context("failed to build event table")?;
    println!("{}", pretty_format_batches(&[batch])?);

    let dfg = DirectlyFollowsGraph::discover(&log);
    display::print_process_summary(&dfg, &dfg.bottlenecks(args.top));

    let output = map_output(args);
    let written = render_bottleneck_map(&log, args.format, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Bottleneck map written to {}", written.display());
    Ok(())
}

/// Run every panel; a failing panel is reported and the rest still run.
pub async fn dashboard(
    artifacts: &Path,
    inputs: &ShipmentInputs,
    news: &NewsArgs,
    llm: &LlmArgs,
    map: &MapArgs,
) -> anyhow::Result<()> {
    let mut failures = 0usize;

    println!("## Shipment risk\n");
    if let Err(e) = predict(artifacts, inputs, false) {
        report(&mut failures, "prediction", &e);
    }

    println!("## Global news\n");
    if let Err(e) = brief(news, llm).await {
        report(&mut failures, "news brief", &e);
    }

    println!("## Supply chain process\n");
    if let Err(e) = process_map(map) {
        report(&mut failures, "process map", &e);
    }

    info!(failures, "dashboard complete");
    Ok(())
}

fn report(failures: &mut usize, panel: &str, error: &anyhow::Error) {
    *failures += 1;
    warn!(panel, error = %error, "dashboard panel failed");
    println!("  [{panel} unavailable] {error:#}\n");
}

fn load_predictor(artifacts: &Path) -> anyhow::Result<Predictor> {
    Predictor::load(artifacts)
        .with_context(|| format!("failed to load model artifacts from {}", artifacts.display()))
}

fn news_client(args: &NewsArgs) -> anyhow::Result<NewsClient> {
    let config = NewsConfig {
        feed_url: args.feed.clone(),
        limit: args.limit,
        ..Default::default()
    };
    NewsClient::new(config).context("failed to build news client")
}

fn insight_client(args: &LlmArgs) -> anyhow::Result<InsightClient> {
    let config = InsightConfig {
        base_url: args.ollama_url.clone(),
        model: args.llm_model.clone(),
        ..Default::default()
    };
    InsightClient::new(config).context("failed to build LLM client")
}

fn load_event_log(path: Option<&Path>) -> anyhow::Result<EventLog> {
    match path {
        Some(path) => EventLog::load_json(path)
            .with_context(|| format!("failed to load event log {}", path.display())),
        None => Ok(EventLog::synthetic()),
    }
}

fn map_output(args: &MapArgs) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("bottleneck_map.{}", args.format.extension())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use delaycast_process::MapFormat;

    fn map_args(dir: &Path, format: MapFormat) -> MapArgs {
        MapArgs {
            log: None,
            format,
            output: Some(dir.join(format!("map.{}", format.extension()))),
            top: 2,
        }
    }

    #[test]
    fn default_map_output_follows_format() {
        let args = MapArgs {
            log: None,
            format: MapFormat::Svg,
            output: None,
            top: 3,
        };
        assert_eq!(map_output(&args), PathBuf::from("bottleneck_map.svg"));
    }

    #[test]
    fn process_map_writes_dot_for_synthetic_log() {
        let dir = tempfile::tempdir().unwrap();
        let args = map_args(dir.path(), MapFormat::Dot);

        process_map(&args).unwrap();
        let dot = std::fs::read_to_string(dir.path().join("map.dot")).unwrap();
        assert!(dot.contains("Warehouse Hold"));
    }

    #[test]
    fn missing_artifacts_are_an_error() {
        let err = predict(Path::new("/nonexistent/delaycast"), &ShipmentInputs::default(), false)
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to load model artifacts"));
    }

    #[tokio::test]
    async fn dashboard_panels_fail_independently() {
        let dir = tempfile::tempdir().unwrap();
        let news = NewsArgs {
            feed: "http://127.0.0.1:9/feed".into(),
            limit: 3,
        };
        let llm = LlmArgs {
            ollama_url: "http://127.0.0.1:9".into(),
            llm_model: "llama3".into(),
        };
        let map = map_args(dir.path(), MapFormat::Dot);

        dashboard(
            &dir.path().join("no-artifacts"),
            &ShipmentInputs::default(),
            &news,
            &llm,
            &map,
        )
        .await
        .unwrap();

        let dot = std::fs::read_to_string(dir.path().join("map.dot")).unwrap();
        assert!(dot.contains("Warehouse Hold"));
    }
}
