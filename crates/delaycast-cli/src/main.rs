mod commands;
mod display;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use delaycast_core::{CustomerSegment, OrderRegion, PaymentType, ShipmentInputs, ShippingMode};
use delaycast_process::MapFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "delaycast", version, about = "Logistics delay predictor")]
struct Cli {
    /// Directory holding model_columns.json and the classifier artifact.
    #[arg(long, env = "DELAYCAST_ARTIFACTS", default_value = ".", global = true)]
    artifacts: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the delay probability of a shipment.
    Predict {
        #[command(flatten)]
        shipment: ShipmentArgs,

        /// Print the encoded feature row.
        #[arg(long)]
        show_features: bool,
    },
    /// List the feature columns the model expects.
    Columns,
    /// Fetch the latest logistics headlines.
    News {
        #[command(flatten)]
        news: NewsArgs,
    },
    /// Headlines plus a strategic risk paragraph from the local model.
    Brief {
        #[command(flatten)]
        news: NewsArgs,

        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Mitigation advice for a shipment's predicted delay.
    Advise {
        #[command(flatten)]
        shipment: ShipmentArgs,

        /// What is being shipped.
        #[arg(long, default_value = "general cargo")]
        product: String,

        /// Use this delay probability instead of running the model.
        #[arg(long, value_parser = parse_probability)]
        probability: Option<f64>,

        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Discover a directly-follows graph and write a bottleneck map.
    ProcessMap {
        #[command(flatten)]
        map: MapArgs,
    },
    /// Prediction, news brief, and process map in one run.
    Dashboard {
        #[command(flatten)]
        shipment: ShipmentArgs,

        #[command(flatten)]
        news: NewsArgs,

        #[command(flatten)]
        llm: LlmArgs,

        #[command(flatten)]
        map: MapArgs,
    },
}

/// The four selection controls of the prediction form.
#[derive(Args, Clone)]
struct ShipmentArgs {
    /// DEBIT, TRANSFER, CASH, or PAYMENT.
    #[arg(long, default_value = "DEBIT")]
    payment_type: PaymentType,

    /// Western Europe, Central America, South America, or Southeast Asia.
    #[arg(long, default_value = "Western Europe")]
    region: OrderRegion,

    /// Standard Class, First Class, Second Class, or Same Day.
    #[arg(long, default_value = "Standard Class")]
    shipping_mode: ShippingMode,

    /// Consumer, Corporate, or Home Office.
    #[arg(long, default_value = "Consumer")]
    segment: CustomerSegment,
}

impl ShipmentArgs {
    fn inputs(&self) -> ShipmentInputs {
        ShipmentInputs {
            payment_type: self.payment_type,
            order_region: self.region,
            shipping_mode: self.shipping_mode,
            segment: self.segment,
        }
    }
}

#[derive(Args, Clone)]
struct NewsArgs {
    /// RSS or Atom feed to mine for headlines.
    #[arg(long, env = "DELAYCAST_FEED_URL", default_value = delaycast_news::DEFAULT_FEED_URL)]
    feed: String,

    /// Maximum number of headlines.
    #[arg(long, default_value_t = delaycast_news::DEFAULT_HEADLINE_LIMIT)]
    limit: usize,
}

#[derive(Args, Clone)]
struct LlmArgs {
    /// Base URL of the Ollama server.
    #[arg(long, env = "DELAYCAST_OLLAMA_URL", default_value = delaycast_ai::insight::DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// Chat model to use.
    #[arg(long, env = "DELAYCAST_LLM_MODEL", default_value = delaycast_ai::insight::DEFAULT_MODEL)]
    llm_model: String,
}

#[derive(Args, Clone)]
struct MapArgs {
    /// JSON event log; the built-in synthetic log is used when omitted.
    #[arg(long)]
    log: Option<PathBuf>,

    /// dot, png, or svg (png/svg need Graphviz installed).
    #[arg(long, default_value = "dot")]
    format: MapFormat,

    /// Output path; defaults to bottleneck_map.<format>.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of slowest transitions to list.
    #[arg(long, default_value_t = 3)]
    top: usize,
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("probability must be between 0 and 1, got {p}"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("delaycast v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Predict {
            shipment,
            show_features,
        } => commands::predict(&cli.artifacts, &shipment.inputs(), show_features),
        Command::Columns => commands::columns(&cli.artifacts),
        Command::News { news } => commands::news(&news).await,
        Command::Brief { news, llm } => commands::brief(&news, &llm).await,
        Command::Advise {
            shipment,
            product,
            probability,
            llm,
        } => commands::advise(&cli.artifacts, &shipment.inputs(), &product, probability, &llm).await,
        Command::ProcessMap { map } => commands::process_map(&map),
        Command::Dashboard {
            shipment,
            news,
            llm,
            map,
        } => commands::dashboard(&cli.artifacts, &shipment.inputs(), &news, &llm, &map).await,
    }
}
