//! MailPulse: email marketing performance dashboard backend.
//!
//! Main entry point that loads the record set and starts the API server.

use clap::Parser;
use mailpulse_api::rest::{self, Dataset, IngestRequest};
use mailpulse_api::ApiServer;
use mailpulse_core::config::AppConfig;
use mailpulse_core::{PulseError, PulseResult};
use mailpulse_engine::store::RecordStore;
use tracing::{error, info, warn};

mod demo;

#[derive(Parser, Debug)]
#[command(name = "mailpulse")]
#[command(about = "Email marketing performance dashboard backend")]
#[command(version)]
struct Cli {
    /// HTTP port (overrides config)
    #[arg(long, env = "MAILPULSE__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Load records from a normalized JSON export
    #[arg(long, value_name = "FILE")]
    records: Option<std::path::PathBuf>,

    /// Start with generated demo data instead of an empty store
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Days of history for generated demo data
    #[arg(long, default_value_t = 365)]
    demo_days: u32,

    /// Seed for the demo data generator
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailpulse=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("MailPulse starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }

    info!(
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        default_range = %config.dashboard.default_range,
        "Configuration loaded"
    );

    // Assemble the initial dataset
    let dataset = load_dataset(&cli)?;

    // Start API server
    let server = ApiServer::new(config, dataset);

    // Start metrics exporter
    if let Err(e) = server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("MailPulse is ready to serve the dashboard");

    // Start HTTP server (blocks until shutdown)
    server.start_http().await?;

    Ok(())
}

/// Build the initial dataset from a JSON export, the demo generator, or an
/// empty store.
fn load_dataset(cli: &Cli) -> PulseResult<Dataset> {
    if let Some(path) = &cli.records {
        let file = std::fs::File::open(path)?;
        let batch: IngestRequest = serde_json::from_reader(std::io::BufReader::new(file))?;
        rest::validate_batch(&batch).map_err(|msg| PulseError::Validation(msg.to_string()))?;

        let campaigns = batch.campaigns.len();
        let flows = batch.flows.len();
        let dataset = Dataset {
            store: RecordStore::new(batch.campaigns, batch.flows),
            reference_date: batch.reference_date,
        };
        info!(campaigns, flows, path = %path.display(), "Loaded records from file");
        Ok(dataset)
    } else if cli.demo {
        let dataset = demo::generate(cli.demo_days, cli.seed);
        info!(
            campaigns = dataset.store.campaigns().len(),
            flows = dataset.store.flows().len(),
            days = cli.demo_days,
            seed = cli.seed,
            "Generated demo records"
        );
        Ok(dataset)
    } else {
        info!("Starting with an empty record store; POST /v1/records to load data");
        Ok(Dataset::default())
    }
}
