//! speaker-events: upcoming events for a speaker
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use speaker_events::{
    config::{self, Settings},
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    SPEAKER_EVENTS_SETTINGS_PATH  Path to settings.yml
    SPEAKER_EVENTS_DEBUG          Enable debug logging (true/false)
    SPEAKER_EVENTS_PORT, PORT     Server port
    SPEAKER_EVENTS_BIND_ADDRESS   Bind address
    FIRECRAWL_KEY                 Firecrawl API key
    FIRECRAWL_BASE_URL            Firecrawl API root
    RUST_LOG                      Log filter (overrides debug setting)

Variables are also read from a .env file in the working directory.";

#[derive(Debug, Parser)]
#[command(name = "speaker-events")]
#[command(about = "Finds upcoming public events for a speaker")]
#[command(version, after_help = ENV_HELP)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::load(args.config)?;

    // Initialize logging
    init_tracing(&settings);
    info!("Starting speaker-events v{}", speaker_events::VERSION);

    settings.validate()?;
    info!(
        "Searching {} platforms",
        settings.enabled_platforms().len()
    );

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    // Create application state and router
    let state = AppState::new(&settings, client);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
