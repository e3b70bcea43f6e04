// Main entry point - Dependency injection and polling loop setup
mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::application::placefile_service::PlacefileService;
use crate::application::scheduler::Ticker;
use crate::infrastructure::config::load_jrad_config;
use crate::infrastructure::opensky_source::OpenSkySource;
use crate::infrastructure::placefile_writer::PlacefileWriter;
use crate::infrastructure::shutdown::cancel_on_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_jrad_config()?;

    // Make sure the placefile has somewhere to go
    let writer = PlacefileWriter::new(config.output.placefile_path());
    writer.ensure_directory()?;
    let icon_path = config.output.icon_path()?;

    // Create source (infrastructure layer)
    let source = Arc::new(OpenSkySource::new(&config.opensky)?);

    println!(
        "\nJRAD\n====\nYou can utilize the placefile located at {}",
        writer.path().display()
    );
    println!("\nPress Ctrl+C to exit");

    // Create service (application layer), anchored to startup
    let service = PlacefileService::new(
        source,
        writer,
        icon_path,
        Ticker::starting_now(config.interval()),
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    service.run(&cancel).await?;

    println!("\nExiting...");
    Ok(())
}
