mod catalog;
mod config;
mod error;
mod index;
mod lookup;
mod normalize;
mod printer;
mod render;
mod search;
mod sheet;
mod web_server;

use crate::config::AppConfig;
use crate::index::CatalogIndex;
use crate::printer::{PrintAction, SystemViewer};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "barcode_indexer", about = "Barcode lookup server and label tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Index the image tree and catalog, then serve the lookup UI.
    Serve,
    /// Render every catalog row into a labeled barcode PNG.
    Render,
    /// Lay rendered barcodes out onto printable PDF sheets.
    Sheets,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::new()?;

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting barcode_indexer");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let index = CatalogIndex::build(&config)?;
            info!(
                "Indexes ready: {} barcode images, {} searchable names",
                index.barcodes.len(),
                index.names.entries().len()
            );

            let printer: Arc<dyn PrintAction> = Arc::new(SystemViewer);
            if let Err(e) =
                web_server::start_web_server(Arc::new(config), Arc::new(index), printer).await
            {
                log::error!("Web server error: {}", e);
            }
        }
        Command::Render => {
            let stats = render::render_catalog(&config)?;
            info!(
                "Render finished: {} processed, {} skipped",
                stats.processed, stats.skipped
            );
        }
        Command::Sheets => {
            sheet::run_interactive(&config)?;
        }
    }

    info!("barcode_indexer finished");

    Ok(())
}
