//! Harvest one page from the command line
//!
//! Stores every PDF linked from the page under `./objects/<bucket>/pdfs/` and
//! prints the batch report as JSON.
//!
//! ```bash
//! DOC_HARVESTER_BUCKET=documents RUST_LOG=doc_harvester=debug \
//!     cargo run --example harvest_page -- https://example.com/reports/
//! ```
//!
//! An optional second argument names a JSON config file.

use doc_harvester::{Config, DocHarvester, Event};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_default();

    let config = match args.next() {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    }
    .with_env_overrides()?;

    let harvester = DocHarvester::new(config)?;

    let mut events = harvester.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::ItemStored {
                    index,
                    total,
                    storage_key,
                    ..
                } => println!("[{index}/{total}] stored {storage_key}"),
                Event::ItemFailed {
                    index, total, error, ..
                } => println!("[{index}/{total}] failed: {error}"),
                _ => {}
            }
        }
    });

    let report = harvester.harvest(&url).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
