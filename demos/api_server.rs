//! REST API server example
//!
//! Runs the harvester behind HTTP until Ctrl+C or SIGTERM.
//!
//! ```bash
//! DOC_HARVESTER_BUCKET=documents cargo run --example api_server
//! ```

use doc_harvester::{Config, DocHarvester};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::default().with_env_overrides()?;
    let harvester = Arc::new(DocHarvester::new(config.clone())?);
    let config = Arc::new(config);

    let base = format!("http://{}/api/v1", config.api.bind_address);
    println!("API Base: {base}");
    println!("OpenAPI:  {base}/openapi.json");
    println!();
    println!("Example:");
    println!("  curl -X POST {base}/harvest \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"url\": \"https://example.com/reports/\"}}'");

    doc_harvester::api::serve_until_signal(harvester, config).await?;

    Ok(())
}
