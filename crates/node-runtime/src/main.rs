//! # Ledger-Todo Node
//!
//! Entry point for the demo node. See the library docs for the startup
//! sequence.

use anyhow::{Context, Result};
use node_runtime::demo::{run_demo, view_json, DEMO_IDENTITY};
use node_runtime::{NodeConfig, NodeRuntime};
use shared_types::Address;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(fallback: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("loading configuration")?;
    init_tracing(&config.logging.level)?;

    let mut runtime = NodeRuntime::new(config);
    runtime.start()?;

    let identity: Address = DEMO_IDENTITY.parse()?;
    let view = run_demo(&runtime.container(), identity).await?;
    println!("{}", serde_json::to_string_pretty(&view_json(&view))?);

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
