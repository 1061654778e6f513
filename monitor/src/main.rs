use telemetry::init_tracing;

use crate::config::load_monitor_config;
use crate::core::start_monitor;

mod config;
mod core;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_name = env!("CARGO_BIN_NAME");

    let _log_flusher = init_tracing(app_name)?;

    let config = load_monitor_config()?;
    start_monitor(config).await?;

    Ok(())
}
