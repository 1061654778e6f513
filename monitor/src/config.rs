use config::load_config;
use config::shared::MonitorConfig;

/// Loads the [`MonitorConfig`] and validates it.
pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let config = load_config::<MonitorConfig>()?;
    config.validate()?;

    Ok(config)
}
