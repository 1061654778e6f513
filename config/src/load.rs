use serde::de::DeserializeOwned;

use crate::environment::Environment;

/// Directory containing configuration files relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Base configuration file loaded for all environments.
const BASE_CONFIG_FILE: &str = "base.yaml";

/// Prefix for environment variable configuration overrides.
const ENV_PREFIX: &str = "APP";

/// Separator between the environment variable prefix and key segments.
const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested configuration keys in environment variables.
///
/// Example: `APP_SOURCE__HOST` sets the `source.host` field.
const ENV_SEPARATOR: &str = "__";

/// Loads hierarchical configuration from YAML files and environment variables.
///
/// Sources are layered in this order, later ones overriding earlier ones:
/// 1. `configuration/base.yaml`
/// 2. `configuration/{environment}.yaml`
/// 3. `APP`-prefixed environment variables, with `__` separating nested keys.
///
/// # Panics
/// Panics if the current directory cannot be determined or if `APP_ENVIRONMENT`
/// cannot be parsed.
pub fn load_config<T>() -> Result<T, rust_cli_config::ConfigError>
where
    T: DeserializeOwned,
{
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join(CONFIGURATION_DIR);

    let environment = Environment::load().expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{environment}.yaml");

    let settings = rust_cli_config::Config::builder()
        .add_source(rust_cli_config::File::from(
            configuration_directory.join(BASE_CONFIG_FILE),
        ))
        .add_source(rust_cli_config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            rust_cli_config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_PREFIX_SEPARATOR)
                .separator(ENV_SEPARATOR),
        )
        .build()?;

    settings.try_deserialize::<T>()
}
