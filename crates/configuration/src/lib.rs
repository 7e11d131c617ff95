use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, DatasetSettings, DisplaySettings, LoggingSettings, ServerSettings};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// The prefix for environment overrides, e.g. `ORDERSCOPE__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "ORDERSCOPE";

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, then the TOML file, then
/// `ORDERSCOPE__*` environment variables. An explicitly given file must exist; the
/// default `config.toml` is optional. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_layered(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_layered(path: Option<&Path>, env: config::Environment) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}
