//! Configuration loading
//!
//! Settings are layered: built-in defaults, then `config/default.toml` (if
//! present), then `JACK__SECTION__FIELD` environment variables. The binary
//! applies command line flags on top.

mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{
    BenchSettings, ClientSettings, LogSettings, PartialSettings, ServerSettings, Settings,
    StoreSettings, TickerSettings,
};

pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Loads the configuration from the default file and environment variables.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

/// Like `load_config`, reading the optional file at `path` (extension may be
/// omitted) instead of `config/default`.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("JACK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;
