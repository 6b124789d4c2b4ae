//! Errors raised while loading `zenpad.toml` and merging environments.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error in `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    /// A top-level entry selected as environment is not a table.
    #[error("environment `{env}` in `{path}` must be a table")]
    EnvironmentBlock { env: String, path: PathBuf },

    /// A merged option holds a value of the wrong type.
    #[error("Config validation error: {0}")]
    Validation(String),
}
