//! Error types shared by the engine and its resources.

use crate::config::ConfigError;
use crate::events::EventKind;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid front matter in `{0}`")]
    FrontMatter(String, #[source] serde_yaml::Error),

    #[error("failed to render `{0}`")]
    Render(String, #[source] tera::Error),

    #[error("render context must be an object, got `{0}`")]
    Context(String),

    #[error("widget `{0}` not found")]
    WidgetNotFound(String),

    #[error("widget `{0}` failed")]
    Widget(String, #[source] anyhow::Error),

    #[error("plugin `{0}` not found")]
    PluginNotFound(String),

    #[error("plugin `{0}` failed")]
    Plugin(String, #[source] anyhow::Error),

    #[error("`{0}` listener failed")]
    Listener(EventKind, #[source] anyhow::Error),

    #[error("engine was dropped while a resource still referenced it")]
    EngineDropped,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(path.into(), err)
    }
}
