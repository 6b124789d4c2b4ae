//! Loading of plugins and widgets.
//!
//! The engine never loads code itself: it asks an [`ExtensionLoader`] for
//! a plugin registration function or a widget callable by name. The default
//! loader is an in-process [`Registry`] of Rust closures.

use crate::engine::Engine;
use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::{fmt, path::Path, sync::Arc};

/// Called once at engine construction, typically to register listeners.
pub type PluginFn = Arc<dyn Fn(&Engine) -> anyhow::Result<()> + Send + Sync>;

/// Produces inline content: a string, or a structured value.
pub type WidgetFn =
    Arc<dyn Fn(&Engine, &Map<String, Value>) -> anyhow::Result<Value> + Send + Sync>;

pub trait ExtensionLoader: Send + Sync {
    /// Resolve the plugin named `name`, found on disk at `path`.
    fn load_plugin(&self, name: &str, path: &Path) -> Result<PluginFn>;

    /// Resolve the widget named `name`, expected under `path`.
    fn load_widget(&self, name: &str, path: &Path) -> Result<WidgetFn>;
}

/// Name-keyed table of compiled-in plugins and widgets.
#[derive(Default, Clone)]
pub struct Registry {
    plugins: FxHashMap<String, PluginFn>,
    widgets: FxHashMap<String, WidgetFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin<F>(&mut self, name: impl Into<String>, plugin: F) -> &mut Self
    where
        F: Fn(&Engine) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.plugins.insert(name.into(), Arc::new(plugin));
        self
    }

    pub fn widget<F>(&mut self, name: impl Into<String>, widget: F) -> &mut Self
    where
        F: Fn(&Engine, &Map<String, Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.widgets.insert(name.into(), Arc::new(widget));
        self
    }
}

impl ExtensionLoader for Registry {
    fn load_plugin(&self, name: &str, _path: &Path) -> Result<PluginFn> {
        self.plugins
            .get(name)
            .cloned()
            .ok_or_else(|| Error::PluginNotFound(name.to_owned()))
    }

    fn load_widget(&self, name: &str, _path: &Path) -> Result<WidgetFn> {
        self.widgets
            .get(name)
            .cloned()
            .ok_or_else(|| Error::WidgetNotFound(name.to_owned()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("widgets", &self.widgets.keys().collect::<Vec<_>>())
            .finish()
    }
}
