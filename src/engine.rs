//! The engine: owns configuration, resource cache and event bus, and is
//! the entry point for every lookup.
//!
//! # Architecture
//!
//! ```text
//! Engine (Arc<Shared>)
//!     │
//!     ├── settings ── ArcSwap<Settings>   env name + merged config
//!     ├── cache ───── ResourceCache       docs / templates / chunks / widgets
//!     ├── events ──── EventBus            beforeDocParse / afterDocParse / afterBuild
//!     └── loader ──── ExtensionLoader     plugins and widgets by name
//!
//! Document / Template / Chunk / Widget ── WeakEngine ──► Shared
//! ```
//!
//! `Engine` is a cheap handle; clones share the same state. Resources keep
//! a [`WeakEngine`] so the cache does not keep its own owner alive.

use crate::{
    cache::ResourceCache,
    config::{Config, SourceDir, Settings, defaults},
    error::{Error, Result},
    events::{Event, EventBus, EventKind},
    extension::{ExtensionLoader, Registry},
    log, render,
    resource::{Chunk, DocSource, Document, Template, Widget},
    walker::{self, Depth},
};
use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
};

/// Extension of layout and chunk files.
const TEMPLATE_EXT: &str = "html";

struct Shared {
    root: PathBuf,
    config_file: PathBuf,
    settings: ArcSwap<Settings>,
    cache: ResourceCache,
    events: EventBus,
    loader: Box<dyn ExtensionLoader>,
}

#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

/// Non-owning engine handle held by resources.
#[derive(Clone)]
pub struct WeakEngine(Weak<Shared>);

impl WeakEngine {
    pub fn upgrade(&self) -> Result<Engine> {
        self.0
            .upgrade()
            .map(|shared| Engine { shared })
            .ok_or(Error::EngineDropped)
    }
}

impl fmt::Debug for WeakEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakEngine")
    }
}

// ============================================================================
// Builder
// ============================================================================

pub struct EngineBuilder {
    root: PathBuf,
    config_file: Option<PathBuf>,
    registry: Registry,
    loader: Option<Box<dyn ExtensionLoader>>,
}

impl EngineBuilder {
    /// Config file, relative to the root unless absolute.
    /// Defaults to `zenpad.toml`.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn widget<F>(mut self, name: impl Into<String>, widget: F) -> Self
    where
        F: Fn(&Engine, &Map<String, Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.registry.widget(name, widget);
        self
    }

    /// Register a plugin. It runs at build time if a file of the same stem
    /// exists in the plugins directory.
    pub fn plugin<F>(mut self, name: impl Into<String>, plugin: F) -> Self
    where
        F: Fn(&Engine) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.registry.plugin(name, plugin);
        self
    }

    /// Replace the default registry. Widgets and plugins registered on the
    /// builder are ignored afterwards.
    pub fn loader(mut self, loader: impl ExtensionLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Load the `default` environment and activate plugins.
    pub fn build(self) -> Result<Engine> {
        let config_file = match self.config_file {
            Some(path) if path.is_absolute() => path,
            Some(path) => self.root.join(path),
            None => self.root.join(defaults::CONFIG_FILE),
        };
        let settings = Settings::load(Some(config_file.as_path()))?;
        let loader: Box<dyn ExtensionLoader> = match self.loader {
            Some(loader) => loader,
            None => Box::new(self.registry),
        };

        let engine = Engine {
            shared: Arc::new(Shared {
                root: self.root,
                config_file,
                settings: ArcSwap::from_pointee(settings),
                cache: ResourceCache::default(),
                events: EventBus::new(),
                loader,
            }),
        };
        engine.activate_plugins()?;
        Ok(engine)
    }
}

// ============================================================================
// Query
// ============================================================================

type DocFilter = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

/// Options of [`Engine::get_docs`].
#[derive(Clone, Default)]
pub struct Query {
    pub depth: Depth,
    filter: Option<DocFilter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    /// Keep only documents for which `filter` returns true.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    fn matches(&self, doc: &Document) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(doc))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("depth", &self.depth)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Engine
// ============================================================================

impl Engine {
    pub fn builder(root: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder {
            root: root.into(),
            config_file: None,
            registry: Registry::new(),
            loader: None,
        }
    }

    /// Engine over `root` with default settings and no extensions.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(root).build()
    }

    pub fn downgrade(&self) -> WeakEngine {
        WeakEngine(Arc::downgrade(&self.shared))
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    pub fn config_file(&self) -> &Path {
        &self.shared.config_file
    }

    /// Current environment name and config.
    pub fn settings(&self) -> Arc<Settings> {
        self.shared.settings.load_full()
    }

    /// Snapshot of the current config.
    pub fn config(&self) -> Config {
        self.shared.settings.load().config.clone()
    }

    pub fn env(&self) -> String {
        self.shared.settings.load().env.clone()
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.shared.cache
    }

    pub fn source_dir(&self, dir: SourceDir) -> PathBuf {
        self.shared.settings.load().config.source_dir(&self.shared.root, dir)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.shared.settings.load().config.build_dir(&self.shared.root)
    }

    /// Merge the `env` block of the config file over the current config.
    ///
    /// Does nothing when there is no config file. Resources already cached
    /// keep what they rendered under the previous config.
    pub fn set_environment(&self, env: &str) -> Result<()> {
        let current = self.settings();
        if let Some(next) = current.switch(Some(self.shared.config_file.as_path()), env)? {
            self.shared.settings.store(Arc::new(next));
            log!("config"; "environment `{}`", env);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    /// Document at `path` inside the docs directory, cached by `path`.
    pub fn get_doc(&self, path: &str) -> Result<Arc<Document>> {
        self.shared.cache.docs.get_or_load(path, || {
            let file = self
                .source_dir(SourceDir::Docs)
                .join(path.trim_start_matches('/'));
            let text = fs::read_to_string(&file).map_err(|err| Error::io(&file, err))?;
            Document::parse(self, path, DocSource::Text(text))
        })
    }

    /// Every document under `dir`, in listing order.
    pub fn get_docs(&self, dir: &str, query: &Query) -> Result<Vec<Arc<Document>>> {
        let docs_root = self.source_dir(SourceDir::Docs);
        let paths = walker::list_document_paths(&docs_root, dir, query.depth)?;

        let mut docs = Vec::with_capacity(paths.len());
        for path in paths {
            let doc = self.get_doc(&path)?;
            if query.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    /// In-memory document built from `props`. Not cached.
    pub fn create_doc(&self, url: &str, props: Map<String, Value>) -> Result<Document> {
        Document::parse(self, url, DocSource::Props(props))
    }

    // ------------------------------------------------------------------------
    // Templates, chunks, widgets
    // ------------------------------------------------------------------------

    pub fn template(&self, name: &str) -> Result<Arc<Template>> {
        self.shared.cache.templates.get_or_load(name, || {
            let source = self.read_source(SourceDir::Templates, name)?;
            Ok(Template::new(self, name, source))
        })
    }

    /// Render layout `name` with `data` as `doc`.
    pub fn get_template(&self, name: &str, data: &Value) -> Result<String> {
        self.template(name)?.render(data)
    }

    pub fn chunk(&self, name: &str) -> Result<Arc<Chunk>> {
        self.shared.cache.chunks.get_or_load(name, || {
            let source = self.read_source(SourceDir::Chunks, name)?;
            Ok(Chunk::new(self, name, source))
        })
    }

    pub fn get_chunk(&self, name: &str, data: &Value) -> Result<String> {
        self.chunk(name)?.render(data)
    }

    /// Widget `name`, resolved through the extension loader once and
    /// cached under `name`.
    pub fn widget(&self, name: &str) -> Result<Arc<Widget>> {
        self.shared.cache.widgets.get_or_load(name, || {
            let path = self.source_dir(SourceDir::Widgets).join(name);
            let func = self.shared.loader.load_widget(name, &path)?;
            Ok(Widget::new(self, name, func))
        })
    }

    pub fn get_widget(&self, name: &str, params: &Map<String, Value>) -> Result<Value> {
        self.widget(name)?.run(params)
    }

    /// Render a template string; `context` is an object or null.
    pub fn render_string(&self, source: &str, context: &Value) -> Result<String> {
        render::render(self, "<string>", source, context)
    }

    fn read_source(&self, dir: SourceDir, name: &str) -> Result<String> {
        let file = self.source_dir(dir).join(format!("{name}.{TEMPLATE_EXT}"));
        fs::read_to_string(&file).map_err(|err| Error::io(&file, err))
    }

    // ------------------------------------------------------------------------
    // Events and plugins
    // ------------------------------------------------------------------------

    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.shared.events.on(kind, listener);
    }

    pub fn emit(&self, event: &Event<'_>) -> Result<()> {
        self.shared.events.emit(event)
    }

    /// Run the plugin named after each file in the plugins directory, in
    /// file name order.
    fn activate_plugins(&self) -> Result<()> {
        let dir = self.source_dir(SourceDir::Plugins);
        if !dir.is_dir() {
            return Ok(());
        }

        let mut paths = fs::read_dir(&dir)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|e| e.path()))
                    .collect::<std::io::Result<Vec<_>>>()
            })
            .map_err(|err| Error::io(&dir, err))?;
        paths.sort();

        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !path.is_file() {
                continue;
            }
            let plugin = self.shared.loader.load_plugin(name, &path)?;
            plugin(self).map_err(|err| Error::Plugin(name.to_owned(), err))?;
            log!("plugin"; "{}", name);
        }
        Ok(())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.shared.root)
            .field("env", &self.env())
            .field("cache", &self.shared.cache)
            .field("events", &self.shared.events)
            .finish_non_exhaustive()
    }
}
