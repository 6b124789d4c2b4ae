use crate::engine::{Engine, WeakEngine};
use crate::error::Result;
use crate::render;
use serde_json::{Value, json};

/// A layout: page shell a document is rendered into.
#[derive(Debug)]
pub struct Template {
    name: String,
    source: String,
    engine: WeakEngine,
}

impl Template {
    pub(crate) fn new(engine: &Engine, name: &str, source: String) -> Self {
        Self {
            name: name.to_owned(),
            source,
            engine: engine.downgrade(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render with `{ config, env, doc: data }`.
    pub fn render(&self, data: &Value) -> Result<String> {
        let engine = self.engine.upgrade()?;
        let settings = engine.settings();
        let context = json!({
            "config": settings.config.to_value(),
            "env": settings.env,
            "doc": data,
        });
        render::render(&engine, &self.name, &self.source, &context)
    }
}
