use crate::engine::{Engine, WeakEngine};
use crate::error::Result;
use crate::render;
use serde_json::Value;

/// A reusable snippet rendered with caller-supplied data.
#[derive(Debug)]
pub struct Chunk {
    name: String,
    source: String,
    engine: WeakEngine,
}

impl Chunk {
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

    /// Render with `data` as the whole context.
    pub fn render(&self, data: &Value) -> Result<String> {
        let engine = self.engine.upgrade()?;
        render::render(&engine, &self.name, &self.source, data)
    }
}
