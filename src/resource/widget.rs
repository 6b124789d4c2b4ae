use crate::engine::{Engine, WeakEngine};
use crate::error::{Error, Result};
use crate::extension::WidgetFn;
use serde_json::{Map, Value};
use std::fmt;

/// A named callable producing inline content.
pub struct Widget {
    name: String,
    func: WidgetFn,
    engine: WeakEngine,
}

impl Widget {
    pub(crate) fn new(engine: &Engine, name: &str, func: WidgetFn) -> Self {
        Self {
            name: name.to_owned(),
            func,
            engine: engine.downgrade(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the widget; its result is returned as is.
    pub fn run(&self, params: &Map<String, Value>) -> Result<Value> {
        let engine = self.engine.upgrade()?;
        (self.func)(&engine, params).map_err(|err| Error::Widget(self.name.clone(), err))
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget").field("name", &self.name).finish_non_exhaustive()
    }
}
