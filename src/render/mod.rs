//! Template rendering over `tera`.
//!
//! Every call compiles its source from scratch and executes it at once;
//! reuse happens one level up, where resources cache their source text.
//! Helpers (`widget`, `chunk`, `date`, `cut`, `assert`) are registered per
//! call so they can see the engine and the data of the current render.

pub mod helpers;

use crate::engine::Engine;
use crate::error::{Error, Result};
use serde_json::Value;
use tera::{Context, Tera};

/// Compile `source` and execute it against `context`.
///
/// `context` must be an object, or null for an empty context. `name` only
/// labels errors.
pub fn render(engine: &Engine, name: &str, source: &str, context: &Value) -> Result<String> {
    let ctx = match context {
        Value::Null => Context::new(),
        Value::Object(_) => {
            Context::from_value(context.clone()).map_err(|err| Error::Render(name.to_owned(), err))?
        }
        other => return Err(Error::Context(other.to_string())),
    };

    let mut tera = Tera::default();
    helpers::register(&mut tera, engine, context);
    tera.render_str(source, &ctx)
        .map_err(|err| Error::Render(name.to_owned(), err))
}
