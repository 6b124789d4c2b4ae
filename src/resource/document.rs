//! Documents: front matter, body, optional layout.
//!
//! A document source may start with a YAML header between two `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! layout: post
//! ---
//! Body, in template syntax.
//! ```
//!
//! The body is rendered once, when the document is constructed. At that
//! point the document exposes only `url` and `raw_content`; header fields
//! are applied afterwards and so are visible to the layout, not the body.

use crate::engine::{Engine, WeakEngine};
use crate::error::{Error, Result};
use crate::events::Event;
use crate::render;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::{fs, path::PathBuf, sync::LazyLock};

/// A line made of exactly three dashes.
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^-{3}\r?$").unwrap());

/// Raw input a document is built from.
#[derive(Debug, Clone)]
pub enum DocSource {
    /// File contents, front matter included.
    Text(String),
    /// Ready-made fields; no header parsing, no body render.
    Props(Map<String, Value>),
}

#[derive(Debug)]
pub struct Document {
    url: String,
    raw_content: String,
    content: String,
    layout: Option<String>,
    front_matter: Map<String, Value>,
    engine: WeakEngine,
}

impl Document {
    pub(crate) fn parse(engine: &Engine, path: &str, source: DocSource) -> Result<Self> {
        let url = normalize_url(path);
        engine.emit(&Event::BeforeDocParse {
            url: &url,
            source: &source,
        })?;

        let mut doc = Self {
            url,
            raw_content: String::new(),
            content: String::new(),
            layout: None,
            front_matter: Map::new(),
            engine: engine.downgrade(),
        };

        match source {
            DocSource::Text(text) => {
                let (header, body) = split_front_matter(&text);
                doc.front_matter = parse_front_matter(header)
                    .map_err(|err| Error::FrontMatter(path.to_owned(), err))?;
                doc.raw_content = body.to_owned();

                let settings = engine.settings();
                let context = json!({
                    "config": settings.config.to_value(),
                    "env": settings.env,
                    "doc": {
                        "url": doc.url,
                        "raw_content": doc.raw_content,
                    },
                });
                doc.content = render::render(engine, &doc.url, &doc.raw_content, &context)?;
            }
            DocSource::Props(props) => doc.front_matter = props,
        }

        doc.apply_front_matter();
        engine.emit(&Event::AfterDocParse(&doc))?;
        Ok(doc)
    }

    /// Copy structural header fields onto the document.
    fn apply_front_matter(&mut self) {
        for (key, value) in &self.front_matter {
            match (key.as_str(), value) {
                ("url", Value::String(url)) => self.url = normalize_url(url),
                ("raw_content", Value::String(raw)) => self.raw_content.clone_from(raw),
                ("content", Value::String(content)) => self.content.clone_from(content),
                ("layout", Value::String(layout)) => {
                    self.layout = (!layout.is_empty()).then(|| layout.clone());
                }
                ("layout", Value::Null) => self.layout = None,
                _ => {}
            }
        }
    }

    /// Source-relative path, never starting with `/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Body after its construction-time render.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn front_matter(&self) -> &Map<String, Value> {
        &self.front_matter
    }

    /// Header field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.front_matter.get(key)
    }

    /// Template view: document fields, then every other header field.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("url".into(), Value::String(self.url.clone()));
        map.insert("raw_content".into(), Value::String(self.raw_content.clone()));
        map.insert("content".into(), Value::String(self.content.clone()));
        map.insert(
            "layout".into(),
            self.layout.clone().map_or(Value::Null, Value::String),
        );
        for (key, value) in &self.front_matter {
            if !is_structural(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        Value::Object(map)
    }

    /// Final page: through the layout when there is one, else the body.
    pub fn render(&self) -> Result<String> {
        let engine = self.engine.upgrade()?;
        match &self.layout {
            Some(layout) => engine.get_template(layout, &self.to_value()),
            None => render::render(&engine, &self.url, &self.content, &Value::Null),
        }
    }

    /// Write the rendered page to `<build_dir>/<url>`, returning that path.
    pub fn build(&self) -> Result<PathBuf> {
        let engine = self.engine.upgrade()?;
        let dest = engine.build_dir().join(&self.url);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
        let html = self.render()?;
        fs::write(&dest, html).map_err(|err| Error::io(&dest, err))?;
        Ok(dest)
    }
}

fn normalize_url(path: &str) -> String {
    path.trim_start_matches('/').to_owned()
}

/// Header keys backed by document fields. Values of the wrong type are
/// ignored rather than shadowing the field in the template view.
fn is_structural(key: &str) -> bool {
    matches!(key, "url" | "raw_content" | "content" | "layout")
}

/// Split `text` into `(header, body)`.
///
/// Without two delimiter lines the header is empty and `text` is the body.
fn split_front_matter(text: &str) -> (&str, &str) {
    let parts: Vec<&str> = DELIMITER.splitn(text, 3).collect();
    match parts.as_slice() {
        [_, header, body] => (header.trim(), body.trim()),
        _ => ("", text),
    }
}

fn parse_front_matter(header: &str) -> Result<Map<String, Value>, serde_yaml::Error> {
    if header.is_empty() {
        return Ok(Map::new());
    }
    serde_yaml::from_str::<Option<Map<String, Value>>>(header).map(Option::unwrap_or_default)
}
