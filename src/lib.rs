//! ZenPad - a static site generator.
//!
//! Documents, layouts, chunks and widgets under a source tree are rendered
//! through [`tera`] templates into a build directory.
//!
//! ```no_run
//! use zenpad::{Engine, build::build_site};
//!
//! let engine = Engine::builder("my-site")
//!     .widget("year", |_, _| Ok(serde_json::json!(2024)))
//!     .build()?;
//! build_site(&engine, Some("prod"))?;
//! # Ok::<(), zenpad::Error>(())
//! ```

pub mod logger;

pub mod build;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod extension;
pub mod render;
pub mod resource;
pub mod utils;
pub mod walker;

pub use engine::{Engine, EngineBuilder, Query, WeakEngine};
pub use error::{Error, Result};
pub use events::{Event, EventKind};
pub use extension::{ExtensionLoader, Registry};
pub use resource::{Chunk, DocSource, Document, Template, Widget};
pub use walker::Depth;
