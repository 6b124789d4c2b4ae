//! The four renderable or callable units an engine hands out.

mod chunk;
mod document;
mod template;
mod widget;

pub use chunk::Chunk;
pub use document::{DocSource, Document};
pub use template::Template;
pub use widget::Widget;
