//! Default values for configuration fields.
//!
//! One function per option, referenced by the `educe` defaults of the
//! built-in option set.

pub fn build_path() -> String {
    "build".into()
}

pub fn src_path() -> String {
    "src".into()
}

pub fn templates_dir() -> String {
    "layouts".into()
}

pub fn widgets_dir() -> String {
    "widgets".into()
}

pub fn plugins_dir() -> String {
    "plugins".into()
}

pub fn chunks_dir() -> String {
    "chunks".into()
}

pub fn docs_dir() -> String {
    "docs".into()
}

pub fn locale() -> String {
    "en".into()
}

pub fn site_name() -> String {
    "ZenPad".into()
}

pub fn site_url() -> String {
    "http://localhost:8080/".into()
}

pub fn cut_tag() -> String {
    "<!-- cut -->".into()
}

/// Name of the environment active before any switch.
pub fn environment() -> String {
    "default".into()
}

/// Config file looked up in the project root.
pub const CONFIG_FILE: &str = "zenpad.toml";
