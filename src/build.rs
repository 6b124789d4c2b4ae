//! Site building orchestration.
//!
//! ```text
//! build_site()
//!     │
//!     ├── set_environment()        optional, cumulative over `default`
//!     ├── get_docs("/", unlimited) every document under the docs dir
//!     ├── doc.build()              render + write, one log line each
//!     └── emit(afterBuild)
//! ```
//!
//! The first failing document aborts the build.

use crate::{
    engine::{Engine, Query},
    error::Result,
    events::Event,
    log,
    walker::Depth,
};

/// Build every document, returning how many were written.
pub fn build_site(engine: &Engine, env: Option<&str>) -> Result<usize> {
    if let Some(env) = env {
        engine.set_environment(env)?;
    }

    let docs = engine.get_docs("/", &Query::new().depth(Depth::Unlimited))?;
    for doc in &docs {
        log!("build"; "> {}", doc.url());
        doc.build()?;
    }

    engine.emit(&Event::AfterBuild)?;
    log!("build"; "done ({} documents)", docs.len());
    Ok(docs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::events::EventKind;
    use std::fs;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };
    use tempfile::TempDir;

    fn write(root: &std::path::Path, path: &str, text: &str) {
        let file = root.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, text).unwrap();
    }

    #[test]
    fn test_build_writes_every_document() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/docs/index.html", "home");
        write(dir.path(), "src/docs/a/b.html", "nested");
        let engine = Engine::new(dir.path()).unwrap();

        assert_eq!(build_site(&engine, None).unwrap(), 2);
        let build = dir.path().join("build");
        assert_eq!(fs::read_to_string(build.join("index.html")).unwrap(), "home");
        assert_eq!(fs::read_to_string(build.join("a/b.html")).unwrap(), "nested");
    }

    #[test]
    fn test_build_switches_environment_first() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "zenpad.toml", "[prod]\nbuild_path = \"public\"\nsite_name = \"Prod\"\n");
        write(dir.path(), "src/docs/index.html", "{{ config.site_name }}@{{ env }}");
        let engine = Engine::new(dir.path()).unwrap();

        build_site(&engine, Some("prod")).unwrap();
        let out = fs::read_to_string(dir.path().join("public/index.html")).unwrap();
        assert_eq!(out, "Prod@prod");
    }

    #[test]
    fn test_after_build_fires_once_at_the_end() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/docs/index.html", "home");
        let engine = Engine::new(dir.path()).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let output = dir.path().join("build/index.html");
        engine.on(EventKind::AfterBuild, move |_| {
            assert!(output.exists(), "documents are written before afterBuild");
            assert!(!flag.swap(true, Ordering::SeqCst));
            Ok(())
        });

        build_site(&engine, None).unwrap();
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_failing_document_aborts_build() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/docs/bad.html", "{% if %}");
        let engine = Engine::new(dir.path()).unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        engine.on(EventKind::AfterBuild, move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert!(matches!(build_site(&engine, None), Err(Error::Render(..))));
        assert!(!fired.load(Ordering::SeqCst));
    }
}
