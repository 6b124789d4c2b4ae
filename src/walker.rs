//! Document tree listing.
//!
//! Entries are visited depth-first in directory-listing order: a directory's
//! contents follow it immediately, nothing is sorted. Hidden entries (name
//! starting with `.`) are neither listed nor descended into.

use crate::error::{Error, Result};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// How many directory levels below the start directory to descend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    #[default]
    Unlimited,
    /// `Limited(0)` lists only the files directly inside the start directory.
    Limited(usize),
}

impl From<i64> for Depth {
    /// `-1` (or any negative value) means unlimited.
    fn from(depth: i64) -> Self {
        usize::try_from(depth).map_or(Self::Unlimited, Self::Limited)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

/// List document paths under `docs_root/dir`.
///
/// Returned paths are `/`-separated and keep `dir` as prefix, so that
/// `list_document_paths(root, "/", ..)` yields `/index.html`,
/// `/blog/post.html`, ...
pub fn list_document_paths(docs_root: &Path, dir: &str, depth: Depth) -> Result<Vec<String>> {
    let start = docs_root.join(dir.trim_start_matches('/'));
    let mut walker = WalkDir::new(&start).min_depth(1);
    if let Depth::Limited(levels) = depth {
        walker = walker.max_depth(levels + 1);
    }

    let prefix = dir.trim_end_matches('/');
    let mut paths = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(&start).to_path_buf();
            Error::io(path, err.into())
        })?;
        // Symlinks are neither listed nor followed.
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&start) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        paths.push(if prefix.is_empty() && !dir.starts_with('/') {
            relative
        } else {
            format!("{prefix}/{relative}")
        });
    }

    Ok(paths)
}
