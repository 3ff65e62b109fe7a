//! Source discovery
//!
//! Walks the input directory with the ignore crate (gitignore rules apply,
//! hidden entries are skipped) and returns Markdown sources in stable order.

use anyhow::{ensure, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::model::{Meta, ReportItem};
use crate::core::paths::{is_markdown, make_relative};
use crate::core::util::{get_file_size, get_mtime_ms};

/// A discovered Markdown source
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Normalized path relative to the input root
    pub rel: String,
    /// Absolute path on disk
    pub abs: PathBuf,
    pub size: u64,
    pub mtime_ms: i64,
}

impl SourceFile {
    pub fn to_report_item(&self) -> ReportItem {
        ReportItem::document(self.rel.clone()).with_meta(Meta {
            size: Some(self.size),
            mtime_ms: Some(self.mtime_ms),
            ..Default::default()
        })
    }
}

/// Scan `root` for Markdown sources, sorted by relative path
pub fn scan_sources(root: &Path) -> Result<Vec<SourceFile>> {
    ensure!(
        root.is_dir(),
        "input directory does not exist: {}",
        root.display()
    );

    let mut sources = Vec::new();

    for entry in WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let path = entry.path();
        // Dangling symlinks and other unreadable entries stay in the list
        // so the read stage can report them.
        if path.is_dir() || !is_markdown(path) {
            continue;
        }

        let rel = match make_relative(path, root) {
            Some(r) => r,
            None => continue,
        };

        let size = get_file_size(path).unwrap_or(0);
        let mtime_ms = get_mtime_ms(path).unwrap_or(0);

        sources.push(SourceFile {
            rel,
            abs: path.to_path_buf(),
            size,
            mtime_ms,
        });
    }

    sources.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(sources)
}
