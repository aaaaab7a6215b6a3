//! Expands CLI path arguments into batch files.
//!
//! A file argument is one batch. A directory argument contributes every
//! `*.jsonl` file below it, sorted, without following symlinks.

use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Upper bound on batches discovered from directories.
const MAX_BATCH_FILES: usize = 10_000;

const BATCH_EXTENSION: &str = "jsonl";

pub fn collect_batches(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for p in paths {
        let meta = fs::symlink_metadata(p).with_context(|| format!("stat {}", p.display()))?;
        if meta.is_dir() {
            out.extend(walk_dir(p)?);
        } else {
            // Symlink and size checks happen when the file is read.
            out.push(p.clone());
        }
        if out.len() > MAX_BATCH_FILES {
            return Err(anyhow!(
                "Too many batch files: {} (max {MAX_BATCH_FILES})",
                out.len()
            ));
        }
    }
    Ok(out)
}

fn walk_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some(BATCH_EXTENSION) {
            continue;
        }
        files.push(entry.into_path());
        if files.len() > MAX_BATCH_FILES {
            return Err(anyhow!(
                "Too many batch files in {} (max {MAX_BATCH_FILES})",
                dir.display()
            ));
        }
    }
    files.sort();
    Ok(files)
}
