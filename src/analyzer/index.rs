use dashmap::DashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::locate::module_name_for;
use crate::cache::IncrementalCache;
use crate::error::Result;
use crate::parser::{decode_source, parse};
use crate::symbols::ModuleSymbolTree;

/// Directories never worth documenting
const SKIPPED_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    "venv",
    ".venv",
    "build",
    "dist",
    "target",
];

#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Descend into subdirectories instead of only the top level
    pub recursive: bool,
}

#[derive(Serialize)]
struct IndexSnapshot {
    modules: BTreeMap<String, ModuleSymbolTree>,
    failures: BTreeMap<String, String>,
}

/// Symbol trees for every python file of a directory, built in parallel.
pub struct ProjectIndex {
    pub trees: Arc<DashMap<PathBuf, ModuleSymbolTree>>,
    /// Files that could not be documented, with the reason
    pub failures: Arc<DashMap<PathBuf, String>>,
}

impl ProjectIndex {
    pub fn index_directory(
        root: &Path,
        options: &IndexOptions,
        cache: Option<&IncrementalCache<ModuleSymbolTree>>,
    ) -> Self {
        let files = find_python_files(root, options.recursive);
        info!(root = %root.display(), files = files.len(), "documenting directory");

        let trees = Arc::new(DashMap::new());
        let failures = Arc::new(DashMap::new());

        files.par_iter().for_each(|path| match document_file(path, cache) {
            Ok(tree) => {
                trees.insert(path.clone(), tree);
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping file");
                failures.insert(path.clone(), err.to_string());
            }
        });

        Self { trees, failures }
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Names of every module that has a tree in this index.
    pub fn documented_modules(&self) -> BTreeSet<String> {
        self.trees
            .iter()
            .map(|entry| entry.value().module_name.clone())
            .collect()
    }

    /// Trees ordered by file path.
    pub fn trees(&self) -> Vec<(PathBuf, ModuleSymbolTree)> {
        let mut out: Vec<_> = self
            .trees
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn failures(&self) -> Vec<(PathBuf, String)> {
        let mut out: Vec<_> = self
            .failures
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn to_json(&self) -> Result<String> {
        let modules = self
            .trees()
            .into_iter()
            .map(|(path, tree)| (path.display().to_string(), tree))
            .collect();
        let failures = self
            .failures()
            .into_iter()
            .map(|(path, reason)| (path.display().to_string(), reason))
            .collect();
        Ok(serde_json::to_string_pretty(&IndexSnapshot { modules, failures })?)
    }
}

fn document_file(
    path: &Path,
    cache: Option<&IncrementalCache<ModuleSymbolTree>>,
) -> Result<ModuleSymbolTree> {
    let module_name = module_name_for(path);
    let bytes = fs::read(path)?;
    let text = decode_source(&module_name, &bytes)?;
    if let Some(tree) = cache.and_then(|c| c.get(path, text)) {
        return Ok(tree);
    }
    let tree = parse(&module_name, text);
    if let Some(cache) = cache {
        cache.set(path, text, tree.clone());
    }
    debug!(path = %path.display(), "documented file");
    Ok(tree)
}

/// Every `.py` file under `root`, sorted. Only the top level unless
/// `recursive` is set.
pub fn find_python_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut out: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !SKIPPED_DIRS.iter().any(|s| e.file_name() == *s)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "py"))
        .collect();
    out.sort();
    out
}
