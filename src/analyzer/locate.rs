//! Resolution of user supplied names to python source.
//!
//! A name can be a `.py` file, a `.pyc` file (its `.py` sibling is read), a
//! package directory, a plain directory, or a dotted module name looked up
//! in the search paths.
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DocuError, Result};
use crate::parser::parse_bytes;
use crate::symbols::ModuleSymbolTree;

static DOTTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*$").unwrap());

/// A module that was found, with the name it is documented under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub module_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Module(ResolvedSource),
    /// A directory that is not a package; every file in it is documented
    Directory(PathBuf),
}

/// Display name for a source file: the file stem, or the package name for
/// `__init__.py`.
pub fn module_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == "__init__" {
        if let Some(dir) = path.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// Read and parse one resolved module.
pub fn read_module(source: &ResolvedSource) -> Result<ModuleSymbolTree> {
    let bytes = fs::read(&source.path)?;
    debug!(module = %source.module_name, path = %source.path.display(), "read module");
    parse_bytes(&source.module_name, &bytes)
}

#[derive(Debug, Clone, Default)]
pub struct Locator {
    search_paths: Vec<PathBuf>,
}

impl Locator {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// `extra` paths first, then `PYTHONPATH`, then the working directory.
    pub fn from_env(extra: Vec<PathBuf>) -> Self {
        let mut search_paths = extra;
        if let Some(python_path) = env::var_os("PYTHONPATH") {
            search_paths.extend(env::split_paths(&python_path));
        }
        search_paths.push(PathBuf::from("."));
        Self::new(search_paths)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn resolve(&self, name: &str) -> Result<Resolution> {
        let trimmed = name.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);
        if trimmed.is_empty() {
            return Err(DocuError::NotFound {
                name: name.to_string(),
            });
        }
        let path = Path::new(trimmed);

        if path.is_dir() {
            let init = path.join("__init__.py");
            if init.is_file() {
                return Ok(Resolution::Module(ResolvedSource {
                    module_name: module_name_for(&init),
                    path: init,
                }));
            }
            return Ok(Resolution::Directory(path.to_path_buf()));
        }

        let extension = path.extension().and_then(|e| e.to_str());
        match extension {
            Some("py") | Some("pyc") => {
                let py = path.with_extension("py");
                if py.is_file() {
                    Ok(Resolution::Module(ResolvedSource {
                        module_name: module_name_for(&py),
                        path: py,
                    }))
                } else {
                    Err(DocuError::NotFound {
                        name: name.to_string(),
                    })
                }
            }
            Some(_) if path.is_file() => Err(DocuError::FileKind {
                path: path.to_path_buf(),
            }),
            _ if DOTTED_NAME.is_match(trimmed) => self.find_module(trimmed),
            Some(_) => Err(DocuError::FileKind {
                path: path.to_path_buf(),
            }),
            None => Err(DocuError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Look up `pkg.mod` as `pkg/mod.py` or `pkg/mod/__init__.py` under
    /// each search path, in order.
    pub fn find_module(&self, dotted: &str) -> Result<Resolution> {
        let relative: PathBuf = dotted.split('.').collect();
        for root in &self.search_paths {
            let base = root.join(&relative);
            for candidate in [base.with_extension("py"), base.join("__init__.py")] {
                if candidate.is_file() {
                    debug!(module = dotted, path = %candidate.display(), "resolved module");
                    return Ok(Resolution::Module(ResolvedSource {
                        module_name: dotted.to_string(),
                        path: candidate,
                    }));
                }
            }
        }
        Err(DocuError::NotFound {
            name: dotted.to_string(),
        })
    }

    /// Resolve `name` and parse it. A plain directory is not a module.
    pub fn load(&self, name: &str) -> Result<ModuleSymbolTree> {
        match self.resolve(name)? {
            Resolution::Module(source) => read_module(&source),
            Resolution::Directory(_) => Err(DocuError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}
