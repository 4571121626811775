use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocuError>;

/// Errors surfaced to callers of the documentation pipeline.
///
/// The line parser itself never fails: unmatched lines are skipped and
/// truncated constructs return what was accumulated. Everything here comes
/// from the boundary (input decoding, module resolution, output).
#[derive(Debug, Error)]
pub enum DocuError {
    /// The input could not be treated as source text
    #[error("{name}: input is not text ({reason})")]
    InputType { name: String, reason: String },

    /// The resolved input is not a python source file or package
    #[error("wrong file type for {}: only python files ('.py') or python modules are supported", .path.display())]
    FileKind { path: PathBuf },

    /// The locator could not map the name to any source
    #[error("module {name} could not be found")]
    NotFound { name: String },

    #[error("function \"{function}\" not found in {module}")]
    FunctionNotFound { function: String, module: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
