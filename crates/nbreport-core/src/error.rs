//! Error types for directive rewriting and artifact handling

use std::path::PathBuf;

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while preparing the markup source
#[derive(Error, Debug)]
pub enum CoreError {
    /// No notebook file in the working directory
    #[error("No .ipynb notebook found in {}", .0.display())]
    NotebookNotFound(PathBuf),

    /// More than one notebook and none was named
    #[error("Several notebooks found in {}: {}", .dir.display(), .candidates.join(", "))]
    AmbiguousNotebook {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    /// Anchor line missing while strict anchors are enabled
    #[error("No line matching `{pattern}` for the {directive} directive")]
    MissingAnchor {
        directive: &'static str,
        pattern: &'static str,
    },

    /// Config file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
