//! Configuration settings

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directives::Directives;
use crate::error::Result;
use crate::rewriter::RewriteOptions;

/// File names probed by [`Settings::discover`], in order
pub const CONFIG_CANDIDATES: [&str; 2] = ["nbreport.toml", ".nbreport.toml"];

/// Top-level settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// External tool commands
    pub tools: ToolSettings,
    /// Directives applied to the markup source
    pub directives: Directives,
    /// Rewriter switches
    pub rewrite: RewriteOptions,
    /// Intermediate artifacts removed after a build
    pub clean: CleanSettings,
    /// Directory/file substitutions; accepted but not applied
    pub replace: BTreeMap<String, String>,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the first config file found in `dir`, or defaults
    pub fn discover(dir: &Path) -> Result<Self> {
        for candidate in CONFIG_CANDIDATES {
            let path = dir.join(candidate);
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }
}

/// External tool commands; each may carry its own arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Notebook to LaTeX converter
    pub converter: String,
    /// LaTeX compiler
    pub compiler: String,
    /// Bibliography compiler
    pub bibliography: String,
    /// Keep code cell inputs in the document
    pub include_input: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            converter: "jupyter nbconvert".to_string(),
            compiler: "pdflatex".to_string(),
            bibliography: "bibtex".to_string(),
            include_input: false,
        }
    }
}

/// Artifact suffixes removed by the cleaner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanSettings {
    /// Appended to the notebook id to name files
    pub extensions: Vec<String>,
    /// Appended to the notebook id to name directories
    pub directories: Vec<String>,
}

impl Default for CleanSettings {
    fn default() -> Self {
        Self {
            extensions: [".aux", ".bbl", ".blg", ".out", ".tex"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            directories: vec!["_files".to_string()],
        }
    }
}
