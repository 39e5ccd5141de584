//! Notebook identifier and derived artifact names.
//!
//! Every file the pipeline touches is named after the notebook base name:
//!
//! | Artifact | Name |
//! |----------|------|
//! | notebook | `<id>.ipynb` |
//! | markup source | `<id>.tex` |
//! | auxiliary file | `<id>.aux` |
//! | final document | `<id>.pdf` |
//! | conversion log | `<id>.to-tex.log` |
//! | compile log | `<id>.build-tex.log` |

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{CoreError, Result};

const NOTEBOOK_EXT: &str = "ipynb";

/// Base name identifying a notebook and all of its derived artifacts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Notebook {
    id: String,
}

impl Notebook {
    /// Create from a base name or a `.ipynb` file name
    ///
    /// Any directory part is dropped; artifacts are always resolved against
    /// the working directory of the build.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        let file = Path::new(name)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(name);
        let id = file
            .strip_suffix(&format!(".{NOTEBOOK_EXT}"))
            .unwrap_or(file)
            .to_string();
        Self { id }
    }

    /// Pick the single notebook in `dir`
    pub fn detect(dir: &Path) -> Result<Self> {
        let mut candidates: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(NOTEBOOK_EXT)
            })
            .filter_map(|path| path.file_name().and_then(|f| f.to_str()).map(String::from))
            .collect();
        candidates.sort();

        match candidates.len() {
            0 => Err(CoreError::NotebookNotFound(dir.to_path_buf())),
            1 => Ok(Self::new(&candidates[0])),
            _ => Err(CoreError::AmbiguousNotebook {
                dir: dir.to_path_buf(),
                candidates,
            }),
        }
    }

    /// The bare identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name formed by the identifier plus a suffix (`.aux`, `_files`, ...)
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}{}", self.id, suffix)
    }

    pub fn notebook_file(&self) -> String {
        self.with_suffix(".ipynb")
    }

    pub fn tex_file(&self) -> String {
        self.with_suffix(".tex")
    }

    pub fn aux_file(&self) -> String {
        self.with_suffix(".aux")
    }

    pub fn pdf_file(&self) -> String {
        self.with_suffix(".pdf")
    }

    /// Log capturing the converter output
    pub fn convert_log(&self) -> String {
        self.with_suffix(".to-tex.log")
    }

    /// Log capturing every typesetting and bibliography pass
    pub fn compile_log(&self) -> String {
        self.with_suffix(".build-tex.log")
    }
}

impl fmt::Display for Notebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
