//! Removal of intermediate build artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::CleanSettings;
use crate::error::Result;
use crate::notebook::Notebook;

/// What a cleanup pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
}

impl CleanSummary {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty()
    }
}

/// Deletes `<id><ext>` files and `<id><suffix>` directories
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    settings: CleanSettings,
}

impl Cleaner {
    pub fn new(settings: CleanSettings) -> Self {
        Self { settings }
    }

    /// Remove the artifacts of `notebook` found in `dir`
    ///
    /// Absent artifacts are skipped. A failing removal is returned as an
    /// error and stops the pass.
    pub fn clean(&self, dir: &Path, notebook: &Notebook) -> Result<CleanSummary> {
        let mut summary = CleanSummary::default();

        for ext in &self.settings.extensions {
            let path = dir.join(notebook.with_suffix(ext));
            if path.is_file() {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "removed file");
                summary.files.push(path);
            }
        }

        for suffix in &self.settings.directories {
            let path = dir.join(notebook.with_suffix(suffix));
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
                debug!(path = %path.display(), "removed directory");
                summary.directories.push(path);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("nb.aux"), "").unwrap();
        fs::write(root.join("nb.tex"), "").unwrap();
        fs::create_dir(root.join("nb_files")).unwrap();
        fs::write(root.join("nb_files").join("output_1.png"), "").unwrap();

        let summary = Cleaner::default()
            .clean(root, &Notebook::new("nb"))
            .unwrap();

        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.directories, vec![root.join("nb_files")]);
        assert!(!root.join("nb.aux").exists());
        assert!(!root.join("nb.tex").exists());
        assert!(!root.join("nb_files").exists());
    }

    #[test]
    fn test_clean_twice_is_quiet() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("nb.aux"), "").unwrap();

        let cleaner = Cleaner::default();
        let nb = Notebook::new("nb");
        cleaner.clean(dir.path(), &nb).unwrap();
        let second = cleaner.clean(dir.path(), &nb).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_clean_leaves_other_artifacts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("nb.pdf"), "").unwrap();
        fs::write(root.join("nb.ipynb"), "{}").unwrap();
        fs::write(root.join("other.aux"), "").unwrap();

        Cleaner::default().clean(root, &Notebook::new("nb")).unwrap();

        assert!(root.join("nb.pdf").exists());
        assert!(root.join("nb.ipynb").exists());
        assert!(root.join("other.aux").exists());
    }
}
