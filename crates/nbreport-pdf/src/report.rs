//! Build orchestration: convert, rewrite, compile, clean.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use nbreport_core::{CleanSummary, Cleaner, Directives, Notebook, Rewriter, Settings};

use crate::error::{PdfError, Result};
use crate::runner::{log_tail, ProcessRunner, StepOutcome, LOG_TAIL_LINES};
use crate::toolchain::{Pass, PassResult, Toolchain};

/// Switches for a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Stop at the first failed step instead of carrying on
    pub fail_fast: bool,
    /// Leave intermediate artifacts in place
    pub keep_intermediates: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            keep_intermediates: false,
        }
    }
}

/// Summary of a finished build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub notebook: String,
    pub pdf: PathBuf,
    /// Whether the PDF exists after the compile passes
    pub pdf_exists: bool,
    pub convert: StepOutcome,
    pub passes: Vec<PassResult>,
    /// `None` when cleanup was skipped
    pub cleaned: Option<CleanSummary>,
}

/// Turns one notebook into a PDF inside a working directory
#[derive(Debug, Clone)]
pub struct Report {
    notebook: Notebook,
    work_dir: PathBuf,
    settings: Settings,
    toolchain: Toolchain,
}

impl Report {
    pub fn new(notebook: Notebook, work_dir: impl Into<PathBuf>, settings: Settings) -> Self {
        let work_dir = work_dir.into();
        let toolchain = Toolchain::new(settings.tools.clone(), ProcessRunner::new(&work_dir));
        Self {
            notebook,
            work_dir,
            settings,
            toolchain,
        }
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn tex_path(&self) -> PathBuf {
        self.work_dir.join(self.notebook.tex_file())
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.work_dir.join(self.notebook.pdf_file())
    }

    /// Convert the notebook to LaTeX
    pub fn to_latex(&self) -> Result<StepOutcome> {
        self.toolchain.convert(&self.notebook)
    }

    /// Apply `directives` to the generated LaTeX source
    pub fn rewrite(&self, directives: &Directives) -> Result<()> {
        if !self.settings.replace.is_empty() {
            debug!(
                entries = self.settings.replace.len(),
                "substitution table present; substitutions are not applied"
            );
        }
        Rewriter::new(self.settings.rewrite).rewrite_file(&self.tex_path(), directives)?;
        Ok(())
    }

    /// Compile the PDF
    pub fn make_pdf(&self) -> Result<Vec<PassResult>> {
        self.toolchain.compile(&self.notebook)
    }

    /// Remove intermediate artifacts
    pub fn clean(&self) -> Result<CleanSummary> {
        let summary =
            Cleaner::new(self.settings.clean.clone()).clean(&self.work_dir, &self.notebook)?;
        info!(
            files = summary.files.len(),
            directories = summary.directories.len(),
            "cleaned intermediates"
        );
        Ok(summary)
    }

    /// Convert, rewrite, compile and clean
    ///
    /// With `fail_fast` every configured program must resolve on the search
    /// path before anything runs, a failed conversion ends the build before the
    /// rewrite, and a failed typesetting pass ends it before cleanup so the
    /// LaTeX source stays available. Bibliography failures never stop a
    /// build. Without `fail_fast` every failure is only logged.
    pub fn build(&self, directives: &Directives, options: BuildOptions) -> Result<BuildReport> {
        info!(notebook = %self.notebook, dir = %self.work_dir.display(), "building report");

        if options.fail_fast {
            self.toolchain.ensure_available()?;
        }

        let convert = self.to_latex()?;
        if let StepOutcome::Failed { exit_code, log } = &convert {
            if options.fail_fast {
                return Err(PdfError::StepFailed {
                    step: "convert",
                    exit_code: *exit_code,
                    log: log.clone(),
                });
            }
            warn!("continuing after failed conversion");
        }

        self.rewrite(directives)?;

        let passes = self.make_pdf()?;
        let failed_typeset = passes
            .iter()
            .find(|r| r.pass == Pass::Typeset && !r.outcome.is_success());
        if let Some(failed) = failed_typeset {
            if options.fail_fast {
                let exit_code = match &failed.outcome {
                    StepOutcome::Failed { exit_code, .. } => *exit_code,
                    StepOutcome::Success => None,
                };
                let log_path = self.work_dir.join(self.notebook.compile_log());
                return Err(PdfError::StepFailed {
                    step: "compile",
                    exit_code,
                    log: log_tail(&log_path, LOG_TAIL_LINES)?,
                });
            }
            warn!("continuing after failed typesetting pass");
        }

        let cleaned = if options.keep_intermediates {
            debug!("keeping intermediates");
            None
        } else {
            Some(self.clean()?)
        };

        let pdf = self.pdf_path();
        let pdf_exists = pdf.is_file();
        if pdf_exists {
            info!(pdf = %pdf.display(), "report written");
        } else {
            warn!(pdf = %pdf.display(), "compiler produced no PDF");
        }

        Ok(BuildReport {
            notebook: self.notebook.id().to_string(),
            pdf,
            pdf_exists,
            convert,
            passes,
            cleaned,
        })
    }
}
