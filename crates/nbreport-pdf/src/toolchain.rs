//! Notebook conversion and LaTeX compilation
//!
//! Converts `<id>.ipynb` to `<id>.tex` with the notebook converter, then
//! compiles the PDF with the usual four-pass sequence so citations and
//! cross references resolve:
//!
//! ```text
//! compiler <id>.tex
//! bibliography <id>.aux
//! compiler <id>.tex
//! compiler <id>.tex
//! ```

use std::env;
use std::fs::File;
use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use nbreport_core::{Notebook, ToolSettings};

use crate::error::{PdfError, Result};
use crate::runner::{CommandLine, ProcessRunner, StepOutcome};

/// Kind of compile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Typeset,
    Bibliography,
}

const COMPILE_SEQUENCE: [Pass; 4] = [Pass::Typeset, Pass::Bibliography, Pass::Typeset, Pass::Typeset];

/// Outcome of a single compile pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassResult {
    pub pass: Pass,
    pub outcome: StepOutcome,
}

/// Where a configured tool resolves on the search path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub program: String,
    pub path: Option<PathBuf>,
}

/// The external tools of the pipeline
#[derive(Debug, Clone)]
pub struct Toolchain {
    tools: ToolSettings,
    runner: ProcessRunner,
}

impl Toolchain {
    pub fn new(tools: ToolSettings, runner: ProcessRunner) -> Self {
        Self { tools, runner }
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Convert the notebook to LaTeX, logging to `<id>.to-tex.log`
    pub fn convert(&self, notebook: &Notebook) -> Result<StepOutcome> {
        let mut cmd = CommandLine::parse(&self.tools.converter, "converter")?
            .arg("--to")
            .arg("latex");
        if !self.tools.include_input {
            cmd = cmd.arg("--no-input");
        }
        let cmd = cmd.arg(notebook.notebook_file());

        let log_path = self.runner.work_dir().join(notebook.convert_log());
        let outcome = self.runner.run(&cmd, &log_path)?;
        if let StepOutcome::Failed { exit_code, .. } = &outcome {
            warn!(?exit_code, log = %log_path.display(), "conversion failed");
        }
        Ok(outcome)
    }

    /// Run every compile pass, logging to `<id>.build-tex.log`
    ///
    /// All passes run regardless of earlier failures.
    pub fn compile(&self, notebook: &Notebook) -> Result<Vec<PassResult>> {
        let typeset = CommandLine::parse(&self.tools.compiler, "compiler")?.arg(notebook.tex_file());
        let bibliography = CommandLine::parse(&self.tools.bibliography, "bibliography compiler")?
            .arg(notebook.aux_file());

        let log_path = self.runner.work_dir().join(notebook.compile_log());
        let log = File::create(&log_path)?;

        let mut results = Vec::with_capacity(COMPILE_SEQUENCE.len());
        for pass in COMPILE_SEQUENCE {
            let cmd = match pass {
                Pass::Typeset => &typeset,
                Pass::Bibliography => &bibliography,
            };
            let outcome = self.runner.run_logged(cmd, &log, &log_path)?;
            if let StepOutcome::Failed { exit_code, .. } = &outcome {
                warn!(?pass, ?exit_code, "compile pass failed");
            }
            results.push(PassResult { pass, outcome });
        }
        Ok(results)
    }

    /// Resolve each configured program on the search path
    pub fn preflight(&self) -> Result<Vec<ToolCheck>> {
        let tools = [
            ("converter", &self.tools.converter),
            ("compiler", &self.tools.compiler),
            ("bibliography compiler", &self.tools.bibliography),
        ];

        let mut checks = Vec::with_capacity(tools.len());
        for (tool, command) in tools {
            let program = CommandLine::parse(command, tool)?.program().to_string();
            let path = which::which_in(&program, env::var_os("PATH"), self.runner.work_dir()).ok();
            checks.push(ToolCheck {
                tool,
                program,
                path,
            });
        }
        Ok(checks)
    }

    /// Fail on the first configured program that cannot be found
    pub fn ensure_available(&self) -> Result<()> {
        match self.preflight()?.into_iter().find(|check| check.path.is_none()) {
            Some(missing) => Err(PdfError::ToolNotFound {
                tool: missing.tool,
                program: missing.program,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn toolchain(dir: &TempDir, tools: ToolSettings) -> Toolchain {
        Toolchain::new(tools, ProcessRunner::new(dir.path()))
    }

    #[test]
    fn test_preflight_reports_missing_tools() {
        let dir = TempDir::new().unwrap();
        let tools = ToolSettings {
            converter: "nbreport-missing-converter --flag".to_string(),
            ..ToolSettings::default()
        };

        let checks = toolchain(&dir, tools).preflight().unwrap();
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[0].tool, "converter");
        assert_eq!(checks[0].program, "nbreport-missing-converter");
        assert!(checks[0].path.is_none());
    }

    #[test]
    fn test_ensure_available_names_missing_tool() {
        let dir = TempDir::new().unwrap();
        let tools = ToolSettings {
            compiler: "nbreport-missing-latex".to_string(),
            converter: "sh".to_string(),
            bibliography: "sh".to_string(),
            ..ToolSettings::default()
        };

        match toolchain(&dir, tools).ensure_available() {
            Err(PdfError::ToolNotFound { tool, program }) => {
                assert_eq!(tool, "compiler");
                assert_eq!(program, "nbreport-missing-latex");
            }
            other => panic!("Expected ToolNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    fn script(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        format!("sh {}", path.display())
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_passes_nbconvert_arguments() {
        let dir = TempDir::new().unwrap();
        let tools = ToolSettings {
            converter: script(&dir, "convert.sh", "echo \"$@\"\n"),
            ..ToolSettings::default()
        };
        let nb = Notebook::new("analysis");

        let outcome = toolchain(&dir, tools).convert(&nb).unwrap();
        assert!(outcome.is_success());
        let log = std::fs::read_to_string(dir.path().join(nb.convert_log())).unwrap();
        assert_eq!(log, "--to latex --no-input analysis.ipynb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_convert_with_inputs() {
        let dir = TempDir::new().unwrap();
        let tools = ToolSettings {
            converter: script(&dir, "convert.sh", "echo \"$@\"\n"),
            include_input: true,
            ..ToolSettings::default()
        };
        let nb = Notebook::new("analysis");

        toolchain(&dir, tools).convert(&nb).unwrap();
        let log = std::fs::read_to_string(dir.path().join(nb.convert_log())).unwrap();
        assert_eq!(log, "--to latex analysis.ipynb\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_runs_four_passes_into_one_log() {
        let dir = TempDir::new().unwrap();
        let tools = ToolSettings {
            compiler: script(&dir, "latex.sh", "echo \"latex $1\"\n"),
            bibliography: script(&dir, "bib.sh", "echo \"bibtex $1\"\nexit 2\n"),
            ..ToolSettings::default()
        };
        let nb = Notebook::new("analysis");

        let results = toolchain(&dir, tools).compile(&nb).unwrap();
        let passes: Vec<Pass> = results.iter().map(|r| r.pass).collect();
        assert_eq!(
            passes,
            vec![Pass::Typeset, Pass::Bibliography, Pass::Typeset, Pass::Typeset]
        );
        assert!(results[0].outcome.is_success());
        assert!(!results[1].outcome.is_success());
        assert!(results[3].outcome.is_success());

        let log = std::fs::read_to_string(dir.path().join(nb.compile_log())).unwrap();
        assert_eq!(
            log,
            "latex analysis.tex\nbibtex analysis.aux\nlatex analysis.tex\nlatex analysis.tex\n"
        );
    }
}
