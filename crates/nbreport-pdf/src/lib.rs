//! nbreport-pdf - PDF generation via nbconvert and LaTeX
//!
//! This crate drives the external tools that turn a notebook into a PDF.
//!
//! # Architecture
//!
//! The pipeline consists of four stages:
//!
//! 1. **Convert** - `jupyter nbconvert --to latex` writes `<id>.tex`
//! 2. **Rewrite** - directives are applied to `<id>.tex`
//! 3. **Compile** - the LaTeX and bibliography compilers produce `<id>.pdf`
//! 4. **Clean** - intermediate artifacts are removed
//!
//! Each external step yields a [`StepOutcome`]; [`Report::build`] decides
//! whether a failure ends the build.
//!
//! # Example
//!
//! ```ignore
//! use nbreport_core::{Directives, Notebook, Settings};
//! use nbreport_pdf::{BuildOptions, Report};
//!
//! let report = Report::new(Notebook::new("analysis"), ".", Settings::default());
//! let dirs = Directives::new().with_title("Quarterly Results");
//! let summary = report.build(&dirs, BuildOptions::default())?;
//! println!("{}", summary.pdf.display());
//! ```

mod error;
mod report;
mod runner;
mod toolchain;

pub use error::{PdfError, Result};
pub use report::{BuildOptions, BuildReport, Report};
pub use runner::{log_tail, CommandLine, ProcessRunner, StepOutcome, LOG_TAIL_LINES};
pub use toolchain::{Pass, PassResult, ToolCheck, Toolchain};
