//! nbreport CLI - Command-line interface library
//!
//! This library provides the CLI functionality for nbreport:
//! - Build: Convert a notebook to a PDF report
//! - Rewrite: Apply directives to an already converted LaTeX source
//! - Clean: Remove intermediate artifacts
//! - Doctor: Show where the configured tools resolve
//!
//! # Library Usage
//!
//! ```ignore
//! use nbreport_cli::{build_command, ProjectArgs};
//!
//! build_command(&project, &directives, &tools, options, OutputFormat::Text)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Build analysis.ipynb into analysis.pdf
//! nbreport build analysis --title "Quarterly Results" --author "Ada Lovelace"
//!
//! # Add a footer with page numbers
//! nbreport build --footer 'C=\thepage\ of \pageref{LastPage}'
//!
//! # Only rewrite the converted source
//! nbreport rewrite analysis --package utf8:inputenc
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{build_command, clean_command, doctor_command, rewrite_command};
pub use app::{run_cli, DirectiveArgs, OutputFormat, ProjectArgs, ToolArgs};
