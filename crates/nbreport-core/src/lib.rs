//! nbreport-core - Notebook to PDF report preparation
//!
//! Everything between the notebook converter and the LaTeX compiler:
//! naming of derived artifacts, directive rewriting of the generated
//! LaTeX source, configuration, and cleanup of intermediate files.
//!
//! # Example
//!
//! ```
//! use nbreport_core::{Directives, Rewriter};
//!
//! let tex = "\\usepackage{graphicx}\n\\title{notebook}\n";
//! let dirs = Directives::new()
//!     .with_title("Results")
//!     .with_authors(["Ada Lovelace"]);
//!
//! let out = Rewriter::default().apply(tex, &dirs).unwrap();
//! assert_eq!(
//!     out,
//!     "\\usepackage{graphicx}\n\\title{Results}\n\\author{Ada Lovelace}\n"
//! );
//! ```

pub mod cleaner;
pub mod config;
pub mod directives;
pub mod error;
pub mod markup;
pub mod notebook;
pub mod rewriter;

pub use cleaner::{CleanSummary, Cleaner};
pub use config::{CleanSettings, Settings, ToolSettings};
pub use directives::{Directives, PackageInclude, PageField};
pub use error::{CoreError, Result};
pub use markup::MarkupSource;
pub use notebook::Notebook;
pub use rewriter::{rewrite_file, RewriteOptions, Rewriter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
