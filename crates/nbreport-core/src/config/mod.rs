//! Configuration
//!
//! Settings are loaded from `nbreport.toml` next to the notebook:
//!
//! ```toml
//! [tools]
//! converter = "jupyter nbconvert"
//! compiler = "pdflatex -interaction=nonstopmode"
//! bibliography = "bibtex"
//!
//! [directives]
//! title = "Quarterly Results"
//! author = ["Ada Lovelace"]
//! package = [["utf8", "inputenc"]]
//!
//! [rewrite]
//! strict_anchors = false
//!
//! [clean]
//! extensions = [".aux", ".bbl", ".blg", ".out", ".tex"]
//! directories = ["_files"]
//! ```

mod settings;


pub use settings::{CleanSettings, Settings, ToolSettings, CONFIG_CANDIDATES};
