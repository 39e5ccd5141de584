//! Directive rewriter
//!
//! Applies directives to the LaTeX source produced by the notebook converter.
//! Edits happen in a fixed order, each one only when its key is configured:
//!
//! 1. `title` - replaces the `\title{...}` command on the last title line
//! 2. `author` - one `\author{...}` line per entry, after the last `\title` line
//! 3. `date` - a `\date{...}` line, after the last `\title` line
//! 4. `header` / `footer` - a fancyhdr block after the last `package` line
//! 5. `package` - one `\usepackage[...]{...}` line per entry, after the last
//!    `package` line of the source, so ahead of any fancyhdr block
//!
//! Anchors are always the *last* matching line. When an insertion anchor is
//! missing the anchor falls back to line 0, so the content lands right after
//! the first line of the document. [`RewriteOptions::strict_anchors`] turns
//! that fallback into [`CoreError::MissingAnchor`].

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::directives::{Directives, PackageInclude, PageField};
use crate::error::{CoreError, Result};
use crate::markup::MarkupSource;

/// Substring identifying the title line
pub const TITLE_MARKER: &str = r"\title";

/// Substring identifying package include lines
pub const PACKAGE_MARKER: &str = "package";

const TITLE_PATTERN: &str = r"\\title\{.*\}";

fn title_regex() -> &'static Regex {
    static TITLE_RE: OnceLock<Regex> = OnceLock::new();
    TITLE_RE.get_or_init(|| Regex::new(TITLE_PATTERN).unwrap())
}

/// Rewriter behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Fail instead of falling back to line 0 when an anchor is missing
    pub strict_anchors: bool,
}

/// Applies [`Directives`] to a markup source
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    options: RewriteOptions,
}

impl Rewriter {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }

    /// Rewrite `source` and return the new text
    pub fn apply(&self, source: &str, directives: &Directives) -> Result<String> {
        let mut doc = MarkupSource::parse(source);

        if let Some(title) = &directives.title {
            self.replace_title(&mut doc, title)?;
        }

        if let Some(authors) = &directives.author {
            let lines: Vec<String> = authors.iter().map(|a| format!("\\author{{{a}}}")).collect();
            let anchor = self.anchor(&doc, "author", TITLE_MARKER)?;
            debug!(count = lines.len(), anchor, "inserting author lines");
            doc.insert_after(anchor, lines);
        }

        if let Some(date) = &directives.date {
            let anchor = self.anchor(&doc, "date", TITLE_MARKER)?;
            debug!(anchor, "inserting date line");
            doc.insert_after(anchor, [format!("\\date{{{date}}}")]);
        }

        // Both blocks anchor on the document's own package lines; the
        // fancyhdr includes of the page style block never count as one.
        let page_style = if directives.header.is_some() || directives.footer.is_some() {
            let block = page_style_block(
                directives.header.as_deref().unwrap_or_default(),
                directives.footer.as_deref().unwrap_or_default(),
            );
            Some((self.anchor(&doc, "header/footer", PACKAGE_MARKER)?, block))
        } else {
            None
        };
        let packages = match &directives.package {
            Some(packages) => Some((
                self.anchor(&doc, "package", PACKAGE_MARKER)?,
                package_lines(packages),
            )),
            None => None,
        };

        if let Some((anchor, block)) = page_style {
            debug!(lines = block.len(), anchor, "inserting page style block");
            doc.insert_after(anchor, block);
        }

        if let Some((anchor, lines)) = packages {
            debug!(count = lines.len(), anchor, "inserting package lines");
            doc.insert_after(anchor, lines);
        }

        Ok(doc.to_string())
    }

    /// Rewrite a file in place; it is read once and fully overwritten
    pub fn rewrite_file(&self, path: &Path, directives: &Directives) -> Result<()> {
        let source = fs::read_to_string(path)?;
        let rewritten = self.apply(&source, directives)?;
        fs::write(path, rewritten)?;
        debug!(path = %path.display(), "rewrote markup source");
        Ok(())
    }

    fn replace_title(&self, doc: &mut MarkupSource, title: &str) -> Result<()> {
        let re = title_regex();
        let found = doc.lines().iter().rposition(|line| re.is_match(line));

        let Some(index) = found else {
            if self.options.strict_anchors {
                return Err(CoreError::MissingAnchor {
                    directive: "title",
                    pattern: TITLE_PATTERN,
                });
            }
            warn!("no \\title{{...}} line found, title left unchanged");
            return Ok(());
        };

        if let Some(line) = doc.line_mut(index) {
            let replacement = format!("\\title{{{title}}}");
            let replaced = re.replace(line.as_str(), NoExpand(&replacement)).into_owned();
            *line = replaced;
            debug!(line = index, "replaced title");
        }
        Ok(())
    }

    fn anchor(
        &self,
        doc: &MarkupSource,
        directive: &'static str,
        marker: &'static str,
    ) -> Result<usize> {
        match doc.last_line_containing(marker) {
            Some(index) => Ok(index),
            None if self.options.strict_anchors => Err(CoreError::MissingAnchor {
                directive,
                pattern: marker,
            }),
            None => {
                warn!(directive, marker, "anchor not found, inserting after first line");
                Ok(0)
            }
        }
    }
}

/// Rewrite `path` with default options
pub fn rewrite_file(path: &Path, directives: &Directives) -> Result<()> {
    Rewriter::default().rewrite_file(path, directives)
}

/// Build the fancyhdr block that replaces the plain page style
fn page_style_block(header: &[PageField], footer: &[PageField]) -> Vec<String> {
    let mut block = vec![
        r"\usepackage{lastpage}".to_string(),
        r"\usepackage{fancyhdr}".to_string(),
        r"\fancypagestyle{plain}{".to_string(),
        r"\fancyhf{}  % Clear header/footer".to_string(),
    ];
    block.extend(
        header
            .iter()
            .map(|(pos, text)| format!("\\fancyhead[{pos}]{{{text}}}")),
    );
    block.extend(
        footer
            .iter()
            .map(|(pos, text)| format!("\\fancyfoot[{pos}]{{{text}}}")),
    );
    block.push("}".to_string());
    block.push(r"\pagestyle{plain}  % Set page style to plain.".to_string());
    block
}

fn package_lines(packages: &[PackageInclude]) -> Vec<String> {
    packages
        .iter()
        .map(|(option, name)| format!("\\usepackage[{option}]{{{name}}}"))
        .collect()
}
