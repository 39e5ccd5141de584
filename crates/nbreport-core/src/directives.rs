//! Directive configuration
//!
//! Directives name the content the rewriter places into the markup source.
//! Values are passed through verbatim; nothing is escaped or validated.
//!
//! ```toml
//! [directives]
//! title = "Quarterly Results"
//! author = ["Ada Lovelace", "Charles Babbage"]
//! date = "2024-10-22"
//! header = [["L", "Internal"], ["R", "\\thepage"]]
//! footer = [["C", "Page \\thepage\\ of \\pageref{LastPage}"]]
//! package = [["utf8", "inputenc"], ["T1", "fontenc"]]
//! ```

use serde::{Deserialize, Serialize};

/// A `(position, content)` pair for a header or footer field
pub type PageField = (String, String);

/// An `(option, name)` pair for a package include
pub type PackageInclude = (String, String);

/// Set of directives applied by the rewriter
///
/// A present but empty `header` or `footer` still inserts the page style
/// block, just without fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directives {
    pub title: Option<String>,
    pub author: Option<Vec<String>>,
    pub date: Option<String>,
    pub header: Option<Vec<PageField>>,
    pub footer: Option<Vec<PageField>>,
    pub package: Option<Vec<PackageInclude>>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_header<I, P, C>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        self.header = Some(pairs(fields));
        self
    }

    pub fn with_footer<I, P, C>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        self.footer = Some(pairs(fields));
        self
    }

    pub fn with_packages<I, O, N>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = (O, N)>,
        O: Into<String>,
        N: Into<String>,
    {
        self.package = Some(pairs(packages));
        self
    }

    /// True when no directive is configured
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overlay `other` on top of `self`; keys set in `other` win
    pub fn merged(&self, other: &Directives) -> Directives {
        Directives {
            title: other.title.clone().or_else(|| self.title.clone()),
            author: other.author.clone().or_else(|| self.author.clone()),
            date: other.date.clone().or_else(|| self.date.clone()),
            header: other.header.clone().or_else(|| self.header.clone()),
            footer: other.footer.clone().or_else(|| self.footer.clone()),
            package: other.package.clone().or_else(|| self.package.clone()),
        }
    }
}

fn pairs<I, A, B>(items: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (A, B)>,
    A: Into<String>,
    B: Into<String>,
{
    items
        .into_iter()
        .map(|(a, b)| (a.into(), b.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_from_toml() {
        let toml = r#"
title = "Results"
author = ["Ada", "Charles"]
header = [["L", "Left"], ["R", "Right"]]
package = [["utf8", "inputenc"]]
"#;
        let dirs: Directives = toml::from_str(toml).unwrap();

        assert_eq!(dirs.title.as_deref(), Some("Results"));
        assert_eq!(dirs.author, Some(vec!["Ada".into(), "Charles".into()]));
        assert_eq!(dirs.date, None);
        assert_eq!(
            dirs.header,
            Some(vec![
                ("L".to_string(), "Left".to_string()),
                ("R".to_string(), "Right".to_string())
            ])
        );
        assert_eq!(dirs.footer, None);
        assert_eq!(
            dirs.package,
            Some(vec![("utf8".to_string(), "inputenc".to_string())])
        );
    }

    #[test]
    fn test_empty() {
        assert!(Directives::new().is_empty());
        assert!(!Directives::new().with_date("today").is_empty());
    }

    #[test]
    fn test_merged_prefers_overlay() {
        let base = Directives::new()
            .with_title("Base")
            .with_authors(["Ada"]);
        let overlay = Directives::new().with_title("Overlay");

        let merged = base.merged(&overlay);
        assert_eq!(merged.title.as_deref(), Some("Overlay"));
        assert_eq!(merged.author, Some(vec!["Ada".to_string()]));
    }
}
