//! Line-oriented view of the generated markup source.

use std::fmt;

/// Markup source as an ordered sequence of lines
///
/// Each line keeps its terminator, so joining the lines reproduces the
/// original text byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupSource {
    lines: Vec<String>,
}

impl MarkupSource {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last line containing `marker`
    pub fn last_line_containing(&self, marker: &str) -> Option<usize> {
        self.lines.iter().rposition(|line| line.contains(marker))
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut String> {
        self.lines.get_mut(index)
    }

    /// Insert `block` as consecutive lines right after line `anchor`
    ///
    /// The position is clamped to the end of the document. Inserted lines
    /// take the anchor line's terminator (`\r\n` or `\n`); an anchor line
    /// without a terminator gets one.
    pub fn insert_after<I>(&mut self, anchor: usize, block: I)
    where
        I: IntoIterator<Item = String>,
    {
        let at = (anchor + 1).min(self.lines.len());
        let eol = self.line_ending(at.saturating_sub(1));
        if at > 0 {
            let prev = &mut self.lines[at - 1];
            if !prev.ends_with('\n') {
                prev.push_str(eol);
            }
        }

        let block = block.into_iter().map(|mut line| {
            if !line.ends_with('\n') {
                line.push_str(eol);
            }
            line
        });
        self.lines.splice(at..at, block);
    }

    /// Terminator of line `index`, else of the first terminated line
    fn line_ending(&self, index: usize) -> &'static str {
        let terminated = self
            .lines
            .get(index)
            .filter(|line| line.ends_with('\n'))
            .or_else(|| self.lines.iter().find(|line| line.ends_with('\n')));
        match terminated {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }
}

impl fmt::Display for MarkupSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}
