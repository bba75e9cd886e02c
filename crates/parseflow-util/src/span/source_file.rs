//! Source file bookkeeping.
//!
//! A [`SourceFile`] pairs a display label with the source text and a
//! precomputed table of line start offsets, so diagnostics can extract the
//! offending lines without rescanning the input.

use std::sync::Arc;

/// A source file with its content and metadata.
///
/// The content and line table are reference-counted so the file can be shared
/// between tokens' home file, call-frame contexts, and diagnostics without
/// copying.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Display label (`<stdin>` for REPL input, a path for scripts).
    name: String,
    /// Full source text.
    content: Arc<str>,
    /// Byte offset of each line start, always starting with 0.
    line_starts: Arc<[usize]>,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        let content = content.into();
        let line_starts = Self::compute_line_starts(&content);
        Self {
            name: name.into(),
            content,
            line_starts,
        }
    }

    fn compute_line_starts(content: &str) -> Arc<[usize]> {
        let mut line_starts = vec![0];
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        line_starts.into()
    }

    /// Display label of this file.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full source text.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Total number of lines (an empty file has one empty line).
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where a line starts (0-based line number).
    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// The text of a line (0-based), without its trailing newline.
    ///
    /// Returns `None` if the line number is out of bounds.
    pub fn line_at(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line)?;
        let end = self
            .line_start(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.content.len());
        // A trailing "\r\n" leaves the '\r' inside the slice bounds.
        let text = &self.content[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }
}
