//! Caret snippet rendering.
//!
//! Extracts the source lines covered by a span and underlines the covered
//! columns with `^` runs, one caret line per source line.

use crate::span::{SourceFile, Span};

/// Render the source lines covered by `span` with caret underlines.
///
/// The snippet has no trailing newline. A zero-width span still produces a
/// single caret so empty spans (for example at end of input) stay visible.
pub fn render_snippet(file: &SourceFile, span: Span) -> String {
    let first_line = span.start.line as usize;
    let mut last_line = span.end.line as usize;
    let mut end_column = span.end.column as usize;

    // A span ending exactly on a line boundary belongs to the previous line.
    if last_line > first_line && end_column == 0 {
        last_line -= 1;
        end_column = usize::MAX;
    }

    let max_line = file.line_count().saturating_sub(1);
    let last_line = last_line.min(max_line);

    let mut out = String::new();
    for line in first_line..=last_line {
        let text = file.line_at(line).unwrap_or("");
        let char_len = text.chars().count();

        let col_start = if line == first_line {
            (span.start.column as usize).min(char_len)
        } else {
            0
        };
        let col_end = if line == last_line {
            end_column.clamp(col_start, char_len.max(col_start))
        } else {
            char_len
        };
        let carets = (col_end - col_start).max(1);

        out.push_str(text);
        out.push('\n');
        for _ in 0..col_start {
            out.push(' ');
        }
        for _ in 0..carets {
            out.push('^');
        }
        if line < last_line {
            out.push('\n');
        }
    }
    out
}
