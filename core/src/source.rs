//! Owns the raw bytes of a compilation unit and its lazily-built line index.

use std::cell::OnceCell;

use crate::span::Span;

/// A single line of source text.
///
/// `start`/`end` are byte offsets into the owning `Source`'s data, `end`
/// exclusive of the line's trailing newline. `line_number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start: u32,
    pub end: u32,
    pub line_number: u32,
}

impl Line {
    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Raw bytes of a single compilation unit plus a display name.
///
/// Line starts are indexed lazily — most source files are only ever scanned
/// for tokens and never need their line table, so the scan only happens the
/// first time a diagnostic needs to resolve a line.
pub struct Source {
    file_name: String,
    data: Box<[u8]>,
    lines: OnceCell<Vec<Line>>,
}

impl Source {
    pub fn new(file_name: impl Into<String>, data: impl Into<Box<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
            lines: OnceCell::new(),
        }
    }

    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the raw bytes a span covers.
    #[inline]
    pub fn slice(&self, span: Span) -> &[u8] {
        &self.data[span.start as usize..span.end as usize]
    }

    /// Returns the text a span covers.
    ///
    /// Every span produced by the tokenizer starts and ends on a UTF-8 code
    /// point boundary, so this only fails to decode cleanly if `span` was
    /// fabricated by hand with bad offsets; in that case an empty string is
    /// returned rather than panicking.
    #[inline]
    pub fn text(&self, span: Span) -> &str {
        std::str::from_utf8(self.slice(span)).unwrap_or_default()
    }

    /// The 1-based line table. `lines()[0]` is a sentinel
    /// `Line { start: 0, end: 0, line_number: 0 }`; real lines start at
    /// index 1, matching their `line_number`.
    pub fn lines(&self) -> &[Line] {
        self.lines.get_or_init(|| self.scan_lines())
    }

    /// Returns the line with the given 1-based number, or the last line in
    /// the source if `line_number` is out of range (used when a diagnostic's
    /// span was synthesised at end-of-input with the final line's number).
    pub fn line(&self, line_number: u32) -> Line {
        let lines = self.lines();
        lines
            .get(line_number as usize)
            .copied()
            .or_else(|| lines.last().copied())
            .unwrap_or(Line {
                start: 0,
                end: 0,
                line_number: 0,
            })
    }

    /// Number of the last real line in the source (>= 1 unless the source is
    /// byte-for-byte empty, in which case the synthetic line 1 is returned).
    pub fn last_line_number(&self) -> u32 {
        self.lines().len().saturating_sub(1).max(1) as u32
    }

    fn scan_lines(&self) -> Vec<Line> {
        let mut lines = vec![Line {
            start: 0,
            end: 0,
            line_number: 0,
        }];
        let mut line_start = 0u32;
        for (i, &byte) in self.data.iter().enumerate() {
            if byte == b'\n' {
                let i = i as u32;
                lines.push(Line {
                    start: line_start,
                    end: i,
                    line_number: lines.len() as u32,
                });
                line_start = i + 1;
            }
        }
        let no_newlines_seen = lines.len() == 1;
        let trailing_content = (line_start as usize) < self.data.len();
        if no_newlines_seen || trailing_content {
            lines.push(Line {
                start: line_start,
                end: self.data.len() as u32,
                line_number: lines.len() as u32,
            });
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_has_one_synthetic_line() {
        let source = Source::new("<test>", Vec::new());
        let lines = source.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].line_number, 1);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn trailing_newline_does_not_create_phantom_line() {
        let source = Source::new("<test>", b"a\n".to_vec());
        let lines = source.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(source.text(Span::new(lines[1].start, 1, lines[1].end, 1)), "a");
    }

    #[test]
    fn two_lines_without_trailing_newline() {
        let source = Source::new("<test>", b"  \n\t\n".to_vec());
        let lines = source.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].line_number, 1);
        assert_eq!(lines[2].line_number, 2);
    }

    #[test]
    fn line_out_of_range_returns_last_line() {
        let source = Source::new("<test>", b"one\ntwo".to_vec());
        let last = source.line(999);
        assert_eq!(last.line_number, 2);
    }
}
