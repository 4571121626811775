//! Block scanner and line cursor.
//!
//! The scanner turns raw lines into cleaned logical lines: comments are
//! stripped, blank lines are dropped, and the content of triple-quoted
//! documentation strings is passed through untouched. The cursor wraps the
//! scanner with a single line of lookahead, which is all the parsers need to
//! find where an indented block ends.
use super::classify::{opening_delimiter, Delimiter};

/// Number of leading spaces. Tabs are not expanded.
pub fn indent_of(text: &str) -> usize {
    text.len() - text.trim_start_matches(' ').len()
}

/// Remove at most `indent` leading spaces.
pub fn strip_indent(text: &str, indent: usize) -> &str {
    let spaces = indent_of(text).min(indent);
    &text[spaces..]
}

/// Cut `text` at the first `#` that is not inside a quoted literal, then trim
/// trailing whitespace. The result is always a prefix of `text`.
pub fn strip_comment(text: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(ch),
            (None, '#') => return text[..idx].trim_end(),
            _ => {}
        }
    }
    text.trim_end()
}

/// One cleaned line of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// Zero-based position in the original file
    pub number: usize,
    pub text: &'a str,
    /// True for lines inside (or closing) a multi-line documentation string.
    /// Their indentation carries no block structure.
    pub verbatim: bool,
}

impl<'a> SourceLine<'a> {
    pub fn indent(&self) -> usize {
        indent_of(self.text)
    }
}

/// Tracks whether the scan position is inside a documentation string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockScanner {
    open: Option<Delimiter>,
}

impl BlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_docstring(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one raw line. Returns `None` when the line carries nothing
    /// (blank, or comment only).
    pub fn advance<'a>(&mut self, number: usize, raw: &'a str) -> Option<SourceLine<'a>> {
        if let Some(delim) = self.open {
            let text = match raw.find(delim.as_str()) {
                Some(idx) => {
                    self.open = None;
                    let end = idx + delim.as_str().len();
                    let rest = strip_comment(&raw[end..]);
                    &raw[..end + rest.len()]
                }
                None => raw.trim_end(),
            };
            return Some(SourceLine {
                number,
                text,
                verbatim: true,
            });
        }

        if let Some((delim, body)) = opening_delimiter(raw) {
            if !raw[body..].contains(delim.as_str()) {
                self.open = Some(delim);
                return Some(SourceLine {
                    number,
                    text: raw.trim_end(),
                    verbatim: false,
                });
            }
        }

        let text = strip_comment(raw);
        if text.trim_start().is_empty() {
            return None;
        }
        Some(SourceLine {
            number,
            text,
            verbatim: false,
        })
    }
}

/// Forward-only cursor over the cleaned lines of one file.
///
/// `peek` looks at most one line ahead; once `next_line` returns `None` the
/// cursor is exhausted for good.
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    next_raw: usize,
    scanner: BlockScanner,
    peeked: Option<SourceLine<'a>>,
}

impl<'a> LineCursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::from_lines(source.lines().collect())
    }

    pub fn from_lines(lines: Vec<&'a str>) -> Self {
        Self {
            lines,
            next_raw: 0,
            scanner: BlockScanner::new(),
            peeked: None,
        }
    }

    fn pull(&mut self) -> Option<SourceLine<'a>> {
        while let Some(raw) = self.lines.get(self.next_raw).copied() {
            let number = self.next_raw;
            self.next_raw += 1;
            if let Some(line) = self.scanner.advance(number, raw) {
                return Some(line);
            }
        }
        None
    }

    pub fn peek(&mut self) -> Option<SourceLine<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.pull();
        }
        self.peeked
    }

    pub fn next_line(&mut self) -> Option<SourceLine<'a>> {
        match self.peeked.take() {
            Some(line) => Some(line),
            None => self.pull(),
        }
    }

    /// Consume the next line only if it belongs to a block indented at least
    /// `indent`. Documentation string content always belongs.
    pub fn next_in_block(&mut self, indent: usize) -> Option<SourceLine<'a>> {
        let line = self.peek()?;
        if line.verbatim || line.indent() >= indent {
            self.next_line()
        } else {
            None
        }
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.peek().is_none()
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
