//! Function headers and bodies.
//!
//! Arguments are split on every comma. A default such as `g(1, 2)` therefore
//! produces phantom tokens (`g(1` and `2)`); the first becomes a keyword
//! default and the second is dropped. That is a known limitation of the line
//! based approach, not something to patch with an expression parser.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::classify::{self, FunctionHeader};
use super::docstring::extract_docstring;
use super::scanner::{LineCursor, SourceLine};
use crate::symbols::{FunctionSymbol, KeywordParameter};

static POSITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)(?:\s*:\s*[^=]+)?$").unwrap());
static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)(?:\s*:\s*[^=]*?)?\s*=\s*(.*)$").unwrap());

/// A parsed function plus where its signature ended in the source.
#[derive(Debug, Clone)]
pub struct ParsedFunction {
    pub symbol: FunctionSymbol,
    /// Zero-based line holding the closing `):`
    pub header_end: usize,
    /// False when input ended before the parameter list closed
    pub signature_closed: bool,
    /// The body is a statement on the signature line itself
    pub inline_body: bool,
}

/// Parse a function whose `def` line is `header`, at exactly `indent` spaces.
/// Returns `None` without consuming anything when the line is not a header.
pub fn try_parse_function<'a>(
    header: &SourceLine<'a>,
    cursor: &mut LineCursor<'a>,
    indent: usize,
) -> Option<FunctionSymbol> {
    if header.verbatim {
        return None;
    }
    let head = classify::function_header(header.text, indent)?;
    Some(parse_from_header(head, header, cursor).symbol)
}

/// Finish a function once its header has been recognised.
///
/// A statement after the closing `):` is the whole body: it carries no
/// docstring and nothing below the signature belongs to the function.
pub fn parse_from_header<'a>(
    head: FunctionHeader<'_>,
    header: &SourceLine<'a>,
    cursor: &mut LineCursor<'a>,
) -> ParsedFunction {
    let mut arguments = head.arguments.to_string();
    let mut header_end = header.number;
    let mut closed = head.closed;
    let mut inline_body = head.inline_body.to_string();

    while !closed {
        let Some(line) = cursor.next_line() else {
            debug!(function = head.name, line = header.number, "parameter list never closed");
            break;
        };
        let continuation = classify::signature_continuation(line.text);
        arguments.push_str(continuation.arguments);
        header_end = line.number;
        closed = continuation.closed;
        inline_body = continuation.inline_body.to_string();
    }

    let (positional, keywords) = split_arguments(&arguments);
    let (docstring, exceptions) = if !closed {
        (String::new(), Vec::new())
    } else if !inline_body.is_empty() {
        let exceptions = classify::raised_exception(&inline_body).into_iter().collect();
        (String::new(), exceptions)
    } else {
        scan_body(cursor, header.indent())
    };

    ParsedFunction {
        symbol: FunctionSymbol {
            name: head.name.to_string(),
            positional,
            keywords,
            docstring,
            exceptions,
            line: header.number,
        },
        header_end,
        signature_closed: closed,
        inline_body: !inline_body.is_empty(),
    }
}

/// Split raw argument text into positional names and keyword defaults.
/// Star arguments and bare separators are ignored.
pub fn split_arguments(arguments: &str) -> (Vec<String>, Vec<KeywordParameter>) {
    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    for token in arguments.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some(caps) = POSITIONAL.captures(token) {
            positional.push(caps[1].to_string());
        } else if let Some(caps) = KEYWORD.captures(token) {
            keywords.push(KeywordParameter::new(&caps[1], caps[2].trim()));
        }
    }
    (positional, keywords)
}

/// Consume the body of a function whose header sits at `header_indent`,
/// keeping only its docstring and the exceptions it raises.
fn scan_body(cursor: &mut LineCursor<'_>, header_indent: usize) -> (String, Vec<String>) {
    let body_indent = match cursor.peek() {
        Some(line) if !line.verbatim && line.indent() > header_indent => line.indent(),
        _ => return (String::new(), Vec::new()),
    };

    let docstring = extract_docstring(cursor, body_indent).unwrap_or_default();
    let mut exceptions: Vec<String> = Vec::new();
    while let Some(line) = cursor.next_in_block(body_indent) {
        if line.verbatim {
            continue;
        }
        if let Some(name) = classify::raised_exception(line.text) {
            if !exceptions.contains(&name) {
                exceptions.push(name);
            }
        }
    }
    (docstring, exceptions)
}
