//! Line classification.
//!
//! Every detector takes an already comment-stripped line and the indentation
//! the caller expects. A line only matches when its indentation is exactly
//! that level, so the patterns themselves never mention leading spaces.
use once_cell::sync::Lazy;
use regex::Regex;

use super::scanner::indent_of;

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^import\s+([A-Za-z_][\w.]*(?:\s+as\s+[A-Za-z_]\w*)?(?:\s*,\s*[A-Za-z_][\w.]*(?:\s+as\s+[A-Za-z_]\w*)?)*)$",
    )
    .unwrap()
});
static FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+(\.*[A-Za-z_][\w.]*|\.+)\s+import\b").unwrap());
static VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^__version__\s*=\s*(?:"([^"]*)"|'([^']*)')$"#).unwrap()
});
static VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*=\s*(.*)$").unwrap());
static RAISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^raise\s+([A-Za-z_][\w.]*)\s*\(").unwrap());
static FUNCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\((.*?)(?:(\)\s*(?:->[^:]*)?:)(.*))?$")
        .unwrap()
});
static SIGNATURE_CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(.*?)(?:(\)\s*(?:->[^:]*)?:)(.*))?$").unwrap());
static CLASS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^class\s+([A-Za-z_]\w*)\s*(?:\((.*)\))?\s*:$").unwrap());

/// Triple-quote delimiter of a documentation string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `'''`
    Single,
    /// `"""`
    Double,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Single => "'''",
            Delimiter::Double => "\"\"\"",
        }
    }
}

/// A `def` line. `closed` is false when the parameter list wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionHeader<'a> {
    pub name: &'a str,
    pub arguments: &'a str,
    pub closed: bool,
    /// Statement following the `:` on the same line, e.g. `pass` in
    /// `def f(): pass`. Empty for a regular block body.
    pub inline_body: &'a str,
}

/// Where a wrapped signature line leaves the parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Continuation<'a> {
    pub arguments: &'a str,
    pub closed: bool,
    pub inline_body: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassHeader<'a> {
    pub name: &'a str,
    pub inheritance: &'a str,
}

/// What a single line at a given indentation looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Import(Vec<String>),
    Version(String),
    Variable { name: String, value: String },
    FunctionHeader(FunctionHeader<'a>),
    ClassHeader(ClassHeader<'a>),
    DocstringDelimiter(Delimiter),
    Raise(String),
    Other,
}

/// Classify a line, trying the detectors in priority order: import, version,
/// variable, function header, class header, docstring opener, raise.
pub fn classify(text: &str, indent: usize) -> LineKind<'_> {
    if let Some(names) = import_names(text, indent) {
        return LineKind::Import(names);
    }
    if let Some(version) = version(text, indent) {
        return LineKind::Version(version);
    }
    if let Some((name, value)) = variable(text, indent) {
        return LineKind::Variable { name, value };
    }
    if let Some(header) = function_header(text, indent) {
        return LineKind::FunctionHeader(header);
    }
    if let Some(header) = class_header(text, indent) {
        return LineKind::ClassHeader(header);
    }
    if indent_of(text) == indent {
        if let Some((delim, _)) = opening_delimiter(text) {
            return LineKind::DocstringDelimiter(delim);
        }
    }
    if let Some(name) = raised_exception(text) {
        return LineKind::Raise(name);
    }
    LineKind::Other
}

fn at_indent(text: &str, indent: usize) -> Option<&str> {
    (indent_of(text) == indent).then(|| &text[indent..])
}

/// Module names brought in by `import a, b.c as d` or `from x import y`.
pub fn import_names(text: &str, indent: usize) -> Option<Vec<String>> {
    let body = at_indent(text, indent)?;
    if let Some(caps) = IMPORT.captures(body) {
        let names = caps[1]
            .split(',')
            .filter_map(|part| part.split_whitespace().next())
            .map(str::to_string)
            .collect();
        return Some(names);
    }
    FROM_IMPORT
        .captures(body)
        .map(|caps| vec![caps[1].to_string()])
}

/// The quoted value of `__version__ = "..."`.
pub fn version(text: &str, indent: usize) -> Option<String> {
    let body = at_indent(text, indent)?;
    let caps = VERSION.captures(body)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// `name = value`, with the value kept as raw text. Comparisons (`a == b`)
/// are not assignments.
pub fn variable(text: &str, indent: usize) -> Option<(String, String)> {
    let body = at_indent(text, indent)?;
    let caps = VARIABLE.captures(body)?;
    let value = &caps[2];
    if value.starts_with('=') {
        return None;
    }
    Some((caps[1].to_string(), value.to_string()))
}

/// Name of the callable in `raise Name(...)`, at any indentation.
pub fn raised_exception(text: &str) -> Option<String> {
    RAISE
        .captures(text.trim_start())
        .map(|caps| caps[1].to_string())
}

pub fn function_header(text: &str, indent: usize) -> Option<FunctionHeader<'_>> {
    let body = at_indent(text, indent)?;
    let caps = FUNCTION_HEADER.captures(body)?;
    Some(FunctionHeader {
        name: caps.get(1)?.as_str(),
        arguments: caps.get(2).map_or("", |m| m.as_str()),
        closed: caps.get(3).is_some(),
        inline_body: caps.get(4).map_or("", |m| m.as_str().trim()),
    })
}

/// Argument text of a wrapped signature line and whether it closes the
/// signature with `):`, possibly followed by an inline statement.
pub fn signature_continuation(text: &str) -> Continuation<'_> {
    match SIGNATURE_CONTINUATION.captures(text) {
        Some(caps) => Continuation {
            arguments: caps.get(1).map_or("", |m| m.as_str()),
            closed: caps.get(2).is_some(),
            inline_body: caps.get(3).map_or("", |m| m.as_str().trim()),
        },
        None => Continuation {
            arguments: "",
            closed: false,
            inline_body: "",
        },
    }
}

pub fn class_header(text: &str, indent: usize) -> Option<ClassHeader<'_>> {
    let body = at_indent(text, indent)?;
    let caps = CLASS_HEADER.captures(body)?;
    Some(ClassHeader {
        name: caps.get(1)?.as_str(),
        inheritance: caps.get(2).map_or("", |m| m.as_str().trim()),
    })
}

/// Detect a line that starts (after spaces and an optional string prefix
/// such as `r` or `u`) with a triple-quote delimiter. Returns the delimiter
/// and the byte offset where the string body begins.
pub fn opening_delimiter(text: &str) -> Option<(Delimiter, usize)> {
    let start = indent_of(text);
    let rest = &text[start..];
    let prefix = rest
        .bytes()
        .take(2)
        .take_while(|b| matches!(b, b'r' | b'R' | b'u' | b'U' | b'b' | b'B' | b'f' | b'F'))
        .count();
    let quoted = &rest[prefix..];
    let delim = if quoted.starts_with(Delimiter::Double.as_str()) {
        Delimiter::Double
    } else if quoted.starts_with(Delimiter::Single.as_str()) {
        Delimiter::Single
    } else {
        return None;
    };
    Some((delim, start + prefix + delim.as_str().len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("import os", 0, Some(vec!["os"]))]
    #[case("import numpy as np", 0, Some(vec!["numpy"]))]
    #[case("import os.path, sys", 0, Some(vec!["os.path", "sys"]))]
    #[case("from collections import OrderedDict", 0, Some(vec!["collections"]))]
    #[case("from .sibling import thing", 0, Some(vec![".sibling"]))]
    #[case("    import re", 4, Some(vec!["re"]))]
    #[case("    import re", 0, None)]
    #[case("important = 1", 0, None)]
    fn test_import_names(#[case] line: &str, #[case] indent: usize, #[case] expected: Option<Vec<&str>>) {
        let expected = expected.map(|v| v.into_iter().map(String::from).collect::<Vec<_>>());
        assert_eq!(import_names(line, indent), expected);
    }

    #[rstest]
    #[case("__version__ = '1.1'", Some("1.1"))]
    #[case("__version__=\"2.0.3\"", Some("2.0.3"))]
    #[case("__version__ = VERSION", None)]
    #[case("__version__ = '1.0\"", None)]
    fn test_version(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(version(line, 0).as_deref(), expected);
    }

    #[rstest]
    #[case("x = 5", Some(("x", "5")))]
    #[case("VALID_VAR = \"([_A-Za-z][_a-zA-Z0-9]*)\"", Some(("VALID_VAR", "\"([_A-Za-z][_a-zA-Z0-9]*)\"")))]
    #[case("x == 5", None)]
    #[case("x += 1", None)]
    #[case("self.x = 1", None)]
    fn test_variable(#[case] line: &str, #[case] expected: Option<(&str, &str)>) {
        let found = variable(line, 0);
        assert_eq!(
            found.as_ref().map(|(n, v)| (n.as_str(), v.as_str())),
            expected
        );
    }

    #[rstest]
    #[case("raise ValueError('bad (x)')", Some("ValueError"))]
    #[case("        raise errors.ParseError(msg) from exc", Some("errors.ParseError"))]
    #[case("raise", None)]
    #[case("raise exc", None)]
    fn test_raised_exception(#[case] line: &str, #[case] expected: Option<&str>) {
        assert_eq!(raised_exception(line).as_deref(), expected);
    }

    #[test]
    fn test_function_header_closed() {
        let header = function_header("def f(a, b=1):", 0).unwrap();
        assert_eq!(header.name, "f");
        assert_eq!(header.arguments, "a, b=1");
        assert!(header.closed);
    }

    #[test]
    fn test_function_header_with_annotations_and_async() {
        let header = function_header("    async def run(self, x=(1, 2)) -> Dict[str, int]:", 4).unwrap();
        assert_eq!(header.name, "run");
        assert_eq!(header.arguments, "self, x=(1, 2)");
        assert!(header.closed);
    }

    #[test]
    fn test_function_header_wrapped() {
        let header = function_header("def f(a,", 0).unwrap();
        assert_eq!(header.arguments, "a,");
        assert!(!header.closed);
        let last = signature_continuation("      b):");
        assert_eq!((last.arguments, last.closed, last.inline_body), ("b", true, ""));
        let middle = signature_continuation("      c,");
        assert_eq!((middle.arguments, middle.closed), ("c,", false));
        let inline = signature_continuation("      d): return d");
        assert_eq!((inline.arguments, inline.closed, inline.inline_body), ("d", true, "return d"));
    }

    #[test]
    fn test_function_header_inline_body() {
        let header = function_header("    def m(self): pass", 4).unwrap();
        assert_eq!(header.name, "m");
        assert_eq!(header.arguments, "self");
        assert!(header.closed);
        assert_eq!(header.inline_body, "pass");

        let header = function_header("def f(x=g()) -> int: raise ValueError(x)", 0).unwrap();
        assert_eq!(header.arguments, "x=g()");
        assert_eq!(header.inline_body, "raise ValueError(x)");

        assert_eq!(function_header("def f(a, b=1):", 0).unwrap().inline_body, "");
    }

    #[test]
    fn test_function_header_wrong_indent() {
        assert!(function_header("    def f():", 0).is_none());
        assert!(function_header("def f():", 4).is_none());
    }

    #[test]
    fn test_class_header() {
        let header = class_header("class FileTypeError(Exception):", 0).unwrap();
        assert_eq!(header.name, "FileTypeError");
        assert_eq!(header.inheritance, "Exception");
        let bare = class_header("class Plain:", 0).unwrap();
        assert_eq!(bare.inheritance, "");
        assert!(class_header("class Inline(object): pass", 0).is_none());
    }

    #[test]
    fn test_opening_delimiter() {
        assert_eq!(opening_delimiter("'''doc"), Some((Delimiter::Single, 3)));
        assert_eq!(opening_delimiter("    r\"\"\"raw"), Some((Delimiter::Double, 8)));
        assert_eq!(opening_delimiter("x = '''doc'''"), None);
        assert_eq!(opening_delimiter("'single'"), None);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify("__version__ = '1.0'", 0), LineKind::Version("1.0".into()));
        assert_eq!(classify("import os", 0), LineKind::Import(vec!["os".into()]));
        assert!(matches!(classify("x = 1", 0), LineKind::Variable { .. }));
        assert!(matches!(classify("def f():", 0), LineKind::FunctionHeader(_)));
        assert!(matches!(classify("class A(B):", 0), LineKind::ClassHeader(_)));
        assert_eq!(
            classify("\"\"\"doc", 0),
            LineKind::DocstringDelimiter(Delimiter::Double)
        );
        assert_eq!(classify("    raise KeyError(k)", 0), LineKind::Raise("KeyError".into()));
        assert_eq!(classify("print(x)", 0), LineKind::Other);
    }
}
