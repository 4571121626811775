//! Lexical parser for python source.
//!
//! The parser never builds an AST. A [`LineCursor`](scanner::LineCursor)
//! yields cleaned lines, each line is classified at the indentation of the
//! current scope, and function and class bodies are delimited by indentation
//! alone. Anything that does not match a known pattern is skipped.
pub mod class;
pub mod classify;
pub mod docstring;
pub mod function;
pub mod scanner;

use tracing::debug;

use crate::error::{DocuError, Result};
use crate::symbols::{normalize_imports, sort_by_name, ModuleSymbolTree, VariableSymbol};
use classify::LineKind;
use docstring::extract_docstring;
use scanner::LineCursor;

/// Build the symbol tree of one module.
///
/// `module_name` is the display name already chosen by the caller. Matching
/// at top level runs import, version, variable, function, class in that
/// order; the first hit wins.
pub fn parse(module_name: &str, source: &str) -> ModuleSymbolTree {
    let mut cursor = LineCursor::new(source);
    let mut tree = ModuleSymbolTree {
        module_name: module_name.to_string(),
        description: extract_docstring(&mut cursor, 0).unwrap_or_default(),
        ..Default::default()
    };

    while let Some(line) = cursor.next_line() {
        if line.verbatim {
            continue;
        }
        match classify::classify(line.text, 0) {
            LineKind::Import(names) => tree.imports.extend(names),
            LineKind::Version(version) => tree.version = version,
            LineKind::Variable { name, value } => tree.variables.push(VariableSymbol {
                name,
                value,
                line: line.number,
            }),
            LineKind::FunctionHeader(head) => {
                let parsed = function::parse_from_header(head, &line, &mut cursor);
                tree.functions.push(parsed.symbol);
            }
            LineKind::ClassHeader(head) => {
                tree.classes
                    .push(class::parse_from_header(head, &line, &mut cursor));
            }
            _ => {}
        }
    }

    normalize_imports(&mut tree.imports);
    sort_by_name(&mut tree.variables);
    sort_by_name(&mut tree.functions);
    sort_by_name(&mut tree.classes);

    debug!(
        module = module_name,
        imports = tree.imports.len(),
        variables = tree.variables.len(),
        functions = tree.functions.len(),
        classes = tree.classes.len(),
        "parsed module"
    );
    tree
}

/// Check that raw bytes are source text and return them as `str`.
/// A leading byte order mark is dropped.
pub fn decode_source<'a>(module_name: &str, bytes: &'a [u8]) -> Result<&'a str> {
    if bytes.contains(&0) {
        return Err(DocuError::InputType {
            name: module_name.to_string(),
            reason: "contains NUL bytes".to_string(),
        });
    }
    let text = std::str::from_utf8(bytes).map_err(|e| DocuError::InputType {
        name: module_name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// [`parse`] for input that has not been checked to be text yet.
pub fn parse_bytes(module_name: &str, bytes: &[u8]) -> Result<ModuleSymbolTree> {
    let text = decode_source(module_name, bytes)?;
    Ok(parse(module_name, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::KeywordParameter;

    #[test]
    fn test_reference_module() {
        let source = "\"\"\"desc\"\"\"\n__version__ = \"2.0\"\nimport re\ndef foo():\n    '''doc'''\n    pass\n";
        let tree = parse("sample", source);
        assert_eq!(tree.module_name, "sample");
        assert_eq!(tree.description, "desc");
        assert_eq!(tree.version, "2.0");
        assert_eq!(tree.imports, vec!["re"]);
        assert_eq!(tree.functions.len(), 1);
        let foo = &tree.functions[0];
        assert_eq!(foo.name, "foo");
        assert!(foo.positional.is_empty());
        assert!(foo.keywords.is_empty());
        assert_eq!(foo.docstring, "doc");
        assert!(foo.exceptions.is_empty());
        assert!(tree.variables.is_empty());
        assert!(tree.classes.is_empty());
    }

    #[test]
    fn test_multi_line_module_description() {
        let source = "#!/usr/bin/env python\n'''\n.. module: demo\n\nLonger text.\n'''\n\nimport sys\n";
        let tree = parse("demo", source);
        assert_eq!(tree.description, ".. module: demo\n\nLonger text.");
        assert_eq!(tree.imports, vec!["sys"]);
    }

    #[test]
    fn test_first_line_is_kept_without_description() {
        let tree = parse("m", "import os\nimport abc\nimport os\n");
        assert_eq!(tree.description, "");
        assert_eq!(tree.imports, vec!["abc", "os"]);
    }

    #[test]
    fn test_version_is_not_a_variable() {
        let tree = parse("m", "__version__ = '1.1'\nVALID = 1\n");
        assert_eq!(tree.version, "1.1");
        let names: Vec<_> = tree.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["VALID"]);
    }

    #[test]
    fn test_collections_are_sorted() {
        let source = concat!(
            "zeta = 1\n",
            "alpha = 2\n",
            "def second():\n    pass\n",
            "def first(a, b=None):\n    pass\n",
            "class Zed(object):\n    pass\n",
            "class Abe(object):\n    pass\n",
        );
        let tree = parse("m", source);
        let vars: Vec<_> = tree.variables.iter().map(|v| v.name.as_str()).collect();
        let funcs: Vec<_> = tree.functions.iter().map(|f| f.name.as_str()).collect();
        let classes: Vec<_> = tree.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(vars, vec!["alpha", "zeta"]);
        assert_eq!(funcs, vec!["first", "second"]);
        assert_eq!(classes, vec!["Abe", "Zed"]);
        assert_eq!(tree.functions[0].keywords, vec![KeywordParameter::new("b", "None")]);
    }

    #[test]
    fn test_one_line_function_keeps_the_next_one() {
        let source = "def f(): return 1\ndef g(a):\n    raise ValueError(a)\nY = 2\n";
        let tree = parse("m", source);
        let funcs: Vec<_> = tree.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(funcs, vec!["f", "g"]);
        assert!(tree.functions[0].exceptions.is_empty());
        assert_eq!(tree.functions[1].positional, vec!["a"]);
        assert_eq!(tree.functions[1].exceptions, vec!["ValueError"]);
        assert_eq!(tree.variables[0].name, "Y");
    }

    #[test]
    fn test_indented_definitions_are_not_top_level() {
        let source = concat!(
            "if __name__ == '__main__':\n",
            "    def usage(code):\n",
            "        pass\n",
            "    OUTPUT = 'screen'\n",
        );
        let tree = parse("m", source);
        assert!(tree.functions.is_empty());
        assert!(tree.variables.is_empty());
    }

    #[test]
    fn test_docstring_content_is_not_parsed() {
        let source = concat!(
            "'''\n",
            "import fake\n",
            "def fake():\n",
            "'''\n",
            "import real\n",
        );
        let tree = parse("m", source);
        assert_eq!(tree.imports, vec!["real"]);
        assert!(tree.functions.is_empty());
    }

    #[test]
    fn test_truncated_input_does_not_panic() {
        let tree = parse("m", "'''unterminated\nclass A(\n");
        assert_eq!(tree.description, "unterminated\nclass A(");
        let tree = parse("m", "def f(a,\n");
        assert_eq!(tree.functions[0].positional, vec!["a"]);
        let tree = parse("m", "");
        assert_eq!(tree, ModuleSymbolTree { module_name: "m".into(), ..Default::default() });
    }

    #[test]
    fn test_parse_bytes_rejects_binary() {
        let err = parse_bytes("blob", &[0x03, 0xf3, 0x0d, 0x0a, 0x00]).unwrap_err();
        assert!(matches!(err, DocuError::InputType { .. }));
        let err = parse_bytes("latin", b"x = '\xe9'\n").unwrap_err();
        assert!(matches!(err, DocuError::InputType { .. }));
    }

    #[test]
    fn test_parse_bytes_strips_bom() {
        let tree = parse_bytes("bom", "\u{feff}'''Doc.'''\n".as_bytes()).unwrap();
        assert_eq!(tree.description, "Doc.");
    }
}
