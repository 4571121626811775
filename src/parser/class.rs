use super::classify::{self, ClassHeader};
use super::docstring::extract_docstring;
use super::function::try_parse_function;
use super::scanner::{LineCursor, SourceLine};
use crate::symbols::{normalize_imports, sort_by_name, ClassSymbol, VariableSymbol};

/// Parse a class whose header is `header`, at exactly `indent` spaces.
pub fn try_parse_class<'a>(
    header: &SourceLine<'a>,
    cursor: &mut LineCursor<'a>,
    indent: usize,
) -> Option<ClassSymbol> {
    if header.verbatim {
        return None;
    }
    let head = classify::class_header(header.text, indent)?;
    Some(parse_from_header(head, header, cursor))
}

/// Collect the docstring, imports, variables and methods of a class body.
/// Lines nested deeper than the body (or not recognised) are skipped.
pub fn parse_from_header<'a>(
    head: ClassHeader<'_>,
    header: &SourceLine<'a>,
    cursor: &mut LineCursor<'a>,
) -> ClassSymbol {
    let mut class = ClassSymbol {
        name: head.name.to_string(),
        inheritance: head.inheritance.to_string(),
        imports: Vec::new(),
        variables: Vec::new(),
        methods: Vec::new(),
        docstring: String::new(),
        line: header.number,
    };

    let body_indent = match cursor.peek() {
        Some(line) if !line.verbatim && line.indent() > header.indent() => line.indent(),
        _ => return class,
    };
    class.docstring = extract_docstring(cursor, body_indent).unwrap_or_default();

    while let Some(line) = cursor.next_in_block(body_indent) {
        if line.verbatim {
            continue;
        }
        if let Some(names) = classify::import_names(line.text, body_indent) {
            class.imports.extend(names);
        } else if let Some((name, value)) = classify::variable(line.text, body_indent) {
            class.variables.push(VariableSymbol {
                name,
                value,
                line: line.number,
            });
        } else if let Some(method) = try_parse_function(&line, cursor, body_indent) {
            class.methods.push(method);
        }
    }

    normalize_imports(&mut class.imports);
    sort_by_name(&mut class.variables);
    sort_by_name(&mut class.methods);
    class
}
