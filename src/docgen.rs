//! Docstring templates for undocumented functions.
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::analyzer::locate::module_name_for;
use crate::error::{DocuError, Result};
use crate::parser::scanner::LineCursor;
use crate::parser::{classify, decode_source, function};
use crate::symbols::{FunctionSymbol, ModuleSymbolTree};

/// Placeholder docstring for `func`, indented for a body one level below a
/// header at `indent`. Returns `None` (and warns) if the function already
/// has a docstring.
pub fn function_docstring_template(func: &FunctionSymbol, indent: usize) -> Option<String> {
    if !func.docstring.is_empty() {
        warn!(function = %func.name, "function already has a docstring");
        return None;
    }
    let ws = " ".repeat(indent + 4);
    let mut lines = vec![
        format!("{ws}'''"),
        String::new(),
        String::new(),
        format!("{ws}Args:"),
    ];
    for arg in func.positional.iter().filter(|a| a.as_str() != "self") {
        lines.push(format!("{ws}    {arg} (): ."));
    }
    for kw in &func.keywords {
        lines.push(format!(
            "{ws}    {} (, optional): . Defaults to {}.",
            kw.name, kw.default
        ));
    }
    lines.push(String::new());
    lines.push(format!("{ws}Returns:"));
    lines.push(String::new());
    lines.push(format!("{ws}Raises:"));
    for exc in &func.exceptions {
        lines.push(format!("{ws}    {exc}"));
    }
    lines.push(format!("{ws}'''"));
    Some(lines.join("\n"))
}

/// Look a function up by name: module functions first, then methods.
pub fn find_function<'t>(tree: &'t ModuleSymbolTree, name: &str) -> Option<&'t FunctionSymbol> {
    tree.all_functions().find(|f| f.name == name)
}

/// Template for the named function of `tree`, indented as a method when the
/// function was found inside a class.
pub fn template_for(tree: &ModuleSymbolTree, function_name: &str) -> Result<Option<String>> {
    let indent = if tree.functions.iter().any(|f| f.name == function_name) {
        0
    } else {
        4
    };
    let func = find_function(tree, function_name).ok_or_else(|| DocuError::FunctionNotFound {
        function: function_name.to_string(),
        module: tree.module_name.clone(),
    })?;
    Ok(function_docstring_template(func, indent))
}

/// Insert a template below the signature of every undocumented function or
/// method in `source`. Returns the new text and the number of insertions.
///
/// Functions nested inside another function's body are left alone, as are
/// signatures that never close and one-line functions such as
/// `def f(): return 1`, whose body already sits on the signature line.
pub fn fill_missing_docstrings(source: &str) -> (String, usize) {
    let mut insertions: Vec<(usize, String)> = Vec::new();
    let mut cursor = LineCursor::new(source);
    while let Some(line) = cursor.next_line() {
        if line.verbatim {
            continue;
        }
        let indent = line.indent();
        let Some(head) = classify::function_header(line.text, indent) else {
            continue;
        };
        let parsed = function::parse_from_header(head, &line, &mut cursor);
        if !parsed.signature_closed
            || parsed.inline_body
            || !parsed.symbol.docstring.is_empty()
        {
            continue;
        }
        if let Some(template) = function_docstring_template(&parsed.symbol, indent) {
            debug!(function = %parsed.symbol.name, line = parsed.header_end, "inserting docstring template");
            insertions.push((parsed.header_end, template));
        }
    }

    let count = insertions.len();
    let mut pending = insertions.into_iter().peekable();
    let mut out = String::with_capacity(source.len());
    for (number, raw) in source.split_inclusive('\n').enumerate() {
        out.push_str(raw);
        while let Some((_, template)) = pending.next_if(|(after, _)| *after == number) {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&template);
            out.push('\n');
        }
    }
    (out, count)
}

const BOM: &str = "\u{feff}";

/// Run [`fill_missing_docstrings`] on a file and rewrite it when anything
/// was inserted. A leading byte order mark survives the rewrite.
pub fn fill_file(path: &Path) -> Result<usize> {
    let bytes = fs::read(path)?;
    let source = decode_source(&module_name_for(path), &bytes)?;
    let (filled, count) = fill_missing_docstrings(source);
    if count == 0 {
        info!(path = %path.display(), "nothing to fill");
        return Ok(0);
    }
    if bytes.starts_with(BOM.as_bytes()) {
        fs::write(path, format!("{BOM}{filled}"))?;
    } else {
        fs::write(path, filled)?;
    }
    info!(path = %path.display(), count, "inserted docstring templates");
    Ok(count)
}
