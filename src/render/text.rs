use std::fmt::Write;

use crate::symbols::{FunctionSymbol, ModuleSymbolTree};

const INDENT: &str = "    ";

/// Plain-text report in the style of pydoc. Empty sections are left out.
pub fn render_text(tree: &ModuleSymbolTree) -> String {
    let mut out = String::new();
    section(&mut out, "NAME", [tree.module_name.as_str()]);
    if !tree.description.is_empty() {
        section(&mut out, "DESCRIPTION", tree.description.lines());
    }
    if !tree.version.is_empty() {
        section(&mut out, "VERSION", [tree.version.as_str()]);
    }
    if !tree.imports.is_empty() {
        section(&mut out, "MODULES", tree.imports.iter().map(String::as_str));
    }
    if !tree.variables.is_empty() {
        section(
            &mut out,
            "VARIABLES",
            tree.variables.iter().map(|v| v.name.as_str()),
        );
    }

    if !tree.functions.is_empty() {
        out.push_str("FUNCTIONS\n");
        for func in &tree.functions {
            function_entry(&mut out, INDENT, func);
        }
        out.push('\n');
    }

    if !tree.classes.is_empty() {
        out.push_str("CLASSES\n");
        for class in &tree.classes {
            let _ = writeln!(out, "{INDENT}{}({})", class.name, class.inheritance);
            let gutter = format!("{INDENT} |  ");
            docstring_lines(&mut out, &gutter, &class.docstring);
            if !class.imports.is_empty() {
                member_heading(&mut out, "MODULES");
                for name in &class.imports {
                    let _ = writeln!(out, "{gutter}{INDENT}{name}");
                }
            }
            if !class.variables.is_empty() {
                member_heading(&mut out, "VARIABLES");
                for var in &class.variables {
                    let _ = writeln!(out, "{gutter}{INDENT}{}", var.name);
                }
            }
            if !class.methods.is_empty() {
                member_heading(&mut out, "METHODS");
                let method_indent = format!("{gutter}{INDENT}");
                for method in &class.methods {
                    function_entry(&mut out, &method_indent, method);
                }
            }
            out.push('\n');
        }
    }
    out
}

fn section<'a>(out: &mut String, title: &str, lines: impl IntoIterator<Item = &'a str>) {
    out.push_str(title);
    out.push('\n');
    for line in lines {
        let _ = writeln!(out, "{INDENT}{line}");
    }
    out.push('\n');
}

fn member_heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "{INDENT} |");
    let _ = writeln!(out, "{INDENT} |  {title}");
}

fn function_entry(out: &mut String, indent: &str, func: &FunctionSymbol) {
    let _ = writeln!(out, "{indent}{}({})", func.name, func.signature_arguments());
    docstring_lines(out, &format!("{indent} |  "), &func.docstring);
}

fn docstring_lines(out: &mut String, gutter: &str, docstring: &str) {
    for line in docstring.lines() {
        let _ = writeln!(out, "{}", format!("{gutter}{line}").trim_end());
    }
}
