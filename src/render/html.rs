use std::collections::BTreeSet;
use std::fmt::Write;

use crate::symbols::{FunctionSymbol, ModuleSymbolTree};

/// Name of the stylesheet every page links to.
pub const STYLESHEET_NAME: &str = "docu.css";

/// Default stylesheet, written next to the generated pages.
pub const STYLESHEET: &str = r#"body {
  margin: 0;
  font-family: 'Open Sans', Helvetica, Arial, sans-serif;
  font-weight: 300;
  color: #333;
  background: #f4f4f4;
}
.back-title { background: #2d3e50; padding: 1em 2em; }
.title { color: #fff; font-weight: 300; margin: 0; }
.main { max-width: 960px; margin: 0 auto; padding: 1em 2em; }
.frame { background: #fff; border-radius: 4px; margin: 1em 0; padding: 0.5em 1em; }
.frame-title { text-transform: uppercase; color: #2d3e50; margin: 0.5em 0; }
pre { font-family: inherit; white-space: pre-wrap; margin: 0.3em 0 0.8em 1em; }
ul { list-style: none; padding-left: 1em; }
.function-name, .class-name, .class-function-name { font-weight: 600; }
.function-args, .class-arg { font-style: italic; }
.function-kwdef { color: #777; }
.class-title { margin: 0.5em 0 0.2em 0; text-transform: uppercase; }
.credits { font-size: 0.8em; color: #999; text-align: right; }
"#;

/// Options for [`render_html`].
#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    /// Dependent modules that have their own page and get a hyperlink
    pub linked_modules: BTreeSet<String>,
}

fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

fn docstring_block(s: &str) -> String {
    s.lines().map(escape_html).collect::<Vec<_>>().join("<br>\n")
}

/// Render a standalone HTML page for one module.
pub fn render_html(tree: &ModuleSymbolTree, options: &HtmlOptions) -> String {
    let name = escape_html(&tree.module_name);
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html>\n<head>\n");
    out.push_str(" <meta charset=\"utf-8\">\n");
    let _ = writeln!(out, " <title>Python Documentation: {name}</title>");
    let _ = writeln!(
        out,
        " <link href=\"{STYLESHEET_NAME}\" rel=\"stylesheet\" type=\"text/css\">"
    );
    out.push_str("</head>\n<body>\n");
    out.push_str(" <div class=\"back-title\">\n");
    let _ = writeln!(out, "  <h1 class=\"title\">Python Documentation: {name}</h1>");
    out.push_str(" </div>\n <div class=\"main\">\n");

    frame(&mut out, "nameframe", "module name", &format!("<div class=\"frame-content\">{name}</div>"));
    if !tree.version.is_empty() {
        let body = format!("<div class=\"frame-content\">{}</div>", escape_html(&tree.version));
        frame(&mut out, "versionframe", "version", &body);
    }
    if !tree.description.is_empty() {
        let body = format!(
            "<pre class=\"frame-content\">{}</pre>",
            docstring_block(&tree.description)
        );
        frame(&mut out, "descriptionframe", "description", &body);
    }
    if !tree.imports.is_empty() {
        let items: Vec<String> = tree
            .imports
            .iter()
            .map(|module| {
                let label = escape_html(module);
                if options.linked_modules.contains(module) {
                    format!("<a href=\"{label}.html\" class=\"module\">{label}</a>")
                } else {
                    label
                }
            })
            .collect();
        frame(&mut out, "modulesframe", "dependent modules", &list("modules", &items));
    }
    if !tree.variables.is_empty() {
        let items: Vec<String> = tree.variables.iter().map(|v| escape_html(&v.name)).collect();
        frame(&mut out, "variablesframe", "variables", &list("variables", &items));
    }
    if !tree.functions.is_empty() {
        let items: Vec<String> = tree
            .functions
            .iter()
            .map(|f| function_item("function", f, false))
            .collect();
        frame(&mut out, "functionsframe", "functions", &list("functions", &items));
    }
    if !tree.classes.is_empty() {
        let items: Vec<String> = tree
            .classes
            .iter()
            .map(|class| {
                let mut item = String::from("<div class=\"class\">\n");
                let _ = writeln!(
                    item,
                    "<div class=\"class-name\"><span class=\"class-name\">{}</span>(<span class=\"class-arg\">{}</span>)</div>",
                    escape_html(&class.name),
                    escape_html(&class.inheritance)
                );
                item.push_str("<div class=\"class-main\">\n");
                let _ = writeln!(
                    item,
                    "<pre class=\"class-docstring\">{}</pre>",
                    docstring_block(&class.docstring)
                );
                if !class.imports.is_empty() {
                    let modules: Vec<String> = class.imports.iter().map(|m| escape_html(m)).collect();
                    class_part(&mut item, "modules", "modules", &modules);
                }
                if !class.variables.is_empty() {
                    let vars: Vec<String> = class.variables.iter().map(|v| escape_html(&v.name)).collect();
                    class_part(&mut item, "variables", "variables", &vars);
                }
                if !class.methods.is_empty() {
                    let methods: Vec<String> = class
                        .methods
                        .iter()
                        .map(|m| function_item("class-function", m, true))
                        .collect();
                    class_part(&mut item, "functions", "methods", &methods);
                }
                item.push_str("</div>\n</div>");
                item
            })
            .collect();
        frame(&mut out, "classesframe", "classes", &list("classes", &items));
    }

    let _ = writeln!(
        out,
        " <div class=\"credits\">This page was made with docu {}</div>",
        env!("CARGO_PKG_VERSION")
    );
    out.push_str(" </div>\n</body>\n</html>\n");
    out
}

fn frame(out: &mut String, id: &str, title: &str, body: &str) {
    let _ = writeln!(out, " <div class=\"frame\" id=\"{id}\">");
    let _ = writeln!(out, "  <h4 class=\"frame-title\">{title}</h4>");
    let _ = writeln!(out, "  {body}");
    out.push_str(" </div>\n");
}

fn list(class: &str, items: &[String]) -> String {
    let mut out = format!("<ul class=\"{class}\">\n");
    for item in items {
        let _ = writeln!(out, "   <li class=\"{class}\">{item}</li>");
    }
    out.push_str("  </ul>");
    out
}

fn class_part(out: &mut String, kind: &str, title: &str, items: &[String]) {
    let _ = writeln!(out, "<div class=\"class-{kind}\">");
    let _ = writeln!(out, "<h5 class=\"class-title\">{title}</h5>");
    out.push_str(&list(&format!("class-{kind}"), items));
    out.push_str("\n</div>\n");
}

/// Signature and docstring of a function. Methods leave out `self`.
fn function_item(prefix: &str, func: &FunctionSymbol, is_method: bool) -> String {
    let args = func
        .positional
        .iter()
        .filter(|a| !(is_method && a.as_str() == "self"))
        .map(|a| format!("<span class=\"function-args\">{}</span>", escape_html(a)));
    let keywords = func.keywords.iter().map(|kw| {
        format!(
            "<span class=\"function-kw\">{}</span>=<span class=\"function-kwdef\">{}</span>",
            escape_html(&kw.name),
            escape_html(&kw.default)
        )
    });
    let signature = args.chain(keywords).collect::<Vec<_>>().join(", ");
    format!(
        "<div class=\"{prefix}\">\n<div class=\"{prefix}-name\"><span class=\"{prefix}-name\">{}</span>({signature})</div>\n<pre class=\"{prefix}-docstring\">{}</pre>\n</div>",
        escape_html(&func.name),
        docstring_block(&func.docstring)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_page_structure() {
        let source = concat!(
            "'''Compare <a> & <b>.'''\n",
            "__version__ = '1.0'\n",
            "import os\n",
            "import helpers\n",
            "def cmp(a, b=\"<\"):\n",
            "    '''First line.\n",
            "    Second line.'''\n",
            "    pass\n",
        );
        let mut options = HtmlOptions::default();
        options.linked_modules.insert("helpers".to_string());
        let page = render_html(&parse("cmp", source), &options);

        assert!(page.starts_with("<!doctype html>"));
        assert!(page.contains("<title>Python Documentation: cmp</title>"));
        assert!(page.contains("Compare &lt;a&gt; &amp; &lt;b&gt;."));
        assert!(page.contains("<a href=\"helpers.html\" class=\"module\">helpers</a>"));
        assert!(page.contains("<li class=\"modules\">os</li>"));
        assert!(page.contains("<span class=\"function-kwdef\">&quot;&lt;&quot;</span>"));
        assert!(page.contains("First line.<br>\nSecond line."));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_methods_hide_self() {
        let source = "class A(object):\n    def m(self, x):\n        pass\n";
        let page = render_html(&parse("a", source), &HtmlOptions::default());
        assert!(page.contains("<span class=\"class-function-name\">m</span>(<span class=\"function-args\">x</span>)"));
        assert!(!page.contains(">self<"));
    }
}
