//! Symbol tree produced by the line parser.
//!
//! Every record derives serde so a tree can be printed as JSON or stored in the
//! incremental cache. Sequences are only sorted once a scope has been fully
//! scanned; see [`sort_by_name`].
use serde::{Deserialize, Serialize};

/// Something that sorts by its `name` field.
pub trait Named {
    fn name(&self) -> &str;
}

/// Stable sort by name: equal names keep their discovery order.
pub fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

/// A keyword parameter and its default, kept as raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordParameter {
    pub name: String,
    pub default: String,
}

impl KeywordParameter {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSymbol {
    pub name: String,
    /// Right-hand side exactly as written, never evaluated
    pub value: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub name: String,
    pub positional: Vec<String>,
    pub keywords: Vec<KeywordParameter>,
    pub docstring: String,
    /// Callables named in `raise X(...)` statements, first occurrence order
    pub exceptions: Vec<String>,
    /// Zero-based line of the `def` header
    pub line: usize,
}

impl FunctionSymbol {
    /// `pos, kw=default` as it would appear between the parentheses.
    pub fn signature_arguments(&self) -> String {
        self.positional
            .iter()
            .cloned()
            .chain(
                self.keywords
                    .iter()
                    .map(|kw| format!("{}={}", kw.name, kw.default)),
            )
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    /// Text between the header parentheses, empty for `class Name:`
    pub inheritance: String,
    pub imports: Vec<String>,
    pub variables: Vec<VariableSymbol>,
    pub methods: Vec<FunctionSymbol>,
    pub docstring: String,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSymbolTree {
    pub module_name: String,
    pub description: String,
    pub version: String,
    pub imports: Vec<String>,
    pub variables: Vec<VariableSymbol>,
    pub functions: Vec<FunctionSymbol>,
    pub classes: Vec<ClassSymbol>,
}

impl ModuleSymbolTree {
    /// Functions and methods, module level first.
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionSymbol> {
        self.functions
            .iter()
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
    }
}

impl Named for VariableSymbol {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for FunctionSymbol {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ClassSymbol {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Sort and deduplicate imported module names.
pub fn normalize_imports(imports: &mut Vec<String>) {
    imports.sort();
    imports.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn var(name: &str, line: usize) -> VariableSymbol {
        VariableSymbol {
            name: name.to_string(),
            value: line.to_string(),
            line,
        }
    }

    #[test]
    fn test_sort_keeps_discovery_order_for_ties() {
        let mut vars = vec![var("b", 0), var("a", 1), var("b", 2), var("a", 3)];
        sort_by_name(&mut vars);
        let order: Vec<_> = vars.iter().map(|v| (v.name.as_str(), v.line)).collect();
        assert_eq!(order, vec![("a", 1), ("a", 3), ("b", 0), ("b", 2)]);
    }

    #[test]
    fn test_signature_arguments() {
        let func = FunctionSymbol {
            name: "f".into(),
            positional: vec!["a".into(), "b".into()],
            keywords: vec![KeywordParameter::new("c", "None")],
            docstring: String::new(),
            exceptions: vec![],
            line: 0,
        };
        assert_eq!(func.signature_arguments(), "a, b, c=None");
    }

    #[test]
    fn test_normalize_imports_dedups() {
        let mut imports = vec!["sys".to_string(), "os".to_string(), "sys".to_string()];
        normalize_imports(&mut imports);
        assert_eq!(imports, vec!["os", "sys"]);
    }

    proptest! {
        #[test]
        fn sort_by_name_is_idempotent(names in prop::collection::vec("[a-c]{0,2}", 0..20)) {
            let mut once: Vec<_> = names.iter().enumerate().map(|(i, n)| var(n, i)).collect();
            sort_by_name(&mut once);
            let mut twice = once.clone();
            sort_by_name(&mut twice);
            prop_assert_eq!(&once, &twice);
            for pair in once.windows(2) {
                prop_assert!(pair[0].name < pair[1].name
                    || (pair[0].name == pair[1].name && pair[0].line < pair[1].line));
            }
        }
    }
}
