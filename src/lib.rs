pub mod analyzer {
    pub mod index;
    pub mod locate;
}
pub mod cache;
pub mod docgen;
pub mod error;
pub mod parser;
pub mod render {
    pub mod html;
    pub mod text;
}
pub mod symbols;

// Re-export selected API for consumers
pub use analyzer::index::{IndexOptions, ProjectIndex};
pub use analyzer::locate::{Locator, Resolution, ResolvedSource};
pub use error::{DocuError, Result};
pub use parser::{parse, parse_bytes};
pub use render::{html::render_html, text::render_text};
pub use symbols::{ClassSymbol, FunctionSymbol, KeywordParameter, ModuleSymbolTree, VariableSymbol};
