//! dusk codegen: the desugaring rewriter.
//!
//! Consumes the arena AST from `dusk-parser` and produces downlevel source
//! text. The rewrite is a single depth-first pass with line-preserving
//! output: regions that shrink are padded with trailing newlines so every
//! untouched source line keeps its line number.

mod linesync;
mod output;
mod rewrite;

pub use linesync::{count_newlines, preserve_newlines, sync_newlines};
pub use output::{is_wrapped, string_literal, wrap_module, SIGNATURE};

use dusk_parser::ParseResult;

/// Translation options. `runtime` and `polyfill` carry the helper-library
/// text to prepend (the library itself ships with the collaborator that
/// owns it); `wrap` applies the loader shim and only makes sense together
/// with `module`.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Parse the input as a module (imports/exports recognized).
    pub module: bool,
    /// Parse in function context, permitting top-level `return`, and wrap
    /// the output as a function expression.
    pub function_context: bool,
    /// Enclose the output in the host-dispatch loader shim.
    pub wrap: bool,
    /// Global name the loader shim installs the module under when the
    /// host has no module system.
    pub global: Option<String>,
    /// Runtime helper library source to prepend as-is.
    pub runtime: Option<String>,
    /// Legacy polyfill source to prepend before the runtime.
    pub polyfill: Option<String>,
    /// Emit `__load("url", legacy)` imports instead of `require("url")`.
    pub runtime_imports: bool,
}

/// Rewrite a parsed program. Returns the output text and the list of
/// module dependencies in first-use order.
pub fn rewrite_program(
    source: &str,
    parse: &ParseResult,
    options: &Options,
) -> (String, Vec<String>) {
    rewrite::Rewriter::new(source, parse).run(options)
}
