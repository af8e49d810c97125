//! dusk parser: recursive-descent parser producing a typed arena AST.
//!
//! This crate turns source text into the closed node set of [`ast`]. The
//! scanner is driven on demand with explicit scan contexts (division vs.
//! regex, template continuations, relaxed names), object and array literals
//! are reinterpreted as destructuring patterns where the grammar demands,
//! and strict mode is tracked through a re-entrant context stack rather
//! than any global state.

pub mod ast;
pub mod diagnostics;
mod parser;
pub mod validate;

pub use dusk_common::error::SyntaxError;
pub use parser::ParseResult;

use parser::Parser;

/// Parse a script (sloppy mode at top level).
pub fn parse_script(source: &str) -> Result<ParseResult, SyntaxError> {
    Parser::new(source).parse_script()
}

/// Parse a module. Module code is strict from the first token.
pub fn parse_module(source: &str) -> Result<ParseResult, SyntaxError> {
    Parser::new(source).parse_module()
}

/// Parse in function context: like a script, but top-level `return` is
/// permitted. Used when the output will be wrapped in a function.
pub fn parse_function_context(source: &str) -> Result<ParseResult, SyntaxError> {
    Parser::new(source).parse_function_context()
}
