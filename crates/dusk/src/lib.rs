//! dusk: a source-to-source compiler core.
//!
//! Accepts a program written in a next-generation curly-brace scripting
//! dialect (block-scoped bindings, classes, modules, destructuring,
//! default/rest parameters, spread, arrow functions, template strings,
//! generators, `for-of`, async functions, comprehensions) and emits an
//! equivalent program in the widely-supported older dialect.
//!
//! The pipeline is scanner → parser → rewriter, all synchronous and free
//! of shared state: [`translate`] may be called concurrently from
//! independent threads.

pub use dusk_codegen::{is_wrapped, Options, SIGNATURE};
pub use dusk_common::error::SyntaxError;
pub use dusk_parser::{ast, diagnostics, ParseResult};

/// Options for [`parse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Parse as a module (strict, imports/exports recognized).
    pub module: bool,
    /// Permit top-level `return`.
    pub function_context: bool,
}

/// Parse input into an AST without rewriting it.
pub fn parse(input: &str, options: &ParseOptions) -> Result<ParseResult, SyntaxError> {
    if options.module {
        dusk_parser::parse_module(input)
    } else if options.function_context {
        dusk_parser::parse_function_context(input)
    } else {
        dusk_parser::parse_script(input)
    }
}

/// Translate input to the downlevel dialect.
///
/// Already-wrapped input (detected via the fixed signature) passes through
/// untouched when wrapping is requested, which makes translation
/// idempotent. The `runtime` and `polyfill` sources, when provided, are
/// prepended before the translated body; under `wrap` the whole output is
/// enclosed in the loader shim.
pub fn translate(input: &str, options: &Options) -> Result<String, SyntaxError> {
    let wrap = options.wrap && options.module;
    if wrap && is_wrapped(input) {
        return Ok(input.to_string());
    }

    let parse = if options.module {
        dusk_parser::parse_module(input)?
    } else if options.function_context {
        dusk_parser::parse_function_context(input)?
    } else {
        dusk_parser::parse_script(input)?
    };

    let (body, dependencies) = dusk_codegen::rewrite_program(input, &parse, options);

    let mut out = body;
    if options.function_context && !options.module {
        out = format!("(function() {{ {out} }})");
    }

    let mut prelude = String::new();
    if let Some(polyfill) = &options.polyfill {
        prelude.push_str(polyfill);
        prelude.push('\n');
    }
    if let Some(runtime) = &options.runtime {
        prelude.push_str(runtime);
        prelude.push('\n');
    }
    if !prelude.is_empty() {
        out = format!("{prelude}{out}");
    }

    if wrap {
        out = dusk_codegen::wrap_module(&out, &dependencies, options.global.as_deref());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_passes_plain_code_through() {
        let out = translate("var x = 1;\n", &Options::default()).unwrap();
        assert_eq!(out, "var x = 1;\n");
    }

    #[test]
    fn parse_rejects_bad_input_with_location() {
        let err = parse("var x = ;", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 9);
    }

    #[test]
    fn function_context_permits_return_and_wraps() {
        assert!(parse("return 1;", &ParseOptions::default()).is_err());
        let options = ParseOptions {
            function_context: true,
            ..Default::default()
        };
        assert!(parse("return 1;", &options).is_ok());

        let out = translate(
            "return 1;",
            &Options {
                function_context: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(out.starts_with("(function() {"));
        assert!(out.contains("return 1;"));
    }
}
