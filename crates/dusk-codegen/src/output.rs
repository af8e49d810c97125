//! Output assembly: import headers, export trailers, and the module
//! wrapper shim.

use dusk_common::token::{keyword_from_str, strict_keyword_from_str};

/// Fixed signature prefixed to wrapped output so an already-wrapped module
/// is recognized and passed through untouched.
pub const SIGNATURE: &str = "/*=esdown=*/";

/// Whether `text` has already been through the module wrapper.
pub fn is_wrapped(text: &str) -> bool {
    text.starts_with(SIGNATURE)
}

/// Render a string as a source string literal, escaping everything that
/// would terminate or corrupt it.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{B}' => out.push_str("\\v"),
            '\u{C}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Property access for an export name: dot form, or bracket indexing when
/// the name is a reserved word.
pub fn export_member(name: &str) -> String {
    if keyword_from_str(name).is_some() || strict_keyword_from_str(name).is_some() {
        format!("exports[{}] = ", string_literal(name))
    } else {
        format!("exports.{name} = ")
    }
}

/// The import header: one `var` statement binding every distinct module
/// URL to its fresh identifier, on the same line as the first body line so
/// line numbering is untouched.
pub fn import_header(imports: &[(String, String)], runtime_imports: bool, legacy: bool) -> String {
    if imports.is_empty() {
        return String::new();
    }
    let bindings: Vec<String> = imports
        .iter()
        .map(|(ident, url)| {
            if runtime_imports {
                format!(
                    "{ident} = __load({}, {})",
                    string_literal(url),
                    if legacy { "true" } else { "false" }
                )
            } else {
                format!("{ident} = require({})", string_literal(url))
            }
        })
        .collect();
    format!("var {}; ", bindings.join(", "))
}

/// The export trailer: one `exports.<name> = <expr>;` line per entry of
/// the outermost export map, appended after the body.
pub fn export_trailer(exports: &[(String, String)]) -> String {
    if exports.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n");
    for (name, expr) in exports {
        out.push_str(&export_member(name));
        out.push_str(expr);
        out.push_str(";\n");
    }
    out
}

/// Enclose a translated module in the loader shim. The shim dispatches
/// between a CommonJS host and a browser global; under a bare host the
/// module's exports are installed under `global_name`.
pub fn wrap_module(body: &str, dependencies: &[String], global_name: Option<&str>) -> String {
    let deps = dependencies
        .iter()
        .map(|d| string_literal(d))
        .collect::<Vec<_>>()
        .join(", ");
    let name = match global_name {
        Some(name) => string_literal(name),
        None => "null".to_string(),
    };
    format!(
        "{SIGNATURE}(function(fn, deps, name) {{ \
if (typeof exports !== 'undefined') fn(require, exports, module); \
else {{ var e = {{}}, m = {{ exports: e }}; \
fn(function(id) {{ return this[id]; }}, e, m); \
if (name) this[name] = m.exports; }} \
}}).call(this, function(require, exports, module) {{ {body} }}, [{deps}], {name});"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes() {
        assert_eq!(string_literal("ab"), "\"ab\"");
        assert_eq!(string_literal("a\"b"), "\"a\\\"b\"");
        assert_eq!(string_literal("a\nb"), "\"a\\nb\"");
        assert_eq!(string_literal("a\\b"), "\"a\\\\b\"");
        assert_eq!(string_literal("a\u{2028}b"), "\"a\\u2028b\"");
    }

    #[test]
    fn export_member_uses_brackets_for_reserved_words() {
        assert_eq!(export_member("foo"), "exports.foo = ");
        assert_eq!(export_member("default"), "exports[\"default\"] = ");
        assert_eq!(export_member("class"), "exports[\"class\"] = ");
        assert_eq!(export_member("static"), "exports[\"static\"] = ");
    }

    #[test]
    fn import_header_renders_require_and_load_forms() {
        let imports = vec![
            ("_M0".to_string(), "p".to_string()),
            ("_M1".to_string(), "q".to_string()),
        ];
        assert_eq!(
            import_header(&imports, false, false),
            "var _M0 = require(\"p\"), _M1 = require(\"q\"); "
        );
        assert_eq!(
            import_header(&imports, true, true),
            "var _M0 = __load(\"p\", true), _M1 = __load(\"q\", true); "
        );
        assert_eq!(import_header(&[], false, false), "");
    }

    #[test]
    fn export_trailer_lists_entries() {
        let exports = vec![
            ("a".to_string(), "a".to_string()),
            ("c".to_string(), "b".to_string()),
        ];
        assert_eq!(export_trailer(&exports), "\nexports.a = a;\nexports.c = b;\n");
    }

    #[test]
    fn wrap_module_is_detectable() {
        let out = wrap_module("var x = 1;", &[], None);
        assert!(is_wrapped(&out));
        assert!(out.contains("var x = 1;"));
        assert!(!is_wrapped("var x = 1;"));
    }

    #[test]
    fn wrap_module_lists_dependencies_and_global() {
        let out = wrap_module("x", &["p".into(), "q".into()], Some("app"));
        assert!(out.contains("[\"p\", \"q\"]"));
        assert!(out.contains("\"app\""));
    }
}
