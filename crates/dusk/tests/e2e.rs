//! End-to-end properties of the public `translate`/`parse` surface:
//! idempotence under wrapping, line preservation, import de-duplication,
//! reserved-word export safety, and the full pipeline over realistic
//! inputs.

use dusk::{is_wrapped, parse, translate, Options, ParseOptions, SIGNATURE};

fn module_options() -> Options {
    Options {
        module: true,
        ..Default::default()
    }
}

// ── Idempotence ────────────────────────────────────────────────────────

#[test]
fn wrapped_translation_is_idempotent() {
    let options = Options {
        module: true,
        wrap: true,
        global: Some("app".to_string()),
        ..Default::default()
    };
    let source = "import {a} from \"p\";\nexport var x = a + 1;\n";
    let once = translate(source, &options).unwrap();
    assert!(is_wrapped(&once));
    assert!(once.starts_with(SIGNATURE));
    let twice = translate(&once, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unwrapped_input_is_not_detected_as_wrapped() {
    assert!(!is_wrapped("var x = 1;"));
    assert!(!is_wrapped(" /*=esdown=*/ with leading space"));
}

// ── Line preservation ──────────────────────────────────────────────────

#[test]
fn every_translated_line_count_grows_or_holds() {
    let sources = [
        "var x = 1;\n",
        "let [a,\n  b] = xs;\nafter();\n",
        "class A {\n  m() {\n    return 1;\n  }\n}\ndone();\n",
        "var f = (a = 1,\n  ...r) => a;\nnext();\n",
        "var t = `x${a}\ny`;\nlast();\n",
    ];
    for source in sources {
        let out = translate(source, &Options::default()).unwrap();
        let count = |s: &str| s.matches('\n').count();
        assert!(
            count(&out) >= count(source),
            "lost lines translating {source:?}: {out:?}"
        );
    }
}

#[test]
fn following_statements_keep_their_line_numbers() {
    let source = "class A {\n  m(x = 1) {\n    return x;\n  }\n}\nvar tail = 9;\n";
    let out = translate(source, &Options::default()).unwrap();
    assert_eq!(out.lines().nth(5), Some("var tail = 9;"));
}

// ── The concrete end-to-end scenarios ──────────────────────────────────

#[test]
fn destructuring_declaration_scenario() {
    let out = translate("var [a, b = 1, ...r] = list;", &Options::default()).unwrap();
    assert_eq!(
        out,
        "var __$0 = list, a = __$0[0], __$1 = __$0[1], b = __$1 === void 0 ? 1 : __$1, r = _runtime.rest(__$0, 2);"
    );
}

#[test]
fn arrow_rest_scenario() {
    let out = translate("let f = (x, ...xs) => xs.length + x;", &Options::default()).unwrap();
    assert!(out.contains("var xs = _runtime.rest(arguments, 1);"));
    assert!(!out.contains("...xs"));
}

#[test]
fn class_scenario() {
    let out = translate(
        "class A extends B { m() { super.m(); } }",
        &Options::default(),
    )
    .unwrap();
    assert_eq!(
        out,
        "var A = _runtime.class(B, function(__super) { return { constructor: function A() { var c = __super.constructor; if (c) return c.apply(this, arguments); }, m: function() { __super.m.call(this); } }; });"
    );
}

#[test]
fn for_of_in_generator_scenario() {
    let out = translate(
        "function* g(it) { for (let x of it) yield x; }",
        &Options::default(),
    )
    .unwrap();
    assert!(out.contains(
        "var __$0 = _runtime.iterator(it); for (var x; __$1 = __$0.next(), x = __$1.value, !__$1.done;) yield x;"
    ));
}

#[test]
fn template_scenario() {
    let out = translate("`Hello ${name}!`;", &Options::default()).unwrap();
    assert_eq!(out, "\"Hello \" + (name) + \"!\";");
    insta::assert_snapshot!(out, @r#""Hello " + (name) + "!";"#);
}

#[test]
fn import_export_scenario() {
    let out = translate(
        "import {a as b} from \"p\";\nexport {b as c};\n",
        &module_options(),
    )
    .unwrap();
    assert_eq!(out.matches("require(\"p\")").count(), 1);
    assert!(out.contains("exports.c = b;"));
}

// ── Universal properties ───────────────────────────────────────────────

#[test]
fn reserved_word_exports_use_bracket_indexing() {
    let out = translate(
        "var a = 1;\nexport {a as default, a as class, a as plain};\n",
        &module_options(),
    )
    .unwrap();
    assert!(out.contains("exports[\"default\"] = a;"));
    assert!(out.contains("exports[\"class\"] = a;"));
    assert!(out.contains("exports.plain = a;"));
}

#[test]
fn import_count_matches_distinct_urls() {
    let out = translate(
        "import {a} from \"p\";\nimport {b} from \"q\";\nimport {c} from \"p\";\n",
        &module_options(),
    )
    .unwrap();
    assert_eq!(out.matches("require(").count(), 2);
    assert!(out.contains("_M0"));
    assert!(out.contains("_M1"));
    assert!(!out.contains("_M2"));
}

#[test]
fn temporaries_never_collide_with_user_identifiers() {
    let out = translate("var __$0 = a;\nvar [x] = l;\no.m(...args);\n", &Options::default())
        .unwrap();
    // The user binding survives; synthesized names start above it.
    assert!(out.contains("var __$0 = a;"));
    assert_eq!(out.matches("var __$0 = a;").count(), 1);
    assert!(out.contains("__$1"));
}

#[test]
fn strict_mode_is_inherited_by_module_children() {
    // Octal literals are rejected anywhere inside a module.
    assert!(translate("var x = 010;\n", &module_options()).is_err());
    assert!(translate(
        "function f() { return 010; }\n",
        &module_options()
    )
    .is_err());
    // The same code is fine as a sloppy script.
    assert!(translate("var x = 010;\n", &Options::default()).is_ok());
}

// ── Options plumbing ───────────────────────────────────────────────────

#[test]
fn runtime_and_polyfill_sources_are_prepended_in_order() {
    let options = Options {
        runtime: Some("/*runtime*/".to_string()),
        polyfill: Some("/*polyfill*/".to_string()),
        ..Default::default()
    };
    let out = translate("var x = 1;", &options).unwrap();
    let polyfill_at = out.find("/*polyfill*/").unwrap();
    let runtime_at = out.find("/*runtime*/").unwrap();
    let body_at = out.find("var x = 1;").unwrap();
    assert!(polyfill_at < runtime_at && runtime_at < body_at);
}

#[test]
fn wrap_emits_dependency_list_and_global_name() {
    let options = Options {
        module: true,
        wrap: true,
        global: Some("myapp".to_string()),
        ..Default::default()
    };
    let out = translate("import {a} from \"p\";\nimport {b} from \"q\";\n", &options).unwrap();
    assert!(out.contains("[\"p\", \"q\"]"));
    assert!(out.contains("\"myapp\""));
    assert!(out.contains("typeof exports"));
}

#[test]
fn function_context_allows_top_level_return() {
    assert!(translate("return f();", &Options::default()).is_err());
    let options = Options {
        function_context: true,
        ..Default::default()
    };
    let out = translate("return f();", &options).unwrap();
    assert!(out.starts_with("(function() {"));
}

// ── Error contract ─────────────────────────────────────────────────────

#[test]
fn errors_carry_the_full_location_payload() {
    let err = translate("var a = 1;\nvar b = ;\n", &Options::default()).unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 9);
    assert_eq!(err.line_offset, 11);
    assert_eq!(err.start_offset, 19);
    assert_eq!(err.end_offset, 20);
    assert!(err.message.contains("unexpected"));
}

#[test]
fn scanner_errors_surface_as_parse_errors() {
    let err = translate("var s = 'open;\n", &Options::default()).unwrap_err();
    assert!(err.message.contains("unterminated"));
}

#[test]
fn diagnostics_render_with_an_excerpt() {
    let source = "var x = ;";
    let err = parse(source, &ParseOptions::default()).unwrap_err();
    let rendered = dusk::diagnostics::render_diagnostic(&err, source);
    assert!(rendered.contains("unexpected token `;`"));
    assert!(rendered.contains("var x = ;"));
}

// ── A realistic program through the whole pipeline ─────────────────────

#[test]
fn a_full_module_translates_coherently() {
    let source = "\
import {EventEmitter} from \"events\";\n\
\n\
export class Watcher extends EventEmitter {\n\
    constructor(paths = []) {\n\
        super();\n\
        this.paths = paths;\n\
    }\n\
    watch(...extra) {\n\
        let all = [...this.paths, ...extra];\n\
        for (let p of all) {\n\
            this.emit(\"watch\", `path: ${p}`);\n\
        }\n\
        return all.map(p => this.normalize(p));\n\
    }\n\
}\n";
    let out = translate(source, &module_options()).unwrap();
    assert!(out.contains("var EventEmitter = _M0.EventEmitter;"));
    assert!(out.contains("_runtime.class(EventEmitter, function(__super)"));
    assert!(out.contains("__super.constructor.call(this)"));
    assert!(out.contains("if (paths === void 0) paths = [];"));
    assert!(out.contains("var extra = _runtime.rest(arguments, 0);"));
    assert!(out.contains("_runtime.spread().i(this.paths).i(extra).a"));
    assert!(out.contains("_runtime.iterator(all)"));
    assert!(out.contains("\"path: \" + (p)"));
    assert!(out.contains("var __this = this;"));
    assert!(out.contains("return __this.normalize(p);"));
    assert!(out.contains("exports.Watcher = Watcher;"));
    let line_count = |s: &str| s.matches('\n').count();
    assert!(line_count(&out) >= line_count(source));
}
