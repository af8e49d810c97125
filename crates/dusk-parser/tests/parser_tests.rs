//! Parser integration tests.
//!
//! Tree-shape assertions go through the crate's debug printer; error
//! assertions check both the message and the reported location, since the
//! location payload is part of the public error contract.

use dusk_parser::ast::{debug_tree, NodeKind};
use dusk_parser::{parse_module, parse_script, ParseResult, SyntaxError};

fn script(source: &str) -> ParseResult {
    parse_script(source).expect("source should parse")
}

fn script_err(source: &str) -> SyntaxError {
    parse_script(source).expect_err("source should fail to parse")
}

fn tree(source: &str) -> String {
    let parse = script(source);
    debug_tree(&parse.ast, parse.root)
}

/// Collect the tags of every node in the tree, for structural checks.
fn tags(parse: &ParseResult) -> Vec<&'static str> {
    let mut out = Vec::new();
    let mut stack = vec![parse.root];
    while let Some(id) = stack.pop() {
        out.push(parse.ast.kind(id).tag());
        stack.extend(parse.ast.children(id));
    }
    out
}

// ── Expressions ────────────────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
        tree("1 + 2 * 3"),
        "Script @0..9\n\
         \x20 ExpressionStatement @0..9\n\
         \x20   BinaryExpression `+` @0..9\n\
         \x20     NumberLiteral 1 @0..1\n\
         \x20     BinaryExpression `*` @4..9\n\
         \x20       NumberLiteral 2 @4..5\n\
         \x20       NumberLiteral 3 @8..9\n"
    );
}

#[test]
fn simple_statement_snapshot() {
    insta::assert_snapshot!(tree("x;"), @r"
    Script @0..2
      ExpressionStatement @0..2
        Identifier `x` @0..1
    ");
}

#[test]
fn assignment_is_right_associative() {
    let parse = script("a = b = c;");
    let all = tags(&parse);
    assert_eq!(
        all.iter().filter(|t| **t == "AssignmentExpression").count(),
        2
    );
}

#[test]
fn conditional_and_sequence() {
    let parse = script("a ? b : c, d;");
    let all = tags(&parse);
    assert!(all.contains(&"ConditionalExpression"));
    assert!(all.contains(&"SequenceExpression"));
}

#[test]
fn in_operator_excluded_in_for_init() {
    // Inside a for-head initializer `in` is not a binary operator: the
    // initializer ends at `a` and the statement is a for-in.
    let parse = script("for (var x = a in b) {}");
    assert!(tags(&parse).contains(&"ForInStatement"));
    // In ordinary expressions `in` is relational.
    let parse = script("var found = k in o;");
    assert!(tags(&parse).contains(&"BinaryExpression"));
}

#[test]
fn member_call_chain_and_tagged_template() {
    let parse = script("a.b[c](d)`e${f}`;");
    let all = tags(&parse);
    assert!(all.contains(&"MemberExpression"));
    assert!(all.contains(&"CallExpression"));
    assert!(all.contains(&"TaggedTemplateExpression"));
    assert!(all.contains(&"TemplateExpression"));
}

#[test]
fn regex_literal_in_expression_position() {
    let parse = script("var re = /ab+c/gi;");
    let all = tags(&parse);
    assert!(all.contains(&"RegularExpression"));
}

#[test]
fn division_in_operator_position() {
    let parse = script("var half = total / 2;");
    let all = tags(&parse);
    assert!(all.contains(&"BinaryExpression"));
    assert!(!all.contains(&"RegularExpression"));
}

// ── Cover grammar ──────────────────────────────────────────────────────

#[test]
fn destructuring_declarator_becomes_pattern() {
    assert_eq!(
        tree("var [a, b] = c;"),
        "Script @0..15\n\
         \x20 VariableDeclaration @0..14\n\
         \x20   VariableDeclarator @4..14\n\
         \x20     ArrayPattern @4..10\n\
         \x20       Identifier `a` @5..6\n\
         \x20       Identifier `b` @8..9\n\
         \x20     Identifier `c` @13..14\n"
    );
}

#[test]
fn object_pattern_with_defaults_and_renaming() {
    let parse = script("var {a = 1, b: c, d: [e]} = o;");
    let all = tags(&parse);
    assert!(all.contains(&"ObjectPattern"));
    assert_eq!(all.iter().filter(|t| **t == "PatternProperty").count(), 3);
    assert!(all.contains(&"ArrayPattern"));
    assert!(!all.contains(&"CoveredPatternProperty"));
}

#[test]
fn assignment_destructuring_allows_member_targets() {
    let parse = script("[a.b, c] = d;");
    let all = tags(&parse);
    assert!(all.contains(&"ArrayPattern"));
    assert!(all.contains(&"MemberExpression"));
}

#[test]
fn binding_pattern_rejects_member_targets() {
    let err = script_err("var [a.b] = c;");
    assert!(err.message.contains("destructuring"));
}

#[test]
fn array_pattern_rest_must_be_last() {
    let err = script_err("var [...r, a] = c;");
    assert!(err.message.contains("rest"));
}

#[test]
fn shorthand_default_is_only_valid_in_patterns() {
    // Valid as a pattern...
    let parse = script("var {a = 1} = o;");
    assert!(tags(&parse).contains(&"PatternProperty"));
    // ...deferred error as a plain literal.
    let err = script_err("var o = {a = 1};");
    assert!(err.message.contains("shorthand"));
}

#[test]
fn arrow_parameter_cover() {
    let parse = script("var f = (a, b = 1, ...r) => a;");
    let all = tags(&parse);
    assert!(all.contains(&"ArrowFunction"));
    assert_eq!(all.iter().filter(|t| **t == "FormalParameter").count(), 2);
    assert!(all.contains(&"RestParameter"));
}

#[test]
fn single_identifier_arrow() {
    let parse = script("var f = x => x + 1;");
    assert!(tags(&parse).contains(&"ArrowFunction"));
}

#[test]
fn paren_without_arrow_stays_expression() {
    let parse = script("var x = (a, b);");
    let all = tags(&parse);
    assert!(all.contains(&"ParenExpression"));
    assert!(all.contains(&"SequenceExpression"));
    assert!(!all.contains(&"ArrowFunction"));
}

#[test]
fn rest_in_parens_requires_arrow() {
    let err = script_err("var x = (a, ...r);");
    assert!(err.message.contains("=>"));
}

// ── Statements and validation ──────────────────────────────────────────

#[test]
fn error_carries_line_and_column() {
    let err = script_err("var x = ;");
    assert_eq!((err.line, err.column), (1, 9));

    let err = script_err("var a = 1;\nvar b = ;\n");
    assert_eq!((err.line, err.column), (2, 9));
    assert_eq!(err.line_offset, 11);
}

#[test]
fn const_requires_initializer() {
    let err = script_err("const x;");
    assert!(err.message.contains("const"));
    assert!(parse_script("const x = 1;").is_ok());
}

#[test]
fn return_outside_function_fails() {
    let err = script_err("return 1;");
    assert!(err.message.contains("return"));
    assert!(parse_script("function f() { return 1; }").is_ok());
}

#[test]
fn break_and_continue_placement() {
    assert!(parse_script("while (x) break;").is_ok());
    assert!(parse_script("while (x) continue;").is_ok());
    assert!(parse_script("switch (x) { case 1: break; }").is_ok());
    assert!(script_err("break;").message.contains("break"));
    assert!(script_err("continue;").message.contains("continue"));
    assert!(script_err("switch (x) { case 1: continue; }")
        .message
        .contains("continue"));
}

#[test]
fn labels_are_tracked() {
    assert!(parse_script("a: { break a; }").is_ok());
    assert!(parse_script("a: while (x) { continue a; }").is_ok());
    assert!(script_err("while (x) { break a; }")
        .message
        .contains("undefined label"));
    assert!(script_err("a: a: while (x) {}")
        .message
        .contains("duplicate label"));
}

#[test]
fn switch_rejects_duplicate_default() {
    let err = script_err("switch (x) { default: default: }");
    assert!(err.message.contains("default"));
}

#[test]
fn newline_terminates_restricted_productions() {
    // `return` followed by a newline takes no argument.
    let parse = parse_script("function f() { return\n1; }").unwrap();
    let all = tags(&parse);
    assert!(all.contains(&"ReturnStatement"));
    // The 1 became its own statement.
    assert!(all.contains(&"ExpressionStatement"));

    assert!(script_err("throw\nx;").message.contains("newline"));
}

#[test]
fn for_of_head_rules() {
    assert!(parse_script("for (var x of it) {}").is_ok());
    assert!(parse_script("for (let [a, b] of it) {}").is_ok());
    assert!(script_err("for (var x = 1 of it) {}")
        .message
        .contains("initializer"));
    assert!(script_err("for (var x, y of it) {}")
        .message
        .contains("one binding"));
}

#[test]
fn for_in_head_rules() {
    // Legacy: a var-with-identifier initializer is tolerated.
    assert!(parse_script("for (var x = 1 in o) {}").is_ok());
    assert!(script_err("for (let x = 1 in o) {}")
        .message
        .contains("initializer"));
}

// ── Strict mode ────────────────────────────────────────────────────────

#[test]
fn use_strict_directive_promotes() {
    assert!(parse_script("with (x) {}").is_ok());
    assert!(script_err("\"use strict\"; with (x) {}")
        .message
        .contains("with"));
    // An escape keeps the directive from matching.
    assert!(parse_script("\"use\\u0020strict\"; with (x) {}").is_ok());
}

#[test]
fn strict_rejects_octal_after_directive() {
    assert!(parse_script("var x = 010;").is_ok());
    assert!(script_err("\"use strict\"; var x = 010;")
        .message
        .contains("octal"));
}

#[test]
fn strict_delete_of_unqualified_name() {
    assert!(parse_script("delete x;").is_ok());
    assert!(script_err("\"use strict\"; delete x;")
        .message
        .contains("delete"));
    assert!(parse_script("\"use strict\"; delete x.y;").is_ok());
}

#[test]
fn strict_binding_restrictions() {
    assert!(script_err("\"use strict\"; var eval = 1;")
        .message
        .contains("eval"));
    assert!(script_err("\"use strict\"; x = (arguments = 1);")
        .message
        .contains("arguments"));
}

#[test]
fn directive_retroactively_checks_parameters() {
    assert!(parse_script("function f(a, a) {}").is_ok());
    assert!(script_err("function f(a, a) { \"use strict\"; }")
        .message
        .contains("duplicate parameter"));
    assert!(script_err("function f(eval) { \"use strict\"; }")
        .message
        .contains("eval"));
}

#[test]
fn duplicate_properties_follow_the_matrix() {
    // data+data: fine outside strict code, an error inside it.
    assert!(parse_script("var o = {a: 1, a: 2};").is_ok());
    assert!(script_err("\"use strict\"; var o = {a: 1, a: 2};")
        .message
        .contains("duplicate property"));
    // get+set pair is fine; repeating an accessor is not.
    assert!(parse_script("var o = {get a() {}, set a(v) {}};").is_ok());
    assert!(script_err("var o = {get a() {}, get a() {}};")
        .message
        .contains("getter"));
    // data + accessor conflict.
    assert!(script_err("var o = {a: 1, get a() {}};")
        .message
        .contains("accessor"));
}

#[test]
fn yield_is_contextual() {
    // Outside strict code and generators, `yield` is an identifier.
    assert!(parse_script("var yield = 1;").is_ok());
    // In strict code it is reserved.
    assert!(parse_script("\"use strict\"; var yield = 1;").is_err());
    // Inside a generator it is an expression form.
    let parse = parse_script("function* g() { yield 1; yield* it; }").unwrap();
    let all = tags(&parse);
    assert_eq!(all.iter().filter(|t| **t == "YieldExpression").count(), 2);
}

#[test]
fn await_is_contextual() {
    assert!(parse_script("var await = 1;").is_ok());
    let parse = parse_script("async function f() { await g(); }").unwrap();
    let parse_tags = tags(&parse);
    assert!(parse_tags.contains(&"UnaryExpression"));
}

// ── Functions, classes, methods ────────────────────────────────────────

#[test]
fn generator_and_async_functions() {
    let parse = script("function* g() {} async function h() {}");
    let all = tags(&parse);
    assert_eq!(
        all.iter().filter(|t| **t == "FunctionDeclaration").count(),
        2
    );
}

#[test]
fn methods_and_accessors_in_object_literals() {
    let parse = script("var o = {m() {}, get a() {}, set a(v) {}, *g() {}, async h() {}};");
    let all = tags(&parse);
    assert_eq!(all.iter().filter(|t| **t == "MethodDefinition").count(), 5);
}

#[test]
fn computed_property_names() {
    let parse = script("var o = {[k]: 1, [m()]: 2};");
    let all = tags(&parse);
    assert_eq!(
        all.iter().filter(|t| **t == "ComputedPropertyName").count(),
        2
    );
}

#[test]
fn class_declarations_and_elements() {
    let parse = script("class A extends B { constructor() {} m() {} static s() {} get g() {} }");
    let all = tags(&parse);
    assert!(all.contains(&"ClassDeclaration"));
    assert!(all.contains(&"ClassBody"));
    assert_eq!(all.iter().filter(|t| **t == "ClassElement").count(), 4);
}

#[test]
fn class_duplicate_elements() {
    assert!(script_err("class A { m() {} m() {} }")
        .message
        .contains("duplicate"));
    // Instance and static names are independent sets.
    assert!(parse_script("class A { m() {} static m() {} }").is_ok());
    assert!(script_err("class A { constructor() {} constructor() {} }")
        .message
        .contains("constructor"));
}

#[test]
fn super_is_method_only() {
    assert!(parse_script("class A { m() { super.x(); } }").is_ok());
    assert!(script_err("function f() { return super.x; }")
        .message
        .contains("super"));
}

#[test]
fn class_bodies_are_strict() {
    assert!(script_err("class A { m() { var x = 010; } }")
        .message
        .contains("octal"));
}

// ── Comprehensions ─────────────────────────────────────────────────────

#[test]
fn array_and_generator_comprehensions() {
    let parse = script("var a = [for (x of xs) if (x) x * 2];");
    let all = tags(&parse);
    assert!(all.contains(&"ArrayComprehension"));
    assert!(all.contains(&"ComprehensionFor"));
    assert!(all.contains(&"ComprehensionIf"));

    let parse = script("var g = (for (x of xs) x);");
    assert!(tags(&parse).contains(&"GeneratorComprehension"));
}

// ── Modules ────────────────────────────────────────────────────────────

fn module(source: &str) -> ParseResult {
    parse_module(source).expect("module should parse")
}

#[test]
fn module_forms_parse() {
    let parse = module(
        "import {a, b as c} from \"p\";\n\
         import d from \"q\";\n\
         module e from \"r\";\n\
         module f { export var x = 1; }\n\
         module g = f.h;\n\
         export {a, c as d2};\n\
         export * from \"s\";\n\
         export var y = 2;\n",
    );
    let all = tags(&parse);
    assert!(all.contains(&"ImportDeclaration"));
    assert_eq!(all.iter().filter(|t| **t == "ImportSpecifier").count(), 2);
    assert!(all.contains(&"ImportDefaultDeclaration"));
    assert!(all.contains(&"ModuleImport"));
    assert!(all.contains(&"ModuleDeclaration"));
    assert!(all.contains(&"ModuleAlias"));
    assert!(all.contains(&"ModulePath"));
    assert_eq!(
        all.iter().filter(|t| **t == "ExportDeclaration").count(),
        4
    );
    assert!(all.contains(&"ExportSpecifierSet"));
}

#[test]
fn modules_are_strict_from_the_start() {
    assert!(parse_module("var x = 010;").is_err());
    assert!(parse_module("with (x) {}").is_err());
}

#[test]
fn imports_are_module_only() {
    assert!(parse_script("import {a} from \"p\";").is_err());
}

#[test]
fn reserved_import_names_need_renaming() {
    assert!(parse_module("import {default as d} from \"p\";").is_ok());
    assert!(parse_module("import {default} from \"p\";").is_err());
}

#[test]
fn module_registration_by_name() {
    let parse = module("module \"app/main\" { var x = 1; }");
    assert!(tags(&parse).contains(&"ModuleRegistration"));
}

// ── Span invariants ────────────────────────────────────────────────────

#[test]
fn root_covers_whole_input_and_children_nest() {
    let source = "var x = 1;\nfunction f(a) { return a; }\n";
    let parse = script(source);
    let root_span = parse.ast.span(parse.root);
    assert_eq!(root_span.start, 0);
    assert_eq!(root_span.end as usize, source.len());

    let mut stack = vec![parse.root];
    while let Some(id) = stack.pop() {
        let span = parse.ast.span(id);
        let mut last_start = span.start;
        for child in parse.ast.children(id) {
            let child_span = parse.ast.span(child);
            assert!(child_span.start >= span.start, "child starts inside parent");
            assert!(child_span.end <= span.end, "child ends inside parent");
            assert!(child_span.start >= last_start, "siblings are ordered");
            last_start = child_span.start;
            stack.push(child);
        }
    }
}

#[test]
fn identifier_contexts_are_marked() {
    let parse = script("var a = b; a = c;");
    let mut declaration = 0;
    let mut variable = 0;
    let mut stack = vec![parse.root];
    while let Some(id) = stack.pop() {
        if let NodeKind::Identifier { context, .. } = parse.ast.kind(id) {
            match context {
                dusk_parser::ast::IdentContext::Declaration => declaration += 1,
                dusk_parser::ast::IdentContext::Variable => variable += 1,
                dusk_parser::ast::IdentContext::None => {}
            }
        }
        stack.extend(parse.ast.children(id));
    }
    assert_eq!(declaration, 1);
    assert_eq!(variable, 1);
}
