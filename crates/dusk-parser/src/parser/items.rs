//! Functions, classes, and module-level declarations.
//!
//! Modules, imports, and exports are recognized only at module top level
//! (and inside nested module bodies). `module` itself is contextual: it
//! introduces a declaration only when an identifier or string follows on
//! the same line.

use dusk_common::span::Span;
use dusk_common::token::TokenKind as T;
use dusk_lexer::ScanContext as Ctx;

use crate::ast::{FunctionKind, MethodKind, NodeId, NodeKind};
use crate::validate::{DuplicateMap, DuplicateOutcome, PropKind};

use super::{expressions, patterns, statements, PResult, Parser};

// ── Functions ──────────────────────────────────────────────────────────

pub(crate) fn parse_function_declaration(p: &mut Parser, is_async: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    if is_async {
        p.next(Ctx::Default)?; // `async`
    }
    p.expect(T::Function, Ctx::Default)?;
    let is_generator = p.eat(T::Star, Ctx::Default)?;
    let kind = function_kind(is_generator, is_async);
    let name = patterns::parse_binding_ident(p)?;
    let (params, body) = parse_function_rest(p, is_generator, is_async, false, start)?;
    Ok(p.ast.push(
        NodeKind::FunctionDeclaration {
            kind,
            name,
            params,
            body,
        },
        p.span_from(start),
    ))
}

pub(crate) fn parse_function_expression(p: &mut Parser, is_async: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    if is_async {
        p.next(Ctx::Default)?; // `async`
    }
    p.expect(T::Function, Ctx::Default)?;
    let is_generator = p.eat(T::Star, Ctx::Default)?;
    let kind = function_kind(is_generator, is_async);
    let name = if p.peek_kind(Ctx::Default)? == T::Ident {
        Some(patterns::parse_binding_ident(p)?)
    } else {
        None
    };
    let (params, body) = parse_function_rest(p, is_generator, is_async, false, start)?;
    Ok(p.ast.push(
        NodeKind::FunctionExpression {
            kind,
            name,
            params,
            body,
        },
        p.span_from(start),
    ))
}

fn function_kind(is_generator: bool, is_async: bool) -> FunctionKind {
    if is_async {
        FunctionKind::Async
    } else if is_generator {
        FunctionKind::Generator
    } else {
        FunctionKind::Normal
    }
}

/// Parameters and body, inside a fresh function context frame. When the
/// body's directive prologue turns the function strict, the parameter list
/// is re-validated under the strict rules.
fn parse_function_rest(
    p: &mut Parser,
    is_generator: bool,
    is_async: bool,
    is_method: bool,
    start: u32,
) -> PResult<(Vec<NodeId>, NodeId)> {
    p.push_function_context(is_generator, is_async, is_method);
    let params = match parse_params(p) {
        Ok(params) => params,
        Err(e) => {
            p.pop_context()?;
            return Err(e);
        }
    };
    let body = match statements::parse_function_body_block(p) {
        Ok(body) => body,
        Err(e) => {
            p.pop_context()?;
            return Err(e);
        }
    };
    if p.strict() {
        let names = patterns::collect_param_names(p, &params);
        if let Err(msg) = p.validator.check_parameters(&names) {
            p.pop_context()?;
            return p.fail(msg, p.span_from(start));
        }
    }
    p.pop_context()?;
    Ok((params, body))
}

pub(crate) fn parse_params(p: &mut Parser) -> PResult<Vec<NodeId>> {
    p.expect(T::LParen, Ctx::Default)?;
    let mut params = Vec::new();
    loop {
        match p.peek_kind(Ctx::Default)? {
            T::RParen => break,
            T::Ellipsis => {
                params.push(expressions::parse_rest_parameter(p)?);
                break;
            }
            _ => {
                let start = p.mark(Ctx::Default)?;
                let pattern = patterns::parse_binding_target(p)?;
                let init = if p.eat(T::Eq, Ctx::Div)? {
                    Some(expressions::parse_assignment(p, false)?)
                } else {
                    None
                };
                params.push(p.ast.push(
                    NodeKind::FormalParameter { pattern, init },
                    p.span_from(start),
                ));
                if !p.eat(T::Comma, Ctx::Div)? {
                    break;
                }
            }
        }
    }
    p.expect(T::RParen, Ctx::Div)?;
    Ok(params)
}

/// A method definition after its name: parameters and body inside a method
/// frame. Accessor arity is pinned here: getters take no parameters and
/// setters exactly one.
pub(crate) fn parse_method(
    p: &mut Parser,
    kind: MethodKind,
    name: NodeId,
    start: u32,
) -> PResult<NodeId> {
    let (params, body) = parse_function_rest(
        p,
        kind == MethodKind::Generator,
        kind == MethodKind::Async,
        true,
        start,
    )?;
    match kind {
        MethodKind::Get if !params.is_empty() => {
            return p.fail("getter must not take parameters", p.span_from(start));
        }
        MethodKind::Set if params.len() != 1 => {
            return p.fail("setter must take exactly one parameter", p.span_from(start));
        }
        MethodKind::Set
            if matches!(p.ast.kind(params[0]), NodeKind::RestParameter { .. }) =>
        {
            return p.fail("setter parameter must not be a rest parameter", p.span_from(start));
        }
        _ => {}
    }
    Ok(p.ast.push(
        NodeKind::MethodDefinition {
            kind,
            name,
            params,
            body,
        },
        p.span_from(start),
    ))
}

// ── Classes ────────────────────────────────────────────────────────────

pub(crate) fn parse_class_declaration(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Class, Ctx::Default)?;
    let name = patterns::parse_binding_ident(p)?;
    let (base, body) = parse_class_tail(p)?;
    Ok(p.ast.push(
        NodeKind::ClassDeclaration { name, base, body },
        p.span_from(start),
    ))
}

pub(crate) fn parse_class_expression(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Class, Ctx::Default)?;
    let name = if p.peek_kind(Ctx::Default)? == T::Ident {
        Some(patterns::parse_binding_ident(p)?)
    } else {
        None
    };
    let (base, body) = parse_class_tail(p)?;
    Ok(p.ast.push(
        NodeKind::ClassExpression { name, base, body },
        p.span_from(start),
    ))
}

/// Heritage clause and class body. The whole region is strict.
fn parse_class_tail(p: &mut Parser) -> PResult<(Option<NodeId>, NodeId)> {
    p.push_strict_context();
    let result = parse_class_tail_inner(p);
    p.pop_context()?;
    result
}

fn parse_class_tail_inner(p: &mut Parser) -> PResult<(Option<NodeId>, NodeId)> {
    let base = if p.eat(T::Extends, Ctx::Default)? {
        Some(expressions::parse_lhs(p, true)?)
    } else {
        None
    };

    let body_start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    let mut elements = Vec::new();
    let mut instance_map = DuplicateMap::new();
    let mut static_map = DuplicateMap::new();
    let mut seen_constructor = false;
    loop {
        if p.peek_kind(Ctx::Name)? == T::RBrace {
            break;
        }
        if p.eat(T::Semicolon, Ctx::Name)? {
            continue;
        }
        let element = parse_class_element(
            p,
            &mut instance_map,
            &mut static_map,
            &mut seen_constructor,
        )?;
        elements.push(element);
    }
    p.expect(T::RBrace, Ctx::Div)?;
    let body = p.ast.push(
        NodeKind::ClassBody { elements },
        Span::new(body_start, p.end_offset),
    );
    Ok((base, body))
}

fn parse_class_element(
    p: &mut Parser,
    instance_map: &mut DuplicateMap,
    static_map: &mut DuplicateMap,
    seen_constructor: &mut bool,
) -> PResult<NodeId> {
    let start = p.mark(Ctx::Name)?;

    // `static` prefix, unless it names a method itself: `static() {}`.
    let mut is_static = false;
    {
        let t = p.peek(Ctx::Name)?.clone();
        if t.kind == T::Ident && t.value == "static" {
            let next = p.peek1(Ctx::Name)?;
            if next.kind != T::LParen {
                p.next(Ctx::Name)?;
                is_static = true;
            }
        }
    }

    let mut kind = MethodKind::Normal;
    if p.eat(T::Star, Ctx::Name)? {
        kind = MethodKind::Generator;
    } else {
        let t = p.peek(Ctx::Name)?.clone();
        if t.kind == T::Ident && matches!(t.value.as_str(), "get" | "set" | "async") {
            let next = p.peek1(Ctx::Name)?;
            if matches!(next.kind, T::Ident | T::String | T::Number)
                && !(t.value == "async" && next.newline_before)
            {
                p.next(Ctx::Name)?;
                kind = match t.value.as_str() {
                    "get" => MethodKind::Get,
                    "set" => MethodKind::Set,
                    _ => MethodKind::Async,
                };
            }
        }
    }

    let (name, key, computed) = expressions::parse_property_name(p)?;
    if computed {
        return p.fail(
            "computed property names are not supported in class bodies",
            p.ast.span(name),
        );
    }

    // The constructor is ordinary only: no accessor, generator, or async
    // flavor, no static duplicate semantics, and it appears at most once.
    if !is_static && key == "constructor" {
        if kind != MethodKind::Normal {
            return p.fail(
                "constructor must be an ordinary method",
                p.span_from(start),
            );
        }
        if *seen_constructor {
            return p.fail("duplicate constructor definition", p.span_from(start));
        }
        *seen_constructor = true;
    } else {
        let map = if is_static { static_map } else { instance_map };
        let prop_kind = match kind {
            MethodKind::Get => PropKind::Get,
            MethodKind::Set => PropKind::Set,
            _ => PropKind::Data,
        };
        match map.add(&key, prop_kind) {
            // Class bodies are always strict, so the strict-only data/data
            // case is an immediate error.
            Ok(DuplicateOutcome::Ok) => {}
            Ok(DuplicateOutcome::StrictOnly) => {
                return p.fail(
                    format!("duplicate class element `{key}`"),
                    p.span_from(start),
                );
            }
            Err(msg) => return p.fail(msg, p.span_from(start)),
        }
    }

    let method = parse_method(p, kind, name, start)?;
    Ok(p.ast.push(
        NodeKind::ClassElement { is_static, method },
        p.span_from(start),
    ))
}

// ── Modules, imports, exports ──────────────────────────────────────────

pub(crate) fn parse_module_items_to_eof(p: &mut Parser) -> PResult<Vec<NodeId>> {
    let mut statements = Vec::new();
    while p.peek_kind(Ctx::Default)? != T::Eof {
        statements.push(parse_module_item(p)?);
    }
    Ok(statements)
}

pub(crate) fn parse_module_item(p: &mut Parser) -> PResult<NodeId> {
    match p.peek_kind(Ctx::Default)? {
        T::Import => parse_import(p),
        T::Export => parse_export(p),
        T::Ident if at_module_declaration(p)? => parse_module_declaration(p),
        _ => statements::parse_statement(p),
    }
}

/// `module` introduces a declaration when an identifier or string follows
/// on the same line; otherwise it is an ordinary identifier.
fn at_module_declaration(p: &mut Parser) -> PResult<bool> {
    let t = p.peek(Ctx::Default)?;
    if t.value != "module" {
        return Ok(false);
    }
    let next = p.peek1(Ctx::Default)?;
    Ok(matches!(next.kind, T::Ident | T::String) && !next.newline_before)
}

fn parse_string_literal(p: &mut Parser) -> PResult<NodeId> {
    let t = p.expect(T::String, Ctx::Default)?;
    Ok(p
        .ast
        .push(NodeKind::StringLiteral { value: t.value }, t.span))
}

/// The `from "url"` clause; `from` is contextual.
fn parse_from_clause(p: &mut Parser) -> PResult<NodeId> {
    let t = p.peek(Ctx::Default)?.clone();
    if !(t.kind == T::Ident && t.value == "from") {
        return p.unexpected(Ctx::Default);
    }
    p.next(Ctx::Default)?;
    parse_string_literal(p)
}

fn parse_import(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Import, Ctx::Default)?;
    match p.peek_kind(Ctx::Default)? {
        T::LBrace => {
            p.next(Ctx::Default)?;
            let mut specifiers = Vec::new();
            loop {
                if p.peek_kind(Ctx::Name)? == T::RBrace {
                    break;
                }
                specifiers.push(parse_import_specifier(p)?);
                if !p.eat(T::Comma, Ctx::Name)? {
                    break;
                }
            }
            p.expect(T::RBrace, Ctx::Div)?;
            let from = parse_from_clause(p)?;
            p.consume_semicolon()?;
            Ok(p.ast.push(
                NodeKind::ImportDeclaration { specifiers, from },
                p.span_from(start),
            ))
        }
        T::Ident => {
            let name = patterns::parse_binding_ident(p)?;
            let from = parse_from_clause(p)?;
            p.consume_semicolon()?;
            Ok(p.ast.push(
                NodeKind::ImportDefaultDeclaration { name, from },
                p.span_from(start),
            ))
        }
        _ => p.unexpected(Ctx::Default),
    }
}

/// `name` or `name as local`. Without `as`, the imported name doubles as
/// the local binding and must be a legal identifier.
fn parse_import_specifier(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Name)?;
    let imported = expressions::parse_ident_name(p)?;
    let local = {
        let t = p.peek(Ctx::Name)?.clone();
        if t.kind == T::Ident && t.value == "as" {
            p.next(Ctx::Name)?;
            Some(patterns::parse_binding_ident(p)?)
        } else {
            None
        }
    };
    if local.is_none() {
        if let NodeKind::Identifier { name, .. } = p.ast.kind(imported) {
            let name = name.clone();
            if dusk_common::token::keyword_from_str(&name).is_some() {
                return p.fail(
                    format!("`{name}` must be renamed with `as`"),
                    p.ast.span(imported),
                );
            }
        }
    }
    Ok(p.ast.push(
        NodeKind::ImportSpecifier { imported, local },
        p.span_from(start),
    ))
}

fn parse_export(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Export, Ctx::Default)?;
    let binding = match p.peek_kind(Ctx::Default)? {
        T::LBrace => parse_export_specifier_set(p)?,
        T::Star => {
            let set_start = p.mark(Ctx::Default)?;
            p.next(Ctx::Default)?;
            let from = parse_from_clause(p)?;
            p.consume_semicolon()?;
            p.ast.push(
                NodeKind::ExportSpecifierSet {
                    specifiers: Vec::new(),
                    star: true,
                    from: Some(from),
                },
                p.span_from(set_start),
            )
        }
        T::Var => {
            let d = statements::parse_variable_declaration(p, crate::ast::DeclKind::Var, false)?;
            statements::check_declaration_inits(p, d)?;
            p.consume_semicolon()?;
            d
        }
        T::Const => {
            let d = statements::parse_variable_declaration(p, crate::ast::DeclKind::Const, false)?;
            statements::check_declaration_inits(p, d)?;
            p.consume_semicolon()?;
            d
        }
        T::Let => {
            let d = statements::parse_variable_declaration(p, crate::ast::DeclKind::Let, false)?;
            statements::check_declaration_inits(p, d)?;
            p.consume_semicolon()?;
            d
        }
        T::Function => parse_function_declaration(p, false)?,
        T::Class => parse_class_declaration(p)?,
        T::Ident => {
            let t = p.peek(Ctx::Default)?.clone();
            if t.value == "let" {
                let d =
                    statements::parse_variable_declaration(p, crate::ast::DeclKind::Let, false)?;
                statements::check_declaration_inits(p, d)?;
                p.consume_semicolon()?;
                d
            } else if t.value == "async" && p.peek1_kind(Ctx::Default)? == T::Function {
                parse_function_declaration(p, true)?
            } else if at_module_declaration(p)? {
                parse_module_declaration(p)?
            } else {
                return p.unexpected(Ctx::Default);
            }
        }
        _ => return p.unexpected(Ctx::Default),
    };
    Ok(p.ast.push(
        NodeKind::ExportDeclaration { binding },
        p.span_from(start),
    ))
}

fn parse_export_specifier_set(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    let mut specifiers = Vec::new();
    loop {
        if p.peek_kind(Ctx::Name)? == T::RBrace {
            break;
        }
        let spec_start = p.mark(Ctx::Name)?;
        let local = expressions::parse_ident_name(p)?;
        let exported = {
            let t = p.peek(Ctx::Name)?.clone();
            if t.kind == T::Ident && t.value == "as" {
                p.next(Ctx::Name)?;
                Some(expressions::parse_ident_name(p)?)
            } else {
                None
            }
        };
        specifiers.push(p.ast.push(
            NodeKind::ExportSpecifier { local, exported },
            p.span_from(spec_start),
        ));
        if !p.eat(T::Comma, Ctx::Name)? {
            break;
        }
    }
    p.expect(T::RBrace, Ctx::Div)?;
    let from = {
        let t = p.peek(Ctx::Default)?.clone();
        if t.kind == T::Ident && t.value == "from" {
            p.next(Ctx::Default)?;
            Some(parse_string_literal(p)?)
        } else {
            None
        }
    };
    p.consume_semicolon()?;
    Ok(p.ast.push(
        NodeKind::ExportSpecifierSet {
            specifiers,
            star: false,
            from,
        },
        p.span_from(start),
    ))
}

fn parse_module_declaration(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.next(Ctx::Default)?; // `module`

    if p.peek_kind(Ctx::Default)? == T::String {
        let name = parse_string_literal(p)?;
        let body = parse_module_body(p)?;
        return Ok(p.ast.push(
            NodeKind::ModuleRegistration { name, body },
            p.span_from(start),
        ));
    }

    let name = patterns::parse_binding_ident(p)?;
    match p.peek_kind(Ctx::Default)? {
        T::LBrace => {
            let body = parse_module_body(p)?;
            Ok(p.ast.push(
                NodeKind::ModuleDeclaration { name, body },
                p.span_from(start),
            ))
        }
        T::Eq => {
            p.next(Ctx::Default)?;
            let path = parse_module_path(p)?;
            p.consume_semicolon()?;
            Ok(p.ast.push(
                NodeKind::ModuleAlias { name, path },
                p.span_from(start),
            ))
        }
        T::Ident if p.peek(Ctx::Default)?.value == "from" => {
            let from = parse_from_clause(p)?;
            p.consume_semicolon()?;
            Ok(p.ast.push(
                NodeKind::ModuleImport { name, from },
                p.span_from(start),
            ))
        }
        _ => p.unexpected(Ctx::Default),
    }
}

/// A braced module body: module items inside a fresh strict frame.
fn parse_module_body(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    p.push_strict_context();
    let mut statements = Vec::new();
    let result = loop {
        match p.peek_kind(Ctx::Default) {
            Err(e) => break Err(e),
            Ok(T::RBrace) | Ok(T::Eof) => break Ok(()),
            Ok(_) => match parse_module_item(p) {
                Ok(item) => statements.push(item),
                Err(e) => break Err(e),
            },
        }
    };
    p.pop_context()?;
    result?;
    p.expect(T::RBrace, Ctx::Default)?;
    Ok(p.ast.push(
        NodeKind::ModuleBody { statements },
        p.span_from(start),
    ))
}

fn parse_module_path(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let mut elements = vec![expressions::parse_ident_name(p)?];
    while p.eat(T::Dot, Ctx::Div)? {
        elements.push(expressions::parse_ident_name(p)?);
    }
    Ok(p.ast.push(
        NodeKind::ModulePath { elements },
        p.span_from(start),
    ))
}
