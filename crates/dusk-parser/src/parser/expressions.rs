//! Expression parser.
//!
//! Binary operators use a precedence-climbing loop over a fixed table;
//! assignment is right-associative and accepts cover-grammar left-hand
//! sides that are reinterpreted as patterns. Arrow parameters are the other
//! cover: `(a, b)` parses as a parenthesized expression and becomes a
//! parameter list only when `=>` follows.
//!
//! The parser requests `Div` context wherever the grammar permits division
//! and `Default` context wherever a `/` would start a regular expression.

use dusk_common::token::{keyword_from_str, TokenKind as T};
use dusk_lexer::ScanContext as Ctx;

use crate::ast::{IdentContext, MethodKind, NodeId, NodeKind};
use crate::validate::{DuplicateMap, DuplicateOutcome, PropKind};

use super::{items, patterns, statements, PResult, Parser};

/// Precedence of a binary operator token, per the fixed table. `in` is
/// excluded while a `no_in` region (for-statement initializer) is active.
fn binary_prec(kind: T, no_in: bool) -> Option<u8> {
    Some(match kind {
        T::BarBar => 1,
        T::AmpAmp => 2,
        T::Bar => 3,
        T::Caret => 4,
        T::Amp => 5,
        T::EqEq | T::NotEq | T::EqEqEq | T::NotEqEq => 6,
        T::Lt | T::Gt | T::LtEq | T::GtEq | T::Instanceof => 7,
        T::In if !no_in => 7,
        T::Shl | T::Shr | T::UShr => 8,
        T::Plus | T::Minus => 9,
        T::Star | T::Slash | T::Percent => 10,
        _ => return None,
    })
}

/// Comma-sequence level.
pub(crate) fn parse_expression(p: &mut Parser, no_in: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let first = parse_assignment(p, no_in)?;
    if p.peek_kind(Ctx::Div)? != T::Comma {
        return Ok(first);
    }
    let mut expressions = vec![first];
    while p.eat(T::Comma, Ctx::Div)? {
        expressions.push(parse_assignment(p, no_in)?);
    }
    Ok(p.ast.push(
        NodeKind::SequenceExpression { expressions },
        p.span_from(start),
    ))
}

/// Assignment level: yield, arrows, and the assignment operators.
pub(crate) fn parse_assignment(p: &mut Parser, no_in: bool) -> PResult<NodeId> {
    if p.top_frame().is_generator {
        let t = p.peek(Ctx::Default)?;
        if t.kind == T::Yield || (t.kind == T::Ident && t.value == "yield") {
            return parse_yield(p);
        }
    }

    let start = p.mark(Ctx::Default)?;
    let left = parse_conditional(p, no_in)?;

    // Arrow cover: `ident =>` or `(params) =>`.
    let t = p.peek(Ctx::Div)?;
    if t.kind == T::Arrow && !t.newline_before {
        return finish_arrow(p, start, left, false);
    }

    // A cover that only a parameter list can justify must see `=>` here.
    if let NodeKind::ParenExpression { expression, rest } = p.ast.kind(left) {
        if expression.is_none() || rest.is_some() {
            return p.fail("expected `=>` after parameter list", p.ast.span(left));
        }
    }

    let t = p.peek(Ctx::Div)?;
    if t.kind.is_assign_op() {
        let op_tok = p.next(Ctx::Div)?;
        let op = p.raw(&op_tok).to_string();
        let target = if op == "=" {
            patterns::to_assignment_target(p, left)?
        } else {
            check_simple_target(p, left)?
        };
        let value = parse_assignment(p, no_in)?;
        return Ok(p.ast.push(
            NodeKind::AssignmentExpression { op, target, value },
            p.span_from(start),
        ));
    }

    Ok(left)
}

/// `yield`, `yield expr`, `yield * expr` inside a generator.
fn parse_yield(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.next(Ctx::Default)?; // yield
    let delegate = p.eat(T::Star, Ctx::Default)?;
    let argument = {
        let t = p.peek(Ctx::Default)?;
        let stops = matches!(
            t.kind,
            T::RParen | T::RBracket | T::RBrace | T::Comma | T::Semicolon | T::Colon | T::Eof
        );
        if t.newline_before || (stops && !delegate) {
            None
        } else {
            Some(parse_assignment(p, false)?)
        }
    };
    Ok(p.ast.push(
        NodeKind::YieldExpression { delegate, argument },
        p.span_from(start),
    ))
}

fn parse_conditional(p: &mut Parser, no_in: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let test = parse_binary(p, 1, no_in)?;
    if !p.eat(T::Question, Ctx::Div)? {
        return Ok(test);
    }
    let consequent = parse_assignment(p, false)?;
    p.expect(T::Colon, Ctx::Default)?;
    let alternate = parse_assignment(p, no_in)?;
    Ok(p.ast.push(
        NodeKind::ConditionalExpression {
            test,
            consequent,
            alternate,
        },
        p.span_from(start),
    ))
}

fn parse_binary(p: &mut Parser, min_prec: u8, no_in: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let mut left = parse_unary(p)?;
    loop {
        let kind = p.peek_kind(Ctx::Div)?;
        let Some(prec) = binary_prec(kind, no_in) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        let op_tok = p.next(Ctx::Div)?;
        let op = p.raw(&op_tok).to_string();
        let right = parse_binary(p, prec + 1, no_in)?;
        left = p.ast.push(
            NodeKind::BinaryExpression { op, left, right },
            p.span_from(start),
        );
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let t = p.peek(Ctx::Default)?.clone();
    match t.kind {
        T::Delete | T::Void | T::Typeof | T::Plus | T::Minus | T::Tilde | T::Bang => {
            let op_tok = p.next(Ctx::Default)?;
            let op = p.raw(&op_tok).to_string();
            let expression = parse_unary(p)?;
            if op_tok.kind == T::Delete
                && p.strict()
                && matches!(p.ast.kind(expression), NodeKind::Identifier { .. })
            {
                return p.fail(
                    "cannot delete an unqualified name in strict mode",
                    p.span_from(start),
                );
            }
            Ok(p.ast.push(
                NodeKind::UnaryExpression { op, expression },
                p.span_from(start),
            ))
        }
        T::PlusPlus | T::MinusMinus => {
            let op_tok = p.next(Ctx::Default)?;
            let op = p.raw(&op_tok).to_string();
            let expression = parse_unary(p)?;
            let expression = check_simple_target(p, expression)?;
            Ok(p.ast.push(
                NodeKind::UpdateExpression {
                    op,
                    prefix: true,
                    expression,
                },
                p.span_from(start),
            ))
        }
        T::Ident if t.value == "await" && p.top_frame().is_async => {
            p.next(Ctx::Default)?;
            let expression = parse_unary(p)?;
            Ok(p.ast.push(
                NodeKind::UnaryExpression {
                    op: "await".to_string(),
                    expression,
                },
                p.span_from(start),
            ))
        }
        _ => parse_postfix(p),
    }
}

fn parse_postfix(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let expression = parse_lhs(p, true)?;
    let t = p.peek(Ctx::Div)?;
    if matches!(t.kind, T::PlusPlus | T::MinusMinus) && !t.newline_before {
        let op_tok = p.next(Ctx::Div)?;
        let op = p.raw(&op_tok).to_string();
        let expression = check_simple_target(p, expression)?;
        return Ok(p.ast.push(
            NodeKind::UpdateExpression {
                op,
                prefix: false,
                expression,
            },
            p.span_from(start),
        ));
    }
    Ok(expression)
}

/// Member/call/tagged-template chain over a primary (or `new`) expression.
pub(crate) fn parse_lhs(p: &mut Parser, allow_call: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let mut expr = if p.peek_kind(Ctx::Default)? == T::New {
        parse_new(p)?
    } else {
        parse_primary(p)?
    };

    // A cover justified only as arrow parameters cannot take postfix forms.
    if let NodeKind::ParenExpression { expression, rest } = p.ast.kind(expr) {
        if expression.is_none() || rest.is_some() {
            return Ok(expr);
        }
    }

    loop {
        match p.peek_kind(Ctx::Div)? {
            T::Dot => {
                p.next(Ctx::Div)?;
                let property = parse_ident_name(p)?;
                expr = p.ast.push(
                    NodeKind::MemberExpression {
                        object: expr,
                        property,
                        computed: false,
                    },
                    p.span_from(start),
                );
            }
            T::LBracket => {
                p.next(Ctx::Div)?;
                let property = parse_expression(p, false)?;
                p.expect(T::RBracket, Ctx::Div)?;
                expr = p.ast.push(
                    NodeKind::MemberExpression {
                        object: expr,
                        property,
                        computed: true,
                    },
                    p.span_from(start),
                );
            }
            T::LParen if allow_call => {
                let arguments = parse_arguments(p)?;
                expr = p.ast.push(
                    NodeKind::CallExpression {
                        callee: expr,
                        arguments,
                    },
                    p.span_from(start),
                );
            }
            T::Template => {
                let template = parse_template_expression(p)?;
                expr = p.ast.push(
                    NodeKind::TaggedTemplateExpression {
                        tag: expr,
                        template,
                    },
                    p.span_from(start),
                );
            }
            _ => break,
        }
    }
    Ok(expr)
}

fn parse_new(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::New, Ctx::Default)?;
    let callee = parse_lhs(p, false)?;
    let arguments = if p.peek_kind(Ctx::Div)? == T::LParen {
        parse_arguments(p)?
    } else {
        Vec::new()
    };
    Ok(p.ast.push(
        NodeKind::NewExpression { callee, arguments },
        p.span_from(start),
    ))
}

/// `.name` member names and specifier names: reserved words are allowed.
pub(crate) fn parse_ident_name(p: &mut Parser) -> PResult<NodeId> {
    let t = p.peek(Ctx::Name)?.clone();
    if t.kind != T::Ident {
        return p.unexpected(Ctx::Name);
    }
    p.next(Ctx::Name)?;
    Ok(p.ast.push(
        NodeKind::Identifier {
            name: t.value,
            context: IdentContext::None,
        },
        t.span,
    ))
}

pub(crate) fn parse_arguments(p: &mut Parser) -> PResult<Vec<NodeId>> {
    p.expect(T::LParen, Ctx::Div)?;
    let mut arguments = Vec::new();
    loop {
        if p.peek_kind(Ctx::Default)? == T::RParen {
            break;
        }
        if p.peek_kind(Ctx::Default)? == T::Ellipsis {
            let start = p.mark(Ctx::Default)?;
            p.next(Ctx::Default)?;
            let expression = parse_assignment(p, false)?;
            arguments.push(p.ast.push(
                NodeKind::SpreadExpression { expression },
                p.span_from(start),
            ));
        } else {
            arguments.push(parse_assignment(p, false)?);
        }
        if !p.eat(T::Comma, Ctx::Div)? {
            break;
        }
    }
    p.expect(T::RParen, Ctx::Div)?;
    Ok(arguments)
}

// ── Primary expressions ────────────────────────────────────────────────

pub(crate) fn parse_primary(p: &mut Parser) -> PResult<NodeId> {
    let t = p.peek(Ctx::Default)?.clone();
    match t.kind {
        T::This => {
            p.next(Ctx::Default)?;
            Ok(p.ast.push(NodeKind::ThisExpression, t.span))
        }
        T::Super => {
            if !p.top_frame().is_method {
                return p.fail("`super` is only valid inside a method", t.span);
            }
            p.next(Ctx::Default)?;
            Ok(p.ast.push(NodeKind::SuperExpression, t.span))
        }
        T::Number => {
            p.next(Ctx::Default)?;
            Ok(p
                .ast
                .push(NodeKind::NumberLiteral { value: t.number }, t.span))
        }
        T::String => {
            p.next(Ctx::Default)?;
            Ok(p
                .ast
                .push(NodeKind::StringLiteral { value: t.value }, t.span))
        }
        T::Regex => {
            p.next(Ctx::Default)?;
            Ok(p.ast.push(
                NodeKind::RegularExpression {
                    body: t.value,
                    flags: t.regex_flags.unwrap_or_default(),
                },
                t.span,
            ))
        }
        T::Null => {
            p.next(Ctx::Default)?;
            Ok(p.ast.push(NodeKind::NullLiteral, t.span))
        }
        T::True | T::False => {
            p.next(Ctx::Default)?;
            Ok(p.ast.push(
                NodeKind::BooleanLiteral {
                    value: t.kind == T::True,
                },
                t.span,
            ))
        }
        T::Template => parse_template_expression(p),
        T::LBracket => {
            if p.peek1_kind(Ctx::Default)? == T::For {
                parse_array_comprehension(p)
            } else {
                parse_array_literal(p)
            }
        }
        T::LBrace => parse_object_literal(p),
        T::LParen => {
            if p.peek1_kind(Ctx::Default)? == T::For {
                parse_generator_comprehension(p)
            } else {
                parse_paren(p)
            }
        }
        T::Function => items::parse_function_expression(p, false),
        T::Class => items::parse_class_expression(p),
        T::Ident => {
            // `async function ...` / `async x => ...`
            if t.value == "async" {
                let (next_kind, next_newline) = {
                    let next = p.peek1(Ctx::Default)?;
                    (next.kind, next.newline_before)
                };
                if next_kind == T::Function && !next_newline {
                    return items::parse_function_expression(p, true);
                }
                if next_kind == T::Ident && !next_newline {
                    let start = t.span.start;
                    p.next(Ctx::Default)?; // async
                    let ident = parse_plain_ident(p)?;
                    return finish_arrow(p, start, ident, true);
                }
            }
            parse_plain_ident(p)
        }
        _ => p.unexpected(Ctx::Default),
    }
}

fn parse_plain_ident(p: &mut Parser) -> PResult<NodeId> {
    let t = p.next(Ctx::Default)?;
    debug_assert_eq!(t.kind, T::Ident);
    Ok(p.ast.push(
        NodeKind::Identifier {
            name: t.value,
            context: IdentContext::None,
        },
        t.span,
    ))
}

/// Parenthesized expression, or the arrow-parameter cover: `()` empty and
/// a trailing `, ...rest` are consumed speculatively and only validated
/// when `=>` follows.
fn parse_paren(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;

    if p.eat(T::RParen, Ctx::Div)? {
        return Ok(p.ast.push(
            NodeKind::ParenExpression {
                expression: None,
                rest: None,
            },
            p.span_from(start),
        ));
    }

    let mut expressions = Vec::new();
    let mut rest = None;
    loop {
        if p.peek_kind(Ctx::Default)? == T::Ellipsis {
            rest = Some(parse_rest_parameter(p)?);
            break;
        }
        expressions.push(parse_assignment(p, false)?);
        if !p.eat(T::Comma, Ctx::Div)? {
            break;
        }
    }
    p.expect(T::RParen, Ctx::Div)?;

    let expression = if expressions.len() == 1 {
        Some(expressions[0])
    } else if expressions.is_empty() {
        None
    } else {
        let span = p
            .ast
            .span(expressions[0])
            .merge(p.ast.span(*expressions.last().unwrap()));
        Some(p.ast.push(NodeKind::SequenceExpression { expressions }, span))
    };

    Ok(p.ast.push(
        NodeKind::ParenExpression { expression, rest },
        p.span_from(start),
    ))
}

/// `...name` in a parameter position.
pub(crate) fn parse_rest_parameter(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Ellipsis, Ctx::Default)?;
    let t = p.peek(Ctx::Default)?.clone();
    if t.kind != T::Ident {
        return p.unexpected(Ctx::Default);
    }
    p.next(Ctx::Default)?;
    let strict = p.strict();
    if let Err(msg) = p.validator.binding_ident(&t.value, strict) {
        return p.fail(msg, t.span);
    }
    let name = p.ast.push(
        NodeKind::Identifier {
            name: t.value,
            context: IdentContext::Declaration,
        },
        t.span,
    );
    Ok(p
        .ast
        .push(NodeKind::RestParameter { name }, p.span_from(start)))
}

fn parse_array_literal(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBracket, Ctx::Default)?;
    let mut elements: Vec<Option<NodeId>> = Vec::new();
    loop {
        match p.peek_kind(Ctx::Default)? {
            T::RBracket => break,
            T::Comma => {
                p.next(Ctx::Default)?;
                elements.push(None);
            }
            T::Ellipsis => {
                let s = p.mark(Ctx::Default)?;
                p.next(Ctx::Default)?;
                let expression = parse_assignment(p, false)?;
                elements.push(Some(p.ast.push(
                    NodeKind::SpreadExpression { expression },
                    p.span_from(s),
                )));
                if !p.eat(T::Comma, Ctx::Div)? {
                    break;
                }
            }
            _ => {
                elements.push(Some(parse_assignment(p, false)?));
                if !p.eat(T::Comma, Ctx::Div)? {
                    break;
                }
            }
        }
    }
    p.expect(T::RBracket, Ctx::Div)?;
    Ok(p.ast.push(
        NodeKind::ArrayExpression { elements },
        p.span_from(start),
    ))
}

// ── Comprehensions ─────────────────────────────────────────────────────

fn parse_array_comprehension(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBracket, Ctx::Default)?;
    let qualifiers = parse_comprehension_qualifiers(p)?;
    let expression = parse_assignment(p, false)?;
    p.expect(T::RBracket, Ctx::Div)?;
    Ok(p.ast.push(
        NodeKind::ArrayComprehension {
            qualifiers,
            expression,
        },
        p.span_from(start),
    ))
}

fn parse_generator_comprehension(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;
    let qualifiers = parse_comprehension_qualifiers(p)?;
    let expression = parse_assignment(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    Ok(p.ast.push(
        NodeKind::GeneratorComprehension {
            qualifiers,
            expression,
        },
        p.span_from(start),
    ))
}

/// One or more `for (pattern of iterable)` / `if (test)` qualifiers; the
/// first must be a `for`.
fn parse_comprehension_qualifiers(p: &mut Parser) -> PResult<Vec<NodeId>> {
    let mut qualifiers = Vec::new();
    loop {
        match p.peek_kind(Ctx::Default)? {
            T::For => {
                let start = p.mark(Ctx::Default)?;
                p.next(Ctx::Default)?;
                p.expect(T::LParen, Ctx::Default)?;
                let pattern = patterns::parse_binding_target(p)?;
                let of = p.peek(Ctx::Default)?.clone();
                if !(of.kind == T::Ident && of.value == "of") {
                    return p.unexpected(Ctx::Default);
                }
                p.next(Ctx::Default)?;
                let iterable = parse_assignment(p, false)?;
                p.expect(T::RParen, Ctx::Div)?;
                qualifiers.push(p.ast.push(
                    NodeKind::ComprehensionFor { pattern, iterable },
                    p.span_from(start),
                ));
            }
            T::If if !qualifiers.is_empty() => {
                let start = p.mark(Ctx::Default)?;
                p.next(Ctx::Default)?;
                p.expect(T::LParen, Ctx::Default)?;
                let test = parse_expression(p, false)?;
                p.expect(T::RParen, Ctx::Div)?;
                qualifiers.push(p.ast.push(
                    NodeKind::ComprehensionIf { test },
                    p.span_from(start),
                ));
            }
            _ if qualifiers.is_empty() => return p.unexpected(Ctx::Default),
            _ => break,
        }
    }
    Ok(qualifiers)
}

// ── Object literals ────────────────────────────────────────────────────

pub(crate) fn parse_object_literal(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    let mut properties = Vec::new();
    let mut dup = DuplicateMap::new();
    loop {
        if p.peek_kind(Ctx::Name)? == T::RBrace {
            break;
        }
        let property = parse_property(p, &mut dup)?;
        properties.push(property);
        if !p.eat(T::Comma, Ctx::Div)? {
            break;
        }
    }
    p.expect(T::RBrace, Ctx::Div)?;
    Ok(p.ast.push(
        NodeKind::ObjectLiteral { properties },
        p.span_from(start),
    ))
}

/// Whether a token can begin a property name.
fn starts_property_name(kind: T) -> bool {
    matches!(kind, T::Ident | T::String | T::Number | T::LBracket)
}

fn parse_property(p: &mut Parser, dup: &mut DuplicateMap) -> PResult<NodeId> {
    let start = p.mark(Ctx::Name)?;
    let t = p.peek(Ctx::Name)?.clone();

    // Generator method: `* name(params) { ... }`
    if t.kind == T::Star {
        p.next(Ctx::Name)?;
        let (name, key, computed) = parse_property_name(p)?;
        if !computed {
            register_prop(p, dup, &key, PropKind::Data, t.span, None)?;
        }
        return items::parse_method(p, MethodKind::Generator, name, start);
    }

    // Accessor or async method prefix.
    if t.kind == T::Ident && matches!(t.value.as_str(), "get" | "set" | "async") {
        let next = p.peek1(Ctx::Name)?.clone();
        if starts_property_name(next.kind) && !(t.value == "async" && next.newline_before) {
            p.next(Ctx::Name)?; // the prefix word
            let kind = match t.value.as_str() {
                "get" => MethodKind::Get,
                "set" => MethodKind::Set,
                _ => MethodKind::Async,
            };
            let (name, key, computed) = parse_property_name(p)?;
            if !computed {
                let prop_kind = match kind {
                    MethodKind::Get => PropKind::Get,
                    MethodKind::Set => PropKind::Set,
                    _ => PropKind::Data,
                };
                register_prop(p, dup, &key, prop_kind, t.span, None)?;
            }
            return items::parse_method(p, kind, name, start);
        }
    }

    let (name, key, computed) = parse_property_name(p)?;
    match p.peek_kind(Ctx::Div)? {
        T::Colon => {
            p.next(Ctx::Div)?;
            let expression = parse_assignment(p, false)?;
            let node = p.ast.push(
                NodeKind::PropertyDefinition {
                    name,
                    expression: Some(expression),
                },
                p.span_from(start),
            );
            if !computed {
                register_prop(p, dup, &key, PropKind::Data, p.span_from(start), Some(node))?;
            }
            Ok(node)
        }
        T::LParen => {
            if !computed {
                register_prop(p, dup, &key, PropKind::Data, p.span_from(start), None)?;
            }
            items::parse_method(p, MethodKind::Normal, name, start)
        }
        T::Eq => {
            // Shorthand with default: only meaningful as a pattern.
            require_shorthand_ident(p, name)?;
            p.next(Ctx::Div)?;
            let init = parse_assignment(p, false)?;
            let node = p.ast.push(
                NodeKind::CoveredPatternProperty { name, init },
                p.span_from(start),
            );
            let span = p.span_from(start);
            p.add_invalid_node(node, span, "invalid shorthand property initializer", false);
            if !computed {
                register_prop(p, dup, &key, PropKind::Data, span, Some(node))?;
            }
            Ok(node)
        }
        T::Comma | T::RBrace => {
            require_shorthand_ident(p, name)?;
            let node = p.ast.push(
                NodeKind::PropertyDefinition {
                    name,
                    expression: None,
                },
                p.span_from(start),
            );
            if !computed {
                register_prop(p, dup, &key, PropKind::Data, p.span_from(start), Some(node))?;
            }
            Ok(node)
        }
        _ => p.unexpected(Ctx::Div),
    }
}

/// A shorthand property must be a plain, non-reserved identifier: its name
/// doubles as a variable reference.
fn require_shorthand_ident(p: &mut Parser, name: NodeId) -> PResult<()> {
    match p.ast.kind(name) {
        NodeKind::Identifier { name: text, .. } => {
            if keyword_from_str(text).is_some() {
                let text = text.clone();
                return p.fail(
                    format!("unexpected reserved word `{text}`"),
                    p.ast.span(name),
                );
            }
            Ok(())
        }
        _ => p.fail("expected an identifier", p.ast.span(name)),
    }
}

/// Record a property name in the duplicate map, deferring the strict-only
/// data/data case.
fn register_prop(
    p: &mut Parser,
    dup: &mut DuplicateMap,
    key: &str,
    kind: PropKind,
    span: dusk_common::span::Span,
    node: Option<NodeId>,
) -> PResult<()> {
    match dup.add(key, kind) {
        Ok(DuplicateOutcome::Ok) => Ok(()),
        Ok(DuplicateOutcome::StrictOnly) => {
            let message = format!("duplicate property `{key}` in strict mode");
            match node {
                Some(node) => p.add_invalid_node(node, span, message, true),
                None => {
                    if p.strict() {
                        return p.fail(message, span);
                    }
                }
            }
            Ok(())
        }
        Err(msg) => p.fail(msg, span),
    }
}

/// Property name: identifier (reserved words allowed), string, number, or
/// `[expr]`. Returns the node, a duplicate-detection key, and whether the
/// name is computed.
pub(crate) fn parse_property_name(p: &mut Parser) -> PResult<(NodeId, String, bool)> {
    let t = p.peek(Ctx::Name)?.clone();
    match t.kind {
        T::Ident => {
            p.next(Ctx::Name)?;
            let node = p.ast.push(
                NodeKind::Identifier {
                    name: t.value.clone(),
                    context: IdentContext::None,
                },
                t.span,
            );
            Ok((node, t.value, false))
        }
        T::String => {
            p.next(Ctx::Name)?;
            let node = p.ast.push(
                NodeKind::StringLiteral {
                    value: t.value.clone(),
                },
                t.span,
            );
            Ok((node, t.value, false))
        }
        T::Number => {
            p.next(Ctx::Name)?;
            let node = p
                .ast
                .push(NodeKind::NumberLiteral { value: t.number }, t.span);
            Ok((node, number_key(t.number), false))
        }
        T::LBracket => {
            let start = t.span.start;
            p.next(Ctx::Name)?;
            let expression = parse_assignment(p, false)?;
            p.expect(T::RBracket, Ctx::Div)?;
            let node = p.ast.push(
                NodeKind::ComputedPropertyName { expression },
                p.span_from(start),
            );
            Ok((node, String::new(), true))
        }
        _ => p.unexpected(Ctx::Name),
    }
}

/// Canonical duplicate-detection key for a numeric property name.
fn number_key(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ── Templates ──────────────────────────────────────────────────────────

/// A full template literal, starting at its head piece. After each
/// substitution expression the closing `}` is re-scanned under `Template`
/// context to produce the continuation piece.
pub(crate) fn parse_template_expression(p: &mut Parser) -> PResult<NodeId> {
    let first = p.next(Ctx::Default)?;
    debug_assert_eq!(first.kind, T::Template);
    let start = first.span.start;
    let mut parts = Vec::new();
    let mut done = first.template_end;
    parts.push(p.ast.push(
        NodeKind::Template {
            value: first.value,
            raw: first.raw_value,
        },
        first.span,
    ));
    while !done {
        parts.push(parse_expression(p, false)?);
        let t = p.peek(Ctx::Template)?;
        if t.kind != T::Template {
            return p.unexpected(Ctx::Template);
        }
        let t = p.next(Ctx::Template)?;
        done = t.template_end;
        parts.push(p.ast.push(
            NodeKind::Template {
                value: t.value,
                raw: t.raw_value,
            },
            t.span,
        ));
    }
    Ok(p.ast.push(
        NodeKind::TemplateExpression { parts },
        p.span_from(start),
    ))
}

// ── Arrows and assignment targets ──────────────────────────────────────

/// Build an arrow function after its cover has been parsed and `=>` is the
/// current token. `cover` is an identifier or a `ParenExpression`.
pub(crate) fn finish_arrow(
    p: &mut Parser,
    start: u32,
    cover: NodeId,
    is_async: bool,
) -> PResult<NodeId> {
    p.expect(T::Arrow, Ctx::Div)?;
    let params = patterns::arrow_params_from_cover(p, cover)?;
    p.push_function_context(false, is_async, false);
    let body = if p.peek_kind(Ctx::Default)? == T::LBrace {
        statements::parse_function_body_block(p)?
    } else {
        parse_assignment(p, false)?
    };
    let strict = p.strict();
    if strict {
        let names = patterns::collect_param_names(p, &params);
        if let Err(msg) = p.validator.check_parameters(&names) {
            p.pop_context()?;
            return p.fail(msg, p.span_from(start));
        }
    }
    p.pop_context()?;
    Ok(p.ast.push(
        NodeKind::ArrowFunction {
            is_async,
            params,
            body,
        },
        p.span_from(start),
    ))
}

/// Validate a non-destructuring assignment target (compound assignment,
/// update operators): identifier or member expression, with parens looked
/// through.
pub(crate) fn check_simple_target(p: &mut Parser, id: NodeId) -> PResult<NodeId> {
    match p.ast.kind(id) {
        NodeKind::Identifier { name, .. } => {
            let name = name.clone();
            let strict = p.strict();
            if let Err(msg) = p.validator.assign_target(&name, strict) {
                return p.fail(msg, p.ast.span(id));
            }
            if let NodeKind::Identifier { context, .. } = &mut p.ast.node_mut(id).kind {
                *context = IdentContext::Variable;
            }
            Ok(id)
        }
        NodeKind::MemberExpression { .. } => Ok(id),
        NodeKind::ParenExpression {
            expression: Some(inner),
            rest: None,
        } => {
            let inner = *inner;
            check_simple_target(p, inner)?;
            Ok(id)
        }
        _ => p.fail("invalid assignment target", p.ast.span(id)),
    }
}
