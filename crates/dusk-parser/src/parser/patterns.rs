//! Cover-grammar pattern recognition.
//!
//! Object and array literals double as destructuring patterns. They are
//! parsed as expressions and re-typed in place when their grammatical role
//! demands a pattern: assignment left-hand sides, variable declarators,
//! formal parameters, catch parameters, and comprehension bindings. The
//! transform rewrites property definitions into pattern properties, splits
//! `=` assignments into pattern + default, and turns a trailing array
//! spread into a rest element. A member/call/other non-bindable form under
//! a binding pattern fails the parse.

use dusk_common::token::TokenKind as T;
use dusk_lexer::ScanContext as Ctx;

use crate::ast::{IdentContext, NodeId, NodeKind};

use super::{expressions, PResult, Parser};

/// Parse a binding target: an identifier or a destructuring pattern.
pub(crate) fn parse_binding_target(p: &mut Parser) -> PResult<NodeId> {
    match p.peek_kind(Ctx::Default)? {
        T::Ident => parse_binding_ident(p),
        T::LBracket | T::LBrace => {
            let literal = expressions::parse_primary(p)?;
            transform_pattern(p, literal, true)
        }
        _ => p.unexpected(Ctx::Default),
    }
}

/// Parse a plain identifier binding, validating it and marking its role.
pub(crate) fn parse_binding_ident(p: &mut Parser) -> PResult<NodeId> {
    let t = p.peek(Ctx::Default)?.clone();
    if t.kind != T::Ident {
        return p.unexpected(Ctx::Default);
    }
    p.next(Ctx::Default)?;
    let strict = p.strict();
    if let Err(msg) = p.validator.binding_ident(&t.value, strict) {
        return p.fail(msg, t.span);
    }
    Ok(p.ast.push(
        NodeKind::Identifier {
            name: t.value,
            context: IdentContext::Declaration,
        },
        t.span,
    ))
}

/// Turn an already-parsed expression into an assignment target: literals
/// become patterns, identifiers and member expressions stay as they are.
pub(crate) fn to_assignment_target(p: &mut Parser, id: NodeId) -> PResult<NodeId> {
    match p.ast.kind(id) {
        NodeKind::ObjectLiteral { .. } | NodeKind::ArrayExpression { .. } => {
            transform_pattern(p, id, false)
        }
        _ => expressions::check_simple_target(p, id),
    }
}

/// Re-type an expression as a pattern, in place. `binding` distinguishes
/// declaration targets (identifiers only at the leaves) from assignment
/// destructuring (member expressions admissible).
pub(crate) fn transform_pattern(p: &mut Parser, id: NodeId, binding: bool) -> PResult<NodeId> {
    match p.ast.kind(id).clone() {
        NodeKind::Identifier { name, .. } => {
            let strict = p.strict();
            let check = if binding {
                p.validator.binding_ident(&name, strict)
            } else {
                p.validator.assign_target(&name, strict)
            };
            if let Err(msg) = check {
                return p.fail(msg, p.ast.span(id));
            }
            let context = if binding {
                IdentContext::Declaration
            } else {
                IdentContext::Variable
            };
            if let NodeKind::Identifier { context: slot, .. } = &mut p.ast.node_mut(id).kind {
                *slot = context;
            }
            Ok(id)
        }
        NodeKind::MemberExpression { .. } if !binding => Ok(id),
        NodeKind::ObjectLiteral { properties } => {
            for property in &properties {
                transform_pattern_property(p, *property, binding)?;
            }
            p.ast
                .replace_kind(id, NodeKind::ObjectPattern { properties });
            Ok(id)
        }
        NodeKind::ArrayExpression { elements } => {
            let last = elements.iter().rposition(|e| e.is_some());
            for (index, element) in elements.iter().enumerate() {
                let Some(element) = element else { continue };
                transform_pattern_element(p, *element, index == last.unwrap_or(0), binding)?;
            }
            p.ast.replace_kind(id, NodeKind::ArrayPattern { elements });
            Ok(id)
        }
        _ => p.fail("invalid destructuring target", p.ast.span(id)),
    }
}

/// One element of an array pattern: a plain target, a defaulted target
/// (`x = init`), or a trailing rest (`...x`).
fn transform_pattern_element(
    p: &mut Parser,
    element: NodeId,
    is_last: bool,
    binding: bool,
) -> PResult<()> {
    match p.ast.kind(element).clone() {
        NodeKind::SpreadExpression { expression } => {
            if !is_last {
                return p.fail("rest element must be last", p.ast.span(element));
            }
            if !matches!(p.ast.kind(expression), NodeKind::Identifier { .. }) {
                return p.fail(
                    "rest element must be an identifier",
                    p.ast.span(expression),
                );
            }
            transform_pattern(p, expression, binding)?;
            p.ast
                .replace_kind(element, NodeKind::PatternRestElement { name: expression });
            Ok(())
        }
        NodeKind::AssignmentExpression { op, target, value } if op == "=" => {
            let pattern = transform_pattern(p, target, binding)?;
            p.ast.replace_kind(
                element,
                NodeKind::PatternElement {
                    pattern,
                    init: Some(value),
                },
            );
            Ok(())
        }
        _ => {
            transform_pattern(p, element, binding)?;
            Ok(())
        }
    }
}

/// One property of an object pattern.
fn transform_pattern_property(p: &mut Parser, property: NodeId, binding: bool) -> PResult<()> {
    match p.ast.kind(property).clone() {
        NodeKind::PropertyDefinition {
            name,
            expression: Some(value),
        } => {
            let (pattern, init) = match p.ast.kind(value).clone() {
                NodeKind::AssignmentExpression { op, target, value: init } if op == "=" => {
                    (transform_pattern(p, target, binding)?, Some(init))
                }
                _ => (transform_pattern(p, value, binding)?, None),
            };
            p.ast.replace_kind(
                property,
                NodeKind::PatternProperty {
                    name,
                    pattern: Some(pattern),
                    init,
                },
            );
            Ok(())
        }
        NodeKind::PropertyDefinition {
            name,
            expression: None,
        } => {
            // Shorthand: the name doubles as the target.
            transform_pattern(p, name, binding)?;
            p.ast.replace_kind(
                property,
                NodeKind::PatternProperty {
                    name,
                    pattern: None,
                    init: None,
                },
            );
            Ok(())
        }
        NodeKind::CoveredPatternProperty { name, init } => {
            transform_pattern(p, name, binding)?;
            p.ast.replace_kind(
                property,
                NodeKind::PatternProperty {
                    name,
                    pattern: None,
                    init: Some(init),
                },
            );
            Ok(())
        }
        _ => p.fail("invalid destructuring target", p.ast.span(property)),
    }
}

/// Reinterpret an arrow cover (identifier or parenthesized list) as formal
/// parameters.
pub(crate) fn arrow_params_from_cover(p: &mut Parser, cover: NodeId) -> PResult<Vec<NodeId>> {
    match p.ast.kind(cover).clone() {
        NodeKind::Identifier { .. } => {
            transform_pattern(p, cover, true)?;
            let span = p.ast.span(cover);
            Ok(vec![p.ast.push(
                NodeKind::FormalParameter {
                    pattern: cover,
                    init: None,
                },
                span,
            )])
        }
        NodeKind::ParenExpression { expression, rest } => {
            let mut params = Vec::new();
            if let Some(expression) = expression {
                let items = match p.ast.kind(expression).clone() {
                    NodeKind::SequenceExpression { expressions } => expressions,
                    _ => vec![expression],
                };
                for item in items {
                    let span = p.ast.span(item);
                    let param = match p.ast.kind(item).clone() {
                        NodeKind::AssignmentExpression { op, target, value } if op == "=" => {
                            let pattern = transform_pattern(p, target, true)?;
                            NodeKind::FormalParameter {
                                pattern,
                                init: Some(value),
                            }
                        }
                        _ => {
                            let pattern = transform_pattern(p, item, true)?;
                            NodeKind::FormalParameter {
                                pattern,
                                init: None,
                            }
                        }
                    };
                    params.push(p.ast.push(param, span));
                }
            }
            if let Some(rest) = rest {
                params.push(rest);
            }
            Ok(params)
        }
        _ => p.fail("invalid arrow function parameter list", p.ast.span(cover)),
    }
}

/// Collect the declared names of a parameter list (for strict-mode
/// validation). Declaration-context identifiers anywhere under a parameter
/// are bindings; identifiers inside default initializers are not.
pub(crate) fn collect_param_names(p: &Parser, params: &[NodeId]) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack: Vec<NodeId> = params.to_vec();
    while let Some(id) = stack.pop() {
        if let NodeKind::Identifier {
            name,
            context: IdentContext::Declaration,
        } = p.ast.kind(id)
        {
            names.push(name.clone());
        }
        // Skip default initializers: their identifiers are references.
        match p.ast.kind(id) {
            NodeKind::FormalParameter { pattern, .. } => stack.push(*pattern),
            NodeKind::PatternElement { pattern, .. } => stack.push(*pattern),
            NodeKind::PatternProperty { name, pattern, .. } => match pattern {
                Some(pattern) => stack.push(*pattern),
                None => stack.push(*name),
            },
            _ => stack.extend(p.ast.children(id)),
        }
    }
    names
}
