//! Statement and declaration parsing.
//!
//! Statement lists at the start of a script, module, or function body run a
//! directive-prologue scan: leading string-only expression statements whose
//! raw text is exactly `use strict` promote the current frame to strict
//! mode, re-scanning the lookahead under the new token classification.
//!
//! Semicolon handling follows the usual insertion rules: a statement also
//! terminates at `}`, end of input, or a crossed line terminator.

use dusk_common::token::TokenKind as T;
use dusk_lexer::ScanContext as Ctx;

use crate::ast::{DeclKind, NodeId, NodeKind};

use super::{expressions, items, patterns, PResult, Parser};

/// Statement list for a script or function-context root.
pub(crate) fn parse_statement_list_to_eof(p: &mut Parser) -> PResult<Vec<NodeId>> {
    parse_statement_list(p, true, T::Eof)
}

/// Parse statements until the end token, optionally honoring a directive
/// prologue.
pub(crate) fn parse_statement_list(
    p: &mut Parser,
    directives: bool,
    end: T,
) -> PResult<Vec<NodeId>> {
    let mut statements = Vec::new();
    let mut in_prologue = directives;
    loop {
        let kind = p.peek_kind(Ctx::Default)?;
        if kind == end || kind == T::Eof {
            break;
        }
        let statement = parse_statement(p)?;
        if in_prologue {
            match directive_text(p, statement) {
                Some(text) => {
                    if text == "use strict" {
                        p.set_strict();
                    }
                }
                None => in_prologue = false,
            }
        }
        statements.push(statement);
    }
    Ok(statements)
}

/// The raw text of a directive candidate: an expression statement holding a
/// single string literal. Escapes keep a directive from matching, so the
/// comparison uses the raw source between the quotes.
fn directive_text<'src>(p: &Parser<'src>, statement: NodeId) -> Option<&'src str> {
    let NodeKind::ExpressionStatement { expression } = p.ast.kind(statement) else {
        return None;
    };
    let NodeKind::StringLiteral { .. } = p.ast.kind(*expression) else {
        return None;
    };
    let span = p.ast.span(*expression);
    Some(&p.source[span.start as usize + 1..span.end as usize - 1])
}

pub(crate) fn parse_statement(p: &mut Parser) -> PResult<NodeId> {
    match p.peek_kind(Ctx::Default)? {
        T::LBrace => parse_block(p),
        T::Semicolon => {
            let t = p.next(Ctx::Default)?;
            Ok(p.ast.push(NodeKind::EmptyStatement, t.span))
        }
        T::Var => parse_variable_statement(p, DeclKind::Var),
        T::Const => parse_variable_statement(p, DeclKind::Const),
        T::Let => parse_variable_statement(p, DeclKind::Let),
        T::If => parse_if(p),
        T::While => parse_while(p),
        T::Do => parse_do_while(p),
        T::For => parse_for(p),
        T::Switch => parse_switch(p),
        T::Try => parse_try(p),
        T::Throw => parse_throw(p),
        T::Return => parse_return(p),
        T::Break => parse_break_continue(p, true),
        T::Continue => parse_break_continue(p, false),
        T::With => parse_with(p),
        T::Debugger => {
            let start = p.mark(Ctx::Default)?;
            p.next(Ctx::Default)?;
            p.consume_semicolon()?;
            Ok(p.ast.push(NodeKind::DebuggerStatement, p.span_from(start)))
        }
        T::Function => items::parse_function_declaration(p, false),
        T::Class => items::parse_class_declaration(p),
        T::Ident => {
            let t = p.peek(Ctx::Default)?.clone();
            // `let` is contextual outside strict mode: a declaration only
            // when a binding target follows.
            if t.value == "let"
                && matches!(
                    p.peek1_kind(Ctx::Default)?,
                    T::Ident | T::LBracket | T::LBrace
                )
            {
                return parse_variable_statement(p, DeclKind::Let);
            }
            if t.value == "async" {
                let next = p.peek1(Ctx::Default)?;
                if next.kind == T::Function && !next.newline_before {
                    return items::parse_function_declaration(p, true);
                }
            }
            if p.peek1_kind(Ctx::Div)? == T::Colon {
                return parse_labelled(p);
            }
            parse_expression_statement(p)
        }
        _ => parse_expression_statement(p),
    }
}

fn parse_expression_statement(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let expression = expressions::parse_expression(p, false)?;
    p.consume_semicolon()?;
    Ok(p.ast.push(
        NodeKind::ExpressionStatement { expression },
        p.span_from(start),
    ))
}

pub(crate) fn parse_block(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    let statements = parse_statement_list(p, false, T::RBrace)?;
    p.expect(T::RBrace, Ctx::Default)?;
    Ok(p.ast.push(NodeKind::Block { statements }, p.span_from(start)))
}

/// A braced function body with a directive prologue. The caller has already
/// pushed the function context frame.
pub(crate) fn parse_function_body_block(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::LBrace, Ctx::Default)?;
    let statements = parse_statement_list(p, true, T::RBrace)?;
    p.expect(T::RBrace, Ctx::Default)?;
    Ok(p.ast.push(
        NodeKind::FunctionBody { statements },
        p.span_from(start),
    ))
}

// ── Variable declarations ──────────────────────────────────────────────

/// Semicolon-terminated declaration statement.
fn parse_variable_statement(p: &mut Parser, keyword: DeclKind) -> PResult<NodeId> {
    let node = parse_variable_declaration(p, keyword, false)?;
    check_declaration_inits(p, node)?;
    p.consume_semicolon()?;
    Ok(node)
}

/// The declaration itself, shared with `for` heads (which run their own
/// initializer checks).
pub(crate) fn parse_variable_declaration(
    p: &mut Parser,
    keyword: DeclKind,
    no_in: bool,
) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.next(Ctx::Default)?; // var / let / const
    let mut declarations = Vec::new();
    loop {
        declarations.push(parse_declarator(p, no_in)?);
        if !p.eat(T::Comma, Ctx::Div)? {
            break;
        }
    }
    Ok(p.ast.push(
        NodeKind::VariableDeclaration {
            keyword,
            declarations,
        },
        p.span_from(start),
    ))
}

fn parse_declarator(p: &mut Parser, no_in: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let pattern = patterns::parse_binding_target(p)?;
    let init = if p.eat(T::Eq, Ctx::Div)? {
        Some(expressions::parse_assignment(p, no_in)?)
    } else {
        None
    };
    Ok(p.ast.push(
        NodeKind::VariableDeclarator { pattern, init },
        p.span_from(start),
    ))
}

/// `const` declarators need initializers, and so does any destructuring
/// declarator. Not applied to `for-in`/`for-of` heads.
pub(crate) fn check_declaration_inits(p: &mut Parser, declaration: NodeId) -> PResult<()> {
    let NodeKind::VariableDeclaration {
        keyword,
        declarations,
    } = p.ast.kind(declaration)
    else {
        return Ok(());
    };
    let keyword = *keyword;
    for declarator in declarations.clone() {
        let NodeKind::VariableDeclarator { pattern, init } = p.ast.kind(declarator) else {
            continue;
        };
        if init.is_none() {
            if keyword == DeclKind::Const {
                return p.fail(
                    "missing initializer in const declaration",
                    p.ast.span(declarator),
                );
            }
            if !matches!(p.ast.kind(*pattern), NodeKind::Identifier { .. }) {
                return p.fail(
                    "missing initializer in destructuring declaration",
                    p.ast.span(declarator),
                );
            }
        }
    }
    Ok(())
}

// ── Control flow ───────────────────────────────────────────────────────

fn parse_if(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::If, Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;
    let test = expressions::parse_expression(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    let consequent = parse_statement(p)?;
    let alternate = if p.eat(T::Else, Ctx::Default)? {
        Some(parse_statement(p)?)
    } else {
        None
    };
    Ok(p.ast.push(
        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        },
        p.span_from(start),
    ))
}

fn parse_loop_body(p: &mut Parser) -> PResult<NodeId> {
    p.top_frame_mut().loop_depth += 1;
    let body = parse_statement(p);
    p.top_frame_mut().loop_depth -= 1;
    body
}

fn parse_while(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::While, Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;
    let test = expressions::parse_expression(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    let body = parse_loop_body(p)?;
    Ok(p.ast.push(
        NodeKind::WhileStatement { test, body },
        p.span_from(start),
    ))
}

fn parse_do_while(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Do, Ctx::Default)?;
    let body = parse_loop_body(p)?;
    p.expect(T::While, Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;
    let test = expressions::parse_expression(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    // The trailing semicolon of do-while is fully optional.
    p.eat(T::Semicolon, Ctx::Div)?;
    Ok(p.ast.push(
        NodeKind::DoWhileStatement { body, test },
        p.span_from(start),
    ))
}

fn parse_for(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::For, Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;

    // Empty initializer.
    if p.eat(T::Semicolon, Ctx::Default)? {
        return finish_classic_for(p, start, None);
    }

    // Declaration head.
    let decl_keyword = match p.peek_kind(Ctx::Default)? {
        T::Var => Some(DeclKind::Var),
        T::Const => Some(DeclKind::Const),
        T::Let => Some(DeclKind::Let),
        T::Ident
            if p.peek(Ctx::Default)?.value == "let"
                && matches!(
                    p.peek1_kind(Ctx::Default)?,
                    T::Ident | T::LBracket | T::LBrace
                ) =>
        {
            Some(DeclKind::Let)
        }
        _ => None,
    };

    if let Some(keyword) = decl_keyword {
        let declaration = parse_variable_declaration(p, keyword, true)?;
        let t = p.peek(Ctx::Default)?.clone();
        if t.kind == T::In {
            check_for_init(p, declaration, "in")?;
            p.next(Ctx::Default)?;
            let right = expressions::parse_expression(p, false)?;
            p.expect(T::RParen, Ctx::Div)?;
            let body = parse_loop_body(p)?;
            return Ok(p.ast.push(
                NodeKind::ForInStatement {
                    left: declaration,
                    right,
                    body,
                },
                p.span_from(start),
            ));
        }
        if t.kind == T::Ident && t.value == "of" {
            check_for_init(p, declaration, "of")?;
            p.next(Ctx::Default)?;
            let right = expressions::parse_assignment(p, false)?;
            p.expect(T::RParen, Ctx::Div)?;
            let body = parse_loop_body(p)?;
            return Ok(p.ast.push(
                NodeKind::ForOfStatement {
                    left: declaration,
                    right,
                    body,
                },
                p.span_from(start),
            ));
        }
        check_declaration_inits(p, declaration)?;
        p.expect(T::Semicolon, Ctx::Div)?;
        return finish_classic_for(p, start, Some(declaration));
    }

    // Expression head.
    let init = expressions::parse_expression(p, true)?;
    let t = p.peek(Ctx::Default)?.clone();
    if t.kind == T::In {
        let left = patterns::to_assignment_target(p, init)?;
        p.next(Ctx::Default)?;
        let right = expressions::parse_expression(p, false)?;
        p.expect(T::RParen, Ctx::Div)?;
        let body = parse_loop_body(p)?;
        return Ok(p.ast.push(
            NodeKind::ForInStatement { left, right, body },
            p.span_from(start),
        ));
    }
    if t.kind == T::Ident && t.value == "of" {
        let left = patterns::to_assignment_target(p, init)?;
        p.next(Ctx::Default)?;
        let right = expressions::parse_assignment(p, false)?;
        p.expect(T::RParen, Ctx::Div)?;
        let body = parse_loop_body(p)?;
        return Ok(p.ast.push(
            NodeKind::ForOfStatement { left, right, body },
            p.span_from(start),
        ));
    }
    p.expect(T::Semicolon, Ctx::Div)?;
    finish_classic_for(p, start, Some(init))
}

fn finish_classic_for(p: &mut Parser, start: u32, init: Option<NodeId>) -> PResult<NodeId> {
    let test = if p.peek_kind(Ctx::Default)? == T::Semicolon {
        None
    } else {
        Some(expressions::parse_expression(p, false)?)
    };
    p.expect(T::Semicolon, Ctx::Div)?;
    let update = if p.peek_kind(Ctx::Default)? == T::RParen {
        None
    } else {
        Some(expressions::parse_expression(p, false)?)
    };
    p.expect(T::RParen, Ctx::Div)?;
    let body = parse_loop_body(p)?;
    Ok(p.ast.push(
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        },
        p.span_from(start),
    ))
}

/// Head validation for `for-in`/`for-of` declarations: a single declarator;
/// an initializer only in `for-in` with `var` and a plain identifier.
fn check_for_init(p: &mut Parser, declaration: NodeId, kind: &str) -> PResult<()> {
    let NodeKind::VariableDeclaration {
        keyword,
        declarations,
    } = p.ast.kind(declaration)
    else {
        return Ok(());
    };
    let keyword = *keyword;
    if declarations.len() != 1 {
        return p.fail(
            format!("for-{kind} may declare only one binding"),
            p.ast.span(declaration),
        );
    }
    let declarator = declarations[0];
    let NodeKind::VariableDeclarator { pattern, init } = p.ast.kind(declarator) else {
        return Ok(());
    };
    if init.is_some() {
        let plain_var_ident =
            keyword == DeclKind::Var && matches!(p.ast.kind(*pattern), NodeKind::Identifier { .. });
        if kind == "of" || !plain_var_ident {
            return p.fail(
                format!("for-{kind} declaration may not have an initializer"),
                p.ast.span(declarator),
            );
        }
    }
    Ok(())
}

// ── Switch, try, and the rest ──────────────────────────────────────────

fn parse_switch(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Switch, Ctx::Default)?;
    p.expect(T::LParen, Ctx::Default)?;
    let discriminant = expressions::parse_expression(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    p.expect(T::LBrace, Ctx::Default)?;

    p.top_frame_mut().switch_depth += 1;
    let cases = parse_switch_cases(p);
    p.top_frame_mut().switch_depth -= 1;
    let cases = cases?;

    p.expect(T::RBrace, Ctx::Default)?;
    Ok(p.ast.push(
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        },
        p.span_from(start),
    ))
}

fn parse_switch_cases(p: &mut Parser) -> PResult<Vec<NodeId>> {
    let mut cases = Vec::new();
    let mut seen_default = false;
    loop {
        let case_start = p.mark(Ctx::Default)?;
        match p.peek_kind(Ctx::Default)? {
            T::RBrace | T::Eof => break,
            T::Case => {
                p.next(Ctx::Default)?;
                let test = expressions::parse_expression(p, false)?;
                p.expect(T::Colon, Ctx::Default)?;
                let statements = parse_case_statements(p)?;
                cases.push(p.ast.push(
                    NodeKind::SwitchCase {
                        test: Some(test),
                        statements,
                    },
                    p.span_from(case_start),
                ));
            }
            T::Default => {
                let t = p.next(Ctx::Default)?;
                if seen_default {
                    return p.fail("duplicate default clause", t.span);
                }
                seen_default = true;
                p.expect(T::Colon, Ctx::Default)?;
                let statements = parse_case_statements(p)?;
                cases.push(p.ast.push(
                    NodeKind::SwitchCase {
                        test: None,
                        statements,
                    },
                    p.span_from(case_start),
                ));
            }
            _ => return p.unexpected(Ctx::Default),
        }
    }
    Ok(cases)
}

fn parse_case_statements(p: &mut Parser) -> PResult<Vec<NodeId>> {
    let mut statements = Vec::new();
    loop {
        match p.peek_kind(Ctx::Default)? {
            T::Case | T::Default | T::RBrace | T::Eof => break,
            _ => statements.push(parse_statement(p)?),
        }
    }
    Ok(statements)
}

fn parse_try(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Try, Ctx::Default)?;
    let block = parse_block(p)?;
    let handler = if p.peek_kind(Ctx::Default)? == T::Catch {
        let handler_start = p.mark(Ctx::Default)?;
        p.next(Ctx::Default)?;
        p.expect(T::LParen, Ctx::Default)?;
        let param = patterns::parse_binding_target(p)?;
        p.expect(T::RParen, Ctx::Div)?;
        let body = parse_block(p)?;
        Some(p.ast.push(
            NodeKind::CatchClause { param, body },
            p.span_from(handler_start),
        ))
    } else {
        None
    };
    let finalizer = if p.eat(T::Finally, Ctx::Default)? {
        Some(parse_block(p)?)
    } else {
        None
    };
    if handler.is_none() && finalizer.is_none() {
        return p.fail("missing catch or finally after try", p.span_from(start));
    }
    Ok(p.ast.push(
        NodeKind::TryStatement {
            block,
            handler,
            finalizer,
        },
        p.span_from(start),
    ))
}

fn parse_throw(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.expect(T::Throw, Ctx::Default)?;
    if p.peek(Ctx::Default)?.newline_before {
        return p.fail("illegal newline after throw", p.span_from(start));
    }
    let argument = expressions::parse_expression(p, false)?;
    p.consume_semicolon()?;
    Ok(p.ast.push(
        NodeKind::ThrowStatement { argument },
        p.span_from(start),
    ))
}

fn parse_return(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let t = p.expect(T::Return, Ctx::Default)?;
    if !p.top_frame().is_function {
        return p.fail("return outside of function", t.span);
    }
    let next = p.peek(Ctx::Default)?;
    let argument = if matches!(next.kind, T::Semicolon | T::RBrace | T::Eof) || next.newline_before
    {
        None
    } else {
        Some(expressions::parse_expression(p, false)?)
    };
    p.consume_semicolon()?;
    Ok(p.ast.push(
        NodeKind::ReturnStatement { argument },
        p.span_from(start),
    ))
}

fn parse_break_continue(p: &mut Parser, is_break: bool) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    p.next(Ctx::Default)?; // break / continue
    let label_tok = {
        let t = p.peek(Ctx::Default)?;
        if t.kind == T::Ident && !t.newline_before {
            Some(t.clone())
        } else {
            None
        }
    };
    let label = match label_tok {
        Some(t) => {
            p.next(Ctx::Default)?;
            if !p.top_frame().label_set.contains_key(&t.value) {
                return p.fail(format!("undefined label `{}`", t.value), t.span);
            }
            Some(p.ast.push(
                NodeKind::Identifier {
                    name: t.value,
                    context: crate::ast::IdentContext::None,
                },
                t.span,
            ))
        }
        None => None,
    };

    let frame = p.top_frame();
    if is_break {
        if label.is_none() && frame.loop_depth == 0 && frame.switch_depth == 0 {
            return p.fail("break outside of iteration or switch", p.span_from(start));
        }
    } else if frame.loop_depth == 0 {
        return p.fail("continue outside of iteration", p.span_from(start));
    }

    p.consume_semicolon()?;
    let span = p.span_from(start);
    Ok(if is_break {
        p.ast.push(NodeKind::BreakStatement { label }, span)
    } else {
        p.ast.push(NodeKind::ContinueStatement { label }, span)
    })
}

fn parse_with(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let t = p.expect(T::With, Ctx::Default)?;
    if p.strict() {
        return p.fail("with statement is not allowed in strict mode", t.span);
    }
    p.expect(T::LParen, Ctx::Default)?;
    let object = expressions::parse_expression(p, false)?;
    p.expect(T::RParen, Ctx::Div)?;
    let body = parse_statement(p)?;
    Ok(p.ast.push(
        NodeKind::WithStatement { object, body },
        p.span_from(start),
    ))
}

fn parse_labelled(p: &mut Parser) -> PResult<NodeId> {
    let start = p.mark(Ctx::Default)?;
    let t = p.next(Ctx::Default)?; // the label identifier
    let name = t.value.clone();
    p.expect(T::Colon, Ctx::Div)?;

    let count = p.top_frame_mut().label_set.entry(name.clone()).or_insert(0);
    if *count > 0 {
        return p.fail(format!("duplicate label `{name}`"), t.span);
    }
    *count += 1;

    let label = p.ast.push(
        NodeKind::Identifier {
            name: name.clone(),
            context: crate::ast::IdentContext::None,
        },
        t.span,
    );
    let statement = parse_statement(p);
    if let Some(count) = p.top_frame_mut().label_set.get_mut(&name) {
        *count -= 1;
        if *count == 0 {
            p.top_frame_mut().label_set.remove(&name);
        }
    }
    let statement = statement?;
    Ok(p.ast.push(
        NodeKind::LabelledStatement { label, statement },
        p.span_from(start),
    ))
}
