//! Recursive-descent parser core.
//!
//! The parser pulls tokens on demand from the scanner with an explicit scan
//! context, because tokenization is not context-free: `/` is division only
//! where the preceding grammar permits it, `}` restarts a template literal
//! inside a substitution, and reserved words loosen to names after `.` and
//! in specifier lists.
//!
//! Two lookahead slots are kept. Each slot remembers the context it was
//! scanned under; re-requesting it under a different context rewinds the
//! scanner to the token start and re-scans. The same mechanism re-scans the
//! lookahead when a `"use strict"` directive retroactively changes token
//! classification.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod patterns;
pub(crate) mod statements;

use dusk_common::error::SyntaxError;
use dusk_common::span::{LineIndex, Span};
use dusk_common::token::{Token, TokenKind};
use dusk_lexer::{ScanContext, Scanner};
use rustc_hash::FxHashMap;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::validate::Validator;

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// A cached lookahead token together with the context it was scanned under.
struct Lookahead {
    token: Token,
    ctx: ScanContext,
}

/// A deferred error: recorded mid-parse, judged when the enclosing
/// statement list ends (once strictness is finally known and cover-grammar
/// nodes have had their chance to be reinterpreted as patterns).
pub(crate) struct InvalidNode {
    pub node: NodeId,
    pub span: Span,
    pub message: String,
    /// Fires only when the frame ends up strict (duplicate data
    /// properties). When false, fires unless the node was re-typed away
    /// from `CoveredPatternProperty` by the pattern transform.
    pub strict_only: bool,
}

/// One frame of the parser context stack. Pushed when entering a function
/// body, module body, or class body.
pub(crate) struct ContextFrame {
    pub strict: bool,
    pub is_function: bool,
    pub is_generator: bool,
    pub is_async: bool,
    pub is_method: bool,
    pub label_set: FxHashMap<String, u32>,
    pub loop_depth: u32,
    pub switch_depth: u32,
    pub invalid_nodes: Vec<InvalidNode>,
}

impl ContextFrame {
    fn new(strict: bool) -> Self {
        Self {
            strict,
            is_function: false,
            is_generator: false,
            is_async: false,
            is_method: false,
            label_set: FxHashMap::default(),
            loop_depth: 0,
            switch_depth: 0,
            invalid_nodes: Vec::new(),
        }
    }
}

/// Result of a successful parse: the node arena, its root, and the line
/// index the error/rewrite machinery shares.
#[derive(Debug)]
pub struct ParseResult {
    pub ast: Ast,
    pub root: NodeId,
    pub lines: LineIndex,
}

pub(crate) struct Parser<'src> {
    pub(crate) source: &'src str,
    scanner: Scanner<'src>,
    pub(crate) lines: LineIndex,
    peek0: Option<Lookahead>,
    peek1: Option<Lookahead>,
    /// End offset of the most recently consumed token; stamps node spans.
    pub(crate) end_offset: u32,
    contexts: Vec<ContextFrame>,
    pub(crate) ast: Ast,
    pub(crate) validator: Validator,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            scanner: Scanner::new(source),
            lines: LineIndex::new(source),
            peek0: None,
            peek1: None,
            end_offset: 0,
            contexts: vec![ContextFrame::new(false)],
            ast: Ast::new(),
            validator: Validator,
        }
    }

    // ── Entry points ───────────────────────────────────────────────────

    pub(crate) fn parse_script(mut self) -> PResult<ParseResult> {
        let statements = statements::parse_statement_list_to_eof(&mut self)?;
        self.finish(NodeKind::Script { statements })
    }

    pub(crate) fn parse_module(mut self) -> PResult<ParseResult> {
        self.top_frame_mut().strict = true;
        self.scanner.set_strict(true);
        let statements = items::parse_module_items_to_eof(&mut self)?;
        self.finish(NodeKind::Module { statements })
    }

    pub(crate) fn parse_function_context(mut self) -> PResult<ParseResult> {
        self.top_frame_mut().is_function = true;
        let statements = statements::parse_statement_list_to_eof(&mut self)?;
        self.finish(NodeKind::FunctionBody { statements })
    }

    fn finish(mut self, kind: NodeKind) -> PResult<ParseResult> {
        self.check_invalid_nodes()?;
        let root = self
            .ast
            .push(kind, Span::new(0, self.source.len() as u32));
        self.ast.set_parents(root);
        Ok(ParseResult {
            ast: self.ast,
            root,
            lines: self.lines,
        })
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    /// Ensure the first lookahead slot holds a token scanned under `ctx`.
    fn fill_peek0(&mut self, ctx: ScanContext) {
        if let Some(la) = &self.peek0 {
            if la.ctx == ctx {
                return;
            }
            // Context changed: throw away both slots and re-scan.
            self.scanner.rewind(la.token.span.start);
            self.peek0 = None;
            self.peek1 = None;
        }
        let token = self.scanner.next_token(ctx);
        self.peek0 = Some(Lookahead { token, ctx });
    }

    /// Ensure the second lookahead slot holds a token scanned under `ctx`.
    /// The first slot must already be filled.
    fn fill_peek1(&mut self, ctx: ScanContext) {
        debug_assert!(self.peek0.is_some(), "peek1 requires peek0");
        if let Some(la) = &self.peek1 {
            if la.ctx == ctx {
                return;
            }
            self.scanner.rewind(la.token.span.start);
            self.peek1 = None;
        }
        let token = self.scanner.next_token(ctx);
        self.peek1 = Some(Lookahead { token, ctx });
    }

    /// Peek at the current token. Scan errors surface here.
    pub(crate) fn peek(&mut self, ctx: ScanContext) -> PResult<&Token> {
        self.fill_peek0(ctx);
        let token = &self.peek0.as_ref().unwrap().token;
        if token.kind == TokenKind::Illegal {
            let msg = token
                .error
                .clone()
                .unwrap_or_else(|| "illegal token".to_string());
            return Err(SyntaxError::at(msg, token.span, &self.lines));
        }
        Ok(token)
    }

    /// Kind of the current token.
    pub(crate) fn peek_kind(&mut self, ctx: ScanContext) -> PResult<TokenKind> {
        Ok(self.peek(ctx)?.kind)
    }

    /// Peek at the token after the current one.
    pub(crate) fn peek1(&mut self, ctx: ScanContext) -> PResult<&Token> {
        self.fill_peek0(ctx);
        self.fill_peek1(ctx);
        let token = &self.peek1.as_ref().unwrap().token;
        if token.kind == TokenKind::Illegal {
            let msg = token
                .error
                .clone()
                .unwrap_or_else(|| "illegal token".to_string());
            return Err(SyntaxError::at(msg, token.span, &self.lines));
        }
        Ok(token)
    }

    pub(crate) fn peek1_kind(&mut self, ctx: ScanContext) -> PResult<TokenKind> {
        Ok(self.peek1(ctx)?.kind)
    }

    /// Byte offset where the next token starts; marks node spans.
    pub(crate) fn mark(&mut self, ctx: ScanContext) -> PResult<u32> {
        Ok(self.peek(ctx)?.span.start)
    }

    /// Span from a recorded start to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.end_offset)
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume and return the current token.
    pub(crate) fn next(&mut self, ctx: ScanContext) -> PResult<Token> {
        self.peek(ctx)?;
        let la = self.peek0.take().unwrap();
        self.peek0 = self.peek1.take();
        self.end_offset = la.token.span.end;
        Ok(la.token)
    }

    /// Consume the current token, failing unless it has the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: ScanContext) -> PResult<Token> {
        if self.peek_kind(ctx)? == kind {
            self.next(ctx)
        } else {
            self.unexpected(ctx)
        }
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind, ctx: ScanContext) -> PResult<bool> {
        if self.peek_kind(ctx)? == kind {
            self.next(ctx)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Fail with `unexpected token` at the current token.
    pub(crate) fn unexpected<T>(&mut self, ctx: ScanContext) -> PResult<T> {
        let token = self.peek(ctx)?.clone();
        let what = if token.kind == TokenKind::Eof {
            "unexpected end of input".to_string()
        } else {
            format!("unexpected token `{}`", self.raw(&token))
        };
        Err(SyntaxError::at(what, token.span, &self.lines))
    }

    /// Source slice of a token.
    pub(crate) fn raw(&self, token: &Token) -> &'src str {
        &self.source[token.span.start as usize..token.span.end as usize]
    }

    /// Build a syntax error at a span.
    pub(crate) fn fail<T>(&self, message: impl Into<String>, span: Span) -> PResult<T> {
        Err(SyntaxError::at(message, span, &self.lines))
    }

    /// Consume a statement-terminating semicolon, or insert one: a `}` or
    /// end of input or a preceding line terminator all terminate the
    /// statement.
    pub(crate) fn consume_semicolon(&mut self) -> PResult<()> {
        let token = self.peek(ScanContext::Div)?;
        match token.kind {
            TokenKind::Semicolon => {
                self.next(ScanContext::Div)?;
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ if token.newline_before => Ok(()),
            _ => self.unexpected(ScanContext::Div),
        }
    }

    // ── Context stack ──────────────────────────────────────────────────

    pub(crate) fn top_frame(&self) -> &ContextFrame {
        self.contexts.last().expect("context stack is never empty")
    }

    pub(crate) fn top_frame_mut(&mut self) -> &mut ContextFrame {
        self.contexts.last_mut().expect("context stack is never empty")
    }

    pub(crate) fn strict(&self) -> bool {
        self.top_frame().strict
    }

    /// Enter a function body frame.
    pub(crate) fn push_function_context(
        &mut self,
        is_generator: bool,
        is_async: bool,
        is_method: bool,
    ) {
        let strict = self.strict();
        let mut frame = ContextFrame::new(strict);
        frame.is_function = true;
        frame.is_generator = is_generator;
        frame.is_async = is_async;
        frame.is_method = is_method;
        self.contexts.push(frame);
        self.scanner.set_strict(strict);
    }

    /// Enter a module-body or class-body frame (strict, not a function).
    pub(crate) fn push_strict_context(&mut self) {
        self.contexts.push(ContextFrame::new(true));
        self.scanner.set_strict(true);
        self.invalidate_lookahead();
    }

    /// Leave the current frame, judging its deferred errors first.
    pub(crate) fn pop_context(&mut self) -> PResult<()> {
        self.check_invalid_nodes()?;
        self.contexts.pop();
        let strict = self.strict();
        if self.scanner.strict() != strict {
            self.scanner.set_strict(strict);
            self.invalidate_lookahead();
        }
        Ok(())
    }

    /// Promote the current frame to strict mode (directive prologue) and
    /// re-scan the lookahead under the new classification.
    pub(crate) fn set_strict(&mut self) {
        self.top_frame_mut().strict = true;
        self.scanner.set_strict(true);
        self.invalidate_lookahead();
    }

    fn invalidate_lookahead(&mut self) {
        if let Some(la) = &self.peek0 {
            self.scanner.rewind(la.token.span.start);
            self.peek0 = None;
            self.peek1 = None;
        }
    }

    /// Record a deferred error on the current frame.
    pub(crate) fn add_invalid_node(
        &mut self,
        node: NodeId,
        span: Span,
        message: impl Into<String>,
        strict_only: bool,
    ) {
        self.top_frame_mut().invalid_nodes.push(InvalidNode {
            node,
            span,
            message: message.into(),
            strict_only,
        });
    }

    /// Judge the current frame's deferred errors.
    pub(crate) fn check_invalid_nodes(&mut self) -> PResult<()> {
        let strict = self.strict();
        let entries = std::mem::take(&mut self.top_frame_mut().invalid_nodes);
        for entry in entries {
            if entry.strict_only {
                if strict {
                    return self.fail(entry.message, entry.span);
                }
            } else if matches!(
                self.ast.kind(entry.node),
                NodeKind::CoveredPatternProperty { .. }
            ) {
                return self.fail(entry.message, entry.span);
            }
        }
        Ok(())
    }
}
