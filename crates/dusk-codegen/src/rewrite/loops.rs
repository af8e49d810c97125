//! Iteration desugar: `for-of` over the runtime iterator protocol, and
//! array/generator comprehensions via synthesized IIFE snippets that are
//! re-run through a nested parse+rewrite cycle.

use dusk_parser::ast::{NodeId, NodeKind};

use super::Rewriter;

impl Rewriter<'_> {
    /// `for (x of iter) body` becomes an iterator-protocol loop: the
    /// iterator is captured before the loop, and the step/assign/done test
    /// runs as the loop condition.
    pub(crate) fn rewrite_for_of(&mut self, id: NodeId) -> String {
        let NodeKind::ForOfStatement { left, right, body } = self.ast.kind(id).clone() else {
            unreachable!("rewrite_for_of is dispatched on ForOfStatement");
        };
        let iter_t = self.temp();
        let result_t = self.lift_temp(id);

        // Work out the loop variable: a declared identifier is declared in
        // the head; patterns round-trip through a temp and destructure at
        // the top of the body; an existing binding is reused.
        let mut decl = String::new();
        let target;
        let mut body_prefix = String::new();
        match self.ast.kind(left).clone() {
            NodeKind::VariableDeclaration { declarations, .. } => {
                let NodeKind::VariableDeclarator { pattern, .. } =
                    self.ast.kind(declarations[0]).clone()
                else {
                    unreachable!("for-of head declares exactly one binding");
                };
                if matches!(self.ast.kind(pattern), NodeKind::Identifier { .. }) {
                    let name = self.text(pattern).to_string();
                    decl = format!("var {name}");
                    target = name;
                } else {
                    let t = self.temp();
                    decl = format!("var {t}");
                    let mut pairs = Vec::new();
                    self.destructure_binding_into(pattern, &t, &mut pairs);
                    body_prefix = format!("var {}; ", Self::render_pairs(&pairs));
                    target = t;
                }
            }
            NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {
                let t = self.lift_temp(id);
                let mut assignments = Vec::new();
                self.unroll_assign(left, &t.clone(), id, &mut assignments);
                body_prefix = format!("{}; ", assignments.join(", "));
                target = t;
            }
            _ => {
                target = self.text(left).to_string();
            }
        }

        let body_text = if body_prefix.is_empty() {
            self.text(body).to_string()
        } else if matches!(self.ast.kind(body), NodeKind::Block { .. }) {
            Self::insert_into_body(self.text(body), &body_prefix)
        } else {
            format!("{{ {body_prefix}{} }}", self.text(body))
        };

        format!(
            "var {iter_t} = _runtime.iterator({}); for ({decl}; {result_t} = {iter_t}.next(), {target} = {result_t}.value, !{result_t}.done;) {body_text}",
            self.text(right)
        )
    }

    /// Comprehensions synthesize an immediately-invoked function (or
    /// generator) and re-run the rewriter on the snippet, which desugars
    /// the `for-of` loops the snippet itself contains. The temporary
    /// counter threads through the nested pass so names stay unique.
    pub(crate) fn rewrite_comprehension(&mut self, id: NodeId) -> String {
        let (qualifiers, expression, is_generator) = match self.ast.kind(id).clone() {
            NodeKind::ArrayComprehension {
                qualifiers,
                expression,
            } => (qualifiers, expression, false),
            NodeKind::GeneratorComprehension {
                qualifiers,
                expression,
            } => (qualifiers, expression, true),
            _ => unreachable!("rewrite_comprehension is dispatched on comprehensions"),
        };

        let mut snippet = String::new();
        let accumulator = if is_generator {
            snippet.push_str("(function*() {");
            String::new()
        } else {
            let accumulator = self.temp();
            snippet.push_str(&format!("(function() {{ var {accumulator} = [];"));
            accumulator
        };

        for qualifier in &qualifiers {
            match self.ast.kind(*qualifier).clone() {
                NodeKind::ComprehensionFor { pattern, iterable } => {
                    snippet.push_str(&format!(
                        " for (var {} of {})",
                        self.text(pattern),
                        self.text(iterable)
                    ));
                }
                NodeKind::ComprehensionIf { test } => {
                    snippet.push_str(&format!(" if ({})", self.text(test)));
                }
                _ => {}
            }
        }

        if is_generator {
            snippet.push_str(&format!(" yield {};", self.text(expression)));
            snippet.push_str(" }).call(this)");
        } else {
            snippet.push_str(&format!(" {accumulator}.push({});", self.text(expression)));
            snippet.push_str(&format!(" return {accumulator}; }}).call(this)"));
        }

        self.rewrite_snippet(&snippet)
    }

    /// Parse and rewrite a synthesized snippet, threading the uid counter.
    pub(crate) fn rewrite_snippet(&mut self, snippet: &str) -> String {
        let parse = dusk_parser::parse_function_context(snippet)
            .expect("synthesized snippet must parse");
        let nested = Rewriter::with_uid(snippet, &parse, self.uid);
        let (text, uid) = nested.run_snippet();
        self.uid = uid;
        text
    }
}
