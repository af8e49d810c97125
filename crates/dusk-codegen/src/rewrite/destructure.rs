//! Destructuring desugar: temp-based unrolling of binding and assignment
//! patterns.
//!
//! A declarator `var [a, b = 1, ...r] = list;` becomes a flat declarator
//! list `var __$0 = list, a = __$0[0], __$1 = __$0[1], b = __$1 === void 0
//! ? 1 : __$1, r = _runtime.rest(__$0, 2);`. The assignment form produces
//! a sequence expression that evaluates to the right-hand side.

use dusk_parser::ast::{DeclKind, IdentContext, NodeId, NodeKind};

use super::Rewriter;

impl Rewriter<'_> {
    /// Render (name, value) pairs as declarator text.
    pub(crate) fn render_pairs(pairs: &[(String, Option<String>)]) -> String {
        pairs
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{name} = {value}"),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Unroll a binding pattern against a right-hand side into declarator
    /// pairs, starting with the temp that captures the right-hand side.
    pub(crate) fn unroll_binding(
        &mut self,
        pattern: NodeId,
        rhs: String,
        out: &mut Vec<(String, Option<String>)>,
    ) {
        let t = self.temp();
        out.push((t.clone(), Some(rhs)));
        self.destructure_binding_into(pattern, &t, out);
    }

    /// Destructure `src` (an already-bound name) through a pattern.
    pub(crate) fn destructure_binding_into(
        &mut self,
        pattern: NodeId,
        src: &str,
        out: &mut Vec<(String, Option<String>)>,
    ) {
        match self.ast.kind(pattern).clone() {
            NodeKind::ArrayPattern { elements } => {
                for (index, element) in elements.iter().enumerate() {
                    let Some(element) = element else { continue };
                    match self.ast.kind(*element).clone() {
                        NodeKind::PatternRestElement { name } => {
                            out.push((
                                self.text(name).to_string(),
                                Some(format!("_runtime.rest({src}, {index})")),
                            ));
                        }
                        NodeKind::PatternElement { pattern: target, init } => {
                            self.binding_slot(target, init, format!("{src}[{index}]"), out);
                        }
                        _ => {
                            self.binding_slot(*element, None, format!("{src}[{index}]"), out);
                        }
                    }
                }
            }
            NodeKind::ObjectPattern { properties } => {
                for property in properties {
                    let NodeKind::PatternProperty { name, pattern: target, init } =
                        self.ast.kind(property).clone()
                    else {
                        continue;
                    };
                    let access = self.key_access(src, name);
                    self.binding_slot(target.unwrap_or(name), init, access, out);
                }
            }
            _ => {
                out.push((self.text(pattern).to_string(), Some(src.to_string())));
            }
        }
    }

    /// One slot: apply the default through a temp, then bind the leaf or
    /// recurse into a nested pattern.
    fn binding_slot(
        &mut self,
        target: NodeId,
        init: Option<NodeId>,
        access: String,
        out: &mut Vec<(String, Option<String>)>,
    ) {
        let value = match init {
            Some(init) => {
                let u = self.temp();
                out.push((u.clone(), Some(access)));
                format!("{u} === void 0 ? {} : {u}", self.text(init))
            }
            None => access,
        };
        match self.ast.kind(target) {
            NodeKind::Identifier { .. } => {
                out.push((self.text(target).to_string(), Some(value)));
            }
            _ => {
                let w = self.temp();
                out.push((w.clone(), Some(value)));
                self.destructure_binding_into(target, &w, out);
            }
        }
    }

    /// Property access for an object-pattern key.
    fn key_access(&self, src: &str, name: NodeId) -> String {
        match self.ast.kind(name) {
            NodeKind::Identifier { name, .. } => format!("{src}.{name}"),
            NodeKind::StringLiteral { .. } | NodeKind::NumberLiteral { .. } => {
                format!("{src}[{}]", self.raw(name))
            }
            NodeKind::ComputedPropertyName { expression } => {
                format!("{src}[{}]", self.text(*expression))
            }
            _ => format!("{src}[{}]", self.raw(name)),
        }
    }

    /// Assignment-form unrolling: emits `target = value` expressions, with
    /// temps lifted to the enclosing function.
    pub(crate) fn unroll_assign(
        &mut self,
        pattern: NodeId,
        src: &str,
        at: NodeId,
        out: &mut Vec<String>,
    ) {
        match self.ast.kind(pattern).clone() {
            NodeKind::ArrayPattern { elements } => {
                for (index, element) in elements.iter().enumerate() {
                    let Some(element) = element else { continue };
                    match self.ast.kind(*element).clone() {
                        NodeKind::PatternRestElement { name } => {
                            out.push(format!(
                                "{} = _runtime.rest({src}, {index})",
                                self.text(name)
                            ));
                        }
                        NodeKind::PatternElement { pattern: target, init } => {
                            self.assign_slot(target, init, format!("{src}[{index}]"), at, out);
                        }
                        _ => {
                            self.assign_slot(*element, None, format!("{src}[{index}]"), at, out);
                        }
                    }
                }
            }
            NodeKind::ObjectPattern { properties } => {
                for property in properties {
                    let NodeKind::PatternProperty { name, pattern: target, init } =
                        self.ast.kind(property).clone()
                    else {
                        continue;
                    };
                    let access = self.key_access(src, name);
                    self.assign_slot(target.unwrap_or(name), init, access, at, out);
                }
            }
            _ => {
                out.push(format!("{} = {src}", self.text(pattern)));
            }
        }
    }

    fn assign_slot(
        &mut self,
        target: NodeId,
        init: Option<NodeId>,
        access: String,
        at: NodeId,
        out: &mut Vec<String>,
    ) {
        let value = match init {
            Some(init) => {
                let u = self.lift_temp(at);
                out.push(format!("{u} = {access}"));
                format!("{u} === void 0 ? {} : {u}", self.text(init))
            }
            None => access,
        };
        match self.ast.kind(target) {
            NodeKind::Identifier { .. } | NodeKind::MemberExpression { .. } => {
                out.push(format!("{} = {value}", self.text(target)));
            }
            _ => {
                let w = self.lift_temp(at);
                out.push(format!("{w} = {value}"));
                self.unroll_assign(target, &w.clone(), at, out);
            }
        }
    }

    /// `let`/`const` become `var`; destructuring declarators unroll into a
    /// flat declarator list. A patterned declarator without an initializer
    /// belongs to a `for-in`/`for-of` head, whose statement hook does the
    /// unrolling itself.
    pub(crate) fn rewrite_variable_declaration(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::VariableDeclaration {
            keyword,
            declarations,
        } = self.ast.kind(id).clone()
        else {
            return None;
        };

        let needs_unroll = declarations.iter().any(|d| {
            matches!(
                self.ast.kind(*d),
                NodeKind::VariableDeclarator { pattern, init: Some(_) }
                    if !matches!(self.ast.kind(*pattern), NodeKind::Identifier { .. })
            )
        });

        if !needs_unroll {
            if keyword == DeclKind::Var {
                return None;
            }
            let text = self.stringify(id);
            return Some(format!("var{}", &text[keyword.as_str().len()..]));
        }

        let mut pairs: Vec<(String, Option<String>)> = Vec::new();
        for declarator in declarations {
            let NodeKind::VariableDeclarator { pattern, init } = self.ast.kind(declarator).clone()
            else {
                continue;
            };
            if matches!(self.ast.kind(pattern), NodeKind::Identifier { .. }) {
                let init = init.map(|i| self.text(i).to_string());
                pairs.push((self.text(pattern).to_string(), init));
            } else {
                let rhs = self
                    .text(init.expect("patterned declarator has an initializer"))
                    .to_string();
                self.unroll_binding(pattern, rhs, &mut pairs);
            }
        }
        Some(format!("var {}", Self::render_pairs(&pairs)))
    }

    /// Assignment destructuring: a sequence expression that performs the
    /// assignments and evaluates to the captured right-hand side.
    pub(crate) fn rewrite_assignment(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::AssignmentExpression { op, target, value } = self.ast.kind(id).clone()
        else {
            return None;
        };
        if op != "="
            || !matches!(
                self.ast.kind(target),
                NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. }
            )
        {
            return None;
        }
        let t = self.lift_temp(id);
        let mut assignments = Vec::new();
        self.unroll_assign(target, &t.clone(), id, &mut assignments);
        let value_text = self.text(value);
        if assignments.is_empty() {
            Some(format!("({t} = {value_text}, {t})"))
        } else {
            Some(format!(
                "({t} = {value_text}, {}, {t})",
                assignments.join(", ")
            ))
        }
    }

    /// Declared names under a pattern or declaration subtree, in source
    /// order. Used when recording `export var` bindings.
    pub(crate) fn collect_binding_names(&self, id: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let NodeKind::Identifier {
                name,
                context: IdentContext::Declaration,
            } = self.ast.kind(current)
            {
                names.push(name.clone());
            }
            // Initializer expressions hold references, not bindings.
            match self.ast.kind(current) {
                NodeKind::VariableDeclarator { pattern, .. } => stack.push(*pattern),
                NodeKind::PatternElement { pattern, .. } => stack.push(*pattern),
                NodeKind::PatternProperty { name, pattern, .. } => match pattern {
                    Some(pattern) => stack.push(*pattern),
                    None => stack.push(*name),
                },
                _ => {
                    let mut children = self.ast.children(current);
                    children.reverse();
                    stack.extend(children);
                }
            }
        }
        names
    }
}
