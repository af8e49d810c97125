//! Function-family desugar: default and rest parameters, parameter
//! destructuring, arrow functions, async functions, and method shorthand.

use dusk_parser::ast::{FunctionKind, MethodKind, NodeId, NodeKind};

use super::Rewriter;

/// What a function's parameter list contributes to its rewritten form.
pub(crate) struct FnParts {
    /// The emitted formal parameter list (rest erased, patterns replaced
    /// by temps).
    pub formals: String,
    /// Body prefix: `this` capture, default checks, rest capture, and
    /// parameter destructuring, in parameter order.
    pub pre: String,
    /// Lifted temporary declarations, kept separate because async bodies
    /// declare them inside the generator.
    pub temps: String,
    /// Whether the formal list itself differs from the source.
    pub changed: bool,
}

impl Rewriter<'_> {
    pub(crate) fn function_parts(&mut self, id: NodeId, params: &[NodeId]) -> FnParts {
        let mut formals = Vec::new();
        let mut pre = String::new();
        let mut changed = false;

        if self
            .fn_info
            .get(&id)
            .is_some_and(|info| info.this_binding)
        {
            pre.push_str("var __this = this; ");
        }

        for (index, param) in params.iter().enumerate() {
            match self.ast.kind(*param).clone() {
                NodeKind::FormalParameter { pattern, init } => {
                    if matches!(self.ast.kind(pattern), NodeKind::Identifier { .. }) {
                        let name = self.text(pattern).to_string();
                        if let Some(init) = init {
                            pre.push_str(&format!(
                                "if ({name} === void 0) {name} = {}; ",
                                self.text(init)
                            ));
                        }
                        formals.push(name);
                    } else {
                        changed = true;
                        let t = self.temp();
                        if let Some(init) = init {
                            pre.push_str(&format!(
                                "if ({t} === void 0) {t} = {}; ",
                                self.text(init)
                            ));
                        }
                        let mut pairs = Vec::new();
                        self.destructure_binding_into(pattern, &t, &mut pairs);
                        pre.push_str(&format!("var {}; ", Self::render_pairs(&pairs)));
                        formals.push(t);
                    }
                }
                NodeKind::RestParameter { name } => {
                    changed = true;
                    pre.push_str(&format!(
                        "var {} = _runtime.rest(arguments, {index}); ",
                        self.text(name)
                    ));
                }
                _ => {}
            }
        }

        let temps = match self.fn_info.get(&id) {
            Some(info) if !info.temps.is_empty() => {
                format!("var {}; ", info.temps.join(", "))
            }
            _ => String::new(),
        };

        FnParts {
            formals: formals.join(", "),
            pre,
            temps,
            changed,
        }
    }

    /// Assemble a (possibly async) function body from its braced text and
    /// the parameter-derived prefixes.
    pub(crate) fn assemble_fn_body(
        &self,
        body_text: &str,
        parts: &FnParts,
        is_async: bool,
    ) -> String {
        if !is_async {
            let prefix = format!("{}{}", parts.pre, parts.temps);
            return Self::insert_into_body(body_text, &prefix);
        }
        let inner = Self::body_inner(body_text);
        format!(
            "{{ {}try {{ return _runtime.async(function*() {{ {}{inner} }}.apply(this, arguments)); }} catch (x) {{ return Promise.reject(x); }} }}",
            parts.pre, parts.temps
        )
    }

    pub(crate) fn rewrite_function(&mut self, id: NodeId) -> Option<String> {
        let (kind, name, params, body) = match self.ast.kind(id).clone() {
            NodeKind::FunctionDeclaration {
                kind,
                name,
                params,
                body,
            } => (kind, Some(name), params, body),
            NodeKind::FunctionExpression {
                kind,
                name,
                params,
                body,
            } => (kind, name, params, body),
            _ => return None,
        };
        let is_async = kind == FunctionKind::Async;
        let parts = self.function_parts(id, &params);
        if !is_async && !parts.changed && parts.pre.is_empty() && parts.temps.is_empty() {
            return None;
        }
        let star = if kind == FunctionKind::Generator { "*" } else { "" };
        let name_text = match name {
            Some(name) => format!(" {}", self.text(name)),
            None => String::new(),
        };
        let body_text = self.text(body).to_string();
        let body_text = self.assemble_fn_body(&body_text, &parts, is_async);
        Some(format!(
            "function{star}{name_text}({}) {body_text}",
            parts.formals
        ))
    }

    pub(crate) fn rewrite_arrow(&mut self, id: NodeId) -> String {
        let NodeKind::ArrowFunction {
            is_async,
            params,
            body,
        } = self.ast.kind(id).clone()
        else {
            unreachable!("rewrite_arrow is dispatched on ArrowFunction");
        };
        let parts = self.function_parts(id, &params);
        let body_text = match self.ast.kind(body) {
            NodeKind::FunctionBody { .. } => self.text(body).to_string(),
            _ => format!("{{ return {}; }}", self.text(body)),
        };
        let body_text = self.assemble_fn_body(&body_text, &parts, is_async);
        format!("(function({}) {body_text})", parts.formals)
    }

    pub(crate) fn rewrite_method(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::MethodDefinition {
            kind,
            name,
            params,
            body,
        } = self.ast.kind(id).clone()
        else {
            return None;
        };
        let computed = matches!(self.ast.kind(name), NodeKind::ComputedPropertyName { .. });
        let parts = self.function_parts(id, &params);
        let is_async = kind == MethodKind::Async;
        let body_text = self.text(body).to_string();

        // A class constructor becomes a named function so stack traces and
        // `instanceof`-style debugging keep the class name.
        let in_class = self
            .ast
            .node(id)
            .parent
            .is_some_and(|p| matches!(self.ast.kind(p), NodeKind::ClassElement { .. }));
        if in_class && !computed && self.raw(name) == "constructor" {
            let class_name = self.enclosing_class_name(id);
            let body_text = self.assemble_fn_body(&body_text, &parts, false);
            let name_part = if class_name.is_empty() {
                String::new()
            } else {
                format!(" {class_name}")
            };
            return Some(format!(
                "constructor: function{name_part}({}) {body_text}",
                parts.formals
            ));
        }

        let name_text = if computed {
            format!("__computed{}", self.computed_ordinal(id))
        } else {
            self.raw(name).to_string()
        };

        match kind {
            MethodKind::Get | MethodKind::Set => {
                if !computed && !parts.changed && parts.pre.is_empty() && parts.temps.is_empty() {
                    return None;
                }
                let accessor = if kind == MethodKind::Get { "get" } else { "set" };
                let body_text = self.assemble_fn_body(&body_text, &parts, false);
                Some(format!(
                    "{accessor} {name_text}({}) {body_text}",
                    parts.formals
                ))
            }
            MethodKind::Generator => {
                let body_text = self.assemble_fn_body(&body_text, &parts, false);
                Some(format!(
                    "{name_text}: function*({}) {body_text}",
                    parts.formals
                ))
            }
            _ => {
                let body_text = self.assemble_fn_body(&body_text, &parts, is_async);
                Some(format!(
                    "{name_text}: function({}) {body_text}",
                    parts.formals
                ))
            }
        }
    }

    pub(crate) fn enclosing_class_name(&self, id: NodeId) -> String {
        for anc in self.ast.ancestors(id) {
            match self.ast.kind(anc) {
                NodeKind::ClassDeclaration { name, .. } => return self.text(*name).to_string(),
                NodeKind::ClassExpression { name, .. } => {
                    return name.map(|n| self.text(n).to_string()).unwrap_or_default();
                }
                _ => {}
            }
        }
        String::new()
    }

    /// Ordinal of a computed-keyed property among its literal's computed
    /// properties, for placeholder naming.
    pub(crate) fn computed_ordinal(&self, id: NodeId) -> usize {
        let Some(parent) = self.ast.node(id).parent else {
            return 0;
        };
        let NodeKind::ObjectLiteral { properties } = self.ast.kind(parent) else {
            return 0;
        };
        properties
            .iter()
            .take_while(|p| **p != id)
            .filter(|p| self.property_has_computed_name(**p))
            .count()
    }

    pub(crate) fn property_has_computed_name(&self, id: NodeId) -> bool {
        let name = match self.ast.kind(id) {
            NodeKind::PropertyDefinition { name, .. } => *name,
            NodeKind::MethodDefinition { name, .. } => *name,
            _ => return false,
        };
        matches!(self.ast.kind(name), NodeKind::ComputedPropertyName { .. })
    }

    /// Object-literal data properties: expand shorthand and place
    /// computed-key placeholders.
    pub(crate) fn rewrite_property(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::PropertyDefinition { name, expression } = self.ast.kind(id).clone() else {
            return None;
        };
        if matches!(self.ast.kind(name), NodeKind::ComputedPropertyName { .. }) {
            let ordinal = self.computed_ordinal(id);
            let value = expression.map(|e| self.text(e).to_string()).unwrap_or_default();
            return Some(format!("__computed{ordinal}: {value}"));
        }
        if expression.is_none() {
            let name_text = self.text(name);
            return Some(format!("{name_text}: {name_text}"));
        }
        None
    }

    /// Object literals with computed keys wrap in `_runtime.computed`,
    /// pairing each placeholder with its key expression in order.
    pub(crate) fn rewrite_object(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::ObjectLiteral { properties } = self.ast.kind(id) else {
            return None;
        };
        let keys: Vec<String> = properties
            .clone()
            .into_iter()
            .filter(|p| self.property_has_computed_name(*p))
            .map(|p| {
                let name = match self.ast.kind(p) {
                    NodeKind::PropertyDefinition { name, .. } => *name,
                    NodeKind::MethodDefinition { name, .. } => *name,
                    _ => unreachable!(),
                };
                let NodeKind::ComputedPropertyName { expression } = self.ast.kind(name) else {
                    unreachable!();
                };
                self.text(*expression).to_string()
            })
            .collect();
        if keys.is_empty() {
            return None;
        }
        let literal = self.stringify(id);
        Some(format!("_runtime.computed({literal}, {})", keys.join(", ")))
    }

    /// A destructuring catch parameter: bind a temp, destructure at the
    /// top of the handler block.
    pub(crate) fn rewrite_catch(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::CatchClause { param, body } = self.ast.kind(id).clone() else {
            return None;
        };
        if matches!(self.ast.kind(param), NodeKind::Identifier { .. }) {
            return None;
        }
        let t = self.temp();
        let mut pairs = Vec::new();
        self.destructure_binding_into(param, &t, &mut pairs);
        let prefix = format!("var {}; ", Self::render_pairs(&pairs));
        let body_text = Self::insert_into_body(self.text(body), &prefix);
        Some(format!("catch ({t}) {body_text}"))
    }
}
