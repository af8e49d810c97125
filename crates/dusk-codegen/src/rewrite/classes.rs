//! Class desugar: `_runtime.class(base?, instanceDef, staticDef?)`.
//!
//! Methods become properties of the object the definition function
//! returns; the definition receives `__super` so `super` forms resolve
//! against the parent prototype. Static members group into a second
//! definition function. A missing constructor is synthesized, delegating
//! to the base constructor when one exists.

use dusk_parser::ast::{NodeId, NodeKind};

use super::Rewriter;

impl Rewriter<'_> {
    pub(crate) fn rewrite_class(&mut self, id: NodeId) -> String {
        let (name, base, body, is_declaration) = match self.ast.kind(id).clone() {
            NodeKind::ClassDeclaration { name, base, body } => (Some(name), base, body, true),
            NodeKind::ClassExpression { name, base, body } => (name, base, body, false),
            _ => unreachable!("rewrite_class is dispatched on class nodes"),
        };
        let NodeKind::ClassBody { elements } = self.ast.kind(body).clone() else {
            unreachable!("class body is a ClassBody");
        };

        let class_name = name.map(|n| self.text(n).to_string()).unwrap_or_default();

        let mut instance_parts = Vec::new();
        let mut static_parts = Vec::new();
        let mut has_constructor = false;
        for element in &elements {
            let NodeKind::ClassElement { is_static, method } = self.ast.kind(*element).clone()
            else {
                continue;
            };
            let text = self.text(method).to_string();
            if is_static {
                static_parts.push(text);
            } else {
                if let NodeKind::MethodDefinition { name, .. } = self.ast.kind(method) {
                    if self.raw(*name) == "constructor" {
                        has_constructor = true;
                    }
                }
                instance_parts.push(text);
            }
        }

        if !has_constructor {
            let ctor = if base.is_some() {
                format!(
                    "constructor: function {class_name}() {{ var c = __super.constructor; if (c) return c.apply(this, arguments); }}"
                )
            } else {
                format!("constructor: function {class_name}() {{}}")
            };
            instance_parts.insert(0, ctor);
        }

        let def = format!(
            "function(__super) {{ return {{ {} }}; }}",
            instance_parts.join(", ")
        );

        let mut args = Vec::new();
        if let Some(base) = base {
            args.push(self.text(base).to_string());
        }
        args.push(def);
        if !static_parts.is_empty() {
            args.push(format!(
                "function(__super) {{ return {{ {} }}; }}",
                static_parts.join(", ")
            ));
        }

        let call = format!("_runtime.class({})", args.join(", "));
        if is_declaration {
            format!("var {class_name} = {call};")
        } else {
            call
        }
    }
}
