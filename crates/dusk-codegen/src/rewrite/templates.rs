//! Template-literal desugar: plain templates become string concatenation
//! over the cooked pieces; tagged templates build a call site through the
//! runtime helper.

use dusk_parser::ast::{NodeId, NodeKind};

use super::Rewriter;
use crate::output::string_literal;

impl Rewriter<'_> {
    /// `` `a${b}c` `` becomes `"a" + (b) + "c"`. The head literal is
    /// always emitted (it anchors string conversion); empty interior and
    /// tail pieces are dropped.
    pub(crate) fn rewrite_template(&mut self, id: NodeId) -> String {
        let NodeKind::TemplateExpression { parts } = self.ast.kind(id).clone() else {
            unreachable!("rewrite_template is dispatched on TemplateExpression");
        };
        let mut out = String::new();
        for (index, part) in parts.iter().enumerate() {
            match self.ast.kind(*part) {
                NodeKind::Template { value, .. } => {
                    if index == 0 {
                        out.push_str(&string_literal(value));
                    } else if !value.is_empty() {
                        out.push_str(&format!(" + {}", string_literal(value)));
                    }
                }
                _ => {
                    out.push_str(&format!(" + ({})", self.text(*part)));
                }
            }
        }
        out
    }

    /// ``tag`a${b}c` `` becomes
    /// `tag(_runtime.templateSite(["a", "c"]), b)`, with the raw-part
    /// array appended only when some piece contains an escape.
    pub(crate) fn rewrite_tagged_template(&mut self, id: NodeId) -> String {
        let NodeKind::TaggedTemplateExpression { tag, template } = self.ast.kind(id).clone()
        else {
            unreachable!("rewrite_tagged_template is dispatched on TaggedTemplateExpression");
        };
        let NodeKind::TemplateExpression { parts } = self.ast.kind(template).clone() else {
            unreachable!("tagged template wraps a TemplateExpression");
        };

        let mut cooked = Vec::new();
        let mut raw = Vec::new();
        let mut subs = Vec::new();
        let mut raw_differs = false;
        for part in &parts {
            match self.ast.kind(*part) {
                NodeKind::Template { value, raw: raw_text } => {
                    cooked.push(string_literal(value));
                    raw.push(string_literal(raw_text));
                    if value != raw_text {
                        raw_differs = true;
                    }
                }
                _ => subs.push(self.text(*part).to_string()),
            }
        }

        let mut site = format!("_runtime.templateSite([{}]", cooked.join(", "));
        if raw_differs {
            site.push_str(&format!(", [{}]", raw.join(", ")));
        }
        site.push(')');

        let mut out = format!("{}({site}", self.text(tag));
        for sub in subs {
            out.push_str(&format!(", {sub}"));
        }
        out.push(')');
        out
    }
}
