//! The rewriter: a single depth-first pass over the parsed tree.
//!
//! Entering a node may push context (strictness, a fresh export map);
//! after all children have been rewritten, the node's post-hook may return
//! a replacement string. When it returns nothing the default rendering
//! stitches the children's output into the original inter-child text, so
//! untouched constructs flow through byte-for-byte. Every produced region
//! is then padded to its source line height, which keeps downstream line
//! numbers stable.

mod calls;
mod classes;
mod destructure;
mod functions;
mod loops;
mod modules;
mod templates;

use dusk_common::span::LineIndex;
use dusk_parser::ast::{Ast, NodeId, NodeKind};
use dusk_parser::ParseResult;
use rustc_hash::FxHashMap;

use crate::linesync::sync_newlines;
use crate::output;
use crate::Options;

/// Per-function rewrite state: temporaries to declare at the top of the
/// body, and whether the function must capture `this` for nested arrows.
#[derive(Default)]
pub(crate) struct FnInfo {
    pub temps: Vec<String>,
    pub this_binding: bool,
}

pub(crate) struct Rewriter<'a> {
    pub(crate) source: &'a str,
    pub(crate) ast: &'a Ast,
    pub(crate) lines: &'a LineIndex,
    pub(crate) root: NodeId,
    texts: Vec<Option<String>>,
    pub(crate) uid: u32,
    strict_stack: Vec<bool>,
    pub(crate) export_stack: Vec<Vec<(String, String)>>,
    imports: Vec<(String, String)>,
    import_index: FxHashMap<String, usize>,
    pub(crate) dependencies: Vec<String>,
    pub(crate) fn_info: FxHashMap<NodeId, FnInfo>,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(source: &'a str, parse: &'a ParseResult) -> Self {
        Self::with_uid(source, parse, seed_uid(source))
    }

    /// Seeded constructor for nested rewrites (comprehension snippets) so
    /// temporaries stay unique across the outer and inner passes.
    pub(crate) fn with_uid(source: &'a str, parse: &'a ParseResult, uid: u32) -> Self {
        Self {
            source,
            ast: &parse.ast,
            lines: &parse.lines,
            root: parse.root,
            texts: vec![None; parse.ast.len()],
            uid,
            strict_stack: vec![false],
            export_stack: vec![Vec::new()],
            imports: Vec::new(),
            import_index: FxHashMap::default(),
            dependencies: Vec::new(),
            fn_info: FxHashMap::default(),
        }
    }

    /// Rewrite the whole tree and assemble the final output.
    pub(crate) fn run(mut self, options: &Options) -> (String, Vec<String>) {
        self.visit(self.root);
        let mut body = self.root_prefix() + self.text(self.root);
        if matches!(self.ast.kind(self.root), NodeKind::Module { .. }) {
            let header = output::import_header(
                &self.imports,
                options.runtime_imports,
                options.polyfill.is_some(),
            );
            let trailer = output::export_trailer(&self.export_stack[0]);
            // Module code is strict; the host context around the emitted
            // text is not, so the directive is re-established up front.
            body = format!("\"use strict\"; {header}{body}{trailer}");
        }
        (body, self.dependencies)
    }

    /// Rewrite a synthesized snippet: no headers, no trailers. Returns the
    /// rewritten text and the advanced uid counter.
    pub(crate) fn run_snippet(mut self) -> (String, u32) {
        self.visit(self.root);
        let text = self.root_prefix() + self.text(self.root);
        (text, self.uid)
    }

    /// Temporaries and `this` capture attached to the program root.
    fn root_prefix(&self) -> String {
        let mut prefix = String::new();
        if let Some(info) = self.fn_info.get(&self.root) {
            if info.this_binding {
                prefix.push_str("var __this = this; ");
            }
            if !info.temps.is_empty() {
                prefix.push_str(&format!("var {}; ", info.temps.join(", ")));
            }
        }
        prefix
    }

    // ── Traversal ──────────────────────────────────────────────────────

    fn visit(&mut self, id: NodeId) {
        self.begin(id);
        for child in self.ast.children(id) {
            self.visit(child);
        }
        let text = match self.end(id) {
            Some(replacement) => replacement,
            None => self.stringify(id),
        };
        let text = sync_newlines(self.ast.span(id), self.lines, text);
        self.texts[id.index()] = Some(text);
    }

    /// Default rendering: the original source for this node's span, with
    /// each child's span replaced by the child's rewritten text.
    pub(crate) fn stringify(&self, id: NodeId) -> String {
        let span = self.ast.span(id);
        let mut out = String::new();
        let mut pos = span.start;
        for child in self.ast.children(id) {
            let child_span = self.ast.span(child);
            if child_span.start < pos {
                continue;
            }
            out.push_str(&self.source[pos as usize..child_span.start as usize]);
            out.push_str(self.text(child));
            pos = child_span.end;
        }
        out.push_str(&self.source[pos as usize..span.end as usize]);
        out
    }

    // ── Hooks ──────────────────────────────────────────────────────────

    fn begin(&mut self, id: NodeId) {
        match self.ast.kind(id) {
            NodeKind::Module { .. }
            | NodeKind::ClassDeclaration { .. }
            | NodeKind::ClassExpression { .. } => {
                self.strict_stack.push(true);
            }
            NodeKind::ModuleDeclaration { .. } | NodeKind::ModuleRegistration { .. } => {
                self.strict_stack.push(true);
                self.export_stack.push(Vec::new());
            }
            NodeKind::FunctionDeclaration { body, .. }
            | NodeKind::FunctionExpression { body, .. }
            | NodeKind::MethodDefinition { body, .. }
            | NodeKind::ArrowFunction { body, .. } => {
                let strict = self.is_strict() || self.has_use_strict(*body);
                self.strict_stack.push(strict);
            }
            _ => {}
        }
    }

    fn end(&mut self, id: NodeId) -> Option<String> {
        let out = self.end_inner(id);
        match self.ast.kind(id) {
            NodeKind::Module { .. }
            | NodeKind::ModuleDeclaration { .. }
            | NodeKind::ModuleRegistration { .. }
            | NodeKind::ClassDeclaration { .. }
            | NodeKind::ClassExpression { .. }
            | NodeKind::FunctionDeclaration { .. }
            | NodeKind::FunctionExpression { .. }
            | NodeKind::MethodDefinition { .. }
            | NodeKind::ArrowFunction { .. } => {
                self.strict_stack.pop();
            }
            _ => {}
        }
        out
    }

    fn end_inner(&mut self, id: NodeId) -> Option<String> {
        match self.ast.kind(id) {
            NodeKind::SuperExpression => Some("__super".to_string()),
            NodeKind::ThisExpression => self.arrow_this(id),
            NodeKind::UnaryExpression { op, expression } if op == "await" => {
                Some(format!("(yield {})", self.text(*expression)))
            }
            NodeKind::VariableDeclaration { .. } => self.rewrite_variable_declaration(id),
            NodeKind::AssignmentExpression { .. } => self.rewrite_assignment(id),
            NodeKind::FunctionDeclaration { .. } | NodeKind::FunctionExpression { .. } => {
                self.rewrite_function(id)
            }
            NodeKind::MethodDefinition { .. } => self.rewrite_method(id),
            NodeKind::ArrowFunction { .. } => Some(self.rewrite_arrow(id)),
            NodeKind::ClassDeclaration { .. } | NodeKind::ClassExpression { .. } => {
                Some(self.rewrite_class(id))
            }
            NodeKind::TemplateExpression { .. } => Some(self.rewrite_template(id)),
            NodeKind::TaggedTemplateExpression { .. } => Some(self.rewrite_tagged_template(id)),
            NodeKind::CallExpression { .. } => self.rewrite_call(id),
            NodeKind::NewExpression { .. } => self.rewrite_new(id),
            NodeKind::ArrayExpression { .. } => self.rewrite_array_spread(id),
            NodeKind::ObjectLiteral { .. } => self.rewrite_object(id),
            NodeKind::PropertyDefinition { .. } => self.rewrite_property(id),
            NodeKind::ForOfStatement { .. } => Some(self.rewrite_for_of(id)),
            NodeKind::ArrayComprehension { .. } | NodeKind::GeneratorComprehension { .. } => {
                Some(self.rewrite_comprehension(id))
            }
            NodeKind::CatchClause { .. } => self.rewrite_catch(id),
            NodeKind::ImportDeclaration { .. }
            | NodeKind::ImportDefaultDeclaration { .. }
            | NodeKind::ModuleImport { .. }
            | NodeKind::ExportDeclaration { .. }
            | NodeKind::ModuleDeclaration { .. }
            | NodeKind::ModuleRegistration { .. }
            | NodeKind::ModuleAlias { .. } => self.rewrite_module_item(id),
            _ => None,
        }
    }

    // ── Shared state helpers ───────────────────────────────────────────

    /// Rewritten text of a node. Valid once the node has been visited.
    pub(crate) fn text(&self, id: NodeId) -> &str {
        self.texts[id.index()]
            .as_deref()
            .expect("node must be rewritten before its text is read")
    }

    /// Raw source slice of a node.
    pub(crate) fn raw(&self, id: NodeId) -> &str {
        let span = self.ast.span(id);
        &self.source[span.start as usize..span.end as usize]
    }

    /// Fresh hygienic temporary name.
    pub(crate) fn temp(&mut self) -> String {
        let n = self.uid;
        self.uid += 1;
        format!("__${n}")
    }

    /// Fresh temporary declared at the top of the function enclosing `at`.
    pub(crate) fn lift_temp(&mut self, at: NodeId) -> String {
        let name = self.temp();
        let home = self.enclosing_fn(at);
        self.fn_info.entry(home).or_default().temps.push(name.clone());
        name
    }

    /// The function-like node whose body owns declarations made at `at`:
    /// the nearest enclosing function, method, arrow, or module body, or
    /// the program root.
    pub(crate) fn enclosing_fn(&self, at: NodeId) -> NodeId {
        for anc in self.ast.ancestors(at) {
            if matches!(
                self.ast.kind(anc),
                NodeKind::ArrowFunction { .. }
                    | NodeKind::FunctionDeclaration { .. }
                    | NodeKind::FunctionExpression { .. }
                    | NodeKind::MethodDefinition { .. }
                    | NodeKind::ModuleBody { .. }
            ) {
                return anc;
            }
        }
        self.root
    }

    /// Handle `this` inside arrow functions: flag the nearest non-arrow
    /// function-like ancestor to capture `this` as `__this`, and rewrite
    /// the occurrence. `this` outside arrows flows through untouched.
    fn arrow_this(&mut self, id: NodeId) -> Option<String> {
        let mut inside_arrow = false;
        let mut home = self.root;
        for anc in self.ast.ancestors(id) {
            match self.ast.kind(anc) {
                NodeKind::ArrowFunction { .. } => inside_arrow = true,
                NodeKind::FunctionDeclaration { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::MethodDefinition { .. }
                | NodeKind::ModuleBody { .. } => {
                    home = anc;
                    break;
                }
                _ => {}
            }
        }
        if !inside_arrow {
            return None;
        }
        self.fn_info.entry(home).or_default().this_binding = true;
        Some("__this".to_string())
    }

    pub(crate) fn is_strict(&self) -> bool {
        *self.strict_stack.last().expect("strict stack is never empty")
    }

    /// Strictness of the region surrounding the node currently ending
    /// (beneath its own pushed frame).
    pub(crate) fn strict_before(&self) -> bool {
        let n = self.strict_stack.len();
        if n >= 2 {
            self.strict_stack[n - 2]
        } else {
            false
        }
    }

    /// Whether a function body opens with a `"use strict"` directive.
    fn has_use_strict(&self, body: NodeId) -> bool {
        let NodeKind::FunctionBody { statements } = self.ast.kind(body) else {
            return false;
        };
        for statement in statements {
            let NodeKind::ExpressionStatement { expression } = self.ast.kind(*statement) else {
                return false;
            };
            let NodeKind::StringLiteral { .. } = self.ast.kind(*expression) else {
                return false;
            };
            let span = self.ast.span(*expression);
            if &self.source[span.start as usize + 1..span.end as usize - 1] == "use strict" {
                return true;
            }
        }
        false
    }

    /// Record an export in the innermost export map.
    pub(crate) fn add_export(&mut self, name: String, expression: String) {
        self.export_stack
            .last_mut()
            .expect("export stack is never empty")
            .push((name, expression));
    }

    /// Register an import URL, de-duplicated, returning its binding.
    pub(crate) fn add_import(&mut self, url: &str) -> String {
        if let Some(&index) = self.import_index.get(url) {
            return self.imports[index].0.clone();
        }
        let ident = format!("_M{}", self.imports.len());
        self.import_index.insert(url.to_string(), self.imports.len());
        self.imports.push((ident.clone(), url.to_string()));
        self.dependencies.push(url.to_string());
        ident
    }

    /// The inside of a braced body text, without the braces.
    pub(crate) fn body_inner(text: &str) -> &str {
        let t = text.trim_start();
        debug_assert!(t.starts_with('{') && text.trim_end().ends_with('}'));
        let open = text.find('{').unwrap_or(0);
        let close = text.rfind('}').unwrap_or(text.len());
        &text[open + 1..close]
    }

    /// Insert prefix statements right after the opening brace of a body.
    pub(crate) fn insert_into_body(body: &str, prefix: &str) -> String {
        if prefix.is_empty() {
            return body.to_string();
        }
        match body.find('{') {
            Some(open) => format!("{}{{ {}{}", &body[..open], prefix, &body[open + 1..]),
            None => format!("{{ {prefix}{body} }}"),
        }
    }
}

/// Start the temporary counter above any `__$<n>` already present in user
/// code, so synthesized names never collide.
fn seed_uid(source: &str) -> u32 {
    let mut max: u32 = 0;
    let bytes = source.as_bytes();
    let mut i = 0;
    while let Some(pos) = source[i..].find("__$") {
        let digits_at = i + pos + 3;
        let mut end = digits_at;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > digits_at {
            if let Ok(n) = source[digits_at..end].parse::<u32>() {
                max = max.max(n.saturating_add(1));
            }
        }
        i = digits_at;
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_uid_avoids_user_temporaries() {
        assert_eq!(seed_uid("var x = 1;"), 0);
        assert_eq!(seed_uid("var __$4 = 1;"), 5);
        assert_eq!(seed_uid("__$1 + __$9"), 10);
        assert_eq!(seed_uid("__$ no digits"), 0);
    }

    #[test]
    fn insert_into_body_places_prefix_after_brace() {
        assert_eq!(
            Rewriter::insert_into_body("{ return 1; }", "var a; "),
            "{ var a;  return 1; }"
        );
        assert_eq!(Rewriter::insert_into_body("{ x }", ""), "{ x }");
    }

    #[test]
    fn body_inner_strips_braces() {
        assert_eq!(Rewriter::body_inner("{ a; b; }"), " a; b; ");
        assert_eq!(Rewriter::body_inner("{}"), "");
    }
}
