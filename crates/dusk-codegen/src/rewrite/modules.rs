//! Module-form desugar: imports bind from `_M<n>` loader variables,
//! exports populate the enclosing export map, and nested module
//! declarations become immediately-invoked wrappers over a fresh
//! `exports` object.

use dusk_common::token::{keyword_from_str, strict_keyword_from_str};
use dusk_parser::ast::{NodeId, NodeKind};

use super::Rewriter;
use crate::output::{export_member, string_literal};

impl Rewriter<'_> {
    /// The decoded URL of a module path literal.
    fn string_value(&self, id: NodeId) -> String {
        match self.ast.kind(id) {
            NodeKind::StringLiteral { value } => value.clone(),
            _ => self.raw(id).to_string(),
        }
    }

    fn ident_name(&self, id: NodeId) -> String {
        match self.ast.kind(id) {
            NodeKind::Identifier { name, .. } => name.clone(),
            _ => self.raw(id).to_string(),
        }
    }

    /// `_M0.name`, or bracket indexing when the name is a reserved word.
    fn module_member(&self, module: &str, name: &str) -> String {
        if keyword_from_str(name).is_some() || strict_keyword_from_str(name).is_some() {
            format!("{module}[{}]", string_literal(name))
        } else {
            format!("{module}.{name}")
        }
    }

    pub(crate) fn rewrite_module_item(&mut self, id: NodeId) -> Option<String> {
        match self.ast.kind(id).clone() {
            NodeKind::ImportDeclaration { specifiers, from } => {
                let url = self.string_value(from);
                let module = self.add_import(&url);
                let mut bindings = Vec::new();
                for specifier in specifiers {
                    let NodeKind::ImportSpecifier { imported, local } =
                        self.ast.kind(specifier).clone()
                    else {
                        continue;
                    };
                    let target = self.ident_name(local.unwrap_or(imported));
                    let source = self.module_member(&module, &self.ident_name(imported));
                    bindings.push(format!("{target} = {source}"));
                }
                Some(if bindings.is_empty() {
                    String::new()
                } else {
                    format!("var {};", bindings.join(", "))
                })
            }
            NodeKind::ImportDefaultDeclaration { name, from } => {
                let url = self.string_value(from);
                let module = self.add_import(&url);
                Some(format!(
                    "var {} = {module}[\"default\"];",
                    self.ident_name(name)
                ))
            }
            NodeKind::ModuleImport { name, from } => {
                let url = self.string_value(from);
                let module = self.add_import(&url);
                Some(format!("var {} = {module};", self.ident_name(name)))
            }
            NodeKind::ModuleAlias { name, path } => Some(format!(
                "var {} = {};",
                self.ident_name(name),
                self.text(path)
            )),
            NodeKind::ModuleDeclaration { name, body } => {
                let wrapper = self.module_wrapper(body);
                Some(format!("var {} = {wrapper}", self.ident_name(name)))
            }
            NodeKind::ModuleRegistration { body, .. } => Some(self.module_wrapper(body)),
            NodeKind::ExportDeclaration { binding } => self.rewrite_export(id, binding),
            _ => None,
        }
    }

    /// The IIFE for a nested module body, closing over a fresh `exports`
    /// object and returning it. Pops this module's export map.
    fn module_wrapper(&mut self, body: NodeId) -> String {
        let exports = self
            .export_stack
            .pop()
            .expect("module declaration pushed an export map");

        let mut prefix = String::new();
        if !self.strict_before() {
            prefix.push_str("\"use strict\"; ");
        }
        if let Some(info) = self.fn_info.get(&body) {
            if info.this_binding {
                prefix.push_str("var __this = this; ");
            }
            if !info.temps.is_empty() {
                prefix.push_str(&format!("var {}; ", info.temps.join(", ")));
            }
        }

        let inner = Self::body_inner(self.text(body)).to_string();

        let mut trailer = String::new();
        for (name, expression) in &exports {
            trailer.push_str(&format!(" {}{expression};", export_member(name)));
        }

        format!(
            "(function(exports) {{ {prefix}{inner}{trailer} return exports; }}).call(this, {{}});"
        )
    }

    fn rewrite_export(&mut self, id: NodeId, binding: NodeId) -> Option<String> {
        // The region between the binding and the end of the export
        // statement (the semicolon, if present in the span).
        let tail = {
            let binding_end = self.ast.span(binding).end as usize;
            let end = self.ast.span(id).end as usize;
            self.source[binding_end..end].to_string()
        };

        match self.ast.kind(binding).clone() {
            NodeKind::ExportSpecifierSet {
                specifiers,
                star,
                from,
            } => {
                if star {
                    let url = self.string_value(from.expect("star export carries a source"));
                    let module = self.add_import(&url);
                    return Some(format!(
                        "Object.keys({module}).forEach(function(k) {{ exports[k] = {module}[k]; }});"
                    ));
                }
                let module = from.map(|f| {
                    let url = self.string_value(f);
                    self.add_import(&url)
                });
                for specifier in specifiers {
                    let NodeKind::ExportSpecifier { local, exported } =
                        self.ast.kind(specifier).clone()
                    else {
                        continue;
                    };
                    let local_name = self.ident_name(local);
                    let export_name = exported
                        .map(|e| self.ident_name(e))
                        .unwrap_or_else(|| local_name.clone());
                    let expression = match &module {
                        Some(module) => self.module_member(module, &local_name),
                        None => local_name,
                    };
                    self.add_export(export_name, expression);
                }
                Some(String::new())
            }
            NodeKind::VariableDeclaration { .. } => {
                for name in self.collect_binding_names(binding) {
                    self.add_export(name.clone(), name);
                }
                Some(format!("{}{tail}", self.text(binding)))
            }
            NodeKind::FunctionDeclaration { name, .. }
            | NodeKind::ClassDeclaration { name, .. }
            | NodeKind::ModuleDeclaration { name, .. } => {
                let name = self.ident_name(name);
                self.add_export(name.clone(), name);
                Some(format!("{}{tail}", self.text(binding)))
            }
            _ => Some(format!("{}{tail}", self.text(binding))),
        }
    }
}
