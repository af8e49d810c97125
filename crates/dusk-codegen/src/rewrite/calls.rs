//! Call-site desugar: argument spread, `new` with spread, array spread,
//! and `super` invocation forms.

use dusk_parser::ast::{NodeId, NodeKind};

use super::Rewriter;

impl Rewriter<'_> {
    fn is_spread(&self, id: NodeId) -> bool {
        matches!(self.ast.kind(id), NodeKind::SpreadExpression { .. })
    }

    /// Build the argument array for an `.apply` call: fixed runs become
    /// array literals, spreads contribute their expressions, and the whole
    /// thing is one `concat` chain starting from an array literal.
    fn spread_args_array(&self, arguments: &[NodeId], leading: Option<&str>) -> String {
        let mut segments: Vec<(bool, String)> = Vec::new();
        let mut run: Vec<String> = leading.map(|l| vec![l.to_string()]).unwrap_or_default();
        for argument in arguments {
            match self.ast.kind(*argument) {
                NodeKind::SpreadExpression { expression } => {
                    if !run.is_empty() {
                        segments.push((false, run.join(", ")));
                        run = Vec::new();
                    }
                    segments.push((true, self.text(*expression).to_string()));
                }
                _ => run.push(self.text(*argument).to_string()),
            }
        }
        if !run.is_empty() {
            segments.push((false, run.join(", ")));
        }

        let mut iter = segments.into_iter().peekable();
        let head = match iter.peek() {
            Some((false, _)) => {
                let (_, items) = iter.next().unwrap();
                format!("[{items}]")
            }
            _ => "[]".to_string(),
        };
        let rest: Vec<String> = iter
            .map(|(spread, text)| if spread { text } else { format!("[{text}]") })
            .collect();
        if rest.is_empty() {
            head
        } else {
            format!("{head}.concat({})", rest.join(", "))
        }
    }

    /// The method name `super(...)` forwards to: the constructor inside a
    /// constructor, the same-named method elsewhere.
    fn enclosing_method_key(&self, id: NodeId) -> String {
        for anc in self.ast.ancestors(id) {
            if let NodeKind::MethodDefinition { name, .. } = self.ast.kind(anc) {
                return self.raw(*name).to_string();
            }
        }
        "constructor".to_string()
    }

    pub(crate) fn rewrite_call(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::CallExpression { callee, arguments } = self.ast.kind(id).clone() else {
            return None;
        };
        let has_spread = arguments.iter().any(|a| self.is_spread(*a));
        let super_call = matches!(self.ast.kind(callee), NodeKind::SuperExpression);
        let super_member = matches!(
            self.ast.kind(callee),
            NodeKind::MemberExpression { object, .. }
                if matches!(self.ast.kind(*object), NodeKind::SuperExpression)
        );

        if !has_spread && !super_call && !super_member {
            return None;
        }

        // `super(args)` / `super.m(args)` invoke through the parent
        // prototype with the current `this`.
        if super_call || super_member {
            let target = if super_call {
                format!("__super.{}", self.enclosing_method_key(id))
            } else {
                self.text(callee).to_string()
            };
            if has_spread {
                return Some(format!(
                    "{target}.apply(this, {})",
                    self.spread_args_array(&arguments, None)
                ));
            }
            let args: Vec<&str> = arguments.iter().map(|a| self.text(*a)).collect();
            return Some(if args.is_empty() {
                format!("{target}.call(this)")
            } else {
                format!("{target}.call(this, {})", args.join(", "))
            });
        }

        // Spread through `.apply`; a member callee caches its receiver so
        // the method is invoked with the right `this` and the object
        // expression evaluates once.
        match self.ast.kind(callee).clone() {
            NodeKind::MemberExpression {
                object,
                property,
                computed,
            } => {
                let t = self.lift_temp(id);
                let member = if computed {
                    format!("[{}]", self.text(property))
                } else {
                    format!(".{}", self.text(property))
                };
                Some(format!(
                    "({t} = {}){member}.apply({t}, {})",
                    self.text(object),
                    self.spread_args_array(&arguments, None)
                ))
            }
            _ => Some(format!(
                "{}.apply(void 0, {})",
                self.text(callee),
                self.spread_args_array(&arguments, None)
            )),
        }
    }

    /// `new C(...xs)` binds the constructor over the spread arguments.
    pub(crate) fn rewrite_new(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::NewExpression { callee, arguments } = self.ast.kind(id).clone() else {
            return None;
        };
        if !arguments.iter().any(|a| self.is_spread(*a)) {
            return None;
        }
        let array = self.spread_args_array(&arguments, Some("void 0"));
        Some(format!(
            "new (Function.prototype.bind.apply({}, {array}))()",
            self.text(callee)
        ))
    }

    /// Array literals containing spread build through the runtime spread
    /// builder: `.s(...)` for fixed runs, `.i(...)` for iterables, `.a`
    /// for the final array.
    pub(crate) fn rewrite_array_spread(&mut self, id: NodeId) -> Option<String> {
        let NodeKind::ArrayExpression { elements } = self.ast.kind(id).clone() else {
            return None;
        };
        let has_spread = elements
            .iter()
            .flatten()
            .any(|e| self.is_spread(*e));
        if !has_spread {
            return None;
        }
        let mut out = String::from("_runtime.spread()");
        let mut run: Vec<String> = Vec::new();
        for element in &elements {
            match element {
                None => run.push("void 0".to_string()),
                Some(element) => match self.ast.kind(*element) {
                    NodeKind::SpreadExpression { expression } => {
                        if !run.is_empty() {
                            out.push_str(&format!(".s({})", run.join(", ")));
                            run.clear();
                        }
                        out.push_str(&format!(".i({})", self.text(*expression)));
                    }
                    _ => run.push(self.text(*element).to_string()),
                },
            }
        }
        if !run.is_empty() {
            out.push_str(&format!(".s({})", run.join(", ")));
        }
        out.push_str(".a");
        Some(out)
    }
}
