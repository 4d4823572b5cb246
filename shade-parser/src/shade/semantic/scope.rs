//! Variable lookup
//!
//!     A name is looked up from the referencing node outwards:
//!
//!         1. each enclosing block, innermost first, considering only the declarations that
//!            end before the reference starts;
//!         2. the initializer of each enclosing `for` statement;
//!         3. the parameters of the enclosing function;
//!         4. the module's global variables.
//!
//!     The first hit wins, so an inner declaration shadows an outer one. Because of the
//!     ordering rule in (1), `let x = x + 1;` in a nested block reads the outer `x`.

use crate::shade::ast::{Module, NodeId, NodeKind};

impl Module {
    /// The variable declaration or parameter visible as `name` from `from`.
    pub fn resolve_variable(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let start = self.node(from).range().span.start;
        let visible = |declaration: NodeId| self.node(declaration).range().span.end <= start;
        for ancestor in self.ancestors(from) {
            match self.kind(ancestor) {
                NodeKind::BlockStatement { scope, .. } => {
                    if let Some(declaration) = scope.get(name) {
                        if visible(*declaration) {
                            return Some(*declaration);
                        }
                    }
                }
                NodeKind::ForStatement {
                    init: Some(init), ..
                } => {
                    if self.kind(*init).name() == Some(name) && visible(*init) {
                        return Some(*init);
                    }
                }
                NodeKind::FunctionDeclaration { parameters, .. } => {
                    let parameter = parameters
                        .iter()
                        .find(|parameter| self.kind(**parameter).name() == Some(name));
                    if let Some(parameter) = parameter {
                        return Some(*parameter);
                    }
                }
                _ => {}
            }
        }
        self.resolve_global(name)
    }
}
