//! Whole-tree assertions
//!
//!     Each helper walks the entire module and reports every offending node at once, with its
//!     kind, name and source line, instead of stopping at the first.

use crate::shade::ast::{Module, NodeId, Parent, ValidationState, Visitor};
use crate::shade::parsing::parse;

fn describe(module: &Module, id: NodeId) -> String {
    let kind = module.kind(id);
    let line = module.node(id).range().start.line + 1;
    match kind.name() {
        Some(name) => format!("{} `{}` (line {})", kind.label(), name, line),
        None => format!("{} (line {})", kind.label(), line),
    }
}

/// Every node, build-ins included, has finished validation.
pub fn assert_fully_validated(module: &Module) {
    let pending: Vec<String> = module
        .ids()
        .filter(|id| module.state(*id) != ValidationState::Validated)
        .map(|id| describe(module, id))
        .collect();
    assert!(
        pending.is_empty(),
        "{} nodes are not validated:\n  {}",
        pending.len(),
        pending.join("\n  ")
    );
}

struct ParentCheck {
    stack: Vec<NodeId>,
    problems: Vec<String>,
}

impl Visitor for ParentCheck {
    fn visit(&mut self, module: &Module, id: NodeId, _depth: usize) {
        let expected = match self.stack.last() {
            Some(parent) => Parent::Node(*parent),
            None => Parent::Module,
        };
        if module.parent(id) != Some(expected) {
            self.problems.push(format!(
                "{}: parent {:?}, expected {:?}",
                describe(module, id),
                module.parent(id),
                expected
            ));
        }
        self.stack.push(id);
    }

    fn leave(&mut self, _module: &Module, _id: NodeId, _depth: usize) {
        self.stack.pop();
    }
}

/// Every declared node's parent is the node it is a child of, and top-level declarations
/// belong to the module.
pub fn assert_parents(module: &Module) {
    let mut check = ParentCheck {
        stack: Vec::new(),
        problems: Vec::new(),
    };
    module.walk(&mut check);
    assert!(
        check.problems.is_empty(),
        "wrong parents:\n  {}",
        check.problems.join("\n  ")
    );
}

/// `source` fails to compile with an error of `kind`, e.g. `TypeMismatchError`.
pub fn assert_error_kind(source: &str, kind: &str) {
    match parse(source) {
        Ok(_) => panic!("expected {}, but the source compiled:\n{}", kind, source),
        Err(error) => assert_eq!(
            error.kind(),
            kind,
            "unexpected error for:\n{}\n{}",
            source,
            error
        ),
    }
}
