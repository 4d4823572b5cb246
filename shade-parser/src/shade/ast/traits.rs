//! Tree traversal
//!
//! The [`Visitor`] trait walks the declared part of a module depth first, in source order.
//! Build-in nodes are never visited. Default implementations are empty, so you only need to
//! override the methods you care about.
//!
//! ```ignore
//! struct Counter(usize);
//!
//! impl Visitor for Counter {
//!     fn visit(&mut self, _module: &Module, _id: NodeId, _depth: usize) {
//!         self.0 += 1;
//!     }
//! }
//! ```

use super::module::Module;
use super::node::NodeId;

pub trait Visitor {
    fn visit(&mut self, _module: &Module, _id: NodeId, _depth: usize) {}
    fn leave(&mut self, _module: &Module, _id: NodeId, _depth: usize) {}
}

impl Module {
    /// Walk every top-level declaration and its descendants.
    pub fn walk<V: Visitor>(&self, visitor: &mut V) {
        for id in self.declarations() {
            self.walk_from(*id, 0, visitor);
        }
    }

    /// Walk the subtree rooted at `id`.
    pub fn walk_from<V: Visitor>(&self, id: NodeId, depth: usize, visitor: &mut V) {
        if self.node(id).is_build_in() {
            return;
        }
        visitor.visit(self, id, depth);
        for child in self.children(id) {
            self.walk_from(child, depth + 1, visitor);
        }
        visitor.leave(self, id, depth);
    }
}
