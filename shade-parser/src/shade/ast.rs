//! Syntax tree for the shade language
//!
//!     The tree is an arena owned by the [`Module`]. Nodes refer to their children and to their
//!     parent by [`NodeId`]; the parent link is set once, when the parent is built, and can
//!     never be changed afterwards.
//!
//! Lifecycle
//!
//!     Every node goes through the same three steps:
//!
//!         1. Built: created from structure data after all of its children.
//!         2. Attached: the parent link is set.
//!         3. Validated: local invariants are checked and the derived properties (constness,
//!            creation-fixedness, storage, resolved type) are stored on the node.
//!
//!     Validation runs children first and at most once per node. Asking for the properties of
//!     a node that is not validated yet is a structural error. See the
//!     [semantic](crate::shade::semantic) module for the validation rules.
//!
//! Node kinds
//!
//!     All kinds live in the closed [`NodeKind`] enum: declarations, the type-declaration node,
//!     expressions and statements. Operators and declaration keywords are in
//!     [operators](operators).

pub mod elements;
pub mod module;
pub mod node;
pub mod operators;
pub mod traits;

pub use elements::{
    BuildInSignature, EnumInitializer, EnumValue, NodeCategory, NodeKind, TemplateItem,
};
pub use module::Module;
pub use node::{AbstractKind, Node, NodeId, NodeProperties, Parent, ValidationState};
pub use traits::Visitor;
