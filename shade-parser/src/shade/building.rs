//! Building the syntax tree from structure data, and back
//!
//!     [`AstTreeBuilder`] applies a structure data record to a module: children are built
//!     first, then the node itself, then the children are attached to it. Top-level records
//!     are declared in the module namespaces as they are applied, and the build-in functions
//!     are injected once all user declarations are in place, so a user function shadows the
//!     build-in of the same name.
//!
//!     Building checks only what the structure data itself can get wrong: the tag in `meta`
//!     must match the payload, the root must be a module, and names must be unique within a
//!     namespace or block. Everything else is left to validation.
//!
//!     [`to_structure_data`] is the inverse. Build-in nodes have no structure data and are
//!     skipped, so a parsed module round-trips to the structure data it was built from.

pub mod ast_tree;
pub mod structure;

pub use ast_tree::{from_structure_data, AstTreeBuilder};
pub use structure::{node_to_structure_data, to_structure_data};
