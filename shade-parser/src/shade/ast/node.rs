//! Arena nodes and their validation state
//!
//!     A node is created unattached, attached to its parent exactly once, and validated at
//!     most once. Validation stores the node's derived properties; reading them earlier is a
//!     structural error rather than a silent recomputation.

use super::elements::NodeKind;
use crate::shade::error::{Error, Result};
use crate::shade::range::Range;
use crate::shade::types::registry::TypeHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in its module's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    Module,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationState {
    Unvalidated,
    /// Validation entered but not finished. Meeting this state again is a cycle.
    Validating,
    Validated,
}

/// Untyped literal flavour carried by an expression until context fixes its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractKind {
    Int,
    Float,
}

/// Derived properties of a validated node.
///
/// Declarations report the type they declare, expressions the type they evaluate to and
/// statements no type at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeProperties {
    pub is_constant: bool,
    pub is_creation_fixed: bool,
    pub is_storage: bool,
    pub ty: Option<TypeHandle>,
    /// Set when the value is an unsuffixed literal, or is built only from such literals.
    pub abstract_kind: Option<AbstractKind>,
}

impl NodeProperties {
    /// A runtime value of type `ty`.
    pub fn value(ty: TypeHandle) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    /// A compile-time constant of type `ty`.
    pub fn constant(ty: TypeHandle) -> Self {
        Self {
            is_constant: true,
            is_creation_fixed: true,
            ty: Some(ty),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    parent: Option<Parent>,
    build_in: bool,
    range: Range,
    kind: NodeKind,
    state: ValidationState,
    properties: Option<NodeProperties>,
}

impl Node {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            parent: None,
            build_in: false,
            range,
            kind,
            state: ValidationState::Unvalidated,
            properties: None,
        }
    }

    /// A compiler-provided node. It has no source position.
    pub fn build_in(kind: NodeKind) -> Self {
        Self {
            build_in: true,
            ..Self::new(kind, Range::default())
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn is_build_in(&self) -> bool {
        self.build_in
    }

    pub fn parent(&self) -> Option<Parent> {
        self.parent
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Set the parent. A node is attached once and never moved.
    pub fn attach(&mut self, parent: Parent) -> Result<()> {
        if let Some(existing) = self.parent {
            return Err(Error::structural(format!(
                "{} is already attached to {:?}",
                self.kind.label(),
                existing
            )));
        }
        self.parent = Some(parent);
        Ok(())
    }

    /// Derived properties, available once the node is validated.
    pub fn properties(&self) -> Result<NodeProperties> {
        match (self.state, self.properties) {
            (ValidationState::Validated, Some(properties)) => Ok(properties),
            _ => Err(Error::structural(format!(
                "properties of {} queried before validation",
                self.kind.label()
            ))),
        }
    }

    pub(crate) fn begin_validation(&mut self) {
        self.state = ValidationState::Validating;
    }

    pub(crate) fn abort_validation(&mut self) {
        self.state = ValidationState::Unvalidated;
    }

    pub(crate) fn finish_validation(&mut self, properties: NodeProperties) {
        self.state = ValidationState::Validated;
        self.properties = Some(properties);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Node {
        Node::new(
            NodeKind::VariableName {
                name: text.to_string(),
            },
            Range::default(),
        )
    }

    #[test]
    fn test_attach_once() {
        let mut node = name("x");
        node.attach(Parent::Module).unwrap();
        let error = node.attach(Parent::Node(NodeId::new(3))).unwrap_err();
        assert_eq!(error.kind(), "StructuralError");
        assert_eq!(node.parent(), Some(Parent::Module));
    }

    #[test]
    fn test_properties_before_validation() {
        let mut node = name("x");
        assert!(node.properties().is_err());
        node.begin_validation();
        assert!(node.properties().is_err());
        node.finish_validation(NodeProperties::default());
        assert_eq!(node.properties().unwrap(), NodeProperties::default());
        assert_eq!(node.state(), ValidationState::Validated);
    }

    #[test]
    fn test_kind_is_fixed_through_validation() {
        let mut node = name("x");
        node.attach(Parent::Module).unwrap();
        node.begin_validation();
        node.finish_validation(NodeProperties::default());
        assert_eq!(
            node.kind(),
            &NodeKind::VariableName {
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn test_build_in_flag() {
        assert!(Node::build_in(NodeKind::BreakStatement).is_build_in());
        assert!(!name("x").is_build_in());
    }
}
