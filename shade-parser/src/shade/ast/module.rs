//! The module: root of a compiled unit
//!
//!     The module owns every node of the unit in one arena, the name tables of the top-level
//!     namespaces, the type registry and the attribute table. Nothing here is shared with other
//!     modules, so independent units can be compiled side by side.
//!
//!     Namespaces:
//!
//!         - aliases, structs, enums and functions, each name-unique;
//!         - global variables, name-unique as well;
//!         - block scopes, held by each block node (see [NodeKind::BlockStatement]).
//!
//!     Build-in functions live in the function namespace next to user functions but are not
//!     part of the declaration list, which only holds what the source declared.

use super::elements::NodeKind;
use super::node::{Node, NodeId, NodeProperties, Parent, ValidationState};
use crate::shade::error::{Error, Result};
use crate::shade::range::{Location, Range};
use crate::shade::semantic::attributes::AttributeTable;
use crate::shade::types::definition::TypeDefinition;
use crate::shade::types::registry::{TypeHandle, TypeRegistry};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Module {
    file: String,
    range: Range,
    nodes: Vec<Node>,
    declarations: Vec<NodeId>,
    build_ins: Vec<NodeId>,
    aliases: HashMap<String, NodeId>,
    structs: HashMap<String, NodeId>,
    enums: HashMap<String, NodeId>,
    functions: HashMap<String, NodeId>,
    globals: HashMap<String, NodeId>,
    /// Variable references to the declaration they resolved to.
    bindings: HashMap<NodeId, NodeId>,
    types: TypeRegistry,
    attribute_table: AttributeTable,
    validated: bool,
}

impl Module {
    pub fn new(file: impl Into<String>, range: Range) -> Self {
        Self {
            file: file.into(),
            range,
            nodes: Vec::new(),
            declarations: Vec::new(),
            build_ins: Vec::new(),
            aliases: HashMap::new(),
            structs: HashMap::new(),
            enums: HashMap::new(),
            functions: HashMap::new(),
            globals: HashMap::new(),
            bindings: HashMap::new(),
            types: TypeRegistry::new(),
            attribute_table: AttributeTable::standard(),
            validated: false,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Add an unattached node to the arena.
    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.node(id).kind()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Top-level declarations in source order.
    pub fn declarations(&self) -> &[NodeId] {
        &self.declarations
    }

    pub fn build_ins(&self) -> &[NodeId] {
        &self.build_ins
    }

    pub fn location(&self, id: NodeId) -> Location {
        Location::new(self.file.clone(), self.node(id).range().clone())
    }

    /// Attach `child` to `parent`. Fails if the child already has a parent.
    pub fn attach(&mut self, child: NodeId, parent: Parent) -> Result<()> {
        let location = self.location(child);
        self.node_mut(child)
            .attach(parent)
            .map_err(|error| error.located(location))
    }

    /// Register a top-level declaration in its namespace.
    pub fn declare(&mut self, id: NodeId) -> Result<()> {
        let kind = self.node(id).kind();
        let namespace = match kind {
            NodeKind::AliasDeclaration { .. } => "alias",
            NodeKind::StructDeclaration { .. } => "struct",
            NodeKind::EnumDeclaration { .. } => "enum",
            NodeKind::FunctionDeclaration { .. } => "function",
            NodeKind::VariableDeclaration { .. } => "variable",
            other => {
                return Err(Error::structural(format!(
                    "{} cannot be declared at module scope",
                    other.label()
                ))
                .located(self.location(id)))
            }
        };
        let name = kind.name().unwrap_or_default().to_string();
        let location = self.location(id);
        let table = match namespace {
            "alias" => &mut self.aliases,
            "struct" => &mut self.structs,
            "enum" => &mut self.enums,
            "function" => &mut self.functions,
            _ => &mut self.globals,
        };
        if table.contains_key(&name) {
            return Err(Error::duplicate(namespace, name).located(location));
        }
        table.insert(name, id);
        self.declarations.push(id);
        Ok(())
    }

    /// Register a compiler-provided function unless the source declared one with that name.
    pub fn inject_build_in(&mut self, kind: NodeKind) -> Result<Option<NodeId>> {
        let name = kind.name().unwrap_or_default().to_string();
        if self.functions.contains_key(&name) {
            return Ok(None);
        }
        let id = self.push(Node::build_in(kind));
        self.attach(id, Parent::Module)?;
        self.functions.insert(name, id);
        self.build_ins.push(id);
        Ok(Some(id))
    }

    pub fn resolve_alias(&self, name: &str) -> Option<NodeId> {
        self.aliases.get(name).copied()
    }

    pub fn resolve_struct(&self, name: &str) -> Option<NodeId> {
        self.structs.get(name).copied()
    }

    pub fn resolve_enum(&self, name: &str) -> Option<NodeId> {
        self.enums.get(name).copied()
    }

    pub fn resolve_function(&self, name: &str) -> Option<NodeId> {
        self.functions.get(name).copied()
    }

    pub fn resolve_global(&self, name: &str) -> Option<NodeId> {
        self.globals.get(name).copied()
    }

    /// The declaration a validated variable reference resolved to.
    pub fn binding(&self, reference: NodeId) -> Option<NodeId> {
        self.bindings.get(&reference).copied()
    }

    pub(crate) fn bind(&mut self, reference: NodeId, declaration: NodeId) {
        self.bindings.insert(reference, declaration);
    }

    pub fn parent(&self, id: NodeId) -> Option<Parent> {
        self.node(id).parent()
    }

    /// Strict ancestors of `id`, nearest first. The module root is not a node and is not
    /// included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            module: self,
            next: self.parent_node(id),
        }
    }

    fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        match self.parent(id) {
            Some(Parent::Node(parent)) => Some(parent),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Nearest enclosing block, or `None` at module scope.
    pub fn scope(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|ancestor| matches!(self.kind(*ancestor), NodeKind::BlockStatement { .. }))
    }

    /// Function declaration enclosing `id`.
    pub fn function_of(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|ancestor| {
            matches!(self.kind(*ancestor), NodeKind::FunctionDeclaration { .. })
        })
    }

    /// Derived properties of a validated node.
    pub fn expression_properties(&self, id: NodeId) -> Result<NodeProperties> {
        self.node(id)
            .properties()
            .map_err(|error| error.located(self.location(id)))
    }

    /// Resolved type of a validated node that has one.
    pub fn type_of(&self, id: NodeId) -> Result<TypeHandle> {
        self.expression_properties(id)?.ty.ok_or_else(|| {
            Error::structural(format!("{} has no type", self.kind(id).label()))
                .located(self.location(id))
        })
    }

    pub fn type_definition(&self, handle: TypeHandle) -> &TypeDefinition {
        self.types.definition(handle)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub(crate) fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn attribute_table(&self) -> &AttributeTable {
        &self.attribute_table
    }

    /// Extend or override the attributes accepted by this module before validating it.
    pub fn attribute_table_mut(&mut self) -> &mut AttributeTable {
        &mut self.attribute_table
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub(crate) fn mark_validated(&mut self) {
        self.validated = true;
    }

    pub fn state(&self, id: NodeId) -> ValidationState {
        self.node(id).state()
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    module: &'a Module,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.module.parent_node(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::ast::elements::EnumValue;

    fn enum_node(module: &mut Module, name: &str) -> NodeId {
        module.push(Node::new(
            NodeKind::EnumDeclaration {
                name: name.to_string(),
                values: vec![EnumValue {
                    name: "A".into(),
                    value: None,
                }],
            },
            Range::default(),
        ))
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut module = Module::new("test.shade", Range::default());
        let first = enum_node(&mut module, "Mode");
        let second = enum_node(&mut module, "Mode");
        module.declare(first).unwrap();
        let error = module.declare(second).unwrap_err();
        assert_eq!(error.kind(), "DuplicateDeclarationError");
        assert_eq!(module.resolve_enum("Mode"), Some(first));
        assert_eq!(module.declarations(), &[first]);
    }

    #[test]
    fn test_ancestors_and_scope() {
        let mut module = Module::new("test.shade", Range::default());
        let name = module.push(Node::new(
            NodeKind::VariableName { name: "x".into() },
            Range::default(),
        ));
        let call = module.push(Node::new(
            NodeKind::FunctionCall {
                name: "f".into(),
                template: Vec::new(),
                arguments: vec![name],
            },
            Range::default(),
        ));
        let statement = module.push(Node::new(
            NodeKind::FunctionCallStatement { call },
            Range::default(),
        ));
        let block = module.push(Node::new(
            NodeKind::BlockStatement {
                statements: vec![statement],
                scope: Default::default(),
            },
            Range::default(),
        ));
        module.attach(name, Parent::Node(call)).unwrap();
        module.attach(call, Parent::Node(statement)).unwrap();
        module.attach(statement, Parent::Node(block)).unwrap();
        module.attach(block, Parent::Module).unwrap();

        let ancestors: Vec<NodeId> = module.ancestors(name).collect();
        assert_eq!(ancestors, vec![call, statement, block]);
        assert_eq!(module.scope(name), Some(block));
        assert_eq!(module.scope(block), None);
        assert!(module.attach(name, Parent::Node(block)).is_err());
    }

    #[test]
    fn test_premature_query() {
        let mut module = Module::new("test.shade", Range::default());
        let id = enum_node(&mut module, "Mode");
        let error = module.expression_properties(id).unwrap_err();
        assert_eq!(error.kind(), "StructuralError");
        assert!(error.location().is_some());
    }
}
