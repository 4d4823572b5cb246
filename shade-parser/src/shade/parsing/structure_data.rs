//! Structure data: the intermediate representation produced by the grammar
//!
//!     The grammar engine does not build syntax tree nodes. Each grammar part emits a
//!     [`StructureData`] value instead: a tagged, positioned record whose payload may nest
//!     further structure data. The syntax tree is then built from this tree in a separate
//!     step (see [building](crate::shade::building)), and can be turned back into it.
//!
//!     Keeping the two apart means the structure data is plain serde data. It can be dumped
//!     as JSON or YAML, loaded back and rebuilt into an equal syntax tree, which is what the
//!     round-trip tests rely on.
//!
//!     Shape:
//!
//!         { meta: { type, file, position }, data: { <NodeType>: { ...fields } } }
//!
//!     `meta.type` duplicates the tag of `data`. The builder rejects records where the two
//!     disagree, which only happens with hand-written or corrupted input.

use crate::shade::ast::elements::EnumValue;
use crate::shade::ast::operators::{
    AssignmentOperator, BinaryOperator, ComparisonOperator, IncrementOperator, LiteralKind,
    LogicalOperator, UnaryOperator, VariableKind,
};
use crate::shade::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of structure-data tags, one per syntax node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Module,
    AliasDeclaration,
    StructDeclaration,
    StructProperty,
    EnumDeclaration,
    FunctionDeclaration,
    FunctionParameter,
    VariableDeclaration,
    Attribute,
    TypeDeclaration,
    Literal,
    VariableName,
    IndexExpression,
    ValueDecomposition,
    PointerExpression,
    AddressOfExpression,
    FunctionCall,
    UnaryExpression,
    BinaryExpression,
    LogicalExpression,
    ComparisonExpression,
    ParenthesizedExpression,
    BlockStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    SwitchStatement,
    SwitchCase,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    DiscardStatement,
    AssignmentStatement,
    IncrementDecrementStatement,
    FunctionCallStatement,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub file: String,
    pub position: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureData {
    pub meta: Meta,
    pub data: NodeData,
}

type Child = Box<StructureData>;

/// Tag-specific payload of a structure-data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeData {
    Module {
        declarations: Vec<StructureData>,
    },
    AliasDeclaration {
        name: String,
        target: Child,
    },
    StructDeclaration {
        name: String,
        attributes: Vec<StructureData>,
        properties: Vec<StructureData>,
    },
    StructProperty {
        name: String,
        attributes: Vec<StructureData>,
        #[serde(rename = "type")]
        ty: Child,
    },
    EnumDeclaration {
        name: String,
        values: Vec<EnumValue>,
    },
    FunctionDeclaration {
        name: String,
        attributes: Vec<StructureData>,
        parameters: Vec<StructureData>,
        return_attributes: Vec<StructureData>,
        return_type: Option<Child>,
        body: Child,
    },
    FunctionParameter {
        name: String,
        attributes: Vec<StructureData>,
        #[serde(rename = "type")]
        ty: Child,
    },
    VariableDeclaration {
        kind: VariableKind,
        name: String,
        attributes: Vec<StructureData>,
        #[serde(rename = "type")]
        ty: Option<Child>,
        value: Option<Child>,
    },
    Attribute {
        name: String,
        arguments: Vec<StructureData>,
    },
    /// A type name with its template list. Items tagged `TypeDeclaration` are type items,
    /// anything else is an expression item.
    TypeDeclaration {
        name: String,
        template: Vec<StructureData>,
    },
    Literal {
        kind: LiteralKind,
        text: String,
    },
    VariableName {
        name: String,
    },
    IndexExpression {
        value: Child,
        index: Child,
    },
    ValueDecomposition {
        value: Child,
        member: String,
    },
    PointerExpression {
        value: Child,
    },
    AddressOfExpression {
        value: Child,
    },
    FunctionCall {
        name: String,
        template: Vec<StructureData>,
        arguments: Vec<StructureData>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        value: Child,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Child,
        right: Child,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Child,
        right: Child,
    },
    ComparisonExpression {
        operator: ComparisonOperator,
        left: Child,
        right: Child,
    },
    ParenthesizedExpression {
        value: Child,
    },
    BlockStatement {
        statements: Vec<StructureData>,
    },
    IfStatement {
        condition: Child,
        then_block: Child,
        else_branch: Option<Child>,
    },
    WhileStatement {
        condition: Child,
        body: Child,
    },
    DoWhileStatement {
        body: Child,
        condition: Child,
    },
    ForStatement {
        init: Option<Child>,
        condition: Option<Child>,
        update: Option<Child>,
        body: Child,
    },
    SwitchStatement {
        selector: Child,
        cases: Vec<StructureData>,
    },
    SwitchCase {
        selectors: Vec<StructureData>,
        is_default: bool,
        body: Child,
    },
    BreakStatement,
    ContinueStatement,
    ReturnStatement {
        value: Option<Child>,
    },
    DiscardStatement,
    AssignmentStatement {
        operator: AssignmentOperator,
        target: Child,
        value: Child,
    },
    IncrementDecrementStatement {
        operator: IncrementOperator,
        target: Child,
    },
    FunctionCallStatement {
        call: Child,
    },
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Module { .. } => NodeType::Module,
            NodeData::AliasDeclaration { .. } => NodeType::AliasDeclaration,
            NodeData::StructDeclaration { .. } => NodeType::StructDeclaration,
            NodeData::StructProperty { .. } => NodeType::StructProperty,
            NodeData::EnumDeclaration { .. } => NodeType::EnumDeclaration,
            NodeData::FunctionDeclaration { .. } => NodeType::FunctionDeclaration,
            NodeData::FunctionParameter { .. } => NodeType::FunctionParameter,
            NodeData::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeData::Attribute { .. } => NodeType::Attribute,
            NodeData::TypeDeclaration { .. } => NodeType::TypeDeclaration,
            NodeData::Literal { .. } => NodeType::Literal,
            NodeData::VariableName { .. } => NodeType::VariableName,
            NodeData::IndexExpression { .. } => NodeType::IndexExpression,
            NodeData::ValueDecomposition { .. } => NodeType::ValueDecomposition,
            NodeData::PointerExpression { .. } => NodeType::PointerExpression,
            NodeData::AddressOfExpression { .. } => NodeType::AddressOfExpression,
            NodeData::FunctionCall { .. } => NodeType::FunctionCall,
            NodeData::UnaryExpression { .. } => NodeType::UnaryExpression,
            NodeData::BinaryExpression { .. } => NodeType::BinaryExpression,
            NodeData::LogicalExpression { .. } => NodeType::LogicalExpression,
            NodeData::ComparisonExpression { .. } => NodeType::ComparisonExpression,
            NodeData::ParenthesizedExpression { .. } => NodeType::ParenthesizedExpression,
            NodeData::BlockStatement { .. } => NodeType::BlockStatement,
            NodeData::IfStatement { .. } => NodeType::IfStatement,
            NodeData::WhileStatement { .. } => NodeType::WhileStatement,
            NodeData::DoWhileStatement { .. } => NodeType::DoWhileStatement,
            NodeData::ForStatement { .. } => NodeType::ForStatement,
            NodeData::SwitchStatement { .. } => NodeType::SwitchStatement,
            NodeData::SwitchCase { .. } => NodeType::SwitchCase,
            NodeData::BreakStatement => NodeType::BreakStatement,
            NodeData::ContinueStatement => NodeType::ContinueStatement,
            NodeData::ReturnStatement { .. } => NodeType::ReturnStatement,
            NodeData::DiscardStatement => NodeType::DiscardStatement,
            NodeData::AssignmentStatement { .. } => NodeType::AssignmentStatement,
            NodeData::IncrementDecrementStatement { .. } => NodeType::IncrementDecrementStatement,
            NodeData::FunctionCallStatement { .. } => NodeType::FunctionCallStatement,
        }
    }
}

impl StructureData {
    /// Create a record whose `meta.type` matches its payload.
    pub fn new(data: NodeData, file: impl Into<String>, position: Range) -> Self {
        Self {
            meta: Meta {
                node_type: data.node_type(),
                file: file.into(),
                position,
            },
            data,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.meta.node_type
    }

    pub fn position(&self) -> &Range {
        &self.meta.position
    }

    /// Whether this record sits in a type slot of a template list.
    pub fn is_type_item(&self) -> bool {
        self.meta.node_type == NodeType::TypeDeclaration
    }

    /// The same record with a different payload, keeping file and position.
    pub fn with_data(&self, data: NodeData) -> Self {
        StructureData::new(data, self.meta.file.clone(), self.meta.position.clone())
    }
}
