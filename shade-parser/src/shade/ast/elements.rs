//! Syntax tree node kinds
//!
//!     One closed enum covers every node kind: declarations, the type-declaration node,
//!     expressions and statements. Children are referenced by [`NodeId`] into the module arena;
//!     a payload never owns another node.
//!
//!     The field names match the structure data payloads one to one, so building and
//!     extraction are mechanical. The one addition is the block scope, which is derived from
//!     the block's statements when the block is built.

use super::node::NodeId;
use super::operators::{
    AssignmentOperator, BinaryOperator, ComparisonOperator, IncrementOperator, LiteralKind,
    LogicalOperator, UnaryOperator, VariableKind,
};
use crate::shade::parsing::structure_data::NodeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of an enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: Option<EnumInitializer>,
}

/// Explicit enum value, kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumInitializer {
    Integer(String),
    String(String),
}

/// An item of a template list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateItem {
    /// A nested `TypeDeclaration` node.
    Type(NodeId),
    /// Any expression, possibly a bare name that turns out to be a type.
    Expression(NodeId),
}

impl TemplateItem {
    pub fn id(self) -> NodeId {
        match self {
            TemplateItem::Type(id) | TemplateItem::Expression(id) => id,
        }
    }
}

/// Typing rule of a build-in function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildInSignature {
    /// `T -> T` for a float scalar or vector.
    FloatComponentWise,
    /// `T -> T` for any numeric scalar or vector.
    Abs,
    /// `vecN<F> -> vecN<F>`
    Normalize,
    /// `(T, T) -> T` for any numeric scalar or vector.
    MinMax,
    /// `(T, T, T) -> T` for any numeric scalar or vector.
    Clamp,
    /// `(T, T, T) -> T` for a float scalar or vector.
    Mix,
    /// `(T, T) -> T` for a float scalar or vector.
    Pow,
    /// `(vecN<S>, vecN<S>) -> S`
    Dot,
    /// `(vec3<F>, vec3<F>) -> vec3<F>`
    Cross,
    /// `T -> F` for a float scalar or vector.
    Length,
    /// `(T, T) -> F` for a float scalar or vector.
    Distance,
    /// `(T, T, bool) -> T`
    Select,
    /// `vecN<bool> -> bool`
    AllAny,
    /// `(texture, sampler, coordinates) -> vec4<f32>`
    TextureSample,
    /// `ptr<array<T>> -> u32`
    ArrayLength,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    AliasDeclaration {
        name: String,
        target: NodeId,
    },
    StructDeclaration {
        name: String,
        attributes: Vec<NodeId>,
        properties: Vec<NodeId>,
    },
    StructProperty {
        name: String,
        attributes: Vec<NodeId>,
        ty: NodeId,
    },
    EnumDeclaration {
        name: String,
        values: Vec<EnumValue>,
    },
    FunctionDeclaration {
        name: String,
        attributes: Vec<NodeId>,
        parameters: Vec<NodeId>,
        return_attributes: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: NodeId,
    },
    FunctionParameter {
        name: String,
        attributes: Vec<NodeId>,
        ty: NodeId,
    },
    /// Injected by the compiler, never serialized.
    BuildInFunction {
        name: String,
        signature: BuildInSignature,
    },
    VariableDeclaration {
        kind: VariableKind,
        name: String,
        attributes: Vec<NodeId>,
        ty: Option<NodeId>,
        value: Option<NodeId>,
    },
    Attribute {
        name: String,
        arguments: Vec<NodeId>,
    },
    TypeDeclaration {
        name: String,
        template: Vec<TemplateItem>,
    },
    Literal {
        kind: LiteralKind,
        text: String,
    },
    VariableName {
        name: String,
    },
    IndexExpression {
        value: NodeId,
        index: NodeId,
    },
    ValueDecomposition {
        value: NodeId,
        member: String,
    },
    PointerExpression {
        value: NodeId,
    },
    AddressOfExpression {
        value: NodeId,
    },
    FunctionCall {
        name: String,
        template: Vec<TemplateItem>,
        arguments: Vec<NodeId>,
    },
    UnaryExpression {
        operator: UnaryOperator,
        value: NodeId,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: NodeId,
        right: NodeId,
    },
    ComparisonExpression {
        operator: ComparisonOperator,
        left: NodeId,
        right: NodeId,
    },
    ParenthesizedExpression {
        value: NodeId,
    },
    BlockStatement {
        statements: Vec<NodeId>,
        /// Variable declarations among `statements`, by name.
        scope: BTreeMap<String, NodeId>,
    },
    IfStatement {
        condition: NodeId,
        then_block: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStatement {
        condition: NodeId,
        body: NodeId,
    },
    DoWhileStatement {
        body: NodeId,
        condition: NodeId,
    },
    ForStatement {
        init: Option<NodeId>,
        condition: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    SwitchStatement {
        selector: NodeId,
        cases: Vec<NodeId>,
    },
    SwitchCase {
        selectors: Vec<NodeId>,
        is_default: bool,
        body: NodeId,
    },
    BreakStatement,
    ContinueStatement,
    ReturnStatement {
        value: Option<NodeId>,
    },
    DiscardStatement,
    AssignmentStatement {
        operator: AssignmentOperator,
        target: NodeId,
        value: NodeId,
    },
    IncrementDecrementStatement {
        operator: IncrementOperator,
        target: NodeId,
    },
    FunctionCallStatement {
        call: NodeId,
    },
}

/// Broad syntax category of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCategory {
    Declaration,
    Type,
    Expression,
    Statement,
}

impl NodeKind {
    /// The structure data tag. Build-in functions have none.
    pub fn node_type(&self) -> Option<NodeType> {
        let node_type = match self {
            NodeKind::AliasDeclaration { .. } => NodeType::AliasDeclaration,
            NodeKind::StructDeclaration { .. } => NodeType::StructDeclaration,
            NodeKind::StructProperty { .. } => NodeType::StructProperty,
            NodeKind::EnumDeclaration { .. } => NodeType::EnumDeclaration,
            NodeKind::FunctionDeclaration { .. } => NodeType::FunctionDeclaration,
            NodeKind::FunctionParameter { .. } => NodeType::FunctionParameter,
            NodeKind::BuildInFunction { .. } => return None,
            NodeKind::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeKind::Attribute { .. } => NodeType::Attribute,
            NodeKind::TypeDeclaration { .. } => NodeType::TypeDeclaration,
            NodeKind::Literal { .. } => NodeType::Literal,
            NodeKind::VariableName { .. } => NodeType::VariableName,
            NodeKind::IndexExpression { .. } => NodeType::IndexExpression,
            NodeKind::ValueDecomposition { .. } => NodeType::ValueDecomposition,
            NodeKind::PointerExpression { .. } => NodeType::PointerExpression,
            NodeKind::AddressOfExpression { .. } => NodeType::AddressOfExpression,
            NodeKind::FunctionCall { .. } => NodeType::FunctionCall,
            NodeKind::UnaryExpression { .. } => NodeType::UnaryExpression,
            NodeKind::BinaryExpression { .. } => NodeType::BinaryExpression,
            NodeKind::LogicalExpression { .. } => NodeType::LogicalExpression,
            NodeKind::ComparisonExpression { .. } => NodeType::ComparisonExpression,
            NodeKind::ParenthesizedExpression { .. } => NodeType::ParenthesizedExpression,
            NodeKind::BlockStatement { .. } => NodeType::BlockStatement,
            NodeKind::IfStatement { .. } => NodeType::IfStatement,
            NodeKind::WhileStatement { .. } => NodeType::WhileStatement,
            NodeKind::DoWhileStatement { .. } => NodeType::DoWhileStatement,
            NodeKind::ForStatement { .. } => NodeType::ForStatement,
            NodeKind::SwitchStatement { .. } => NodeType::SwitchStatement,
            NodeKind::SwitchCase { .. } => NodeType::SwitchCase,
            NodeKind::BreakStatement => NodeType::BreakStatement,
            NodeKind::ContinueStatement => NodeType::ContinueStatement,
            NodeKind::ReturnStatement { .. } => NodeType::ReturnStatement,
            NodeKind::DiscardStatement => NodeType::DiscardStatement,
            NodeKind::AssignmentStatement { .. } => NodeType::AssignmentStatement,
            NodeKind::IncrementDecrementStatement { .. } => NodeType::IncrementDecrementStatement,
            NodeKind::FunctionCallStatement { .. } => NodeType::FunctionCallStatement,
        };
        Some(node_type)
    }

    /// Display name of the kind, e.g. `FunctionCall` or `BuildInFunction`.
    pub fn label(&self) -> String {
        match self.node_type() {
            Some(node_type) => node_type.to_string(),
            None => "BuildInFunction".to_string(),
        }
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::AliasDeclaration { .. }
            | NodeKind::StructDeclaration { .. }
            | NodeKind::StructProperty { .. }
            | NodeKind::EnumDeclaration { .. }
            | NodeKind::FunctionDeclaration { .. }
            | NodeKind::FunctionParameter { .. }
            | NodeKind::BuildInFunction { .. }
            | NodeKind::VariableDeclaration { .. }
            | NodeKind::Attribute { .. } => NodeCategory::Declaration,
            NodeKind::TypeDeclaration { .. } => NodeCategory::Type,
            NodeKind::Literal { .. }
            | NodeKind::VariableName { .. }
            | NodeKind::IndexExpression { .. }
            | NodeKind::ValueDecomposition { .. }
            | NodeKind::PointerExpression { .. }
            | NodeKind::AddressOfExpression { .. }
            | NodeKind::FunctionCall { .. }
            | NodeKind::UnaryExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::LogicalExpression { .. }
            | NodeKind::ComparisonExpression { .. }
            | NodeKind::ParenthesizedExpression { .. } => NodeCategory::Expression,
            _ => NodeCategory::Statement,
        }
    }

    /// The declared or referenced name, where the kind has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::AliasDeclaration { name, .. }
            | NodeKind::StructDeclaration { name, .. }
            | NodeKind::StructProperty { name, .. }
            | NodeKind::EnumDeclaration { name, .. }
            | NodeKind::FunctionDeclaration { name, .. }
            | NodeKind::FunctionParameter { name, .. }
            | NodeKind::BuildInFunction { name, .. }
            | NodeKind::VariableDeclaration { name, .. }
            | NodeKind::Attribute { name, .. }
            | NodeKind::TypeDeclaration { name, .. }
            | NodeKind::VariableName { name }
            | NodeKind::FunctionCall { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        match self {
            NodeKind::AliasDeclaration { target, .. } => children.push(*target),
            NodeKind::StructDeclaration {
                attributes,
                properties,
                ..
            } => {
                children.extend(attributes);
                children.extend(properties);
            }
            NodeKind::StructProperty { attributes, ty, .. }
            | NodeKind::FunctionParameter { attributes, ty, .. } => {
                children.extend(attributes);
                children.push(*ty);
            }
            NodeKind::FunctionDeclaration {
                attributes,
                parameters,
                return_attributes,
                return_type,
                body,
                ..
            } => {
                children.extend(attributes);
                children.extend(parameters);
                children.extend(return_attributes);
                children.extend(return_type);
                children.push(*body);
            }
            NodeKind::VariableDeclaration {
                attributes,
                ty,
                value,
                ..
            } => {
                children.extend(attributes);
                children.extend(ty);
                children.extend(value);
            }
            NodeKind::Attribute { arguments, .. } => children.extend(arguments),
            NodeKind::TypeDeclaration { template, .. } => {
                children.extend(template.iter().map(|item| item.id()))
            }
            NodeKind::FunctionCall {
                template,
                arguments,
                ..
            } => {
                children.extend(template.iter().map(|item| item.id()));
                children.extend(arguments);
            }
            NodeKind::IndexExpression { value, index } => {
                children.push(*value);
                children.push(*index);
            }
            NodeKind::ValueDecomposition { value, .. }
            | NodeKind::PointerExpression { value }
            | NodeKind::AddressOfExpression { value }
            | NodeKind::UnaryExpression { value, .. }
            | NodeKind::ParenthesizedExpression { value } => children.push(*value),
            NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. }
            | NodeKind::ComparisonExpression { left, right, .. } => {
                children.push(*left);
                children.push(*right);
            }
            NodeKind::BlockStatement { statements, .. } => children.extend(statements),
            NodeKind::IfStatement {
                condition,
                then_block,
                else_branch,
            } => {
                children.push(*condition);
                children.push(*then_block);
                children.extend(else_branch);
            }
            NodeKind::WhileStatement { condition, body } => {
                children.push(*condition);
                children.push(*body);
            }
            NodeKind::DoWhileStatement { body, condition } => {
                children.push(*body);
                children.push(*condition);
            }
            NodeKind::ForStatement {
                init,
                condition,
                update,
                body,
            } => {
                children.extend(init);
                children.extend(condition);
                children.extend(update);
                children.push(*body);
            }
            NodeKind::SwitchStatement { selector, cases } => {
                children.push(*selector);
                children.extend(cases);
            }
            NodeKind::SwitchCase {
                selectors, body, ..
            } => {
                children.extend(selectors);
                children.push(*body);
            }
            NodeKind::ReturnStatement { value } => children.extend(value),
            NodeKind::AssignmentStatement { target, value, .. } => {
                children.push(*target);
                children.push(*value);
            }
            NodeKind::IncrementDecrementStatement { target, .. } => children.push(*target),
            NodeKind::FunctionCallStatement { call } => children.push(*call),
            NodeKind::EnumDeclaration { .. }
            | NodeKind::BuildInFunction { .. }
            | NodeKind::Literal { .. }
            | NodeKind::VariableName { .. }
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::DiscardStatement => {}
        }
        children
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::WhileStatement { .. }
                | NodeKind::DoWhileStatement { .. }
                | NodeKind::ForStatement { .. }
        )
    }
}
