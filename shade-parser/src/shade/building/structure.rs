//! Syntax tree to structure data.

use crate::shade::ast::{Module, NodeId, NodeKind, TemplateItem};
use crate::shade::error::{Error, Result};
use crate::shade::parsing::structure_data::{NodeData, StructureData};

/// The `Module` record of a module, without build-in nodes.
pub fn to_structure_data(module: &Module) -> Result<StructureData> {
    let declarations = module
        .declarations()
        .iter()
        .filter(|id| !module.node(**id).is_build_in())
        .map(|id| node_to_structure_data(module, *id))
        .collect::<Result<Vec<_>>>()?;
    Ok(StructureData::new(
        NodeData::Module { declarations },
        module.file(),
        module.range().clone(),
    ))
}

/// The record of one node and its subtree.
pub fn node_to_structure_data(module: &Module, id: NodeId) -> Result<StructureData> {
    let node = module.node(id);
    let data = Extractor { module }.data(node.kind()).map_err(|error| {
        error.located(module.location(id))
    })?;
    Ok(StructureData::new(data, module.file(), node.range().clone()))
}

struct Extractor<'a> {
    module: &'a Module,
}

impl Extractor<'_> {
    fn child(&self, id: NodeId) -> Result<Box<StructureData>> {
        node_to_structure_data(self.module, id).map(Box::new)
    }

    fn optional(&self, id: Option<NodeId>) -> Result<Option<Box<StructureData>>> {
        id.map(|id| self.child(id)).transpose()
    }

    fn list(&self, ids: &[NodeId]) -> Result<Vec<StructureData>> {
        ids.iter()
            .map(|id| node_to_structure_data(self.module, *id))
            .collect()
    }

    fn template(&self, items: &[TemplateItem]) -> Result<Vec<StructureData>> {
        items
            .iter()
            .map(|item| node_to_structure_data(self.module, item.id()))
            .collect()
    }

    fn data(&self, kind: &NodeKind) -> Result<NodeData> {
        let data = match kind {
            NodeKind::BuildInFunction { name, .. } => {
                return Err(Error::structural(format!(
                    "build-in function `{}` has no structure data",
                    name
                )))
            }
            NodeKind::AliasDeclaration { name, target } => NodeData::AliasDeclaration {
                name: name.clone(),
                target: self.child(*target)?,
            },
            NodeKind::StructDeclaration {
                name,
                attributes,
                properties,
            } => NodeData::StructDeclaration {
                name: name.clone(),
                attributes: self.list(attributes)?,
                properties: self.list(properties)?,
            },
            NodeKind::StructProperty {
                name,
                attributes,
                ty,
            } => NodeData::StructProperty {
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.child(*ty)?,
            },
            NodeKind::EnumDeclaration { name, values } => NodeData::EnumDeclaration {
                name: name.clone(),
                values: values.clone(),
            },
            NodeKind::FunctionDeclaration {
                name,
                attributes,
                parameters,
                return_attributes,
                return_type,
                body,
            } => NodeData::FunctionDeclaration {
                name: name.clone(),
                attributes: self.list(attributes)?,
                parameters: self.list(parameters)?,
                return_attributes: self.list(return_attributes)?,
                return_type: self.optional(*return_type)?,
                body: self.child(*body)?,
            },
            NodeKind::FunctionParameter {
                name,
                attributes,
                ty,
            } => NodeData::FunctionParameter {
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.child(*ty)?,
            },
            NodeKind::VariableDeclaration {
                kind,
                name,
                attributes,
                ty,
                value,
            } => NodeData::VariableDeclaration {
                kind: *kind,
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.optional(*ty)?,
                value: self.optional(*value)?,
            },
            NodeKind::Attribute { name, arguments } => NodeData::Attribute {
                name: name.clone(),
                arguments: self.list(arguments)?,
            },
            NodeKind::TypeDeclaration { name, template } => NodeData::TypeDeclaration {
                name: name.clone(),
                template: self.template(template)?,
            },
            NodeKind::Literal { kind, text } => NodeData::Literal {
                kind: *kind,
                text: text.clone(),
            },
            NodeKind::VariableName { name } => NodeData::VariableName { name: name.clone() },
            NodeKind::IndexExpression { value, index } => NodeData::IndexExpression {
                value: self.child(*value)?,
                index: self.child(*index)?,
            },
            NodeKind::ValueDecomposition { value, member } => NodeData::ValueDecomposition {
                value: self.child(*value)?,
                member: member.clone(),
            },
            NodeKind::PointerExpression { value } => NodeData::PointerExpression {
                value: self.child(*value)?,
            },
            NodeKind::AddressOfExpression { value } => NodeData::AddressOfExpression {
                value: self.child(*value)?,
            },
            NodeKind::FunctionCall {
                name,
                template,
                arguments,
            } => NodeData::FunctionCall {
                name: name.clone(),
                template: self.template(template)?,
                arguments: self.list(arguments)?,
            },
            NodeKind::UnaryExpression { operator, value } => NodeData::UnaryExpression {
                operator: *operator,
                value: self.child(*value)?,
            },
            NodeKind::BinaryExpression {
                operator,
                left,
                right,
            } => NodeData::BinaryExpression {
                operator: *operator,
                left: self.child(*left)?,
                right: self.child(*right)?,
            },
            NodeKind::LogicalExpression {
                operator,
                left,
                right,
            } => NodeData::LogicalExpression {
                operator: *operator,
                left: self.child(*left)?,
                right: self.child(*right)?,
            },
            NodeKind::ComparisonExpression {
                operator,
                left,
                right,
            } => NodeData::ComparisonExpression {
                operator: *operator,
                left: self.child(*left)?,
                right: self.child(*right)?,
            },
            NodeKind::ParenthesizedExpression { value } => NodeData::ParenthesizedExpression {
                value: self.child(*value)?,
            },
            NodeKind::BlockStatement { statements, .. } => NodeData::BlockStatement {
                statements: self.list(statements)?,
            },
            NodeKind::IfStatement {
                condition,
                then_block,
                else_branch,
            } => NodeData::IfStatement {
                condition: self.child(*condition)?,
                then_block: self.child(*then_block)?,
                else_branch: self.optional(*else_branch)?,
            },
            NodeKind::WhileStatement { condition, body } => NodeData::WhileStatement {
                condition: self.child(*condition)?,
                body: self.child(*body)?,
            },
            NodeKind::DoWhileStatement { body, condition } => NodeData::DoWhileStatement {
                body: self.child(*body)?,
                condition: self.child(*condition)?,
            },
            NodeKind::ForStatement {
                init,
                condition,
                update,
                body,
            } => NodeData::ForStatement {
                init: self.optional(*init)?,
                condition: self.optional(*condition)?,
                update: self.optional(*update)?,
                body: self.child(*body)?,
            },
            NodeKind::SwitchStatement { selector, cases } => NodeData::SwitchStatement {
                selector: self.child(*selector)?,
                cases: self.list(cases)?,
            },
            NodeKind::SwitchCase {
                selectors,
                is_default,
                body,
            } => NodeData::SwitchCase {
                selectors: self.list(selectors)?,
                is_default: *is_default,
                body: self.child(*body)?,
            },
            NodeKind::BreakStatement => NodeData::BreakStatement,
            NodeKind::ContinueStatement => NodeData::ContinueStatement,
            NodeKind::ReturnStatement { value } => NodeData::ReturnStatement {
                value: self.optional(*value)?,
            },
            NodeKind::DiscardStatement => NodeData::DiscardStatement,
            NodeKind::AssignmentStatement {
                operator,
                target,
                value,
            } => NodeData::AssignmentStatement {
                operator: *operator,
                target: self.child(*target)?,
                value: self.child(*value)?,
            },
            NodeKind::IncrementDecrementStatement { operator, target } => {
                NodeData::IncrementDecrementStatement {
                    operator: *operator,
                    target: self.child(*target)?,
                }
            }
            NodeKind::FunctionCallStatement { call } => NodeData::FunctionCallStatement {
                call: self.child(*call)?,
            },
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::building::from_structure_data;
    use crate::shade::options::ParseOptions;
    use crate::shade::parsing::analyze;

    #[test]
    fn test_round_trip_before_validation() {
        let source = "enum Mode { Off, On = 4 }\n\
                      @group(0) @binding(1) uniform tint: vec4<f32>;\n\
                      fn main() { for (let i = 0; i < 4; i++) { if i == 2 { break; } } }";
        let data = analyze(source, &ParseOptions::default()).unwrap();
        let module = from_structure_data(&data).unwrap();
        assert_eq!(to_structure_data(&module).unwrap(), data);
    }

    #[test]
    fn test_build_in_has_no_record() {
        let data = analyze("", &ParseOptions::default()).unwrap();
        let module = from_structure_data(&data).unwrap();
        let abs = module.resolve_function("abs").unwrap();
        let error = node_to_structure_data(&module, abs).unwrap_err();
        assert_eq!(error.kind(), "StructuralError");
    }
}
