//! Structure data to syntax tree.

use crate::shade::ast::{Module, Node, NodeId, NodeKind, Parent, TemplateItem};
use crate::shade::error::{Error, Result};
use crate::shade::parsing::structure_data::{NodeData, NodeType, StructureData};
use crate::shade::range::Location;
use crate::shade::semantic::build_in;
use std::collections::BTreeMap;

/// Build a complete, unvalidated module from a `Module` record.
pub fn from_structure_data(data: &StructureData) -> Result<Module> {
    let NodeData::Module { declarations } = &data.data else {
        return Err(Error::structural(format!(
            "expected a Module record at the root, found {}",
            data.node_type()
        ))
        .located(location_of(data)));
    };
    check_tag(data)?;
    let mut module = Module::new(data.meta.file.clone(), data.meta.position.clone());
    let mut builder = AstTreeBuilder::new(&mut module);
    for declaration in declarations {
        let id = builder.apply(declaration, Parent::Module)?;
        builder.module.declare(id)?;
    }
    build_in::inject(&mut module)?;
    log::debug!(
        "built {} with {} declarations and {} nodes",
        module.file(),
        module.declarations().len(),
        module.len()
    );
    Ok(module)
}

/// Builds nodes into an existing module.
pub struct AstTreeBuilder<'m> {
    module: &'m mut Module,
}

impl<'m> AstTreeBuilder<'m> {
    pub fn new(module: &'m mut Module) -> Self {
        Self { module }
    }

    /// Build `data` and attach the resulting node to `parent`.
    pub fn apply(&mut self, data: &StructureData, parent: Parent) -> Result<NodeId> {
        let id = self.construct(data)?;
        self.module.attach(id, parent)?;
        Ok(id)
    }

    /// Build `data` and its subtree, leaving the root unattached.
    pub fn construct(&mut self, data: &StructureData) -> Result<NodeId> {
        check_tag(data)?;
        let kind = self.kind(data)?;
        let id = self
            .module
            .push(Node::new(kind, data.meta.position.clone()));
        for child in self.module.children(id) {
            self.module.attach(child, Parent::Node(id))?;
        }
        Ok(id)
    }

    fn child(&mut self, data: &StructureData) -> Result<NodeId> {
        self.construct(data)
    }

    fn optional(&mut self, data: &Option<Box<StructureData>>) -> Result<Option<NodeId>> {
        data.as_deref().map(|data| self.construct(data)).transpose()
    }

    fn list(&mut self, items: &[StructureData]) -> Result<Vec<NodeId>> {
        items.iter().map(|item| self.construct(item)).collect()
    }

    fn template(&mut self, items: &[StructureData]) -> Result<Vec<TemplateItem>> {
        items
            .iter()
            .map(|item| {
                let id = self.construct(item)?;
                Ok(if item.is_type_item() {
                    TemplateItem::Type(id)
                } else {
                    TemplateItem::Expression(id)
                })
            })
            .collect()
    }

    fn kind(&mut self, data: &StructureData) -> Result<NodeKind> {
        let kind = match &data.data {
            NodeData::Module { .. } => {
                return Err(Error::structural("a Module record can only be the root")
                    .located(location_of(data)))
            }
            NodeData::AliasDeclaration { name, target } => NodeKind::AliasDeclaration {
                name: name.clone(),
                target: self.child(target)?,
            },
            NodeData::StructDeclaration {
                name,
                attributes,
                properties,
            } => NodeKind::StructDeclaration {
                name: name.clone(),
                attributes: self.list(attributes)?,
                properties: self.list(properties)?,
            },
            NodeData::StructProperty {
                name,
                attributes,
                ty,
            } => NodeKind::StructProperty {
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.child(ty)?,
            },
            NodeData::EnumDeclaration { name, values } => NodeKind::EnumDeclaration {
                name: name.clone(),
                values: values.clone(),
            },
            NodeData::FunctionDeclaration {
                name,
                attributes,
                parameters,
                return_attributes,
                return_type,
                body,
            } => NodeKind::FunctionDeclaration {
                name: name.clone(),
                attributes: self.list(attributes)?,
                parameters: self.list(parameters)?,
                return_attributes: self.list(return_attributes)?,
                return_type: self.optional(return_type)?,
                body: self.child(body)?,
            },
            NodeData::FunctionParameter {
                name,
                attributes,
                ty,
            } => NodeKind::FunctionParameter {
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.child(ty)?,
            },
            NodeData::VariableDeclaration {
                kind,
                name,
                attributes,
                ty,
                value,
            } => NodeKind::VariableDeclaration {
                kind: *kind,
                name: name.clone(),
                attributes: self.list(attributes)?,
                ty: self.optional(ty)?,
                value: self.optional(value)?,
            },
            NodeData::Attribute { name, arguments } => NodeKind::Attribute {
                name: name.clone(),
                arguments: self.list(arguments)?,
            },
            NodeData::TypeDeclaration { name, template } => NodeKind::TypeDeclaration {
                name: name.clone(),
                template: self.template(template)?,
            },
            NodeData::Literal { kind, text } => NodeKind::Literal {
                kind: *kind,
                text: text.clone(),
            },
            NodeData::VariableName { name } => NodeKind::VariableName { name: name.clone() },
            NodeData::IndexExpression { value, index } => NodeKind::IndexExpression {
                value: self.child(value)?,
                index: self.child(index)?,
            },
            NodeData::ValueDecomposition { value, member } => NodeKind::ValueDecomposition {
                value: self.child(value)?,
                member: member.clone(),
            },
            NodeData::PointerExpression { value } => NodeKind::PointerExpression {
                value: self.child(value)?,
            },
            NodeData::AddressOfExpression { value } => NodeKind::AddressOfExpression {
                value: self.child(value)?,
            },
            NodeData::FunctionCall {
                name,
                template,
                arguments,
            } => NodeKind::FunctionCall {
                name: name.clone(),
                template: self.template(template)?,
                arguments: self.list(arguments)?,
            },
            NodeData::UnaryExpression { operator, value } => NodeKind::UnaryExpression {
                operator: *operator,
                value: self.child(value)?,
            },
            NodeData::BinaryExpression {
                operator,
                left,
                right,
            } => NodeKind::BinaryExpression {
                operator: *operator,
                left: self.child(left)?,
                right: self.child(right)?,
            },
            NodeData::LogicalExpression {
                operator,
                left,
                right,
            } => NodeKind::LogicalExpression {
                operator: *operator,
                left: self.child(left)?,
                right: self.child(right)?,
            },
            NodeData::ComparisonExpression {
                operator,
                left,
                right,
            } => NodeKind::ComparisonExpression {
                operator: *operator,
                left: self.child(left)?,
                right: self.child(right)?,
            },
            NodeData::ParenthesizedExpression { value } => NodeKind::ParenthesizedExpression {
                value: self.child(value)?,
            },
            NodeData::BlockStatement { statements } => {
                let statements = self.list(statements)?;
                let scope = self.block_scope(&statements)?;
                NodeKind::BlockStatement { statements, scope }
            }
            NodeData::IfStatement {
                condition,
                then_block,
                else_branch,
            } => NodeKind::IfStatement {
                condition: self.child(condition)?,
                then_block: self.child(then_block)?,
                else_branch: self.optional(else_branch)?,
            },
            NodeData::WhileStatement { condition, body } => NodeKind::WhileStatement {
                condition: self.child(condition)?,
                body: self.child(body)?,
            },
            NodeData::DoWhileStatement { body, condition } => NodeKind::DoWhileStatement {
                body: self.child(body)?,
                condition: self.child(condition)?,
            },
            NodeData::ForStatement {
                init,
                condition,
                update,
                body,
            } => NodeKind::ForStatement {
                init: self.optional(init)?,
                condition: self.optional(condition)?,
                update: self.optional(update)?,
                body: self.child(body)?,
            },
            NodeData::SwitchStatement { selector, cases } => NodeKind::SwitchStatement {
                selector: self.child(selector)?,
                cases: self.list(cases)?,
            },
            NodeData::SwitchCase {
                selectors,
                is_default,
                body,
            } => NodeKind::SwitchCase {
                selectors: self.list(selectors)?,
                is_default: *is_default,
                body: self.child(body)?,
            },
            NodeData::BreakStatement => NodeKind::BreakStatement,
            NodeData::ContinueStatement => NodeKind::ContinueStatement,
            NodeData::ReturnStatement { value } => NodeKind::ReturnStatement {
                value: self.optional(value)?,
            },
            NodeData::DiscardStatement => NodeKind::DiscardStatement,
            NodeData::AssignmentStatement {
                operator,
                target,
                value,
            } => NodeKind::AssignmentStatement {
                operator: *operator,
                target: self.child(target)?,
                value: self.child(value)?,
            },
            NodeData::IncrementDecrementStatement { operator, target } => {
                NodeKind::IncrementDecrementStatement {
                    operator: *operator,
                    target: self.child(target)?,
                }
            }
            NodeData::FunctionCallStatement { call } => NodeKind::FunctionCallStatement {
                call: self.child(call)?,
            },
        };
        Ok(kind)
    }

    /// Collect the variable declarations among a block's statements.
    fn block_scope(&self, statements: &[NodeId]) -> Result<BTreeMap<String, NodeId>> {
        let mut scope = BTreeMap::new();
        for statement in statements {
            if let NodeKind::VariableDeclaration { name, .. } = self.module.kind(*statement) {
                if scope.insert(name.clone(), *statement).is_some() {
                    return Err(Error::duplicate("variable", name.clone())
                        .located(self.module.location(*statement)));
                }
            }
        }
        Ok(scope)
    }
}

fn location_of(data: &StructureData) -> Location {
    Location::new(data.meta.file.clone(), data.meta.position.clone())
}

fn check_tag(data: &StructureData) -> Result<()> {
    let actual: NodeType = data.data.node_type();
    if data.meta.node_type != actual {
        return Err(Error::structural(format!(
            "meta type {} does not match {} payload",
            data.meta.node_type, actual
        ))
        .located(location_of(data)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::options::ParseOptions;
    use crate::shade::parsing::analyze;

    fn build(source: &str) -> Result<Module> {
        let data = analyze(source, &ParseOptions::default())?;
        from_structure_data(&data)
    }

    #[test]
    fn test_every_node_is_attached() {
        let module = build(
            "struct Light { color: vec3<f32>, power: f32 }\n\
             fn shade(light: Light) -> f32 { let x = light.power * 2.0; return x; }",
        )
        .unwrap();
        for id in module.ids() {
            assert!(module.parent(id).is_some(), "{} is detached", id);
        }
        assert_eq!(module.declarations().len(), 2);
    }

    #[test]
    fn test_block_scope_collects_declarations() {
        let module = build("fn f() { let a = 1; let b = a; }").unwrap();
        let function = module.resolve_function("f").unwrap();
        let NodeKind::FunctionDeclaration { body, .. } = module.kind(function) else {
            panic!("expected function");
        };
        let NodeKind::BlockStatement { scope, .. } = module.kind(*body) else {
            panic!("expected block");
        };
        assert_eq!(scope.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_block_variable() {
        let error = build("fn f() { let a = 1; let a = 2; }").unwrap_err();
        assert_eq!(error.kind(), "DuplicateDeclarationError");
        assert_eq!(error.location().unwrap().range.start.line, 0);
    }

    #[test]
    fn test_build_ins_are_injected_and_shadowed() {
        let module = build("fn abs(x: f32) -> f32 { return x; }").unwrap();
        let abs = module.resolve_function("abs").unwrap();
        assert!(!module.node(abs).is_build_in());
        let sqrt = module.resolve_function("sqrt").unwrap();
        assert!(module.node(sqrt).is_build_in());
        assert!(!module.declarations().contains(&sqrt));
    }

    #[test]
    fn test_mismatched_meta_tag() {
        let mut data = analyze("const x = 1;", &ParseOptions::default()).unwrap();
        if let NodeData::Module { declarations } = &mut data.data {
            declarations[0].meta.node_type = NodeType::AliasDeclaration;
        }
        let error = from_structure_data(&data).unwrap_err();
        assert_eq!(error.kind(), "StructuralError");
    }

    #[test]
    fn test_root_must_be_module() {
        let data = analyze("const x = 1;", &ParseOptions::default()).unwrap();
        let NodeData::Module { declarations } = data.data else {
            panic!("expected module");
        };
        let error = from_structure_data(&declarations[0]).unwrap_err();
        assert!(error.to_string().contains("expected a Module record"));
    }
}
