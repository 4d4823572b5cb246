//! Statement checks
//!
//!     Statements have no type. Validating one checks its controlling expressions and
//!     validates its nested statements in source order, which is also the order block-local
//!     declarations become visible in.

use super::calls::is_function_call;
use super::expressions::{assignable, binary_type, Operand};
use super::{const_eval, declared_type, ensure, value};
use crate::shade::ast::operators::{AssignmentOperator, VariableKind};
use crate::shade::ast::{AbstractKind, Module, NodeId, NodeKind, NodeProperties};
use crate::shade::error::{Error, Result};
use crate::shade::types::NumericKind;
use std::collections::HashSet;

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    match module.kind(id).clone() {
        NodeKind::BlockStatement { statements, .. } => {
            for statement in statements {
                ensure(module, statement)?;
            }
        }
        NodeKind::IfStatement {
            condition: test,
            then_block,
            else_branch,
        } => {
            condition(module, test, "if")?;
            ensure(module, then_block)?;
            if let Some(branch) = else_branch {
                ensure(module, branch)?;
            }
        }
        NodeKind::WhileStatement {
            condition: test,
            body,
        } => {
            condition(module, test, "while")?;
            ensure(module, body)?;
        }
        NodeKind::DoWhileStatement {
            body,
            condition: test,
        } => {
            ensure(module, body)?;
            condition(module, test, "do-while")?;
        }
        NodeKind::ForStatement {
            init,
            condition: test,
            update,
            body,
        } => {
            if let Some(init) = init {
                let is_let = matches!(
                    module.kind(init),
                    NodeKind::VariableDeclaration {
                        kind: VariableKind::Let,
                        ..
                    }
                );
                if !is_let {
                    return Err(Error::structural(
                        "`for` initializer must be a `let` declaration",
                    )
                    .located(module.location(init)));
                }
                ensure(module, init)?;
            }
            if let Some(test) = test {
                condition(module, test, "for")?;
            }
            if let Some(update) = update {
                ensure(module, update)?;
            }
            ensure(module, body)?;
        }
        NodeKind::SwitchStatement { selector, cases } => switch(module, selector, &cases)?,
        NodeKind::SwitchCase { body, .. } => {
            ensure(module, body)?;
        }
        NodeKind::BreakStatement => {
            let inside = module.ancestors(id).any(|ancestor| {
                let kind = module.kind(ancestor);
                kind.is_loop() || matches!(kind, NodeKind::SwitchStatement { .. })
            });
            if !inside {
                return Err(Error::structural("`break` outside of a loop or switch"));
            }
        }
        NodeKind::ContinueStatement => {
            if !module.ancestors(id).any(|ancestor| module.kind(ancestor).is_loop()) {
                return Err(Error::structural("`continue` outside of a loop"));
            }
        }
        NodeKind::ReturnStatement { value: result } => return_statement(module, id, result)?,
        NodeKind::DiscardStatement => {}
        NodeKind::AssignmentStatement {
            operator,
            target,
            value: source,
        } => {
            let target = storage_target(module, target)?;
            let source = value(module, source)?;
            let result = match operator {
                AssignmentOperator::Assign => source,
                AssignmentOperator::Compound(operator) => {
                    let (ty, abstract_kind) = binary_type(module, operator, target, source)?;
                    (
                        NodeProperties {
                            abstract_kind,
                            ..NodeProperties::value(ty)
                        },
                        ty,
                    )
                }
            };
            if !assignable(module, result, target.1) {
                return Err(Error::type_mismatch(format!(
                    "cannot assign `{}` to `{}`",
                    module.types().display(result.1),
                    module.types().display(target.1)
                )));
            }
        }
        NodeKind::IncrementDecrementStatement { operator, target } => {
            let (_, ty) = storage_target(module, target)?;
            if !module.types().numeric_kind(ty).is_some_and(NumericKind::is_integer) {
                return Err(Error::unsupported_operator(
                    operator.symbol(),
                    format!("`{}`", module.types().display(ty)),
                ));
            }
        }
        NodeKind::FunctionCallStatement { call } => {
            let function = match module.kind(call) {
                NodeKind::FunctionCall { name, template, .. } => {
                    is_function_call(module, name, template)
                }
                _ => false,
            };
            if !function {
                return Err(Error::structural(
                    "only function calls can be used as statements",
                )
                .located(module.location(call)));
            }
            ensure(module, call)?;
        }
        other => {
            return Err(Error::structural(format!(
                "{} is not a statement",
                other.label()
            )))
        }
    }
    Ok(NodeProperties::default())
}

fn condition(module: &mut Module, test: NodeId, keyword: &str) -> Result<()> {
    let (_, ty) = value(module, test)?;
    if module.types().is_boolean(ty) {
        return Ok(());
    }
    Err(Error::type_mismatch(format!(
        "`{}` condition must be `bool`, found `{}`",
        keyword,
        module.types().display(ty)
    ))
    .located(module.location(test)))
}

fn storage_target(module: &mut Module, target: NodeId) -> Result<Operand> {
    let operand = value(module, target)?;
    if !operand.0.is_storage {
        return Err(Error::type_mismatch("assignment target is not a storage expression")
            .located(module.location(target)));
    }
    Ok(operand)
}

fn switch(module: &mut Module, selector: NodeId, cases: &[NodeId]) -> Result<()> {
    let (selector_properties, selector_ty) = value(module, selector)?;
    let unsigned = module.types().numeric_kind(selector_ty) == Some(NumericKind::UnsignedInteger);
    if !unsigned && selector_properties.abstract_kind != Some(AbstractKind::Int) {
        return Err(Error::type_mismatch(format!(
            "`switch` selector must be `u32`, found `{}`",
            module.types().display(selector_ty)
        ))
        .located(module.location(selector)));
    }
    let unsigned_ty = module.types_mut().numeric(NumericKind::UnsignedInteger);
    let mut seen = HashSet::new();
    let mut defaults = 0;
    for case in cases {
        let NodeKind::SwitchCase {
            selectors,
            is_default,
            ..
        } = module.kind(*case).clone()
        else {
            return Err(Error::structural("switch body holds a non-case node")
                .located(module.location(*case)));
        };
        if is_default {
            defaults += 1;
            if defaults > 1 {
                return Err(Error::structural("`switch` has more than one `default` case")
                    .located(module.location(*case)));
            }
        }
        for item in selectors {
            let operand = value(module, item)?;
            if !operand.0.is_constant || !assignable(module, operand, unsigned_ty) {
                return Err(Error::type_mismatch("case values must be constant `u32` values")
                    .located(module.location(item)));
            }
            let folded = const_eval::evaluate(module, item)?;
            if !seen.insert(folded.to_string()) {
                return Err(Error::duplicate("case value", folded.to_string())
                    .located(module.location(item)));
            }
        }
        ensure(module, *case)?;
    }
    Ok(())
}

fn return_statement(module: &mut Module, id: NodeId, result: Option<NodeId>) -> Result<()> {
    let function = module
        .function_of(id)
        .ok_or_else(|| Error::structural("`return` outside of a function"))?;
    let NodeKind::FunctionDeclaration {
        name, return_type, ..
    } = module.kind(function).clone()
    else {
        return Err(Error::structural("`return` outside of a function"));
    };
    let expected = match return_type {
        Some(return_type) => Some(declared_type(module, return_type)?),
        None => None,
    };
    match (result, expected) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(Error::type_mismatch(format!(
            "`{}` does not return a value",
            name
        ))),
        (None, Some(expected)) => Err(Error::type_mismatch(format!(
            "`{}` must return `{}`",
            name,
            module.types().display(expected)
        ))),
        (Some(result), Some(expected)) => {
            let operand = value(module, result)?;
            if assignable(module, operand, expected) {
                Ok(())
            } else {
                Err(Error::type_mismatch(format!(
                    "`{}` must return `{}`, found `{}`",
                    name,
                    module.types().display(expected),
                    module.types().display(operand.1)
                ))
                .located(module.location(result)))
            }
        }
    }
}
