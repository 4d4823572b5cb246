//! Semantic validation
//!
//!     Validation resolves every name, computes every type and stores the derived
//!     properties of each node. It works on demand: validating a node first validates what it
//!     depends on, children as well as the declarations its names resolve to, and every node
//!     is validated at most once. A node met again while its own validation is still running
//!     is part of a cycle (`alias A = B; alias B = A;`) and is reported as a structural error.
//!
//! Sweep
//!
//!     [`Module::validate`] drives the on-demand validation over the whole unit:
//!
//!         1. every top-level declaration, in source order;
//!         2. the build-in functions;
//!         3. the body of every function.
//!
//!     A function declaration validates its signature only. Bodies come last, once every
//!     signature is known, so calls between functions (including recursive ones) only ever
//!     need a validated signature.
//!
//! Layout
//!
//!     - [declarations](declarations): aliases, structs, enums, functions, variables.
//!     - [types](types): type-name resolution for type declarations and template lists.
//!     - [expressions](expressions) and [calls](calls): expression typing, operators,
//!       function calls and constructors.
//!     - [statements](statements): control flow and assignment checks.
//!     - [scope](scope): variable lookup through blocks, loops, parameters and globals.
//!     - [const_eval](const_eval): constant folding.
//!     - [attributes](attributes) and [build_in](build_in): the per-module attribute table and
//!       the build-in function set.

pub mod attributes;
pub mod build_in;
pub mod calls;
pub mod const_eval;
pub mod declarations;
pub mod expressions;
pub mod scope;
pub mod statements;
pub mod types;

use crate::shade::ast::{Module, NodeCategory, NodeId, NodeKind, NodeProperties, ValidationState};
use crate::shade::error::{Error, Result};
use crate::shade::types::TypeHandle;

impl Module {
    /// Validate the whole module. Validating twice is a no-op.
    pub fn validate(&mut self) -> Result<()> {
        if self.is_validated() {
            return Ok(());
        }
        let declarations = self.declarations().to_vec();
        for id in &declarations {
            log::debug!(
                "validating {} `{}`",
                self.kind(*id).label(),
                self.kind(*id).name().unwrap_or_default()
            );
            ensure(self, *id)?;
        }
        for id in self.build_ins().to_vec() {
            ensure(self, id)?;
        }
        for id in declarations {
            if let NodeKind::FunctionDeclaration { name, body, .. } = self.kind(id) {
                log::debug!("validating body of `{}`", name);
                let body = *body;
                ensure(self, body)?;
            }
        }
        self.mark_validated();
        Ok(())
    }
}

/// Validate `id` unless it already is, and return its properties.
pub(crate) fn ensure(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    match module.state(id) {
        ValidationState::Validated => return module.expression_properties(id),
        ValidationState::Validating => {
            let kind = module.kind(id);
            return Err(Error::structural(format!(
                "{} `{}` depends on itself",
                kind.label(),
                kind.name().unwrap_or_default()
            ))
            .located(module.location(id)));
        }
        ValidationState::Unvalidated => {}
    }
    module.node_mut(id).begin_validation();
    match determine(module, id) {
        Ok(properties) => {
            module.node_mut(id).finish_validation(properties);
            Ok(properties)
        }
        Err(error) => {
            module.node_mut(id).abort_validation();
            Err(error.located(module.location(id)))
        }
    }
}

fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    match module.kind(id).category() {
        NodeCategory::Declaration => declarations::determine(module, id),
        NodeCategory::Type => types::determine(module, id),
        NodeCategory::Expression => expressions::determine(module, id),
        NodeCategory::Statement => statements::determine(module, id),
    }
}

/// Validate an expression that must produce a value.
pub(crate) fn value(module: &mut Module, id: NodeId) -> Result<(NodeProperties, TypeHandle)> {
    let kind = module.kind(id);
    if kind.category() != NodeCategory::Expression {
        return Err(
            Error::type_mismatch(format!("{} is not a value", kind.label()))
                .located(module.location(id)),
        );
    }
    let properties = ensure(module, id)?;
    match properties.ty {
        Some(ty) => Ok((properties, ty)),
        None => Err(Error::type_mismatch("expression does not produce a value")
            .located(module.location(id))),
    }
}

/// Record properties for a node that is validated by its parent rather than on its own,
/// such as a type name inside a template list.
pub(crate) fn mark(module: &mut Module, id: NodeId, properties: NodeProperties) {
    if module.state(id) == ValidationState::Unvalidated {
        module.node_mut(id).finish_validation(properties);
    }
}

/// Type a validated node declares or evaluates to.
pub(crate) fn declared_type(module: &mut Module, id: NodeId) -> Result<TypeHandle> {
    ensure(module, id)?;
    module.type_of(id)
}
