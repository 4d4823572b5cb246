//! Type-name resolution
//!
//!     A raw name plus an optional template list resolves in this order, first match wins:
//!
//!         struct -> alias -> enum -> build-in family -> numeric -> bool -> string
//!
//!     Build-in families check the arity and kind of their template items. A template item
//!     written as a bare identifier reaches this module as an expression and is re-read as a
//!     type name when its position requires a type (`array<Light, 4>`).

use super::{const_eval, declared_type, ensure, mark};
use crate::shade::ast::operators::VariableKind;
use crate::shade::ast::{Module, NodeId, NodeKind, NodeProperties, TemplateItem};
use crate::shade::error::{Error, Result};
use crate::shade::types::definition::{build_in_alias, matrix_shape, vector_size};
use crate::shade::types::{
    ArrayLength, NumericKind, SamplerKind, TextureKind, TypeDefinition, TypeHandle,
};

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    let NodeKind::TypeDeclaration { name, template } = module.kind(id).clone() else {
        return Err(Error::structural(format!(
            "{} is not a type declaration",
            module.kind(id).label()
        )));
    };
    let ty = resolve(module, &name, &template)?;
    Ok(NodeProperties {
        ty: Some(ty),
        ..NodeProperties::default()
    })
}

/// Resolve a type name with its template list.
pub fn resolve(module: &mut Module, name: &str, template: &[TemplateItem]) -> Result<TypeHandle> {
    if let Some(declaration) = module.resolve_struct(name) {
        expect_arity(name, template, 0, 0)?;
        return declared_type(module, declaration);
    }
    if let Some(declaration) = module.resolve_alias(name) {
        expect_arity(name, template, 0, 0)?;
        return declared_type(module, declaration);
    }
    if let Some(declaration) = module.resolve_enum(name) {
        expect_arity(name, template, 0, 0)?;
        return declared_type(module, declaration);
    }
    if let Some(size) = vector_size(name) {
        expect_arity(name, template, 1, 1)?;
        let inner = template_type(module, template[0])?;
        if !module.types().is_scalar(inner) {
            return Err(item_mismatch(module, name, "a scalar", inner));
        }
        return Ok(module.types_mut().vector(size, inner));
    }
    if let Some((columns, rows)) = matrix_shape(name) {
        expect_arity(name, template, 1, 1)?;
        let inner = template_type(module, template[0])?;
        if !module.types().numeric_kind(inner).is_some_and(NumericKind::is_float) {
            return Err(item_mismatch(module, name, "a float scalar", inner));
        }
        return Ok(module.types_mut().intern(TypeDefinition::Matrix {
            columns,
            rows,
            inner,
        }));
    }
    match name {
        "array" => {
            expect_arity(name, template, 1, 2)?;
            let inner = template_type(module, template[0])?;
            let properties = module.types().properties(inner);
            if !properties.plain || !properties.fixed {
                return Err(item_mismatch(
                    module,
                    name,
                    "a plain type of fixed size",
                    inner,
                ));
            }
            let length = match template.get(1) {
                Some(item) => array_length(module, *item)?,
                None => ArrayLength::Runtime,
            };
            return Ok(module
                .types_mut()
                .intern(TypeDefinition::Array { inner, length }));
        }
        "ptr" => {
            expect_arity(name, template, 1, 1)?;
            let inner = template_type(module, template[0])?;
            return Ok(module.types_mut().pointer(inner));
        }
        "sampler" | "sampler_comparison" => {
            expect_arity(name, template, 0, 0)?;
            let kind = if name == "sampler" {
                SamplerKind::Sampler
            } else {
                SamplerKind::Comparison
            };
            return Ok(module.types_mut().intern(TypeDefinition::Sampler(kind)));
        }
        _ => {}
    }
    if let Some(kind) = TextureKind::from_type_name(name) {
        if kind.is_depth() {
            expect_arity(name, template, 0, 0)?;
            return Ok(module
                .types_mut()
                .intern(TypeDefinition::Texture { kind, inner: None }));
        }
        expect_arity(name, template, 1, 1)?;
        let inner = template_type(module, template[0])?;
        if module.types().numeric_kind(inner) == Some(NumericKind::Half)
            || module.types().numeric_kind(inner).is_none()
        {
            return Err(item_mismatch(module, name, "`f32`, `i32` or `u32`", inner));
        }
        return Ok(module.types_mut().intern(TypeDefinition::Texture {
            kind,
            inner: Some(inner),
        }));
    }
    if let Some((family, kind)) = build_in_alias(name) {
        expect_arity(name, template, 0, 0)?;
        let scalar = module.types_mut().numeric(kind);
        let target = match (vector_size(family), matrix_shape(family)) {
            (Some(size), _) => module.types_mut().vector(size, scalar),
            (None, Some((columns, rows))) => module.types_mut().intern(TypeDefinition::Matrix {
                columns,
                rows,
                inner: scalar,
            }),
            (None, None) => return Err(Error::unknown_type(name)),
        };
        return Ok(module.types_mut().intern(TypeDefinition::BuildInAlias {
            name: name.to_string(),
            target,
        }));
    }
    if let Some(kind) = NumericKind::from_type_name(name) {
        expect_arity(name, template, 0, 0)?;
        return Ok(module.types_mut().numeric(kind));
    }
    match name {
        "bool" => {
            expect_arity(name, template, 0, 0)?;
            Ok(module.types_mut().boolean())
        }
        "string" => {
            expect_arity(name, template, 0, 0)?;
            Ok(module.types_mut().string())
        }
        _ => Err(Error::unknown_type(name)),
    }
}

fn expect_arity(name: &str, template: &[TemplateItem], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&template.len()) {
        return Ok(());
    }
    let expected = match (min, max) {
        (0, 0) => "no template arguments".to_string(),
        (1, 1) => "1 template argument".to_string(),
        (min, max) if min == max => format!("{} template arguments", min),
        (min, max) => format!("{} to {} template arguments", min, max),
    };
    Err(Error::type_mismatch(format!(
        "`{}` expects {}, found {}",
        name,
        expected,
        template.len()
    )))
}

fn item_mismatch(module: &Module, name: &str, expected: &str, found: TypeHandle) -> Error {
    Error::type_mismatch(format!(
        "`{}` expects {} as template argument, found `{}`",
        name,
        expected,
        module.types().display(found)
    ))
}

/// Type named by a template item.
pub(crate) fn template_type(module: &mut Module, item: TemplateItem) -> Result<TypeHandle> {
    match item {
        TemplateItem::Type(id) => declared_type(module, id),
        TemplateItem::Expression(id) => {
            let NodeKind::VariableName { name } = module.kind(id).clone() else {
                return Err(Error::type_mismatch(format!(
                    "{} is not a type",
                    module.kind(id).label()
                ))
                .located(module.location(id)));
            };
            let ty = resolve(module, &name, &[])
                .map_err(|error| error.located(module.location(id)))?;
            mark(
                module,
                id,
                NodeProperties {
                    ty: Some(ty),
                    ..NodeProperties::default()
                },
            );
            Ok(ty)
        }
    }
}

/// Length item of an array type: a `param` reference or a positive constant.
fn array_length(module: &mut Module, item: TemplateItem) -> Result<ArrayLength> {
    let TemplateItem::Expression(id) = item else {
        return Err(Error::type_mismatch("array length must be an expression")
            .located(module.location(item.id())));
    };
    if let NodeKind::VariableName { name } = module.kind(id).clone() {
        let declaration = module.resolve_variable(id, &name);
        if let Some(declaration) = declaration {
            if matches!(
                module.kind(declaration),
                NodeKind::VariableDeclaration {
                    kind: VariableKind::Param,
                    ..
                }
            ) {
                ensure(module, id)?;
                let ty = module.type_of(id)?;
                if !module.types().numeric_kind(ty).is_some_and(NumericKind::is_integer) {
                    return Err(Error::type_mismatch(format!(
                        "array length `{}` must be an integer",
                        name
                    ))
                    .located(module.location(id)));
                }
                return Ok(ArrayLength::Param(name));
            }
        }
    }
    let (properties, _) = super::value(module, id)?;
    if !properties.is_constant {
        return Err(
            Error::type_mismatch("array length must be a constant or a `param`")
                .located(module.location(id)),
        );
    }
    let length = const_eval::evaluate(module, id)?;
    match length.as_integer().map(u32::try_from) {
        Some(Ok(count)) if count > 0 => Ok(ArrayLength::Constant(count)),
        _ => Err(Error::type_mismatch(format!(
            "array length must be a positive integer, found {}",
            length
        ))
        .located(module.location(id))),
    }
}
