//! Declaration checks
//!
//!     A declaration reports the type it introduces: an alias its target, a struct or enum
//!     its own type, a function its return type and a variable the type of the values it
//!     holds. Variable declarations also report how a reference to them behaves (constant,
//!     creation-fixed or assignable storage), which every `VariableName` bound to them
//!     inherits.

use super::attributes::{self, validate_list};
use super::expressions::assignable;
use super::{const_eval, declared_type, ensure, value};
use crate::shade::ast::operators::VariableKind;
use crate::shade::ast::{EnumInitializer, Module, NodeId, NodeKind, NodeProperties};
use crate::shade::error::{Error, Result};
use crate::shade::types::{ArrayLength, NumericKind, StructMember, TypeDefinition, TypeHandle};
use std::collections::HashSet;

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    match module.kind(id).clone() {
        NodeKind::AliasDeclaration { target, .. } => {
            let ty = declared_type(module, target)?;
            Ok(typed(ty))
        }
        NodeKind::StructDeclaration {
            name,
            attributes,
            properties,
        } => structure(module, &name, &attributes, &properties),
        NodeKind::StructProperty {
            name,
            attributes,
            ty,
        } => {
            validate_list(module, &attributes)?;
            let ty = declared_type(module, ty)?;
            if !module.types().properties(ty).plain {
                return Err(Error::type_mismatch(format!(
                    "struct member `{}` must have a plain type, found `{}`",
                    name,
                    module.types().display(ty)
                )));
            }
            Ok(typed(ty))
        }
        NodeKind::EnumDeclaration { values, .. } => {
            const_eval::enum_values(&values)?;
            let is_string = matches!(
                values.first().and_then(|value| value.value.as_ref()),
                Some(EnumInitializer::String(_))
            );
            let ty = if is_string {
                module.types_mut().string()
            } else {
                module.types_mut().numeric(NumericKind::UnsignedInteger)
            };
            Ok(NodeProperties::constant(ty))
        }
        NodeKind::FunctionDeclaration {
            attributes,
            parameters,
            return_attributes,
            return_type,
            ..
        } => {
            validate_list(module, &attributes)?;
            let mut names = HashSet::new();
            for parameter in &parameters {
                ensure(module, *parameter)?;
                let name = module.kind(*parameter).name().unwrap_or_default().to_string();
                if !names.insert(name.clone()) {
                    return Err(Error::duplicate("parameter", name)
                        .located(module.location(*parameter)));
                }
            }
            validate_list(module, &return_attributes)?;
            let Some(return_type) = return_type else {
                return Ok(NodeProperties::default());
            };
            let ty = declared_type(module, return_type)?;
            if !module.types().properties(ty).plain {
                return Err(Error::type_mismatch(format!(
                    "functions must return a plain type, found `{}`",
                    module.types().display(ty)
                ))
                .located(module.location(return_type)));
            }
            Ok(typed(ty))
        }
        NodeKind::FunctionParameter {
            name,
            attributes,
            ty,
        } => {
            validate_list(module, &attributes)?;
            let ty = declared_type(module, ty)?;
            if matches!(module.types().concrete_definition(ty), TypeDefinition::String) {
                return Err(Error::type_mismatch(format!(
                    "parameter `{}` cannot have type `string`",
                    name
                )));
            }
            Ok(NodeProperties::value(ty))
        }
        NodeKind::BuildInFunction { .. } => Ok(NodeProperties::default()),
        NodeKind::Attribute { .. } => attributes::determine(module, id),
        NodeKind::VariableDeclaration {
            kind,
            name,
            attributes,
            ty,
            value: initializer,
        } => variable(module, id, kind, &name, &attributes, ty, initializer),
        other => Err(Error::structural(format!(
            "{} is not a declaration",
            other.label()
        ))),
    }
}

fn typed(ty: TypeHandle) -> NodeProperties {
    NodeProperties {
        ty: Some(ty),
        ..NodeProperties::default()
    }
}

fn structure(
    module: &mut Module,
    name: &str,
    attributes: &[NodeId],
    properties: &[NodeId],
) -> Result<NodeProperties> {
    validate_list(module, attributes)?;
    if properties.is_empty() {
        return Err(Error::structural(format!("struct `{}` has no members", name)));
    }
    let mut members = Vec::with_capacity(properties.len());
    let mut names = HashSet::new();
    for (position, property) in properties.iter().enumerate() {
        let ty = declared_type(module, *property)?;
        let member = module.kind(*property).name().unwrap_or_default().to_string();
        if !names.insert(member.clone()) {
            return Err(Error::duplicate("struct member", member)
                .located(module.location(*property)));
        }
        let last = position + 1 == properties.len();
        if !last && !module.types().properties(ty).fixed {
            return Err(Error::type_mismatch(format!(
                "only the last member of `{}` may have a runtime size, `{}` is `{}`",
                name,
                member,
                module.types().display(ty)
            ))
            .located(module.location(*property)));
        }
        members.push(StructMember { name: member, ty });
    }
    let ty = module.types_mut().intern(TypeDefinition::Struct {
        name: name.to_string(),
        members,
    });
    Ok(typed(ty))
}

fn variable(
    module: &mut Module,
    id: NodeId,
    kind: VariableKind,
    name: &str,
    attributes: &[NodeId],
    declared: Option<NodeId>,
    initializer: Option<NodeId>,
) -> Result<NodeProperties> {
    let global = module.function_of(id).is_none();
    if global && !kind.is_global() {
        return Err(Error::structural(format!(
            "`{}` declarations are not allowed at module scope",
            kind
        )));
    }
    if !global && !kind.is_local() {
        return Err(Error::structural(format!(
            "`{}` declarations are only allowed at module scope",
            kind
        )));
    }
    validate_list(module, attributes)?;
    match kind {
        VariableKind::Const | VariableKind::Param if initializer.is_none() => {
            return Err(Error::structural(format!("`{} {}` needs an initializer", kind, name)))
        }
        VariableKind::Storage | VariableKind::Uniform if initializer.is_some() => {
            return Err(Error::structural(format!(
                "`{} {}` cannot have an initializer",
                kind, name
            )))
        }
        _ => {}
    }

    let declared_ty = match declared {
        Some(declared) => Some(declared_type(module, declared)?),
        None => None,
    };
    let mut abstract_kind = None;
    let ty = match (declared_ty, initializer) {
        (declared_ty, Some(initializer)) => {
            let operand = value(module, initializer)?;
            if kind.is_constant() && !operand.0.is_constant {
                return Err(Error::type_mismatch(format!(
                    "`const {}` must be initialized with a constant expression",
                    name
                ))
                .located(module.location(initializer)));
            }
            if kind == VariableKind::Param && !operand.0.is_creation_fixed {
                return Err(Error::type_mismatch(format!(
                    "`param {}` must be initialized with a value fixed at pipeline creation",
                    name
                ))
                .located(module.location(initializer)));
            }
            match declared_ty {
                Some(declared_ty) => {
                    if !assignable(module, operand, declared_ty) {
                        return Err(Error::type_mismatch(format!(
                            "cannot initialize `{}: {}` with `{}`",
                            name,
                            module.types().display(declared_ty),
                            module.types().display(operand.1)
                        ))
                        .located(module.location(initializer)));
                    }
                    declared_ty
                }
                None => {
                    if kind.is_constant() {
                        abstract_kind = operand.0.abstract_kind;
                    }
                    operand.1
                }
            }
        }
        (Some(declared_ty), None) => declared_ty,
        (None, None) => {
            return Err(Error::structural(format!(
                "`{} {}` needs a type or an initializer",
                kind, name
            )))
        }
    };

    check_storage(module, kind, name, ty)?;
    if let (VariableKind::Const, Some(initializer)) = (kind, initializer) {
        const_eval::check_initializer(module, initializer, ty, abstract_kind.is_some())?;
    }
    Ok(NodeProperties {
        is_constant: kind.is_constant(),
        is_creation_fixed: kind.is_creation_fixed(),
        is_storage: kind.is_storage(),
        ty: Some(ty),
        abstract_kind,
    })
}

/// Type restrictions that depend on where the variable lives.
fn check_storage(module: &Module, kind: VariableKind, name: &str, ty: TypeHandle) -> Result<()> {
    let types = module.types();
    let properties = types.properties(ty);
    let opaque = matches!(
        types.concrete_definition(ty),
        TypeDefinition::Sampler(_) | TypeDefinition::Texture { .. }
    );
    let allowed = match kind {
        VariableKind::Const => true,
        VariableKind::Param => types.is_scalar(ty),
        VariableKind::Storage => host_shareable(module, ty),
        VariableKind::Uniform => opaque || (properties.shareable && properties.fixed),
        VariableKind::Let | VariableKind::Workgroup | VariableKind::Private => properties.storable,
    };
    if allowed {
        return Ok(());
    }
    let expected = match kind {
        VariableKind::Param => "a scalar type",
        VariableKind::Storage => "a host-shareable type",
        VariableKind::Uniform => "a fixed host-shareable type, a sampler or a texture",
        _ => "a storable type",
    };
    Err(Error::type_mismatch(format!(
        "`{} {}` needs {}, found `{}`",
        kind,
        name,
        expected,
        types.display(ty)
    )))
}

/// Shareable, also allowing an array sized at runtime or by a `param`, on its own or as the
/// last struct member.
fn host_shareable(module: &Module, ty: TypeHandle) -> bool {
    let types = module.types();
    let runtime_array = |ty: TypeHandle| match types.concrete_definition(ty) {
        TypeDefinition::Array { inner, length } => {
            !matches!(length, ArrayLength::Constant(_)) && types.properties(*inner).shareable
        }
        _ => false,
    };
    match types.concrete_definition(ty) {
        TypeDefinition::Struct { members, .. } => match members.split_last() {
            Some((last, leading)) => {
                leading.iter().all(|member| types.properties(member.ty).shareable)
                    && (types.properties(last.ty).shareable || runtime_array(last.ty))
            }
            None => false,
        },
        _ => types.properties(ty).shareable || runtime_array(ty),
    }
}

#[cfg(test)]
mod tests {
    use crate::shade::ast::{AbstractKind, Module, NodeId};
    use crate::shade::parsing::parse;
    use rstest::rstest;

    fn global(module: &Module, name: &str) -> NodeId {
        module.resolve_global(name).unwrap()
    }

    #[test]
    fn test_const_declaration() {
        let module = parse("const myInt: i32 = 10;").unwrap();
        let id = global(&module, "myInt");
        let properties = module.expression_properties(id).unwrap();
        assert!(properties.is_constant);
        assert!(properties.is_creation_fixed);
        assert!(!properties.is_storage);
        assert_eq!(module.types().display(properties.ty.unwrap()), "i32");
        assert_eq!(properties.abstract_kind, None);
    }

    #[test]
    fn test_untyped_const_stays_abstract() {
        let module = parse("const scale = 2.5; const count = 3; private total = count;").unwrap();
        let scale = module.expression_properties(global(&module, "scale")).unwrap();
        assert_eq!(scale.abstract_kind, Some(AbstractKind::Float));
        let count = module.expression_properties(global(&module, "count")).unwrap();
        assert_eq!(count.abstract_kind, Some(AbstractKind::Int));
        let total = module.expression_properties(global(&module, "total")).unwrap();
        assert_eq!(total.abstract_kind, None);
        assert!(total.is_storage);
    }

    #[test]
    fn test_struct_type() {
        let source = "struct Light { position: vec3<f32>, power: f32 }\n\
                      struct Lights { count: u32, items: array<Light> }\n\
                      storage lights: Lights;";
        let module = parse(source).unwrap();
        let light = module.resolve_struct("Light").unwrap();
        let ty = module.type_of(light).unwrap();
        assert_eq!(module.types().identifier(ty), "ID:STRUCT->Light");
        let lights = module.type_of(module.resolve_struct("Lights").unwrap()).unwrap();
        assert!(module.types().properties(lights).fixed);
        assert!(!module.types().properties(lights).shareable);
    }

    #[test]
    fn test_function_type_is_return_type() {
        let module = parse("fn f(a: f32) -> vec2<f32> { return vec2(a, a); } fn g() {}").unwrap();
        let f = module.resolve_function("f").unwrap();
        assert_eq!(module.types().display(module.type_of(f).unwrap()), "vec2<f32>");
        let g = module.resolve_function("g").unwrap();
        assert!(module.type_of(g).is_err());
    }

    #[rstest]
    #[case("alias Color = vec4<f32>; uniform tint: Color;")]
    #[case("enum Names { first = \"a\", second = \"b\" } const n: Names = Names.first;")]
    #[case("param width: u32 = 64u; storage data: array<f32, width>;")]
    #[case("param height = 8u; const base = 4u;")]
    #[case("storage values: array<u32>;")]
    #[case("uniform s: sampler; uniform t: texture_2d<f32>;")]
    #[case("workgroup tile: array<f32, 64>;")]
    #[case("const greeting = \"hello\";")]
    #[case("fn f() { let x: f32 = 1; let y = x; const z = 2; }")]
    fn test_valid_declarations(#[case] source: &str) {
        parse(source).unwrap();
    }

    #[rstest]
    #[case("alias A = B; alias B = A;", "StructuralError")]
    #[case("struct S { a: S }", "StructuralError")]
    #[case("struct S { a: f32, a: u32 }", "DuplicateDeclarationError")]
    #[case("struct S { a: array<f32>, b: f32 }", "TypeMismatchError")]
    #[case("struct S { s: sampler }", "TypeMismatchError")]
    #[case("enum E { a = 1, b = \"x\" }", "TypeMismatchError")]
    #[case("fn f(a: f32, a: f32) {}", "DuplicateDeclarationError")]
    #[case("fn f() -> sampler {}", "TypeMismatchError")]
    #[case("let x = 1;", "StructuralError")]
    #[case("fn f() { private x: f32; }", "StructuralError")]
    #[case("const c: f32;", "StructuralError")]
    #[case("storage data: array<f32> = 1;", "StructuralError")]
    #[case("fn f() { let x; }", "StructuralError")]
    #[case("private p: f32; const c = p;", "TypeMismatchError")]
    #[case("private p: f32 = 1.0; param q = p;", "TypeMismatchError")]
    #[case("const c: u32 = 1.5;", "TypeMismatchError")]
    #[case("param v = vec2(1u, 2u);", "TypeMismatchError")]
    #[case("storage flags: bool;", "TypeMismatchError")]
    #[case("uniform data: array<f32>;", "TypeMismatchError")]
    #[case("private s: sampler;", "TypeMismatchError")]
    fn test_invalid_declarations(#[case] source: &str, #[case] kind: &str) {
        assert_eq!(parse(source).unwrap_err().kind(), kind);
    }
}
