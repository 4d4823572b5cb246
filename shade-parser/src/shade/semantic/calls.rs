//! Function calls and type constructors
//!
//!     A call `name(args)` without a template list first looks for a function of that name,
//!     user-declared or build-in. Everything else is a constructor of the type `name` (with
//!     its template list) resolves to:
//!
//!         vec3<f32>(1.0, 2.0, 3.0)    f32(x)    Light(1.0, color)    array<u32, 2>(1u, 2u)
//!
//!     `vecN`, `matCxR` and `array` may omit the template list; the element type is then
//!     inferred from the arguments.

use super::expressions::{assignable, common_type, Operand};
use super::{build_in, declared_type, ensure, types, value};
use crate::shade::ast::{AbstractKind, Module, NodeId, NodeKind, NodeProperties, TemplateItem};
use crate::shade::error::{Error, Result};
use crate::shade::types::definition::{matrix_shape, vector_size};
use crate::shade::types::{ArrayLength, NumericKind, TypeDefinition, TypeHandle};

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    let NodeKind::FunctionCall {
        name,
        template,
        arguments,
    } = module.kind(id).clone()
    else {
        return Err(Error::structural(format!(
            "{} is not a call",
            module.kind(id).label()
        )));
    };
    let operands = arguments
        .iter()
        .map(|argument| value(module, *argument))
        .collect::<Result<Vec<Operand>>>()?;
    if template.is_empty() {
        if let Some(function) = module.resolve_function(&name) {
            return call_function(module, function, &name, &operands);
        }
    }
    construct(module, &name, &template, &operands)
}

fn call_function(
    module: &mut Module,
    function: NodeId,
    name: &str,
    operands: &[Operand],
) -> Result<NodeProperties> {
    ensure(module, function)?;
    match module.kind(function).clone() {
        NodeKind::FunctionDeclaration { parameters, .. } => {
            if parameters.len() != operands.len() {
                return Err(Error::type_mismatch(format!(
                    "`{}` expects {} arguments, found {}",
                    name,
                    parameters.len(),
                    operands.len()
                )));
            }
            for (position, (parameter, operand)) in parameters.iter().zip(operands).enumerate() {
                let expected = declared_type(module, *parameter)?;
                if !assignable(module, *operand, expected) {
                    return Err(Error::type_mismatch(format!(
                        "argument {} of `{}` expects `{}`, found `{}`",
                        position + 1,
                        name,
                        module.types().display(expected),
                        module.types().display(operand.1)
                    )));
                }
            }
            Ok(NodeProperties {
                ty: module.expression_properties(function)?.ty,
                ..NodeProperties::default()
            })
        }
        NodeKind::BuildInFunction { signature, .. } => {
            let ty = build_in::call_type(module, name, signature, operands)?;
            Ok(NodeProperties::value(ty))
        }
        other => Err(Error::structural(format!(
            "`{}` resolved to {}",
            name,
            other.label()
        ))),
    }
}

/// Whether a call with this name and template is a function call rather than a constructor.
pub fn is_function_call(module: &Module, name: &str, template: &[TemplateItem]) -> bool {
    template.is_empty() && module.resolve_function(name).is_some()
}

fn construct(
    module: &mut Module,
    name: &str,
    template: &[TemplateItem],
    operands: &[Operand],
) -> Result<NodeProperties> {
    let inferred = if template.is_empty() {
        infer(module, name, operands)?
    } else {
        None
    };
    let (ty, abstract_kind) = match inferred {
        Some(inferred) => inferred,
        None => {
            let ty = types::resolve(module, name, template).map_err(|error| match error {
                Error::UnknownType { name, location } => {
                    Error::UnknownIdentifier { name, location }
                }
                other => other,
            })?;
            (ty, None)
        }
    };
    if !module.types().properties(ty).constructible {
        return Err(Error::type_mismatch(format!(
            "`{}` is not constructible",
            module.types().display(ty)
        )));
    }
    check_arguments(module, ty, operands)?;
    Ok(NodeProperties {
        is_constant: operands.iter().all(|(p, _)| p.is_constant),
        is_creation_fixed: operands.iter().all(|(p, _)| p.is_creation_fixed),
        is_storage: false,
        ty: Some(ty),
        abstract_kind,
    })
}

/// Type of a `vecN(...)`, `matCxR(...)` or `array(...)` call without template list.
fn infer(
    module: &mut Module,
    name: &str,
    operands: &[Operand],
) -> Result<Option<(TypeHandle, Option<AbstractKind>)>> {
    let family = vector_size(name).is_some() || matrix_shape(name).is_some() || name == "array";
    if !family {
        return Ok(None);
    }
    let cannot_infer = || {
        Error::type_mismatch(format!(
            "cannot infer the element type of `{}` from its arguments",
            name
        ))
    };
    if operands.is_empty() {
        return Err(cannot_infer());
    }
    if name == "array" {
        let element = common_type(module, operands).ok_or_else(cannot_infer)?;
        let length = ArrayLength::Constant(operands.len() as u32);
        let ty = module.types_mut().intern(TypeDefinition::Array {
            inner: element,
            length,
        });
        return Ok(Some((ty, None)));
    }
    let elements: Vec<Operand> = operands
        .iter()
        .map(|(properties, ty)| {
            let scalar = module.types().scalar_of(*ty);
            scalar.map(|scalar| (*properties, scalar))
        })
        .collect::<Option<_>>()
        .ok_or_else(cannot_infer)?;
    let mut scalar = common_type(module, &elements).ok_or_else(cannot_infer)?;
    let all_abstract = elements.iter().all(|(p, _)| p.abstract_kind.is_some());
    let abstract_kind = if all_abstract {
        let float = elements
            .iter()
            .any(|(p, _)| p.abstract_kind == Some(AbstractKind::Float));
        Some(if float { AbstractKind::Float } else { AbstractKind::Int })
    } else {
        None
    };
    let ty = match (vector_size(name), matrix_shape(name)) {
        (Some(size), _) => module.types_mut().vector(size, scalar),
        (None, Some((columns, rows))) => {
            if all_abstract {
                scalar = module.types_mut().numeric(NumericKind::Float);
            }
            module.types_mut().intern(TypeDefinition::Matrix {
                columns,
                rows,
                inner: scalar,
            })
        }
        (None, None) => return Ok(None),
    };
    let abstract_kind = abstract_kind.filter(|_| vector_size(name).is_some());
    Ok(Some((ty, abstract_kind)))
}

fn check_arguments(module: &mut Module, ty: TypeHandle, operands: &[Operand]) -> Result<()> {
    if operands.is_empty() {
        return Ok(());
    }
    let definition = module.types().concrete_definition(ty).clone();
    let valid = match definition {
        TypeDefinition::Boolean | TypeDefinition::Numeric(_) => {
            operands.len() == 1 && module.types().is_scalar(operands[0].1)
        }
        TypeDefinition::Vector { size, inner } => {
            vector_arguments(module, usize::from(size), inner, operands)
        }
        TypeDefinition::Matrix {
            columns,
            rows,
            inner,
        } => {
            let column = module.types_mut().vector(rows, inner);
            let columns = usize::from(columns);
            let same_shape = operands.len() == 1 && module.types().same(operands[0].1, ty);
            let by_column = operands.len() == columns
                && operands
                    .iter()
                    .all(|operand| assignable(module, *operand, column));
            let by_scalar = operands.len() == columns * usize::from(rows)
                && operands
                    .iter()
                    .all(|operand| assignable(module, *operand, inner));
            same_shape || by_column || by_scalar
        }
        TypeDefinition::Array {
            inner,
            length: ArrayLength::Constant(count),
        } => {
            operands.len() == count as usize
                && operands
                    .iter()
                    .all(|operand| assignable(module, *operand, inner))
        }
        TypeDefinition::Struct { members, .. } => {
            operands.len() == members.len()
                && members
                    .iter()
                    .zip(operands)
                    .all(|(member, operand)| assignable(module, *operand, member.ty))
        }
        _ => false,
    };
    if valid {
        return Ok(());
    }
    let found: Vec<String> = operands
        .iter()
        .map(|(_, ty)| module.types().display(*ty))
        .collect();
    Err(Error::type_mismatch(format!(
        "cannot construct `{}` from ({})",
        module.types().display(ty),
        found.join(", ")
    )))
}

/// Vector arguments: a single scalar splat, a same-size vector conversion, or components
/// (scalars and smaller vectors) adding up to the size.
fn vector_arguments(
    module: &mut Module,
    size: usize,
    inner: TypeHandle,
    operands: &[Operand],
) -> bool {
    if let [operand] = operands {
        let types = module.types();
        if types.is_scalar(operand.1) {
            return assignable(module, *operand, inner);
        }
        if types.vector_size(operand.1).map(usize::from) == Some(size) {
            let numeric = types
                .scalar_of(operand.1)
                .and_then(|scalar| types.numeric_kind(scalar))
                .is_some();
            if numeric && types.numeric_kind(inner).is_some() {
                return true;
            }
            return assignable_elements(module, *operand, inner);
        }
    }
    let mut total = 0;
    for (properties, ty) in operands {
        let components = match module.types().vector_size(*ty) {
            Some(count) => usize::from(count),
            None => 1,
        };
        total += components;
        if !assignable_elements(module, (*properties, *ty), inner) {
            return false;
        }
    }
    total == size
}

/// Whether the scalar elements of `operand` convert to `inner`.
fn assignable_elements(module: &mut Module, operand: Operand, inner: TypeHandle) -> bool {
    match module.types().scalar_of(operand.1) {
        Some(scalar) => assignable(module, (operand.0, scalar), inner),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;
    use rstest::rstest;

    fn global_type(source: &str) -> Result<String> {
        let module = parse(source)?;
        let id = module.resolve_global("x").unwrap();
        Ok(module.types().display(module.type_of(id)?))
    }

    #[rstest]
    #[case("const x = vec3<f32>(1.0, 2.0, 3.0);", "vec3<f32>")]
    #[case("const x = vec3(1u, 2u, 3u);", "vec3<u32>")]
    #[case("const x = vec4<f32>(vec2<f32>(), 1.0, 2);", "vec4<f32>")]
    #[case("const x = vec2<f32>(1);", "vec2<f32>")]
    #[case("const x = vec3<f32>(vec3<i32>());", "vec3<f32>")]
    #[case("const x = f32(3);", "f32")]
    #[case("const x = u32(1.5);", "u32")]
    #[case("const x = mat2x2<f32>(1.0, 0.0, 0.0, 1.0);", "mat2x2<f32>")]
    #[case("const x = mat2x2(vec2<f32>(), vec2<f32>());", "mat2x2<f32>")]
    #[case("const x = array(1u, 2u, 3u);", "array<u32, 3>")]
    #[case("const x = array<i32, 2>(1, 2);", "array<i32, 2>")]
    #[case("struct Light { power: f32, on: bool } const x = Light(1.0, true);", "Light")]
    #[case("alias Color = vec3<f32>; const x = Color(0.5);", "vec3<f32>")]
    #[case("const x = vec3f(1.0);", "vec3f")]
    fn test_constructors(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(global_type(source).unwrap(), expected);
    }

    #[rstest]
    #[case("const x = vec3<f32>(1.0, 2.0);", "TypeMismatchError")]
    #[case("const x = array<f32, 2>(1.0);", "TypeMismatchError")]
    #[case("const x = array<f32>();", "TypeMismatchError")]
    #[case("const x = vec3();", "TypeMismatchError")]
    #[case("struct Light { power: f32 } const x = Light(true);", "TypeMismatchError")]
    #[case("const x = nothing(1);", "UnknownIdentifierError")]
    #[case("const x = string(\"a\");", "TypeMismatchError")]
    fn test_constructor_errors(#[case] source: &str, #[case] kind: &str) {
        assert_eq!(global_type(source).unwrap_err().kind(), kind);
    }

    #[rstest]
    #[case("fn g(a: i32, b: f32) -> f32 { return b; } fn f() { let x = g(1, 2.0); }", None)]
    #[case("fn g(a: i32) {} fn f() { g(1, 2); }", Some("TypeMismatchError"))]
    #[case("fn g(a: u32) {} fn f() { g(1.0); }", Some("TypeMismatchError"))]
    #[case("fn g() {} fn f() { let x = g(); }", Some("TypeMismatchError"))]
    #[case("fn f() -> i32 { return f(); }", None)]
    fn test_function_calls(#[case] source: &str, #[case] error: Option<&str>) {
        let result = parse(source);
        assert_eq!(result.err().map(|e| e.kind()), error);
    }

    #[test]
    fn test_constructor_constness() {
        let module = parse(
            "fn f(a: f32) { let v = vec2<f32>(a, 1.0); }\n\
             const c = vec2<f32>(1.0, 2.0);",
        )
        .unwrap();
        let c = module.resolve_global("c").unwrap();
        assert!(module.expression_properties(c).unwrap().is_constant);
        assert!(is_function_call(&module, "f", &[]));
        assert!(!is_function_call(&module, "vec2", &[]));
    }
}
