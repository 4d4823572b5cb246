//! Build-in functions
//!
//!     The functions every module can call without declaring them. They are injected into the
//!     function namespace after the source's own declarations, so a user function with the
//!     same name shadows the build-in. Build-in nodes have no source position and are never
//!     serialized.

use super::expressions::{common_type, with_scalar, Operand};
use crate::shade::ast::{BuildInSignature, Module, NodeKind};
use crate::shade::error::{Error, Result};
use crate::shade::types::{self, NumericKind, SamplerKind, TypeDefinition, TypeHandle};

use BuildInSignature::*;

pub const BUILD_INS: &[(&str, BuildInSignature)] = &[
    ("abs", Abs),
    ("sin", FloatComponentWise),
    ("cos", FloatComponentWise),
    ("tan", FloatComponentWise),
    ("sqrt", FloatComponentWise),
    ("exp", FloatComponentWise),
    ("log", FloatComponentWise),
    ("floor", FloatComponentWise),
    ("ceil", FloatComponentWise),
    ("fract", FloatComponentWise),
    ("normalize", Normalize),
    ("min", MinMax),
    ("max", MinMax),
    ("clamp", Clamp),
    ("mix", Mix),
    ("pow", Pow),
    ("dot", Dot),
    ("cross", Cross),
    ("length", Length),
    ("distance", Distance),
    ("select", Select),
    ("all", AllAny),
    ("any", AllAny),
    ("textureSample", TextureSample),
    ("arrayLength", ArrayLength),
];

/// Add every build-in function the module does not declare itself.
pub fn inject(module: &mut Module) -> Result<()> {
    let mut injected = 0;
    for (name, signature) in BUILD_INS {
        let kind = NodeKind::BuildInFunction {
            name: name.to_string(),
            signature: *signature,
        };
        if module.inject_build_in(kind)?.is_some() {
            injected += 1;
        }
    }
    log::debug!("injected {} build-in functions", injected);
    Ok(())
}

fn arity(signature: BuildInSignature) -> usize {
    match signature {
        FloatComponentWise | Abs | Normalize | Length | AllAny | ArrayLength => 1,
        MinMax | Pow | Dot | Cross | Distance => 2,
        Clamp | Mix | Select | TextureSample => 3,
    }
}

/// Result type of a call to build-in `name` with the given arguments.
pub(crate) fn call_type(
    module: &mut Module,
    name: &str,
    signature: BuildInSignature,
    arguments: &[Operand],
) -> Result<TypeHandle> {
    if arguments.len() != arity(signature) {
        return Err(Error::type_mismatch(format!(
            "`{}` expects {} arguments, found {}",
            name,
            arity(signature),
            arguments.len()
        )));
    }
    match signature {
        FloatComponentWise | Mix | Pow => float_shape(module, arguments)
            .ok_or_else(|| mismatch(module, name, arguments, "float scalars or vectors")),
        Abs | MinMax | Clamp => numeric_shape(module, arguments)
            .ok_or_else(|| mismatch(module, name, arguments, "numeric scalars or vectors")),
        Normalize | Cross => {
            let size = if signature == Cross { Some(3) } else { None };
            float_shape(module, arguments)
                .filter(|ty| {
                    let actual = module.types().vector_size(*ty);
                    actual.is_some() && (size.is_none() || actual == size)
                })
                .ok_or_else(|| mismatch(module, name, arguments, "float vectors"))
        }
        Length | Distance => float_shape(module, arguments)
            .and_then(|ty| module.types().scalar_of(ty))
            .ok_or_else(|| mismatch(module, name, arguments, "float scalars or vectors")),
        Dot => numeric_shape(module, arguments)
            .filter(|ty| module.types().vector_size(*ty).is_some())
            .and_then(|ty| module.types().scalar_of(ty))
            .ok_or_else(|| mismatch(module, name, arguments, "numeric vectors")),
        Select => {
            let expected = "two values of one type and a bool";
            let value = common_type(module, &arguments[..2])
                .ok_or_else(|| mismatch(module, name, arguments, expected))?;
            let condition = arguments[2].1;
            let types = module.types();
            let condition_matches = types.is_boolean(condition)
                || (types.scalar_of(condition).is_some_and(|s| types.is_boolean(s))
                    && types.vector_size(condition) == types.vector_size(value));
            if !condition_matches {
                return Err(mismatch(module, name, arguments, expected));
            }
            Ok(value)
        }
        AllAny => {
            let ty = arguments[0].1;
            let types = module.types();
            if types.scalar_of(ty).is_some_and(|s| types.is_boolean(s)) {
                Ok(module.types_mut().boolean())
            } else {
                Err(mismatch(module, name, arguments, "a bool scalar or vector"))
            }
        }
        TextureSample => texture_sample(module, arguments).ok_or_else(|| {
            mismatch(module, name, arguments, "a texture, a sampler and coordinates")
        }),
        ArrayLength => {
            let pointee = match module.types().concrete_definition(arguments[0].1) {
                TypeDefinition::Pointer { inner } => Some(*inner),
                _ => None,
            };
            let runtime = pointee.is_some_and(|inner| {
                matches!(
                    module.types().concrete_definition(inner),
                    TypeDefinition::Array {
                        length: types::ArrayLength::Runtime,
                        ..
                    }
                )
            });
            if !runtime {
                let expected = "a pointer to a runtime-sized array";
                return Err(mismatch(module, name, arguments, expected));
            }
            Ok(module.types_mut().numeric(NumericKind::UnsignedInteger))
        }
    }
}

fn mismatch(module: &Module, name: &str, arguments: &[Operand], expected: &str) -> Error {
    let found: Vec<String> = arguments
        .iter()
        .map(|(_, ty)| module.types().display(*ty))
        .collect();
    Error::type_mismatch(format!(
        "`{}` expects {}, found ({})",
        name,
        expected,
        found.join(", ")
    ))
}

/// Common numeric scalar or vector type of the arguments.
fn numeric_shape(module: &mut Module, arguments: &[Operand]) -> Option<TypeHandle> {
    let ty = common_type(module, arguments)?;
    let types = module.types();
    let numeric = types.scalar_of(ty).and_then(|s| types.numeric_kind(s)).is_some();
    let shaped = types.is_scalar(ty) || types.vector_size(ty).is_some();
    (numeric && shaped).then_some(ty)
}

/// Common float scalar or vector type. Arguments that are all abstract integers become `f32`.
fn float_shape(module: &mut Module, arguments: &[Operand]) -> Option<TypeHandle> {
    let ty = numeric_shape(module, arguments)?;
    let kind = module
        .types()
        .scalar_of(ty)
        .and_then(|s| module.types().numeric_kind(s))?;
    if kind.is_float() {
        return Some(ty);
    }
    let all_abstract = arguments.iter().all(|(p, _)| p.abstract_kind.is_some());
    if all_abstract {
        with_scalar(module, ty, NumericKind::Float)
    } else {
        None
    }
}

fn texture_sample(module: &mut Module, arguments: &[Operand]) -> Option<TypeHandle> {
    let (texture, sampler, coordinates) = (arguments[0].1, arguments[1].1, arguments[2].1);
    let types = module.types();
    let depth = match types.concrete_definition(texture) {
        TypeDefinition::Texture { kind, .. } => kind.is_depth(),
        _ => return None,
    };
    if !matches!(
        types.concrete_definition(sampler),
        TypeDefinition::Sampler(SamplerKind::Sampler)
    ) {
        return None;
    }
    let float_coordinates = types
        .scalar_of(coordinates)
        .and_then(|s| types.numeric_kind(s))
        == Some(NumericKind::Float);
    if !float_coordinates || types.vector_size(coordinates).is_none() {
        return None;
    }
    let scalar = module.types_mut().numeric(NumericKind::Float);
    if depth {
        Some(scalar)
    } else {
        Some(module.types_mut().vector(4, scalar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;
    use rstest::rstest;

    fn return_type(source: &str) -> crate::shade::error::Result<String> {
        let module = parse(source)?;
        let f = module.resolve_function("f").unwrap();
        Ok(module.types().display(module.type_of(f)?))
    }

    #[test]
    fn test_every_build_in_is_injected() {
        let module = parse("").unwrap();
        assert_eq!(module.build_ins().len(), BUILD_INS.len());
        for (name, _) in BUILD_INS {
            let id = module.resolve_function(name).unwrap();
            assert!(module.node(id).is_build_in());
        }
    }

    #[rstest]
    #[case("fn f(v: vec3<f32>) -> vec3<f32> { return normalize(v); }")]
    #[case("fn f(v: vec3<f32>) -> f32 { return length(v) + dot(v, v); }")]
    #[case("fn f(a: i32) -> i32 { return clamp(a, 0, 10); }")]
    #[case("fn f() -> f32 { return sqrt(4); }")]
    #[case("fn f(a: vec2<f32>, b: vec2<f32>) -> vec2<f32> { return select(a, b, true); }")]
    #[case("fn f(b: vec4<bool>) -> bool { return all(b) || any(b); }")]
    #[case("fn f(t: texture_2d<f32>, s: sampler, uv: vec2<f32>) -> vec4<f32> { return textureSample(t, s, uv); }")]
    fn test_valid_calls(#[case] source: &str) {
        parse(source).unwrap();
    }

    #[rstest]
    #[case("fn f(a: i32) -> i32 { return sqrt(a); }")]
    #[case("fn f(a: f32) -> f32 { return cross(a, a); }")]
    #[case("fn f(a: f32, b: i32) -> f32 { return min(a, b); }")]
    #[case("fn f(a: f32) -> f32 { return pow(a); }")]
    fn test_invalid_calls(#[case] source: &str) {
        assert_eq!(parse(source).unwrap_err().kind(), "TypeMismatchError");
    }

    #[test]
    fn test_depth_texture_sample_is_scalar() {
        let source = "fn f(t: texture_depth_2d, s: sampler, uv: vec2<f32>) -> f32 { \
                      return textureSample(t, s, uv); }";
        assert_eq!(return_type(source).unwrap(), "f32");
    }
}
