//! Type definitions
//!
//!     The closed set of type variants. A definition refers to its component types through
//!     [`TypeHandle`]s into the module's [registry](super::registry), so definitions are
//!     small, cheap to compare and never recursive by value.
//!
//!     Build-in type names:
//!
//!         - scalars `bool`, `i32`, `u32`, `f32`, `f16`
//!         - `vec2`, `vec3`, `vec4` with one scalar template item
//!         - `matCxR` (C, R in 2..=4) with one float template item
//!         - `array` with an element type and an optional length
//!         - `ptr` with one type
//!         - `sampler`, `sampler_comparison`
//!         - sampled textures (`texture_2d<f32>`, ...) and depth textures (no template)
//!         - `string`
//!         - shorthand aliases such as `vec3f` or `mat4x4h`

use super::registry::TypeHandle;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar numeric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Integer,
    UnsignedInteger,
    Float,
    Half,
}

impl NumericKind {
    pub const ALL: [NumericKind; 4] = [
        NumericKind::Integer,
        NumericKind::UnsignedInteger,
        NumericKind::Float,
        NumericKind::Half,
    ];

    /// The source spelling, `i32`, `u32`, `f32` or `f16`.
    pub fn type_name(self) -> &'static str {
        match self {
            NumericKind::Integer => "i32",
            NumericKind::UnsignedInteger => "u32",
            NumericKind::Float => "f32",
            NumericKind::Half => "f16",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        NumericKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == name)
    }

    /// Suffix letter used by shorthand aliases and literals.
    pub fn suffix(self) -> char {
        match self {
            NumericKind::Integer => 'i',
            NumericKind::UnsignedInteger => 'u',
            NumericKind::Float => 'f',
            NumericKind::Half => 'h',
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, NumericKind::Integer | NumericKind::UnsignedInteger)
    }

    pub fn is_float(self) -> bool {
        !self.is_integer()
    }

    pub fn is_signed(self) -> bool {
        self != NumericKind::UnsignedInteger
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SamplerKind {
    Sampler,
    Comparison,
}

impl SamplerKind {
    pub fn type_name(self) -> &'static str {
        match self {
            SamplerKind::Sampler => "sampler",
            SamplerKind::Comparison => "sampler_comparison",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    Texture1d,
    Texture2d,
    Texture2dArray,
    Texture3d,
    Cube,
    CubeArray,
    Multisampled2d,
    Depth2d,
    Depth2dArray,
    DepthCube,
    DepthCubeArray,
    DepthMultisampled2d,
}

impl TextureKind {
    pub const ALL: [TextureKind; 12] = [
        TextureKind::Texture1d,
        TextureKind::Texture2d,
        TextureKind::Texture2dArray,
        TextureKind::Texture3d,
        TextureKind::Cube,
        TextureKind::CubeArray,
        TextureKind::Multisampled2d,
        TextureKind::Depth2d,
        TextureKind::Depth2dArray,
        TextureKind::DepthCube,
        TextureKind::DepthCubeArray,
        TextureKind::DepthMultisampled2d,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            TextureKind::Texture1d => "texture_1d",
            TextureKind::Texture2d => "texture_2d",
            TextureKind::Texture2dArray => "texture_2d_array",
            TextureKind::Texture3d => "texture_3d",
            TextureKind::Cube => "texture_cube",
            TextureKind::CubeArray => "texture_cube_array",
            TextureKind::Multisampled2d => "texture_multisampled_2d",
            TextureKind::Depth2d => "texture_depth_2d",
            TextureKind::Depth2dArray => "texture_depth_2d_array",
            TextureKind::DepthCube => "texture_depth_cube",
            TextureKind::DepthCubeArray => "texture_depth_cube_array",
            TextureKind::DepthMultisampled2d => "texture_depth_multisampled_2d",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        TextureKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == name)
    }

    /// Depth textures take no template list.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureKind::Depth2d
                | TextureKind::Depth2dArray
                | TextureKind::DepthCube
                | TextureKind::DepthCubeArray
                | TextureKind::DepthMultisampled2d
        )
    }
}

/// Length of an array type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayLength {
    /// A compile-time constant element count.
    Constant(u32),
    /// No length: sized by the bound buffer.
    Runtime,
    /// Sized by a `param` declaration, fixed when the pipeline is created.
    Param(String),
}

impl fmt::Display for ArrayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLength::Constant(count) => write!(f, "{}", count),
            ArrayLength::Runtime => write!(f, "runtime"),
            ArrayLength::Param(name) => write!(f, "param@{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    pub ty: TypeHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDefinition {
    Boolean,
    Numeric(NumericKind),
    Vector {
        size: u8,
        inner: TypeHandle,
    },
    Matrix {
        columns: u8,
        rows: u8,
        inner: TypeHandle,
    },
    Array {
        inner: TypeHandle,
        length: ArrayLength,
    },
    Struct {
        name: String,
        members: Vec<StructMember>,
    },
    Pointer {
        inner: TypeHandle,
    },
    Sampler(SamplerKind),
    Texture {
        kind: TextureKind,
        inner: Option<TypeHandle>,
    },
    String,
    /// A shorthand name such as `vec3f`; every property delegates to `target`.
    BuildInAlias {
        name: String,
        target: TypeHandle,
    },
}

impl TypeDefinition {
    /// Variant tag used in canonical identifiers.
    pub fn variant(&self) -> &'static str {
        match self {
            TypeDefinition::Boolean => "BOOLEAN",
            TypeDefinition::Numeric(_) => "NUMERIC",
            TypeDefinition::Vector { .. } => "VECTOR",
            TypeDefinition::Matrix { .. } => "MATRIX",
            TypeDefinition::Array { .. } => "ARRAY",
            TypeDefinition::Struct { .. } => "STRUCT",
            TypeDefinition::Pointer { .. } => "POINTER",
            TypeDefinition::Sampler(_) => "SAMPLER",
            TypeDefinition::Texture { .. } => "TEXTURE",
            TypeDefinition::String => "STRING",
            TypeDefinition::BuildInAlias { .. } => "BUILDINALIAS",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeDefinition::Boolean | TypeDefinition::Numeric(_))
    }

    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            TypeDefinition::Numeric(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Vector and matrix family names, with an optional shorthand scalar suffix.
static SHAPED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<family>vec(?P<size>[234])|mat(?P<columns>[234])x(?P<rows>[234]))(?P<suffix>[iufh])?$",
    )
    .expect("shaped type name pattern is valid")
});

struct ShapedName<'a> {
    family: &'a str,
    size: Option<u8>,
    shape: Option<(u8, u8)>,
    suffix: Option<char>,
}

fn shaped_name(name: &str) -> Option<ShapedName<'_>> {
    let captures = SHAPED_NAME.captures(name)?;
    let digit = |group: &str| {
        captures
            .name(group)
            .and_then(|m| m.as_str().bytes().next())
            .map(|b| b - b'0')
    };
    Some(ShapedName {
        family: captures.name("family")?.as_str(),
        size: digit("size"),
        shape: digit("columns").zip(digit("rows")),
        suffix: captures
            .name("suffix")
            .and_then(|m| m.as_str().chars().next()),
    })
}

/// `vec2`, `vec3`, `vec4` to their size.
pub fn vector_size(name: &str) -> Option<u8> {
    shaped_name(name)
        .filter(|shaped| shaped.suffix.is_none())
        .and_then(|shaped| shaped.size)
}

/// `matCxR` to (columns, rows).
pub fn matrix_shape(name: &str) -> Option<(u8, u8)> {
    shaped_name(name)
        .filter(|shaped| shaped.suffix.is_none())
        .and_then(|shaped| shaped.shape)
}

/// A shorthand alias as (family name, scalar kind), e.g. `vec3f` to (`vec3`, Float).
/// Matrix shorthands only exist for float kinds.
pub fn build_in_alias(name: &str) -> Option<(&str, NumericKind)> {
    let shaped = shaped_name(name)?;
    let suffix = shaped.suffix?;
    let kind = NumericKind::ALL
        .into_iter()
        .find(|kind| kind.suffix() == suffix)?;
    if shaped.shape.is_some() && !kind.is_float() {
        return None;
    }
    Some((shaped.family, kind))
}

/// Whether `name` can only denote a build-in type.
pub fn is_build_in_type_name(name: &str) -> bool {
    matches!(
        name,
        "bool" | "string" | "array" | "ptr" | "sampler" | "sampler_comparison"
    ) || NumericKind::from_type_name(name).is_some()
        || vector_size(name).is_some()
        || matrix_shape(name).is_some()
        || TextureKind::from_type_name(name).is_some()
        || build_in_alias(name).is_some()
}
