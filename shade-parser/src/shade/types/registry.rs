//! Type registry
//!
//!     Every type used by a module is interned here, keyed by its canonical identifier. The
//!     identifier is built from the variant tag and the identifiers of the component types,
//!     so two structurally identical definitions always intern to the same [`TypeHandle`]:
//!
//!         ID:BOOLEAN->bool
//!         ID:NUMERIC->Float
//!         ID:VECTOR->vec3->ID:NUMERIC->Float
//!         ID:ARRAY->ID:NUMERIC->UnsignedInteger->4
//!         ID:STRUCT->Light
//!
//!     Handle equality is therefore identifier equality. The registry belongs to one module;
//!     handles from different modules must not be mixed.
//!
//!     Derived properties are computed once, when a definition is interned. Component types
//!     are always interned before the types built from them, so the computation only reads
//!     properties that already exist.

use super::definition::{ArrayLength, NumericKind, StructMember, TypeDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Index of an interned type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHandle(u32);

impl TypeHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Derived type-system properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeProperties {
    /// Built from other types.
    pub composite: bool,
    /// Can be built from a value list at the point of use.
    pub constructible: bool,
    /// Size known when the pipeline is created.
    pub fixed: bool,
    /// Supports `value[index]`.
    pub indexable: bool,
    /// A value type: scalar, vector, matrix, array or struct.
    pub plain: bool,
    /// Layout can be shared with the host.
    pub shareable: bool,
    /// Can be held in a variable.
    pub storable: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    definition: TypeDefinition,
    identifier: String,
    properties: TypeProperties,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
    by_identifier: HashMap<String, TypeHandle>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a definition, returning the existing handle for an identical one.
    pub fn intern(&mut self, definition: TypeDefinition) -> TypeHandle {
        let identifier = self.identifier_for(&definition);
        if let Some(handle) = self.by_identifier.get(&identifier) {
            return *handle;
        }
        let properties = self.determine(&definition);
        let handle = TypeHandle(self.entries.len() as u32);
        log::trace!("interned {}", identifier);
        self.by_identifier.insert(identifier.clone(), handle);
        self.entries.push(Entry {
            definition,
            identifier,
            properties,
        });
        handle
    }

    pub fn definition(&self, handle: TypeHandle) -> &TypeDefinition {
        &self.entries[handle.index()].definition
    }

    /// Canonical identifier of an interned type.
    pub fn identifier(&self, handle: TypeHandle) -> &str {
        &self.entries[handle.index()].identifier
    }

    pub fn properties(&self, handle: TypeHandle) -> TypeProperties {
        self.entries[handle.index()].properties
    }

    pub fn lookup(&self, identifier: &str) -> Option<TypeHandle> {
        self.by_identifier.get(identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeHandle, &TypeDefinition)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (TypeHandle(index as u32), &entry.definition))
    }

    pub fn boolean(&mut self) -> TypeHandle {
        self.intern(TypeDefinition::Boolean)
    }

    pub fn numeric(&mut self, kind: NumericKind) -> TypeHandle {
        self.intern(TypeDefinition::Numeric(kind))
    }

    pub fn string(&mut self) -> TypeHandle {
        self.intern(TypeDefinition::String)
    }

    pub fn vector(&mut self, size: u8, inner: TypeHandle) -> TypeHandle {
        self.intern(TypeDefinition::Vector { size, inner })
    }

    pub fn pointer(&mut self, inner: TypeHandle) -> TypeHandle {
        self.intern(TypeDefinition::Pointer { inner })
    }

    /// Follow build-in aliases to the type they name.
    pub fn concrete(&self, handle: TypeHandle) -> TypeHandle {
        match self.definition(handle) {
            TypeDefinition::BuildInAlias { target, .. } => self.concrete(*target),
            _ => handle,
        }
    }

    /// Type equality modulo build-in aliases.
    pub fn same(&self, left: TypeHandle, right: TypeHandle) -> bool {
        self.concrete(left) == self.concrete(right)
    }

    pub fn concrete_definition(&self, handle: TypeHandle) -> &TypeDefinition {
        self.definition(self.concrete(handle))
    }

    pub fn is_boolean(&self, handle: TypeHandle) -> bool {
        matches!(self.concrete_definition(handle), TypeDefinition::Boolean)
    }

    pub fn numeric_kind(&self, handle: TypeHandle) -> Option<NumericKind> {
        self.concrete_definition(handle).numeric_kind()
    }

    pub fn is_scalar(&self, handle: TypeHandle) -> bool {
        self.concrete_definition(handle).is_scalar()
    }

    pub fn vector_size(&self, handle: TypeHandle) -> Option<u8> {
        match self.concrete_definition(handle) {
            TypeDefinition::Vector { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// The scalar a scalar, vector or matrix type is made of.
    pub fn scalar_of(&self, handle: TypeHandle) -> Option<TypeHandle> {
        let handle = self.concrete(handle);
        match self.definition(handle) {
            TypeDefinition::Boolean | TypeDefinition::Numeric(_) => Some(handle),
            TypeDefinition::Vector { inner, .. } | TypeDefinition::Matrix { inner, .. } => {
                Some(self.concrete(*inner))
            }
            _ => None,
        }
    }

    /// The type produced by indexing a value of this type.
    pub fn element_of(&self, handle: TypeHandle) -> Option<TypeHandle> {
        match self.concrete_definition(handle) {
            TypeDefinition::Vector { inner, .. } | TypeDefinition::Array { inner, .. } => {
                Some(*inner)
            }
            _ => None,
        }
    }

    /// Source-like rendering for diagnostics, e.g. `array<vec3<f32>, 4>`.
    pub fn display(&self, handle: TypeHandle) -> String {
        match self.definition(handle) {
            TypeDefinition::Boolean => "bool".to_string(),
            TypeDefinition::Numeric(kind) => kind.type_name().to_string(),
            TypeDefinition::Vector { size, inner } => {
                format!("vec{}<{}>", size, self.display(*inner))
            }
            TypeDefinition::Matrix {
                columns,
                rows,
                inner,
            } => format!("mat{}x{}<{}>", columns, rows, self.display(*inner)),
            TypeDefinition::Array { inner, length } => match length {
                ArrayLength::Constant(count) => {
                    format!("array<{}, {}>", self.display(*inner), count)
                }
                ArrayLength::Runtime => format!("array<{}>", self.display(*inner)),
                ArrayLength::Param(name) => format!("array<{}, {}>", self.display(*inner), name),
            },
            TypeDefinition::Struct { name, .. } => name.clone(),
            TypeDefinition::Pointer { inner } => format!("ptr<{}>", self.display(*inner)),
            TypeDefinition::Sampler(kind) => kind.type_name().to_string(),
            TypeDefinition::Texture { kind, inner } => match inner {
                Some(inner) => format!("{}<{}>", kind.type_name(), self.display(*inner)),
                None => kind.type_name().to_string(),
            },
            TypeDefinition::String => "string".to_string(),
            TypeDefinition::BuildInAlias { name, .. } => name.clone(),
        }
    }

    fn identifier_for(&self, definition: &TypeDefinition) -> String {
        let variant = definition.variant();
        match definition {
            TypeDefinition::Boolean => format!("ID:{}->bool", variant),
            TypeDefinition::Numeric(kind) => format!("ID:{}->{}", variant, kind),
            TypeDefinition::Vector { size, inner } => {
                format!("ID:{}->vec{}->{}", variant, size, self.identifier(*inner))
            }
            TypeDefinition::Matrix {
                columns,
                rows,
                inner,
            } => format!(
                "ID:{}->mat{}x{}->{}",
                variant,
                columns,
                rows,
                self.identifier(*inner)
            ),
            TypeDefinition::Array { inner, length } => {
                format!("ID:{}->{}->{}", variant, self.identifier(*inner), length)
            }
            TypeDefinition::Struct { name, .. } => format!("ID:{}->{}", variant, name),
            TypeDefinition::Pointer { inner } => {
                format!("ID:{}->{}", variant, self.identifier(*inner))
            }
            TypeDefinition::Sampler(kind) => format!("ID:{}->{}", variant, kind.type_name()),
            TypeDefinition::Texture { kind, inner } => match inner {
                Some(inner) => format!(
                    "ID:{}->{}->{}",
                    variant,
                    kind.type_name(),
                    self.identifier(*inner)
                ),
                None => format!("ID:{}->{}", variant, kind.type_name()),
            },
            TypeDefinition::String => format!("ID:{}->string", variant),
            TypeDefinition::BuildInAlias { name, .. } => format!("ID:{}->{}", variant, name),
        }
    }

    fn determine(&self, definition: &TypeDefinition) -> TypeProperties {
        match definition {
            TypeDefinition::Boolean => TypeProperties {
                composite: false,
                constructible: true,
                fixed: true,
                indexable: false,
                plain: true,
                shareable: false,
                storable: true,
            },
            TypeDefinition::Numeric(_) => TypeProperties {
                composite: false,
                constructible: true,
                fixed: true,
                indexable: false,
                plain: true,
                shareable: true,
                storable: true,
            },
            TypeDefinition::Vector { inner, .. } | TypeDefinition::Matrix { inner, .. } => {
                let inner = self.properties(*inner);
                TypeProperties {
                    composite: true,
                    constructible: inner.constructible,
                    fixed: inner.fixed,
                    indexable: matches!(definition, TypeDefinition::Vector { .. }),
                    plain: true,
                    shareable: inner.shareable,
                    storable: inner.storable,
                }
            }
            TypeDefinition::Array { inner, length } => {
                let inner = self.properties(*inner);
                let fixed = matches!(length, ArrayLength::Constant(_));
                TypeProperties {
                    composite: true,
                    constructible: fixed && inner.constructible,
                    fixed,
                    indexable: true,
                    plain: true,
                    shareable: fixed && inner.shareable,
                    storable: inner.storable,
                }
            }
            TypeDefinition::Struct { members, .. } => self.determine_struct(members),
            TypeDefinition::Pointer { .. } => TypeProperties {
                storable: true,
                ..TypeProperties::default()
            },
            TypeDefinition::Sampler(_) => TypeProperties {
                fixed: true,
                ..TypeProperties::default()
            },
            TypeDefinition::Texture { .. } | TypeDefinition::String => TypeProperties::default(),
            TypeDefinition::BuildInAlias { target, .. } => self.properties(*target),
        }
    }

    fn determine_struct(&self, members: &[StructMember]) -> TypeProperties {
        let properties: Vec<TypeProperties> = members
            .iter()
            .map(|member| self.properties(member.ty))
            .collect();
        let leading = properties.len().saturating_sub(1);
        TypeProperties {
            composite: true,
            constructible: properties.iter().all(|p| p.constructible),
            fixed: properties[..leading].iter().all(|p| p.fixed),
            indexable: false,
            plain: true,
            shareable: properties.iter().all(|p| p.shareable),
            storable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::types::definition::{SamplerKind, TextureKind};

    #[test]
    fn test_interning_is_structural() {
        let mut registry = TypeRegistry::new();
        let f32_a = registry.numeric(NumericKind::Float);
        let f32_b = registry.intern(TypeDefinition::Numeric(NumericKind::Float));
        assert_eq!(f32_a, f32_b);

        let vec_a = registry.vector(3, f32_a);
        let vec_b = registry.vector(3, f32_b);
        assert_eq!(vec_a, vec_b);
        assert_eq!(registry.identifier(vec_a), "ID:VECTOR->vec3->ID:NUMERIC->Float");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_array_identifiers() {
        let mut registry = TypeRegistry::new();
        let u32_type = registry.numeric(NumericKind::UnsignedInteger);
        let fixed = registry.intern(TypeDefinition::Array {
            inner: u32_type,
            length: ArrayLength::Constant(4),
        });
        let runtime = registry.intern(TypeDefinition::Array {
            inner: u32_type,
            length: ArrayLength::Runtime,
        });
        assert_eq!(
            registry.identifier(fixed),
            "ID:ARRAY->ID:NUMERIC->UnsignedInteger->4"
        );
        assert_ne!(fixed, runtime);
        assert!(registry.properties(fixed).fixed);
        assert!(registry.properties(fixed).shareable);
        assert!(!registry.properties(runtime).fixed);
        assert!(!registry.properties(runtime).constructible);
        assert!(!registry.properties(runtime).shareable);
        assert_eq!(registry.display(fixed), "array<u32, 4>");
    }

    #[test]
    fn test_matrix_is_not_indexable() {
        let mut registry = TypeRegistry::new();
        let f16_type = registry.numeric(NumericKind::Half);
        let matrix = registry.intern(TypeDefinition::Matrix {
            columns: 3,
            rows: 2,
            inner: f16_type,
        });
        let properties = registry.properties(matrix);
        assert!(properties.composite);
        assert!(!properties.indexable);
        assert_eq!(registry.display(matrix), "mat3x2<f16>");
    }

    #[test]
    fn test_struct_fixed_ignores_last_member() {
        let mut registry = TypeRegistry::new();
        let f32_type = registry.numeric(NumericKind::Float);
        let runtime = registry.intern(TypeDefinition::Array {
            inner: f32_type,
            length: ArrayLength::Runtime,
        });
        let tail = registry.intern(TypeDefinition::Struct {
            name: "Tail".into(),
            members: vec![
                StructMember {
                    name: "count".into(),
                    ty: f32_type,
                },
                StructMember {
                    name: "data".into(),
                    ty: runtime,
                },
            ],
        });
        let head = registry.intern(TypeDefinition::Struct {
            name: "Head".into(),
            members: vec![
                StructMember {
                    name: "data".into(),
                    ty: runtime,
                },
                StructMember {
                    name: "count".into(),
                    ty: f32_type,
                },
            ],
        });
        assert!(registry.properties(tail).fixed);
        assert!(!registry.properties(tail).constructible);
        assert!(!registry.properties(head).fixed);
        assert_eq!(registry.identifier(tail), "ID:STRUCT->Tail");
    }

    #[test]
    fn test_opaque_types() {
        let mut registry = TypeRegistry::new();
        let f32_type = registry.numeric(NumericKind::Float);
        let sampler = registry.intern(TypeDefinition::Sampler(SamplerKind::Sampler));
        let texture = registry.intern(TypeDefinition::Texture {
            kind: TextureKind::Texture2d,
            inner: Some(f32_type),
        });
        let pointer = registry.pointer(f32_type);
        assert!(registry.properties(sampler).fixed);
        assert!(!registry.properties(texture).fixed);
        assert!(!registry.properties(texture).storable);
        assert_eq!(
            registry.properties(pointer),
            TypeProperties {
                storable: true,
                ..TypeProperties::default()
            }
        );
        assert_eq!(
            registry.identifier(texture),
            "ID:TEXTURE->texture_2d->ID:NUMERIC->Float"
        );
    }

    #[test]
    fn test_build_in_alias_delegates() {
        let mut registry = TypeRegistry::new();
        let f32_type = registry.numeric(NumericKind::Float);
        let vector = registry.vector(4, f32_type);
        let alias = registry.intern(TypeDefinition::BuildInAlias {
            name: "vec4f".into(),
            target: vector,
        });
        assert_ne!(alias, vector);
        assert!(registry.same(alias, vector));
        assert_eq!(registry.properties(alias), registry.properties(vector));
        assert_eq!(registry.identifier(alias), "ID:BUILDINALIAS->vec4f");
        assert_eq!(registry.vector_size(alias), Some(4));
    }
}
