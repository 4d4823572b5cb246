//! The type system
//!
//!     Type definitions form a closed set of variants (see [definition](definition)). Each
//!     module interns the definitions it uses in its own [`TypeRegistry`], which also computes
//!     the derived properties of every definition:
//!
//!         | Variant           | composite | constructible         | fixed                 | indexable | shareable        | storable |
//!         |-------------------|-----------|-----------------------|-----------------------|-----------|------------------|----------|
//!         | bool / numeric    | no        | yes                   | yes                   | no        | bool no, else yes | yes     |
//!         | vector / matrix   | yes       | = inner               | = inner               | vector    | = inner          | = inner  |
//!         | array             | yes       | fixed and inner       | constant length       | yes       | fixed and inner  | = inner  |
//!         | struct            | yes       | all members           | all but the last      | no        | all members      | yes      |
//!         | pointer           | no        | no                    | no                    | no        | no               | yes      |
//!         | sampler / texture | no        | no                    | sampler only          | no        | no               | no       |
//!         | string            | no        | no                    | no                    | no        | no               | no       |
//!
//!     Build-in aliases (`vec3f`, `mat4x4h`, ...) delegate every property to the type they
//!     name. Name resolution lives with the semantic pass, in
//!     [semantic::types](crate::shade::semantic::types).

pub mod definition;
pub mod registry;

pub use definition::{
    ArrayLength, NumericKind, SamplerKind, StructMember, TextureKind, TypeDefinition,
};
pub use registry::{TypeHandle, TypeProperties, TypeRegistry};
