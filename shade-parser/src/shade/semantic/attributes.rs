//! Attribute checking
//!
//!     Attributes are looked up in a table owned by the module. The table is built per
//!     compilation from [`AttributeTable::standard`], so callers can register extra
//!     attributes on one module without affecting any other.

use super::{const_eval, mark};
use crate::shade::ast::{Module, NodeId, NodeKind, NodeProperties};
use crate::shade::error::{Error, Result};
use std::collections::{HashMap, HashSet};

/// What the arguments of an attribute must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    None,
    /// Constant integer expressions, e.g. `@binding(0)`.
    ConstInteger,
    /// Bare enumerant names, e.g. `@builtin(position)`.
    Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub arguments: ArgumentKind,
    pub min: usize,
    pub max: usize,
}

impl AttributeSpec {
    pub fn new(name: &str, arguments: ArgumentKind, min: usize, max: usize) -> Self {
        Self {
            name: name.to_string(),
            arguments,
            min,
            max,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    specs: HashMap<String, AttributeSpec>,
}

impl AttributeTable {
    pub fn standard() -> Self {
        use ArgumentKind::*;
        let mut table = Self::default();
        for name in ["align", "size", "location", "binding", "group", "id"] {
            table.register(AttributeSpec::new(name, ConstInteger, 1, 1));
        }
        table.register(AttributeSpec::new("builtin", Identifier, 1, 1));
        table.register(AttributeSpec::new("interpolate", Identifier, 1, 2));
        for name in ["invariant", "vertex", "fragment", "compute", "must_use"] {
            table.register(AttributeSpec::new(name, None, 0, 0));
        }
        table.register(AttributeSpec::new("workgroup_size", ConstInteger, 1, 3));
        table
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.specs.get(name)
    }

    /// Add or replace an attribute, returning the previous spec.
    pub fn register(&mut self, spec: AttributeSpec) -> Option<AttributeSpec> {
        self.specs.insert(spec.name.clone(), spec)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    let NodeKind::Attribute { name, arguments } = module.kind(id).clone() else {
        return Err(Error::structural(format!(
            "{} is not an attribute",
            module.kind(id).label()
        )));
    };
    let spec = module
        .attribute_table()
        .get(&name)
        .cloned()
        .ok_or_else(|| Error::unknown_identifier(format!("@{}", name)))?;
    if !(spec.min..=spec.max).contains(&arguments.len()) {
        let expected = if spec.min == spec.max {
            spec.min.to_string()
        } else {
            format!("{} to {}", spec.min, spec.max)
        };
        return Err(Error::type_mismatch(format!(
            "`@{}` expects {} arguments, found {}",
            name,
            expected,
            arguments.len()
        )));
    }
    for argument in arguments {
        match spec.arguments {
            ArgumentKind::None => {}
            ArgumentKind::ConstInteger => {
                let (properties, _) = super::value(module, argument)?;
                let folded = if properties.is_constant {
                    const_eval::evaluate(module, argument)?.as_integer()
                } else {
                    None
                };
                if folded.is_none() {
                    return Err(Error::type_mismatch(format!(
                        "`@{}` expects constant integer arguments",
                        name
                    ))
                    .located(module.location(argument)));
                }
            }
            ArgumentKind::Identifier => {
                if !matches!(module.kind(argument), NodeKind::VariableName { .. }) {
                    return Err(Error::type_mismatch(format!(
                        "`@{}` expects a name as argument",
                        name
                    ))
                    .located(module.location(argument)));
                }
                mark(module, argument, NodeProperties::default());
            }
        }
    }
    Ok(NodeProperties::default())
}

/// Validate an attribute list. The same attribute may appear once.
pub(crate) fn validate_list(module: &mut Module, attributes: &[NodeId]) -> Result<()> {
    let mut seen = HashSet::new();
    for attribute in attributes {
        super::ensure(module, *attribute)?;
        let name = module.kind(*attribute).name().unwrap_or_default().to_string();
        if !seen.insert(name.clone()) {
            return Err(Error::duplicate("attribute", format!("@{}", name))
                .located(module.location(*attribute)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;
    use rstest::rstest;

    #[test]
    fn test_standard_table() {
        let table = AttributeTable::standard();
        assert_eq!(table.len(), 14);
        let workgroup = table.get("workgroup_size").unwrap();
        assert_eq!((workgroup.min, workgroup.max), (1, 3));
        assert_eq!(table.get("builtin").unwrap().arguments, ArgumentKind::Identifier);
        assert!(table.get("stage").is_none());
    }

    #[test]
    fn test_tables_are_per_module() {
        let mut first = parse("const a = 1;").unwrap();
        let second = parse("const a = 1;").unwrap();
        first
            .attribute_table_mut()
            .register(AttributeSpec::new("stage", ArgumentKind::Identifier, 1, 1));
        assert!(first.attribute_table().get("stage").is_some());
        assert!(second.attribute_table().get("stage").is_none());
    }

    #[rstest]
    #[case("@compute @workgroup_size(8, 8, 1) fn main() {}")]
    #[case("const size = 4u; @compute @workgroup_size(size * 2u) fn main() {}")]
    #[case("@fragment fn main(@builtin(position) p: vec4<f32>) -> @location(0) vec4<f32> { return p; }")]
    #[case("struct V { @location(0) @interpolate(perspective, center) uv: vec2<f32> }")]
    #[case("@group(0) @binding(1) uniform tint: vec4<f32>;")]
    fn test_valid_attributes(#[case] source: &str) {
        parse(source).unwrap();
    }

    #[rstest]
    #[case("@stage(compute) fn main() {}", "UnknownIdentifierError")]
    #[case("@binding fn main() {}", "TypeMismatchError")]
    #[case("@workgroup_size(1, 1, 1, 1) fn main() {}", "TypeMismatchError")]
    #[case("@vertex @vertex fn main() {}", "DuplicateDeclarationError")]
    #[case("@builtin(1) fn main() {}", "TypeMismatchError")]
    #[case("@location(1.5) fn main() {}", "TypeMismatchError")]
    fn test_invalid_attributes(#[case] source: &str, #[case] kind: &str) {
        assert_eq!(parse(source).unwrap_err().kind(), kind);
    }
}
