//! Resolved-type report
//!
//!     Lists every top-level declaration with the type validation resolved for it, followed by
//!     the module's interned types with their canonical identifiers. Only meaningful for a
//!     validated module.

use super::registry::{FormatError, Formatter};
use crate::shade::ast::{AbstractKind, Module, NodeId, NodeKind};
use crate::shade::semantic::const_eval::enum_values;
use std::fmt::Write;

pub fn to_type_report(module: &Module) -> Result<String, FormatError> {
    let mut output = String::from("declarations:\n");
    for id in module.declarations() {
        declaration(module, *id, &mut output)?;
    }
    output.push_str("types:\n");
    for (handle, _) in module.types().iter() {
        let _ = writeln!(
            output,
            "  {} = {}",
            module.types().identifier(handle),
            module.types().display(handle)
        );
    }
    Ok(output)
}

fn type_name(module: &Module, id: NodeId) -> Result<String, FormatError> {
    Ok(module.types().display(module.type_of(id)?))
}

fn declaration(module: &Module, id: NodeId, output: &mut String) -> Result<(), FormatError> {
    match module.kind(id) {
        NodeKind::AliasDeclaration { name, .. } => {
            let _ = writeln!(output, "  alias {} = {}", name, type_name(module, id)?);
        }
        NodeKind::StructDeclaration {
            name, properties, ..
        } => {
            let _ = writeln!(output, "  struct {}", name);
            for property in properties {
                let member = module.kind(*property).name().unwrap_or_default();
                let _ = writeln!(output, "    .{}: {}", member, type_name(module, *property)?);
            }
        }
        NodeKind::EnumDeclaration { name, values } => {
            let _ = writeln!(output, "  enum {}: {}", name, type_name(module, id)?);
            for (value_name, value) in enum_values(values)? {
                let _ = writeln!(output, "    {} = {}", value_name, value);
            }
        }
        NodeKind::FunctionDeclaration {
            name,
            parameters,
            return_type,
            ..
        } => {
            let mut signature = Vec::with_capacity(parameters.len());
            for parameter in parameters {
                let parameter_name = module.kind(*parameter).name().unwrap_or_default();
                signature.push(format!("{}: {}", parameter_name, type_name(module, *parameter)?));
            }
            let _ = write!(output, "  fn {}({})", name, signature.join(", "));
            if return_type.is_some() {
                let _ = write!(output, " -> {}", type_name(module, id)?);
            }
            output.push('\n');
        }
        NodeKind::VariableDeclaration { kind, name, .. } => {
            let properties = module.expression_properties(id)?;
            let _ = write!(output, "  {} {}: {}", kind, name, type_name(module, id)?);
            match properties.abstract_kind {
                Some(AbstractKind::Int) => output.push_str(" (abstract int)"),
                Some(AbstractKind::Float) => output.push_str(" (abstract float)"),
                None => {}
            }
            output.push('\n');
        }
        _ => {}
    }
    Ok(())
}

pub struct TypesFormatter;

impl Formatter for TypesFormatter {
    fn name(&self) -> &str {
        "types"
    }

    fn serialize(&self, module: &Module) -> Result<String, FormatError> {
        to_type_report(module)
    }

    fn description(&self) -> &str {
        "Resolved type of every declaration and the interned type table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;

    #[test]
    fn test_declarations_section() {
        let source = "enum Mode { Off, On = 4 }\n\
                      alias Color = vec4<f32>;\n\
                      struct Light { color: Color, power: f32 }\n\
                      const gain = 1.5;\n\
                      fn shade(light: Light) -> vec4<f32> { return light.color * light.power; }";
        let module = parse(source).unwrap();
        let report = to_type_report(&module).unwrap();
        let declarations = report.split("types:").next().unwrap();
        insta::assert_snapshot!(declarations, @r"
        declarations:
          enum Mode: u32
            Off = 0
            On = 4
          alias Color = vec4<f32>
          struct Light
            .color: vec4<f32>
            .power: f32
          const gain: f32 (abstract float)
          fn shade(light: Light) -> vec4<f32>
        ");
    }

    #[test]
    fn test_types_section_lists_identifiers() {
        let module = parse("const v: vec2<u32> = vec2(1u, 2u);").unwrap();
        let report = to_type_report(&module).unwrap();
        assert!(report.contains("  ID:NUMERIC->UnsignedInteger = u32\n"));
        assert!(report.contains("  ID:VECTOR->vec2->ID:NUMERIC->UnsignedInteger = vec2<u32>\n"));
    }

    #[test]
    fn test_unvalidated_module_fails() {
        use crate::shade::building::from_structure_data;
        use crate::shade::options::ParseOptions;
        use crate::shade::parsing::analyze;

        let data = analyze("const a = 1;", &ParseOptions::default()).unwrap();
        let module = from_structure_data(&data).unwrap();
        assert!(matches!(
            to_type_report(&module),
            Err(FormatError::Shade(_))
        ));
    }
}
