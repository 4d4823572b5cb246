//! JSON and YAML serialization of structure data
//!
//!     A module is serialized through its structure data, so the output carries the same
//!     `{ meta, data }` records the grammar produced and can be loaded back with
//!     [`from_json`] / [`from_yaml`] and rebuilt with
//!     [`from_structure_data`](crate::shade::building::from_structure_data).

use super::registry::{FormatError, Formatter};
use crate::shade::ast::Module;
use crate::shade::building::to_structure_data;
use crate::shade::parsing::StructureData;

/// Pretty-printed JSON.
pub fn to_json(data: &StructureData) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn to_yaml(data: &StructureData) -> Result<String, FormatError> {
    Ok(serde_yaml::to_string(data)?)
}

pub fn from_json(text: &str) -> Result<StructureData, FormatError> {
    Ok(serde_json::from_str(text)?)
}

pub fn from_yaml(text: &str) -> Result<StructureData, FormatError> {
    Ok(serde_yaml::from_str(text)?)
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, module: &Module) -> Result<String, FormatError> {
        to_json(&to_structure_data(module)?)
    }

    fn description(&self) -> &str {
        "Structure data as pretty-printed JSON"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, module: &Module) -> Result<String, FormatError> {
        to_yaml(&to_structure_data(module)?)
    }

    fn description(&self) -> &str {
        "Structure data as YAML"
    }
}
