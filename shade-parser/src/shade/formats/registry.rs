//! Format registry
//!
//!     Each output format implements [`Formatter`] and is registered by name, so callers such
//!     as the CLI pick a format from a string without knowing the concrete type.

use crate::shade::ast::Module;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("no output format named '{name}' (known: {})", known.join(", "))]
    UnknownFormat { name: String, known: Vec<String> },
    #[error("cannot serialize module: {0}")]
    SerializationError(String),
    #[error(transparent)]
    Shade(#[from] crate::shade::error::Error),
}

impl From<serde_json::Error> for FormatError {
    fn from(error: serde_json::Error) -> Self {
        FormatError::SerializationError(error.to_string())
    }
}

impl From<serde_yaml::Error> for FormatError {
    fn from(error: serde_yaml::Error) -> Self {
        FormatError::SerializationError(error.to_string())
    }
}

/// Renders a validated module as text.
pub trait Formatter: Send + Sync {
    /// The name the format is selected by, e.g. `treeviz`.
    fn name(&self) -> &str;

    fn serialize(&self, module: &Module) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

/// Formatters keyed by name. Iteration follows name order.
#[derive(Default)]
pub struct FormatRegistry {
    by_name: BTreeMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// An empty registry; see [`FormatRegistry::with_defaults`] for the built-in formats.
    pub fn new() -> Self {
        Self::default()
    }

    /// json, yaml, treeviz and types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);
        registry.register(super::TreevizFormatter);
        registry.register(super::TypesFormatter);
        registry
    }

    /// Adds `formatter`. A later formatter with the same name wins.
    pub fn register(&mut self, formatter: impl Formatter + 'static) {
        let name = formatter.name().to_owned();
        self.by_name.insert(name, Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.by_name.get(name).map(Box::as_ref)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn serialize(&self, module: &Module, name: &str) -> Result<String, FormatError> {
        match self.get(name) {
            Some(formatter) => formatter.serialize(module),
            None => Err(FormatError::UnknownFormat {
                name: name.to_owned(),
                known: self.list_formats(),
            }),
        }
    }

    pub fn list_formats(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }

    /// `(name, description)` for every format, for help output.
    pub fn descriptions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.by_name
            .iter()
            .map(|(name, formatter)| (name.as_str(), formatter.description()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;

    struct CountFormatter;

    impl Formatter for CountFormatter {
        fn name(&self) -> &str {
            "count"
        }

        fn serialize(&self, module: &Module) -> Result<String, FormatError> {
            Ok(module.declarations().len().to_string())
        }
    }

    #[test]
    fn test_register_and_serialize() {
        let mut registry = FormatRegistry::new();
        registry.register(CountFormatter);
        assert!(registry.has("count"));
        let module = parse("const a = 1; const b = 2;").unwrap();
        assert_eq!(registry.serialize(&module, "count").unwrap(), "2");
    }

    #[test]
    fn test_unknown_format_lists_known_names() {
        let mut registry = FormatRegistry::new();
        registry.register(CountFormatter);
        let module = parse("").unwrap();
        let error = registry.serialize(&module, "html").unwrap_err();
        assert!(matches!(error, FormatError::UnknownFormat { ref name, .. } if name == "html"));
        assert_eq!(
            error.to_string(),
            "no output format named 'html' (known: count)"
        );
    }

    #[test]
    fn test_defaults_in_name_order() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            registry.list_formats(),
            vec!["json", "treeviz", "types", "yaml"]
        );
        assert!(registry
            .descriptions()
            .all(|(_, description)| !description.is_empty()));
    }
}
