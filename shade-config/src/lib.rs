//! Configuration for the shade command line.
//!
//! The defaults live in `defaults/shade.default.toml`, compiled into the crate. A [`Loader`]
//! starts from them, stacks TOML files and flag overrides on top, and deserializes the
//! result into a [`ShadeConfig`]. [`ShadeConfig::parse_options`] turns it into the parser's
//! own options.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use shade_parser::shade::options::ParseOptions;
use std::collections::HashMap;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/shade.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct ShadeConfig {
    pub tokenizer: TokenizerConfig,
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub whitespace: Vec<char>,
    pub keep_comments: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub validate: bool,
}

/// What the CLI prints and how.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Tokens,
    Json,
    Yaml,
    Treeviz,
    Types,
}

impl OutputFormat {
    /// Name of the format in the parser's format registry. Tokens are not a module format.
    pub fn registry_name(self) -> Option<&'static str> {
        match self {
            OutputFormat::Tokens => None,
            OutputFormat::Json => Some("json"),
            OutputFormat::Yaml => Some("yaml"),
            OutputFormat::Treeviz => Some("treeviz"),
            OutputFormat::Types => Some("types"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub show_linum: bool,
    pub show_types: bool,
}

impl TreevizConfig {
    /// Parameters understood by the treeviz formatter.
    pub fn params(&self) -> HashMap<String, String> {
        HashMap::from([
            ("show-linum".to_string(), self.show_linum.to_string()),
            ("show-types".to_string(), self.show_types.to_string()),
        ])
    }
}

impl ShadeConfig {
    /// Parser options for one compilation of `file`.
    pub fn parse_options(&self, file: impl Into<String>) -> ParseOptions {
        ParseOptions {
            file: file.into(),
            whitespace: self.tokenizer.whitespace.clone(),
            keep_comments: self.tokenizer.keep_comments,
        }
    }
}

/// Builds a [`ShadeConfig`] from the embedded defaults plus any number of layers.
/// Later layers override earlier ones key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a TOML file if it exists, such as `shade.toml` in the working directory.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(self, path: &Path, required: bool) -> Self {
        let file = File::from(path).format(FileFormat::Toml).required(required);
        Self {
            builder: self.builder.add_source(file),
        }
    }

    /// Set one dotted key, e.g. `output.format`. The CLI maps its flags through here.
    pub fn set_override(
        self,
        key: &str,
        value: impl Into<ValueKind>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            builder: self.builder.set_override(key, value)?,
        })
    }

    pub fn build(self) -> Result<ShadeConfig, ConfigError> {
        let merged = self.builder.build()?;
        merged.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<ShadeConfig, ConfigError> {
    Loader::default().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_parser::shade::options::DEFAULT_WHITESPACE;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.tokenizer.whitespace, DEFAULT_WHITESPACE.to_vec());
        assert!(!config.tokenizer.keep_comments);
        assert!(config.parser.validate);
        assert_eq!(config.output.format, OutputFormat::Treeviz);
    }

    #[test]
    fn defaults_match_parse_options() {
        let config = load_defaults().unwrap();
        let options = config.parse_options("<memory>");
        assert_eq!(options, ParseOptions::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.format", "types")
            .expect("override to apply")
            .set_override("tokenizer.keep_comments", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.output.format, OutputFormat::Types);
        assert!(config.parse_options("a.shade").keep_comments);
    }

    #[test]
    fn layers_user_files() {
        let path = std::env::temp_dir().join(format!("shade-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[output.treeviz]\nshow_linum = true").unwrap();
        let config = Loader::new().with_file(&path).build().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(config.output.treeviz.show_linum);
        assert!(!config.output.treeviz.show_types);
        assert_eq!(config.output.treeviz.params()["show-linum"], "true");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/shade.toml")
            .build()
            .unwrap();
        assert_eq!(config.output.format, OutputFormat::Treeviz);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new()
            .with_file("/definitely/not/here/shade.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_format() {
        let result = Loader::new()
            .set_override("output.format", "html")
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn token_output_has_no_registry_name() {
        assert_eq!(OutputFormat::Tokens.registry_name(), None);
        assert_eq!(OutputFormat::Yaml.registry_name(), Some("yaml"));
    }
}
