//! Output rendering
//!
//! Turns one source file into the text the CLI prints for the configured output format.
//! Module formats go through the parser's format registry; the token dump is produced
//! here since it never builds a module.

use shade_config::{OutputFormat, ShadeConfig};
use shade_parser::shade::ast::Module;
use shade_parser::shade::building::from_structure_data;
use shade_parser::shade::formats::treeviz::to_treeviz_str_with_params;
use shade_parser::shade::formats::{FormatError, FormatRegistry};
use shade_parser::shade::lexing::tokenize_with;
use shade_parser::shade::options::ParseOptions;
use shade_parser::shade::parsing::{analyze, parse_with};

/// Render `source` (read from `file`) in the configured format.
pub fn render(source: &str, file: &str, config: &ShadeConfig) -> Result<String, FormatError> {
    let options = config.parse_options(file);
    let format = config.output.format;
    let Some(name) = format.registry_name() else {
        return Ok(tokens(source, &options)?);
    };
    let module = compile(source, &options, config.parser.validate)?;
    if format == OutputFormat::Treeviz {
        return Ok(to_treeviz_str_with_params(
            &module,
            &config.output.treeviz.params(),
        ));
    }
    FormatRegistry::with_defaults().serialize(&module, name)
}

fn compile(source: &str, options: &ParseOptions, validate: bool) -> shade_parser::Result<Module> {
    if validate {
        return parse_with(source, options);
    }
    log::info!("validation disabled, building {} without checks", options.file);
    from_structure_data(&analyze(source, options)?)
}

/// One token per line: `line:column Kind("text")`, both positions one based.
fn tokens(source: &str, options: &ParseOptions) -> shade_parser::Result<String> {
    let mut output = String::new();
    for token in tokenize_with(source, options) {
        let token = token?;
        output.push_str(&format!(
            "{}:{} {}\n",
            token.line + 1,
            token.column + 1,
            token
        ));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_config::Loader;

    fn config(format: &str) -> ShadeConfig {
        Loader::new()
            .set_override("output.format", format)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_token_dump() {
        let output = render("const a = 1;", "a.shade", &config("tokens")).unwrap();
        assert_eq!(
            output,
            "1:1 Const(\"const\")\n1:7 Identifier(\"a\")\n1:9 Equal(\"=\")\n\
             1:11 IntLiteral(\"1\")\n1:12 Semicolon(\";\")\n"
        );
    }

    #[test]
    fn test_treeviz_names_file() {
        let output = render("const a = 1;", "a.shade", &config("treeviz")).unwrap();
        assert!(output.starts_with("⧉ Module a.shade\n"));
    }

    #[test]
    fn test_semantic_error_surfaces() {
        let error = render("const a: Nope = 1;", "a.shade", &config("json")).unwrap_err();
        assert!(matches!(error, FormatError::Shade(_)));
    }

    #[test]
    fn test_without_validation_only_builds() {
        let config = Loader::new()
            .set_override("parser.validate", false)
            .unwrap()
            .build()
            .unwrap();
        assert!(render("const a: Nope = 1;", "a.shade", &config).is_ok());
    }
}
