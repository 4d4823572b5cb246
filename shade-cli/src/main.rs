//! Command-line interface for shade
//! This binary compiles a shade file and prints one view of the result.
//!
//! Usage:
//!   shade `<path>` [--format `<format>`] [--config `<file>`] [--keep-comments] [--verbose]
//!
//! Configuration is layered: the embedded defaults, then `shade.toml` in the working
//! directory when present, then the file given with `--config`, then the flags.

mod render;

use clap::{Arg, ArgAction, ArgMatches, Command};
use shade_config::{Loader, ShadeConfig};
use shade_parser::shade::error::format_source_context;
use shade_parser::shade::formats::FormatError;
use std::process;

const FORMATS: [&str; 5] = ["tokens", "json", "yaml", "treeviz", "types"];

fn main() {
    let matches = Command::new("shade")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile shade files and inspect the result")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the shade file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (default from configuration: treeviz)")
                .value_parser(FORMATS),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("keep-comments")
                .long("keep-comments")
                .help("Include comment tokens in the token output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log pipeline progress to stderr")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });
    let Some(path) = matches.get_one::<String>("path") else {
        eprintln!("Missing path");
        process::exit(2);
    };
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", path, e);
        process::exit(1);
    });

    match render::render(&source, path, &config) {
        Ok(output) => print!("{}", output),
        Err(error) => {
            report(&source, &error);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(matches: &ArgMatches) -> Result<ShadeConfig, shade_config::ConfigError> {
    let mut loader = Loader::new().with_optional_file("shade.toml");
    if let Some(file) = matches.get_one::<String>("config") {
        loader = loader.with_file(file);
    }
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if matches.get_flag("keep-comments") {
        loader = loader.set_override("tokenizer.keep_comments", true)?;
    }
    loader.build()
}

fn report(source: &str, error: &FormatError) {
    eprintln!("Error: {}", error);
    if let FormatError::Shade(error) = error {
        if let Some(location) = error.location() {
            eprintln!("\n{}", format_source_context(source, &location.range));
        }
    }
}
