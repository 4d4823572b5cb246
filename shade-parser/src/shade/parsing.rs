//! Parsing module for the shade language
//!
//!     This module provides the complete processing pipeline from source text to a validated
//!     syntax tree:
//!         1. Lexing: tokenization and template-list disambiguation. See
//!            [lexing](crate::shade::lexing).
//!         2. Analysis: the grammar engine matches the token stream and produces structure
//!            data. See [engine](engine) and [grammar](grammar).
//!         3. Building: the syntax tree is built from the structure data. See
//!            [building](crate::shade::building).
//!         4. Validation: symbols are resolved, types are computed and every node's derived
//!            properties are stored. See [semantic](crate::shade::semantic).
//!
//! Parsing End To End
//!
//!     The tokenizer is pulled by the engine one token at a time, so lexing and analysis
//!     interleave and a lex error surfaces at the token the engine asked for. The engine
//!     produces one structure data tree per unit; nothing of the token stream survives past
//!     this step.
//!
//!     Building and validation are separate passes. A module straight out of
//!     [`from_structure_data`](crate::shade::building::from_structure_data) has every node
//!     attached but none validated; [`parse`] runs both.
//!
//!     Compilation is all or nothing: the first error of any stage is returned and no partial
//!     tree is kept.
//!
//! Terminology
//!
//!     - parse: colloquial term for the entire process (lexing + analysis + building +
//!       validation)
//!     - analyze: source text to structure data
//!     - build: structure data to syntax tree

pub mod engine;
pub mod grammar;
pub mod structure_data;

pub use structure_data::{Meta, NodeData, NodeType, StructureData};

use crate::shade::ast::Module;
use crate::shade::building::from_structure_data;
use crate::shade::error::Result;
use crate::shade::lexing::Tokenizer;
use crate::shade::options::ParseOptions;
use engine::Engine;
use grammar::GRAMMAR;

/// Run the tokenizer and the grammar, producing structure data.
pub fn analyze(source: &str, options: &ParseOptions) -> Result<StructureData> {
    log::debug!("analyzing {} ({} bytes)", options.file, source.len());
    Engine::new(&GRAMMAR, Tokenizer::new(source, options), options.file.clone()).parse()
}

/// Parse and validate a unit with default options.
pub fn parse(source: &str) -> Result<Module> {
    parse_with(source, &ParseOptions::default())
}

pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Module> {
    let data = analyze(source, options)?;
    let mut module = from_structure_data(&data)?;
    module.validate()?;
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_file() {
        let options = ParseOptions::for_file("lights.shade");
        let error = parse_with("const x: Missing = 1;", &options).unwrap_err();
        assert_eq!(error.kind(), "UnknownTypeError");
        assert_eq!(error.location().map(|l| l.file.as_str()), Some("lights.shade"));
    }

    #[test]
    fn test_analyze_only_builds_structure() {
        // Unknown types are a semantic error, invisible to analysis.
        let data = analyze("const x: Missing = 1;", &ParseOptions::default()).unwrap();
        assert_eq!(data.node_type(), NodeType::Module);
    }
}
