//! # shade-parser
//!
//! Front end for the shade shading language.
//!
//! File Layout
//!
//!     The crate mirrors the pipeline stages. Each stage only depends on the ones before it:
//!
//!     src/shade
//!       ├── lexing      Tokenizer and template-list disambiguation
//!       ├── parsing     Grammar engine, grammar rules and the structure-data IR
//!       ├── building    Structure data <-> syntax tree conversion
//!       ├── ast         The arena-backed syntax tree and its node kinds
//!       ├── types       Type definitions and the per-module type registry
//!       ├── semantic    Validation, symbol resolution and memoized properties
//!       ├── formats     Serializers (json, yaml, treeviz)
//!       └── testing     Sample library and assertions used by the test suites
//!
//!     For the testing guidelines, see the [testing module](shade::testing).

#![allow(rustdoc::invalid_html_tags)]

pub mod shade;

pub use shade::error::{Error, Result};
pub use shade::parsing::{parse, parse_with};
