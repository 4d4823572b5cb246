//! Testing utilities
//!
//!     Shade is a young language: there is no body of real-world source to test against,
//!     and a source string made up on the spot is easily slightly wrong. A test that passes
//!     against an invalid source tunes the front end to the wrong thing, and once the language
//!     changes every scattered ad-hoc string has to be hunted down and reviewed.
//!
//!     Two rules follow:
//!
//!         1. Whole programs come from the curated sample library (via [Samples](samples)).
//!         2. Checks on a parsed module go through the [assertions](assertions) helpers, which
//!            look at every node rather than spot-checking one.
//!
//! Rule 1: Use the Sample Library
//!
//!     Samples live in `shade-parser/samples/<category>/NN-name.shade`. Each category is a
//!     directory and each file is found by its number prefix:
//!
//!     ```rust,ignore
//!     use shade_parser::shade::testing::samples::Samples;
//!
//!     let module = Samples::program(1).parse();
//!     let source = Samples::statements(1).source();
//!     let tokens = Samples::declarations(2).tokenize();
//!
//!     // Error samples state the expected error kind in their first line.
//!     let sample = Samples::error(3);
//!     assert_eq!(sample.parse_error().kind(), sample.expected_error().unwrap());
//!     ```
//!
//!     Short snippets that exercise one rule (a single bad cast, one operator) are fine
//!     inline in unit tests, next to the code implementing the rule.
//!
//! Rule 2: Assert Over the Whole Tree
//!
//!     ```rust,ignore
//!     use shade_parser::shade::testing::assertions::{assert_fully_validated, assert_parents};
//!
//!     let module = Samples::program(2).parse();
//!     assert_fully_validated(&module);
//!     assert_parents(&module);
//!     ```

pub mod assertions;
pub mod samples;

pub use assertions::{assert_error_kind, assert_fully_validated, assert_parents};
pub use samples::{SampleCategory, Samples};
