//! Options threaded through one compilation

use serde::{Deserialize, Serialize};

/// Whitespace characters trimmed between tokens unless configured otherwise.
pub const DEFAULT_WHITESPACE: [char; 6] = [' ', '\t', '\n', '\r', '\u{0B}', '\u{0C}'];

/// Per-compilation settings for the tokenizer and parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Name reported in error locations.
    pub file: String,
    /// Characters skipped between tokens.
    pub whitespace: Vec<char>,
    /// Emit comment tokens from the tokenizer. The grammar ignores them either way.
    pub keep_comments: bool,
}

impl ParseOptions {
    pub fn for_file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            file: "<memory>".to_string(),
            whitespace: DEFAULT_WHITESPACE.to_vec(),
            keep_comments: false,
        }
    }
}
