//! Lexer
//!
//!     Tokenization is the first stage of the pipeline. It is a single pass with no
//!     transformations afterwards: the [tokenizer](tokenizer) pulls one token at a time from
//!     the source, so the grammar engine drives it on demand and nothing is scanned past the
//!     first error.
//!
//!     The only context-sensitive decision happens around `<`. Whether it opens a template
//!     list is settled by a bounded forward scan, see [template_list](template_list).
//!
//!     Tokens carry both their byte span and a zero based line/column pair. The byte span is
//!     what the building stage uses to compute node ranges; line/column is kept on the token
//!     for diagnostics and token dumps.

pub mod template_list;
pub mod token;
pub mod tokenizer;

pub use token::{Token, TokenCategory, TokenKind};
pub use tokenizer::{tokenize, tokenize_with, Tokenizer};
