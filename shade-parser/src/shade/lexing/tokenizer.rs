//! Tokenizer
//!
//!     The tokenizer is a lazy iterator over [`Token`]s. Each call to `next` trims the
//!     configured whitespace set, then asks logos for exactly one token at the current offset.
//!     Lexing one token at a time (instead of running a single logos lexer to the end) lets
//!     the tokenizer split a `>>` in two when both halves close template lists.
//!
//!     Template lists: when a `<` follows an identifier, the forward scan in
//!     [template_list](super::template_list) decides whether it opens a template list. On
//!     success the `<` is emitted as [`TokenKind::TemplateListStart`] and the offset of the
//!     matching `>` is remembered, so that it comes out as [`TokenKind::TemplateListEnd`].
//!
//!     The first error ends the sequence: after yielding an `Err` the iterator is exhausted.

use super::template_list;
use super::token::{Token, TokenKind};
use crate::shade::error::{Error, Result};
use crate::shade::options::ParseOptions;
use crate::shade::range::{LineIndex, Location};
use logos::Logos;
use std::collections::BTreeSet;

/// Lazy, finite token sequence over one source text.
pub struct Tokenizer<'src> {
    source: &'src str,
    file: String,
    whitespace: Vec<char>,
    keep_comments: bool,
    lines: LineIndex,
    offset: usize,
    template_starts: BTreeSet<usize>,
    template_ends: BTreeSet<usize>,
    previous: Option<TokenKind>,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str, options: &ParseOptions) -> Self {
        Self {
            source,
            file: options.file.clone(),
            whitespace: options.whitespace.clone(),
            keep_comments: options.keep_comments,
            lines: LineIndex::new(source),
            offset: 0,
            template_starts: BTreeSet::new(),
            template_ends: BTreeSet::new(),
            previous: None,
            finished: false,
        }
    }

    /// The source text being tokenized.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.offset..];
        let trimmed = rest.trim_start_matches(|c: char| self.whitespace.contains(&c));
        self.offset += rest.len() - trimmed.len();
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        let position = self.lines.position(start);
        Token::new(
            kind,
            &self.source[start..end],
            start..end,
            position.line,
            position.column,
        )
    }

    fn error_at(&self, message: String, start: usize, end: usize) -> Error {
        let range = self.lines.range(&(start..end));
        Error::lex(message).located(Location::new(self.file.clone(), range))
    }

    fn unknown_input(&self, start: usize) -> Error {
        let rest = &self.source[start..];
        let width = rest.chars().next().map_or(1, char::len_utf8);
        let message = if rest.starts_with("/*") {
            "unterminated block comment".to_string()
        } else if rest.starts_with('"') {
            "unterminated string literal".to_string()
        } else {
            format!("unexpected character {:?}", &rest[..width])
        };
        self.error_at(message, start, start + width)
    }

    /// Turn a `<` into a template-list start when the forward scan confirms it.
    fn classify_less_than(&mut self, start: usize) -> TokenKind {
        if self.previous != Some(TokenKind::Identifier) {
            return TokenKind::LessThan;
        }
        if self.template_starts.remove(&start) {
            log::trace!("template list at {} confirmed by an enclosing scan", start);
            return TokenKind::TemplateListStart;
        }
        match template_list::discover(self.source, start, &self.whitespace) {
            Some(scan) => {
                log::trace!("template list {}..={}", scan.start, scan.end);
                self.template_ends.insert(scan.end);
                for (nested_start, nested_end) in scan.nested {
                    self.template_starts.insert(nested_start);
                    self.template_ends.insert(nested_end);
                }
                TokenKind::TemplateListStart
            }
            None => {
                log::trace!("`<` at {} is a comparison", start);
                TokenKind::LessThan
            }
        }
    }

    fn next_token(&mut self) -> Option<Result<Token>> {
        loop {
            self.skip_whitespace();
            let start = self.offset;
            if start >= self.source.len() {
                return None;
            }

            if self.template_ends.remove(&start) {
                self.offset = start + 1;
                self.previous = Some(TokenKind::TemplateListEnd);
                return Some(Ok(self.make_token(TokenKind::TemplateListEnd, start, start + 1)));
            }

            let mut lexer = TokenKind::lexer(&self.source[start..]);
            let kind = match lexer.next() {
                Some(Ok(kind)) => kind,
                Some(Err(())) | None => return Some(Err(self.unknown_input(start))),
            };
            let end = start + lexer.span().end;
            self.offset = end;

            let kind = match kind {
                TokenKind::LessThan => self.classify_less_than(start),
                other => other,
            };

            if kind.is_comment() {
                if self.keep_comments {
                    return Some(Ok(self.make_token(kind, start, end)));
                }
                continue;
            }

            self.previous = Some(kind);
            return Some(Ok(self.make_token(kind, start, end)));
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let next = self.next_token();
        if !matches!(next, Some(Ok(_))) {
            self.finished = true;
        }
        next
    }
}

/// Tokenize a source string with default options.
///
/// The returned iterator is lazy; nothing is scanned until it is pulled.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source, &ParseOptions::default())
}

/// Tokenize with explicit options.
pub fn tokenize_with<'src>(source: &'src str, options: &ParseOptions) -> Tokenizer<'src> {
    Tokenizer::new(source, options)
}
