//! Grammar Engine
//!
//!     A small PEG engine over the token stream. Grammars are tables of named parts; each
//!     part is a [`Rule`] built from a handful of combinators plus an optional transform that
//!     turns the part's captures into a [`StructureData`] record.
//!
//!     Combinators:
//!
//!         - `token(kind)`: consume one token of that kind.
//!         - `part(name)`: match another part. Parts are looked up by name when they are
//!           matched, so forward and mutually recursive references need no special setup.
//!         - `seq([...])`: all rules in order.
//!         - `optional(rule)`: zero or one.
//!         - `repeat(rule)`: zero or more. A repetition that consumes nothing ends the loop.
//!         - `branch([...])`: ordered alternatives, the first that matches wins.
//!         - `named(name, rule)`: capture the result of `rule` under `name`.
//!         - `end()`: the end of input.
//!
//!     Captures: a sequence collects the captures of its children; unnamed results are
//!     dropped. Captures made inside an optional or nested sequence flow up to the enclosing
//!     sequence, so `optional(seq([token(Colon), named("type", part("type"))]))` leaves a
//!     `type` capture in the enclosing part when the colon is present.
//!
//!     Backtracking: every failing rule restores the token position it started at. There is
//!     no memoization; the grammar is written so that alternatives are cheap to reject.
//!
//!     Failure: the engine records the furthest token position at which a token rule failed,
//!     together with every kind that was expected there. When the entry part does not match,
//!     that record becomes the [`Error::Parse`]. Errors raised by transforms or by the
//!     tokenizer abort immediately; no alternative is tried after them.

use crate::shade::error::{Error, Result};
use crate::shade::lexing::{Token, TokenKind, Tokenizer};
use crate::shade::parsing::structure_data::{NodeData, StructureData};
use crate::shade::range::{LineIndex, Location, Range};
use std::collections::{BTreeSet, HashMap};

/// A grammar rule.
#[derive(Debug, Clone)]
pub enum Rule {
    Token(TokenKind),
    Part(&'static str),
    Sequence(Vec<Rule>),
    Named(&'static str, Box<Rule>),
    Optional(Box<Rule>),
    Loop(Box<Rule>),
    Branch(Vec<Rule>),
    End,
}

pub fn token(kind: TokenKind) -> Rule {
    Rule::Token(kind)
}

pub fn part(name: &'static str) -> Rule {
    Rule::Part(name)
}

pub fn seq(rules: Vec<Rule>) -> Rule {
    Rule::Sequence(rules)
}

pub fn named(name: &'static str, rule: Rule) -> Rule {
    Rule::Named(name, Box::new(rule))
}

pub fn optional(rule: Rule) -> Rule {
    Rule::Optional(Box::new(rule))
}

pub fn repeat(rule: Rule) -> Rule {
    Rule::Loop(Box::new(rule))
}

pub fn branch(rules: Vec<Rule>) -> Rule {
    Rule::Branch(rules)
}

/// Any one of the given token kinds.
pub fn one_of(kinds: &[TokenKind]) -> Rule {
    Rule::Branch(kinds.iter().copied().map(Rule::Token).collect())
}

pub fn end() -> Rule {
    Rule::End
}

/// The value produced by matching a rule.
#[derive(Debug, Clone)]
pub enum Matched {
    Token(Token),
    Data(StructureData),
    Group(Captures),
    List(Vec<Matched>),
    Empty,
}

/// Named sub-matches collected while matching a part, in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct Captures {
    values: Vec<(&'static str, Matched)>,
}

impl Captures {
    fn single(name: &'static str, value: Matched) -> Self {
        Captures {
            values: vec![(name, value)],
        }
    }

    /// Append `other`'s captures. A name captured again moves to its latest position.
    fn merge(&mut self, other: Captures) {
        for (name, value) in other.values {
            self.values.retain(|(existing, _)| *existing != name);
            self.values.push((name, value));
        }
    }

    fn get(&self, name: &str) -> Option<&Matched> {
        self.values
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value)
    }

    /// The earliest structure data in the group.
    fn into_first_data(self) -> Option<StructureData> {
        self.values.into_iter().find_map(|(_, value)| match value {
            Matched::Data(data) => Some(data),
            _ => None,
        })
    }

    pub fn has(&self, name: &str) -> bool {
        !matches!(self.get(name), None | Some(Matched::Empty))
    }

    pub fn take(&mut self, name: &str) -> Option<Matched> {
        let index = self.values.iter().position(|(existing, _)| *existing == name)?;
        match self.values.remove(index).1 {
            Matched::Empty => None,
            value => Some(value),
        }
    }

    /// A required structure-data capture.
    pub fn data(&mut self, name: &str) -> Result<StructureData> {
        self.optional_data(name)
            .ok_or_else(|| Error::structural(format!("grammar capture `{}` is missing", name)))
    }

    pub fn optional_data(&mut self, name: &str) -> Option<StructureData> {
        match self.take(name)? {
            Matched::Data(data) => Some(data),
            Matched::Group(group) => group.into_first_data(),
            _ => None,
        }
    }

    /// A required token capture.
    pub fn token(&mut self, name: &str) -> Result<Token> {
        self.optional_token(name)
            .ok_or_else(|| Error::structural(format!("grammar token `{}` is missing", name)))
    }

    pub fn optional_token(&mut self, name: &str) -> Option<Token> {
        match self.take(name)? {
            Matched::Token(token) => Some(token),
            _ => None,
        }
    }

    /// All structure data captured by a repetition, in order.
    ///
    /// Each repetition may have produced the data directly or inside a group (when the
    /// repeated rule is a sequence with one named child). A single non-repeated capture is
    /// returned as a one-element list.
    pub fn list(&mut self, name: &str) -> Vec<StructureData> {
        match self.take(name) {
            None => Vec::new(),
            Some(Matched::Data(data)) => vec![data],
            Some(Matched::List(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Matched::Data(data) => Some(data),
                    Matched::Group(group) => group.into_first_data(),
                    _ => None,
                })
                .collect(),
            Some(_) => Vec::new(),
        }
    }

    /// The groups captured by a repetition of a sequence with several named children.
    pub fn groups(&mut self, name: &str) -> Vec<Captures> {
        match self.take(name) {
            Some(Matched::List(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Matched::Group(group) => Some(group),
                    _ => None,
                })
                .collect(),
            Some(Matched::Group(group)) => vec![group],
            _ => Vec::new(),
        }
    }
}

/// What a transform sees of the matched source.
pub struct Site<'a> {
    pub file: &'a str,
    pub range: Range,
    pub tokens: &'a [Token],
}

impl Site<'_> {
    pub fn start(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn end(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Wrap a payload in a record positioned at this site.
    pub fn node(&self, data: NodeData) -> StructureData {
        StructureData::new(data, self.file, self.range.clone())
    }
}

pub type Transform = fn(&mut Captures, &Site) -> Result<StructureData>;

pub struct Part {
    pub rule: Rule,
    pub transform: Option<Transform>,
}

/// A table of named parts with an entry point.
pub struct Grammar {
    parts: HashMap<&'static str, Part>,
    entry: &'static str,
}

impl Grammar {
    pub fn new(entry: &'static str) -> Self {
        Self {
            parts: HashMap::new(),
            entry,
        }
    }

    /// Define a part whose result is the transform's record.
    pub fn define(&mut self, name: &'static str, rule: Rule, transform: Transform) {
        self.parts.insert(
            name,
            Part {
                rule,
                transform: Some(transform),
            },
        );
    }

    /// Define a part that passes through whatever its rule produced.
    pub fn alias(&mut self, name: &'static str, rule: Rule) {
        self.parts.insert(
            name,
            Part {
                rule,
                transform: None,
            },
        );
    }

    pub fn get(&self, name: &str) -> Result<&Part> {
        self.parts
            .get(name)
            .ok_or_else(|| Error::structural(format!("unknown grammar part `{}`", name)))
    }

    pub fn entry(&self) -> &'static str {
        self.entry
    }
}

#[derive(Debug, Default)]
struct Furthest {
    position: usize,
    expected: BTreeSet<String>,
}

/// Drives a [`Grammar`] over a lazily pulled [`Tokenizer`].
pub struct Engine<'g, 'src> {
    grammar: &'g Grammar,
    tokens: Tokenizer<'src>,
    buffer: Vec<Token>,
    exhausted: bool,
    position: usize,
    furthest: Furthest,
    file: String,
    lines: LineIndex,
    source_len: usize,
}

impl<'g, 'src> Engine<'g, 'src> {
    pub fn new(grammar: &'g Grammar, tokens: Tokenizer<'src>, file: impl Into<String>) -> Self {
        let source = tokens.source();
        Self {
            grammar,
            lines: LineIndex::new(source),
            source_len: source.len(),
            tokens,
            buffer: Vec::new(),
            exhausted: false,
            position: 0,
            furthest: Furthest::default(),
            file: file.into(),
        }
    }

    /// Match the entry part against the whole token stream.
    pub fn parse(mut self) -> Result<StructureData> {
        let grammar = self.grammar;
        let entry = grammar.entry();
        match self.match_rule(&Rule::Part(entry))? {
            Some(Matched::Data(data)) => Ok(data),
            Some(_) => Err(Error::structural(format!(
                "entry part `{}` produced no structure data",
                entry
            ))),
            None => Err(self.parse_error()),
        }
    }

    fn peek(&mut self, index: usize) -> Result<Option<&Token>> {
        while self.buffer.len() <= index && !self.exhausted {
            match self.tokens.next() {
                Some(Ok(token)) if token.kind.is_comment() => continue,
                Some(Ok(token)) => self.buffer.push(token),
                Some(Err(error)) => return Err(error),
                None => self.exhausted = true,
            }
        }
        Ok(self.buffer.get(index))
    }

    fn fail(&mut self, expected: String) {
        if self.position > self.furthest.position {
            self.furthest.position = self.position;
            self.furthest.expected.clear();
        }
        if self.position == self.furthest.position {
            self.furthest.expected.insert(expected);
        }
    }

    fn parse_error(&self) -> Error {
        let (found, span) = match self.buffer.get(self.furthest.position) {
            Some(token) => (format!("`{}`", token.text), token.span.clone()),
            None => ("end of input".to_string(), self.source_len..self.source_len),
        };
        log::debug!(
            "parse failed at token {}: expected {:?}, found {}",
            self.furthest.position,
            self.furthest.expected,
            found
        );
        Error::Parse {
            expected: self.furthest.expected.iter().cloned().collect(),
            found,
            location: Some(Location::new(
                self.file.clone(),
                self.lines.range(&span),
            )),
        }
    }

    fn site_range(&self, start: usize, end: usize) -> Range {
        let last = end.checked_sub(1).and_then(|last| self.buffer.get(last));
        let span = match (self.buffer.get(start), last) {
            (Some(first), Some(last)) if end > start => first.span.start..last.span.end,
            (Some(first), _) => first.span.start..first.span.start,
            _ => self.source_len..self.source_len,
        };
        self.lines.range(&span)
    }

    fn match_rule(&mut self, rule: &Rule) -> Result<Option<Matched>> {
        match rule {
            Rule::Token(kind) => {
                let position = self.position;
                let matched = match self.peek(position)? {
                    Some(token) if token.kind == *kind => Some(token.clone()),
                    _ => None,
                };
                match matched {
                    Some(token) => {
                        self.position += 1;
                        Ok(Some(Matched::Token(token)))
                    }
                    None => {
                        self.fail(kind.to_string());
                        Ok(None)
                    }
                }
            }
            Rule::End => {
                let position = self.position;
                if self.peek(position)?.is_none() {
                    Ok(Some(Matched::Empty))
                } else {
                    self.fail("end of input".to_string());
                    Ok(None)
                }
            }
            Rule::Part(name) => self.match_part(name),
            Rule::Sequence(rules) => {
                let start = self.position;
                let mut captures = Captures::default();
                for rule in rules {
                    match self.match_rule(rule)? {
                        Some(Matched::Group(group)) => captures.merge(group),
                        Some(_) => {}
                        None => {
                            self.position = start;
                            return Ok(None);
                        }
                    }
                }
                Ok(Some(Matched::Group(captures)))
            }
            Rule::Named(name, rule) => Ok(self
                .match_rule(rule)?
                .map(|value| Matched::Group(Captures::single(name, value)))),
            Rule::Optional(rule) => {
                let start = self.position;
                match self.match_rule(rule)? {
                    Some(value) => Ok(Some(value)),
                    None => {
                        self.position = start;
                        Ok(Some(Matched::Empty))
                    }
                }
            }
            Rule::Loop(rule) => {
                let mut items = Vec::new();
                loop {
                    let start = self.position;
                    match self.match_rule(rule)? {
                        Some(value) if self.position > start => items.push(value),
                        _ => {
                            self.position = start;
                            break;
                        }
                    }
                }
                Ok(Some(Matched::List(items)))
            }
            Rule::Branch(rules) => {
                let start = self.position;
                for rule in rules {
                    if let Some(value) = self.match_rule(rule)? {
                        return Ok(Some(value));
                    }
                    self.position = start;
                }
                Ok(None)
            }
        }
    }

    fn match_part(&mut self, name: &str) -> Result<Option<Matched>> {
        let grammar = self.grammar;
        let part = grammar.get(name)?;
        let start = self.position;
        log::trace!("enter `{}` at token {}", name, start);

        let Some(value) = self.match_rule(&part.rule)? else {
            log::trace!("`{}` failed at token {}", name, start);
            return Ok(None);
        };
        let Some(transform) = part.transform else {
            return Ok(Some(value));
        };

        let mut captures = match value {
            Matched::Group(group) => group,
            other => Captures::single("value", other),
        };
        let range = self.site_range(start, self.position);
        let site = Site {
            file: &self.file,
            range: range.clone(),
            tokens: &self.buffer[start..self.position],
        };
        let data = transform(&mut captures, &site)
            .map_err(|error| error.located(Location::new(self.file.clone(), range)))?;
        Ok(Some(Matched::Data(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::ast::operators::LiteralKind;
    use crate::shade::lexing::tokenize;

    fn literal(captures: &mut Captures, site: &Site) -> Result<StructureData> {
        let token = captures.token("value")?;
        Ok(site.node(NodeData::Literal {
            kind: LiteralKind::Int,
            text: token.text,
        }))
    }

    fn block(captures: &mut Captures, site: &Site) -> Result<StructureData> {
        Ok(site.node(NodeData::BlockStatement {
            statements: captures.list("items"),
        }))
    }

    fn list_grammar() -> Grammar {
        let mut grammar = Grammar::new("list");
        grammar.define(
            "list",
            seq(vec![
                token(TokenKind::OpenBracket),
                named(
                    "items",
                    optional(seq(vec![
                        named("first", part("item")),
                        named(
                            "rest",
                            repeat(seq(vec![token(TokenKind::Comma), named("item", part("item"))])),
                        ),
                    ])),
                ),
                token(TokenKind::CloseBracket),
                end(),
            ]),
            |captures, site| {
                let mut group = captures.groups("items");
                let mut statements = Vec::new();
                if let Some(mut group) = group.pop() {
                    statements.extend(group.optional_data("first"));
                    statements.extend(group.list("rest"));
                }
                Ok(site.node(NodeData::BlockStatement { statements }))
            },
        );
        grammar.alias("item", branch(vec![part("number"), part("nested")]));
        grammar.define("number", token(TokenKind::IntLiteral), literal);
        grammar.define(
            "nested",
            seq(vec![
                token(TokenKind::OpenParen),
                named("items", repeat(part("item"))),
                token(TokenKind::CloseParen),
            ]),
            block,
        );
        grammar
    }

    fn run(grammar: &Grammar, source: &str) -> Result<StructureData> {
        Engine::new(grammar, tokenize(source), "<test>").parse()
    }

    fn statement_count(data: &StructureData) -> usize {
        match &data.data {
            NodeData::BlockStatement { statements } => statements.len(),
            _ => 0,
        }
    }

    #[test]
    fn test_sequence_with_repetition() {
        let grammar = list_grammar();
        let data = run(&grammar, "[1, 2, (3 4)]").unwrap();
        assert_eq!(statement_count(&data), 3);
        match &data.data {
            NodeData::BlockStatement { statements } => {
                assert_eq!(statement_count(&statements[2]), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_optional_content() {
        let grammar = list_grammar();
        let data = run(&grammar, "[]").unwrap();
        assert_eq!(statement_count(&data), 0);
    }

    #[test]
    fn test_site_range_covers_part() {
        let grammar = list_grammar();
        let data = run(&grammar, "[1, 22]").unwrap();
        assert_eq!(data.meta.position.span, 0..7);
        match &data.data {
            NodeData::BlockStatement { statements } => {
                assert_eq!(statements[1].meta.position.span, 4..6);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_furthest_failure_is_reported() {
        let grammar = list_grammar();
        let error = run(&grammar, "[1, 2 3]").unwrap_err();
        match error {
            Error::Parse {
                expected,
                found,
                location,
            } => {
                assert!(expected.contains(&"`,`".to_string()));
                assert!(expected.contains(&"`]`".to_string()));
                assert_eq!(found, "`3`");
                assert_eq!(location.unwrap().range.span, 6..7);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_trailing_input_fails_at_end_rule() {
        let grammar = list_grammar();
        let error = run(&grammar, "[1] 2").unwrap_err();
        assert_eq!(error.kind(), "ParseError");
        assert!(error.to_string().contains("end of input"));
    }

    #[test]
    fn test_lex_errors_abort() {
        let grammar = list_grammar();
        let error = run(&grammar, "[1, $]").unwrap_err();
        assert_eq!(error.kind(), "LexError");
    }

    #[test]
    fn test_group_yields_its_earliest_data() {
        let mut grammar = Grammar::new("pair");
        grammar.define(
            "pair",
            seq(vec![
                named(
                    "entries",
                    repeat(seq(vec![
                        named("key", part("number")),
                        token(TokenKind::Colon),
                        named("value", part("number")),
                        optional(token(TokenKind::Comma)),
                    ])),
                ),
                named(
                    "head",
                    seq(vec![
                        token(TokenKind::OpenParen),
                        named("left", part("number")),
                        named("right", part("number")),
                        token(TokenKind::CloseParen),
                    ]),
                ),
                end(),
            ]),
            |captures, site| {
                let mut statements = captures.list("entries");
                statements.extend(captures.optional_data("head"));
                Ok(site.node(NodeData::BlockStatement { statements }))
            },
        );
        grammar.define("number", token(TokenKind::IntLiteral), literal);

        for _ in 0..8 {
            let data = run(&grammar, "1: 2, 3: 4 (5 6)").unwrap();
            let NodeData::BlockStatement { statements } = &data.data else {
                panic!("unexpected {:?}", data.data);
            };
            let texts: Vec<_> = statements
                .iter()
                .map(|statement| match &statement.data {
                    NodeData::Literal { text, .. } => text.as_str(),
                    other => panic!("unexpected {:?}", other),
                })
                .collect();
            assert_eq!(texts, ["1", "3", "5"]);
        }
    }

    #[test]
    fn test_merge_keeps_capture_order() {
        let mut captures = Captures::single("a", Matched::Empty);
        captures.merge(Captures::single("b", Matched::Empty));
        captures.merge(Captures::single("a", Matched::Empty));
        let names: Vec<_> = captures.values.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(!captures.has("a"));
        assert_eq!(captures.take("a").map(|_| ()), None);
        assert_eq!(captures.values.len(), 1);
    }

    #[test]
    fn test_unknown_part_is_structural() {
        let mut grammar = Grammar::new("start");
        grammar.alias("start", part("missing"));
        let error = run(&grammar, "1").unwrap_err();
        assert_eq!(error.kind(), "StructuralError");
    }
}
