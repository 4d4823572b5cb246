//! Token definitions for the shade language
//!
//!     Raw token kinds are recognized by the logos derive. Two kinds are never produced by
//!     logos directly: [`TokenKind::TemplateListStart`] and [`TokenKind::TemplateListEnd`]. The
//!     tokenizer rewrites a `<` / `>` pair into them once the template-list scan confirms the
//!     pair (see [template_list](super::template_list)).
//!
//!     Pattern priority follows the logos rules: the longest match wins and, for equal
//!     lengths, exact `#[token]` patterns beat `#[regex]` patterns. That is what keeps
//!     keywords and `true`/`false` out of the identifier pattern.

use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// All possible token kinds in the shade language
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Comments
    #[regex(r"//[^\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // Literals
    #[token("true")]
    #[token("false")]
    BoolLiteral,
    #[regex(r"0[xX][0-9a-fA-F]+[iu]?")]
    #[regex(r"[0-9]+[iu]?")]
    IntLiteral,
    #[regex(r"([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?[fh]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fh]?")]
    #[regex(r"[0-9]+[fh]")]
    FloatLiteral,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    // Template list markers, synthesized by the tokenizer
    TemplateListStart,
    TemplateListEnd,

    // Operators
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AndEqual,
    #[token("|=")]
    OrEqual,
    #[token("^=")]
    XorEqual,
    #[token("<<=")]
    ShiftLeftEqual,
    #[token(">>=")]
    ShiftRightEqual,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("<=")]
    LessThanEqual,
    #[token(">=")]
    GreaterThanEqual,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    And,
    #[token("|")]
    Or,
    #[token("^")]
    Xor,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("<")]
    LessThan,
    #[token(">")]
    GreaterThan,
    #[token("=")]
    Equal,
    #[token("@")]
    At,

    // Punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Period,

    // Keywords
    #[token("alias")]
    Alias,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("fn")]
    Fn,
    #[token("const")]
    Const,
    #[token("let")]
    Let,
    #[token("storage")]
    Storage,
    #[token("uniform")]
    Uniform,
    #[token("workgroup")]
    Workgroup,
    #[token("private")]
    Private,
    #[token("param")]
    Param,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("discard")]
    Discard,
}

/// The closed set of token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Comment,
    Identifier,
    Literal,
    TemplateList,
    Operator,
    Punctuation,
    Keyword,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            LineComment | BlockComment => TokenCategory::Comment,
            Identifier => TokenCategory::Identifier,
            BoolLiteral | IntLiteral | FloatLiteral | StringLiteral => TokenCategory::Literal,
            TemplateListStart | TemplateListEnd => TokenCategory::TemplateList,
            OpenParen | CloseParen | OpenBracket | CloseBracket | OpenBrace | CloseBrace
            | Comma | Semicolon | Colon | Period => TokenCategory::Punctuation,
            Alias | Struct | Enum | Fn | Const | Let | Storage | Uniform | Workgroup | Private
            | Param | If | Else | While | Do | For | Switch | Case | Default | Break
            | Continue | Return | Discard => TokenCategory::Keyword,
            _ => TokenCategory::Operator,
        }
    }

    /// Check if this token is a comment
    pub fn is_comment(self) -> bool {
        self.category() == TokenCategory::Comment
    }

    /// The fixed spelling of this kind, when it has one.
    pub fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            LineComment | BlockComment | Identifier | BoolLiteral | IntLiteral | FloatLiteral
            | StringLiteral => return None,
            TemplateListStart => "<",
            TemplateListEnd => ">",
            PlusPlus => "++",
            MinusMinus => "--",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            AndEqual => "&=",
            OrEqual => "|=",
            XorEqual => "^=",
            ShiftLeftEqual => "<<=",
            ShiftRightEqual => ">>=",
            ShiftLeft => "<<",
            ShiftRight => ">>",
            LessThanEqual => "<=",
            GreaterThanEqual => ">=",
            EqualEqual => "==",
            NotEqual => "!=",
            AndAnd => "&&",
            OrOr => "||",
            Arrow => "->",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            And => "&",
            Or => "|",
            Xor => "^",
            Tilde => "~",
            Bang => "!",
            LessThan => "<",
            GreaterThan => ">",
            Equal => "=",
            At => "@",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            OpenBrace => "{",
            CloseBrace => "}",
            Comma => ",",
            Semicolon => ";",
            Colon => ":",
            Period => ".",
            Alias => "alias",
            Struct => "struct",
            Enum => "enum",
            Fn => "fn",
            Const => "const",
            Let => "let",
            Storage => "storage",
            Uniform => "uniform",
            Workgroup => "workgroup",
            Private => "private",
            Param => "param",
            If => "if",
            Else => "else",
            While => "while",
            Do => "do",
            For => "for",
            Switch => "switch",
            Case => "case",
            Default => "default",
            Break => "break",
            Continue => "continue",
            Return => "return",
            Discard => "discard",
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self, self.spelling()) {
            (TokenKind::TemplateListStart, _) => write!(f, "template list start"),
            (TokenKind::TemplateListEnd, _) => write!(f, "template list end"),
            (_, Some(text)) => write!(f, "`{}`", text),
            (TokenKind::LineComment | TokenKind::BlockComment, None) => write!(f, "comment"),
            (TokenKind::Identifier, None) => write!(f, "identifier"),
            (TokenKind::BoolLiteral, None) => write!(f, "boolean literal"),
            (TokenKind::IntLiteral, None) => write!(f, "integer literal"),
            (TokenKind::FloatLiteral, None) => write!(f, "float literal"),
            (_, None) => write!(f, "string literal"),
        }
    }
}

/// A single token with its kind, matched text and position.
///
/// `span` holds byte offsets into the source; `line` and `column` are zero based and
/// point at the first byte of the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        span: Range<usize>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source).filter_map(|result| result.ok()).collect()
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            kinds("const constant let letter"),
            vec![
                TokenKind::Const,
                TokenKind::Identifier,
                TokenKind::Let,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("1 2u 0x1F 1.0 .5 1e3 2f 3.5h true \"hi\""),
            vec![
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral,
                TokenKind::BoolLiteral,
                TokenKind::StringLiteral,
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(
            kinds("<<= >>= << >> <= >= ++ -- ->"),
            vec![
                TokenKind::ShiftLeftEqual,
                TokenKind::ShiftRightEqual,
                TokenKind::ShiftLeft,
                TokenKind::ShiftRight,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Arrow,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// line\n/* block * still */"),
            vec![TokenKind::LineComment, TokenKind::BlockComment]
        );
    }

    #[test]
    fn test_token_categories() {
        assert_eq!(TokenKind::Identifier.category(), TokenCategory::Identifier);
        assert_eq!(TokenKind::Semicolon.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::OrOr.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Discard.category(), TokenCategory::Keyword);
        assert_eq!(
            TokenKind::TemplateListEnd.category(),
            TokenCategory::TemplateList
        );
        assert!(TokenKind::BlockComment.is_comment());
    }

    #[test]
    fn test_display_for_errors() {
        assert_eq!(TokenKind::Semicolon.to_string(), "`;`");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
        assert_eq!(TokenKind::TemplateListEnd.to_string(), "template list end");
    }
}
