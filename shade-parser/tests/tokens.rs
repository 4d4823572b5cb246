//! Token stream tests
//!
//! The tokenizer unit tests cover single constructs. These run it over whole declarations
//! and over the sample library, checking that the stream accounts for every byte of the
//! source.

use shade_parser::shade::lexing::{tokenize, tokenize_with, Token, TokenCategory, TokenKind};
use shade_parser::shade::options::ParseOptions;
use shade_parser::shade::testing::samples::Samples;

fn dump(source: &str) -> String {
    tokenize(source)
        .map(|token| token.unwrap().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_declaration_token_dump() {
    insta::assert_snapshot!(
        dump("const n: array<u32, 4> = x >> 1u;"),
        @r#"Const("const") Identifier("n") Colon(":") Identifier("array") TemplateListStart("<") Identifier("u32") Comma(",") IntLiteral("4") TemplateListEnd(">") Equal("=") Identifier("x") ShiftRight(">>") IntLiteral("1u") Semicolon(";")"#
    );
}

#[test]
fn test_literal_kinds() {
    let kinds: Vec<TokenKind> = tokenize(r#"1 0x1Fu 2.5 .5e3 1e4 3f 2h true "s""#)
        .map(|t| t.unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
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
fn test_keywords_win_over_identifiers() {
    let tokens: Vec<Token> = tokenize("fn fnord").map(|t| t.unwrap()).collect();
    assert_eq!(tokens[0].kind, TokenKind::Fn);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
    assert_eq!(tokens[1].text, "fnord");
}

#[test]
fn test_comparisons_in_expression_position() {
    let categories: Vec<TokenCategory> = tokenize("a<b || b>c;")
        .map(|t| t.unwrap().kind.category())
        .collect();
    assert_eq!(categories.len(), 8);
    assert!(!categories.contains(&TokenCategory::TemplateList));
}

#[test]
fn test_template_list_inside_call_arguments() {
    let kinds: Vec<TokenKind> = tokenize("f(vec2<f32>(1.0), a < b)")
        .map(|t| t.unwrap().kind)
        .collect();
    let starts = kinds
        .iter()
        .filter(|kind| **kind == TokenKind::TemplateListStart)
        .count();
    assert_eq!(starts, 1);
    assert!(kinds.contains(&TokenKind::LessThan));
}

#[test]
fn test_kept_comments_carry_positions() {
    let options = ParseOptions {
        keep_comments: true,
        ..ParseOptions::default()
    };
    let tokens: Vec<Token> = tokenize_with("a\n/* b */ c", &options)
        .map(|t| t.unwrap())
        .collect();
    assert_eq!(tokens[1].kind, TokenKind::BlockComment);
    assert_eq!((tokens[1].line, tokens[1].column), (1, 0));
    assert_eq!((tokens[2].line, tokens[2].column), (1, 8));
}

#[test]
fn test_lex_error_location_uses_file_name() {
    let options = ParseOptions::for_file("broken.shade");
    let error = tokenize_with("const a = 1;\nconst b = #;", &options)
        .find_map(|t| t.err())
        .unwrap();
    let location = error.location().unwrap();
    assert_eq!(location.file, "broken.shade");
    assert_eq!(location.range.start.line, 1);
    assert_eq!(location.range.start.column, 10);
}

#[test]
fn test_samples_tokenize_without_gaps() {
    for sample in Samples::valid() {
        let source = sample.source();
        let mut previous_end = 0;
        for token in sample.tokenize() {
            assert_eq!(&source[token.span.clone()], token.text, "{}", sample.name());
            let gap = &source[previous_end..token.span.start];
            let stripped = strip_comments(gap);
            assert!(
                stripped.trim().is_empty(),
                "{}: unexpected text {:?} before {}",
                sample.name(),
                gap,
                token
            );
            previous_end = token.span.end;
        }
        assert!(strip_comments(&source[previous_end..]).trim().is_empty());
    }
}

/// Remove `//` and `/* */` comments from a stretch of text that holds no tokens.
fn strip_comments(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |end| &after[end..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |end| &after[end + 2..]);
        } else {
            let c = rest.chars().next().unwrap_or(' ');
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    out
}
