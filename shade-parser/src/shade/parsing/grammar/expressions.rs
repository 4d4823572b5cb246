//! The expression precedence ladder.
//!
//!     From loosest to tightest binding: `||`, `&&`, comparisons (non associative), `|`, `^`,
//!     `&`, shifts, additive, multiplicative, prefix operators, postfix accessors and
//!     primaries. Every binary level is a loop that folds to the left.

use super::{collect_list, comma_list, identifier, template_items, template_list, token_range};
use crate::shade::ast::operators::{
    BinaryOperator, ComparisonOperator, LiteralKind, LogicalOperator, UnaryOperator,
};
use crate::shade::error::{Error, Result};
use crate::shade::lexing::TokenKind;
use crate::shade::parsing::engine::{
    branch, named, one_of, optional, part, repeat, seq, token, Captures, Grammar, Rule, Site,
};
use crate::shade::parsing::structure_data::{NodeData, StructureData};

/// Binary levels as (part, operand part, operators).
const BINARY_LEVELS: [(&str, &str, &[TokenKind]); 8] = [
    ("logical_or", "logical_and", &[TokenKind::OrOr]),
    ("logical_and", "comparison", &[TokenKind::AndAnd]),
    ("bit_or", "bit_xor", &[TokenKind::Or]),
    ("bit_xor", "bit_and", &[TokenKind::Xor]),
    ("bit_and", "shift", &[TokenKind::And]),
    ("shift", "additive", &[TokenKind::ShiftLeft, TokenKind::ShiftRight]),
    ("additive", "multiplicative", &[TokenKind::Plus, TokenKind::Minus]),
    (
        "multiplicative",
        "unary",
        &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    ),
];

const COMPARISONS: [TokenKind; 6] = [
    TokenKind::EqualEqual,
    TokenKind::NotEqual,
    TokenKind::LessThan,
    TokenKind::LessThanEqual,
    TokenKind::GreaterThan,
    TokenKind::GreaterThanEqual,
];

pub(super) fn register(grammar: &mut Grammar) {
    grammar.alias("expression", part("logical_or"));

    for (name, operand, operators) in BINARY_LEVELS {
        grammar.define(
            name,
            seq(vec![
                named("first", part(operand)),
                named("rest", repeat(operation(operand, operators))),
            ]),
            fold_binary,
        );
    }
    grammar.define(
        "comparison",
        seq(vec![
            named("first", part("bit_or")),
            named("rest", optional(operation("bit_or", &COMPARISONS))),
        ]),
        fold_binary,
    );

    grammar.alias(
        "unary",
        branch(vec![
            part("prefix_expression"),
            part("pointer_expression"),
            part("address_of_expression"),
            part("postfix"),
        ]),
    );
    grammar.define(
        "prefix_expression",
        seq(vec![
            named(
                "operator",
                one_of(&[TokenKind::Minus, TokenKind::Bang, TokenKind::Tilde]),
            ),
            named("value", part("unary")),
        ]),
        prefix_expression,
    );
    grammar.define(
        "pointer_expression",
        seq(vec![token(TokenKind::Star), named("value", part("unary"))]),
        |captures, site| {
            Ok(site.node(NodeData::PointerExpression {
                value: Box::new(captures.data("value")?),
            }))
        },
    );
    grammar.define(
        "address_of_expression",
        seq(vec![token(TokenKind::And), named("value", part("unary"))]),
        |captures, site| {
            Ok(site.node(NodeData::AddressOfExpression {
                value: Box::new(captures.data("value")?),
            }))
        },
    );
    grammar.define(
        "postfix",
        seq(vec![
            named("value", part("primary")),
            named(
                "accessors",
                repeat(branch(vec![
                    seq(vec![
                        token(TokenKind::OpenBracket),
                        named("index", part("expression")),
                        named("close", token(TokenKind::CloseBracket)),
                    ]),
                    seq(vec![
                        token(TokenKind::Period),
                        named("member", token(TokenKind::Identifier)),
                    ]),
                ])),
            ),
        ]),
        postfix,
    );

    grammar.alias(
        "primary",
        branch(vec![
            part("literal"),
            part("parenthesized_expression"),
            part("identifier_expression"),
        ]),
    );
    grammar.define(
        "literal",
        one_of(&[
            TokenKind::BoolLiteral,
            TokenKind::IntLiteral,
            TokenKind::FloatLiteral,
            TokenKind::StringLiteral,
        ]),
        literal,
    );
    grammar.define(
        "parenthesized_expression",
        seq(vec![
            token(TokenKind::OpenParen),
            named("value", part("expression")),
            token(TokenKind::CloseParen),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::ParenthesizedExpression {
                value: Box::new(captures.data("value")?),
            }))
        },
    );
    grammar.define(
        "identifier_expression",
        seq(vec![
            named("name", token(TokenKind::Identifier)),
            optional(template_list()),
            optional(seq(vec![
                named("open", token(TokenKind::OpenParen)),
                optional(comma_list("argument_first", "argument_rest", part("expression"))),
                token(TokenKind::CloseParen),
            ])),
        ]),
        identifier_expression,
    );
}

/// `op operand`, captured as `operator` and `operand`.
fn operation(operand: &'static str, operators: &[TokenKind]) -> Rule {
    seq(vec![
        named("operator", one_of(operators)),
        named("operand", part(operand)),
    ])
}

fn combine(operator: TokenKind, left: StructureData, right: StructureData) -> Result<NodeData> {
    let (left, right) = (Box::new(left), Box::new(right));
    if let Some(operator) = LogicalOperator::from_token(operator) {
        return Ok(NodeData::LogicalExpression {
            operator,
            left,
            right,
        });
    }
    if let Some(operator) = ComparisonOperator::from_token(operator) {
        return Ok(NodeData::ComparisonExpression {
            operator,
            left,
            right,
        });
    }
    if let Some(operator) = BinaryOperator::from_token(operator) {
        return Ok(NodeData::BinaryExpression {
            operator,
            left,
            right,
        });
    }
    Err(Error::structural(format!(
        "{} is not a binary operator",
        operator
    )))
}

fn fold_binary(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let mut left = captures.data("first")?;
    for mut group in captures.groups("rest") {
        let operator = group.token("operator")?;
        let right = group.data("operand")?;
        let position = left.meta.position.join(&right.meta.position);
        let data = combine(operator.kind, left, right)?;
        left = StructureData::new(data, site.file, position);
    }
    Ok(left)
}

fn prefix_expression(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let token = captures.token("operator")?;
    let operator = UnaryOperator::from_token(token.kind)
        .ok_or_else(|| Error::structural(format!("{} is not a unary operator", token.kind)))?;
    Ok(site.node(NodeData::UnaryExpression {
        operator,
        value: Box::new(captures.data("value")?),
    }))
}

fn postfix(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let mut value = captures.data("value")?;
    for mut accessor in captures.groups("accessors") {
        let start = value.meta.position.clone();
        let (data, last) = if let Some(member) = accessor.optional_token("member") {
            let last = token_range(&member);
            let data = NodeData::ValueDecomposition {
                value: Box::new(value),
                member: member.text,
            };
            (data, last)
        } else {
            let index = accessor.data("index")?;
            let last = token_range(&accessor.token("close")?);
            let data = NodeData::IndexExpression {
                value: Box::new(value),
                index: Box::new(index),
            };
            (data, last)
        };
        value = StructureData::new(data, site.file, start.join(&last));
    }
    Ok(value)
}

fn literal(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let token = captures.token("value")?;
    let kind = LiteralKind::from_token(token.kind)
        .ok_or_else(|| Error::structural(format!("{} is not a literal", token.kind)))?;
    Ok(site.node(NodeData::Literal {
        kind,
        text: token.text,
    }))
}

/// A name, a type with a template list, or a call.
fn identifier_expression(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let name = identifier(captures, "name")?;
    let template = template_items(captures);
    let data = if captures.has("open") {
        NodeData::FunctionCall {
            name,
            template,
            arguments: collect_list(captures, "argument_first", "argument_rest"),
        }
    } else if !template.is_empty() {
        NodeData::TypeDeclaration { name, template }
    } else {
        NodeData::VariableName { name }
    };
    Ok(site.node(data))
}
