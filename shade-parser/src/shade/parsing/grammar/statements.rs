//! Blocks and statements.

use super::{collect_list, comma_list};
use crate::shade::ast::operators::{AssignmentOperator, IncrementOperator};
use crate::shade::error::{Error, Result};
use crate::shade::lexing::TokenKind;
use crate::shade::parsing::engine::{
    branch, named, one_of, optional, part, repeat, seq, token, Captures, Grammar, Rule, Site,
};
use crate::shade::parsing::structure_data::{NodeData, NodeType, StructureData};

const ASSIGNMENTS: [TokenKind; 11] = [
    TokenKind::Equal,
    TokenKind::PlusEqual,
    TokenKind::MinusEqual,
    TokenKind::StarEqual,
    TokenKind::SlashEqual,
    TokenKind::PercentEqual,
    TokenKind::AndEqual,
    TokenKind::OrEqual,
    TokenKind::XorEqual,
    TokenKind::ShiftLeftEqual,
    TokenKind::ShiftRightEqual,
];

pub(super) fn register(grammar: &mut Grammar) {
    grammar.define(
        "block",
        seq(vec![
            token(TokenKind::OpenBrace),
            named(
                "statements",
                repeat(branch(vec![part("statement"), token(TokenKind::Semicolon)])),
            ),
            token(TokenKind::CloseBrace),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::BlockStatement {
                statements: captures.list("statements"),
            }))
        },
    );
    grammar.alias(
        "statement",
        branch(vec![
            part("block"),
            part("if_statement"),
            part("while_statement"),
            part("do_while_statement"),
            part("for_statement"),
            part("switch_statement"),
            part("break_statement"),
            part("continue_statement"),
            part("return_statement"),
            part("discard_statement"),
            terminated("variable_declaration"),
            terminated("assignment"),
            terminated("increment_decrement"),
            terminated("call_statement"),
        ]),
    );
    grammar.define(
        "if_statement",
        seq(vec![
            token(TokenKind::If),
            named("condition", part("expression")),
            named("then_block", part("block")),
            optional(seq(vec![
                token(TokenKind::Else),
                named(
                    "else_branch",
                    branch(vec![part("if_statement"), part("block")]),
                ),
            ])),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::IfStatement {
                condition: Box::new(captures.data("condition")?),
                then_block: Box::new(captures.data("then_block")?),
                else_branch: captures.optional_data("else_branch").map(Box::new),
            }))
        },
    );
    grammar.define(
        "while_statement",
        seq(vec![
            token(TokenKind::While),
            named("condition", part("expression")),
            named("body", part("block")),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::WhileStatement {
                condition: Box::new(captures.data("condition")?),
                body: Box::new(captures.data("body")?),
            }))
        },
    );
    grammar.define(
        "do_while_statement",
        seq(vec![
            token(TokenKind::Do),
            named("body", part("block")),
            token(TokenKind::While),
            named("condition", part("expression")),
            token(TokenKind::Semicolon),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::DoWhileStatement {
                body: Box::new(captures.data("body")?),
                condition: Box::new(captures.data("condition")?),
            }))
        },
    );
    grammar.define(
        "for_statement",
        seq(vec![
            token(TokenKind::For),
            token(TokenKind::OpenParen),
            optional(named("init", part("variable_declaration"))),
            token(TokenKind::Semicolon),
            optional(named("condition", part("expression"))),
            token(TokenKind::Semicolon),
            optional(named(
                "update",
                branch(vec![
                    part("assignment"),
                    part("increment_decrement"),
                    part("call_statement"),
                ]),
            )),
            token(TokenKind::CloseParen),
            named("body", part("block")),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::ForStatement {
                init: captures.optional_data("init").map(Box::new),
                condition: captures.optional_data("condition").map(Box::new),
                update: captures.optional_data("update").map(Box::new),
                body: Box::new(captures.data("body")?),
            }))
        },
    );
    grammar.define(
        "switch_statement",
        seq(vec![
            token(TokenKind::Switch),
            named("selector", part("expression")),
            token(TokenKind::OpenBrace),
            named(
                "cases",
                repeat(branch(vec![part("case_clause"), part("default_clause")])),
            ),
            token(TokenKind::CloseBrace),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::SwitchStatement {
                selector: Box::new(captures.data("selector")?),
                cases: captures.list("cases"),
            }))
        },
    );
    grammar.define(
        "case_clause",
        seq(vec![
            token(TokenKind::Case),
            comma_list("first", "rest", part("expression")),
            optional(token(TokenKind::Colon)),
            named("body", part("block")),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::SwitchCase {
                selectors: collect_list(captures, "first", "rest"),
                is_default: false,
                body: Box::new(captures.data("body")?),
            }))
        },
    );
    grammar.define(
        "default_clause",
        seq(vec![
            token(TokenKind::Default),
            optional(token(TokenKind::Colon)),
            named("body", part("block")),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::SwitchCase {
                selectors: Vec::new(),
                is_default: true,
                body: Box::new(captures.data("body")?),
            }))
        },
    );
    grammar.define(
        "break_statement",
        seq(vec![token(TokenKind::Break), token(TokenKind::Semicolon)]),
        |_, site| Ok(site.node(NodeData::BreakStatement)),
    );
    grammar.define(
        "continue_statement",
        seq(vec![token(TokenKind::Continue), token(TokenKind::Semicolon)]),
        |_, site| Ok(site.node(NodeData::ContinueStatement)),
    );
    grammar.define(
        "discard_statement",
        seq(vec![token(TokenKind::Discard), token(TokenKind::Semicolon)]),
        |_, site| Ok(site.node(NodeData::DiscardStatement)),
    );
    grammar.define(
        "return_statement",
        seq(vec![
            token(TokenKind::Return),
            optional(named("value", part("expression"))),
            token(TokenKind::Semicolon),
        ]),
        |captures, site| {
            Ok(site.node(NodeData::ReturnStatement {
                value: captures.optional_data("value").map(Box::new),
            }))
        },
    );
    grammar.define(
        "assignment",
        seq(vec![
            named("target", part("unary")),
            named("operator", one_of(&ASSIGNMENTS)),
            named("value", part("expression")),
        ]),
        assignment,
    );
    grammar.define(
        "increment_decrement",
        seq(vec![
            named("target", part("unary")),
            named(
                "operator",
                one_of(&[TokenKind::PlusPlus, TokenKind::MinusMinus]),
            ),
        ]),
        increment_decrement,
    );
    grammar.define(
        "call_statement",
        named("call", part("identifier_expression")),
        call_statement,
    );
}

/// `part ';'`, passing the part's record through.
fn terminated(name: &'static str) -> Rule {
    seq(vec![named("inner", part(name)), token(TokenKind::Semicolon)])
}

fn assignment(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let token = captures.token("operator")?;
    let operator = AssignmentOperator::from_token(token.kind).ok_or_else(|| {
        Error::structural(format!("{} is not an assignment operator", token.kind))
    })?;
    Ok(site.node(NodeData::AssignmentStatement {
        operator,
        target: Box::new(captures.data("target")?),
        value: Box::new(captures.data("value")?),
    }))
}

fn increment_decrement(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let token = captures.token("operator")?;
    let operator = IncrementOperator::from_token(token.kind).ok_or_else(|| {
        Error::structural(format!("{} is not an increment operator", token.kind))
    })?;
    Ok(site.node(NodeData::IncrementDecrementStatement {
        operator,
        target: Box::new(captures.data("target")?),
    }))
}

fn call_statement(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let call = captures.data("call")?;
    if call.node_type() != NodeType::FunctionCall {
        return Err(Error::structural(format!(
            "expected a function call statement, found {}",
            call.node_type()
        )));
    }
    Ok(site.node(NodeData::FunctionCallStatement {
        call: Box::new(call),
    }))
}
