//! Grammar for the shade language
//!
//!     The grammar is a table of named parts for the [engine](super::engine). It is split by
//!     syntax category:
//!
//!         - [declarations](declarations): the module, top-level declarations, attributes and
//!           type declarations.
//!         - [statements](statements): blocks and every statement form.
//!         - [expressions](expressions): the precedence ladder down to primaries.
//!
//!     Every part that produces a node carries a transform building its [`StructureData`].
//!     Parts registered with `alias` only choose between other parts and pass the chosen
//!     record through.
//!
//! Template lists
//!
//!     Template-list items are parsed as expressions. After the list is collected, items that
//!     can only be types are promoted to type items: a bare identifier naming a build-in type
//!     family (`f32`, `vec3`, `sampler`, ...) and any identifier that carries its own
//!     template list. Everything else stays an expression; a bare user identifier such as a
//!     struct name is re-read as a type name during semantic resolution, when the slot it
//!     sits in turns out to require a type.
//!
//!     The table is built once and shared; it holds no mutable state.

mod declarations;
mod expressions;
mod statements;

pub(crate) use declarations::unquote;

use super::engine::{named, optional, repeat, seq, token, Captures, Grammar, Rule};
use super::structure_data::{NodeData, StructureData};
use crate::shade::error::Result;
use crate::shade::lexing::{Token, TokenKind};
use crate::shade::range::{Position, Range};
use crate::shade::types::definition::is_build_in_type_name;
use once_cell::sync::Lazy;

/// The shade grammar, entry part `module`.
pub static GRAMMAR: Lazy<Grammar> = Lazy::new(build);

pub fn build() -> Grammar {
    let mut grammar = Grammar::new("module");
    declarations::register(&mut grammar);
    statements::register(&mut grammar);
    expressions::register(&mut grammar);
    grammar
}

/// `item (',' item)* ','?`, captured as `first` and `rest`.
fn comma_list(first: &'static str, rest: &'static str, item: Rule) -> Rule {
    seq(vec![
        named(first, item.clone()),
        named(
            rest,
            repeat(seq(vec![token(TokenKind::Comma), named("item", item)])),
        ),
        optional(token(TokenKind::Comma)),
    ])
}

fn collect_list(captures: &mut Captures, first: &str, rest: &str) -> Vec<StructureData> {
    let mut items: Vec<StructureData> = captures.optional_data(first).into_iter().collect();
    items.extend(captures.list(rest));
    items
}

/// `TEMPLATE_START expression (',' expression)* ','? TEMPLATE_END`
fn template_list() -> Rule {
    seq(vec![
        token(TokenKind::TemplateListStart),
        comma_list("template_first", "template_rest", super::engine::part("expression")),
        token(TokenKind::TemplateListEnd),
    ])
}

fn template_items(captures: &mut Captures) -> Vec<StructureData> {
    collect_list(captures, "template_first", "template_rest")
        .into_iter()
        .map(promote_template_item)
        .collect()
}

fn promote_template_item(item: StructureData) -> StructureData {
    match &item.data {
        NodeData::VariableName { name } if is_build_in_type_name(name) => {
            item.with_data(NodeData::TypeDeclaration {
                name: name.clone(),
                template: Vec::new(),
            })
        }
        _ => item,
    }
}

fn identifier(captures: &mut Captures, name: &str) -> Result<String> {
    Ok(captures.token(name)?.text)
}

/// Range of a single token. Tokens never span lines except block comments, which the
/// grammar never sees.
fn token_range(token: &Token) -> Range {
    let start = Position::new(token.line, token.column);
    let end = Position::new(token.line, token.column + token.text.len());
    Range::new(token.span.clone(), start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::lexing::tokenize;
    use crate::shade::parsing::engine::Engine;
    use crate::shade::parsing::structure_data::NodeType;

    fn analyze(source: &str) -> StructureData {
        Engine::new(&GRAMMAR, tokenize(source), "<test>")
            .parse()
            .expect("parses")
    }

    fn declarations(data: &StructureData) -> &[StructureData] {
        match &data.data {
            NodeData::Module { declarations } => declarations,
            other => panic!("not a module: {:?}", other),
        }
    }

    #[test]
    fn test_empty_module() {
        let data = analyze("");
        assert_eq!(data.node_type(), NodeType::Module);
        assert!(declarations(&data).is_empty());
    }

    #[test]
    fn test_template_items_are_promoted() {
        let data = analyze("alias A = array<vec2<f32>, N>;");
        let NodeData::AliasDeclaration { target, .. } = &declarations(&data)[0].data else {
            panic!("expected alias");
        };
        let NodeData::TypeDeclaration { name, template } = &target.data else {
            panic!("expected type declaration");
        };
        assert_eq!(name, "array");
        assert_eq!(template[0].node_type(), NodeType::TypeDeclaration);
        assert_eq!(template[1].node_type(), NodeType::VariableName);
    }

    #[test]
    fn test_builtin_family_item_is_promoted() {
        let data = analyze("alias A = vec3<f32>;");
        let NodeData::AliasDeclaration { target, .. } = &declarations(&data)[0].data else {
            panic!("expected alias");
        };
        let NodeData::TypeDeclaration { template, .. } = &target.data else {
            panic!("expected type declaration");
        };
        assert!(template[0].is_type_item());
    }

    #[test]
    fn test_user_identifier_item_stays_expression() {
        let data = analyze("alias A = array<Light, 4>;");
        let NodeData::AliasDeclaration { target, .. } = &declarations(&data)[0].data else {
            panic!("expected alias");
        };
        let NodeData::TypeDeclaration { template, .. } = &target.data else {
            panic!("expected type declaration");
        };
        assert!(!template[0].is_type_item());
        assert_eq!(template[1].node_type(), NodeType::Literal);
    }
}
