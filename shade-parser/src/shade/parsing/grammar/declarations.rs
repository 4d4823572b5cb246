//! Module-level declarations, attributes and type declarations.

use super::{collect_list, comma_list, identifier, template_items, template_list};
use crate::shade::ast::elements::{EnumInitializer, EnumValue};
use crate::shade::ast::operators::VariableKind;
use crate::shade::error::{Error, Result};
use crate::shade::lexing::TokenKind;
use crate::shade::parsing::engine::{
    branch, end, named, one_of, optional, part, repeat, seq, token, Captures, Grammar, Rule, Site,
};
use crate::shade::parsing::structure_data::{NodeData, StructureData};

const VARIABLE_KINDS: [TokenKind; 7] = [
    TokenKind::Const,
    TokenKind::Let,
    TokenKind::Storage,
    TokenKind::Uniform,
    TokenKind::Workgroup,
    TokenKind::Private,
    TokenKind::Param,
];

pub(super) fn register(grammar: &mut Grammar) {
    grammar.define(
        "module",
        seq(vec![
            named("declarations", repeat(part("global_declaration"))),
            end(),
        ]),
        module,
    );
    grammar.alias(
        "global_declaration",
        branch(vec![
            part("alias_declaration"),
            part("struct_declaration"),
            part("enum_declaration"),
            part("function_declaration"),
            part("global_variable"),
        ]),
    );
    grammar.define(
        "attribute",
        seq(vec![
            token(TokenKind::At),
            named("name", token(TokenKind::Identifier)),
            optional(seq(vec![
                token(TokenKind::OpenParen),
                comma_list("first", "rest", part("expression")),
                token(TokenKind::CloseParen),
            ])),
        ]),
        attribute,
    );
    grammar.define(
        "alias_declaration",
        seq(vec![
            token(TokenKind::Alias),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::Equal),
            named("target", part("type_declaration")),
            token(TokenKind::Semicolon),
        ]),
        alias_declaration,
    );
    grammar.define(
        "struct_declaration",
        seq(vec![
            named("attributes", repeat(part("attribute"))),
            token(TokenKind::Struct),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::OpenBrace),
            comma_list("first", "rest", part("struct_property")),
            token(TokenKind::CloseBrace),
            optional(token(TokenKind::Semicolon)),
        ]),
        struct_declaration,
    );
    grammar.define(
        "struct_property",
        seq(vec![
            named("attributes", repeat(part("attribute"))),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::Colon),
            named("type", part("type_declaration")),
        ]),
        struct_property,
    );
    grammar.define(
        "enum_declaration",
        seq(vec![
            token(TokenKind::Enum),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::OpenBrace),
            named("first", enum_value()),
            named(
                "rest",
                repeat(seq(vec![token(TokenKind::Comma), named("entry", enum_value())])),
            ),
            optional(token(TokenKind::Comma)),
            token(TokenKind::CloseBrace),
            optional(token(TokenKind::Semicolon)),
        ]),
        enum_declaration,
    );
    grammar.define(
        "function_declaration",
        seq(vec![
            named("attributes", repeat(part("attribute"))),
            token(TokenKind::Fn),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::OpenParen),
            optional(comma_list("first", "rest", part("parameter"))),
            token(TokenKind::CloseParen),
            optional(seq(vec![
                token(TokenKind::Arrow),
                named("return_attributes", repeat(part("attribute"))),
                named("return_type", part("type_declaration")),
            ])),
            named("body", part("block")),
        ]),
        function_declaration,
    );
    grammar.define(
        "parameter",
        seq(vec![
            named("attributes", repeat(part("attribute"))),
            named("name", token(TokenKind::Identifier)),
            token(TokenKind::Colon),
            named("type", part("type_declaration")),
        ]),
        parameter,
    );
    grammar.define(
        "global_variable",
        seq(vec![
            named("attributes", repeat(part("attribute"))),
            variable_body(),
            token(TokenKind::Semicolon),
        ]),
        variable_declaration,
    );
    grammar.define("variable_declaration", variable_body(), variable_declaration);
    grammar.define(
        "type_declaration",
        seq(vec![
            named("name", token(TokenKind::Identifier)),
            optional(template_list()),
        ]),
        type_declaration,
    );
}

/// `IDENT ('=' (INT | STRING))?`
fn enum_value() -> Rule {
    seq(vec![
        named("value_name", token(TokenKind::Identifier)),
        optional(seq(vec![
            token(TokenKind::Equal),
            named(
                "initializer",
                one_of(&[TokenKind::IntLiteral, TokenKind::StringLiteral]),
            ),
        ])),
    ])
}

/// `KIND IDENT (':' type)? ('=' expression)?`
fn variable_body() -> Rule {
    seq(vec![
        named("kind", one_of(&VARIABLE_KINDS)),
        named("name", token(TokenKind::Identifier)),
        optional(seq(vec![
            token(TokenKind::Colon),
            named("type", part("type_declaration")),
        ])),
        optional(seq(vec![
            token(TokenKind::Equal),
            named("value", part("expression")),
        ])),
    ])
}

fn module(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::Module {
        declarations: captures.list("declarations"),
    }))
}

fn attribute(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::Attribute {
        name: identifier(captures, "name")?,
        arguments: collect_list(captures, "first", "rest"),
    }))
}

fn alias_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::AliasDeclaration {
        name: identifier(captures, "name")?,
        target: Box::new(captures.data("target")?),
    }))
}

fn struct_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::StructDeclaration {
        name: identifier(captures, "name")?,
        attributes: captures.list("attributes"),
        properties: collect_list(captures, "first", "rest"),
    }))
}

fn struct_property(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::StructProperty {
        name: identifier(captures, "name")?,
        attributes: captures.list("attributes"),
        ty: Box::new(captures.data("type")?),
    }))
}

fn enum_entry(group: &mut Captures) -> Result<EnumValue> {
    let name = identifier(group, "value_name")?;
    let value = match group.optional_token("initializer") {
        None => None,
        Some(token) if token.kind == TokenKind::IntLiteral => {
            Some(EnumInitializer::Integer(token.text))
        }
        Some(token) => Some(EnumInitializer::String(unquote(&token.text))),
    };
    Ok(EnumValue { name, value })
}

fn enum_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let name = identifier(captures, "name")?;
    let mut values = Vec::new();
    for mut group in captures.groups("first") {
        values.push(enum_entry(&mut group)?);
    }
    for mut group in captures.groups("rest") {
        for mut entry in group.groups("entry") {
            values.push(enum_entry(&mut entry)?);
        }
    }
    Ok(site.node(NodeData::EnumDeclaration { name, values }))
}

fn function_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::FunctionDeclaration {
        name: identifier(captures, "name")?,
        attributes: captures.list("attributes"),
        parameters: collect_list(captures, "first", "rest"),
        return_attributes: captures.list("return_attributes"),
        return_type: captures.optional_data("return_type").map(Box::new),
        body: Box::new(captures.data("body")?),
    }))
}

fn parameter(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::FunctionParameter {
        name: identifier(captures, "name")?,
        attributes: captures.list("attributes"),
        ty: Box::new(captures.data("type")?),
    }))
}

fn variable_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    let keyword = captures.token("kind")?;
    let kind = VariableKind::from_token(keyword.kind).ok_or_else(|| {
        Error::structural(format!("`{}` is not a declaration keyword", keyword.text))
    })?;
    Ok(site.node(NodeData::VariableDeclaration {
        kind,
        name: identifier(captures, "name")?,
        attributes: captures.list("attributes"),
        ty: captures.optional_data("type").map(Box::new),
        value: captures.optional_data("value").map(Box::new),
    }))
}

fn type_declaration(captures: &mut Captures, site: &Site) -> Result<StructureData> {
    Ok(site.node(NodeData::TypeDeclaration {
        name: identifier(captures, "name")?,
        template: template_items(captures),
    }))
}

/// Strip the quotes of a string literal and resolve its escapes.
pub(crate) fn unquote(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text);
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::super::GRAMMAR;
    use super::*;
    use crate::shade::lexing::tokenize;
    use crate::shade::parsing::engine::Engine;
    use crate::shade::parsing::structure_data::NodeType;

    fn first_declaration(source: &str) -> StructureData {
        let data = Engine::new(&GRAMMAR, tokenize(source), "<test>")
            .parse()
            .expect("parses");
        match data.data {
            NodeData::Module { mut declarations } => declarations.remove(0),
            other => panic!("not a module: {:?}", other),
        }
    }

    #[test]
    fn test_global_constant() {
        let data = first_declaration("const myInt: i32 = 10;");
        match data.data {
            NodeData::VariableDeclaration {
                kind,
                name,
                ty,
                value,
                ..
            } => {
                assert_eq!(kind, VariableKind::Const);
                assert_eq!(name, "myInt");
                assert_eq!(ty.unwrap().node_type(), NodeType::TypeDeclaration);
                assert_eq!(value.unwrap().node_type(), NodeType::Literal);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_struct_with_attributes_and_trailing_comma() {
        let data = first_declaration("struct Light { @align(16) color: vec3<f32>, power: f32, };");
        match data.data {
            NodeData::StructDeclaration { name, properties, .. } => {
                assert_eq!(name, "Light");
                assert_eq!(properties.len(), 2);
                let NodeData::StructProperty { attributes, .. } = &properties[0].data else {
                    panic!("expected property");
                };
                assert_eq!(attributes.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_enum_values() {
        let data = first_declaration("enum Mode { Off, On = 4, Auto }");
        match data.data {
            NodeData::EnumDeclaration { values, .. } => {
                assert_eq!(values.len(), 3);
                assert_eq!(values[1].name, "On");
                assert_eq!(
                    values[1].value,
                    Some(EnumInitializer::Integer("4".to_string()))
                );
                assert_eq!(values[2].value, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_with_return_type() {
        let data = first_declaration(
            "@fragment fn main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> { }",
        );
        match data.data {
            NodeData::FunctionDeclaration {
                name,
                attributes,
                parameters,
                return_attributes,
                return_type,
                ..
            } => {
                assert_eq!(name, "main");
                assert_eq!(attributes.len(), 1);
                assert_eq!(parameters.len(), 1);
                assert_eq!(return_attributes.len(), 1);
                assert!(return_type.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_with_attributes() {
        let data = first_declaration("@group(0) @binding(1) uniform light: Light;");
        match data.data {
            NodeData::VariableDeclaration {
                kind, attributes, ..
            } => {
                assert_eq!(kind, VariableKind::Uniform);
                assert_eq!(attributes.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""a\"b\n""#), "a\"b\n");
    }
}
