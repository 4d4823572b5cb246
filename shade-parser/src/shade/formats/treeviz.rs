//! Treeviz formatter for syntax trees
//!
//!     Treeviz prints one line per node, with the nesting drawn as box connectors, so a whole
//!     module can be scanned at a glance and compared in snapshot tests:
//!
//!         ⧉ Module lights.shade
//!         ├─ § StructDeclaration Light
//!         │ ├─ • StructProperty position
//!         │ │ └─ τ TypeDeclaration vec3
//!         │ │   └─ τ TypeDeclaration f32
//!         ...
//!
//!     Each line is `<connector> <icon> <label>`, the label truncated to 40 characters. Build-in
//!     functions are not part of the tree and never printed.
//!
//! Parameters
//!
//!     - `show-linum`: prefix each line with its 1-based source line.
//!     - `show-types`: append the resolved type of validated nodes that have one.
//!
//! Icons
//!     Declarations:
//!         Module: ⧉
//!         AliasDeclaration: ≔
//!         StructDeclaration: §
//!         StructProperty: •
//!         EnumDeclaration: ☰
//!         FunctionDeclaration: ƒ
//!         FunctionParameter: ◦
//!         VariableDeclaration: ν
//!         Attribute: @
//!         TypeDeclaration: τ
//!     Expressions:
//!         Literal: #
//!         VariableName: ↗
//!         FunctionCall: ⊕
//!         operators: ±
//!         others: ○
//!     Statements:
//!         BlockStatement: ¶
//!         control flow: ↻
//!         others: ▸

use super::registry::{FormatError, Formatter};
use crate::shade::ast::{Module, NodeCategory, NodeId, NodeKind, ValidationState};
use std::collections::HashMap;

const LABEL_WIDTH: usize = 40;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn get_icon(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::AliasDeclaration { .. } => "≔",
        NodeKind::StructDeclaration { .. } => "§",
        NodeKind::StructProperty { .. } => "•",
        NodeKind::EnumDeclaration { .. } => "☰",
        NodeKind::FunctionDeclaration { .. } | NodeKind::BuildInFunction { .. } => "ƒ",
        NodeKind::FunctionParameter { .. } => "◦",
        NodeKind::VariableDeclaration { .. } => "ν",
        NodeKind::Attribute { .. } => "@",
        NodeKind::TypeDeclaration { .. } => "τ",
        NodeKind::Literal { .. } => "#",
        NodeKind::VariableName { .. } => "↗",
        NodeKind::FunctionCall { .. } => "⊕",
        NodeKind::UnaryExpression { .. }
        | NodeKind::BinaryExpression { .. }
        | NodeKind::LogicalExpression { .. }
        | NodeKind::ComparisonExpression { .. } => "±",
        NodeKind::BlockStatement { .. } => "¶",
        NodeKind::IfStatement { .. }
        | NodeKind::WhileStatement { .. }
        | NodeKind::DoWhileStatement { .. }
        | NodeKind::ForStatement { .. }
        | NodeKind::SwitchStatement { .. }
        | NodeKind::SwitchCase { .. } => "↻",
        other if other.category() == NodeCategory::Expression => "○",
        _ => "▸",
    }
}

/// The part of the label after the kind: a name, operator or literal text.
fn detail(kind: &NodeKind) -> String {
    match kind {
        NodeKind::VariableDeclaration { kind, name, .. } => format!("{} {}", kind, name),
        NodeKind::Literal { text, .. } => text.clone(),
        NodeKind::ValueDecomposition { member, .. } => format!(".{}", member),
        NodeKind::UnaryExpression { operator, .. } => operator.symbol().to_string(),
        NodeKind::BinaryExpression { operator, .. } => operator.symbol().to_string(),
        NodeKind::LogicalExpression { operator, .. } => operator.symbol().to_string(),
        NodeKind::ComparisonExpression { operator, .. } => operator.symbol().to_string(),
        NodeKind::AssignmentStatement { operator, .. } => operator.symbol(),
        NodeKind::IncrementDecrementStatement { operator, .. } => operator.symbol().to_string(),
        NodeKind::SwitchCase {
            is_default: true, ..
        } => "default".to_string(),
        other => other.name().unwrap_or_default().to_string(),
    }
}

struct Params {
    show_linum: bool,
    show_types: bool,
}

fn label(module: &Module, id: NodeId, params: &Params) -> String {
    let kind = module.kind(id);
    let text = format!("{} {}", kind.label(), detail(kind));
    let mut label = truncate(text.trim_end(), LABEL_WIDTH);
    if params.show_types && module.state(id) == ValidationState::Validated {
        if let Ok(ty) = module.type_of(id) {
            label.push_str(&format!(" : {}", module.types().display(ty)));
        }
    }
    label
}

fn format_node(
    module: &Module,
    id: NodeId,
    prefix: &str,
    is_last: bool,
    params: &Params,
) -> String {
    let connector = if is_last { "└─" } else { "├─" };
    let linum_prefix = if params.show_linum {
        format!("{:02} ", module.node(id).range().start.line + 1)
    } else {
        String::new()
    };
    let mut output = format!(
        "{}{}{} {} {}\n",
        linum_prefix,
        prefix,
        connector,
        get_icon(module.kind(id)),
        label(module, id, params)
    );

    let children = module.children(id);
    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    for (i, child) in children.iter().enumerate() {
        output.push_str(&format_node(
            module,
            *child,
            &child_prefix,
            i + 1 == children.len(),
            params,
        ));
    }
    output
}

pub fn to_treeviz_str(module: &Module) -> String {
    to_treeviz_str_with_params(module, &HashMap::new())
}

pub fn to_treeviz_str_with_params(module: &Module, params: &HashMap<String, String>) -> String {
    let flag = |name: &str| params.get(name).map(|v| v != "false").unwrap_or(false);
    let params = Params {
        show_linum: flag("show-linum"),
        show_types: flag("show-types"),
    };

    let mut output = format!("⧉ Module {}\n", module.file());
    let declarations = module.declarations();
    for (i, id) in declarations.iter().enumerate() {
        output.push_str(&format_node(
            module,
            *id,
            "",
            i + 1 == declarations.len(),
            &params,
        ));
    }
    output
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, module: &Module) -> Result<String, FormatError> {
        Ok(to_treeviz_str(module))
    }

    fn description(&self) -> &str {
        "One line per node with box connectors and icons"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;

    #[test]
    fn test_outline() {
        let module = parse("const limit: u32 = 4u;\nfn main() { let x = limit; }").unwrap();
        insta::assert_snapshot!(to_treeviz_str(&module), @r"
        ⧉ Module <memory>
        ├─ ν VariableDeclaration const limit
        │ ├─ τ TypeDeclaration u32
        │ └─ # Literal 4u
        └─ ƒ FunctionDeclaration main
          └─ ¶ BlockStatement
            └─ ν VariableDeclaration let x
              └─ ↗ VariableName limit
        ");
    }

    #[test]
    fn test_show_types_and_lines() {
        let module = parse("const limit: u32 = 4u;").unwrap();
        let params = HashMap::from([
            ("show-types".to_string(), "true".to_string()),
            ("show-linum".to_string(), "true".to_string()),
        ]);
        let output = to_treeviz_str_with_params(&module, &params);
        assert!(output.contains("01 ├─ ν VariableDeclaration const limit : u32"));
        assert!(output.contains("01 │ └─ # Literal 4u : u32"));
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let name = "a".repeat(60);
        let module = parse(&format!("const {}: f32 = 1.0;", name)).unwrap();
        let output = to_treeviz_str(&module);
        assert!(output.contains(&format!("const {}...", "a".repeat(LABEL_WIDTH - 26))));
    }
}
