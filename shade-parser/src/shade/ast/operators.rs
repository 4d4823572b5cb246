//! Closed vocabularies shared by the structure data and the syntax tree
//!
//!     Operators, declaration kinds and literal kinds appear verbatim in both
//!     representations, so they live here and both sides import them.

use crate::shade::lexing::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Negate,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// `=` or one of the compound forms, which carry the binary operator they apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    Compound(BinaryOperator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementOperator {
    Increment,
    Decrement,
}

/// Declaration keyword of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    Const,
    Let,
    Storage,
    Uniform,
    Workgroup,
    Private,
    Param,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Bool,
    Int,
    Float,
    String,
}

impl UnaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnaryOperator::Negate),
            TokenKind::Bang => Some(UnaryOperator::Not),
            TokenKind::Tilde => Some(UnaryOperator::BitNot),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
        }
    }
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let operator = match kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Subtract,
            TokenKind::Star => BinaryOperator::Multiply,
            TokenKind::Slash => BinaryOperator::Divide,
            TokenKind::Percent => BinaryOperator::Remainder,
            TokenKind::And => BinaryOperator::BitAnd,
            TokenKind::Or => BinaryOperator::BitOr,
            TokenKind::Xor => BinaryOperator::BitXor,
            TokenKind::ShiftLeft => BinaryOperator::ShiftLeft,
            TokenKind::ShiftRight => BinaryOperator::ShiftRight,
            _ => return None,
        };
        Some(operator)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Remainder
        )
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight)
    }
}

impl LogicalOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::AndAnd => Some(LogicalOperator::And),
            TokenKind::OrOr => Some(LogicalOperator::Or),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}

impl ComparisonOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let operator = match kind {
            TokenKind::EqualEqual => ComparisonOperator::Equal,
            TokenKind::NotEqual => ComparisonOperator::NotEqual,
            TokenKind::LessThan => ComparisonOperator::Less,
            TokenKind::LessThanEqual => ComparisonOperator::LessEqual,
            TokenKind::GreaterThan => ComparisonOperator::Greater,
            TokenKind::GreaterThanEqual => ComparisonOperator::GreaterEqual,
            _ => return None,
        };
        Some(operator)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }

    /// Ordering comparisons are not defined for booleans.
    pub fn is_ordering(self) -> bool {
        !matches!(self, ComparisonOperator::Equal | ComparisonOperator::NotEqual)
    }
}

impl AssignmentOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let compound = match kind {
            TokenKind::Equal => return Some(AssignmentOperator::Assign),
            TokenKind::PlusEqual => BinaryOperator::Add,
            TokenKind::MinusEqual => BinaryOperator::Subtract,
            TokenKind::StarEqual => BinaryOperator::Multiply,
            TokenKind::SlashEqual => BinaryOperator::Divide,
            TokenKind::PercentEqual => BinaryOperator::Remainder,
            TokenKind::AndEqual => BinaryOperator::BitAnd,
            TokenKind::OrEqual => BinaryOperator::BitOr,
            TokenKind::XorEqual => BinaryOperator::BitXor,
            TokenKind::ShiftLeftEqual => BinaryOperator::ShiftLeft,
            TokenKind::ShiftRightEqual => BinaryOperator::ShiftRight,
            _ => return None,
        };
        Some(AssignmentOperator::Compound(compound))
    }

    pub fn symbol(self) -> String {
        match self {
            AssignmentOperator::Assign => "=".to_string(),
            AssignmentOperator::Compound(operator) => format!("{}=", operator.symbol()),
        }
    }
}

impl IncrementOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::PlusPlus => Some(IncrementOperator::Increment),
            TokenKind::MinusMinus => Some(IncrementOperator::Decrement),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            IncrementOperator::Increment => "++",
            IncrementOperator::Decrement => "--",
        }
    }
}

impl VariableKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let variable = match kind {
            TokenKind::Const => VariableKind::Const,
            TokenKind::Let => VariableKind::Let,
            TokenKind::Storage => VariableKind::Storage,
            TokenKind::Uniform => VariableKind::Uniform,
            TokenKind::Workgroup => VariableKind::Workgroup,
            TokenKind::Private => VariableKind::Private,
            TokenKind::Param => VariableKind::Param,
            _ => return None,
        };
        Some(variable)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            VariableKind::Const => "const",
            VariableKind::Let => "let",
            VariableKind::Storage => "storage",
            VariableKind::Uniform => "uniform",
            VariableKind::Workgroup => "workgroup",
            VariableKind::Private => "private",
            VariableKind::Param => "param",
        }
    }

    /// Kinds allowed at module scope.
    pub fn is_global(self) -> bool {
        !matches!(self, VariableKind::Let)
    }

    /// Kinds allowed inside a function body.
    pub fn is_local(self) -> bool {
        matches!(self, VariableKind::Let | VariableKind::Const)
    }

    pub fn is_constant(self) -> bool {
        self == VariableKind::Const
    }

    pub fn is_creation_fixed(self) -> bool {
        matches!(self, VariableKind::Const | VariableKind::Param)
    }

    /// Declarations that name mutable, addressable memory.
    pub fn is_storage(self) -> bool {
        matches!(
            self,
            VariableKind::Let
                | VariableKind::Storage
                | VariableKind::Workgroup
                | VariableKind::Private
        )
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl LiteralKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::BoolLiteral => Some(LiteralKind::Bool),
            TokenKind::IntLiteral => Some(LiteralKind::Int),
            TokenKind::FloatLiteral => Some(LiteralKind::Float),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_assignment_carries_operator() {
        assert_eq!(
            AssignmentOperator::from_token(TokenKind::ShiftLeftEqual),
            Some(AssignmentOperator::Compound(BinaryOperator::ShiftLeft))
        );
        assert_eq!(
            AssignmentOperator::Compound(BinaryOperator::BitXor).symbol(),
            "^="
        );
    }

    #[test]
    fn test_variable_kind_flags() {
        assert!(!VariableKind::Let.is_global());
        assert!(VariableKind::Param.is_creation_fixed());
        assert!(!VariableKind::Param.is_constant());
        assert!(!VariableKind::Uniform.is_storage());
        assert!(VariableKind::Private.is_storage());
        assert!(!VariableKind::Storage.is_local());
    }
}
