//! Constant evaluation
//!
//!     Folds validated constant expressions to a [`ConstValue`]: literals, `const`
//!     variables, enum values, scalar conversions and the unary, binary, comparison and
//!     logical operators. Vector and struct constants are constant for the type system but
//!     are not folded; evaluating one reports that it is not a scalar constant.
//!
//!     Integer arithmetic is checked. Results must fit the expression's type (`i32`, `u32`,
//!     or the 64-bit range of an abstract integer); overflow and division by zero are type
//!     errors.
//!
//!     Scalar `const` initializers are folded when the declaration is validated, so an
//!     overflowing constant is reported where it is declared, not where it is used.

use crate::shade::ast::operators::{
    BinaryOperator, ComparisonOperator, LiteralKind, LogicalOperator, UnaryOperator, VariableKind,
};
use crate::shade::ast::{EnumInitializer, EnumValue, Module, NodeId, NodeKind};
use crate::shade::error::{Error, Result};
use crate::shade::parsing::grammar::unquote;
use crate::shade::types::{NumericKind, TypeHandle};
use std::collections::HashSet;
use std::fmt;

/// A folded scalar constant.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ConstValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConstValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Int(value) => Some(*value as f64),
            ConstValue::Float(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(value) => write!(f, "{}", value),
            ConstValue::Int(value) => write!(f, "{}", value),
            ConstValue::Float(value) => write!(f, "{:?}", value),
            ConstValue::String(value) => write!(f, "{:?}", value),
        }
    }
}

/// The scalar kind fixed by a literal's suffix, `None` for an abstract literal.
pub fn literal_suffix(kind: LiteralKind, text: &str) -> Option<NumericKind> {
    match (kind, text.chars().last()) {
        (LiteralKind::Int, Some('i')) => Some(NumericKind::Integer),
        (LiteralKind::Int, Some('u')) => Some(NumericKind::UnsignedInteger),
        (LiteralKind::Float, Some('f')) => Some(NumericKind::Float),
        (LiteralKind::Float, Some('h')) => Some(NumericKind::Half),
        _ => None,
    }
}

/// Value of a literal as written, range-checked against its suffix.
pub fn literal_value(kind: LiteralKind, text: &str) -> Result<ConstValue> {
    let suffix = literal_suffix(kind, text);
    let digits = if suffix.is_some() {
        &text[..text.len() - 1]
    } else {
        text
    };
    match kind {
        LiteralKind::Bool => Ok(ConstValue::Bool(text == "true")),
        LiteralKind::String => Ok(ConstValue::String(unquote(text))),
        LiteralKind::Int => {
            let parsed = match digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                Some(hex) => i64::from_str_radix(hex, 16),
                None => digits.parse::<i64>(),
            };
            let value = parsed.map_err(|_| {
                Error::type_mismatch(format!("integer literal `{}` is out of range", text))
            })?;
            fit_integer(value, suffix).ok_or_else(|| {
                Error::type_mismatch(format!("integer literal `{}` is out of range", text))
            })
        }
        LiteralKind::Float => {
            let value = digits.parse::<f64>().map_err(|_| {
                Error::type_mismatch(format!("malformed float literal `{}`", text))
            })?;
            if !value.is_finite() {
                return Err(Error::type_mismatch(format!(
                    "float literal `{}` is out of range",
                    text
                )));
            }
            Ok(ConstValue::Float(value))
        }
    }
}

fn fit_integer(value: i64, kind: Option<NumericKind>) -> Option<ConstValue> {
    let fits = match kind {
        Some(NumericKind::Integer) => i32::try_from(value).is_ok(),
        Some(NumericKind::UnsignedInteger) => u32::try_from(value).is_ok(),
        _ => true,
    };
    fits.then_some(ConstValue::Int(value))
}

/// Values of an enum's entries, in declaration order.
///
/// Entries are all integers or all strings. An integer entry without a value follows the
/// previous one; a string entry without a value takes its own name.
pub fn enum_values(values: &[EnumValue]) -> Result<Vec<(String, ConstValue)>> {
    let has_strings = values
        .iter()
        .any(|value| matches!(value.value, Some(EnumInitializer::String(_))));
    let has_integers = values
        .iter()
        .any(|value| matches!(value.value, Some(EnumInitializer::Integer(_))));
    if has_strings && has_integers {
        return Err(Error::type_mismatch(
            "enum values mix integers and strings",
        ));
    }
    let mut seen = HashSet::new();
    let mut next: i64 = 0;
    let mut result = Vec::with_capacity(values.len());
    for entry in values {
        if !seen.insert(entry.name.as_str()) {
            return Err(Error::duplicate("enum value", entry.name.clone()));
        }
        let value = match &entry.value {
            Some(EnumInitializer::String(text)) => ConstValue::String(text.clone()),
            None if has_strings => ConstValue::String(entry.name.clone()),
            Some(EnumInitializer::Integer(text)) => {
                let literal = literal_value(LiteralKind::Int, text)?;
                let value = literal.as_integer().unwrap_or_default();
                if u32::try_from(value).is_err() {
                    return Err(Error::type_mismatch(format!(
                        "enum value `{}` does not fit in u32",
                        entry.name
                    )));
                }
                next = value + 1;
                ConstValue::Int(value)
            }
            None => {
                if u32::try_from(next).is_err() {
                    return Err(Error::type_mismatch(format!(
                        "enum value `{}` does not fit in u32",
                        entry.name
                    )));
                }
                next += 1;
                ConstValue::Int(next - 1)
            }
        };
        result.push((entry.name.clone(), value));
    }
    Ok(result)
}

/// Fold a validated constant expression.
pub fn evaluate(module: &Module, id: NodeId) -> Result<ConstValue> {
    evaluate_node(module, id).map_err(|error| error.located(module.location(id)))
}

/// Fold the initializer of a `const` of type `ty`, checking that the value fits `ty` unless
/// the constant stays abstract. Returns `None` for initializers that do not fold to a scalar
/// (build-in calls, indexing, composites).
pub fn check_initializer(
    module: &Module,
    initializer: NodeId,
    ty: TypeHandle,
    is_abstract: bool,
) -> Result<Option<ConstValue>> {
    if !module.types().is_scalar(ty) || !foldable(module, initializer) {
        return Ok(None);
    }
    let value = evaluate(module, initializer)?;
    let kind = if is_abstract {
        None
    } else {
        module.types().numeric_kind(ty)
    };
    match value {
        ConstValue::Int(int) => fit_integer(int, kind).map(Some).ok_or_else(|| {
            Error::type_mismatch(format!(
                "constant {} overflows {}",
                int,
                module.types().display(ty)
            ))
            .located(module.location(initializer))
        }),
        other => Ok(Some(other)),
    }
}

/// Whether [`evaluate`] can fold `id`, assuming it validated as constant.
fn foldable(module: &Module, id: NodeId) -> bool {
    match module.kind(id) {
        NodeKind::Literal { .. } => true,
        NodeKind::VariableName { .. } => match module.binding(id).map(|decl| module.kind(decl)) {
            Some(NodeKind::VariableDeclaration {
                kind: VariableKind::Const,
                value: Some(value),
                ..
            }) => foldable(module, *value),
            _ => false,
        },
        NodeKind::ValueDecomposition { value, member } => {
            enum_constant(module, *value, member).is_some()
        }
        NodeKind::ParenthesizedExpression { value } | NodeKind::UnaryExpression { value, .. } => {
            foldable(module, *value)
        }
        NodeKind::BinaryExpression { left, right, .. }
        | NodeKind::ComparisonExpression { left, right, .. }
        | NodeKind::LogicalExpression { left, right, .. } => {
            foldable(module, *left) && foldable(module, *right)
        }
        NodeKind::FunctionCall { arguments, .. } => {
            arguments.len() == 1
                && module
                    .expression_properties(id)
                    .ok()
                    .and_then(|properties| properties.ty)
                    .is_some_and(|ty| module.types().is_scalar(ty))
                && foldable(module, arguments[0])
        }
        _ => false,
    }
}

fn not_constant(module: &Module, id: NodeId) -> Error {
    Error::type_mismatch(format!(
        "{} is not a scalar constant expression",
        module.kind(id).label()
    ))
}

fn evaluate_node(module: &Module, id: NodeId) -> Result<ConstValue> {
    let properties = module.expression_properties(id)?;
    if !properties.is_constant {
        return Err(not_constant(module, id));
    }
    let value = match module.kind(id) {
        NodeKind::Literal { kind, text } => literal_value(*kind, text)?,
        NodeKind::VariableName { .. } => {
            let declaration = module
                .binding(id)
                .ok_or_else(|| not_constant(module, id))?;
            match module.kind(declaration) {
                NodeKind::VariableDeclaration {
                    kind: VariableKind::Const,
                    value: Some(value),
                    ..
                } => evaluate(module, *value)?,
                _ => return Err(not_constant(module, id)),
            }
        }
        NodeKind::ValueDecomposition { value, member } => {
            enum_constant(module, *value, member).ok_or_else(|| not_constant(module, id))??
        }
        NodeKind::ParenthesizedExpression { value } => evaluate(module, *value)?,
        NodeKind::UnaryExpression { operator, value } => {
            unary(module, id, *operator, evaluate(module, *value)?)?
        }
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => binary(*operator, evaluate(module, *left)?, evaluate(module, *right)?)?,
        NodeKind::ComparisonExpression {
            operator,
            left,
            right,
        } => compare(*operator, evaluate(module, *left)?, evaluate(module, *right)?)?,
        NodeKind::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let left = evaluate(module, *left)?.as_bool();
            let right = evaluate(module, *right)?.as_bool();
            match (operator, left, right) {
                (LogicalOperator::And, Some(l), Some(r)) => ConstValue::Bool(l && r),
                (LogicalOperator::Or, Some(l), Some(r)) => ConstValue::Bool(l || r),
                _ => return Err(not_constant(module, id)),
            }
        }
        NodeKind::FunctionCall { arguments, .. }
            if arguments.len() == 1
                && properties
                    .ty
                    .is_some_and(|ty| module.types().is_scalar(ty)) =>
        {
            evaluate(module, arguments[0])?
        }
        _ => return Err(not_constant(module, id)),
    };
    fit(module, id, value)
}

/// `Enum.Value`, if `value` names an enum rather than a variable.
fn enum_constant(module: &Module, value: NodeId, member: &str) -> Option<Result<ConstValue>> {
    let NodeKind::VariableName { name } = module.kind(value) else {
        return None;
    };
    if module.binding(value).is_some() {
        return None;
    }
    let NodeKind::EnumDeclaration { values, .. } = module.kind(module.resolve_enum(name)?) else {
        return None;
    };
    let values = match enum_values(values) {
        Ok(values) => values,
        Err(error) => return Some(Err(error)),
    };
    values
        .into_iter()
        .find(|(name, _)| name == member)
        .map(|(_, value)| Ok(value))
}

/// Convert `value` to the scalar type of node `id` and check that it fits.
fn fit(module: &Module, id: NodeId, value: ConstValue) -> Result<ConstValue> {
    let properties = module.expression_properties(id)?;
    if properties.abstract_kind.is_some() {
        return Ok(value);
    }
    let Some(kind) = properties.ty.and_then(|ty| module.types().numeric_kind(ty)) else {
        return Ok(value);
    };
    let converted = match (kind.is_float(), value) {
        (true, ConstValue::Int(value)) => ConstValue::Float(value as f64),
        (false, ConstValue::Float(value)) => ConstValue::Int(value.trunc() as i64),
        (_, value) => value,
    };
    match converted {
        ConstValue::Int(value) => fit_integer(value, Some(kind)).ok_or_else(|| {
            Error::type_mismatch(format!(
                "constant {} overflows {}",
                value,
                kind.type_name()
            ))
        }),
        other => Ok(other),
    }
}

fn unary(
    module: &Module,
    id: NodeId,
    operator: UnaryOperator,
    value: ConstValue,
) -> Result<ConstValue> {
    let unsigned = module
        .expression_properties(id)?
        .ty
        .and_then(|ty| module.types().numeric_kind(ty))
        == Some(NumericKind::UnsignedInteger);
    let result = match (operator, value) {
        (UnaryOperator::Negate, ConstValue::Int(value)) => ConstValue::Int(
            value
                .checked_neg()
                .ok_or_else(|| Error::type_mismatch("constant negation overflows"))?,
        ),
        (UnaryOperator::Negate, ConstValue::Float(value)) => ConstValue::Float(-value),
        (UnaryOperator::Not, ConstValue::Bool(value)) => ConstValue::Bool(!value),
        (UnaryOperator::BitNot, ConstValue::Int(value)) if unsigned => {
            ConstValue::Int(i64::from(!(value as u32)))
        }
        (UnaryOperator::BitNot, ConstValue::Int(value)) => ConstValue::Int(!value),
        (operator, value) => {
            return Err(Error::unsupported_operator(
                operator.symbol(),
                value.to_string(),
            ))
        }
    };
    Ok(result)
}

fn binary(operator: BinaryOperator, left: ConstValue, right: ConstValue) -> Result<ConstValue> {
    let overflow = || Error::type_mismatch(format!("constant `{}` overflows", operator.symbol()));
    match (&left, &right) {
        (ConstValue::Int(l), ConstValue::Int(r)) => {
            let (l, r) = (*l, *r);
            let value = match operator {
                BinaryOperator::Add => l.checked_add(r),
                BinaryOperator::Subtract => l.checked_sub(r),
                BinaryOperator::Multiply => l.checked_mul(r),
                BinaryOperator::Divide | BinaryOperator::Remainder if r == 0 => {
                    return Err(Error::type_mismatch("division by zero in constant expression"))
                }
                BinaryOperator::Divide => l.checked_div(r),
                BinaryOperator::Remainder => l.checked_rem(r),
                BinaryOperator::BitAnd => Some(l & r),
                BinaryOperator::BitOr => Some(l | r),
                BinaryOperator::BitXor => Some(l ^ r),
                BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight
                    if !(0..32).contains(&r) =>
                {
                    return Err(Error::type_mismatch(format!(
                        "shift amount {} is out of range",
                        r
                    )))
                }
                BinaryOperator::ShiftLeft => l.checked_shl(r as u32),
                BinaryOperator::ShiftRight => l.checked_shr(r as u32),
            };
            value.map(ConstValue::Int).ok_or_else(overflow)
        }
        (ConstValue::Bool(l), ConstValue::Bool(r)) => match operator {
            BinaryOperator::BitAnd => Ok(ConstValue::Bool(*l & *r)),
            BinaryOperator::BitOr => Ok(ConstValue::Bool(*l | *r)),
            BinaryOperator::BitXor => Ok(ConstValue::Bool(*l ^ *r)),
            _ => Err(Error::unsupported_operator(operator.symbol(), "bool")),
        },
        _ => {
            let (Some(l), Some(r)) = (left.as_float(), right.as_float()) else {
                return Err(Error::unsupported_operator(
                    operator.symbol(),
                    left.to_string(),
                ));
            };
            let value = match operator {
                BinaryOperator::Add => l + r,
                BinaryOperator::Subtract => l - r,
                BinaryOperator::Multiply => l * r,
                BinaryOperator::Divide if r == 0.0 => {
                    return Err(Error::type_mismatch("division by zero in constant expression"))
                }
                BinaryOperator::Divide => l / r,
                BinaryOperator::Remainder => l % r,
                _ => return Err(Error::unsupported_operator(operator.symbol(), "float")),
            };
            if value.is_finite() {
                Ok(ConstValue::Float(value))
            } else {
                Err(overflow())
            }
        }
    }
}

fn compare(
    operator: ComparisonOperator,
    left: ConstValue,
    right: ConstValue,
) -> Result<ConstValue> {
    let ordering = match (&left, &right) {
        (ConstValue::Int(l), ConstValue::Int(r)) => l.partial_cmp(r),
        (ConstValue::Bool(l), ConstValue::Bool(r)) if !operator.is_ordering() => l.partial_cmp(r),
        (ConstValue::String(l), ConstValue::String(r)) if !operator.is_ordering() => {
            l.partial_cmp(r)
        }
        _ => match (left.as_float(), right.as_float()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => None,
        },
    };
    let ordering = ordering.ok_or_else(|| {
        Error::unsupported_operator(operator.symbol(), left.to_string())
    })?;
    let result = match operator {
        ComparisonOperator::Equal => ordering.is_eq(),
        ComparisonOperator::NotEqual => ordering.is_ne(),
        ComparisonOperator::Less => ordering.is_lt(),
        ComparisonOperator::LessEqual => ordering.is_le(),
        ComparisonOperator::Greater => ordering.is_gt(),
        ComparisonOperator::GreaterEqual => ordering.is_ge(),
    };
    Ok(ConstValue::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade::parsing::parse;
    use rstest::rstest;

    #[rstest]
    #[case(LiteralKind::Int, "42", ConstValue::Int(42))]
    #[case(LiteralKind::Int, "0x1F", ConstValue::Int(31))]
    #[case(LiteralKind::Int, "7u", ConstValue::Int(7))]
    #[case(LiteralKind::Float, "1.5f", ConstValue::Float(1.5))]
    #[case(LiteralKind::Float, ".5", ConstValue::Float(0.5))]
    #[case(LiteralKind::Float, "1e3", ConstValue::Float(1000.0))]
    #[case(LiteralKind::Bool, "false", ConstValue::Bool(false))]
    #[case(LiteralKind::String, r#""hi""#, ConstValue::String("hi".into()))]
    fn test_literal_value(
        #[case] kind: LiteralKind,
        #[case] text: &str,
        #[case] expected: ConstValue,
    ) {
        assert_eq!(literal_value(kind, text).unwrap(), expected);
    }

    #[rstest]
    #[case("2147483648i")]
    #[case("4294967296u")]
    #[case("99999999999999999999")]
    fn test_literal_out_of_range(#[case] text: &str) {
        let error = literal_value(LiteralKind::Int, text).unwrap_err();
        assert_eq!(error.kind(), "TypeMismatchError");
    }

    #[test]
    fn test_enum_values_auto_increment() {
        let values = vec![
            EnumValue {
                name: "A".into(),
                value: None,
            },
            EnumValue {
                name: "B".into(),
                value: Some(EnumInitializer::Integer("5".into())),
            },
            EnumValue {
                name: "C".into(),
                value: None,
            },
        ];
        let folded = enum_values(&values).unwrap();
        assert_eq!(
            folded,
            vec![
                ("A".to_string(), ConstValue::Int(0)),
                ("B".to_string(), ConstValue::Int(5)),
                ("C".to_string(), ConstValue::Int(6)),
            ]
        );
    }

    #[test]
    fn test_enum_values_reject_mixed_kinds() {
        let values = vec![
            EnumValue {
                name: "A".into(),
                value: Some(EnumInitializer::Integer("1".into())),
            },
            EnumValue {
                name: "B".into(),
                value: Some(EnumInitializer::String("b".into())),
            },
        ];
        assert_eq!(enum_values(&values).unwrap_err().kind(), "TypeMismatchError");
    }

    fn constant(source: &str, name: &str) -> Result<ConstValue> {
        let module = parse(source)?;
        let id = module.resolve_global(name).unwrap();
        let NodeKind::VariableDeclaration { value: Some(value), .. } = module.kind(id) else {
            panic!("expected an initialized variable");
        };
        evaluate(&module, *value)
    }

    #[test]
    fn test_fold_through_constants_and_enums() {
        let source = "enum Mode { Off, Low = 3, High }\n\
                      const base = 10;\n\
                      const total: u32 = u32(base) * 2u + Mode.High;";
        assert_eq!(constant(source, "total").unwrap(), ConstValue::Int(24));
    }

    #[test]
    fn test_fold_comparison_and_logic() {
        let source = "const a = 3; const ok = a > 2 && !(a == 4);";
        assert_eq!(constant(source, "ok").unwrap(), ConstValue::Bool(true));
    }

    #[rstest]
    #[case("const x = 1i << 31u;")]
    #[case("const x: i32 = 3000000000;")]
    #[case("const x: u32 = 0u - 1u;")]
    #[case("const a = 4000000000; const b: u32 = a * 2;")]
    fn test_overflowing_const_is_rejected_at_declaration(#[case] source: &str) {
        let error = parse(source).unwrap_err();
        assert_eq!(error.kind(), "TypeMismatchError");
        assert!(error.to_string().contains("overflows"), "{}", error);
    }

    #[rstest]
    #[case("const x = 1 << 31;")]
    #[case("const x: u32 = 4000000000;")]
    #[case("const a = array<u32, 2>(1u, 2u); const b = a[1];")]
    #[case("const v = vec2<i32>(1, 2);")]
    fn test_foldable_or_unfolded_consts_validate(#[case] source: &str) {
        assert!(parse(source).is_ok(), "{}", source);
    }

    #[test]
    fn test_division_by_zero() {
        let error = parse("const a = 1 / 0; const b: array<f32, a> = array<f32, a>();");
        assert!(error.is_err());
    }
}
