//! Expression typing
//!
//!     Each expression derives four properties from its validated children: whether it is a
//!     compile-time constant, whether it is fixed at pipeline creation, whether it names
//!     storage that can be assigned or addressed, and its type.
//!
//! Abstract literals
//!
//!     An unsuffixed literal is typed `i32` or `f32` but remembers that it is abstract.
//!     Abstract values convert to any integer (abstract int) or float (abstract float) scalar
//!     of the same shape, so `let x: u32 = 1;` and `v * 2.0` with `v: vec3<f16>` are valid.
//!     Operators on two abstract operands stay abstract; mixing an abstract operand with a
//!     concrete one takes the concrete type.
//!
//! Operand shapes
//!
//!         | operator              | operands                                           |
//!         |-----------------------|----------------------------------------------------|
//!         | + - * / %             | same shape, or a scalar with a vector              |
//!         | + -                   | also two matrices of one shape                     |
//!         | *                     | matrix with scalar, vector or compatible matrix    |
//!         | & | ^                 | integer or bool, same shape                        |
//!         | << >>                 | integer left, `u32` right, same shape              |
//!         | == != < <= > >=       | same shape; ordering needs a numeric element       |
//!         | && ||                 | bool scalars                                       |

use super::{calls, const_eval, ensure, mark, value};
use crate::shade::ast::operators::{BinaryOperator, LiteralKind, UnaryOperator};
use crate::shade::ast::{AbstractKind, Module, NodeId, NodeKind, NodeProperties};
use crate::shade::error::{Error, Result};
use crate::shade::types::{ArrayLength, NumericKind, TypeDefinition, TypeHandle};
use once_cell::sync::Lazy;
use regex::Regex;

/// Properties and type of a validated value.
pub(crate) type Operand = (NodeProperties, TypeHandle);

static SWIZZLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([rgba]{1,4}|[xyzw]{1,4})$").expect("valid swizzle pattern"));

pub(crate) fn determine(module: &mut Module, id: NodeId) -> Result<NodeProperties> {
    match module.kind(id).clone() {
        NodeKind::Literal { kind, text } => literal(module, kind, &text),
        NodeKind::VariableName { name } => variable(module, id, &name),
        NodeKind::IndexExpression { value, index } => index_expression(module, value, index),
        NodeKind::ValueDecomposition { value, member } => decomposition(module, value, &member),
        NodeKind::PointerExpression { value: target } => {
            let (_, ty) = reference_operand(module, target, "*")?;
            match module.types().concrete_definition(ty) {
                TypeDefinition::Pointer { inner } => Ok(NodeProperties {
                    is_storage: true,
                    ..NodeProperties::value(*inner)
                }),
                _ => Err(Error::type_mismatch(format!(
                    "cannot dereference `{}`",
                    module.types().display(ty)
                ))),
            }
        }
        NodeKind::AddressOfExpression { value: target } => {
            let (properties, ty) = reference_operand(module, target, "&")?;
            if !properties.is_storage {
                return Err(Error::type_mismatch(
                    "cannot take the address of a value that is not storage",
                ));
            }
            Ok(NodeProperties::value(module.types_mut().pointer(ty)))
        }
        NodeKind::FunctionCall { .. } => calls::determine(module, id),
        NodeKind::UnaryExpression {
            operator,
            value: operand,
        } => unary(module, operator, operand),
        NodeKind::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let left = value(module, left)?;
            let right = value(module, right)?;
            let (ty, abstract_kind) = binary_type(module, operator, left, right)?;
            Ok(combine(left.0, right.0, ty, abstract_kind))
        }
        NodeKind::ComparisonExpression {
            operator,
            left,
            right,
        } => {
            let left = value(module, left)?;
            let right = value(module, right)?;
            let ty = comparison_type(module, operator.is_ordering(), left, right)
                .ok_or_else(|| operand_error(module, operator.symbol(), left.1, right.1))?;
            Ok(combine(left.0, right.0, ty, None))
        }
        NodeKind::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let left = value(module, left)?;
            let right = value(module, right)?;
            if !(module.types().is_boolean(left.1) && module.types().is_boolean(right.1)) {
                return Err(operand_error(module, operator.symbol(), left.1, right.1));
            }
            Ok(combine(left.0, right.0, left.1, None))
        }
        NodeKind::ParenthesizedExpression { value: inner } => Ok(value(module, inner)?.0),
        other => Err(Error::structural(format!(
            "{} is not an expression",
            other.label()
        ))),
    }
}

fn literal(module: &mut Module, kind: LiteralKind, text: &str) -> Result<NodeProperties> {
    const_eval::literal_value(kind, text)?;
    let types = module.types_mut();
    let (ty, abstract_kind) = match kind {
        LiteralKind::Bool => (types.boolean(), None),
        LiteralKind::String => (types.string(), None),
        LiteralKind::Int => match const_eval::literal_suffix(kind, text) {
            Some(suffix) => (types.numeric(suffix), None),
            None => (types.numeric(NumericKind::Integer), Some(AbstractKind::Int)),
        },
        LiteralKind::Float => match const_eval::literal_suffix(kind, text) {
            Some(suffix) => (types.numeric(suffix), None),
            None => (types.numeric(NumericKind::Float), Some(AbstractKind::Float)),
        },
    };
    Ok(NodeProperties {
        abstract_kind,
        ..NodeProperties::constant(ty)
    })
}

fn variable(module: &mut Module, id: NodeId, name: &str) -> Result<NodeProperties> {
    let declaration = module
        .resolve_variable(id, name)
        .ok_or_else(|| Error::unknown_identifier(name))?;
    let properties = ensure(module, declaration)?;
    module.bind(id, declaration);
    if properties.ty.is_none() {
        return Err(Error::structural(format!("`{}` has no type", name)));
    }
    Ok(properties)
}

fn index_expression(module: &mut Module, base: NodeId, index: NodeId) -> Result<NodeProperties> {
    let (base_properties, base_ty) = value(module, base)?;
    let (index_properties, index_ty) = value(module, index)?;
    let types = module.types();
    if !types.properties(base_ty).indexable {
        return Err(Error::type_mismatch(format!(
            "`{}` is not indexable",
            types.display(base_ty)
        )));
    }
    if !types.numeric_kind(index_ty).is_some_and(NumericKind::is_integer) {
        return Err(Error::type_mismatch(format!(
            "index must be an integer, found `{}`",
            types.display(index_ty)
        )));
    }
    let element = types
        .element_of(base_ty)
        .ok_or_else(|| Error::structural("indexable type without element type"))?;
    let bound = match types.concrete_definition(base_ty) {
        TypeDefinition::Vector { size, .. } => Some(u32::from(*size)),
        TypeDefinition::Array {
            length: ArrayLength::Constant(count),
            ..
        } => Some(*count),
        _ => None,
    };
    if let (Some(bound), true) = (bound, index_properties.is_constant) {
        let position = const_eval::evaluate(module, index)?;
        let inside = position
            .as_integer()
            .is_some_and(|position| (0..i64::from(bound)).contains(&position));
        if !inside {
            return Err(Error::type_mismatch(format!(
                "index {} is out of bounds for `{}`",
                position,
                module.types().display(base_ty)
            )));
        }
    }
    Ok(NodeProperties {
        is_constant: base_properties.is_constant && index_properties.is_constant,
        is_creation_fixed: base_properties.is_creation_fixed
            && index_properties.is_creation_fixed,
        is_storage: base_properties.is_storage,
        ty: Some(element),
        abstract_kind: None,
    })
}

fn decomposition(module: &mut Module, base: NodeId, member: &str) -> Result<NodeProperties> {
    if let Some(properties) = enum_member(module, base, member)? {
        return Ok(properties);
    }
    let (properties, ty) = value(module, base)?;
    match module.types().concrete_definition(ty).clone() {
        TypeDefinition::Struct { name, members } => {
            let found = members
                .iter()
                .find(|candidate| candidate.name == member)
                .ok_or_else(|| Error::unknown_identifier(format!("{}.{}", name, member)))?;
            Ok(NodeProperties {
                ty: Some(found.ty),
                abstract_kind: None,
                ..properties
            })
        }
        TypeDefinition::Vector { size, inner } => {
            let components = swizzle(member, size).ok_or_else(|| {
                Error::type_mismatch(format!(
                    "`{}` is not a valid swizzle of `{}`",
                    member,
                    module.types().display(ty)
                ))
            })?;
            let result = match components {
                1 => inner,
                count => module.types_mut().vector(count, inner),
            };
            Ok(NodeProperties {
                is_storage: properties.is_storage && components == 1,
                ty: Some(result),
                ..properties
            })
        }
        _ => Err(Error::type_mismatch(format!(
            "`{}` has no member `{}`",
            module.types().display(ty),
            member
        ))),
    }
}

/// `Enum.Value` when `base` names an enum and no variable of that name is visible.
fn enum_member(module: &mut Module, base: NodeId, member: &str) -> Result<Option<NodeProperties>> {
    let NodeKind::VariableName { name } = module.kind(base).clone() else {
        return Ok(None);
    };
    if module.resolve_variable(base, &name).is_some() {
        return Ok(None);
    }
    let Some(declaration) = module.resolve_enum(&name) else {
        return Ok(None);
    };
    let ty = super::declared_type(module, declaration)?;
    let NodeKind::EnumDeclaration { values, .. } = module.kind(declaration) else {
        return Ok(None);
    };
    if !values.iter().any(|value| value.name == member) {
        return Err(Error::unknown_identifier(format!("{}.{}", name, member)));
    }
    mark(
        module,
        base,
        NodeProperties {
            ty: Some(ty),
            ..NodeProperties::default()
        },
    );
    Ok(Some(NodeProperties::constant(ty)))
}

/// Number of components selected by a swizzle, if it is valid for a vector of `size`.
fn swizzle(member: &str, size: u8) -> Option<u8> {
    if !SWIZZLE.is_match(member) {
        return None;
    }
    let in_range = member.chars().all(|component| {
        let position = match component {
            'x' | 'r' => 0,
            'y' | 'g' => 1,
            'z' | 'b' => 2,
            _ => 3,
        };
        position < size
    });
    in_range.then_some(member.len() as u8)
}

/// Operand of `*` and `&`: a name, an index or a member access.
fn reference_operand(module: &mut Module, target: NodeId, symbol: &str) -> Result<Operand> {
    let allowed = matches!(
        module.kind(target),
        NodeKind::VariableName { .. }
            | NodeKind::IndexExpression { .. }
            | NodeKind::ValueDecomposition { .. }
    );
    if !allowed {
        return Err(Error::unsupported_operator(
            symbol,
            module.kind(target).label(),
        ));
    }
    value(module, target)
}

fn unary(module: &mut Module, operator: UnaryOperator, operand: NodeId) -> Result<NodeProperties> {
    let (properties, ty) = value(module, operand)?;
    let types = module.types();
    let scalar = types.scalar_of(ty);
    let kind = scalar.and_then(|scalar| types.numeric_kind(scalar));
    let supported = match operator {
        UnaryOperator::Negate => kind.is_some_and(NumericKind::is_signed),
        UnaryOperator::Not => scalar.is_some_and(|scalar| types.is_boolean(scalar)),
        UnaryOperator::BitNot => {
            kind.is_some_and(NumericKind::is_integer) && !is_matrix(module, ty)
        }
    };
    if !supported {
        return Err(Error::unsupported_operator(
            operator.symbol(),
            format!("`{}`", module.types().display(ty)),
        ));
    }
    Ok(NodeProperties {
        is_storage: false,
        ..properties
    })
}

fn is_matrix(module: &Module, ty: TypeHandle) -> bool {
    matches!(
        module.types().concrete_definition(ty),
        TypeDefinition::Matrix { .. }
    )
}

fn combine(
    left: NodeProperties,
    right: NodeProperties,
    ty: TypeHandle,
    abstract_kind: Option<AbstractKind>,
) -> NodeProperties {
    NodeProperties {
        is_constant: left.is_constant && right.is_constant,
        is_creation_fixed: left.is_creation_fixed && right.is_creation_fixed,
        is_storage: false,
        ty: Some(ty),
        abstract_kind,
    }
}

fn operand_error(module: &Module, symbol: &str, left: TypeHandle, right: TypeHandle) -> Error {
    Error::unsupported_operator(
        symbol,
        format!(
            "`{}` and `{}`",
            module.types().display(left),
            module.types().display(right)
        ),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    Vector(u8),
    Matrix(u8, u8),
}

fn shape(module: &Module, ty: TypeHandle) -> Option<Shape> {
    match module.types().concrete_definition(ty) {
        TypeDefinition::Boolean | TypeDefinition::Numeric(_) => Some(Shape::Scalar),
        TypeDefinition::Vector { size, .. } => Some(Shape::Vector(*size)),
        TypeDefinition::Matrix { columns, rows, .. } => Some(Shape::Matrix(*columns, *rows)),
        _ => None,
    }
}

fn build(module: &mut Module, shape: Shape, scalar: TypeHandle) -> TypeHandle {
    let types = module.types_mut();
    match shape {
        Shape::Scalar => scalar,
        Shape::Vector(size) => types.vector(size, scalar),
        Shape::Matrix(columns, rows) => types.intern(TypeDefinition::Matrix {
            columns,
            rows,
            inner: scalar,
        }),
    }
}

/// `ty` with its element replaced by `kind`, keeping the scalar, vector or matrix shape.
pub(crate) fn with_scalar(
    module: &mut Module,
    ty: TypeHandle,
    kind: NumericKind,
) -> Option<TypeHandle> {
    let shape = shape(module, ty)?;
    if matches!(shape, Shape::Matrix(..)) && !kind.is_float() {
        return None;
    }
    let scalar = module.types_mut().numeric(kind);
    Some(build(module, shape, scalar))
}

/// Whether a value can initialize or be assigned to a slot of type `to`.
pub(crate) fn assignable(module: &mut Module, operand: Operand, to: TypeHandle) -> bool {
    let (properties, from) = operand;
    if module.types().same(from, to) {
        return true;
    }
    let Some(abstract_kind) = properties.abstract_kind else {
        return false;
    };
    let target = module
        .types()
        .scalar_of(to)
        .and_then(|scalar| module.types().numeric_kind(scalar));
    let Some(target) = target else {
        return false;
    };
    if abstract_kind == AbstractKind::Float && !target.is_float() {
        return false;
    }
    with_scalar(module, from, target).is_some_and(|converted| module.types().same(converted, to))
}

/// The one type every operand converts to, if there is one.
pub(crate) fn common_type(module: &mut Module, operands: &[Operand]) -> Option<TypeHandle> {
    let first = operands.first()?;
    let target = match operands.iter().find(|(p, _)| p.abstract_kind.is_none()) {
        Some((_, ty)) => *ty,
        None => {
            let float = operands
                .iter()
                .any(|(p, _)| p.abstract_kind == Some(AbstractKind::Float));
            let kind = if float {
                NumericKind::Float
            } else {
                NumericKind::Integer
            };
            with_scalar(module, first.1, kind)?
        }
    };
    operands
        .iter()
        .all(|operand| assignable(module, *operand, target))
        .then_some(target)
}

/// Abstract flavour of an operator result: abstract only if both sides are.
fn merge_abstract(left: Option<AbstractKind>, right: Option<AbstractKind>) -> Option<AbstractKind> {
    match (left?, right?) {
        (AbstractKind::Int, AbstractKind::Int) => Some(AbstractKind::Int),
        _ => Some(AbstractKind::Float),
    }
}

/// Element type both operands share after abstract conversion.
fn common_scalar(module: &mut Module, left: Operand, right: Operand) -> Option<TypeHandle> {
    let types = module.types();
    let left_scalar = types.scalar_of(left.1)?;
    let right_scalar = types.scalar_of(right.1)?;
    let converts = |kind: AbstractKind, scalar: TypeHandle| match types.numeric_kind(scalar) {
        Some(numeric) => kind == AbstractKind::Int || numeric.is_float(),
        None => false,
    };
    match (left.0.abstract_kind, right.0.abstract_kind) {
        _ if types.same(left_scalar, right_scalar) => Some(left_scalar),
        (Some(kind), None) => converts(kind, right_scalar).then_some(right_scalar),
        (None, Some(kind)) => converts(kind, left_scalar).then_some(left_scalar),
        (Some(_), Some(_)) => Some(module.types_mut().numeric(NumericKind::Float)),
        (None, None) => None,
    }
}

/// Result type of a binary operator, shared with compound assignment.
pub(crate) fn binary_type(
    module: &mut Module,
    operator: BinaryOperator,
    left: Operand,
    right: Operand,
) -> Result<(TypeHandle, Option<AbstractKind>)> {
    let error = |module: &Module| operand_error(module, operator.symbol(), left.1, right.1);
    let abstract_kind = merge_abstract(left.0.abstract_kind, right.0.abstract_kind);
    let (Some(left_shape), Some(right_shape)) = (shape(module, left.1), shape(module, right.1))
    else {
        return Err(error(module));
    };
    if operator.is_shift() {
        let types = module.types();
        let integer = |ty: TypeHandle| {
            types
                .scalar_of(ty)
                .and_then(|scalar| types.numeric_kind(scalar))
        };
        let left_ok = integer(left.1).is_some_and(NumericKind::is_integer);
        let right_ok = integer(right.1) == Some(NumericKind::UnsignedInteger)
            || right.0.abstract_kind == Some(AbstractKind::Int);
        if !left_ok || !right_ok || left_shape != right_shape {
            return Err(error(module));
        }
        let kind = left.0.abstract_kind.and(right.0.abstract_kind);
        return Ok((left.1, kind.map(|_| AbstractKind::Int)));
    }
    let scalar = common_scalar(module, left, right).ok_or_else(|| error(module))?;
    let element = module.types().numeric_kind(scalar);
    let element_ok = if operator.is_arithmetic() {
        element.is_some()
    } else {
        element.map_or(module.types().is_boolean(scalar), NumericKind::is_integer)
    };
    if !element_ok {
        return Err(error(module));
    }
    use Shape::*;
    let shape = match (left_shape, right_shape) {
        (Matrix(..), _) | (_, Matrix(..)) if !operator.is_arithmetic() => None,
        (Scalar, Scalar) => Some(Scalar),
        (Vector(l), Vector(r)) if l == r => Some(Vector(l)),
        (Scalar, Vector(n)) | (Vector(n), Scalar) if operator.is_arithmetic() => Some(Vector(n)),
        (Matrix(c, r), Matrix(k, l))
            if (c, r) == (k, l)
                && matches!(operator, BinaryOperator::Add | BinaryOperator::Subtract) =>
        {
            Some(Matrix(c, r))
        }
        _ if operator != BinaryOperator::Multiply => None,
        (Matrix(c, r), Scalar) | (Scalar, Matrix(c, r)) => Some(Matrix(c, r)),
        (Matrix(c, r), Vector(n)) if n == c => Some(Vector(r)),
        (Vector(n), Matrix(c, r)) if n == r => Some(Vector(c)),
        (Matrix(c, r), Matrix(k, l)) if l == c => Some(Matrix(k, r)),
        _ => None,
    };
    let shape = shape.ok_or_else(|| error(module))?;
    Ok((build(module, shape, scalar), abstract_kind))
}

/// Result type of a comparison: `bool`, or a bool vector for vector operands.
fn comparison_type(
    module: &mut Module,
    ordering: bool,
    left: Operand,
    right: Operand,
) -> Option<TypeHandle> {
    let types = module.types();
    let strings = matches!(types.concrete_definition(left.1), TypeDefinition::String)
        && matches!(types.concrete_definition(right.1), TypeDefinition::String);
    if strings {
        return (!ordering).then(|| module.types_mut().boolean());
    }
    let left_shape = shape(module, left.1)?;
    if left_shape != shape(module, right.1)? || matches!(left_shape, Shape::Matrix(..)) {
        return None;
    }
    let scalar = common_scalar(module, left, right)?;
    if ordering && module.types().numeric_kind(scalar).is_none() {
        return None;
    }
    let boolean = module.types_mut().boolean();
    Some(build(module, left_shape, boolean))
}
