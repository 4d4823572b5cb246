//! Error types for the front end
//!
//!     Compilation is all-or-nothing: the first error aborts the unit and is returned from
//!     [`parse`](crate::shade::parsing::parse). Every variant carries an optional [`Location`].
//!     Errors raised deep inside semantic checks usually do not know where they are; the
//!     node that observes them attaches its own location on the way out with
//!     [`Error::located`], and the innermost location always wins.

use crate::shade::range::{Location, Range};
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Display helper rendering an optional location as a `file:line:column: ` prefix.
struct At<'a>(&'a Option<Location>);

impl fmt::Display for At<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(location) => write!(f, "{}: ", location),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No token pattern matches at a position.
    #[error("{}lex error: {message}", At(.location))]
    Lex {
        message: String,
        location: Option<Location>,
    },
    /// No grammar alternative matches. The location is the furthest position reached.
    #[error("{}parse error: expected {}, found {found}", At(.location), .expected.join(" or "))]
    Parse {
        expected: Vec<String>,
        found: String,
        location: Option<Location>,
    },
    #[error("{}duplicate {namespace} declaration `{name}`", At(.location))]
    DuplicateDeclaration {
        namespace: String,
        name: String,
        location: Option<Location>,
    },
    #[error("{}unknown type `{name}`", At(.location))]
    UnknownType {
        name: String,
        location: Option<Location>,
    },
    #[error("{}unknown identifier `{name}`", At(.location))]
    UnknownIdentifier {
        name: String,
        location: Option<Location>,
    },
    #[error("{}type mismatch: {message}", At(.location))]
    TypeMismatch {
        message: String,
        location: Option<Location>,
    },
    /// Broken tree invariants: re-parenting, premature property access, missing fields.
    #[error("{}structural error: {message}", At(.location))]
    Structural {
        message: String,
        location: Option<Location>,
    },
    #[error("{}operator `{operator}` is not supported for {operand}", At(.location))]
    UnsupportedOperator {
        operator: String,
        operand: String,
        location: Option<Location>,
    },
}

impl Error {
    pub fn lex(message: impl Into<String>) -> Self {
        Error::Lex {
            message: message.into(),
            location: None,
        }
    }

    pub fn duplicate(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Error::DuplicateDeclaration {
            namespace: namespace.into(),
            name: name.into(),
            location: None,
        }
    }

    pub fn unknown_type(name: impl Into<String>) -> Self {
        Error::UnknownType {
            name: name.into(),
            location: None,
        }
    }

    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        Error::UnknownIdentifier {
            name: name.into(),
            location: None,
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            message: message.into(),
            location: None,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Error::Structural {
            message: message.into(),
            location: None,
        }
    }

    pub fn unsupported_operator(operator: impl Into<String>, operand: impl Into<String>) -> Self {
        Error::UnsupportedOperator {
            operator: operator.into(),
            operand: operand.into(),
            location: None,
        }
    }

    fn location_slot(&mut self) -> &mut Option<Location> {
        match self {
            Error::Lex { location, .. }
            | Error::Parse { location, .. }
            | Error::DuplicateDeclaration { location, .. }
            | Error::UnknownType { location, .. }
            | Error::UnknownIdentifier { location, .. }
            | Error::TypeMismatch { location, .. }
            | Error::Structural { location, .. }
            | Error::UnsupportedOperator { location, .. } => location,
        }
    }

    /// Where the error happened, if known.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Lex { location, .. }
            | Error::Parse { location, .. }
            | Error::DuplicateDeclaration { location, .. }
            | Error::UnknownType { location, .. }
            | Error::UnknownIdentifier { location, .. }
            | Error::TypeMismatch { location, .. }
            | Error::Structural { location, .. }
            | Error::UnsupportedOperator { location, .. } => location.as_ref(),
        }
    }

    /// Attach a location unless a more precise one is already present.
    pub fn located(mut self, location: Location) -> Self {
        let slot = self.location_slot();
        if slot.is_none() {
            *slot = Some(location);
        }
        self
    }

    /// Short, stable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Lex { .. } => "LexError",
            Error::Parse { .. } => "ParseError",
            Error::DuplicateDeclaration { .. } => "DuplicateDeclarationError",
            Error::UnknownType { .. } => "UnknownTypeError",
            Error::UnknownIdentifier { .. } => "UnknownIdentifierError",
            Error::TypeMismatch { .. } => "TypeMismatchError",
            Error::Structural { .. } => "StructuralError",
            Error::UnsupportedOperator { .. } => "UnsupportedOperatorError",
        }
    }
}

/// Format source code context around an error location
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
/// All lines are numbered for easy reference.
pub fn format_source_context(source: &str, range: &Range) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = range.start.line;

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();

    for (line_num, line) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, line));
    }

    context
}
