//! Main module for the shade front end

pub mod ast;
pub mod building;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod options;
pub mod parsing;
pub mod range;
pub mod semantic;
pub mod testing;
pub mod types;
