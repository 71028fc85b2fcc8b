//! Frontend: source text to expressions
//!
//! This module contains the lexer, the parser and the naming table.
//! The frontend turns combinator source into engine expressions.

use crate::util::span::Position;
use thiserror::Error;

pub mod env;
pub mod lexer;
pub mod parser;

pub use env::Environment;
pub use parser::parse;

/// Lexing and parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("Invalid numeral {text} at {position}")]
    InvalidNumeral { text: String, position: Position },

    #[error("Unexpected token '{found}' at {position}")]
    UnexpectedToken { found: String, position: Position },

    #[error("Unexpected end of input at {position}")]
    UnexpectedEof { position: Position },

    #[error("Unbalanced parenthesis at {position}")]
    UnbalancedParen { position: Position },
}

impl ParseError {
    /// Where the error was detected
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedChar { position, .. }
            | ParseError::InvalidNumeral { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::UnbalancedParen { position } => *position,
        }
    }
}
