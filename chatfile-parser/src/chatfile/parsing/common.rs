//! Parser error type

use crate::chatfile::lexing::LexError;
use crate::chatfile::token::{Token, TokenKind};
use std::fmt;

/// Errors that can occur while grouping tokens into commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The token source failed
    Lex(LexError),
    /// Input ended cleanly right after a command keyword
    CommandIncomplete { keyword: TokenKind },
    /// A command must start with a keyword
    ExpectedCommandToken { token: Token },
}

impl ParseError {
    pub fn lex_error(&self) -> Option<&LexError> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(err) => write!(f, "Lexing error: {}", err),
            ParseError::CommandIncomplete { keyword } => {
                write!(f, "failed to parse command {}: input ended", keyword)
            }
            ParseError::ExpectedCommandToken { token } => write!(
                f,
                "expected a command keyword, found {} at {}:{}",
                token.kind, token.line, token.column
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex(err)
    }
}
