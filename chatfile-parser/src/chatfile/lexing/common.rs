//! Common lexer module
//!
//! This module contains the token source contract shared by the lexer and the parser, and
//! the lexer error type.

use crate::chatfile::token::Token;
use std::fmt;
use std::io;

/// Pull-based producer of tokens.
///
/// `advance` must be called before the first `current` read. A `false` from `advance`
/// means the source is exhausted; `error` tells a clean end of input (`None`) from a
/// failure.
pub trait TokenSource {
    /// Try to produce the next token, returning `true` when one is available.
    fn advance(&mut self) -> bool;

    /// The most recently produced token.
    fn current(&self) -> &Token;

    /// The error that stopped the source, if any.
    fn error(&self) -> Option<&LexError>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> &Token {
        (**self).current()
    }

    fn error(&self) -> Option<&LexError> {
        (**self).error()
    }
}

/// Errors that stop the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A word in keyword position is not a keyword
    UnknownToken {
        word: String,
        line: usize,
        column: usize,
    },
    /// Input ended where content was required
    UnexpectedEndOfInput { line: usize, column: usize },
    /// SYSTEM/ASK/ANSWER not followed by content on the same line
    ExpectedPrompt { line: usize, column: usize },
    /// FROM not followed by a model name on the same line
    ExpectedModelName { line: usize, column: usize },
    /// The underlying reader failed or the input is not UTF-8
    Io(String),
}

/// Tag of a [LexError], handy for matching without positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    UnknownToken,
    UnexpectedEndOfInput,
    ExpectedPrompt,
    ExpectedModelName,
    Io,
}

impl LexError {
    pub fn kind(&self) -> LexErrorKind {
        match self {
            LexError::UnknownToken { .. } => LexErrorKind::UnknownToken,
            LexError::UnexpectedEndOfInput { .. } => LexErrorKind::UnexpectedEndOfInput,
            LexError::ExpectedPrompt { .. } => LexErrorKind::ExpectedPrompt,
            LexError::ExpectedModelName { .. } => LexErrorKind::ExpectedModelName,
            LexError::Io(_) => LexErrorKind::Io,
        }
    }

    /// Line and column the error was reported at. Read failures carry no position.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            LexError::UnknownToken { line, column, .. }
            | LexError::UnexpectedEndOfInput { line, column }
            | LexError::ExpectedPrompt { line, column }
            | LexError::ExpectedModelName { line, column } => Some((*line, *column)),
            LexError::Io(_) => None,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnknownToken { word, line, column } => {
                write!(f, "unknown token `{}` at {}:{}", word, line, column)
            }
            LexError::UnexpectedEndOfInput { line, column } => {
                write!(f, "unexpected end of input at {}:{}", line, column)
            }
            LexError::ExpectedPrompt { line, column } => write!(
                f,
                "prompt must be on the same line as SYSTEM/ASK/ANSWER ({}:{})",
                line, column
            ),
            LexError::ExpectedModelName { line, column } => write!(
                f,
                "model name must be on the same line as FROM ({}:{})",
                line, column
            ),
            LexError::Io(msg) => write!(f, "failed to read input: {}", msg),
        }
    }
}

impl std::error::Error for LexError {}

impl From<io::Error> for LexError {
    fn from(err: io::Error) -> Self {
        LexError::Io(err.to_string())
    }
}
