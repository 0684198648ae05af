//! Core token types shared across the lexer, parser, and tooling.
//!
//!     The chatfile grammar is small enough that every token the parser sees is a complete
//!     unit of meaning: a keyword, the model word that follows FROM, or the full body of a
//!     prompt (single line or block literal). All the work of finding where a prompt ends
//!     happens in the lexer, which keeps the parser a flat dispatch over token kinds.
//!
//! Keywords
//!
//!     Keyword recognition is done by a tiny logos lexer over an already uppercased word.
//!     A word is a keyword only when logos consumes it entirely as a single keyword token,
//!     so `FROMX` or `ASKASK` are not keywords.

use logos::Logos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of token kinds.
///
/// `Unknown` only ever appears as the final token of a failed lex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    EndOfInput,
    Unknown,
    From,
    Model,
    System,
    Ask,
    Answer,
    Prompt,
}

impl TokenKind {
    /// Keywords that start a command.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::From | TokenKind::System | TokenKind::Ask | TokenKind::Answer
        )
    }

    /// Keywords that introduce a prompt body.
    pub fn is_prompt_keyword(&self) -> bool {
        matches!(self, TokenKind::System | TokenKind::Ask | TokenKind::Answer)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::EndOfInput => "<EOF>",
            TokenKind::Unknown => "<UNKNOWN>",
            TokenKind::From => "FROM",
            TokenKind::Model => "MODEL",
            TokenKind::System => "SYSTEM",
            TokenKind::Ask => "ASK",
            TokenKind::Answer => "ANSWER",
            TokenKind::Prompt => "PROMPT",
        };
        f.write_str(name)
    }
}

/// A single lexical unit together with the position its content starts at.
///
/// Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub content: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, content: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            content: content.into(),
            line,
            column,
        }
    }

    pub fn end_of_input(line: usize, column: usize) -> Self {
        Token::new(TokenKind::EndOfInput, "", line, column)
    }

    pub fn unknown(content: impl Into<String>, line: usize, column: usize) -> Self {
        Token::new(TokenKind::Unknown, content, line, column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {:?} {}:{}}}",
            self.kind, self.content, self.line, self.column
        )
    }
}

/// Command keywords, matched against an uppercased word.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    #[token("FROM")]
    From,
    #[token("SYSTEM")]
    System,
    #[token("ASK")]
    Ask,
    #[token("ANSWER")]
    Answer,
}

impl Keyword {
    /// Recognize a whole word as a keyword.
    ///
    /// The first logos token has to span the entire word; logos silently drops trailing
    /// input it cannot match, so `ASKED` would otherwise come back as `ASK`.
    pub fn recognize(word: &str) -> Option<Keyword> {
        let mut lexer = Keyword::lexer(word);
        match lexer.next() {
            Some(Ok(keyword)) if lexer.span() == (0..word.len()) => Some(keyword),
            _ => None,
        }
    }

    pub fn token_kind(self) -> TokenKind {
        match self {
            Keyword::From => TokenKind::From,
            Keyword::System => TokenKind::System,
            Keyword::Ask => TokenKind::Ask,
            Keyword::Answer => TokenKind::Answer,
        }
    }
}
