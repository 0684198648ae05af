//! Testing utilities for chatfile
//!
//!     Helpers shared by unit tests, integration tests and downstream crates:
//!
//!         - [lex_all]: run the lexer to completion and collect tokens plus the stop error.
//!         - [scan_all]: same for the command scanner.
//!         - [compile]: compile a source into a fresh context with a [Transcript].
//!         - [ScriptedTokens]: a token source that replays hand-built tokens, for driving the
//!           parser with streams a real lexer would never produce.
//!         - [tok]: short token factory.

use crate::chatfile::commands::Command;
use crate::chatfile::context::{Context, Transcript};
use crate::chatfile::lexing::{LexError, Lexer, TokenSource};
use crate::chatfile::loader::compile_str;
use crate::chatfile::parsing::{CommandScanner, ParseError};
use crate::chatfile::token::{Token, TokenKind};
use std::collections::VecDeque;

/// Lex `source` to the end, returning every token and the error the lexer stopped on.
pub fn lex_all(source: &str) -> (Vec<Token>, Option<LexError>) {
    let mut lexer = Lexer::from_source(source);
    let mut tokens = Vec::new();
    while lexer.advance() {
        tokens.push(lexer.current().clone());
    }
    (tokens, lexer.error().cloned())
}

/// Scan `source` to the end, returning every command and the error scanning stopped on.
pub fn scan_all(source: &str) -> (Vec<Command>, Option<ParseError>) {
    let mut scanner = CommandScanner::new(Lexer::from_source(source));
    let mut commands = Vec::new();
    while scanner.scan() {
        if let Some(command) = scanner.command() {
            commands.push(command.clone());
        }
    }
    (commands, scanner.err().cloned())
}

pub fn compile(source: &str) -> Result<Context<Transcript>, ParseError> {
    compile_str(source)
}

pub fn tok(kind: TokenKind, content: &str, line: usize, column: usize) -> Token {
    Token::new(kind, content, line, column)
}

/// Replays a fixed list of tokens, then ends cleanly or with the given error.
pub struct ScriptedTokens {
    pending: VecDeque<Token>,
    current: Token,
    final_error: Option<LexError>,
    error: Option<LexError>,
}

impl ScriptedTokens {
    pub fn new(tokens: Vec<Token>) -> Self {
        ScriptedTokens {
            pending: tokens.into(),
            current: Token::end_of_input(1, 1),
            final_error: None,
            error: None,
        }
    }

    /// End the script with `error` instead of a clean end of input.
    pub fn failing_with(mut self, error: LexError) -> Self {
        self.final_error = Some(error);
        self
    }
}

impl TokenSource for ScriptedTokens {
    fn advance(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.pending.pop_front() {
            Some(token) => {
                self.current = token;
                true
            }
            None => {
                self.error = self.final_error.take();
                let (line, column) = (self.current.line, self.current.column);
                self.current = Token::end_of_input(line, column);
                false
            }
        }
    }

    fn current(&self) -> &Token {
        &self.current
    }

    fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatfile::parsing::parse_command;

    #[test]
    fn test_scripted_tokens_end_cleanly() {
        let mut source = ScriptedTokens::new(vec![tok(TokenKind::Ask, "ASK", 1, 1)]);
        assert!(source.advance());
        assert_eq!(source.current().kind, TokenKind::Ask);
        assert!(!source.advance());
        assert_eq!(source.error(), None);
    }

    #[test]
    fn test_source_error_wins_over_incomplete_command() {
        let error = LexError::UnexpectedEndOfInput { line: 1, column: 4 };
        let mut source = ScriptedTokens::new(vec![tok(TokenKind::Ask, "ASK", 1, 1)])
            .failing_with(error.clone());
        assert_eq!(parse_command(&mut source), Err(ParseError::Lex(error)));
    }

    #[test]
    fn test_lex_all_and_scan_all_agree() {
        let source = "FROM a\nASK b\nANSWER c\n";
        let (tokens, lex_error) = lex_all(source);
        let (commands, parse_error) = scan_all(source);
        assert_eq!(tokens.len(), 6);
        assert_eq!(commands.len(), 3);
        assert!(lex_error.is_none() && parse_error.is_none());
    }
}
