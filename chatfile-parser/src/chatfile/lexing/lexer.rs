//! Stateful reader lexer
//!
//! See the [lexing module](crate::chatfile::lexing) for the state machine and the block
//! literal rules.

use super::common::{LexError, TokenSource};
use super::reader::CharReader;
use crate::chatfile::token::{Keyword, Token, TokenKind};
use std::io::BufRead;
use tracing::{trace, warn};

/// Columns of indentation a block literal line needs. A tab counts as this many columns.
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    Ready,
    ExpectModel,
    ExpectPrompt,
}

/// Outcome of measuring the indentation at the start of a block literal line.
enum Indentation {
    /// At least [TAB_WIDTH] columns were consumed; the rest of the line is content.
    Content,
    /// Content started before reaching [TAB_WIDTH] columns; the block is over.
    Shallow,
    EndOfInput,
}

/// Lexer over any buffered reader.
///
/// The lexer owns its cursor (line, column, sub-state) and pulls characters on demand.
/// Lexing the same input twice from scratch yields the same tokens.
pub struct Lexer<R> {
    reader: CharReader<R>,
    state: LexerState,
    line: usize,
    column: usize,
    current: Token,
    error: Option<LexError>,
    error_reported: bool,
}

impl<'a> Lexer<&'a [u8]> {
    /// Lex an in-memory source.
    pub fn from_source(source: &'a str) -> Self {
        Lexer::new(source.as_bytes())
    }
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Lexer {
            reader: CharReader::new(reader),
            state: LexerState::Ready,
            line: 1,
            column: 1,
            current: Token::end_of_input(1, 1),
            error: None,
            error_reported: false,
        }
    }

    /// Skip whitespace and newlines. Returns `false` at end of input.
    fn skip_whitespace(&mut self) -> Result<bool, LexError> {
        loop {
            match self.reader.peek()? {
                None => return Ok(false),
                Some('\n') => {
                    self.reader.next_char()?;
                    self.line += 1;
                    self.column = 1;
                }
                Some(ch) if ch.is_whitespace() => {
                    self.reader.next_char()?;
                    self.column += 1;
                }
                Some(_) => return Ok(true),
            }
        }
    }

    /// Read up to the next whitespace character, leaving it unconsumed.
    fn read_word(&mut self) -> Result<String, LexError> {
        let mut word = String::new();
        while let Some(ch) = self.reader.peek()? {
            if ch.is_whitespace() {
                break;
            }
            self.reader.next_char()?;
            word.push(ch);
            self.column += 1;
        }
        Ok(word)
    }

    /// Read the rest of the current line, leaving the newline unconsumed.
    fn read_line(&mut self) -> Result<String, LexError> {
        let mut line = String::new();
        while let Some(ch) = self.reader.peek()? {
            if ch == '\n' {
                break;
            }
            self.reader.next_char()?;
            line.push(ch);
            self.column += 1;
        }
        if line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn measure_indentation(&mut self) -> Result<Indentation, LexError> {
        let mut width = 0;
        while width < TAB_WIDTH {
            let ch = match self.reader.peek()? {
                Some(ch) => ch,
                None => return Ok(Indentation::EndOfInput),
            };
            if !ch.is_whitespace() {
                return Ok(Indentation::Shallow);
            }
            self.reader.next_char()?;
            match ch {
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                    width = 0;
                }
                '\t' => {
                    self.column += 1;
                    width += TAB_WIDTH;
                }
                _ => {
                    self.column += 1;
                    width += 1;
                }
            }
        }
        Ok(Indentation::Content)
    }

    fn read_block_literal(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let mut lines: Vec<String> = Vec::new();
        // Deep whitespace-only lines are kept as empty lines but carry no prompt by themselves
        let blank = |lines: &[String]| lines.iter().all(String::is_empty);
        loop {
            match self.measure_indentation()? {
                Indentation::Content => {
                    let content = self.read_line()?;
                    lines.push(content.trim_end().to_string());
                }
                Indentation::Shallow => break,
                Indentation::EndOfInput if blank(&lines) => {
                    return Err(LexError::UnexpectedEndOfInput {
                        line: self.line,
                        column: self.column,
                    });
                }
                Indentation::EndOfInput => break,
            }
        }

        if blank(&lines) {
            return Err(LexError::ExpectedPrompt { line, column });
        }
        Ok(lines.join("\n"))
    }

    fn lex_keyword(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let word = self.read_word()?;
        let command = word.to_uppercase();

        let keyword = match Keyword::recognize(&command) {
            Some(keyword) => keyword,
            None => return Err(LexError::UnknownToken { word, line, column }),
        };

        self.state = match keyword {
            Keyword::From => LexerState::ExpectModel,
            Keyword::System | Keyword::Ask | Keyword::Answer => LexerState::ExpectPrompt,
        };
        Ok(Token::new(keyword.token_kind(), command, line, column))
    }

    fn lex_model(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let word = self.read_word()?;
        self.state = LexerState::Ready;
        Ok(Token::new(TokenKind::Model, word, line, column))
    }

    fn lex_prompt(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        let first_line = self.read_line()?;
        let first_line = first_line.trim_end();
        if first_line.is_empty() {
            return Err(LexError::ExpectedPrompt { line, column });
        }

        let content = if first_line == "|" {
            self.read_block_literal(line, column)?
        } else {
            first_line.to_string()
        };

        self.state = LexerState::Ready;
        Ok(Token::new(TokenKind::Prompt, content, line, column))
    }

    fn fail(&mut self, error: LexError, line: usize, column: usize) -> bool {
        self.current = match &error {
            LexError::UnknownToken { word, .. } => Token::unknown(word.clone(), line, column),
            LexError::UnexpectedEndOfInput { line, column } => Token::end_of_input(*line, *column),
            _ => Token::unknown("", line, column),
        };
        warn!(%error, "lexer stopped");
        self.error = Some(error);
        false
    }
}

impl<R: BufRead> TokenSource for Lexer<R> {
    fn advance(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }

        let previous_line = self.line;
        let more = match self.skip_whitespace() {
            Ok(more) => more,
            Err(error) => return self.fail(error, self.line, self.column),
        };

        let (line, column) = (self.line, self.column);
        if line != previous_line {
            let misplaced = match self.state {
                LexerState::ExpectModel => Some(LexError::ExpectedModelName { line, column }),
                LexerState::ExpectPrompt => Some(LexError::ExpectedPrompt { line, column }),
                LexerState::Ready => None,
            };
            if let Some(error) = misplaced {
                return self.fail(error, line, column);
            }
        }

        if !more {
            self.current = Token::end_of_input(line, column);
            return false;
        }

        let result = match self.state {
            LexerState::Ready => self.lex_keyword(line, column),
            LexerState::ExpectModel => self.lex_model(line, column),
            LexerState::ExpectPrompt => self.lex_prompt(line, column),
        };

        match result {
            Ok(token) => {
                trace!(kind = %token.kind, line = token.line, column = token.column, "token");
                self.current = token;
                true
            }
            Err(error) => self.fail(error, line, column),
        }
    }

    fn current(&self) -> &Token {
        &self.current
    }

    fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }
}

impl<R: BufRead> Iterator for Lexer<R> {
    type Item = Result<Token, LexError>;

    /// Yields every token, then the error that stopped the lexer (once), then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            return Some(Ok(self.current.clone()));
        }
        match &self.error {
            Some(error) if !self.error_reported => {
                self.error_reported = true;
                Some(Err(error.clone()))
            }
            _ => None,
        }
    }
}
