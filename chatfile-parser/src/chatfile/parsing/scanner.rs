//! Pull-based command scanner
//!
//! ```rust,ignore
//! let mut scanner = CommandScanner::new(Lexer::from_source(source));
//! while scanner.scan() {
//!     let command = scanner.command().unwrap();
//!     // process the command...
//! }
//! if let Some(err) = scanner.err() {
//!     // handle the error...
//! }
//! ```

use super::common::ParseError;
use super::parser::parse_command;
use crate::chatfile::commands::Command;
use crate::chatfile::lexing::TokenSource;
use tracing::debug;

pub struct CommandScanner<S> {
    source: S,
    command: Option<Command>,
    error: Option<ParseError>,
    finished: bool,
    error_reported: bool,
}

impl<S: TokenSource> CommandScanner<S> {
    pub fn new(source: S) -> Self {
        CommandScanner {
            source,
            command: None,
            error: None,
            finished: false,
            error_reported: false,
        }
    }

    /// Advance to the next command. Returns `false` at the end of input or on error, and
    /// keeps returning `false` afterwards.
    pub fn scan(&mut self) -> bool {
        if self.finished {
            return false;
        }

        match parse_command(&mut self.source) {
            Ok(Some(command)) => {
                debug!(command = %command, "scanned command");
                self.command = Some(command);
                true
            }
            Ok(None) => {
                self.command = None;
                self.finished = true;
                false
            }
            Err(err) => {
                self.command = None;
                self.error = Some(err);
                self.finished = true;
                false
            }
        }
    }

    /// The command produced by the last successful [scan](Self::scan).
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// `None` unless scanning stopped for a reason other than a clean end of input.
    pub fn err(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// The underlying token source, e.g. to report the token an error stopped at.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Turn the scanner into an iterator of `Result<Command, ParseError>`.
    pub fn commands(self) -> Commands<S> {
        Commands { scanner: self }
    }
}

/// Iterator over the commands of a [CommandScanner], see [CommandScanner::commands].
///
/// Yields every command, then the error scanning stopped on (once), then `None`.
pub struct Commands<S> {
    scanner: CommandScanner<S>,
}

impl<S: TokenSource> Iterator for Commands<S> {
    type Item = Result<Command, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let scanner = &mut self.scanner;
        if scanner.scan() {
            return scanner.command.take().map(Ok);
        }
        match &scanner.error {
            Some(err) if !scanner.error_reported => {
                scanner.error_reported = true;
                Some(Err(err.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatfile::commands::{FromCommand, PromptCommand};
    use crate::chatfile::context::Role;
    use crate::chatfile::lexing::{LexErrorKind, Lexer};
    use crate::chatfile::token::TokenKind;

    #[test]
    fn test_scans_until_end_of_input() {
        let mut scanner = CommandScanner::new(Lexer::from_source("FROM m\nASK hi\n"));
        assert!(scanner.scan());
        assert_eq!(scanner.command(), Some(&Command::From(FromCommand::new("m"))));
        assert!(scanner.scan());
        assert_eq!(
            scanner.command(),
            Some(&Command::Prompt(PromptCommand::new(Role::User, "hi")))
        );
        assert!(!scanner.scan());
        assert_eq!(scanner.err(), None);
        assert_eq!(scanner.command(), None);
    }

    #[test]
    fn test_stops_on_first_error() {
        let mut scanner = CommandScanner::new(Lexer::from_source("ASK hi\nMAYBE\nASK again\n"));
        assert!(scanner.scan());
        assert!(!scanner.scan());
        assert_eq!(
            scanner.err().and_then(|e| e.lex_error()).map(|e| e.kind()),
            Some(LexErrorKind::UnknownToken)
        );
        assert!(!scanner.scan());
        assert_eq!(scanner.source().current().kind, TokenKind::Unknown);
    }

    #[test]
    fn test_iterator_reports_error_once() {
        let results: Vec<_> = CommandScanner::new(Lexer::from_source("ASK hi\nFROM"))
            .commands()
            .collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ParseError::CommandIncomplete {
                keyword: TokenKind::From
            })
        );
    }

    #[test]
    fn test_scanner_over_borrowed_lexer() {
        let mut lexer = Lexer::from_source("ANSWER ok\n");
        let commands: Result<Vec<_>, _> = CommandScanner::new(&mut lexer).commands().collect();
        assert_eq!(commands.unwrap().len(), 1);
        assert!(!lexer.advance());
    }
}
