//! Chatfile loading utilities
//!
//! This module runs the whole pipeline (lex, scan, apply) over a reader, a string or a file
//! and leaves the result in a [Context]. This is used by both production code and tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatfile_parser::chatfile::loader::{compile_file, compile_str};
//!
//! // From file
//! let context = compile_file("conversation.chatfile").unwrap();
//!
//! // From string
//! let context = compile_str("FROM gpt-4\nASK hi\n").unwrap();
//! ```

use crate::chatfile::context::{Context, History, Transcript};
use crate::chatfile::lexing::Lexer;
use crate::chatfile::parsing::{CommandScanner, ParseError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Error that can occur when loading chatfiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// IO error when opening the file
    IoError(String),
    /// Lexing or parsing error
    ParseError(ParseError),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderError::IoError(msg) => write!(f, "IO error: {}", msg),
            LoaderError::ParseError(err) => write!(f, "Parse error: {}", err),
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::IoError(err.to_string())
    }
}

impl From<ParseError> for LoaderError {
    fn from(err: ParseError) -> Self {
        LoaderError::ParseError(err)
    }
}

/// Apply every command read from `reader` to `context`, in source order.
///
/// Returns the number of commands applied. Commands applied before an error stay applied.
pub fn load_into_context<R: BufRead, H: History>(
    reader: R,
    context: &mut Context<H>,
) -> Result<usize, ParseError> {
    let mut scanner = CommandScanner::new(Lexer::new(reader));
    let mut applied = 0;

    while scanner.scan() {
        if let Some(command) = scanner.command() {
            command.apply(context);
            applied += 1;
        }
    }

    match scanner.err() {
        Some(err) => Err(err.clone()),
        None => {
            debug!(applied, "chatfile loaded");
            Ok(applied)
        }
    }
}

/// Compile an in-memory chatfile into a fresh context.
pub fn compile_str(source: &str) -> Result<Context<Transcript>, ParseError> {
    let mut context = Context::default();
    load_into_context(source.as_bytes(), &mut context)?;
    Ok(context)
}

/// Compile a chatfile on disk into a fresh context.
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<Context<Transcript>, LoaderError> {
    let file = File::open(path)?;
    let mut context = Context::default();
    load_into_context(BufReader::new(file), &mut context)?;
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatfile::context::{HistoryEntry, ModelName, Role};
    use std::io::Write;

    #[test]
    fn test_compile_str() {
        let context = compile_str("FROM gpt-4\nASK hi\n").unwrap();
        assert_eq!(context.current_model, Some(ModelName::from("gpt-4")));
        assert_eq!(context.history.entries(), &[HistoryEntry::new(Role::User, "hi")]);
    }

    #[test]
    fn test_partial_application_on_error() {
        let mut context = Context::<Transcript>::default();
        let result = load_into_context("FROM a\nASK one\nNOPE\n".as_bytes(), &mut context);
        assert!(result.is_err());
        assert_eq!(context.current_model, Some(ModelName::from("a")));
        assert_eq!(context.history.len(), 1);
    }

    #[test]
    fn test_compile_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SYSTEM |").unwrap();
        writeln!(file, "    be terse").unwrap();
        writeln!(file, "FROM local").unwrap();
        let context = compile_file(file.path()).unwrap();
        assert_eq!(context.current_model, Some(ModelName::from("local")));
        assert_eq!(
            context.history.entries(),
            &[HistoryEntry::new(Role::System, "be terse")]
        );
    }

    #[test]
    fn test_missing_file() {
        let err = compile_file("/definitely/not/here.chatfile").unwrap_err();
        assert!(matches!(err, LoaderError::IoError(_)));
    }
}
