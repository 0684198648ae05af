//! Parsing module for the chatfile format
//!
//!     The parser groups tokens into commands. Since the lexer already guarantees that every
//!     keyword is followed by its companion token on the same line (or fails), the parser is a
//!     single pass, no backtracking dispatch on the first token of each command:
//!
//!         FROM            -> must be followed by MODEL    -> FromCommand
//!         SYSTEM/ASK/ANSWER -> must be followed by PROMPT -> PromptCommand
//!         anything else   -> ExpectedCommandToken
//!
//!     When the token source ends right after a keyword, the command is incomplete. When the
//!     token source failed, its error is surfaced as is.
//!
//! Contract Violations
//!
//!     A follow-up token of the wrong kind, with no error reported by the token source, can
//!     only come from a token source that breaks its own contract. That is a bug, not bad
//!     input, so it panics instead of producing a [ParseError].
//!
//! Scanning
//!
//!     [CommandScanner] wraps repeated [parse_command] calls in a pull iterator that stops for
//!     good on the first error, and tells a clean end of input apart from a failure.
//!     [CommandScanner::commands] turns it into a regular iterator of results.

pub mod common;
pub mod parser;
pub mod scanner;

pub use common::ParseError;
pub use parser::parse_command;
pub use scanner::{CommandScanner, Commands};
