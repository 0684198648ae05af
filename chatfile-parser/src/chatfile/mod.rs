//! Main module for chatfile library functionality

pub mod commands;
pub mod context;
pub mod formats;
pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod request;
pub mod substitution;
pub mod testing;
pub mod token;

pub use commands::{Command, FromCommand, PromptCommand};
pub use context::{Context, History, HistoryEntry, ModelName, Role, Transcript};
pub use lexing::{LexError, LexErrorKind, Lexer, TokenSource};
pub use loader::{compile_file, compile_str, load_into_context, LoaderError};
pub use parsing::{parse_command, CommandScanner, ParseError};
pub use token::{Token, TokenKind};
