//! Lexer
//!
//!     This module turns chatfile source into a forward-only sequence of tokens. Unlike a
//!     regular expression lexer, the chatfile lexer is driven by a small state machine: what a
//!     word means depends on what came before it, and prompt bodies are whole lines (or whole
//!     indented blocks) rather than words.
//!
//! The State Machine
//!
//!     Ready:
//!         Expects a keyword (FROM, SYSTEM, ASK, ANSWER, case-insensitive). FROM moves to
//!         ExpectModel, the others move to ExpectPrompt. Any other word is fatal.
//!
//!     ExpectModel:
//!         Expects one whitespace delimited word on the same source line as FROM. The word is
//!         kept verbatim (not uppercased). Moves back to Ready.
//!
//!     ExpectPrompt:
//!         Expects prompt content on the same source line as the keyword. The rest of the line,
//!         right-trimmed, is the prompt. If that rest is a lone `|` the prompt is a block
//!         literal. Moves back to Ready.
//!
//!     Between tokens whitespace and newlines are skipped. The line guard for ExpectModel and
//!     ExpectPrompt compares the line number before and after that skip: if it moved, the
//!     content did not start on the keyword's line. This holds when the skip ran into the end
//!     of input too. Input ending on the keyword's own line is a clean end of input; the parser
//!     reports the command as incomplete.
//!
//! Block Literals
//!
//!     After a lone `|`, following lines belong to the prompt while they start with an
//!     indentation at least 4 columns wide (a tab counts 4, a space counts 1). Exactly 4
//!     columns are consumed, the rest of the line right-trimmed is one content line. Lines
//!     holding only shallow whitespace are skipped. The first line that starts with content
//!     before reaching 4 columns ends the block and is left for the next token. Content lines
//!     are joined with `\n`. A block whose content lines are all blank counts as empty.
//!
//! Errors
//!
//!     Every error is fatal: the lexer records it, sets the current token to the terminal
//!     token for the failure and refuses to advance afterwards. See [LexError].
//!
//!     The input is read through [CharReader](reader::CharReader), which decodes UTF-8 from
//!     any `BufRead` one character at a time, so the whole source is never held in memory.

pub mod common;
pub mod lexer;
pub mod reader;

pub use common::{LexError, LexErrorKind, TokenSource};
pub use lexer::{Lexer, TAB_WIDTH};
pub use reader::CharReader;
