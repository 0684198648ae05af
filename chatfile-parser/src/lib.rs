//! # chatfile
//!
//! A parser for the chatfile format.
//!
//! File Layout
//!
//! The library follows the pipeline the format is processed by, leaves first:
//! src/chatfile
//!   ├── token       Token kinds and keyword recognition
//!   ├── lexing      Character reader and the stateful lexer
//!   ├── parsing     Command parser and the pull-based scanner
//!   ├── commands    FROM and prompt commands
//!   ├── context     Model name, roles, history sinks and the context accumulator
//!   └── <tooling>   Loading, model substitution, request building, traces
//!
//! For testing helpers, see the [testing module](chatfile::testing).

#![allow(rustdoc::invalid_html_tags)]

pub mod chatfile;
