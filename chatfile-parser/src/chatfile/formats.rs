//! Output formats for tooling
//!
//! Traces of the token stream and of the command stream, and a dump of a compiled context.
//! Each trace comes in a simple line-oriented text form and a JSON form.
//!
//!     simple token trace:     one `{KIND "content" line:column}` per token, a blank line,
//!                             the error if any, then the token the lexer stopped at
//!     simple command trace:   one `NAME: ...` per command, then a blank line, the error and
//!                             the stop token if scanning failed
//!     dump:                   `Model: <model>` then one `ROLE: message` per turn

use crate::chatfile::commands::Command;
use crate::chatfile::context::{Context, Transcript};
use crate::chatfile::lexing::TokenSource;
use crate::chatfile::parsing::CommandScanner;
use crate::chatfile::token::Token;
use serde::Serialize;
use std::fmt::{self, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Simple,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFormat(pub String);

impl fmt::Display for InvalidFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown format '{}' (expected 'simple' or 'json')", self.0)
    }
}

impl std::error::Error for InvalidFormat {}

impl FromStr for TraceFormat {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(TraceFormat::Simple),
            "json" => Ok(TraceFormat::Json),
            other => Err(InvalidFormat(other.to_string())),
        }
    }
}

/// Everything a token source produced, plus how it stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenTrace {
    pub tokens: Vec<Token>,
    pub error: Option<String>,
    pub last: Token,
}

impl TokenTrace {
    pub fn collect<S: TokenSource>(source: &mut S) -> Self {
        let mut tokens = Vec::new();
        while source.advance() {
            tokens.push(source.current().clone());
        }
        TokenTrace {
            tokens,
            error: source.error().map(|e| e.to_string()),
            last: source.current().clone(),
        }
    }

    pub fn render(&self, format: TraceFormat) -> serde_json::Result<String> {
        match format {
            TraceFormat::Simple => {
                let mut out = String::new();
                for token in &self.tokens {
                    let _ = writeln!(out, "{}", token);
                }
                out.push('\n');
                if let Some(error) = &self.error {
                    let _ = writeln!(out, "{}", error);
                }
                let _ = writeln!(out, "{}", self.last);
                Ok(out)
            }
            TraceFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

/// Every command a scanner produced, plus the error it stopped on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandTrace {
    pub commands: Vec<Command>,
    pub error: Option<String>,
    pub stopped_at: Option<Token>,
}

impl CommandTrace {
    pub fn collect<S: TokenSource>(scanner: &mut CommandScanner<S>) -> Self {
        let mut commands = Vec::new();
        while scanner.scan() {
            if let Some(command) = scanner.command() {
                commands.push(command.clone());
            }
        }
        let error = scanner.err().map(|e| e.to_string());
        let stopped_at = error.as_ref().map(|_| scanner.source().current().clone());
        CommandTrace {
            commands,
            error,
            stopped_at,
        }
    }

    pub fn render(&self, format: TraceFormat) -> serde_json::Result<String> {
        match format {
            TraceFormat::Simple => {
                let mut out = String::new();
                for command in &self.commands {
                    let _ = writeln!(out, "{}", command);
                }
                if let Some(error) = &self.error {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "{}", error);
                    if let Some(token) = &self.stopped_at {
                        let _ = writeln!(out, "{}", token);
                    }
                }
                Ok(out)
            }
            TraceFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

/// Model and history of a compiled context. Multi-line messages start on their own line.
pub fn dump_context(context: &Context<Transcript>) -> String {
    let mut out = String::new();
    let model = context
        .current_model
        .as_ref()
        .map(|m| m.as_str())
        .unwrap_or("");
    let _ = writeln!(out, "Model: {}", model);
    for entry in context.history.iter() {
        if entry.message.contains('\n') {
            let _ = writeln!(out, "{}:\n{}", entry.role, entry.message);
        } else {
            let _ = writeln!(out, "{}: {}", entry.role, entry.message);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatfile::lexing::Lexer;
    use crate::chatfile::loader::compile_str;

    #[test]
    fn test_format_names() {
        assert_eq!("simple".parse::<TraceFormat>(), Ok(TraceFormat::Simple));
        assert_eq!("json".parse::<TraceFormat>(), Ok(TraceFormat::Json));
        assert!("xml".parse::<TraceFormat>().is_err());
    }

    #[test]
    fn test_token_trace_simple() {
        let trace = TokenTrace::collect(&mut Lexer::from_source("FROM gpt-4\n"));
        insta::assert_snapshot!(trace.render(TraceFormat::Simple).unwrap(), @r#"
{FROM "FROM" 1:1}
{MODEL "gpt-4" 1:6}

{<EOF> "" 2:1}
"#);
    }

    #[test]
    fn test_token_trace_with_error() {
        let trace = TokenTrace::collect(&mut Lexer::from_source("ASK\n"));
        assert_eq!(trace.tokens.len(), 1);
        assert_eq!(
            trace.error.as_deref(),
            Some("prompt must be on the same line as SYSTEM/ASK/ANSWER (2:1)")
        );
    }

    #[test]
    fn test_command_trace_simple() {
        let mut scanner = CommandScanner::new(Lexer::from_source("FROM m\nASK hi\nHMM\n"));
        let trace = CommandTrace::collect(&mut scanner);
        insta::assert_snapshot!(trace.render(TraceFormat::Simple).unwrap(), @r#"
FROM: m
PROMPT: USER "hi"

Lexing error: unknown token `HMM` at 3:1
{<UNKNOWN> "HMM" 3:1}
"#);
    }

    #[test]
    fn test_command_trace_json() {
        let mut scanner = CommandScanner::new(Lexer::from_source("ANSWER ok\n"));
        let trace = CommandTrace::collect(&mut scanner);
        let value: serde_json::Value =
            serde_json::from_str(&trace.render(TraceFormat::Json).unwrap()).unwrap();
        assert_eq!(value["commands"][0]["role"], "assistant");
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_dump_context() {
        let context = compile_str("FROM gpt-5\nSYSTEM |\n    one\n    two\nASK hi\n").unwrap();
        insta::assert_snapshot!(dump_context(&context), @r"
Model: gpt-5
SYSTEM:
one
two
USER: hi
");
    }
}
