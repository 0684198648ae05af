//! Command parser

use super::common::ParseError;
use crate::chatfile::commands::{Command, FromCommand, PromptCommand};
use crate::chatfile::context::Role;
use crate::chatfile::lexing::TokenSource;
use crate::chatfile::token::TokenKind;

/// Parse a single command from the token source.
///
/// Returns `Ok(None)` when the source ended cleanly before a new command started.
pub fn parse_command<S: TokenSource + ?Sized>(
    source: &mut S,
) -> Result<Option<Command>, ParseError> {
    if !source.advance() {
        return match source.error() {
            Some(err) => Err(ParseError::Lex(err.clone())),
            None => Ok(None),
        };
    }

    match source.current().kind {
        TokenKind::From => parse_from(source).map(Some),
        TokenKind::System | TokenKind::Ask | TokenKind::Answer => parse_prompt(source).map(Some),
        _ => {
            let token = source.current().clone();
            Err(pending_or(source, ParseError::ExpectedCommandToken { token }))
        }
    }
}

fn parse_from<S: TokenSource + ?Sized>(source: &mut S) -> Result<Command, ParseError> {
    assert_current(source, TokenKind::From);

    if !source.advance() {
        return Err(pending_or(
            source,
            ParseError::CommandIncomplete {
                keyword: TokenKind::From,
            },
        ));
    }

    assert_current(source, TokenKind::Model);
    Ok(Command::From(FromCommand::new(source.current().content.clone())))
}

fn parse_prompt<S: TokenSource + ?Sized>(source: &mut S) -> Result<Command, ParseError> {
    let keyword = source.current().kind;
    let role = match keyword {
        TokenKind::System => Role::System,
        TokenKind::Ask => Role::User,
        TokenKind::Answer => Role::Assistant,
        other => panic!("invalid parsing state: {} does not introduce a prompt", other),
    };

    if !source.advance() {
        return Err(pending_or(source, ParseError::CommandIncomplete { keyword }));
    }

    assert_current(source, TokenKind::Prompt);
    Ok(Command::Prompt(PromptCommand::new(
        role,
        source.current().content.clone(),
    )))
}

/// The token source's own error wins over the parser's.
fn pending_or<S: TokenSource + ?Sized>(source: &S, fallback: ParseError) -> ParseError {
    match source.error() {
        Some(err) => ParseError::Lex(err.clone()),
        None => fallback,
    }
}

fn assert_current<S: TokenSource + ?Sized>(source: &S, expected: TokenKind) {
    let found = source.current().kind;
    assert!(
        found == expected,
        "invalid parsing state: expected {}, found {}",
        expected,
        found
    );
}
