//! Integration tests over the sample chatfiles
//!
//! These tests run the full pipeline (lexer, scanner, context) over the files in
//! `tests/samples`, using snapshot testing to catch regressions.

use chatfile_parser::chatfile::formats::{dump_context, CommandTrace, TokenTrace, TraceFormat};
use chatfile_parser::chatfile::lexing::Lexer;
use chatfile_parser::chatfile::parsing::CommandScanner;
use chatfile_parser::chatfile::{compile_file, LoaderError, ModelName};
use std::fs;
use std::path::PathBuf;

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("samples")
        .join(name)
}

/// Helper function to read sample content
fn read_sample(name: &str) -> String {
    fs::read_to_string(sample_path(name)).expect("Failed to read sample chatfile")
}

#[test]
fn test_basic_tokens() {
    let source = read_sample("basic.chatfile");
    let trace = TokenTrace::collect(&mut Lexer::from_source(&source));

    insta::assert_snapshot!(trace.render(TraceFormat::Simple).unwrap(), @r#"
{FROM "FROM" 1:1}
{MODEL "gpt-4o" 1:6}
{SYSTEM "SYSTEM" 3:1}
{PROMPT "You are a helpful assistant." 3:8}
{ASK "ASK" 4:1}
{PROMPT "what time is it?" 4:5}
{ANSWER "ANSWER" 5:1}
{PROMPT "It is noon." 5:8}

{<EOF> "" 6:1}
"#);
}

#[test]
fn test_block_commands() {
    let source = read_sample("block.chatfile");
    let mut scanner = CommandScanner::new(Lexer::from_source(&source));
    let trace = CommandTrace::collect(&mut scanner);

    insta::assert_snapshot!(trace.render(TraceFormat::Simple).unwrap(), @r#"
FROM: gpt-4
PROMPT: SYSTEM "You review Rust code.\nBe concise.\nPoint out unsafe code."
PROMPT: USER "fn main() {\n    println!(\"hi\");\n}"
PROMPT: ASSISTANT "Looks fine."
"#);
}

#[test]
fn test_block_dump_from_file() {
    let context = compile_file(sample_path("block.chatfile")).unwrap();

    insta::assert_snapshot!(dump_context(&context), @r#"
Model: gpt-4
SYSTEM:
You review Rust code.
Be concise.
Point out unsafe code.
USER:
fn main() {
    println!("hi");
}
ASSISTANT: Looks fine.
"#);
}

#[test]
fn test_sequencing_dump() {
    let context = compile_file(sample_path("sequencing.chatfile")).unwrap();
    assert_eq!(context.current_model, Some(ModelName::from("gpt-5")));

    insta::assert_snapshot!(dump_context(&context), @r"
Model: gpt-5
USER: hi
ASSISTANT: hello
");
}

#[test]
fn test_unknown_keyword_trace() {
    let source = read_sample("unknown.chatfile");
    let mut scanner = CommandScanner::new(Lexer::from_source(&source));
    let trace = CommandTrace::collect(&mut scanner);

    insta::assert_snapshot!(trace.render(TraceFormat::Simple).unwrap(), @r#"
FROM: gpt-4

Lexing error: unknown token `MAYBE` at 2:1
{<UNKNOWN> "MAYBE" 2:1}
"#);
}

#[test]
fn test_unknown_keyword_fails_compile() {
    let err = compile_file(sample_path("unknown.chatfile")).unwrap_err();
    assert!(matches!(err, LoaderError::ParseError(_)));
}
