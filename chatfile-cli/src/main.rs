//! Command-line interface for chatfile
//! This binary inspects chatfiles and turns them into chat-completion requests.
//!
//! Usage:
//!   chatfile tokens `<path>` [--format `<format>`]     - Print the token trace
//!   chatfile commands `<path>` [--format `<format>`]   - Print the command trace
//!   chatfile dump `<path>`                             - Print the compiled model and history
//!   chatfile request `<path>` [--seed N] [--temperature T] [--load-as-model NAME=PATH]...
//!                                                      - Print the request body as JSON
//!
//! Every subcommand accepts `--config <path>` and `--verbose`. Logs go to stderr and are
//! filtered by `CHATFILE_LOG`.

use chatfile_config::{ChatfileConfig, Loader, OutputFormat};
use chatfile_parser::chatfile::formats::{dump_context, CommandTrace, TokenTrace, TraceFormat};
use chatfile_parser::chatfile::request::{ChatRequest, RequestParams};
use chatfile_parser::chatfile::substitution::{substitute_models, ModelFiles};
use chatfile_parser::chatfile::{compile_file, CommandScanner, Lexer};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();

    let (name, sub) = match matches.subcommand() {
        Some(found) => found,
        None => fail("a subcommand is required (tokens, commands, dump, request)"),
    };

    init_tracing(sub.get_flag("verbose"));

    let config =
        load_config(sub).unwrap_or_else(|e| fail(format!("loading configuration: {}", e)));
    debug!(subcommand = name, ?config, "configuration loaded");

    match name {
        "tokens" => handle_tokens_command(sub, &config),
        "commands" => handle_commands_command(sub, &config),
        "dump" => handle_dump_command(sub),
        "request" => handle_request_command(sub, &config),
        other => fail(format!("unknown subcommand '{}'", other)),
    }
}

fn build_cli() -> Command {
    let path_arg = || {
        Arg::new("path")
            .help("Path to the chatfile")
            .required(true)
            .index(1)
    };
    let format_arg = || {
        Arg::new("format")
            .long("format")
            .short('f')
            .help("Trace format (default: output.format from the configuration)")
            .value_parser(["simple", "json"])
    };

    Command::new("chatfile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting chatfiles and building chat requests from them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults and ./chatfile.toml"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log debug output to stderr unless CHATFILE_LOG is set")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print every token of a chatfile")
                .arg(path_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("commands")
                .about("Print every command of a chatfile")
                .arg(path_arg())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("dump")
                .about("Print the model and history a chatfile compiles to")
                .arg(path_arg()),
        )
        .subcommand(
            Command::new("request")
                .about("Print the chat-completion request body for a chatfile")
                .arg(path_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Sampling seed sent with the request")
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("temperature")
                        .long("temperature")
                        .help("Sampling temperature sent with the request")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("load-as-model")
                        .long("load-as-model")
                        .value_name("NAME=PATH")
                        .help("Use the chatfile at PATH wherever NAME is selected as the model")
                        .action(ArgAction::Append),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("CHATFILE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Layer defaults, `./chatfile.toml`, `--config` and the request flags, in that order.
fn load_config(sub: &ArgMatches) -> Result<ChatfileConfig, chatfile_config::Error> {
    let mut loader = Loader::new().with_local_file();
    if let Some(path) = sub.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Ok(Some(seed)) = sub.try_get_one::<i64>("seed") {
        loader = loader.set_override("request.seed", *seed)?;
    }
    if let Ok(Some(temperature)) = sub.try_get_one::<f64>("temperature") {
        loader = loader.set_override("request.temperature", *temperature)?;
    }
    loader.build()
}

fn trace_format(sub: &ArgMatches, config: &ChatfileConfig) -> TraceFormat {
    match sub.get_one::<String>("format") {
        Some(name) => name
            .parse()
            .unwrap_or_else(|e| fail(format!("invalid format: {}", e))),
        None => match config.output.format {
            OutputFormat::Simple => TraceFormat::Simple,
            OutputFormat::Json => TraceFormat::Json,
        },
    }
}

fn path_of(sub: &ArgMatches) -> &str {
    match sub.get_one::<String>("path") {
        Some(path) => path.as_str(),
        None => fail("a chatfile path is required"),
    }
}

fn open_chatfile(path: &str) -> BufReader<File> {
    match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(e) => fail(format!("opening '{}': {}", path, e)),
    }
}

/// Print a rendered trace; a trace that stopped on an error exits with status 1.
fn print_trace(rendered: serde_json::Result<String>, failed: bool) {
    let output = rendered.unwrap_or_else(|e| fail(format!("formatting output: {}", e)));
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
    if failed {
        let _ = io::stdout().flush();
        process::exit(1);
    }
}

fn handle_tokens_command(sub: &ArgMatches, config: &ChatfileConfig) {
    let format = trace_format(sub, config);
    let mut lexer = Lexer::new(open_chatfile(path_of(sub)));
    let trace = TokenTrace::collect(&mut lexer);
    print_trace(trace.render(format), trace.error.is_some());
}

fn handle_commands_command(sub: &ArgMatches, config: &ChatfileConfig) {
    let format = trace_format(sub, config);
    let mut scanner = CommandScanner::new(Lexer::new(open_chatfile(path_of(sub))));
    let trace = CommandTrace::collect(&mut scanner);
    print_trace(trace.render(format), trace.error.is_some());
}

fn handle_dump_command(sub: &ArgMatches) {
    let context = compile_file(path_of(sub)).unwrap_or_else(|e| fail(e));
    print!("{}", dump_context(&context));
}

fn handle_request_command(sub: &ArgMatches, config: &ChatfileConfig) {
    let mut context = compile_file(path_of(sub)).unwrap_or_else(|e| fail(e));

    let mut models: ModelFiles = config
        .models
        .iter()
        .map(|entry| (entry.name.clone(), entry.path.clone()))
        .collect();
    for assignment in sub.get_many::<String>("load-as-model").into_iter().flatten() {
        let (name, path) = ModelFiles::parse_assignment(assignment).unwrap_or_else(|e| fail(e));
        models.insert(name, path);
    }

    let spliced = substitute_models(&mut context, &models).unwrap_or_else(|e| fail(e));
    debug!(spliced, "model substitution done");

    let params = RequestParams {
        seed: config.request.seed,
        temperature: config.request.temperature,
        stream: config.request.stream,
    };
    let request = ChatRequest::from_context(&context, params).unwrap_or_else(|e| fail(e));
    let json = request
        .to_json_pretty()
        .unwrap_or_else(|e| fail(format!("formatting request: {}", e)));
    println!("{}", json);
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}
