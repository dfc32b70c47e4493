//! Purpose: `playgrounds` CLI entry point.
//! Role: Binary crate root; parses args, runs one walkthrough, prints its transcript.
//! Invariants: Transcripts go to stdout; logs and errors go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use color_json::{Paint, colorize_json, inline_value, paint};
use playgrounds::core::error::{Error, ErrorKind, to_exit_code};
use playgrounds::net::ClientStyle;
use playgrounds::transcript::{Entry, EntryKind, Transcript, entry_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let default_level = match cli.command {
        Command::Echo { .. } => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    let output = Output {
        color: cli.color,
        format: cli.format,
    };
    command_dispatch::dispatch_command(cli.command, cli.resources, output)
        .map_err(|err| (err, cli.color))
}

#[derive(Parser)]
#[command(
    name = "playgrounds",
    version,
    about = "Runnable walkthroughs of Rust basics, file I/O, JSON and HTTP clients",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Each command runs one walkthrough from top to bottom and prints every step.
Failed steps are printed with their error and the walkthrough keeps going.
"#,
    after_help = r#"EXAMPLES
  $ playgrounds basics
  $ playgrounds files --workdir /tmp/scratch
  $ playgrounds json --format jsonl
  $ playgrounds net --local --client fluent
  $ playgrounds echo --bind 127.0.0.1:8080

LEARN MORE
  $ playgrounds <command> --help
  RUST_LOG=debug playgrounds net --local    # show request logs on stderr"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        global = true,
        help = "Colorize terminal output: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        global = true,
        help = "Transcript format: auto (human on a terminal, jsonl otherwise)|human|jsonl"
    )]
    format: OutputFormat,
    #[arg(
        long,
        global = true,
        help = "Directory holding bundled resources (default: $PLAYGROUNDS_RESOURCES, then ./resources)",
        value_hint = ValueHint::DirPath
    )]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Auto,
    Human,
    Jsonl,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ClientArg {
    Raw,
    Fluent,
    Mini,
    All,
}

impl ClientArg {
    fn styles(self) -> Vec<ClientStyle> {
        match self {
            ClientArg::Raw => vec![ClientStyle::Raw],
            ClientArg::Fluent => vec![ClientStyle::Fluent],
            ClientArg::Mini => vec![ClientStyle::Mini],
            ClientArg::All => ClientStyle::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Walk through constants, collections, control flow, optionals and closures",
        after_help = r#"EXAMPLES
  $ playgrounds basics
  $ playgrounds basics --format jsonl | grep closures"#
    )]
    Basics,
    #[command(
        about = "Walk through paths, listing, walking, copy/move/delete and temp files",
        long_about = r#"Walk through file-system work: path manipulation, special directories,
inspection, directory listing and walking, copy/move/delete, temp files and
bundled resources. Files are created under --workdir (a fresh temp dir by
default) and removed again before the walkthrough ends."#,
        after_help = r#"EXAMPLES
  $ playgrounds files
  $ playgrounds files --workdir ./scratch --walk ~/src --list /usr/bin"#
    )]
    Files {
        #[arg(long, help = "Directory for created files (default: a fresh temp dir)", value_hint = ValueHint::DirPath)]
        workdir: Option<PathBuf>,
        #[arg(long, help = "Tree to walk (default: the documents directory)", value_hint = ValueHint::DirPath)]
        walk: Option<PathBuf>,
        #[arg(long, help = "Directory to list (default: the applications directory)", value_hint = ValueHint::DirPath)]
        list: Option<PathBuf>,
    },
    #[command(
        about = "Walk through typed and dynamic JSON decoding and serialization",
        after_help = r#"EXAMPLES
  $ playgrounds json
  $ playgrounds json --input people.json"#
    )]
    Json {
        #[arg(long, help = "Large document to read instead of the bundled test.json", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    #[command(
        about = "Walk through GET, basic auth and POST with three HTTP client styles",
        long_about = r#"Send the same three requests (GET, basic-auth GET, POST with a JSON body)
through a raw session, a fluent client and a minimalist client.

Requests go to httpbin.org unless --base-url, PLAYGROUNDS_ECHO_URL or --local
says otherwise. --local starts an in-process echo server on a loopback port."#,
        after_help = r#"EXAMPLES
  $ playgrounds net --local
  $ playgrounds net --client mini --timeout 5s
  $ playgrounds net --base-url http://127.0.0.1:8080"#
    )]
    Net {
        #[arg(
            long,
            help = "Echo service base URL (default: $PLAYGROUNDS_ECHO_URL, then http://httpbin.org)",
            conflicts_with = "local",
            value_hint = ValueHint::Url
        )]
        base_url: Option<String>,
        #[arg(long, help = "Run against an in-process echo server")]
        local: bool,
        #[arg(long, value_enum, default_value = "all", help = "Client style: raw|fluent|mini|all")]
        client: ClientArg,
        #[arg(long, help = "Per-request timeout (e.g. 500ms, 10s)")]
        timeout: Option<String>,
    },
    #[command(
        about = "Serve the httpbin-compatible echo endpoints in the foreground",
        after_help = r#"EXAMPLES
  $ playgrounds echo
  $ playgrounds echo --bind 127.0.0.1:9000 &
  $ playgrounds net --base-url http://127.0.0.1:9000"#
    )]
    Echo {
        #[arg(long, default_value = "127.0.0.1:8080", help = "Address to listen on")]
        bind: String,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Copy, Clone, Debug)]
struct Output {
    color: ColorMode,
    format: OutputFormat,
}

impl Output {
    fn human(self) -> bool {
        match self.format {
            OutputFormat::Human => true,
            OutputFormat::Jsonl => false,
            OutputFormat::Auto => io::stdout().is_terminal(),
        }
    }

    fn use_color(self) -> bool {
        self.color.use_color(io::stdout().is_terminal())
    }
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_bind(raw: &str) -> Result<SocketAddr, Error> {
    raw.parse().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid bind address '{raw}'"))
            .with_hint("Use a host:port value like 127.0.0.1:8080.")
    })
}

fn emit_transcript(transcript: &Transcript, output: Output) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_err = |err: io::Error| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write transcript")
            .with_source(err)
    };
    if output.human() {
        let use_color = output.use_color();
        let mut section: Option<&str> = None;
        for entry in transcript.entries() {
            if section != Some(entry.section.as_str()) {
                if section.is_some() {
                    writeln!(out).map_err(write_err)?;
                }
                let header = format!("== {} ==", entry.section);
                writeln!(out, "{}", paint(&header, Paint::Section, use_color))
                    .map_err(write_err)?;
                section = Some(entry.section.as_str());
            }
            writeln!(out, "{}", human_line(entry, use_color)).map_err(write_err)?;
        }
    } else {
        for entry in transcript.entries() {
            let line = serde_json::to_string(&entry_json(entry)).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode transcript entry")
                    .with_source(err)
            })?;
            writeln!(out, "{line}").map_err(write_err)?;
        }
    }
    out.flush().map_err(write_err)
}

fn human_line(entry: &Entry, use_color: bool) -> String {
    match entry.kind {
        EntryKind::Note => format!("// {}", entry.value.as_str().unwrap_or_default()),
        EntryKind::Value => format!(
            "{} {}",
            paint(&format!("{}:", entry.label), Paint::Label, use_color),
            inline_value(&entry.value, use_color)
        ),
        EntryKind::Error => {
            let mut line = format!(
                "{} {}",
                paint(&format!("{}:", entry.label), Paint::Error, use_color),
                entry.value["message"]
                    .as_str()
                    .or_else(|| entry.value["kind"].as_str())
                    .unwrap_or("error")
            );
            for field in ["path", "url", "cause"] {
                if let Some(text) = entry.value[field].as_str() {
                    line.push_str(&format!(
                        "\n  {} {text}",
                        paint(&format!("{field}:"), Paint::Hint, use_color)
                    ));
                }
            }
            line
        }
    }
}

fn emit_version_output(output: Output) {
    if output.human() {
        println!("playgrounds {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "playgrounds",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            output,
        );
    }
}

fn emit_json(value: Value, output: Output) {
    let json = if output.human() {
        colorize_json(&value, output.use_color())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::AlreadyExists => "already exists".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Network => "network error".to_string(),
        ErrorKind::Decode => "decode error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(url) = err.url() {
        inner.insert("url".to_string(), json!(url));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        paint("error:", Paint::Error, use_color),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", paint("hint:", Paint::Hint, use_color)));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            paint("path:", Paint::Hint, use_color),
            path.display()
        ));
    }
    if let Some(url) = err.url() {
        lines.push(format!("{} {url}", paint("url:", Paint::Hint, use_color)));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            paint("caused by:", Paint::Hint, use_color)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);
    let Some(usage) = usage else {
        return "Try `playgrounds --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "playgrounds") else {
        return "Try `playgrounds --help`.".to_string();
    };
    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();
    if parts.is_empty() {
        return "Try `playgrounds --help`.".to_string();
    }
    format!("Try `playgrounds {} --help`.", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::{Cli, ClientArg, Command, error_json, human_line, parse_bind};
    use clap::Parser;
    use playgrounds::core::error::{Error, ErrorKind};
    use playgrounds::transcript::Transcript;
    use serde_json::json;

    #[test]
    fn net_flags_parse() {
        let cli = Cli::try_parse_from([
            "playgrounds",
            "net",
            "--local",
            "--client",
            "mini",
            "--timeout",
            "2s",
        ])
        .expect("parse");
        match cli.command {
            Command::Net {
                local,
                client,
                timeout,
                ..
            } => {
                assert!(local);
                assert_eq!(client, ClientArg::Mini);
                assert_eq!(timeout.as_deref(), Some("2s"));
            }
            _ => panic!("expected net"),
        }
    }

    #[test]
    fn base_url_conflicts_with_local() {
        let err = Cli::try_parse_from([
            "playgrounds",
            "net",
            "--local",
            "--base-url",
            "http://example.com",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn bind_must_be_socket_addr() {
        assert!(parse_bind("127.0.0.1:0").is_ok());
        let err = parse_bind("localhost").expect_err("bind");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn error_envelope_carries_url_and_causes() {
        let err = Error::new(ErrorKind::Network)
            .with_message("request failed")
            .with_url("http://127.0.0.1:9/get")
            .with_source(std::io::Error::other("connection refused"));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Network");
        assert_eq!(value["error"]["url"], "http://127.0.0.1:9/get");
        assert_eq!(value["error"]["causes"], json!(["connection refused"]));
    }

    #[test]
    fn human_lines_by_kind() {
        let mut transcript = Transcript::new("basics");
        transcript.section("conditionals");
        transcript.value("if", "RIGHT!!");
        transcript.note("only runs once");
        transcript.error(
            "copy",
            &Error::new(ErrorKind::AlreadyExists)
                .with_message("destination exists")
                .with_path("/tmp/x"),
        );
        let lines: Vec<String> = transcript
            .entries()
            .iter()
            .map(|entry| human_line(entry, false))
            .collect();
        assert_eq!(lines[0], "if: RIGHT!!");
        assert_eq!(lines[1], "// only runs once");
        assert_eq!(lines[2], "copy: destination exists\n  path: /tmp/x");
    }
}
