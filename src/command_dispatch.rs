//! Purpose: Hold top-level CLI command dispatch for `playgrounds`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Walkthrough failures are printed as transcript entries; only setup errors exit non-zero.

use super::*;

use playgrounds::config::TourConfig;
use playgrounds::files::bundle::Bundle;
use playgrounds::files::special::DirEnv;
use playgrounds::files::{self, FilesTour};
use playgrounds::json::{self, JsonTour};
use playgrounds::net::echo::EchoServer;
use playgrounds::net::{self, NetTour};
use playgrounds::basics;

pub(super) fn dispatch_command(
    command: Command,
    resources: Option<PathBuf>,
    output: Output,
) -> Result<RunOutcome, Error> {
    let config = TourConfig::from_env().with_resources(resources);
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "playgrounds", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(output);
            Ok(RunOutcome::ok())
        }
        Command::Basics => {
            emit_transcript(&basics::tour(), output)?;
            Ok(RunOutcome::ok())
        }
        Command::Files {
            workdir,
            walk,
            list,
        } => {
            // Held until the tour returns so the default workdir is removed afterwards.
            let scratch;
            let workdir = match workdir {
                Some(dir) => dir,
                None => {
                    scratch = tempfile::Builder::new()
                        .prefix("playgrounds-files-")
                        .tempdir()
                        .map_err(|err| {
                            Error::new(ErrorKind::Io)
                                .with_message("failed to create scratch directory")
                                .with_source(err)
                        })?;
                    scratch.path().to_path_buf()
                }
            };
            if !workdir.is_dir() {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message("workdir is not a directory")
                    .with_path(&workdir)
                    .with_hint("Create it first or omit --workdir to use a temp dir."));
            }
            let tour = FilesTour {
                workdir,
                list_dir: list,
                walk_root: walk,
                env: DirEnv::from_process(),
                bundle: Bundle::main(config.resources.as_deref()),
            };
            emit_transcript(&files::tour(&tour), output)?;
            Ok(RunOutcome::ok())
        }
        Command::Json { input } => {
            let tour = JsonTour {
                bundle: Bundle::main(config.resources.as_deref()),
                input,
            };
            emit_transcript(&json::tour(&tour), output)?;
            Ok(RunOutcome::ok())
        }
        Command::Net {
            base_url,
            local,
            client,
            timeout,
        } => {
            let config = config
                .with_echo_url(base_url)
                .with_timeout(timeout.as_deref())?;
            let local_server = if local {
                let server = EchoServer::bind(parse_bind("127.0.0.1:0")?)?;
                Some(server.spawn()?)
            } else {
                None
            };
            let tour = NetTour {
                base_url: local_server
                    .as_ref()
                    .map(|handle| handle.base_url())
                    .unwrap_or(config.echo_url),
                clients: client.styles(),
                timeout: config.timeout,
            };
            let transcript = net::tour(&tour);
            if let Some(handle) = local_server {
                handle.shutdown()?;
            }
            emit_transcript(&transcript, output)?;
            Ok(RunOutcome::ok())
        }
        Command::Echo { bind } => {
            let server = EchoServer::bind(parse_bind(&bind)?)?;
            if io::stderr().is_terminal() {
                eprintln!(
                    "echo server on {} (Ctrl-C to stop)",
                    server.base_url()
                );
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(server.serve())?;
            Ok(RunOutcome::ok())
        }
    }
}
