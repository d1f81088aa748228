//! Command-line host for the degradation controller.
//!
//! `tierguard invoke` runs one invocation against the file-backed store and
//! prints the response document; `tierguard show` prints the stored record.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tierguard::logging::init_logging;
use tierguard::outcome::RequestBody;
use tierguard::{handle, ControllerConfig, HandlerEnv, Request, StateStore};

#[derive(Parser)]
#[command(name = "tierguard", version, about = "Three-level degradation controller")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one invocation and print the response
    Invoke {
        /// Raw request body, e.g. '{"error":true}'
        #[arg(long, conflicts_with = "event")]
        body: Option<String>,

        /// Event document file ({"body": ...}); "-" reads stdin
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Print the stored health record for the configured service
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ControllerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("tierguard: {err}");
            return ExitCode::from(2);
        }
    };
    init_logging(config.log_format);

    let env = HandlerEnv::from_config(config);

    match cli.command {
        Command::Invoke { body, event } => {
            let request = match read_request(body, event) {
                Ok(request) => request,
                Err(err) => {
                    tracing::error!(error = %err, "failed to read event");
                    return ExitCode::from(2);
                }
            };
            let response = handle(&env, request).await;
            print_json(&response)
        }
        Command::Show => match env.store.load(&env.config.service_id) {
            Ok(state) => print_json(&state),
            Err(err) => {
                tracing::error!(error = %err, "failed to load health record");
                ExitCode::FAILURE
            }
        },
    }
}

fn read_request(body: Option<String>, event: Option<PathBuf>) -> std::io::Result<Request> {
    if let Some(body) = body {
        return Ok(Request::new(Some(RequestBody::Text(body))));
    }

    let raw = match event {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        Some(_) => read_stdin()?,
        None => return Ok(Request::default()),
    };

    // An unreadable event is treated like a request without a body.
    Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "event is not a request document");
        Request::default()
    }))
}

fn read_stdin() -> std::io::Result<String> {
    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;
    Ok(raw)
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to encode output");
            ExitCode::FAILURE
        }
    }
}
