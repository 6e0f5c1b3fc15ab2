//! `task-board` binary.
//!
//! A thin wrapper: parse arguments, set up logging, then hand off to the
//! library.

use std::process::ExitCode;

use clap::Parser;
use task_board::cli::{self, Cli, Command, ServeArgs};
use task_board::config::COMMAND_LOG_FILTER;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let output = match cli.command.unwrap_or_default() {
        Command::Serve(args) => return run_server(&args),
        Command::CheckTemplates(args) => {
            init_tracing(COMMAND_LOG_FILTER);
            cli::check_templates(args.templates.as_deref())
        }
        Command::Task(command) => {
            init_tracing(COMMAND_LOG_FILTER);
            match cli::open_service(command.database_args()) {
                Ok(service) => cli::run(command, &service),
                Err(e) => {
                    eprintln!("Error opening task database: {e}");
                    return ExitCode::from(1);
                }
            }
        }
    };

    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }
    output.exit_code
}

fn run_server(args: &ServeArgs) -> ExitCode {
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::from(1);
        }
    };
    init_tracing(&config.log_filter);
    tracing::info!(version = task_board::VERSION, "Starting task-board");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!(%error, "Failed to create tokio runtime");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(task_board::server::serve(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "Server error");
            ExitCode::from(1)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the configured filter.
fn init_tracing(fallback: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
