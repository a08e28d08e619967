//! Entry point: parses arguments, wires up logging, installs a Ctrl-C
//! handler that maps to the conventional 130 exit code, and dispatches to
//! a subcommand handler.

mod args;
mod commands;
mod output;

use clap::Parser;
use std::process::ExitCode;

fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    init_tracing(cli.verbose);

    ctrlc::set_handler(|| {
        std::process::exit(130);
    })
    .expect("installing Ctrl-C handler");

    match commands::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
