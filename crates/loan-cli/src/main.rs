use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

mod cli;
mod commands;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    let level = match (&cli.command, cli.verbose) {
        (_, true) => Level::DEBUG,
        (cli::Command::Serve(_), false) => Level::INFO,
        _ => Level::WARN,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    commands::run_command(cli)
}
