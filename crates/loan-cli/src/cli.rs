use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "loanledger",
    about = "Peer-to-peer loan marketplace ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Invoke a contract operation against a local state file
    Invoke(InvokeArgs),
    /// List operations and their parameters
    Operations,
    /// Start the HTTP gateway
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InvokeArgs {
    pub function: String,
    /// Positional arguments; put them after `--` if any begins with a hyphen
    pub args: Vec<String>,
    /// JSON snapshot holding ledger state; created on first successful write
    #[arg(long, default_value = "ledger-state.json")]
    pub state: PathBuf,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML gateway configuration
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub state: Option<PathBuf>,
}
