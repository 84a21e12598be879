//! Veilchat - encrypted peer-to-peer chat over TCP.
//!
//! One side hosts, the other connects; the rest is symmetric.

use anyhow::Result;
use clap::{Parser, Subcommand};

use veilchat::commands::{CommandExecutor, ConnectCommand, HostCommand};

/// Veilchat - encrypted peer-to-peer chat
///
/// An RSA handshake transports a fresh AES-256 session key, then every
/// message is encrypted individually and framed over one TCP connection.
#[derive(Parser)]
#[command(name = "veilchat")]
#[command(version)]
#[command(about = "Encrypted peer-to-peer chat over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a chat session: listen for one inbound connection
    Host(HostCommand),

    /// Connect to a hosting peer
    Connect(ConnectCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Host(cmd) => cmd.execute(),
        Commands::Connect(cmd) => cmd.execute(),
    }
}
