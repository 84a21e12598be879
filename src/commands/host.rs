//! Host command: listen for one inbound connection and chat.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::CommandExecutor;
use crate::crypto::{fingerprint, Keypair};
use crate::handshake::{perform_handshake, Role};
use crate::session::{run_session, EXIT_TOKEN};
use crate::transport::Listener;
use crate::DEFAULT_PORT;

/// Host a chat session: bind, accept one connection, distribute the
/// session key.
#[derive(Args, Debug)]
pub struct HostCommand {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl CommandExecutor for HostCommand {
    fn execute(&self) -> Result<()> {
        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        rt.block_on(async {
            println!("Generating RSA keypair...");
            let keypair = Keypair::generate();
            println!("Your key fingerprint: {}", fingerprint(keypair.public_key()));

            let listener = Listener::bind(("0.0.0.0", self.port))
                .await
                .with_context(|| format!("Failed to bind port {}", self.port))?;
            println!("Listening on port {}...", self.port);

            let mut conn = listener
                .accept()
                .await
                .context("Failed to accept connection")?;
            println!("Connected to {}", conn.peer_addr());

            println!("Starting secure handshake...");
            let channel = perform_handshake(&mut conn, &keypair, Role::Host)
                .await
                .context("Handshake failed")?;
            println!("Secure channel established. Type '{}' to quit.", EXIT_TOKEN);

            run_session(conn, channel)
                .await
                .context("Session ended with an error")
        })
    }
}
