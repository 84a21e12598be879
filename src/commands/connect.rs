//! Connect command: reach a hosting peer and chat.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::CommandExecutor;
use crate::crypto::{fingerprint, Keypair};
use crate::error::ChatError;
use crate::handshake::{perform_handshake, Role};
use crate::session::{run_session, EXIT_TOKEN};
use crate::transport::Connection;
use crate::DEFAULT_PORT;

/// Connect to a hosting peer and receive the session key.
#[derive(Args, Debug)]
pub struct ConnectCommand {
    /// Host to connect to (e.g. 127.0.0.1)
    pub host: String,

    /// Port the peer is listening on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl CommandExecutor for ConnectCommand {
    fn execute(&self) -> Result<()> {
        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        rt.block_on(async {
            println!("Generating RSA keypair...");
            let keypair = Keypair::generate();
            println!("Your key fingerprint: {}", fingerprint(keypair.public_key()));

            let addr = format!("{}:{}", self.host, self.port);
            println!("Connecting to {}...", addr);

            // A refused or unreachable peer is reported, not a crash; there
            // is no retry.
            let mut conn = match Connection::connect(&addr).await {
                Ok(conn) => conn,
                Err(err @ ChatError::ConnectFailed { .. }) => {
                    eprintln!("{}", err);
                    return Ok(());
                }
                Err(err) => return Err(err.into()),
            };

            println!("Starting secure handshake...");
            let channel = perform_handshake(&mut conn, &keypair, Role::Connector)
                .await
                .context("Handshake failed")?;
            println!("Secure channel established. Type '{}' to quit.", EXIT_TOKEN);

            run_session(conn, channel)
                .await
                .context("Session ended with an error")
        })
    }
}
