//! The synchronous handshake: public-key exchange and session-key transport.
//!
//! Both sides send their public key as a frame, then read the peer's. The
//! host then generates the session key, wraps it under the peer's public
//! key and sends it; the connector unwraps it with its own private key.
//! The ordering is fixed by connection role, never negotiated.
//!
//! Any failure here is fatal: no degraded handshake state is tolerated, the
//! connection is simply unusable without a valid session key.
//!
//! Trust model: any presented public key is accepted. The fingerprint is
//! printed so users can compare keys out of band, but nothing verifies it.

use crate::crypto::{
    fingerprint, import_public, unwrap_session_key, wrap_session_key, Keypair, SecureChannel,
    SessionKey,
};
use crate::error::ChatError;
use crate::transport::Connection;

/// Connection role. The host accepts the TCP connection and distributes the
/// session key; the connector initiates the connection and receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Accepted the inbound connection; generates and wraps the session key.
    Host,
    /// Initiated the connection; unwraps the received session key.
    Connector,
}

/// Runs the handshake over an established connection and returns the keyed
/// channel for the steady-state session.
pub async fn perform_handshake(
    conn: &mut Connection,
    keypair: &Keypair,
    role: Role,
) -> Result<SecureChannel, ChatError> {
    // Both sides send first, then read. The key frames are small enough
    // that neither write can block on the other side draining its socket.
    conn.send_frame(keypair.export_public().as_bytes()).await?;

    let peer_pem = conn.recv_frame().await?;
    let peer_public = import_public(&peer_pem)?;
    println!("Peer key fingerprint: {}", fingerprint(&peer_public));

    let session_key = match role {
        Role::Host => {
            let key = SessionKey::generate();
            let wrapped = wrap_session_key(&peer_public, &key)?;
            conn.send_frame(&wrapped).await?;
            key
        }
        Role::Connector => {
            let wrapped = conn.recv_frame().await?;
            unwrap_session_key(keypair, &wrapped)?
        }
    };

    Ok(SecureChannel::with_key(session_key))
}
