//! Central fatal error type for veilchat.
//!
//! [`ChatError`] covers failures that abort a handshake or end a session.
//! Per-message decrypt failures are non-fatal and live in a separate type
//! ([`crate::crypto::DecryptFailure`]) so the two severities cannot be
//! conflated.

use thiserror::Error;

/// Errors that are fatal to a handshake or an active session.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A peer's public key (PEM) could not be parsed.
    #[error("malformed public key: {0}")]
    MalformedPublicKey(String),

    /// The RSA session-key exchange failed (wrap/unwrap).
    #[error("key exchange failed: {0}")]
    KeyExchangeFailed(String),

    /// Could not establish the outbound TCP connection.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed {
        addr: String,
        source: std::io::Error,
    },

    /// The connection closed before a full frame was read.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A declared or outgoing frame length exceeded the cap.
    #[error("frame too large: {got} bytes (limit {limit})")]
    FrameTooLarge { got: usize, limit: usize },

    /// Encrypt/decrypt was attempted before the session key was set.
    #[error("session key not established")]
    KeyNotEstablished,

    /// Any other transport-level I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
