//! # Veilchat - encrypted peer-to-peer chat
//!
//! Two endpoints establish a shared AES-256 session key through an RSA
//! handshake, then exchange individually encrypted, length-framed messages
//! over one persistent TCP connection.
//!
//! ## Protocol
//!
//! Every transmission is a frame: a 4-byte unsigned big-endian length
//! followed by exactly that many payload bytes. Per connection:
//!
//! 1. Both sides send their RSA public key (PEM) and read the peer's.
//! 2. The host generates a random AES-256 session key, wraps it under the
//!    peer's public key with RSA-OAEP, and sends it; the connector unwraps
//!    it with its private key.
//! 3. Thereafter each chat message is one frame carrying
//!    `IV || AES-256-CBC ciphertext`, with a fresh random IV per message.
//!
//! ## Security Model
//!
//! - The session key is established once per connection and never rotated.
//! - Any presented public key is trusted: there is no in-band identity
//!   verification, only a displayed fingerprint for out-of-band comparison.
//! - A message that fails to decrypt is surfaced as a placeholder and the
//!   session continues; only transport loss ends a session.
//!
//! ## Modules
//!
//! - [`crypto`]: keypairs, session-key transport, the message channel
//! - [`transport`]: length-prefixed framing over TCP
//! - [`handshake`]: the synchronous key-establishment phase
//! - [`session`]: the concurrent send/receive loops
//!
//! ## Example
//!
//! ```rust
//! use veilchat::crypto::{Decrypted, SecureChannel, SessionKey};
//!
//! let channel = SecureChannel::with_key(SessionKey::generate());
//!
//! let sealed = channel.encrypt(b"hello").unwrap();
//! match channel.decrypt(&sealed.to_bytes()).unwrap() {
//!     Decrypted::Plaintext(p) => assert_eq!(p, b"hello"),
//!     Decrypted::Garbled(_) => unreachable!(),
//! }
//! ```

/// Default TCP port for chat sessions.
pub const DEFAULT_PORT: u16 = 9999;

pub mod commands;
pub mod crypto;
pub mod error;
pub mod handshake;
pub mod session;
pub mod transport;

// Re-export commonly used types at the crate root
pub use crypto::{Decrypted, DecryptFailure, EncryptedMessage, Keypair, SecureChannel, SessionKey};
pub use error::ChatError;
pub use handshake::{perform_handshake, Role};
pub use session::{receive_loop, run_session, send_loop, EXIT_TOKEN};
pub use transport::{Connection, Listener, MAX_FRAME_LEN};
