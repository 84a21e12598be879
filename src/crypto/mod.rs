//! Cryptographic operations for the chat.
//!
//! Three concerns, used in sequence per connection:
//!
//! - [`keys`]: RSA keypair generation and PEM export/import of public keys.
//! - [`exchange`]: transport of the symmetric session key under the peer's
//!   public key (RSA-OAEP).
//! - [`channel`]: per-message encryption with the established session key
//!   (AES-256-CBC, fresh IV per message).

mod channel;
mod exchange;
mod keys;

pub use channel::{Decrypted, DecryptFailure, EncryptedMessage, SecureChannel, BLOCK_SIZE, IV_SIZE};
pub use exchange::{unwrap_session_key, wrap_session_key, SessionKey, SESSION_KEY_SIZE};
pub use keys::{fingerprint, import_public, Keypair, RSA_KEY_BITS};
