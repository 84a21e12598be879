//! Session-key transport under RSA-OAEP.
//!
//! The host samples a random 256-bit session key, wraps it under the
//! connector's public key, and sends it as an opaque frame. The connector
//! unwraps it with its own private key. A wrap/unwrap failure means no
//! usable channel can exist, so both operations report the fatal
//! [`ChatError::KeyExchangeFailed`].

use rand::rngs::OsRng;
use rand::RngCore;
use rsa::{Oaep, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::crypto::keys::Keypair;
use crate::error::ChatError;

/// Session key length in bytes (AES-256).
pub const SESSION_KEY_SIZE: usize = 32;

/// The symmetric key shared by both endpoints for the lifetime of one
/// connection.
///
/// Established exactly once during the handshake and immutable afterwards.
/// The key material is wiped when the value is dropped.
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl SessionKey {
    /// Samples a fresh random session key from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Builds a session key from raw bytes.
    pub fn from_bytes(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.0
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionKey").field(&"[REDACTED]").finish()
    }
}

/// Encrypts the session key under the peer's public key (host role).
pub fn wrap_session_key(
    peer_public: &RsaPublicKey,
    key: &SessionKey,
) -> Result<Vec<u8>, ChatError> {
    let mut rng = OsRng;
    peer_public
        .encrypt(&mut rng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| ChatError::KeyExchangeFailed(e.to_string()))
}

/// Decrypts a wrapped session key with our private key (connector role).
///
/// Fails if the ciphertext was not produced under our public key or does
/// not decode to exactly [`SESSION_KEY_SIZE`] bytes. OAEP makes this an
/// explicit error, never a silently wrong key.
pub fn unwrap_session_key(keypair: &Keypair, wrapped: &[u8]) -> Result<SessionKey, ChatError> {
    let mut recovered = keypair
        .private_key()
        .decrypt(Oaep::new::<Sha256>(), wrapped)
        .map_err(|e| ChatError::KeyExchangeFailed(e.to_string()))?;

    if recovered.len() != SESSION_KEY_SIZE {
        let got = recovered.len();
        recovered.zeroize();
        return Err(ChatError::KeyExchangeFailed(format!(
            "unexpected session key length: got {}, want {}",
            got, SESSION_KEY_SIZE
        )));
    }

    let mut bytes = [0u8; SESSION_KEY_SIZE];
    bytes.copy_from_slice(&recovered);
    recovered.zeroize();
    Ok(SessionKey(bytes))
}
