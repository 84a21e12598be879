//! The secure message channel: AES-256-CBC with per-message IVs.
//!
//! Every chat message is encrypted independently: a fresh random 16-byte IV,
//! CBC mode with PKCS#7 padding, and the wire form `IV || ciphertext`.
//!
//! Decryption failures come in two severities, kept apart by type. Calling
//! into an unkeyed channel is a programming error and returns the fatal
//! [`ChatError::KeyNotEstablished`]. A message that merely fails to decrypt
//! (truncated, misaligned, or failing the padding check) yields
//! [`Decrypted::Garbled`] so the caller can show a placeholder and keep the
//! session alive: garbled network data degrades the conversation, not the
//! connection.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::crypto::exchange::SessionKey;
use crate::error::ChatError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Initialization vector length in bytes.
pub const IV_SIZE: usize = 16;

/// AES block length in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Reasons a single message failed to decrypt. Never fatal to the channel.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecryptFailure {
    /// Payload shorter than an IV plus one cipher block.
    #[error("encrypted payload too short")]
    TooShort,

    /// Ciphertext length is not a multiple of the cipher block size.
    #[error("ciphertext not block-aligned")]
    NotBlockAligned,

    /// PKCS#7 padding check failed after decryption.
    #[error("padding check failed")]
    BadPadding,
}

/// Outcome of decrypting one message.
#[derive(Debug)]
pub enum Decrypted {
    /// The recovered plaintext.
    Plaintext(Vec<u8>),
    /// The message could not be decrypted; the channel remains usable.
    Garbled(DecryptFailure),
}

/// One encrypted chat message as it travels on the wire.
///
/// Wire format: `iv (16) || ciphertext (multiple of 16)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedMessage {
    /// Random per-message initialization vector.
    pub iv: [u8; IV_SIZE],
    /// CBC ciphertext, PKCS#7-padded.
    pub ciphertext: Vec<u8>,
}

impl EncryptedMessage {
    /// Serializes to the wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(IV_SIZE + self.ciphertext.len());
        result.extend_from_slice(&self.iv);
        result.extend_from_slice(&self.ciphertext);
        result
    }

    /// Parses the wire form. The smallest valid message is one IV plus one
    /// padded block.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecryptFailure> {
        if data.len() < IV_SIZE + BLOCK_SIZE {
            return Err(DecryptFailure::TooShort);
        }

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&data[..IV_SIZE]);

        Ok(Self {
            iv,
            ciphertext: data[IV_SIZE..].to_vec(),
        })
    }
}

/// Holds the negotiated session key and encrypts/decrypts opaque payloads.
///
/// The key is installed exactly once by the handshake and never mutated
/// afterwards, so a channel can be shared read-only between the send and
/// receive loops.
pub struct SecureChannel {
    key: Option<SessionKey>,
}

impl SecureChannel {
    /// Creates a channel with no session key yet.
    pub fn new() -> Self {
        Self { key: None }
    }

    /// Creates a channel around an established session key.
    pub fn with_key(key: SessionKey) -> Self {
        Self { key: Some(key) }
    }

    /// Installs the session key negotiated by the handshake.
    pub fn establish(&mut self, key: SessionKey) {
        self.key = Some(key);
    }

    /// Whether a session key has been established.
    pub fn is_established(&self) -> bool {
        self.key.is_some()
    }

    /// The established session key, if any. Exists so tests can assert both
    /// endpoints hold identical key bytes after a handshake.
    pub fn session_key(&self) -> Option<&SessionKey> {
        self.key.as_ref()
    }

    /// Encrypts a plaintext into a fresh [`EncryptedMessage`].
    ///
    /// A new random IV is drawn per call, so encrypting the same plaintext
    /// twice yields different ciphertexts.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedMessage, ChatError> {
        let key = self.key.as_ref().ok_or(ChatError::KeyNotEstablished)?;

        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
            .expect("AES-256 key and IV lengths are fixed")
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        Ok(EncryptedMessage { iv, ciphertext })
    }

    /// Decrypts one wire payload.
    ///
    /// The only fatal error is calling this before the handshake installed
    /// a key; everything that can go wrong with the payload itself is
    /// reported as [`Decrypted::Garbled`].
    pub fn decrypt(&self, payload: &[u8]) -> Result<Decrypted, ChatError> {
        let key = self.key.as_ref().ok_or(ChatError::KeyNotEstablished)?;

        let message = match EncryptedMessage::from_bytes(payload) {
            Ok(message) => message,
            Err(failure) => return Ok(Decrypted::Garbled(failure)),
        };

        if message.ciphertext.len() % BLOCK_SIZE != 0 {
            return Ok(Decrypted::Garbled(DecryptFailure::NotBlockAligned));
        }

        let plaintext = Aes256CbcDec::new_from_slices(key.as_bytes(), &message.iv)
            .expect("AES-256 key and IV lengths are fixed")
            .decrypt_padded_vec_mut::<Pkcs7>(&message.ciphertext);

        match plaintext {
            Ok(plaintext) => Ok(Decrypted::Plaintext(plaintext)),
            Err(_) => Ok(Decrypted::Garbled(DecryptFailure::BadPadding)),
        }
    }
}

impl Default for SecureChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed_channel() -> SecureChannel {
        SecureChannel::with_key(SessionKey::generate())
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let channel = keyed_channel();
        let plaintext = b"Hello over the wire";

        let sealed = channel.encrypt(plaintext).unwrap();
        let opened = channel.decrypt(&sealed.to_bytes()).unwrap();

        match opened {
            Decrypted::Plaintext(p) => assert_eq!(p, plaintext),
            Decrypted::Garbled(f) => panic!("decryption failed: {}", f),
        }
    }

    #[test]
    fn test_fresh_iv_per_message() {
        let channel = keyed_channel();
        let plaintext = b"same message twice";

        let first = channel.encrypt(plaintext).unwrap();
        let second = channel.encrypt(plaintext).unwrap();

        // Fresh IV per call: different wire bytes
        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);

        // Both still decrypt to the original
        for sealed in [first, second] {
            match channel.decrypt(&sealed.to_bytes()).unwrap() {
                Decrypted::Plaintext(p) => assert_eq!(p, plaintext),
                Decrypted::Garbled(f) => panic!("decryption failed: {}", f),
            }
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let channel = keyed_channel();

        let sealed = channel.encrypt(b"").unwrap();
        // Empty plaintext still produces one full padding block
        assert_eq!(sealed.ciphertext.len(), BLOCK_SIZE);

        match channel.decrypt(&sealed.to_bytes()).unwrap() {
            Decrypted::Plaintext(p) => assert!(p.is_empty()),
            Decrypted::Garbled(f) => panic!("decryption failed: {}", f),
        }
    }

    #[test]
    fn test_block_boundary_plaintext() {
        let channel = keyed_channel();
        let plaintext = [0x42u8; BLOCK_SIZE];

        let sealed = channel.encrypt(&plaintext).unwrap();
        // Exactly one block of data grows by a full padding block
        assert_eq!(sealed.ciphertext.len(), 2 * BLOCK_SIZE);

        match channel.decrypt(&sealed.to_bytes()).unwrap() {
            Decrypted::Plaintext(p) => assert_eq!(p, plaintext),
            Decrypted::Garbled(f) => panic!("decryption failed: {}", f),
        }
    }

    #[test]
    fn test_unkeyed_channel_is_a_state_error() {
        let mut channel = SecureChannel::new();
        assert!(!channel.is_established());

        assert!(matches!(
            channel.encrypt(b"too early"),
            Err(ChatError::KeyNotEstablished)
        ));
        assert!(matches!(
            channel.decrypt(&[0u8; 32]),
            Err(ChatError::KeyNotEstablished)
        ));

        // Installing the key makes the same channel usable
        channel.establish(SessionKey::generate());
        assert!(channel.is_established());
        assert!(channel.encrypt(b"now it works").is_ok());
    }

    #[test]
    fn test_truncated_payload_is_garbled_not_fatal() {
        let channel = keyed_channel();

        let outcome = channel.decrypt(&[0u8; 10]).unwrap();
        assert!(matches!(
            outcome,
            Decrypted::Garbled(DecryptFailure::TooShort)
        ));

        // The channel still works afterwards
        let sealed = channel.encrypt(b"still alive").unwrap();
        assert!(matches!(
            channel.decrypt(&sealed.to_bytes()).unwrap(),
            Decrypted::Plaintext(_)
        ));
    }

    #[test]
    fn test_misaligned_ciphertext_is_garbled() {
        let channel = keyed_channel();
        let mut wire = channel.encrypt(b"some message").unwrap().to_bytes();
        wire.push(0xAB);

        let outcome = channel.decrypt(&wire).unwrap();
        assert!(matches!(
            outcome,
            Decrypted::Garbled(DecryptFailure::NotBlockAligned)
        ));
    }

    #[test]
    fn test_tampered_padding_block_is_detected() {
        let channel = keyed_channel();

        // 16 bytes of data: the second ciphertext block carries pure padding.
        // Flipping a bit in the first ciphertext block flips exactly that bit
        // in the decrypted padding block, so the check fails regardless of
        // key or IV.
        let plaintext = [0x55u8; BLOCK_SIZE];
        let mut wire = channel.encrypt(&plaintext).unwrap().to_bytes();
        wire[IV_SIZE + BLOCK_SIZE - 1] ^= 0x01;

        let outcome = channel.decrypt(&wire).unwrap();
        assert!(matches!(
            outcome,
            Decrypted::Garbled(DecryptFailure::BadPadding)
        ));
    }

    #[test]
    fn test_tampering_never_yields_original_plaintext() {
        let channel = keyed_channel();
        let plaintext = b"short msg";
        let wire = channel.encrypt(plaintext).unwrap().to_bytes();

        // Flip each ciphertext byte in turn: the message must never come
        // back intact and must usually fail the padding check.
        for i in IV_SIZE..wire.len() {
            let mut corrupted = wire.clone();
            corrupted[i] ^= 0x01;

            match channel.decrypt(&corrupted).unwrap() {
                Decrypted::Garbled(_) => {}
                Decrypted::Plaintext(p) => assert_ne!(p, plaintext),
            }
        }
    }

    #[test]
    fn test_wire_format_roundtrip() {
        let channel = keyed_channel();
        let sealed = channel.encrypt(b"wire format").unwrap();

        let bytes = sealed.to_bytes();
        assert_eq!(bytes.len(), IV_SIZE + sealed.ciphertext.len());

        let parsed = EncryptedMessage::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, sealed);
    }
}
