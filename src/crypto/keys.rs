//! RSA keypair generation and public-key encoding.
//!
//! Each endpoint generates one keypair per process at session start. Only
//! the public half ever leaves the process, encoded as PKCS#8 PEM so it can
//! travel as an opaque frame payload.

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::ChatError;

/// RSA modulus size in bits.
pub const RSA_KEY_BITS: usize = 2048;

/// An RSA keypair owned by the local endpoint.
///
/// The private component never leaves this struct; the public component is
/// exported with [`Keypair::export_public`] for transmission to the peer.
pub struct Keypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("Keypair")
            .field("public", &fingerprint(&self.public))
            .field("private", &"[REDACTED]")
            .finish()
    }
}

impl Keypair {
    /// Generates a fresh RSA-2048 keypair from the OS random source.
    ///
    /// Key generation has no recoverable failure path; if the RNG or the
    /// prime search fails the process cannot establish any session, so this
    /// aborts.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let private =
            RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).expect("RSA key generation failed");
        let public = RsaPublicKey::from(&private);
        Self { private, public }
    }

    /// Returns the public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Returns the private key.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Exports the public key as PKCS#8 PEM.
    ///
    /// The encoding is deterministic for a given key, so the same bytes are
    /// produced every time it is sent.
    pub fn export_public(&self) -> String {
        self.public
            .to_public_key_pem(LineEnding::LF)
            .expect("PEM encoding of a valid RSA public key")
    }
}

/// Parses a peer's public key from its PEM encoding.
pub fn import_public(pem: &[u8]) -> Result<RsaPublicKey, ChatError> {
    let text =
        std::str::from_utf8(pem).map_err(|e| ChatError::MalformedPublicKey(e.to_string()))?;
    RsaPublicKey::from_public_key_pem(text)
        .map_err(|e| ChatError::MalformedPublicKey(e.to_string()))
}

/// Short hex fingerprint of a public key (first 8 bytes of the SHA-256 of
/// its DER encoding).
///
/// Displayed so users can compare keys out of band; nothing in the protocol
/// verifies it.
pub fn fingerprint(key: &RsaPublicKey) -> String {
    let der = key
        .to_public_key_der()
        .expect("DER encoding of a valid RSA public key");
    let digest = Sha256::digest(der.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_import_roundtrip() {
        let kp = Keypair::generate();
        let pem = kp.export_public();

        let imported = import_public(pem.as_bytes()).unwrap();
        assert_eq!(&imported, kp.public_key());

        // Export is deterministic
        assert_eq!(pem, kp.export_public());
    }

    #[test]
    fn test_distinct_keypairs_distinct_fingerprints() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();

        assert_ne!(kp1.public_key(), kp2.public_key());
        assert_ne!(fingerprint(kp1.public_key()), fingerprint(kp2.public_key()));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let result = import_public(b"not a pem document");
        assert!(matches!(result, Err(ChatError::MalformedPublicKey(_))));
    }

    #[test]
    fn test_import_rejects_invalid_utf8() {
        let result = import_public(&[0xFF, 0xFE, 0x00, 0x80]);
        assert!(matches!(result, Err(ChatError::MalformedPublicKey(_))));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let kp = Keypair::generate();
        let debug = format!("{:?}", kp);
        assert!(debug.contains("[REDACTED]"));
    }
}
