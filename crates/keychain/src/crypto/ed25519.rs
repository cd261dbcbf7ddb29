//! Ed25519 over derived private keys.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroizing;

/// Ed25519 public key of the signing key seeded by `private_key`.
pub fn priv_to_pub(private_key: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(private_key).verifying_key().to_bytes()
}

/// Detached signature of `data`, which is signed as is.
pub fn sign(private_key: &[u8; 32], data: &[u8]) -> [u8; 64] {
    SigningKey::from_bytes(private_key).sign(data).to_bytes()
}

/// An Ed25519 signer detached from the keychain it was created from.
pub struct Ed25519Signer {
    seed: Zeroizing<[u8; 32]>,
}

impl Ed25519Signer {
    /// Wraps a copy of `private_key`.
    pub fn new(private_key: &[u8; 32]) -> Self {
        Self {
            seed: Zeroizing::new(*private_key),
        }
    }

    /// See [`sign`].
    pub fn sign(&self, data: &[u8]) -> [u8; 64] {
        sign(&self.seed, data)
    }

    /// The public key.
    pub fn public_key(&self) -> [u8; 32] {
        priv_to_pub(&self.seed)
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    use super::*;

    #[test]
    fn signature_verifies() {
        let signer = Ed25519Signer::new(&[9; 32]);
        let signature = signer.sign(b"hello");

        let verifying = VerifyingKey::from_bytes(&signer.public_key()).expect("valid key");
        verifying
            .verify(b"hello", &Signature::from_bytes(&signature))
            .expect("signature verifies");
        assert!(verifying
            .verify(b"hellp", &Signature::from_bytes(&signature))
            .is_err());
    }

    #[test]
    fn debug_hides_seed() {
        let signer = Ed25519Signer::new(&[9; 32]);
        let debug = format!("{signer:?}");
        assert!(!debug.contains(&hex::encode([9u8; 32])));
        assert!(debug.contains(&hex::encode(signer.public_key())));
    }
}
