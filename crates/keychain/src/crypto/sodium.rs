//! libsodium style signing and encryption keyed by a derived private key.
//!
//! The derived private key is the 32 byte libsodium seed. Box keys come from
//! `crypto_box_seed_keypair`, signing keys from `crypto_sign_seed_keypair` and the seed itself
//! is the secretbox key. Ciphertexts of the box and secretbox constructions are laid out as
//! `nonce || ciphertext`.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, SIGNATURE_LENGTH};
use sodiumoxide::crypto::{box_, sealedbox, secretbox};
use zeroize::Zeroizing;

use crate::{KeychainError, KeychainResult};

fn init() -> KeychainResult<()> {
    sodiumoxide::init().map_err(|_| KeychainError::SodiumInit)
}

fn peer_public_key(bytes: &[u8]) -> KeychainResult<box_::PublicKey> {
    box_::PublicKey::from_slice(bytes).ok_or(KeychainError::InvalidPublicKey)
}

/// A public key and, when exported, its private half.
#[derive(Clone)]
pub struct SodiumKeyPair {
    /// Public key.
    pub public_key: [u8; 32],

    /// Private key, present only when private keys were requested.
    pub private_key: Option<Zeroizing<Vec<u8>>>,
}

impl fmt::Debug for SodiumKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SodiumKeyPair")
            .field("public_key", &hex::encode(self.public_key))
            .field("has_private_key", &self.private_key.is_some())
            .finish()
    }
}

/// Every key a sodium seed yields. All buffers are copies.
#[derive(Debug, Clone)]
pub struct SodiumKeys {
    /// Curve25519 box keys.
    pub box_keys: SodiumKeyPair,

    /// Ed25519 signing keys. The private key is the 64 byte libsodium form `seed || public`.
    pub sign: SodiumKeyPair,

    /// The secretbox key, present only when private keys were requested.
    pub secret: Option<Zeroizing<[u8; 32]>>,
}

/// Sodium operations over one derived seed.
///
/// Owns copies of its key material, so it outlives the keychain it was created from.
pub struct SodiumEncryptor {
    seed: Zeroizing<[u8; 32]>,
    signing_key: SigningKey,
    box_public: box_::PublicKey,
    box_secret: box_::SecretKey,
}

impl SodiumEncryptor {
    /// Expands `seed` into box and signing key pairs.
    pub fn from_seed(seed: &[u8; 32]) -> KeychainResult<Self> {
        init()?;

        let (box_public, box_secret) = box_::keypair_from_seed(&box_::Seed(*seed));
        Ok(Self {
            seed: Zeroizing::new(*seed),
            signing_key: SigningKey::from_bytes(seed),
            box_public,
            box_secret,
        })
    }

    /// Copies of the keys. Private halves are only included when `export_private` is set.
    pub fn keys(&self, export_private: bool) -> SodiumKeys {
        let (box_private, sign_private, secret) = if export_private {
            (
                Some(Zeroizing::new(self.box_secret.0.to_vec())),
                Some(Zeroizing::new(self.signing_key.to_keypair_bytes().to_vec())),
                Some(Zeroizing::new(*self.seed)),
            )
        } else {
            (None, None, None)
        };

        SodiumKeys {
            box_keys: SodiumKeyPair {
                public_key: self.box_public.0,
                private_key: box_private,
            },
            sign: SodiumKeyPair {
                public_key: self.signing_key.verifying_key().to_bytes(),
                private_key: sign_private,
            },
            secret,
        }
    }

    /// Attached signature: `signature || data`.
    pub fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut signed = self.sign_detached(data).to_vec();
        signed.extend_from_slice(data);
        signed
    }

    /// Verifies an attached signature and returns the message.
    pub fn sign_open(&self, signed: &[u8]) -> KeychainResult<Vec<u8>> {
        if signed.len() < SIGNATURE_LENGTH {
            return Err(KeychainError::InvalidSignature);
        }
        let (signature, message) = signed.split_at(SIGNATURE_LENGTH);

        if !self.verify_detached(message, signature) {
            return Err(KeychainError::InvalidSignature);
        }
        Ok(message.to_vec())
    }

    /// Detached signature of `data`.
    pub fn sign_detached(&self, data: &[u8]) -> [u8; 64] {
        self.signing_key.sign(data).to_bytes()
    }

    /// Whether `signature` is a valid signature of `data` under the signing key.
    pub fn verify_detached(&self, data: &[u8], signature: &[u8]) -> bool {
        Signature::from_slice(signature)
            .map(|signature| self.signing_key.verifying_key().verify(data, &signature).is_ok())
            .unwrap_or(false)
    }

    /// XSalsa20-Poly1305 under the seed.
    pub fn encrypt_secret_box(&self, data: &[u8]) -> Vec<u8> {
        let key = secretbox::Key(*self.seed);
        let nonce = secretbox::gen_nonce();

        let mut out = nonce.0.to_vec();
        out.extend(secretbox::seal(data, &nonce, &key));
        out
    }

    /// Reverses [`Self::encrypt_secret_box`].
    pub fn decrypt_secret_box(&self, data: &[u8]) -> KeychainResult<Vec<u8>> {
        if data.len() < secretbox::NONCEBYTES {
            return Err(KeychainError::DecryptionFailed);
        }
        let (nonce, ciphertext) = data.split_at(secretbox::NONCEBYTES);
        let nonce = secretbox::Nonce::from_slice(nonce).ok_or(KeychainError::DecryptionFailed)?;
        let key = secretbox::Key(*self.seed);

        secretbox::open(ciphertext, &nonce, &key).map_err(|_| KeychainError::DecryptionFailed)
    }

    /// Authenticated encryption to `to_public_key`.
    pub fn encrypt_box(&self, data: &[u8], to_public_key: &[u8]) -> KeychainResult<Vec<u8>> {
        let peer = peer_public_key(to_public_key)?;
        let nonce = box_::gen_nonce();

        let mut out = nonce.0.to_vec();
        out.extend(box_::seal(data, &nonce, &peer, &self.box_secret));
        Ok(out)
    }

    /// Decrypts a box sent by `from_public_key`.
    pub fn decrypt_box(&self, data: &[u8], from_public_key: &[u8]) -> KeychainResult<Vec<u8>> {
        let peer = peer_public_key(from_public_key)?;
        if data.len() < box_::NONCEBYTES {
            return Err(KeychainError::DecryptionFailed);
        }
        let (nonce, ciphertext) = data.split_at(box_::NONCEBYTES);
        let nonce = box_::Nonce::from_slice(nonce).ok_or(KeychainError::DecryptionFailed)?;

        box_::open(ciphertext, &nonce, &peer, &self.box_secret)
            .map_err(|_| KeychainError::DecryptionFailed)
    }

    /// Anonymous encryption to `to_public_key`.
    pub fn encrypt_sealed_box(&self, data: &[u8], to_public_key: &[u8]) -> KeychainResult<Vec<u8>> {
        let peer = peer_public_key(to_public_key)?;
        Ok(sealedbox::seal(data, &peer))
    }

    /// Opens a sealed box addressed to this encryptor's box key.
    pub fn decrypt_sealed_box(&self, data: &[u8]) -> KeychainResult<Vec<u8>> {
        sealedbox::open(data, &self.box_public, &self.box_secret)
            .map_err(|_| KeychainError::DecryptionFailed)
    }
}

impl fmt::Debug for SodiumEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SodiumEncryptor")
            .field("box_public_key", &hex::encode(self.box_public.0))
            .field(
                "sign_public_key",
                &hex::encode(self.signing_key.verifying_key().to_bytes()),
            )
            .finish_non_exhaustive()
    }
}
