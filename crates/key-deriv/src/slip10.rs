//! SLIP10 derivation over Ed25519.
//!
//! Only hardened children exist on this curve.

use bitcoin::bip32::ChildNumber;
use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::DerivationError;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key of the master node.
const MASTER_HMAC_KEY: &[u8] = b"ed25519 seed";

/// A SLIP10 Ed25519 node: a 32 byte private key and its chain code.
#[derive(Clone)]
pub struct Slip10Node {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl Slip10Node {
    /// Master node of `seed`.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::from_hmac(MASTER_HMAC_KEY, &[seed])
    }

    /// Walks the node down `path`. Every segment must be hardened.
    pub fn derive(&self, path: &[ChildNumber]) -> Result<Self, DerivationError> {
        let mut node = self.clone();
        for child in path {
            node = node.child(*child)?;
        }
        Ok(node)
    }

    fn child(&self, child: ChildNumber) -> Result<Self, DerivationError> {
        let ChildNumber::Hardened { .. } = child else {
            return Err(DerivationError::NonHardenedSlip10(child));
        };

        let index = u32::from(child).to_be_bytes();
        Ok(Self::from_hmac(&self.chain_code, &[&[0x00], &self.key, &index]))
    }

    fn from_hmac(key: &[u8], data: &[&[u8]]) -> Self {
        let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
        for chunk in data {
            mac.update(chunk);
        }

        let mut out = [0u8; 64];
        out.copy_from_slice(&mac.finalize().into_bytes());
        let mut node = Self {
            key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        node.key.copy_from_slice(&out[..32]);
        node.chain_code.copy_from_slice(&out[32..]);
        out.zeroize();

        node
    }

    /// The 32 byte private key, which doubles as the Ed25519 signing seed.
    pub const fn private_key(&self) -> &[u8; 32] {
        &self.key
    }

    /// The chain code.
    pub const fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// The Ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        SigningKey::from_bytes(&self.key).verifying_key().to_bytes()
    }
}

impl std::fmt::Debug for Slip10Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slip10Node")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

impl Zeroize for Slip10Node {
    fn zeroize(&mut self) {
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

impl Drop for Slip10Node {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for Slip10Node {}
