//! Derived key handles and derivation errors.
//!
//! A [`DerivedKey`] can only be obtained through [`MasterKeys::derive`](crate::MasterKeys::derive),
//! so its public key always belongs to its private key.

use std::fmt;

use bitcoin::bip32::{self, ChildNumber, Xpriv, Xpub};
use hdkeychain_key_identifier::DerivationAlgorithm;
use secp256k1::SECP256K1;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{SEED_LENGTH, keys::erase_xpriv, slip10::Slip10Node};

/// Error type for key derivation operations.
#[derive(Debug, thiserror::Error)]
pub enum DerivationError {
    /// BIP32 derivation failed.
    #[error("BIP32 derivation error: {0}")]
    Bip32(#[from] bip32::Error),

    /// SLIP10 over Ed25519 has no non-hardened children.
    #[error("SLIP10 ed25519 derivation only supports hardened children, got {0}")]
    NonHardenedSlip10(ChildNumber),

    /// A seed was built from a slice of the wrong length.
    #[error("seed must be {SEED_LENGTH} bytes, got {0}")]
    InvalidSeedLength(usize),

    /// A seed id is not 40 lowercase hex characters.
    #[error("invalid seed id `{0}`")]
    InvalidSeedId(String),
}

pub(crate) enum DerivedNode {
    Bip32(Xpriv),
    Slip10(Slip10Node),
}

/// Key material at the end of a derivation path.
///
/// Wiped on drop. Keep it for the span of one operation.
pub struct DerivedKey {
    private_key: [u8; 32],
    public_key: Vec<u8>,
    node: DerivedNode,
}

impl DerivedKey {
    pub(crate) fn new(node: DerivedNode) -> Self {
        let (private_key, public_key) = match &node {
            DerivedNode::Bip32(xpriv) => (
                xpriv.private_key.secret_bytes(),
                xpriv.private_key.public_key(SECP256K1).serialize().to_vec(),
            ),
            DerivedNode::Slip10(slip10) => {
                (*slip10.private_key(), slip10.public_key().to_vec())
            }
        };

        Self {
            private_key,
            public_key,
            node,
        }
    }

    /// Algorithm the key was derived with.
    pub const fn algorithm(&self) -> DerivationAlgorithm {
        match self.node {
            DerivedNode::Bip32(_) => DerivationAlgorithm::Bip32,
            DerivedNode::Slip10(_) => DerivationAlgorithm::Slip10,
        }
    }

    /// The 32 byte private key.
    pub const fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    /// The public key as the derivation produced it.
    ///
    /// This is the 33 byte compressed secp256k1 key for BIP32 and the 32 byte Ed25519 key for
    /// SLIP10.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        match &self.node {
            DerivedNode::Bip32(xpriv) => xpriv.chain_code.as_bytes(),
            DerivedNode::Slip10(slip10) => slip10.chain_code(),
        }
    }

    /// Extended private key serialization.
    pub fn xpriv(&self) -> ExportedXpriv {
        match &self.node {
            DerivedNode::Bip32(xpriv) => ExportedXpriv::Base58(Zeroizing::new(xpriv.to_string())),
            DerivedNode::Slip10(slip10) => ExportedXpriv::Slip10 {
                chain_code: hex::encode(slip10.chain_code()),
                key: Zeroizing::new(hex::encode(slip10.private_key())),
            },
        }
    }

    /// Extended public key serialization. SLIP10 Ed25519 keys have none.
    pub fn xpub(&self) -> Option<String> {
        match &self.node {
            DerivedNode::Bip32(xpriv) => Some(Xpub::from_priv(SECP256K1, xpriv).to_string()),
            DerivedNode::Slip10(_) => None,
        }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("algorithm", &self.algorithm())
            .field("public_key", &hex::encode(&self.public_key))
            .finish_non_exhaustive()
    }
}

impl Zeroize for DerivedKey {
    fn zeroize(&mut self) {
        self.private_key.zeroize();
        match &mut self.node {
            DerivedNode::Bip32(xpriv) => erase_xpriv(xpriv),
            DerivedNode::Slip10(slip10) => slip10.zeroize(),
        }
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for DerivedKey {}

/// Serialized extended private key.
#[derive(Clone, PartialEq, Eq)]
pub enum ExportedXpriv {
    /// Standard base58 `xprv` string of a BIP32 node.
    Base58(Zeroizing<String>),

    /// Hex encoded chain code and private key of a SLIP10 node.
    Slip10 {
        /// Chain code, hex.
        chain_code: String,
        /// Private key, hex.
        key: Zeroizing<String>,
    },
}

impl fmt::Debug for ExportedXpriv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base58(_) => f.write_str("ExportedXpriv::Base58(..)"),
            Self::Slip10 { chain_code, .. } => f
                .debug_struct("ExportedXpriv::Slip10")
                .field("chain_code", chain_code)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for ExportedXpriv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base58(xpriv) => f.write_str(xpriv),
            Self::Slip10 { chain_code, key } => {
                write!(f, "{{ chainCode: {chain_code}, key: {} }}", key.as_str())
            }
        }
    }
}
