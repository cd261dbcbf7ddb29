//! Errors for key identifiers and derivation paths.

use thiserror::Error;

/// Errors while parsing, validating or building a derivation path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path does not start with the `m` root marker.
    #[error("derivation path must start with `m`: {0}")]
    MissingRoot(String),

    /// A path segment is not an unsigned integer optionally followed by `'`.
    #[error("invalid derivation path segment `{0}`")]
    InvalidSegment(String),

    /// A path segment index does not fit below the hardened offset.
    #[error("derivation path index out of range in segment `{0}`")]
    IndexOutOfRange(String),

    /// The path has no segments, so no purpose can be read from it.
    #[error("derivation path has no purpose segment")]
    MissingPurpose,

    /// A segment that must be hardened is not.
    #[error("segment {position} of the derivation path must be hardened")]
    NotHardened {
        /// Zero-based position of the offending segment.
        position: usize,
    },

    /// The purpose is not one of [`BIP32_PURPOSES`](crate::BIP32_PURPOSES).
    #[error("invalid bip purpose {0}")]
    UnsupportedPurpose(u32),

    /// An address index was supplied without a chain index.
    #[error("can not have an address index when the chain index is absent")]
    AddressIndexWithoutChainIndex,
}

/// Errors while constructing a [`KeyIdentifier`](crate::KeyIdentifier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyIdentifierError {
    /// Unknown derivation algorithm.
    #[error("{0} is not a valid derivationAlgorithm")]
    UnsupportedAlgorithm(String),

    /// Unknown key type.
    #[error("{0} is not a valid keyType")]
    UnsupportedKeyType(String),

    /// The derivation path is malformed.
    #[error("derivationPath not formatted properly: {0}")]
    InvalidPath(#[from] PathError),

    /// SLIP10 only ever yields Ed25519-family keys in this system.
    #[error("secp256k1 requires BIP32 derivation")]
    Secp256k1RequiresBip32,

    /// No well-known wallet key exists under the requested name.
    #[error("invalid wallet key requested: {0}")]
    UnknownWalletKey(String),
}
