//! Errors surfaced by keychain operations.

use hdkeychain_key_deriv::{DerivationError, SeedId};
use hdkeychain_key_identifier::{KeyIdentifierError, KeyType, PathError};
use thiserror::Error;

use crate::sign_buffer::SignatureType;

/// Convenience alias for keychain results.
pub type KeychainResult<T> = Result<T, KeychainError>;

/// Everything that can go wrong while exporting, signing or encrypting.
///
/// Every failure is scoped to the request that triggered it.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Invalid key identifier.
    #[error("invalid key identifier: {0}")]
    InvalidKeyIdentifier(#[from] KeyIdentifierError),

    /// Invalid derivation path.
    #[error("invalid derivation path: {0}")]
    InvalidPath(#[from] PathError),

    /// Seed handling or key derivation failed.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// The keychain holds no seed.
    #[error("expected keychain to be initialized with a seed")]
    SeedNotInitialized,

    /// The keychain already holds a seed.
    #[error("keychain is already initialized with seed {0}")]
    SeedAlreadyInitialized(SeedId),

    /// A seed with the same id is already registered.
    #[error("already have seed with id: {0}")]
    DuplicateSeed(SeedId),

    /// No keychain is registered for the seed id.
    #[error("keychain not found for seed id: {0}")]
    SeedNotFound(SeedId),

    /// A wallet account was used before a primary seed was set.
    #[error("no primary seed set")]
    NoPrimarySeed,

    /// A seed-sourced wallet account does not name its seed.
    #[error("wallet account {index} does not carry a seed id")]
    MissingAccountSeedId {
        /// Index of the account.
        index: u32,
    },

    /// Private key material was requested while the seed is locked.
    #[error("private keys are locked")]
    PrivateKeysLocked,

    /// Unlock was requested for a seed that is not locked.
    #[error("already unlocked")]
    AlreadyUnlocked,

    /// Unlock was attempted with a seed other than the registered one.
    #[error("must pass in existing seed")]
    SeedMismatch,

    /// Unlock of all seeds was attempted with the wrong number of seeds.
    #[error("must pass in same number of seeds: expected {expected}, got {actual}")]
    SeedCountMismatch {
        /// Registered seeds.
        expected: usize,
        /// Seeds supplied.
        actual: usize,
    },

    /// A legacy key was requested for an asset without a public key mapper.
    #[error("asset name {0} has no legacyPrivToPub mapper")]
    NoLegacyMapper(String),

    /// A legacy public key mapper failed.
    #[error("legacyPrivToPub mapper for {asset_name} failed")]
    LegacyMapper {
        /// Asset of the mapper.
        asset_name: String,
        /// What the mapper reported.
        source: anyhow::Error,
    },

    /// The key type can not produce this kind of signature.
    #[error("{signature_type} signatures are not supported for {key_type}")]
    UnsupportedKeyType {
        /// Requested scheme.
        signature_type: SignatureType,
        /// Type of the addressed key.
        key_type: KeyType,
    },

    /// Only secp256k1 keys expose a compressed public key.
    #[error("public keys can only be read for secp256k1 keys, not {0}")]
    UnsupportedPublicKeyType(KeyType),

    /// The dispatcher has no route for this key type and signature type.
    #[error("\"keyId.keyType\" {key_type} does not support \"signatureType\" {signature_type}")]
    UnsupportedSignatureType {
        /// Type of the addressed key.
        key_type: KeyType,
        /// Requested scheme.
        signature_type: SignatureType,
    },

    /// An option was supplied that the signature type does not accept.
    #[error("unsupported options supplied for {0} signature")]
    UnsupportedOptions(SignatureType),

    /// The data to sign has the wrong length.
    #[error("expected {expected} bytes of data, got {actual}")]
    InvalidDataLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Unknown signature encoding selector.
    #[error("invalid signature encoding `{0}`")]
    InvalidEncoding(String),

    /// The tweak is not a valid scalar or yields an invalid key.
    #[error("invalid tweak")]
    InvalidTweak,

    /// A private key is not a valid secp256k1 scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// A peer public key is malformed.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Ciphertext failed authentication or is truncated.
    #[error("decryption failed")]
    DecryptionFailed,

    /// An attached signature does not verify.
    #[error("invalid signature")]
    InvalidSignature,

    /// libsodium could not be initialized.
    #[error("failed to initialize libsodium")]
    SodiumInit,
}
