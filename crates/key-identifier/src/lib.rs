//! Key identifiers and BIP32 derivation path utilities.
//!
//! A [`KeyIdentifier`] describes *what* key to derive from a seed: the derivation algorithm, the
//! derivation path, the asset it belongs to and the key type. It is validated on construction and
//! can not be mutated afterwards.
//!
//! # Usage
//!
//! ```rust
//! use hdkeychain_key_identifier::{DerivationAlgorithm, KeyIdentifier, KeyType};
//!
//! let key_id = KeyIdentifier::new(
//!     DerivationAlgorithm::Bip32,
//!     "m/44'/501'/0'/0/0",
//!     Some("solana"),
//!     Some(KeyType::Nacl),
//! )
//! .expect("valid key identifier");
//!
//! assert_eq!(key_id.to_string(), "m/44'/501'/0'/0/0 (BIP32)");
//! ```

mod errors;
pub mod key_identifier;
pub mod path;
pub mod wallet_keys;

pub use errors::{KeyIdentifierError, PathError};
pub use key_identifier::{DerivationAlgorithm, KeyIdentifier, KeyIdentifierParams, KeyType};
pub use path::{
    BIP32_PURPOSES, Bip32PathArgs, DerivationPath, HARDENED_OFFSET, PathIndex, PathPurpose,
    build_bip32_path, is_valid_bip_path, parse_path,
};
