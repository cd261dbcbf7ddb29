//! Seed handling and key derivation for the keychain.
//!
//! Every seed yields two master nodes, one BIP32 (secp256k1) and one SLIP10 (Ed25519). A
//! [`KeyIdentifier`](hdkeychain_key_identifier::KeyIdentifier) picks the master through its
//! derivation algorithm and walks it down its path, producing a [`DerivedKey`].
//!
//! # Usage
//!
//! ```rust
//! use hdkeychain_key_deriv::{MasterKeys, Seed};
//! use hdkeychain_key_identifier::{DerivationAlgorithm, DerivationPath};
//!
//! let seed = Seed::from([7u8; 64]);
//! let masters = MasterKeys::from_seed(&seed).expect("valid seed");
//!
//! let path: DerivationPath = "m/44'/0'/0'/0/0".parse().expect("valid path");
//! let key = masters
//!     .derive(DerivationAlgorithm::Bip32, &path)
//!     .expect("derivable path");
//!
//! assert_eq!(key.public_key().len(), 33);
//! assert!(key.xpub().is_some());
//! ```
//!
//! # Key material lifetime
//!
//! [`Seed`], [`MasterKeys`] and [`DerivedKey`] all wipe their secret bytes on drop.

pub mod derive;
mod keys;
mod seed;
pub mod slip10;

pub use derive::{DerivationError, DerivedKey, ExportedXpriv};
pub use keys::MasterKeys;
pub use seed::{SEED_LENGTH, Seed, SeedId};
