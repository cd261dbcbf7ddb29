//! Hierarchical deterministic keychain.
//!
//! A [`Keychain`] holds one seed, a [`MultiSeedKeychain`] any number of them. Both export keys,
//! hand derived keys to transaction signers and gate private key material behind a lock. Signing
//! and encryption go through the [`Secp256k1Api`], [`Ed25519Api`], [`SodiumApi`] and
//! [`SignBuffer`] operation sets, which every [`PrivateKeySource`] gets for free.
//!
//! # Usage
//!
//! ```rust
//! use hdkeychain::{
//!     ExportOptions, Keychain, KeychainError, LegacyPrivToPubMap, SignBuffer, SignBufferRequest,
//!     SignatureType,
//! };
//! use hdkeychain_key_deriv::Seed;
//! use hdkeychain_key_identifier::{DerivationAlgorithm, KeyIdentifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let keychain = Keychain::from_seed(&Seed::from([7u8; 64]), LegacyPrivToPubMap::default())
//!     .expect("valid seed");
//! let key_id = KeyIdentifier::new(DerivationAlgorithm::Bip32, "m/44'/60'/0'/0/0", None, None)
//!     .expect("valid key identifier");
//!
//! let request = SignBufferRequest::new(SignatureType::Schnorr, [1u8; 32]);
//! assert!(keychain.sign_buffer(&key_id, &request).is_ok());
//!
//! keychain.lock_private_keys().expect("seed present");
//! assert!(matches!(
//!     keychain.export_key(&key_id, ExportOptions::PRIVATE).await,
//!     Err(KeychainError::PrivateKeysLocked)
//! ));
//! assert!(keychain.export_key(&key_id, ExportOptions::PUBLIC).await.is_ok());
//! # }
//! ```

pub mod account;
pub mod crypto;
mod errors;
pub mod facade;
pub mod keychain;
pub mod legacy;
pub mod multi_seed;
pub mod sign_buffer;

#[cfg(test)]
mod test_utils;

pub use account::{AccountSource, KeyLocator, KeySource, SeedSelector, WalletAccount};
pub use errors::{KeychainError, KeychainResult};
pub use facade::{Ed25519Api, PrivateKeySource, Secp256k1Api, SodiumApi};
pub use keychain::{ExportOptions, ExportedKey, Keychain, SignTxInput};
pub use legacy::{LegacyPrivToPub, LegacyPrivToPubMap};
pub use multi_seed::MultiSeedKeychain;
pub use sign_buffer::{BufferSignature, SignBuffer, SignBufferRequest, SignatureType};
