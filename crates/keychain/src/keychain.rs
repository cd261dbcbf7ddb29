//! Keychain over a single seed.

use std::{collections::BTreeMap, fmt, future::Future};

use hdkeychain_key_deriv::{DerivedKey, ExportedXpriv, MasterKeys, Seed, SeedId};
use hdkeychain_key_identifier::{DerivationAlgorithm, KeyIdentifier, KeyType};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::{
    KeychainError, KeychainResult, crypto::ed25519, facade::PrivateKeySource,
    legacy::LegacyPrivToPubMap,
};

/// Options of [`Keychain::export_key`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Include the private key and the extended private key.
    pub export_private: bool,
}

impl ExportOptions {
    /// Export the public half only.
    pub const PUBLIC: Self = Self {
        export_private: false,
    };

    /// Export both halves.
    pub const PRIVATE: Self = Self {
        export_private: true,
    };
}

/// Result of [`Keychain::export_key`].
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedKey {
    /// Public key as the key type defines it.
    pub public_key: Vec<u8>,

    /// Base58 extended public key, BIP32 only.
    pub xpub: Option<String>,

    /// Private key, when requested.
    pub private_key: Option<Zeroizing<[u8; 32]>>,

    /// Extended private key, when requested.
    pub xpriv: Option<ExportedXpriv>,
}

impl fmt::Debug for ExportedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedKey")
            .field("public_key", &hex::encode(&self.public_key))
            .field("xpub", &self.xpub)
            .field("has_private_key", &self.private_key.is_some())
            .finish_non_exhaustive()
    }
}

/// What a [`Keychain::sign_tx`] callback receives.
#[derive(Debug)]
pub struct SignTxInput<Tx> {
    /// The transaction to sign, passed through untouched.
    pub unsigned_tx: Tx,

    /// Derived keys bucketed by the purpose of their path. Later keys replace earlier keys of
    /// the same purpose.
    pub hdkeys: BTreeMap<u32, DerivedKey>,

    /// The private key, when exactly one key was requested.
    pub private_key: Option<Zeroizing<[u8; 32]>>,
}

struct SeedSlot {
    seed_id: SeedId,
    masters: MasterKeys,
    locked: bool,
}

/// Holds the masters of at most one seed and gates private key material behind a lock flag.
///
/// Public keys stay derivable while the seed is locked. Everything that needs a private key fails
/// with [`KeychainError::PrivateKeysLocked`] until the seed is unlocked again.
pub struct Keychain {
    state: RwLock<Option<SeedSlot>>,
    legacy: LegacyPrivToPubMap,
}

impl Keychain {
    /// Creates an empty keychain.
    pub fn new(legacy: LegacyPrivToPubMap) -> Self {
        Self {
            state: RwLock::new(None),
            legacy,
        }
    }

    /// Creates a keychain holding `seed`, unlocked.
    pub fn from_seed(seed: &Seed, legacy: LegacyPrivToPubMap) -> KeychainResult<Self> {
        let keychain = Self::new(legacy);
        keychain.add_seed(seed)?;
        Ok(keychain)
    }

    /// The legacy public key mappers.
    pub const fn legacy_priv_to_pub(&self) -> &LegacyPrivToPubMap {
        &self.legacy
    }

    /// Registers `seed`. The seed starts unlocked.
    pub fn add_seed(&self, seed: &Seed) -> KeychainResult<SeedId> {
        let mut state = self.state.write();
        if let Some(slot) = state.as_ref() {
            return Err(KeychainError::SeedAlreadyInitialized(slot.seed_id.clone()));
        }

        let masters = MasterKeys::from_seed(seed)?;
        let seed_id = masters.seed_id();
        *state = Some(SeedSlot {
            seed_id: seed_id.clone(),
            masters,
            locked: false,
        });

        info!(%seed_id, "added seed");
        Ok(seed_id)
    }

    /// Drops the seed and its masters, returning its id.
    pub fn remove_seed(&self) -> Option<SeedId> {
        let slot = self.state.write().take()?;
        info!(seed_id = %slot.seed_id, "removed seed");
        Some(slot.seed_id)
    }

    /// Id of the held seed.
    pub fn seed_id(&self) -> Option<SeedId> {
        self.state.read().as_ref().map(|slot| slot.seed_id.clone())
    }

    /// Locks private key material. Locking a locked seed is a no-op.
    pub fn lock_private_keys(&self) -> KeychainResult<()> {
        let mut state = self.state.write();
        let slot = state.as_mut().ok_or(KeychainError::SeedNotInitialized)?;
        if !slot.locked {
            slot.locked = true;
            info!(seed_id = %slot.seed_id, "locked private keys");
        }
        Ok(())
    }

    /// Unlocks private key material. `seed` must be the held seed.
    pub fn unlock_private_keys(&self, seed: &Seed) -> KeychainResult<()> {
        let seed_id = SeedId::from_seed(seed)?;

        let mut state = self.state.write();
        let slot = state.as_mut().ok_or(KeychainError::SeedNotInitialized)?;
        if slot.seed_id != seed_id {
            warn!(expected = %slot.seed_id, got = %seed_id, "rejected unlock with foreign seed");
            return Err(KeychainError::SeedMismatch);
        }
        if !slot.locked {
            warn!(%seed_id, "rejected unlock of unlocked seed");
            return Err(KeychainError::AlreadyUnlocked);
        }

        slot.locked = false;
        info!(%seed_id, "unlocked private keys");
        Ok(())
    }

    /// Whether private key material is locked.
    pub fn are_private_keys_locked(&self) -> KeychainResult<bool> {
        self.state
            .read()
            .as_ref()
            .map(|slot| slot.locked)
            .ok_or(KeychainError::SeedNotInitialized)
    }

    fn derive_unchecked(slot: &SeedSlot, key_id: &KeyIdentifier) -> KeychainResult<DerivedKey> {
        debug!(seed_id = %slot.seed_id, %key_id, "deriving key");
        Ok(slot
            .masters
            .derive(key_id.derivation_algorithm(), key_id.derivation_path())?)
    }

    /// Derives the key of `key_id`, failing while private keys are locked.
    pub fn derive_private_key(&self, key_id: &KeyIdentifier) -> KeychainResult<DerivedKey> {
        let state = self.state.read();
        let slot = state.as_ref().ok_or(KeychainError::SeedNotInitialized)?;
        if slot.locked {
            return Err(KeychainError::PrivateKeysLocked);
        }
        Self::derive_unchecked(slot, key_id)
    }

    /// Exports the key of `key_id`.
    ///
    /// The public key depends on the key type:
    /// - `legacy` keys go through the asset's legacy mapper.
    /// - `nacl` keys derived with BIP32 use the Ed25519 key seeded by the private key.
    /// - Everything else uses the public key of the derivation.
    pub async fn export_key(
        &self,
        key_id: &KeyIdentifier,
        options: ExportOptions,
    ) -> KeychainResult<ExportedKey> {
        let key = {
            let state = self.state.read();
            let slot = state.as_ref().ok_or(KeychainError::SeedNotInitialized)?;
            if options.export_private && slot.locked {
                return Err(KeychainError::PrivateKeysLocked);
            }
            Self::derive_unchecked(slot, key_id)?
        };

        let public_key = match key_id.key_type() {
            KeyType::Legacy => {
                let asset_name = key_id.asset_name().unwrap_or_default();
                let mapper = self
                    .legacy
                    .get(asset_name)
                    .ok_or_else(|| KeychainError::NoLegacyMapper(asset_name.to_owned()))?;
                mapper
                    .priv_to_pub(key.private_key())
                    .await
                    .map_err(|source| KeychainError::LegacyMapper {
                        asset_name: asset_name.to_owned(),
                        source,
                    })?
            }
            KeyType::Nacl if key.algorithm() == DerivationAlgorithm::Bip32 => {
                ed25519::priv_to_pub(key.private_key()).to_vec()
            }
            _ => key.public_key().to_vec(),
        };

        let (private_key, xpriv) = if options.export_private {
            (Some(Zeroizing::new(*key.private_key())), Some(key.xpriv()))
        } else {
            (None, None)
        };

        Ok(ExportedKey {
            public_key,
            xpub: key.xpub(),
            private_key,
            xpriv,
        })
    }

    /// Derives the keys of `key_ids` and hands them to `sign` along with `unsigned_tx`.
    pub async fn sign_tx<Tx, F, Fut, T>(
        &self,
        key_ids: &[KeyIdentifier],
        sign: F,
        unsigned_tx: Tx,
    ) -> KeychainResult<T>
    where
        F: FnOnce(SignTxInput<Tx>) -> Fut,
        Fut: Future<Output = T>,
    {
        let hdkeys = {
            let state = self.state.read();
            let slot = state.as_ref().ok_or(KeychainError::SeedNotInitialized)?;
            if slot.locked {
                return Err(KeychainError::PrivateKeysLocked);
            }

            let mut hdkeys = BTreeMap::new();
            for key_id in key_ids {
                let purpose = key_id.derivation_path().purpose_index()?;
                hdkeys.insert(purpose, Self::derive_unchecked(slot, key_id)?);
            }
            hdkeys
        };

        let private_key = match key_ids.len() {
            1 => hdkeys
                .values()
                .next()
                .map(|key| Zeroizing::new(*key.private_key())),
            _ => None,
        };

        Ok(sign(SignTxInput {
            unsigned_tx,
            hdkeys,
            private_key,
        })
        .await)
    }

    /// A keychain without a seed sharing this keychain's legacy mappers.
    pub fn clone_empty(&self) -> Self {
        Self::new(self.legacy.clone())
    }
}

impl PrivateKeySource for Keychain {
    type Locator = KeyIdentifier;

    fn unlocked_key(&self, key_id: &KeyIdentifier) -> KeychainResult<DerivedKey> {
        self.derive_private_key(key_id)
    }
}

impl fmt::Debug for Keychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Keychain")
            .field("seed_id", &state.as_ref().map(|slot| &slot.seed_id))
            .field("locked", &state.as_ref().map(|slot| slot.locked))
            .field("legacy", &self.legacy)
            .finish()
    }
}
