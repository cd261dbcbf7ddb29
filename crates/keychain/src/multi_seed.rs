//! Keychain over any number of seeds.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    future::Future,
    sync::Arc,
};

use hdkeychain_key_deriv::{DerivedKey, Seed, SeedId};
use hdkeychain_key_identifier::KeyIdentifier;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    KeychainError, KeychainResult,
    account::{AccountSource, KeySource, SeedSelector},
    facade::PrivateKeySource,
    keychain::{ExportOptions, ExportedKey, Keychain, SignTxInput},
    legacy::LegacyPrivToPubMap,
};

#[derive(Default)]
struct Registry {
    keychains: HashMap<SeedId, Arc<Keychain>>,
    primary: Option<SeedId>,
}

impl Registry {
    fn resolve(&self, selector: &SeedSelector) -> KeychainResult<SeedId> {
        match selector {
            SeedSelector::Id(seed_id) => Ok(seed_id.clone()),
            SeedSelector::Account(account) => match account.source {
                AccountSource::Wallet => self.primary.clone().ok_or(KeychainError::NoPrimarySeed),
                AccountSource::Seed => account
                    .id
                    .clone()
                    .ok_or(KeychainError::MissingAccountSeedId {
                        index: account.index,
                    }),
            },
        }
    }

    fn get(&self, seed_id: &SeedId) -> KeychainResult<&Arc<Keychain>> {
        self.keychains
            .get(seed_id)
            .ok_or_else(|| KeychainError::SeedNotFound(seed_id.clone()))
    }
}

/// Routes every operation to the [`Keychain`] of one registered seed.
///
/// Seeds are addressed through a [`SeedSelector`]. Wallet-sourced accounts resolve to the
/// primary seed, seed-sourced accounts to the seed they name.
pub struct MultiSeedKeychain {
    inner: RwLock<Registry>,
    legacy: LegacyPrivToPubMap,
}

impl MultiSeedKeychain {
    /// Creates a keychain without seeds.
    pub fn new(legacy: LegacyPrivToPubMap) -> Self {
        Self {
            inner: RwLock::new(Registry::default()),
            legacy,
        }
    }

    /// Registers `seed`, unlocked.
    pub fn add_seed(&self, seed: &Seed) -> KeychainResult<SeedId> {
        let seed_id = SeedId::from_seed(seed)?;

        let mut inner = self.inner.write();
        if inner.keychains.contains_key(&seed_id) {
            return Err(KeychainError::DuplicateSeed(seed_id));
        }
        let keychain = Keychain::from_seed(seed, self.legacy.clone())?;
        inner.keychains.insert(seed_id.clone(), Arc::new(keychain));

        info!(%seed_id, "registered seed");
        Ok(seed_id)
    }

    /// Marks `seed` as the primary seed, registering it first when needed.
    pub fn set_primary_seed(&self, seed: &Seed) -> KeychainResult<SeedId> {
        let seed_id = SeedId::from_seed(seed)?;

        let mut inner = self.inner.write();
        if !inner.keychains.contains_key(&seed_id) {
            let keychain = Keychain::from_seed(seed, self.legacy.clone())?;
            inner.keychains.insert(seed_id.clone(), Arc::new(keychain));
        }
        inner.primary = Some(seed_id.clone());

        info!(%seed_id, "set primary seed");
        Ok(seed_id)
    }

    /// Id of the primary seed.
    pub fn primary_seed_id(&self) -> Option<SeedId> {
        self.inner.read().primary.clone()
    }

    /// Ids of all registered seeds, sorted.
    pub fn seed_ids(&self) -> Vec<SeedId> {
        let mut seed_ids: Vec<_> = self.inner.read().keychains.keys().cloned().collect();
        seed_ids.sort();
        seed_ids
    }

    /// Removes the registered ones of `seeds` and returns their ids.
    pub fn remove_seeds(&self, seeds: &[Seed]) -> KeychainResult<Vec<SeedId>> {
        let seed_ids = seeds
            .iter()
            .map(SeedId::from_seed)
            .collect::<Result<Vec<_>, _>>()?;

        let mut inner = self.inner.write();
        let mut removed = Vec::new();
        for seed_id in seed_ids {
            let Some(keychain) = inner.keychains.remove(&seed_id) else {
                continue;
            };
            keychain.remove_seed();
            if inner.primary.as_ref() == Some(&seed_id) {
                inner.primary = None;
            }
            info!(%seed_id, "unregistered seed");
            removed.push(seed_id);
        }

        Ok(removed)
    }

    /// Removes every seed and returns their ids, sorted.
    pub fn remove_all_seeds(&self) -> Vec<SeedId> {
        let mut inner = self.inner.write();
        inner.primary = None;

        let mut removed: Vec<_> = inner
            .keychains
            .drain()
            .filter_map(|(_, keychain)| keychain.remove_seed())
            .collect();
        removed.sort();
        removed
    }

    /// Locks every seed.
    pub fn lock_private_keys(&self) -> KeychainResult<()> {
        let inner = self.inner.read();
        for keychain in inner.keychains.values() {
            keychain.lock_private_keys()?;
        }
        Ok(())
    }

    /// Locks the seed `seed_id`.
    pub fn lock_seed(&self, seed_id: &SeedId) -> KeychainResult<()> {
        self.inner.read().get(seed_id)?.lock_private_keys()
    }

    /// Unlocks every seed.
    ///
    /// `seeds` must be exactly the registered seeds, all locked. Nothing is unlocked unless every
    /// check passes.
    pub fn unlock_private_keys(&self, seeds: &[Seed]) -> KeychainResult<()> {
        let seed_ids = seeds
            .iter()
            .map(SeedId::from_seed)
            .collect::<Result<Vec<_>, _>>()?;

        let inner = self.inner.write();
        let distinct: BTreeSet<_> = seed_ids.iter().collect();
        if distinct.len() != inner.keychains.len() || seed_ids.len() != inner.keychains.len() {
            warn!(
                expected = inner.keychains.len(),
                actual = distinct.len(),
                "rejected unlock with wrong seed count"
            );
            return Err(KeychainError::SeedCountMismatch {
                expected: inner.keychains.len(),
                actual: distinct.len(),
            });
        }

        for seed_id in &seed_ids {
            if !inner.get(seed_id)?.are_private_keys_locked()? {
                warn!(%seed_id, "rejected unlock of unlocked seed");
                return Err(KeychainError::AlreadyUnlocked);
            }
        }

        for (seed, seed_id) in seeds.iter().zip(&seed_ids) {
            inner.get(seed_id)?.unlock_private_keys(seed)?;
        }
        Ok(())
    }

    /// Unlocks one seed.
    pub fn unlock_seed(&self, seed: &Seed) -> KeychainResult<()> {
        let seed_id = SeedId::from_seed(seed)?;
        self.inner.read().get(&seed_id)?.unlock_private_keys(seed)
    }

    /// Whether every seed of `seed_ids` is locked. An empty list means every registered seed.
    pub fn are_private_keys_locked(&self, seed_ids: &[SeedId]) -> KeychainResult<bool> {
        let inner = self.inner.read();
        if seed_ids.is_empty() {
            for keychain in inner.keychains.values() {
                if !keychain.are_private_keys_locked()? {
                    return Ok(false);
                }
            }
            return Ok(true);
        }

        for seed_id in seed_ids {
            if !inner.get(seed_id)?.are_private_keys_locked()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn keychain(&self, selector: &SeedSelector) -> KeychainResult<Arc<Keychain>> {
        let inner = self.inner.read();
        let seed_id = inner.resolve(selector)?;
        debug!(%seed_id, "routing to seed");
        inner.get(&seed_id).cloned()
    }

    /// [`Keychain::export_key`] on the selected seed.
    pub async fn export_key(
        &self,
        source: &KeySource,
        options: ExportOptions,
    ) -> KeychainResult<ExportedKey> {
        let keychain = self.keychain(&source.seed)?;
        keychain.export_key(&source.key_id, options).await
    }

    /// [`Keychain::sign_tx`] on the selected seed.
    pub async fn sign_tx<Tx, F, Fut, T>(
        &self,
        seed: &SeedSelector,
        key_ids: &[KeyIdentifier],
        sign: F,
        unsigned_tx: Tx,
    ) -> KeychainResult<T>
    where
        F: FnOnce(SignTxInput<Tx>) -> Fut,
        Fut: Future<Output = T>,
    {
        let keychain = self.keychain(seed)?;
        keychain.sign_tx(key_ids, sign, unsigned_tx).await
    }

    /// A keychain without seeds sharing this keychain's legacy mappers.
    pub fn clone_empty(&self) -> Self {
        Self::new(self.legacy.clone())
    }
}

impl PrivateKeySource for MultiSeedKeychain {
    type Locator = KeySource;

    fn unlocked_key(&self, source: &KeySource) -> KeychainResult<DerivedKey> {
        self.keychain(&source.seed)?
            .derive_private_key(&source.key_id)
    }
}

impl fmt::Debug for MultiSeedKeychain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSeedKeychain")
            .field("seed_ids", &self.seed_ids())
            .field("primary", &self.primary_seed_id())
            .field("legacy", &self.legacy)
            .finish()
    }
}
