//! Addressing a seed and a key inside a multi-seed keychain.

use hdkeychain_key_deriv::SeedId;
use hdkeychain_key_identifier::KeyIdentifier;
use serde::{Deserialize, Serialize};

/// Where a wallet account's keys come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountSource {
    /// The wallet's own default account, backed by the primary seed.
    Wallet,

    /// An account backed by the seed named in [`WalletAccount::id`].
    Seed,
}

/// A wallet account as the rest of the wallet refers to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAccount {
    /// Backing of the account.
    pub source: AccountSource,

    /// Seed id for seed-sourced accounts.
    #[serde(default)]
    pub id: Option<SeedId>,

    /// Account index.
    pub index: u32,
}

impl WalletAccount {
    /// The default account of the wallet.
    pub const fn primary(index: u32) -> Self {
        Self {
            source: AccountSource::Wallet,
            id: None,
            index,
        }
    }

    /// An account backed by `seed_id`.
    pub const fn for_seed(seed_id: SeedId, index: u32) -> Self {
        Self {
            source: AccountSource::Seed,
            id: Some(seed_id),
            index,
        }
    }
}

/// Selects one seed of a multi-seed keychain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeedSelector {
    /// A seed by id.
    Id(SeedId),

    /// The seed backing a wallet account.
    Account(WalletAccount),
}

impl From<SeedId> for SeedSelector {
    fn from(seed_id: SeedId) -> Self {
        Self::Id(seed_id)
    }
}

impl From<WalletAccount> for SeedSelector {
    fn from(account: WalletAccount) -> Self {
        Self::Account(account)
    }
}

/// A key of a particular seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySource {
    /// The seed to derive from.
    pub seed: SeedSelector,

    /// The key to derive.
    pub key_id: KeyIdentifier,
}

impl KeySource {
    /// Addresses `key_id` under `seed`.
    pub fn new(seed: impl Into<SeedSelector>, key_id: KeyIdentifier) -> Self {
        Self {
            seed: seed.into(),
            key_id,
        }
    }
}

/// Something that names the [`KeyIdentifier`] an operation runs against.
pub trait KeyLocator {
    /// The addressed key identifier.
    fn key_id(&self) -> &KeyIdentifier;
}

impl KeyLocator for KeyIdentifier {
    fn key_id(&self) -> &KeyIdentifier {
        self
    }
}

impl KeyLocator for KeySource {
    fn key_id(&self) -> &KeyIdentifier {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_json_shape() {
        let account: WalletAccount =
            serde_json::from_str(r#"{ "source": "wallet", "index": 0 }"#).expect("valid account");
        assert_eq!(account, WalletAccount::primary(0));

        let seed_id: SeedId = "0123456789abcdef0123456789abcdef01234567"
            .parse()
            .expect("valid seed id");
        let json = serde_json::to_value(WalletAccount::for_seed(seed_id.clone(), 2))
            .expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "source": "seed", "id": seed_id.as_str(), "index": 2 })
        );
    }
}
