use std::{fmt, str::FromStr};

use bitcoin::{NetworkKind, bip32::Xpriv};
use secp256k1::SECP256K1;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{DerivationError, keys::erase_xpriv};

/// Length of a seed in bytes.
pub const SEED_LENGTH: usize = 64;

/// Root secret every key of a keychain is derived from.
///
/// The bytes are wiped when the seed is dropped. [`Debug`] never prints them.
#[derive(Clone, PartialEq, Eq)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// Copies a seed out of `bytes`, which must be exactly [`SEED_LENGTH`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DerivationError> {
        let bytes: [u8; SEED_LENGTH] = bytes
            .try_into()
            .map_err(|_| DerivationError::InvalidSeedLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Raw seed bytes.
    pub const fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl From<[u8; SEED_LENGTH]> for Seed {
    fn from(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

impl Zeroize for Seed {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for Seed {}

/// Non-secret identifier of a [`Seed`].
///
/// This is the hex encoded BIP32 identifier (HASH160 of the master public key) of the seed's
/// master node, so identical seeds always share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeedId(String);

impl SeedId {
    /// Length of the hex encoding.
    pub const HEX_LENGTH: usize = 40;

    /// Computes the id of `seed`.
    pub fn from_seed(seed: &Seed) -> Result<Self, DerivationError> {
        let mut master = Xpriv::new_master(NetworkKind::Main, seed.as_bytes())?;
        let id = Self::from_master(&master);
        erase_xpriv(&mut master);
        Ok(id)
    }

    pub(crate) fn from_master(master: &Xpriv) -> Self {
        Self(master.identifier(SECP256K1).to_string())
    }

    /// The hex encoding.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SeedId {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let is_lower_hex = s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if s.len() != Self::HEX_LENGTH || !is_lower_hex || hex::decode(s).is_err() {
            return Err(DerivationError::InvalidSeedId(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for SeedId {
    type Error = DerivationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeedId> for String {
    fn from(id: SeedId) -> Self {
        id.0
    }
}
