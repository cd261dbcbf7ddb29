use bitcoin::{
    NetworkKind,
    bip32::{ChildNumber, Xpriv},
};
use hdkeychain_key_identifier::{DerivationAlgorithm, DerivationPath};
use secp256k1::SECP256K1;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    DerivationError, Seed, SeedId,
    derive::{DerivedKey, DerivedNode},
    slip10::Slip10Node,
};

/// Master nodes derived from one seed, one per [`DerivationAlgorithm`].
///
/// - BIP32: `HMAC-SHA512("Bitcoin seed", seed)` over secp256k1, mainnet version bytes.
/// - SLIP10: `HMAC-SHA512("ed25519 seed", seed)` over Ed25519.
pub struct MasterKeys {
    /// BIP32 master [`Xpriv`].
    bip32: Xpriv,

    /// SLIP10 Ed25519 master node.
    slip10: Slip10Node,
}

impl MasterKeys {
    /// Derives both masters from `seed`.
    pub fn from_seed(seed: &Seed) -> Result<Self, DerivationError> {
        let bip32 = Xpriv::new_master(NetworkKind::Main, seed.as_bytes())?;
        let slip10 = Slip10Node::from_seed(seed.as_bytes());

        Ok(Self { bip32, slip10 })
    }

    /// Id of the seed these masters come from.
    pub fn seed_id(&self) -> SeedId {
        SeedId::from_master(&self.bip32)
    }

    /// Walks the master of `algorithm` down `path`.
    ///
    /// Hardening is taken from the path as is. SLIP10 fails on any non-hardened segment.
    pub fn derive(
        &self,
        algorithm: DerivationAlgorithm,
        path: &DerivationPath,
    ) -> Result<DerivedKey, DerivationError> {
        let node = match algorithm {
            DerivationAlgorithm::Bip32 => {
                DerivedNode::Bip32(self.bip32.derive_priv(SECP256K1, path)?)
            }
            DerivationAlgorithm::Slip10 => DerivedNode::Slip10(self.slip10.derive(path.as_ref())?),
        };

        Ok(DerivedKey::new(node))
    }
}

impl std::fmt::Debug for MasterKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKeys")
            .field("seed_id", &self.seed_id())
            .finish_non_exhaustive()
    }
}

/// Wipes every field of an [`Xpriv`] that can be wiped.
///
/// `network` is public and stays. [`secp256k1::SecretKey::non_secure_erase`] writes `1`s rather
/// than `0`s, since an all-zero secret key is invalid.
pub(crate) fn erase_xpriv(xpriv: &mut Xpriv) {
    xpriv.depth.zeroize();
    {
        let fingerprint: &mut [u8; 4] = xpriv.parent_fingerprint.as_mut();
        fingerprint.zeroize();
    }
    xpriv.private_key.non_secure_erase();
    {
        let chaincode: &mut [u8; 32] = xpriv.chain_code.as_mut();
        chaincode.zeroize();
    }
    xpriv.child_number = if xpriv.child_number.is_normal() {
        ChildNumber::Normal { index: 0 }
    } else {
        ChildNumber::Hardened { index: 0 }
    };
}

impl Drop for MasterKeys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for MasterKeys {
    #[inline]
    fn zeroize(&mut self) {
        let Self { bip32, slip10 } = self;

        erase_xpriv(bip32);
        slip10.zeroize();
    }
}

impl ZeroizeOnDrop for MasterKeys {}
