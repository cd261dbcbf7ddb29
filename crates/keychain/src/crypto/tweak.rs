//! Taproot style private key tweaking.

use secp256k1::{Parity, SECP256K1, Scalar, SecretKey};

use crate::{KeychainError, KeychainResult};

/// Adds `tweak` to `secret` after forcing an even public key.
///
/// The secret is negated first when its public key has odd Y, so the result matches the
/// x-only public key tweak of BIP341.
pub(crate) fn tweak_private_key(secret: &SecretKey, tweak: &[u8; 32]) -> KeychainResult<SecretKey> {
    let even = if secret.x_only_public_key(SECP256K1).1 == Parity::Odd {
        secret.negate()
    } else {
        *secret
    };
    let scalar = Scalar::from_be_bytes(*tweak).map_err(|_| KeychainError::InvalidTweak)?;
    even.add_tweak(&scalar).map_err(|_| KeychainError::InvalidTweak)
}
