//! Zilliqa flavored Schnorr signatures over secp256k1.
//!
//! Nonces come from a single round of HMAC-DRBG (SHA-256) seeded with 32 fresh random bytes and
//! the message. Candidates are rejected until the nonce, the challenge and the response are all
//! nonzero, so the loop has no fixed bound. Each draw fails with probability about `2^-128`.

use hmac::{Hmac, Mac};
use k256::{
    FieldBytes, ProjectivePoint, Scalar, U256,
    elliptic_curve::{PrimeField, ops::Reduce, sec1::ToEncodedPoint},
};
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::{KeychainError, KeychainResult};

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(key: &[u8; 32], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

fn drbg_nonce(seed: &[u8; 32], data: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut k = Zeroizing::new([0u8; 32]);
    let mut v = Zeroizing::new([1u8; 32]);

    *k = hmac_sha256(&k, &[v.as_slice(), &[0x00], seed, data]);
    *v = hmac_sha256(&k, &[v.as_slice()]);
    *k = hmac_sha256(&k, &[v.as_slice(), &[0x01], seed, data]);
    *v = hmac_sha256(&k, &[v.as_slice()]);

    Zeroizing::new(hmac_sha256(&k, &[v.as_slice()]))
}

fn compressed(point: ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(true).as_bytes().to_vec()
}

/// Signs `data` as is, returning `r || s`.
///
/// `rng` seeds the nonce generator.
pub fn sign<R: RngCore + CryptoRng>(
    private_key: &[u8; 32],
    data: &[u8],
    rng: &mut R,
) -> KeychainResult<[u8; 64]> {
    let secret = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*private_key)))
        .filter(|scalar| !bool::from(scalar.is_zero()))
        .ok_or(KeychainError::InvalidPrivateKey)?;
    let public_key = compressed(ProjectivePoint::GENERATOR * secret);

    let mut draws = 0u32;
    loop {
        draws += 1;

        let mut seed = Zeroizing::new([0u8; 32]);
        rng.fill_bytes(seed.as_mut_slice());
        let candidate = drbg_nonce(&seed, data);

        let Some(k) = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*candidate)))
            .filter(|scalar| !bool::from(scalar.is_zero()))
        else {
            debug!(draws, "nonce out of range, redrawing");
            continue;
        };

        let q = compressed(ProjectivePoint::GENERATOR * k);
        let challenge = Sha256::new()
            .chain_update(&q)
            .chain_update(&public_key)
            .chain_update(data)
            .finalize();
        let r = <Scalar as Reduce<U256>>::reduce_bytes(&challenge);
        if bool::from(r.is_zero()) {
            debug!(draws, "zero challenge, redrawing");
            continue;
        }

        let s = k - r * secret;
        if bool::from(s.is_zero()) {
            debug!(draws, "zero response, redrawing");
            continue;
        }

        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(&r.to_bytes());
        signature[32..].copy_from_slice(&s.to_bytes());
        return Ok(signature);
    }
}
