//! secp256k1 ECDSA and BIP340 Schnorr over derived private keys.

use std::{fmt, str::FromStr};

use secp256k1::{
    Keypair, Message, PublicKey, SECP256K1, SecretKey, ecdsa::RecoverableSignature,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::tweak::tweak_private_key;
use crate::{KeychainError, KeychainResult};

/// Output layout of an ECDSA signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// ASN.1 DER.
    #[default]
    Der,

    /// `r || s`, 64 bytes.
    Sig,

    /// `r || s || recovery`, 65 bytes. Also selected by `binary`.
    SigRec,

    /// `recovery || r || s`, 65 bytes.
    RecSig,

    /// `r || s` and the recovery id side by side.
    SigAndRec,

    /// `r`, `s` and the recovery id as separate fields. Deprecated in favor of
    /// [`Encoding::SigAndRec`].
    Raw,
}

impl Encoding {
    /// The selector string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Der => "der",
            Self::Sig => "sig",
            Self::SigRec => "sig|rec",
            Self::RecSig => "rec|sig",
            Self::SigAndRec => "sig,rec",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "der" => Ok(Self::Der),
            "sig" => Ok(Self::Sig),
            "sig|rec" | "binary" => Ok(Self::SigRec),
            "rec|sig" => Ok(Self::RecSig),
            "sig,rec" => Ok(Self::SigAndRec),
            "raw" => Ok(Self::Raw),
            other => Err(KeychainError::InvalidEncoding(other.to_owned())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = KeychainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.as_str().to_owned()
    }
}

/// A signature in the layout its [`Encoding`] asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureOutput {
    /// Flat byte layouts: `der`, `sig`, `sig|rec` and `rec|sig`.
    Bytes(Vec<u8>),

    /// `sig,rec`.
    SigRec {
        /// `r || s`.
        signature: [u8; 64],
        /// Recovery id, 0 or 1.
        recovery: u8,
    },

    /// `raw`.
    Raw {
        /// Big-endian `r`.
        r: [u8; 32],
        /// Big-endian `s`.
        s: [u8; 32],
        /// Recovery id, 0 or 1.
        recovery_param: u8,
    },
}

impl SignatureOutput {
    /// The flat bytes, for the layouts that have them.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

pub(crate) fn secret_key(private_key: &[u8; 32]) -> KeychainResult<SecretKey> {
    SecretKey::from_slice(private_key).map_err(|_| KeychainError::InvalidPrivateKey)
}

/// Signs the 32 byte digest `data` with RFC6979 nonces and low-S normalization.
pub fn sign_ecdsa(
    private_key: &[u8; 32],
    data: &[u8; 32],
    encoding: Encoding,
    extra_entropy: Option<&[u8; 32]>,
) -> KeychainResult<SignatureOutput> {
    let secret = secret_key(private_key)?;
    let message = Message::from_digest(*data);
    let signature: RecoverableSignature = match extra_entropy {
        Some(entropy) => {
            SECP256K1.sign_ecdsa_recoverable_with_noncedata(&message, &secret, entropy)
        }
        None => SECP256K1.sign_ecdsa_recoverable(&message, &secret),
    };

    let (recovery_id, compact) = signature.serialize_compact();
    let recovery = recovery_id.to_i32() as u8;

    Ok(match encoding {
        Encoding::Der => {
            SignatureOutput::Bytes(signature.to_standard().serialize_der().to_vec())
        }
        Encoding::Sig => SignatureOutput::Bytes(compact.to_vec()),
        Encoding::SigRec => {
            let mut out = compact.to_vec();
            out.push(recovery);
            SignatureOutput::Bytes(out)
        }
        Encoding::RecSig => {
            let mut out = Vec::with_capacity(65);
            out.push(recovery);
            out.extend_from_slice(&compact);
            SignatureOutput::Bytes(out)
        }
        Encoding::SigAndRec => SignatureOutput::SigRec {
            signature: compact,
            recovery,
        },
        Encoding::Raw => {
            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&compact[..32]);
            s.copy_from_slice(&compact[32..]);
            SignatureOutput::Raw {
                r,
                s,
                recovery_param: recovery,
            }
        }
    })
}

/// BIP340 signature over the 32 byte `data`, optionally with a Taproot style tweak.
///
/// Without `extra_entropy` the auxiliary randomness is drawn from the thread RNG.
pub fn sign_schnorr(
    private_key: &[u8; 32],
    data: &[u8; 32],
    tweak: Option<&[u8; 32]>,
    extra_entropy: Option<&[u8; 32]>,
) -> KeychainResult<[u8; 64]> {
    let mut secret = secret_key(private_key)?;
    if let Some(tweak) = tweak {
        secret = tweak_private_key(&secret, tweak)?;
    }

    let keypair = Keypair::from_secret_key(SECP256K1, &secret);
    let message = Message::from_digest(*data);
    let signature = match extra_entropy {
        Some(aux) => SECP256K1.sign_schnorr_with_aux_rand(&message, &keypair, aux),
        None => SECP256K1.sign_schnorr(&message, &keypair),
    };

    Ok(signature.serialize())
}

/// Compressed public key of `private_key`, after the tweak when one is given.
pub fn public_key(private_key: &[u8; 32], tweak: Option<&[u8; 32]>) -> KeychainResult<[u8; 33]> {
    let mut secret = secret_key(private_key)?;
    if let Some(tweak) = tweak {
        secret = tweak_private_key(&secret, tweak)?;
    }
    Ok(PublicKey::from_secret_key(SECP256K1, &secret).serialize())
}

/// A secp256k1 signer detached from the keychain it was created from.
///
/// Holds its own copy of the private key, wiped on drop.
pub struct Secp256k1Signer {
    private_key: Zeroizing<[u8; 32]>,
}

impl Secp256k1Signer {
    /// Wraps a copy of `private_key`.
    pub fn new(private_key: &[u8; 32]) -> KeychainResult<Self> {
        secret_key(private_key)?;
        Ok(Self {
            private_key: Zeroizing::new(*private_key),
        })
    }

    /// See [`sign_ecdsa`].
    pub fn sign_ecdsa(
        &self,
        data: &[u8; 32],
        encoding: Encoding,
        extra_entropy: Option<&[u8; 32]>,
    ) -> KeychainResult<SignatureOutput> {
        sign_ecdsa(&self.private_key, data, encoding, extra_entropy)
    }

    /// See [`sign_schnorr`].
    pub fn sign_schnorr(
        &self,
        data: &[u8; 32],
        tweak: Option<&[u8; 32]>,
        extra_entropy: Option<&[u8; 32]>,
    ) -> KeychainResult<[u8; 64]> {
        sign_schnorr(&self.private_key, data, tweak, extra_entropy)
    }

    /// See [`public_key`].
    pub fn public_key(&self, tweak: Option<&[u8; 32]>) -> KeychainResult<[u8; 33]> {
        public_key(&self.private_key, tweak)
    }
}

impl fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let public_key = self.public_key(None).map(hex::encode).unwrap_or_default();
        f.debug_struct("Secp256k1Signer")
            .field("public_key", &public_key)
            .finish_non_exhaustive()
    }
}
