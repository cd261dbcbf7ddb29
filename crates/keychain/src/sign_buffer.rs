//! One entry point for every signature family.
//!
//! A request is checked in a fixed order before any key is touched:
//!
//! 1. `ecdsa` and `schnorr` need exactly 32 bytes of data.
//! 2. The signature type must fit the key type: `ecdsa`, `schnorr` and `schnorrZ` need
//!    `secp256k1` keys, `ed25519` needs `nacl` keys.
//! 3. Only the options of the signature type may be set: `enc` and `extraEntropy` for `ecdsa`,
//!    `tweak` and `extraEntropy` for `schnorr`, none for the others.
//! 4. The seed must be unlocked.

use std::{fmt, str::FromStr};

use hdkeychain_key_identifier::KeyType;
use serde::{Deserialize, Serialize};

use crate::{
    KeychainError, KeychainResult,
    account::KeyLocator,
    crypto::{Encoding, SignatureOutput},
    facade::{Ed25519Api, PrivateKeySource, Secp256k1Api},
};

/// Signature family of a [`SignBufferRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureType {
    /// secp256k1 ECDSA.
    #[serde(rename = "ecdsa")]
    Ecdsa,

    /// BIP340 Schnorr.
    #[serde(rename = "schnorr")]
    Schnorr,

    /// Zilliqa Schnorr.
    #[serde(rename = "schnorrZ")]
    SchnorrZ,

    /// Ed25519.
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SignatureType {
    /// The wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ecdsa => "ecdsa",
            Self::Schnorr => "schnorr",
            Self::SchnorrZ => "schnorrZ",
            Self::Ed25519 => "ed25519",
        }
    }

    /// The only key type this signature type works with.
    pub const fn key_type(&self) -> KeyType {
        match self {
            Self::Ecdsa | Self::Schnorr | Self::SchnorrZ => KeyType::Secp256k1,
            Self::Ed25519 => KeyType::Nacl,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ecdsa" => Ok(Self::Ecdsa),
            "schnorr" => Ok(Self::Schnorr),
            "schnorrZ" => Ok(Self::SchnorrZ),
            "ed25519" => Ok(Self::Ed25519),
            other => Err(format!("unknown signature type `{other}`")),
        }
    }
}

/// Arguments of [`SignBuffer::sign_buffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignBufferRequest {
    /// Bytes to sign. A 32 byte digest for `ecdsa` and `schnorr`.
    pub data: Vec<u8>,

    /// Signature family.
    pub signature_type: SignatureType,

    /// ECDSA output layout. Defaults to DER.
    pub enc: Option<Encoding>,

    /// Taproot tweak for Schnorr.
    pub tweak: Option<[u8; 32]>,

    /// Additional nonce data for ECDSA and Schnorr.
    pub extra_entropy: Option<[u8; 32]>,
}

impl SignBufferRequest {
    /// A request without options.
    pub fn new(signature_type: SignatureType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            signature_type,
            enc: None,
            tweak: None,
            extra_entropy: None,
        }
    }

    /// Sets the ECDSA output layout.
    pub const fn with_enc(mut self, enc: Encoding) -> Self {
        self.enc = Some(enc);
        self
    }

    /// Sets the Schnorr tweak.
    pub const fn with_tweak(mut self, tweak: [u8; 32]) -> Self {
        self.tweak = Some(tweak);
        self
    }

    /// Sets the extra nonce entropy.
    pub const fn with_extra_entropy(mut self, extra_entropy: [u8; 32]) -> Self {
        self.extra_entropy = Some(extra_entropy);
        self
    }

    fn digest(&self) -> KeychainResult<[u8; 32]> {
        self.data
            .as_slice()
            .try_into()
            .map_err(|_| KeychainError::InvalidDataLength {
                expected: 32,
                actual: self.data.len(),
            })
    }

    fn options_allowed(&self) -> bool {
        let (enc, tweak, extra_entropy) = match self.signature_type {
            SignatureType::Ecdsa => (true, false, true),
            SignatureType::Schnorr => (false, true, true),
            SignatureType::SchnorrZ | SignatureType::Ed25519 => (false, false, false),
        };

        (enc || self.enc.is_none())
            && (tweak || self.tweak.is_none())
            && (extra_entropy || self.extra_entropy.is_none())
    }
}

/// A signature produced by [`SignBuffer::sign_buffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSignature {
    /// ECDSA in the requested layout.
    Ecdsa(SignatureOutput),

    /// 64 byte Schnorr, SchnorrZ or Ed25519 signature.
    Compact([u8; 64]),
}

impl BufferSignature {
    /// The flat bytes, for every layout that has them.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Ecdsa(output) => output.as_bytes(),
            Self::Compact(signature) => Some(signature),
        }
    }
}

/// The `signBuffer` dispatcher.
pub trait SignBuffer: PrivateKeySource {
    /// Validates `request` and signs with the key at `locator`.
    fn sign_buffer(
        &self,
        locator: &Self::Locator,
        request: &SignBufferRequest,
    ) -> KeychainResult<BufferSignature> {
        let signature_type = request.signature_type;
        if matches!(signature_type, SignatureType::Ecdsa | SignatureType::Schnorr) {
            request.digest()?;
        }

        let key_type = locator.key_id().key_type();
        if key_type != signature_type.key_type() {
            return Err(KeychainError::UnsupportedSignatureType {
                key_type,
                signature_type,
            });
        }

        if !request.options_allowed() {
            return Err(KeychainError::UnsupportedOptions(signature_type));
        }

        Ok(match signature_type {
            SignatureType::Ecdsa => BufferSignature::Ecdsa(self.sign_ecdsa(
                locator,
                &request.digest()?,
                request.enc.unwrap_or_default(),
                request.extra_entropy.as_ref(),
            )?),
            SignatureType::Schnorr => BufferSignature::Compact(self.sign_schnorr(
                locator,
                &request.digest()?,
                request.tweak.as_ref(),
                request.extra_entropy.as_ref(),
            )?),
            SignatureType::SchnorrZ => {
                BufferSignature::Compact(self.sign_schnorr_z(locator, &request.data)?)
            }
            SignatureType::Ed25519 => {
                BufferSignature::Compact(self.sign_ed25519(locator, &request.data)?)
            }
        })
    }
}

impl<T: PrivateKeySource + ?Sized> SignBuffer for T {}
