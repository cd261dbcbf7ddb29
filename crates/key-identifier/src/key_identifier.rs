//! The [`KeyIdentifier`] value type.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{PathError, PathPurpose, errors::KeyIdentifierError, path::DerivationPath};

/// Key derivation function used to walk a seed down a [`DerivationPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DerivationAlgorithm {
    /// BIP32 over secp256k1.
    #[serde(rename = "BIP32")]
    Bip32,

    /// SLIP10 over Ed25519.
    #[serde(rename = "SLIP10")]
    Slip10,
}

impl DerivationAlgorithm {
    /// Canonical name, `BIP32` or `SLIP10`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bip32 => "BIP32",
            Self::Slip10 => "SLIP10",
        }
    }
}

impl fmt::Display for DerivationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivationAlgorithm {
    type Err = KeyIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BIP32" => Ok(Self::Bip32),
            "SLIP10" => Ok(Self::Slip10),
            other => Err(KeyIdentifierError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

/// The family of key a [`KeyIdentifier`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// secp256k1 key, usable for ECDSA and Schnorr.
    Secp256k1,

    /// Ed25519 key, usable for EdDSA and the sodium constructions.
    Nacl,

    /// Asset-specific key whose public key comes from an injected mapper.
    Legacy,
}

impl KeyType {
    /// Lowercase name as used on the wire.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Secp256k1 => "secp256k1",
            Self::Nacl => "nacl",
            Self::Legacy => "legacy",
        }
    }

    const fn default_for(algorithm: DerivationAlgorithm) -> Self {
        match algorithm {
            DerivationAlgorithm::Bip32 => Self::Secp256k1,
            DerivationAlgorithm::Slip10 => Self::Nacl,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = KeyIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "secp256k1" => Ok(Self::Secp256k1),
            "nacl" => Ok(Self::Nacl),
            "legacy" => Ok(Self::Legacy),
            other => Err(KeyIdentifierError::UnsupportedKeyType(other.to_owned())),
        }
    }
}

/// Unvalidated, wire-shaped fields of a key identifier.
///
/// This is what arrives from callers and what a [`KeyIdentifier`] serializes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyIdentifierParams {
    /// `BIP32` or `SLIP10`.
    pub derivation_algorithm: String,

    /// Path such as `m/44'/0'/0'/0/0`.
    pub derivation_path: String,

    /// Asset the key belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_name: Option<String>,

    /// `secp256k1`, `nacl` or `legacy`. Defaults by algorithm when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

/// Validated, immutable description of a key to derive from a seed.
///
/// Equality and hashing are structural over all four fields, so a `KeyIdentifier` can key a
/// cache directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyIdentifierParams", into = "KeyIdentifierParams")]
pub struct KeyIdentifier {
    derivation_algorithm: DerivationAlgorithm,
    derivation_path: DerivationPath,
    asset_name: Option<String>,
    key_type: KeyType,
}

impl KeyIdentifier {
    /// Creates a key identifier, defaulting the key type by algorithm when `key_type` is `None`.
    pub fn new(
        derivation_algorithm: DerivationAlgorithm,
        derivation_path: &str,
        asset_name: Option<&str>,
        key_type: Option<KeyType>,
    ) -> Result<Self, KeyIdentifierError> {
        Self::from_parts(
            derivation_algorithm,
            derivation_path.parse()?,
            asset_name.map(str::to_owned),
            key_type,
        )
    }

    /// Creates a key identifier from an already parsed path.
    pub fn from_parts(
        derivation_algorithm: DerivationAlgorithm,
        derivation_path: DerivationPath,
        asset_name: Option<String>,
        key_type: Option<KeyType>,
    ) -> Result<Self, KeyIdentifierError> {
        let key_type = key_type.unwrap_or(KeyType::default_for(derivation_algorithm));

        if derivation_algorithm == DerivationAlgorithm::Slip10 && key_type == KeyType::Secp256k1 {
            return Err(KeyIdentifierError::Secp256k1RequiresBip32);
        }

        Ok(Self {
            derivation_algorithm,
            derivation_path,
            asset_name,
            key_type,
        })
    }

    /// Whether `params` would construct a valid key identifier.
    pub fn validate(params: &KeyIdentifierParams) -> bool {
        Self::try_from(params.clone()).is_ok()
    }

    /// Structural equality over all four fields.
    pub fn compare(a: &Self, b: &Self) -> bool {
        a == b
    }

    /// Returns a new identifier whose path is extended by `suffix`, e.g. `0/1`.
    pub fn derive(&self, suffix: &str) -> Result<Self, PathError> {
        Ok(Self {
            derivation_path: self.derivation_path.extend(suffix)?,
            ..self.clone()
        })
    }

    /// Purpose and account index of the path.
    pub fn purpose(&self) -> Result<PathPurpose, PathError> {
        self.derivation_path.purpose()
    }

    /// The derivation algorithm.
    pub const fn derivation_algorithm(&self) -> DerivationAlgorithm {
        self.derivation_algorithm
    }

    /// The derivation path.
    pub const fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }

    /// The asset name, if any.
    pub fn asset_name(&self) -> Option<&str> {
        self.asset_name.as_deref()
    }

    /// The key type.
    pub const fn key_type(&self) -> KeyType {
        self.key_type
    }
}

impl TryFrom<KeyIdentifierParams> for KeyIdentifier {
    type Error = KeyIdentifierError;

    fn try_from(params: KeyIdentifierParams) -> Result<Self, Self::Error> {
        let algorithm: DerivationAlgorithm = params.derivation_algorithm.parse()?;
        let key_type = params.key_type.as_deref().map(str::parse::<KeyType>).transpose()?;

        Self::from_parts(
            algorithm,
            params.derivation_path.parse()?,
            params.asset_name,
            key_type,
        )
    }
}

impl From<KeyIdentifier> for KeyIdentifierParams {
    fn from(key_id: KeyIdentifier) -> Self {
        Self {
            derivation_algorithm: key_id.derivation_algorithm.to_string(),
            derivation_path: key_id.derivation_path.to_string(),
            asset_name: key_id.asset_name,
            key_type: Some(key_id.key_type.to_string()),
        }
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.derivation_path, self.derivation_algorithm)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn params(algorithm: &str, path: &str, key_type: Option<&str>) -> KeyIdentifierParams {
        KeyIdentifierParams {
            derivation_algorithm: algorithm.to_owned(),
            derivation_path: path.to_owned(),
            asset_name: Some("solana".to_owned()),
            key_type: key_type.map(str::to_owned),
        }
    }

    #[test]
    fn defaults_key_type_by_algorithm() {
        let bip32 = KeyIdentifier::new(DerivationAlgorithm::Bip32, "m/44'/0'/0'", None, None)
            .expect("valid");
        assert_eq!(bip32.key_type(), KeyType::Secp256k1);

        let slip10 = KeyIdentifier::new(DerivationAlgorithm::Slip10, "m/44'/501'", None, None)
            .expect("valid");
        assert_eq!(slip10.key_type(), KeyType::Nacl);
    }

    #[test]
    fn rejects_secp256k1_under_slip10() {
        let err = KeyIdentifier::new(
            DerivationAlgorithm::Slip10,
            "m/0'",
            None,
            Some(KeyType::Secp256k1),
        )
        .unwrap_err();
        assert_eq!(err, KeyIdentifierError::Secp256k1RequiresBip32);

        assert!(
            KeyIdentifier::new(DerivationAlgorithm::Bip32, "m/0'", None, Some(KeyType::Nacl))
                .is_ok()
        );
    }

    #[test]
    fn validate_never_fails() {
        assert!(KeyIdentifier::validate(&params("BIP32", "m/44'/60'/0'/0/0", None)));
        assert!(KeyIdentifier::validate(&params("SLIP10", "m/44'/501'/0'", Some("legacy"))));

        assert!(!KeyIdentifier::validate(&params("BIP44", "m/44'", None)));
        assert!(!KeyIdentifier::validate(&params("BIP32", "44'/0'", None)));
        assert!(!KeyIdentifier::validate(&params("BIP32", "m/44'", Some("ed25519"))));
        assert!(!KeyIdentifier::validate(&params("SLIP10", "m/44'", Some("secp256k1"))));
    }

    #[test]
    fn reports_the_failing_field() {
        let err = KeyIdentifier::try_from(params("FOO", "m/0'", None)).unwrap_err();
        assert_eq!(err.to_string(), "FOO is not a valid derivationAlgorithm");

        let err = KeyIdentifier::try_from(params("BIP32", "m/0''", None)).unwrap_err();
        assert!(matches!(err, KeyIdentifierError::InvalidPath(_)));
    }

    #[test]
    fn derive_returns_a_new_identifier() {
        let base = KeyIdentifier::new(
            DerivationAlgorithm::Bip32,
            "m/44'/60'",
            Some("ethereum"),
            None,
        )
        .expect("valid");

        let child = base.derive("0'/0/0").expect("valid suffix");
        assert_eq!(child.derivation_path().to_string(), "m/44'/60'/0'/0/0");
        assert_eq!(child.asset_name(), Some("ethereum"));
        assert_eq!(child.key_type(), base.key_type());
        assert_eq!(base.derivation_path().to_string(), "m/44'/60'");
        assert!(!KeyIdentifier::compare(&base, &child));
    }

    #[test]
    fn equality_and_hash_are_structural() {
        let a = KeyIdentifier::new(DerivationAlgorithm::Bip32, "m/44'/0'", Some("bitcoin"), None)
            .expect("valid");
        let b = KeyIdentifier::try_from(KeyIdentifierParams {
            derivation_algorithm: "BIP32".to_owned(),
            derivation_path: "m/44'/0'".to_owned(),
            asset_name: Some("bitcoin".to_owned()),
            key_type: Some("secp256k1".to_owned()),
        })
        .expect("valid");
        assert!(KeyIdentifier::compare(&a, &b));

        let other_asset =
            KeyIdentifier::new(DerivationAlgorithm::Bip32, "m/44'/0'", Some("litecoin"), None)
                .expect("valid");
        assert!(!KeyIdentifier::compare(&a, &other_asset));

        let set: HashSet<_> = [a, b, other_asset].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn displays_path_and_algorithm() {
        let key_id =
            KeyIdentifier::new(DerivationAlgorithm::Slip10, "m/6649967'/2'/3'", None, None)
                .expect("valid");
        assert_eq!(key_id.to_string(), "m/6649967'/2'/3' (SLIP10)");
    }

    #[test]
    fn json_shape() {
        let key_id = KeyIdentifier::new(
            DerivationAlgorithm::Bip32,
            "m/44'/501'/0'/0/0",
            Some("solana"),
            Some(KeyType::Nacl),
        )
        .expect("valid");

        let json = serde_json::to_value(&key_id).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "derivationAlgorithm": "BIP32",
                "derivationPath": "m/44'/501'/0'/0/0",
                "assetName": "solana",
                "keyType": "nacl",
            })
        );

        let back: KeyIdentifier = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, key_id);

        let invalid = serde_json::json!({
            "derivationAlgorithm": "SLIP10",
            "derivationPath": "m/0'",
            "keyType": "secp256k1",
        });
        assert!(serde_json::from_value::<KeyIdentifier>(invalid).is_err());
    }

    fn arb_key_id() -> impl Strategy<Value = KeyIdentifier> {
        (
            prop_oneof![Just(DerivationAlgorithm::Bip32), Just(DerivationAlgorithm::Slip10)],
            prop::collection::vec(0u32..1000, 0..5),
            prop::option::of("[a-z]{1,8}"),
        )
            .prop_map(|(algorithm, indices, asset)| {
                let path = indices
                    .iter()
                    .fold(String::from("m"), |acc, i| format!("{acc}/{i}'"));
                KeyIdentifier::new(algorithm, &path, asset.as_deref(), None)
                    .expect("generated identifier is valid")
            })
    }

    proptest! {
        #[test]
        fn params_roundtrip(key_id in arb_key_id()) {
            let params = KeyIdentifierParams::from(key_id.clone());
            prop_assert!(KeyIdentifier::validate(&params));
            prop_assert_eq!(KeyIdentifier::try_from(params).expect("valid"), key_id);
        }

        #[test]
        fn derive_extends_by_one_segment(key_id in arb_key_id(), index in 0u32..1000) {
            let child = key_id.derive(&format!("{index}'")).expect("valid suffix");
            prop_assert_eq!(child.derivation_path().len(), key_id.derivation_path().len() + 1);
            prop_assert_eq!(child.derivation_algorithm(), key_id.derivation_algorithm());
            prop_assert_eq!(child.asset_name(), key_id.asset_name());
        }
    }
}
