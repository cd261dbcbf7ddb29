//! Key identifiers for the wallet's own keys.
//!
//! All of them live under the purpose [`WALLET_PURPOSE`], the integer value of the ASCII bytes
//! `exo`.

use std::sync::LazyLock;

use crate::{DerivationAlgorithm, KeyIdentifier, KeyIdentifierError, KeyType};

/// Purpose segment shared by all wallet keys.
pub const WALLET_PURPOSE: u32 = 0x0065_786f;

fn wallet_key_id(algorithm: DerivationAlgorithm, tail: &str) -> KeyIdentifier {
    KeyIdentifier::new(
        algorithm,
        &format!("m/{WALLET_PURPOSE}'/{tail}"),
        None,
        Some(KeyType::Nacl),
    )
    .expect("wallet key identifiers are well formed")
}

/// Encrypts the wallet info blob.
pub static WALLET_INFO: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Bip32, "1'/0"));

/// Encrypts backup files.
pub static BACKUP_FILE: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Bip32, "1'/1"));

/// Authenticates against the sync service.
pub static FUSION: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Slip10, "2'/0'"));

/// Two factor mode settings.
pub static TWO_FACTOR_MODE: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Slip10, "2'/1'"));

/// Telemetry identity.
pub static TELEMETRY: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Slip10, "2'/3'"));

/// Seedless recovery.
pub static SEEDLESS: LazyLock<KeyIdentifier> =
    LazyLock::new(|| wallet_key_id(DerivationAlgorithm::Slip10, "5'/0'"));

/// Looks up a wallet key by name, e.g. `TELEMETRY` or `2FA_MODE`.
pub fn wallet_key(name: &str) -> Result<&'static KeyIdentifier, KeyIdentifierError> {
    let key_id = match name {
        "WALLET_INFO" => &WALLET_INFO,
        "BACKUP_FILE" => &BACKUP_FILE,
        "FUSION" => &FUSION,
        "2FA_MODE" | "TWO_FACTOR_MODE" => &TWO_FACTOR_MODE,
        "TELEMETRY" => &TELEMETRY,
        "SEEDLESS" => &SEEDLESS,
        other => return Err(KeyIdentifierError::UnknownWalletKey(other.to_owned())),
    };
    Ok(LazyLock::force(key_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_spells_exo() {
        assert_eq!(WALLET_PURPOSE.to_be_bytes()[1..], *b"exo");
        assert_eq!(WALLET_PURPOSE, 6_649_967);
    }

    #[test]
    fn lookup_by_name() {
        let telemetry = wallet_key("TELEMETRY").expect("known key");
        assert_eq!(telemetry.to_string(), "m/6649967'/2'/3' (SLIP10)");
        assert_eq!(telemetry.key_type(), KeyType::Nacl);

        assert_eq!(wallet_key("2FA_MODE").expect("known key"), &*TWO_FACTOR_MODE);
        assert_eq!(
            wallet_key("WALLET_INFO")
                .expect("known key")
                .derivation_path()
                .to_string(),
            "m/6649967'/1'/0"
        );

        assert_eq!(
            wallet_key("nope"),
            Err(KeyIdentifierError::UnknownWalletKey("nope".to_owned()))
        );
    }
}
