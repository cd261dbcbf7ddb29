//! Fixture seeds and key identifiers shared by the unit tests.

use hdkeychain_key_deriv::Seed;
use hdkeychain_key_identifier::{DerivationAlgorithm, KeyIdentifier, KeyType};

pub(crate) const MNEMONIC: &str =
    "menu memory fury language physical wonder dog valid smart edge decrease worth";

pub(crate) const OTHER_MNEMONIC: &str =
    "wine system mean beyond filter human meat rubber episode wash stomach aunt";

pub(crate) fn mnemonic_seed(phrase: &str) -> Seed {
    let mnemonic = bip39::Mnemonic::parse(phrase).expect("valid mnemonic");
    Seed::from(mnemonic.to_seed(""))
}

pub(crate) fn seed() -> Seed {
    mnemonic_seed(MNEMONIC)
}

pub(crate) fn other_seed() -> Seed {
    mnemonic_seed(OTHER_MNEMONIC)
}

/// A seed that matches neither fixture mnemonic.
pub(crate) fn wrong_seed() -> Seed {
    Seed::from([0x5a; 64])
}

pub(crate) fn key_id(
    algorithm: DerivationAlgorithm,
    path: &str,
    asset_name: Option<&str>,
    key_type: Option<KeyType>,
) -> KeyIdentifier {
    KeyIdentifier::new(algorithm, path, asset_name, key_type).expect("valid key identifier")
}

/// `m/44'/501'/0'/0/0`, BIP32, nacl.
pub(crate) fn solana_key() -> KeyIdentifier {
    key_id(
        DerivationAlgorithm::Bip32,
        "m/44'/501'/0'/0/0",
        Some("solana"),
        Some(KeyType::Nacl),
    )
}

/// `m/44'/60'/0'/0/0`, BIP32, secp256k1.
pub(crate) fn ethereum_key() -> KeyIdentifier {
    key_id(
        DerivationAlgorithm::Bip32,
        "m/44'/60'/0'/0/0",
        Some("ethereum"),
        None,
    )
}
