//! Per-family operation sets shared by both keychains.
//!
//! A keychain only has to say how it turns a locator into an unlocked [`DerivedKey`] by
//! implementing [`PrivateKeySource`]. The [`Secp256k1Api`], [`Ed25519Api`] and [`SodiumApi`]
//! operations come for free through blanket impls.

use hdkeychain_key_deriv::DerivedKey;
use hdkeychain_key_identifier::KeyType;
use rand::thread_rng;

use crate::{
    KeychainError, KeychainResult,
    account::KeyLocator,
    crypto::{
        Ed25519Signer, Encoding, Secp256k1Signer, SignatureOutput, SodiumEncryptor, SodiumKeys,
        ed25519, schnorr_z, secp,
    },
    sign_buffer::SignatureType,
};

/// Source of unlocked private key material.
pub trait PrivateKeySource {
    /// How an operation addresses a key.
    type Locator: KeyLocator + ?Sized;

    /// Derives the key at `locator`.
    ///
    /// Fails with [`KeychainError::PrivateKeysLocked`] before deriving anything while the
    /// addressed seed is locked.
    fn unlocked_key(&self, locator: &Self::Locator) -> KeychainResult<DerivedKey>;
}

/// Derives the key at `locator` and checks it has the key type `signature_type` needs.
pub(crate) fn key_for<S: PrivateKeySource + ?Sized>(
    source: &S,
    locator: &S::Locator,
    expected: KeyType,
    signature_type: SignatureType,
) -> KeychainResult<DerivedKey> {
    let key = source.unlocked_key(locator)?;
    let key_type = locator.key_id().key_type();
    if key_type != expected {
        return Err(KeychainError::UnsupportedKeyType {
            signature_type,
            key_type,
        });
    }
    Ok(key)
}

/// secp256k1 operations.
pub trait Secp256k1Api: PrivateKeySource {
    /// ECDSA over the 32 byte digest `data`.
    fn sign_ecdsa(
        &self,
        locator: &Self::Locator,
        data: &[u8; 32],
        encoding: Encoding,
        extra_entropy: Option<&[u8; 32]>,
    ) -> KeychainResult<SignatureOutput> {
        let key = key_for(self, locator, KeyType::Secp256k1, SignatureType::Ecdsa)?;
        secp::sign_ecdsa(key.private_key(), data, encoding, extra_entropy)
    }

    /// BIP340 Schnorr over the 32 byte `data`, optionally under a Taproot tweak.
    fn sign_schnorr(
        &self,
        locator: &Self::Locator,
        data: &[u8; 32],
        tweak: Option<&[u8; 32]>,
        extra_entropy: Option<&[u8; 32]>,
    ) -> KeychainResult<[u8; 64]> {
        let key = key_for(self, locator, KeyType::Secp256k1, SignatureType::Schnorr)?;
        secp::sign_schnorr(key.private_key(), data, tweak, extra_entropy)
    }

    /// Zilliqa Schnorr over `data`.
    fn sign_schnorr_z(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<[u8; 64]> {
        let key = key_for(self, locator, KeyType::Secp256k1, SignatureType::SchnorrZ)?;
        schnorr_z::sign(key.private_key(), data, &mut thread_rng())
    }

    /// Compressed public key, after the tweak when one is given.
    fn get_public_key(
        &self,
        locator: &Self::Locator,
        tweak: Option<&[u8; 32]>,
    ) -> KeychainResult<[u8; 33]> {
        let key = self.unlocked_key(locator)?;
        let key_type = locator.key_id().key_type();
        if key_type != KeyType::Secp256k1 {
            return Err(KeychainError::UnsupportedPublicKeyType(key_type));
        }
        secp::public_key(key.private_key(), tweak)
    }

    /// A standalone signer holding a copy of the key.
    fn secp256k1_signer(&self, locator: &Self::Locator) -> KeychainResult<Secp256k1Signer> {
        let key = self.unlocked_key(locator)?;
        Secp256k1Signer::new(key.private_key())
    }
}

impl<T: PrivateKeySource + ?Sized> Secp256k1Api for T {}

/// Ed25519 operations.
pub trait Ed25519Api: PrivateKeySource {
    /// Detached signature of `data`.
    fn sign_ed25519(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<[u8; 64]> {
        let key = key_for(self, locator, KeyType::Nacl, SignatureType::Ed25519)?;
        Ok(ed25519::sign(key.private_key(), data))
    }

    /// A standalone signer holding a copy of the key.
    fn ed25519_signer(&self, locator: &Self::Locator) -> KeychainResult<Ed25519Signer> {
        let key = self.unlocked_key(locator)?;
        Ok(Ed25519Signer::new(key.private_key()))
    }
}

impl<T: PrivateKeySource + ?Sized> Ed25519Api for T {}

/// Sodium operations. Every call expands the addressed key into a fresh [`SodiumEncryptor`].
pub trait SodiumApi: PrivateKeySource {
    /// A standalone encryptor holding copies of the keys.
    fn sodium_encryptor(&self, locator: &Self::Locator) -> KeychainResult<SodiumEncryptor> {
        let key = self.unlocked_key(locator)?;
        SodiumEncryptor::from_seed(key.private_key())
    }

    /// See [`SodiumEncryptor::keys`].
    fn sodium_keys(
        &self,
        locator: &Self::Locator,
        export_private: bool,
    ) -> KeychainResult<SodiumKeys> {
        Ok(self.sodium_encryptor(locator)?.keys(export_private))
    }

    /// See [`SodiumEncryptor::sign`].
    fn sodium_sign(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<Vec<u8>> {
        Ok(self.sodium_encryptor(locator)?.sign(data))
    }

    /// See [`SodiumEncryptor::sign_open`].
    fn sodium_sign_open(&self, locator: &Self::Locator, signed: &[u8]) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?.sign_open(signed)
    }

    /// See [`SodiumEncryptor::sign_detached`].
    fn sodium_sign_detached(
        &self,
        locator: &Self::Locator,
        data: &[u8],
    ) -> KeychainResult<[u8; 64]> {
        Ok(self.sodium_encryptor(locator)?.sign_detached(data))
    }

    /// See [`SodiumEncryptor::verify_detached`].
    fn sodium_verify_detached(
        &self,
        locator: &Self::Locator,
        data: &[u8],
        signature: &[u8],
    ) -> KeychainResult<bool> {
        Ok(self
            .sodium_encryptor(locator)?
            .verify_detached(data, signature))
    }

    /// See [`SodiumEncryptor::encrypt_secret_box`].
    fn encrypt_secret_box(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<Vec<u8>> {
        Ok(self.sodium_encryptor(locator)?.encrypt_secret_box(data))
    }

    /// See [`SodiumEncryptor::decrypt_secret_box`].
    fn decrypt_secret_box(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?.decrypt_secret_box(data)
    }

    /// See [`SodiumEncryptor::encrypt_box`].
    fn encrypt_box(
        &self,
        locator: &Self::Locator,
        data: &[u8],
        to_public_key: &[u8],
    ) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?
            .encrypt_box(data, to_public_key)
    }

    /// See [`SodiumEncryptor::decrypt_box`].
    fn decrypt_box(
        &self,
        locator: &Self::Locator,
        data: &[u8],
        from_public_key: &[u8],
    ) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?
            .decrypt_box(data, from_public_key)
    }

    /// See [`SodiumEncryptor::encrypt_sealed_box`].
    fn encrypt_sealed_box(
        &self,
        locator: &Self::Locator,
        data: &[u8],
        to_public_key: &[u8],
    ) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?
            .encrypt_sealed_box(data, to_public_key)
    }

    /// See [`SodiumEncryptor::decrypt_sealed_box`].
    fn decrypt_sealed_box(&self, locator: &Self::Locator, data: &[u8]) -> KeychainResult<Vec<u8>> {
        self.sodium_encryptor(locator)?.decrypt_sealed_box(data)
    }
}

impl<T: PrivateKeySource + ?Sized> SodiumApi for T {}

#[cfg(test)]
mod tests {
    use bitcoin::{
        hashes::Hash,
        key::TapTweak,
        secp256k1::{Keypair, SecretKey},
    };
    use hdkeychain_key_identifier::{
        DerivationAlgorithm, KeyIdentifier,
        wallet_keys::{FUSION, TELEMETRY},
    };
    use sha2::{Digest, Sha256};

    use super::*;
    use crate::{
        Keychain,
        legacy::LegacyPrivToPubMap,
        test_utils::{ethereum_key, key_id, seed, solana_key},
    };

    fn keychain() -> Keychain {
        Keychain::from_seed(&seed(), LegacyPrivToPubMap::default()).expect("valid seed")
    }

    fn digest() -> [u8; 32] {
        Sha256::digest(b"I really love keychains").into()
    }

    fn alice() -> KeyIdentifier {
        key_id(DerivationAlgorithm::Slip10, "m/0'/2'/0'", None, None)
    }

    fn bob() -> KeyIdentifier {
        key_id(DerivationAlgorithm::Slip10, "m/0'/2'/1'", None, None)
    }

    #[test]
    fn ecdsa_vectors() {
        let keychain = keychain();

        let der = keychain
            .sign_ecdsa(&ethereum_key(), &digest(), Encoding::Der, None)
            .expect("sign");
        assert_eq!(
            hex::encode(der.as_bytes().expect("flat")),
            "30440220722491f3d490960c4fc16b56b8dacafa9d446e17d9321dbbe3b216da845adc9802203afd466c1450c60f7ef0fcdf55b1e3bb206d9f989530996059890a9d92ab1ef9"
        );

        let sig = keychain
            .sign_ecdsa(&ethereum_key(), &digest(), Encoding::Sig, None)
            .expect("sign");
        assert_eq!(
            hex::encode(sig.as_bytes().expect("flat")),
            "722491f3d490960c4fc16b56b8dacafa9d446e17d9321dbbe3b216da845adc983afd466c1450c60f7ef0fcdf55b1e3bb206d9f989530996059890a9d92ab1ef9"
        );
    }

    #[test]
    fn schnorr_vector() {
        let signature = keychain()
            .sign_schnorr(&ethereum_key(), &digest(), None, Some(&[0; 32]))
            .expect("sign");
        assert_eq!(
            hex::encode(signature),
            "10aa0975c224ea48e7d96f40b055d1b51ac257c7f177bb0f1e2c52bd3186fe112777756e2c0de7e2597849a7e3792483da717dcbe70ebf3f3d8d758730de7209"
        );
    }

    #[test]
    fn ed25519_vectors() {
        let keychain = keychain();
        let nacl = key_id(
            DerivationAlgorithm::Bip32,
            "m/44'/60'/0'/0/0",
            None,
            Some(KeyType::Nacl),
        );
        let signature = keychain.sign_ed25519(&nacl, &digest()).expect("sign");
        assert_eq!(
            hex::encode(signature),
            "d0f019e45795a86d79542143483e22a2478498289490072c902408c01744f81d2d7769c7b6c5c28ade5336d20ea8b39c3723264d1d271a24a15dca509e3d5f03"
        );

        let signer = keychain.ed25519_signer(&FUSION).expect("unlocked");
        assert_eq!(
            hex::encode(signer.sign(b"I really love keychains")),
            "a929fd6e7e37524320e9f422caef1fefa14d9a70740626116b3570eac7e992893bea708c1b9004e222a779400c7ccabbd344c2399a2e4508f1de1cc602b0590a"
        );

        let transaction = hex::decode("010001030bc08d0b03ca1bc9e72e91084d4f001c5e13270acb4fc2853efe7e6b6560b2d85fc00ab3d38d5424af5b90ea447f1f474a1144be96a6d871ee39587522da7239000000000000000000000000000000000000000000000000000000000000000058c46d1f0395440b25e73ab095b539a5b45c7746dd713131e2cfe2755d03958701020200010c0200000000f2052a01000000").unwrap();
        let signer = keychain.ed25519_signer(&solana_key()).expect("unlocked");
        assert_eq!(
            hex::encode(signer.sign(&transaction)),
            "1102815ed29faa093f8365870c892e82ee2aff0e7ded7e337dee4e206613355c786b769cf48269e08ae1646ca70974b4bbfdeb0fd5f459f3ef8b4845b8dd6b0f"
        );
    }

    #[test]
    fn taproot_tweak_matches_bitcoin() {
        let secret = SecretKey::from_slice(
            &hex::decode("90de83eea26049afc40ba7d13fd8d4537331cd226f17051c97ca56c696af66b5")
                .unwrap(),
        )
        .unwrap();
        let keypair = Keypair::from_secret_key(secp256k1::SECP256K1, &secret);
        let (xonly, _) = keypair.x_only_public_key();
        assert_eq!(
            hex::encode(keypair.public_key().serialize()),
            "0273ae16fb2721654c8735487c024f9a137511eb2d4f2c39e3084bd87cf044ac91"
        );

        let tweak = bitcoin::TapTweakHash::from_key_and_tweak(xonly, None).to_byte_array();
        let private_key = secret.secret_bytes();

        let tweaked = secp::public_key(&private_key, Some(&tweak)).expect("valid tweak");
        assert_eq!(
            hex::encode(tweaked),
            "02c24e41b8ec4d091f9bfbb481fde7ce0808ed820db8e93409cc404da8b9de7e92"
        );
        let expected = keypair.tap_tweak(secp256k1::SECP256K1, None).to_inner();
        assert_eq!(tweaked, expected.public_key().serialize());

        let data: [u8; 32] =
            hex::decode("52be7b43a029336afb5bca87f33b5cbe1a84d70e321db62dc12c14eac3c8b3a3")
                .unwrap()
                .try_into()
                .unwrap();
        let mut aux = [0u8; 32];
        aux[..2].copy_from_slice(&[0x12, 0x30]);
        let signature =
            secp::sign_schnorr(&private_key, &data, Some(&tweak), Some(&aux)).expect("sign");
        assert_eq!(
            hex::encode(signature),
            "c2259b1fc27b846b7204b571a43e4951ef53e40b7486732673ac8d9187eb95d230ccdc5ab20e4e1e975fb211d13531de77f3ea70397fcca8d74629d20ffb4a3f"
        );
    }

    #[test]
    fn key_type_is_enforced() {
        let keychain = keychain();
        assert!(matches!(
            keychain.sign_ecdsa(&solana_key(), &digest(), Encoding::Der, None),
            Err(KeychainError::UnsupportedKeyType {
                signature_type: SignatureType::Ecdsa,
                key_type: KeyType::Nacl,
            })
        ));
        assert!(matches!(
            keychain.sign_ed25519(&ethereum_key(), &digest()),
            Err(KeychainError::UnsupportedKeyType {
                signature_type: SignatureType::Ed25519,
                key_type: KeyType::Secp256k1,
            })
        ));
        assert!(matches!(
            keychain.get_public_key(&solana_key(), None),
            Err(KeychainError::UnsupportedPublicKeyType(KeyType::Nacl))
        ));
    }

    #[test]
    fn locked_keychain_refuses_everything() {
        let keychain = keychain();
        keychain.lock_private_keys().expect("seed present");

        assert!(matches!(
            keychain.sign_ecdsa(&ethereum_key(), &digest(), Encoding::Der, None),
            Err(KeychainError::PrivateKeysLocked)
        ));
        assert!(matches!(
            keychain.get_public_key(&ethereum_key(), None),
            Err(KeychainError::PrivateKeysLocked)
        ));
        assert!(matches!(
            keychain.sign_ed25519(&solana_key(), b"data"),
            Err(KeychainError::PrivateKeysLocked)
        ));
        assert!(matches!(
            keychain.sodium_keys(&alice(), false),
            Err(KeychainError::PrivateKeysLocked)
        ));
        assert!(keychain.secp256k1_signer(&ethereum_key()).is_err());
        assert!(keychain.ed25519_signer(&solana_key()).is_err());
        assert!(keychain.sodium_encryptor(&alice()).is_err());
    }

    #[test]
    fn signers_outlive_lock() {
        let keychain = keychain();
        let signer = keychain.secp256k1_signer(&ethereum_key()).expect("unlocked");
        keychain.lock_private_keys().expect("seed present");

        let signature = signer
            .sign_ecdsa(&digest(), Encoding::Sig, None)
            .expect("sign");
        assert_eq!(
            hex::encode(signature.as_bytes().expect("flat")),
            "722491f3d490960c4fc16b56b8dacafa9d446e17d9321dbbe3b216da845adc983afd466c1450c60f7ef0fcdf55b1e3bb206d9f989530996059890a9d92ab1ef9"
        );
    }

    #[tokio::test]
    async fn sodium_sign_key_matches_slip10_export() {
        let keychain = keychain();
        let exported = keychain
            .export_key(&alice(), crate::ExportOptions::PUBLIC)
            .await
            .expect("export");
        let keys = keychain.sodium_keys(&alice(), false).expect("unlocked");

        assert_eq!(keys.sign.public_key.to_vec(), exported.public_key);
    }

    #[test]
    fn binauth_challenge() {
        let keychain = keychain();
        let keys = keychain.sodium_keys(&TELEMETRY, false).expect("unlocked");
        assert_eq!(
            hex::encode(keys.sign.public_key),
            "eeab6c9e861ed9f3a7f7917f6d972032e3e4d7a433eb6bc30f4b488ee13682c7"
        );

        let signed = keychain
            .sodium_sign(&TELEMETRY, &[0xaa, 0xbb, 0xcc])
            .expect("sign");
        assert_eq!(
            hex::encode(signed),
            "f87037abf6dd8e46cc691880c008ffa5646ba8bf9f523339a503e16b8f6c92c647e00940804ae64770456e8211c18e27234371e9a5f62505f6f50feafcbb2d0faabbcc"
        );
    }

    #[test]
    fn sodium_between_two_keys() {
        let keychain = keychain();
        let alice_box = keychain.sodium_keys(&alice(), false).expect("unlocked").box_keys;
        let bob_box = keychain.sodium_keys(&bob(), false).expect("unlocked").box_keys;

        let boxed = keychain
            .encrypt_box(&alice(), b"hello bob", &bob_box.public_key)
            .expect("encrypt");
        assert_eq!(
            keychain
                .decrypt_box(&bob(), &boxed, &alice_box.public_key)
                .expect("decrypt"),
            b"hello bob"
        );

        let sealed = keychain
            .encrypt_sealed_box(&alice(), b"anonymous", &bob_box.public_key)
            .expect("encrypt");
        assert_eq!(
            keychain.decrypt_sealed_box(&bob(), &sealed).expect("decrypt"),
            b"anonymous"
        );
        assert!(matches!(
            keychain.decrypt_sealed_box(&alice(), &sealed),
            Err(KeychainError::DecryptionFailed)
        ));

        let secret = keychain
            .encrypt_secret_box(&alice(), b"note to self")
            .expect("encrypt");
        assert_eq!(
            keychain
                .decrypt_secret_box(&alice(), &secret)
                .expect("decrypt"),
            b"note to self"
        );
        assert!(keychain.decrypt_secret_box(&bob(), &secret).is_err());

        let detached = keychain
            .sodium_sign_detached(&alice(), b"msg")
            .expect("sign");
        assert!(keychain
            .sodium_verify_detached(&alice(), b"msg", &detached)
            .expect("verify"));
        assert!(!keychain
            .sodium_verify_detached(&bob(), b"msg", &detached)
            .expect("verify"));
        let signed = keychain.sodium_sign(&alice(), b"msg").expect("sign");
        assert_eq!(
            keychain.sodium_sign_open(&alice(), &signed).expect("open"),
            b"msg"
        );
    }
}
