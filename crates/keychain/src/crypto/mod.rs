//! Signers and encryptors over derived key material.
//!
//! Everything in here works on plain key bytes and knows nothing about seeds or lock state.

pub mod ed25519;
pub mod schnorr_z;
pub mod secp;
pub mod sodium;
mod tweak;

pub use ed25519::Ed25519Signer;
pub use secp::{Encoding, Secp256k1Signer, SignatureOutput};
pub use sodium::{SodiumEncryptor, SodiumKeyPair, SodiumKeys};
