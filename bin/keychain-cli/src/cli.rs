use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hdkeychain::{SignatureType, crypto::Encoding};
use hdkeychain_key_deriv::SeedId;
use hdkeychain_key_identifier::{DerivationAlgorithm, KeyType};

#[derive(Parser, Debug)]
#[command(
    name = "keychain-cli",
    about = "Export keys and sign data with a hierarchical deterministic keychain",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        short,
        env = "KEYCHAIN_CONFIG",
        default_value = "keychain.toml",
        help = "the path to the config file"
    )]
    pub(crate) config: PathBuf,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    /// List the ids of the configured seeds.
    SeedIds,

    ExportKey(ExportKeyArgs),

    Sign(SignArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct KeyArgs {
    #[arg(long, help = "the seed to use, the primary seed when absent")]
    pub(crate) seed_id: Option<SeedId>,

    #[arg(
        long,
        conflicts_with_all = ["path", "algorithm", "asset", "key_type"],
        help = "a well-known wallet key such as TELEMETRY, instead of a path"
    )]
    pub(crate) wallet_key: Option<String>,

    #[arg(long, default_value = "BIP32", help = "BIP32 or SLIP10")]
    pub(crate) algorithm: DerivationAlgorithm,

    #[arg(long, required_unless_present = "wallet_key", help = "the derivation path")]
    pub(crate) path: Option<String>,

    #[arg(long, help = "the asset the key belongs to")]
    pub(crate) asset: Option<String>,

    #[arg(long, help = "secp256k1, nacl or legacy")]
    pub(crate) key_type: Option<KeyType>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Print the public half of a key, and the private half on request", version)]
pub(crate) struct ExportKeyArgs {
    #[clap(flatten)]
    pub(crate) key: KeyArgs,

    #[arg(long, help = "also print the private key and the extended private key")]
    pub(crate) private: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Sign hex encoded data", version)]
pub(crate) struct SignArgs {
    #[clap(flatten)]
    pub(crate) key: KeyArgs,

    #[arg(long, help = "ecdsa, schnorr, schnorrZ or ed25519")]
    pub(crate) signature_type: SignatureType,

    #[arg(long, help = "the hex encoded data to sign")]
    pub(crate) data: String,

    #[arg(long, help = "the ecdsa output layout")]
    pub(crate) enc: Option<Encoding>,

    #[arg(long, help = "the hex encoded schnorr tweak")]
    pub(crate) tweak: Option<String>,

    #[arg(long, help = "the hex encoded extra nonce entropy")]
    pub(crate) extra_entropy: Option<String>,
}
