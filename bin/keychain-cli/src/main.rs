//! Command line front end of the keychain.

mod cli;
mod config;
mod handlers;
mod seeds;

use anyhow::Result;
use clap::Parser;
use hdkeychain::{LegacyPrivToPubMap, MultiSeedKeychain};
use hdkeychain_common::logging::{self, LoggerConfig};
use tracing::info;

use crate::{
    cli::{Cli, Commands},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(LoggerConfig::with_base_name("keychain-cli"));

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let keychain = MultiSeedKeychain::new(LegacyPrivToPubMap::default());
    for seed_config in &config.seeds {
        let seed = seeds::load_or_generate(&seed_config.path).await?;
        let seed_id = if seed_config.primary {
            keychain.set_primary_seed(&seed)?
        } else {
            keychain.add_seed(&seed)?
        };
        info!(%seed_id, primary = seed_config.primary, "registered seed");
    }

    match cli.command {
        Commands::SeedIds => handlers::handle_seed_ids(&keychain),
        Commands::ExportKey(args) => handlers::handle_export_key(&keychain, args).await?,
        Commands::Sign(args) => handlers::handle_sign(&keychain, args)?,
    }
    Ok(())
}
