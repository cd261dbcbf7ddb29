//! Seed files.

use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use hdkeychain_key_deriv::{SEED_LENGTH, Seed};
use rand::Rng;
use tokio::{fs, io};
use tracing::info;

/// Loads the seed stored at `seed_path`, generating and writing a fresh one when the file does
/// not exist.
pub(crate) async fn load_or_generate(seed_path: &Path) -> anyhow::Result<Seed> {
    if let Some(parent) = seed_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    match fs::read(seed_path).await {
        Ok(bytes) => {
            let seed = Seed::from_slice(&bytes).with_context(|| {
                format!("seed file {} is not {SEED_LENGTH} bytes", seed_path.display())
            })?;
            info!("Loaded seed from {}", seed_path.display().to_string().bold());
            Ok(seed)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let mut bytes = [0u8; SEED_LENGTH];
            rand::thread_rng().fill(&mut bytes[..]);
            fs::write(seed_path, bytes).await?;
            info!("Generated new seed at {}", seed_path.display().to_string().bold());
            Ok(Seed::from(bytes))
        }
        Err(e) => Err(e.into()),
    }
}
