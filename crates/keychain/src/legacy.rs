//! Public key mappers for assets whose public key is not the curve public key.

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;

/// Maps a derived private key to an asset-specific public key.
///
/// Plain closures `Fn(&[u8]) -> anyhow::Result<Vec<u8>>` implement this trait.
#[async_trait]
pub trait LegacyPrivToPub: Send + Sync {
    /// Computes the public key of `private_key`.
    async fn priv_to_pub(&self, private_key: &[u8]) -> anyhow::Result<Vec<u8>>;
}

#[async_trait]
impl<F> LegacyPrivToPub for F
where
    F: Fn(&[u8]) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn priv_to_pub(&self, private_key: &[u8]) -> anyhow::Result<Vec<u8>> {
        self(private_key)
    }
}

/// Read-only mapping from asset name to its [`LegacyPrivToPub`].
///
/// Cloning is cheap and shares the mappers, so clones of a keychain see the same map.
#[derive(Clone, Default)]
pub struct LegacyPrivToPubMap(Arc<HashMap<String, Arc<dyn LegacyPrivToPub>>>);

impl LegacyPrivToPubMap {
    /// Mapper of `asset_name`, if one was registered.
    pub fn get(&self, asset_name: &str) -> Option<Arc<dyn LegacyPrivToPub>> {
        self.0.get(asset_name).cloned()
    }

    /// Whether no mapper is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Arc<dyn LegacyPrivToPub>)> for LegacyPrivToPubMap {
    fn from_iter<I: IntoIterator<Item = (S, Arc<dyn LegacyPrivToPub>)>>(iter: I) -> Self {
        Self(Arc::new(
            iter.into_iter()
                .map(|(asset, mapper)| (asset.into(), mapper))
                .collect(),
        ))
    }
}

impl fmt::Debug for LegacyPrivToPubMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut assets: Vec<_> = self.0.keys().collect();
        assets.sort();
        f.debug_tuple("LegacyPrivToPubMap").field(&assets).finish()
    }
}
