use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The configuration of the keychain CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The seeds to load.
    pub seeds: Vec<SeedConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SeedConfig {
    /// The seed file. A missing file is generated.
    pub path: PathBuf,

    /// Whether wallet accounts resolve to this seed.
    #[serde(default)]
    pub primary: bool,
}

impl Config {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str::<Self>(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        let primaries = config.seeds.iter().filter(|seed| seed.primary).count();
        anyhow::ensure!(primaries <= 1, "at most one seed can be primary, got {primaries}");

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seeds() {
        let config = r#"
            [[seeds]]
            path = "seeds/main"
            primary = true

            [[seeds]]
            path = "seeds/savings"
        "#;

        let config = toml::from_str::<Config>(config).expect("valid config");
        assert_eq!(
            config,
            Config {
                seeds: vec![
                    SeedConfig {
                        path: "seeds/main".into(),
                        primary: true,
                    },
                    SeedConfig {
                        path: "seeds/savings".into(),
                        primary: false,
                    },
                ],
            }
        );

        let serialized = toml::to_string(&config).expect("serialize");
        assert_eq!(toml::from_str::<Config>(&serialized).expect("valid config"), config);
    }

    #[test]
    fn rejects_two_primaries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("keychain.toml");
        std::fs::write(
            &path,
            "[[seeds]]\npath = \"a\"\nprimary = true\n[[seeds]]\npath = \"b\"\nprimary = true\n",
        )
        .expect("write config");

        let err = Config::load(&path).expect_err("two primaries");
        assert_eq!(err.to_string(), "at most one seed can be primary, got 2");
    }
}
