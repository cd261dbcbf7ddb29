//! BIP32 derivation paths.
//!
//! Paths follow the grammar `m(/<index>'?)*` where `<index>` is an unsigned integer below
//! [`HARDENED_OFFSET`] and a trailing `'` marks the segment as hardened. Nothing is hardened
//! implicitly.

use std::{fmt, str::FromStr};

use bitcoin::bip32::ChildNumber;
use serde::{Deserialize, Serialize};

use crate::errors::PathError;

/// Purposes accepted by [`build_bip32_path`].
pub const BIP32_PURPOSES: [u32; 4] = [44, 49, 84, 86];

/// Offset that marks an index as hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A validated derivation path such as `m/44'/60'/0'/0/0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    /// The root path `m`.
    pub const fn master() -> Self {
        Self(Vec::new())
    }

    /// The segments of the path, root excluded.
    pub fn segments(&self) -> &[ChildNumber] {
        &self.0
    }

    /// Number of segments below the root.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path `m`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with `child` appended.
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut segments = self.0.clone();
        segments.push(child);
        Self(segments)
    }

    /// Returns a new path extended by a relative path such as `0/1'`.
    ///
    /// A leading `/` is accepted. An empty suffix returns an identical path.
    pub fn extend(&self, suffix: &str) -> Result<Self, PathError> {
        let suffix = suffix.strip_prefix('/').unwrap_or(suffix);
        if suffix.is_empty() {
            return Ok(self.clone());
        }

        let mut segments = self.0.clone();
        for segment in suffix.split('/') {
            segments.push(parse_segment(segment)?);
        }
        Ok(Self(segments))
    }

    /// Index of the first segment, hardened or not.
    pub fn purpose_index(&self) -> Result<u32, PathError> {
        match self.0.first() {
            Some(ChildNumber::Hardened { index } | ChildNumber::Normal { index }) => Ok(*index),
            None => Err(PathError::MissingPurpose),
        }
    }

    /// Reads the purpose and account index from the first two segments.
    ///
    /// Both segments must be hardened when present. The account index is absent for paths with a
    /// single segment.
    pub fn purpose(&self) -> Result<PathPurpose, PathError> {
        let purpose = match self.0.first() {
            Some(ChildNumber::Hardened { index }) => *index,
            Some(ChildNumber::Normal { .. }) => return Err(PathError::NotHardened { position: 0 }),
            None => return Err(PathError::MissingPurpose),
        };

        let account_index = match self.0.get(1) {
            Some(ChildNumber::Hardened { index }) => Some(*index),
            Some(ChildNumber::Normal { .. }) => {
                return Err(PathError::NotHardened { position: 1 })
            }
            None => None,
        };

        Ok(PathPurpose {
            purpose,
            account_index,
        })
    }
}

impl AsRef<[ChildNumber]> for DerivationPath {
    fn as_ref(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(segments: Vec<ChildNumber>) -> Self {
        Self(segments)
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(PathError::MissingRoot(s.to_owned()));
        }

        parts.map(parse_segment).collect::<Result<_, _>>().map(Self)
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.0 {
            match segment {
                ChildNumber::Normal { index } => write!(f, "/{index}")?,
                ChildNumber::Hardened { index } => write!(f, "/{index}'")?,
            }
        }
        Ok(())
    }
}

fn parse_segment(segment: &str) -> Result<ChildNumber, PathError> {
    let (digits, hardened) = match segment.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (segment, false),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathError::InvalidSegment(segment.to_owned()));
    }

    let index: u32 = digits
        .parse()
        .map_err(|_| PathError::IndexOutOfRange(segment.to_owned()))?;

    PathIndex::new(index, hardened)
        .to_child_number()
        .map_err(|_| PathError::IndexOutOfRange(segment.to_owned()))
}

/// Purpose and account index read from the head of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathPurpose {
    /// First segment, without the hardened offset.
    pub purpose: u32,

    /// Second segment, without the hardened offset.
    pub account_index: Option<u32>,
}

/// Parses `path` and reads its purpose and account index.
pub fn parse_path(path: &str) -> Result<PathPurpose, PathError> {
    path.parse::<DerivationPath>()?.purpose()
}

/// Whether `path` is a well-formed derivation path.
pub fn is_valid_bip_path(path: &str) -> bool {
    path.parse::<DerivationPath>().is_ok()
}

/// A single path index that is either normal or hardened, e.g. `0` or `0'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathIndex {
    /// Non-hardened index.
    Normal(u32),
    /// Hardened index.
    Hardened(u32),
}

impl PathIndex {
    const fn new(index: u32, hardened: bool) -> Self {
        if hardened {
            Self::Hardened(index)
        } else {
            Self::Normal(index)
        }
    }

    fn to_child_number(self) -> Result<ChildNumber, bitcoin::bip32::Error> {
        match self {
            Self::Normal(index) => ChildNumber::from_normal_idx(index),
            Self::Hardened(index) => ChildNumber::from_hardened_idx(index),
        }
    }
}

impl From<u32> for PathIndex {
    fn from(index: u32) -> Self {
        Self::Normal(index)
    }
}

impl FromStr for PathIndex {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_segment(s)? {
            ChildNumber::Normal { index } => Ok(Self::Normal(index)),
            ChildNumber::Hardened { index } => Ok(Self::Hardened(index)),
        }
    }
}

/// Arguments for [`build_bip32_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bip32PathArgs {
    /// BIP43 purpose, one of [`BIP32_PURPOSES`].
    pub purpose: u32,

    /// SLIP44 coin type of the asset, without the hardened offset.
    pub coin_type: u32,

    /// Account index, always hardened in the output.
    pub account_index: u32,

    /// Chain (change) index. Leave empty to address a whole account.
    pub chain_index: Option<PathIndex>,

    /// Address index. Requires a chain index.
    pub address_index: Option<PathIndex>,
}

/// Builds `m/<purpose>'/<coin_type>'/<account>'[/<chain>[/<address>]]`.
pub fn build_bip32_path(args: Bip32PathArgs) -> Result<DerivationPath, PathError> {
    if !BIP32_PURPOSES.contains(&args.purpose) {
        return Err(PathError::UnsupportedPurpose(args.purpose));
    }
    if args.chain_index.is_none() && args.address_index.is_some() {
        return Err(PathError::AddressIndexWithoutChainIndex);
    }

    let mut segments = Vec::with_capacity(5);
    for index in [
        PathIndex::Hardened(args.purpose),
        PathIndex::Hardened(args.coin_type),
        PathIndex::Hardened(args.account_index),
    ]
    .into_iter()
    .chain(args.chain_index)
    .chain(args.address_index)
    {
        let child = index
            .to_child_number()
            .map_err(|_| PathError::IndexOutOfRange(format!("{index:?}")))?;
        segments.push(child);
    }

    Ok(DerivationPath(segments))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_and_displays() {
        let path: DerivationPath = "m/44'/60'/0'/0/0".parse().expect("valid path");
        assert_eq!(path.len(), 5);
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/0");

        let root: DerivationPath = "m".parse().expect("root is valid");
        assert!(root.is_empty());
        assert_eq!(root, DerivationPath::master());
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in [
            "",
            "44'/0'",
            "m/",
            "m//0",
            "m/44''",
            "m/44'/60''///45'1'",
            "m/a",
            "m/-1",
            "m/2147483648",
            "m/0h",
            "M/0",
        ] {
            assert!(!is_valid_bip_path(path), "{path} should be rejected");
        }
    }

    #[test]
    fn hardening_is_never_implicit() {
        let path: DerivationPath = "m/1/2'".parse().expect("valid path");
        assert_eq!(
            path.segments(),
            &[
                ChildNumber::Normal { index: 1 },
                ChildNumber::Hardened { index: 2 }
            ]
        );
    }

    #[test]
    fn extends_with_relative_suffix() {
        let base: DerivationPath = "m/44'/0'".parse().expect("valid path");

        let extended = base.extend("0'/1").expect("valid suffix");
        assert_eq!(extended.to_string(), "m/44'/0'/0'/1");
        assert_eq!(base.to_string(), "m/44'/0'");

        assert_eq!(
            base.extend("/5").expect("leading slash").to_string(),
            "m/44'/0'/5"
        );
        assert_eq!(base.extend("").expect("empty suffix"), base);
        assert!(base.extend("x").is_err());
    }

    #[test]
    fn reads_purpose_and_account() {
        assert_eq!(
            parse_path("m/84'/0'/3'/0/0").expect("valid"),
            PathPurpose {
                purpose: 84,
                account_index: Some(0)
            }
        );
        assert_eq!(
            parse_path("m/44'/7'/3'").expect("valid"),
            PathPurpose {
                purpose: 44,
                account_index: Some(7)
            }
        );
        assert_eq!(
            parse_path("m/73'").expect("valid"),
            PathPurpose {
                purpose: 73,
                account_index: None
            }
        );
        assert_eq!(parse_path("m"), Err(PathError::MissingPurpose));
        assert_eq!(
            parse_path("m/44/0'"),
            Err(PathError::NotHardened { position: 0 })
        );
        assert_eq!(
            parse_path("m/44'/0"),
            Err(PathError::NotHardened { position: 1 })
        );
    }

    #[test]
    fn purpose_index_ignores_hardening() {
        let index = |path: &str| path.parse::<DerivationPath>().expect("valid").purpose_index();
        assert_eq!(index("m/44'/0"), Ok(44));
        assert_eq!(index("m/0/1"), Ok(0));
        assert_eq!(index("m"), Err(PathError::MissingPurpose));
    }

    #[test]
    fn builds_bip32_paths() {
        let args = Bip32PathArgs {
            purpose: 44,
            coin_type: 60,
            account_index: 0,
            chain_index: Some(PathIndex::Normal(0)),
            address_index: Some(PathIndex::Normal(7)),
        };
        assert_eq!(
            build_bip32_path(args).expect("valid").to_string(),
            "m/44'/60'/0'/0/7"
        );

        let account_only = Bip32PathArgs {
            chain_index: None,
            address_index: None,
            ..args
        };
        assert_eq!(
            build_bip32_path(account_only).expect("valid").to_string(),
            "m/44'/60'/0'"
        );

        let hardened_tail = Bip32PathArgs {
            chain_index: Some("0'".parse().expect("valid index")),
            address_index: Some("1'".parse().expect("valid index")),
            ..args
        };
        assert_eq!(
            build_bip32_path(hardened_tail).expect("valid").to_string(),
            "m/44'/60'/0'/0'/1'"
        );
    }

    #[test]
    fn build_rejects_bad_arguments() {
        let args = Bip32PathArgs {
            purpose: 45,
            coin_type: 0,
            account_index: 0,
            chain_index: None,
            address_index: None,
        };
        assert_eq!(build_bip32_path(args), Err(PathError::UnsupportedPurpose(45)));

        let args = Bip32PathArgs {
            purpose: 86,
            address_index: Some(PathIndex::Normal(0)),
            ..args
        };
        assert_eq!(
            build_bip32_path(args),
            Err(PathError::AddressIndexWithoutChainIndex)
        );

        let args = Bip32PathArgs {
            purpose: 86,
            account_index: HARDENED_OFFSET,
            chain_index: None,
            address_index: None,
            ..args
        };
        assert!(matches!(
            build_bip32_path(args),
            Err(PathError::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn serde_uses_the_string_form() {
        let path: DerivationPath = "m/0'/2'/1'".parse().expect("valid path");
        let json = serde_json::to_string(&path).expect("serialize");
        assert_eq!(json, "\"m/0'/2'/1'\"");

        let back: DerivationPath = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, path);
        assert!(serde_json::from_str::<DerivationPath>("\"m/x\"").is_err());
    }

    proptest! {
        // Any path assembled from in-range segments renders and parses back to itself.
        #[test]
        fn display_parse_roundtrip(segments in prop::collection::vec((0u32..HARDENED_OFFSET, any::<bool>()), 0..8)) {
            let text = segments.iter().fold(String::from("m"), |acc, (index, hardened)| {
                format!("{acc}/{index}{}", if *hardened { "'" } else { "" })
            });

            let path: DerivationPath = text.parse().expect("generated path is valid");
            prop_assert_eq!(path.to_string(), text);
            prop_assert_eq!(path.len(), segments.len());
        }
    }
}
