//! Host release identification
//!
//! Maps the running host's release string to an ordered [`VersionToken`].
//! Unknown or unparsable strings map to [`VersionToken::UNKNOWN`], which sorts
//! after every known release so that the newest known mapping is used.

use std::fmt::{self, Display};

/// Ordered identifier of a host release
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionToken(u32);

struct Release {
    token: VersionToken,
    package: &'static str,
    releases: &'static [&'static str],
}

impl VersionToken {
    pub const MC1_7_R4: Self = Self(174);
    pub const MC1_8_R3: Self = Self(183);
    pub const MC1_9_R1: Self = Self(191);
    pub const MC1_9_R2: Self = Self(192);
    pub const MC1_10_R1: Self = Self(1101);
    pub const MC1_11_R1: Self = Self(1111);
    pub const MC1_12_R1: Self = Self(1121);
    pub const MC1_13_R1: Self = Self(1131);
    pub const MC1_13_R2: Self = Self(1132);
    pub const MC1_14_R1: Self = Self(1141);
    pub const MC1_15_R1: Self = Self(1151);
    pub const MC1_16_R1: Self = Self(1161);
    pub const MC1_16_R2: Self = Self(1162);
    pub const MC1_16_R3: Self = Self(1163);
    pub const MC1_17_R1: Self = Self(1171);
    pub const MC1_18_R1: Self = Self(1181);
    pub const MC1_18_R2: Self = Self(1182);
    pub const MC1_19_R1: Self = Self(1191);
    pub const MC1_19_R2: Self = Self(1192);
    pub const MC1_19_R3: Self = Self(1193);
    pub const MC1_20_R1: Self = Self(1201);
    pub const MC1_20_R2: Self = Self(1202);
    pub const MC1_20_R3: Self = Self(1203);
    pub const MC1_20_R4: Self = Self(1204);
    pub const MC1_21_R1: Self = Self(1211);

    /// Sorts after every known release
    pub const UNKNOWN: Self = Self(u32::MAX);

    /// Build a token from a raw ordinal, for synthetic contexts
    pub const fn from_id(id: u32) -> Self {
        Self(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    pub fn at_least(self, other: VersionToken) -> bool {
        self >= other
    }

    pub fn newer_than(self, other: VersionToken) -> bool {
        self > other
    }

    /// Newest release this build knows names for
    pub fn newest_known() -> VersionToken {
        KNOWN
            .last()
            .map(|release| release.token)
            .unwrap_or(Self::UNKNOWN)
    }

    /// Package label such as `v1_20_R3`, for known releases only
    pub fn package(self) -> Option<&'static str> {
        KNOWN
            .iter()
            .find(|release| release.token == self)
            .map(|release| release.package)
    }

    /// Parse a host version string, falling back to `UNKNOWN`
    ///
    /// Accepts package labels (`v1_16_R3`), plain releases (`1.16.5`) and
    /// server banners carrying `(MC: 1.16.5)`. Never fails; an unrecognised
    /// string is logged and treated as newer than everything known.
    pub fn parse(raw: &str) -> VersionToken {
        match Self::try_parse(raw) {
            Some(token) => token,
            None => {
                tracing::warn!(
                    host_version = raw,
                    fallback = %Self::newest_known(),
                    "unrecognised host version, using newest known mappings"
                );
                Self::UNKNOWN
            }
        }
    }

    pub fn try_parse(raw: &str) -> Option<VersionToken> {
        let trimmed = raw.trim();
        let candidate = match trimmed.find("(MC: ") {
            Some(start) => {
                let rest = &trimmed[start + 5..];
                rest.split(')').next().unwrap_or(rest).trim()
            }
            None => trimmed,
        };

        if candidate.starts_with('v') {
            return KNOWN
                .iter()
                .find(|release| release.package == candidate)
                .map(|release| release.token);
        }

        KNOWN
            .iter()
            .find(|release| release.releases.contains(&candidate))
            .map(|release| release.token)
    }
}

impl Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            return f.write_str("UNKNOWN");
        }
        match self.package() {
            Some(package) => f.write_str(package),
            None => write!(f, "#{}", self.0),
        }
    }
}

const KNOWN: &[Release] = &[
    Release { token: VersionToken::MC1_7_R4, package: "v1_7_R4", releases: &["1.7.10"] },
    Release { token: VersionToken::MC1_8_R3, package: "v1_8_R3", releases: &["1.8.4", "1.8.5", "1.8.6", "1.8.7", "1.8.8", "1.8.9"] },
    Release { token: VersionToken::MC1_9_R1, package: "v1_9_R1", releases: &["1.9", "1.9.2"] },
    Release { token: VersionToken::MC1_9_R2, package: "v1_9_R2", releases: &["1.9.4"] },
    Release { token: VersionToken::MC1_10_R1, package: "v1_10_R1", releases: &["1.10", "1.10.1", "1.10.2"] },
    Release { token: VersionToken::MC1_11_R1, package: "v1_11_R1", releases: &["1.11", "1.11.1", "1.11.2"] },
    Release { token: VersionToken::MC1_12_R1, package: "v1_12_R1", releases: &["1.12", "1.12.1", "1.12.2"] },
    Release { token: VersionToken::MC1_13_R1, package: "v1_13_R1", releases: &["1.13"] },
    Release { token: VersionToken::MC1_13_R2, package: "v1_13_R2", releases: &["1.13.1", "1.13.2"] },
    Release { token: VersionToken::MC1_14_R1, package: "v1_14_R1", releases: &["1.14", "1.14.1", "1.14.2", "1.14.3", "1.14.4"] },
    Release { token: VersionToken::MC1_15_R1, package: "v1_15_R1", releases: &["1.15", "1.15.1", "1.15.2"] },
    Release { token: VersionToken::MC1_16_R1, package: "v1_16_R1", releases: &["1.16", "1.16.1"] },
    Release { token: VersionToken::MC1_16_R2, package: "v1_16_R2", releases: &["1.16.2", "1.16.3"] },
    Release { token: VersionToken::MC1_16_R3, package: "v1_16_R3", releases: &["1.16.4", "1.16.5"] },
    Release { token: VersionToken::MC1_17_R1, package: "v1_17_R1", releases: &["1.17", "1.17.1"] },
    Release { token: VersionToken::MC1_18_R1, package: "v1_18_R1", releases: &["1.18", "1.18.1"] },
    Release { token: VersionToken::MC1_18_R2, package: "v1_18_R2", releases: &["1.18.2"] },
    Release { token: VersionToken::MC1_19_R1, package: "v1_19_R1", releases: &["1.19", "1.19.1", "1.19.2"] },
    Release { token: VersionToken::MC1_19_R2, package: "v1_19_R2", releases: &["1.19.3"] },
    Release { token: VersionToken::MC1_19_R3, package: "v1_19_R3", releases: &["1.19.4"] },
    Release { token: VersionToken::MC1_20_R1, package: "v1_20_R1", releases: &["1.20", "1.20.1"] },
    Release { token: VersionToken::MC1_20_R2, package: "v1_20_R2", releases: &["1.20.2"] },
    Release { token: VersionToken::MC1_20_R3, package: "v1_20_R3", releases: &["1.20.3", "1.20.4"] },
    Release { token: VersionToken::MC1_20_R4, package: "v1_20_R4", releases: &["1.20.5", "1.20.6"] },
    Release { token: VersionToken::MC1_21_R1, package: "v1_21_R1", releases: &["1.21", "1.21.1"] },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_label() {
        assert_eq!(VersionToken::parse("v1_16_R3"), VersionToken::MC1_16_R3);
    }

    #[test]
    fn test_parse_release_and_banner() {
        assert_eq!(VersionToken::parse("1.12.2"), VersionToken::MC1_12_R1);
        assert_eq!(
            VersionToken::parse("git-Paper-196 (MC: 1.20.4)"),
            VersionToken::MC1_20_R3
        );
    }

    #[test]
    fn test_unparsable_falls_back_to_unknown() {
        let token = VersionToken::parse("snapshot-24w99z");
        assert!(token.is_unknown());
        assert!(token.newer_than(VersionToken::newest_known()));
    }

    #[test]
    fn test_known_table_is_strictly_ordered() {
        for pair in KNOWN.windows(2) {
            assert!(pair[0].token < pair[1].token, "{}", pair[1].package);
        }
    }

    #[test]
    fn test_comparisons() {
        let v = VersionToken::MC1_14_R1;
        assert!(v.at_least(VersionToken::MC1_14_R1));
        assert!(!v.newer_than(VersionToken::MC1_14_R1));
        assert!(v.newer_than(VersionToken::MC1_13_R2));
        assert!(!v.at_least(VersionToken::MC1_15_R1));
    }

    #[test]
    fn test_display() {
        assert_eq!(VersionToken::MC1_8_R3.to_string(), "v1_8_R3");
        assert_eq!(VersionToken::UNKNOWN.to_string(), "UNKNOWN");
        assert_eq!(VersionToken::from_id(7).to_string(), "#7");
    }
}
