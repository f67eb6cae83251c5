use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier of one immutable object version.
///
/// A `VersionHash` is opaque: the codec never interprets its contents, it only
/// compares, hashes and embeds it in `/qfab/<hash>/...` link paths. Metadata
/// stored under a given hash never changes, which is what makes resolved
/// targets cacheable for the lifetime of an edit session.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionHash(String);

impl VersionHash {
    /// Parse a version hash, rejecting empty strings and strings that could
    /// not be embedded as a single link path segment.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        if value.is_empty() || value.contains('/') || value.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidVersionHash(value));
        }
        Ok(Self(value))
    }

    /// The hash as it appears on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines (first 12 characters).
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Debug for VersionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionHash({})", self.short())
    }
}

impl fmt::Display for VersionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VersionHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionHash> for String {
    fn from(hash: VersionHash) -> Self {
        hash.0
    }
}

impl AsRef<str> for VersionHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_opaque_hashes() {
        let hash = VersionHash::new("hq__2w1RPYmXAs8nTyx").unwrap();
        assert_eq!(hash.as_str(), "hq__2w1RPYmXAs8nTyx");
        assert_eq!(hash.to_string(), "hq__2w1RPYmXAs8nTyx");
    }

    #[test]
    fn rejects_empty_and_pathlike_values() {
        assert!(VersionHash::new("").is_err());
        assert!(VersionHash::new("hq__a/b").is_err());
        assert!(VersionHash::new("hq__a b").is_err());
    }

    #[test]
    fn short_form_truncates() {
        let hash = VersionHash::new("hq__0123456789abcdef").unwrap();
        assert_eq!(hash.short(), "hq__01234567");
        let tiny = VersionHash::new("hq__1").unwrap();
        assert_eq!(tiny.short(), "hq__1");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let hash = VersionHash::new("hq__abc").unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"hq__abc\"");
        let parsed: VersionHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
        assert!(serde_json::from_str::<VersionHash>("\"\"").is_err());
    }
}
