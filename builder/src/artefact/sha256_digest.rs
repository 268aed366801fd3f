//! SHA-256 digests of published archives.
//!
//! Digests are held as raw bytes and rendered as 64 lowercase hex
//! characters wherever they appear on disk.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

const DIGEST_LEN: usize = 32;

/// Error returned when a string is not a lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SHA-256 digest {value:?}: {reason}")]
pub struct InvalidDigest {
    value: String,
    reason: String,
}

/// A SHA-256 digest.
///
/// # Examples
///
/// ```
/// use terraform_registry_builder::artefact::sha256_digest::Sha256Digest;
///
/// let digest = Sha256Digest::of(b"hello world");
/// assert_eq!(
///     digest.to_string(),
///     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
/// );
/// assert_eq!(digest.to_string().parse::<Sha256Digest>(), Ok(digest));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Digest([u8; DIGEST_LEN]);

impl Sha256Digest {
    /// Hash `bytes`.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }
}

impl FromStr for Sha256Digest {
    type Err = InvalidDigest;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| InvalidDigest {
            value: value.to_owned(),
            reason,
        };
        if value.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(invalid("hex digits must be lowercase".to_owned()));
        }
        let mut bytes = [0_u8; DIGEST_LEN];
        hex::decode_to_slice(value, &mut bytes).map_err(|e| invalid(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = InvalidDigest;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sha256Digest> for String {
    fn from(digest: Sha256Digest) -> Self {
        hex::encode(digest.0)
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_input_hashes_to_the_well_known_constant() {
        assert_eq!(
            Sha256Digest::of(b"").to_string(),
            concat!(
                "e3b0c44298fc1c149afbf4c8996fb924",
                "27ae41e4649b934ca495991b7852b855"
            )
        );
    }

    #[rstest]
    #[case::too_short("abcdef")]
    #[case::too_long(&"a".repeat(65))]
    #[case::odd_but_long(&"a".repeat(66))]
    #[case::non_hex(&format!("{}g", "a".repeat(63)))]
    #[case::uppercase(&"A".repeat(64))]
    fn rejects_malformed_digests(#[case] value: &str) {
        let err = value.parse::<Sha256Digest>().expect_err("malformed digest");
        assert!(err.to_string().contains("invalid SHA-256 digest"));
    }

    #[test]
    fn serde_uses_the_hex_form() {
        let json = format!("\"{}\"", "b".repeat(64));
        let digest: Sha256Digest = serde_json::from_str(&json).expect("valid digest");
        assert_eq!(digest, Sha256Digest([0xbb; DIGEST_LEN]));
        assert_eq!(serde_json::to_string(&digest).expect("serialize"), json);
        assert!(serde_json::from_str::<Sha256Digest>("\"nope\"").is_err());
    }
}
