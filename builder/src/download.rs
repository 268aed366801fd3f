//! Per-platform download manifest (`<type>/<version>/download/<os>/<arch>/index.json`).

use crate::artefact::layout::ArtefactLayout;
use crate::artefact::naming::ArtefactMetadata;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::error::Result;
use crate::index::supported_protocols;
use crate::signing::PublicKey;
use serde::{Deserialize, Serialize};

/// One exported public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpgPublicKey {
    /// Key identifier.
    pub key_id: String,
    /// ASCII-armored key block.
    pub ascii_armor: String,
}

impl From<PublicKey> for GpgPublicKey {
    fn from(key: PublicKey) -> Self {
        Self {
            key_id: key.key_id,
            ascii_armor: key.ascii_armor,
        }
    }
}

/// Keys able to verify the checksum signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeys {
    /// OpenPGP public keys.
    pub gpg_public_keys: Vec<GpgPublicKey>,
}

/// Describes how to fetch and verify one published archive.
///
/// Every reference is a bare file name; the registry tree is served
/// statically and clients resolve them relative to the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadManifest {
    /// Supported protocol versions.
    pub protocols: Vec<String>,
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
    /// Archive file name.
    pub filename: String,
    /// Archive reference.
    pub download_url: String,
    /// Checksum manifest reference.
    pub shasums_url: String,
    /// Checksum signature reference.
    pub shasums_signature_url: String,
    /// Hex SHA-256 of the archive.
    pub shasum: Sha256Digest,
    /// Verification keys.
    pub signing_keys: SigningKeys,
}

impl DownloadManifest {
    /// Assemble the manifest for `meta` from the archive digest and key.
    #[must_use]
    pub fn new(
        meta: &ArtefactMetadata,
        layout: &ArtefactLayout,
        shasum: Sha256Digest,
        key: PublicKey,
    ) -> Self {
        let filename = layout.archive_file_name();
        Self {
            protocols: supported_protocols(),
            os: meta.os().to_owned(),
            arch: meta.arch().to_owned(),
            download_url: filename.clone(),
            filename,
            shasums_url: layout.shasums_file_name(),
            shasums_signature_url: layout.signature_file_name(),
            shasum,
            signing_keys: SigningKeys {
                gpg_public_keys: vec![key.into()],
            },
        }
    }

    /// Pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::BuildError::Serialization`] on failure.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artefact::naming::parse_artefact_name;

    #[test]
    fn manifest_references_sibling_files_by_name() {
        let meta = parse_artefact_name("terraform-provider-example_v2.0.0_darwin_arm64.zip")
            .expect("valid name");
        let layout = ArtefactLayout::new(&meta);
        let manifest = DownloadManifest::new(
            &meta,
            &layout,
            Sha256Digest::of(b"archive"),
            PublicKey {
                key_id: "ABCDEF0123456789".to_owned(),
                ascii_armor: "armor".to_owned(),
            },
        );

        assert_eq!(manifest.os, "darwin");
        assert_eq!(manifest.arch, "arm64");
        assert_eq!(
            manifest.filename,
            "terraform-provider-example_v2.0.0_darwin_arm64.zip"
        );
        assert_eq!(manifest.download_url, manifest.filename);
        assert_eq!(
            manifest.shasums_url,
            "terraform-provider-example_v2.0.0_darwin_arm64_SHA256SUMS"
        );
        assert_eq!(
            manifest.shasums_signature_url,
            "terraform-provider-example_v2.0.0_darwin_arm64_SHA256SUMS.sig"
        );
    }

    #[test]
    fn json_field_order_follows_the_protocol_schema() {
        let meta = parse_artefact_name("terraform-provider-test_v1.0.0_linux_amd64")
            .expect("valid name");
        let manifest = DownloadManifest::new(
            &meta,
            &ArtefactLayout::new(&meta),
            Sha256Digest::of(b""),
            PublicKey {
                key_id: "K".to_owned(),
                ascii_armor: "A".to_owned(),
            },
        );
        let json = manifest.to_json().expect("json");

        let keys = [
            "\"protocols\"",
            "\"os\"",
            "\"arch\"",
            "\"filename\"",
            "\"download_url\"",
            "\"shasums_url\"",
            "\"shasums_signature_url\"",
            "\"shasum\"",
            "\"signing_keys\"",
            "\"gpg_public_keys\"",
            "\"key_id\"",
            "\"ascii_armor\"",
        ];
        let positions: Vec<usize> = keys
            .iter()
            .map(|key| json.find(key).expect("field present"))
            .collect();
        assert!(positions.windows(2).all(|w| w.first() < w.get(1)));
        assert!(json.ends_with("}\n"));
        assert!(json.starts_with("{\n  \"protocols\": [\n    \"6.0\"\n  ],"));
    }
}
