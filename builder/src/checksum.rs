//! Checksum manifest, detached signature, and download manifest generation.
//!
//! Files are written in dependency order: `SHA256SUMS`, then its `.sig`,
//! then the download manifest that references both. A signer failure
//! therefore never leaves a download manifest behind.

use crate::artefact::layout::ArtefactLayout;
use crate::artefact::naming::ArtefactMetadata;
use crate::artefact::packaging::PackagedArchive;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::download::DownloadManifest;
use crate::error::{BuildError, Result};
use crate::fs::Filesystem;
use crate::signing::{PublicKey, Signer};
use log::debug;

/// Render the single-line checksum manifest for `file_name`.
///
/// The two-space separator matches `sha256sum` output so that the file can
/// be verified with standard tools.
///
/// # Examples
///
/// ```
/// use terraform_registry_builder::artefact::sha256_digest::Sha256Digest;
/// use terraform_registry_builder::checksum::render_checksum_manifest;
///
/// let digest = Sha256Digest::of(b"");
/// let line = render_checksum_manifest(&digest, "provider.zip");
/// assert_eq!(line, format!("{digest}  provider.zip\n"));
/// ```
#[must_use]
pub fn render_checksum_manifest(digest: &Sha256Digest, file_name: &str) -> String {
    format!("{digest}  {file_name}\n")
}

/// Write the checksum manifest, its signature, and the download manifest
/// for a freshly packaged archive.
///
/// # Errors
///
/// Returns [`BuildError::Signer`] if signing or key export fails,
/// [`BuildError::Io`] if a file cannot be written, and
/// [`BuildError::Serialization`] if the manifest cannot be rendered.
pub fn publish_checksums(
    fs: &dyn Filesystem,
    signer: &dyn Signer,
    meta: &ArtefactMetadata,
    layout: &ArtefactLayout,
    archive: &PackagedArchive,
) -> Result<DownloadManifest> {
    let digest = Sha256Digest::of(&archive.bytes);
    let sums = render_checksum_manifest(&digest, &archive.file_name);
    let sums_path = layout.shasums_path();
    fs.write(&sums_path, sums.as_bytes())
        .map_err(|e| BuildError::io(sums_path.as_path(), e))?;

    let signature = signer.sign(sums.as_bytes())?;
    let signature_path = layout.signature_path();
    fs.write(&signature_path, &signature.bytes)
        .map_err(|e| BuildError::io(signature_path.as_path(), e))?;
    debug!("signed {sums_path} with key {}", signature.key_id);

    let public = signer.public_key()?;
    let manifest = DownloadManifest::new(
        meta,
        layout,
        digest,
        PublicKey {
            key_id: signature.key_id,
            ascii_armor: public.ascii_armor,
        },
    );
    let manifest_path = layout.download_manifest_path();
    fs.write(&manifest_path, manifest.to_json()?.as_bytes())
        .map_err(|e| BuildError::io(manifest_path.as_path(), e))?;
    Ok(manifest)
}
