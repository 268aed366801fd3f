//! Artefact naming, destination layout, digests, and packaging.
//!
//! # Sub-modules
//!
//! - [`naming`]: file name parsing into [`naming::ArtefactMetadata`].
//! - [`layout`]: destination paths derived from metadata.
//! - [`sha256_digest`]: SHA-256 digest newtype.
//! - [`packaging`]: archive creation and verbatim copies.

pub mod layout;
pub mod naming;
pub mod packaging;
pub mod sha256_digest;
