//! Terraform provider registry builder library.
//!
//! This crate turns a directory of provider release artefacts into a static
//! file tree served by the Terraform provider registry protocol: per-type
//! versions indexes, per-platform download manifests, archives, checksum
//! files, and detached signatures. It is used by the
//! `terraform-registry-builder` binary and can be driven programmatically
//! with injected [`fs::Filesystem`] and [`signing::Signer`] implementations.
//!
//! # Modules
//!
//! - [`artefact`] - File name parsing, destination layout, digests, packaging
//! - [`builder`] - Build orchestration over a source tree
//! - [`checksum`] - Checksum manifest, signature, and download manifest output
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered configuration (flags, environment, TOML file)
//! - [`download`] - Per-platform download manifest
//! - [`error`] - Build error taxonomy
//! - [`fs`] - Filesystem capability
//! - [`index`] - Per-type versions index
//! - [`output`] - Stderr logging and build summaries
//! - [`report`] - Per-artefact build outcomes
//! - [`signing`] - Signer capability and the OpenPGP implementation

pub mod artefact;
pub mod builder;
pub mod checksum;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod index;
pub mod output;
pub mod report;
pub mod signing;
