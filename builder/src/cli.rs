//! CLI argument definitions for the registry builder.
//!
//! Parsing lives here so that `main.rs` only orchestrates. Values given on
//! the command line override the environment and the config file; see
//! [`crate::config`] for the merge.

use crate::index::VersionOrder;
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Build a static Terraform provider registry tree.
#[derive(Parser, Debug, Clone)]
#[command(name = "terraform-registry-builder")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a static Terraform provider registry tree.\n\n",
    "Every file under SRC named terraform-provider-<type>_v<version>_<os>_<arch> ",
    "(optionally .exe or .zip) is packaged, indexed, checksummed, and signed ",
    "into DST. Combinations already listed in a versions index are skipped, so ",
    "the build can be re-run over the same tree.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  TFREGBUILDER_GPG_KEY          Armored OpenPGP secret key\n",
    "  TFREGBUILDER_GPG_KEY_FILE     Path to the armored secret key (wins over the inline key)\n",
    "  TFREGBUILDER_GPG_PASSPHRASE   Passphrase unlocking the key\n",
    "  TFREGBUILDER_GPG_ID           Key id to advertise in download manifests\n\n",
    "EXAMPLES:\n",
    "  Build a registry from release artefacts:\n",
    "    $ terraform-registry-builder ./dist ./registry\n\n",
    "  Process provider types in parallel with semantic version ordering:\n",
    "    $ terraform-registry-builder -j 4 --version-order semantic ./dist ./registry",
))]
pub struct Cli {
    /// Directory containing provider binaries and archives.
    #[arg(value_name = "SRC")]
    pub source: Utf8PathBuf,

    /// Registry output directory.
    #[arg(value_name = "DST")]
    pub destination: Utf8PathBuf,

    /// TOML file with `[signing]` and `[build]` settings.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Armored OpenPGP secret key file.
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<Utf8PathBuf>,

    /// Key id to advertise instead of the fingerprint-derived one.
    #[arg(long, value_name = "ID")]
    pub key_id: Option<String>,

    /// Number of provider types processed in parallel.
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// How version entries are ordered in versions indexes.
    #[arg(long, value_enum, value_name = "ORDER")]
    pub version_order: Option<VersionOrderArg>,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

/// Command-line spelling of [`VersionOrder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VersionOrderArg {
    /// Plain string comparison.
    Lexicographic,
    /// Semantic-version comparison.
    Semantic,
}

impl From<VersionOrderArg> for VersionOrder {
    fn from(arg: VersionOrderArg) -> Self {
        match arg {
            VersionOrderArg::Lexicographic => Self::Lexicographic,
            VersionOrderArg::Semantic => Self::Semantic,
        }
    }
}

fn parse_jobs(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_owned()),
        Ok(jobs) => Ok(jobs),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
