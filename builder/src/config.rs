//! Configuration resolution for the binary.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, `TFREGBUILDER_*` environment variables, and an optional TOML file.
//! The result is an explicit [`BuildConfig`]; nothing below this module
//! reads process state.
//!
//! ```toml
//! [signing]
//! key_file = "/secrets/registry.asc"
//! key_id = "ABCDEF0123456789"
//!
//! [build]
//! jobs = 4
//! version_order = "semantic"
//! ```
//!
//! The passphrase is only ever taken from the environment.

use crate::builder::BuildOptions;
use crate::cli::Cli;
use crate::index::VersionOrder;
use crate::signing::{KeyMaterial, SignerConfig, SignerError};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

/// Inline armored secret key.
pub const ENV_GPG_KEY: &str = "TFREGBUILDER_GPG_KEY";
/// Path to an armored secret key; wins over [`ENV_GPG_KEY`].
pub const ENV_GPG_KEY_FILE: &str = "TFREGBUILDER_GPG_KEY_FILE";
/// Passphrase unlocking the secret key.
pub const ENV_GPG_PASSPHRASE: &str = "TFREGBUILDER_GPG_PASSPHRASE";
/// Key id advertised in download manifests.
pub const ENV_GPG_ID: &str = "TFREGBUILDER_GPG_ID";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ConfigFile`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: Utf8PathBuf,
        /// Parser error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// `jobs` was set to zero.
    #[error("jobs must be at least 1")]
    InvalidJobs,

    /// Signing settings are incomplete.
    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// `[signing]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SigningSection {
    /// Armored secret key file.
    pub key_file: Option<Utf8PathBuf>,
    /// Advertised key id.
    pub key_id: Option<String>,
}

/// `[build]` table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Parallel provider types.
    pub jobs: Option<usize>,
    /// Version ordering.
    pub version_order: Option<VersionOrder>,
}

/// Contents of the optional TOML config file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Signing settings.
    pub signing: SigningSection,
    /// Build settings.
    pub build: BuildSection,
}

impl ConfigFile {
    /// Read and parse `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })
    }
}

/// Everything the binary needs to run a build.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Source root.
    pub source: Utf8PathBuf,
    /// Destination root.
    pub destination: Utf8PathBuf,
    /// Signing key configuration.
    pub signer: SignerConfig,
    /// Build tunables.
    pub options: BuildOptions,
}

impl BuildConfig {
    /// Resolve configuration from `cli`, the process environment, and the
    /// config file named by `--config`.
    ///
    /// # Errors
    ///
    /// See [`BuildConfig::resolve`].
    pub fn from_env(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, |name| std::env::var(name).ok())
    }

    /// Resolve configuration using `lookup` for environment variables.
    ///
    /// Empty variables count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be loaded, if
    /// `jobs` is zero, or if no key material is configured anywhere.
    pub fn resolve<F>(cli: &Cli, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let env = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let key = cli
            .key_file
            .clone()
            .map(KeyMaterial::File)
            .or_else(|| env(ENV_GPG_KEY_FILE).map(|p| KeyMaterial::File(p.into())))
            .or_else(|| env(ENV_GPG_KEY).map(KeyMaterial::Inline))
            .or_else(|| file.signing.key_file.clone().map(KeyMaterial::File))
            .ok_or(SignerError::MissingKeyMaterial)?;

        let key_id = cli
            .key_id
            .clone()
            .or_else(|| env(ENV_GPG_ID))
            .or(file.signing.key_id);

        let jobs = cli.jobs.or(file.build.jobs).unwrap_or(1);
        if jobs == 0 {
            return Err(ConfigError::InvalidJobs);
        }
        let version_order = cli
            .version_order
            .map(VersionOrder::from)
            .or(file.build.version_order)
            .unwrap_or_default();

        Ok(Self {
            source: cli.source.clone(),
            destination: cli.destination.clone(),
            signer: SignerConfig {
                key,
                passphrase: env(ENV_GPG_PASSPHRASE),
                key_id,
            },
            options: BuildOptions {
                jobs,
                version_order,
            },
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
