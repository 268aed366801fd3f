//! OpenPGP signer backed by the `pgp` crate.
//!
//! Produces binary (non-armored) detached signatures, which is what the
//! registry protocol serves as `*_SHA256SUMS.sig`.

use super::{DetachedSignature, KeyMaterial, PublicKey, Signer, SignerConfig, SignerError};
use log::debug;
use pgp::crypto::hash::HashAlgorithm;
use pgp::ser::Serialize as _;
use pgp::types::{KeyTrait as _, SecretKeyTrait as _};
use pgp::{Deserializable as _, Message, SignedSecretKey};

/// Number of trailing fingerprint hex digits forming the long key id.
const KEY_ID_HEX_LEN: usize = 16;

/// [`Signer`] holding an unlocked-on-demand OpenPGP secret key.
pub struct OpenPgpSigner {
    key: SignedSecretKey,
    passphrase: String,
    key_id: String,
    public_armor: String,
}

impl std::fmt::Debug for OpenPgpSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenPgpSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl OpenPgpSigner {
    /// Load and validate the key described by `config`.
    ///
    /// The key is test-unlocked once so that a wrong passphrase is
    /// reported before any artefact is processed. The armored public key
    /// is exported here too and reused for every manifest.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::KeyFile`] if the key file cannot be read,
    /// [`SignerError::MalformedKey`] if it does not parse,
    /// [`SignerError::Passphrase`] if it cannot be unlocked, and
    /// [`SignerError::Export`] if the public key cannot be armored.
    pub fn from_config(config: &SignerConfig) -> Result<Self, SignerError> {
        let armored = match &config.key {
            KeyMaterial::Inline(armored) => armored.clone(),
            KeyMaterial::File(path) => {
                std::fs::read_to_string(path).map_err(|source| SignerError::KeyFile {
                    path: path.clone(),
                    source,
                })?
            }
        };

        let (key, _headers) = SignedSecretKey::from_string(&armored).map_err(|e| {
            SignerError::MalformedKey {
                reason: e.to_string(),
            }
        })?;
        key.verify().map_err(|e| SignerError::MalformedKey {
            reason: e.to_string(),
        })?;

        let key_id = match &config.key_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => fingerprint_key_id(&key),
        };
        let passphrase = config.passphrase.clone().unwrap_or_default();
        let mut signer = Self {
            key,
            passphrase,
            key_id,
            public_armor: String::new(),
        };

        signer
            .detached_signature(&[])
            .map_err(|reason| SignerError::Passphrase { reason })?;
        signer.public_armor = signer.export_public_key()?;
        debug!("loaded signing key {}", signer.key_id);
        Ok(signer)
    }

    fn export_public_key(&self) -> Result<String, SignerError> {
        let export = |reason: String| SignerError::Export { reason };
        let passphrase = self.passphrase.clone();
        self.key
            .public_key()
            .sign(&self.key, || passphrase)
            .map_err(|e| export(e.to_string()))?
            .to_armored_string(None)
            .map_err(|e| export(e.to_string()))
    }

    fn detached_signature(&self, payload: &[u8]) -> Result<Vec<u8>, String> {
        let passphrase = self.passphrase.clone();
        let signed = Message::new_literal_bytes("", payload)
            .sign(&self.key, || passphrase, HashAlgorithm::SHA2_256)
            .map_err(|e| e.to_string())?;
        signed.into_signature().to_bytes().map_err(|e| e.to_string())
    }
}

fn fingerprint_key_id(key: &SignedSecretKey) -> String {
    let fingerprint = hex::encode_upper(key.fingerprint());
    let start = fingerprint.len().saturating_sub(KEY_ID_HEX_LEN);
    fingerprint.get(start..).unwrap_or_default().to_owned()
}

impl Signer for OpenPgpSigner {
    fn sign(&self, payload: &[u8]) -> Result<DetachedSignature, SignerError> {
        let bytes = self
            .detached_signature(payload)
            .map_err(|reason| SignerError::Signing { reason })?;
        Ok(DetachedSignature {
            bytes,
            key_id: self.key_id.clone(),
        })
    }

    fn public_key(&self) -> Result<PublicKey, SignerError> {
        Ok(PublicKey {
            key_id: self.key_id.clone(),
            ascii_armor: self.public_armor.clone(),
        })
    }
}
