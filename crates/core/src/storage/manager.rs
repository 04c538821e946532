use crate::errors::CoreError;
use crate::models::session::Session;

use super::encryption::{self, KdfParams};
use super::format;

/// Persists the [`Session`] as an encrypted blob.
///
/// Session → bincode → AES-256-GCM(Argon2id(passphrase)) → `SWSN` bytes.
pub struct SessionStore;

impl SessionStore {
    pub fn save_to_bytes(session: &Session, passphrase: &str) -> Result<Vec<u8>, CoreError> {
        Self::save_with_params(session, passphrase, KdfParams::default())
    }

    /// Same as [`Self::save_to_bytes`] with explicit KDF cost.
    pub fn save_with_params(
        session: &Session,
        passphrase: &str,
        kdf_params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(session)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize session: {e}")))?;
        let sealed = encryption::seal(&plaintext, passphrase, kdf_params)?;
        format::encode(&sealed)
    }

    pub fn load_from_bytes(data: &[u8], passphrase: &str) -> Result<Session, CoreError> {
        let sealed = format::decode(data)?;
        let plaintext = encryption::open(&sealed, passphrase)?;
        let mut session: Session = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize session: {e}")))?;
        session.ensure_category_types();
        Ok(session)
    }

    /// Parent directories are created as needed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(session: &Session, path: &str, passphrase: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(session, passphrase)?;
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        tracing::debug!(path, "session saved");
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, passphrase: &str) -> Result<Session, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, passphrase)
    }

    /// First run: a missing file yields a fresh default session.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &str, passphrase: &str) -> Result<Session, CoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::load_from_bytes(&bytes, passphrase),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path, "no session file, starting fresh");
                Ok(Session::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
