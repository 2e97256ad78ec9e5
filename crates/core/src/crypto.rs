//! Symmetric encryption for credentials kept in the session store.
//!
//! The SAP password a user types at login has to be replayed on every
//! gateway call made on their behalf, so it cannot be hashed. It is sealed
//! with AES-256-GCM under a key derived from the application secret and
//! stored as base64 `nonce || ciphertext`.

use aes_gcm::aead::{Aead, AeadCore, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Length of an AES-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Encrypts and decrypts short secrets with a process-wide key.
#[derive(Clone)]
pub struct CredentialCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

impl CredentialCipher {
    /// Derive the 256-bit key from an arbitrary-length application secret.
    pub fn from_secret(secret: &str) -> Result<Self, CoreError> {
        if secret.is_empty() {
            return Err(CoreError::Validation(
                "Encryption secret must not be empty".to_string(),
            ));
        }
        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|_| CoreError::Internal("Invalid encryption key length".to_string()))?;
        Ok(Self { cipher })
    }

    /// Seal `plaintext`, returning base64 of `nonce || ciphertext`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CoreError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CoreError::Internal("Credential encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(sealed))
    }

    /// Open a value produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails for tampered data or data sealed under a different secret.
    pub fn decrypt(&self, sealed: &str) -> Result<String, CoreError> {
        let raw = BASE64
            .decode(sealed.as_bytes())
            .map_err(|_| CoreError::Internal("Malformed encrypted credential".to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(CoreError::Internal(
                "Malformed encrypted credential".to_string(),
            ));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CoreError::Internal("Credential decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CoreError::Internal("Decrypted credential is not UTF-8".to_string()))
    }
}
