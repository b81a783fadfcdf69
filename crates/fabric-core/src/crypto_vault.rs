//! Symmetric encryption for secrets at rest, and webhook signature
//! verification/generation.
//!
//! Distinct from [`crate::key_vault`]: `key_vault` fetches operator-managed
//! secrets from an external vault (Azure Key Vault today); this module
//! encrypts *application data* — Integration configuration values and
//! generated webhook secrets — before they are persisted, using a
//! process-wide key supplied via the environment. `VerifySignature` reuses
//! the HMAC-SHA256 + constant-time-compare pattern from
//! `fabric-service::signature_validator::LiteralSignatureValidator` verbatim.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::ErrorCategory;

/// Minimum byte length the spec requires for generated webhook secrets.
pub const MIN_WEBHOOK_SECRET_BYTES: usize = 32;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must be {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("ciphertext is too short to contain a nonce")]
    CiphertextTooShort,

    #[error("decryption failed: ciphertext is invalid or was encrypted with a different key")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("signature is not valid hex")]
    InvalidSignatureEncoding,

    #[error("HMAC-SHA256 digest does not match")]
    SignatureMismatch,
}

impl CryptoError {
    pub fn is_transient(&self) -> bool {
        false
    }

    pub fn error_category(&self) -> ErrorCategory {
        match self {
            Self::SignatureMismatch | Self::InvalidSignatureEncoding => ErrorCategory::Security,
            _ => ErrorCategory::Permanent,
        }
    }
}

/// Encrypts/decrypts application data at rest.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// AES-256-GCM encryptor with a random per-message nonce prepended to the ciphertext.
pub struct AesGcmEncryptor {
    key: Zeroizing<[u8; 32]>,
}

impl AesGcmEncryptor {
    /// Construct from a raw 32-byte key (e.g. decoded from `ENCRYPTION_KEY`).
    pub fn new(key_bytes: &[u8]) -> Result<Self, CryptoError> {
        if key_bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: key_bytes.len(),
            });
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(key_bytes);
        Ok(Self { key: Zeroizing::new(key) })
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_ref()))
    }
}

impl Encryptor for AesGcmEncryptor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let cipher = self.cipher();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.len() < NONCE_LEN {
            return Err(CryptoError::CiphertextTooShort);
        }
        let (nonce_bytes, body) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher()
            .decrypt(nonce, body)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Pass-through encryptor for development. Never use in production; the
/// service binary must refuse to select this unless `NO_ENCRYPTION=yes`.
pub struct NoOpEncryptor;

impl Encryptor for NoOpEncryptor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(ciphertext.to_vec())
    }
}

/// Generate a cryptographically random webhook secret of at least
/// [`MIN_WEBHOOK_SECRET_BYTES`], hex-encoded.
pub fn generate_webhook_secret() -> String {
    let mut bytes = [0u8; MIN_WEBHOOK_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Compute and verify an HMAC-SHA256 signature in `sha256=<hex>` format
/// (the GitHub/most-webhook-providers convention), constant-time.
pub fn verify_signature(secret: &str, body: &[u8], hex_signature: &str) -> Result<(), CryptoError> {
    type HmacSha256 = Hmac<Sha256>;

    let hex_part = hex_signature.strip_prefix("sha256=").unwrap_or(hex_signature);
    let signature_bytes = hex::decode(hex_part).map_err(|_| CryptoError::InvalidSignatureEncoding)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| CryptoError::EncryptionFailed)?;
    mac.update(body);

    mac.verify_slice(&signature_bytes)
        .map_err(|_| CryptoError::SignatureMismatch)
}

#[cfg(test)]
#[path = "crypto_vault_tests.rs"]
mod tests;
