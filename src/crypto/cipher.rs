//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` draws a fresh random 12-byte IV from the
//! provider and returns it next to the ciphertext; callers never supply
//! one.  The 16-byte authentication tag is appended to the ciphertext:
//!
//! ```text
//! ciphertext = [ encrypted plaintext | 16-byte auth tag ]
//! ```

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use super::kdf::DerivedKey;
use super::provider::{random_array, CryptoProvider};
use crate::errors::CryptoError;
use crate::secret::SecretBytes;

/// Size of the AES-256-GCM IV in bytes.
pub const IV_LEN: usize = 12;

/// Size of the appended authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of a single `encrypt` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
}

/// Encrypt `plaintext` under `key` with a freshly generated IV.
pub fn encrypt(
    provider: &dyn CryptoProvider,
    key: &DerivedKey,
    plaintext: &[u8],
) -> Result<Sealed, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let iv: [u8; IV_LEN] = random_array(provider)?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(Sealed { ciphertext, iv })
}

/// Decrypt and authenticate `ciphertext` (with its appended tag).
///
/// Any tag mismatch, whatever the cause, is `AuthenticationFailed`.
pub fn decrypt(
    key: &DerivedKey,
    ciphertext: &[u8],
    iv: &[u8; IV_LEN],
) -> Result<SecretBytes, CryptoError> {
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::AuthenticationFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::AuthenticationFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    Ok(SecretBytes::new(plaintext))
}
