//! Sealing a secret into a vault, opening it, and re-sealing it under a
//! new password.
//!
//! Every seal draws a new salt and a new IV; nothing here reuses either.
//! Derived keys live only inside these functions.

use tracing::debug;

use super::format::{EncryptedVault, CURRENT_VERSION};
use crate::crypto::{decrypt, derive_key, encrypt, generate_salt, CryptoProvider, KdfParams};
use crate::errors::CryptoError;
use crate::secret::SecretBytes;

impl EncryptedVault {
    /// Encrypt `secret` under `password` into a brand-new vault.
    pub fn seal(
        provider: &dyn CryptoProvider,
        password: &[u8],
        secret: &[u8],
        params: &KdfParams,
    ) -> Result<Self, CryptoError> {
        let salt = generate_salt(provider)?;
        let key = derive_key(password, &salt, params)?;
        let sealed = encrypt(provider, &key, secret)?;

        debug!(
            iterations = params.iterations,
            ciphertext_len = sealed.ciphertext.len(),
            "sealed wallet secret"
        );

        Ok(Self {
            version: CURRENT_VERSION,
            ciphertext: sealed.ciphertext,
            iv: sealed.iv,
            salt,
            kdf: params.clone(),
        })
    }

    /// Decrypt the vault with `password`.
    ///
    /// A wrong password and a tampered vault are indistinguishable; both
    /// surface as `AuthenticationFailed`.
    pub fn open(&self, password: &[u8]) -> Result<SecretBytes, CryptoError> {
        let key = derive_key(password, &self.salt, &self.kdf)?;
        let secret = decrypt(&key, &self.ciphertext, &self.iv);
        if secret.is_err() {
            debug!("vault authentication failed");
        }
        secret
    }

    /// Re-encrypt the same secret under `new_password`.
    ///
    /// The old vault is left untouched; the caller replaces it.
    pub fn reseal(
        &self,
        provider: &dyn CryptoProvider,
        old_password: &[u8],
        new_password: &[u8],
        params: &KdfParams,
    ) -> Result<Self, CryptoError> {
        let secret = self.open(old_password)?;
        Self::seal(provider, new_password, secret.as_bytes(), params)
    }
}
