//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! A 16-byte random salt and the stored iteration count turn a password
//! into the 256-bit AES key.  The same password + salt + params always
//! produce the same key, which is what lets a vault be reopened later.

use std::fmt;

use hmac::Hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::provider::{random_array, CryptoProvider};
use crate::errors::CryptoError;

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count we accept, from config or from a stored vault.
pub const MIN_ITERATIONS: u32 = 10_000;

/// Highest iteration count we accept. Keeps a hostile vault file from
/// pinning the CPU for hours on open.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// The only KDF identifier currently written into vaults.
const PBKDF2_SHA256: &str = "pbkdf2-sha256";

/// KDF parameters stored next to the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KdfParams {
    /// Algorithm identifier; always `pbkdf2-sha256` for now.
    pub algorithm: String,
    /// PBKDF2 iteration count.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::pbkdf2(DEFAULT_ITERATIONS)
    }
}

impl KdfParams {
    /// PBKDF2-HMAC-SHA256 with the given iteration count.
    pub fn pbkdf2(iterations: u32) -> Self {
        Self {
            algorithm: PBKDF2_SHA256.to_string(),
            iterations,
        }
    }

    /// Reject parameters we do not know how to run or consider too weak.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.algorithm != PBKDF2_SHA256 {
            return Err(CryptoError::KeyDerivationFailed(format!(
                "unsupported KDF algorithm '{}'",
                self.algorithm
            )));
        }
        if self.iterations < MIN_ITERATIONS {
            return Err(CryptoError::KeyDerivationFailed(format!(
                "iterations must be at least {MIN_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(CryptoError::KeyDerivationFailed(format!(
                "iterations must be at most {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        Ok(())
    }
}

/// A 32-byte symmetric key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for DerivedKey {}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive a key with the default parameters (100 000 rounds, SHA-256).
pub fn derive_key_default(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<DerivedKey, CryptoError> {
    derive_key(password, salt, &KdfParams::default())
}

/// Derive a 32-byte key with explicit parameters.
pub fn derive_key(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    params: &KdfParams,
) -> Result<DerivedKey, CryptoError> {
    params.validate()?;

    let mut key = DerivedKey::from_bytes([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, &mut key.bytes)
        .map_err(|e| CryptoError::Unavailable(format!("PBKDF2-HMAC-SHA256: {e}")))?;

    Ok(key)
}

/// Generate a fresh random 16-byte salt.
pub fn generate_salt(provider: &dyn CryptoProvider) -> Result<[u8; SALT_LEN], CryptoError> {
    random_array(provider)
}
