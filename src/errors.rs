use std::path::PathBuf;
use thiserror::Error;

/// Failures of the key-derivation and cipher layer.
///
/// None of the variants carry key or plaintext material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The platform could not supply a required primitive (RNG, hash).
    #[error("Cryptographic primitive unavailable: {0}")]
    Unavailable(String),

    /// The AEAD tag did not verify. This is the only wrong-password signal.
    #[error("Decryption failed: incorrect password or corrupted data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),
}

/// The vault wire form could not be decoded (or encoded).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid vault format: {0}")]
pub struct FormatError(pub String);

/// Failures of the signing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Unlock failed: {}", unlock_message(.0))]
    Unlock(CryptoError),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Invalid signing request: {0}")]
    InvalidRequest(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// A primitive the boundary needed (e.g. the RNG for a new mnemonic)
    /// was unavailable.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

fn unlock_message(err: &CryptoError) -> String {
    match err {
        CryptoError::AuthenticationFailed => "wrong password or corrupt vault".to_string(),
        other => other.to_string(),
    }
}

/// All errors that can occur in walletseal.
#[derive(Debug, Error)]
pub enum WalletSealError {
    // --- Core errors ---
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Invalid wallet name '{0}': use letters, digits, '-' or '_'")]
    InvalidWalletName(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for walletseal results.
pub type Result<T> = std::result::Result<T, WalletSealError>;
