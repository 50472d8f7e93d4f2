//! Cryptographic primitives for walletseal.
//!
//! This module provides:
//! - An injectable randomness capability (`provider`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - AES-256-GCM encryption and decryption (`cipher`)

pub mod cipher;
pub mod kdf;
pub mod provider;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use cipher::{decrypt, encrypt, Sealed, IV_LEN, TAG_LEN};
pub use kdf::{
    derive_key, derive_key_default, generate_salt, DerivedKey, KdfParams, DEFAULT_ITERATIONS,
    KEY_LEN, MAX_ITERATIONS, MIN_ITERATIONS, SALT_LEN,
};
pub use provider::{CryptoProvider, OsProvider};
