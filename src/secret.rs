//! Scoped plaintext buffers.
//!
//! `SecretBytes` owns decrypted wallet material (a mnemonic or a raw
//! private key).  The bytes are wiped when the buffer is dropped, on every
//! exit path, and the type deliberately implements neither `Clone` nor a
//! revealing `Debug`.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A plaintext secret held in memory for the duration of one operation.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes {
    bytes: Vec<u8>,
}

impl SecretBytes {
    /// Take ownership of `bytes`.  The caller's vector is moved, not copied.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Copy `bytes` into a new scoped buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// View the secret as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

impl From<String> for SecretBytes {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = SecretBytes::from_slice(b"abandon abandon about");
        let shown = format!("{secret:?}");
        assert_eq!(shown, "SecretBytes([REDACTED; 21])");
        assert!(!shown.contains("abandon"));
    }

    #[test]
    fn explicit_zeroize_clears_contents() {
        let mut secret = SecretBytes::from_slice(&[0xAA; 32]);
        secret.zeroize();
        assert!(secret.is_empty());
    }

    #[test]
    fn as_str_rejects_binary() {
        assert_eq!(SecretBytes::from_slice(b"word").as_str(), Some("word"));
        assert!(SecretBytes::from_slice(&[0xFF, 0xFE]).as_str().is_none());
    }
}
