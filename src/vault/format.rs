//! The persisted vault record and its text wire form.
//!
//! A vault is a small JSON object; every byte field is standard base64,
//! so the three byte strings never bleed into one another:
//!
//! ```text
//! {"version":1,"ciphertext":"<b64>","iv":"<b64 12 bytes>","salt":"<b64 16 bytes>",
//!  "kdf":{"algorithm":"pbkdf2-sha256","iterations":100000}}
//! ```
//!
//! Decoding is all-or-nothing: a missing or unknown field, bad base64, a
//! field of the wrong length, or KDF parameters outside the accepted
//! range is a `FormatError`.

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfParams, IV_LEN, SALT_LEN, TAG_LEN};
use crate::errors::FormatError;

/// Current vault format version.
pub const CURRENT_VERSION: u8 = 1;

/// An encrypted wallet secret plus everything needed to decrypt it
/// except the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncryptedVault {
    /// Format version.
    pub version: u8,

    /// AES-256-GCM ciphertext with the 16-byte tag appended.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// The 12-byte IV used for this ciphertext.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode_array")]
    pub iv: [u8; IV_LEN],

    /// The 16-byte KDF salt.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode_array")]
    pub salt: [u8; SALT_LEN],

    /// KDF settings used when this vault was sealed.
    pub kdf: KdfParams,
}

impl EncryptedVault {
    /// Encode the vault into its text wire form.
    pub fn serialize(&self) -> Result<String, FormatError> {
        serde_json::to_string_pretty(self).map_err(|e| FormatError(format!("encode: {e}")))
    }

    /// Decode a vault from its text wire form.
    pub fn deserialize(wire: &str) -> Result<Self, FormatError> {
        let vault: EncryptedVault =
            serde_json::from_str(wire).map_err(|e| FormatError(e.to_string()))?;
        vault.check()?;
        Ok(vault)
    }

    /// Structural checks that serde cannot express.
    fn check(&self) -> Result<(), FormatError> {
        if self.version != CURRENT_VERSION {
            return Err(FormatError(format!(
                "unsupported version {}, expected {CURRENT_VERSION}",
                self.version
            )));
        }
        if self.ciphertext.len() < TAG_LEN {
            return Err(FormatError(format!(
                "ciphertext is {} bytes, shorter than the {TAG_LEN}-byte tag",
                self.ciphertext.len()
            )));
        }
        self.kdf
            .validate()
            .map_err(|e| FormatError(format!("kdf: {e}")))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded byte fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S, T>(data: T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&BASE64.encode(data.as_ref()))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

fn base64_decode_array<'de, D, const N: usize>(
    deserializer: D,
) -> std::result::Result<[u8; N], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = base64_decode(deserializer)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| serde::de::Error::custom(format!("expected {N} bytes, got {len}")))
}
