//! Turning a decrypted wallet secret into chain signing keys.
//!
//! A secret is either a BIP-39 mnemonic (UTF-8 text with whitespace) or a
//! chain-native private key.  Mnemonics derive the first account of the
//! usual wallet paths:
//!
//! - Ethereum: BIP-32 `m/44'/60'/0'/0/0`
//! - Solana:   SLIP-0010 Ed25519 `m/44'/501'/0'/0'`
//!
//! Every intermediate buffer (seed, chain code, decoded key bytes) is held
//! in `Zeroizing` so it is wiped as soon as the derivation returns.

use bip32::{DerivationPath, XPrv};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::crypto::CryptoProvider;
use crate::errors::SigningError;
use crate::secret::SecretBytes;

/// BIP-44 account path for Ethereum.
const ETHEREUM_PATH: &str = "m/44'/60'/0'/0/0";

/// SLIP-0010 hardened path segments for Solana (`m/44'/501'/0'/0'`).
const SOLANA_PATH: [u32; 4] = [44, 501, 0, 0];

const HARDENED: u32 = 0x8000_0000;

/// secp256k1 scalar or Ed25519 seed.
const RAW_KEY_LEN: usize = 32;

/// Ed25519 `seed || public key`.
const RAW_KEYPAIR_LEN: usize = 64;

/// How the decrypted secret should be read.
pub(crate) enum KeyMaterial<'a> {
    Mnemonic(&'a str),
    Raw(&'a [u8]),
}

/// Classify a secret without copying it.
pub(crate) fn classify(secret: &SecretBytes) -> Result<KeyMaterial<'_>, SigningError> {
    if secret.is_empty() {
        return Err(SigningError::InvalidKeyMaterial("secret is empty".into()));
    }

    let bytes = secret.as_bytes();
    // The shortest BIP-39 phrase is 47 bytes, so 32 bytes is always a raw key.
    if bytes.len() == RAW_KEY_LEN {
        return Ok(KeyMaterial::Raw(bytes));
    }

    if let Some(text) = secret.as_str() {
        let trimmed = text.trim();
        if trimmed.contains(char::is_whitespace) {
            // A raw keypair can be 64 bytes of text that merely contains a space.
            if bytes.len() == RAW_KEYPAIR_LEN && bip39::Mnemonic::parse_normalized(trimmed).is_err() {
                return Ok(KeyMaterial::Raw(bytes));
            }
            return Ok(KeyMaterial::Mnemonic(trimmed));
        }
    }

    Ok(KeyMaterial::Raw(bytes))
}

/// Validate a mnemonic and expand it to its 64-byte BIP-39 seed
/// (empty passphrase).
fn mnemonic_seed(phrase: &str) -> Result<Zeroizing<[u8; 64]>, SigningError> {
    let mnemonic = bip39::Mnemonic::parse_normalized(phrase)
        .map_err(|e| SigningError::InvalidKeyMaterial(format!("not a valid BIP-39 mnemonic: {e}")))?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}

/// secp256k1 signing key for Ethereum.
pub(crate) fn ethereum_key(secret: &SecretBytes) -> Result<k256::ecdsa::SigningKey, SigningError> {
    match classify(secret)? {
        KeyMaterial::Mnemonic(phrase) => {
            let seed = mnemonic_seed(phrase)?;
            let path: DerivationPath = ETHEREUM_PATH
                .parse()
                .map_err(|e| SigningError::InvalidKeyMaterial(format!("derivation path: {e}")))?;
            let xprv = XPrv::derive_from_path(seed.as_slice(), &path)
                .map_err(|e| SigningError::InvalidKeyMaterial(format!("BIP-32 derivation: {e}")))?;
            Ok(xprv.private_key().clone())
        }
        KeyMaterial::Raw(bytes) if bytes.len() == RAW_KEY_LEN => secp256k1_from_slice(bytes),
        KeyMaterial::Raw(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| invalid_ethereum_key())?;
            let text = text.trim();
            let hex_part = text.strip_prefix("0x").unwrap_or(text);
            if hex_part.len() != 64 {
                return Err(invalid_ethereum_key());
            }
            let decoded = Zeroizing::new(hex::decode(hex_part).map_err(|_| invalid_ethereum_key())?);
            secp256k1_from_slice(&decoded)
        }
    }
}

fn secp256k1_from_slice(bytes: &[u8]) -> Result<k256::ecdsa::SigningKey, SigningError> {
    k256::ecdsa::SigningKey::from_slice(bytes).map_err(|_| {
        SigningError::InvalidKeyMaterial("not a valid secp256k1 private key".into())
    })
}

fn invalid_ethereum_key() -> SigningError {
    SigningError::InvalidKeyMaterial(
        "expected a mnemonic, 32 raw key bytes, or a 64-character hex private key".into(),
    )
}

/// Ed25519 signing key for Solana.
pub(crate) fn solana_key(secret: &SecretBytes) -> Result<ed25519_dalek::SigningKey, SigningError> {
    match classify(secret)? {
        KeyMaterial::Mnemonic(phrase) => {
            let seed = mnemonic_seed(phrase)?;
            let key = slip10_ed25519(seed.as_slice(), &SOLANA_PATH)?;
            Ok(ed25519_dalek::SigningKey::from_bytes(&key))
        }
        KeyMaterial::Raw(bytes) if bytes.len() == RAW_KEY_LEN || bytes.len() == RAW_KEYPAIR_LEN => {
            ed25519_from_slice(bytes)
        }
        KeyMaterial::Raw(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|_| invalid_solana_key())?;
            let text = text.trim();
            let decoded = if text.starts_with('[') {
                // Solana CLI keypair file: a JSON array of 64 numbers.
                Zeroizing::new(
                    serde_json::from_str::<Vec<u8>>(text).map_err(|_| invalid_solana_key())?,
                )
            } else {
                Zeroizing::new(bs58::decode(text).into_vec().map_err(|_| invalid_solana_key())?)
            };
            ed25519_from_slice(&decoded)
        }
    }
}

/// Accept a 32-byte seed or a 64-byte `seed || public key` keypair.
fn ed25519_from_slice(bytes: &[u8]) -> Result<ed25519_dalek::SigningKey, SigningError> {
    match bytes.len() {
        32 => {
            let mut seed = Zeroizing::new([0u8; 32]);
            seed.copy_from_slice(bytes);
            Ok(ed25519_dalek::SigningKey::from_bytes(&seed))
        }
        64 => {
            let mut keypair = Zeroizing::new([0u8; 64]);
            keypair.copy_from_slice(bytes);
            ed25519_dalek::SigningKey::from_keypair_bytes(&keypair).map_err(|_| {
                SigningError::InvalidKeyMaterial(
                    "keypair public half does not match its secret half".into(),
                )
            })
        }
        _ => Err(invalid_solana_key()),
    }
}

fn invalid_solana_key() -> SigningError {
    SigningError::InvalidKeyMaterial(
        "expected a mnemonic, a 32-byte seed, or a 64-byte keypair (raw, base58 or JSON array)"
            .into(),
    )
}

type HmacSha512 = Hmac<Sha512>;

/// SLIP-0010 Ed25519 derivation; every segment is hardened.
fn slip10_ed25519(seed: &[u8], path: &[u32]) -> Result<Zeroizing<[u8; 32]>, SigningError> {
    let (mut key, mut chain_code) = hmac_split(b"ed25519 seed", &[seed])?;

    for &index in path {
        let hardened = (index | HARDENED).to_be_bytes();
        let (child_key, child_chain) =
            hmac_split(&chain_code[..], &[&[0x00u8][..], &key[..], &hardened[..]])?;
        key = child_key;
        chain_code = child_chain;
    }

    Ok(key)
}

/// HMAC-SHA512 over `parts`, split into (left 32, right 32).
fn hmac_split(
    hmac_key: &[u8],
    parts: &[&[u8]],
) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>), SigningError> {
    let mut mac = HmacSha512::new_from_slice(hmac_key)
        .map_err(|e| SigningError::InvalidKeyMaterial(format!("HMAC init failed: {e}")))?;
    for part in parts {
        mac.update(part);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());

    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);
    Ok((left, right))
}

/// Generate a fresh English BIP-39 mnemonic of 12 or 24 words.
pub fn generate_mnemonic(
    provider: &dyn CryptoProvider,
    words: usize,
) -> Result<Zeroizing<String>, SigningError> {
    let mut entropy = Zeroizing::new([0u8; 32]);
    let len = match words {
        12 => 16,
        24 => 32,
        other => {
            return Err(SigningError::InvalidRequest(format!(
                "mnemonic length must be 12 or 24 words (got {other})"
            )))
        }
    };
    provider.fill_random(&mut entropy[..len])?;
    let mnemonic = bip39::Mnemonic::from_entropy(&entropy[..len])
        .map_err(|e| SigningError::Signing(format!("mnemonic generation: {e}")))?;
    Ok(Zeroizing::new(mnemonic.to_string()))
}

/// Check that a secret can produce a key for at least one chain.
///
/// Run before sealing an imported secret so a typo is caught while the
/// user can still fix it.
pub fn check_secret(secret: &SecretBytes) -> Result<(), SigningError> {
    match ethereum_key(secret) {
        Ok(_) => Ok(()),
        Err(eth_err) => solana_key(secret).map(|_| ()).map_err(|_| eth_err),
    }
}
