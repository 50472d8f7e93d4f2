//! Solana transaction signing (Ed25519 over the legacy message format).
//!
//! A legacy message is laid out as:
//!
//! ```text
//! [num_required_signatures][num_readonly_signed][num_readonly_unsigned]
//! [compact-u16 n][n x 32-byte account keys]
//! [32-byte recent blockhash]
//! [compact-u16 m][m x compiled instruction]
//! ```
//!
//! and a signed transaction is `[compact-u16 1][64-byte signature][message]`.
//! The wallet key is always the fee payer and the only signer.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer as _, SigningKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::request::{Chain, SignedTransaction};
use crate::errors::SigningError;

/// Instruction index of `SystemInstruction::Transfer`.
const SYSTEM_TRANSFER: u32 = 2;

/// The System Program id (all-zero key, `1111..1111` in base58).
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey([0u8; 32]);

/// A 32-byte Solana public key, written in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pubkey(pub [u8; 32]);

/// Recent blockhashes share the public-key encoding.
pub type Blockhash = Pubkey;

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl FromStr for Pubkey {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| SigningError::InvalidRequest(format!("base58 key '{s}': {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            SigningError::InvalidRequest(format!("base58 key '{s}' is not 32 bytes"))
        })?;
        Ok(Pubkey(bytes))
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An account referenced by an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default)]
    pub is_writable: bool,
}

/// One program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instruction {
    pub program_id: Pubkey,
    #[serde(default)]
    pub accounts: Vec<AccountMeta>,
    /// Instruction data, base64 in JSON.
    #[serde(
        default,
        serialize_with = "crate::vault::format::base64_encode",
        deserialize_with = "crate::vault::format::base64_decode"
    )]
    pub data: Vec<u8>,
}

/// Unsigned Solana transaction fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolanaTransaction {
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<Instruction>,
}

impl SolanaTransaction {
    /// A System Program lamport transfer from `from` to `to`.
    pub fn transfer(from: Pubkey, to: Pubkey, lamports: u64, recent_blockhash: Blockhash) -> Self {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Self {
            recent_blockhash,
            instructions: vec![Instruction {
                program_id: SYSTEM_PROGRAM_ID,
                accounts: vec![
                    AccountMeta {
                        pubkey: from,
                        is_signer: true,
                        is_writable: true,
                    },
                    AccountMeta {
                        pubkey: to,
                        is_signer: false,
                        is_writable: true,
                    },
                ],
                data,
            }],
        }
    }

    /// Compile the legacy message with `fee_payer` as the sole signer.
    pub fn compile_message(&self, fee_payer: &Pubkey) -> Result<Vec<u8>, SigningError> {
        if self.instructions.is_empty() {
            return Err(SigningError::InvalidRequest(
                "transaction has no instructions".into(),
            ));
        }

        let keys = self.ordered_accounts(fee_payer)?;
        if keys.len() > usize::from(u8::MAX) + 1 {
            return Err(SigningError::InvalidRequest(format!(
                "{} accounts exceed the 256-account message limit",
                keys.len()
            )));
        }

        let count = |pred: fn(&KeyFlags) -> bool| -> u8 {
            // Bounded by the 256-account check above; 256 signers is impossible
            // because only the fee payer may sign.
            u8::try_from(keys.iter().filter(|k| pred(k)).count()).unwrap_or(u8::MAX)
        };

        let mut msg = Vec::with_capacity(64 + keys.len() * 32);
        msg.push(count(|k| k.is_signer));
        msg.push(count(|k| k.is_signer && !k.is_writable));
        msg.push(count(|k| !k.is_signer && !k.is_writable));

        encode_compact_len(&mut msg, keys.len())?;
        for key in &keys {
            msg.extend_from_slice(&key.pubkey.0);
        }
        msg.extend_from_slice(&self.recent_blockhash.0);

        encode_compact_len(&mut msg, self.instructions.len())?;
        for ix in &self.instructions {
            msg.push(account_index(&keys, &ix.program_id)?);
            encode_compact_len(&mut msg, ix.accounts.len())?;
            for meta in &ix.accounts {
                msg.push(account_index(&keys, &meta.pubkey)?);
            }
            encode_compact_len(&mut msg, ix.data.len())?;
            msg.extend_from_slice(&ix.data);
        }

        Ok(msg)
    }

    /// Deduplicate every referenced key, merge its flags, and order the
    /// result: fee payer, writable signers, readonly signers, writable
    /// non-signers, readonly non-signers.
    fn ordered_accounts(&self, fee_payer: &Pubkey) -> Result<Vec<KeyFlags>, SigningError> {
        let mut keys = vec![KeyFlags {
            pubkey: *fee_payer,
            is_signer: true,
            is_writable: true,
        }];

        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            match keys.iter_mut().find(|k| k.pubkey == pubkey) {
                Some(existing) => {
                    existing.is_signer |= is_signer;
                    existing.is_writable |= is_writable;
                }
                None => keys.push(KeyFlags {
                    pubkey,
                    is_signer,
                    is_writable,
                }),
            }
        };

        for ix in &self.instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        if let Some(other) = keys.iter().find(|k| k.is_signer && k.pubkey != *fee_payer) {
            return Err(SigningError::InvalidRequest(format!(
                "instruction requires a signature from {} which this wallet does not hold",
                other.pubkey
            )));
        }

        // Stable sort keeps the fee payer first within its group.
        keys.sort_by_key(|k| match (k.is_signer, k.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });
        Ok(keys)
    }
}

#[derive(Debug, Clone, Copy)]
struct KeyFlags {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

fn account_index(keys: &[KeyFlags], pubkey: &Pubkey) -> Result<u8, SigningError> {
    keys.iter()
        .position(|k| k.pubkey == *pubkey)
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| SigningError::InvalidRequest(format!("account {pubkey} not indexable")))
}

/// Solana's "short vec" length prefix: 7 bits per byte, high bit continues.
fn encode_compact_len(out: &mut Vec<u8>, len: usize) -> Result<(), SigningError> {
    let mut value = u16::try_from(len)
        .map_err(|_| SigningError::InvalidRequest(format!("length {len} exceeds u16")))?;
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return Ok(());
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// An Ed25519 key bound to one signing operation.
///
/// `ed25519_dalek::SigningKey` zeroizes its secret on drop.
pub struct SolanaSigner {
    key: SigningKey,
}

impl SolanaSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn pubkey(&self) -> Pubkey {
        Pubkey(self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, tx: &SolanaTransaction) -> Result<SignedTransaction, SigningError> {
        let pubkey = self.pubkey();
        let message = tx.compile_message(&pubkey)?;
        let signature = self.key.sign(&message).to_bytes();

        let mut raw = Vec::with_capacity(1 + signature.len() + message.len());
        encode_compact_len(&mut raw, 1)?;
        raw.extend_from_slice(&signature);
        raw.extend_from_slice(&message);

        Ok(SignedTransaction {
            chain: Chain::Solana,
            signer: pubkey.to_string(),
            raw,
            tx_hash: bs58::encode(signature).into_string(),
            signature: signature.to_vec(),
        })
    }
}
