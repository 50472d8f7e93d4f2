//! Signing requests and signed results, plus the serde helpers they share.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ethereum::EthereumTransaction;
use super::solana::SolanaTransaction;
use crate::errors::SigningError;

/// Chains the signing boundary knows how to sign for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Ethereum and EVM chains (secp256k1 ECDSA).
    Ethereum,
    /// Solana (Ed25519).
    Solana,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => f.write_str("ethereum"),
            Chain::Solana => f.write_str("solana"),
        }
    }
}

impl FromStr for Chain {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Chain::Ethereum),
            "solana" | "sol" => Ok(Chain::Solana),
            other => Err(SigningError::InvalidRequest(format!("unknown chain '{other}'"))),
        }
    }
}

/// A chain identifier plus unsigned transaction fields.
///
/// Consumed by value: one request produces one signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "lowercase")]
pub enum SigningRequest {
    Ethereum(EthereumTransaction),
    Solana(SolanaTransaction),
}

impl SigningRequest {
    pub fn chain(&self) -> Chain {
        match self {
            SigningRequest::Ethereum(_) => Chain::Ethereum,
            SigningRequest::Solana(_) => Chain::Solana,
        }
    }

    /// Parse a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, SigningError> {
        serde_json::from_str(json).map_err(|e| SigningError::InvalidRequest(e.to_string()))
    }
}

/// A fully signed transaction, ready for an external broadcaster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub chain: Chain,
    /// Address of the signing key in the chain's native format.
    pub signer: String,
    /// Signed transaction in the chain's wire encoding.
    #[serde(with = "hex_bytes")]
    pub raw: Vec<u8>,
    /// Raw signature bytes (`r || s || v` for Ethereum, 64 bytes for Solana).
    #[serde(with = "hex_bytes")]
    pub signature: Vec<u8>,
    /// Transaction id: keccak-256 hex for Ethereum, base58 signature for Solana.
    pub tx_hash: String,
}

impl SignedTransaction {
    pub fn to_json(&self) -> Result<String, SigningError> {
        serde_json::to_string_pretty(self).map_err(|e| SigningError::Signing(e.to_string()))
    }
}

/// `0x`-prefixed hex for byte vectors; the prefix is optional on input.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        decode(&s).map_err(serde::de::Error::custom)
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(s.strip_prefix("0x").unwrap_or(s))
    }
}

/// Integer quantities that may exceed 2^53: accepted as JSON numbers,
/// decimal strings or `0x` hex strings; written as decimal strings.
pub(crate) mod quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    fn parse(raw: Raw) -> Result<u128, String> {
        match raw {
            Raw::Number(n) => Ok(u128::from(n)),
            Raw::Text(s) => {
                let s = s.trim();
                let parsed = match s.strip_prefix("0x") {
                    Some(hex) => u128::from_str_radix(hex, 16),
                    None => s.parse::<u128>(),
                };
                parsed.map_err(|e| format!("invalid quantity '{s}': {e}"))
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        parse(Raw::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::{parse, Raw};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<u128>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_some(&v.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u128>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?
                .map(parse)
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}
