//! Ethereum transaction signing (secp256k1 ECDSA over keccak-256).
//!
//! Two envelopes are supported:
//!
//! - **Legacy / EIP-155**: `rlp([nonce, gas_price, gas_limit, to, value,
//!   data, chain_id, 0, 0])` is hashed; the signed form replaces the last
//!   three items with `v, r, s` where `v = y_parity + 35 + 2 * chain_id`.
//! - **EIP-1559** (type 2): `0x02 || rlp([chain_id, nonce, max_priority,
//!   max_fee, gas_limit, to, value, data, access_list])`; the signed form
//!   appends `y_parity, r, s`.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use super::request::{hex_bytes, quantity, Chain, SignedTransaction};
use super::rlp;
use crate::errors::SigningError;

/// EIP-2718 type byte for EIP-1559 transactions.
const EIP1559_TX_TYPE: u8 = 0x02;

/// Offset added to the recovery id in compact `r || s || v` signatures.
const COMPACT_V_OFFSET: u8 = 27;

/// keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// A 20-byte Ethereum account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Address of a public key: the last 20 bytes of keccak-256 over the
    /// uncompressed point without its `0x04` prefix.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Address(out)
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 40 {
            return Err(SigningError::InvalidRequest(format!(
                "address '{s}' must be 20 bytes of hex"
            )));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(digits, &mut out)
            .map_err(|e| SigningError::InvalidRequest(format!("address '{s}': {e}")))?;
        Ok(Address(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Unsigned Ethereum transaction fields.
///
/// Supply `gas_price` for a legacy (EIP-155) transaction, or both
/// `max_fee_per_gas` and `max_priority_fee_per_gas` for EIP-1559.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EthereumTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    /// Recipient; `None` deploys a contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Amount in wei.
    #[serde(default, with = "quantity")]
    pub value: u128,
    pub gas_limit: u64,
    #[serde(default, with = "quantity::option", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
    #[serde(default, with = "quantity::option", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default, with = "quantity::option", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(default, with = "hex_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

/// The fee model a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

impl EthereumTransaction {
    /// A plain value transfer priced with EIP-1559 fees.
    pub fn transfer(
        chain_id: u64,
        nonce: u64,
        to: Address,
        value: u128,
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    ) -> Self {
        Self {
            chain_id,
            nonce,
            to: Some(to),
            value,
            gas_limit: 21_000,
            gas_price: None,
            max_fee_per_gas: Some(max_fee_per_gas),
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            data: Vec::new(),
        }
    }

    /// Work out which envelope the fee fields describe.
    pub fn fee_model(&self) -> Result<FeeModel, SigningError> {
        match (
            self.gas_price,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
        ) {
            (Some(gas_price), None, None) => Ok(FeeModel::Legacy { gas_price }),
            (None, Some(max_fee), Some(max_priority)) => {
                if max_priority > max_fee {
                    return Err(SigningError::InvalidRequest(
                        "max_priority_fee_per_gas exceeds max_fee_per_gas".into(),
                    ));
                }
                Ok(FeeModel::Eip1559 {
                    max_fee_per_gas: max_fee,
                    max_priority_fee_per_gas: max_priority,
                })
            }
            (None, None, None) => Err(SigningError::InvalidRequest(
                "no fee fields: set gas_price, or max_fee_per_gas and max_priority_fee_per_gas"
                    .into(),
            )),
            _ => Err(SigningError::InvalidRequest(
                "gas_price cannot be combined with EIP-1559 fee fields, and both EIP-1559 fields are required"
                    .into(),
            )),
        }
    }

    fn check(&self) -> Result<FeeModel, SigningError> {
        if self.chain_id == 0 {
            return Err(SigningError::InvalidRequest("chain_id must be non-zero".into()));
        }
        if self.gas_limit == 0 {
            return Err(SigningError::InvalidRequest("gas_limit must be non-zero".into()));
        }
        self.fee_model()
    }

    fn encoded_to(&self) -> Vec<u8> {
        match &self.to {
            Some(addr) => rlp::encode_bytes(&addr.0),
            None => rlp::encode_bytes(&[]),
        }
    }

    /// Fields shared by the unsigned and signed forms, in envelope order.
    fn body_fields(&self, fee: FeeModel) -> Vec<Vec<u8>> {
        match fee {
            FeeModel::Legacy { gas_price } => vec![
                rlp::encode_uint(u128::from(self.nonce)),
                rlp::encode_uint(gas_price),
                rlp::encode_uint(u128::from(self.gas_limit)),
                self.encoded_to(),
                rlp::encode_uint(self.value),
                rlp::encode_bytes(&self.data),
            ],
            FeeModel::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => vec![
                rlp::encode_uint(u128::from(self.chain_id)),
                rlp::encode_uint(u128::from(self.nonce)),
                rlp::encode_uint(max_priority_fee_per_gas),
                rlp::encode_uint(max_fee_per_gas),
                rlp::encode_uint(u128::from(self.gas_limit)),
                self.encoded_to(),
                rlp::encode_uint(self.value),
                rlp::encode_bytes(&self.data),
                // Empty access list.
                rlp::encode_list(&[]),
            ],
        }
    }

    /// The exact bytes whose keccak-256 hash gets signed.
    pub fn signing_payload(&self) -> Result<Vec<u8>, SigningError> {
        let fee = self.check()?;
        let mut fields = self.body_fields(fee);
        Ok(match fee {
            FeeModel::Legacy { .. } => {
                fields.push(rlp::encode_uint(u128::from(self.chain_id)));
                fields.push(rlp::encode_uint(0));
                fields.push(rlp::encode_uint(0));
                rlp::encode_list(&fields)
            }
            FeeModel::Eip1559 { .. } => typed(EIP1559_TX_TYPE, &rlp::encode_list(&fields)),
        })
    }

    pub fn signing_hash(&self) -> Result<[u8; 32], SigningError> {
        Ok(keccak256(&self.signing_payload()?))
    }
}

fn typed(tx_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(tx_type);
    out.extend_from_slice(payload);
    out
}

/// A secp256k1 key bound to one signing operation.
///
/// `k256::ecdsa::SigningKey` zeroizes its scalar on drop.
pub struct EthereumSigner {
    key: SigningKey,
}

impl EthereumSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    pub fn address(&self) -> Address {
        Address::from_verifying_key(self.key.verifying_key())
    }

    /// Sign `tx` with RFC 6979 deterministic ECDSA (low-S).
    pub fn sign(&self, tx: &EthereumTransaction) -> Result<SignedTransaction, SigningError> {
        let fee = tx.check()?;
        let hash = tx.signing_hash()?;

        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| SigningError::Signing(format!("ECDSA: {e}")))?;
        let (r, s) = signature.split_bytes();
        let y_parity = u8::from(recovery_id.is_y_odd());

        let mut fields = tx.body_fields(fee);
        let raw = match fee {
            FeeModel::Legacy { .. } => {
                let v = u128::from(y_parity) + 35 + 2 * u128::from(tx.chain_id);
                fields.push(rlp::encode_uint(v));
                fields.push(rlp::encode_uint_bytes(&r));
                fields.push(rlp::encode_uint_bytes(&s));
                rlp::encode_list(&fields)
            }
            FeeModel::Eip1559 { .. } => {
                fields.push(rlp::encode_uint(u128::from(y_parity)));
                fields.push(rlp::encode_uint_bytes(&r));
                fields.push(rlp::encode_uint_bytes(&s));
                typed(EIP1559_TX_TYPE, &rlp::encode_list(&fields))
            }
        };

        let mut compact = Vec::with_capacity(65);
        compact.extend_from_slice(&r);
        compact.extend_from_slice(&s);
        compact.push(y_parity + COMPACT_V_OFFSET);

        Ok(SignedTransaction {
            chain: Chain::Ethereum,
            signer: self.address().to_checksum(),
            tx_hash: format!("0x{}", hex::encode(keccak256(&raw))),
            raw,
            signature: compact,
        })
    }
}
