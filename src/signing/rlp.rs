//! Minimal RLP encoder for Ethereum transaction payloads.
//!
//! Only encoding is needed: transactions are built here and signed, never
//! parsed back.  Integers are encoded big-endian without leading zeros.

/// Encode a byte string.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let len = data.len();
    if len == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else {
        let mut out = Vec::with_capacity(len + 9);
        encode_header(&mut out, 0x80, len);
        out.extend_from_slice(data);
        out
    }
}

/// Encode an unsigned integer as its minimal big-endian byte string.
pub fn encode_uint(value: u128) -> Vec<u8> {
    encode_uint_bytes(&value.to_be_bytes())
}

/// Encode a big-endian integer given as bytes (e.g. a signature scalar),
/// dropping leading zeros.
pub fn encode_uint_bytes(be: &[u8]) -> Vec<u8> {
    let start = be.iter().position(|&b| b != 0).unwrap_or(be.len());
    encode_bytes(&be[start..])
}

/// Wrap already-encoded items in a list.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_len + 9);
    encode_header(&mut out, 0xc0, payload_len);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Short form (`offset + len`) up to 55 bytes, long form beyond.
fn encode_header(out: &mut Vec<u8>, offset: u8, len: usize) {
    if len <= 55 {
        #[allow(clippy::cast_possible_truncation)]
        out.push(offset + len as u8);
    } else {
        let len_bytes = minimal_be(len as u64);
        #[allow(clippy::cast_possible_truncation)]
        out.push(offset + 55 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

fn minimal_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}
