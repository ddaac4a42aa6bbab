//! Minimal ABI encoding and decoding for the call shapes this crate builds
//!
//! Hand-rolled word encoding in the same spirit as the EIP-712 struct
//! encoding: 4-byte selectors, 32-byte static words, and head/tail layout
//! for dynamic arguments.

use ethereum_types::{Address, U256};
use web3::signing::keccak256;

use crate::error::{MigrationError, Result};

/// A single call argument
#[derive(Debug, Clone)]
pub enum Param {
    Address(Address),
    Uint(U256),
    Bool(bool),
    Bytes(Vec<u8>),
    UintArray(Vec<U256>),
}

impl Param {
    fn is_dynamic(&self) -> bool {
        matches!(self, Param::Bytes(_) | Param::UintArray(_))
    }
}

/// First four bytes of the keccak hash of a function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encode an address as a left-padded 32-byte word
pub fn encode_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Encode a uint256 as a big-endian 32-byte word
pub fn encode_u256(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Encode a bool as a 32-byte word
pub fn encode_bool(value: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = value as u8;
    word
}

/// Encode a full call: selector followed by head/tail argument layout
pub fn encode_call(selector: [u8; 4], params: &[Param]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encode_args(params));
    data
}

/// Encode arguments with the standard head/tail layout: static values
/// inline, dynamic values as offsets into a trailing tail section
pub fn encode_args(params: &[Param]) -> Vec<u8> {
    let head_len = params.len() * 32;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for param in params {
        if param.is_dynamic() {
            head.extend_from_slice(&encode_u256(U256::from(head_len + tail.len())));
            match param {
                Param::Bytes(bytes) => {
                    tail.extend_from_slice(&encode_u256(U256::from(bytes.len())));
                    tail.extend_from_slice(bytes);
                    let rem = bytes.len() % 32;
                    if rem != 0 {
                        tail.extend_from_slice(&vec![0u8; 32 - rem]);
                    }
                }
                Param::UintArray(values) => {
                    tail.extend_from_slice(&encode_u256(U256::from(values.len())));
                    for value in values {
                        tail.extend_from_slice(&encode_u256(*value));
                    }
                }
                _ => unreachable!(),
            }
        } else {
            match param {
                Param::Address(address) => head.extend_from_slice(&encode_address(*address)),
                Param::Uint(value) => head.extend_from_slice(&encode_u256(*value)),
                Param::Bool(value) => head.extend_from_slice(&encode_bool(*value)),
                _ => unreachable!(),
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Decode a single uint256 return value
pub fn decode_u256(data: &[u8]) -> Result<U256> {
    if data.len() < 32 {
        return Err(MigrationError::Decode(format!(
            "expected at least 32 bytes, got {}",
            data.len()
        )));
    }
    Ok(U256::from_big_endian(&data[..32]))
}

/// Decode a uint256[] return value (offset word, length word, elements)
pub fn decode_u256_array(data: &[u8]) -> Result<Vec<U256>> {
    if data.len() < 64 {
        return Err(MigrationError::Decode(format!(
            "return data too short for uint256[]: {} bytes",
            data.len()
        )));
    }

    let offset = U256::from_big_endian(&data[..32]);
    if offset > U256::from(data.len()) {
        return Err(MigrationError::Decode("array offset out of range".to_string()));
    }
    let offset = offset.as_usize();
    if offset + 32 > data.len() {
        return Err(MigrationError::Decode("array offset out of range".to_string()));
    }

    let len = U256::from_big_endian(&data[offset..offset + 32]);
    if len > U256::from(data.len() / 32) {
        return Err(MigrationError::Decode("array length out of range".to_string()));
    }
    let len = len.as_usize();

    let elements_start = offset + 32;
    if elements_start + len * 32 > data.len() {
        return Err(MigrationError::Decode(
            "array elements exceed return data".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let start = elements_start + i * 32;
        out.push(U256::from_big_endian(&data[start..start + 32]));
    }
    Ok(out)
}

/// Encode a uint256[] as top-level return data, the inverse of
/// [`decode_u256_array`]; used by tests and simulation fixtures
pub fn encode_u256_array(values: &[U256]) -> Vec<u8> {
    let mut data = Vec::with_capacity(64 + values.len() * 32);
    data.extend_from_slice(&encode_u256(U256::from(32)));
    data.extend_from_slice(&encode_u256(U256::from(values.len())));
    for value in values {
        data.extend_from_slice(&encode_u256(*value));
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        // keccak("transfer(address,uint256)") starts with a9059cbb
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_static_encoding() {
        let address: Address = "0x1234567890123456789012345678901234567890"
            .parse()
            .unwrap();
        let word = encode_address(address);
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], address.as_bytes());

        assert_eq!(encode_bool(true)[31], 1);
        assert_eq!(encode_bool(false), [0u8; 32]);

        let word = encode_u256(U256::from(255));
        assert_eq!(word[31], 255);
        assert_eq!(&word[..31], &[0u8; 31]);
    }

    #[test]
    fn test_dynamic_head_tail_layout() {
        let data = encode_args(&[
            Param::Uint(U256::from(7)),
            Param::Bytes(vec![0xaa, 0xbb, 0xcc]),
        ]);

        // head: uint word + offset word; tail: length word + padded bytes
        assert_eq!(data.len(), 32 * 4);
        assert_eq!(U256::from_big_endian(&data[..32]), U256::from(7));
        assert_eq!(U256::from_big_endian(&data[32..64]), U256::from(64));
        assert_eq!(U256::from_big_endian(&data[64..96]), U256::from(3));
        assert_eq!(&data[96..99], &[0xaa, 0xbb, 0xcc]);
        assert_eq!(&data[99..128], &[0u8; 29]);
    }

    #[test]
    fn test_uint_array_round_trip() {
        let values = vec![U256::from(1), U256::from(2), U256::from(3)];
        let data = encode_u256_array(&values);
        assert_eq!(decode_u256_array(&data).unwrap(), values);
    }

    #[test]
    fn test_decode_rejects_short_data() {
        assert!(decode_u256(&[0u8; 16]).is_err());
        assert!(decode_u256_array(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_offsets() {
        let mut data = encode_u256_array(&[U256::from(1)]);
        // point the offset past the end of the buffer
        data[31] = 0xff;
        assert!(decode_u256_array(&data).is_err());
    }

    #[test]
    fn test_call_has_selector_prefix() {
        let data = encode_call(selector("getNextNonce(address)"), &[Param::Address(Address::zero())]);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &selector("getNextNonce(address)"));
    }
}
