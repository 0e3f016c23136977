// wallet-core\src\encoding\base58.rs
//
// Base58 / Base58Check (Bitcoin alphabet)
// Leading zero bytes <-> leading '1' characters.

use crate::crypto::hash::double_sha256;
use crate::error::EncodingError;
use num_bigint::BigUint;

pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Checksum suffix length for Base58Check.
pub const CHECKSUM_LEN: usize = 4;

fn digit_of(c: u8) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u8)
}

/// Big-integer base-58 conversion.
pub fn encode(bytes: &[u8]) -> String {
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();
    let rest = &bytes[zeros..];

    let mut out = String::with_capacity(zeros + bytes.len() * 138 / 100 + 1);
    out.extend(std::iter::repeat('1').take(zeros));
    if !rest.is_empty() {
        let digits = BigUint::from_bytes_be(rest).to_radix_be(58);
        out.extend(digits.into_iter().map(|d| ALPHABET[d as usize] as char));
    }
    out
}

/// Inverse of [`encode`]; any symbol outside the alphabet is `Base58Decode`.
pub fn decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    let mut digits = Vec::with_capacity(s.len());
    for (pos, c) in s.bytes().enumerate() {
        let d = digit_of(c).ok_or_else(|| {
            EncodingError::Base58Decode(format!(
                "invalid character '{}' at position {}",
                c as char, pos
            ))
        })?;
        digits.push(d);
    }

    let zeros = digits.iter().take_while(|&&d| d == 0).count();
    let mut out = vec![0u8; zeros];
    let rest = &digits[zeros..];
    if !rest.is_empty() {
        // every digit is < 58 so the radix conversion always succeeds
        let value = BigUint::from_radix_be(rest, 58).ok_or_else(|| {
            EncodingError::Base58Decode("radix conversion failed".to_string())
        })?;
        out.extend_from_slice(&value.to_bytes_be());
    }
    Ok(out)
}

/// `payload ‖ double_sha256(payload)[..4]`, Base58 encoded.
pub fn check_encode(payload: &[u8]) -> String {
    let checksum = double_sha256(payload);
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&data)
}

/// Decodes and strips the 4-byte checksum after verifying it.
pub fn check_decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    let mut data = decode(s)?;
    if data.len() < CHECKSUM_LEN {
        return Err(EncodingError::InvalidLength {
            expected: CHECKSUM_LEN,
            actual: data.len(),
        });
    }
    let split = data.len() - CHECKSUM_LEN;
    let checksum = double_sha256(&data[..split]);
    if checksum[..CHECKSUM_LEN] != data[split..] {
        return Err(EncodingError::InvalidChecksum);
    }
    data.truncate(split);
    Ok(data)
}
