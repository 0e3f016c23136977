// wallet-core\src\crypto\hash.rs
//
// Hash helpers dùng chung: SHA-256, double SHA-256, HASH160, HMAC-SHA512

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// SHA-256 của `data`.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256(SHA-256(data)), dùng cho checksum Base58Check.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// RIPEMD160(SHA-256(data)). Only used for extended-key fingerprints.
#[inline]
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// HMAC-SHA512(key, data) trả về (I_L, I_R).
///
/// HMAC accepts keys of any length, so this cannot fail.
pub fn hmac_sha512(key: &[u8], data: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    for chunk in data {
        mac.update(chunk);
    }
    let digest = mac.finalize().into_bytes();

    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&digest[..32]);
    right.copy_from_slice(&digest[32..]);
    (left, right)
}
