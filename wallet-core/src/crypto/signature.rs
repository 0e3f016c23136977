// wallet-core\src\crypto\signature.rs
//
// ECDSA Signature {r, s}: verify, low-S, DER (wire) và compact r‖s (nội bộ)

use super::curve::{write_be_padded, MAX_CURVE_BITS};
use super::keys::PublicKey;
use crate::error::CryptoError;
use num_bigint::BigUint;
use num_traits::Zero;

/// Largest SEQUENCE body accepted by [`Signature::from_der`].
pub const MAX_DER_SEQUENCE_LEN: usize = 70;
/// Largest INTEGER body (32 bytes plus a sign pad).
pub const MAX_DER_INTEGER_LEN: usize = 33;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// ECDSA signature. Produced by [`PrivateKey::sign_hash`](super::keys::PrivateKey::sign_hash)
/// or decoded from DER / compact bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    r: BigUint,
    s: BigUint,
}

impl Signature {
    /// `r` and `s` must each fit in 32 bytes, else `MalformedSignature`.
    pub fn new(r: BigUint, s: BigUint) -> Result<Self, CryptoError> {
        for (name, v) in [("r", &r), ("s", &s)] {
            if v.bits() > MAX_CURVE_BITS {
                return Err(CryptoError::MalformedSignature(format!(
                    "{} is wider than 32 bytes",
                    name
                )));
            }
        }
        Ok(Self { r, s })
    }

    /// Components already reduced mod `N`.
    pub(crate) fn from_scalars(r: BigUint, s: BigUint) -> Self {
        Self { r, s }
    }

    #[inline]
    pub fn r(&self) -> &BigUint {
        &self.r
    }

    #[inline]
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// `s ≤ N/2`
    #[inline]
    pub fn is_low_s(&self, n: &BigUint) -> bool {
        self.s <= n >> 1u32
    }

    /// Replaces `s` with `N - s` when `s > N/2`.
    pub fn normalize_s(mut self, n: &BigUint) -> Self {
        if !self.is_low_s(n) {
            self.s = n - &self.s;
        }
        self
    }

    // =========================================================================
    // VERIFY
    // =========================================================================

    /// Accepts iff `(u1·G + u2·Q).x mod N == r` with `u1 = e/s`, `u2 = r/s`.
    ///
    /// `r` or `s` outside `[1, N-1]` is rejected up front.
    pub fn verify_hash(&self, hash: &[u8; 32], public_key: &PublicKey) -> bool {
        let curve = public_key.curve();
        let n = curve.n();
        if !curve.is_valid_scalar(&self.r) || !curve.is_valid_scalar(&self.s) {
            return false;
        }

        let e = BigUint::from_bytes_be(hash);
        let w = curve.scalar_inv(&self.s);
        let u1 = (&e * &w) % n;
        let u2 = (&self.r * &w) % n;

        let point = match curve
            .generator()
            .mul_add(&u1, public_key.point(), &u2)
        {
            Ok(p) => p,
            Err(_) => return false,
        };
        match point.x() {
            Some(x) => x % n == self.r,
            None => false,
        }
    }

    // =========================================================================
    // DER
    // =========================================================================

    /// `30 len 02 len(r) r 02 len(s) s`, each INTEGER padded with `0x00`
    /// when its top bit is set.
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);

        // r, s ≤ 32 bytes: each INTEGER ≤ 33, the SEQUENCE ≤ 70
        let seq_len = 4 + r.len() + s.len();
        debug_assert!(seq_len <= MAX_DER_SEQUENCE_LEN);

        let mut out = Vec::with_capacity(2 + seq_len);
        out.push(TAG_SEQUENCE);
        out.push(seq_len as u8);
        out.push(TAG_INTEGER);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(TAG_INTEGER);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// Strict structural decode; any violation is `MalformedSignature`.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let malformed = |why: &str| CryptoError::MalformedSignature(why.to_string());

        if der.len() < 2 || der[0] != TAG_SEQUENCE {
            return Err(malformed("missing SEQUENCE tag"));
        }
        let seq_len = der[1] as usize;
        if seq_len > MAX_DER_SEQUENCE_LEN {
            return Err(malformed("SEQUENCE too long"));
        }
        if seq_len != der.len() - 2 {
            return Err(malformed("SEQUENCE length does not match input"));
        }

        let (r, rest) = read_der_integer(&der[2..])?;
        let (s, rest) = read_der_integer(rest)?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes after signature"));
        }
        Self::new(r, s)
    }

    /// DER as lowercase hex.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_der())
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let der = hex::decode(s)
            .map_err(|e| CryptoError::MalformedSignature(format!("invalid hex: {}", e)))?;
        Self::from_der(&der)
    }

    // =========================================================================
    // COMPACT (r ‖ s)
    // =========================================================================

    /// Fixed 64 bytes, big-endian `r ‖ s`.
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        write_be_padded(&self.r, &mut out[..32]);
        write_be_padded(&self.s, &mut out[32..]);
        out
    }

    pub fn from_compact(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::MalformedSignature(format!(
                "compact signature must be 64 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            r: BigUint::from_bytes_be(&bytes[..32]),
            s: BigUint::from_bytes_be(&bytes[32..]),
        })
    }
}

fn der_integer(v: &BigUint) -> Vec<u8> {
    let mut bytes = if v.is_zero() {
        vec![0u8]
    } else {
        v.to_bytes_be()
    };
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    bytes
}

fn read_der_integer(input: &[u8]) -> Result<(BigUint, &[u8]), CryptoError> {
    if input.len() < 2 || input[0] != TAG_INTEGER {
        return Err(CryptoError::MalformedSignature(
            "missing INTEGER tag".to_string(),
        ));
    }
    let len = input[1] as usize;
    if len == 0 || len > MAX_DER_INTEGER_LEN {
        return Err(CryptoError::MalformedSignature(format!(
            "INTEGER length {} out of range",
            len
        )));
    }
    let body = input
        .get(2..2 + len)
        .ok_or_else(|| CryptoError::MalformedSignature("truncated INTEGER".to_string()))?;
    Ok((BigUint::from_bytes_be(body), &input[2 + len..]))
}

// =============================================================================
// TESTS
// =============================================================================
