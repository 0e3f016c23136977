// wallet-core\src\crypto\keys.rs
//
// Private / Public key types trên một Curve tường minh.
// Private key: scalar 0 < d < N, bọc trong Zeroizing.
// Public key:  Q = d·G, SEC1 compressed (33B) / uncompressed (65B).

use super::curve::{write_be_padded, CurveRef};
use super::point::Point;
use super::signature::Signature;
use crate::error::CryptoError;
use num_bigint::BigUint;
use num_traits::Zero;
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Uniform scalar in `[1, N-1]` by rejection sampling over `OsRng`.
pub(crate) fn random_scalar(curve: &CurveRef) -> BigUint {
    let mut buf = Zeroizing::new(vec![0u8; curve.byte_len()]);
    loop {
        OsRng.fill_bytes(&mut buf);
        let k = BigUint::from_bytes_be(&buf);
        if curve.is_valid_scalar(&k) {
            return k;
        }
    }
}

#[inline]
fn is_odd(v: &BigUint) -> bool {
    v.to_u32_digits().first().map_or(false, |d| d & 1 == 1)
}

// =============================================================================
// PRIVATE KEY
// =============================================================================

/// secp256k1 private scalar.
///
/// # Security
/// - Bytes live in `Zeroizing<[u8; 32]>` and are wiped on drop
/// - `Debug` never prints the key
#[derive(Clone)]
pub struct PrivateKey {
    bytes: Zeroizing<[u8; 32]>,
    curve: CurveRef,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("curve", &self.curve.name())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.curve.same_as(&other.curve) && *self.bytes == *other.bytes
    }
}

impl Eq for PrivateKey {}

impl PrivateKey {
    /// Fresh key from the OS CSPRNG.
    pub fn random(curve: CurveRef) -> Self {
        let d = random_scalar(&curve);
        Self::from_scalar_unchecked(curve, &d)
    }

    /// 32 big-endian bytes, `0 < d < N` else `KeyTooLarge`.
    pub fn from_bytes(curve: CurveRef, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyFormat(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let d = BigUint::from_bytes_be(bytes);
        if !curve.is_valid_scalar(&d) {
            return Err(CryptoError::KeyTooLarge);
        }
        Ok(Self::from_scalar_unchecked(curve, &d))
    }

    /// From an integer, `0 < d < N` else `KeyTooLarge`.
    pub fn from_int(curve: CurveRef, d: &BigUint) -> Result<Self, CryptoError> {
        if !curve.is_valid_scalar(d) {
            return Err(CryptoError::KeyTooLarge);
        }
        Ok(Self::from_scalar_unchecked(curve, d))
    }

    /// Hex string (64 chars).
    pub fn from_hex(curve: CurveRef, s: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(
            hex::decode(s.trim_start_matches("0x"))
                .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex: {}", e)))?,
        );
        Self::from_bytes(curve, &bytes)
    }

    /// `d` must already satisfy `0 < d < N`; `N` fits in 32 bytes on every
    /// curve [`Curve::custom`](crate::crypto::Curve::custom) accepts.
    pub(crate) fn from_scalar_unchecked(curve: CurveRef, d: &BigUint) -> Self {
        let mut bytes = Zeroizing::new([0u8; 32]);
        let mut raw = d.to_bytes_be();
        let start = bytes.len().saturating_sub(raw.len());
        let skip = raw.len().saturating_sub(bytes.len());
        debug_assert_eq!(skip, 0, "scalar wider than 32 bytes");
        bytes[start..].copy_from_slice(&raw[skip..]);
        raw.zeroize();
        Self { bytes, curve }
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    #[inline]
    pub fn curve(&self) -> &CurveRef {
        &self.curve
    }

    /// Raw key bytes.
    ///
    /// # Warning
    /// Không log hoặc hiển thị giá trị này.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(*self.bytes))
    }

    #[inline]
    pub(crate) fn scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&*self.bytes)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// `Q = d·G`
    pub fn to_public(&self) -> PublicKey {
        let point = self.curve.generator().mul(&self.scalar());
        PublicKey { point }
    }

    /// ECDSA over a 32-byte hash with a fresh random nonce per call.
    ///
    /// Output is low-S normalized. Two calls on the same hash give different
    /// signatures.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Signature {
        let curve = &self.curve;
        let n = curve.n();
        let e = BigUint::from_bytes_be(hash);
        let d = self.scalar();
        let g = curve.generator();

        loop {
            let k = random_scalar(curve);
            let r = match g.mul(&k).x() {
                Some(x) => x % n,
                None => continue,
            };
            if r.is_zero() {
                continue;
            }
            let s = (curve.scalar_inv(&k) * ((&e + &r * &d) % n)) % n;
            if s.is_zero() {
                continue;
            }
            return Signature::from_scalars(r, s).normalize_s(n);
        }
    }
}

// =============================================================================
// PUBLIC KEY
// =============================================================================

/// A non-identity curve point used as a verification key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {
    /// Wraps a point; the identity is not a valid public key.
    pub fn from_point(point: Point) -> Result<Self, CryptoError> {
        if point.is_infinity() {
            return Err(CryptoError::InvalidPoint("point at infinity".into()));
        }
        Ok(Self { point })
    }

    /// SEC1 decode: `02|03 ‖ x` (33B) or `04 ‖ x ‖ y` (65B).
    pub fn from_bytes(curve: CurveRef, bytes: &[u8]) -> Result<Self, CryptoError> {
        let len = curve.byte_len();
        match (bytes.first().copied(), bytes.len()) {
            (Some(prefix @ (0x02 | 0x03)), l) if l == len + 1 => {
                let x = BigUint::from_bytes_be(&bytes[1..]);
                if &x >= curve.p() {
                    return Err(CryptoError::InvalidPoint("x exceeds field prime".into()));
                }
                let rhs = curve.rhs(&x);
                let mut y = curve.fsqrt(&rhs).ok_or_else(|| {
                    CryptoError::InvalidPoint(format!(
                        "no square root for x={}",
                        hex::encode(&bytes[1..])
                    ))
                })?;
                let want_odd = prefix == 0x03;
                if is_odd(&y) != want_odd {
                    y = curve.fsub(&BigUint::zero(), &y);
                }
                Ok(Self {
                    point: Point::new(curve, x, y)?,
                })
            }
            (Some(0x04), l) if l == 2 * len + 1 => {
                let x = BigUint::from_bytes_be(&bytes[1..=len]);
                let y = BigUint::from_bytes_be(&bytes[len + 1..]);
                Ok(Self {
                    point: Point::new(curve, x, y)?,
                })
            }
            _ => Err(CryptoError::InvalidKeyFormat(format!(
                "unsupported public key encoding ({} bytes)",
                bytes.len()
            ))),
        }
    }

    pub fn from_hex(curve: CurveRef, s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s)
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex: {}", e)))?;
        Self::from_bytes(curve, &bytes)
    }

    #[inline]
    pub fn point(&self) -> &Point {
        &self.point
    }

    #[inline]
    pub fn curve(&self) -> &CurveRef {
        self.point.curve()
    }

    /// SEC1 encoding. Compressed is canonical for addresses and fingerprints.
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        let curve = self.point.curve();
        // from_point rejects infinity
        let (x, y) = match (self.point.x(), self.point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => return Vec::new(),
        };
        let mut out = Vec::with_capacity(2 * curve.byte_len() + 1);
        if compressed {
            out.push(if is_odd(y) { 0x03 } else { 0x02 });
            out.extend_from_slice(&curve.to_fixed_bytes(x));
        } else {
            out.push(0x04);
            out.extend_from_slice(&curve.to_fixed_bytes(x));
            out.extend_from_slice(&curve.to_fixed_bytes(y));
        }
        out
    }

    /// 33-byte compressed form `02|03 ‖ x`, with `x` left-padded to 32
    /// bytes on curves narrower than 256 bits.
    pub fn to_compressed(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        // from_point rejects infinity
        if let (Some(x), Some(y)) = (self.point.x(), self.point.y()) {
            out[0] = if is_odd(y) { 0x03 } else { 0x02 };
            write_be_padded(x, &mut out[1..]);
        }
        out
    }

    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes(true))
    }

    /// `Self + other`, used by public child derivation.
    pub fn tweak_add(&self, tweak: &BigUint) -> Result<Self, CryptoError> {
        let tweak_point = self.curve().generator().mul(tweak);
        Self::from_point(tweak_point.add(&self.point)?)
    }

    /// Verifies an ECDSA signature over a 32-byte hash.
    #[inline]
    pub fn verify(&self, hash: &[u8; 32], signature: &Signature) -> bool {
        signature.verify_hash(hash, self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
