// wallet-core\src\crypto\curve.rs
//
// Short Weierstrass curve y² = x³ + ax + b over F_p
// Tham số secp256k1 được khởi tạo tường minh, không dùng global singleton.

use super::point::Point;
use crate::error::CryptoError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::Arc;

/// Shared handle to an immutable curve description.
pub type CurveRef = Arc<Curve>;

/// Keys, hashes and signature components are fixed 32-byte fields.
pub const MAX_CURVE_BITS: u64 = 256;

const SECP256K1_P: &str = "fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2f";
const SECP256K1_N: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
const SECP256K1_GX: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const SECP256K1_GY: &str = "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

/// Curve parameters `{P, a, b, G, N, name}`.
///
/// Every [`Point`] carries a [`CurveRef`]; arithmetic between points of two
/// different curves fails with `CurveMismatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    name: &'static str,
    p: BigUint,
    a: BigUint,
    b: BigUint,
    gx: BigUint,
    gy: BigUint,
    n: BigUint,
}

fn hex_uint(s: &str) -> BigUint {
    // constants above are valid hex literals
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

impl Curve {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// secp256k1: `p = 2^256 - 2^32 - 977`, `a = 0`, `b = 7`.
    pub fn secp256k1() -> CurveRef {
        Arc::new(Self {
            name: "secp256k1",
            p: hex_uint(SECP256K1_P),
            a: BigUint::zero(),
            b: BigUint::from(7u32),
            gx: hex_uint(SECP256K1_GX),
            gy: hex_uint(SECP256K1_GY),
            n: hex_uint(SECP256K1_N),
        })
    }

    /// Custom curve. `a` and `b` are reduced mod `p`; the generator must
    /// already be a reduced point on the curve and `n` must be at least 2.
    ///
    /// # Errors
    /// - `InvalidCurve` khi `p < 3`, `n < 2` hoặc `p`/`n` rộng hơn 256 bit
    /// - `InvalidPoint` khi generator không nằm trên curve
    pub fn custom(
        name: &'static str,
        p: BigUint,
        a: BigUint,
        b: BigUint,
        generator: (BigUint, BigUint),
        n: BigUint,
    ) -> Result<CurveRef, CryptoError> {
        if p < BigUint::from(3u32) {
            return Err(CryptoError::InvalidCurve(format!("field prime {} is too small", p)));
        }
        if n < BigUint::from(2u32) {
            return Err(CryptoError::InvalidCurve(format!("group order {} is too small", n)));
        }
        if p.bits() > MAX_CURVE_BITS || n.bits() > MAX_CURVE_BITS {
            return Err(CryptoError::InvalidCurve(format!(
                "parameters wider than {} bits",
                MAX_CURVE_BITS
            )));
        }
        let curve = Self {
            name,
            a: a % &p,
            b: b % &p,
            gx: generator.0,
            gy: generator.1,
            n,
            p,
        };
        if !curve.contains(&curve.gx, &curve.gy) {
            return Err(CryptoError::InvalidPoint(format!(
                "generator {}, {}",
                curve.gx, curve.gy
            )));
        }
        Ok(Arc::new(curve))
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    #[inline]
    pub fn a(&self) -> &BigUint {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// Group order N.
    #[inline]
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Byte length of a field element / scalar (32 for secp256k1).
    #[inline]
    pub fn byte_len(&self) -> usize {
        ((self.p.bits() + 7) / 8) as usize
    }

    /// Affine coordinates of G.
    #[inline]
    pub fn generator_coords(&self) -> (&BigUint, &BigUint) {
        (&self.gx, &self.gy)
    }

    /// Base point G as a [`Point`] bound to this curve.
    pub fn generator(self: &Arc<Self>) -> Point {
        Point::from_trusted(Arc::clone(self), self.gx.clone(), self.gy.clone())
    }

    /// Checks `y² ≡ x³ + ax + b (mod p)`.
    pub fn contains(&self, x: &BigUint, y: &BigUint) -> bool {
        if x >= &self.p || y >= &self.p {
            return false;
        }
        let lhs = self.fmul(y, y);
        lhs == self.rhs(x)
    }

    /// `x³ + ax + b mod p`
    pub(crate) fn rhs(&self, x: &BigUint) -> BigUint {
        let x3 = self.fmul(&self.fmul(x, x), x);
        (x3 + self.fmul(&self.a, x) + &self.b) % &self.p
    }

    /// Same curve, either by identity or by value.
    #[inline]
    pub fn same_as(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other) || **self == **other
    }

    // =========================================================================
    // FIELD ARITHMETIC (mod p)
    // =========================================================================

    #[inline]
    pub(crate) fn fadd(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.p
    }

    #[inline]
    pub(crate) fn fsub(&self, a: &BigUint, b: &BigUint) -> BigUint {
        // operands are always reduced
        ((a + &self.p) - b) % &self.p
    }

    #[inline]
    pub(crate) fn fmul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    /// Modular inverse through Fermat's little theorem, `a^(p-2) mod p`.
    #[inline]
    pub(crate) fn finv(&self, a: &BigUint) -> BigUint {
        let exp = &self.p - BigUint::from(2u32);
        a.modpow(&exp, &self.p)
    }

    /// Square root mod p for `p ≡ 3 (mod 4)`, `a^((p+1)/4)`.
    ///
    /// Returns `None` when `a` is not a quadratic residue or the prime has
    /// another shape.
    pub(crate) fn fsqrt(&self, a: &BigUint) -> Option<BigUint> {
        let four = BigUint::from(4u32);
        if &self.p % &four != BigUint::from(3u32) {
            return None;
        }
        let exp = (&self.p + BigUint::one()) / four;
        let root = a.modpow(&exp, &self.p);
        if self.fmul(&root, &root) == a % &self.p {
            Some(root)
        } else {
            None
        }
    }

    // =========================================================================
    // SCALAR ARITHMETIC (mod n)
    // =========================================================================

    /// `a^(n-2) mod n`. N is prime for every curve used here.
    #[inline]
    pub(crate) fn scalar_inv(&self, a: &BigUint) -> BigUint {
        let exp = &self.n - BigUint::from(2u32);
        a.modpow(&exp, &self.n)
    }

    /// `0 < k < N`
    #[inline]
    pub fn is_valid_scalar(&self, k: &BigUint) -> bool {
        !k.is_zero() && k < &self.n
    }

    /// Big-endian, left-padded to [`Curve::byte_len`].
    pub fn to_fixed_bytes(&self, value: &BigUint) -> Vec<u8> {
        let len = self.byte_len();
        let raw = value.to_bytes_be();
        let mut out = vec![0u8; len.saturating_sub(raw.len())];
        out.extend_from_slice(&raw);
        out
    }
}

/// Writes `value` big-endian into `out`, left-padded with zeros.
///
/// Callers only pass values below `N` or `p`, which [`Curve::custom`] bounds
/// to [`MAX_CURVE_BITS`].
pub(crate) fn write_be_padded(value: &BigUint, out: &mut [u8]) {
    let raw = value.to_bytes_be();
    debug_assert!(raw.len() <= out.len(), "value wider than its field");
    let start = out.len().saturating_sub(raw.len());
    let skip = raw.len().saturating_sub(out.len());
    out[start..].copy_from_slice(&raw[skip..]);
}

// =============================================================================
// TESTS
// =============================================================================
