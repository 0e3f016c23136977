// wallet-core\src\crypto\point.rs
//
// Point group law: affine add/double theo công thức chuẩn,
// scalar multiply dùng Jacobian coordinates (chỉ 1 phép nghịch đảo cuối).

use super::curve::CurveRef;
use crate::error::CryptoError;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, PartialEq, Eq)]
enum Coords {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

/// A point on a [`Curve`](super::curve::Curve), including the identity.
///
/// Coordinates are always reduced mod p and always satisfy the curve
/// equation; the only way to build an affine point from outside is
/// [`Point::new`], which checks membership.
#[derive(Clone)]
pub struct Point {
    curve: CurveRef,
    coords: Coords,
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coords {
            Coords::Infinity => write!(f, "Point({}, infinity)", self.curve.name()),
            Coords::Affine { x, y } => write!(
                f,
                "Point({}, x={}, y={})",
                self.curve.name(),
                hex::encode(x.to_bytes_be()),
                hex::encode(y.to_bytes_be())
            ),
        }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.curve.same_as(&other.curve) && self.coords == other.coords
    }
}

impl Eq for Point {}

impl Point {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Affine point `(x, y)`; fails with `InvalidPoint` if off the curve.
    pub fn new(curve: CurveRef, x: BigUint, y: BigUint) -> Result<Self, CryptoError> {
        if !curve.contains(&x, &y) {
            return Err(CryptoError::InvalidPoint(format!(
                "x={}, y={}",
                hex::encode(x.to_bytes_be()),
                hex::encode(y.to_bytes_be())
            )));
        }
        Ok(Self::from_trusted(curve, x, y))
    }

    /// Point at infinity (group identity).
    pub fn infinity(curve: CurveRef) -> Self {
        Self {
            curve,
            coords: Coords::Infinity,
        }
    }

    /// Caller guarantees `(x, y)` lies on `curve`.
    pub(crate) fn from_trusted(curve: CurveRef, x: BigUint, y: BigUint) -> Self {
        Self {
            curve,
            coords: Coords::Affine { x, y },
        }
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    #[inline]
    pub fn curve(&self) -> &CurveRef {
        &self.curve
    }

    #[inline]
    pub fn is_infinity(&self) -> bool {
        matches!(self.coords, Coords::Infinity)
    }

    #[inline]
    pub fn x(&self) -> Option<&BigUint> {
        match &self.coords {
            Coords::Affine { x, .. } => Some(x),
            Coords::Infinity => None,
        }
    }

    #[inline]
    pub fn y(&self) -> Option<&BigUint> {
        match &self.coords {
            Coords::Affine { y, .. } => Some(y),
            Coords::Infinity => None,
        }
    }

    // =========================================================================
    // GROUP LAW
    // =========================================================================

    /// `-P = (x, -y)`
    pub fn negate(&self) -> Self {
        match &self.coords {
            Coords::Infinity => self.clone(),
            Coords::Affine { x, y } => Self::from_trusted(
                Arc::clone(&self.curve),
                x.clone(),
                self.curve.fsub(&BigUint::zero(), y),
            ),
        }
    }

    /// `P + Q`. Uses the doubling slope `3x² + a / 2y` when `P == Q`,
    /// otherwise the chord slope `(y2 - y1) / (x2 - x1)`.
    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        if !self.curve.same_as(&other.curve) {
            return Err(CryptoError::CurveMismatch);
        }
        let curve = &self.curve;

        let (x1, y1, x2, y2) = match (&self.coords, &other.coords) {
            (Coords::Infinity, _) => return Ok(other.clone()),
            (_, Coords::Infinity) => return Ok(self.clone()),
            (Coords::Affine { x: x1, y: y1 }, Coords::Affine { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };

        let lambda = if x1 == x2 {
            // P + (-P), including the 2-torsion case y = 0
            if y1 != y2 || y1.is_zero() {
                return Ok(Self::infinity(Arc::clone(curve)));
            }
            let three_x2 = curve.fmul(&BigUint::from(3u32), &curve.fmul(x1, x1));
            let num = curve.fadd(&three_x2, curve.a());
            let den = curve.fmul(&BigUint::from(2u32), y1);
            curve.fmul(&num, &curve.finv(&den))
        } else {
            let num = curve.fsub(y2, y1);
            let den = curve.fsub(x2, x1);
            curve.fmul(&num, &curve.finv(&den))
        };

        let rx = curve.fsub(&curve.fsub(&curve.fmul(&lambda, &lambda), x1), x2);
        let ry = curve.fsub(&curve.fmul(&lambda, &curve.fsub(x1, &rx)), y1);
        Ok(Self::from_trusted(Arc::clone(curve), rx, ry))
    }

    /// `2P`
    #[inline]
    pub fn double(&self) -> Self {
        // same curve by construction
        self.add(self)
            .unwrap_or_else(|_| Self::infinity(Arc::clone(&self.curve)))
    }

    /// `k·P` with `k` reduced mod N, double-and-add from the most
    /// significant bit.
    pub fn mul(&self, k: &BigUint) -> Self {
        let curve = &self.curve;
        let k = k % curve.n();
        let (x, y) = match &self.coords {
            Coords::Affine { x, y } if !k.is_zero() => (x, y),
            _ => return Self::infinity(Arc::clone(curve)),
        };

        let base = Jacobian {
            x: x.clone(),
            y: y.clone(),
            z: BigUint::one(),
        };
        let mut acc = Jacobian::infinity();
        for byte in k.to_bytes_be() {
            for bit in (0..8).rev() {
                acc = acc.double(curve);
                if (byte >> bit) & 1 == 1 {
                    acc = acc.add(&base, curve);
                }
            }
        }
        acc.to_affine(curve)
    }

    /// `a·P + b·Q`
    pub fn mul_add(&self, a: &BigUint, other: &Self, b: &BigUint) -> Result<Self, CryptoError> {
        self.mul(a).add(&other.mul(b))
    }
}

// =============================================================================
// JACOBIAN COORDINATES  (X / Z², Y / Z³)
// =============================================================================

struct Jacobian {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl Jacobian {
    fn infinity() -> Self {
        Self {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    #[inline]
    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn double(&self, c: &super::curve::Curve) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return Self::infinity();
        }
        let y2 = c.fmul(&self.y, &self.y);
        // S = 4·X·Y²
        let s = c.fmul(&BigUint::from(4u32), &c.fmul(&self.x, &y2));
        // M = 3·X² + a·Z⁴
        let z2 = c.fmul(&self.z, &self.z);
        let m = c.fadd(
            &c.fmul(&BigUint::from(3u32), &c.fmul(&self.x, &self.x)),
            &c.fmul(c.a(), &c.fmul(&z2, &z2)),
        );
        let x3 = c.fsub(&c.fmul(&m, &m), &c.fmul(&BigUint::from(2u32), &s));
        let y4_8 = c.fmul(&BigUint::from(8u32), &c.fmul(&y2, &y2));
        let y3 = c.fsub(&c.fmul(&m, &c.fsub(&s, &x3)), &y4_8);
        let z3 = c.fmul(&BigUint::from(2u32), &c.fmul(&self.y, &self.z));
        Self { x: x3, y: y3, z: z3 }
    }

    fn add(&self, other: &Self, c: &super::curve::Curve) -> Self {
        if self.is_infinity() {
            return Self {
                x: other.x.clone(),
                y: other.y.clone(),
                z: other.z.clone(),
            };
        }
        if other.is_infinity() {
            return Self {
                x: self.x.clone(),
                y: self.y.clone(),
                z: self.z.clone(),
            };
        }
        let z1z1 = c.fmul(&self.z, &self.z);
        let z2z2 = c.fmul(&other.z, &other.z);
        let u1 = c.fmul(&self.x, &z2z2);
        let u2 = c.fmul(&other.x, &z1z1);
        let s1 = c.fmul(&self.y, &c.fmul(&other.z, &z2z2));
        let s2 = c.fmul(&other.y, &c.fmul(&self.z, &z1z1));

        if u1 == u2 {
            return if s1 == s2 {
                self.double(c)
            } else {
                Self::infinity()
            };
        }

        let h = c.fsub(&u2, &u1);
        let r = c.fsub(&s2, &s1);
        let h2 = c.fmul(&h, &h);
        let h3 = c.fmul(&h2, &h);
        let u1h2 = c.fmul(&u1, &h2);

        let x3 = c.fsub(
            &c.fsub(&c.fmul(&r, &r), &h3),
            &c.fmul(&BigUint::from(2u32), &u1h2),
        );
        let y3 = c.fsub(&c.fmul(&r, &c.fsub(&u1h2, &x3)), &c.fmul(&s1, &h3));
        let z3 = c.fmul(&h, &c.fmul(&self.z, &other.z));
        Self { x: x3, y: y3, z: z3 }
    }

    fn to_affine(&self, curve: &CurveRef) -> Point {
        if self.is_infinity() {
            return Point::infinity(Arc::clone(curve));
        }
        let zinv = curve.finv(&self.z);
        let zinv2 = curve.fmul(&zinv, &zinv);
        let x = curve.fmul(&self.x, &zinv2);
        let y = curve.fmul(&self.y, &curve.fmul(&zinv2, &zinv));
        Point::from_trusted(Arc::clone(curve), x, y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::Curve;

    fn scalar(hex_str: &str) -> BigUint {
        BigUint::parse_bytes(hex_str.as_bytes(), 16).unwrap()
    }

    #[test]
    fn test_off_curve_point_rejected() {
        let curve = Curve::secp256k1();
        let result = Point::new(curve, BigUint::from(1u32), BigUint::from(1u32));
        assert!(matches!(result, Err(CryptoError::InvalidPoint(_))));
    }

    #[test]
    fn test_two_g() {
        let curve = Curve::secp256k1();
        let g = curve.generator();
        let two_g = g.double();
        assert_eq!(
            two_g.x().unwrap(),
            &scalar("c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5")
        );
        assert_eq!(two_g, g.mul(&BigUint::from(2u32)));
        assert_eq!(two_g, g.add(&g).unwrap());
    }

    #[test]
    fn test_three_g_chord_matches_mul() {
        let curve = Curve::secp256k1();
        let g = curve.generator();
        let three_g = g.double().add(&g).unwrap();
        assert_eq!(
            three_g.x().unwrap(),
            &scalar("f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9")
        );
        assert_eq!(three_g, g.mul(&BigUint::from(3u32)));
    }

    #[test]
    fn test_group_law_distributes() {
        let curve = Curve::secp256k1();
        let g = curve.generator();
        let a = scalar("d1b2c3a4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90");
        let b = scalar("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");
        let sum = (&a + &b) % curve.n();
        let lhs = g.mul(&a).add(&g.mul(&b)).unwrap();
        assert_eq!(lhs, g.mul(&sum));
        let x = lhs.x().unwrap();
        let y = lhs.y().unwrap();
        assert!(curve.contains(x, y));
    }

    #[test]
    fn test_infinity_handling() {
        let curve = Curve::secp256k1();
        let g = curve.generator();
        assert!(g.mul(curve.n()).is_infinity());
        assert!(g.mul(&BigUint::zero()).is_infinity());
        assert!(g.add(&g.negate()).unwrap().is_infinity());

        let inf = Point::infinity(Arc::clone(&curve));
        assert_eq!(inf.add(&g).unwrap(), g);
        assert_eq!(g.add(&inf).unwrap(), g);
        assert!(inf.mul(&BigUint::from(5u32)).is_infinity());
    }

    #[test]
    fn test_n_minus_one_is_negation() {
        let curve = Curve::secp256k1();
        let g = curve.generator();
        let n_minus_one = curve.n() - BigUint::one();
        assert_eq!(g.mul(&n_minus_one), g.negate());
    }

    #[test]
    fn test_curve_mismatch() {
        let secp = Curve::secp256k1();
        // y² = x³ + 7 over F_23 (toy curve, p ≡ 3 mod 4), (1, 10) is on it: 100 ≡ 8 mod 23
        let toy = Curve::custom(
            "toy",
            BigUint::from(23u32),
            BigUint::zero(),
            BigUint::from(7u32),
            (BigUint::from(1u32), BigUint::from(10u32)),
            BigUint::from(24u32),
        )
        .unwrap();
        let p = Point::new(Arc::clone(&toy), BigUint::from(1u32), BigUint::from(10u32)).unwrap();
        assert_eq!(
            secp.generator().add(&p).unwrap_err(),
            CryptoError::CurveMismatch
        );
    }
}
