use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::mem;
use num_bigint::{BigInt, Sign, ToBigInt};
use num_traits::{One, Signed, Zero};

pub enum MathError {
    NonPositiveModulus,
}

impl MathError {
    fn display(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::NonPositiveModulus => write!(f, "Modulus must be positive"),
        }
    }
}

impl Display for MathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Debug for MathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl Error for MathError {}

/// Bezout coefficients for the inputs of [`extended_euclid`]:
/// `a * x + b * y == gcd`.
#[derive(Debug, Clone, PartialEq)]
pub struct EuclidResult {
    pub gcd: BigInt,
    pub x: BigInt,
    pub y: BigInt,
}

/// Iterative extended Euclidean algorithm. With `b == 0` the loop never
/// runs and the result is `(a, 1, 0)`.
pub fn extended_euclid(a: &BigInt, b: &BigInt) -> EuclidResult {
    let (mut a, mut b) = (a.clone(), b.clone());
    let (mut x0, mut y0): (BigInt, BigInt) = (One::one(), Zero::zero());
    let (mut x1, mut y1): (BigInt, BigInt) = (Zero::zero(), One::one());
    while !b.is_zero() {
        let quotient = &a / &b;
        let remainder = &a % &b;
        a = mem::replace(&mut b, remainder);
        let x2 = &x0 - &quotient * &x1;
        let y2 = &y0 - &quotient * &y1;
        x0 = mem::replace(&mut x1, x2);
        y0 = mem::replace(&mut y1, y2);
    }
    EuclidResult { gcd: a, x: x0, y: y0 }
}

pub fn euler(p: &BigInt, q: &BigInt) -> BigInt {
    (p - 1.to_bigint().unwrap()) * (q - 1.to_bigint().unwrap())
}

/// Modular inverse of `a` mod `m`, derived from the Bezout coefficient of
/// `extended_euclid(m, a)` and normalized into `[0, m)`. Returns zero when
/// `gcd(a, m) != 1` and no inverse exists.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> BigInt {
    let r = extended_euclid(m, a);
    if r.gcd.is_one() {
        (r.y % m + m) % m
    } else {
        Zero::zero()
    }
}

/// Square-and-multiply `base ^ exponent mod modulus`, scanning exponent
/// bits from least significant up. The exponent is always non-negative in
/// this crate; its absolute value is taken anyway.
pub fn pow_mod(base: &BigInt, exponent: &BigInt, modulus: &BigInt) -> Result<BigInt, MathError> {
    if modulus.sign() != Sign::Plus {
        return Err(MathError::NonPositiveModulus);
    }
    let mut q = exponent.abs();
    let mut a = ((base % modulus) + modulus) % modulus;
    let mut r: BigInt = One::one();
    while !q.is_zero() {
        if q.bit(0) {
            r = (r * &a) % modulus;
        }
        q >>= 1;
        a = (&a * &a) % modulus;
    }
    Ok(r)
}

#[cfg(test)]
mod tests {
    use num::Integer;
    use num_bigint::ToBigInt;
    use num_traits::{One, Zero};
    use super::*;

    #[test]
    fn euclid_bezout_identity() {
        let pairs: [(i64, i64); 6] = [(240, 46), (46, 240), (17, 0), (0, 17), (65537, 3120), (1071, 462)];
        for (a, b) in pairs {
            let (a, b) = (a.to_bigint().unwrap(), b.to_bigint().unwrap());
            let r = extended_euclid(&a, &b);
            assert_eq!(&a * &r.x + &b * &r.y, r.gcd);
            assert_eq!(r.gcd, a.gcd(&b));
        }
    }

    #[test]
    fn euclid_zero_second_argument() {
        let r = extended_euclid(&17.to_bigint().unwrap(), &BigInt::zero());
        assert_eq!(r.gcd, 17.to_bigint().unwrap());
        assert!(r.x.is_one());
        assert!(r.y.is_zero());
    }

    #[test]
    fn pow_mod_known_vectors() {
        let v = |b: i64, e: i64, m: i64| {
            pow_mod(&b.to_bigint().unwrap(), &e.to_bigint().unwrap(), &m.to_bigint().unwrap()).unwrap()
        };
        assert_eq!(v(2, 10, 1000), 24.to_bigint().unwrap());
        assert_eq!(v(5, 0, 7), BigInt::one());
        assert_eq!(v(0, 5, 7), BigInt::zero());
    }

    #[test]
    fn pow_mod_rejects_zero_modulus() {
        let r = pow_mod(&2.to_bigint().unwrap(), &3.to_bigint().unwrap(), &BigInt::zero());
        assert!(r.is_err());
    }

    #[test]
    fn mod_inverse_round_trip() {
        let (a, m) = (7.to_bigint().unwrap(), 160.to_bigint().unwrap());
        let inv = mod_inverse(&a, &m);
        assert!(((&a * &inv) % &m).is_one());
        // 4 has no inverse mod 160
        assert!(mod_inverse(&4.to_bigint().unwrap(), &m).is_zero());
    }

    #[test]
    fn euler_small() {
        assert_eq!(
            euler(&17.to_bigint().unwrap(), &11.to_bigint().unwrap()),
            160.to_bigint().unwrap()
        );
    }
}
