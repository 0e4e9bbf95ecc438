//! Exact rational numbers over arbitrary-precision integers.
//!
//! Arithmetic coding narrows an interval once per input symbol; with floating point the
//! bounds lose precision after a few dozen symbols and decoding stops reproducing the input.
//! `Rational` keeps every bound exact. Values are reduced to lowest terms on construction
//! and the denominator is always positive, so structural equality is numeric equality.

use crate::cs::error::{Error, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A fraction `num / den` in lowest terms with `den > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    /// Build `num / den`, reduced.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `den` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use textcodecs::cs::compression::rational::Rational;
    ///
    /// let half = Rational::new(3, -6).unwrap();
    /// assert_eq!(half.to_string(), "-1/2");
    /// assert!(Rational::new(1, 0).is_err());
    /// ```
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Result<Self> {
        let den = den.into();
        if den.is_zero() {
            return Err(Error::invalid("rational number with a zero denominator"));
        }
        Ok(Self::reduced(num.into(), den))
    }

    /// Caller guarantees `den != 0`.
    fn reduced(mut num: BigInt, mut den: BigInt) -> Self {
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        let g = num.gcd(&den);
        if !g.is_one() {
            num /= &g;
            den /= &g;
        }
        Rational { num, den }
    }

    pub fn zero() -> Self {
        Rational {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    pub fn one() -> Self {
        Rational {
            num: BigInt::one(),
            den: BigInt::one(),
        }
    }

    pub fn from_integer(n: impl Into<BigInt>) -> Self {
        Rational {
            num: n.into(),
            den: BigInt::one(),
        }
    }

    /// Value of the decimal fraction `0.d1d2d3...` spelled by `digits`.
    ///
    /// An empty string is zero.
    ///
    /// # Errors
    ///
    /// `FormatError` if `digits` contains anything other than ASCII digits.
    pub fn from_decimal_digits(digits: &str) -> Result<Self> {
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::format(format!("{:?} is not a decimal digit", bad)));
        }
        if digits.is_empty() {
            return Ok(Self::zero());
        }
        let num = BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| Error::format(format!("cannot read {:?} as a number", digits)))?;
        let den = num_traits::pow(BigInt::from(10u8), digits.len());
        Ok(Self::reduced(num, den))
    }

    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// Largest integer not greater than `self`.
    pub fn floor(&self) -> BigInt {
        self.num.div_floor(&self.den)
    }

    /// `self / rhs`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Rational) -> Result<Rational> {
        if rhs.is_zero() {
            return Err(Error::invalid("division of a rational number by zero"));
        }
        Ok(Self::reduced(&self.num * &rhs.den, &self.den * &rhs.num))
    }
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        Rational::reduced(&self.num * &rhs.den + &rhs.num * &self.den, &self.den * &rhs.den)
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        Rational::reduced(&self.num * &rhs.den - &rhs.num * &self.den, &self.den * &rhs.den)
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        Rational::reduced(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        &self + &rhs
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        &self - &rhs
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        &self * &rhs
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross multiplication preserves order
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Rational::from_integer(n)
    }
}

impl From<u64> for Rational {
    fn from(n: u64) -> Self {
        Rational::from_integer(n)
    }
}

impl From<usize> for Rational {
    fn from(n: usize) -> Self {
        Rational::from_integer(n)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
