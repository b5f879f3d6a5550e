use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_traits::{Num, One, ToPrimitive, Zero};

use crate::error::LiteralError;
use crate::term::Sort;

/// Bitvector value of a fixed width
///
/// Arbitrary widths are supported. The value is always kept reduced modulo 2^width.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct BitVec {
    width: u32,
    bits: BigUint,
}

/// Mask with the `width` lower bits set
fn mask(width: u32) -> BigUint {
    (BigUint::one() << width) - BigUint::one()
}

impl BitVec {
    /// Create a bitvector, truncating the value to the width
    pub fn new(width: u32, bits: BigUint) -> BitVec {
        assert!(width > 0, "Bitvectors have at least one bit");
        let bits = if bits.bits() > width as u64 {
            bits & mask(width)
        } else {
            bits
        };
        BitVec { width, bits }
    }

    /// Create a bitvector from a machine integer, truncating it to the width
    pub fn from_u64(width: u32, v: u64) -> BitVec {
        BitVec::new(width, BigUint::from(v))
    }

    /// Create a bitvector from a signed integer in two's complement
    pub fn from_signed(width: u32, v: &BigInt) -> BitVec {
        let modulus = BigInt::one() << width;
        let mut r = v % &modulus;
        if r < BigInt::zero() {
            r += modulus;
        }
        // r is non-negative here
        BitVec::new(width, r.magnitude().clone())
    }

    /// All zeros
    pub fn zero(width: u32) -> BitVec {
        BitVec::new(width, BigUint::zero())
    }

    /// All ones
    pub fn ones(width: u32) -> BitVec {
        BitVec::new(width, mask(width))
    }

    /// The value one
    pub fn one(width: u32) -> BitVec {
        BitVec::new(width, BigUint::one())
    }

    /// Parse a string of binary digits, most significant bit first; the width is the number of digits
    pub fn from_binary(text: &str) -> Result<BitVec, LiteralError> {
        if text.is_empty() {
            return Err(LiteralError::Empty);
        }
        if let Some(digit) = text.chars().find(|c| *c != '0' && *c != '1') {
            return Err(LiteralError::InvalidDigit {
                text: text.to_string(),
                digit,
            });
        }
        let width = u32::try_from(text.len()).map_err(|_| LiteralError::TooWide(text.len()))?;
        let bits = BigUint::from_str_radix(text, 2).map_err(|_| LiteralError::InvalidDigit {
            text: text.to_string(),
            digit: '?',
        })?;
        Ok(BitVec::new(width, bits))
    }

    /// Number of bits
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Unsigned value
    pub fn bits(&self) -> &BigUint {
        &self.bits
    }

    /// Value in two's complement
    pub fn to_signed(&self) -> BigInt {
        let v = BigInt::from(self.bits.clone());
        if self.msb() {
            v - (BigInt::one() << self.width)
        } else {
            v
        }
    }

    /// Unsigned value if it fits a machine integer
    pub fn to_u64(&self) -> Option<u64> {
        self.bits.to_u64()
    }

    /// Value of the bit at position i, 0 being the least significant
    pub fn bit(&self, i: u32) -> bool {
        assert!(i < self.width);
        self.bits.bit(i as u64)
    }

    /// Value of the most significant bit
    pub fn msb(&self) -> bool {
        self.bit(self.width - 1)
    }

    /// Returns whether all bits are zero
    pub fn is_zero(&self) -> bool {
        self.bits.is_zero()
    }

    /// Returns whether all bits are one
    pub fn is_ones(&self) -> bool {
        self.bits == mask(self.width)
    }

    /// Returns whether the value is one
    pub fn is_one(&self) -> bool {
        self.bits.is_one()
    }

    /// Binary representation with exactly `width` digits, most significant bit first
    pub fn to_binary_string(&self) -> String {
        format!(
            "{:0>width$}",
            self.bits.to_str_radix(2),
            width = self.width as usize
        )
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#b{}", self.to_binary_string())
    }
}

/// Literal value of a term
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Literal {
    /// Boolean value
    Bool(bool),
    /// Bitvector value
    BitVec(BitVec),
}

impl Literal {
    /// Sort of the literal
    pub fn sort(&self) -> Sort {
        match self {
            Literal::Bool(_) => Sort::Bool,
            Literal::BitVec(bv) => Sort::BitVec(bv.width()),
        }
    }

    /// Zero or false literal of a sort
    pub fn zero(sort: Sort) -> Literal {
        match sort {
            Sort::Bool => Literal::Bool(false),
            Sort::BitVec(w) => Literal::BitVec(BitVec::zero(w)),
        }
    }

    /// All-ones or true literal of a sort
    pub fn ones(sort: Sort) -> Literal {
        match sort {
            Sort::Bool => Literal::Bool(true),
            Sort::BitVec(w) => Literal::BitVec(BitVec::ones(w)),
        }
    }

    /// Parse a bitvector literal from binary digits
    pub fn from_binary(text: &str) -> Result<Literal, LiteralError> {
        Ok(Literal::BitVec(BitVec::from_binary(text)?))
    }

    /// Returns whether the literal is false or all zeros
    pub fn is_zero(&self) -> bool {
        match self {
            Literal::Bool(b) => !b,
            Literal::BitVec(bv) => bv.is_zero(),
        }
    }

    /// Returns whether the literal is true or all ones
    pub fn is_ones(&self) -> bool {
        match self {
            Literal::Bool(b) => *b,
            Literal::BitVec(bv) => bv.is_ones(),
        }
    }

    /// Bitvector value, if any
    pub fn as_bv(&self) -> Option<&BitVec> {
        match self {
            Literal::Bool(_) => None,
            Literal::BitVec(bv) => Some(bv),
        }
    }

    /// Truth value of a condition: a Boolean or a single bit
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            Literal::BitVec(bv) if bv.width() == 1 => Some(bv.is_one()),
            Literal::BitVec(_) => None,
        }
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Literal {
        Literal::Bool(b)
    }
}

impl From<BitVec> for Literal {
    fn from(bv: BitVec) -> Literal {
        Literal::BitVec(bv)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::BitVec(bv) => write!(f, "{bv}"),
        }
    }
}
