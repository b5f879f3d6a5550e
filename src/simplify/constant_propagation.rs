//! Constant folding of operators whose operands are all literals
//!
//! Bitvector values have arbitrary precision. Results of `bvadd`, `bvsub` and `bvmul`
//! are reduced modulo 2^width, so that the result has the width of the operands.
//! Comparisons produce a single bit, 1 for true.
//! Division and remainder have no folding and fail with
//! [`ConstantError::Unimplemented`].

use num_bigint::BigUint;
use num_traits::One;

use crate::error::ConstantError;
use crate::term::{BitVec, Kind, Literal, Term};

fn extraction_error(kind: Kind, l: &Literal) -> ConstantError {
    ConstantError::ValueExtraction {
        kind,
        term: l.to_string(),
    }
}

/// Read a bitvector operand
fn bv_value(kind: Kind, l: &Literal) -> Result<&BitVec, ConstantError> {
    l.as_bv().ok_or_else(|| extraction_error(kind, l))
}

/// Read two bitvector operands of the same width
fn bv_pair<'a>(
    kind: Kind,
    a: &'a Literal,
    b: &'a Literal,
) -> Result<(&'a BitVec, &'a BitVec), ConstantError> {
    let x = bv_value(kind, a)?;
    let y = bv_value(kind, b)?;
    if x.width() != y.width() {
        return Err(ConstantError::SortMismatch {
            kind,
            left: a.sort(),
            right: b.sort(),
        });
    }
    Ok((x, y))
}

fn bit(b: bool) -> Literal {
    Literal::BitVec(BitVec::from_u64(1, b as u64))
}

/// Shared implementation of the bitwise operators, on Booleans or bitvectors
fn bitwise<F, G>(
    kinds: (Kind, Kind),
    a: &Literal,
    b: &Literal,
    on_bool: F,
    on_bv: G,
) -> Result<Literal, ConstantError>
where
    F: Fn(bool, bool) -> bool,
    G: Fn(&BigUint, &BigUint) -> BigUint,
{
    let (bool_kind, bv_kind) = kinds;
    match (a, b) {
        (Literal::Bool(x), Literal::Bool(y)) => Ok(Literal::Bool(on_bool(*x, *y))),
        (Literal::Bool(_), _) => Err(extraction_error(bool_kind, b)),
        _ => {
            let (x, y) = bv_pair(bv_kind, a, b)?;
            Ok(Literal::BitVec(BitVec::new(
                x.width(),
                on_bv(x.bits(), y.bits()),
            )))
        }
    }
}

/// And of two Booleans or two bitvectors
pub fn and(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    bitwise((Kind::And, Kind::BvAnd), a, b, |x, y| x && y, |x, y| x & y)
}

/// Or of two Booleans or two bitvectors
pub fn or(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    bitwise((Kind::Or, Kind::BvOr), a, b, |x, y| x || y, |x, y| x | y)
}

/// Xor of two Booleans or two bitvectors
pub fn xor(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    bitwise((Kind::Xor, Kind::BvXor), a, b, |x, y| x ^ y, |x, y| x ^ y)
}

/// Negation of a Boolean or a bitvector
pub fn not(a: &Literal) -> Result<Literal, ConstantError> {
    match a {
        Literal::Bool(x) => Ok(Literal::Bool(!x)),
        Literal::BitVec(x) => {
            let ones = BitVec::ones(x.width());
            Ok(Literal::BitVec(BitVec::new(
                x.width(),
                ones.bits() ^ x.bits(),
            )))
        }
    }
}

/// Addition modulo 2^width
pub fn add(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvAdd, a, b)?;
    Ok(Literal::BitVec(BitVec::new(x.width(), x.bits() + y.bits())))
}

/// Subtraction modulo 2^width
pub fn sub(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvSub, a, b)?;
    let modulus = BigUint::one() << x.width();
    Ok(Literal::BitVec(BitVec::new(
        x.width(),
        x.bits() + modulus - y.bits(),
    )))
}

/// Multiplication modulo 2^width
pub fn mul(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvMul, a, b)?;
    Ok(Literal::BitVec(BitVec::new(x.width(), x.bits() * y.bits())))
}

/// Signed less or equal
pub fn sle(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvSle, a, b)?;
    Ok(bit(x.to_signed() <= y.to_signed()))
}

/// Signed less than
pub fn slt(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvSlt, a, b)?;
    Ok(bit(x.to_signed() < y.to_signed()))
}

/// Unsigned less or equal
pub fn ule(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvUle, a, b)?;
    Ok(bit(x.bits() <= y.bits()))
}

/// Unsigned less than
pub fn ult(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let (x, y) = bv_pair(Kind::BvUlt, a, b)?;
    Ok(bit(x.bits() < y.bits()))
}

/// Equality of two literals of the same sort
pub fn equal(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    match (a, b) {
        (Literal::Bool(x), Literal::Bool(y)) => Ok(Literal::Bool(x == y)),
        (Literal::BitVec(x), Literal::BitVec(y)) if x.width() == y.width() => {
            Ok(Literal::Bool(x.bits() == y.bits()))
        }
        _ => Err(ConstantError::SortMismatch {
            kind: Kind::Equal,
            left: a.sort(),
            right: b.sort(),
        }),
    }
}

/// Truth value of an if-then-else condition
pub fn condition(c: &Literal) -> Result<bool, ConstantError> {
    c.as_condition().ok_or_else(|| extraction_error(Kind::Ite, c))
}

/// If-then-else
pub fn ite(c: &Literal, a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    if condition(c)? {
        Ok(a.clone())
    } else {
        Ok(b.clone())
    }
}

/// Concatenation, `a` in the most significant bits
pub fn concat(a: &Literal, b: &Literal) -> Result<Literal, ConstantError> {
    let x = bv_value(Kind::BvConcat, a)?;
    let y = bv_value(Kind::BvConcat, b)?;
    let bits = (x.bits() << y.width()) | y.bits();
    Ok(Literal::BitVec(BitVec::new(x.width() + y.width(), bits)))
}

/// Bits `hi` down to `lo`
pub fn extract(a: &Literal, hi: u32, lo: u32) -> Result<Literal, ConstantError> {
    let x = bv_value(Kind::BvExtract, a)?;
    if lo > hi || hi >= x.width() {
        return Err(extraction_error(Kind::BvExtract, a));
    }
    Ok(Literal::BitVec(BitVec::new(hi - lo + 1, x.bits() >> lo)))
}

/// Extension with `n` zeros
pub fn zero_extend(a: &Literal, n: u32) -> Result<Literal, ConstantError> {
    let x = bv_value(Kind::BvZeroExtend, a)?;
    Ok(Literal::BitVec(BitVec::new(x.width() + n, x.bits().clone())))
}

/// Extension with `n` copies of the sign bit
pub fn sign_extend(a: &Literal, n: u32) -> Result<Literal, ConstantError> {
    let x = bv_value(Kind::BvSignExtend, a)?;
    Ok(Literal::BitVec(BitVec::from_signed(
        x.width() + n,
        &x.to_signed(),
    )))
}

/// Fold a node whose operands are all literals
///
/// If-then-else returns the selected operand itself.
pub fn propagate(node: &Term, operands: &[Term]) -> Result<Term, ConstantError> {
    use Kind::*;
    let kind = node.kind();
    let mut lits = Vec::with_capacity(operands.len());
    for o in operands {
        match o.literal() {
            Some(l) => lits.push(l),
            None => {
                return Err(ConstantError::ValueExtraction {
                    kind,
                    term: o.to_string(),
                })
            }
        }
    }
    if lits.len() != kind.arity() || node.indices().len() != kind.nb_indices() {
        return Err(ConstantError::Unimplemented(kind));
    }
    let ret = match kind {
        And | BvAnd => and(lits[0], lits[1])?,
        Or | BvOr => or(lits[0], lits[1])?,
        Xor | BvXor => xor(lits[0], lits[1])?,
        Not | BvNot => not(lits[0])?,
        BvAdd => add(lits[0], lits[1])?,
        BvSub => sub(lits[0], lits[1])?,
        BvMul => mul(lits[0], lits[1])?,
        BvSle => sle(lits[0], lits[1])?,
        BvSlt => slt(lits[0], lits[1])?,
        BvUle => ule(lits[0], lits[1])?,
        BvUlt => ult(lits[0], lits[1])?,
        Equal => equal(lits[0], lits[1])?,
        Ite => {
            let selected = if condition(lits[0])? {
                &operands[1]
            } else {
                &operands[2]
            };
            return Ok(selected.clone());
        }
        BvConcat => concat(lits[0], lits[1])?,
        BvExtract => extract(lits[0], node.indices()[0], node.indices()[1])?,
        BvZeroExtend => zero_extend(lits[0], node.indices()[0])?,
        BvSignExtend => sign_extend(lits[0], node.indices()[0])?,
        Constant | Variable | Value | BvSdiv | BvUdiv | BvSrem | BvUrem | BvNeg | BvShl
        | BvLshr | BvAshr => return Err(ConstantError::Unimplemented(kind)),
    };
    Ok(Term::value(ret))
}
