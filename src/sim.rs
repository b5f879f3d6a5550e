//! Reference evaluation of terms under an assignment of their symbols
//!
//! The semantics follow SMT-LIB: division by zero gives all ones, remainder by zero
//! gives the dividend, and shifts by the width or more give zero or copies of the
//! sign bit. The simulator is independent from constant propagation, and is used to
//! check the simplification engine.

use fxhash::FxHashMap;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::SimulationError;
use crate::term::{BitVec, Kind, Literal, Term, TermMap};

/// Values of the symbols, by name
pub type Assignment = FxHashMap<String, Literal>;

/// Structure for simulation of a term over multiple assignments
pub struct Simulator {
    order: Vec<Term>,
    values: TermMap<Literal>,
}

fn bv_of(l: &Literal) -> &BitVec {
    match l {
        Literal::BitVec(bv) => bv,
        Literal::Bool(_) => panic!("Bitvector operand expected"),
    }
}

fn bool_of(l: &Literal) -> bool {
    match l.as_condition() {
        Some(b) => b,
        None => panic!("Boolean operand expected"),
    }
}

fn make(width: u32, bits: BigUint) -> Literal {
    Literal::BitVec(BitVec::new(width, bits))
}

fn bit(b: bool) -> Literal {
    Literal::BitVec(BitVec::from_u64(1, b as u64))
}

fn neg(a: &BitVec) -> BitVec {
    let modulus = BigUint::one() << a.width();
    BitVec::new(a.width(), modulus - a.bits())
}

fn udiv(a: &BitVec, b: &BitVec) -> BitVec {
    if b.is_zero() {
        BitVec::ones(a.width())
    } else {
        BitVec::new(a.width(), a.bits() / b.bits())
    }
}

fn urem(a: &BitVec, b: &BitVec) -> BitVec {
    if b.is_zero() {
        a.clone()
    } else {
        BitVec::new(a.width(), a.bits() % b.bits())
    }
}

fn sdiv(a: &BitVec, b: &BitVec) -> BitVec {
    match (a.msb(), b.msb()) {
        (false, false) => udiv(a, b),
        (true, false) => neg(&udiv(&neg(a), b)),
        (false, true) => neg(&udiv(a, &neg(b))),
        (true, true) => udiv(&neg(a), &neg(b)),
    }
}

fn srem(a: &BitVec, b: &BitVec) -> BitVec {
    match (a.msb(), b.msb()) {
        (false, false) => urem(a, b),
        (true, false) => neg(&urem(&neg(a), b)),
        (false, true) => urem(a, &neg(b)),
        (true, true) => neg(&urem(&neg(a), &neg(b))),
    }
}

/// Shift amount, None if it is at least the width
fn shift_amount(b: &BitVec) -> Option<u32> {
    b.to_u64()
        .and_then(|s| s.to_u32())
        .filter(|s| *s < b.width())
}

fn shl(a: &BitVec, b: &BitVec) -> BitVec {
    match shift_amount(b) {
        Some(s) => BitVec::new(a.width(), a.bits() << s),
        None => BitVec::zero(a.width()),
    }
}

fn lshr(a: &BitVec, b: &BitVec) -> BitVec {
    match shift_amount(b) {
        Some(s) => BitVec::new(a.width(), a.bits() >> s),
        None => BitVec::zero(a.width()),
    }
}

fn ashr(a: &BitVec, b: &BitVec) -> BitVec {
    if !a.msb() {
        return lshr(a, b);
    }
    // Shift the complement, so that the inserted zeros become ones
    let ones = BitVec::ones(a.width());
    let complement = BitVec::new(a.width(), ones.bits() ^ a.bits());
    let shifted = lshr(&complement, b);
    BitVec::new(a.width(), ones.bits() ^ shifted.bits())
}

impl Simulator {
    /// Prepare the simulation of a term
    pub fn from_term(t: &Term) -> Simulator {
        Simulator {
            order: t.post_order(),
            values: TermMap::default(),
        }
    }

    /// Value of the term for an assignment of its symbols
    pub fn run(&mut self, assignment: &Assignment) -> Result<Literal, SimulationError> {
        self.values.clear();
        for i in 0..self.order.len() {
            let value = self.compute(&self.order[i], assignment)?;
            self.values.insert(self.order[i].id(), value);
        }
        match self.order.last() {
            Some(root) => Ok(self.values[&root.id()].clone()),
            None => unreachable!(),
        }
    }

    fn symbol(t: &Term, assignment: &Assignment) -> Result<Literal, SimulationError> {
        let name = t.name().unwrap_or_default();
        let value = assignment
            .get(name)
            .ok_or_else(|| SimulationError::Unassigned(name.to_string()))?;
        if value.sort() != t.sort() {
            return Err(SimulationError::WrongSort {
                name: name.to_string(),
                expected: t.sort(),
                actual: value.sort(),
            });
        }
        Ok(value.clone())
    }

    fn compute(&self, t: &Term, assignment: &Assignment) -> Result<Literal, SimulationError> {
        use Kind::*;
        if t.is_symbol() {
            return Simulator::symbol(t, assignment);
        }
        if let Some(l) = t.literal() {
            return Ok(l.clone());
        }
        let ops: Vec<&Literal> = t.children().iter().map(|c| &self.values[&c.id()]).collect();
        let w = t.width().unwrap_or(1);
        let ret = match t.kind() {
            Constant | Variable | Value => unreachable!(),
            And => Literal::Bool(bool_of(ops[0]) && bool_of(ops[1])),
            Or => Literal::Bool(bool_of(ops[0]) || bool_of(ops[1])),
            Xor => Literal::Bool(bool_of(ops[0]) ^ bool_of(ops[1])),
            Not => Literal::Bool(!bool_of(ops[0])),
            BvAnd => make(w, bv_of(ops[0]).bits() & bv_of(ops[1]).bits()),
            BvOr => make(w, bv_of(ops[0]).bits() | bv_of(ops[1]).bits()),
            BvXor => make(w, bv_of(ops[0]).bits() ^ bv_of(ops[1]).bits()),
            BvNot => make(w, BitVec::ones(w).bits() ^ bv_of(ops[0]).bits()),
            BvNeg => Literal::BitVec(neg(bv_of(ops[0]))),
            BvAdd => make(w, bv_of(ops[0]).bits() + bv_of(ops[1]).bits()),
            BvSub => {
                let minus = neg(bv_of(ops[1]));
                make(w, bv_of(ops[0]).bits() + minus.bits())
            }
            BvMul => make(w, bv_of(ops[0]).bits() * bv_of(ops[1]).bits()),
            BvUdiv => Literal::BitVec(udiv(bv_of(ops[0]), bv_of(ops[1]))),
            BvUrem => Literal::BitVec(urem(bv_of(ops[0]), bv_of(ops[1]))),
            BvSdiv => Literal::BitVec(sdiv(bv_of(ops[0]), bv_of(ops[1]))),
            BvSrem => Literal::BitVec(srem(bv_of(ops[0]), bv_of(ops[1]))),
            BvShl => Literal::BitVec(shl(bv_of(ops[0]), bv_of(ops[1]))),
            BvLshr => Literal::BitVec(lshr(bv_of(ops[0]), bv_of(ops[1]))),
            BvAshr => Literal::BitVec(ashr(bv_of(ops[0]), bv_of(ops[1]))),
            BvExtract => make(w, bv_of(ops[0]).bits() >> t.indices()[1]),
            BvConcat => {
                let lo = bv_of(ops[1]);
                make(w, (bv_of(ops[0]).bits() << lo.width()) | lo.bits())
            }
            BvZeroExtend => make(w, bv_of(ops[0]).bits().clone()),
            BvSignExtend => {
                let a = bv_of(ops[0]);
                let ext = if a.msb() {
                    // Ones above the operand
                    BitVec::ones(w).bits() ^ BitVec::ones(a.width()).bits()
                } else {
                    BigUint::zero()
                };
                make(w, ext | a.bits())
            }
            Equal => Literal::Bool(ops[0] == ops[1]),
            BvUle => bit(bv_of(ops[0]).bits() <= bv_of(ops[1]).bits()),
            BvUlt => bit(bv_of(ops[0]).bits() < bv_of(ops[1]).bits()),
            BvSle => bit(bv_of(ops[0]).to_signed() <= bv_of(ops[1]).to_signed()),
            BvSlt => bit(bv_of(ops[0]).to_signed() < bv_of(ops[1]).to_signed()),
            Ite => {
                if bool_of(ops[0]) {
                    ops[1].clone()
                } else {
                    ops[2].clone()
                }
            }
        };
        Ok(ret)
    }
}

/// Evaluate a term for an assignment of its symbols
pub fn simulate(t: &Term, assignment: &Assignment) -> Result<Literal, SimulationError> {
    let mut sim = Simulator::from_term(t);
    sim.run(assignment)
}

#[cfg(test)]
mod tests {
    use super::{simulate, Assignment, Simulator};
    use crate::error::SimulationError;
    use crate::term::generators::testcases;
    use crate::term::{BitVec, Literal, Sort, Term};

    fn bv(width: u32, v: u64) -> Literal {
        Literal::BitVec(BitVec::from_u64(width, v))
    }

    fn assign(pairs: &[(&str, Literal)]) -> Assignment {
        pairs
            .iter()
            .map(|(n, l)| (n.to_string(), l.clone()))
            .collect()
    }

    #[test]
    fn test_basic() {
        let x = Term::constant("x", Sort::BitVec(4));
        let y = Term::constant("y", Sort::BitVec(4));
        let b = Term::constant("b", Sort::Bool);
        let t = Term::ite(&b, &Term::bvadd(&x, &y), &Term::bvsub(&x, &y));
        let a = assign(&[("x", bv(4, 3)), ("y", bv(4, 5)), ("b", Literal::Bool(true))]);
        assert_eq!(simulate(&t, &a).unwrap(), bv(4, 8));
        let a = assign(&[("x", bv(4, 3)), ("y", bv(4, 5)), ("b", Literal::Bool(false))]);
        assert_eq!(simulate(&t, &a).unwrap(), bv(4, 14));
    }

    #[test]
    fn test_division() {
        let x = Term::constant("x", Sort::BitVec(4));
        let y = Term::constant("y", Sort::BitVec(4));
        let cases = [
            // x, y, udiv, urem, sdiv, srem
            (7, 2, 3, 1, 3, 1),
            (7, 0, 15, 7, 15, 7),
            // -2 / 3
            (14, 3, 4, 2, 0, 14),
            // -7 / -2
            (9, 14, 0, 9, 3, 15),
            // 7 / -2
            (7, 14, 0, 7, 13, 1),
            // -1 / 0
            (15, 0, 15, 15, 1, 15),
        ];
        for (vx, vy, ud, ur, sd, sr) in cases {
            let a = assign(&[("x", bv(4, vx)), ("y", bv(4, vy))]);
            assert_eq!(simulate(&Term::bvudiv(&x, &y), &a).unwrap(), bv(4, ud));
            assert_eq!(simulate(&Term::bvurem(&x, &y), &a).unwrap(), bv(4, ur));
            assert_eq!(simulate(&Term::bvsdiv(&x, &y), &a).unwrap(), bv(4, sd));
            assert_eq!(simulate(&Term::bvsrem(&x, &y), &a).unwrap(), bv(4, sr));
        }
    }

    #[test]
    fn test_shifts() {
        let x = Term::constant("x", Sort::BitVec(4));
        let y = Term::constant("y", Sort::BitVec(4));
        let cases = [
            // x, y, shl, lshr, ashr
            (0b1011, 1, 0b0110, 0b0101, 0b1101),
            (0b1011, 3, 0b1000, 0b0001, 0b1111),
            (0b1011, 4, 0, 0, 0b1111),
            (0b0110, 9, 0, 0, 0),
            (0b0110, 0, 0b0110, 0b0110, 0b0110),
        ];
        for (vx, vy, l, r, ar) in cases {
            let a = assign(&[("x", bv(4, vx)), ("y", bv(4, vy))]);
            assert_eq!(simulate(&Term::bvshl(&x, &y), &a).unwrap(), bv(4, l));
            assert_eq!(simulate(&Term::bvlshr(&x, &y), &a).unwrap(), bv(4, r));
            assert_eq!(simulate(&Term::bvashr(&x, &y), &a).unwrap(), bv(4, ar));
        }
    }

    #[test]
    fn test_slices() {
        let x = Term::constant("x", Sort::BitVec(4));
        let a = assign(&[("x", bv(4, 0b1010))]);
        assert_eq!(simulate(&Term::extract(&x, 3, 1), &a).unwrap(), bv(3, 0b101));
        assert_eq!(simulate(&Term::concat(&x, &x), &a).unwrap(), bv(8, 0b1010_1010));
        assert_eq!(simulate(&Term::zero_extend(&x, 2), &a).unwrap(), bv(6, 0b00_1010));
        assert_eq!(simulate(&Term::sign_extend(&x, 2), &a).unwrap(), bv(6, 0b11_1010));
        assert_eq!(simulate(&Term::bvneg(&x), &a).unwrap(), bv(4, 0b0110));
        assert_eq!(simulate(&Term::bvslt(&x, &Term::bv_u64(4, 0)), &a).unwrap(), bv(1, 1));
        assert_eq!(simulate(&Term::bvult(&x, &Term::bv_u64(4, 0)), &a).unwrap(), bv(1, 0));
    }

    #[test]
    fn test_ripple_carry() {
        let t = testcases::ripple_carry(4);
        let mut sim = Simulator::from_term(&t);
        for va in 0..16 {
            for vb in 0..16 {
                let a = assign(&[("a", bv(4, va)), ("b", bv(4, vb))]);
                assert_eq!(sim.run(&a).unwrap(), bv(4, (va + vb) % 16));
            }
        }
    }

    #[test]
    fn test_errors() {
        let x = Term::constant("x", Sort::BitVec(4));
        let t = Term::bvnot(&x);
        assert_eq!(
            simulate(&t, &Assignment::default()),
            Err(SimulationError::Unassigned("x".to_string()))
        );
        let a = assign(&[("x", Literal::Bool(true))]);
        assert!(matches!(
            simulate(&t, &a),
            Err(SimulationError::WrongSort { .. })
        ));
    }
}
