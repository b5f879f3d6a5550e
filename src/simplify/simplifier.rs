use std::cmp::Ordering;
use std::iter::zip;

use log::trace;

use crate::error::SimplifyError;
use crate::simplify::constant_propagation;
use crate::term::{is_x_not_y, is_x_y, BitVec, Kind, Sort, Term};

/// Simplification of a single node, given its already simplified operands
///
/// Implementations must return a term that is equivalent to the node with its
/// operands replaced. They are called once per node by
/// [`TermEvaluator`](crate::simplify::TermEvaluator), operands first.
pub trait Rewriter {
    /// Simplify a node whose operands have been replaced by `operands`
    fn simplify(&mut self, node: &Term, operands: Vec<Term>) -> Result<Term, SimplifyError>;
}

/// Rule-based simplification with constant folding
///
/// Rules are applied in a fixed order, and the first one that matches gives the
/// result. Terms built by a rule are not simplified further.
#[derive(Debug, Default, Clone)]
pub struct Simplifier {
    nb_folded: usize,
    nb_rewritten: usize,
    nb_rebuilt: usize,
}

impl Simplifier {
    /// Create a simplifier
    pub fn new() -> Simplifier {
        Simplifier::default()
    }

    /// Number of nodes replaced by constant folding
    pub fn nb_folded(&self) -> usize {
        self.nb_folded
    }

    /// Number of nodes replaced by a rewrite rule
    pub fn nb_rewritten(&self) -> usize {
        self.nb_rewritten
    }

    /// Number of nodes for which no rule applied
    pub fn nb_rebuilt(&self) -> usize {
        self.nb_rebuilt
    }
}

impl Rewriter for Simplifier {
    fn simplify(&mut self, node: &Term, mut operands: Vec<Term>) -> Result<Term, SimplifyError> {
        check_operands(node, &operands)?;
        if !operands.is_empty() && operands.iter().all(|o| o.is_literal()) {
            let ret = constant_propagation::propagate(node, &operands)?;
            trace!("Folded {} into {}", node.id(), ret);
            self.nb_folded += 1;
            return Ok(ret);
        }
        if node.kind().is_commutative() {
            operands.sort_by(canonical_order);
        }
        match rewrite(node, &operands)? {
            Some(ret) => {
                if !node.is_leaf() {
                    trace!("Rewrote {} {} into {}", node.kind(), node.id(), ret);
                    self.nb_rewritten += 1;
                }
                Ok(ret)
            }
            None => {
                self.nb_rebuilt += 1;
                Ok(node.rebuild(operands))
            }
        }
    }
}

/// Check that the operands may replace those of the node
fn check_operands(node: &Term, operands: &[Term]) -> Result<(), SimplifyError> {
    let children = node.children();
    if operands.len() != children.len()
        || zip(operands, children).any(|(o, c)| o.sort() != c.sort())
    {
        return Err(SimplifyError::BadOperands {
            id: node.id(),
            kind: node.kind(),
            expected: children.iter().map(|c| c.sort()).collect(),
            actual: operands.iter().map(|o| o.sort()).collect(),
        });
    }
    Ok(())
}

/// Order of the operands of commutative operators
///
/// Operators and symbols are grouped by kind, then ordered by identity. Literals come last.
pub fn canonical_order(a: &Term, b: &Term) -> Ordering {
    (a.is_literal(), a.kind(), a.id()).cmp(&(b.is_literal(), b.kind(), b.id()))
}

/// Operators of the Boolean or the bitwise flavour, depending on the sort
#[derive(Clone, Copy)]
struct Logic {
    and: Kind,
    or: Kind,
    not: Kind,
}

impl Logic {
    fn of(sort: Sort) -> Logic {
        if sort.is_bool() {
            Logic {
                and: Kind::And,
                or: Kind::Or,
                not: Kind::Not,
            }
        } else {
            Logic {
                and: Kind::BvAnd,
                or: Kind::BvOr,
                not: Kind::BvNot,
            }
        }
    }

    /// The other one of and/or
    fn dual(&self, kind: Kind) -> Kind {
        if kind == self.and {
            self.or
        } else {
            self.and
        }
    }

    fn not(&self, a: &Term) -> Term {
        Term::with_sort(self.not, a.sort(), vec![a.clone()], vec![])
    }
}

/// Binary operator whose result has the sort of its operands
fn binary(kind: Kind, a: &Term, b: &Term) -> Term {
    Term::with_sort(kind, a.sort(), vec![a.clone(), b.clone()], vec![])
}

fn width(t: &Term) -> u32 {
    t.width().unwrap_or(1)
}

fn bit(b: bool) -> Term {
    Term::bv_u64(1, b as u64)
}

fn extract(a: &Term, hi: u32, lo: u32) -> Term {
    Term::with_sort(
        Kind::BvExtract,
        Sort::BitVec(hi - lo + 1),
        vec![a.clone()],
        vec![hi, lo],
    )
}

fn concat(a: &Term, b: &Term) -> Term {
    Term::with_sort(
        Kind::BvConcat,
        Sort::BitVec(width(a) + width(b)),
        vec![a.clone(), b.clone()],
        vec![],
    )
}

fn sign_extend(a: &Term, n: u32) -> Term {
    Term::with_sort(
        Kind::BvSignExtend,
        Sort::BitVec(width(a) + n),
        vec![a.clone()],
        vec![n],
    )
}

/// Apply the rules of the node kind; None if no rule applies
fn rewrite(node: &Term, ops: &[Term]) -> Result<Option<Term>, SimplifyError> {
    use Kind::*;
    let kind = node.kind();
    let ret = match kind {
        Constant | Variable | Value => Some(node.clone()),
        And | BvAnd | Or | BvOr => lattice(Logic::of(node.sort()), kind, &ops[0], &ops[1]),
        Not | BvNot => not(Logic::of(node.sort()), &ops[0]),
        Xor | BvXor => xor(Logic::of(node.sort()), &ops[0], &ops[1]),
        BvAdd => ops[1].is_zero().then(|| ops[0].clone()),
        BvSub => {
            if ops[1].is_zero() {
                Some(ops[0].clone())
            } else if is_x_y(&ops[0], &ops[1]) {
                Some(Term::zero(node.sort()))
            } else {
                None
            }
        }
        BvMul => {
            if ops[1].is_zero() {
                Some(ops[1].clone())
            } else if ops[1].is_one() {
                Some(ops[0].clone())
            } else {
                None
            }
        }
        BvSdiv | BvUdiv => {
            if ops[1].is_one() {
                Some(ops[0].clone())
            } else if is_x_y(&ops[0], &ops[1]) {
                Some(Term::bv(BitVec::one(width(node))))
            } else {
                None
            }
        }
        BvSrem | BvUrem => {
            if ops[1].is_one() || is_x_y(&ops[0], &ops[1]) {
                Some(Term::zero(node.sort()))
            } else {
                None
            }
        }
        BvExtract => {
            let single_bit = width(&ops[0]) == 1 && node.indices() == [0, 0];
            single_bit.then(|| ops[0].clone())
        }
        BvConcat => merge_concat(&ops[0], &ops[1]),
        BvZeroExtend | BvSignExtend => None,
        Equal => is_x_y(&ops[0], &ops[1]).then(|| Term::bool(true)),
        BvSle | BvUle => is_x_y(&ops[0], &ops[1]).then(|| bit(true)),
        BvSlt => is_x_y(&ops[0], &ops[1]).then(|| bit(false)),
        BvUlt => (is_x_y(&ops[0], &ops[1]) || ops[1].is_zero()).then(|| bit(false)),
        Ite => match ops[0].literal().and_then(|l| l.as_condition()) {
            Some(false) => Some(ops[2].clone()),
            Some(true) => Some(ops[1].clone()),
            None => is_x_y(&ops[1], &ops[2]).then(|| ops[1].clone()),
        },
        BvNeg | BvShl | BvLshr | BvAshr => return Err(SimplifyError::Unimplemented(kind)),
    };
    Ok(ret)
}

/// Rules for And and Or
///
/// `op` is the operator being simplified; the rules for Or mirror those for And.
fn lattice(logic: Logic, op: Kind, p0: &Term, p1: &Term) -> Option<Term> {
    let dual = logic.dual(op);
    let is_and = op == logic.and;
    // Absorbing element: zero for And, all ones for Or
    let absorbing = |t: &Term| if is_and { t.is_zero() } else { t.is_ones() };
    let neutral = |t: &Term| if is_and { t.is_ones() } else { t.is_zero() };
    let make_absorbing = || {
        if is_and {
            Term::zero(p0.sort())
        } else {
            Term::ones(p0.sort())
        }
    };

    if absorbing(p1) {
        return Some(p1.clone());
    }
    if neutral(p1) {
        return Some(p0.clone());
    }
    if is_x_y(p0, p1) {
        return Some(p0.clone());
    }
    if is_x_not_y(p0, p1) {
        return Some(make_absorbing());
    }

    // Distributivity: (a | b) & (a | c) = a | (b & c)
    if p0.kind() == dual && p1.kind() == dual {
        let (a, b) = (p0.child(0), p0.child(1));
        let (c, d) = (p1.child(0), p1.child(1));
        let factored = if is_x_y(a, c) {
            Some((a, b, d))
        } else if is_x_y(a, d) {
            Some((a, b, c))
        } else if is_x_y(b, c) {
            Some((b, a, d))
        } else if is_x_y(b, d) {
            Some((b, a, c))
        } else {
            None
        };
        if let Some((common, x, y)) = factored {
            return Some(binary(dual, common, &binary(op, x, y)));
        }
    }

    // Absorption, with the nested operator on either side
    for (nested, other) in [(p0, p1), (p1, p0)] {
        if nested.kind() != op && nested.kind() != dual {
            continue;
        }
        let (a, b) = (nested.child(0), nested.child(1));
        if nested.kind() == op {
            // (a & b) & a = a & b
            if is_x_y(a, other) || is_x_y(b, other) {
                return Some(nested.clone());
            }
            // (a & b) & !a = 0
            if is_x_not_y(a, other) || is_x_not_y(b, other) {
                return Some(make_absorbing());
            }
        } else {
            // (a | b) & a = a
            if is_x_y(a, other) || is_x_y(b, other) {
                return Some(other.clone());
            }
            // (a | b) & !a = b & !a
            if is_x_not_y(a, other) {
                return Some(binary(op, b, other));
            }
            if is_x_not_y(b, other) {
                return Some(binary(op, a, other));
            }
        }
    }
    None
}

/// Rules for Not
fn not(logic: Logic, p0: &Term) -> Option<Term> {
    if let Some(x) = p0.negated() {
        return Some(x.clone());
    }
    if p0.kind() == logic.and || p0.kind() == logic.or {
        let dual = logic.dual(p0.kind());
        let (a, b) = (p0.child(0), p0.child(1));
        return match (a.negated(), b.negated()) {
            // !(!a & !b) = a | b
            (Some(na), Some(nb)) => Some(binary(dual, na, nb)),
            // !(a & b) = !a | !b
            (None, None) => Some(binary(dual, &logic.not(a), &logic.not(b))),
            _ => None,
        };
    }
    None
}

/// Rules for Xor
fn xor(logic: Logic, p0: &Term, p1: &Term) -> Option<Term> {
    if p1.is_zero() {
        Some(p0.clone())
    } else if p1.is_ones() {
        Some(logic.not(p0))
    } else if is_x_y(p0, p1) {
        Some(Term::zero(p0.sort()))
    } else if is_x_not_y(p0, p1) {
        Some(Term::ones(p0.sort()))
    } else {
        None
    }
}

/// Returns whether the most significant bit of `t` is bit `i` of `x`
fn msb_is_bit_of(t: &Term, x: &Term, i: u32) -> bool {
    if t.kind() == Kind::BvExtract && is_x_y(t.child(0), x) {
        t.indices()[0] == i
    } else {
        width(x) == i + 1 && is_x_y(t, x)
    }
}

/// Merge two adjacent slices, `hi` being the most significant
///
/// Contiguous slices of the same source become a single slice. A single sign bit
/// followed by something with the same sign bit becomes a sign extension.
fn merge_slices(hi: &Term, lo: &Term) -> Option<Term> {
    if hi.kind() != Kind::BvExtract {
        return None;
    }
    let x = hi.child(0);
    let (h0, l0) = (hi.indices()[0], hi.indices()[1]);
    if lo.kind() == Kind::BvExtract && is_x_y(lo.child(0), x) && lo.indices()[0] + 1 == l0 {
        return Some(extract(x, h0, lo.indices()[1]));
    }
    if h0 == l0 {
        let (base, n) = if lo.kind() == Kind::BvSignExtend {
            (lo.child(0), lo.indices()[0])
        } else {
            (lo, 0)
        };
        if msb_is_bit_of(base, x, h0) {
            return Some(sign_extend(base, n + 1));
        }
    }
    None
}

/// Rules for Concat: merge slices up to three levels deep
fn merge_concat(p0: &Term, p1: &Term) -> Option<Term> {
    if let Some(m) = merge_slices(p0, p1) {
        return Some(m);
    }
    if p1.kind() == Kind::BvConcat {
        // p0 . (b . c)
        let (b, c) = (p1.child(0), p1.child(1));
        if let Some(m) = merge_slices(p0, b) {
            return Some(concat(&m, c));
        }
        // p0 . ((b0 . b1) . c)
        if b.kind() == Kind::BvConcat {
            if let Some(m) = merge_slices(p0, b.child(0)) {
                return Some(concat(&concat(&m, b.child(1)), c));
            }
        }
    }
    if p0.kind() == Kind::BvConcat {
        // (a . b) . p1
        let (a, b) = (p0.child(0), p0.child(1));
        if let Some(m) = merge_slices(b, p1) {
            return Some(concat(a, &m));
        }
        // (a . (b0 . b1)) . p1
        if b.kind() == Kind::BvConcat {
            if let Some(m) = merge_slices(b.child(1), p1) {
                return Some(concat(a, &concat(b.child(0), &m)));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{Rewriter, Simplifier};
    use crate::error::{ConstantError, SimplifyError};
    use crate::term::{is_x_y, Kind, Sort, Term};

    fn simplify(t: &Term) -> Term {
        Simplifier::new().simplify(t, t.children().to_vec()).unwrap()
    }

    fn bv(name: &str) -> Term {
        Term::constant(name, Sort::BitVec(4))
    }

    fn boolean(name: &str) -> Term {
        Term::constant(name, Sort::Bool)
    }

    #[test]
    fn test_identity_elements() {
        let x = bv("x");
        let ones = Term::ones(Sort::BitVec(4));
        let zero = Term::zero(Sort::BitVec(4));
        assert_eq!(simplify(&Term::bvand(&x, &ones)).id(), x.id());
        assert_eq!(simplify(&Term::bvand(&ones, &x)).id(), x.id());
        assert_eq!(simplify(&Term::bvor(&x, &zero)).id(), x.id());
        assert_eq!(simplify(&Term::bvxor(&zero, &x)).id(), x.id());
        assert_eq!(simplify(&Term::bvadd(&zero, &x)).id(), x.id());
        assert_eq!(simplify(&Term::bvsub(&x, &zero)).id(), x.id());
        assert!(simplify(&Term::bvand(&x, &zero)).is_zero());
        assert!(simplify(&Term::bvor(&ones, &x)).is_ones());
        assert!(simplify(&Term::bvmul(&x, &zero)).is_zero());
        let one = Term::bv_u64(4, 1);
        assert_eq!(simplify(&Term::bvmul(&one, &x)).id(), x.id());

        let b = boolean("b");
        assert_eq!(simplify(&Term::and(&b, &Term::bool(true))).id(), b.id());
        assert!(simplify(&Term::and(&Term::bool(false), &b)).is_zero());
        assert_eq!(simplify(&Term::or(&b, &Term::bool(false))).id(), b.id());
        assert!(simplify(&Term::or(&Term::bool(true), &b)).is_ones());
    }

    #[test]
    fn test_complement() {
        let x = bv("x");
        let nx = Term::bvnot(&x);
        let r = simplify(&Term::bvand(&x, &nx));
        assert_eq!(r.literal(), Term::zero(Sort::BitVec(4)).literal());
        let r = simplify(&Term::bvor(&nx, &x));
        assert!(r.is_ones());
        assert_eq!(r.sort(), Sort::BitVec(4));
        assert!(simplify(&Term::bvxor(&x, &nx)).is_ones());
        assert!(simplify(&Term::bvxor(&x, &x)).is_zero());

        let b = boolean("b");
        assert_eq!(simplify(&Term::and(&b, &Term::not(&b))).literal(), Term::bool(false).literal());
        assert_eq!(simplify(&Term::or(&b, &Term::not(&b))).literal(), Term::bool(true).literal());
    }

    #[test]
    fn test_idempotent() {
        let x = bv("x");
        assert_eq!(simplify(&Term::bvand(&x, &x)).id(), x.id());
        assert_eq!(simplify(&Term::bvor(&x, &x)).id(), x.id());
        // Structurally identical symbols
        assert!(is_x_y(&simplify(&Term::bvand(&x, &bv("x"))), &x));
    }

    #[test]
    fn test_xor_ones() {
        let x = bv("x");
        let r = simplify(&Term::bvxor(&x, &Term::ones(Sort::BitVec(4))));
        assert_eq!(r.kind(), Kind::BvNot);
        assert_eq!(r.child(0).id(), x.id());
    }

    #[test]
    fn test_xor_boolean() {
        let b = boolean("b");
        let r = simplify(&Term::xor(&b, &Term::bool(true)));
        assert_eq!(r.kind(), Kind::Not);
        assert_eq!(r.sort(), Sort::Bool);
        assert_eq!(r.child(0).id(), b.id());
        assert_eq!(simplify(&Term::xor(&Term::bool(false), &b)).id(), b.id());
        assert!(simplify(&Term::xor(&b, &b)).is_zero());
        assert!(simplify(&Term::xor(&Term::not(&b), &b)).is_ones());
    }

    #[test]
    fn test_double_negation() {
        let x = bv("x");
        assert_eq!(simplify(&Term::bvnot(&Term::bvnot(&x))).id(), x.id());
        let b = boolean("b");
        assert_eq!(simplify(&Term::not(&Term::not(&b))).id(), b.id());
    }

    #[test]
    fn test_de_morgan() {
        let x = bv("x");
        let y = bv("y");
        let r = simplify(&Term::bvnot(&Term::bvand(&Term::bvnot(&x), &Term::bvnot(&y))));
        assert!(is_x_y(&r, &Term::bvor(&x, &y)));
        let r = simplify(&Term::bvnot(&Term::bvor(&x, &y)));
        assert!(is_x_y(&r, &Term::bvand(&Term::bvnot(&x), &Term::bvnot(&y))));
        // Mixed operands are left alone
        let t = Term::bvnot(&Term::bvor(&Term::bvnot(&x), &y));
        assert_eq!(simplify(&t).id(), t.id());
    }

    #[test]
    fn test_de_morgan_boolean() {
        let a = boolean("a");
        let b = boolean("b");
        let r = simplify(&Term::not(&Term::and(&a, &b)));
        assert_eq!(r.kind(), Kind::Or);
        assert!(is_x_y(&r, &Term::or(&Term::not(&a), &Term::not(&b))));
        let r = simplify(&Term::not(&Term::or(&Term::not(&a), &Term::not(&b))));
        assert_eq!(r.kind(), Kind::And);
        assert!(is_x_y(&r, &Term::and(&a, &b)));
    }

    #[test]
    fn test_distributivity() {
        let (a, b, c) = (bv("a"), bv("b"), bv("c"));
        let t = Term::bvand(&Term::bvor(&a, &b), &Term::bvor(&c, &a));
        let r = simplify(&t);
        assert_eq!(r.kind(), Kind::BvOr);
        assert_eq!(r.child(0).id(), a.id());
        assert!(is_x_y(r.child(1), &Term::bvand(&b, &c)));

        let t = Term::bvor(&Term::bvand(&a, &b), &Term::bvand(&a, &c));
        let r = simplify(&t);
        assert_eq!(r.kind(), Kind::BvAnd);
        assert_eq!(r.child(0).id(), a.id());
        assert!(is_x_y(r.child(1), &Term::bvor(&b, &c)));
    }

    #[test]
    fn test_distributivity_boolean() {
        let (a, b, c) = (boolean("a"), boolean("b"), boolean("c"));
        let t = Term::and(&Term::or(&b, &a), &Term::or(&a, &c));
        let r = simplify(&t);
        assert_eq!(r.kind(), Kind::Or);
        assert_eq!(r.sort(), Sort::Bool);
        assert_eq!(r.child(0).id(), a.id());
        assert!(is_x_y(r.child(1), &Term::and(&b, &c)));

        let t = Term::or(&Term::and(&a, &b), &Term::and(&c, &b));
        let r = simplify(&t);
        assert_eq!(r.kind(), Kind::And);
        assert_eq!(r.child(0).id(), b.id());
        assert!(is_x_y(r.child(1), &Term::or(&a, &c)));
    }

    #[test]
    fn test_absorption() {
        let (a, b) = (bv("a"), bv("b"));
        let ab = Term::bvand(&a, &b);
        let a_or_b = Term::bvor(&a, &b);
        let na = Term::bvnot(&a);
        let nb = Term::bvnot(&b);

        assert_eq!(simplify(&Term::bvand(&ab, &a)).id(), ab.id());
        assert_eq!(simplify(&Term::bvand(&b, &ab)).id(), ab.id());
        assert!(simplify(&Term::bvand(&ab, &na)).is_zero());
        assert!(simplify(&Term::bvand(&nb, &ab)).is_zero());
        assert_eq!(simplify(&Term::bvand(&a_or_b, &a)).id(), a.id());
        assert_eq!(simplify(&Term::bvand(&b, &a_or_b)).id(), b.id());
        let r = simplify(&Term::bvand(&a_or_b, &na));
        assert!(is_x_y(&r, &Term::bvand(&b, &na)));

        assert_eq!(simplify(&Term::bvor(&a_or_b, &a)).id(), a_or_b.id());
        assert!(simplify(&Term::bvor(&a_or_b, &nb)).is_ones());
        assert_eq!(simplify(&Term::bvor(&ab, &b)).id(), b.id());
        let r = simplify(&Term::bvor(&nb, &ab));
        assert!(is_x_y(&r, &Term::bvor(&a, &nb)));
    }

    #[test]
    fn test_arithmetic() {
        let x = bv("x");
        assert!(simplify(&Term::bvsub(&x, &x)).is_zero());
        let one = Term::bv_u64(4, 1);
        assert_eq!(simplify(&Term::bvudiv(&x, &one)).id(), x.id());
        assert!(simplify(&Term::bvsdiv(&x, &x)).is_one());
        assert!(simplify(&Term::bvurem(&x, &one)).is_zero());
        assert!(simplify(&Term::bvsrem(&x, &x)).is_zero());
    }

    #[test]
    fn test_comparisons() {
        let x = bv("x");
        let y = Term::bvadd(&x, &bv("y"));
        assert_eq!(simplify(&Term::equal(&y, &y)).literal(), Term::bool(true).literal());
        assert!(simplify(&Term::bvsle(&x, &x)).is_one());
        assert!(simplify(&Term::bvule(&x, &x)).is_one());
        assert!(simplify(&Term::bvslt(&x, &x)).is_zero());
        assert!(simplify(&Term::bvult(&x, &x)).is_zero());
        let r = simplify(&Term::bvult(&x, &Term::zero(Sort::BitVec(4))));
        assert!(r.is_zero());
        assert_eq!(r.sort(), Sort::BitVec(1));
        let t = Term::bvslt(&x, &Term::zero(Sort::BitVec(4)));
        assert_eq!(simplify(&t).id(), t.id());
    }

    #[test]
    fn test_ite() {
        let (x, y) = (bv("x"), bv("y"));
        let c = boolean("c");
        assert_eq!(simplify(&Term::ite(&Term::bool(true), &x, &y)).id(), x.id());
        assert_eq!(simplify(&Term::ite(&Term::bv_u64(1, 0), &x, &y)).id(), y.id());
        assert_eq!(simplify(&Term::ite(&c, &x, &x)).id(), x.id());
        let t = Term::ite(&c, &x, &y);
        assert_eq!(simplify(&t).id(), t.id());
    }

    #[test]
    fn test_extract() {
        let x = Term::constant("x", Sort::BitVec(1));
        assert_eq!(simplify(&Term::extract(&x, 0, 0)).id(), x.id());
        let y = bv("y");
        let t = Term::extract(&y, 0, 0);
        assert_eq!(simplify(&t).id(), t.id());
    }

    #[test]
    fn test_concat_slices() {
        let x = Term::constant("x", Sort::BitVec(8));
        let t = Term::concat(&Term::extract(&x, 7, 4), &Term::extract(&x, 3, 1));
        let r = simplify(&t);
        assert!(is_x_y(&r, &Term::extract(&x, 7, 1)));

        // Not contiguous
        let t = Term::concat(&Term::extract(&x, 7, 5), &Term::extract(&x, 3, 0));
        assert_eq!(simplify(&t).id(), t.id());

        // Nested on the right
        let y = Term::constant("y", Sort::BitVec(2));
        let inner = Term::concat(&Term::extract(&x, 3, 0), &y);
        let t = Term::concat(&Term::extract(&x, 5, 4), &inner);
        let r = simplify(&t);
        assert!(is_x_y(&r, &Term::concat(&Term::extract(&x, 5, 0), &y)));

        // Nested on the left
        let t = Term::concat(&Term::concat(&y, &Term::extract(&x, 7, 4)), &Term::extract(&x, 3, 0));
        let r = simplify(&t);
        assert!(is_x_y(&r, &Term::concat(&y, &Term::extract(&x, 7, 0))));

        // Three levels
        let deep = Term::concat(&Term::concat(&Term::extract(&x, 3, 0), &y), &y);
        let t = Term::concat(&Term::extract(&x, 7, 4), &deep);
        let r = simplify(&t);
        let expected = Term::concat(&Term::concat(&Term::extract(&x, 7, 0), &y), &y);
        assert!(is_x_y(&r, &expected));
    }

    #[test]
    fn test_concat_sign_extension() {
        let x = Term::constant("x", Sort::BitVec(8));
        let sign = Term::extract(&x, 7, 7);
        let r = simplify(&Term::concat(&sign, &x));
        assert!(is_x_y(&r, &Term::sign_extend(&x, 1)));
        let r = simplify(&Term::concat(&sign, &Term::sign_extend(&x, 2)));
        assert!(is_x_y(&r, &Term::sign_extend(&x, 3)));

        let low = Term::extract(&x, 3, 0);
        let r = simplify(&Term::concat(&Term::extract(&x, 3, 3), &low));
        assert!(is_x_y(&r, &Term::sign_extend(&low, 1)));

        // Not the sign bit
        let t = Term::concat(&Term::extract(&x, 6, 6), &x);
        assert_eq!(simplify(&t).id(), t.id());
    }

    #[test]
    fn test_canonical_order() {
        let x = bv("x");
        let y = bv("y");
        let a = simplify(&Term::bvadd(&x, &y));
        let b = simplify(&Term::bvadd(&y, &x));
        assert!(is_x_y(&a, &b));
        let lit = Term::bv_u64(4, 3);
        let r = simplify(&Term::bvmul(&lit, &x));
        assert_eq!(r.child(0).id(), x.id());
        assert_eq!(r.child(1).id(), lit.id());
    }

    #[test]
    fn test_constant_folding() {
        let t = Term::bvand(
            &Term::bv_binary("1010").unwrap(),
            &Term::bv_binary("1100").unwrap(),
        );
        let mut s = Simplifier::new();
        let r = s.simplify(&t, t.children().to_vec()).unwrap();
        assert_eq!(r.to_string(), "#b1000");
        assert_eq!(s.nb_folded(), 1);
    }

    #[test]
    fn test_errors() {
        let a = Term::bv_u64(4, 6);
        let b = Term::bv_u64(4, 3);
        let t = Term::bvsdiv(&a, &b);
        let err = Simplifier::new()
            .simplify(&t, t.children().to_vec())
            .unwrap_err();
        assert_eq!(
            err,
            SimplifyError::ConstantPropagation(ConstantError::Unimplemented(Kind::BvSdiv))
        );

        let x = bv("x");
        let t = Term::bvshl(&x, &b);
        let err = Simplifier::new()
            .simplify(&t, t.children().to_vec())
            .unwrap_err();
        assert_eq!(err, SimplifyError::Unimplemented(Kind::BvShl));
        assert_eq!(err.to_string(), "not implemented for node kind bvshl");
    }

    #[test]
    fn test_bad_operands() {
        let x = bv("x");
        let t = Term::bvand(&x, &x);
        let mut s = Simplifier::new();
        let err = s.simplify(&t, vec![]).unwrap_err();
        assert_eq!(
            err,
            SimplifyError::BadOperands {
                id: t.id(),
                kind: Kind::BvAnd,
                expected: vec![Sort::BitVec(4); 2],
                actual: vec![],
            }
        );
        let wide = Term::constant("w", Sort::BitVec(8));
        let err = s.simplify(&t, vec![x.clone(), wide]).unwrap_err();
        assert!(matches!(err, SimplifyError::BadOperands { .. }));
        assert!(s.simplify(&x, vec![x.clone()]).is_err());
        assert_eq!(s.nb_folded() + s.nb_rewritten() + s.nb_rebuilt(), 0);
    }

    #[test]
    fn test_leaf() {
        let x = bv("x");
        let mut s = Simplifier::new();
        assert_eq!(s.simplify(&x, vec![]).unwrap().id(), x.id());
        let v = Term::bv_u64(4, 3);
        assert_eq!(s.simplify(&v, vec![]).unwrap().id(), v.id());
        assert_eq!(s.nb_rewritten(), 0);
    }
}
