use std::fmt;
use std::iter::zip;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;

use crate::error::{LiteralError, SortError};
use crate::term::{BitVec, Kind, Literal, Sort};

/// Identity of a term node
///
/// Every node gets a fresh identity when it is built. Clones of a [`Term`] share the
/// node and its identity, which is how common subexpressions are recognized.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct TermId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

impl TermId {
    fn fresh() -> TermId {
        TermId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Map keyed by term identity
pub type TermMap<V> = FxHashMap<TermId, V>;

struct TermData {
    id: TermId,
    kind: Kind,
    sort: Sort,
    children: Box<[Term]>,
    indices: Box<[u32]>,
    name: Option<Box<str>>,
    value: Option<Literal>,
}

impl Drop for TermData {
    fn drop(&mut self) {
        // Release uniquely owned descendants iteratively, to support very deep terms
        let mut to_drop = std::mem::take(&mut self.children).into_vec();
        while let Some(t) = to_drop.pop() {
            if let Ok(mut data) = Arc::try_unwrap(t.0) {
                to_drop.extend(std::mem::take(&mut data.children).into_vec());
            }
        }
    }
}

/// Immutable node of a bitvector or Boolean expression
///
/// Terms form a directed acyclic graph: a node may be shared by several parents, and
/// cloning a term is cheap. Terms are never modified after construction, so they
/// can be shared between threads.
///
/// ```
/// # use bvsimp::term::{Sort, Term};
/// let x = Term::constant("x", Sort::BitVec(4));
/// let ones = Term::bv_binary("1111").unwrap();
/// let t = Term::bvand(&x, &ones);
/// assert_eq!(t.sort(), Sort::BitVec(4));
/// assert_eq!(t.to_string(), "(bvand x #b1111)");
/// ```
#[derive(Clone)]
pub struct Term(Arc<TermData>);

impl Term {
    fn make(
        kind: Kind,
        sort: Sort,
        children: Box<[Term]>,
        indices: Box<[u32]>,
        name: Option<Box<str>>,
        value: Option<Literal>,
    ) -> Term {
        Term(Arc::new(TermData {
            id: TermId::fresh(),
            kind,
            sort,
            children,
            indices,
            name,
            value,
        }))
    }

    /// Create a literal
    pub fn value(lit: Literal) -> Term {
        let sort = lit.sort();
        Term::make(
            Kind::Value,
            sort,
            Box::new([]),
            Box::new([]),
            None,
            Some(lit),
        )
    }

    /// Create a Boolean literal
    pub fn bool(b: bool) -> Term {
        Term::value(Literal::Bool(b))
    }

    /// Create a bitvector literal
    pub fn bv(bv: BitVec) -> Term {
        Term::value(Literal::BitVec(bv))
    }

    /// Create a bitvector literal from a machine integer, truncated to the width
    pub fn bv_u64(width: u32, v: u64) -> Term {
        Term::bv(BitVec::from_u64(width, v))
    }

    /// Create a bitvector literal from binary digits, most significant first
    pub fn bv_binary(text: &str) -> Result<Term, LiteralError> {
        Ok(Term::bv(BitVec::from_binary(text)?))
    }

    /// Create the zero or false literal of a sort
    pub fn zero(sort: Sort) -> Term {
        Term::value(Literal::zero(sort))
    }

    /// Create the all-ones or true literal of a sort
    pub fn ones(sort: Sort) -> Term {
        Term::value(Literal::ones(sort))
    }

    fn symbol(kind: Kind, name: &str, sort: Sort) -> Term {
        assert!(sort.width() != Some(0), "Bitvectors have at least one bit");
        Term::make(
            kind,
            sort,
            Box::new([]),
            Box::new([]),
            Some(name.into()),
            None,
        )
    }

    /// Create a named free symbol; panics on a bitvector sort of width 0
    pub fn constant(name: &str, sort: Sort) -> Term {
        Term::symbol(Kind::Constant, name, sort)
    }

    /// Create a named placeholder variable; panics on a bitvector sort of width 0
    pub fn variable(name: &str, sort: Sort) -> Term {
        Term::symbol(Kind::Variable, name, sort)
    }

    /// Create an operator node, checking the operand sorts and the indices
    pub fn try_new(kind: Kind, children: Vec<Term>, indices: Vec<u32>) -> Result<Term, SortError> {
        let sort = compute_sort(kind, &children, &indices)?;
        Ok(Term::make(
            kind,
            sort,
            children.into(),
            indices.into(),
            None,
            None,
        ))
    }

    /// Create an operator node; panics if the term is ill-formed
    pub fn apply(kind: Kind, children: &[&Term], indices: &[u32]) -> Term {
        let children = children.iter().map(|t| (*t).clone()).collect();
        match Term::try_new(kind, children, indices.to_vec()) {
            Ok(t) => t,
            Err(e) => panic!("Ill-formed term: {e}"),
        }
    }

    /// Create a node with the same operator, sort and indices but different operands
    ///
    /// The node itself is returned if the operands are unchanged.
    pub(crate) fn rebuild(&self, children: Vec<Term>) -> Term {
        debug_assert_eq!(children.len(), self.children().len());
        if zip(children.iter(), self.children().iter()).all(|(a, b)| a.id() == b.id()) {
            return self.clone();
        }
        Term::make(
            self.kind(),
            self.sort(),
            children.into(),
            self.indices().into(),
            None,
            None,
        )
    }

    /// Create a node whose sort is known to be correct
    pub(crate) fn with_sort(kind: Kind, sort: Sort, children: Vec<Term>, indices: Vec<u32>) -> Term {
        debug_assert_eq!(compute_sort(kind, &children, &indices), Ok(sort));
        Term::make(kind, sort, children.into(), indices.into(), None, None)
    }

    /// Boolean And
    pub fn and(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::And, &[a, b], &[])
    }

    /// Boolean Or
    pub fn or(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::Or, &[a, b], &[])
    }

    /// Boolean Xor
    pub fn xor(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::Xor, &[a, b], &[])
    }

    /// Boolean Not
    pub fn not(a: &Term) -> Term {
        Term::apply(Kind::Not, &[a], &[])
    }

    /// Bitwise And
    pub fn bvand(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvAnd, &[a, b], &[])
    }

    /// Bitwise Or
    pub fn bvor(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvOr, &[a, b], &[])
    }

    /// Bitwise Xor
    pub fn bvxor(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvXor, &[a, b], &[])
    }

    /// Bitwise Not
    pub fn bvnot(a: &Term) -> Term {
        Term::apply(Kind::BvNot, &[a], &[])
    }

    /// Addition
    pub fn bvadd(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvAdd, &[a, b], &[])
    }

    /// Subtraction
    pub fn bvsub(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvSub, &[a, b], &[])
    }

    /// Multiplication
    pub fn bvmul(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvMul, &[a, b], &[])
    }

    /// Signed division
    pub fn bvsdiv(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvSdiv, &[a, b], &[])
    }

    /// Unsigned division
    pub fn bvudiv(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvUdiv, &[a, b], &[])
    }

    /// Signed remainder
    pub fn bvsrem(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvSrem, &[a, b], &[])
    }

    /// Unsigned remainder
    pub fn bvurem(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvUrem, &[a, b], &[])
    }

    /// Bits `hi` down to `lo` of a bitvector
    pub fn extract(a: &Term, hi: u32, lo: u32) -> Term {
        Term::apply(Kind::BvExtract, &[a], &[hi, lo])
    }

    /// Concatenation, with `a` in the most significant bits
    pub fn concat(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvConcat, &[a, b], &[])
    }

    /// Add `n` zeros in the most significant bits
    pub fn zero_extend(a: &Term, n: u32) -> Term {
        Term::apply(Kind::BvZeroExtend, &[a], &[n])
    }

    /// Add `n` copies of the sign bit in the most significant bits
    pub fn sign_extend(a: &Term, n: u32) -> Term {
        Term::apply(Kind::BvSignExtend, &[a], &[n])
    }

    /// Equality
    pub fn equal(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::Equal, &[a, b], &[])
    }

    /// Signed less or equal, as a single bit
    pub fn bvsle(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvSle, &[a, b], &[])
    }

    /// Signed less than, as a single bit
    pub fn bvslt(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvSlt, &[a, b], &[])
    }

    /// Unsigned less or equal, as a single bit
    pub fn bvule(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvUle, &[a, b], &[])
    }

    /// Unsigned less than, as a single bit
    pub fn bvult(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvUlt, &[a, b], &[])
    }

    /// If-then-else
    pub fn ite(c: &Term, a: &Term, b: &Term) -> Term {
        Term::apply(Kind::Ite, &[c, a, b], &[])
    }

    /// Two's complement negation
    pub fn bvneg(a: &Term) -> Term {
        Term::apply(Kind::BvNeg, &[a], &[])
    }

    /// Shift left
    pub fn bvshl(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvShl, &[a, b], &[])
    }

    /// Logical shift right
    pub fn bvlshr(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvLshr, &[a, b], &[])
    }

    /// Arithmetic shift right
    pub fn bvashr(a: &Term, b: &Term) -> Term {
        Term::apply(Kind::BvAshr, &[a, b], &[])
    }

    /// Identity of the node
    pub fn id(&self) -> TermId {
        self.0.id
    }

    /// Operator kind
    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    /// Sort of the result
    pub fn sort(&self) -> Sort {
        self.0.sort
    }

    /// Width of a bitvector term, None for Boolean
    pub fn width(&self) -> Option<u32> {
        self.sort().width()
    }

    /// Operands
    pub fn children(&self) -> &[Term] {
        &self.0.children
    }

    /// Operand at index i
    pub fn child(&self, i: usize) -> &Term {
        &self.0.children[i]
    }

    /// Integer indices of extractions and extensions
    pub fn indices(&self) -> &[u32] {
        &self.0.indices
    }

    /// Name of a symbol, None for other kinds
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Value of a literal, None for other kinds
    pub fn literal(&self) -> Option<&Literal> {
        self.0.value.as_ref()
    }

    /// Returns whether the term is a literal
    pub fn is_literal(&self) -> bool {
        self.kind() == Kind::Value
    }

    /// Returns whether the term has no operand
    pub fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    /// Returns whether the term is a symbol
    pub fn is_symbol(&self) -> bool {
        matches!(self.kind(), Kind::Constant | Kind::Variable)
    }

    /// Returns whether the term is the zero or false literal
    pub fn is_zero(&self) -> bool {
        self.literal().is_some_and(|l| l.is_zero())
    }

    /// Returns whether the term is the all-ones or true literal
    pub fn is_ones(&self) -> bool {
        self.literal().is_some_and(|l| l.is_ones())
    }

    /// Returns whether the term is the bitvector literal one
    pub fn is_one(&self) -> bool {
        self.literal()
            .and_then(|l| l.as_bv())
            .is_some_and(|bv| bv.is_one())
    }

    /// Operand of a Boolean or bitwise negation
    pub fn negated(&self) -> Option<&Term> {
        if self.kind().is_not() {
            Some(self.child(0))
        } else {
            None
        }
    }

    /// All nodes reachable from this term, operands before their users, each node once
    pub fn post_order(&self) -> Vec<Term> {
        self.post_order_until(|_| false)
    }

    /// Same as [`Term::post_order`], but nodes for which `opaque` holds are not explored
    pub fn post_order_until<F: Fn(&Term) -> bool>(&self, opaque: F) -> Vec<Term> {
        let mut order = Vec::new();
        let mut visited = FxHashSet::default();
        let mut to_visit: Vec<(&Term, bool)> = vec![(self, false)];
        while let Some((t, expanded)) = to_visit.pop() {
            if expanded {
                order.push(t.clone());
                continue;
            }
            if !visited.insert(t.id()) {
                continue;
            }
            to_visit.push((t, true));
            if !opaque(t) {
                for c in t.children().iter().rev() {
                    if !visited.contains(&c.id()) {
                        to_visit.push((c, false));
                    }
                }
            }
        }
        order
    }
}

/// Compute the sort of an operator node, checking its operands
fn compute_sort(kind: Kind, children: &[Term], indices: &[u32]) -> Result<Sort, SortError> {
    use Kind::*;
    if kind.is_leaf() {
        return Err(SortError::Leaf(kind));
    }
    if children.len() != kind.arity() {
        return Err(SortError::Arity {
            kind,
            expected: kind.arity(),
            actual: children.len(),
        });
    }
    if indices.len() != kind.nb_indices() {
        return Err(SortError::Indices {
            kind,
            expected: kind.nb_indices(),
            actual: indices.len(),
        });
    }
    let sorts = children.iter().map(|c| c.sort()).collect::<Vec<_>>();
    let bv_width = |sort: Sort| -> Result<u32, SortError> {
        sort.width().ok_or(SortError::Operand { kind, sort })
    };
    let same = |left: Sort, right: Sort| -> Result<Sort, SortError> {
        if left == right {
            Ok(left)
        } else {
            Err(SortError::Mismatch { kind, left, right })
        }
    };
    let bad_indices = |sort: Sort| SortError::BadIndices {
        kind,
        indices: indices.to_vec(),
        sort,
    };
    match kind {
        Constant | Variable | Value => Err(SortError::Leaf(kind)),
        And | Or | Xor | Not => {
            if let Some(sort) = sorts.iter().find(|s| !s.is_bool()) {
                Err(SortError::Operand { kind, sort: *sort })
            } else {
                Ok(Sort::Bool)
            }
        }
        BvNot | BvNeg => {
            bv_width(sorts[0])?;
            Ok(sorts[0])
        }
        BvAnd | BvOr | BvXor | BvAdd | BvSub | BvMul | BvSdiv | BvUdiv | BvSrem | BvUrem
        | BvShl | BvLshr | BvAshr => {
            bv_width(sorts[0])?;
            same(sorts[0], sorts[1])
        }
        BvSle | BvSlt | BvUle | BvUlt => {
            bv_width(sorts[0])?;
            same(sorts[0], sorts[1])?;
            Ok(Sort::BitVec(1))
        }
        Equal => {
            same(sorts[0], sorts[1])?;
            Ok(Sort::Bool)
        }
        BvConcat => {
            let w0 = bv_width(sorts[0])?;
            let w1 = bv_width(sorts[1])?;
            w0.checked_add(w1)
                .map(Sort::BitVec)
                .ok_or(SortError::Operand {
                    kind,
                    sort: sorts[1],
                })
        }
        BvExtract => {
            let w = bv_width(sorts[0])?;
            let (hi, lo) = (indices[0], indices[1]);
            if lo > hi || hi >= w {
                Err(bad_indices(sorts[0]))
            } else {
                Ok(Sort::BitVec(hi - lo + 1))
            }
        }
        BvZeroExtend | BvSignExtend => {
            let w = bv_width(sorts[0])?;
            w.checked_add(indices[0])
                .map(Sort::BitVec)
                .ok_or_else(|| bad_indices(sorts[0]))
        }
        Ite => {
            if !sorts[0].is_condition() {
                return Err(SortError::Operand {
                    kind,
                    sort: sorts[0],
                });
            }
            same(sorts[1], sorts[2])
        }
    }
}

/// Returns whether two terms are identical: same node, or same structure
///
/// Symbols are identified by their name and sort.
pub fn is_x_y(a: &Term, b: &Term) -> bool {
    let mut to_compare: Vec<(&Term, &Term)> = vec![(a, b)];
    let mut compared = FxHashSet::default();
    while let Some((x, y)) = to_compare.pop() {
        if x.id() == y.id() || !compared.insert((x.id(), y.id())) {
            continue;
        }
        if x.kind() != y.kind()
            || x.sort() != y.sort()
            || x.indices() != y.indices()
            || x.name() != y.name()
            || x.literal() != y.literal()
        {
            return false;
        }
        to_compare.extend(zip(x.children().iter(), y.children().iter()));
    }
    true
}

/// Returns whether one term is the negation of the other, looking through one negation
pub fn is_x_not_y(a: &Term, b: &Term) -> bool {
    if let Some(na) = a.negated() {
        if is_x_y(na, b) {
            return true;
        }
    }
    if let Some(nb) = b.negated() {
        if is_x_y(a, nb) {
            return true;
        }
    }
    false
}

/// Maximum nesting printed before switching to node identities
const DISPLAY_DEPTH: usize = 16;

fn write_term(f: &mut fmt::Formatter<'_>, t: &Term, depth: usize) -> fmt::Result {
    match t.kind() {
        Kind::Constant | Kind::Variable => write!(f, "{}", t.name().unwrap_or("?")),
        Kind::Value => match t.literal() {
            Some(l) => write!(f, "{l}"),
            None => write!(f, "?"),
        },
        kind => {
            if depth == 0 {
                return write!(f, "{}", t.id());
            }
            if t.indices().is_empty() {
                write!(f, "({kind}")?;
            } else {
                write!(f, "((_ {kind} {})", t.indices().iter().join(" "))?;
            }
            for c in t.children() {
                write!(f, " ")?;
                write_term(f, c, depth - 1)?;
            }
            write!(f, ")")
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_term(f, self, DISPLAY_DEPTH)
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id(), self)
    }
}
