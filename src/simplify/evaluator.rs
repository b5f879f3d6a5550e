use log::{debug, trace};

use crate::error::EvaluationError;
use crate::simplify::{Rewriter, Simplifier};
use crate::term::{Term, TermMap};

/// Bottom-up simplification of a whole term
///
/// Nodes are visited operands first, and each distinct node is simplified exactly
/// once, no matter how many parents share it. The first failure aborts the
/// evaluation.
///
/// ```
/// # use bvsimp::term::{Sort, Term, TermMap};
/// use bvsimp::simplify::TermEvaluator;
/// let x = Term::constant("x", Sort::BitVec(4));
/// let t = Term::bvand(&x, &Term::bvnot(&Term::bvnot(&x)));
/// let mut evaluator = TermEvaluator::new();
/// let simplified = evaluator.evaluate(&t, &TermMap::default()).unwrap();
/// assert_eq!(simplified.id(), x.id());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TermEvaluator<R: Rewriter = Simplifier> {
    rewriter: R,
}

impl TermEvaluator<Simplifier> {
    /// Create an evaluator with the default simplification rules
    pub fn new() -> TermEvaluator<Simplifier> {
        TermEvaluator::with_rewriter(Simplifier::new())
    }
}

impl<R: Rewriter> TermEvaluator<R> {
    /// Create an evaluator applying a custom rewriter to each node
    pub fn with_rewriter(rewriter: R) -> TermEvaluator<R> {
        TermEvaluator { rewriter }
    }

    /// Access the rewriter
    pub fn rewriter(&self) -> &R {
        &self.rewriter
    }

    /// Simplify a term
    ///
    /// Nodes that are keys of `partial` are not explored: they are replaced by the
    /// associated term, presumed to be already simplified.
    pub fn evaluate(&mut self, root: &Term, partial: &TermMap<Term>) -> Result<Term, EvaluationError> {
        let order = root.post_order_until(|t| partial.contains_key(&t.id()));
        let mut simplified = TermMap::<Term>::default();
        let mut last = None;
        for node in &order {
            if simplified.contains_key(&node.id()) || partial.contains_key(&node.id()) {
                continue;
            }
            let mut operands = Vec::with_capacity(node.children().len());
            for c in node.children() {
                let s = match simplified.get(&c.id()) {
                    Some(s) => Some(s),
                    None => replacement(partial, c)?,
                };
                let s = s.ok_or(EvaluationError::MissingOperand {
                    parent: node.id(),
                    child: c.id(),
                })?;
                operands.push(s.clone());
            }
            let ret = self
                .rewriter
                .simplify(node, operands)
                .map_err(|source| EvaluationError::Aborted {
                    id: node.id(),
                    term: node.to_string(),
                    source,
                })?;
            trace!("Simplified {} into {}", node.id(), ret.id());
            simplified.insert(node.id(), ret.clone());
            last = Some(ret);
        }
        debug!(
            "Simplified {} nodes, {} given as already simplified",
            simplified.len(),
            order.len() - simplified.len()
        );
        match last {
            Some(t) => Ok(t),
            None => replacement(partial, root)?
                .cloned()
                .ok_or(EvaluationError::MissingOperand {
                    parent: root.id(),
                    child: root.id(),
                }),
        }
    }
}

/// Term given in place of a node, which must have the sort of the node
fn replacement<'a>(partial: &'a TermMap<Term>, t: &Term) -> Result<Option<&'a Term>, EvaluationError> {
    match partial.get(&t.id()) {
        Some(r) if r.sort() != t.sort() => Err(EvaluationError::PartialSort {
            id: t.id(),
            expected: t.sort(),
            actual: r.sort(),
        }),
        r => Ok(r),
    }
}

/// Simplify a term with the default rules
///
/// See [`TermEvaluator::evaluate`].
pub fn evaluate(root: &Term, partial: &TermMap<Term>) -> Result<Term, EvaluationError> {
    TermEvaluator::new().evaluate(root, partial)
}

/// Simplify a term with the default rules, from scratch
pub fn simplify(root: &Term) -> Result<Term, EvaluationError> {
    evaluate(root, &TermMap::default())
}
