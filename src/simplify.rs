//! Simplification of terms
//!
//! Terms are simplified bottom-up by a [`TermEvaluator`], which calls a [`Rewriter`]
//! once for each distinct node. The default [`Simplifier`] folds nodes whose operands
//! are all literals, then applies a fixed set of algebraic rules: identity and
//! absorbing elements, idempotence, complements, absorption, distributivity, double
//! negation and De Morgan's laws, and merging of adjacent bit slices.
//!
//! ```
//! # use bvsimp::term::{Sort, Term};
//! use bvsimp::simplify::simplify;
//! let x = Term::constant("x", Sort::BitVec(8));
//! let hi = Term::extract(&x, 7, 4);
//! let lo = Term::extract(&x, 3, 0);
//! let t = Term::concat(&hi, &lo);
//! assert_eq!(simplify(&t).unwrap().to_string(), "((_ extract 7 0) x)");
//! ```
//!
//! The simplified term is equivalent to the original one, but is not minimal: rules
//! are only applied once per node, and the terms they build are not simplified again.

pub mod constant_propagation;
mod evaluator;
mod simplifier;

pub use evaluator::{evaluate, simplify, TermEvaluator};
pub use simplifier::{canonical_order, Rewriter, Simplifier};
