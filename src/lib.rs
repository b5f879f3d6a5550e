//! Symbolic simplification of bitvector and Boolean functions
//!
//! This crate simplifies the Boolean functions of logic gates, expressed as terms over
//! bitvectors and Booleans. Terms are built from the pin functions of a gate, with
//! symbols for the nets and placeholders they depend on, and are simplified into an
//! equivalent but usually smaller term.
//!
//! # Usage
//!
//! The library is the main interface. A small binary is provided as well, to check
//! the simplification engine on random terms:
//!
//! ```bash
//! # Show available commands
//! bvsimp help
//! # Simplify 1000 random terms and check them by simulation
//! bvsimp check --nb-terms 1000 --width 8
//! # Show a random term and its simplified form
//! bvsimp show --seed 4
//! ```
//!
//! # Datastructures
//!
//! A [`Term`] is an immutable node in a directed acyclic graph. Subterms are shared
//! between parents, and each node has a unique identity, [`TermId`].
//! Algorithms keep their results in maps keyed by identity, so that a shared node is
//! only processed once.
//!
//! Leaves are named symbols and literals. Literals may be Booleans or bitvectors of
//! any width. Operators follow SMT-LIB: Boolean connectives, bitwise and arithmetic
//! operators, slices and extensions, comparisons and if-then-else.
//!
//! ```
//! # use bvsimp::term::{Sort, Term};
//! use bvsimp::simplify::simplify;
//! let x = Term::constant("x", Sort::BitVec(4));
//! let y = Term::constant("y", Sort::BitVec(4));
//! let a = Term::bvor(&x, &y);
//! let b = Term::bvor(&y, &x);
//! let t = Term::bvxor(&a, &b);
//! assert!(simplify(&t).unwrap().is_zero());
//! ```
//!
//! # Simplification
//!
//! The [`TermEvaluator`] walks the term bottom-up and calls a [`Rewriter`] once per
//! node. The default rewriter, [`Simplifier`], folds literals and applies a fixed
//! set of algebraic rules. Errors are not recovered: the first node that cannot be
//! simplified aborts the evaluation, with the whole cause chain in the error.

#![warn(missing_docs)]

pub mod error;
pub mod sim;
pub mod simplify;
pub mod term;

pub use simplify::{evaluate, Rewriter, Simplifier, TermEvaluator};
pub use term::{stats, BitVec, Kind, Literal, Sort, Term, TermId, TermMap};
