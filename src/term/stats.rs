//! Compute term statistics
//!
//! ```
//! # use bvsimp::term::{Sort, Term};
//! use bvsimp::term::stats::stats;
//! let x = Term::constant("x", Sort::BitVec(8));
//! let t = Term::bvadd(&x, &x);
//! let stats = stats(&t);
//!
//! // The shared operand is only counted once
//! assert_eq!(stats.nb_nodes, 2);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::term::{Kind, Term, TermMap};

/// Number of distinct nodes, leaves and operators in a term
#[derive(Clone, Debug)]
pub struct TermStats {
    /// Number of distinct nodes
    pub nb_nodes: usize,
    /// Number of distinct literals
    pub nb_literals: usize,
    /// Number of distinct symbols
    pub nb_symbols: usize,
    /// Length of the longest path from the root to a leaf
    pub depth: usize,
    /// Number of operator nodes of each kind
    pub operators: BTreeMap<Kind, usize>,
}

impl TermStats {
    /// Number of operator nodes
    pub fn nb_operators(&self) -> usize {
        self.operators.values().sum()
    }

    /// Number of operator nodes of a given kind
    pub fn nb_kind(&self, kind: Kind) -> usize {
        self.operators.get(&kind).copied().unwrap_or(0)
    }
}

impl fmt::Display for TermStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Nodes: {}", self.nb_nodes)?;
        writeln!(f, "  Depth: {}", self.depth)?;
        writeln!(f, "  Symbols: {}", self.nb_symbols)?;
        writeln!(f, "  Literals: {}", self.nb_literals)?;
        writeln!(f, "  Operators: {}", self.nb_operators())?;
        for (kind, nb) in &self.operators {
            writeln!(f, "      {}: {}", kind, nb)?;
        }
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of a term
pub fn stats(t: &Term) -> TermStats {
    let mut ret = TermStats {
        nb_nodes: 0,
        nb_literals: 0,
        nb_symbols: 0,
        depth: 0,
        operators: BTreeMap::new(),
    };
    let mut depths = TermMap::<usize>::default();
    for n in t.post_order() {
        ret.nb_nodes += 1;
        let depth = match n.kind() {
            Kind::Value => {
                ret.nb_literals += 1;
                0
            }
            Kind::Constant | Kind::Variable => {
                ret.nb_symbols += 1;
                0
            }
            kind => {
                *ret.operators.entry(kind).or_insert(0) += 1;
                1 + n
                    .children()
                    .iter()
                    .map(|c| depths[&c.id()])
                    .max()
                    .unwrap_or(0)
            }
        };
        depths.insert(n.id(), depth);
    }
    ret.depth = depths[&t.id()];
    ret
}
