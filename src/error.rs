//! Error types of the term representation and the simplification engine
//!
//! Errors are layered: [`ConstantError`] is wrapped by [`SimplifyError`], which is
//! wrapped by [`EvaluationError`]. Nothing is recovered locally; the whole chain is
//! available through [`std::error::Error::source`].

use thiserror::Error;

use crate::term::{Kind, Sort, TermId};

/// Error returned when parsing a literal from text failed
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LiteralError {
    /// No digit at all
    #[error("empty binary literal")]
    Empty,

    /// A character other than 0 or 1
    #[error("invalid digit '{digit}' in binary literal \"{text}\"")]
    InvalidDigit {
        /// Text being parsed
        text: String,
        /// Offending character
        digit: char,
    },

    /// More digits than the maximum bitvector width
    #[error("binary literal with {0} digits is too wide")]
    TooWide(usize),
}

/// Error returned when building an ill-formed term
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SortError {
    /// Wrong number of operands for the kind
    #[error("{kind} expects {expected} operands, got {actual}")]
    Arity {
        /// Kind being built
        kind: Kind,
        /// Fixed arity of the kind
        expected: usize,
        /// Number of operands given
        actual: usize,
    },

    /// Wrong number of indices for the kind
    #[error("{kind} expects {expected} indices, got {actual}")]
    Indices {
        /// Kind being built
        kind: Kind,
        /// Number of indices of the kind
        expected: usize,
        /// Number of indices given
        actual: usize,
    },

    /// Operand sort not accepted by the kind
    #[error("{kind} cannot take an operand of sort {sort}")]
    Operand {
        /// Kind being built
        kind: Kind,
        /// Sort of the offending operand
        sort: Sort,
    },

    /// Operands whose sorts should be identical
    #[error("{kind} expects operands of the same sort, got {left} and {right}")]
    Mismatch {
        /// Kind being built
        kind: Kind,
        /// Sort of the first operand
        left: Sort,
        /// Sort of the second operand
        right: Sort,
    },

    /// Indices outside of the operand
    #[error("invalid indices {indices:?} for {kind} on an operand of sort {sort}")]
    BadIndices {
        /// Kind being built
        kind: Kind,
        /// Indices given
        indices: Vec<u32>,
        /// Sort of the operand
        sort: Sort,
    },

    /// Leaves are built with their dedicated constructors
    #[error("{0} is a leaf and cannot be built from operands")]
    Leaf(Kind),
}

/// Error returned by constant propagation
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstantError {
    /// An operand could not be read as the literal expected by the operation
    #[error("failed to extract value from {term} in {kind}")]
    ValueExtraction {
        /// Operation being folded
        kind: Kind,
        /// Printed form of the operand
        term: String,
    },

    /// Equality between a Boolean and a bitvector
    #[error("sort mismatch in {kind}: {left} and {right}")]
    SortMismatch {
        /// Operation being folded
        kind: Kind,
        /// Sort of the first operand
        left: Sort,
        /// Sort of the second operand
        right: Sort,
    },

    /// The operation has no constant folding
    #[error("not implemented for given node type {0}")]
    Unimplemented(Kind),
}

/// Error returned by the simplification of a single node
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SimplifyError {
    /// All operands were literals, but folding them failed
    #[error("constant propagation failed: {0}")]
    ConstantPropagation(#[from] ConstantError),

    /// No rewrite rule set exists for the kind
    #[error("not implemented for node kind {0}")]
    Unimplemented(Kind),

    /// Operands that cannot replace those of the node
    #[error("{kind} node {id} cannot take operands of sorts {actual:?}, expected {expected:?}")]
    BadOperands {
        /// Identity of the node
        id: TermId,
        /// Kind of the node
        kind: Kind,
        /// Sorts of the operands of the node
        expected: Vec<Sort>,
        /// Sorts of the operands given
        actual: Vec<Sort>,
    },
}

/// Error returned by the evaluation of a whole term
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EvaluationError {
    /// Simplification failed on a sub-expression
    #[error("cannot simplify sub-expression {term}")]
    Aborted {
        /// Identity of the node that failed
        id: TermId,
        /// Printed form of the node that failed
        term: String,
        /// Cause of the failure
        #[source]
        source: SimplifyError,
    },

    /// A replacement given for a node does not have the sort of the node
    #[error("node {id} of sort {expected} cannot be replaced by a term of sort {actual}")]
    PartialSort {
        /// Node being replaced
        id: TermId,
        /// Sort of the node
        expected: Sort,
        /// Sort of the replacement
        actual: Sort,
    },

    /// An operand was not simplified before its parent; this should never happen
    #[error("operand {child} of node {parent} was not simplified before its parent")]
    MissingOperand {
        /// Parent node
        parent: TermId,
        /// Operand without a simplified form
        child: TermId,
    },
}

/// Error returned by the reference simulation of a term
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SimulationError {
    /// A symbol has no value in the assignment
    #[error("no value assigned to {0}")]
    Unassigned(String),

    /// A symbol is assigned a value of the wrong sort
    #[error("value assigned to {name} has sort {actual}, expected {expected}")]
    WrongSort {
        /// Name of the symbol
        name: String,
        /// Sort of the symbol
        expected: Sort,
        /// Sort of the assigned value
        actual: Sort,
    },
}
