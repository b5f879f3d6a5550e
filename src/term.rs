//! Representation and handling of bitvector and Boolean terms

pub mod generators;
mod kind;
mod literal;
mod sort;
pub mod stats;
mod term;

pub use kind::Kind;
pub use literal::{BitVec, Literal};
pub use sort::Sort;
pub use term::{is_x_not_y, is_x_y, Term, TermId, TermMap};
