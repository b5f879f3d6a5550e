use std::fmt;

/// Sort of a term: Boolean or bitvector of a given width
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Sort {
    /// Boolean
    Bool,
    /// Bitvector with a non-zero number of bits
    BitVec(u32),
}

impl Sort {
    /// Returns whether the sort is Boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Sort::Bool)
    }

    /// Width of a bitvector sort, None for Boolean
    pub fn width(&self) -> Option<u32> {
        match self {
            Sort::Bool => None,
            Sort::BitVec(w) => Some(*w),
        }
    }

    /// Returns whether a term of this sort can be used as an if-then-else condition
    pub fn is_condition(&self) -> bool {
        matches!(self, Sort::Bool | Sort::BitVec(1))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::BitVec(w) => write!(f, "(_ BitVec {w})"),
        }
    }
}
