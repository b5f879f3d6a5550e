use std::fmt;

/// Operator kinds of a term
///
/// Leaves are `Constant`, `Variable` and `Value`; every other kind has a fixed arity,
/// given by [`Kind::arity`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum Kind {
    /// Named free symbol, such as a fan-in net
    Constant,
    /// Named placeholder variable
    Variable,
    /// Literal Boolean or bitvector value
    Value,
    /// Boolean And
    And,
    /// Boolean Or
    Or,
    /// Boolean Not
    Not,
    /// Boolean Xor
    Xor,
    /// Bitwise And
    BvAnd,
    /// Bitwise Or
    BvOr,
    /// Bitwise Not
    BvNot,
    /// Bitwise Xor
    BvXor,
    /// Addition modulo 2^width
    BvAdd,
    /// Subtraction modulo 2^width
    BvSub,
    /// Multiplication modulo 2^width
    BvMul,
    /// Signed division
    BvSdiv,
    /// Unsigned division
    BvUdiv,
    /// Signed remainder
    BvSrem,
    /// Unsigned remainder
    BvUrem,
    /// Bit slice `[hi:lo]`
    BvExtract,
    /// Concatenation, first operand in the most significant bits
    BvConcat,
    /// Extension with zeros
    BvZeroExtend,
    /// Extension with copies of the sign bit
    BvSignExtend,
    /// Equality of two operands of the same sort
    Equal,
    /// Signed less or equal
    BvSle,
    /// Signed less than
    BvSlt,
    /// Unsigned less or equal
    BvUle,
    /// Unsigned less than
    BvUlt,
    /// If-then-else
    Ite,
    /// Two's complement negation
    BvNeg,
    /// Shift left
    BvShl,
    /// Logical shift right
    BvLshr,
    /// Arithmetic shift right
    BvAshr,
}

impl Kind {
    /// Number of operands of the kind
    pub fn arity(&self) -> usize {
        use Kind::*;
        match self {
            Constant | Variable | Value => 0,
            Not | BvNot | BvNeg | BvExtract | BvZeroExtend | BvSignExtend => 1,
            Ite => 3,
            _ => 2,
        }
    }

    /// Number of integer indices of the kind
    pub fn nb_indices(&self) -> usize {
        match self {
            Kind::BvExtract => 2,
            Kind::BvZeroExtend | Kind::BvSignExtend => 1,
            _ => 0,
        }
    }

    /// Returns whether the kind is a leaf
    pub fn is_leaf(&self) -> bool {
        self.arity() == 0
    }

    /// Returns whether the operands of the kind may be reordered
    pub fn is_commutative(&self) -> bool {
        use Kind::*;
        matches!(
            self,
            BvAnd | BvOr | BvXor | BvAdd | BvMul | Equal | And | Or | Xor
        )
    }

    /// Returns whether the kind is a negation, Boolean or bitwise
    pub fn is_not(&self) -> bool {
        matches!(self, Kind::Not | Kind::BvNot)
    }

    /// Name of the operator, following SMT-LIB
    pub fn name(&self) -> &'static str {
        use Kind::*;
        match self {
            Constant => "constant",
            Variable => "variable",
            Value => "value",
            And => "and",
            Or => "or",
            Not => "not",
            Xor => "xor",
            BvAnd => "bvand",
            BvOr => "bvor",
            BvNot => "bvnot",
            BvXor => "bvxor",
            BvAdd => "bvadd",
            BvSub => "bvsub",
            BvMul => "bvmul",
            BvSdiv => "bvsdiv",
            BvUdiv => "bvudiv",
            BvSrem => "bvsrem",
            BvUrem => "bvurem",
            BvExtract => "extract",
            BvConcat => "concat",
            BvZeroExtend => "zero_extend",
            BvSignExtend => "sign_extend",
            Equal => "=",
            BvSle => "bvsle",
            BvSlt => "bvslt",
            BvUle => "bvule",
            BvUlt => "bvult",
            Ite => "ite",
            BvNeg => "bvneg",
            BvShl => "bvshl",
            BvLshr => "bvlshr",
            BvAshr => "bvashr",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Kind;

    #[test]
    fn test_arity() {
        assert_eq!(Kind::Value.arity(), 0);
        assert_eq!(Kind::BvNot.arity(), 1);
        assert_eq!(Kind::BvExtract.arity(), 1);
        assert_eq!(Kind::BvConcat.arity(), 2);
        assert_eq!(Kind::Ite.arity(), 3);
        assert_eq!(Kind::BvExtract.nb_indices(), 2);
        assert_eq!(Kind::BvSignExtend.nb_indices(), 1);
        assert_eq!(Kind::BvAnd.nb_indices(), 0);
    }

    #[test]
    fn test_commutative() {
        assert!(Kind::BvAdd.is_commutative());
        assert!(Kind::Equal.is_commutative());
        assert!(!Kind::BvSub.is_commutative());
        assert!(!Kind::BvConcat.is_commutative());
        assert!(!Kind::Ite.is_commutative());
    }
}
