//! Term generators and templates

/// Random terms, used to exercise the simplification engine
pub mod random {
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    use crate::term::{BitVec, Kind, Literal, Sort, Term};

    /// Bitvector operators picked by the generator
    const BV_BINARY: [Kind; 7] = [
        Kind::BvAnd,
        Kind::BvOr,
        Kind::BvXor,
        Kind::BvAdd,
        Kind::BvSub,
        Kind::BvMul,
        Kind::BvAnd,
    ];

    /// Boolean operators picked by the generator
    const BOOL_BINARY: [Kind; 3] = [Kind::And, Kind::Or, Kind::Xor];

    /// Comparisons picked by the generator
    const COMPARISONS: [Kind; 4] = [Kind::BvSle, Kind::BvSlt, Kind::BvUle, Kind::BvUlt];

    /// Symbols used as leaves of the random terms
    pub fn symbols(nb_vars: usize, width: u32) -> (Vec<Term>, Vec<Term>) {
        let bv = (0..nb_vars)
            .map(|i| Term::constant(&format!("x{i}"), Sort::BitVec(width)))
            .collect();
        let bools = (0..nb_vars)
            .map(|i| Term::constant(&format!("b{i}"), Sort::Bool))
            .collect();
        (bv, bools)
    }

    /// Random literal of a sort, biased toward zero and all ones
    pub fn literal(rng: &mut SmallRng, sort: Sort) -> Literal {
        match sort {
            Sort::Bool => Literal::Bool(rng.gen()),
            Sort::BitVec(w) => match rng.gen_range(0..4) {
                0 => Literal::zero(sort),
                1 => Literal::ones(sort),
                2 => Literal::BitVec(BitVec::one(w)),
                _ => Literal::BitVec(BitVec::from_u64(w, rng.gen())),
            },
        }
    }

    /// Random assignment of values to symbols
    pub fn assignment(rng: &mut SmallRng, symbols: &[Term]) -> fxhash::FxHashMap<String, Literal> {
        symbols
            .iter()
            .map(|s| {
                let name = s.name().unwrap_or_default().to_string();
                (name, literal(rng, s.sort()))
            })
            .collect()
    }

    /// State of the generation: pools of already generated terms of each sort
    struct Generator {
        rng: SmallRng,
        width: u32,
        bv: Vec<Term>,
        bools: Vec<Term>,
    }

    impl Generator {
        /// Pick an existing term, sometimes its negation
        fn pick(&mut self, bool_sort: bool) -> Term {
            let pool = if bool_sort { &self.bools } else { &self.bv };
            let t = pool[self.rng.gen_range(0..pool.len())].clone();
            if self.rng.gen_ratio(1, 6) {
                if bool_sort {
                    Term::not(&t)
                } else {
                    Term::bvnot(&t)
                }
            } else {
                t
            }
        }

        /// Pick an operand of the same sort, often one that is already used nearby
        fn pick_related(&mut self, first: &Term, bool_sort: bool) -> Term {
            match self.rng.gen_range(0..8) {
                0 => first.clone(),
                1 => {
                    if bool_sort {
                        Term::not(first)
                    } else {
                        Term::bvnot(first)
                    }
                }
                2 => {
                    let sort = first.sort();
                    Term::value(literal(&mut self.rng, sort))
                }
                3 if !first.children().is_empty() && first.child(0).sort() == first.sort() => {
                    first.child(0).clone()
                }
                _ => self.pick(bool_sort),
            }
        }

        fn bv_node(&mut self) -> Term {
            let w = self.width;
            match self.rng.gen_range(0..16) {
                0 => Term::bvnot(&self.pick(false)),
                1 => {
                    let c = self.condition();
                    let a = self.pick(false);
                    let b = self.pick_related(&a, false);
                    Term::ite(&c, &a, &b)
                }
                2 if w > 1 => {
                    let a = self.pick(false);
                    let hi = self.rng.gen_range(0..w);
                    let lo = self.rng.gen_range(0..=hi);
                    let sl = Term::extract(&a, hi, lo);
                    let n = w - (hi - lo + 1);
                    if self.rng.gen() {
                        Term::sign_extend(&sl, n)
                    } else {
                        Term::zero_extend(&sl, n)
                    }
                }
                3 if w > 1 => {
                    // Split a term and put it back together
                    let a = self.pick(false);
                    let b = self.pick_related(&a, false);
                    let k = self.rng.gen_range(1..w);
                    let hi = Term::extract(&a, w - 1, k);
                    let lo = Term::extract(&b, k - 1, 0);
                    Term::concat(&hi, &lo)
                }
                4 if w > 1 => {
                    // Sign extension spelled out with the most significant bit
                    let a = self.pick(false);
                    let k = self.rng.gen_range(1..w);
                    let sl = Term::extract(&a, k - 1, 0);
                    let sign = Term::extract(&a, k - 1, k - 1);
                    let ext = Term::concat(&sign, &sl);
                    if k + 1 < w {
                        Term::zero_extend(&ext, w - k - 1)
                    } else {
                        ext
                    }
                }
                _ => {
                    let kind = *BV_BINARY.choose(&mut self.rng).unwrap_or(&Kind::BvAnd);
                    let a = self.pick(false);
                    let b = self.pick_related(&a, false);
                    let (a, b) = if self.rng.gen() { (a, b) } else { (b, a) };
                    Term::apply(kind, &[&a, &b], &[])
                }
            }
        }

        fn condition(&mut self) -> Term {
            if self.rng.gen() {
                self.pick(true)
            } else {
                let kind = *COMPARISONS.choose(&mut self.rng).unwrap_or(&Kind::BvUlt);
                let a = self.pick(false);
                let b = self.pick_related(&a, false);
                Term::apply(kind, &[&a, &b], &[])
            }
        }

        fn bool_node(&mut self) -> Term {
            match self.rng.gen_range(0..8) {
                0 => Term::not(&self.pick(true)),
                1 => {
                    let a = self.pick(false);
                    let b = self.pick_related(&a, false);
                    Term::equal(&a, &b)
                }
                2 => {
                    let c = self.condition();
                    let a = self.pick(true);
                    let b = self.pick_related(&a, true);
                    Term::ite(&c, &a, &b)
                }
                _ => {
                    let kind = *BOOL_BINARY.choose(&mut self.rng).unwrap_or(&Kind::And);
                    let a = self.pick(true);
                    let b = self.pick_related(&a, true);
                    let (a, b) = if self.rng.gen() { (a, b) } else { (b, a) };
                    Term::apply(kind, &[&a, &b], &[])
                }
            }
        }
    }

    /// Generate a random bitvector term with shared subterms
    ///
    /// The term is built over the given symbols, with `nb_nodes` operator nodes
    /// created in turn from the previously created ones. The symbols must include at
    /// least one bitvector and one Boolean symbol, all bitvectors of the same width.
    /// Only operators with constant folding are generated.
    pub fn random_term(bv_symbols: &[Term], bool_symbols: &[Term], nb_nodes: usize, seed: u64) -> Term {
        assert!(!bv_symbols.is_empty() && !bool_symbols.is_empty());
        let width = bv_symbols[0].width().unwrap_or(1);
        assert!(bv_symbols.iter().all(|s| s.sort() == Sort::BitVec(width)));
        assert!(bool_symbols.iter().all(|s| s.sort() == Sort::Bool));
        let mut gen = Generator {
            rng: SmallRng::seed_from_u64(seed),
            width,
            bv: bv_symbols.to_vec(),
            bools: bool_symbols.to_vec(),
        };
        let mut last = gen.bv[0].clone();
        for _ in 0..nb_nodes {
            if gen.rng.gen_ratio(1, 4) {
                let t = gen.bool_node();
                gen.bools.push(t);
            } else {
                last = gen.bv_node();
                gen.bv.push(last.clone());
            }
        }
        // Make sure the Boolean logic is reachable from the result
        let c = gen.bools[gen.bools.len() - 1].clone();
        let other = gen.pick(false);
        Term::ite(&c, &last, &other)
    }
}

/// Simple generators to test functionality
pub mod testcases {
    use crate::term::{Sort, Term};

    /// A long chain of bitwise negations, used to test very deep terms
    pub fn not_chain(depth: usize, width: u32) -> Term {
        let mut t = Term::constant("x", Sort::BitVec(width));
        for _ in 0..depth {
            t = Term::bvnot(&t);
        }
        t
    }

    /// A chain of diamonds: every level uses the previous one twice
    ///
    /// The number of paths grows exponentially with the depth, while the number of
    /// nodes is linear. Used to test that shared nodes are handled once.
    pub fn diamond_chain(depth: usize, width: u32) -> Term {
        let x = Term::constant("x", Sort::BitVec(width));
        let y = Term::constant("y", Sort::BitVec(width));
        let mut t = x;
        for _ in 0..depth {
            let left = Term::bvand(&t, &y);
            let right = Term::bvor(&t, &y);
            t = Term::bvxor(&left, &right);
        }
        t
    }

    /// Addition of two vectors, bit by bit with a ripple carry
    pub fn ripple_carry(width: u32) -> Term {
        assert!(width > 0);
        let a = Term::constant("a", Sort::BitVec(width));
        let b = Term::constant("b", Sort::BitVec(width));
        let mut c = Term::bv_u64(1, 0);
        let mut sum: Option<Term> = None;
        for i in 0..width {
            let ai = Term::extract(&a, i, i);
            let bi = Term::extract(&b, i, i);
            let axb = Term::bvxor(&ai, &bi);
            let s = Term::bvxor(&axb, &c);
            let g = Term::bvand(&ai, &bi);
            let p = Term::bvand(&axb, &c);
            c = Term::bvor(&g, &p);
            sum = Some(match sum {
                None => s,
                Some(lower) => Term::concat(&s, &lower),
            });
        }
        match sum {
            Some(s) => s,
            None => unreachable!(),
        }
    }
}
