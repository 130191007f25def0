//! Algebra product (§4.2): combines two algebras into one over witness pairs
//! while preserving co-optimal witnesses.
//!
//! Each evaluator just runs the left algebra on the first component and the
//! right algebra on the second; `opt` is the interesting part — it selects
//! co-optima of `A` first, then enumerates `B`'s co-optima only within the
//! sublist that shares the winning `A`-witness (§4.2, §9 "Co-optimality
//! enumeration").

use crate::algebra::Algebra;
use crate::cm::{Cm, StateID};
use crate::score::BitScore;

/// The product of algebras `A` and `B`: `Witness = (A::Witness, B::Witness)`.
#[derive(Debug, Clone, Copy)]
pub struct Product<A, B> {
    pub a: A,
    pub b: B,
}

impl<A, B> Product<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

/// Projects a list of joint product-witness pairs onto their `A` components.
pub fn opt_project_a<A: Algebra, B: Algebra>(
    xs: &[((A::Witness, B::Witness), (A::Witness, B::Witness))],
) -> Vec<(A::Witness, A::Witness)> {
    xs.iter().map(|(l, r)| (l.0.clone(), r.0.clone())).collect()
}

/// Projects a sublist onto their `B` components (after `A` has been fixed).
pub fn opt_project_b<A: Algebra, B: Algebra>(
    xs: &[((A::Witness, B::Witness), (A::Witness, B::Witness))],
) -> Vec<(B::Witness, B::Witness)> {
    xs.iter().map(|(l, r)| (l.1.clone(), r.1.clone())).collect()
}

impl<A: Algebra, B: Algebra> Algebra for Product<A, B> {
    type Witness = (A::Witness, B::Witness);

    fn end(&self, cm: &Cm, k: StateID) -> Self::Witness {
        (self.a.end(cm, k), self.b.end(cm, k))
    }
    fn lbegin(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        (self.a.lbegin(cm, k, t, s.0), self.b.lbegin(cm, k, t, s.1))
    }
    fn start(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        (self.a.start(cm, k, t, s.0), self.b.start(cm, k, t, s.1))
    }
    fn delete(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        (self.a.delete(cm, k, t, s.0), self.b.delete(cm, k, t, s.1))
    }
    fn match_pair(
        &self,
        cm: &Cm,
        k: StateID,
        t: BitScore,
        e: crate::algebra::PairEmission,
        s: Self::Witness,
    ) -> Self::Witness {
        (self.a.match_pair(cm, k, t, e, s.0), self.b.match_pair(cm, k, t, e, s.1))
    }
    fn match_left(
        &self,
        cm: &Cm,
        k: StateID,
        t: BitScore,
        e: crate::algebra::SingleEmission,
        s: Self::Witness,
    ) -> Self::Witness {
        (self.a.match_left(cm, k, t, e, s.0), self.b.match_left(cm, k, t, e, s.1))
    }
    fn insert_left(
        &self,
        cm: &Cm,
        k: StateID,
        t: BitScore,
        e: crate::algebra::SingleEmission,
        s: Self::Witness,
    ) -> Self::Witness {
        (self.a.insert_left(cm, k, t, e, s.0), self.b.insert_left(cm, k, t, e, s.1))
    }
    fn match_right(
        &self,
        cm: &Cm,
        k: StateID,
        t: BitScore,
        e: crate::algebra::SingleEmission,
        s: Self::Witness,
    ) -> Self::Witness {
        (self.a.match_right(cm, k, t, e, s.0), self.b.match_right(cm, k, t, e, s.1))
    }
    fn insert_right(
        &self,
        cm: &Cm,
        k: StateID,
        t: BitScore,
        e: crate::algebra::SingleEmission,
        s: Self::Witness,
    ) -> Self::Witness {
        (self.a.insert_right(cm, k, t, e, s.0), self.b.insert_right(cm, k, t, e, s.1))
    }
    fn branch(&self, cm: &Cm, k: StateID, s: Self::Witness, t: Self::Witness) -> Self::Witness {
        (self.a.branch(cm, k, s.0, t.0), self.b.branch(cm, k, s.1, t.1))
    }
    fn lend(&self, cm: &Cm, k: StateID, s: Self::Witness) -> Self::Witness {
        (self.a.lend(cm, k, s.0), self.b.lend(cm, k, s.1))
    }

    fn opt(&self, xs: Vec<(Self::Witness, Self::Witness)>) -> Vec<(Self::Witness, Self::Witness)> {
        let proj_a = opt_project_a::<A, B>(&xs);
        let a_opts = self.a.opt(proj_a);

        let mut seen: Vec<(A::Witness, A::Witness)> = Vec::new();
        let mut out = Vec::new();
        for a_opt in a_opts {
            if seen.contains(&a_opt) {
                continue;
            }
            seen.push(a_opt.clone());

            let sub: Vec<((A::Witness, B::Witness), (A::Witness, B::Witness))> = xs
                .iter()
                .filter(|(l, r)| l.0 == a_opt.0 && r.0 == a_opt.1)
                .cloned()
                .collect();
            let proj_b = opt_project_b::<A, B>(&sub);
            let b_opts = self.b.opt(proj_b);

            for b_opt in b_opts {
                out.push(((a_opt.0.clone(), b_opt.0), (a_opt.1.clone(), b_opt.1)));
            }
        }
        out
    }

    fn finalize(&self, w: &Self::Witness) -> String {
        format!("{}\t{}", self.a.finalize(&w.0), self.b.finalize(&w.1))
    }
}
