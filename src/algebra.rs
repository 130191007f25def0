//! Per-rule evaluators parameterising the joint DP (§4.1).
//!
//! An [`Algebra`] is a record of pure functions, one per grammar rule, plus a
//! selector (`opt`) and a formatter (`finalize`). The DP engine in
//! [`crate::dp`] is generic over any `Algebra` impl and never looks inside a
//! witness — it only ever calls these methods. This mirrors how
//! `perm_lookup`'s accumulators are evaluated per-row without the caller
//! knowing the internal recurrence.

use crate::cm::{Cm, StateID};
use crate::score::BitScore;

/// Single-nucleotide emission: `(nucleotide, score)`.
pub type SingleEmission = (char, BitScore);
/// Paired emission: `(left nucleotide, right nucleotide, score)`.
pub type PairEmission = (char, char, BitScore);

/// A capability set of per-rule evaluators over witness type `Witness`.
///
/// `opt` and `finalize` are the only two methods that see more than one
/// witness (or format one for the outside world); every other method
/// consumes exactly the child witness(es) of one grammar rule and produces
/// the parent witness.
pub trait Algebra {
    type Witness: Clone + PartialEq;

    fn end(&self, cm: &Cm, k: StateID) -> Self::Witness;
    fn lbegin(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness;
    fn start(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness;
    fn delete(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness;
    fn match_pair(&self, cm: &Cm, k: StateID, t: BitScore, e: PairEmission, s: Self::Witness) -> Self::Witness;
    fn match_left(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness;
    fn insert_left(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness;
    fn match_right(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness;
    fn insert_right(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness;
    fn branch(&self, cm: &Cm, k: StateID, s: Self::Witness, t: Self::Witness) -> Self::Witness;

    /// Marks a witness as having taken the synthetic local-end jump out of
    /// `k` (§6 output grammar's `_` end marker). Purely cosmetic: it must
    /// never change a witness's score contribution, so every scoring
    /// algebra implements this as the identity.
    fn lend(&self, cm: &Cm, k: StateID, s: Self::Witness) -> Self::Witness;

    /// Collapses a list of joint witnesses (one per model) to the co-optima.
    fn opt(&self, xs: Vec<(Self::Witness, Self::Witness)>) -> Vec<(Self::Witness, Self::Witness)>;

    fn finalize(&self, w: &Self::Witness) -> String;
}

/// Score algebra: witness is the accumulated [`BitScore`]; `opt` keeps the
/// single joint witness maximising `min(a1, a2)`.
///
/// Tie-breaking (an Open Question in the source spec) is pinned here: among
/// witnesses tied on `min(a1, a2)`, the first one encountered in `xs` wins.
/// Every caller builds `xs` by enumerating transitions/emissions in a fixed
/// order, so this is deterministic across runs without needing to inspect
/// the child state ids directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaxMin;

impl Algebra for MaxMin {
    type Witness = BitScore;

    fn end(&self, _cm: &Cm, _k: StateID) -> BitScore {
        BitScore::ZERO
    }
    fn lbegin(&self, _cm: &Cm, _k: StateID, t: BitScore, s: BitScore) -> BitScore {
        t + s
    }
    fn start(&self, _cm: &Cm, _k: StateID, t: BitScore, s: BitScore) -> BitScore {
        t + s
    }
    fn delete(&self, _cm: &Cm, _k: StateID, t: BitScore, s: BitScore) -> BitScore {
        t + s
    }
    fn match_pair(&self, _cm: &Cm, _k: StateID, t: BitScore, e: PairEmission, s: BitScore) -> BitScore {
        t + e.2 + s
    }
    fn match_left(&self, _cm: &Cm, _k: StateID, t: BitScore, e: SingleEmission, s: BitScore) -> BitScore {
        t + e.1 + s
    }
    fn insert_left(&self, _cm: &Cm, _k: StateID, t: BitScore, e: SingleEmission, s: BitScore) -> BitScore {
        t + e.1 + s
    }
    fn match_right(&self, _cm: &Cm, _k: StateID, t: BitScore, e: SingleEmission, s: BitScore) -> BitScore {
        t + e.1 + s
    }
    fn insert_right(&self, _cm: &Cm, _k: StateID, t: BitScore, e: SingleEmission, s: BitScore) -> BitScore {
        t + e.1 + s
    }
    fn branch(&self, _cm: &Cm, _k: StateID, s: BitScore, t: BitScore) -> BitScore {
        s + t
    }

    fn lend(&self, _cm: &Cm, _k: StateID, s: BitScore) -> BitScore {
        s
    }

    fn opt(&self, xs: Vec<(BitScore, BitScore)>) -> Vec<(BitScore, BitScore)> {
        let mut best: Option<(BitScore, BitScore)> = None;
        for (a1, a2) in xs {
            let m = a1.min(a2);
            match best {
                Some((b1, b2)) if m <= b1.min(b2) => {}
                _ => best = Some((a1, a2)),
            }
        }
        best.into_iter().collect()
    }

    fn finalize(&self, w: &BitScore) -> String {
        w.to_string()
    }
}

/// Nucleotide-string algebra: witness is the emitted sequence fragment.
/// `opt = id`: a string-only algebra cannot choose between candidates, so
/// co-optima enumeration is left to the product (§4.2).
#[derive(Debug, Default, Clone, Copy)]
pub struct RnaString;

impl Algebra for RnaString {
    type Witness = String;

    fn end(&self, _cm: &Cm, _k: StateID) -> String {
        String::new()
    }
    fn lbegin(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn start(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn delete(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn match_pair(&self, _cm: &Cm, _k: StateID, _t: BitScore, e: PairEmission, s: String) -> String {
        format!("{}{}{}", e.0, s, e.1)
    }
    fn match_left(&self, _cm: &Cm, _k: StateID, _t: BitScore, e: SingleEmission, s: String) -> String {
        format!("{}{}", e.0, s)
    }
    fn insert_left(&self, _cm: &Cm, _k: StateID, _t: BitScore, e: SingleEmission, s: String) -> String {
        format!("{}{}", e.0, s)
    }
    fn match_right(&self, _cm: &Cm, _k: StateID, _t: BitScore, e: SingleEmission, s: String) -> String {
        format!("{}{}", s, e.0)
    }
    fn insert_right(&self, _cm: &Cm, _k: StateID, _t: BitScore, e: SingleEmission, s: String) -> String {
        format!("{}{}", s, e.0)
    }
    fn branch(&self, _cm: &Cm, _k: StateID, s: String, t: String) -> String {
        format!("{}{}", s, t)
    }

    fn lend(&self, _cm: &Cm, _k: StateID, s: String) -> String {
        format!("{}_", s)
    }

    fn opt(&self, xs: Vec<(String, String)>) -> Vec<(String, String)> {
        xs
    }

    fn finalize(&self, w: &String) -> String {
        w.clone()
    }
}

/// Dot-bracket algebra: witness is the secondary-structure fragment aligned
/// 1:1 with [`RnaString`]'s output. `(`/`)` come only from `MP`; `.` marks a
/// matched single emission, `,` an inserted one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotBracket;

impl Algebra for DotBracket {
    type Witness = String;

    fn end(&self, _cm: &Cm, _k: StateID) -> String {
        String::new()
    }
    fn lbegin(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn start(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn delete(&self, _cm: &Cm, _k: StateID, _t: BitScore, s: String) -> String {
        s
    }
    fn match_pair(&self, _cm: &Cm, _k: StateID, _t: BitScore, _e: PairEmission, s: String) -> String {
        format!("({})", s)
    }
    fn match_left(&self, _cm: &Cm, _k: StateID, _t: BitScore, _e: SingleEmission, s: String) -> String {
        format!(".{}", s)
    }
    fn insert_left(&self, _cm: &Cm, _k: StateID, _t: BitScore, _e: SingleEmission, s: String) -> String {
        format!(",{}", s)
    }
    fn match_right(&self, _cm: &Cm, _k: StateID, _t: BitScore, _e: SingleEmission, s: String) -> String {
        format!("{}.", s)
    }
    fn insert_right(&self, _cm: &Cm, _k: StateID, _t: BitScore, _e: SingleEmission, s: String) -> String {
        format!("{},", s)
    }
    fn branch(&self, _cm: &Cm, _k: StateID, s: String, t: String) -> String {
        format!("{}{}", s, t)
    }

    fn lend(&self, _cm: &Cm, _k: StateID, s: String) -> String {
        format!("{}_", s)
    }

    fn opt(&self, xs: Vec<(String, String)>) -> Vec<(String, String)> {
        xs
    }

    fn finalize(&self, w: &String) -> String {
        w.clone()
    }
}

/// Visited-node-trace algebra: prepends the current state's [`NodeID`] at
/// every rule application. `opt = id`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisitedNodes;

impl Algebra for VisitedNodes {
    type Witness = Vec<crate::cm::NodeID>;

    fn end(&self, cm: &Cm, k: StateID) -> Self::Witness {
        vec![cm.node(k)]
    }
    fn lbegin(&self, cm: &Cm, k: StateID, _t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn start(&self, cm: &Cm, k: StateID, _t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn delete(&self, cm: &Cm, k: StateID, _t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn match_pair(&self, cm: &Cm, k: StateID, _t: BitScore, _e: PairEmission, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn match_left(&self, cm: &Cm, k: StateID, _t: BitScore, _e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn insert_left(&self, cm: &Cm, k: StateID, _t: BitScore, _e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn match_right(&self, cm: &Cm, k: StateID, _t: BitScore, _e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn insert_right(&self, cm: &Cm, k: StateID, _t: BitScore, _e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(cm.node(k), s)
    }
    fn branch(&self, cm: &Cm, k: StateID, s: Self::Witness, t: Self::Witness) -> Self::Witness {
        let mut v = vec![cm.node(k)];
        v.extend(s);
        v.extend(t);
        v
    }

    fn lend(&self, _cm: &Cm, _k: StateID, s: Self::Witness) -> Self::Witness {
        s
    }

    fn opt(&self, xs: Vec<(Self::Witness, Self::Witness)>) -> Vec<(Self::Witness, Self::Witness)> {
        xs
    }

    fn finalize(&self, w: &Self::Witness) -> String {
        let body = w.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(",");
        format!("[{}]", body)
    }
}

fn prepend<T>(head: T, mut tail: Vec<T>) -> Vec<T> {
    tail.insert(0, head);
    tail
}

/// Verbose per-state trace algebra: one formatted row per rule application,
/// columns `Label State Node Trans Emis`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtendedOutput;

impl ExtendedOutput {
    const HEADER: &'static str = "Label\tState\tNode\tTrans\tEmis";

    fn row(cm: &Cm, label: &str, k: StateID, trans: BitScore, emis: String) -> String {
        format!("{}\t{}\t{}\t{}\t{}", label, k, cm.node(k), trans, emis)
    }
}

impl Algebra for ExtendedOutput {
    type Witness = Vec<String>;

    fn end(&self, cm: &Cm, k: StateID) -> Self::Witness {
        vec![Self::row(cm, "END", k, BitScore::ZERO, "-".into())]
    }
    fn lbegin(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "LBEGIN", k, t, "-".into()), s)
    }
    fn start(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "START", k, t, "-".into()), s)
    }
    fn delete(&self, cm: &Cm, k: StateID, t: BitScore, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "DELETE", k, t, "-".into()), s)
    }
    fn match_pair(&self, cm: &Cm, k: StateID, t: BitScore, e: PairEmission, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "MATCHP", k, t, format!("{}{}:{}", e.0, e.1, e.2)), s)
    }
    fn match_left(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "MATCHL", k, t, format!("{}:{}", e.0, e.1)), s)
    }
    fn insert_left(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "INSERTL", k, t, format!("{}:{}", e.0, e.1)), s)
    }
    fn match_right(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "MATCHR", k, t, format!("{}:{}", e.0, e.1)), s)
    }
    fn insert_right(&self, cm: &Cm, k: StateID, t: BitScore, e: SingleEmission, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "INSERTR", k, t, format!("{}:{}", e.0, e.1)), s)
    }
    fn branch(&self, cm: &Cm, k: StateID, s: Self::Witness, t: Self::Witness) -> Self::Witness {
        let mut v = vec![Self::row(cm, "BRANCH", k, BitScore::ZERO, "-".into())];
        v.extend(s);
        v.extend(t);
        v
    }

    fn lend(&self, cm: &Cm, k: StateID, s: Self::Witness) -> Self::Witness {
        prepend(Self::row(cm, "LEND", k, cm.local_end(k), "-".into()), s)
    }

    fn opt(&self, xs: Vec<(Self::Witness, Self::Witness)>) -> Vec<(Self::Witness, Self::Witness)> {
        xs
    }

    fn finalize(&self, w: &Self::Witness) -> String {
        let mut out = String::from(Self::HEADER);
        for row in w {
            out.push('\n');
            out.push_str(row);
        }
        out
    }
}
