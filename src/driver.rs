//! Picks an algebra (or product), runs the DP, and renders the root cell
//! (§4.4, §6). This is the only module that knows about the CLI-facing
//! algebra names and the output line format; [`crate::dp`] never sees a
//! string.

use crate::algebra::{Algebra, DotBracket, ExtendedOutput, MaxMin, RnaString, VisitedNodes};
use crate::cm::{Cm, StateID};
use crate::dp;
use crate::product::Product;
use crate::score::BitScore;

/// Which algebra (or product) to run, named the way the CLI spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgebraSelector {
    Score,
    Rna,
    Bracket,
    Nodes,
    Extended,
    /// `score+rna+bracket`: the product named explicitly by testable
    /// property 4 (string/bracket consistency under the scored product).
    ScoreRnaBracket,
    /// `score+rna+bracket+nodes`: the full canonical output line of §6,
    /// with every auxiliary field populated.
    Full,
}

impl std::str::FromStr for AlgebraSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "score" => Ok(Self::Score),
            "rna" => Ok(Self::Rna),
            "bracket" => Ok(Self::Bracket),
            "nodes" => Ok(Self::Nodes),
            "extended" => Ok(Self::Extended),
            "score+rna+bracket" => Ok(Self::ScoreRnaBracket),
            "score+rna+bracket+nodes" | "full" => Ok(Self::Full),
            other => Err(format!(
                "unknown algebra `{other}` (expected one of: score, rna, bracket, nodes, \
                 extended, score+rna+bracket, score+rna+bracket+nodes)"
            )),
        }
    }
}

/// Root-cell options for a comparison; defaults to each CM's own root (0).
#[derive(Debug, Clone, Copy, Default)]
pub struct RootOverride {
    pub root1: Option<StateID>,
    pub root2: Option<StateID>,
}

/// The rendered result of one comparison: either a single §6 output line or
/// the multi-line `extendedOutput` table.
#[derive(Debug, Clone)]
pub enum CompareOutput {
    Line(String),
    Table(String),
}

impl std::fmt::Display for CompareOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOutput::Line(s) | CompareOutput::Table(s) => write!(f, "{s}"),
        }
    }
}

/// Runs the joint DP for `(cm1, cm2)` under the selected algebra and renders
/// the root cell's co-optimum as the driver's output.
///
/// An empty co-optima list at the root (`UnreachableRoot`, §7) is not an
/// error: it renders as `minScore = -inf` with empty auxiliary fields.
pub fn compare(
    cm1: &Cm,
    cm2: &Cm,
    selector: AlgebraSelector,
    fast_ins: bool,
    roots: RootOverride,
) -> CompareOutput {
    let root1 = roots.root1.unwrap_or_else(|| cm1.root());
    let root2 = roots.root2.unwrap_or_else(|| cm2.root());

    match selector {
        AlgebraSelector::Score => {
            let (min, s1, s2) = run_score_only(cm1, cm2, fast_ins, root1, root2);
            CompareOutput::Line(render_line(cm1, cm2, min, s1, s2, None, None, None, None))
        }
        AlgebraSelector::Rna => {
            let tables = dp::run(&RnaString, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            let rna = root.first().map(|(v1, _)| RnaString.finalize(v1));
            CompareOutput::Line(render_line(cm1, cm2, BitScore::NegInf, BitScore::NegInf, BitScore::NegInf, rna, None, None, None))
        }
        AlgebraSelector::Bracket => {
            let tables = dp::run(&DotBracket, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            let bracket = root.first().map(|(v1, _)| DotBracket.finalize(v1));
            CompareOutput::Line(render_line(cm1, cm2, BitScore::NegInf, BitScore::NegInf, BitScore::NegInf, None, bracket, None, None))
        }
        AlgebraSelector::Nodes => {
            let tables = dp::run(&VisitedNodes, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            let (n1, n2) = match root.first() {
                Some((v1, v2)) => (Some(VisitedNodes.finalize(v1)), Some(VisitedNodes.finalize(v2))),
                None => (None, None),
            };
            CompareOutput::Line(render_line(cm1, cm2, BitScore::NegInf, BitScore::NegInf, BitScore::NegInf, None, None, n1, n2))
        }
        AlgebraSelector::Extended => {
            let tables = dp::run(&ExtendedOutput, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            let text = match root.first() {
                Some((v1, v2)) => format!("{}\n\n{}", ExtendedOutput.finalize(v1), ExtendedOutput.finalize(v2)),
                None => "(unreachable root)".to_string(),
            };
            CompareOutput::Table(text)
        }
        AlgebraSelector::ScoreRnaBracket => {
            let alg = Product::new(Product::new(MaxMin, RnaString), DotBracket);
            let tables = dp::run(&alg, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            match root.first() {
                Some(((v1_score_rna, v1_bracket), (v2_score_rna, v2_bracket))) => {
                    let (s1, rna1) = v1_score_rna.clone();
                    let (s2, _rna2) = v2_score_rna.clone();
                    let min = s1.min(s2);
                    CompareOutput::Line(render_line(
                        cm1,
                        cm2,
                        min,
                        s1,
                        s2,
                        Some(rna1),
                        Some(v1_bracket.clone()),
                        None,
                        None,
                    ))
                }
                None => CompareOutput::Line(render_line(
                    cm1,
                    cm2,
                    BitScore::NegInf,
                    BitScore::NegInf,
                    BitScore::NegInf,
                    None,
                    None,
                    None,
                    None,
                )),
            }
        }
        AlgebraSelector::Full => {
            let alg = Product::new(Product::new(Product::new(MaxMin, RnaString), DotBracket), VisitedNodes);
            let tables = dp::run(&alg, cm1, cm2, fast_ins);
            let root = tables.root(root1, root2);
            match root.first() {
                Some((((v1_score_rna, v1_bracket), v1_nodes), ((v2_score_rna, _v2_bracket), v2_nodes))) => {
                    let (s1, rna1) = v1_score_rna.clone();
                    let (s2, _rna2) = v2_score_rna.clone();
                    let min = s1.min(s2);
                    CompareOutput::Line(render_line(
                        cm1,
                        cm2,
                        min,
                        s1,
                        s2,
                        Some(rna1),
                        Some(v1_bracket.clone()),
                        Some(VisitedNodes.finalize(v1_nodes)),
                        Some(VisitedNodes.finalize(v2_nodes)),
                    ))
                }
                None => CompareOutput::Line(render_line(
                    cm1,
                    cm2,
                    BitScore::NegInf,
                    BitScore::NegInf,
                    BitScore::NegInf,
                    None,
                    None,
                    None,
                    None,
                )),
            }
        }
    }
}

/// `score`-only path: runs `MaxMin` directly rather than through a
/// single-element product, and reports `(minScore, score1, score2)`.
fn run_score_only(
    cm1: &Cm,
    cm2: &Cm,
    fast_ins: bool,
    root1: StateID,
    root2: StateID,
) -> (BitScore, BitScore, BitScore) {
    let tables = dp::run(&MaxMin, cm1, cm2, fast_ins);
    let root = tables.root(root1, root2);
    match root.first() {
        Some(&(s1, s2)) => (s1.min(s2), s1, s2),
        None => (BitScore::NegInf, BitScore::NegInf, BitScore::NegInf),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_line(
    cm1: &Cm,
    cm2: &Cm,
    min_score: BitScore,
    score1: BitScore,
    score2: BitScore,
    rna: Option<String>,
    bracket: Option<String>,
    nodes1: Option<String>,
    nodes2: Option<String>,
) -> String {
    let mut fields = vec![cm1.name.clone(), cm2.name.clone(), min_score.to_string(), score1.to_string(), score2.to_string()];
    if let Some(rna) = rna {
        fields.push(rna);
    }
    if let Some(bracket) = bracket {
        fields.push(bracket);
    }
    if let Some(nodes1) = nodes1 {
        fields.push(nodes1);
    }
    if let Some(nodes2) = nodes2 {
        fields.push(nodes2);
    }
    let line = fields.join("  ");
    tracing::info!(cm1 = %cm1.name, cm2 = %cm2.name, %min_score, %score1, %score2, "comparison complete");
    line
}
