//! Crate-wide error taxonomy (§7: `InputParseError`, `ModelShapeError`,
//! `InternalInvariant`; `UnreachableRoot` is deliberately *not* a variant
//! here — it is a reportable DP outcome, not a failure, and is rendered by
//! [`crate::driver`] as `minScore = -inf` with empty witnesses).

use thiserror::Error;

use crate::cm::StateID;

#[derive(Debug, Error)]
pub enum CmError {
    #[error("failed to parse CM input `{path}`: {reason}")]
    InputParse { path: String, reason: String },

    #[error("state {state} ({context}) violates CM shape invariant: {reason}")]
    ModelShape { state: StateID, context: &'static str, reason: String },

    /// Reserved for a `Cm` that reaches `dp::run` without having passed
    /// `Cm::validate` — every validated `Cm` has in-range transition targets
    /// by construction, so a validated pair can never trigger this.
    #[error("DP cell ({k1}, {k2}) referenced out of range (n1={n1}, n2={n2})")]
    InternalInvariant { k1: usize, k2: usize, n1: usize, n2: usize },
}
