//! Read-only covariance-model data model and accessor.
//!
//! A [`Cm`] is an immutable value: a dense array of [`State`]s keyed by
//! [`StateID`], plus `localBegin`/`localEnd` score maps. Nothing here parses
//! `.cm` files — that is [`crate::cmfile`]'s job — this module only owns the
//! shape, the §3 invariants, and read access for the DP engine.

use crate::error::CmError;
use crate::score::BitScore;

/// Dense non-negative state identifier. State 0 is the root.
pub type StateID = usize;
/// Dense non-negative node identifier.
pub type NodeID = usize;

/// Single-nucleotide alphabet, fixed order, shared by every CM compared.
pub const ALPHABET: [char; 4] = ['A', 'C', 'G', 'U'];

/// Canonical 16-entry pair alphabet (row-major cross product of
/// [`ALPHABET`] with itself): AA, AC, AG, AU, CA, ..., UU.
pub const PAIR_ALPHABET: [(char, char); 16] = [
    ('A', 'A'), ('A', 'C'), ('A', 'G'), ('A', 'U'),
    ('C', 'A'), ('C', 'C'), ('C', 'G'), ('C', 'U'),
    ('G', 'A'), ('G', 'C'), ('G', 'G'), ('G', 'U'),
    ('U', 'A'), ('U', 'C'), ('U', 'G'), ('U', 'U'),
];

/// Tagged state type. `EL` (local end) has no dedicated variant: the DP
/// models it implicitly via a sentinel transition appended to each state's
/// transition list (see [`crate::dp`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StateType {
    S,
    D,
    MP,
    ML,
    IL,
    MR,
    IR,
    B,
    E,
}

impl StateType {
    pub fn is_left_emitter(self) -> bool {
        matches!(self, StateType::ML | StateType::IL)
    }
    pub fn is_right_emitter(self) -> bool {
        matches!(self, StateType::MR | StateType::IR)
    }
}

/// A single CM state: its type, owning node, transitions, and emissions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct State {
    pub state_type: StateType,
    pub node: NodeID,
    /// `(child_id, transition_score)`, ordered; exactly 2 entries for a `B`
    /// state (left, right), non-empty for every type except `E`.
    pub transitions: Vec<(StateID, BitScore)>,
    /// 16 `(c1, c2, score)` entries in [`PAIR_ALPHABET`] order; only
    /// populated for `MP` states.
    #[serde(default)]
    pub pair_emissions: Vec<(char, char, BitScore)>,
    /// 4 `(c, score)` entries in [`ALPHABET`] order; only populated for
    /// `ML`/`IL`/`MR`/`IR` states.
    #[serde(default)]
    pub single_emissions: Vec<(char, BitScore)>,
}

/// A read-only covariance model: dense states plus local begin/end maps.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Cm {
    pub name: String,
    states: Vec<State>,
    #[serde(default)]
    local_begin: std::collections::HashMap<StateID, BitScore>,
    #[serde(default)]
    local_end: std::collections::HashMap<StateID, BitScore>,
}

impl Cm {
    pub fn new(
        name: impl Into<String>,
        states: Vec<State>,
        local_begin: std::collections::HashMap<StateID, BitScore>,
        local_end: std::collections::HashMap<StateID, BitScore>,
    ) -> Self {
        Self { name: name.into(), states, local_begin, local_end }
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// The unique sink `E` state: the maximum state id.
    pub fn max_state(&self) -> StateID {
        self.states.len() - 1
    }

    pub fn root(&self) -> StateID {
        0
    }

    pub fn state(&self, k: StateID) -> &State {
        &self.states[k]
    }

    pub fn state_type(&self, k: StateID) -> StateType {
        self.states[k].state_type
    }

    pub fn node(&self, k: StateID) -> NodeID {
        self.states[k].node
    }

    /// `localBegin[k]`, or the `-inf` sentinel if absent.
    pub fn local_begin(&self, k: StateID) -> BitScore {
        self.local_begin.get(&k).copied().unwrap_or(BitScore::NegInf)
    }

    /// `localEnd[k]`, or the `-inf` sentinel if absent.
    pub fn local_end(&self, k: StateID) -> BitScore {
        self.local_end.get(&k).copied().unwrap_or(BitScore::NegInf)
    }

    /// Validates the §3 shape invariants. Called once at ingest.
    pub fn validate(&self) -> Result<(), CmError> {
        if self.states.is_empty() {
            return Err(CmError::ModelShape {
                state: 0,
                context: "cm",
                reason: "a CM must have at least one state".into(),
            });
        }
        let max = self.max_state();
        if self.states[max].state_type != StateType::E {
            return Err(CmError::ModelShape {
                state: max,
                context: "max-id state",
                reason: "the state at the maximum id must be of type E".into(),
            });
        }
        for (k, s) in self.states.iter().enumerate() {
            match s.state_type {
                StateType::E => {
                    if !s.transitions.is_empty() {
                        return Err(CmError::ModelShape {
                            state: k,
                            context: "E state",
                            reason: "an E state must have no outgoing transitions".into(),
                        });
                    }
                }
                StateType::B => {
                    if s.transitions.len() != 2 {
                        return Err(CmError::ModelShape {
                            state: k,
                            context: "B state",
                            reason: format!(
                                "a B state must have exactly two transitions (left, right), got {}",
                                s.transitions.len()
                            ),
                        });
                    }
                    check_targets_strictly_greater(k, &s.transitions, false)?;
                    check_targets_in_range(k, &s.transitions, self.states.len())?;
                }
                _ => {
                    if s.transitions.is_empty() {
                        return Err(CmError::ModelShape {
                            state: k,
                            context: "non-B, non-E state",
                            reason: "transitions must be non-empty".into(),
                        });
                    }
                    // IL/IR states are the one place a transition may target
                    // its own state (the insert self-loop); every other
                    // target, and every other state type, must strictly
                    // increase the id.
                    let allow_self = matches!(s.state_type, StateType::IL | StateType::IR);
                    check_targets_strictly_greater(k, &s.transitions, allow_self)?;
                    check_targets_in_range(k, &s.transitions, self.states.len())?;
                }
            }
            match s.state_type {
                StateType::MP => {
                    if s.pair_emissions.len() != 16 {
                        return Err(CmError::ModelShape {
                            state: k,
                            context: "MP state",
                            reason: format!(
                                "pair emission vector must have 16 entries, got {}",
                                s.pair_emissions.len()
                            ),
                        });
                    }
                }
                StateType::ML | StateType::IL | StateType::MR | StateType::IR => {
                    if s.single_emissions.len() != 4 {
                        return Err(CmError::ModelShape {
                            state: k,
                            context: "emitting state",
                            reason: format!(
                                "single emission vector must have 4 entries, got {}",
                                s.single_emissions.len()
                            ),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn check_targets_strictly_greater(
    k: StateID,
    transitions: &[(StateID, BitScore)],
    allow_self: bool,
) -> Result<(), CmError> {
    for &(c, _) in transitions {
        if c == k && allow_self {
            continue;
        }
        if c <= k {
            return Err(CmError::ModelShape {
                state: k,
                context: "transition target",
                reason: format!("transition to state {} does not strictly increase the id", c),
            });
        }
    }
    Ok(())
}

/// Rejects a transition target `>= n_states`: strictly-increasing alone
/// lets a target past the last real state slip through `validate`, and the
/// DP engine indexes `arr[c1][c2]` on the assumption every child id is in
/// range (§7 `ModelShapeError`; a corrupted CM that instead reached the DP
/// engine unvalidated would hit `CmError::InternalInvariant` there instead).
fn check_targets_in_range(k: StateID, transitions: &[(StateID, BitScore)], n: usize) -> Result<(), CmError> {
    for &(c, _) in transitions {
        if c >= n {
            return Err(CmError::ModelShape {
                state: k,
                context: "transition target",
                reason: format!("transition to state {c} is out of range (CM has {n} states)"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A single MP-only node emitting exactly (c1, c2): S -> MP -> E.
    pub fn single_mp_cm(name: &str, c1: char, c2: char, score: f64) -> Cm {
        let mut pair_emissions: Vec<(char, char, BitScore)> = PAIR_ALPHABET
            .iter()
            .map(|&(a, b)| (a, b, BitScore::NegInf))
            .collect();
        let idx = PAIR_ALPHABET.iter().position(|&p| p == (c1, c2)).unwrap();
        pair_emissions[idx].2 = BitScore::Finite(score);

        let states = vec![
            State {
                state_type: StateType::S,
                node: 0,
                transitions: vec![(1, BitScore::ZERO)],
                pair_emissions: vec![],
                single_emissions: vec![],
            },
            State {
                state_type: StateType::MP,
                node: 1,
                transitions: vec![(2, BitScore::ZERO)],
                pair_emissions,
                single_emissions: vec![],
            },
            State {
                state_type: StateType::E,
                node: 2,
                transitions: vec![],
                pair_emissions: vec![],
                single_emissions: vec![],
            },
        ];
        // Real CM files always give the root a usable entry score (global mode:
        // beginsc[0] = log(1) = 0); locarr wraps every cell through lbegin
        // uniformly, so a root with no localBegin entry would default to -inf.
        let mut local_begin = HashMap::new();
        local_begin.insert(0, BitScore::ZERO);
        Cm::new(name, states, local_begin, HashMap::new())
    }

    #[test]
    fn validates_well_formed_cm() {
        let cm = single_mp_cm("toy", 'A', 'U', 4.0);
        assert!(cm.validate().is_ok());
    }

    #[test]
    fn rejects_transition_target_past_the_last_state() {
        // 2 strictly increases past state 0, but the CM only has 2 states
        // (ids 0, 1): a naive strictly-increasing check alone would accept
        // this and let the DP engine index `arr[2][..]` out of bounds.
        let bad = Cm::new(
            "bad",
            vec![
                State {
                    state_type: StateType::S,
                    node: 0,
                    transitions: vec![(2, BitScore::ZERO)],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
                State {
                    state_type: StateType::E,
                    node: 1,
                    transitions: vec![],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
            ],
            HashMap::new(),
            HashMap::new(),
        );
        assert!(matches!(bad.validate(), Err(CmError::ModelShape { .. })));
    }

    #[test]
    fn rejects_b_state_without_two_transitions() {
        let bad = Cm::new(
            "bad",
            vec![
                State {
                    state_type: StateType::B,
                    node: 0,
                    transitions: vec![(1, BitScore::ZERO)],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
                State {
                    state_type: StateType::E,
                    node: 1,
                    transitions: vec![],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
            ],
            HashMap::new(),
            HashMap::new(),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_non_strictly_increasing_transition() {
        let bad = Cm::new(
            "bad",
            vec![
                State {
                    state_type: StateType::S,
                    node: 0,
                    transitions: vec![(0, BitScore::ZERO)],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
                State {
                    state_type: StateType::E,
                    node: 1,
                    transitions: vec![],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
            ],
            HashMap::new(),
            HashMap::new(),
        );
        assert!(bad.validate().is_err());
    }

    #[test]
    fn missing_local_begin_end_is_neg_inf() {
        let cm = single_mp_cm("toy", 'A', 'U', 4.0);
        // Only state 0 (the root) gets a usable localBegin by convention;
        // every other state, and every localEnd, defaults to -inf here.
        assert!(cm.local_begin(1).is_neg_inf());
        assert!(cm.local_end(0).is_neg_inf());
    }

    #[test]
    fn accepts_insert_state_self_loop() {
        let cm = Cm::new(
            "ins",
            vec![
                State {
                    state_type: StateType::S,
                    node: 0,
                    transitions: vec![(1, BitScore::ZERO)],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
                State {
                    state_type: StateType::IL,
                    node: 0,
                    transitions: vec![(1, BitScore::ZERO), (2, BitScore::ZERO)],
                    pair_emissions: vec![],
                    single_emissions: vec![
                        ('A', BitScore::ZERO),
                        ('C', BitScore::ZERO),
                        ('G', BitScore::ZERO),
                        ('U', BitScore::ZERO),
                    ],
                },
                State {
                    state_type: StateType::E,
                    node: 1,
                    transitions: vec![],
                    pair_emissions: vec![],
                    single_emissions: vec![],
                },
            ],
            HashMap::new(),
            HashMap::new(),
        );
        assert!(cm.validate().is_ok());
    }
}
