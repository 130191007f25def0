//! JSON covariance-model ingest.
//!
//! A `.cm.json` file is the on-disk serialization of a [`Cm`]: a flat array
//! of states plus `localBegin`/`localEnd` maps. Nothing in [`crate::cm`] or
//! [`crate::dp`] parses files — this module is the thin loading/validation
//! layer that sits next to, but outside of, the core DP, mirroring how a
//! trusted-input file is loaded and checked once at the program boundary
//! before the core ever sees it.
//!
//! # Format
//!
//! ```json
//! {
//!   "name": "RF00005",
//!   "states": [ { "state_type": "S", "node": 0, "transitions": [[1, 0.0]] }, ... ],
//!   "local_begin": { "3": -2.1 },
//!   "local_end": { "7": -3.4 }
//! }
//! ```
//!
//! Raw score fields are plain `f64`; [`BitScore::from_raw`] maps the legacy
//! `-10000.0` missing-value sentinel to `NegInf` on the way in, so on-disk
//! data doesn't have to agree with this crate's `null`-free JSON schema for
//! [`BitScore`] itself.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cm::{Cm, NodeID, State, StateID, StateType};
use crate::error::CmError;
use crate::score::BitScore;

/// On-disk shape of a single transition: `[target_state, raw_score]`.
pub type RawTransition = (StateID, f64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawState {
    state_type: StateType,
    node: NodeID,
    transitions: Vec<RawTransition>,
    #[serde(default)]
    pair_emissions: Vec<(char, char, f64)>,
    #[serde(default)]
    single_emissions: Vec<(char, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCm {
    name: String,
    states: Vec<RawState>,
    #[serde(default)]
    local_begin: HashMap<StateID, f64>,
    #[serde(default)]
    local_end: HashMap<StateID, f64>,
}

/// Loads and validates a covariance model from a JSON file.
///
/// Wraps I/O and parse failures as [`CmError::InputParse`]; the returned
/// [`Cm`] has already passed [`Cm::validate`], so callers can feed it
/// straight into [`crate::dp::run`] without re-checking shape.
pub fn load(path: impl AsRef<Path>) -> Result<Cm, CmError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| CmError::InputParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load_str(&text).map_err(|e| match e {
        CmError::InputParse { reason, .. } => {
            CmError::InputParse { path: path.display().to_string(), reason }
        }
        other => other,
    })
}

/// Loads and validates a covariance model from a JSON string (the file-less
/// path used by tests and by callers that already have the bytes).
pub fn load_str(text: &str) -> Result<Cm, CmError> {
    let raw: RawCm = serde_json::from_str(text)
        .map_err(|e| CmError::InputParse { path: "<string>".into(), reason: e.to_string() })?;

    let states = raw
        .states
        .into_iter()
        .map(|s| State {
            state_type: s.state_type,
            node: s.node,
            transitions: s.transitions.into_iter().map(|(k, v)| (k, BitScore::from_raw(v))).collect(),
            pair_emissions: s.pair_emissions.into_iter().map(|(a, b, v)| (a, b, BitScore::from_raw(v))).collect(),
            single_emissions: s.single_emissions.into_iter().map(|(a, v)| (a, BitScore::from_raw(v))).collect(),
        })
        .collect();

    let local_begin = raw.local_begin.into_iter().map(|(k, v)| (k, BitScore::from_raw(v))).collect();
    let local_end = raw.local_end.into_iter().map(|(k, v)| (k, BitScore::from_raw(v))).collect();

    let cm = Cm::new(raw.name, states, local_begin, local_end);
    cm.validate()?;
    tracing::debug!(
        name = %cm.name,
        n_states = cm.n_states(),
        root = cm.root(),
        max_state = cm.max_state(),
        "loaded covariance model"
    );
    Ok(cm)
}
