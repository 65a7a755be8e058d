//! Snapshot serialization: full simulation state to/from JSON.
//!
//! A snapshot captures everything needed to resume a run: the clock,
//! the state aggregate, the config and the master seed. RNG streams are
//! derived per cycle from the seed, so nothing else needs saving.
//! Geography services are not part of a snapshot; the caller supplies
//! them again on restore.

use crate::{
    clock::SimClock,
    config::SimConfig,
    error::SimResult,
    state::SimState,
    types::RunId,
};
use serde::{Deserialize, Serialize};

/// Bump when the layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSnapshot {
    pub version: u32,
    pub run_id: RunId,
    pub seed: u64,
    pub clock: SimClock,
    pub config: SimConfig,
    pub state: SimState,
}

impl SimSnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn cycle(&self) -> u64 {
        self.state.cycle
    }
}
