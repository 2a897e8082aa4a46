//! In-memory record of every input a run accepted, in order. Together
//! with the seed and the starting profile this is enough to rebuild the
//! whole run, since everything else the core does is deterministic.

use serde::{Deserialize, Serialize};

use crate::profile_file::PlayerProfile;
use crate::types::{PlayerCommand, UpgradeChoice};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandJournal {
    pub format_version: u16,
    pub build_id: String,
    pub seed: u64,
    /// Progression snapshot the run started from.
    pub starting_profile: PlayerProfile,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

/// One accepted input. Rejected or ignored commands are never journaled;
/// they have no effect to replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPayload {
    Command(PlayerCommand),
    Upgrade(UpgradeChoice),
}

impl CommandJournal {
    pub fn new(seed: u64, starting_profile: PlayerProfile) -> Self {
        Self {
            format_version: 1,
            build_id: "dev".to_string(),
            seed,
            starting_profile,
            inputs: Vec::new(),
        }
    }

    pub fn append(&mut self, seq: u64, payload: InputPayload) {
        self.inputs.push(InputRecord { seq, payload });
    }
}
