//! Rebuild a run from its journal. The core is deterministic given the
//! seed and the starting profile, so feeding the recorded inputs back in
//! at each command boundary must land on the same state; divergence means
//! the journal does not belong to this build or content.

use crate::encounter::Roster;
use crate::journal::{CommandJournal, InputPayload};
use crate::progression::RunConfig;
use crate::run::Run;
use crate::types::Waiting;

#[derive(Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// A journaled command was rejected by the run; the journal diverges
    /// from this build's behavior.
    RejectedInput { seq: u64 },
    /// Inputs remained after the run completed.
    ExtraInput { seq: u64 },
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayResult {
    /// Where the run stands after the last journaled input: mid-run at a
    /// command boundary for an interrupted journal, or complete.
    pub final_waiting: Waiting,
    pub final_snapshot_hash: u64,
    pub battles_won: u32,
    pub battles_lost: u32,
}

pub fn replay_to_end(
    journal: &CommandJournal,
    roster: Roster,
    config: RunConfig,
) -> Result<ReplayResult, ReplayError> {
    let progression = journal.starting_profile.clone().into_progression(config);
    let mut run = Run::new(journal.seed, roster, progression);
    let mut inputs = journal.inputs.iter();

    loop {
        match run.waiting() {
            Waiting::ForResume { .. } => {
                run.resume();
            }
            Waiting::ForCommand => {
                let Some(record) = inputs.next() else {
                    return Ok(finish(&run));
                };
                match &record.payload {
                    InputPayload::Command(command) => {
                        // Only consumed commands were journaled; one bouncing
                        // off now means the replay has diverged.
                        if run.submit(*command) == Waiting::ForCommand {
                            return Err(ReplayError::RejectedInput { seq: record.seq });
                        }
                    }
                    InputPayload::Upgrade(choice) => {
                        run.apply_upgrade(*choice);
                    }
                }
            }
            Waiting::RunComplete => {
                if let Some(record) = inputs.next() {
                    return Err(ReplayError::ExtraInput { seq: record.seq });
                }
                return Ok(finish(&run));
            }
        }
    }
}

fn finish(run: &Run) -> ReplayResult {
    ReplayResult {
        final_waiting: run.waiting(),
        final_snapshot_hash: run.snapshot_hash(),
        battles_won: run.battles_won(),
        battles_lost: run.battles_lost(),
    }
}
