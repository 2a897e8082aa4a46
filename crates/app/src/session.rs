//! Frontend session state: tracks which events have been displayed,
//! whether an upgrade offer is waiting on the player, and which inputs
//! the run consumed (for the journal). The session never sleeps or reads
//! stdin itself; the binary owns both, which keeps this testable with
//! scripted input.

use battle_core::{BattleEvent, InputPayload, PlayerCommand, Run, UpgradeChoice, Waiting};

use crate::messages;

/// What the session needs from the outside world next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    /// An automatic step is queued; pace for `delay_ms`, then `resume()`.
    Pause { delay_ms: u64 },
    /// The battle waits on an action command.
    Action,
    /// An upgrade offer waits on a pick (takes precedence over actions).
    Upgrade,
    /// The run is over.
    Done,
}

#[derive(Default)]
pub struct Session {
    shown: usize,
    upgrade_pending: bool,
    /// Inputs the run consumed since the last drain, in order. The binary
    /// drains these into the journal file.
    pub accepted: Vec<InputPayload>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display lines for events not yet shown. Also notices a pending
    /// upgrade offer so `prompt` can surface it.
    pub fn drain_lines(&mut self, run: &Run) -> Vec<String> {
        let fresh = &run.log()[self.shown..];
        self.shown = run.log().len();
        for event in fresh {
            match event {
                BattleEvent::UpgradeOffered { .. } => self.upgrade_pending = true,
                BattleEvent::UpgradeApplied { .. } => self.upgrade_pending = false,
                _ => {}
            }
        }
        fresh.iter().map(messages::event_line).collect()
    }

    pub fn prompt(&self, run: &Run) -> Prompt {
        match run.waiting() {
            Waiting::RunComplete => Prompt::Done,
            Waiting::ForResume { delay_ms } => Prompt::Pause { delay_ms },
            Waiting::ForCommand if self.upgrade_pending => Prompt::Upgrade,
            Waiting::ForCommand => Prompt::Action,
        }
    }

    /// Feed one input line. Returns a feedback line for input the run never
    /// saw (unknown commands); everything else surfaces through events.
    pub fn handle_line(&mut self, run: &mut Run, line: &str) -> Option<String> {
        let trimmed = line.trim().to_ascii_lowercase();

        if self.upgrade_pending {
            let choice = match trimmed.as_str() {
                "1" | "h" | "health" => UpgradeChoice::Health,
                "2" | "d" | "damage" => UpgradeChoice::Damage,
                _ => return Some(messages::UPGRADE_PROMPT.to_string()),
            };
            run.apply_upgrade(choice);
            self.accepted.push(InputPayload::Upgrade(choice));
            self.upgrade_pending = false;
            return None;
        }

        let command = match trimmed.as_str() {
            "a" | "attack" => PlayerCommand::Attack,
            "h" | "heal" => PlayerCommand::Heal,
            "s" | "special" => PlayerCommand::Special,
            _ => return Some(messages::ACTION_PROMPT.to_string()),
        };

        // Commands that bounce (cooldown, wrong state) are not journaled;
        // a consumed command always queues an automatic step.
        if run.submit(command) != Waiting::ForCommand {
            self.accepted.push(InputPayload::Command(command));
        }
        None
    }
}
