use serde::{Deserialize, Serialize};

/// Lifecycle of a single battle instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleState {
    Start,
    PlayerTurn,
    EnemyTurn,
    Won,
    Lost,
}

/// A player decision, legal only while the battle is in `PlayerTurn`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Attack,
    Special,
    Heal,
}

/// Permanent stat bonus picked when an upgrade offer fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeChoice {
    Health,
    Damage,
}

/// What the run is waiting on after a command or `resume` call.
///
/// `ForResume` delays are presentational pacing only; the frontend owns
/// any timer and may collapse them to zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waiting {
    ForCommand,
    ForResume { delay_ms: u64 },
    RunComplete,
}

/// Structured record of everything state-affecting, drained by the frontend
/// for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleEvent {
    EncounterStarted { enemy: String, enemy_level: i32, is_boss: bool },
    PlayerAttacked { damage: i32, enemy_hp_after: i32, special: bool },
    SpecialRejected { turns_remaining: u32 },
    PlayerHealed { amount: i32, player_hp_after: i32 },
    EnemyAttacked { damage: i32, player_hp_after: i32 },
    EnemySelfHealed { amount: i32, enemy_hp_after: i32 },
    BattleWon { levels_gained: i32, player_level_after: i32 },
    BattleLost,
    DeathPenaltyApplied { level_after: i32, max_hp_after: i32, damage_after: i32 },
    UpgradeOffered { health_amount: i32, damage_amount: i32 },
    UpgradeApplied { choice: UpgradeChoice },
    RunCompleted { player_level: i32 },
}

/// Roster configuration defects. These are programmer/data errors caught at
/// construction, not runtime conditions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RosterError {
    MissingBoss,
    NoOrdinaryTemplates,
    BossNotLast,
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBoss => write!(f, "roster has no boss template"),
            Self::NoOrdinaryTemplates => write!(f, "roster has no ordinary template"),
            Self::BossNotLast => write!(f, "boss template must be the last roster entry"),
        }
    }
}

impl std::error::Error for RosterError {}

/// Narrative pacing, in milliseconds, carried on `Waiting::ForResume`.
/// Correctness never depends on these; tests collapse them to zero.
pub mod pacing {
    /// Pause after the encounter announcement, before the first player turn.
    pub const ENCOUNTER_INTRO_MS: u64 = 2000;
    /// Pause after a resolved player action, before the enemy acts.
    pub const PLAYER_ACTION_MS: u64 = 2000;
    /// Pause after the enemy acts, before control returns to the player.
    pub const ENEMY_ACTION_MS: u64 = 1000;
    /// Pause on a terminal banner before victory/defeat bookkeeping runs.
    pub const RESOLUTION_MS: u64 = 2000;
    /// Pause before the next battle instance is set up.
    pub const NEXT_BATTLE_MS: u64 = 2000;
}
