//! The run orchestrator: owns the progression store, the encounter roster,
//! the seeded RNG, and the battle instance currently being fought.
//!
//! The core never sleeps. Every automatic step (enemy turn, victory and
//! defeat bookkeeping, the next battle's setup) is queued as a pending
//! phase and surfaced to the frontend as `Waiting::ForResume { delay_ms }`;
//! the frontend honors the pacing delay, then calls `resume()`. Commands
//! are accepted only at a `Waiting::ForCommand` boundary and are silent
//! no-ops everywhere else, so no two actions can ever be in flight at once.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::battle::{CommandResolution, Encounter, EnemyIntent, EnemyResolution};
use crate::encounter::Roster;
use crate::progression::{Progression, RunConfig};
use crate::types::{BattleEvent, BattleState, PlayerCommand, UpgradeChoice, Waiting, pacing};
use crate::unit::UnitStats;

pub const PLAYER_NAME: &str = "Hero";

/// A queued automatic step and the narrative delay owed before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    OpenPlayerTurn { delay_ms: u64 },
    EnemyAction { delay_ms: u64 },
    ResolveVictory { delay_ms: u64 },
    ResolveDefeat { delay_ms: u64 },
    NextBattle { delay_ms: u64 },
    CompleteRun { delay_ms: u64 },
}

impl Pending {
    fn delay_ms(self) -> u64 {
        match self {
            Self::OpenPlayerTurn { delay_ms }
            | Self::EnemyAction { delay_ms }
            | Self::ResolveVictory { delay_ms }
            | Self::ResolveDefeat { delay_ms }
            | Self::NextBattle { delay_ms }
            | Self::CompleteRun { delay_ms } => delay_ms,
        }
    }
}

pub struct Run {
    seed: u64,
    rng: ChaCha8Rng,
    roster: Roster,
    progression: Progression,
    encounter: Encounter,
    pending: Option<Pending>,
    completed: bool,
    battles_won: u32,
    battles_lost: u32,
    log: Vec<BattleEvent>,
    next_input_seq: u64,
}

impl Run {
    /// Set up the first battle: check the player out of the store, field an
    /// opponent, and announce the encounter. The first player turn opens
    /// after the intro pacing via `resume()`.
    pub fn new(seed: u64, roster: Roster, progression: Progression) -> Self {
        let mut run = Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            roster,
            progression,
            // Placeholder, replaced by start_battle before anyone observes it.
            encounter: Encounter::new(
                UnitStats {
                    name: PLAYER_NAME.to_string(),
                    level: 1,
                    damage: 1,
                    max_hp: 1,
                    current_hp: 1,
                },
                UnitStats { name: String::new(), level: 1, damage: 1, max_hp: 1, current_hp: 1 },
                false,
            ),
            pending: None,
            completed: false,
            battles_won: 0,
            battles_lost: 0,
            log: Vec::new(),
            next_input_seq: 0,
        };
        run.start_battle();
        run
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &RunConfig {
        self.progression.config()
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn encounter(&self) -> &Encounter {
        &self.encounter
    }

    pub fn battles_won(&self) -> u32 {
        self.battles_won
    }

    pub fn battles_lost(&self) -> u32 {
        self.battles_lost
    }

    /// Sequence number for the next accepted input, used by the journal.
    pub fn next_input_seq(&self) -> u64 {
        self.next_input_seq
    }

    pub fn log(&self) -> &[BattleEvent] {
        &self.log
    }

    /// The current decision point.
    pub fn waiting(&self) -> Waiting {
        if self.completed {
            return Waiting::RunComplete;
        }
        match self.pending {
            Some(pending) => Waiting::ForResume { delay_ms: pending.delay_ms() },
            None => Waiting::ForCommand,
        }
    }

    /// Submit a player command. Legal only at `Waiting::ForCommand`; in any
    /// other state the command is dropped without touching anything. The
    /// returned `Waiting` tells the frontend whether the input was consumed
    /// (a consumed command always queues an automatic step).
    pub fn submit(&mut self, command: PlayerCommand) -> Waiting {
        if self.completed || self.pending.is_some() {
            return self.waiting();
        }

        let resolution = match command {
            PlayerCommand::Attack => self.encounter.attack(),
            PlayerCommand::Special => self.encounter.special(),
            PlayerCommand::Heal => self.encounter.heal(self.config().heal_amount),
        };

        match resolution {
            CommandResolution::Ignored => {}
            CommandResolution::SpecialOnCooldown { turns_remaining } => {
                self.log.push(BattleEvent::SpecialRejected { turns_remaining });
            }
            CommandResolution::EnemyDamaged { damage, special, enemy_dead } => {
                self.log.push(BattleEvent::PlayerAttacked {
                    damage,
                    enemy_hp_after: self.encounter.enemy.current_hp,
                    special,
                });
                self.next_input_seq += 1;
                self.pending = Some(if enemy_dead {
                    Pending::ResolveVictory { delay_ms: pacing::PLAYER_ACTION_MS }
                } else {
                    Pending::EnemyAction { delay_ms: pacing::PLAYER_ACTION_MS }
                });
            }
            CommandResolution::Healed { amount } => {
                let hp_after = self.encounter.player.current_hp;
                // The store learns about the heal immediately, not just at
                // the battle-end sync.
                self.progression.record_current_hp(hp_after);
                self.log.push(BattleEvent::PlayerHealed { amount, player_hp_after: hp_after });
                self.next_input_seq += 1;
                self.pending = Some(Pending::EnemyAction { delay_ms: pacing::PLAYER_ACTION_MS });
            }
        }
        self.waiting()
    }

    /// Advance the queued automatic step. A no-op when nothing is pending.
    pub fn resume(&mut self) -> Waiting {
        if self.completed {
            return Waiting::RunComplete;
        }
        let Some(pending) = self.pending.take() else {
            return self.waiting();
        };

        match pending {
            Pending::OpenPlayerTurn { .. } => {
                self.encounter.open_player_turn();
            }
            Pending::EnemyAction { .. } => {
                let intent = EnemyIntent::from_roll(self.rng.next_u32());
                self.resolve_enemy_action(intent);
            }
            Pending::ResolveVictory { .. } => self.resolve_victory(),
            Pending::ResolveDefeat { .. } => self.resolve_defeat(),
            Pending::NextBattle { .. } => self.start_battle(),
            Pending::CompleteRun { .. } => {
                self.completed = true;
                self.log.push(BattleEvent::RunCompleted { player_level: self.progression.level });
            }
        }
        self.waiting()
    }

    /// Permanent upgrade picked by the offer collaborator. Non-blocking:
    /// callable at any point, mutates the store only, and a battle already
    /// in flight keeps its checked-out copy until the next setup sync.
    pub fn apply_upgrade(&mut self, choice: UpgradeChoice) {
        match choice {
            UpgradeChoice::Health => {
                let amount = self.config().upgrade_health_amount;
                self.progression.apply_upgrade_health(amount);
            }
            UpgradeChoice::Damage => {
                let amount = self.config().upgrade_damage_amount;
                self.progression.apply_upgrade_damage(amount);
            }
        }
        self.log.push(BattleEvent::UpgradeApplied { choice });
        self.next_input_seq += 1;
    }

    /// Determinism probe over everything that defines the run's future.
    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.next_input_seq);
        hasher.write_u32(self.battles_won);
        hasher.write_u32(self.battles_lost);

        hasher.write_i32(self.progression.level);
        hasher.write_i32(self.progression.damage);
        hasher.write_i32(self.progression.max_hp);
        hasher.write_i32(self.progression.current_hp);
        hasher.write_i32(self.progression.last_upgrade_threshold);

        hasher.write_u8(match self.encounter.state {
            BattleState::Start => 0,
            BattleState::PlayerTurn => 1,
            BattleState::EnemyTurn => 2,
            BattleState::Won => 3,
            BattleState::Lost => 4,
        });
        hasher.write_u32(self.encounter.turns_since_special);
        hasher.write_u8(u8::from(self.encounter.is_boss_fight));
        hasher.write_i32(self.encounter.player.current_hp);
        hasher.write_i32(self.encounter.enemy.current_hp);
        hasher.write_i32(self.encounter.enemy.level);
        hasher.write(self.encounter.enemy.name.as_bytes());

        hasher.finish()
    }

    fn resolve_enemy_action(&mut self, intent: EnemyIntent) {
        match self.encounter.apply_enemy_intent(intent, self.config().enemy_self_heal) {
            EnemyResolution::Attacked { damage, player_dead } => {
                self.log.push(BattleEvent::EnemyAttacked {
                    damage,
                    player_hp_after: self.encounter.player.current_hp,
                });
                if player_dead {
                    self.log.push(BattleEvent::BattleLost);
                    self.pending =
                        Some(Pending::ResolveDefeat { delay_ms: pacing::RESOLUTION_MS });
                } else {
                    self.pending =
                        Some(Pending::OpenPlayerTurn { delay_ms: pacing::ENEMY_ACTION_MS });
                }
            }
            EnemyResolution::SelfHealed { amount } => {
                self.log.push(BattleEvent::EnemySelfHealed {
                    amount,
                    enemy_hp_after: self.encounter.enemy.current_hp,
                });
                self.pending = Some(Pending::OpenPlayerTurn { delay_ms: pacing::ENEMY_ACTION_MS });
            }
        }
    }

    /// Victory bookkeeping, atomic with the `Won` transition: record the
    /// battle HP back, grant the reward, and resync the player's copy.
    fn resolve_victory(&mut self) {
        debug_assert_eq!(self.encounter.state, BattleState::Won);
        self.battles_won += 1;
        self.progression.record_current_hp(self.encounter.player.current_hp);
        self.progression.apply_victory(None);
        self.encounter.player = self.progression.checkout_unit(PLAYER_NAME);
        self.log.push(BattleEvent::BattleWon {
            levels_gained: self.config().levels_per_victory,
            player_level_after: self.progression.level,
        });

        if self.encounter.is_boss_fight {
            // Defeating the boss ends the run; no further battles.
            self.pending = Some(Pending::CompleteRun { delay_ms: pacing::RESOLUTION_MS });
            return;
        }

        if self.progression.should_trigger_upgrade() {
            self.log.push(BattleEvent::UpgradeOffered {
                health_amount: self.config().upgrade_health_amount,
                damage_amount: self.config().upgrade_damage_amount,
            });
        }
        self.pending = Some(Pending::NextBattle { delay_ms: pacing::NEXT_BATTLE_MS });
    }

    /// Defeat bookkeeping: the penalty lands on the store, the player copy
    /// resyncs (fully restored), and the run continues with a new battle.
    fn resolve_defeat(&mut self) {
        debug_assert_eq!(self.encounter.state, BattleState::Lost);
        self.battles_lost += 1;
        self.progression.apply_death_penalty();
        self.encounter.player = self.progression.checkout_unit(PLAYER_NAME);
        self.log.push(BattleEvent::DeathPenaltyApplied {
            level_after: self.progression.level,
            max_hp_after: self.progression.max_hp,
            damage_after: self.progression.damage,
        });
        self.pending = Some(Pending::NextBattle { delay_ms: pacing::NEXT_BATTLE_MS });
    }

    /// Discard the previous battle instance (if any) and set up the next
    /// one. Stat checkout and the encounter spawn happen together so no
    /// partial copy is ever observable.
    fn start_battle(&mut self) {
        let player = self.progression.checkout_unit(PLAYER_NAME);
        let (enemy, is_boss) = self.roster.spawn_encounter(
            self.progression.level,
            self.config().boss_level_threshold,
            &mut self.rng,
        );
        self.log.push(BattleEvent::EncounterStarted {
            enemy: enemy.name.clone(),
            enemy_level: enemy.level,
            is_boss,
        });
        self.encounter = Encounter::new(player, enemy, is_boss);
        self.pending = Some(Pending::OpenPlayerTurn { delay_ms: pacing::ENCOUNTER_INTRO_MS });
    }
}
