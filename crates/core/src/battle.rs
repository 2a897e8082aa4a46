//! One battle instance: the five-state turn machine, command legality,
//! and the shared special-ability cooldown counter. The run loop owns
//! pacing, randomness, and progression sync; this module only resolves
//! single actions against the two checked-out stat bundles.

use crate::types::BattleState;
use crate::unit::UnitStats;

/// Resolved player actions (attack, heal, special) and resolved enemy
/// actions both advance the counter; the special needs this many.
pub const SPECIAL_COOLDOWN_TURNS: u32 = 3;

/// How a player command landed against the current battle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CommandResolution {
    /// Command arrived outside `PlayerTurn`; nothing changed.
    Ignored,
    /// Special requested before the cooldown elapsed; nothing changed.
    SpecialOnCooldown { turns_remaining: u32 },
    /// Attack or special connected.
    EnemyDamaged { damage: i32, special: bool, enemy_dead: bool },
    /// Heal resolved; the new HP still has to be written back to the store.
    Healed { amount: i32 },
}

/// What the enemy decided to do with its turn. Factored out of the RNG
/// roll so both branches are reachable in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyIntent {
    Attack,
    SelfHeal,
}

impl EnemyIntent {
    /// 50/50 split over a raw RNG draw.
    pub(crate) fn from_roll(roll: u32) -> Self {
        if roll & 1 == 0 { Self::SelfHeal } else { Self::Attack }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnemyResolution {
    Attacked { damage: i32, player_dead: bool },
    SelfHealed { amount: i32 },
}

/// Transient state of the battle currently being fought. Created at setup,
/// consumed by the win/loss resolution.
#[derive(Clone, Debug)]
pub struct Encounter {
    pub(crate) state: BattleState,
    pub(crate) player: UnitStats,
    pub(crate) enemy: UnitStats,
    pub(crate) is_boss_fight: bool,
    pub(crate) turns_since_special: u32,
}

impl Encounter {
    pub(crate) fn new(player: UnitStats, enemy: UnitStats, is_boss_fight: bool) -> Self {
        Self { state: BattleState::Start, player, enemy, is_boss_fight, turns_since_special: 0 }
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn player(&self) -> &UnitStats {
        &self.player
    }

    pub fn enemy(&self) -> &UnitStats {
        &self.enemy
    }

    pub fn is_boss_fight(&self) -> bool {
        self.is_boss_fight
    }

    pub fn turns_since_special(&self) -> u32 {
        self.turns_since_special
    }

    /// Whether the special would be accepted right now.
    pub fn special_ready(&self) -> bool {
        self.turns_since_special >= SPECIAL_COOLDOWN_TURNS
    }

    /// Hand control to the player (from setup or after the enemy acted).
    pub(crate) fn open_player_turn(&mut self) {
        self.state = BattleState::PlayerTurn;
    }

    pub(crate) fn attack(&mut self) -> CommandResolution {
        if self.state != BattleState::PlayerTurn {
            return CommandResolution::Ignored;
        }
        let damage = self.player.damage;
        let enemy_dead = self.enemy.take_damage(damage);
        self.turns_since_special += 1;
        self.state = if enemy_dead { BattleState::Won } else { BattleState::EnemyTurn };
        CommandResolution::EnemyDamaged { damage, special: false, enemy_dead }
    }

    pub(crate) fn special(&mut self) -> CommandResolution {
        if self.state != BattleState::PlayerTurn {
            return CommandResolution::Ignored;
        }
        if !self.special_ready() {
            return CommandResolution::SpecialOnCooldown {
                turns_remaining: SPECIAL_COOLDOWN_TURNS - self.turns_since_special,
            };
        }
        let damage = self.player.damage * 2;
        let enemy_dead = self.enemy.take_damage(damage);
        self.turns_since_special = 0;
        self.state = if enemy_dead { BattleState::Won } else { BattleState::EnemyTurn };
        CommandResolution::EnemyDamaged { damage, special: true, enemy_dead }
    }

    pub(crate) fn heal(&mut self, amount: i32) -> CommandResolution {
        if self.state != BattleState::PlayerTurn {
            return CommandResolution::Ignored;
        }
        self.player.heal(amount);
        self.turns_since_special += 1;
        self.state = BattleState::EnemyTurn;
        CommandResolution::Healed { amount }
    }

    /// Resolve the enemy's turn with an already-decided intent. A killing
    /// blow moves the battle to `Lost`; otherwise the caller hands the turn
    /// back to the player.
    pub(crate) fn apply_enemy_intent(
        &mut self,
        intent: EnemyIntent,
        self_heal_amount: i32,
    ) -> EnemyResolution {
        debug_assert_eq!(self.state, BattleState::EnemyTurn);
        self.turns_since_special += 1;
        match intent {
            EnemyIntent::Attack => {
                let damage = self.enemy.damage;
                let player_dead = self.player.take_damage(damage);
                if player_dead {
                    self.state = BattleState::Lost;
                }
                EnemyResolution::Attacked { damage, player_dead }
            }
            EnemyIntent::SelfHeal => {
                self.enemy.heal(self_heal_amount);
                EnemyResolution::SelfHealed { amount: self_heal_amount }
            }
        }
    }
}
