//! Persistent player meta-state and the rules that turn battle outcomes
//! into stat changes. One `Progression` value is owned by the run that
//! orchestrates battles; it is the single source of truth for the player,
//! and battle instances check stats out at setup and back in at the end.

use crate::unit::UnitStats;

/// Run tunables. Defaults match the shipped balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Levels gained per victory when the encounter grants no override.
    pub levels_per_victory: i32,
    /// Flat amount stripped from level, max HP, and damage on defeat.
    pub death_penalty: i32,
    /// An upgrade offer fires each time the level crosses a multiple of this.
    pub upgrade_interval: i32,
    /// HP restored by the player's heal command.
    pub heal_amount: i32,
    /// Max-HP bonus of the health upgrade option.
    pub upgrade_health_amount: i32,
    /// Damage bonus of the damage upgrade option.
    pub upgrade_damage_amount: i32,
    /// The next spawn is the boss once the player's level reaches this.
    pub boss_level_threshold: i32,
    /// HP the enemy restores when its turn rolls a self-heal.
    pub enemy_self_heal: i32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            levels_per_victory: 5,
            death_penalty: 15,
            upgrade_interval: 10,
            heal_amount: 5,
            upgrade_health_amount: 10,
            upgrade_damage_amount: 5,
            boss_level_threshold: 50,
            enemy_self_heal: 8,
        }
    }
}

/// Authoritative player meta-stats carried between battles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    pub level: i32,
    pub damage: i32,
    pub max_hp: i32,
    pub current_hp: i32,
    /// Highest upgrade threshold already offered, so a multi-level jump
    /// fires at most one offer.
    pub last_upgrade_threshold: i32,
    config: RunConfig,
}

impl Progression {
    pub fn new(level: i32, damage: i32, max_hp: i32, current_hp: i32, config: RunConfig) -> Self {
        Self {
            level: level.max(1),
            damage: damage.max(1),
            max_hp: max_hp.max(1),
            current_hp: current_hp.clamp(0, max_hp.max(1)),
            last_upgrade_threshold: 0,
            config,
        }
    }

    /// Fresh first-run stats: level 1, damage 10, 100/100 HP.
    pub fn fresh(config: RunConfig) -> Self {
        Self::new(1, 10, 100, 100, config)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Hydrate the battle copy handed to a new battle instance.
    pub fn checkout_unit(&self, name: &str) -> UnitStats {
        UnitStats {
            name: name.to_string(),
            level: self.level,
            damage: self.damage,
            max_hp: self.max_hp,
            current_hp: self.current_hp,
        }
    }

    /// One battle won. `bonus_levels` overrides the flat reward when the
    /// encounter grants more; current HP is untouched (health persists
    /// between battles).
    pub fn apply_victory(&mut self, bonus_levels: Option<i32>) {
        let gain = match bonus_levels {
            Some(bonus) if bonus > 0 => bonus,
            _ => self.config.levels_per_victory,
        };
        self.level += gain;
        self.damage += 5;
        self.max_hp += 5;
    }

    /// One battle lost. Defeat is a setback, not game over: stats drop
    /// (floored at 1) and HP is fully restored.
    pub fn apply_death_penalty(&mut self) {
        let penalty = self.config.death_penalty;
        self.level = (self.level - penalty).max(1);
        self.max_hp = (self.max_hp - penalty).max(1);
        self.damage = (self.damage - penalty).max(1);
        self.current_hp = self.max_hp;
    }

    /// True at most once per newly crossed multiple of `upgrade_interval`,
    /// regardless of how many levels one victory granted. Updates the
    /// threshold watermark when it fires.
    pub fn should_trigger_upgrade(&mut self) -> bool {
        let interval = self.config.upgrade_interval;
        let next_threshold = (self.level / interval) * interval;
        if self.level >= interval && next_threshold > self.last_upgrade_threshold {
            self.last_upgrade_threshold = next_threshold;
            return true;
        }
        false
    }

    /// Health upgrade chosen by the offer collaborator. Never lifts
    /// current HP above the (new) maximum.
    pub fn apply_upgrade_health(&mut self, amount: i32) {
        self.max_hp += amount;
        self.current_hp = self.current_hp.min(self.max_hp);
    }

    /// Damage upgrade chosen by the offer collaborator.
    pub fn apply_upgrade_damage(&mut self, amount: i32) {
        self.damage += amount;
    }

    /// Write combat damage or healing back from the active battle. This and
    /// the death penalty are the only paths that move `current_hp`.
    pub fn record_current_hp(&mut self, hp: i32) {
        self.current_hp = hp.clamp(0, self.max_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Progression {
        Progression::fresh(RunConfig::default())
    }

    #[test]
    fn fresh_store_has_default_stats() {
        let p = store();
        assert_eq!((p.level, p.damage, p.max_hp, p.current_hp), (1, 10, 100, 100));
    }

    #[test]
    fn victory_grants_flat_reward_and_keeps_current_hp() {
        let mut p = store();
        p.record_current_hp(40);
        p.apply_victory(None);
        assert_eq!(p.level, 6);
        assert_eq!(p.damage, 15);
        assert_eq!(p.max_hp, 105);
        assert_eq!(p.current_hp, 40);
    }

    #[test]
    fn victory_bonus_levels_override_flat_reward() {
        let mut p = store();
        p.apply_victory(Some(12));
        assert_eq!(p.level, 13);
        // Non-positive bonus falls back to the flat reward.
        p.apply_victory(Some(0));
        assert_eq!(p.level, 18);
    }

    #[test]
    fn death_penalty_floors_at_one_and_restores_hp() {
        let mut p = Progression::new(10, 12, 20, 3, RunConfig::default());
        p.apply_death_penalty();
        assert_eq!(p.level, 1);
        assert_eq!(p.damage, 1);
        assert_eq!(p.max_hp, 5);
        assert_eq!(p.current_hp, 5);
    }

    #[test]
    fn upgrade_fires_once_per_threshold() {
        let mut p = store();
        p.level = 9;
        assert!(!p.should_trigger_upgrade());
        p.level = 10;
        assert!(p.should_trigger_upgrade());
        assert!(!p.should_trigger_upgrade());
        p.level = 19;
        assert!(!p.should_trigger_upgrade());
        p.level = 20;
        assert!(p.should_trigger_upgrade());
    }

    #[test]
    fn multi_threshold_jump_fires_once() {
        let mut p = store();
        p.level = 8;
        assert!(!p.should_trigger_upgrade());
        p.level = 35;
        assert!(p.should_trigger_upgrade());
        assert_eq!(p.last_upgrade_threshold, 30);
        assert!(!p.should_trigger_upgrade());
    }

    #[test]
    fn health_upgrade_never_lifts_current_hp() {
        let mut p = store();
        p.record_current_hp(50);
        p.apply_upgrade_health(10);
        assert_eq!(p.max_hp, 110);
        assert_eq!(p.current_hp, 50);
    }

    #[test]
    fn damage_upgrade_is_additive() {
        let mut p = store();
        p.apply_upgrade_damage(5);
        assert_eq!(p.damage, 15);
    }

    #[test]
    fn record_current_hp_clamps_to_valid_range() {
        let mut p = store();
        p.record_current_hp(500);
        assert_eq!(p.current_hp, 100);
        p.record_current_hp(-3);
        assert_eq!(p.current_hp, 0);
    }

    #[test]
    fn checkout_unit_copies_the_authoritative_stats() {
        let mut p = store();
        p.record_current_hp(77);
        let unit = p.checkout_unit("Hero");
        assert_eq!(unit.name, "Hero");
        assert_eq!(unit.level, 1);
        assert_eq!(unit.damage, 10);
        assert_eq!(unit.max_hp, 100);
        assert_eq!(unit.current_hp, 77);
    }
}
