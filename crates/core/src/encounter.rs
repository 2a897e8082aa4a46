//! Opponent selection: which template the next battle fields and how its
//! stats scale against the current player level.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::types::RosterError;
use crate::unit::UnitStats;

/// Base stats for one spawnable enemy before level scaling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemyTemplate {
    pub name: &'static str,
    pub max_hp: i32,
    pub damage: i32,
    pub boss: bool,
}

/// Ordered template set. Exactly one boss template, kept last by
/// convention; everything before it is the ordinary encounter pool.
#[derive(Clone, Debug)]
pub struct Roster {
    templates: Vec<EnemyTemplate>,
}

impl Roster {
    /// Validate a custom roster. A malformed roster is a data-configuration
    /// defect, rejected up front rather than surfacing mid-run.
    pub fn new(templates: Vec<EnemyTemplate>) -> Result<Self, RosterError> {
        let boss_count = templates.iter().filter(|t| t.boss).count();
        if boss_count == 0 {
            return Err(RosterError::MissingBoss);
        }
        if templates.len() == boss_count {
            return Err(RosterError::NoOrdinaryTemplates);
        }
        let last_is_sole_boss = boss_count == 1 && templates.last().is_some_and(|t| t.boss);
        if !last_is_sole_boss {
            return Err(RosterError::BossNotLast);
        }
        Ok(Self { templates })
    }

    /// The built-in encounter table.
    pub fn build_default() -> Self {
        Self {
            templates: vec![
                EnemyTemplate { name: "Marsh Slime", max_hp: 100, damage: 10, boss: false },
                EnemyTemplate { name: "Gravehound", max_hp: 90, damage: 14, boss: false },
                EnemyTemplate { name: "Rust Bandit", max_hp: 110, damage: 12, boss: false },
                EnemyTemplate { name: "Ember Tyrant", max_hp: 400, damage: 30, boss: true },
            ],
        }
    }

    pub fn templates(&self) -> &[EnemyTemplate] {
        &self.templates
    }

    fn boss(&self) -> &EnemyTemplate {
        // Validated at construction: the boss is the last entry.
        &self.templates[self.templates.len() - 1]
    }

    fn ordinary(&self) -> &[EnemyTemplate] {
        &self.templates[..self.templates.len() - 1]
    }

    /// Field the opponent for the next battle. The boss is chosen purely by
    /// the player's level at spawn time; otherwise one ordinary template is
    /// picked uniformly and scaled to roughly the player's level.
    pub fn spawn_encounter(
        &self,
        player_level: i32,
        boss_level_threshold: i32,
        rng: &mut ChaCha8Rng,
    ) -> (UnitStats, bool) {
        let spawn_boss = player_level >= boss_level_threshold;
        let template = if spawn_boss {
            self.boss()
        } else {
            let pool = self.ordinary();
            &pool[pick_index(rng, pool.len())]
        };

        let offset = level_offset(rng);
        let scale_level = (player_level + offset).max(1);
        (scale_template(template, scale_level), spawn_boss)
    }
}

/// Apply level scaling to a template. Spawned enemies always come out with
/// strictly positive HP and damage, whatever the inputs.
pub fn scale_template(template: &EnemyTemplate, scale_level: i32) -> UnitStats {
    let max_hp = (template.max_hp + scale_level * 4).max(1);
    UnitStats {
        name: template.name.to_string(),
        level: scale_level.max(1),
        damage: (template.damage + scale_level * 2).max(1),
        max_hp,
        current_hp: max_hp,
    }
}

/// Uniform offset in [-2, 2]. Modulo reduction over a range this narrow is
/// deterministic and bias-free enough for encounter flavor.
fn level_offset(rng: &mut ChaCha8Rng) -> i32 {
    (rng.next_u32() % 5) as i32 - 2
}

fn pick_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    rng.next_u32() as usize % len
}
