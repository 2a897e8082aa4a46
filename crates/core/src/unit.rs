//! Combatant stat bundle and its pure mutations. No battle sequencing
//! lives here; the run loop decides when these are applied.

/// One combatant's numeric state. The player copy is checked out from the
/// progression store at battle start and written back at battle end; enemy
/// copies are built by the encounter roster and discarded with the battle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitStats {
    pub name: String,
    pub level: i32,
    pub damage: i32,
    pub max_hp: i32,
    pub current_hp: i32,
}

impl UnitStats {
    /// Subtract `amount` from current HP and report whether the unit died.
    /// Displayed HP is clamped at zero; a unit already at zero stays dead.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.current_hp -= amount;
        let dead = self.current_hp <= 0;
        if self.current_hp < 0 {
            self.current_hp = 0;
        }
        dead
    }

    /// Add `amount` to current HP, clamped at `max_hp`.
    pub fn heal(&mut self, amount: i32) {
        self.current_hp += amount;
        if self.current_hp > self.max_hp {
            self.current_hp = self.max_hp;
        }
    }

    /// Strip `penalty` from level, max HP, and damage, each floored at 1,
    /// then restore current HP to the (reduced) maximum.
    pub fn apply_death_penalty(&mut self, penalty: i32) {
        self.level = (self.level - penalty).max(1);
        self.max_hp = (self.max_hp - penalty).max(1);
        self.damage = (self.damage - penalty).max(1);
        self.current_hp = self.max_hp;
    }

    /// Per-kill growth from the superseded progression variant: +1 level,
    /// +10 max HP, +5 damage, full restore. The run loop grants flat
    /// victory rewards instead; this survives as API surface.
    pub fn level_up(&mut self) {
        self.level += 1;
        self.max_hp += 10;
        self.damage += 5;
        self.current_hp = self.max_hp;
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }
}
