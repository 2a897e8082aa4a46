//! Event-to-text mapping: the display surface of the battle core. The
//! core only emits structured events; everything the player reads comes
//! from this table.

use battle_core::BattleEvent;

pub fn event_line(event: &BattleEvent) -> String {
    match event {
        BattleEvent::EncounterStarted { enemy, enemy_level, is_boss: false } => {
            format!("A wild {enemy} (Lv {enemy_level}) approaches...")
        }
        BattleEvent::EncounterStarted { enemy, enemy_level, is_boss: true } => {
            format!("{enemy} (Lv {enemy_level}) bars the way. This is the final battle!")
        }
        BattleEvent::PlayerAttacked { damage, enemy_hp_after, special: false } => {
            format!("The attack is successful! {damage} damage (enemy HP {enemy_hp_after}).")
        }
        BattleEvent::PlayerAttacked { damage, enemy_hp_after, special: true } => {
            format!("Special attack unleashed! {damage} damage (enemy HP {enemy_hp_after}).")
        }
        BattleEvent::SpecialRejected { turns_remaining } => {
            format!("Special attack on cooldown. Wait {turns_remaining} more turns.")
        }
        BattleEvent::PlayerHealed { amount, player_hp_after } => {
            format!("You feel renewed strength! +{amount} HP (now {player_hp_after}).")
        }
        BattleEvent::EnemyAttacked { damage, player_hp_after } => {
            format!("The enemy attacks! You take {damage} damage (HP {player_hp_after}).")
        }
        BattleEvent::EnemySelfHealed { amount, enemy_hp_after } => {
            format!("The enemy knits its wounds, recovering {amount} HP (now {enemy_hp_after}).")
        }
        BattleEvent::BattleWon { levels_gained, player_level_after } => {
            format!("You won the battle! +{levels_gained} levels (now Lv {player_level_after}).")
        }
        BattleEvent::BattleLost => "You were defeated.".to_string(),
        BattleEvent::DeathPenaltyApplied { level_after, max_hp_after, damage_after } => {
            format!(
                "Your strength fades: Lv {level_after}, {max_hp_after} max HP, \
                 {damage_after} damage. You rise again at full health."
            )
        }
        BattleEvent::UpgradeOffered { health_amount, damage_amount } => {
            format!(
                "A surge of power! Choose an upgrade: \
                 (1) +{health_amount} Max HP  (2) +{damage_amount} Damage"
            )
        }
        BattleEvent::UpgradeApplied { choice } => match choice {
            battle_core::UpgradeChoice::Health => "Upgrade applied: Max HP.".to_string(),
            battle_core::UpgradeChoice::Damage => "Upgrade applied: Damage.".to_string(),
        },
        BattleEvent::RunCompleted { player_level } => {
            format!("The tyrant falls. Run complete at Lv {player_level}!")
        }
    }
}

/// Prompt shown at a player decision point.
pub const ACTION_PROMPT: &str = "Choose an action: (a)ttack, (h)eal, (s)pecial";
pub const UPGRADE_PROMPT: &str = "Pick your upgrade: (1) Max HP or (2) Damage";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encounter_announcement_matches_the_classic_line() {
        let line = event_line(&BattleEvent::EncounterStarted {
            enemy: "Marsh Slime".to_string(),
            enemy_level: 3,
            is_boss: false,
        });
        assert_eq!(line, "A wild Marsh Slime (Lv 3) approaches...");
    }

    #[test]
    fn boss_announcement_is_distinct() {
        let line = event_line(&BattleEvent::EncounterStarted {
            enemy: "Ember Tyrant".to_string(),
            enemy_level: 52,
            is_boss: true,
        });
        assert!(line.contains("final battle"));
    }

    #[test]
    fn cooldown_notice_counts_remaining_turns() {
        let line = event_line(&BattleEvent::SpecialRejected { turns_remaining: 2 });
        assert_eq!(line, "Special attack on cooldown. Wait 2 more turns.");
    }

    #[test]
    fn every_event_renders_to_a_nonempty_line() {
        use battle_core::UpgradeChoice;
        let events = [
            BattleEvent::PlayerAttacked { damage: 10, enemy_hp_after: 94, special: false },
            BattleEvent::PlayerAttacked { damage: 20, enemy_hp_after: 74, special: true },
            BattleEvent::PlayerHealed { amount: 5, player_hp_after: 80 },
            BattleEvent::EnemyAttacked { damage: 12, player_hp_after: 68 },
            BattleEvent::EnemySelfHealed { amount: 8, enemy_hp_after: 90 },
            BattleEvent::BattleWon { levels_gained: 5, player_level_after: 6 },
            BattleEvent::BattleLost,
            BattleEvent::DeathPenaltyApplied { level_after: 1, max_hp_after: 85, damage_after: 1 },
            BattleEvent::UpgradeOffered { health_amount: 10, damage_amount: 5 },
            BattleEvent::UpgradeApplied { choice: UpgradeChoice::Health },
            BattleEvent::RunCompleted { player_level: 57 },
        ];
        for event in &events {
            assert!(!event_line(event).is_empty(), "no display line for {event:?}");
        }
    }
}
