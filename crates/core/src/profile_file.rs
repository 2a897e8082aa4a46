//! Durable player progression. The profile is a small versioned JSON file
//! written atomically (temp file + rename) at every battle-outcome sync
//! point. Loading never fails hard: a missing or malformed file yields the
//! first-run defaults, and loaded values are clamped back onto their
//! invariant floors.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::progression::{Progression, RunConfig};

pub const PROFILE_FORMAT_VERSION: u32 = 1;

/// On-disk snapshot of the progression store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub format_version: u32,
    pub level: i32,
    pub damage: i32,
    pub max_hp: i32,
    pub current_hp: i32,
    pub last_upgrade_threshold: i32,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            format_version: PROFILE_FORMAT_VERSION,
            level: 1,
            damage: 10,
            max_hp: 100,
            current_hp: 100,
            last_upgrade_threshold: 0,
        }
    }
}

impl PlayerProfile {
    pub fn from_progression(progression: &Progression) -> Self {
        Self {
            format_version: PROFILE_FORMAT_VERSION,
            level: progression.level,
            damage: progression.damage,
            max_hp: progression.max_hp,
            current_hp: progression.current_hp,
            last_upgrade_threshold: progression.last_upgrade_threshold,
        }
    }

    /// Rehydrate the store. Values from disk are clamped onto the stat
    /// floors so a hand-edited or stale file cannot break the invariants.
    pub fn into_progression(self, config: RunConfig) -> Progression {
        let mut progression =
            Progression::new(self.level, self.damage, self.max_hp, self.current_hp, config);
        progression.last_upgrade_threshold = self.last_upgrade_threshold.max(0);
        progression
    }

    /// Read a profile, answering the defaults for a missing or unreadable
    /// file. Malformed state is a degraded start, never a fatal failure.
    pub fn load_or_default(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Write via temp file + rename so a crash mid-write can never leave a
    /// torn profile behind.
    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_first_run_defaults() {
        let dir = tempdir().unwrap();
        let profile = PlayerProfile::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(profile, PlayerProfile::default());
        assert_eq!(
            (profile.level, profile.damage, profile.max_hp, profile.current_hp),
            (1, 10, 100, 100)
        );
    }

    #[test]
    fn malformed_file_yields_defaults_instead_of_failing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(PlayerProfile::load_or_default(&path), PlayerProfile::default());
    }

    #[test]
    fn write_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let profile = PlayerProfile {
            format_version: PROFILE_FORMAT_VERSION,
            level: 23,
            damage: 30,
            max_hp: 120,
            current_hp: 87,
            last_upgrade_threshold: 20,
        };
        profile.write_atomic(&path).unwrap();
        assert_eq!(PlayerProfile::load_or_default(&path), profile);

        // No temp file left behind.
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn out_of_range_values_are_clamped_on_rehydration() {
        let profile = PlayerProfile {
            format_version: PROFILE_FORMAT_VERSION,
            level: -4,
            damage: 0,
            max_hp: -10,
            current_hp: 999,
            last_upgrade_threshold: -30,
        };
        let progression = profile.into_progression(RunConfig::default());
        assert_eq!(progression.level, 1);
        assert_eq!(progression.damage, 1);
        assert_eq!(progression.max_hp, 1);
        assert_eq!(progression.current_hp, 1);
        assert_eq!(progression.last_upgrade_threshold, 0);
    }

    #[test]
    fn progression_roundtrips_through_the_profile() {
        let mut progression = Progression::fresh(RunConfig::default());
        progression.apply_victory(None);
        progression.record_current_hp(70);
        assert!(!progression.should_trigger_upgrade());

        let profile = PlayerProfile::from_progression(&progression);
        let restored = profile.into_progression(RunConfig::default());
        assert_eq!(restored, progression);
    }
}
