pub mod battle;
pub mod encounter;
pub mod journal;
pub mod journal_file;
pub mod profile_file;
pub mod progression;
pub mod replay;
pub mod run;
pub mod types;
pub mod unit;

pub use battle::{Encounter, SPECIAL_COOLDOWN_TURNS};
pub use encounter::{EnemyTemplate, Roster, scale_template};
pub use journal::{CommandJournal, InputPayload, InputRecord};
pub use profile_file::PlayerProfile;
pub use progression::{Progression, RunConfig};
pub use replay::*;
pub use run::{PLAYER_NAME, Run};
pub use types::*;
pub use unit::UnitStats;
