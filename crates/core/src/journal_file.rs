//! File-backed command journal: line-delimited JSON with a SHA-256 hash
//! chain so a crash or a hand-edit is detected on load.
//!
//! Line 1 is the header (`format_version`, `build_id`, `seed`, the
//! starting profile). Every following line is one accepted input carrying
//! `prev_sha256_hex`/`sha256_hex` links. Appends flush immediately so the
//! file survives a crash at any point; the loader stops at the first
//! invalid, incomplete, or chain-broken line and says which one.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::journal::{CommandJournal, InputPayload, InputRecord};
use crate::profile_file::PlayerProfile;

/// First line of the journal file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    seed: u64,
    starting_profile: PlayerProfile,
}

/// The canonical hash input for one record, serialized to JSON and
/// concatenated with the previous record's hash.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    battle_index: u32,
    payload: &'a InputPayload,
}

/// Full record line as written to disk.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    /// How many battles had already resolved when this input was accepted.
    battle_index: u32,
    payload: InputPayload,
    prev_sha256_hex: String,
    sha256_hex: String,
}

/// Chain seed for the first record.
const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn record_sha256(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:064x}")
}

/// Appends accepted inputs to a journal file, one flushed line each.
pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Create a fresh journal, writing the header line immediately.
    pub fn create(
        path: &Path,
        seed: u64,
        build_id: &str,
        starting_profile: PlayerProfile,
    ) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = FileHeader {
            format_version: 1,
            build_id: build_id.to_string(),
            seed,
            starting_profile,
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Continue a journal loaded with `load_journal_from_file`.
    pub fn resume(path: &Path, last_sha256_hex: String, next_seq: u64) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self { writer: BufWriter::new(file), last_sha256_hex, next_seq })
    }

    /// Append one accepted input and flush.
    pub fn append(&mut self, battle_index: u32, payload: &InputPayload) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, battle_index, payload };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let sha256_hex = record_sha256(&body_json, &self.last_sha256_hex);

        let record = FileRecord {
            seq: self.next_seq,
            battle_index,
            payload: payload.clone(),
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(())
    }
}

/// A validated journal plus what `JournalWriter::resume` needs.
#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: CommandJournal,
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

#[derive(Debug)]
pub enum JournalLoadError {
    Io(io::Error),
    EmptyFile,
    InvalidHeader { line: usize, message: String },
    InvalidRecord { line: usize, message: String },
    /// The file ended without a trailing newline: the last line may be a
    /// torn write.
    IncompleteLine { line: usize },
    HashChainBroken { line: usize },
}

impl fmt::Display for JournalLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "journal I/O error: {e}"),
            Self::EmptyFile => write!(f, "journal file is empty"),
            Self::InvalidHeader { line, message } => {
                write!(f, "invalid journal header at line {line}: {message}")
            }
            Self::InvalidRecord { line, message } => {
                write!(f, "invalid journal record at line {line}: {message}")
            }
            Self::IncompleteLine { line } => write!(f, "incomplete journal line at line {line}"),
            Self::HashChainBroken { line } => {
                write!(f, "SHA-256 hash chain broken at line {line}")
            }
        }
    }
}

impl std::error::Error for JournalLoadError {}

/// Load and validate a journal file: header shape, record sequence, and
/// the full hash chain.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path).map_err(JournalLoadError::Io)?;
    if content.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    let lines: Vec<&str> = content.lines().collect();
    if !content.ends_with('\n') {
        return Err(JournalLoadError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;

    let mut journal = CommandJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        seed: header.seed,
        starting_profile: header.starting_profile,
        inputs: Vec::new(),
    };

    let mut prev_sha256_hex = INITIAL_HASH.to_string();
    let mut next_seq: u64 = 0;

    for (line_index, line) in lines.iter().skip(1).enumerate() {
        let line_number = line_index + 2; // header is line 1

        let record: FileRecord = serde_json::from_str(line).map_err(|e| {
            JournalLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;

        if record.seq != next_seq {
            return Err(JournalLoadError::InvalidRecord {
                line: line_number,
                message: format!("expected seq {next_seq}, found {}", record.seq),
            });
        }
        if record.prev_sha256_hex != prev_sha256_hex {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        let body = RecordBody {
            seq: record.seq,
            battle_index: record.battle_index,
            payload: &record.payload,
        };
        let body_json = serde_json::to_string(&body).map_err(|e| {
            JournalLoadError::InvalidRecord { line: line_number, message: e.to_string() }
        })?;
        if record.sha256_hex != record_sha256(&body_json, &prev_sha256_hex) {
            return Err(JournalLoadError::HashChainBroken { line: line_number });
        }

        journal.inputs.push(InputRecord { seq: record.seq, payload: record.payload });
        prev_sha256_hex = record.sha256_hex;
        next_seq += 1;
    }

    Ok(LoadedJournal { journal, last_sha256_hex: prev_sha256_hex, next_seq })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlayerCommand, UpgradeChoice};
    use tempfile::tempdir;

    fn sample_inputs() -> Vec<InputPayload> {
        vec![
            InputPayload::Command(PlayerCommand::Attack),
            InputPayload::Command(PlayerCommand::Heal),
            InputPayload::Upgrade(UpgradeChoice::Damage),
            InputPayload::Command(PlayerCommand::Special),
        ]
    }

    fn write_sample(path: &Path) {
        let mut writer =
            JournalWriter::create(path, 77, "test", PlayerProfile::default()).unwrap();
        for (index, payload) in sample_inputs().iter().enumerate() {
            writer.append(index as u32 / 2, payload).unwrap();
        }
    }

    #[test]
    fn write_then_load_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        write_sample(&path);

        let loaded = load_journal_from_file(&path).unwrap();
        assert_eq!(loaded.journal.seed, 77);
        assert_eq!(loaded.journal.starting_profile, PlayerProfile::default());
        assert_eq!(loaded.next_seq, 4);
        let payloads: Vec<InputPayload> =
            loaded.journal.inputs.iter().map(|r| r.payload.clone()).collect();
        assert_eq!(payloads, sample_inputs());
    }

    #[test]
    fn resume_continues_the_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        write_sample(&path);

        let loaded = load_journal_from_file(&path).unwrap();
        let mut writer =
            JournalWriter::resume(&path, loaded.last_sha256_hex, loaded.next_seq).unwrap();
        writer.append(3, &InputPayload::Command(PlayerCommand::Attack)).unwrap();

        let reloaded = load_journal_from_file(&path).unwrap();
        assert_eq!(reloaded.next_seq, 5);
        assert_eq!(
            reloaded.journal.inputs.last().unwrap().payload,
            InputPayload::Command(PlayerCommand::Attack)
        );
    }

    #[test]
    fn empty_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        fs::write(&path, "").unwrap();
        assert!(matches!(load_journal_from_file(&path), Err(JournalLoadError::EmptyFile)));
    }

    #[test]
    fn missing_trailing_newline_is_an_incomplete_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        write_sample(&path);

        let mut content = fs::read_to_string(&path).unwrap();
        content.pop();
        fs::write(&path, content).unwrap();

        assert!(matches!(
            load_journal_from_file(&path),
            Err(JournalLoadError::IncompleteLine { line: 5 })
        ));
    }

    #[test]
    fn tampered_record_breaks_the_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        write_sample(&path);

        let content = fs::read_to_string(&path).unwrap();
        let tampered = content.replacen("\"Heal\"", "\"Attack\"", 1);
        assert_ne!(content, tampered, "fixture must contain a heal record");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(
            load_journal_from_file(&path),
            Err(JournalLoadError::HashChainBroken { line: 3 })
        ));
    }

    #[test]
    fn out_of_order_sequence_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        write_sample(&path);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        // Drop the second record so the sequence skips.
        let mut kept: Vec<&str> = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            if index != 2 {
                kept.push(line);
            }
        }
        fs::write(&path, format!("{}\n", kept.join("\n"))).unwrap();

        assert!(matches!(
            load_journal_from_file(&path),
            Err(JournalLoadError::InvalidRecord { line: 3, .. })
        ));
    }

    #[test]
    fn garbage_header_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        fs::write(&path, "not json\n").unwrap();
        assert!(matches!(
            load_journal_from_file(&path),
            Err(JournalLoadError::InvalidHeader { line: 1, .. })
        ));
    }
}
