use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use battle_app::messages;
use battle_app::seed::generate_runtime_seed;
use battle_app::session::{Prompt, Session};
use battle_core::journal_file::JournalWriter;
use battle_core::{PlayerProfile, Roster, Run, RunConfig};
use clap::Parser;
use directories::ProjectDirs;

#[derive(Parser, Debug)]
#[command(name = "emberfall", version, about = "Turn-based battle runs in the terminal")]
struct Cli {
    /// Seed for a deterministic run (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Profile file path (defaults to the per-user data directory).
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Skip the pacing delays between automatic steps.
    #[arg(long)]
    fast: bool,

    /// Do not record an input journal for this run.
    #[arg(long)]
    no_journal: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(generate_runtime_seed);
    let profile_path = match cli.profile {
        Some(path) => path,
        None => default_profile_path()?,
    };

    let profile = PlayerProfile::load_or_default(&profile_path);
    let progression = profile.clone().into_progression(RunConfig::default());
    let mut run = Run::new(seed, Roster::build_default(), progression);

    let mut journal = if cli.no_journal {
        None
    } else {
        let journal_path = journal_path_for(&profile_path, seed);
        let writer =
            JournalWriter::create(&journal_path, seed, env!("CARGO_PKG_VERSION"), profile)
                .with_context(|| format!("creating journal {}", journal_path.display()))?;
        println!("Journaling inputs to {}", journal_path.display());
        Some(writer)
    };

    println!("Emberfall (seed {seed:#018x})");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = Session::new();
    let mut saved_profile = PlayerProfile::from_progression(run.progression());

    loop {
        for line in session.drain_lines(&run) {
            println!("{line}");
        }
        flush_journal(&mut session, journal.as_mut(), &run)?;

        // Persist the profile whenever a battle outcome or an upgrade
        // moved the store.
        let current_profile = PlayerProfile::from_progression(run.progression());
        if current_profile != saved_profile {
            current_profile.write_atomic(&profile_path).with_context(|| {
                format!("writing profile {}", profile_path.display())
            })?;
            saved_profile = current_profile;
        }

        let prompt = session.prompt(&run);
        match prompt {
            Prompt::Pause { delay_ms } => {
                if !cli.fast && delay_ms > 0 {
                    thread::sleep(Duration::from_millis(delay_ms));
                }
                run.resume();
            }
            Prompt::Action | Prompt::Upgrade => {
                let prompt_text = if prompt == Prompt::Upgrade {
                    messages::UPGRADE_PROMPT
                } else {
                    messages::ACTION_PROMPT
                };
                println!("{prompt_text}");
                let Some(line) = lines.next() else {
                    // stdin closed mid-run; save and stop cleanly.
                    save_profile(&run, &profile_path)?;
                    return Ok(());
                };
                let line = line.context("reading stdin")?;
                if let Some(feedback) = session.handle_line(&mut run, &line) {
                    println!("{feedback}");
                }
            }
            Prompt::Done => break,
        }
    }

    save_profile(&run, &profile_path)?;
    Ok(())
}

fn flush_journal(
    session: &mut Session,
    journal: Option<&mut JournalWriter>,
    run: &Run,
) -> Result<()> {
    let Some(writer) = journal else {
        session.accepted.clear();
        return Ok(());
    };
    let battle_index = run.battles_won() + run.battles_lost();
    for payload in session.accepted.drain(..) {
        writer.append(battle_index, &payload).context("appending to journal")?;
    }
    Ok(())
}

fn save_profile(run: &Run, path: &Path) -> Result<()> {
    PlayerProfile::from_progression(run.progression())
        .write_atomic(path)
        .with_context(|| format!("writing profile {}", path.display()))
}

fn default_profile_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "Emberfall")
        .context("no home directory available for the default profile path")?;
    Ok(dirs.data_dir().join("profile.json"))
}

fn journal_path_for(profile_path: &Path, seed: u64) -> PathBuf {
    profile_path.with_file_name(format!("run-{seed:016x}.jsonl"))
}
