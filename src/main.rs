mod config;
mod dates;
mod dedup;
mod document;
mod error;
mod extract;
mod logging;
mod reconstruct;
mod scanner;
mod snapshot;
mod team;
mod upcoming;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use fixture_types::{MatchCandidate, ScheduleVersion, or_unspecified};
use tracing::info;

use config::{CHANGES_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_TEAM, MATCHES_FILE, RunConfig};
use document::Document;
use extract::{ExtractOptions, Extractor};
use reconstruct::Diagnostic;
use snapshot::{DiffReport, SnapshotStore};

#[derive(Parser)]
#[command(
    name = "fixture_extract",
    about = "Pull one team's fixtures out of federation schedule sheets"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Team whose fixtures are extracted
    #[arg(long, global = true, env = "FIXTURE_TEAM", default_value = DEFAULT_TEAM)]
    team: String,

    /// Where matches.json, changes.json and the default snapshot live
    #[arg(long, global = true, env = "FIXTURE_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Snapshot file [default: <output-dir>/snapshot.json]
    #[arg(long, global = true, env = "FIXTURE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract fixtures from page dumps → output/matches.json, output/changes.json
    Extract {
        /// Page dumps (.txt, pages split by form feed) or directories of them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Treat every input as this schedule version
        #[arg(long = "version", value_enum)]
        version: Option<VersionArg>,

        /// First day of the matchday window, e.g. 12/01/26
        #[arg(long, value_parser = dates::parse_date)]
        anchor: Option<NaiveDate>,

        /// Year for window titles without one [default: current year]
        #[arg(long)]
        season_year: Option<i32>,

        /// Report changes but keep the previous snapshot
        #[arg(long)]
        no_persist: bool,
    },
    /// Show the next fixture from the last extraction
    Next {
        /// Count days from this date instead of today
        #[arg(long, value_parser = dates::parse_date)]
        today: Option<NaiveDate>,
    },
    /// Compare the last extraction with the snapshot, without updating it
    Changes,
}

#[derive(Clone, Copy, ValueEnum)]
enum VersionArg {
    Definitive,
    Provisional,
}

impl From<VersionArg> for ScheduleVersion {
    fn from(arg: VersionArg) -> Self {
        match arg {
            VersionArg::Definitive => ScheduleVersion::Definitive,
            VersionArg::Provisional => ScheduleVersion::Provisional,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = RunConfig::new(&cli.team, &cli.output_dir, cli.snapshot);
    match cli.command {
        Command::Extract {
            inputs,
            version,
            anchor,
            season_year,
            no_persist,
        } => {
            config.version_override = version.map(Into::into);
            config.anchor = anchor;
            config.season_year = Some(season_year.unwrap_or_else(|| Local::now().year()));
            config.persist = !no_persist;
            run_extract(&config, &inputs)
        }
        Command::Next { today } => {
            run_next(&config, today.unwrap_or_else(|| Local::now().date_naive()))
        }
        Command::Changes => run_changes(&config),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).with_context(|| {
        format!(
            "cannot read {} (run `fixture_extract extract` first)",
            path.display()
        )
    })?;
    serde_json::from_str(&json).with_context(|| {
        format!(
            "cannot parse {} (it may be from an older version, re-run extraction)",
            path.display()
        )
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  EXTRACT MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_extract(config: &RunConfig, inputs: &[PathBuf]) -> Result<()> {
    let files = scanner::scan_inputs(inputs, config.version_override, config.default_version)?;
    eprintln!("Found {} schedule documents", files.len());

    let mut extractor = Extractor::new(
        &config.team,
        ExtractOptions {
            anchor: config.anchor,
            season_year: config.season_year,
        },
    );
    let mut matches = Vec::new();
    for file in &files {
        let doc = Document::load(&file.path)?;
        matches.extend(extractor.extract(&doc, file.version));
    }

    // Outputs go out before the snapshot moves forward
    eprintln!("\nWriting output:");
    let publish = |report: &DiffReport| -> Result<()> {
        write_json(&config.output_path(MATCHES_FILE), &matches)?;
        write_json(&config.output_path(CHANGES_FILE), &report.changes)
    };
    let store = SnapshotStore::new(&config.snapshot);
    let report = if config.persist {
        store.extract_report(&matches, publish)?
    } else {
        let report = store.preview(&matches);
        publish(&report)?;
        report
    };

    let findings = extractor.findings();
    let dropped = findings
        .iter()
        .filter(|f| {
            matches!(
                f.diagnostic,
                Diagnostic::Incomplete { .. }
                    | Diagnostic::TeamNotInFixture { .. }
                    | Diagnostic::MissingTeamName { .. }
            )
        })
        .count();

    println!();
    print_matches(&matches);
    println!();
    print_report(&report);

    eprintln!(
        "\n{}: {} fixtures, {} ambiguous layouts, {} dropped, {} diagnostics",
        config.team,
        matches.len(),
        extractor.ambiguous_layouts(),
        dropped,
        findings.len()
    );
    info!(
        matches = matches.len(),
        changed = report.changes.len(),
        persisted = config.persist,
        "run complete"
    );
    Ok(())
}

fn print_matches(matches: &[MatchCandidate]) {
    if matches.is_empty() {
        println!("No fixtures found.");
        return;
    }
    for m in matches {
        println!(
            "{:<20} {:<11}  {} vs {}  [{}] @ {} ({})",
            or_unspecified(&m.date_label),
            or_unspecified(&m.time),
            m.home,
            m.away,
            or_unspecified(&m.category),
            or_unspecified(&m.venue),
            m.schedule_version
        );
    }
}

fn print_report(report: &DiffReport) {
    if report.is_empty() {
        println!("No changes since the last run.");
        return;
    }
    for record in &report.changes {
        println!("~ {}", record.key);
        for change in &record.changes {
            println!("    {change}");
        }
    }
    for key in &report.added {
        println!("+ {key}");
    }
    for key in &report.removed {
        println!("- {key}");
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  NEXT / CHANGES MODES: work from the last matches.json
// ═══════════════════════════════════════════════════════════════════════

fn run_next(config: &RunConfig, today: NaiveDate) -> Result<()> {
    let matches: Vec<MatchCandidate> = read_json(&config.output_path(MATCHES_FILE))?;
    match upcoming::next_fixture(&matches, today) {
        Some(next) => {
            let m = next.fixture;
            println!("Next fixture ({}):", next.countdown().to_uppercase());
            println!("  {} vs {}", m.home, m.away);
            println!("  {} {}", or_unspecified(&m.date_label), or_unspecified(&m.time));
            println!("  {}", or_unspecified(&m.category));
            println!("  @ {}", or_unspecified(&m.venue));
        }
        None => println!("No upcoming fixtures with a known date."),
    }
    Ok(())
}

fn run_changes(config: &RunConfig) -> Result<()> {
    let matches: Vec<MatchCandidate> = read_json(&config.output_path(MATCHES_FILE))?;
    let store = SnapshotStore::new(&config.snapshot);
    eprintln!("Comparing {} fixtures with {}", matches.len(), store.path().display());
    print_report(&store.preview(&matches));
    Ok(())
}
