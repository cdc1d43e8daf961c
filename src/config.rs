use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fixture_types::ScheduleVersion;

pub const DEFAULT_TEAM: &str = "Valsequillo";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const MATCHES_FILE: &str = "matches.json";
pub const CHANGES_FILE: &str = "changes.json";
pub const SNAPSHOT_FILE: &str = "snapshot.json";

// ── Scan tuning ─────────────────────────────────────────────────────

/// Lines this long or longer are never day headings.
pub const DAY_MARKER_MAX_CHARS: usize = 40;
/// Lines below a weekday heading searched for its date.
pub const DATE_LOOKAHEAD: usize = 3;
/// Lines above the category line searched for a kick-off time.
pub const TIME_SCAN_UP: usize = 5;
/// Fallback categories are cut to this many characters.
pub const CATEGORY_MAX_CHARS: usize = 40;
/// Lines at the top of a page searched for the matchday window.
pub const HEADING_LINES: usize = 8;

/// Everything one `extract` invocation needs, after CLI and env parsing.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub team: String,
    pub output_dir: PathBuf,
    pub snapshot: PathBuf,
    /// Forces the schedule version of every input
    pub version_override: Option<ScheduleVersion>,
    /// Used when a file name says nothing about its version
    pub default_version: ScheduleVersion,
    /// Fixed window start; disables per-page detection
    pub anchor: Option<NaiveDate>,
    pub season_year: Option<i32>,
    pub persist: bool,
}

impl RunConfig {
    pub fn new(team: &str, output_dir: &Path, snapshot: Option<PathBuf>) -> Self {
        Self {
            team: team.to_string(),
            output_dir: output_dir.to_path_buf(),
            snapshot: snapshot.unwrap_or_else(|| output_dir.join(SNAPSHOT_FILE)),
            version_override: None,
            default_version: ScheduleVersion::Provisional,
            anchor: None,
            season_year: None,
            persist: true,
        }
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}
