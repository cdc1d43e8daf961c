//! The previous run's fixture list and what changed since.
//!
//! The snapshot is the only state kept between runs: a pretty-printed JSON
//! list of [`MatchCandidate`] records. A missing, empty or unreadable
//! snapshot counts as "no previous run" and never stops extraction.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use fixture_types::{ChangeRecord, MatchCandidate, SnapshotKey, or_unspecified};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Everything that differs between two runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Fixtures present in both runs whose day, time or venue moved
    pub changes: Vec<ChangeRecord>,
    /// Only in the current run
    pub added: Vec<SnapshotKey>,
    /// Only in the previous run
    pub removed: Vec<SnapshotKey>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

fn field_change(name: &str, old: &Option<String>, new: &Option<String>) -> Option<String> {
    (old != new).then(|| format!("{name}: {} → {}", or_unspecified(old), or_unspecified(new)))
}

/// Field drift of fixtures present in both lists, in `current` order.
pub fn diff(current: &[MatchCandidate], previous: &[MatchCandidate]) -> Vec<ChangeRecord> {
    let mut by_key: HashMap<SnapshotKey, &MatchCandidate> = HashMap::new();
    for old in previous {
        by_key.entry(old.snapshot_key()).or_insert(old);
    }

    current
        .iter()
        .filter_map(|new| {
            let key = new.snapshot_key();
            let old = by_key.get(&key)?;
            let changes: Vec<String> = [
                field_change("Date", &old.date_label, &new.date_label),
                field_change("Time", &old.time, &new.time),
                field_change("Venue", &old.venue, &new.venue),
            ]
            .into_iter()
            .flatten()
            .collect();
            (!changes.is_empty()).then_some(ChangeRecord { key, changes })
        })
        .collect()
}

pub fn diff_report(current: &[MatchCandidate], previous: &[MatchCandidate]) -> DiffReport {
    let current_keys: HashSet<SnapshotKey> = current.iter().map(|m| m.snapshot_key()).collect();
    let previous_keys: HashSet<SnapshotKey> = previous.iter().map(|m| m.snapshot_key()).collect();

    let mut added = Vec::new();
    for m in current {
        let key = m.snapshot_key();
        if !previous_keys.contains(&key) && !added.contains(&key) {
            added.push(key);
        }
    }
    let mut removed = Vec::new();
    for m in previous {
        let key = m.snapshot_key();
        if !current_keys.contains(&key) && !removed.contains(&key) {
            removed.push(key);
        }
    }

    DiffReport {
        changes: diff(current, previous),
        added,
        removed,
    }
}

/// The snapshot file of one tracked team.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The previous run's fixtures, or an empty list when there is none
    /// usable.
    pub fn load(&self) -> Vec<MatchCandidate> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no previous snapshot");
                return Vec::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, treating as empty");
                return Vec::new();
            }
        };
        if text.trim().is_empty() {
            warn!(path = %self.path.display(), "snapshot is empty");
            return Vec::new();
        }
        match serde_json::from_str(&text) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot malformed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Overwrite the snapshot with `current`. The file is replaced in one
    /// rename so an interrupted run leaves the old snapshot intact.
    pub fn persist(&self, current: &[MatchCandidate]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(current).map_err(|e| Error::json(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| Error::io(&self.path, e))?;
        debug!(path = %self.path.display(), records = current.len(), "snapshot written");
        Ok(())
    }

    /// Compare against the snapshot without touching it.
    pub fn preview(&self, current: &[MatchCandidate]) -> DiffReport {
        diff_report(current, &self.load())
    }

    /// Load, diff, hand the report to `publish`, then persist `current` as
    /// the new snapshot. The snapshot only moves forward once `publish`
    /// succeeded, so a failed output write is reported again next run.
    pub fn extract_report<E>(
        &self,
        current: &[MatchCandidate],
        publish: impl FnOnce(&DiffReport) -> std::result::Result<(), E>,
    ) -> std::result::Result<DiffReport, E>
    where
        E: From<Error>,
    {
        let report = self.preview(current);
        publish(&report)?;
        self.persist(current)?;
        info!(
            changed = report.changes.len(),
            added = report.added.len(),
            removed = report.removed.len(),
            "snapshot updated"
        );
        Ok(report)
    }
}
