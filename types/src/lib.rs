use std::fmt;

use serde::{Deserialize, Serialize};

/// Display text for a field the extractor could not resolve.
pub const UNSPECIFIED: &str = "unspecified";

// ── Schedule version ─────────────────────────────────────────────────────

/// Whether a source document is the federation's confirmed listing or a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleVersion {
    Definitive,
    #[default]
    Provisional,
}

impl ScheduleVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definitive => "DEFINITIVE",
            Self::Provisional => "PROVISIONAL",
        }
    }
}

impl fmt::Display for ScheduleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Match record ─────────────────────────────────────────────────────────

/// One fixture of the tracked team, as recovered from a schedule document.
///
/// This is also the on-disk snapshot format: a flat JSON list of these
/// records. Unresolved fields are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// e.g. "Viernes 16/01/26"; weekday only when no date could be inferred
    #[serde(default)]
    pub date_label: Option<String>,
    /// "HH:MM"
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub venue: Option<String>,
    /// Document and page that produced the record, e.g. "jornada_14.txt#p2"
    #[serde(default)]
    pub source_tag: String,
    #[serde(default)]
    pub schedule_version: ScheduleVersion,
}

impl MatchCandidate {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            date_label: None,
            time: None,
            category: None,
            home: home.into(),
            away: away.into(),
            venue: None,
            source_tag: String::new(),
            schedule_version: ScheduleVersion::default(),
        }
    }

    /// Identity used to drop repeats within one extraction run.
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey {
            date_label: self.date_label.clone(),
            time: self.time.clone(),
            home: self.home.to_lowercase(),
            away: self.away.to_lowercase(),
        }
    }

    /// Identity used to match a fixture against the previous run.
    /// Time and venue are left out: they are what is allowed to move.
    pub fn snapshot_key(&self) -> SnapshotKey {
        SnapshotKey {
            date_label: self.date_label.clone(),
            home: self.home.clone(),
            away: self.away.clone(),
            category: self.category.clone(),
        }
    }

    /// True if `team` appears (case-insensitive) on either side.
    pub fn involves(&self, team: &str) -> bool {
        let needle = team.to_lowercase();
        self.home.to_lowercase().contains(&needle) || self.away.to_lowercase().contains(&needle)
    }
}

/// Render an optional field for humans.
pub fn or_unspecified(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNSPECIFIED)
}

// ── Identities ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub date_label: Option<String>,
    pub time: Option<String>,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub date_label: Option<String>,
    pub home: String,
    pub away: String,
    pub category: Option<String>,
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} vs {} | {}",
            or_unspecified(&self.date_label),
            self.home,
            self.away,
            or_unspecified(&self.category)
        )
    }
}

// ── Change report ────────────────────────────────────────────────────────

/// Field-level drift of one fixture between two runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub key: SnapshotKey,
    /// "Field: old → new" descriptions
    pub changes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_ignores_team_case() {
        let mut a = MatchCandidate::new("CB Valsequillo", "CB Telde");
        a.time = Some("18:30".into());
        let mut b = MatchCandidate::new("CB VALSEQUILLO", "cb telde");
        b.time = Some("18:30".into());
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_ne!(a.snapshot_key(), b.snapshot_key());
    }

    #[test]
    fn test_snapshot_format_uses_null_for_absent_fields() {
        let m = MatchCandidate::new("CB Valsequillo", "CB Telde");
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"venue\":null"));
        assert!(json.contains("\"schedule_version\":\"PROVISIONAL\""));
    }

    #[test]
    fn test_snapshot_record_tolerates_missing_optional_fields() {
        let m: MatchCandidate =
            serde_json::from_str(r#"{"home":"CB Valsequillo","away":"CB Telde"}"#).unwrap();
        assert_eq!(m.date_label, None);
        assert_eq!(m.schedule_version, ScheduleVersion::Provisional);
    }

    #[test]
    fn test_involves_is_case_insensitive() {
        let m = MatchCandidate::new("Aqualia Ingenio", "Clínica Dental Virmident Valsequillo");
        assert!(m.involves("valsequillo"));
        assert!(!m.involves("telde"));
    }
}
