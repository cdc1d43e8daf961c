//! Rebuilding a match record from the lines around a team entry.
//!
//! A fixture on the sheet is a short run of lines with nothing but
//! adjacency to tell them apart:
//!
//! ```text
//!   78270 18:30 Junior Masc S-B      number, time, category
//!   Valsequillo (35008832)           home
//!   CB Telde (35002857)              away
//!   IES Valsequillo                  venue
//! ```
//!
//! Roles are assigned from a fixed window around the line that names the
//! tracked team, using the team-code heuristic as the only signal.

use std::fmt;
use std::sync::LazyLock;

use fixture_types::MatchCandidate;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{CATEGORY_MAX_CHARS, TIME_SCAN_UP};
use crate::dates::{day_marker, find_time};
use crate::team::{TrackedTeam, clean_team_name, looks_like_team_line, normalize_ws};

// "78270 18:30 ..." -> the match number left in front once the time is cut out
static RE_MATCH_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:\s+|$))+").unwrap());

static RE_BARE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(?\s*\d{1,2}/\d{1,2}/\d{2,4}\s*\)?$").unwrap());

static RE_BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

/// Which side of the tracked team the rival's line was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Rival on the next line: tracked team at home
    HomeFirst,
    /// Rival on the previous line: tracked team away
    AwayFirst,
    /// No code on either neighbour; home-first assumed
    Ambiguous,
}

/// Something the reconstructor could not pin down. Lines are page-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    AmbiguousRoles { line: usize },
    MissingTeamName { line: usize },
    NoDate { line: usize },
    NoTime { line: usize },
    NoCategory { line: usize },
    NoVenue { line: usize },
    /// Name cleanup removed the tracked team from both sides
    TeamNotInFixture { line: usize },
    /// Neither a time nor a day could be attached
    Incomplete { line: usize },
    /// Document or page without any text
    EmptyInput,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousRoles { line } => {
                write!(f, "line {line}: no team code next to it, assumed home side")
            }
            Self::MissingTeamName { line } => write!(f, "line {line}: home or away name missing"),
            Self::NoDate { line } => write!(f, "line {line}: no day heading seen yet"),
            Self::NoTime { line } => write!(f, "line {line}: no kick-off time"),
            Self::NoCategory { line } => write!(f, "line {line}: no category"),
            Self::NoVenue { line } => write!(f, "line {line}: no venue"),
            Self::TeamNotInFixture { line } => {
                write!(f, "line {line}: tracked team lost after name cleanup, dropped")
            }
            Self::Incomplete { line } => write!(f, "line {line}: neither time nor day, dropped"),
            Self::EmptyInput => write!(f, "no text lines"),
        }
    }
}

/// Outcome of one reconstruction attempt.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// `None` when the record would break the emission invariant
    pub candidate: Option<MatchCandidate>,
    pub layout: Layout,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lines that open or belong to another block, so they can't be a venue.
fn is_block_boundary(line: &str) -> bool {
    looks_like_team_line(line)
        || day_marker(line).is_some()
        || find_time(line).is_some()
        || RE_BARE_DATE.is_match(line)
        || RE_BARE_NUMBER.is_match(line)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Category text of a line, with match numbers removed.
fn category_text(line: &str) -> Option<String> {
    if looks_like_team_line(line) || day_marker(line).is_some() || RE_BARE_DATE.is_match(line) {
        return None;
    }
    let text = normalize_ws(&RE_MATCH_NUMBER.replace(line.trim(), ""));
    (!text.is_empty()).then_some(text)
}

/// Time and category from the line above the home team.
///
/// Dense sheets print the time once above a group of fixtures, so when the
/// line itself has none, up to [`TIME_SCAN_UP`] earlier lines are searched.
fn time_and_category(lines: &[String], source: usize) -> (Option<String>, Option<String>) {
    let line = &lines[source];
    if let Some((time, range)) = find_time(line) {
        let rest = format!("{} {}", &line[..range.start], &line[range.end..]);
        return (Some(time), category_text(&rest));
    }

    let above = (1..=TIME_SCAN_UP)
        .filter_map(|k| source.checked_sub(k))
        .find_map(|k| find_time(&lines[k]).map(|(time, _)| time));
    let category = match above {
        Some(_) => category_text(line),
        None => category_text(line).map(|c| truncate(&c, CATEGORY_MAX_CHARS)),
    };
    (above, category)
}

/// Rebuild the fixture around `lines[i]`, a line naming the tracked team.
///
/// Never fails: unresolved fields are left empty and reported in
/// `diagnostics`. The candidate is withheld only when it would lack a
/// rival, the tracked team, or both time and day.
pub fn reconstruct(
    lines: &[String],
    i: usize,
    current_date: Option<&str>,
    team: &TrackedTeam,
) -> Reconstruction {
    let is_team = |k: usize| lines.get(k).is_some_and(|l| looks_like_team_line(l));
    let mut diagnostics = Vec::new();

    let (layout, home_idx) = if is_team(i + 1) {
        (Layout::HomeFirst, i)
    } else if let Some(prev) = i.checked_sub(1).filter(|&p| is_team(p)) {
        (Layout::AwayFirst, prev)
    } else {
        warn!(
            line = i,
            text = lines.get(i).map(String::as_str).unwrap_or_default(),
            "no team code on either neighbour, assuming home side"
        );
        diagnostics.push(Diagnostic::AmbiguousRoles { line: i });
        (Layout::Ambiguous, i)
    };

    let home = lines.get(home_idx).map(|l| clean_team_name(l)).unwrap_or_default();
    let away = lines.get(home_idx + 1).map(|l| clean_team_name(l)).unwrap_or_default();
    if home.is_empty() || away.is_empty() {
        warn!(line = i, "cannot tell both teams apart");
        diagnostics.push(Diagnostic::MissingTeamName { line: i });
        return Reconstruction {
            candidate: None,
            layout,
            diagnostics,
        };
    }

    let mut candidate = MatchCandidate::new(home, away);

    let (time, category) = match home_idx.checked_sub(1) {
        Some(source) => time_and_category(lines, source),
        None => (None, None),
    };
    if time.is_none() {
        warn!(line = i, "kick-off time not found");
        diagnostics.push(Diagnostic::NoTime { line: i });
    }
    if category.is_none() {
        warn!(line = i, "category not found");
        diagnostics.push(Diagnostic::NoCategory { line: i });
    }
    candidate.time = time;
    candidate.category = category;

    candidate.venue = lines
        .get(home_idx + 2)
        .filter(|l| !is_block_boundary(l))
        .map(|l| normalize_ws(l));
    if candidate.venue.is_none() {
        warn!(line = i, "venue not found");
        diagnostics.push(Diagnostic::NoVenue { line: i });
    }

    candidate.date_label = current_date.map(str::to_string);
    if candidate.date_label.is_none() {
        warn!(line = i, "fixture before any day heading");
        diagnostics.push(Diagnostic::NoDate { line: i });
    }

    if !candidate.involves(team.name()) {
        warn!(line = i, home = %candidate.home, away = %candidate.away, "tracked team not in fixture, dropped");
        diagnostics.push(Diagnostic::TeamNotInFixture { line: i });
        return Reconstruction {
            candidate: None,
            layout,
            diagnostics,
        };
    }
    if candidate.time.is_none() && candidate.date_label.is_none() {
        warn!(line = i, "fixture has neither time nor day, dropped");
        diagnostics.push(Diagnostic::Incomplete { line: i });
        return Reconstruction {
            candidate: None,
            layout,
            diagnostics,
        };
    }

    debug!(line = i, ?layout, home = %candidate.home, away = %candidate.away, "fixture rebuilt");
    Reconstruction {
        candidate: Some(candidate),
        layout,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn team() -> TrackedTeam {
        TrackedTeam::new("Valsequillo")
    }

    #[test]
    fn test_home_first_block() {
        let page = lines(&[
            "18:30 Junior Masc S-B",
            "CB Valsequillo (111)",
            "CB Telde (222)",
            "Pabellón Municipal",
        ]);
        let rec = reconstruct(&page, 1, Some("Viernes 16/01/26"), &team());
        assert_eq!(rec.layout, Layout::HomeFirst);
        assert!(rec.diagnostics.is_empty());
        let m = rec.candidate.unwrap();
        assert_eq!(m.home, "CB Valsequillo");
        assert_eq!(m.away, "CB Telde");
        assert_eq!(m.venue.as_deref(), Some("Pabellón Municipal"));
        assert_eq!(m.time.as_deref(), Some("18:30"));
        assert_eq!(m.category.as_deref(), Some("Junior Masc S-B"));
        assert_eq!(m.date_label.as_deref(), Some("Viernes 16/01/26"));
    }

    #[test]
    fn test_away_first_block() {
        let page = lines(&[
            "Cad Masc S-B",
            "Ecoener CB Castillo & (35003808)",
            "Clínica Dental Virmident Valsequillo  (35008840)",
            "Cdad Dep Vicente del Bosque",
        ]);
        let rec = reconstruct(&page, 2, Some("Sábado"), &team());
        assert_eq!(rec.layout, Layout::AwayFirst);
        let m = rec.candidate.unwrap();
        assert_eq!(m.home, "Ecoener CB Castillo");
        assert_eq!(m.away, "Clínica Dental Virmident Valsequillo");
        assert_eq!(m.venue.as_deref(), Some("Cdad Dep Vicente del Bosque"));
        assert_eq!(m.category.as_deref(), Some("Cad Masc S-B"));
        assert_eq!(m.time, None);
        assert_eq!(rec.diagnostics, vec![Diagnostic::NoTime { line: 2 }]);
    }

    #[test]
    fn test_ambiguous_block_is_kept() {
        let page = lines(&["CB Valsequillo", "Rival Sin Codigo"]);
        let rec = reconstruct(&page, 0, Some("Sábado"), &team());
        assert_eq!(rec.layout, Layout::Ambiguous);
        assert!(rec.diagnostics.contains(&Diagnostic::AmbiguousRoles { line: 0 }));
        let m = rec.candidate.unwrap();
        assert_eq!(m.home, "CB Valsequillo");
        assert_eq!(m.away, "Rival Sin Codigo");
    }

    #[test]
    fn test_match_number_dropped_from_category() {
        let page = lines(&[
            "78270 18:30 Junior Masc S-B",
            "Valsequillo (35008832)",
            "CB Telde (35002857)",
            "IES Valsequillo",
        ]);
        let m = reconstruct(&page, 1, None, &team()).candidate.unwrap();
        assert_eq!(m.category.as_deref(), Some("Junior Masc S-B"));
        assert_eq!(m.venue.as_deref(), Some("IES Valsequillo"));
    }

    #[test]
    fn test_time_found_above_category_line() {
        let page = lines(&[
            "19:00",
            "Viernes",
            "(16/01/26)",
            "Sen Masc 2ª F G-B",
            "Vito Valsequillo (35008831)",
            "Asigna Esbisoni Naranja (35023912)",
        ]);
        let rec = reconstruct(&page, 4, Some("Viernes 16/01/26"), &team());
        let m = rec.candidate.unwrap();
        assert_eq!(m.time.as_deref(), Some("19:00"));
        assert_eq!(m.category.as_deref(), Some("Sen Masc 2ª F G-B"));
        assert_eq!(rec.diagnostics, vec![Diagnostic::NoVenue { line: 4 }]);
    }

    #[test]
    fn test_upward_time_scan_is_bounded() {
        let page = lines(&[
            "19:00", "a", "b", "c", "d", "e", "Cad Fem", "Valsequillo (1)", "Telde (2)",
        ]);
        let m = reconstruct(&page, 7, Some("Lunes"), &team()).candidate.unwrap();
        assert_eq!(m.time, None);
        assert_eq!(m.category.as_deref(), Some("Cad Fem"));
    }

    #[test]
    fn test_long_category_kept_whole_when_time_is_above() {
        let long = "Campeonato Insular Preferente Senior Masculino Grupo B Segunda Fase";
        let page = lines(&["19:00", long, "Valsequillo (1)", "Telde (2)"]);
        let m = reconstruct(&page, 2, Some("Lunes"), &team()).candidate.unwrap();
        assert_eq!(m.time.as_deref(), Some("19:00"));
        assert_eq!(m.category.as_deref(), Some(long));
    }

    #[test]
    fn test_long_category_truncated_without_time() {
        let long = "Campeonato Insular Preferente Senior Masculino Grupo B Segunda Fase";
        let page = lines(&[long, "Valsequillo (1)", "Telde (2)"]);
        let m = reconstruct(&page, 1, Some("Lunes"), &team()).candidate.unwrap();
        let category = m.category.unwrap();
        assert_eq!(category.chars().count(), CATEGORY_MAX_CHARS);
        assert!(category.ends_with('…'));
        assert!(long.starts_with(category.trim_end_matches('…')));
    }

    #[test]
    fn test_next_block_is_not_a_venue() {
        let page = lines(&["18:30 Cad", "Valsequillo (1)", "Telde (2)", "81381"]);
        let rec = reconstruct(&page, 1, Some("Lunes"), &team());
        assert_eq!(rec.candidate.unwrap().venue, None);
        assert!(rec.diagnostics.contains(&Diagnostic::NoVenue { line: 1 }));
    }

    #[test]
    fn test_date_line_is_not_a_category() {
        let page = lines(&["(16/01/26)", "Valsequillo (1)", "Telde (2)"]);
        let rec = reconstruct(&page, 1, Some("Viernes 16/01/26"), &team());
        assert_eq!(rec.candidate.unwrap().category, None);
        assert!(rec.diagnostics.contains(&Diagnostic::NoCategory { line: 1 }));
    }

    #[test]
    fn test_dropped_when_team_lost_in_cleanup() {
        let page = lines(&["18:30 Cad", "Foo (1) Valsequillo (2)", "Bar (3)"]);
        let rec = reconstruct(&page, 1, Some("Lunes"), &team());
        assert!(rec.candidate.is_none());
        assert!(rec.diagnostics.contains(&Diagnostic::TeamNotInFixture { line: 1 }));
    }

    #[test]
    fn test_dropped_without_time_or_day() {
        let page = lines(&["Cad Fem", "Valsequillo (1)", "Telde (2)"]);
        let rec = reconstruct(&page, 1, None, &team());
        assert!(rec.candidate.is_none());
        assert!(rec.diagnostics.contains(&Diagnostic::Incomplete { line: 1 }));
    }

    #[test]
    fn test_dropped_without_rival() {
        let page = lines(&["18:30 Cad", "Valsequillo (1)"]);
        let rec = reconstruct(&page, 1, Some("Lunes"), &team());
        assert!(rec.candidate.is_none());
        assert_eq!(rec.layout, Layout::Ambiguous);
        assert!(rec.diagnostics.contains(&Diagnostic::MissingTeamName { line: 1 }));
    }
}
