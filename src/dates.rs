//! Day markers and calendar dates.
//!
//! Schedule sheets print a weekday heading ("Viernes", "Sábado (17/01/26)")
//! above the fixtures of that day. [`DateTracker`] remembers the latest
//! heading while a page is scanned and resolves it to a concrete date
//! whenever it can.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{DATE_LOOKAHEAD, DAY_MARKER_MAX_CHARS, HEADING_LINES};
use crate::error::{Error, Result};
use crate::team::looks_like_team_line;

// ── Regex patterns ─────────────────────────────────────────────────
//
// Real data examples:
//   Viernes
//   (16/01/26)
//   Sábado (17/01/2026)
//   HOJA DE JORNADA 14 (12-18 Ene)
//   78270 18:30 Junior Masc S-B

static RE_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(lunes|martes|mi[ée]rcoles|jueves|viernes|s[áa]bado|domingo|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .unwrap()
});

static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b").unwrap());

static RE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

// "(12-18 Ene)", "(29-4 Ene)", "(29 Dic - 4 Ene 2026)"
static RE_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\((\d{1,2})(?:\s+(\p{L}+)\.?)?\s*[-–]\s*(\d{1,2})\s+(\p{L}+)\.?(?:\s+(\d{4}))?\s*\)",
    )
    .unwrap()
});

// ── Tokens ─────────────────────────────────────────────────────────

/// An explicit `DD/MM/YY(YY)` date found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    /// As printed, e.g. "16/01/26"
    pub raw: String,
    pub date: NaiveDate,
}

/// First valid `DD/MM/YY(YY)` token in the line. Two-digit years are 20YY.
pub fn find_date_token(line: &str) -> Option<DateToken> {
    RE_DATE.captures_iter(line).find_map(|caps| {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if caps[3].len() == 2 {
            year += 2000;
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(DateToken {
            raw: caps[0].to_string(),
            date,
        })
    })
}

/// Parse a user-supplied date such as "05/01/26".
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    match find_date_token(s.trim()) {
        Some(tok) if tok.raw == s.trim() => Ok(tok.date),
        _ => Err(Error::InvalidDate(s.to_string())),
    }
}

/// First `HH:MM` in the line, zero-padded, with its byte range.
pub fn find_time(line: &str) -> Option<(String, std::ops::Range<usize>)> {
    let caps = RE_TIME.captures(line)?;
    let whole = caps.get(0)?;
    let hour: u32 = caps[1].parse().ok()?;
    Some((format!("{hour:02}:{}", &caps[2]), whole.range()))
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let folded = name.to_lowercase().replace('é', "e").replace('á', "a");
    match folded.as_str() {
        "lunes" | "monday" => Some(Weekday::Mon),
        "martes" | "tuesday" => Some(Weekday::Tue),
        "miercoles" | "wednesday" => Some(Weekday::Wed),
        "jueves" | "thursday" => Some(Weekday::Thu),
        "viernes" | "friday" => Some(Weekday::Fri),
        "sabado" | "saturday" => Some(Weekday::Sat),
        "domingo" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    match prefix.as_str() {
        "ene" | "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "abr" | "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "ago" | "aug" => Some(8),
        "sep" | "set" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dic" | "dec" => Some(12),
        _ => None,
    }
}

/// If the line is a day heading, return its weekday and the name as printed.
///
/// Long lines, team lines and lines carrying a kick-off time are never
/// headings, even when a weekday word appears in them.
pub fn day_marker(line: &str) -> Option<(Weekday, &str)> {
    if line.chars().count() >= DAY_MARKER_MAX_CHARS
        || looks_like_team_line(line)
        || find_time(line).is_some()
    {
        return None;
    }
    let m = RE_WEEKDAY.find(line)?;
    Some((weekday_from_name(m.as_str())?, m.as_str()))
}

// ── Matchday window ────────────────────────────────────────────────

/// Date of `target` inside the window that starts on `anchor`.
pub fn date_in_window(anchor: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let offset =
        (7 + target.num_days_from_monday() - anchor.weekday().num_days_from_monday()) % 7;
    anchor.checked_add_days(Days::new(u64::from(offset)))
}

/// Start date of a window title such as "(12-18 Ene)".
///
/// The year is the one printed in the title, else `season_year`. A window
/// that wraps into a new month ("(29-4 Ene)") starts in the previous one.
pub fn parse_window_title(line: &str, season_year: Option<i32>) -> Option<NaiveDate> {
    let caps = RE_WINDOW.captures(line)?;
    let start_day: u32 = caps[1].parse().ok()?;
    let end_day: u32 = caps[3].parse().ok()?;
    let end_month = month_from_name(&caps[4])?;
    let mut year = match caps.get(5) {
        Some(y) => y.as_str().parse().ok()?,
        None => season_year?,
    };
    let start_month = match caps.get(2) {
        Some(m) => month_from_name(m.as_str())?,
        None if start_day > end_day => {
            if end_month == 1 {
                12
            } else {
                end_month - 1
            }
        }
        None => end_month,
    };
    if start_month > end_month {
        year -= 1;
    }
    NaiveDate::from_ymd_opt(year, start_month, start_day)
}

/// Anchor date of a page: the first explicit date or window title in its
/// heading lines.
pub fn window_anchor(lines: &[String], season_year: Option<i32>) -> Option<NaiveDate> {
    lines.iter().take(HEADING_LINES).find_map(|line| {
        find_date_token(line)
            .map(|tok| tok.date)
            .or_else(|| parse_window_title(line, season_year))
    })
}

// ── Day resolution ─────────────────────────────────────────────────

/// How the date of a day heading was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    SameLine,
    Nearby,
    Anchor,
    WeekdayOnly,
}

/// The day a run of fixtures belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLabel {
    pub weekday: Weekday,
    /// Weekday as printed, e.g. "Viernes"
    pub name: String,
    pub date: Option<NaiveDate>,
    /// Date as it will appear in the label
    pub date_text: Option<String>,
    pub resolution: Resolution,
}

impl DayLabel {
    /// "Viernes 16/01/26", or just "Viernes" when unresolved.
    pub fn label(&self) -> String {
        match &self.date_text {
            Some(d) => format!("{} {}", self.name, d),
            None => self.name.clone(),
        }
    }
}

/// Resolve the day heading at `lines[i]`, if it is one.
///
/// Priority: a date on the same line, a date on one of the next
/// [`DATE_LOOKAHEAD`] lines (stopping at the next heading), the anchor
/// offset, and finally the bare weekday.
pub fn resolve_day(lines: &[String], i: usize, anchor: Option<NaiveDate>) -> Option<DayLabel> {
    let heading = lines.get(i)?;
    let (weekday, name) = day_marker(heading)?;
    let mut day = DayLabel {
        weekday,
        name: name.to_string(),
        date: None,
        date_text: None,
        resolution: Resolution::WeekdayOnly,
    };

    let explicit = find_date_token(heading)
        .map(|tok| (tok, Resolution::SameLine))
        .or_else(|| {
            lines
                .iter()
                .skip(i + 1)
                .take(DATE_LOOKAHEAD)
                .take_while(|l| day_marker(l).is_none())
                .find_map(|l| find_date_token(l))
                .map(|tok| (tok, Resolution::Nearby))
        });

    if let Some((tok, resolution)) = explicit {
        if tok.date.weekday() != weekday {
            warn!(%heading, date = %tok.raw, "weekday does not match printed date");
        }
        day.date = Some(tok.date);
        day.date_text = Some(tok.raw);
        day.resolution = resolution;
    } else if let Some(date) = anchor.and_then(|a| date_in_window(a, weekday)) {
        day.date = Some(date);
        day.date_text = Some(date.format("%d/%m/%y").to_string());
        day.resolution = Resolution::Anchor;
    } else {
        warn!(%heading, "day heading without a resolvable date");
    }

    Some(day)
}

/// Running "which day are we in" state for a scan.
#[derive(Debug, Default)]
pub struct DateTracker {
    anchor: Option<NaiveDate>,
    current: Option<DayLabel>,
}

impl DateTracker {
    pub fn new(anchor: Option<NaiveDate>) -> Self {
        Self {
            anchor,
            current: None,
        }
    }

    pub fn set_anchor(&mut self, anchor: NaiveDate) {
        self.anchor = Some(anchor);
    }

    /// Feed line `i`. Returns true if it was a day heading.
    pub fn observe(&mut self, lines: &[String], i: usize) -> bool {
        match resolve_day(lines, i, self.anchor) {
            Some(day) => {
                debug!(
                    line = i,
                    day = %day.label(),
                    weekday = %day.weekday,
                    date = ?day.date,
                    resolution = ?day.resolution,
                    "day heading"
                );
                self.current = Some(day);
                true
            }
            None => false,
        }
    }

    pub fn current_date_label(&self) -> Option<String> {
        self.current.as_ref().map(DayLabel::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_token_two_and_four_digit_years() {
        let tok = find_date_token("Viernes (16/01/26)").unwrap();
        assert_eq!(tok.raw, "16/01/26");
        assert_eq!(tok.date, ymd(2026, 1, 16));
        assert_eq!(find_date_token("17/01/2026").unwrap().date, ymd(2026, 1, 17));
        assert_eq!(find_date_token("31/02/26"), None);
        assert_eq!(find_date_token("35008832"), None);
    }

    #[test]
    fn test_parse_date_rejects_trailing_text() {
        assert_eq!(parse_date("05/01/26").unwrap(), ymd(2026, 1, 5));
        assert!(parse_date("05/01/26 x").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn test_find_time_pads_hour() {
        assert_eq!(find_time("78270 9:30 Mini Mixto").unwrap().0, "09:30");
        assert_eq!(find_time("18:30 Junior Masc S-B").unwrap().1, 0..5);
        assert_eq!(find_time("16/01/26"), None);
        assert_eq!(find_time("25:10"), None);
    }

    #[test]
    fn test_day_marker_accents_and_case() {
        assert_eq!(day_marker("Sábado").unwrap().0, Weekday::Sat);
        assert_eq!(day_marker("SABADO").unwrap().0, Weekday::Sat);
        assert_eq!(day_marker("miércoles 14/01/26").unwrap().1, "miércoles");
        assert_eq!(day_marker("Friday").unwrap().0, Weekday::Fri);
    }

    #[test]
    fn test_day_marker_rejects_long_team_and_timed_lines() {
        assert!(day_marker("Pabellón abierto de lunes a domingo por la tarde").is_none());
        assert!(day_marker("CD Martes (35001111)").is_none());
        assert!(day_marker("Domingo 12:00 Mini").is_none());
        assert!(day_marker("Lunesco").is_none());
    }

    #[test]
    fn test_resolve_same_line() {
        let day = resolve_day(&lines(&["Sábado (17/01/26)"]), 0, None).unwrap();
        assert_eq!(day.resolution, Resolution::SameLine);
        assert_eq!(day.label(), "Sábado 17/01/26");
    }

    #[test]
    fn test_resolve_from_next_lines() {
        let page = lines(&["Viernes", "(16/01/26)", "81270"]);
        let day = resolve_day(&page, 0, Some(ymd(2026, 1, 12))).unwrap();
        assert_eq!(day.resolution, Resolution::Nearby);
        assert_eq!(day.label(), "Viernes 16/01/26");
    }

    #[test]
    fn test_lookahead_is_bounded() {
        let page = lines(&["Viernes", "a", "b", "c", "16/01/26"]);
        let day = resolve_day(&page, 0, None).unwrap();
        assert_eq!(day.resolution, Resolution::WeekdayOnly);
        assert_eq!(day.label(), "Viernes");
    }

    #[test]
    fn test_lookahead_does_not_borrow_next_day() {
        let page = lines(&["Viernes", "Sábado 17/01/26"]);
        let day = resolve_day(&page, 0, None).unwrap();
        assert_eq!(day.date, None);
    }

    #[test]
    fn test_anchor_offset() {
        // 05/01/26 is a Monday
        let page = lines(&["Friday"]);
        let day = resolve_day(&page, 0, Some(ymd(2026, 1, 5))).unwrap();
        assert_eq!(day.resolution, Resolution::Anchor);
        assert_eq!(day.date, Some(ymd(2026, 1, 9)));
        assert_eq!(day.date_text.as_deref(), Some("09/01/26"));
        assert_eq!(day.label(), "Friday 09/01/26");
    }

    #[test]
    fn test_anchor_wraps_within_week() {
        // Window starting on a Friday: Monday is three days later
        assert_eq!(
            date_in_window(ymd(2026, 1, 16), Weekday::Mon),
            Some(ymd(2026, 1, 19))
        );
        assert_eq!(
            date_in_window(ymd(2026, 1, 16), Weekday::Fri),
            Some(ymd(2026, 1, 16))
        );
    }

    #[test]
    fn test_window_title() {
        assert_eq!(
            parse_window_title("HOJA DE JORNADA 14 (12-18 Ene)", Some(2026)),
            Some(ymd(2026, 1, 12))
        );
        assert_eq!(
            parse_window_title("(29-4 Ene)", Some(2026)),
            Some(ymd(2025, 12, 29))
        );
        assert_eq!(
            parse_window_title("(29 Dic - 4 Ene 2026)", None),
            Some(ymd(2025, 12, 29))
        );
        assert_eq!(parse_window_title("(12-18 Ene)", None), None);
        assert_eq!(parse_window_title("(35008832)", Some(2026)), None);
    }

    #[test]
    fn test_window_anchor_only_reads_heading() {
        let mut page = lines(&["FEDERACIÓN INSULAR", "HOJA DE JORNADA (12-18 Ene)"]);
        assert_eq!(window_anchor(&page, Some(2026)), Some(ymd(2026, 1, 12)));

        page = vec!["x".to_string(); HEADING_LINES];
        page.push("Viernes 16/01/26".to_string());
        assert_eq!(window_anchor(&page, Some(2026)), None);
    }

    #[test]
    fn test_tracker_keeps_last_day() {
        let page = lines(&["Viernes", "(16/01/26)", "18:30 Cad Masc", "Sábado", "19:00 Sen"]);
        let mut tracker = DateTracker::new(None);
        assert!(tracker.observe(&page, 0));
        assert!(!tracker.observe(&page, 1));
        assert!(!tracker.observe(&page, 2));
        assert_eq!(tracker.current_date_label().as_deref(), Some("Viernes 16/01/26"));
        assert!(tracker.observe(&page, 3));
        assert_eq!(tracker.current_date_label().as_deref(), Some("Sábado"));
    }

    #[test]
    fn test_tracker_uses_anchor_set_later() {
        let page = lines(&["Domingo"]);
        let mut tracker = DateTracker::default();
        tracker.set_anchor(ymd(2026, 1, 12));
        tracker.observe(&page, 0);
        assert_eq!(tracker.current_date_label().as_deref(), Some("Domingo 18/01/26"));
    }
}
