use chrono::NaiveDate;
use fixture_types::{MatchCandidate, ScheduleVersion};

use crate::dates::find_date_token;

/// The next fixture still to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upcoming<'a> {
    pub fixture: &'a MatchCandidate,
    pub date: NaiveDate,
    pub days_left: i64,
}

impl Upcoming<'_> {
    pub fn countdown(&self) -> String {
        match self.days_left {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            n => format!("in {n} days"),
        }
    }
}

/// Calendar date of a fixture, when its day label carries one.
pub fn fixture_date(fixture: &MatchCandidate) -> Option<NaiveDate> {
    find_date_token(fixture.date_label.as_deref()?).map(|tok| tok.date)
}

/// Earliest fixture on or after `today`. Provisional fixtures are only
/// considered when no definitive listing was extracted at all.
pub fn next_fixture(matches: &[MatchCandidate], today: NaiveDate) -> Option<Upcoming<'_>> {
    let definitive_only = matches
        .iter()
        .any(|m| m.schedule_version == ScheduleVersion::Definitive);

    matches
        .iter()
        .filter(|m| !definitive_only || m.schedule_version == ScheduleVersion::Definitive)
        .filter_map(|m| Some((m, fixture_date(m)?)))
        .filter(|(_, date)| *date >= today)
        // Same day: timed fixtures first, earliest kick-off first
        .min_by(|(a, da), (b, db)| {
            da.cmp(db)
                .then_with(|| (a.time.is_none(), &a.time).cmp(&(b.time.is_none(), &b.time)))
        })
        .map(|(fixture, date)| Upcoming {
            fixture,
            date,
            days_left: (date - today).num_days(),
        })
}
