//! The extraction pass over one document.
//!
//! Pages are scanned line by line. Day headings update the date tracker,
//! and every line that names the tracked team and carries a team code is
//! handed to the reconstructor. Accepted fixtures go through the run-wide
//! dedup filter before being returned.

use std::fmt;

use chrono::NaiveDate;
use fixture_types::{MatchCandidate, ScheduleVersion};
use tracing::{debug, info, warn};

use crate::dates::{DateTracker, window_anchor};
use crate::dedup::DedupFilter;
use crate::document::Document;
use crate::reconstruct::{Diagnostic, Layout, reconstruct};
use crate::team::{TrackedTeam, looks_like_team_line};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Window start used for every page instead of the detected one
    pub anchor: Option<NaiveDate>,
    /// Year for window titles that don't print one
    pub season_year: Option<i32>,
}

/// A diagnostic with the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub source_tag: String,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_tag, self.diagnostic)
    }
}

/// Extraction state for one run. Reuse the same instance for every
/// document so duplicates across documents are dropped too.
#[derive(Debug)]
pub struct Extractor {
    team: TrackedTeam,
    options: ExtractOptions,
    dedup: DedupFilter,
    findings: Vec<Finding>,
    ambiguous: usize,
}

impl Extractor {
    pub fn new(team: &str, options: ExtractOptions) -> Self {
        Self {
            team: TrackedTeam::new(team),
            options,
            dedup: DedupFilter::new(),
            findings: Vec::new(),
            ambiguous: 0,
        }
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Mentions whose home/away roles had to be guessed.
    pub fn ambiguous_layouts(&self) -> usize {
        self.ambiguous
    }

    fn note(&mut self, source_tag: &str, diagnostic: Diagnostic) {
        self.findings.push(Finding {
            source_tag: source_tag.to_string(),
            diagnostic,
        });
    }

    /// Fixtures of the tracked team in `doc`, in page order, minus those
    /// already returned earlier in the run.
    pub fn extract(&mut self, doc: &Document, version: ScheduleVersion) -> Vec<MatchCandidate> {
        let mut found = Vec::new();
        if doc.is_empty() {
            warn!(document = %doc.tag, "document has no text");
            self.note(&doc.tag, Diagnostic::EmptyInput);
            return found;
        }

        // The current day carries over page breaks, but not documents
        let mut tracker = DateTracker::new(self.options.anchor);

        for (p, lines) in doc.pages().iter().enumerate() {
            let tag = format!("{}#p{}", doc.tag, p + 1);
            if lines.is_empty() {
                warn!(page = %tag, "page has no text");
                self.note(&tag, Diagnostic::EmptyInput);
                continue;
            }

            if self.options.anchor.is_none() {
                if let Some(anchor) = window_anchor(lines, self.options.season_year) {
                    debug!(page = %tag, %anchor, "matchday window");
                    tracker.set_anchor(anchor);
                }
            }

            for i in 0..lines.len() {
                if tracker.observe(lines, i) {
                    continue;
                }
                let line = &lines[i];
                if !self.team.is_mentioned_in(line) {
                    continue;
                }
                if !looks_like_team_line(line) {
                    debug!(page = %tag, line = i, text = %line, "mention without team code, skipped");
                    continue;
                }

                let date = tracker.current_date_label();
                let rec = reconstruct(lines, i, date.as_deref(), &self.team);
                if rec.layout == Layout::Ambiguous {
                    self.ambiguous += 1;
                }
                for diagnostic in rec.diagnostics {
                    self.note(&tag, diagnostic);
                }
                let Some(mut candidate) = rec.candidate else {
                    continue;
                };
                candidate.source_tag = tag.clone();
                candidate.schedule_version = version;

                if self.dedup.accept(&candidate) {
                    info!(
                        page = %tag,
                        date = candidate.date_label.as_deref().unwrap_or("?"),
                        time = candidate.time.as_deref().unwrap_or("?"),
                        "{} vs {}",
                        candidate.home,
                        candidate.away
                    );
                    found.push(candidate);
                }
            }
        }

        info!(
            document = %doc.tag,
            %version,
            matches = found.len(),
            run_total = self.dedup.len(),
            "document scanned"
        );
        found
    }
}
