use std::collections::HashSet;

use fixture_types::{CanonicalKey, MatchCandidate};
use tracing::debug;

/// Drops fixtures already emitted in this run. Lives across all pages and
/// all documents, so the first occurrence wins.
#[derive(Debug, Default)]
pub struct DedupFilter {
    seen: HashSet<CanonicalKey>,
}

impl DedupFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, candidate: &MatchCandidate) -> bool {
        let fresh = self.seen.insert(candidate.canonical_key());
        if !fresh {
            debug!(
                home = %candidate.home,
                away = %candidate.away,
                source = %candidate.source_tag,
                "duplicate fixture skipped"
            );
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
